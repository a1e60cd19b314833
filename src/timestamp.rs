/// Formats a duration in seconds as HH:MM:SS.mmm for diagnostics.
pub fn time_str(seconds: f64) -> String {
    let total_ms = (seconds * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = total_ms / 60_000 % 60;
    let secs = total_ms / 1000 % 60;
    let millis = total_ms % 1000;

    format!("{hours:02}:{minutes:02}:{secs:02}.{millis:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_subsecond_and_long_durations() {
        assert_eq!(time_str(0.0), "00:00:00.000");
        assert_eq!(time_str(0.25), "00:00:00.250");
        assert_eq!(time_str(61.5), "00:01:01.500");
        assert_eq!(time_str(3661.0), "01:01:01.000");
    }
}
