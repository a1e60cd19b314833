use std::io::{self, BufWriter, Write};

use emgline::structs::frame::Frame;

/// CSV sink: one row of 8 signed sample values per frame, channel 1
/// first.
pub struct CsvWriter<W: Write> {
    writer: BufWriter<W>,
    rows_written: u64,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            rows_written: 0,
        }
    }

    pub fn write_frame(&mut self, frame: &Frame) -> io::Result<()> {
        for (index, value) in frame.values().into_iter().enumerate() {
            if index > 0 {
                self.writer.write_all(b",")?;
            }
            write!(self.writer, "{value}")?;
        }
        self.writer.write_all(b"\n")?;

        self.rows_written += 1;
        Ok(())
    }

    pub fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emgline::structs::frame::{DecodedSample, FRAME_CHANNELS};

    fn frame_with_values(values: [i32; FRAME_CHANNELS]) -> Frame {
        let mut samples = [DecodedSample::default(); FRAME_CHANNELS];
        for (index, slot) in samples.iter_mut().enumerate() {
            *slot = DecodedSample {
                channel: index as u8 + 1,
                value: values[index],
            };
        }
        Frame { samples }
    }

    #[test]
    fn writes_one_row_per_frame() -> io::Result<()> {
        let mut writer = CsvWriter::new(Vec::new());

        writer.write_frame(&frame_with_values([1, -2, 3, -4, 5, -6, 7, -8]))?;
        writer.write_frame(&frame_with_values([0; FRAME_CHANNELS]))?;
        assert_eq!(writer.rows_written(), 2);

        writer.finish()?;
        let buffer = writer.into_inner()?;

        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "1,-2,3,-4,5,-6,7,-8\n0,0,0,0,0,0,0,0\n"
        );
        Ok(())
    }
}
