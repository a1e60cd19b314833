use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use serde::Serialize;

use emgline::process::decode::PacketDecoder;
use emgline::process::sync::FrameSynchronizer;
use emgline::structs::frame::FRAME_CHANNELS;

use super::command::{Cli, InfoArgs};
use crate::input::InputReader;

pub fn cmd_info(args: &InfoArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    log::info!("Analyzing capture: {}", args.input.display());

    let capture = InputReader::new(&args.input)?.read_all()?;

    let pb = if let Some(multi) = multi {
        let pb = multi.add(ProgressBar::new_spinner());
        pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb.set_message("Analyzing frames...");
        Some(pb)
    } else {
        None
    };

    let decoder = if cli.strict {
        PacketDecoder::strict()
    } else {
        PacketDecoder::new()
    };
    let mut synchronizer = FrameSynchronizer::with_decoder(&capture, decoder);

    let mut report = CaptureReport {
        bytes_read: capture.len(),
        strict: cli.strict,
        ..Default::default()
    };

    for frame in (&mut synchronizer).flatten() {
        report.frames += 1;

        for (peak, value) in report.channel_peaks.iter_mut().zip(frame.values()) {
            *peak = (*peak).max(value.unsigned_abs());
        }

        if report.frames.is_multiple_of(1000) {
            if let Some(pb) = &pb {
                pb.set_message(format!("Analyzing frames...       {}", report.frames));
                pb.tick();
            }
        }
    }

    report.dropped_bytes = synchronizer.dropped_bytes();
    report.bytes_consumed = synchronizer.position();

    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }

    if report.frames == 0 {
        log::warn!("no complete frames found; this may not be a line-coded capture");
    }

    print!("{}", serde_yaml_ng::to_string(&report)?);

    Ok(())
}

/// Capture statistics printed as YAML by the `info` command.
#[derive(Debug, Default, Serialize)]
struct CaptureReport {
    bytes_read: usize,
    frames: usize,
    dropped_bytes: usize,
    bytes_consumed: usize,
    strict: bool,
    /// Peak absolute sample value seen on each channel.
    channel_peaks: [u32; FRAME_CHANNELS],
}
