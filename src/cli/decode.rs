use std::fs::File;
use std::path::Path;

use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use emgline::process::decode::PacketDecoder;
use emgline::process::sync::{FRAME_LEN, FrameSynchronizer};
use emgline::structs::frame::{FRAME_CHANNELS, Frame};

use super::command::{Cli, DecodeArgs, OutputFormat};
use crate::csv_out::CsvWriter;
use crate::input::InputReader;
use crate::timestamp::time_str;
use crate::wav::WavWriter;

pub fn cmd_decode(args: &DecodeArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    let format = args.format.resolve(&args.output)?;

    if args.sample_rate == 0 {
        return Err(anyhow::anyhow!("sample rate must be non-zero"));
    }

    log::info!(
        "Decoding capture: {} (strict mode: {}, format: {format:?})",
        args.input.display(),
        cli.strict,
    );

    let capture = InputReader::new(&args.input)?.read_all()?;
    log::info!("read {} capture bytes", capture.len());

    if let OutputFormat::Raw = format {
        // archive the capture untouched
        std::fs::write(&args.output, &capture)?;
        log::info!(
            "wrote {} bytes to {}",
            capture.len(),
            args.output.display()
        );
        return Ok(());
    }

    let decoder = if cli.strict {
        PacketDecoder::strict()
    } else {
        PacketDecoder::new()
    };
    let mut synchronizer = FrameSynchronizer::with_decoder(&capture, decoder);

    let pb = multi.map(|multi| {
        let pb = multi.add(ProgressBar::new((capture.len() / FRAME_LEN) as u64));
        pb.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} frames ({percent}%)")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb
    });

    let mut sink = FrameSink::create(format, &args.output, args.sample_rate)?;
    let mut frame_count: u64 = 0;

    // A trailing BufferExhausted is how every finite capture ends; the
    // synchronizer has already recovered from anything recoverable.
    for frame in (&mut synchronizer).flatten() {
        sink.write_frame(&frame)?;
        frame_count += 1;

        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    sink.finish()?;

    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }

    log::info!("wrote output to {}", args.output.display());

    let duration_secs = frame_count as f64 / f64::from(args.sample_rate);
    println!("Decode Summary");
    println!("  Frames                    {frame_count}");
    println!(
        "  Duration                  {} at {} Hz",
        time_str(duration_secs),
        args.sample_rate
    );
    println!(
        "  Dropped bytes             {}",
        synchronizer.dropped_bytes()
    );
    println!(
        "  Bytes consumed            {} of {}",
        synchronizer.position(),
        capture.len()
    );

    Ok(())
}

enum FrameSink {
    Wav(WavWriter<File>),
    Csv(CsvWriter<File>),
}

impl FrameSink {
    fn create(format: OutputFormat, path: &Path, sample_rate: u32) -> Result<Self> {
        match format {
            OutputFormat::Wav => {
                let mut writer = WavWriter::new(File::create(path)?);
                writer.configure_audio_format(sample_rate, FRAME_CHANNELS as u32, 24)?;
                writer.write_header()?;
                Ok(FrameSink::Wav(writer))
            }
            OutputFormat::Csv => Ok(FrameSink::Csv(CsvWriter::new(File::create(path)?))),
            OutputFormat::Auto | OutputFormat::Raw => {
                Err(anyhow::anyhow!("no frame sink for format {format:?}"))
            }
        }
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        match self {
            FrameSink::Wav(writer) => writer.write_pcm_24bit_as_packed(&frame.values())?,
            FrameSink::Csv(writer) => writer.write_frame(frame)?,
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        match self {
            FrameSink::Wav(writer) => writer.finish()?,
            FrameSink::Csv(writer) => writer.finish()?,
        }
        Ok(())
    }
}
