use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};

#[derive(Debug, ClapParser)]
#[command(
    name       = env!("CARGO_PKG_NAME"),
    version    = env!("CARGO_PKG_VERSION"),
    author     = env!("CARGO_PKG_AUTHORS"),
    about      = "Tools for inspecting and decoding 4b/5b line-coded EMG serial captures",
    long_about = None,
)]
pub struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Treat control and reserved line symbols inside packets as sync
    /// loss instead of decoding them as zero nibbles.
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Show progress bars during operations.
    #[arg(long, global = true)]
    pub progress: bool,

    /// Choose an operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decode a captured stream into a WAV, CSV or raw file.
    Decode(DecodeArgs),

    /// Print capture statistics
    Info(InfoArgs),
}

#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// Input capture (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file; its extension selects the format unless --format is
    /// given.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Sample rate configured in the acquisition firmware, stamped into
    /// WAV headers and used for duration diagnostics.
    #[arg(short = 's', long, value_name = "HZ")]
    pub sample_rate: u32,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Auto)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Input capture (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Disable logging output.
    Off,
    /// No output except errors.
    Error,
    /// Show warnings and errors.
    Warn,
    /// Show info, warnings and errors (default).
    Info,
    /// Show debug, info, warnings and errors.
    Debug,
    /// Show all log messages including trace.
    Trace,
}

impl LogLevel {
    /// Convert LogLevel to log::LevelFilter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Colorized human-readable text.
    Plain,
    /// Structured JSON per log record.
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum OutputFormat {
    /// Select the format from the output file extension.
    Auto,
    /// RIFF WAV, 8 channels, 24-bit PCM.
    Wav,
    /// One row of 8 signed samples per frame.
    Csv,
    /// Byte-for-byte copy of the capture, no decoding.
    Raw,
}

impl OutputFormat {
    /// Resolves `Auto` against the output file extension, the same rule
    /// the original capture tool used.
    pub fn resolve(self, output: &Path) -> Result<OutputFormat> {
        if self != OutputFormat::Auto {
            return Ok(self);
        }

        let extension = output
            .extension()
            .and_then(|extension| extension.to_str())
            .unwrap_or("");

        match extension.to_ascii_lowercase().as_str() {
            "wav" => Ok(OutputFormat::Wav),
            "csv" | "txt" => Ok(OutputFormat::Csv),
            "raw" => Ok(OutputFormat::Raw),
            "" => anyhow::bail!(
                "cannot infer an output format without a file extension; pass --format"
            ),
            other => anyhow::bail!("unsupported output format: .{other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() -> Result<()> {
        let resolve = |name: &str| OutputFormat::Auto.resolve(Path::new(name));

        assert_eq!(resolve("session.wav")?, OutputFormat::Wav);
        assert_eq!(resolve("session.csv")?, OutputFormat::Csv);
        assert_eq!(resolve("session.TXT")?, OutputFormat::Csv);
        assert_eq!(resolve("session.raw")?, OutputFormat::Raw);
        assert!(resolve("session.mp3").is_err());
        assert!(resolve("session").is_err());
        Ok(())
    }

    #[test]
    fn explicit_format_overrides_extension() -> Result<()> {
        let format = OutputFormat::Csv.resolve(Path::new("session.wav"))?;
        assert_eq!(format, OutputFormat::Csv);
        Ok(())
    }
}
