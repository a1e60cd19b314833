use std::io::{self, BufWriter, Seek, SeekFrom, Write};

/// RIFF WAV file writer for multi-channel 24-bit PCM audio.
///
/// Sizes in the RIFF and data chunk headers are written as placeholders
/// and patched by [`WavWriter::finish`] once the sample count is known.
pub struct WavWriter<W: Write + Seek> {
    writer: BufWriter<W>,
    riff_size_position: u64,
    data_size_position: u64,
    data_written: u32,
    sample_rate: u32,
    channels: u32,
    bits_per_sample: u32,
}

impl<W: Write + Seek> WavWriter<W> {
    /// Create a new WAV writer
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            riff_size_position: 0,
            data_size_position: 0,
            data_written: 0,
            sample_rate: 2000,
            channels: 8,
            bits_per_sample: 24,
        }
    }

    /// Configure audio format parameters
    pub fn configure_audio_format(
        &mut self,
        sample_rate: u32,
        channels: u32,
        bits_per_sample: u32,
    ) -> io::Result<()> {
        if self.data_written > 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Cannot change format after writing data",
            ));
        }

        self.sample_rate = sample_rate;
        self.channels = channels;
        self.bits_per_sample = bits_per_sample;
        Ok(())
    }

    /// Write the RIFF/fmt/data chunk headers
    pub fn write_header(&mut self) -> io::Result<()> {
        self.writer.write_all(b"RIFF")?;
        self.riff_size_position = self.writer.stream_position()?;
        self.writer.write_all(&0u32.to_le_bytes())?; // File size (to be updated later)
        self.writer.write_all(b"WAVE")?;

        self.writer.write_all(b"fmt ")?;
        self.writer.write_all(&16u32.to_le_bytes())?;
        self.writer.write_all(&1u16.to_le_bytes())?; // PCM format
        self.writer
            .write_all(&(self.channels as u16).to_le_bytes())?;
        self.writer.write_all(&self.sample_rate.to_le_bytes())?;

        let byte_rate = self.sample_rate * self.channels * (self.bits_per_sample / 8);
        self.writer.write_all(&byte_rate.to_le_bytes())?;

        let block_align = self.channels * (self.bits_per_sample / 8);
        self.writer.write_all(&(block_align as u16).to_le_bytes())?;
        self.writer
            .write_all(&(self.bits_per_sample as u16).to_le_bytes())?;

        self.writer.write_all(b"data")?;
        self.data_size_position = self.writer.stream_position()?;
        self.writer.write_all(&0u32.to_le_bytes())?; // Data size (to be updated later)

        Ok(())
    }

    /// Write 24-bit PCM samples (input as i32, written as 24-bit little-endian)
    pub fn write_pcm_24bit_as_packed(&mut self, samples: &[i32]) -> io::Result<()> {
        for &sample in samples {
            let bytes = sample.to_le_bytes();
            self.writer.write_all(&bytes[0..3])?; // Take the 3 least significant bytes
            self.data_written += 3;
        }
        Ok(())
    }

    /// Finish writing and patch the chunk size headers
    pub fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()?;

        let current_pos = self.writer.stream_position()?;

        self.writer.seek(SeekFrom::Start(self.data_size_position))?;
        self.writer.write_all(&self.data_written.to_le_bytes())?;

        // RIFF size covers everything after the tag and size field
        self.writer.seek(SeekFrom::Start(self.riff_size_position))?;
        self.writer
            .write_all(&(current_pos as u32 - 8).to_le_bytes())?;

        self.writer.seek(SeekFrom::Start(current_pos))?;
        self.writer.flush()?;

        Ok(())
    }

    /// Get the underlying writer
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }

    /// Get statistics about written data
    pub fn stats(&self) -> WavStats {
        WavStats {
            data_written: self.data_written,
            sample_rate: self.sample_rate,
            channels: self.channels,
            bits_per_sample: self.bits_per_sample,
        }
    }
}

/// Statistics about WAV file writing
#[derive(Debug, Clone)]
pub struct WavStats {
    pub data_written: u32,
    pub sample_rate: u32,
    pub channels: u32,
    pub bits_per_sample: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_wav_header_write() -> io::Result<()> {
        let cursor = Cursor::new(Vec::new());
        let mut writer = WavWriter::new(cursor);

        writer.configure_audio_format(2000, 8, 24)?;
        writer.write_header()?;

        let buffer = writer.into_inner()?.into_inner();

        assert_eq!(&buffer[0..4], b"RIFF");
        assert_eq!(&buffer[8..12], b"WAVE");
        assert_eq!(&buffer[12..16], b"fmt ");
        assert_eq!(&buffer[36..40], b"data");

        // channels and sample rate land in the fmt chunk
        assert_eq!(u16::from_le_bytes([buffer[22], buffer[23]]), 8);
        assert_eq!(
            u32::from_le_bytes([buffer[24], buffer[25], buffer[26], buffer[27]]),
            2000
        );

        Ok(())
    }

    #[test]
    fn test_wav_sample_write() -> io::Result<()> {
        let cursor = Cursor::new(Vec::new());
        let mut writer = WavWriter::new(cursor);

        writer.configure_audio_format(2000, 2, 24)?;
        writer.write_header()?;

        let samples = vec![0x123456i32, -0x654322];
        writer.write_pcm_24bit_as_packed(&samples)?;

        let stats = writer.stats();
        assert_eq!(stats.data_written, 6); // 2 samples x 3 bytes each

        writer.finish()?;
        let buffer = writer.into_inner()?.into_inner();

        // data chunk size patched in place
        assert_eq!(
            u32::from_le_bytes([buffer[40], buffer[41], buffer[42], buffer[43]]),
            6
        );
        // samples written little-endian, low 3 bytes
        assert_eq!(&buffer[44..47], &[0x56, 0x34, 0x12]);

        Ok(())
    }
}
