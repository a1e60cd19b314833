//! Wire-format encoder, the inverse of [`decode`](super::decode).
//!
//! Mirrors what the acquisition firmware transmits: every conversion
//! result becomes a 5-byte packet of 5 alignment bits plus seven 5-bit
//! line symbols. Used for loopback tests and for generating captures.

use std::io::{self, Write};

use bitstream_io::{BigEndian, BitWrite, BitWriter};

use crate::process::decode::PACKET_LEN;
use crate::structs::frame::FRAME_CHANNELS;
use crate::structs::symbol::encode_nibble;

/// Serializes samples into the 4b/5b packet stream.
pub struct StreamEncoder<W: Write> {
    writer: BitWriter<W, BigEndian>,
}

impl<W: Write> StreamEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BitWriter::endian(writer, BigEndian),
        }
    }

    /// Writes one packet: the channel symbol followed by six value
    /// symbols, most significant nibble first.
    ///
    /// `value` is truncated to its low 24 bits, which is exactly the
    /// two's-complement wire representation for in-range samples.
    pub fn write_sample(&mut self, channel: u8, value: i32) -> io::Result<()> {
        let value = value as u32 & 0xFF_FFFF;

        self.writer.write_unsigned_var(5, 0u8)?;
        self.writer
            .write_unsigned_var(5, encode_nibble(channel))?;
        for shift in (0..6u32).rev() {
            let nibble = (value >> (4 * shift)) as u8 & 0xF;
            self.writer.write_unsigned_var(5, encode_nibble(nibble))?;
        }

        Ok(())
    }

    /// Writes one full frame, channels 1..=8 in order.
    pub fn write_frame(&mut self, values: &[i32; FRAME_CHANNELS]) -> io::Result<()> {
        for (index, &value) in values.iter().enumerate() {
            self.write_sample(index as u8 + 1, value)?;
        }
        Ok(())
    }

    pub fn into_writer(self) -> W {
        self.writer.into_writer()
    }
}

/// Encodes one packet into a standalone byte array.
pub fn encode_packet(channel: u8, value: i32) -> io::Result<[u8; PACKET_LEN]> {
    let mut encoder = StreamEncoder::new(Vec::with_capacity(PACKET_LEN));
    encoder.write_sample(channel, value)?;

    let bytes = encoder.into_writer();
    let mut packet = [0u8; PACKET_LEN];
    packet.copy_from_slice(&bytes);

    Ok(packet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_matches_hand_packed_bytes() -> anyhow::Result<()> {
        assert_eq!(encode_packet(1, 0)?, [0x02, 0x7D, 0xEF, 0x7B, 0xDE]);
        assert_eq!(encode_packet(5, 0x00_ABCD)?, [0x02, 0xFD, 0xEB, 0x5F, 0x5B]);
        Ok(())
    }

    #[test]
    fn every_packet_starts_sync_aligned() -> anyhow::Result<()> {
        use crate::process::decode::SYNC_MARKER_MASK;

        for channel in 0..=15u8 {
            let packet = encode_packet(channel, 0x55_AA55)?;
            assert_eq!(packet[0] & SYNC_MARKER_MASK, 0);
        }
        Ok(())
    }
}
