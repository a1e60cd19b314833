use crate::structs::frame::DecodedSample;
use crate::structs::symbol::{decode_symbol, is_data_symbol};
use crate::utils::errors::SyncError;

/// Wire length of one packet in bytes.
pub const PACKET_LEN: usize = 5;

/// Bits of a packet's first byte that are clear at a packet boundary.
pub const SYNC_MARKER_MASK: u8 = 0xF8;

const SYMBOLS_PER_PACKET: usize = 7;

/// Decodes 5-byte packets into [`DecodedSample`] values.
///
/// The default decoder is bit-compatible with the acquisition firmware:
/// control and reserved symbols inside a packet silently alias to data
/// nibble 0. [`PacketDecoder::strict`] rejects them instead, so that
/// mid-packet line noise triggers a resynchronization rather than a
/// corrupted sample.
///
/// # Example
///
/// ```rust
/// use emgline::process::decode::PacketDecoder;
///
/// let decoder = PacketDecoder::new();
/// let sample = decoder.decode(&[0x02, 0xFD, 0xEB, 0x5F, 0x5B])?;
///
/// assert_eq!(sample.channel, 5);
/// assert_eq!(sample.value, 0x00_ABCD);
/// # Ok::<(), emgline::utils::errors::SyncError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PacketDecoder {
    strict: bool,
}

impl PacketDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder that fails on control or reserved symbols inside a packet.
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Decodes one packet into its (channel, sample) pair.
    ///
    /// The seven 5-bit symbols follow the 5 alignment bits covered by the
    /// sync marker check: symbol `i` occupies bits `[5 * i + 5, 5 * i + 10)`
    /// of the 40-bit packet, MSB first. Symbol 0 is the channel nibble,
    /// symbols 1..=6 pack the sample big-endian, sign-extended from bit 23.
    ///
    /// Beyond the length and sync marker preconditions nothing is
    /// validated here; a corrupted packet yields a deterministic garbage
    /// pair and the channel-sequence check in the synchronizer catches it.
    pub fn decode(&self, packet: &[u8]) -> Result<DecodedSample, SyncError> {
        if packet.len() != PACKET_LEN {
            return Err(SyncError::WrongPacketLength(packet.len()));
        }

        if packet[0] & SYNC_MARKER_MASK != 0 {
            return Err(SyncError::SyncMarkerSet(packet[0]));
        }

        let mut window = 0u64;
        for &byte in packet {
            window = window << 8 | u64::from(byte);
        }

        let mut nibbles = [0u8; SYMBOLS_PER_PACKET];
        for (i, nibble) in nibbles.iter_mut().enumerate() {
            let symbol = (window >> (30 - 5 * i)) as u8 & 0x1F;

            if self.strict && !is_data_symbol(symbol) {
                return Err(SyncError::ForeignSymbol(symbol));
            }

            *nibble = decode_symbol(symbol);
        }

        let value = nibbles[1..]
            .iter()
            .fold(0u32, |value, &nibble| value << 4 | u32::from(nibble));

        // Exact two's-complement sign extension from bit 23.
        let value = if value & 0x80_0000 != 0 {
            value as i32 - 0x100_0000
        } else {
            value as i32
        };

        Ok(DecodedSample {
            channel: nibbles[0],
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::encode::encode_packet;

    #[test]
    fn decodes_known_packet() -> anyhow::Result<()> {
        // channel 5, value 0x00ABCD, worked out by hand against the
        // symbol table
        let sample = PacketDecoder::new().decode(&[0x02, 0xFD, 0xEB, 0x5F, 0x5B])?;
        assert_eq!(sample.channel, 5);
        assert_eq!(sample.value, 0x00_ABCD);
        Ok(())
    }

    #[test]
    fn sign_extends_from_bit_23() -> anyhow::Result<()> {
        let packet = encode_packet(3, 0x80_0001_u32 as i32)?;
        let sample = PacketDecoder::new().decode(&packet)?;
        assert_eq!(sample.channel, 3);
        assert_eq!(sample.value, 0x80_0001 - 0x100_0000);

        let packet = encode_packet(3, -1)?;
        assert_eq!(PacketDecoder::new().decode(&packet)?.value, -1);
        Ok(())
    }

    #[test]
    fn rejects_set_sync_marker() {
        for first in [0x08u8, 0x80, 0xF8, 0xFF] {
            let result = PacketDecoder::new().decode(&[first, 0, 0, 0, 0]);
            assert_eq!(result, Err(SyncError::SyncMarkerSet(first)));
        }
    }

    #[test]
    fn rejects_wrong_length() {
        let decoder = PacketDecoder::new();
        assert_eq!(
            decoder.decode(&[0x02, 0x7D, 0xEF, 0x7B]),
            Err(SyncError::WrongPacketLength(4))
        );
        assert_eq!(
            decoder.decode(&[0x02, 0x7D, 0xEF, 0x7B, 0xDE, 0x00]),
            Err(SyncError::WrongPacketLength(6))
        );
    }

    #[test]
    fn lenient_decoder_aliases_control_symbols_to_zero() {
        // 5 zero alignment bits followed by seven idle symbols (0b11111)
        let packet = [0x07, 0xFF, 0xFF, 0xFF, 0xFF];
        let sample = PacketDecoder::new().decode(&packet).unwrap();
        assert_eq!(sample.channel, 0);
        assert_eq!(sample.value, 0);
    }

    #[test]
    fn strict_decoder_rejects_control_symbols() {
        let packet = [0x07, 0xFF, 0xFF, 0xFF, 0xFF];
        assert_eq!(
            PacketDecoder::strict().decode(&packet),
            Err(SyncError::ForeignSymbol(0b11111))
        );
    }

    #[test]
    fn round_trips_every_channel() -> anyhow::Result<()> {
        let decoder = PacketDecoder::new();
        for channel in 1..=8u8 {
            let value = i32::from(channel) * 0x01_1111 - 0x40_0000;
            let sample = decoder.decode(&encode_packet(channel, value)?)?;
            assert_eq!(sample.channel, channel);
            assert_eq!(sample.value, value);
        }
        Ok(())
    }
}
