/// Packet decoding.
///
/// Provides the [`PacketDecoder`](decode::PacketDecoder) for translating
/// single 5-byte packets into
/// [`DecodedSample`](crate::structs::frame::DecodedSample) values.
pub mod decode;

/// Wire-format encoding.
///
/// Provides the [`StreamEncoder`](encode::StreamEncoder) for producing
/// the byte stream the acquisition firmware transmits.
pub mod encode;

/// Stream synchronization.
///
/// Provides the [`FrameSynchronizer`](sync::FrameSynchronizer) for
/// locating frame boundaries in a capture and recovering from corrupted
/// or dropped bytes.
pub mod sync;

/// Two zero-valued frames in wire format, for examples and tests.
pub const EXAMPLE_DATA: &[u8] = &[
    0x02, 0x7D, 0xEF, 0x7B, 0xDE, 0x05, 0x3D, 0xEF, 0x7B, 0xDE, // channels 1-2
    0x05, 0x7D, 0xEF, 0x7B, 0xDE, 0x02, 0xBD, 0xEF, 0x7B, 0xDE, // channels 3-4
    0x02, 0xFD, 0xEF, 0x7B, 0xDE, 0x03, 0xBD, 0xEF, 0x7B, 0xDE, // channels 5-6
    0x03, 0xFD, 0xEF, 0x7B, 0xDE, 0x04, 0xBD, 0xEF, 0x7B, 0xDE, // channels 7-8
    0x02, 0x7D, 0xEF, 0x7B, 0xDE, 0x05, 0x3D, 0xEF, 0x7B, 0xDE,
    0x05, 0x7D, 0xEF, 0x7B, 0xDE, 0x02, 0xBD, 0xEF, 0x7B, 0xDE,
    0x02, 0xFD, 0xEF, 0x7B, 0xDE, 0x03, 0xBD, 0xEF, 0x7B, 0xDE,
    0x03, 0xFD, 0xEF, 0x7B, 0xDE, 0x04, 0xBD, 0xEF, 0x7B, 0xDE,
];

#[test]
fn example_data_matches_the_encoder() -> anyhow::Result<()> {
    use crate::structs::frame::FRAME_CHANNELS;

    let mut encoder = encode::StreamEncoder::new(Vec::new());
    encoder.write_frame(&[0; FRAME_CHANNELS])?;
    encoder.write_frame(&[0; FRAME_CHANNELS])?;

    assert_eq!(encoder.into_writer(), EXAMPLE_DATA);
    Ok(())
}
