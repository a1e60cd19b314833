use log::debug;

use crate::process::decode::{PACKET_LEN, PacketDecoder, SYNC_MARKER_MASK};
use crate::structs::frame::{DecodedSample, FRAME_CHANNELS, Frame};
use crate::utils::errors::{StreamError, SyncError};

/// Wire length of one full frame in bytes.
pub const FRAME_LEN: usize = PACKET_LEN * FRAME_CHANNELS;

/// Walks a captured byte buffer and yields complete frames.
///
/// The capture is an immutable snapshot taken after acquisition stopped;
/// the synchronizer keeps a read cursor and a dropped-byte count. It
/// first locates the packet-aligned, channel-1-aligned start of the
/// stream, then consumes one 40-byte window per frame. Any decode
/// failure inside a window abandons the whole frame and rescans byte by
/// byte for the next channel-1 packet boundary.
///
/// Iteration ends with a single `Err(BufferExhausted)` item once the
/// remaining bytes cannot hold a complete frame. That is the expected
/// terminal of every finite capture, not a fault; afterwards the
/// iterator yields `None`.
///
/// # Example
///
/// ```rust
/// use emgline::process::EXAMPLE_DATA;
/// use emgline::process::sync::FrameSynchronizer;
///
/// let report = FrameSynchronizer::new(EXAMPLE_DATA).run();
///
/// assert_eq!(report.frames.len(), 2);
/// assert_eq!(report.dropped_bytes, 0);
/// ```
#[derive(Debug)]
pub struct FrameSynchronizer<'a> {
    buffer: &'a [u8],
    cursor: usize,
    dropped_bytes: usize,
    decoder: PacketDecoder,
    locked: bool,
    finished: bool,
}

impl<'a> FrameSynchronizer<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::with_decoder(buffer, PacketDecoder::new())
    }

    pub fn with_decoder(buffer: &'a [u8], decoder: PacketDecoder) -> Self {
        Self {
            buffer,
            cursor: 0,
            dropped_bytes: 0,
            decoder,
            locked: false,
            finished: false,
        }
    }

    /// Bytes skipped while resynchronizing after decode failures.
    ///
    /// Leading noise consumed before the first lock is not counted.
    pub fn dropped_bytes(&self) -> usize {
        self.dropped_bytes
    }

    /// Current read position in the capture.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Drains the synchronizer into a [`StreamReport`].
    pub fn run(mut self) -> StreamReport {
        let mut frames = Vec::new();

        for item in &mut self {
            if let Ok(frame) = item {
                frames.push(frame);
            }
        }

        StreamReport {
            frames,
            dropped_bytes: self.dropped_bytes,
            bytes_consumed: self.cursor,
        }
    }

    /// Advances the cursor to the first sync-aligned byte.
    fn seek_packet_sync(&mut self) -> Result<(), StreamError> {
        while let Some(&byte) = self.buffer.get(self.cursor) {
            if byte & SYNC_MARKER_MASK == 0 {
                return Ok(());
            }
            self.cursor += 1;
        }

        Err(StreamError::BufferExhausted)
    }

    /// From a sync-aligned cursor, advances in whole packets until one
    /// decodes to channel 1, then rewinds onto it.
    fn seek_channel_one(&mut self) -> Result<(), StreamError> {
        loop {
            let window = self
                .buffer
                .get(self.cursor..self.cursor + PACKET_LEN)
                .ok_or(StreamError::BufferExhausted)?;
            self.cursor += PACKET_LEN;

            // A window that fails to decode is a non-match, not a fault.
            if let Ok(sample) = self.decoder.decode(window) {
                if sample.channel == 1 {
                    self.cursor -= PACKET_LEN;
                    return Ok(());
                }
            }
        }
    }

    /// Decodes the 8 packets of the window at the cursor.
    ///
    /// Callers guarantee a full frame remains; the channel tags must read
    /// exactly 1..=8 or the whole window is rejected.
    fn decode_frame(&self) -> Result<Frame, SyncError> {
        let mut samples = [DecodedSample::default(); FRAME_CHANNELS];

        for (index, slot) in samples.iter_mut().enumerate() {
            let start = self.cursor + index * PACKET_LEN;
            let sample = self.decoder.decode(&self.buffer[start..start + PACKET_LEN])?;

            let expected = index as u8 + 1;
            if sample.channel != expected {
                return Err(SyncError::ChannelOutOfOrder {
                    expected,
                    found: sample.channel,
                });
            }

            *slot = sample;
        }

        Ok(Frame { samples })
    }

    /// Byte-at-a-time forward scan for the next channel-1-aligned packet
    /// boundary. Every byte passed over counts as dropped.
    ///
    /// The scan is a pure function of the buffer and the failure offset,
    /// so rescanning from the same offset lands on the same recovery
    /// point with the same dropped-byte count.
    fn resync(&mut self) -> Result<(), StreamError> {
        self.cursor += 1;
        self.dropped_bytes += 1;

        loop {
            let &byte = self
                .buffer
                .get(self.cursor)
                .ok_or(StreamError::BufferExhausted)?;

            if byte & SYNC_MARKER_MASK == 0 {
                let window = self
                    .buffer
                    .get(self.cursor..self.cursor + PACKET_LEN)
                    .ok_or(StreamError::BufferExhausted)?;

                if matches!(self.decoder.decode(window), Ok(sample) if sample.channel == 1) {
                    return Ok(());
                }
            }

            self.cursor += 1;
            self.dropped_bytes += 1;
        }
    }
}

impl Iterator for FrameSynchronizer<'_> {
    type Item = Result<Frame, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if !self.locked {
            if let Err(error) = self
                .seek_packet_sync()
                .and_then(|()| self.seek_channel_one())
            {
                self.finished = true;
                return Some(Err(error));
            }
            self.locked = true;
        }

        loop {
            if self.cursor + FRAME_LEN > self.buffer.len() {
                self.finished = true;
                return Some(Err(StreamError::BufferExhausted));
            }

            match self.decode_frame() {
                Ok(frame) => {
                    self.cursor += FRAME_LEN;
                    return Some(Ok(frame));
                }
                Err(error) => {
                    debug!("lost sync at byte {}: {error}", self.cursor);
                    let dropped_before = self.dropped_bytes;

                    match self.resync() {
                        Ok(()) => debug!(
                            "regained sync at byte {} after dropping {} bytes",
                            self.cursor,
                            self.dropped_bytes - dropped_before
                        ),
                        Err(error) => {
                            self.finished = true;
                            return Some(Err(error));
                        }
                    }
                }
            }
        }
    }
}

/// Outcome of draining a capture: ordered frames plus the diagnostics the
/// caller reports.
#[derive(Debug, Clone, Default)]
pub struct StreamReport {
    pub frames: Vec<Frame>,
    pub dropped_bytes: usize,
    pub bytes_consumed: usize,
}

#[cfg(test)]
fn encode_frames(frames: &[[i32; FRAME_CHANNELS]]) -> Vec<u8> {
    use crate::process::encode::StreamEncoder;

    let mut encoder = StreamEncoder::new(Vec::new());
    for values in frames {
        encoder.write_frame(values).unwrap();
    }
    encoder.into_writer()
}

#[test]
fn clean_capture_decodes_every_frame() {
    let capture = encode_frames(&[[0; FRAME_CHANNELS]; 3]);
    assert_eq!(capture.len(), 3 * FRAME_LEN);

    let report = FrameSynchronizer::new(&capture).run();

    assert_eq!(report.frames.len(), 3);
    assert_eq!(report.dropped_bytes, 0);
    assert_eq!(report.bytes_consumed, capture.len());

    for frame in &report.frames {
        assert_eq!(frame.values(), [0; FRAME_CHANNELS]);
    }
}

#[test]
fn terminal_item_is_buffer_exhausted() {
    let capture = encode_frames(&[[0; FRAME_CHANNELS]]);
    let mut synchronizer = FrameSynchronizer::new(&capture);

    assert!(matches!(synchronizer.next(), Some(Ok(_))));
    assert_eq!(
        synchronizer.next(),
        Some(Err(StreamError::BufferExhausted))
    );
    assert_eq!(synchronizer.next(), None);
}

#[test]
fn recovers_from_a_deleted_byte() {
    // Three zero-valued frames with one byte deleted from the middle of
    // frame 2's channel-5 packet (byte 62 of the capture). The scan must
    // pass over everything up to frame 3's channel-1 packet at offset 79
    // of the shortened capture, dropping 79 - 40 = 39 bytes.
    let mut capture = encode_frames(&[[0; FRAME_CHANNELS]; 3]);
    capture.remove(62);

    let report = FrameSynchronizer::new(&capture).run();

    assert_eq!(report.frames.len(), 2);
    assert_eq!(report.dropped_bytes, 39);
    assert_eq!(report.bytes_consumed, capture.len());
}

#[test]
fn resynchronization_is_idempotent() {
    let mut capture = encode_frames(&[[0; FRAME_CHANNELS]; 3]);
    capture.remove(62);

    let first = FrameSynchronizer::new(&capture).run();
    let second = FrameSynchronizer::new(&capture).run();

    assert_eq!(first.dropped_bytes, second.dropped_bytes);
    assert_eq!(first.bytes_consumed, second.bytes_consumed);
    assert_eq!(first.frames, second.frames);
}

#[test]
fn short_capture_yields_no_frames() {
    let capture = [0x02u8, 0x7D, 0xEF];
    let mut synchronizer = FrameSynchronizer::new(&capture);

    assert_eq!(
        synchronizer.next(),
        Some(Err(StreamError::BufferExhausted))
    );
    assert_eq!(synchronizer.next(), None);
    assert_eq!(synchronizer.dropped_bytes(), 0);
}

#[test]
fn empty_capture_yields_no_frames() {
    let report = FrameSynchronizer::new(&[]).run();

    assert!(report.frames.is_empty());
    assert_eq!(report.dropped_bytes, 0);
    assert_eq!(report.bytes_consumed, 0);
}

#[test]
fn skips_leading_noise_before_first_lock() {
    // Marker-set garbage, then a stray channel-3 packet, then two clean
    // frames. Alignment consumes both without counting dropped bytes.
    let mut capture = vec![0xFFu8, 0xA5, 0xC3];
    capture.extend_from_slice(&crate::process::encode::encode_packet(3, 0x1234).unwrap());
    capture.extend(encode_frames(&[[7; FRAME_CHANNELS], [-7; FRAME_CHANNELS]]));

    let report = FrameSynchronizer::new(&capture).run();

    assert_eq!(report.frames.len(), 2);
    assert_eq!(report.dropped_bytes, 0);
    assert_eq!(report.frames[0].values(), [7; FRAME_CHANNELS]);
    assert_eq!(report.frames[1].values(), [-7; FRAME_CHANNELS]);
}

#[test]
fn frame_carries_ordered_channel_tags() {
    let values = [10, -20, 30, -40, 50, -60, 70, -80];
    let capture = encode_frames(&[values]);

    let report = FrameSynchronizer::new(&capture).run();

    assert_eq!(report.frames.len(), 1);
    let frame = &report.frames[0];
    for (index, sample) in frame.samples.iter().enumerate() {
        assert_eq!(sample.channel, index as u8 + 1);
        assert_eq!(sample.value, values[index]);
    }
}

#[test]
fn strict_mode_round_trips_clean_captures() {
    let capture = encode_frames(&[[123; FRAME_CHANNELS]; 2]);
    let report = FrameSynchronizer::with_decoder(&capture, PacketDecoder::strict()).run();

    assert_eq!(report.frames.len(), 2);
    assert_eq!(report.dropped_bytes, 0);
}
