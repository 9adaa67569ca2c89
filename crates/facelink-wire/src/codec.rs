//! Animation frame encoding and decoding

use bytes::{Buf, BufMut, Bytes, BytesMut};

use facelink_core::{FacelinkError, FacelinkResult, CHANNEL_COUNT};
use facelink_state::{AnimationFrame, FrameIdentity, DEFAULT_FILTER_SIZE};

use crate::header::{locate_identity, LiveLinkHeader, CHANNEL_DATA_SIZE, COUNT_SIZE};

/// Result of decoding a received message
#[derive(Debug, Clone)]
pub struct Decoded {
    /// Whether the message carried face data
    pub found: bool,
    /// Decoded frame, or a default frame when nothing was found
    pub frame: AnimationFrame,
}

impl Decoded {
    fn not_found() -> Self {
        Decoded {
            found: false,
            frame: AnimationFrame::default(),
        }
    }

    /// The frame, if one was found
    pub fn into_frame(self) -> Option<AnimationFrame> {
        self.found.then_some(self.frame)
    }
}

/// Serializes animation frames into LiveLink messages
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveLinkEncoder;

impl LiveLinkEncoder {
    /// Encode the current values and timing of `frame`
    pub fn encode(frame: &AnimationFrame) -> Bytes {
        let header = header_of(frame);
        let mut buf =
            BytesMut::with_capacity(header.serialized_size() + COUNT_SIZE + CHANNEL_DATA_SIZE);

        header.serialize(&mut buf);
        buf.put_u8(CHANNEL_COUNT as u8);
        for &value in frame.values() {
            buf.put_f32(value);
        }

        buf.freeze()
    }

    /// Size of the message `encode` produces for `frame`
    pub fn encoded_size(frame: &AnimationFrame) -> usize {
        header_of(frame).serialized_size() + COUNT_SIZE + CHANNEL_DATA_SIZE
    }
}

fn header_of(frame: &AnimationFrame) -> LiveLinkHeader {
    LiveLinkHeader {
        version: frame.version(),
        id: frame.id().to_string(),
        name: frame.name().to_string(),
        timecode: frame.timecode(),
        fps: frame.fps(),
        denominator: frame.denominator(),
    }
}

/// Parses LiveLink messages back into animation frames
#[derive(Debug, Clone, Copy)]
pub struct LiveLinkDecoder {
    filter_size: usize,
}

impl LiveLinkDecoder {
    pub fn new() -> Self {
        LiveLinkDecoder {
            filter_size: DEFAULT_FILTER_SIZE,
        }
    }

    /// Filter window given to decoded frames
    pub fn with_filter_size(filter_size: usize) -> Self {
        LiveLinkDecoder {
            filter_size: filter_size.max(1),
        }
    }

    /// Decode a message.
    ///
    /// Any readable header whose channel count is not 61 is an error, even
    /// when the body is cut short. Payloads too short to reach the count
    /// byte, or a 61-channel header with the wrong body length, decode to
    /// `found == false`.
    pub fn decode(&self, data: &[u8]) -> FacelinkResult<Decoded> {
        let Some(id_len) = locate_identity(data) else {
            tracing::trace!(len = data.len(), "LiveLink payload carries no face");
            return Ok(Decoded::not_found());
        };

        let (header, count_at) = match LiveLinkHeader::parse(data, id_len) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(error = %e, "Malformed LiveLink header");
                return Ok(Decoded::not_found());
            }
        };

        let Some(&count) = data.get(count_at) else {
            return Ok(Decoded::not_found());
        };
        if usize::from(count) != CHANNEL_COUNT {
            return Err(FacelinkError::ChannelCount {
                expected: CHANNEL_COUNT,
                actual: count,
            });
        }

        let mut buf = &data[count_at + COUNT_SIZE..];
        if buf.remaining() != CHANNEL_DATA_SIZE {
            tracing::debug!(
                expected = CHANNEL_DATA_SIZE,
                actual = buf.remaining(),
                "LiveLink channel block has the wrong size"
            );
            return Ok(Decoded::not_found());
        }

        let mut values = [0.0f32; CHANNEL_COUNT];
        for value in values.iter_mut() {
            *value = buf.get_f32();
        }

        let built = AnimationFrame::builder()
            .identity(FrameIdentity::new(header.id, header.name))
            .version(header.version)
            .fps(header.fps)
            .denominator(header.denominator)
            .frame_number(header.timecode.frame_number)
            .sub_frame(header.timecode.sub_frame)
            .filter_size(self.filter_size)
            .build();

        match built {
            Ok(mut frame) => {
                frame.set_values(values);
                Ok(Decoded { found: true, frame })
            }
            Err(e) => {
                tracing::debug!(error = %e, "Rejected LiveLink frame settings");
                Ok(Decoded::not_found())
            }
        }
    }
}

impl Default for LiveLinkDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode `frame` with the default encoder
pub fn encode(frame: &AnimationFrame) -> Bytes {
    LiveLinkEncoder::encode(frame)
}

/// Decode `data` with the default decoder
pub fn decode(data: &[u8]) -> FacelinkResult<Decoded> {
    LiveLinkDecoder::new().decode(data)
}
