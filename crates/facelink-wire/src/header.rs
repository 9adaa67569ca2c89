//! LiveLink message header
//!
//! Everything before the channel block. The identity has no length prefix,
//! so the parser has to locate where it ends (see [`locate_identity`]).

use bytes::{Buf, BufMut, BytesMut};

use facelink_core::{FacelinkError, FacelinkResult, CHANNEL_COUNT};
use facelink_state::{Timecode, IDENTITY_MARKER};

/// Version field size
pub const VERSION_SIZE: usize = 4;

/// Name length field size
pub const NAME_LEN_SIZE: usize = 4;

/// Frame number + sub-frame + fps + denominator
pub const TIMING_SIZE: usize = 16;

/// Channel count byte
pub const COUNT_SIZE: usize = 1;

/// Channel block size
pub const CHANNEL_DATA_SIZE: usize = CHANNEL_COUNT * 4;

/// Length of a `$` + hyphenated UUID identity, as sent by LiveLink devices
pub const STANDARD_IDENTITY_LEN: usize = 37;

/// Smallest message that can carry a face: 1-byte identity, empty name
pub const MIN_MESSAGE_SIZE: usize =
    VERSION_SIZE + 1 + NAME_LEN_SIZE + TIMING_SIZE + COUNT_SIZE + CHANNEL_DATA_SIZE;

/// Smallest payload that reaches the channel count byte
pub const MIN_HEADER_SIZE: usize = VERSION_SIZE + 1 + NAME_LEN_SIZE + TIMING_SIZE + COUNT_SIZE;

/// Largest message a single UDP datagram can carry
pub const MAX_MESSAGE_SIZE: usize = 65_507;

/// Size of a complete message for the given identity and name lengths
pub const fn message_size(id_len: usize, name_len: usize) -> usize {
    VERSION_SIZE + id_len + NAME_LEN_SIZE + name_len + TIMING_SIZE + COUNT_SIZE + CHANNEL_DATA_SIZE
}

/// Parsed header fields
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiveLinkHeader {
    pub version: u32,
    /// Identity including the leading `$`
    pub id: String,
    pub name: String,
    pub timecode: Timecode,
    pub fps: u32,
    pub denominator: u32,
}

impl LiveLinkHeader {
    /// Size of the header on the wire, up to (not including) the count byte
    pub fn serialized_size(&self) -> usize {
        VERSION_SIZE + self.id.len() + NAME_LEN_SIZE + self.name.len() + TIMING_SIZE
    }

    /// Append the header to `buf`
    pub fn serialize(&self, buf: &mut BytesMut) {
        buf.put_u32_le(self.version);
        buf.put_slice(self.id.as_bytes());
        buf.put_i32(self.name.len() as i32);
        buf.put_slice(self.name.as_bytes());
        buf.put_u32(self.timecode.frame_number);
        buf.put_u32(self.timecode.sub_frame);
        buf.put_u32(self.fps);
        buf.put_u32(self.denominator);
    }

    /// Parse a header whose identity is `id_len` bytes long.
    ///
    /// Returns the header and the offset of the channel count byte.
    pub fn parse(data: &[u8], id_len: usize) -> FacelinkResult<(Self, usize)> {
        let fixed = VERSION_SIZE + id_len + NAME_LEN_SIZE;
        if data.len() < fixed {
            return Err(FacelinkError::BufferTooShort {
                expected: fixed,
                actual: data.len(),
            });
        }

        let mut buf = data;
        let version = buf.get_u32_le();

        let id = std::str::from_utf8(&buf[..id_len])
            .map_err(|_| FacelinkError::InvalidWireFormat("Identity is not UTF-8".into()))?
            .to_string();
        if !id.starts_with(IDENTITY_MARKER) {
            return Err(FacelinkError::InvalidWireFormat(
                "Identity does not start with '$'".into(),
            ));
        }
        buf.advance(id_len);

        let name_len = buf.get_i32();
        if name_len < 0 {
            return Err(FacelinkError::InvalidWireFormat(format!(
                "Negative name length: {}",
                name_len
            )));
        }
        let name_len = name_len as usize;

        if buf.remaining() < name_len + TIMING_SIZE {
            return Err(FacelinkError::BufferTooShort {
                expected: fixed + name_len + TIMING_SIZE,
                actual: data.len(),
            });
        }

        let name = std::str::from_utf8(&buf[..name_len])
            .map_err(|_| FacelinkError::InvalidWireFormat("Name is not UTF-8".into()))?
            .to_string();
        buf.advance(name_len);

        let frame_number = buf.get_u32();
        let sub_frame = buf.get_u32();
        let fps = buf.get_u32();
        let denominator = buf.get_u32();

        let header = LiveLinkHeader {
            version,
            id,
            name,
            timecode: Timecode::new(frame_number, sub_frame),
            fps,
            denominator,
        };
        let consumed = data.len() - buf.remaining();
        Ok((header, consumed))
    }
}

/// How well a candidate identity length explains a message, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Fit {
    /// 61-channel count followed by exactly one channel block
    Full,
    /// 61-channel count with a truncated or padded body
    Truncated,
    /// Other count whose body is sized by the count or the fixed layout
    Sized,
    /// Any other readable count byte
    CountOnly,
}

/// Find the identity length of a message.
///
/// Every candidate length must yield a readable header: a `$`-prefixed
/// UTF-8 identity, a non-negative name length, a UTF-8 name and a count
/// byte. A complete 61-channel message wins outright; otherwise a
/// 61-channel header beats a body sized by some other count, which beats
/// any other readable count. Within a rank the standard UUID length is
/// tried first, then every other length in increasing order.
pub fn locate_identity(data: &[u8]) -> Option<usize> {
    if data.len() < MIN_HEADER_SIZE || data[VERSION_SIZE] != IDENTITY_MARKER as u8 {
        return None;
    }

    let max_id_len = data.len() - (MIN_HEADER_SIZE - 1);
    let candidates = std::iter::once(STANDARD_IDENTITY_LEN)
        .filter(|&len| len <= max_id_len)
        .chain((1..=max_id_len).filter(|&len| len != STANDARD_IDENTITY_LEN));

    let mut best: Option<(Fit, usize)> = None;
    for id_len in candidates {
        let Some(fit) = identity_fit(data, id_len) else {
            continue;
        };
        if fit == Fit::Full {
            return Some(id_len);
        }
        if best.map_or(true, |(rank, _)| fit < rank) {
            best = Some((fit, id_len));
        }
    }
    best.map(|(_, id_len)| id_len)
}

fn identity_fit(data: &[u8], id_len: usize) -> Option<Fit> {
    let name_len_at = VERSION_SIZE + id_len;
    let raw = data.get(name_len_at..name_len_at + NAME_LEN_SIZE)?;
    let name_len = i32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]);
    let name_len = usize::try_from(name_len).ok()?;

    let name_at = name_len_at + NAME_LEN_SIZE;
    let count_at = name_at + name_len + TIMING_SIZE;
    let &count = data.get(count_at)?;

    std::str::from_utf8(&data[VERSION_SIZE..name_len_at]).ok()?;
    std::str::from_utf8(&data[name_at..name_at + name_len]).ok()?;

    let body = data.len() - count_at - COUNT_SIZE;
    let full_count = usize::from(count) == CHANNEL_COUNT;
    let sized = body == usize::from(count) * 4 || body == CHANNEL_DATA_SIZE;
    let fit = match (full_count, sized) {
        (true, true) => Fit::Full,
        (true, false) => Fit::Truncated,
        (false, true) => Fit::Sized,
        (false, false) => Fit::CountOnly,
    };
    Some(fit)
}
