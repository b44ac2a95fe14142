//! Chunk types and payload variants for CAF files.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::header::FileHeader;

/// A four-byte identifier (FourCC), used both as the chunk type tag
/// and as the `desc` chunk's format ID.
///
/// Tags are opaque four-byte values and not necessarily printable
/// ASCII; the [`Display`](fmt::Display) impl falls back to hex for
/// non-printable tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    /// Audio format description chunk (`desc`)
    pub const AUDIO_DESCRIPTION: FourCc = FourCc(*b"desc");
    /// Channel layout chunk (`chan`)
    pub const CHANNEL_LAYOUT: FourCc = FourCc(*b"chan");
    /// Key/value information table chunk (`info`)
    pub const INFORMATION: FourCc = FourCc(*b"info");
    /// Audio data chunk (`data`)
    pub const AUDIO_DATA: FourCc = FourCc(*b"data");
    /// Packet table chunk (`pakt`)
    pub const PACKET_TABLE: FourCc = FourCc(*b"pakt");
    /// MIDI chunk (`midi`)
    pub const MIDI: FourCc = FourCc(*b"midi");

    /// The raw four bytes of the identifier.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            for b in self.0 {
                write!(f, "{}", b as char)?;
            }
            Ok(())
        } else {
            write!(
                f,
                "0x{:02X}{:02X}{:02X}{:02X}",
                self.0[0], self.0[1], self.0[2], self.0[3]
            )
        }
    }
}

/// Chunk size sentinel meaning "payload extends to the end of the
/// stream". Only the `data` chunk uses it in practice, as the last
/// chunk of a file still being recorded.
pub const SIZE_TO_END_OF_STREAM: i64 = -1;

/// The 12-byte header preceding every chunk payload.
///
/// Layout (big-endian):
/// - `[0..4]`  tag: FourCC
/// - `[4..12]` size: i64 payload byte count, excluding this header
///
/// `size` is either the exact payload length or
/// [`SIZE_TO_END_OF_STREAM`]. It is carried through verbatim on
/// encode, never recomputed from the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkHeader {
    /// Chunk type tag
    pub tag: FourCc,
    /// Declared payload size in bytes
    pub size: i64,
}

/// The `desc` chunk: fixed 32-byte audio format description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioDescription {
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Format identifier (e.g. `lpcm`, `aac `)
    pub format_id: FourCc,
    /// Format-specific flags
    pub format_flags: u32,
    /// Bytes per packet (0 if variable)
    pub bytes_per_packet: u32,
    /// Frames per packet (0 if variable)
    pub frames_per_packet: u32,
    /// Channels per packet
    pub channels_per_packet: u32,
    /// Bits per channel (0 for compressed formats)
    pub bits_per_channel: u32,
}

/// One 20-byte channel description inside a `chan` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelDescription {
    pub label: u32,
    pub flags: u32,
    pub coordinates: [f32; 3],
}

/// The `chan` chunk: channel layout plus per-channel descriptions.
///
/// The on-disk description count is derived from
/// `descriptions.len()` on encode, so it always matches the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelLayout {
    pub layout_tag: u32,
    pub channel_bitmap: u32,
    pub descriptions: Vec<ChannelDescription>,
}

/// A string stored in an `info` chunk.
///
/// The format does not mandate an encoding, so the bytes are kept
/// raw and round-trip untouched; [`Display`](fmt::Display) renders
/// them lossily as UTF-8. The on-disk NUL terminator is never part
/// of the stored bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InfoString(pub Vec<u8>);

impl InfoString {
    /// The raw string bytes, without any terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for InfoString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl From<&str> for InfoString {
    fn from(s: &str) -> Self {
        InfoString(s.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for InfoString {
    fn from(bytes: Vec<u8>) -> Self {
        InfoString(bytes)
    }
}

/// One key/value pair inside an `info` chunk.
///
/// Both strings are stored without their on-disk NUL terminator; the
/// encoder re-appends exactly one zero byte after each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InformationEntry {
    pub key: InfoString,
    pub value: InfoString,
}

/// The `info` chunk: an ordered key/value string table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Information {
    pub entries: Vec<InformationEntry>,
}

/// The `data` chunk: edit count plus the raw audio byte blob.
///
/// The blob is never interpreted; sample decoding is out of scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioData {
    pub edit_count: u32,
    pub data: Vec<u8>,
}

/// The `pakt` chunk: packet table header plus one varint-encoded byte
/// size per packet.
///
/// `number_packets` is stored verbatim from decode; the encoder
/// cross-checks it against `entries.len()` and refuses to write a
/// table whose header disagrees with its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketTable {
    pub number_packets: i64,
    pub number_valid_frames: i64,
    pub priming_frames: i32,
    pub remainder_frames: i32,
    /// Per-packet byte sizes
    pub entries: Vec<u64>,
}

/// A chunk payload, keyed by the header's type tag.
///
/// Unrecognized tags decode to [`ChunkPayload::Unknown`] and are
/// preserved byte-for-byte, which keeps the codec forward compatible
/// with chunk types it does not know about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChunkPayload {
    AudioDescription(AudioDescription),
    ChannelLayout(ChannelLayout),
    Information(Information),
    AudioData(AudioData),
    PacketTable(PacketTable),
    Midi(Vec<u8>),
    Unknown(Vec<u8>),
}

/// One chunk: its header paired with the decoded payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub header: ChunkHeader,
    pub payload: ChunkPayload,
}

/// A fully decoded CAF file: the file header and its ordered chunk
/// sequence.
///
/// Chunk order is semantically significant and preserved on encode.
/// Decode and encode live in the `reader` and `writer` modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CafFile {
    pub header: FileHeader,
    pub chunks: Vec<Chunk>,
}
