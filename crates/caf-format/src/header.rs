//! CAF file header — the first 8 bytes of every `.caf` file.

use serde::{Deserialize, Serialize};

/// Magic bytes identifying a CAF file: `caff` (0x63616666)
pub const CAF_MAGIC: [u8; 4] = *b"caff";

/// Size of the fixed file header in bytes
pub const FILE_HEADER_SIZE: usize = 8;

/// Size of a chunk header (4-byte tag + 8-byte size) in bytes
pub const CHUNK_HEADER_SIZE: usize = 12;

/// The fixed-size header at the beginning of every `.caf` file.
///
/// Layout (8 bytes, big-endian):
/// - `[0..4]` magic: `caff`
/// - `[4..6]` version: i16
/// - `[6..8]` flags: i16
///
/// The magic is validated on decode and emitted on encode but not
/// stored; version and flags are carried through verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHeader {
    /// Format version (1 for every file in the wild)
    pub version: i16,
    /// Format flags (reserved, normally 0)
    pub flags: i16,
}
