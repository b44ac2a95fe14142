//! # caf-format
//!
//! Reader and writer for the Core Audio Format (CAF) container.
//! Decodes a `.caf` byte stream into an in-memory chunk model and
//! re-encodes that model to the exact original bytes.
//!
//! ## Format Overview
//!
//! A `.caf` file consists of (all integers big-endian):
//! - **File header** (8 bytes): magic `caff`, version, flags
//! - **Chunks**: a sequence of `[4-byte tag][8-byte size][payload]`
//!   records until end of stream. Known tags are `desc`, `chan`,
//!   `info`, `data`, `pakt`, and `midi`; anything else is preserved
//!   as opaque bytes. A `data` chunk may declare size `-1`, meaning
//!   its payload runs to the end of the stream.
//!
//! Audio sample data is carried as an opaque blob and never
//! interpreted.
//!
//! ## Example
//! ```rust,no_run
//! use caf_format::CafFile;
//!
//! let bytes = std::fs::read("track.caf").unwrap();
//! let file = CafFile::decode(&bytes[..]).unwrap();
//!
//! let mut out = Vec::new();
//! file.encode(&mut out).unwrap();
//! assert_eq!(bytes, out); // byte-exact round trip
//! ```

pub mod chunk;
pub mod error;
pub mod header;
pub mod varint;

mod reader;
mod writer;

pub use chunk::*;
pub use error::CafError;
pub use header::*;
