//! CAF stream decoder — parses a `.caf` byte stream into a [`CafFile`].
//!
//! Decoding is a single linear pass: the 8-byte file header is
//! validated first, then chunks are framed one after another until
//! the stream ends. Each chunk's payload is dispatched on its type
//! tag to the matching decoder; unrecognized tags are logged and
//! preserved as opaque bytes.
//!
//! # Example
//!
//! ```rust,no_run
//! use caf_format::CafFile;
//!
//! let bytes = std::fs::read("sample.caf").unwrap();
//! let file = CafFile::decode(&bytes[..]).unwrap();
//! println!("Chunks: {}", file.chunks.len());
//! ```

use std::io::{self, BufReader, Read};

use byteorder::{BigEndian, ReadBytesExt};

use crate::chunk::{
    AudioData, AudioDescription, CafFile, ChannelDescription, ChannelLayout, Chunk, ChunkHeader,
    ChunkPayload, FourCc, InfoString, Information, InformationEntry, PacketTable,
    SIZE_TO_END_OF_STREAM,
};
use crate::error::{CafError, Result};
use crate::header::{FileHeader, CAF_MAGIC};
use crate::varint::read_varint;

/// Maximum number of channel descriptions accepted in a `chan` chunk
/// (security limit).
const MAX_CHANNEL_DESCRIPTIONS: u32 = 4096;

/// Maximum number of key/value entries accepted in an `info` chunk
/// (security limit).
const MAX_INFO_ENTRIES: u32 = 65536;

/// Maximum number of packet table entries (security limit).
const MAX_PACKET_ENTRIES: i64 = 1 << 24;

impl CafFile {
    /// Decode a complete CAF file from a byte stream.
    ///
    /// Reads and validates the file header, then frames chunks until
    /// a clean end of stream. End of stream before the first byte of
    /// a chunk header terminates the sequence; end of stream anywhere
    /// else is a [`CafError::Truncated`] error.
    ///
    /// # Errors
    ///
    /// Returns [`CafError::InvalidMagic`] if the stream does not
    /// start with `caff`, [`CafError::Truncated`] on a short stream,
    /// and [`CafError::MalformedCount`] when a count field exceeds
    /// the crate's security limits.
    pub fn decode<R: Read>(reader: R) -> Result<Self> {
        let mut reader = BufReader::new(reader);

        let header = read_file_header(&mut reader)?;
        tracing::debug!(
            version = header.version,
            flags = header.flags,
            "Parsed CAF file header"
        );

        let mut chunks = Vec::new();
        while let Some(chunk) = read_chunk(&mut reader)? {
            tracing::debug!(
                tag = %chunk.header.tag,
                size = chunk.header.size,
                "Parsed chunk"
            );
            chunks.push(chunk);
        }
        tracing::debug!(count = chunks.len(), "Parsed chunk sequence");

        Ok(Self { header, chunks })
    }
}

/// Read and validate the 8-byte file header.
fn read_file_header<R: Read>(reader: &mut R) -> Result<FileHeader> {
    let mut magic = [0u8; 4];
    reader
        .read_exact(&mut magic)
        .map_err(|e| CafError::from_io(e, "file header"))?;
    if magic != CAF_MAGIC {
        return Err(CafError::InvalidMagic);
    }

    let version = reader
        .read_i16::<BigEndian>()
        .map_err(|e| CafError::from_io(e, "file header"))?;
    let flags = reader
        .read_i16::<BigEndian>()
        .map_err(|e| CafError::from_io(e, "file header"))?;

    Ok(FileHeader { version, flags })
}

/// Frame one chunk: the 12-byte header followed by its payload.
///
/// Returns `Ok(None)` on a clean end of stream before any header
/// byte; a stream ending anywhere inside the header or payload is a
/// truncation error.
fn read_chunk<R: Read>(reader: &mut R) -> Result<Option<Chunk>> {
    // The first tag byte is read separately so that end-of-sequence
    // can be told apart from a torn header.
    let mut tag = [0u8; 4];
    tag[0] = match reader.read_u8() {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(CafError::Io(e)),
    };
    reader
        .read_exact(&mut tag[1..])
        .map_err(|e| CafError::from_io(e, "chunk header"))?;
    let size = reader
        .read_i64::<BigEndian>()
        .map_err(|e| CafError::from_io(e, "chunk header"))?;

    let header = ChunkHeader {
        tag: FourCc(tag),
        size,
    };
    let payload = read_payload(reader, &header)?;
    Ok(Some(Chunk { header, payload }))
}

/// Dispatch on the chunk tag to the matching payload decoder.
///
/// Self-delimiting payloads (`desc`, `chan`, `info`, `pakt`) infer
/// their extent from internal structure and ignore the declared size;
/// blob payloads (`data`, `midi`, unknown) consume exactly what the
/// header declares.
fn read_payload<R: Read>(reader: &mut R, header: &ChunkHeader) -> Result<ChunkPayload> {
    match header.tag {
        FourCc::AUDIO_DESCRIPTION => Ok(ChunkPayload::AudioDescription(read_audio_description(
            reader,
        )?)),
        FourCc::CHANNEL_LAYOUT => Ok(ChunkPayload::ChannelLayout(read_channel_layout(reader)?)),
        FourCc::INFORMATION => Ok(ChunkPayload::Information(read_information(reader)?)),
        FourCc::AUDIO_DATA => Ok(ChunkPayload::AudioData(read_audio_data(
            reader,
            header.size,
        )?)),
        FourCc::PACKET_TABLE => Ok(ChunkPayload::PacketTable(read_packet_table(reader)?)),
        FourCc::MIDI => Ok(ChunkPayload::Midi(read_sized_blob(
            reader,
            header,
            "midi payload",
        )?)),
        _ => {
            tracing::debug!(
                tag = %header.tag,
                size = header.size,
                "Unknown chunk type, preserving raw bytes"
            );
            Ok(ChunkPayload::Unknown(read_sized_blob(
                reader,
                header,
                "unknown chunk payload",
            )?))
        }
    }
}

fn read_audio_description<R: Read>(reader: &mut R) -> Result<AudioDescription> {
    let ctx = "desc chunk";
    Ok(AudioDescription {
        sample_rate: reader
            .read_f64::<BigEndian>()
            .map_err(|e| CafError::from_io(e, ctx))?,
        format_id: read_fourcc(reader, ctx)?,
        format_flags: read_u32(reader, ctx)?,
        bytes_per_packet: read_u32(reader, ctx)?,
        frames_per_packet: read_u32(reader, ctx)?,
        channels_per_packet: read_u32(reader, ctx)?,
        bits_per_channel: read_u32(reader, ctx)?,
    })
}

fn read_channel_layout<R: Read>(reader: &mut R) -> Result<ChannelLayout> {
    let ctx = "chan chunk";
    let layout_tag = read_u32(reader, ctx)?;
    let channel_bitmap = read_u32(reader, ctx)?;
    let count = read_u32(reader, ctx)?;
    if count > MAX_CHANNEL_DESCRIPTIONS {
        return Err(CafError::MalformedCount {
            field: "channel descriptions",
            got: i64::from(count),
            max: i64::from(MAX_CHANNEL_DESCRIPTIONS),
        });
    }

    let mut descriptions = Vec::with_capacity(count as usize);
    for _ in 0..count {
        descriptions.push(ChannelDescription {
            label: read_u32(reader, ctx)?,
            flags: read_u32(reader, ctx)?,
            coordinates: [
                read_f32(reader, ctx)?,
                read_f32(reader, ctx)?,
                read_f32(reader, ctx)?,
            ],
        });
    }

    Ok(ChannelLayout {
        layout_tag,
        channel_bitmap,
        descriptions,
    })
}

fn read_information<R: Read>(reader: &mut R) -> Result<Information> {
    let count = read_u32(reader, "info chunk")?;
    if count > MAX_INFO_ENTRIES {
        return Err(CafError::MalformedCount {
            field: "information entries",
            got: i64::from(count),
            max: i64::from(MAX_INFO_ENTRIES),
        });
    }

    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let key = read_nul_string(reader)?;
        let value = read_nul_string(reader)?;
        entries.push(InformationEntry { key, value });
    }

    Ok(Information { entries })
}

fn read_audio_data<R: Read>(reader: &mut R, size: i64) -> Result<AudioData> {
    let edit_count = read_u32(reader, "data chunk")?;

    let data = if size == SIZE_TO_END_OF_STREAM {
        // Terminal chunk of a file recorded without a known length:
        // the blob runs to the end of the stream.
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        buf
    } else if size >= 4 {
        read_exact_blob(reader, (size - 4) as u64, "data chunk payload")?
    } else {
        return Err(CafError::InvalidChunkSize {
            tag: FourCc::AUDIO_DATA,
            size,
        });
    };

    Ok(AudioData { edit_count, data })
}

fn read_packet_table<R: Read>(reader: &mut R) -> Result<PacketTable> {
    let ctx = "pakt chunk";
    let number_packets = reader
        .read_i64::<BigEndian>()
        .map_err(|e| CafError::from_io(e, ctx))?;
    let number_valid_frames = reader
        .read_i64::<BigEndian>()
        .map_err(|e| CafError::from_io(e, ctx))?;
    let priming_frames = reader
        .read_i32::<BigEndian>()
        .map_err(|e| CafError::from_io(e, ctx))?;
    let remainder_frames = reader
        .read_i32::<BigEndian>()
        .map_err(|e| CafError::from_io(e, ctx))?;

    if !(0..=MAX_PACKET_ENTRIES).contains(&number_packets) {
        return Err(CafError::MalformedCount {
            field: "packet table entries",
            got: number_packets,
            max: MAX_PACKET_ENTRIES,
        });
    }

    // No count-sized pre-allocation: growth is bounded by the bytes
    // actually present in the stream.
    let mut entries = Vec::new();
    for _ in 0..number_packets {
        entries.push(read_varint(reader)?);
    }

    Ok(PacketTable {
        number_packets,
        number_valid_frames,
        priming_frames,
        remainder_frames,
        entries,
    })
}

// ---------------------------------------------------------------
// Primitive helpers
// ---------------------------------------------------------------

fn read_u32<R: Read>(reader: &mut R, context: &'static str) -> Result<u32> {
    reader
        .read_u32::<BigEndian>()
        .map_err(|e| CafError::from_io(e, context))
}

fn read_f32<R: Read>(reader: &mut R, context: &'static str) -> Result<f32> {
    reader
        .read_f32::<BigEndian>()
        .map_err(|e| CafError::from_io(e, context))
}

fn read_fourcc<R: Read>(reader: &mut R, context: &'static str) -> Result<FourCc> {
    let mut buf = [0u8; 4];
    reader
        .read_exact(&mut buf)
        .map_err(|e| CafError::from_io(e, context))?;
    Ok(FourCc(buf))
}

/// Read bytes up to and including a zero terminator. The terminator
/// is consumed but not part of the returned string. The bytes are
/// kept raw; the format does not promise any particular encoding.
fn read_nul_string<R: Read>(reader: &mut R) -> Result<InfoString> {
    let mut bytes = Vec::new();
    loop {
        let byte = reader
            .read_u8()
            .map_err(|e| CafError::from_io(e, "information string"))?;
        if byte == 0 {
            break;
        }
        bytes.push(byte);
    }
    Ok(InfoString(bytes))
}

/// Read exactly `len` bytes, bounded by `Read::take` so a hostile
/// length cannot force an allocation larger than the stream itself.
fn read_exact_blob<R: Read>(reader: &mut R, len: u64, context: &'static str) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let read = reader.by_ref().take(len).read_to_end(&mut buf)?;
    if read as u64 != len {
        return Err(CafError::Truncated { context });
    }
    Ok(buf)
}

/// Read a blob of exactly the declared chunk size (`midi` and unknown
/// chunks; the to-end-of-stream sentinel is not valid here).
fn read_sized_blob<R: Read>(
    reader: &mut R,
    header: &ChunkHeader,
    context: &'static str,
) -> Result<Vec<u8>> {
    if header.size < 0 {
        return Err(CafError::InvalidChunkSize {
            tag: header.tag,
            size: header.size,
        });
    }
    read_exact_blob(reader, header.size as u64, context)
}
