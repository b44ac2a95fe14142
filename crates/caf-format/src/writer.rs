//! CAF stream encoder — serializes a [`CafFile`] back into bytes.
//!
//! Encoding mirrors decode exactly: each chunk header is written with
//! its *stored* tag and size rather than a size recomputed from the
//! payload, so decode followed by encode reproduces the input
//! byte-for-byte. A caller that edits payload contents in memory is
//! responsible for reconciling `ChunkHeader::size` itself.

use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use crate::chunk::{
    AudioData, AudioDescription, CafFile, ChannelLayout, Chunk, ChunkPayload, InfoString,
    Information, PacketTable,
};
use crate::error::{CafError, Result};
use crate::header::CAF_MAGIC;
use crate::varint::write_varint;

impl CafFile {
    /// Encode the file header and every chunk, in original order, to
    /// the given stream.
    ///
    /// # Errors
    ///
    /// Returns [`CafError::CountMismatch`] if a packet table's
    /// declared packet count disagrees with its entry list, and
    /// [`CafError::Io`] on any stream write failure.
    pub fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&CAF_MAGIC)?;
        writer.write_i16::<BigEndian>(self.header.version)?;
        writer.write_i16::<BigEndian>(self.header.flags)?;

        for chunk in &self.chunks {
            tracing::trace!(tag = %chunk.header.tag, size = chunk.header.size, "Writing chunk");
            write_chunk(writer, chunk)?;
        }
        tracing::debug!(chunks = self.chunks.len(), "Encoded CAF file");
        Ok(())
    }
}

/// Write the 12-byte chunk header, then the payload matched
/// exhaustively on its variant.
fn write_chunk<W: Write>(writer: &mut W, chunk: &Chunk) -> Result<()> {
    writer.write_all(chunk.header.tag.as_bytes())?;
    writer.write_i64::<BigEndian>(chunk.header.size)?;

    match &chunk.payload {
        ChunkPayload::AudioDescription(desc) => write_audio_description(writer, desc),
        ChunkPayload::ChannelLayout(layout) => write_channel_layout(writer, layout),
        ChunkPayload::Information(info) => write_information(writer, info),
        ChunkPayload::AudioData(data) => write_audio_data(writer, data),
        ChunkPayload::PacketTable(table) => write_packet_table(writer, table),
        ChunkPayload::Midi(bytes) | ChunkPayload::Unknown(bytes) => {
            writer.write_all(bytes)?;
            Ok(())
        }
    }
}

fn write_audio_description<W: Write>(writer: &mut W, desc: &AudioDescription) -> Result<()> {
    writer.write_f64::<BigEndian>(desc.sample_rate)?;
    writer.write_all(desc.format_id.as_bytes())?;
    writer.write_u32::<BigEndian>(desc.format_flags)?;
    writer.write_u32::<BigEndian>(desc.bytes_per_packet)?;
    writer.write_u32::<BigEndian>(desc.frames_per_packet)?;
    writer.write_u32::<BigEndian>(desc.channels_per_packet)?;
    writer.write_u32::<BigEndian>(desc.bits_per_channel)?;
    Ok(())
}

fn write_channel_layout<W: Write>(writer: &mut W, layout: &ChannelLayout) -> Result<()> {
    writer.write_u32::<BigEndian>(layout.layout_tag)?;
    writer.write_u32::<BigEndian>(layout.channel_bitmap)?;
    // The count is derived from the description list, so header and
    // body can never disagree.
    writer.write_u32::<BigEndian>(layout.descriptions.len() as u32)?;
    for desc in &layout.descriptions {
        writer.write_u32::<BigEndian>(desc.label)?;
        writer.write_u32::<BigEndian>(desc.flags)?;
        for coord in desc.coordinates {
            writer.write_f32::<BigEndian>(coord)?;
        }
    }
    Ok(())
}

fn write_information<W: Write>(writer: &mut W, info: &Information) -> Result<()> {
    writer.write_u32::<BigEndian>(info.entries.len() as u32)?;
    for entry in &info.entries {
        write_nul_string(writer, &entry.key)?;
        write_nul_string(writer, &entry.value)?;
    }
    Ok(())
}

/// Write the raw string bytes followed by a single zero terminator.
/// Stored strings never contain the terminator themselves.
fn write_nul_string<W: Write>(writer: &mut W, s: &InfoString) -> Result<()> {
    writer.write_all(s.as_bytes())?;
    writer.write_u8(0)?;
    Ok(())
}

fn write_audio_data<W: Write>(writer: &mut W, data: &AudioData) -> Result<()> {
    writer.write_u32::<BigEndian>(data.edit_count)?;
    writer.write_all(&data.data)?;
    Ok(())
}

fn write_packet_table<W: Write>(writer: &mut W, table: &PacketTable) -> Result<()> {
    if table.number_packets < 0 || table.entries.len() as i64 != table.number_packets {
        return Err(CafError::CountMismatch {
            field: "packet table entries",
            declared: table.number_packets,
            actual: table.entries.len() as i64,
        });
    }

    writer.write_i64::<BigEndian>(table.number_packets)?;
    writer.write_i64::<BigEndian>(table.number_valid_frames)?;
    writer.write_i32::<BigEndian>(table.priming_frames)?;
    writer.write_i32::<BigEndian>(table.remainder_frames)?;
    for &entry in &table.entries {
        write_varint(writer, entry)?;
    }
    Ok(())
}
