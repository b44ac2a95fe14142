//! Example: decode a `.caf` file, print its chunk layout, and prove
//! the re-encoded bytes are identical to the input.
//!
//! Usage: `cargo run --example round_trip -- path/to/file.caf`

use caf_format::{CafFile, ChunkPayload};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: round_trip <file.caf>")?;

    let original = std::fs::read(&path)?;
    println!("=== CAF Round-Trip ===\n");
    println!("Input:    {} ({} bytes)", path, original.len());

    let file = CafFile::decode(&original[..])?;
    println!(
        "Header:   version {}, flags {}\n",
        file.header.version, file.header.flags
    );

    for chunk in &file.chunks {
        let detail = match &chunk.payload {
            ChunkPayload::AudioDescription(desc) => format!(
                "{} @ {} Hz, {} ch",
                desc.format_id, desc.sample_rate, desc.channels_per_packet
            ),
            ChunkPayload::ChannelLayout(layout) => {
                format!("{} channel descriptions", layout.descriptions.len())
            }
            ChunkPayload::Information(info) => format!("{} entries", info.entries.len()),
            ChunkPayload::AudioData(data) => format!("{} audio bytes", data.data.len()),
            ChunkPayload::PacketTable(table) => format!("{} packets", table.entries.len()),
            ChunkPayload::Midi(bytes) => format!("{} MIDI bytes", bytes.len()),
            ChunkPayload::Unknown(bytes) => format!("{} opaque bytes", bytes.len()),
        };
        println!(
            "  {}  size {:>10}  {}",
            chunk.header.tag, chunk.header.size, detail
        );
    }

    let mut output = Vec::new();
    file.encode(&mut output)?;

    assert_eq!(original.len(), output.len(), "Size mismatch!");
    assert_eq!(original, output, "Byte mismatch!");

    println!("\n✓ Round-trip is byte-exact!");
    println!("✓ All {} bytes identical!", original.len());

    Ok(())
}
