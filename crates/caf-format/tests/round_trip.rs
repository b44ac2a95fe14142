//! End-to-end round-trip tests: a synthetic CAF file covering every
//! chunk kind must decode and re-encode to the identical byte stream.

use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use caf_format::{CafFile, ChunkPayload, FourCc, SIZE_TO_END_OF_STREAM};

/// Build a complete synthetic CAF file exercising every payload
/// decoder: desc, chan, info, pakt, midi, an unknown chunk, and a
/// terminal data chunk with the to-end-of-stream sentinel.
fn build_sample_caf() -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::new();

    // --- File header ---
    buf.write_all(b"caff").unwrap();
    buf.write_i16::<BigEndian>(1).unwrap(); // version
    buf.write_i16::<BigEndian>(0).unwrap(); // flags

    // --- desc chunk (fixed 32-byte payload) ---
    buf.write_all(b"desc").unwrap();
    buf.write_i64::<BigEndian>(32).unwrap();
    buf.write_f64::<BigEndian>(44100.0).unwrap(); // sample_rate
    buf.write_all(b"aac ").unwrap(); // format_id
    buf.write_u32::<BigEndian>(0).unwrap(); // format_flags
    buf.write_u32::<BigEndian>(0).unwrap(); // bytes_per_packet (variable)
    buf.write_u32::<BigEndian>(1024).unwrap(); // frames_per_packet
    buf.write_u32::<BigEndian>(2).unwrap(); // channels_per_packet
    buf.write_u32::<BigEndian>(0).unwrap(); // bits_per_channel

    // --- chan chunk (2 descriptions) ---
    buf.write_all(b"chan").unwrap();
    buf.write_i64::<BigEndian>(12 + 2 * 20).unwrap();
    buf.write_u32::<BigEndian>(0x640002).unwrap(); // layout_tag
    buf.write_u32::<BigEndian>(0).unwrap(); // channel_bitmap
    buf.write_u32::<BigEndian>(2).unwrap(); // description count
    for label in [1u32, 2] {
        buf.write_u32::<BigEndian>(label).unwrap();
        buf.write_u32::<BigEndian>(0).unwrap();
        for coord in [-1.0f32, 0.0, 1.0] {
            buf.write_f32::<BigEndian>(coord).unwrap();
        }
    }

    // --- info chunk (2 key/value pairs) ---
    let info_body = b"artist\0Helen Kane\0year\01930\0";
    buf.write_all(b"info").unwrap();
    buf.write_i64::<BigEndian>(4 + info_body.len() as i64).unwrap();
    buf.write_u32::<BigEndian>(2).unwrap();
    buf.write_all(info_body).unwrap();

    // --- pakt chunk (3 varint-sized packets) ---
    let packet_sizes = [0x7F, 0x81, 0x00, 0x05]; // 127, 128, 5
    buf.write_all(b"pakt").unwrap();
    buf.write_i64::<BigEndian>(24 + packet_sizes.len() as i64)
        .unwrap();
    buf.write_i64::<BigEndian>(3).unwrap(); // number_packets
    buf.write_i64::<BigEndian>(3072).unwrap(); // number_valid_frames
    buf.write_i32::<BigEndian>(2112).unwrap(); // priming_frames
    buf.write_i32::<BigEndian>(0).unwrap(); // remainder_frames
    buf.write_all(&packet_sizes).unwrap();

    // --- midi chunk ---
    buf.write_all(b"midi").unwrap();
    buf.write_i64::<BigEndian>(3).unwrap();
    buf.write_all(&[0x90, 0x40, 0x7F]).unwrap();

    // --- unknown chunk ---
    buf.write_all(b"zzzz").unwrap();
    buf.write_i64::<BigEndian>(5).unwrap();
    buf.write_all(&[0xDE, 0xAD, 0xBE, 0xEF, 0x00]).unwrap();

    // --- terminal data chunk, size sentinel ---
    buf.write_all(b"data").unwrap();
    buf.write_i64::<BigEndian>(SIZE_TO_END_OF_STREAM).unwrap();
    buf.write_u32::<BigEndian>(1).unwrap(); // edit_count
    buf.write_all(&[0x5A; 64]).unwrap();

    buf
}

#[test]
fn test_round_trip_is_byte_identical() {
    let original = build_sample_caf();

    let file = CafFile::decode(&original[..]).expect("decode should succeed");
    assert_eq!(file.chunks.len(), 7);

    let mut output = Vec::new();
    file.encode(&mut output).expect("encode should succeed");

    assert_eq!(
        output.len(),
        original.len(),
        "re-encoded length differs: before {} after {}",
        original.len(),
        output.len()
    );
    for (offset, (a, b)) in original.iter().zip(output.iter()).enumerate() {
        assert_eq!(a, b, "bytes differ starting at offset {offset}");
    }
}

#[test]
fn test_decoded_structure() {
    let file = CafFile::decode(&build_sample_caf()[..]).unwrap();

    let tags: Vec<FourCc> = file.chunks.iter().map(|c| c.header.tag).collect();
    assert_eq!(
        tags,
        vec![
            FourCc::AUDIO_DESCRIPTION,
            FourCc::CHANNEL_LAYOUT,
            FourCc::INFORMATION,
            FourCc::PACKET_TABLE,
            FourCc::MIDI,
            FourCc(*b"zzzz"),
            FourCc::AUDIO_DATA,
        ]
    );

    match &file.chunks[0].payload {
        ChunkPayload::AudioDescription(desc) => {
            assert_eq!(desc.sample_rate, 44100.0);
            assert_eq!(desc.format_id, FourCc(*b"aac "));
            assert_eq!(desc.frames_per_packet, 1024);
        }
        other => panic!("wrong payload: {other:?}"),
    }
    match &file.chunks[3].payload {
        ChunkPayload::PacketTable(table) => {
            assert_eq!(table.entries, vec![127, 128, 5]);
            assert_eq!(table.priming_frames, 2112);
        }
        other => panic!("wrong payload: {other:?}"),
    }
    match &file.chunks[6].payload {
        ChunkPayload::AudioData(data) => {
            assert_eq!(data.edit_count, 1);
            assert_eq!(data.data, vec![0x5A; 64]);
        }
        other => panic!("wrong payload: {other:?}"),
    }
}

#[test]
fn test_round_trip_from_file_stream() {
    let original = build_sample_caf();

    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(&original).unwrap();
    tmp.flush().unwrap();

    let handle = std::fs::File::open(tmp.path()).unwrap();
    let file = CafFile::decode(handle).expect("decode from file stream should succeed");

    let mut output = Vec::new();
    file.encode(&mut output).unwrap();
    assert_eq!(output, original);
}

/// A small on-disk LPCM fixture: desc + info + free + sized data
/// chunk holding 96 frames of a 440 Hz stereo sine.
static SINE_CAF: &[u8] = include_bytes!("data/sine.caf");

#[test]
fn test_sample_file_round_trip() {
    assert!(!SINE_CAF.is_empty(), "testing with empty fixture");

    let file = CafFile::decode(SINE_CAF).expect("fixture should decode");
    assert!(file
        .chunks
        .iter()
        .any(|c| c.header.tag == FourCc::AUDIO_DESCRIPTION));

    let mut output = Vec::new();
    file.encode(&mut output).unwrap();

    assert_eq!(
        output.len(),
        SINE_CAF.len(),
        "re-encoded length differs: before {} after {}",
        SINE_CAF.len(),
        output.len()
    );
    for (offset, (a, b)) in SINE_CAF.iter().zip(output.iter()).enumerate() {
        assert_eq!(a, b, "bytes differ starting at offset {offset}");
    }
}

#[test]
fn test_info_non_utf8_round_trip() {
    // Info strings have no declared encoding; Latin-1 values seen in
    // the wild must survive decode and re-encode untouched.
    let mut buf: Vec<u8> = Vec::new();
    buf.write_all(b"caff").unwrap();
    buf.write_i16::<BigEndian>(1).unwrap();
    buf.write_i16::<BigEndian>(0).unwrap();

    let info_body = b"copyright\0\xA9 1930 Fleischer\0";
    buf.write_all(b"info").unwrap();
    buf.write_i64::<BigEndian>(4 + info_body.len() as i64).unwrap();
    buf.write_u32::<BigEndian>(1).unwrap();
    buf.write_all(info_body).unwrap();

    let file = CafFile::decode(&buf[..]).expect("non-UTF-8 info strings are valid");
    match &file.chunks[0].payload {
        ChunkPayload::Information(info) => {
            assert_eq!(info.entries[0].value.as_bytes(), b"\xA9 1930 Fleischer");
        }
        other => panic!("wrong payload: {other:?}"),
    }

    let mut output = Vec::new();
    file.encode(&mut output).unwrap();
    assert_eq!(output, buf);
}

#[test]
fn test_round_trip_with_explicit_data_size() {
    // Same file but with a sized data chunk instead of the sentinel,
    // followed by a trailing unknown chunk.
    let mut buf: Vec<u8> = Vec::new();
    buf.write_all(b"caff").unwrap();
    buf.write_i16::<BigEndian>(1).unwrap();
    buf.write_i16::<BigEndian>(0).unwrap();

    buf.write_all(b"data").unwrap();
    buf.write_i64::<BigEndian>(4 + 16).unwrap();
    buf.write_u32::<BigEndian>(0).unwrap();
    buf.write_all(&[0x11; 16]).unwrap();

    buf.write_all(b"free").unwrap();
    buf.write_i64::<BigEndian>(8).unwrap();
    buf.write_all(&[0u8; 8]).unwrap();

    let file = CafFile::decode(&buf[..]).unwrap();
    assert_eq!(file.chunks.len(), 2);
    assert!(matches!(
        &file.chunks[0].payload,
        ChunkPayload::AudioData(data) if data.data.len() == 16
    ));

    let mut output = Vec::new();
    file.encode(&mut output).unwrap();
    assert_eq!(output, buf);
}
