//! Hand-rolled tile encoder for building test input.
//!
//! Encodes just enough of the MVT protobuf schema to synthesize fixtures;
//! deliberately independent of the crate's decoder so tests do not verify
//! the decoder against itself.

#![allow(dead_code)]

pub fn varint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
}

pub fn field(number: u32, wire_type: u8, out: &mut Vec<u8>) {
    varint(u64::from(number) << 3 | u64::from(wire_type), out);
}

pub fn len_field(number: u32, payload: &[u8], out: &mut Vec<u8>) {
    field(number, 2, out);
    varint(payload.len() as u64, out);
    out.extend_from_slice(payload);
}

pub fn string_value(s: &str) -> Vec<u8> {
    let mut out = Vec::new();
    len_field(1, s.as_bytes(), &mut out);
    out
}

pub fn double_value(value: f64) -> Vec<u8> {
    let mut out = Vec::new();
    field(3, 1, &mut out);
    out.extend_from_slice(&value.to_bits().to_le_bytes());
    out
}

pub fn int_value(value: u64) -> Vec<u8> {
    let mut out = Vec::new();
    field(4, 0, &mut out);
    varint(value, &mut out);
    out
}

pub fn bool_value(value: bool) -> Vec<u8> {
    let mut out = Vec::new();
    field(7, 0, &mut out);
    varint(u64::from(value), &mut out);
    out
}

/// Encodes a feature with a token geometry so fixtures resemble real tiles.
pub fn feature(id: u64, geom_type: u64, tags: &[u32]) -> Vec<u8> {
    let mut out = Vec::new();
    field(1, 0, &mut out);
    varint(id, &mut out);

    let mut packed = Vec::new();
    for &tag in tags {
        varint(u64::from(tag), &mut packed);
    }
    len_field(2, &packed, &mut out);

    field(3, 0, &mut out);
    varint(geom_type, &mut out);

    // MoveTo(1, 1)
    let mut geometry = Vec::new();
    for command in [9u64, 2, 2] {
        varint(command, &mut geometry);
    }
    len_field(4, &geometry, &mut out);
    out
}

pub fn layer(name: &str, keys: &[&str], values: &[Vec<u8>], features: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    len_field(1, name.as_bytes(), &mut out);
    for feature in features {
        len_field(2, feature, &mut out);
    }
    for key in keys {
        len_field(3, key.as_bytes(), &mut out);
    }
    for value in values {
        len_field(4, value, &mut out);
    }
    field(5, 0, &mut out);
    varint(4096, &mut out);
    field(15, 0, &mut out);
    varint(2, &mut out);
    out
}

pub fn tile(layers: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    for layer in layers {
        len_field(3, layer, &mut out);
    }
    out
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("in-memory gzip");
    encoder.finish().expect("in-memory gzip")
}
