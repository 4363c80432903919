//! Tile structure decoding.
//!
//! Field numbers follow the MVT 2.1 schema. Decoding is strict at the tile
//! level (only `layers` may appear) and lenient below it (unknown fields in
//! layers, features, and values are skipped, so schema extensions do not
//! invalidate a tile).

use super::DecodeError;
use super::wire::{WireReader, WireType, decode_zigzag};

/// Layer versions this decoder understands.
const SUPPORTED_VERSIONS: std::ops::RangeInclusive<u32> = 1..=2;

/// Default layer extent when the field is absent.
const DEFAULT_EXTENT: u32 = 4096;

/// A feature's declared geometry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GeomType {
    Unknown,
    Point,
    LineString,
    Polygon,
}

impl GeomType {
    /// Maps the raw enum value; out-of-range values decode as `Unknown`.
    fn from_raw(raw: u64) -> Self {
        match raw {
            1 => GeomType::Point,
            2 => GeomType::LineString,
            3 => GeomType::Polygon,
            _ => GeomType::Unknown,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            GeomType::Unknown => "Unknown",
            GeomType::Point => "Point",
            GeomType::LineString => "LineString",
            GeomType::Polygon => "Polygon",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            GeomType::Unknown => 0,
            GeomType::Point => 1,
            GeomType::LineString => 2,
            GeomType::Polygon => 3,
        }
    }

    pub(crate) fn from_index(index: usize) -> Self {
        match index {
            1 => GeomType::Point,
            2 => GeomType::LineString,
            3 => GeomType::Polygon,
            _ => GeomType::Unknown,
        }
    }
}

/// A property value from a layer's value table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PropValue<'a> {
    String(&'a str),
    Float(f32),
    Double(f64),
    Int(i64),
    Uint(u64),
    Sint(i64),
    Bool(bool),
}

/// A decoded feature: tag pairs and declared geometry type.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Feature {
    /// Alternating key/value indexes into the layer tables.
    pub(crate) tags: Vec<u32>,
    pub(crate) geom_type: GeomType,
}

/// A decoded layer with its string and value tables.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Layer<'a> {
    pub(crate) name: &'a str,
    pub(crate) version: u32,
    pub(crate) extent: u32,
    pub(crate) keys: Vec<&'a str>,
    pub(crate) values: Vec<PropValue<'a>>,
    pub(crate) features: Vec<Feature>,
}

/// A decoded tile.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Tile<'a> {
    pub(crate) layers: Vec<Layer<'a>>,
}

/// Decodes a (decompressed) buffer as a vector tile.
///
/// An empty buffer is a valid tile with zero layers.
pub(crate) fn decode_tile(buf: &[u8]) -> Result<Tile<'_>, DecodeError> {
    let mut reader = WireReader::new(buf);
    let mut layers = Vec::new();

    while let Some((field, wire_type)) = reader.read_tag()? {
        match (field, wire_type) {
            (3, WireType::Len) => {
                let layer_buf = reader.read_len_slice()?;
                layers.push(decode_layer(layer_buf)?);
            }
            (field, _) => return Err(DecodeError::UnexpectedTileField(field)),
        }
    }

    Ok(Tile { layers })
}

fn decode_layer(buf: &[u8]) -> Result<Layer<'_>, DecodeError> {
    let mut reader = WireReader::new(buf);
    let mut name: Option<&str> = None;
    let mut version: Option<u32> = None;
    let mut extent: Option<u32> = None;
    let mut keys = Vec::new();
    let mut values = Vec::new();
    let mut features = Vec::new();

    while let Some((field, wire_type)) = reader.read_tag()? {
        match (field, wire_type) {
            (1, WireType::Len) => name = Some(reader.read_string()?),
            (2, WireType::Len) => {
                let feature_buf = reader.read_len_slice()?;
                features.push(decode_feature(feature_buf)?);
            }
            (3, WireType::Len) => keys.push(reader.read_string()?),
            (4, WireType::Len) => {
                let value_buf = reader.read_len_slice()?;
                values.push(decode_value(value_buf)?);
            }
            (5, WireType::Varint) => extent = Some(reader.read_varint()? as u32),
            (15, WireType::Varint) => version = Some(reader.read_varint()? as u32),
            (_, wire_type) => reader.skip(wire_type)?,
        }
    }

    let name = name.ok_or(DecodeError::MissingLayerName)?;
    let version = version.unwrap_or(1);
    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(DecodeError::UnsupportedLayerVersion(version));
    }

    // Tag indexes can only be checked once the tables are complete; fields
    // may arrive in any order.
    for feature in &features {
        if feature.tags.len() % 2 != 0 {
            return Err(DecodeError::OddTagCount);
        }
        for pair in feature.tags.chunks_exact(2) {
            if pair[0] as usize >= keys.len() || pair[1] as usize >= values.len() {
                return Err(DecodeError::TagOutOfRange);
            }
        }
    }

    Ok(Layer {
        name,
        version,
        extent: extent.unwrap_or(DEFAULT_EXTENT),
        keys,
        values,
        features,
    })
}

fn decode_feature(buf: &[u8]) -> Result<Feature, DecodeError> {
    let mut reader = WireReader::new(buf);
    let mut tags = Vec::new();
    let mut geom_type = GeomType::Unknown;

    while let Some((field, wire_type)) = reader.read_tag()? {
        match (field, wire_type) {
            (1, WireType::Varint) => {
                // Feature ids carry no statistical signal.
                reader.read_varint()?;
            }
            (2, WireType::Len) => {
                // Packed encoding (the standard form).
                let packed = reader.read_len_slice()?;
                let mut packed_reader = WireReader::new(packed);
                while !packed_reader.is_at_end() {
                    tags.push(packed_reader.read_varint()? as u32);
                }
            }
            (2, WireType::Varint) => {
                // Unpacked repeated scalar; legal on the wire.
                tags.push(reader.read_varint()? as u32);
            }
            (3, WireType::Varint) => geom_type = GeomType::from_raw(reader.read_varint()?),
            (4, WireType::Len) => {
                // Geometry command stream: wire-validated, never interpreted.
                reader.read_len_slice()?;
            }
            (_, wire_type) => reader.skip(wire_type)?,
        }
    }

    Ok(Feature { tags, geom_type })
}

fn decode_value(buf: &[u8]) -> Result<PropValue<'_>, DecodeError> {
    let mut reader = WireReader::new(buf);
    let mut value: Option<PropValue<'_>> = None;

    while let Some((field, wire_type)) = reader.read_tag()? {
        let decoded = match (field, wire_type) {
            (1, WireType::Len) => Some(PropValue::String(reader.read_string()?)),
            (2, WireType::Fixed32) => Some(PropValue::Float(f32::from_bits(reader.read_fixed32()?))),
            (3, WireType::Fixed64) => {
                Some(PropValue::Double(f64::from_bits(reader.read_fixed64()?)))
            }
            (4, WireType::Varint) => Some(PropValue::Int(reader.read_varint()? as i64)),
            (5, WireType::Varint) => Some(PropValue::Uint(reader.read_varint()?)),
            (6, WireType::Varint) => Some(PropValue::Sint(decode_zigzag(reader.read_varint()?))),
            (7, WireType::Varint) => Some(PropValue::Bool(reader.read_varint()? != 0)),
            (_, wire_type) => {
                reader.skip(wire_type)?;
                None
            }
        };

        if let Some(decoded) = decoded {
            if value.is_some() {
                return Err(DecodeError::MalformedValue);
            }
            value = Some(decoded);
        }
    }

    value.ok_or(DecodeError::MalformedValue)
}
