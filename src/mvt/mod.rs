//! Internal Mapbox Vector Tile decoder.
//!
//! Decodes the protobuf wire encoding of MVT 2.1 tiles far enough for
//! statistics: layers, features, and property tables. Geometry command
//! streams are carried as opaque bytes and never interpreted.
//!
//! This module is an implementation detail; all failures surface at the
//! public boundary as a single invalid-tile error.

mod tile;
mod wire;

pub(crate) use tile::{GeomType, Layer, PropValue, decode_tile};

use std::fmt;

/// Why a buffer failed to decode as a vector tile.
///
/// Only ever logged; the public API collapses every cause into
/// [`GeostatsError::InvalidTile`](crate::GeostatsError::InvalidTile).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DecodeError {
    /// Input ended in the middle of a field.
    Truncated,

    /// A varint ran past 10 bytes.
    VarintOverflow,

    /// Wire types 3 and 4 (groups) are not part of the format.
    ReservedWireType(u32),

    /// Field number 0 is not a legal protobuf tag.
    ZeroFieldNumber,

    /// A length-delimited field claimed more bytes than remain.
    LengthOutOfBounds,

    /// A layer name or string value was not valid UTF-8.
    InvalidUtf8,

    /// A tile message contained a field other than `layers`.
    UnexpectedTileField(u32),

    /// A layer was missing its required name.
    MissingLayerName,

    /// A layer declared a version this decoder does not understand.
    UnsupportedLayerVersion(u32),

    /// A feature's tag list had an odd number of entries.
    OddTagCount,

    /// A feature tag referenced a key or value index past the layer tables.
    TagOutOfRange,

    /// A property value message set zero or multiple of its value fields.
    MalformedValue,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Truncated => write!(f, "input truncated mid-field"),
            DecodeError::VarintOverflow => write!(f, "varint longer than 10 bytes"),
            DecodeError::ReservedWireType(wt) => write!(f, "reserved wire type {}", wt),
            DecodeError::ZeroFieldNumber => write!(f, "field number 0"),
            DecodeError::LengthOutOfBounds => {
                write!(f, "length-delimited field exceeds remaining input")
            }
            DecodeError::InvalidUtf8 => write!(f, "string field is not valid UTF-8"),
            DecodeError::UnexpectedTileField(field) => {
                write!(f, "unexpected tile-level field {}", field)
            }
            DecodeError::MissingLayerName => write!(f, "layer has no name"),
            DecodeError::UnsupportedLayerVersion(v) => {
                write!(f, "unsupported layer version {}", v)
            }
            DecodeError::OddTagCount => write!(f, "feature tags are not key/value pairs"),
            DecodeError::TagOutOfRange => {
                write!(f, "feature tag index out of range for layer tables")
            }
            DecodeError::MalformedValue => {
                write!(f, "property value must set exactly one value field")
            }
        }
    }
}
