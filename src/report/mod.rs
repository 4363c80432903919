//! Aggregated statistics report types.
//!
//! [`TileStatsReport`] is the serializable snapshot produced by
//! [`TileStats::report`](crate::TileStats::report). Field names follow the
//! geostats JSON convention (camelCase) so reports drop into existing
//! tooling unchanged.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Statistics aggregated across every ingested tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileStatsReport {
    /// Number of tile buffers ingested.
    pub tile_count: u64,

    /// Number of distinct layers tracked.
    pub layer_count: usize,

    /// Per-layer statistics, in lexicographic layer-name order.
    pub layers: Vec<LayerStats>,
}

/// Statistics for one layer, deduplicated across tiles by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerStats {
    /// Layer name.
    pub layer: String,

    /// Cumulative feature count across tiles.
    pub count: u64,

    /// Dominant geometry type name for the layer.
    pub geometry: String,

    /// Number of attributes recorded.
    pub attribute_count: usize,

    /// Per-attribute statistics, in lexicographic attribute-name order.
    pub attributes: Vec<AttributeStats>,
}

/// Statistics for one attribute within a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeStats {
    /// Attribute key.
    pub attribute: String,

    /// Number of distinct values recorded (bounded by the value cap).
    pub count: usize,

    /// Classification of the values seen.
    #[serde(rename = "type")]
    pub kind: AttributeType,

    /// The recorded distinct values, in sorted order.
    pub values: Vec<AttributeValue>,

    /// Smallest numeric value seen, tracked past the value cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Largest numeric value seen, tracked past the value cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Classification of the values an attribute has taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    /// Every value was a string.
    String,
    /// Every value was numeric.
    Number,
    /// Every value was a boolean.
    Boolean,
    /// Every value was null.
    Null,
    /// Values of more than one type were seen.
    Mixed,
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeType::String => "string",
            AttributeType::Number => "number",
            AttributeType::Boolean => "boolean",
            AttributeType::Null => "null",
            AttributeType::Mixed => "mixed",
        };
        f.write_str(name)
    }
}

/// A recorded attribute value.
///
/// Serializes untagged, so a report renders values as plain JSON scalars.
/// Ordering is total (numbers order by IEEE total ordering), which keeps
/// recorded value sets deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// A string value, possibly truncated to the configured length.
    String(String),
    /// Any numeric value, widened to f64.
    Number(f64),
    /// A boolean value.
    Boolean(bool),
    /// A null value.
    Null,
}

impl AttributeValue {
    fn rank(&self) -> u8 {
        match self {
            AttributeValue::String(_) => 0,
            AttributeValue::Number(_) => 1,
            AttributeValue::Boolean(_) => 2,
            AttributeValue::Null => 3,
        }
    }
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AttributeValue {}

impl PartialOrd for AttributeValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AttributeValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (AttributeValue::String(a), AttributeValue::String(b)) => a.cmp(b),
            (AttributeValue::Number(a), AttributeValue::Number(b)) => a.total_cmp(b),
            (AttributeValue::Boolean(a), AttributeValue::Boolean(b)) => a.cmp(b),
            (AttributeValue::Null, AttributeValue::Null) => Ordering::Equal,
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::String(s) => write!(f, "{:?}", s),
            AttributeValue::Number(n) => write!(f, "{}", n),
            AttributeValue::Boolean(b) => write!(f, "{}", b),
            AttributeValue::Null => f.write_str("null"),
        }
    }
}
