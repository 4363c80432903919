//! Core aggregation engine - TileStats with an ingest/merge API.
//!
//! [`TileStats`] consumes tile buffers one at a time and folds their layers
//! into a running aggregate. Ingestion is atomic per buffer: a buffer that
//! fails to decode leaves the aggregate untouched.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::config::StatsConfig;
use crate::error::GeostatsError;
use crate::mvt::{self, GeomType, Layer, PropValue};
use crate::report::{AttributeStats, AttributeType, AttributeValue, LayerStats, TileStatsReport};
use crate::util;
use crate::value::TileValue;

/// A statistics accumulator over Mapbox Vector Tile buffers.
///
/// `TileStats` ingests buffers via [`add_buffer`](TileStats::add_buffer) (or
/// the typed [`add_tile`](TileStats::add_tile)), deduplicating layers by name
/// and attribute values by content across every tile seen. Accumulators built
/// concurrently can be combined with [`merge`](TileStats::merge).
///
/// # Example
///
/// ```
/// use tilestats::{TileStats, TileValue};
///
/// let mut stats = TileStats::default();
///
/// // An empty buffer is a valid tile with zero layers.
/// let value = TileValue::blob(Vec::new());
/// stats.add_buffer(Some(&value))?;
/// assert_eq!(stats.tile_count(), 1);
///
/// // Values that are not buffers are rejected with stable messages.
/// let err = stats.add_buffer(Some(&TileValue::Integer(15))).unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     "Value passed into \"addBuffer\" is not a buffer"
/// );
/// # Ok::<(), tilestats::GeostatsError>(())
/// ```
#[derive(Debug)]
pub struct TileStats {
    config: StatsConfig,
    tile_count: u64,
    layers: BTreeMap<String, LayerAccumulator>,
    layers_truncated: bool,
}

impl TileStats {
    /// Creates a new accumulator with the given configuration.
    pub fn new(config: StatsConfig) -> Self {
        Self {
            config,
            tile_count: 0,
            layers: BTreeMap::new(),
            layers_truncated: false,
        }
    }

    /// Ingests one value as it arrived from a tile source.
    ///
    /// This is the loosely-typed entry point: tile data read out of an
    /// archive may be absent or of the wrong storage class, and both cases
    /// must be reportable without touching the aggregate.
    ///
    /// # Errors
    ///
    /// - [`GeostatsError::MissingValue`] if `value` is `None`
    /// - [`GeostatsError::NotABuffer`] if `value` is not a [`TileValue::Blob`]
    /// - [`GeostatsError::InvalidTile`] if the buffer does not decode as a
    ///   vector tile
    pub fn add_buffer(&mut self, value: Option<&TileValue>) -> Result<(), GeostatsError> {
        match value {
            None => Err(GeostatsError::MissingValue),
            Some(TileValue::Blob(data)) => self.add_tile(data),
            Some(other) => {
                debug!(value_type = other.type_name(), "ingestion value rejected");
                Err(GeostatsError::NotABuffer)
            }
        }
    }

    /// Ingests one tile buffer, raw or gzip-compressed.
    ///
    /// Gzip input is detected by its magic bytes and inflated transparently.
    /// On error the aggregate is unchanged.
    pub fn add_tile(&mut self, buf: &[u8]) -> Result<(), GeostatsError> {
        if util::is_gzipped(buf) {
            return self.add_gzipped(buf);
        }
        self.ingest_decoded(buf)
    }

    #[cfg(feature = "gzip")]
    fn add_gzipped(&mut self, buf: &[u8]) -> Result<(), GeostatsError> {
        let mut scratch = crate::buffer::ScratchBuffer::take();
        util::gunzip(buf, scratch.vec_mut()).map_err(|e| {
            debug!(error = %e, "gzip stream failed to inflate");
            GeostatsError::InvalidTile
        })?;
        self.ingest_decoded(scratch.as_slice())
    }

    #[cfg(not(feature = "gzip"))]
    fn add_gzipped(&mut self, _buf: &[u8]) -> Result<(), GeostatsError> {
        debug!("gzipped tile rejected: built without gzip support");
        Err(GeostatsError::InvalidTile)
    }

    fn ingest_decoded(&mut self, buf: &[u8]) -> Result<(), GeostatsError> {
        let tile = mvt::decode_tile(buf).map_err(|e| {
            debug!(error = %e, len = buf.len(), "tile rejected");
            GeostatsError::InvalidTile
        })?;

        // Decoding validated the whole buffer; folding cannot fail, so the
        // aggregate never observes a partial tile.
        self.tile_count += 1;
        for layer in &tile.layers {
            self.fold_layer(layer);
        }
        Ok(())
    }

    fn fold_layer(&mut self, layer: &Layer<'_>) {
        trace!(
            layer = layer.name,
            version = layer.version,
            extent = layer.extent,
            features = layer.features.len(),
            "folding layer"
        );

        if !self.layers.contains_key(layer.name) {
            if self.layers.len() >= self.config.max_layers() {
                if !self.layers_truncated {
                    debug!(
                        cap = self.config.max_layers(),
                        layer = layer.name,
                        "layer cap reached, further layers untracked"
                    );
                    self.layers_truncated = true;
                }
                return;
            }
            self.layers
                .insert(layer.name.to_string(), LayerAccumulator::new());
        }
        if let Some(accumulator) = self.layers.get_mut(layer.name) {
            accumulator.fold(layer, &self.config);
        }
    }

    /// Combines another accumulator into this one.
    ///
    /// Both sides are assumed to use the same caps; this accumulator's
    /// configuration is the one enforced.
    pub fn merge(&mut self, other: TileStats) {
        self.tile_count += other.tile_count;
        self.layers_truncated |= other.layers_truncated;

        for (name, other_layer) in other.layers {
            match self.layers.get_mut(&name) {
                Some(accumulator) => accumulator.merge(other_layer, &self.config),
                None => {
                    if self.layers.len() >= self.config.max_layers() {
                        self.layers_truncated = true;
                        continue;
                    }
                    self.layers.insert(name, other_layer);
                }
            }
        }
    }

    /// Returns the number of tile buffers successfully ingested.
    pub fn tile_count(&self) -> u64 {
        self.tile_count
    }

    /// Returns the number of distinct layers tracked.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Returns true if nothing has been ingested.
    pub fn is_empty(&self) -> bool {
        self.tile_count == 0
    }

    /// Returns the configuration used by this accumulator.
    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Builds a serializable snapshot of the aggregate.
    pub fn report(&self) -> TileStatsReport {
        let layers: Vec<LayerStats> = self
            .layers
            .iter()
            .map(|(name, accumulator)| accumulator.to_stats(name))
            .collect();

        TileStatsReport {
            tile_count: self.tile_count,
            layer_count: layers.len(),
            layers,
        }
    }
}

impl Default for TileStats {
    fn default() -> Self {
        Self::new(StatsConfig::default())
    }
}

#[derive(Debug)]
struct LayerAccumulator {
    feature_count: u64,
    /// Feature counts indexed by `GeomType::index`.
    geometry: [u64; 4],
    attributes: BTreeMap<String, AttributeAccumulator>,
    attributes_truncated: bool,
}

impl LayerAccumulator {
    fn new() -> Self {
        Self {
            feature_count: 0,
            geometry: [0; 4],
            attributes: BTreeMap::new(),
            attributes_truncated: false,
        }
    }

    fn fold(&mut self, layer: &Layer<'_>, config: &StatsConfig) {
        self.feature_count += layer.features.len() as u64;

        for feature in &layer.features {
            self.geometry[feature.geom_type.index()] += 1;

            for pair in feature.tags.chunks_exact(2) {
                // Indexes were range-checked by the decoder.
                let (Some(key), Some(value)) = (
                    layer.keys.get(pair[0] as usize),
                    layer.values.get(pair[1] as usize),
                ) else {
                    continue;
                };
                self.record_attribute(key, value, config);
            }
        }
    }

    fn record_attribute(&mut self, key: &str, value: &PropValue<'_>, config: &StatsConfig) {
        if !self.attributes.contains_key(key) {
            if self.attributes.len() >= config.max_attributes() {
                if !self.attributes_truncated {
                    debug!(
                        cap = config.max_attributes(),
                        attribute = key,
                        "attribute cap reached, further attributes untracked"
                    );
                    self.attributes_truncated = true;
                }
                return;
            }
            self.attributes
                .insert(key.to_string(), AttributeAccumulator::new());
        }
        if let Some(accumulator) = self.attributes.get_mut(key) {
            accumulator.record(key, value, config);
        }
    }

    fn merge(&mut self, other: LayerAccumulator, config: &StatsConfig) {
        self.feature_count += other.feature_count;
        for (slot, count) in self.geometry.iter_mut().zip(other.geometry) {
            *slot += count;
        }
        self.attributes_truncated |= other.attributes_truncated;

        for (key, other_attribute) in other.attributes {
            match self.attributes.get_mut(&key) {
                Some(accumulator) => accumulator.merge(other_attribute, config),
                None => {
                    if self.attributes.len() >= config.max_attributes() {
                        self.attributes_truncated = true;
                        continue;
                    }
                    self.attributes.insert(key, other_attribute);
                }
            }
        }
    }

    fn to_stats(&self, name: &str) -> LayerStats {
        let attributes: Vec<AttributeStats> = self
            .attributes
            .iter()
            .map(|(key, accumulator)| accumulator.to_stats(key))
            .collect();

        LayerStats {
            layer: name.to_string(),
            count: self.feature_count,
            geometry: dominant_geometry(&self.geometry).name().to_string(),
            attribute_count: attributes.len(),
            attributes,
        }
    }
}

#[derive(Debug)]
struct AttributeAccumulator {
    values: BTreeSet<AttributeValue>,
    values_truncated: bool,
    seen_string: bool,
    seen_number: bool,
    seen_boolean: bool,
    min: Option<f64>,
    max: Option<f64>,
}

impl AttributeAccumulator {
    fn new() -> Self {
        Self {
            values: BTreeSet::new(),
            values_truncated: false,
            seen_string: false,
            seen_number: false,
            seen_boolean: false,
            min: None,
            max: None,
        }
    }

    fn record(&mut self, key: &str, value: &PropValue<'_>, config: &StatsConfig) {
        let recorded = match value {
            PropValue::String(s) => {
                self.seen_string = true;
                AttributeValue::String(truncate_value(s, config.max_value_length()))
            }
            PropValue::Float(v) => self.record_number(f64::from(*v)),
            PropValue::Double(v) => self.record_number(*v),
            PropValue::Int(v) => self.record_number(*v as f64),
            PropValue::Uint(v) => self.record_number(*v as f64),
            PropValue::Sint(v) => self.record_number(*v as f64),
            PropValue::Bool(b) => {
                self.seen_boolean = true;
                AttributeValue::Boolean(*b)
            }
        };

        let truncated_before = self.values_truncated;
        self.insert_value(recorded, config.max_values());
        if self.values_truncated && !truncated_before {
            debug!(
                cap = config.max_values(),
                attribute = key,
                "value cap reached, sample truncated"
            );
        }
    }

    fn record_number(&mut self, value: f64) -> AttributeValue {
        self.seen_number = true;
        // NaN never becomes a bound.
        if !value.is_nan() {
            self.min = Some(self.min.map_or(value, |current| current.min(value)));
            self.max = Some(self.max.map_or(value, |current| current.max(value)));
        }
        AttributeValue::Number(value)
    }

    fn insert_value(&mut self, value: AttributeValue, max_values: usize) {
        if self.values.contains(&value) {
            return;
        }
        if self.values.len() >= max_values {
            self.values_truncated = true;
            return;
        }
        self.values.insert(value);
    }

    fn merge(&mut self, other: AttributeAccumulator, config: &StatsConfig) {
        self.seen_string |= other.seen_string;
        self.seen_number |= other.seen_number;
        self.seen_boolean |= other.seen_boolean;
        self.values_truncated |= other.values_truncated;

        self.min = merge_bound(self.min, other.min, f64::min);
        self.max = merge_bound(self.max, other.max, f64::max);

        for value in other.values {
            self.insert_value(value, config.max_values());
        }
    }

    fn kind(&self) -> AttributeType {
        match (self.seen_string, self.seen_number, self.seen_boolean) {
            (true, false, false) => AttributeType::String,
            (false, true, false) => AttributeType::Number,
            (false, false, true) => AttributeType::Boolean,
            (false, false, false) => AttributeType::Null,
            _ => AttributeType::Mixed,
        }
    }

    fn to_stats(&self, key: &str) -> AttributeStats {
        AttributeStats {
            attribute: key.to_string(),
            count: self.values.len(),
            kind: self.kind(),
            values: self.values.iter().cloned().collect(),
            min: self.min,
            max: self.max,
        }
    }
}

/// Combines two optional numeric bounds.
fn merge_bound(a: Option<f64>, b: Option<f64>, pick: fn(f64, f64) -> f64) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(pick(a, b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Picks the layer's dominant geometry; concrete types win ties over Unknown.
fn dominant_geometry(counts: &[u64; 4]) -> GeomType {
    let mut best = GeomType::Unknown;
    let mut best_count = 0;
    for index in [1, 2, 3, 0] {
        if counts[index] > best_count {
            best = GeomType::from_index(index);
            best_count = counts[index];
        }
    }
    best
}

/// Truncates a string to at most `max` bytes on a character boundary.
fn truncate_value(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_value() {
        let mut stats = TileStats::default();
        let err = stats.add_buffer(None).unwrap_err();
        assert!(matches!(err, GeostatsError::MissingValue));
        assert!(stats.is_empty());
    }

    #[test]
    fn test_non_buffer_values() {
        let mut stats = TileStats::default();
        for value in [
            TileValue::Integer(15),
            TileValue::Real(1.5),
            TileValue::Text("tile".to_string()),
            TileValue::Null,
        ] {
            let err = stats.add_buffer(Some(&value)).unwrap_err();
            assert!(matches!(err, GeostatsError::NotABuffer));
        }
        assert!(stats.is_empty());
    }

    #[test]
    fn test_invalid_blob_leaves_aggregate_unchanged() {
        let mut stats = TileStats::default();
        let value = TileValue::blob(&b"I am not a vector tile"[..]);
        let err = stats.add_buffer(Some(&value)).unwrap_err();
        assert!(matches!(err, GeostatsError::InvalidTile));
        assert_eq!(stats.tile_count(), 0);
        assert_eq!(stats.layer_count(), 0);
    }

    #[test]
    fn test_empty_buffer_is_valid() {
        let mut stats = TileStats::default();
        stats.add_tile(&[]).unwrap();
        assert_eq!(stats.tile_count(), 1);
        assert_eq!(stats.layer_count(), 0);
        assert!(!stats.is_empty());
    }

    #[test]
    fn test_dominant_geometry() {
        assert_eq!(dominant_geometry(&[0, 0, 0, 0]), GeomType::Unknown);
        assert_eq!(dominant_geometry(&[5, 1, 0, 0]), GeomType::Unknown);
        assert_eq!(dominant_geometry(&[1, 2, 0, 7]), GeomType::Polygon);
        // a concrete type wins a tie with Unknown
        assert_eq!(dominant_geometry(&[3, 3, 0, 0]), GeomType::Point);
    }

    #[test]
    fn test_truncate_value_char_boundary() {
        assert_eq!(truncate_value("short", 10), "short");
        assert_eq!(truncate_value("exact", 5), "exact");
        // 'é' is two bytes; cutting inside it backs up to the boundary
        assert_eq!(truncate_value("caféteria", 4), "caf");
        assert_eq!(truncate_value("caféteria", 5), "café");
    }
}
