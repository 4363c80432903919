//! Configuration for statistics aggregation.
//!
//! [`StatsConfig`] bounds how much an accumulator is allowed to remember.
//! Vector tilesets in the wild contain layers with millions of distinct
//! attribute values; the caps keep memory use and report size proportional to
//! what a stats consumer can actually use.
//!
//! # Example
//!
//! ```
//! use tilestats::StatsConfig;
//!
//! // Custom caps
//! let config = StatsConfig::new(100, 50, 10)?;
//!
//! // Builder pattern
//! let config = StatsConfig::default().with_max_values(25);
//! # Ok::<(), tilestats::GeostatsError>(())
//! ```

use crate::error::GeostatsError;

/// Default maximum number of layers tracked per accumulator.
pub const DEFAULT_MAX_LAYERS: usize = 1000;

/// Default maximum number of attributes tracked per layer.
pub const DEFAULT_MAX_ATTRIBUTES: usize = 1000;

/// Default maximum number of distinct values recorded per attribute.
pub const DEFAULT_MAX_VALUES: usize = 100;

/// Default maximum byte length of a stored string value.
pub const DEFAULT_MAX_VALUE_LENGTH: usize = 256;

/// Configuration for statistics aggregation behavior.
///
/// All caps apply to what is *recorded*, not to what is *counted*: feature
/// counts and numeric min/max keep updating after a cap is reached, while
/// additional layers/attributes/values are no longer materialized.
///
/// # Example
///
/// ```
/// use tilestats::StatsConfig;
///
/// let config = StatsConfig::new(500, 200, 50)?;
/// assert_eq!(config.max_values(), 50);
/// # Ok::<(), tilestats::GeostatsError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatsConfig {
    /// Maximum number of layers tracked.
    max_layers: usize,

    /// Maximum number of attributes tracked per layer.
    max_attributes: usize,

    /// Maximum number of distinct values recorded per attribute.
    max_values: usize,

    /// Maximum byte length of a stored string value.
    max_value_length: usize,
}

impl StatsConfig {
    /// Creates a new configuration with the specified caps.
    ///
    /// # Errors
    ///
    /// Returns [`GeostatsError::InvalidConfig`] if any cap is zero.
    pub fn new(
        max_layers: usize,
        max_attributes: usize,
        max_values: usize,
    ) -> Result<Self, GeostatsError> {
        let config = Self {
            max_layers,
            max_attributes,
            max_values,
            max_value_length: DEFAULT_MAX_VALUE_LENGTH,
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the maximum number of layers tracked.
    ///
    /// Note: This does not validate the configuration. Use
    /// [`StatsConfig::validate`] to check if the configuration is valid.
    pub fn with_max_layers(mut self, max: usize) -> Self {
        self.max_layers = max;
        self
    }

    /// Sets the maximum number of attributes tracked per layer.
    ///
    /// Note: This does not validate the configuration. Use
    /// [`StatsConfig::validate`] to check if the configuration is valid.
    pub fn with_max_attributes(mut self, max: usize) -> Self {
        self.max_attributes = max;
        self
    }

    /// Sets the maximum number of distinct values recorded per attribute.
    ///
    /// # Example
    ///
    /// ```
    /// use tilestats::StatsConfig;
    ///
    /// let config = StatsConfig::default().with_max_values(25);
    /// assert_eq!(config.max_values(), 25);
    /// ```
    pub fn with_max_values(mut self, max: usize) -> Self {
        self.max_values = max;
        self
    }

    /// Sets the maximum byte length of a stored string value.
    ///
    /// Longer strings are truncated on a character boundary before being
    /// recorded. Truncation affects only the stored sample, not value
    /// deduplication of the original strings.
    pub fn with_max_value_length(mut self, max: usize) -> Self {
        self.max_value_length = max;
        self
    }

    /// Returns the maximum number of layers tracked.
    pub fn max_layers(&self) -> usize {
        self.max_layers
    }

    /// Returns the maximum number of attributes tracked per layer.
    pub fn max_attributes(&self) -> usize {
        self.max_attributes
    }

    /// Returns the maximum number of distinct values recorded per attribute.
    pub fn max_values(&self) -> usize {
        self.max_values
    }

    /// Returns the maximum byte length of a stored string value.
    pub fn max_value_length(&self) -> usize {
        self.max_value_length
    }

    /// Validates the current configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use tilestats::StatsConfig;
    ///
    /// let config = StatsConfig::default().with_max_values(0);
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), GeostatsError> {
        if self.max_layers == 0 {
            return Err(GeostatsError::InvalidConfig {
                message: "max_layers must be non-zero",
            });
        }
        if self.max_attributes == 0 {
            return Err(GeostatsError::InvalidConfig {
                message: "max_attributes must be non-zero",
            });
        }
        if self.max_values == 0 {
            return Err(GeostatsError::InvalidConfig {
                message: "max_values must be non-zero",
            });
        }
        if self.max_value_length == 0 {
            return Err(GeostatsError::InvalidConfig {
                message: "max_value_length must be non-zero",
            });
        }
        Ok(())
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            max_layers: DEFAULT_MAX_LAYERS,
            max_attributes: DEFAULT_MAX_ATTRIBUTES,
            max_values: DEFAULT_MAX_VALUES,
            max_value_length: DEFAULT_MAX_VALUE_LENGTH,
        }
    }
}
