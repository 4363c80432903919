//! Error types for tilestats.

use std::fmt;

/// Errors that can occur while ingesting tile buffers.
///
/// The three ingestion variants ([`MissingValue`], [`NotABuffer`],
/// [`InvalidTile`]) render the exact messages established by the original
/// `addBuffer` API; downstream tooling matches on them verbatim.
///
/// [`MissingValue`]: GeostatsError::MissingValue
/// [`NotABuffer`]: GeostatsError::NotABuffer
/// [`InvalidTile`]: GeostatsError::InvalidTile
#[derive(Debug)]
pub enum GeostatsError {
    /// No value was passed to the ingestion entry point.
    MissingValue,

    /// A value was passed, but it is not a binary buffer.
    NotABuffer,

    /// The buffer does not decode as a Mapbox Vector Tile.
    InvalidTile,

    /// Invalid configuration parameter.
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// An I/O error occurred while reading input data.
    Io(std::io::Error),
}

impl fmt::Display for GeostatsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeostatsError::MissingValue => write!(f, "No value passed into \"addBuffer\""),
            GeostatsError::NotABuffer => {
                write!(f, "Value passed into \"addBuffer\" is not a buffer")
            }
            GeostatsError::InvalidTile => write!(f, "Buffer is not a valid Mapbox Vector Tile"),
            GeostatsError::InvalidConfig { message } => {
                write!(f, "invalid config: {}", message)
            }
            GeostatsError::Io(e) => write!(f, "io error: {}", e),
        }
    }
}

impl std::error::Error for GeostatsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeostatsError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GeostatsError {
    fn from(e: std::io::Error) -> Self {
        GeostatsError::Io(e)
    }
}
