//! Error types for the Galaxy3D visibility core
//!
//! Most failures inside a traversal are not errors: unresolvable references
//! are classified `NoObject` and logged. This module covers the operations
//! that genuinely refuse to proceed (level edits, draw ordering, backend
//! failures).

use std::fmt;

/// Result type for Galaxy3D operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A key (submap, object, portal) does not refer to a live entry
    InvalidHandle(String),

    /// A SubMap already holds as many portals as the arrival bitmask can encode
    PortalLimitExceeded {
        /// Maximum number of portals per SubMap
        limit: u32,
    },

    /// An operation was called in the wrong build/draw state
    InvalidState(String),

    /// Render backend failure (view setup, capture, placeholder)
    BackendError(String),

    /// Invalid resource (mesh, texture, object record)
    InvalidResource(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidHandle(msg) => write!(f, "Invalid handle: {}", msg),
            Error::PortalLimitExceeded { limit } => {
                write!(f, "Portal limit exceeded: a submap holds at most {} portals", limit)
            }
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Log an error and build an `Error::InvalidResource` from it.
///
/// ```ignore
/// let mesh = registry.mesh(key)
///     .ok_or_else(|| engine_err!("galaxy3d::World", "Mesh {:?} not registered", key))?;
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::galaxy3d::Error::InvalidResource(message)
    }};
}

/// Log an error and return early with `Error::InvalidResource`.
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
