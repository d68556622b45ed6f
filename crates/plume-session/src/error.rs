//! Session registry errors.

use std::error::Error;
use std::fmt;

use plume_core::{ConfigError, RenderId};

/// Errors from [`SessionRegistry`](crate::SessionRegistry) operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// The registry's cache configuration is invalid.
    Config(ConfigError),
    /// No cache is registered for this render.
    UnknownSession {
        /// The render that was asked for.
        render: RenderId,
    },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::UnknownSession { render } => write!(f, "no cache for render {render}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::UnknownSession { .. } => None,
        }
    }
}

impl From<ConfigError> for SessionError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
