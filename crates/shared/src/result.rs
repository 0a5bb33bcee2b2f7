//! Workspace-wide result alias.

use crate::errors::ErrorEnvelope;

/// `Result` defaulting its error to [`ErrorEnvelope`].
pub type Result<T, E = ErrorEnvelope> = std::result::Result<T, E>;
