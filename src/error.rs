//! Client-facing error.
//!
//! Every failure of a call reaches the caller as a [`ClientError`]. Its
//! message is the original failure's message and [`ClientError::cause`]
//! tells which layer failed. `source()` continues below the original
//! failure, so a printed chain never repeats a message.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::codec::DecodeError;
use crate::config::ConfigurationError;
use crate::transport::TransportError;

/// The layer a call failed in.
#[derive(Debug, Error)]
pub enum FailureCause {
    #[error("configuration error")]
    Configuration(#[source] ConfigurationError),

    #[error("transport error")]
    Transport(#[source] TransportError),

    #[error("response decoding error")]
    Decode(#[source] DecodeError),
}

impl FailureCause {
    /// The failure itself, without the layer label.
    pub fn error(&self) -> &(dyn StdError + 'static) {
        match self {
            FailureCause::Configuration(e) => e,
            FailureCause::Transport(e) => e,
            FailureCause::Decode(e) => e,
        }
    }
}

/// Uniform error returned by every call.
#[derive(Debug)]
pub struct ClientError {
    message: String,
    cause: FailureCause,
}

impl ClientError {
    fn new(cause: FailureCause) -> Self {
        Self {
            message: cause.error().to_string(),
            cause,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> &FailureCause {
        &self.cause
    }

    /// The HTTP status, if the service answered with a non-success status.
    pub fn status(&self) -> Option<u16> {
        match &self.cause {
            FailureCause::Transport(TransportError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// The error body returned by the service, if any.
    pub fn response_body(&self) -> Option<&str> {
        match &self.cause {
            FailureCause::Transport(TransportError::Status { body, .. }) => Some(body),
            _ => None,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for ClientError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.error().source()
    }
}

impl From<ConfigurationError> for ClientError {
    fn from(err: ConfigurationError) -> Self {
        Self::new(FailureCause::Configuration(err))
    }
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        Self::new(FailureCause::Transport(err))
    }
}

impl From<DecodeError> for ClientError {
    fn from(err: DecodeError) -> Self {
        Self::new(FailureCause::Decode(err))
    }
}
