//! Declare dirclient-specific errors.

use std::sync::Arc;

use thiserror::Error;

/// An error originating from the relaynn-dirclient crate.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Got an HTTP status other than 200.
    #[error("unexpected HTTP status {0:?}")]
    HttpStatus(Option<u16>),

    /// A network-level failure while talking to a mirror.
    #[error("transport failure: {0}")]
    Transport(#[source] Arc<ureq::Error>),

    /// Every mirror we were willing to try failed.
    #[error("no usable directory mirror")]
    NoUsableMirror,
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Error::HttpStatus(Some(code)),
            other => Error::Transport(Arc::new(other)),
        }
    }
}
