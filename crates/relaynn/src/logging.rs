//! Configure logging for the process.
//!
//! The tool logs through `tracing`; this module installs the one global
//! subscriber, exactly once, at process entry. Nothing else in the
//! program touches logging configuration.

use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, registry, EnvFilter};

/// Set up logging, filtered according to `directive`.
///
/// `directive` is an `EnvFilter` filter string; plain level names such as
/// "info" or "debug" are the common case.
pub(crate) fn setup(directive: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(directive)
        .with_context(|| format!("invalid --log-level directive {:?}", directive))?;
    registry().with(fmt::Layer::default()).with(filter).init();
    Ok(())
}
