#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(noop_method_call)]
#![warn(unreachable_pub)]
#![warn(clippy::all)]
#![deny(clippy::cargo_common_metadata)]
#![deny(clippy::cast_lossless)]
#![deny(clippy::checked_conversions)]
#![warn(clippy::cognitive_complexity)]
#![deny(clippy::exhaustive_enums)]
#![deny(clippy::exhaustive_structs)]
#![deny(clippy::expl_impl_clone_on_copy)]
#![deny(clippy::fallible_impl_from)]
#![deny(clippy::implicit_clone)]
#![warn(clippy::manual_ok_or)]
#![deny(clippy::missing_docs_in_private_items)]
#![warn(clippy::needless_borrow)]
#![warn(clippy::needless_pass_by_value)]
#![warn(clippy::option_option)]
#![deny(clippy::print_stderr)]
#![deny(clippy::print_stdout)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(clippy::unseparated_literal_suffix)]
#![deny(clippy::unwrap_used)]
#![allow(clippy::uninlined_format_args)]

mod err;
mod fallback;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use derive_builder::Builder;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};
use ureq::Agent;

use relaynn_netdoc::types::Fingerprint;
use relaynn_netdoc::ServerDesc;

pub use err::Error;
pub use fallback::FallbackDir;

/// Type for results returned in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The resource at which a directory cache serves every server descriptor
/// it knows, concatenated.
const ALL_SERVER_DESCRIPTORS: &str = "/tor/server/all";

/// Largest response body we are willing to read, in bytes.
///
/// The full descriptor set is a few tens of megabytes; anything close to
/// this limit is a misbehaving mirror.
const MAX_RESPONSE_LEN: u64 = 256 * 1024 * 1024;

/// Transport configuration for a descriptor download.
#[derive(Clone, Debug, Builder)]
pub struct DirClientConfig {
    /// How long to wait on any single mirror before giving up on it.
    #[builder(default = "Duration::from_secs(20)")]
    timeout: Duration,
    /// Whether to spread load over the whole mirror list, in random
    /// order. When false, only the first compiled-in directory is tried.
    #[builder(default = "true")]
    use_mirrors: bool,
    /// How many mirrors to try before declaring the fetch a failure.
    #[builder(default = "3")]
    max_attempts: usize,
}

impl DirClientConfig {
    /// Return a new builder for constructing a DirClientConfig.
    pub fn builder() -> DirClientConfigBuilder {
        DirClientConfigBuilder::default()
    }
}

impl Default for DirClientConfig {
    fn default() -> Self {
        Self::builder()
            .build()
            .expect("default configuration should be buildable")
    }
}

/// A successful descriptor download: the raw text, plus where it came
/// from.
#[derive(Debug, Clone)]
pub struct DirResponse {
    /// The mirror that served this response.
    source: FallbackDir,
    /// The body of the response.
    output: String,
}

impl DirResponse {
    /// Return the mirror that served this response.
    pub fn source(&self) -> &FallbackDir {
        &self.source
    }

    /// Return the text of this response.
    pub fn output(&self) -> &str {
        &self.output
    }
}

/// Download every server descriptor the directory network will give us,
/// and return them keyed by relay fingerprint.
///
/// Transport errors on individual mirrors are logged and the next mirror
/// is tried; this only fails once every candidate mirror has failed.
/// Descriptors that do not parse are skipped, so the returned set may be
/// smaller than what the mirror served.
pub fn fetch_server_descriptors(
    config: &DirClientConfig,
) -> Result<HashMap<Fingerprint, ServerDesc>> {
    let before = Instant::now();
    let response = download_all_descriptors(config)?;
    info!("Query took {:.2} seconds.", before.elapsed().as_secs_f64());

    let mut descs = HashMap::new();
    for desc in relaynn_netdoc::parse_all(response.output()) {
        descs.insert(*desc.fingerprint(), desc);
    }
    info!("Downloaded {} descs.", descs.len());
    Ok(descs)
}

/// Fetch the raw `/tor/server/all` document from the first mirror that
/// answers.
pub fn download_all_descriptors(config: &DirClientConfig) -> Result<DirResponse> {
    let agent: Agent = Agent::config_builder()
        .timeout_global(Some(config.timeout))
        .build()
        .new_agent();

    for mirror in select_mirrors(config) {
        match download_from(&agent, mirror) {
            Ok(response) => return Ok(response),
            Err(e) => warn!(
                "Unable to fetch descriptors from {} ({}): {}",
                mirror.nickname(),
                mirror.addr(),
                e
            ),
        }
    }
    Err(Error::NoUsableMirror)
}

/// Decide which mirrors to try, and in what order.
fn select_mirrors(config: &DirClientConfig) -> Vec<&'static FallbackDir> {
    let mut mirrors: Vec<&'static FallbackDir> = FallbackDir::defaults().iter().collect();
    if config.use_mirrors {
        mirrors.shuffle(&mut rand::rng());
        mirrors.truncate(config.max_attempts);
    } else {
        mirrors.truncate(1);
    }
    mirrors
}

/// Request the full descriptor set from one mirror.
fn download_from(agent: &Agent, mirror: &FallbackDir) -> Result<DirResponse> {
    let url = mirror.dir_url(ALL_SERVER_DESCRIPTORS);
    debug!("Requesting {}", url);
    let mut response = agent.get(&url).call()?;
    let output = response
        .body_mut()
        .with_config()
        .limit(MAX_RESPONSE_LEN)
        .read_to_string()?;
    Ok(DirResponse {
        source: mirror.clone(),
        output,
    })
}
