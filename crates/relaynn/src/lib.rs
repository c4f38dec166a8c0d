#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(noop_method_call)]
#![deny(unreachable_pub)]
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
#![warn(clippy::semicolon_if_nothing_returned)]
#![deny(clippy::unnecessary_wraps)]
#![warn(clippy::unseparated_literal_suffix)]
#![deny(clippy::unwrap_used)]
#![allow(clippy::uninlined_format_args)]
// These are allowed in this crate only.
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]

mod canonical;
mod distance;
mod exit;
mod logging;
mod rank;
mod table;

use std::collections::HashMap;
use std::ffi::OsString;
use std::process::ExitCode;
use std::sync::atomic::Ordering;

use anyhow::Context;
use clap::Parser;
use tracing::error;

use relaynn_dirclient::DirClientConfig;
use relaynn_netdoc::types::Fingerprint;

use rank::Ranking;

/// Find nearest neighbours of a given relay.
#[derive(Parser, Debug)]
#[command(version, about, max_term_width = 100)]
struct Args {
    /// Fingerprint of the relay whose nearest neighbours we will find.
    #[arg(value_name = "RELAY")]
    relay: Fingerprint,

    /// The number of most similar relays to display.
    #[arg(short, long, default_value_t = 20)]
    top: usize,

    /// Use terminal colours to visually highlight the difference between
    /// relays.
    #[arg(short, long)]
    colour: bool,

    /// Override the log level (usually one of 'trace', 'debug', 'info',
    /// 'warn', 'error').
    #[arg(short = 'l', long, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

/// Run the relaynn command-line tool with the command line in `cli_args`.
///
/// The real `main`: parses arguments, sets up logging and interrupt
/// handling, then runs the fetch/rank/present pipeline. Exits successfully
/// on interrupt; exits with failure when the reference relay cannot be
/// found in the fetched descriptor set.
pub fn main_main<I, T>(cli_args: I) -> anyhow::Result<ExitCode>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = Args::parse_from(cli_args);
    logging::setup(&args.log_level)?;
    run(&args)
}

/// Run the whole pipeline: fetch, rank, present.
fn run(args: &Args) -> anyhow::Result<ExitCode> {
    let interrupt = exit::interrupt_flag().context("failed to install interrupt handler")?;

    // A transport failure is not fatal: we run over whatever subset was
    // collected, and let the reference-relay check below decide whether
    // anything useful remains.
    let config = DirClientConfig::default();
    let descs = match relaynn_dirclient::fetch_server_descriptors(&config) {
        Ok(descs) => descs,
        Err(e) => {
            error!("Unable to retrieve server descriptors: {}", e);
            HashMap::new()
        }
    };

    if interrupt.load(Ordering::SeqCst) {
        return Ok(ExitCode::SUCCESS);
    }

    match rank::rank(&args.relay, &descs, &interrupt) {
        Ranking::ReferenceNotFound => {
            error!("Reference relay not found in descriptors.");
            Ok(ExitCode::FAILURE)
        }
        Ranking::Interrupted => Ok(ExitCode::SUCCESS),
        Ranking::Complete(dists) => {
            if let Some(reference) = descs.get(&args.relay) {
                print!(
                    "{}",
                    table::render(&dists, &descs, reference, args.top, args.colour)
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
