//! Binary entry point for `relaynn`.
//!
//! All of the real work happens in the library crate; see
//! [`relaynn::main_main`].

use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    relaynn::main_main(std::env::args_os())
}
