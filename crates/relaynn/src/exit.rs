//! Interrupt handling.
//!
//! A run of this tool can take a while (the fetch alone is tens of
//! megabytes), so the user gets a cooperative way out: the first SIGINT
//! raises a flag that the pipeline checks between stages and inside the
//! ranking loop, producing a clean exit. A second SIGINT falls through to
//! the default signal behaviour, in case the process is stuck in the
//! blocking fetch.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use signal_hook::consts::SIGINT;

/// Install the SIGINT handler, returning the flag it raises.
pub(crate) fn interrupt_flag() -> std::io::Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    // The conditional-default registration must come first, so that the
    // flag is already set when it runs.
    signal_hook::flag::register_conditional_default(SIGINT, Arc::clone(&flag))?;
    signal_hook::flag::register(SIGINT, Arc::clone(&flag))?;
    Ok(flag)
}
