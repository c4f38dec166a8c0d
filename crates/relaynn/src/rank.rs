//! Rank every fetched relay by similarity to the reference relay.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::info;

use relaynn_netdoc::types::Fingerprint;
use relaynn_netdoc::ServerDesc;

use crate::canonical::canonical_repr;
use crate::distance::distance;

/// The outcome of a ranking pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Ranking {
    /// Every candidate with its distance to the reference, ascending.
    /// Ties order by fingerprint, so a ranking is reproducible across
    /// runs given the same descriptor set.
    Complete(Vec<(Fingerprint, usize)>),
    /// The reference fingerprint was not in the fetched set; nothing was
    /// ranked.
    ReferenceNotFound,
    /// The user interrupted the scan partway.
    Interrupted,
}

/// Compute the distance from `reference` to every descriptor in `descs`.
///
/// This is a full linear scan: a global ranking needs to see every
/// candidate, so there is no early exit short of `interrupt`. The
/// reference relay itself is included (at distance 0) like any other
/// candidate.
pub(crate) fn rank(
    reference: &Fingerprint,
    descs: &HashMap<Fingerprint, ServerDesc>,
    interrupt: &AtomicBool,
) -> Ranking {
    let reference_str = match descs.get(reference) {
        Some(desc) => canonical_repr(desc),
        None => return Ranking::ReferenceNotFound,
    };

    let before = Instant::now();
    let mut dists = Vec::with_capacity(descs.len());
    for (i, (fingerprint, desc)) in descs.iter().enumerate() {
        if interrupt.load(Ordering::SeqCst) {
            return Ranking::Interrupted;
        }
        dists.push((*fingerprint, distance(&reference_str, &canonical_repr(desc))));
        if i % 1000 == 0 {
            info!("Processed {} descriptors.", i);
        }
    }

    dists.sort_by_key(|&(fingerprint, dist)| (dist, fingerprint));
    info!("Processing time: {:.3}", before.elapsed().as_secs_f64());

    Ranking::Complete(dists)
}
