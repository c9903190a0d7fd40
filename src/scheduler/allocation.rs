//! Thread allocation under a global cap.

use tracing::warn;

/// Threads granted to one workload for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadGrant {
    pub name: String,
    pub requested: u32,
    pub granted: u32,
}

/// Allocate worker threads across workloads.
///
/// When the requested total fits under the cap, every workload gets what
/// it asked for. Otherwise each request is scaled down proportionally,
/// flooring at one thread per workload - a run that is under-provisioned
/// still tells you more than a run that refused to start. The floor means
/// the granted total can still exceed the cap; that case is logged.
/// Allocation is deterministic and preserves input order.
pub fn allocate_threads(requested: &[(String, u32)], cap: u32) -> Vec<ThreadGrant> {
    let total: u64 = requested.iter().map(|(_, threads)| u64::from(*threads)).sum();

    let grants: Vec<ThreadGrant> = if total <= u64::from(cap) {
        requested
            .iter()
            .map(|(name, threads)| ThreadGrant {
                name: name.clone(),
                requested: *threads,
                granted: *threads,
            })
            .collect()
    } else {
        let factor = f64::from(cap) / total as f64;
        requested
            .iter()
            .map(|(name, threads)| {
                let scaled = (f64::from(*threads) * factor).floor() as u32;
                ThreadGrant {
                    name: name.clone(),
                    requested: *threads,
                    granted: scaled.max(1),
                }
            })
            .collect()
    };

    let granted_total: u64 = grants.iter().map(|g| u64::from(g.granted)).sum();
    if granted_total > u64::from(cap) {
        warn!(
            "thread allocation exceeds cap: granted {} with cap {} ({} workloads at the floor)",
            granted_total,
            cap,
            grants.iter().filter(|g| g.granted == 1).count()
        );
    }

    grants
}
