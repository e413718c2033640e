//! Multi-rank test harness.

use std::time::Duration;

use halo_comm::ThreadComm;

/// Receive timeout applied to every harness rank. A planning or tagging
/// bug then fails the test instead of hanging it.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(10);

/// Run `f` once per rank of an `n`-rank [`ThreadComm`] world, each on its
/// own thread, and collect the results by rank.
///
/// A panic on any rank is re-raised on the calling thread.
pub fn run_ranks<R, F>(n: usize, f: F) -> Vec<R>
where
    R: Send,
    F: Fn(ThreadComm) -> R + Sync,
{
    let f = &f;
    std::thread::scope(|s| {
        let handles: Vec<_> = ThreadComm::world(n)
            .into_iter()
            .map(|comm| comm.with_timeout(RECV_TIMEOUT))
            .map(move |comm| s.spawn(move || f(comm)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|p| std::panic::resume_unwind(p)))
            .collect()
    })
}
