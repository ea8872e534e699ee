use std::time::{Duration, SystemTime};

use tether_core::{SessionStatus, TrackedSession};

/// Flip `Open` sessions to `Ended` when their transcript can no longer be
/// stat'ed or has not been modified for longer than `stale_after`.
///
/// Never touches `Ended` sessions and never removes anything. Returns the
/// number of sessions flipped.
pub fn reap_stale(sessions: &mut [TrackedSession], now: SystemTime, stale_after: Duration) -> usize {
    let mut reaped = 0;
    for session in sessions.iter_mut().filter(|s| s.is_open()) {
        let stale = match std::fs::metadata(&session.data_path) {
            Err(_) => true,
            // A modification time in the future counts as fresh.
            Ok(meta) => meta
                .modified()
                .ok()
                .and_then(|mtime| now.duration_since(mtime).ok())
                .is_some_and(|age| age > stale_after),
        };
        if stale {
            tracing::info!(session_id = %session.id, path = %session.data_path.display(), "transcript quiet; marking session ended");
            session.status = SessionStatus::Ended;
            reaped += 1;
        }
    }
    reaped
}
