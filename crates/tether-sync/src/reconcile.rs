use std::collections::HashMap;

use tether_core::TrackedSession;

/// What one pass decided for a session it loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    Keep(TrackedSession),
    Drop,
}

/// Merge a pass's outcomes into the queue as it is on disk now.
///
/// A session that is still identical to the pass's snapshot gets the pass's
/// outcome. A session that changed on disk while the pass ran (a commit was
/// linked, it was reopened) keeps its on-disk form so the change is not lost;
/// the next pass will pick it up. Sessions the pass never saw are kept, and
/// sessions deleted meanwhile stay deleted.
pub(crate) fn reconcile(
    current: Vec<TrackedSession>,
    snapshot: &[TrackedSession],
    mut outcomes: HashMap<String, Outcome>,
) -> Vec<TrackedSession> {
    let before: HashMap<&str, &TrackedSession> =
        snapshot.iter().map(|s| (s.id.as_str(), s)).collect();
    current
        .into_iter()
        .filter_map(|s| {
            let untouched = before.get(s.id.as_str()).is_some_and(|orig| **orig == s);
            if !untouched {
                return Some(s);
            }
            match outcomes.remove(&s.id) {
                Some(Outcome::Drop) => None,
                Some(Outcome::Keep(updated)) => Some(updated),
                None => Some(s),
            }
        })
        .collect()
}
