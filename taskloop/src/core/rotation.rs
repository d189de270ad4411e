//! Round-robin worker rotation.
//!
//! Rotation state lives in `ProgressState::last_worker`, so it survives restarts.

use crate::core::types::WorkerId;

/// Pick the worker after `last` in `order`, wrapping around.
///
/// Starts at `order[0]` when `last` is `None` or no longer in the roster.
/// Returns `None` only for an empty roster.
pub fn next_worker(order: &[WorkerId], last: Option<WorkerId>) -> Option<WorkerId> {
    let first = order.first().copied()?;
    let Some(last) = last else {
        return Some(first);
    };
    match order.iter().position(|w| *w == last) {
        Some(index) => Some(order[(index + 1) % order.len()]),
        None => Some(first),
    }
}
