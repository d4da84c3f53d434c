//! Round resolution: turning submitted choices into the winning choice.
//!
//! Pure decision logic, no shared state. The protocol only exposes
//! per-player submission, so the aggregation rule lives here as an
//! explicit policy: a round resolves once every currently connected
//! player has submitted, the plurality choice wins, and exact ties go
//! to the lowest choice index. Disconnected players' submissions are
//! never counted, so a departure can unblock a round.

use std::collections::HashMap;

use taleweave_protocol::ConnectionId;

/// Decides whether the active round is resolved.
///
/// Returns `Some(choice_index)` with the winning choice once every
/// connection in `connected` has an entry in `pending`, `None` while
/// submissions are still outstanding. An empty `connected` set never
/// resolves — a lobby with no players left just awaits removal.
///
/// Entries in `pending` for connections not in `connected` are ignored;
/// out-of-range choice values are ignored too (submissions are range
/// checked before they are recorded, so that only guards stale data).
pub fn resolve_round(
    choice_count: usize,
    connected: &[ConnectionId],
    pending: &HashMap<ConnectionId, usize>,
) -> Option<usize> {
    if connected.is_empty() || choice_count == 0 {
        return None;
    }
    if connected.iter().any(|id| !pending.contains_key(id)) {
        return None;
    }

    let mut votes = vec![0usize; choice_count];
    for id in connected {
        if let Some(&choice) = pending.get(id) {
            if choice < choice_count {
                votes[choice] += 1;
            }
        }
    }

    // Plurality; strict `>` keeps the lowest index on ties.
    let mut winner = 0;
    for (index, &count) in votes.iter().enumerate() {
        if count > votes[winner] {
            winner = index;
        }
    }
    Some(winner)
}
