use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use checkin_domain::id::CheckInId;

/// Deadline-ordered index over check-ins in the `scheduled` state.
///
/// Overdue lookups walk the ordered set from the earliest deadline and stop at
/// the cutoff, so a sweep costs O(overdue), not O(all records). Ties on the
/// deadline are broken by id to keep iteration order deterministic.
#[derive(Debug, Default)]
pub struct ScheduledIndex {
    by_deadline: BTreeSet<(DateTime<Utc>, CheckInId)>,
    deadlines: HashMap<CheckInId, DateTime<Utc>>,
}

impl ScheduledIndex {
    /// Index `id` under `deadline`. Re-inserting an indexed id replaces its entry.
    pub fn insert(&mut self, id: CheckInId, deadline: DateTime<Utc>) {
        if let Some(previous) = self.deadlines.insert(id, deadline) {
            self.by_deadline.remove(&(previous, id));
        }
        self.by_deadline.insert((deadline, id));
    }

    /// Drop `id` from the index. Returns `false` if it was not indexed.
    pub fn remove(&mut self, id: CheckInId) -> bool {
        match self.deadlines.remove(&id) {
            Some(deadline) => self.by_deadline.remove(&(deadline, id)),
            None => false,
        }
    }

    #[cfg(test)]
    fn contains(&self, id: CheckInId) -> bool {
        self.deadlines.contains_key(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.deadlines.len()
    }

    /// Ids whose deadline is `<= cutoff`, earliest first, at most `limit`.
    pub fn overdue(&self, cutoff: DateTime<Utc>, limit: usize) -> Vec<CheckInId> {
        self.by_deadline
            .iter()
            .take_while(|(deadline, _)| *deadline <= cutoff)
            .take(limit)
            .map(|(_, id)| *id)
            .collect()
    }
}
