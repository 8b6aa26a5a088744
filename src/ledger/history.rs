// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ordered, restartable views over ledger history.

use std::sync::Arc;

use crate::models::{Account, RecycleEvent, RedemptionEvent, Timestamped};

/// Immutable snapshot of events, newest first.
///
/// Events with equal timestamps keep reverse insertion order, so the most
/// recently appended of them comes first. Iterating is lazy and can be
/// restarted any number of times; later ledger writes do not affect an
/// existing snapshot.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Arc<[T]>,
}

impl<T: Timestamped + Clone> History<T> {
    /// Build from events in insertion order.
    pub fn newest_first<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a T>,
        I::IntoIter: DoubleEndedIterator,
        T: 'a,
    {
        let mut entries: Vec<T> = events.into_iter().rev().cloned().collect();
        // Stable sort: ties stay in reversed insertion order.
        entries.sort_by_key(|event| std::cmp::Reverse(event.timestamp()));
        Self {
            entries: entries.into(),
        }
    }
}

impl<T> History<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy the entries out.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.entries.to_vec()
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self {
            entries: Arc::from(Vec::new()),
        }
    }
}

impl<'a, T> IntoIterator for &'a History<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One account and both halves of its history, read under a single lock.
///
/// `account.point_balance` always equals the credits minus the redemptions
/// in this snapshot.
#[derive(Debug, Clone)]
pub struct AccountHistory {
    pub account: Account,
    pub recycling: History<RecycleEvent>,
    pub redemptions: History<RedemptionEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn redemption(id: &str, seconds: i64) -> RedemptionEvent {
        RedemptionEvent {
            id: id.to_string(),
            account_id: "a".into(),
            partner_id: "1".to_string(),
            offer_id: "1".to_string(),
            offer_title: "Oferta".to_string(),
            points_spent: 10,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
                + Duration::seconds(seconds),
            sequence: 0,
        }
    }

    fn ids(history: &History<RedemptionEvent>) -> Vec<&str> {
        history.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn newest_first_with_insertion_order_tie_break() {
        let events = vec![
            redemption("a", 0),
            redemption("b", 5),
            redemption("c", 5),
            redemption("d", 1),
        ];

        let history = History::newest_first(&events);
        assert_eq!(ids(&history), vec!["c", "b", "d", "a"]);
    }

    #[test]
    fn iteration_is_restartable() {
        let events = vec![redemption("a", 0), redemption("b", 1)];
        let history = History::newest_first(&events);

        let first: Vec<_> = history.iter().collect();
        let second: Vec<_> = (&history).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn snapshot_is_unaffected_by_later_appends() {
        let mut events = vec![redemption("a", 0)];
        let history = History::newest_first(&events);
        events.push(redemption("b", 1));

        assert_eq!(ids(&history), vec!["a"]);
    }

    #[test]
    fn empty_history() {
        let history: History<RedemptionEvent> = History::default();
        assert!(history.is_empty());
        assert_eq!(history.iter().next(), None);
    }
}
