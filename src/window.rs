//! A single bucket of the wheel: a half-open time interval plus the items
//! assigned to it.
//!
//! # Invariants
//!
//! - `start < end` for every constructed window.
//! - `contains` is a *strict* open interval: a timestamp equal to either
//!   boundary is contained by neither neighbor. Boundary routing is the
//!   wheel's job (`Wheel::add_reminder`), not the window's.
//! - Items preserve insertion order; duplicates are allowed.
//!
//! The item vector has its own lock so that reading one window's contents
//! never contends with mutation of another window. Lock order is always
//! wheel-level lock first, then a single window lock; windows never take
//! each other's locks.

use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

/// A fixed time interval `[start, end)` owning the items due within it.
#[derive(Debug)]
pub struct TimeWindow<T> {
    start: SystemTime,
    end: SystemTime,
    items: Mutex<Vec<T>>,
}

impl<T> TimeWindow<T> {
    pub(crate) fn new(start: SystemTime, end: SystemTime) -> Self {
        debug_assert!(start < end, "window must have positive width");
        Self {
            start,
            end,
            items: Mutex::new(Vec::new()),
        }
    }

    #[inline]
    pub fn start(&self) -> SystemTime {
        self.start
    }

    #[inline]
    pub fn end(&self) -> SystemTime {
        self.end
    }

    /// Strictly-inside check: `start < t < end`. Boundary timestamps are not
    /// contained (see module docs).
    #[inline]
    pub fn contains(&self, t: SystemTime) -> bool {
        self.start < t && t < self.end
    }

    /// The window has fully passed at `now`.
    #[inline]
    pub fn is_elapsed(&self, now: SystemTime) -> bool {
        now >= self.end
    }

    /// The window starts after `t`: `t` is overdue relative to this window.
    #[inline]
    pub fn is_after(&self, t: SystemTime) -> bool {
        self.start > t
    }

    /// The window ends before `t`: `t` is beyond this window.
    #[inline]
    pub fn is_before(&self, t: SystemTime) -> bool {
        self.end < t
    }

    /// Append an item under the window lock.
    pub fn add(&self, item: T) {
        self.lock_items().push(item);
    }

    /// Item count, taken under the window lock for a consistent snapshot.
    pub fn len(&self) -> usize {
        self.lock_items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_items().is_empty()
    }

    /// Insert `items` ahead of everything currently held, preserving the
    /// relative order of both groups. Used to salvage items out of retired
    /// windows: salvaged items are older and stay ahead.
    pub(crate) fn prepend(&self, items: Vec<T>) {
        let mut held = self.lock_items();
        let mut merged = items;
        merged.append(&mut held);
        *held = merged;
    }

    /// Remove and return every item matching `pred`, keeping the rest in
    /// place. Both the returned and the kept items preserve their relative
    /// order (stable partition; no index arithmetic).
    pub(crate) fn extract_if(&self, mut pred: impl FnMut(&T) -> bool) -> Vec<T> {
        let mut held = self.lock_items();
        let mut taken = Vec::new();
        let mut kept = Vec::with_capacity(held.len());
        for item in held.drain(..) {
            if pred(&item) {
                taken.push(item);
            } else {
                kept.push(item);
            }
        }
        *held = kept;
        taken
    }

    /// Run `f` against the item slice under the window lock.
    pub(crate) fn with_items<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.lock_items())
    }

    /// Consume a retired window, yielding its items.
    pub(crate) fn into_items(self) -> Vec<T> {
        self.items
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_items(&self) -> std::sync::MutexGuard<'_, Vec<T>> {
        // A panicked appender cannot leave a Vec structurally broken, so a
        // poisoned lock is safe to recover.
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn window(start_s: u64, end_s: u64) -> TimeWindow<u32> {
        let base = SystemTime::UNIX_EPOCH;
        TimeWindow::new(
            base + Duration::from_secs(start_s),
            base + Duration::from_secs(end_s),
        )
    }

    fn at(s: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(s)
    }

    #[test]
    fn contains_is_strictly_open() {
        let w = window(10, 20);
        assert!(!w.contains(at(10)));
        assert!(w.contains(at(11)));
        assert!(w.contains(at(19)));
        assert!(!w.contains(at(20)));
        assert!(!w.contains(at(9)));
        assert!(!w.contains(at(21)));
    }

    #[test]
    fn elapsed_at_end_boundary() {
        let w = window(10, 20);
        assert!(!w.is_elapsed(at(19)));
        assert!(w.is_elapsed(at(20)));
        assert!(w.is_elapsed(at(25)));
    }

    #[test]
    fn after_and_before_are_strict() {
        let w = window(10, 20);
        assert!(w.is_after(at(9)));
        assert!(!w.is_after(at(10)));
        assert!(!w.is_before(at(20)));
        assert!(w.is_before(at(21)));
    }

    #[test]
    fn prepend_keeps_salvaged_items_first() {
        let w = window(0, 10);
        w.add(3);
        w.add(4);
        w.prepend(vec![1, 2]);
        assert_eq!(w.with_items(|items| items.to_vec()), vec![1, 2, 3, 4]);
    }

    #[test]
    fn extract_if_is_a_stable_partition() {
        let w = window(0, 10);
        for v in [1, 2, 3, 4, 5, 6] {
            w.add(v);
        }
        // Out-of-order multi-match removal: the classic index-shift trap.
        let taken = w.extract_if(|v| v % 2 == 0);
        assert_eq!(taken, vec![2, 4, 6]);
        assert_eq!(w.with_items(|items| items.to_vec()), vec![1, 3, 5]);
    }

    #[test]
    fn extract_if_with_no_matches_leaves_items_untouched() {
        let w = window(0, 10);
        w.add(1);
        w.add(2);
        assert!(w.extract_if(|_| false).is_empty());
        assert_eq!(w.len(), 2);
    }
}
