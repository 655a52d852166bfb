//! The bucket wheel: an ordered, contiguous sequence of equal-width
//! [`TimeWindow`]s spanning from "now" to a fixed horizon.
//!
//! # Model
//!
//! ```text
//!                    Wheel (block_size = B, num_blocks = N)
//!
//!    now
//!     |
//!     v
//!   +---------+---------+---------+         +---------+
//!   | [t,t+B) |[t+B,t+2B)|[t+2B,..)|  ...    | tail    |
//!   |  head   |          |         |         |         |
//!   +---------+---------+---------+         +---------+
//!    overdue                                  beyond-horizon
//!    catch-all                                catch-all
//! ```
//!
//! Every public operation first **re-anchors** the sequence to the current
//! time: elapsed windows are retired from the front, the same number of fresh
//! windows is appended at the tail, and items stranded in retired windows are
//! salvaged into the new head. Re-anchoring is a no-op when nothing has
//! elapsed, so it is safe to run on every call.
//!
//! # Invariants
//!
//! Checked before and after every public operation:
//!
//! - The sequence holds exactly `num_blocks` windows.
//! - `windows[i].end == windows[i + 1].start` (contiguous, no overlap).
//! - The head window is never elapsed once re-anchoring returns.
//! - No item is ever lost: items in retiring windows are salvaged into the
//!   new head before the old window is dropped, and a due time landing
//!   exactly on a window boundary is routed to the window that starts there
//!   rather than discarded.
//!
//! # Complexity
//!
//! All operations are synchronous and bounded: `O(num_blocks)` to locate a
//! window, plus `O(items)` in the affected window(s). There is no internal
//! thread; a poller owns its own loop and simply calls [`Wheel::due`].
//!
//! # Ordering
//!
//! Within one window, insertion order is preserved and [`Wheel::due`] returns
//! due items in that order. There is no ordering guarantee across windows
//! beyond window order itself; this is FIFO-ish, not a priority queue.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use serde::Serialize;
use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock};
use crate::window::TimeWindow;

/// Capability set an item must expose to be scheduled.
///
/// The wheel never interprets an item beyond these two accessors.
pub trait Schedulable {
    /// When the item should fire.
    fn due_time(&self) -> SystemTime;
    /// Stable identifier, used only for diagnostics ([`Wheel::snapshot`]).
    fn id(&self) -> &str;
}

/// Invalid construction parameters.
///
/// Rejected at construction so they cannot surface later as corrupted-state
/// symptoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum WheelConfigError {
    /// `num_blocks` was zero; the wheel needs at least one window.
    ZeroBlocks,
    /// `block_size` was zero; windows must have positive width.
    ZeroBlockSize,
}

impl fmt::Display for WheelConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroBlocks => write!(f, "num_blocks must be at least 1"),
            Self::ZeroBlockSize => write!(f, "block_size must be a positive duration"),
        }
    }
}

impl std::error::Error for WheelConfigError {}

/// Read-only diagnostic view of one window, in wheel order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowSnapshot {
    pub start: SystemTime,
    pub end: SystemTime,
    pub len: usize,
    pub ids: Vec<String>,
}

/// Time-bucketed reminder scheduler.
///
/// A passive, lock-protected structure: callers on any thread may add items
/// and ask for due ones concurrently. The wheel-level lock is held for the
/// full duration of each public operation so the re-anchor-then-act sequence
/// is atomic; per-window item locks keep window reads independent of each
/// other. Expected item volumes are modest, so the coarse wheel lock is the
/// documented trade-off.
pub struct Wheel<T, C = SystemClock> {
    windows: Mutex<VecDeque<TimeWindow<T>>>,
    block_size: Duration,
    num_blocks: usize,
    clock: C,
}

impl<T: Schedulable> Wheel<T, SystemClock> {
    /// Create a wheel of `num_blocks` contiguous windows of width
    /// `block_size`, with `windows[0].start` anchored at the current time.
    pub fn new(block_size: Duration, num_blocks: usize) -> Result<Self, WheelConfigError> {
        Self::with_clock(block_size, num_blocks, SystemClock)
    }
}

impl<T: Schedulable, C: Clock> Wheel<T, C> {
    /// Like [`Wheel::new`] but reading time from `clock`.
    pub fn with_clock(
        block_size: Duration,
        num_blocks: usize,
        clock: C,
    ) -> Result<Self, WheelConfigError> {
        if num_blocks == 0 {
            return Err(WheelConfigError::ZeroBlocks);
        }
        if block_size.is_zero() {
            return Err(WheelConfigError::ZeroBlockSize);
        }

        let now = clock.now();
        let mut windows = VecDeque::with_capacity(num_blocks);
        let mut start = now;
        for _ in 0..num_blocks {
            let end = start + block_size;
            windows.push_back(TimeWindow::new(start, end));
            start = end;
        }

        debug!(
            block_size_ms = block_size.as_millis() as u64,
            num_blocks, "wheel created"
        );

        Ok(Self {
            windows: Mutex::new(windows),
            block_size,
            num_blocks,
            clock,
        })
    }

    #[inline]
    pub fn block_size(&self) -> Duration {
        self.block_size
    }

    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    /// Place `item` into the window covering its due time.
    ///
    /// Routing after re-anchoring:
    /// - due before the head's start (already overdue): head window;
    /// - due beyond the tail's end (past the horizon): tail window;
    /// - otherwise the unique window containing it. A due time landing
    ///   exactly on a window boundary belongs to neither open interval and is
    ///   assigned to the window that *starts* there; a due time equal to the
    ///   final boundary (`tail.end`) falls through to the tail catch-all.
    ///
    /// Total: every item lands in exactly one window.
    pub fn add_reminder(&self, item: T) {
        let now = self.clock.now();
        let mut windows = self.lock_windows();
        self.re_anchor(&mut windows, now);

        let due = item.due_time();

        let head = windows.front().expect("wheel holds at least one window");
        if head.is_after(due) {
            trace!(id = item.id(), "overdue reminder placed in head window");
            head.add(item);
            return;
        }

        let tail = windows.back().expect("wheel holds at least one window");
        if tail.is_before(due) {
            trace!(id = item.id(), "beyond-horizon reminder placed in tail window");
            tail.add(item);
            return;
        }

        match windows.iter().find(|w| w.contains(due) || w.start() == due) {
            Some(w) => w.add(item),
            // Only reachable when due == tail.end: the first instant past
            // the horizon, exclusive on every window.
            None => tail.add(item),
        }
    }

    /// Remove and return every item in the head window whose due time is at
    /// or before now, preserving their relative order. Items not yet due stay
    /// in place.
    ///
    /// Re-anchoring runs first, so items stranded in elapsed windows are
    /// salvaged into the head and show up here as soon as they are due.
    pub fn due(&self) -> Vec<T> {
        let now = self.clock.now();
        let mut windows = self.lock_windows();
        self.re_anchor(&mut windows, now);

        let head = windows.front().expect("wheel holds at least one window");
        head.extract_if(|item| item.due_time() <= now)
    }

    /// Consistent diagnostic view of every window in wheel order.
    ///
    /// Mutates nothing beyond the re-anchor it triggers. The human-readable
    /// rendering is the caller's concern; `WindowSnapshot` serializes if a
    /// structured dump is wanted.
    pub fn snapshot(&self) -> Vec<WindowSnapshot> {
        let now = self.clock.now();
        let mut windows = self.lock_windows();
        self.re_anchor(&mut windows, now);

        windows
            .iter()
            .map(|w| {
                w.with_items(|items| WindowSnapshot {
                    start: w.start(),
                    end: w.end(),
                    len: items.len(),
                    ids: items.iter().map(|item| item.id().to_owned()).collect(),
                })
            })
            .collect()
    }

    /// Total number of pending items across all windows.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        let mut windows = self.lock_windows();
        self.re_anchor(&mut windows, now);
        windows.iter().map(TimeWindow::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slide the window sequence forward so the head is never elapsed.
    ///
    /// One pass retires every currently-elapsed window from the front,
    /// appends the same number of fresh windows after the tail, and prepends
    /// the retired windows' items to the new head. After an idle gap longer
    /// than the whole wheel span the freshly appended windows are themselves
    /// already elapsed, so the pass repeats until the head is live.
    ///
    /// Idempotent when nothing has elapsed.
    fn re_anchor(&self, windows: &mut VecDeque<TimeWindow<T>>, now: SystemTime) {
        loop {
            let elapsed = windows.iter().take_while(|w| w.is_elapsed(now)).count();
            if elapsed == 0 {
                return;
            }

            // Tail end of the whole sequence, captured before the drain in
            // case every window is being retired.
            let mut end = windows.back().expect("wheel holds at least one window").end();

            // Salvage per retired window, front to back, so relative order
            // survives the move.
            let mut salvaged = Vec::new();
            for window in windows.drain(..elapsed) {
                salvaged.extend(window.into_items());
            }

            for _ in 0..elapsed {
                let next = end + self.block_size;
                windows.push_back(TimeWindow::new(end, next));
                end = next;
            }

            trace!(retired = elapsed, salvaged = salvaged.len(), "wheel re-anchored");

            if !salvaged.is_empty() {
                windows
                    .front()
                    .expect("wheel holds at least one window")
                    .prepend(salvaged);
            }

            debug_assert_eq!(windows.len(), self.num_blocks);
        }
    }

    fn lock_windows(&self) -> MutexGuard<'_, VecDeque<TimeWindow<T>>> {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T, C> fmt::Debug for Wheel<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wheel")
            .field("block_size", &self.block_size)
            .field("num_blocks", &self.num_blocks)
            .finish_non_exhaustive()
    }
}


// Property-based tests are in the sibling module wheel_tests.rs
#[cfg(all(test, feature = "wheel-proptest"))]
#[path = "wheel_tests.rs"]
mod wheel_tests;
