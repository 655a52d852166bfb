//! Time-bucketed reminder scheduler.
//!
//! ## Scope
//! This crate answers "what is due right now?" in near-constant time by
//! classifying items into a ring of contiguous, fixed-width time windows
//! (a bucket wheel) instead of scanning the full item set. It is a building
//! block for timers, reminder queues, and delayed-retry queues.
//!
//! ## Key invariants
//! - The wheel always holds exactly `num_blocks` windows, contiguous and
//!   time-ascending, with the head window never elapsed.
//! - No item is ever lost: items stranded in a retired window are salvaged
//!   into the new head, and boundary-exact due times are routed to the window
//!   that starts at that boundary.
//! - Every public operation re-anchors the wheel to the current time first,
//!   so the structure is always aligned with "now" when it acts.
//!
//! ## Flow (one item)
//! `add_reminder(item)` -> re-anchor -> route by `item.due_time()` into the
//! head (overdue), tail (beyond horizon), or containing window -> a later
//! `due()` call re-anchors, then extracts the head-window items whose due
//! time has passed.
//!
//! ## Entry points
//! - [`Wheel`]: the scheduler. [`Wheel::new`] for the system clock,
//!   [`Wheel::with_clock`] to inject a [`Clock`].
//! - [`Schedulable`]: the two-accessor capability an item must expose.
//! - [`ManualClock`]: deterministic clock for tests.
//! - [`Wheel::snapshot`]: serializable diagnostic view of every window.
//!
//! ## Concurrency
//! The wheel is passive: no internal thread, no blocking I/O. Arbitrary
//! caller threads share it behind one wheel-level lock (whole-operation
//! atomicity) plus one lock per window (independent window reads). A polling
//! loop, if wanted, is caller-owned.

pub mod clock;
pub mod window;
pub mod wheel;

pub use clock::{Clock, ManualClock, SystemClock};
pub use wheel::{Schedulable, Wheel, WheelConfigError, WindowSnapshot};
