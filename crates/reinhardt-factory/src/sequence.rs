//! Sequence counters.
//!
//! Each factory hierarchy owns one counter. A factory derived from another
//! factory with the same model shares its parent's counter, so sibling
//! factories never hand out the same sequence value.

use std::sync::atomic::{AtomicI64, Ordering};

/// Monotonically increasing counter shared by a factory hierarchy.
///
/// The counter starts at 0 and is never reset. [`next`](Self::next) is a
/// single atomic read-and-increment, so concurrent factory calls from several
/// threads always observe distinct values.
#[derive(Debug, Default)]
pub struct SequenceCounter {
	next: AtomicI64,
}

impl SequenceCounter {
	/// Creates a counter starting at 0.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the next value and advances the counter.
	pub fn next(&self) -> i64 {
		self.next.fetch_add(1, Ordering::SeqCst)
	}

	/// Returns the value the next call to [`next`](Self::next) will return.
	pub fn peek(&self) -> i64 {
		self.next.load(Ordering::SeqCst)
	}
}
