// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for completed sign-ins.
#[derive(Debug, Default)]
pub struct AuthMetrics {
	attempts: AtomicU64,
	created: AtomicU64,
	matched: AtomicU64,
	failed: AtomicU64,
}
impl AuthMetrics {
	/// Returns the number of callbacks processed.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of sign-ins that created an account.
	pub fn created(&self) -> u64 {
		self.created.load(Ordering::Relaxed)
	}

	/// Returns the number of sign-ins that matched an existing account.
	pub fn matched(&self) -> u64 {
		self.matched.load(Ordering::Relaxed)
	}

	/// Returns the number of sign-ins that ended on the login error redirect.
	pub fn failed(&self) -> u64 {
		self.failed.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_created(&self) {
		self.created.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_matched(&self) {
		self.matched.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failed(&self) {
		self.failed.fetch_add(1, Ordering::Relaxed);
	}
}
