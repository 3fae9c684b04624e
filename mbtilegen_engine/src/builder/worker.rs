//! The parallel tile builder's worker pool: OS threads plus a deterministic
//! round-robin partition. Threads share no mutable state beyond the pooled
//! archive connection and the progress channel, so the round-robin split
//! is race-free without any explicit locking between workers.

use std::sync::mpsc;
use std::thread;

use mbtilegen_core::concurrency::owns_item;
use mbtilegen_core::progress::ProgressSink;

/// What happened to one item of work, reported back to the collector loop
/// so it can update the shared progress sink and the run-level tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
	Written,
	Skipped,
	Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
	pub written: u64,
	pub skipped: u64,
	pub failed: u64,
}

impl Tally {
	fn record(&mut self, disposition: Disposition) {
		match disposition {
			Disposition::Written => self.written += 1,
			Disposition::Skipped => self.skipped += 1,
			Disposition::Failed => self.failed += 1,
		}
	}
}

/// Runs `work` over every item in `items`, partitioned round-robin across
/// `worker_count` OS threads (`(i - 1) mod N == worker_id`). `work` must
/// not panic across a worker boundary it can't recover from — a panicking
/// worker thread is still joined by `thread::scope`, but its remaining
/// items are simply never processed, so callers should catch recoverable
/// errors inside `work` and return `Disposition::Failed` instead.
pub fn run_parallel<T, F>(items: &[T], worker_count: usize, progress: &dyn ProgressSink, work: F) -> Tally
where
	T: Sync,
	F: Fn(&T) -> Disposition + Sync,
{
	progress.set_total(items.len() as u64);
	let (tx, rx) = mpsc::channel::<Disposition>();
	let mut tally = Tally::default();

	thread::scope(|scope| {
		for worker_id in 0..worker_count {
			let tx = tx.clone();
			let work = &work;
			scope.spawn(move || {
				for (index, item) in items.iter().enumerate() {
					let one_based = (index + 1) as u64;
					if owns_item(one_based, worker_id, worker_count) {
						let disposition = work(item);
						if tx.send(disposition).is_err() {
							break;
						}
					}
				}
			});
		}
		drop(tx);

		for disposition in rx {
			progress.inc(1);
			tally.record(disposition);
		}
	});

	tally
}

#[cfg(test)]
mod tests {
	use super::*;
	use mbtilegen_core::progress::CountingProgress;
	use std::sync::atomic::{AtomicU64, Ordering};
	use std::sync::Arc;

	#[test]
	fn every_item_is_processed_exactly_once() {
		let items: Vec<u64> = (0..97).collect();
		let seen = Arc::new(AtomicU64::new(0));
		let progress = CountingProgress::new();
		let seen_ref = seen.clone();
		let tally = run_parallel(&items, 4, &progress, move |_item| {
			seen_ref.fetch_add(1, Ordering::Relaxed);
			Disposition::Written
		});
		assert_eq!(seen.load(Ordering::Relaxed), 97);
		assert_eq!(tally.written, 97);
		assert_eq!(progress.completed(), 97);
	}

	#[test]
	fn tally_separates_dispositions() {
		let items: Vec<u64> = (0..10).collect();
		let progress = CountingProgress::new();
		let tally = run_parallel(&items, 3, &progress, |item| {
			if item % 3 == 0 {
				Disposition::Skipped
			} else if item % 5 == 0 {
				Disposition::Failed
			} else {
				Disposition::Written
			}
		});
		assert_eq!(tally.written + tally.skipped + tally.failed, 10);
		assert!(tally.skipped > 0);
	}

	#[test]
	fn single_worker_processes_everything_in_order() {
		let items: Vec<u64> = (0..20).collect();
		let progress = CountingProgress::new();
		let order = Arc::new(std::sync::Mutex::new(Vec::new()));
		let order_ref = order.clone();
		run_parallel(&items, 1, &progress, move |item| {
			order_ref.lock().unwrap().push(*item);
			Disposition::Written
		});
		assert_eq!(*order.lock().unwrap(), items);
	}
}
