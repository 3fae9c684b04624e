//! Worker-count defaults and the deterministic round-robin partitioning
//! used by the parallel tile builder.

/// Resolves the effective worker count for `--processes`.
///
/// `None` (flag omitted) defaults to the number of logical CPUs; an
/// explicit `0` is clamped up to 1 so a misconfigured run still makes
/// progress on a single worker instead of deadlocking.
pub fn resolve_worker_count(requested: Option<usize>) -> usize {
	requested.unwrap_or_else(num_cpus::get).max(1)
}

/// Whether the `i`-th item (1-based) belongs to `worker_id` under
/// round-robin partitioning across `worker_count` workers.
///
/// `(i - 1) mod N == worker_id` guarantees exactly-once coverage of every
/// item across all `worker_id in 0..worker_count` — no item is skipped and
/// none is claimed twice.
pub fn owns_item(one_based_index: u64, worker_id: usize, worker_count: usize) -> bool {
	debug_assert!(worker_count > 0);
	(one_based_index - 1) % worker_count as u64 == worker_id as u64
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashSet;

	#[test]
	fn resolves_explicit_count() {
		assert_eq!(resolve_worker_count(Some(4)), 4);
	}

	#[test]
	fn clamps_zero_to_one() {
		assert_eq!(resolve_worker_count(Some(0)), 1);
	}

	#[test]
	fn default_matches_cpu_count() {
		assert_eq!(resolve_worker_count(None), num_cpus::get().max(1));
	}

	#[test]
	fn round_robin_covers_every_item_exactly_once() {
		let worker_count = 5usize;
		let item_count = 123u64;
		let mut claimed = HashSet::new();
		for i in 1..=item_count {
			let owners: Vec<usize> = (0..worker_count).filter(|&w| owns_item(i, w, worker_count)).collect();
			assert_eq!(owners.len(), 1, "item {i} must have exactly one owner");
			claimed.insert(i);
		}
		assert_eq!(claimed.len(), item_count as usize);
	}
}
