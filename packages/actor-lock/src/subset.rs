use sha1::{Digest, Sha1};

/// Hashes `id` as SHA-1 of its length-prefixed parts (§4.4 step 1), then
/// picks a deterministic starting offset `mod replicas` and walks
/// `redundancy` consecutive replicas from there. Every client computing
/// the same id lands on the same subset, so unrelated keys don't all
/// contend on replica 0.
pub fn select_replicas(id: &[String], total_replicas: usize, redundancy: usize) -> Vec<usize> {
	if total_replicas == 0 {
		return Vec::new();
	}
	let redundancy = redundancy.min(total_replicas);
	let hash = hash_id(id);
	let start = (hash % total_replicas as u64) as usize;
	(0..redundancy).map(|offset| (start + offset) % total_replicas).collect()
}

fn hash_id(id: &[String]) -> u64 {
	let mut hasher = Sha1::new();
	for part in id {
		let bytes = part.as_bytes();
		hasher.update((bytes.len() as u32).to_be_bytes());
		hasher.update(bytes);
	}
	let digest = hasher.finalize();
	let mut buf = [0u8; 8];
	buf.copy_from_slice(&digest[0..8]);
	u64::from_be_bytes(buf)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn deterministic_for_same_id() {
		let id = vec!["Counter".to_string(), "42".to_string()];
		let a = select_replicas(&id, 7, 3);
		let b = select_replicas(&id, 7, 3);
		assert_eq!(a, b);
		assert_eq!(a.len(), 3);
	}

	#[test]
	fn wraps_around_replica_list() {
		let id = vec!["x".to_string()];
		let subset = select_replicas(&id, 3, 3);
		let mut sorted = subset.clone();
		sorted.sort();
		assert_eq!(sorted, vec![0, 1, 2]);
	}

	#[test]
	fn redundancy_capped_by_total() {
		let id = vec!["x".to_string()];
		let subset = select_replicas(&id, 2, 5);
		assert_eq!(subset.len(), 2);
	}
}
