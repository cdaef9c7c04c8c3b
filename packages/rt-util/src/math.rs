/// Performs ceiling division for i64 values.
///
/// # Panics
/// Panics if `b` is zero.
pub fn div_ceil_i64(a: i64, b: i64) -> i64 {
	if b == 0 {
		panic!("attempt to divide by zero");
	}

	if a == 0 || (a > 0 && b > 0) || (a < 0 && b < 0) {
		(a + b - 1) / b
	} else {
		a / b
	}
}

/// `ceil(n/2 + 1/4)`, the quorum size used by the distributed actor lock:
/// a strict majority of `n` replicas, biased up by a quarter-vote so that an
/// even split (e.g. 2-of-4) never counts as quorum.
pub fn quorum_size(n: usize) -> usize {
	if n == 0 {
		return 0;
	}
	let n = n as f64;
	(n / 2.0 + 0.25).ceil() as usize
}
