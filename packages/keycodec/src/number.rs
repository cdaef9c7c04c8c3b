use crate::KeyCodecError;

/// `u64::MAX` is 20 decimal digits; padding to that width makes decimal
/// string comparison agree with numeric comparison.
const WIDTH: usize = 20;

/// Encodes `n` as a fixed-width decimal string whose lexicographic order
/// matches its numeric order — the "decode numbers as fixed-width
/// lexicographic strings" half of the key codec's responsibility (§2),
/// used for sort-key parts such as sequence numbers.
pub fn encode_u64(n: u64) -> String {
	format!("{n:0width$}", width = WIDTH)
}

/// Inverse of [`encode_u64`].
pub fn decode_u64(s: &str) -> Result<u64, KeyCodecError> {
	if s.len() != WIDTH {
		return Err(KeyCodecError::InvalidNumber(format!(
			"expected {WIDTH} digits, got {}",
			s.len()
		)));
	}
	s.parse().map_err(|_| KeyCodecError::InvalidNumber(s.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips() {
		for n in [0u64, 1, 42, u64::MAX] {
			assert_eq!(decode_u64(&encode_u64(n)).unwrap(), n);
		}
	}

	#[test]
	fn ordering_matches_numeric_order() {
		let mut encoded: Vec<String> = [5u64, 1, 1000, 0, 42].iter().map(|&n| encode_u64(n)).collect();
		let mut numeric = vec![5u64, 1, 1000, 0, 42];
		encoded.sort();
		numeric.sort();
		let decoded: Vec<u64> = encoded.iter().map(|s| decode_u64(s).unwrap()).collect();
		assert_eq!(decoded, numeric);
	}

	#[test]
	fn rejects_wrong_width() {
		assert!(decode_u64("123").is_err());
	}
}
