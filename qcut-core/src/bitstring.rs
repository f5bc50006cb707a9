//! Bitstring conventions
//!
//! Character `i` of a bitstring is node (qubit) `i`. In a state vector index,
//! qubit `q` is bit `q` (little-endian), so the first character of the string
//! is the least significant bit of the index.

/// Convert a basis-state index to a bitstring of `num_bits` characters
///
/// # Example
/// ```
/// use qcut_core::index_to_bitstring;
///
/// // qubit 0 set, qubit 1 clear
/// assert_eq!(index_to_bitstring(0b01, 2), "10");
/// ```
pub fn index_to_bitstring(index: usize, num_bits: usize) -> String {
    (0..num_bits)
        .map(|q| if (index >> q) & 1 == 1 { '1' } else { '0' })
        .collect()
}

/// Convert a bit slice (position `i` = qubit `i`) to a basis-state index
pub fn bits_to_index(bits: &[u8]) -> usize {
    bits.iter()
        .enumerate()
        .fold(0usize, |acc, (q, &b)| acc | ((b as usize & 1) << q))
}

/// Parse a bitstring into bits, returning `None` on any non-binary character
pub fn parse_bitstring(bitstring: &str) -> Option<Vec<u8>> {
    bitstring
        .chars()
        .map(|c| match c {
            '0' => Some(0u8),
            '1' => Some(1u8),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_to_bitstring_little_endian() {
        assert_eq!(index_to_bitstring(0, 3), "000");
        assert_eq!(index_to_bitstring(1, 3), "100");
        assert_eq!(index_to_bitstring(4, 3), "001");
        assert_eq!(index_to_bitstring(6, 3), "011");
    }

    #[test]
    fn test_bits_to_index_inverse() {
        for index in 0..16 {
            let bits = parse_bitstring(&index_to_bitstring(index, 4)).unwrap();
            assert_eq!(bits_to_index(&bits), index);
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_bitstring("01"), Some(vec![0, 1]));
        assert!(parse_bitstring("0x1").is_none());
        assert_eq!(parse_bitstring(""), Some(vec![]));
    }
}
