/// Splitting of notarial protocol numbers into prefix + trailing sequence.
///
/// A protocol number like `20241701022P04128` is a filing code whose tail is
/// a numeric sequence (`4128`) and whose head is an office/year/book prefix
/// (`20241701022P`). The split point is the boundary between the maximal
/// trailing run of ASCII digits and whatever precedes it.

/// Split a protocol number into `(prefix, sequence)`.
///
/// Returns `None` when the code has no trailing digit run at all, or when
/// the trailing run does not fit in a `u64`. Both cases are treated by
/// callers as *invalid codes* — a counted condition, never an error.
///
/// Leading zeros contribute to the printed width but not to the value:
/// `"A004128"` splits to `("A", 4128)`.
pub fn split_protocol(code: &str) -> Option<(&str, u64)> {
    let bytes = code.as_bytes();
    let mut start = bytes.len();
    while start > 0 && bytes[start - 1].is_ascii_digit() {
        start -= 1;
    }
    if start == bytes.len() {
        return None;
    }
    // Slicing at `start` is safe: ASCII digit bytes never occur inside a
    // multi-byte UTF-8 sequence.
    let seq: u64 = code[start..].parse().ok()?;
    Some((&code[..start], seq))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_prefix_and_trailing_sequence() {
        assert_eq!(
            split_protocol("20241701022P04128"),
            Some(("20241701022P", 4128))
        );
        assert_eq!(split_protocol("A001"), Some(("A", 1)));
        assert_eq!(split_protocol("B010"), Some(("B", 10)));
    }

    #[test]
    fn leading_zeros_affect_width_not_value() {
        assert_eq!(split_protocol("X004128"), Some(("X", 4128)));
        assert_eq!(split_protocol("X000"), Some(("X", 0)));
    }

    #[test]
    fn all_digit_code_has_empty_prefix() {
        assert_eq!(split_protocol("004128"), Some(("", 4128)));
    }

    #[test]
    fn no_trailing_digits_is_invalid() {
        assert_eq!(split_protocol("X"), None);
        assert_eq!(split_protocol(""), None);
        assert_eq!(split_protocol("123A"), None);
        assert_eq!(split_protocol("A-"), None);
    }

    #[test]
    fn oversized_sequence_is_invalid() {
        // 30 digits cannot fit in a u64.
        assert_eq!(split_protocol("P123456789012345678901234567890"), None);
    }

    #[test]
    fn non_ascii_prefix_is_preserved() {
        assert_eq!(split_protocol("AÑO2024P17"), Some(("AÑO2024P", 17)));
    }
}
