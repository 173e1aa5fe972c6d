use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of a public verification token.
const VERIFICATION_TOKEN_LEN: usize = 24;

/// Length of a numeric retrieval code.
const CODIGO_RETIRO_LEN: usize = 6;

/// Generate the opaque token embedded in a printed QR code.
///
/// Alphanumeric, long enough that guessing one is not a realistic way to
/// enumerate escrituras.
pub fn generate_verification_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(VERIFICATION_TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Generate the numeric code a client quotes at the counter to pick up a
/// finished document.
pub fn generate_codigo_retiro() -> String {
    let mut rng = rand::rng();
    (0..CODIGO_RETIRO_LEN)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_tokens_are_long_alphanumeric() {
        let token = generate_verification_token();
        assert_eq!(token.len(), VERIFICATION_TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn verification_tokens_differ() {
        assert_ne!(generate_verification_token(), generate_verification_token());
    }

    #[test]
    fn retiro_codes_are_numeric() {
        let code = generate_codigo_retiro();
        assert_eq!(code.len(), CODIGO_RETIRO_LEN);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }
}
