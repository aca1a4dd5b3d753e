use rand::Rng;

/// Lower bound of the verification code range (inclusive).
const CODE_MIN: u32 = 10_000;
/// Upper bound of the verification code range (inclusive).
const CODE_MAX: u32 = 99_999;

/// Generates a random 5-digit numeric verification code.
///
/// The code is drawn uniformly from `10000..=99999`, so it never has a
/// leading zero and is always exactly five characters long.
///
/// # Examples
///
/// ```ignore
/// let code = generate_verification_code();
/// assert_eq!(code.len(), 5);
/// ```
pub fn generate_verification_code() -> String {
    rand::thread_rng()
        .gen_range(CODE_MIN..=CODE_MAX)
        .to_string()
}
