use crate::{Error, Result};

/// Confidence a verifier requires when none is configured.
pub const DEFAULT_MIN_THRESHOLD: f64 = 0.95;

/// Converts a target confidence into the number of rounds to run.
///
/// A cheating prover survives each round with probability 1/2, so `n` rounds
/// leave a failure probability of `2^-n`. Returns the smallest `n >= 1` with
/// `2^-n <= 1 - min_threshold`.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] unless `0 < min_threshold < 1`.
///
/// # Examples
///
/// ```rust
/// use schnorr_zkp::required_rounds;
///
/// assert_eq!(required_rounds(0.95).unwrap(), 5);
/// assert_eq!(required_rounds(0.5).unwrap(), 1);
/// ```
pub fn required_rounds(min_threshold: f64) -> Result<u32> {
    if !(min_threshold > 0.0 && min_threshold < 1.0) {
        return Err(Error::MalformedInput(format!(
            "minimum threshold must lie in (0, 1), got {min_threshold}"
        )));
    }

    let max_failure = 1.0 - min_threshold;
    let mut rounds = 1u32;
    let mut failure = 0.5f64;
    while failure > max_failure {
        rounds += 1;
        failure /= 2.0;
    }

    Ok(rounds)
}
