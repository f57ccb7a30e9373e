//! One-time code generation

use rand::Rng;
use thiserror::Error;

/// Digits in an issued OTP.
pub const OTP_LENGTH: usize = 6;

#[derive(Error, Debug)]
pub enum OtpError {
    #[error("otp length must be greater than zero")]
    InvalidLength,
}

/// Generate a numeric one-time code of `length` digits.
///
/// Each digit is drawn independently and uniformly from `thread_rng`, a
/// CSPRNG seeded by the operating system; `gen_range` samples without
/// modulo bias. A zero length is rejected before any randomness is drawn.
pub fn generate_numeric_otp(length: usize) -> Result<String, OtpError> {
    if length == 0 {
        return Err(OtpError::InvalidLength);
    }

    let mut rng = rand::thread_rng();
    let code = (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();

    Ok(code)
}
