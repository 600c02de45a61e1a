//! Password digests.
//!
//! Argon2i with fixed cost parameters and a fixed application salt, so a
//! password always maps to the same digest. There is no per-account salt;
//! identical passwords produce identical stored digests.

use argon2::{Algorithm, Argon2, Params, Version};

use crate::constants::{
    HASH_MEMORY_KIB, HASH_OUTPUT_LENGTH, HASH_PARALLELISM, HASH_SALT, HASH_TIME_COST,
};
use crate::errors::AppError;

/// Fixed-length password digest
pub type Digest = [u8; HASH_OUTPUT_LENGTH];

fn hasher() -> Result<Argon2<'static>, AppError> {
    let params = Params::new(
        HASH_MEMORY_KIB,
        HASH_TIME_COST,
        HASH_PARALLELISM,
        Some(HASH_OUTPUT_LENGTH),
    )
    .map_err(|e| AppError::internal(format!("Invalid Argon2 parameters: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2i, Version::V0x13, params))
}

/// Derive the digest of `password`.
///
/// Deliberately slow (32 MiB, 2 passes); call it off the async executor.
pub fn hash_password(password: &str) -> Result<Digest, AppError> {
    let mut out = [0u8; HASH_OUTPUT_LENGTH];
    hasher()?
        .hash_password_into(password.as_bytes(), HASH_SALT, &mut out)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;
    Ok(out)
}

/// Check `password` against a stored digest.
pub fn verify_password(password: &str, stored: &[u8]) -> Result<bool, AppError> {
    let computed = hash_password(password)?;
    Ok(constant_time_eq(&computed, stored))
}

/// Byte comparison whose running time does not depend on where the inputs differ.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
