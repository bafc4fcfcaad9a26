//! Salted PBKDF2 password hashes.
//!
//! Hashes are stored as `pbkdf2-sha256$<iterations>$<salt>$<hash>` with the
//! salt and hash base64 encoded, so the cost can be raised later without
//! invalidating existing accounts.

use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use rand::prelude::*;
use ring::{digest, pbkdf2};
use std::num::NonZeroU32;

const SCHEME: &str = "pbkdf2-sha256";
const ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;

static ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;

struct PasswordHash {
    iterations: NonZeroU32,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

impl PasswordHash {
    fn parse(stored: &str) -> Result<PasswordHash> {
        let mut parts = stored.split('$');

        if parts.next() != Some(SCHEME) {
            return Err(anyhow!("unknown password scheme"));
        }

        let iterations = parts
            .next()
            .ok_or_else(|| anyhow!("missing iteration count"))?
            .parse::<u32>()?;
        let iterations =
            NonZeroU32::new(iterations).ok_or_else(|| anyhow!("zero iteration count"))?;

        let salt = parts.next().ok_or_else(|| anyhow!("missing salt"))?;
        let salt = STANDARD_NO_PAD.decode(salt)?;

        let hash = parts.next().ok_or_else(|| anyhow!("missing hash"))?;
        let hash = STANDARD_NO_PAD.decode(hash)?;

        if parts.next().is_some() || hash.len() != digest::SHA256_OUTPUT_LEN {
            return Err(anyhow!("malformed password hash"));
        }

        Ok(PasswordHash {
            iterations,
            salt,
            hash,
        })
    }
}

/// Hashes `password` with a fresh random salt.
pub fn hash(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill(&mut salt);

    let iterations = NonZeroU32::new(ITERATIONS).unwrap();
    let mut hash = [0u8; digest::SHA256_OUTPUT_LEN];
    pbkdf2::derive(ALGORITHM, iterations, &salt, password.as_bytes(), &mut hash);

    format!(
        "{}${}${}${}",
        SCHEME,
        iterations,
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(hash),
    )
}

/// Checks `password` against a stored hash in constant time.
///
/// A stored value that isn't a hash never verifies.
pub fn verify(stored: &str, password: &str) -> bool {
    match PasswordHash::parse(stored) {
        Err(_err) => false,
        Ok(parsed) => pbkdf2::verify(
            ALGORITHM,
            parsed.iterations,
            &parsed.salt,
            password.as_bytes(),
            &parsed.hash,
        )
        .is_ok(),
    }
}

pub fn is_hash(stored: &str) -> bool {
    PasswordHash::parse(stored).is_ok()
}
