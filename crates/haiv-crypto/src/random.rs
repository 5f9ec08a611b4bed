// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System CSPRNG access.

use haiv_core::HaivError;
use ring::rand::{SecureRandom, SystemRandom};

/// Fill `dest` with random bytes from the operating system.
pub fn fill(dest: &mut [u8]) -> Result<(), HaivError> {
    SystemRandom::new()
        .fill(dest)
        .map_err(|_| HaivError::Crypto("system random number generator failed".to_string()))
}

/// Return `N` random bytes.
pub fn random_bytes<const N: usize>() -> Result<[u8; N], HaivError> {
    let mut out = [0u8; N];
    fill(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successive_draws_differ() {
        let a: [u8; 32] = random_bytes().unwrap();
        let b: [u8; 32] = random_bytes().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn fill_handles_empty_buffer() {
        let mut empty: [u8; 0] = [];
        fill(&mut empty).unwrap();
    }
}
