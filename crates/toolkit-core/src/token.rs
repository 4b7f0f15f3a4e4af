//! Random token generation.

use std::sync::Arc;

use rand::Rng;

use crate::{Error, Result};

/// Characters used for generated filenames.
///
/// Stored uploads are named from this exact set; changing it breaks
/// compatibility with names already on disk.
pub const DEFAULT_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0987654321_+";

/// Generates random strings over a fixed alphabet.
///
/// Each character is drawn independently and uniformly from the alphabet
/// using the thread-local CSPRNG, which is seeded from the operating
/// system's entropy source. The generator holds no mutable state, so a
/// single instance can be shared freely between tasks.
#[derive(Debug, Clone)]
pub struct RandomTokenGenerator {
    alphabet: Arc<[char]>,
}

impl Default for RandomTokenGenerator {
    fn default() -> Self {
        Self {
            alphabet: DEFAULT_ALPHABET.chars().collect(),
        }
    }
}

impl RandomTokenGenerator {
    /// Creates a generator over [`DEFAULT_ALPHABET`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator over a custom alphabet.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the alphabet is empty.
    pub fn with_alphabet(alphabet: &str) -> Result<Self> {
        let alphabet: Arc<[char]> = alphabet.chars().collect();
        if alphabet.is_empty() {
            return Err(Error::config("token alphabet cannot be empty"));
        }
        Ok(Self { alphabet })
    }

    /// Returns the alphabet characters are drawn from.
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    /// Returns a random string of exactly `len` characters.
    pub fn generate(&self, len: usize) -> String {
        let mut rng = rand::rng();
        (0..len)
            .map(|_| self.alphabet[rng.random_range(0..self.alphabet.len())])
            .collect()
    }
}
