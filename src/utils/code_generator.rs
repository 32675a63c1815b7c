//! Short code generation and validation utilities.
//!
//! Codes are drawn uniformly from a configurable alphanumeric alphabet.
//! Uniqueness is not the generator's job: the store rejects duplicates and
//! the service retries with a fresh candidate.

use crate::error::AppError;
use rand::Rng;
use serde_json::json;
use std::collections::HashSet;

/// Default alphabet: ASCII letters followed by digits.
pub const DEFAULT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Default length of generated codes.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Upper bound for any short code, generated or custom.
pub const MAX_CODE_LENGTH: usize = 32;

/// Draws `length` characters independently and uniformly from `alphabet`.
///
/// Not cryptographically unpredictable; uses the thread-local RNG.
///
/// # Panics
///
/// Panics if `alphabet` is empty and `length` is non-zero.
///
/// # Examples
///
/// ```ignore
/// let alphabet: Vec<char> = "abc".chars().collect();
/// let code = generate_code(&alphabet, 6);
/// assert_eq!(code.len(), 6);
/// ```
pub fn generate_code(alphabet: &[char], length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())])
        .collect()
}

/// A validated alphabet and length pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeGenerator {
    alphabet: Vec<char>,
    length: usize,
}

impl CodeGenerator {
    /// Creates a generator after validating its settings.
    ///
    /// # Rules
    ///
    /// - Alphabet is non-empty, ASCII alphanumeric, without duplicates
    /// - Length is between 1 and [`MAX_CODE_LENGTH`]
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if any rule is violated.
    pub fn new(alphabet: &str, length: usize) -> Result<Self, AppError> {
        if alphabet.is_empty() {
            return Err(AppError::bad_request(
                "Code alphabet must not be empty",
                json!({}),
            ));
        }

        if let Some(bad) = alphabet.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(AppError::bad_request(
                "Code alphabet may only contain ASCII letters and digits",
                json!({ "character": bad.to_string() }),
            ));
        }

        let alphabet: Vec<char> = alphabet.chars().collect();
        let unique: HashSet<&char> = alphabet.iter().collect();
        if unique.len() != alphabet.len() {
            return Err(AppError::bad_request(
                "Code alphabet contains duplicate characters",
                json!({}),
            ));
        }

        if length == 0 || length > MAX_CODE_LENGTH {
            return Err(AppError::bad_request(
                format!("Code length must be 1-{MAX_CODE_LENGTH}"),
                json!({ "length": length }),
            ));
        }

        Ok(Self { alphabet, length })
    }

    /// Draws one candidate code.
    pub fn generate(&self) -> String {
        generate_code(&self.alphabet, self.length)
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self {
            alphabet: DEFAULT_ALPHABET.chars().collect(),
            length: DEFAULT_CODE_LENGTH,
        }
    }
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 1 to [`MAX_CODE_LENGTH`] characters
/// - Allowed characters: ASCII letters and digits
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if code.is_empty() || code.len() > MAX_CODE_LENGTH {
        return Err(AppError::bad_request(
            format!("Custom code must be 1-{MAX_CODE_LENGTH} characters"),
            json!({ "provided_length": code.len() }),
        ));
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::bad_request(
            "Custom code can only contain letters and digits",
            json!({ "code": code }),
        ));
    }

    Ok(())
}
