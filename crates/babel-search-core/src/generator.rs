//! Deterministic page generation over the Babel alphabet.
//!
//! This module is the address authority of the engine: a pure, total mapping
//! from arbitrary address strings to 3200-character pages over the 29-symbol
//! alphabet `{' ', ',', '.', 'a'..'z'}`.
//!
//! # Algorithm
//!
//! Each output position is keyed independently: position `i` of the page for
//! address `a` is `ALPHABET[v mod 29]` where `v` is the big-endian u64 taken
//! from the first 8 bytes of `SHA-256(a || ":" || i)`. SHA-256 acts as a
//! keyed PRF, so every character is independently pseudo-random yet
//! perfectly reproducible, and the `mod 29` bias is negligible.
//!
//! The alphabet and page length are compile-time constants; they are part
//! of the page format, not runtime configuration.
//!
//! Addresses are opaque identifiers. Lowercase hex is the conventional
//! form (everything this crate derives is lowercase hex), but the generator
//! accepts any byte string, including the empty string.

use sha2::{Digest, Sha256};
use thiserror::Error;

/// The 29-symbol page alphabet: space, comma, period, then `a..z`.
pub const ALPHABET: [char; 29] = [
    ' ', ',', '.', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p',
    'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Number of symbols in every page.
pub const PAGE_LENGTH: usize = 3200;

/// Length of derived short-form addresses (`random_address`,
/// `query_to_address`), in hex digits.
const SHORT_ADDRESS_LEN: usize = 32;

/// Label mixed into seed-derived addresses so they occupy a namespace
/// distinct from query- and n-gram-derived addresses.
const SEED_ADDRESS_LABEL: &str = "babel:seed";

/// A structural defect found by [`validate_page`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageDefect {
    /// The page is not exactly [`PAGE_LENGTH`] symbols long.
    #[error("invalid page length: expected {expected}, got {actual}")]
    WrongLength {
        /// Required symbol count
        expected: usize,
        /// Observed symbol count
        actual: usize,
    },

    /// A symbol outside the 29-symbol alphabet appears in the page.
    #[error("invalid character {symbol:?} at position {position}")]
    InvalidSymbol {
        /// Zero-based offset of the first offending symbol
        position: usize,
        /// The offending symbol
        symbol: char,
    },
}

/// Check whether `symbol` belongs to the page alphabet.
#[inline]
#[must_use]
pub fn is_alphabet_symbol(symbol: char) -> bool {
    matches!(symbol, ' ' | ',' | '.' | 'a'..='z')
}

/// Deterministically generate the page behind `address`.
///
/// Total function: any byte string is a valid address, the empty string
/// included, and the same address always yields a byte-identical page.
///
/// # Example
///
/// ```
/// use babel_search_core::generator::{address_to_page, PAGE_LENGTH};
///
/// let page = address_to_page("deadbeef");
/// assert_eq!(page.len(), PAGE_LENGTH);
/// assert_eq!(page, address_to_page("deadbeef"));
/// ```
#[must_use]
pub fn address_to_page(address: &str) -> String {
    let mut page = String::with_capacity(PAGE_LENGTH);

    for i in 0..PAGE_LENGTH {
        let mut hasher = Sha256::new();
        hasher.update(address.as_bytes());
        hasher.update(b":");
        hasher.update(i.to_string().as_bytes());
        let digest = hasher.finalize();

        let mut word = [0u8; 8];
        word.copy_from_slice(&digest[..8]);
        let v = u64::from_be_bytes(word);
        page.push(ALPHABET[(v % ALPHABET.len() as u64) as usize]);
    }

    page
}

/// Validate that `page` is a well-formed Babel page.
///
/// Strict: exactly [`PAGE_LENGTH`] symbols, every one in the alphabet.
/// Returns the first defect found.
pub fn validate_page(page: &str) -> Result<(), PageDefect> {
    let mut count = 0usize;
    for (position, symbol) in page.chars().enumerate() {
        if !is_alphabet_symbol(symbol) {
            return Err(PageDefect::InvalidSymbol { position, symbol });
        }
        count = position + 1;
    }
    if count != PAGE_LENGTH {
        return Err(PageDefect::WrongLength {
            expected: PAGE_LENGTH,
            actual: count,
        });
    }
    Ok(())
}

/// Derive a deterministic address from an optional seed.
///
/// The same seed always produces the same address; an absent seed uses the
/// canonical seed `0`, so the no-seed address is a stable constant. The
/// result is 32 lowercase hex digits.
#[must_use]
pub fn random_address(seed: Option<u64>) -> String {
    let seed = seed.unwrap_or(0);
    let digest = Sha256::digest(format!("{SEED_ADDRESS_LABEL}:{seed}").as_bytes());
    let mut address = hex_lower(&digest);
    address.truncate(SHORT_ADDRESS_LEN);
    address
}

/// Derive a stable address from an arbitrary query string.
///
/// Outer whitespace is trimmed before hashing, so `" foo "` and `"foo"`
/// share an address. The result is 32 lowercase hex digits.
#[must_use]
pub fn query_to_address(query: &str) -> String {
    let digest = Sha256::digest(query.trim().as_bytes());
    let mut address = hex_lower(&digest);
    address.truncate(SHORT_ADDRESS_LEN);
    address
}

/// Lowercase hex rendering of a byte slice.
pub(crate) fn hex_lower(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // Writing into a String cannot fail.
        let _ = write!(out, "{byte:02x}");
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================
