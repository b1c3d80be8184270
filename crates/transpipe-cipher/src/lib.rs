//! Reversible byte substitution for transpipe channels.
//!
//! A [`Caesar`] cipher rotates every byte found in its [`Alphabet`] by a fixed
//! distance and passes every other byte through unchanged. Output always has
//! the same length as input, and decoding with the same shift undoes encoding.

pub mod caesar;
pub mod error;

pub use caesar::{transform, Alphabet, Caesar, Direction, DEFAULT_ALPHABET, DEFAULT_SHIFT};
pub use error::{CipherError, Result};
