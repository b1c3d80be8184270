use std::fmt;

use crate::error::{CipherError, Result};

/// Upper-case letters, a space, then lower-case letters.
pub const DEFAULT_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ abcdefghijklmnopqrstuvwxyz";

/// Default rotation distance.
pub const DEFAULT_SHIFT: usize = 3;

/// Which way a channel rotates the bytes written to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Encode,
    Decode,
}

impl Direction {
    /// The direction that undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            Direction::Encode => Direction::Decode,
            Direction::Decode => Direction::Encode,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Encode => "encode",
            Direction::Decode => "decode",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered set of distinct bytes that the cipher rotates through.
#[derive(Clone)]
pub struct Alphabet {
    symbols: Vec<u8>,
    positions: [Option<u8>; 256],
}

impl Alphabet {
    pub fn new(symbols: impl AsRef<[u8]>) -> Result<Self> {
        let symbols = symbols.as_ref();
        if symbols.is_empty() {
            return Err(CipherError::EmptyAlphabet);
        }

        let mut positions = [None; 256];
        for (index, &byte) in symbols.iter().enumerate() {
            let slot = &mut positions[usize::from(byte)];
            if slot.is_some() {
                return Err(CipherError::DuplicateSymbol(byte));
            }
            // At most 256 distinct bytes, so every index fits.
            *slot = Some(index as u8);
        }

        Ok(Self {
            symbols: symbols.to_vec(),
            positions,
        })
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, byte: u8) -> bool {
        self.positions[usize::from(byte)].is_some()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.symbols
    }

    fn position(&self, byte: u8) -> Option<usize> {
        self.positions[usize::from(byte)].map(usize::from)
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_ALPHABET.as_bytes().to_vec(),
            positions: default_positions(),
        }
    }
}

impl fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Alphabet")
            .field(&String::from_utf8_lossy(&self.symbols))
            .finish()
    }
}

fn default_positions() -> [Option<u8>; 256] {
    let mut positions = [None; 256];
    for (index, &byte) in DEFAULT_ALPHABET.as_bytes().iter().enumerate() {
        positions[usize::from(byte)] = Some(index as u8);
    }
    positions
}

/// Alphabet rotation by a fixed distance.
#[derive(Debug, Clone)]
pub struct Caesar {
    alphabet: Alphabet,
    shift: usize,
}

impl Caesar {
    /// Build a cipher. The shift is reduced modulo the alphabet length.
    pub fn new(alphabet: Alphabet, shift: usize) -> Self {
        let shift = shift % alphabet.len();
        Self { alphabet, shift }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Effective rotation distance, already reduced modulo the alphabet length.
    pub fn shift(&self) -> usize {
        self.shift
    }

    /// Transform `bytes` in place.
    pub fn apply(&self, direction: Direction, bytes: &mut [u8]) {
        let len = self.alphabet.len();
        let step = match direction {
            Direction::Encode => self.shift,
            Direction::Decode => len - self.shift,
        };
        if step % len == 0 {
            return;
        }

        for byte in bytes.iter_mut() {
            if let Some(position) = self.alphabet.position(*byte) {
                *byte = self.alphabet.symbols[(position + step) % len];
            }
        }
    }

    pub fn encode(&self, bytes: &[u8]) -> Vec<u8> {
        self.transform(bytes, Direction::Encode)
    }

    pub fn decode(&self, bytes: &[u8]) -> Vec<u8> {
        self.transform(bytes, Direction::Decode)
    }

    pub fn transform(&self, bytes: &[u8], direction: Direction) -> Vec<u8> {
        let mut out = bytes.to_vec();
        self.apply(direction, &mut out);
        out
    }
}

impl Default for Caesar {
    fn default() -> Self {
        Self::new(Alphabet::default(), DEFAULT_SHIFT)
    }
}

/// Transform `bytes` over the default alphabet.
pub fn transform(bytes: &[u8], shift: usize, direction: Direction) -> Vec<u8> {
    Caesar::new(Alphabet::default(), shift).transform(bytes, direction)
}
