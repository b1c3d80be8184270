/// Errors that can occur when building a cipher alphabet.
#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    /// The alphabet has no symbols.
    #[error("alphabet must not be empty")]
    EmptyAlphabet,

    /// A byte occurs more than once in the alphabet.
    #[error("alphabet contains byte 0x{0:02x} more than once")]
    DuplicateSymbol(u8),
}

pub type Result<T> = std::result::Result<T, CipherError>;
