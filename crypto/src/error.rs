use thiserror::Error;

/// Errors raised while decoding administrative key material.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("private key is empty")]
    Empty,

    #[error("hex private key must be 32 bytes (64 hex digits after 0x)")]
    InvalidHex,

    #[error("invalid bech32 private key: {0}")]
    InvalidBech32(String),

    #[error("bech32 private key has prefix {0:?}, expected \"suiprivkey\"")]
    WrongHrp(String),

    #[error("private key is neither 0x-hex, suiprivkey bech32 nor base64")]
    InvalidBase64,

    #[error("unsupported signature scheme flag {0:#04x}; only Ed25519 (0x00) is supported")]
    UnsupportedScheme(u8),

    #[error("decoded private key has unsupported length {0} (expected 32, 33 or 64 bytes)")]
    UnsupportedLength(usize),

    #[error("64-byte key: public half does not match the secret half")]
    PublicKeyMismatch,
}
