//! Error kinds for every failure mode named in the cryptosuite specification.
//!
//! One enum covers codec, key, and proof-pipeline failures so callers match
//! on a single `Error` type regardless of which layer raised it.

use thiserror::Error;

/// Unified error type for the ECDSA Data Integrity suites.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad curve, missing DER prefix, missing `namedCurve`.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Bad base58/base64 input, missing `d` on a private JWK import.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// Malformed verification method, missing required key for the
    /// requested flag, or a curve mismatch.
    #[error("invalid keypair content: {0}")]
    InvalidKeypairContent(String),

    /// Key material of the wrong length for the declared (curve, flag).
    #[error("invalid keypair length: expected {expected}, got {actual}")]
    InvalidKeypairLength { expected: usize, actual: usize },

    /// DER length mismatch on export.
    #[error("keypair export error: {0}")]
    KeypairExport(String),

    /// Unsupported document type, or DER length mismatch on import.
    #[error("keypair import error: {0}")]
    KeypairImport(String),

    /// `expires` or `revoked` date is in the past and the corresponding
    /// check is enabled.
    #[error("keypair expired or revoked")]
    KeypairExpired,

    /// Wrong `type` or `cryptosuite` on entry to a suite.
    #[error("proof transformation error: {0}")]
    ProofTransformation(String),

    /// Wrong `type`/`cryptosuite`, invalid `created`, or unsupported curve
    /// during signing.
    #[error("proof generation error: {0}")]
    ProofGeneration(String),

    /// Malformed proof value, header mismatch, CBOR decode failure, or a
    /// signature-count mismatch during SD verification.
    #[error("proof verification error: {0}")]
    ProofVerification(String),

    /// The resolved verification method lacks the required key.
    #[error("invalid verification method: {0}")]
    InvalidVerificationMethod(String),
}

pub type Result<T> = std::result::Result<T, Error>;
