//! The curve enumeration every curve-parameterized operation selects from.

use crate::error::{Error, Result};

/// The two curves this suite ever accepts. No other curve is ever valid
/// input to `digest`, `keyToMaterial`, or any multibase/JWK conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Curve {
    P256,
    P384,
}

/// Byte lengths of public/private key material, keyed by (curve, flag).
pub struct MaterialLengths {
    pub public_uncompressed: usize,
    pub public_compressed: usize,
    pub private: usize,
}

impl Curve {
    pub const fn digest_len(self) -> usize {
        match self {
            Curve::P256 => 32,
            Curve::P384 => 48,
        }
    }

    pub const fn lengths(self) -> MaterialLengths {
        match self {
            Curve::P256 => MaterialLengths {
                public_uncompressed: 64,
                public_compressed: 33,
                private: 32,
            },
            Curve::P384 => MaterialLengths {
                public_uncompressed: 96,
                public_compressed: 49,
                private: 48,
            },
        }
    }

    /// Two-byte multicodec varint header for a public key on this curve.
    pub const fn public_multicodec(self) -> [u8; 2] {
        match self {
            Curve::P256 => [0x80, 0x24],
            Curve::P384 => [0x81, 0x24],
        }
    }

    /// Two-byte multicodec varint header for a private key on this curve.
    pub const fn private_multicodec(self) -> [u8; 2] {
        match self {
            Curve::P256 => [0x86, 0x26],
            Curve::P384 => [0x87, 0x26],
        }
    }

    /// `crv` JWK parameter for this curve.
    pub const fn jwk_crv(self) -> &'static str {
        match self {
            Curve::P256 => "P-256",
            Curve::P384 => "P-384",
        }
    }

    pub fn from_jwk_crv(crv: &str) -> Result<Self> {
        match crv {
            "P-256" => Ok(Curve::P256),
            "P-384" => Ok(Curve::P384),
            other => Err(Error::Encoding(format!("unsupported JWK crv {other}"))),
        }
    }

    /// Identify a curve from a public-key multicodec prefix.
    pub fn from_public_multicodec(prefix: [u8; 2]) -> Result<Self> {
        match prefix {
            [0x80, 0x24] => Ok(Curve::P256),
            [0x81, 0x24] => Ok(Curve::P384),
            _ => Err(Error::Decoding(format!(
                "unrecognized public key multicodec prefix {prefix:02x?}"
            ))),
        }
    }

    /// Identify a curve from a private-key multicodec prefix.
    pub fn from_private_multicodec(prefix: [u8; 2]) -> Result<Self> {
        match prefix {
            [0x86, 0x26] => Ok(Curve::P256),
            [0x87, 0x26] => Ok(Curve::P384),
            _ => Err(Error::Decoding(format!(
                "unrecognized private key multicodec prefix {prefix:02x?}"
            ))),
        }
    }
}
