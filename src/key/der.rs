//! Constant DER prefix/footer tables for P-256 and P-384, SPKI (public) and
//! PKCS#8 (private), uncompressed-point framing only — compression is
//! applied at the multibase layer, never inside the DER itself.
//!
//! These are the fixed byte sequences every conformant SPKI/PKCS#8 encoder
//! produces for an EC key on these curves with no `parameters` field in the
//! `ECPrivateKey` (redundant with the outer `AlgorithmIdentifier`) and the
//! public key always present in the private-key encoding.

use crate::curve::Curve;

/// Bytes preceding the 64-byte (P-256) or 96-byte (P-384) raw `x‖y` point
/// in a SubjectPublicKeyInfo DER encoding of an uncompressed public key.
pub const P256_SPKI_UNCOMPRESSED_PREFIX: &[u8] = &[
    0x30, 0x59, 0x30, 0x13, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01, 0x06, 0x08, 0x2a,
    0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07, 0x03, 0x42, 0x00, 0x04,
];

pub const P384_SPKI_UNCOMPRESSED_PREFIX: &[u8] = &[
    0x30, 0x76, 0x30, 0x10, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01, 0x06, 0x05, 0x2b,
    0x81, 0x04, 0x00, 0x22, 0x03, 0x62, 0x00, 0x04,
];

/// Bytes preceding the raw `d` scalar in a PKCS#8 `PrivateKeyInfo` DER
/// encoding.
pub const P256_PKCS8_PREFIX: &[u8] = &[
    0x30, 0x81, 0x87, 0x02, 0x01, 0x00, 0x30, 0x13, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02,
    0x01, 0x06, 0x08, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07, 0x04, 0x6d, 0x30, 0x6b, 0x02,
    0x01, 0x01, 0x04, 0x20,
];

/// The 6 bytes of ASN.1 envelope between the raw `d` scalar and the raw
/// uncompressed public point trailer: `[1] EXPLICIT BIT STRING` header plus
/// the bit string's unused-bits byte and uncompressed-point tag.
pub const P256_PKCS8_FOOTER: &[u8] = &[0xa1, 0x44, 0x03, 0x42, 0x00, 0x04];

pub const P384_PKCS8_PREFIX: &[u8] = &[
    0x30, 0x81, 0xb6, 0x02, 0x01, 0x00, 0x30, 0x10, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02,
    0x01, 0x06, 0x05, 0x2b, 0x81, 0x04, 0x00, 0x22, 0x04, 0x81, 0x9e, 0x30, 0x81, 0x9b, 0x02, 0x01,
    0x01, 0x04, 0x30,
];

pub const P384_PKCS8_FOOTER: &[u8] = &[0xa1, 0x64, 0x03, 0x62, 0x00, 0x04];

pub fn spki_prefix(curve: Curve) -> &'static [u8] {
    match curve {
        Curve::P256 => P256_SPKI_UNCOMPRESSED_PREFIX,
        Curve::P384 => P384_SPKI_UNCOMPRESSED_PREFIX,
    }
}

pub fn pkcs8_prefix(curve: Curve) -> &'static [u8] {
    match curve {
        Curve::P256 => P256_PKCS8_PREFIX,
        Curve::P384 => P384_PKCS8_PREFIX,
    }
}

pub fn pkcs8_footer(curve: Curve) -> &'static [u8] {
    match curve {
        Curve::P256 => P256_PKCS8_FOOTER,
        Curve::P384 => P384_PKCS8_FOOTER,
    }
}

/// The "footer length" constant from spec.md §3: always 6 bytes of ASN.1
/// envelope between the private scalar and the public point trailer,
/// regardless of curve.
pub const FOOTER_LEN: usize = 6;
