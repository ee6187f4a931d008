//! Curve-to-digest mapping. P-256 hashes with SHA-256, P-384 with SHA-384;
//! no other curve is ever accepted here.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha384};

use crate::curve::Curve;
use crate::error::{Error, Result};

/// Digest `bytes` with the hash function the curve mandates. Returns 32
/// raw bytes for P-256, 48 for P-384.
pub fn digest(curve: Curve, bytes: &[u8]) -> Vec<u8> {
    match curve {
        Curve::P256 => Sha256::digest(bytes).to_vec(),
        Curve::P384 => Sha384::digest(bytes).to_vec(),
    }
}

/// HMAC-SHA-256, keyed by `key`. Always SHA-256 regardless of the issuer's
/// signing curve: the HMAC-Id label map's 32-byte output is baked into the
/// `compressedLabelMap`/`hmacKey` wire invariants (spec.md §3), so a P-384
/// issuer's blank-node labels stay P-256-sized just like the proof-scoped
/// keypair already is.
pub fn hmac(key: &[u8], bytes: &[u8]) -> Result<Vec<u8>> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key)
        .map_err(|e| Error::Encoding(format!("bad HMAC key: {e}")))?;
    mac.update(bytes);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Hash the concatenation of a set of mandatory N-Quads, taken in ascending
/// absolute-index order, per the `hashMandatoryNQuads` helper. Concatenates
/// once and hashes once: callers must not pre-concatenate and re-hash.
pub fn hash_mandatory_nquads(curve: Curve, nquads_in_order: &[&str]) -> Vec<u8> {
    let mut joined = String::new();
    for nq in nquads_in_order {
        joined.push_str(nq);
    }
    digest(curve, joined.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn p256_digest_is_32_bytes() {
        assert_eq!(digest(Curve::P256, b"hello").len(), 32);
    }

    #[test]
    fn p384_digest_is_48_bytes() {
        assert_eq!(digest(Curve::P384, b"hello").len(), 48);
    }

    #[test]
    fn empty_mandatory_hash_equals_digest_of_empty() {
        let empty: &[&str] = &[];
        assert_eq!(
            hash_mandatory_nquads(Curve::P256, empty),
            digest(Curve::P256, b"")
        );
    }
}
