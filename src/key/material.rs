//! `keyToMaterial` / `materialToPublicKey` / `materialToPrivateKey`: the
//! conversions between curve-native key handles and the spec's raw-octet
//! "material," validated bit-exactly against the DER tables in [`super::der`].

use p256::pkcs8::{EncodePrivateKey, EncodePublicKey};

use super::der;
use crate::curve::Curve;
use crate::error::{Error, Result};

/// A public-key handle, one variant per curve this suite accepts.
#[derive(Debug, Clone)]
pub enum PublicKeyHandle {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
}

/// A private-key handle, one variant per curve this suite accepts.
#[derive(Clone)]
pub enum PrivateKeyHandle {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
}

/// Either a public or a private handle, for call sites that accept both.
pub enum KeyHandle {
    Public(PublicKeyHandle),
    Private(PrivateKeyHandle),
}

impl PublicKeyHandle {
    pub fn curve(&self) -> Curve {
        match self {
            PublicKeyHandle::P256(_) => Curve::P256,
            PublicKeyHandle::P384(_) => Curve::P384,
        }
    }
}

impl PrivateKeyHandle {
    pub fn curve(&self) -> Curve {
        match self {
            PrivateKeyHandle::P256(_) => Curve::P256,
            PrivateKeyHandle::P384(_) => Curve::P384,
        }
    }

    /// The handle's matching public key.
    pub fn public_handle(&self) -> PublicKeyHandle {
        match self {
            PrivateKeyHandle::P256(sk) => PublicKeyHandle::P256(*sk.verifying_key()),
            PrivateKeyHandle::P384(sk) => PublicKeyHandle::P384(*sk.verifying_key()),
        }
    }
}

/// `keyToMaterial` for a public handle: export SPKI DER, validate the
/// canonical uncompressed prefix and total length, and return the raw
/// uncompressed `x‖y` point.
pub fn key_to_material_public(handle: &PublicKeyHandle) -> Result<Vec<u8>> {
    let curve = handle.curve();
    let der_bytes: Vec<u8> = match handle {
        PublicKeyHandle::P256(k) => k
            .to_public_key_der()
            .map_err(|e| Error::KeypairExport(format!("SPKI export failed: {e}")))?
            .as_bytes()
            .to_vec(),
        PublicKeyHandle::P384(k) => k
            .to_public_key_der()
            .map_err(|e| Error::KeypairExport(format!("SPKI export failed: {e}")))?
            .as_bytes()
            .to_vec(),
    };
    let prefix = der::spki_prefix(curve);
    if !der_bytes.starts_with(prefix) {
        return Err(Error::Encoding(
            "SPKI export missing canonical uncompressed DER prefix".into(),
        ));
    }
    let lens = curve.lengths();
    let expected_total = prefix.len() + lens.public_uncompressed;
    if der_bytes.len() != expected_total {
        return Err(Error::KeypairExport(format!(
            "SPKI total length {} does not match expected {}",
            der_bytes.len(),
            expected_total
        )));
    }
    Ok(der_bytes[prefix.len()..].to_vec())
}

/// `keyToMaterial` for a private handle: export PKCS#8 DER, validate the
/// canonical prefix, the embedded-public-key footer, and total length, and
/// return the raw private scalar `d`.
pub fn key_to_material_private(handle: &PrivateKeyHandle) -> Result<Vec<u8>> {
    let curve = handle.curve();
    let der_bytes: Vec<u8> = match handle {
        PrivateKeyHandle::P256(k) => k
            .to_pkcs8_der()
            .map_err(|e| Error::KeypairExport(format!("PKCS#8 export failed: {e}")))?
            .as_bytes()
            .to_vec(),
        PrivateKeyHandle::P384(k) => k
            .to_pkcs8_der()
            .map_err(|e| Error::KeypairExport(format!("PKCS#8 export failed: {e}")))?
            .as_bytes()
            .to_vec(),
    };
    let prefix = der::pkcs8_prefix(curve);
    if !der_bytes.starts_with(prefix) {
        return Err(Error::Encoding(
            "PKCS#8 export missing canonical private-key DER prefix".into(),
        ));
    }
    let lens = curve.lengths();
    let footer = der::pkcs8_footer(curve);
    let expected_total = prefix.len() + lens.private + footer.len() + lens.public_uncompressed;
    if der_bytes.len() != expected_total {
        return Err(Error::KeypairExport(format!(
            "PKCS#8 total length {} does not match expected {}",
            der_bytes.len(),
            expected_total
        )));
    }
    let d_start = prefix.len();
    let d_end = d_start + lens.private;
    let footer_end = d_end + footer.len();
    if &der_bytes[d_end..footer_end] != footer {
        return Err(Error::KeypairExport(
            "PKCS#8 export has unexpected footer envelope".into(),
        ));
    }
    Ok(der_bytes[d_start..d_end].to_vec())
}

/// `materialToPublicKey`: reconstruct a public handle from SEC1 bytes
/// (compressed or uncompressed point encoding both decode cleanly; the
/// selective-disclosure core always feeds compressed material here).
pub fn material_to_public_key(material: &[u8], curve: Curve) -> Result<PublicKeyHandle> {
    match curve {
        Curve::P256 => {
            let vk = p256::ecdsa::VerifyingKey::from_sec1_bytes(material)
                .map_err(|e| Error::KeypairImport(format!("bad P-256 public material: {e}")))?;
            Ok(PublicKeyHandle::P256(vk))
        }
        Curve::P384 => {
            let vk = p384::ecdsa::VerifyingKey::from_sec1_bytes(material)
                .map_err(|e| Error::KeypairImport(format!("bad P-384 public material: {e}")))?;
            Ok(PublicKeyHandle::P384(vk))
        }
    }
}

/// `materialToPrivateKey`: reconstruct a private handle directly from the
/// raw scalar `d`; the matching public point is re-derived by the curve
/// arithmetic rather than round-tripped through an empty-`x`/`y` JWK.
pub fn material_to_private_key(material: &[u8], curve: Curve) -> Result<PrivateKeyHandle> {
    let lens = curve.lengths();
    if material.len() != lens.private {
        return Err(Error::InvalidKeypairLength {
            expected: lens.private,
            actual: material.len(),
        });
    }
    match curve {
        Curve::P256 => {
            let sk = p256::ecdsa::SigningKey::from_slice(material)
                .map_err(|e| Error::KeypairImport(format!("bad P-256 private material: {e}")))?;
            Ok(PrivateKeyHandle::P256(sk))
        }
        Curve::P384 => {
            let sk = p384::ecdsa::SigningKey::from_slice(material)
                .map_err(|e| Error::KeypairImport(format!("bad P-384 private material: {e}")))?;
            Ok(PrivateKeyHandle::P384(sk))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::OsRng;

    #[test]
    fn p256_material_round_trips_through_public_key() {
        let sk = p256::ecdsa::SigningKey::random(&mut OsRng);
        let pk = PublicKeyHandle::P256(*sk.verifying_key());
        let material = key_to_material_public(&pk).unwrap();
        assert_eq!(material.len(), 64);
        let rebuilt = material_to_public_key(&material, Curve::P256).unwrap();
        let rebuilt_material = key_to_material_public(&rebuilt).unwrap();
        assert_eq!(material, rebuilt_material);
    }

    #[test]
    fn p384_private_material_is_48_bytes() {
        let sk = p384::ecdsa::SigningKey::random(&mut OsRng);
        let handle = PrivateKeyHandle::P384(sk);
        let material = key_to_material_private(&handle).unwrap();
        assert_eq!(material.len(), 48);
        let rebuilt = material_to_private_key(&material, Curve::P384).unwrap();
        assert!(matches!(rebuilt, PrivateKeyHandle::P384(_)));
    }

    #[test]
    fn wrong_length_private_material_errors() {
        let err = material_to_private_key(&[0u8; 10], Curve::P256).unwrap_err();
        assert!(matches!(err, Error::InvalidKeypairLength { .. }));
    }
}
