//! `keyToJwk` / `jwkToKey`: value-level transcoding between key handles and
//! EC-type JWKs (RFC 7517), plus the JWK thumbprint (RFC 7638) used to mint
//! a verification method `id` when none is supplied.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use super::material::{
    key_to_material_private, key_to_material_public, material_to_private_key,
    material_to_public_key, PrivateKeyHandle, PublicKeyHandle,
};
use crate::codec::{raw_decode, raw_encode};
use crate::curve::Curve;
use crate::error::{Error, Result};

/// An EC-type JSON Web Key. Field order is fixed (`kty`, `crv`, `x`, `y`,
/// `d`) so that two callers serializing the same key produce the same
/// bytes — this crate's chosen resolution of the "implementations SHOULD
/// pick a canonical JWK serialization" note in the suite's open questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
    pub y: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
}

impl Jwk {
    pub fn curve(&self) -> Result<Curve> {
        Curve::from_jwk_crv(&self.crv)
    }

    /// The same JWK with `d` dropped, as embedded in a public verification
    /// method and as fed to [`jwk_thumbprint`].
    pub fn public_view(&self) -> Jwk {
        Jwk {
            kty: self.kty.clone(),
            crv: self.crv.clone(),
            x: self.x.clone(),
            y: self.y.clone(),
            d: None,
        }
    }
}

/// `keyToJwk` for a public handle.
pub fn key_to_jwk_public(handle: &PublicKeyHandle) -> Result<Jwk> {
    let curve = handle.curve();
    let material = key_to_material_public(handle)?;
    let (x, y) = material.split_at(material.len() / 2);
    Ok(Jwk {
        kty: "EC".to_string(),
        crv: curve.jwk_crv().to_string(),
        x: raw_encode(x),
        y: raw_encode(y),
        d: None,
    })
}

/// `keyToJwk` for a private handle. The matching public point is derived
/// from the curve's own arithmetic, not carried separately.
pub fn key_to_jwk_private(handle: &PrivateKeyHandle) -> Result<Jwk> {
    let curve = handle.curve();
    let public = key_to_jwk_public(&handle.public_handle())?;
    let mut d = key_to_material_private(handle)?;
    let encoded_d = raw_encode(&d);
    d.zeroize();
    Ok(Jwk {
        kty: "EC".to_string(),
        crv: curve.jwk_crv().to_string(),
        x: public.x,
        y: public.y,
        d: Some(encoded_d),
    })
}

/// `jwkToKey` for a public JWK: requires `kty = "EC"` and a recognised
/// `crv`, reassembles the uncompressed point from `x`/`y`.
pub fn jwk_to_public_key(jwk: &Jwk) -> Result<PublicKeyHandle> {
    require_ec(jwk)?;
    let curve = jwk.curve()?;
    let x = raw_decode(&jwk.x)?;
    let y = raw_decode(&jwk.y)?;
    let lens = curve.lengths();
    if x.len() + y.len() != lens.public_uncompressed {
        return Err(Error::InvalidKeypairLength {
            expected: lens.public_uncompressed,
            actual: x.len() + y.len(),
        });
    }
    let mut material = Vec::with_capacity(lens.public_uncompressed);
    material.extend_from_slice(&x);
    material.extend_from_slice(&y);
    // Uncompressed SEC1 point: 0x04 || x || y.
    let mut sec1 = Vec::with_capacity(1 + material.len());
    sec1.push(0x04);
    sec1.extend_from_slice(&material);
    material_to_public_key(&sec1, curve)
}

/// `jwkToKey` for a private JWK: `d` is required (`DecodingError` if
/// absent); `x`/`y` are ignored on import since the private scalar alone
/// determines the keypair.
pub fn jwk_to_private_key(jwk: &Jwk) -> Result<PrivateKeyHandle> {
    require_ec(jwk)?;
    let curve = jwk.curve()?;
    let d = jwk
        .d
        .as_deref()
        .ok_or_else(|| Error::Decoding("private JWK import missing 'd'".into()))?;
    let mut material = raw_decode(d)?;
    let handle = material_to_private_key(&material, curve);
    material.zeroize();
    handle
}

fn require_ec(jwk: &Jwk) -> Result<()> {
    if jwk.kty != "EC" {
        return Err(Error::InvalidKeypairContent(format!(
            "JWK kty must be 'EC', got {}",
            jwk.kty
        )));
    }
    Ok(())
}

/// JWK thumbprint per the suite's rule: base64url-no-pad(SHA-256(UTF-8 JSON
/// of the public JWK)), computed over this crate's fixed field order.
pub fn jwk_thumbprint(jwk: &Jwk) -> Result<String> {
    let public = jwk.public_view();
    let json = serde_json::to_vec(&public)
        .map_err(|e| Error::Encoding(format!("JWK thumbprint serialization failed: {e}")))?;
    let digest = Sha256::digest(&json);
    Ok(raw_encode(&digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::OsRng;

    #[test]
    fn public_jwk_round_trips_through_key() {
        let sk = p256::ecdsa::SigningKey::random(&mut OsRng);
        let pk = PublicKeyHandle::P256(*sk.verifying_key());
        let jwk = key_to_jwk_public(&pk).unwrap();
        assert_eq!(jwk.crv, "P-256");
        let rebuilt = jwk_to_public_key(&jwk).unwrap();
        assert_eq!(
            key_to_material_public(&pk).unwrap(),
            key_to_material_public(&rebuilt).unwrap()
        );
    }

    #[test]
    fn private_jwk_requires_d() {
        let jwk = Jwk {
            kty: "EC".into(),
            crv: "P-256".into(),
            x: "AA".into(),
            y: "AA".into(),
            d: None,
        };
        assert!(jwk_to_private_key(&jwk).is_err());
    }

    #[test]
    fn thumbprint_is_stable_across_d_presence() {
        let sk = p256::ecdsa::SigningKey::random(&mut OsRng);
        let private = PrivateKeyHandle::P256(sk);
        let jwk_priv = key_to_jwk_private(&private).unwrap();
        let jwk_pub = key_to_jwk_public(&private.public_handle()).unwrap();
        assert_eq!(
            jwk_thumbprint(&jwk_priv).unwrap(),
            jwk_thumbprint(&jwk_pub).unwrap()
        );
    }
}
