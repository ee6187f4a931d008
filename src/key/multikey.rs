//! `materialToMultibase` / `multibaseToMaterial`: compressed-point Multikey
//! framing, prefixed with the curve's two-byte multicodec header and
//! base58btc-encoded.

use crate::codec::{base58btc_decode, base58btc_encode, multicodec_strip, multicodec_wrap};
use crate::curve::Curve;
use crate::error::{Error, Result};
use crate::key::keypair::Flag;

/// Compress an uncompressed `x‖y` public point into `sign‖x`.
fn compress_public_point(material: &[u8], curve: Curve) -> Result<Vec<u8>> {
    let lens = curve.lengths();
    if material.len() != lens.public_uncompressed {
        return Err(Error::InvalidKeypairLength {
            expected: lens.public_uncompressed,
            actual: material.len(),
        });
    }
    let coord_len = lens.public_uncompressed / 2;
    let (x, y) = material.split_at(coord_len);
    let sign = if y[y.len() - 1] % 2 == 1 { 0x03 } else { 0x02 };
    let mut out = Vec::with_capacity(1 + coord_len);
    out.push(sign);
    out.extend_from_slice(x);
    Ok(out)
}

/// `materialToMultibase(material, flag, curve)`: public material is
/// compressed first; private material (already `d`) is used verbatim.
pub fn material_to_multibase(material: &[u8], flag: Flag, curve: Curve) -> Result<String> {
    let (prefix, payload) = match flag {
        Flag::Public => (curve.public_multicodec(), compress_public_point(material, curve)?),
        Flag::Private => {
            let lens = curve.lengths();
            if material.len() != lens.private {
                return Err(Error::InvalidKeypairLength {
                    expected: lens.private,
                    actual: material.len(),
                });
            }
            (curve.private_multicodec(), material.to_vec())
        }
    };
    let wrapped = multicodec_wrap(prefix, &payload);
    Ok(base58btc_encode(&wrapped))
}

/// `multibaseToMaterial(string, flag, curve)`: inverse of
/// [`material_to_multibase`]; validates the multicodec prefix and the
/// resulting compressed/private length.
pub fn multibase_to_material(s: &str, flag: Flag, curve: Curve) -> Result<Vec<u8>> {
    let decoded = base58btc_decode(s)?;
    let (prefix, payload) = multicodec_strip(&decoded)?;
    let found_curve = match flag {
        Flag::Public => Curve::from_public_multicodec(prefix)?,
        Flag::Private => Curve::from_private_multicodec(prefix)?,
    };
    if found_curve != curve {
        return Err(Error::InvalidKeypairContent(
            "multibase multicodec prefix does not match expected curve".into(),
        ));
    }
    let lens = curve.lengths();
    let expected_len = match flag {
        Flag::Public => lens.public_compressed,
        Flag::Private => lens.private,
    };
    if payload.len() != expected_len {
        return Err(Error::InvalidKeypairLength {
            expected: expected_len,
            actual: payload.len(),
        });
    }
    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_material_round_trips() {
        let material = [7u8; 32];
        let encoded = material_to_multibase(&material, Flag::Private, Curve::P256).unwrap();
        assert!(encoded.starts_with('z'));
        let decoded = multibase_to_material(&encoded, Flag::Private, Curve::P256).unwrap();
        assert_eq!(decoded, material);
    }

    #[test]
    fn public_material_compresses_and_round_trips_length() {
        let mut material = [0u8; 64];
        material[63] = 0x02; // even last byte -> sign 0x02
        let encoded = material_to_multibase(&material, Flag::Public, Curve::P256).unwrap();
        let decoded = multibase_to_material(&encoded, Flag::Public, Curve::P256).unwrap();
        assert_eq!(decoded.len(), 33);
        assert_eq!(decoded[0], 0x02);
    }

    #[test]
    fn wrong_curve_prefix_errors() {
        let material = [7u8; 32];
        let encoded = material_to_multibase(&material, Flag::Private, Curve::P256).unwrap();
        let err = multibase_to_material(&encoded, Flag::Private, Curve::P384).unwrap_err();
        assert!(matches!(err, Error::InvalidKeypairContent(_)));
    }
}
