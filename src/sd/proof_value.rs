//! Base and derived SD proof value framing (spec.md §3 "Base/derived-proof
//! value", §4.1 wire formats): `u` + base64url-no-pad(3-byte header ‖
//! untagged CBOR array).

use std::collections::BTreeMap;

use ciborium::Value as CborValue;

use crate::codec::cbor::{self, array_get, as_array, as_bytes, as_map, as_text, as_u64};
use crate::codec::{base64url_nopad_decode, base64url_nopad_encode};
use crate::error::{Error, Result};

/// `0xd9 0x5d 0x00`: base proof value header.
pub const BASE_PROOF_HEADER: [u8; 3] = [0xd9, 0x5d, 0x00];
/// `0xd9 0x5d 0x01`: derived proof value header.
pub const DERIVED_PROOF_HEADER: [u8; 3] = [0xd9, 0x5d, 0x01];

fn valid_signature_len(len: usize) -> bool {
    len == 64 || len == 96
}

/// The issuer's base-proof five-tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseProofValue {
    pub base_signature: Vec<u8>,
    pub public_key: Vec<u8>,
    pub hmac_key: [u8; 32],
    pub signatures: Vec<Vec<u8>>,
    pub mandatory_pointers: Vec<String>,
}

impl BaseProofValue {
    fn validate(&self) -> Result<()> {
        if !valid_signature_len(self.base_signature.len()) {
            return Err(Error::ProofVerification(format!(
                "base signature must be 64 or 96 bytes, got {}",
                self.base_signature.len()
            )));
        }
        if self.public_key.len() != 35 {
            return Err(Error::ProofVerification(format!(
                "proof-scoped public key must be 35 bytes, got {}",
                self.public_key.len()
            )));
        }
        for sig in &self.signatures {
            if sig.len() != 64 {
                return Err(Error::ProofVerification(format!(
                    "per-statement signature must be 64 bytes, got {}",
                    sig.len()
                )));
            }
        }
        Ok(())
    }
}

/// The holder's derived-proof five-tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedProofValue {
    pub base_signature: Vec<u8>,
    pub public_key: Vec<u8>,
    pub signatures: Vec<Vec<u8>>,
    pub compressed_label_map: BTreeMap<u64, [u8; 32]>,
    pub mandatory_indexes: Vec<u64>,
}

impl DerivedProofValue {
    fn validate(&self) -> Result<()> {
        if !valid_signature_len(self.base_signature.len()) {
            return Err(Error::ProofVerification(format!(
                "base signature must be 64 or 96 bytes, got {}",
                self.base_signature.len()
            )));
        }
        if self.public_key.len() != 35 {
            return Err(Error::ProofVerification(format!(
                "proof-scoped public key must be 35 bytes, got {}",
                self.public_key.len()
            )));
        }
        for sig in &self.signatures {
            if sig.len() != 64 {
                return Err(Error::ProofVerification(format!(
                    "per-statement signature must be 64 bytes, got {}",
                    sig.len()
                )));
            }
        }
        Ok(())
    }
}

fn encode_framed(header: [u8; 3], value: CborValue) -> Result<String> {
    let mut bytes = header.to_vec();
    bytes.extend(cbor::encode(&value)?);
    Ok(base64url_nopad_encode(&bytes))
}

fn decode_framed(s: &str, expected_header: [u8; 3]) -> Result<CborValue> {
    let bytes = base64url_nopad_decode(s)?;
    if bytes.len() < 3 {
        return Err(Error::ProofVerification("proof value too short for header".into()));
    }
    if bytes[0..3] != expected_header {
        return Err(Error::ProofVerification(format!(
            "proof value header {:02x?} does not match expected {:02x?}",
            &bytes[0..3],
            expected_header
        )));
    }
    cbor::decode(&bytes[3..])
}

pub fn serialize_base_proof_value(v: &BaseProofValue) -> Result<String> {
    v.validate()?;
    let array = cbor::array(vec![
        cbor::bytes(v.base_signature.clone()),
        cbor::bytes(v.public_key.clone()),
        cbor::bytes(v.hmac_key.to_vec()),
        cbor::array(v.signatures.iter().cloned().map(cbor::bytes).collect()),
        cbor::array(
            v.mandatory_pointers
                .iter()
                .cloned()
                .map(cbor::text)
                .collect(),
        ),
    ]);
    encode_framed(BASE_PROOF_HEADER, array)
}

pub fn parse_base_proof_value(s: &str) -> Result<BaseProofValue> {
    let value = decode_framed(s, BASE_PROOF_HEADER)?;
    let elements = as_array(&value, "base proof value")?;
    if elements.len() != 5 {
        return Err(Error::ProofVerification(format!(
            "base proof value must have 5 elements, got {}",
            elements.len()
        )));
    }
    let base_signature = as_bytes(array_get(&value, 0)?, "baseSignature")?.to_vec();
    let public_key = as_bytes(array_get(&value, 1)?, "publicKey")?.to_vec();
    let hmac_key_slice = as_bytes(array_get(&value, 2)?, "hmacKey")?;
    if hmac_key_slice.len() != 32 {
        return Err(Error::ProofVerification(format!(
            "hmacKey must be 32 bytes, got {}",
            hmac_key_slice.len()
        )));
    }
    let mut hmac_key = [0u8; 32];
    hmac_key.copy_from_slice(hmac_key_slice);
    let signatures = as_array(array_get(&value, 3)?, "signatures")?
        .iter()
        .map(|v| as_bytes(v, "signature").map(|b| b.to_vec()))
        .collect::<Result<Vec<_>>>()?;
    let mandatory_pointers = as_array(array_get(&value, 4)?, "mandatoryPointers")?
        .iter()
        .map(|v| as_text(v, "mandatoryPointer").map(|s| s.to_string()))
        .collect::<Result<Vec<_>>>()?;

    let parsed = BaseProofValue {
        base_signature,
        public_key,
        hmac_key,
        signatures,
        mandatory_pointers,
    };
    parsed.validate()?;
    Ok(parsed)
}

pub fn serialize_derived_proof_value(v: &DerivedProofValue) -> Result<String> {
    v.validate()?;
    let label_map_entries = v
        .compressed_label_map
        .iter()
        .map(|(k, bytes)| (cbor::int(*k), cbor::bytes(bytes.to_vec())))
        .collect();
    let array = cbor::array(vec![
        cbor::bytes(v.base_signature.clone()),
        cbor::bytes(v.public_key.clone()),
        cbor::array(v.signatures.iter().cloned().map(cbor::bytes).collect()),
        cbor::map(label_map_entries),
        cbor::array(v.mandatory_indexes.iter().map(|i| cbor::int(*i)).collect()),
    ]);
    encode_framed(DERIVED_PROOF_HEADER, array)
}

pub fn parse_derived_proof_value(s: &str) -> Result<DerivedProofValue> {
    let value = decode_framed(s, DERIVED_PROOF_HEADER)?;
    let elements = as_array(&value, "derived proof value")?;
    if elements.len() != 5 {
        return Err(Error::ProofVerification(format!(
            "derived proof value must have 5 elements, got {}",
            elements.len()
        )));
    }
    let base_signature = as_bytes(array_get(&value, 0)?, "baseSignature")?.to_vec();
    let public_key = as_bytes(array_get(&value, 1)?, "publicKey")?.to_vec();
    let signatures = as_array(array_get(&value, 2)?, "signatures")?
        .iter()
        .map(|v| as_bytes(v, "signature").map(|b| b.to_vec()))
        .collect::<Result<Vec<_>>>()?;
    let mut compressed_label_map = BTreeMap::new();
    for (k, v) in as_map(array_get(&value, 3)?, "compressedLabelMap")? {
        let key = as_u64(k, "compressedLabelMap key")?;
        let bytes = as_bytes(v, "compressedLabelMap value")?;
        if bytes.len() != 32 {
            return Err(Error::ProofVerification(format!(
                "compressedLabelMap entry must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(bytes);
        compressed_label_map.insert(key, arr);
    }
    let mandatory_indexes = as_array(array_get(&value, 4)?, "mandatoryIndexes")?
        .iter()
        .map(|v| as_u64(v, "mandatoryIndex"))
        .collect::<Result<Vec<_>>>()?;

    let parsed = DerivedProofValue {
        base_signature,
        public_key,
        signatures,
        compressed_label_map,
        mandatory_indexes,
    };
    parsed.validate()?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_proof_value_round_trips() {
        let v = BaseProofValue {
            base_signature: vec![1u8; 64],
            public_key: vec![2u8; 35],
            hmac_key: [3u8; 32],
            signatures: vec![vec![4u8; 64], vec![5u8; 64]],
            mandatory_pointers: vec!["/issuer".to_string()],
        };
        let encoded = serialize_base_proof_value(&v).unwrap();
        assert!(encoded.starts_with('u'));
        let decoded = parse_base_proof_value(&encoded).unwrap();
        assert_eq!(v, decoded);
    }

    #[test]
    fn derived_proof_value_round_trips() {
        let mut label_map = BTreeMap::new();
        label_map.insert(0u64, [9u8; 32]);
        label_map.insert(3u64, [8u8; 32]);
        let v = DerivedProofValue {
            base_signature: vec![1u8; 96],
            public_key: vec![2u8; 35],
            signatures: vec![vec![4u8; 64]],
            compressed_label_map: label_map,
            mandatory_indexes: vec![0, 2],
        };
        let encoded = serialize_derived_proof_value(&v).unwrap();
        let decoded = parse_derived_proof_value(&encoded).unwrap();
        assert_eq!(v, decoded);
    }

    #[test]
    fn wrong_header_is_rejected() {
        let v = BaseProofValue {
            base_signature: vec![1u8; 64],
            public_key: vec![2u8; 35],
            hmac_key: [3u8; 32],
            signatures: vec![],
            mandatory_pointers: vec![],
        };
        let encoded = serialize_base_proof_value(&v).unwrap();
        let err = parse_derived_proof_value(&encoded).unwrap_err();
        assert!(matches!(err, Error::ProofVerification(_)));
    }

    #[test]
    fn missing_u_prefix_is_rejected() {
        assert!(parse_base_proof_value("zNotBase64Url").is_err());
    }
}
