//! The pure byte/string pieces of the selective-disclosure helpers
//! (spec.md §6): `createHmacIdLabelMapFunction`, `createLabelMapFunction`,
//! and the label-map compression used by the derived-proof value.

use std::collections::BTreeMap;

use crate::codec::{base64url_nopad_decode, base64url_nopad_encode};
use crate::error::{Error, Result};
use crate::hash::hmac;
use crate::interfaces::LabelMapFn;

const BLANK_NODE_PREFIX: &str = "_:";
const CANONICAL_ID_PREFIX: &str = "c14n";

/// `createHmacIdLabelMapFunction(hmac)`: relabels a canonical blank-node
/// identifier (`_:c14nN`) by HMAC-ing its bare identifier and re-encoding
/// the digest as a fresh blank-node label, so a derived proof's labels
/// never correlate with the base proof's original canonical labels. Always
/// HMAC-SHA-256 regardless of the issuer's signing curve (spec.md's
/// glossary and the `compressedLabelMap`/`hmacKey: 32 bytes` wire
/// invariants are the authoritative resolution of §4.5.1's "matching the
/// curve" wording) — a P-384 issuer's base signature is still 96 bytes,
/// but its label map stays 32-byte like a P-256 issuer's.
pub fn create_hmac_id_label_map_function(hmac_key: [u8; 32]) -> LabelMapFn {
    Box::new(move |original_label: &str| {
        let bare = original_label
            .strip_prefix(BLANK_NODE_PREFIX)
            .unwrap_or(original_label);
        let digest = hmac(&hmac_key, bare.as_bytes())?;
        Ok(format!(
            "{BLANK_NODE_PREFIX}{}",
            base64url_nopad_encode(&digest)
        ))
    })
}

/// `createLabelMapFunction(labelMap)`: replays a previously computed
/// label map rather than deriving fresh labels.
pub fn create_label_map_function(label_map: BTreeMap<String, String>) -> LabelMapFn {
    Box::new(move |original_label: &str| {
        label_map.get(original_label).cloned().ok_or_else(|| {
            Error::ProofVerification(format!(
                "no label map entry for blank node {original_label}"
            ))
        })
    })
}

/// Compress a `c14nN -> u<base64url>` label map into `N -> 32 raw bytes`,
/// as the derived-proof value's `compressedLabelMap` member requires.
pub fn compress_label_map(label_map: &BTreeMap<String, String>) -> Result<BTreeMap<u64, [u8; 32]>> {
    let mut compressed = BTreeMap::new();
    for (key, value) in label_map {
        let suffix = key.strip_prefix(CANONICAL_ID_PREFIX).ok_or_else(|| {
            Error::ProofVerification(format!("label map key {key} is not a c14n-prefixed label"))
        })?;
        let index: u64 = suffix
            .parse()
            .map_err(|_| Error::ProofVerification(format!("label map key {key} has a non-numeric suffix")))?;
        let bytes = base64url_nopad_decode(value)?;
        if bytes.len() != 32 {
            return Err(Error::ProofVerification(format!(
                "label map value for {key} must decode to 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        compressed.insert(index, arr);
    }
    Ok(compressed)
}

/// Inverse of [`compress_label_map`].
pub fn decompress_label_map(compressed: &BTreeMap<u64, [u8; 32]>) -> BTreeMap<String, String> {
    compressed
        .iter()
        .map(|(index, bytes)| {
            (
                format!("{CANONICAL_ID_PREFIX}{index}"),
                base64url_nopad_encode(bytes),
            )
        })
        .collect()
}
