//! CBOR encode/decode (RFC 8949) over `ciborium::Value`.
//!
//! Nothing here ever emits a CBOR tag: the base and derived SD proof value
//! arrays are encoded as plain untagged CBOR, with the `0xd9 0x5d 0x00` /
//! `0xd9 0x5d 0x01` framing applied as a literal three-byte prefix around
//! the CBOR bytes rather than as a CBOR major-type-6 tag.

use ciborium::Value;

use crate::error::{Error, Result};

pub fn encode(value: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf)
        .map_err(|e| Error::Encoding(format!("CBOR encode failed: {e}")))?;
    Ok(buf)
}

pub fn decode(bytes: &[u8]) -> Result<Value> {
    ciborium::from_reader(bytes)
        .map_err(|e| Error::ProofVerification(format!("CBOR decode failed: {e}")))
}

/// Fetch element `idx` of a CBOR array value, or error.
pub fn array_get(value: &Value, idx: usize) -> Result<&Value> {
    value
        .as_array()
        .and_then(|a| a.get(idx))
        .ok_or_else(|| Error::ProofVerification(format!("CBOR array missing index {idx}")))
}

pub fn as_bytes<'a>(value: &'a Value, what: &str) -> Result<&'a [u8]> {
    value
        .as_bytes()
        .map(|b| b.as_slice())
        .ok_or_else(|| Error::ProofVerification(format!("expected CBOR byte string for {what}")))
}

pub fn as_array<'a>(value: &'a Value, what: &str) -> Result<&'a [Value]> {
    value
        .as_array()
        .map(|a| a.as_slice())
        .ok_or_else(|| Error::ProofVerification(format!("expected CBOR array for {what}")))
}

pub fn as_text<'a>(value: &'a Value, what: &str) -> Result<&'a str> {
    value
        .as_text()
        .ok_or_else(|| Error::ProofVerification(format!("expected CBOR text string for {what}")))
}

pub fn as_u64(value: &Value, what: &str) -> Result<u64> {
    value
        .as_integer()
        .and_then(|i| u64::try_from(i).ok())
        .ok_or_else(|| Error::ProofVerification(format!("expected non-negative CBOR integer for {what}")))
}

/// Fetch a value out of a CBOR map by integer key (`compressedLabelMap`'s
/// shape: non-negative integer keys, 32-byte array values).
pub fn as_map<'a>(value: &'a Value, what: &str) -> Result<&'a [(Value, Value)]> {
    value
        .as_map()
        .map(|m| m.as_slice())
        .ok_or_else(|| Error::ProofVerification(format!("expected CBOR map for {what}")))
}

pub fn bytes(b: Vec<u8>) -> Value {
    Value::Bytes(b)
}

pub fn text(s: String) -> Value {
    Value::Text(s)
}

pub fn int(n: u64) -> Value {
    Value::Integer(n.into())
}

pub fn array(v: Vec<Value>) -> Value {
    Value::Array(v)
}

pub fn map(entries: Vec<(Value, Value)>) -> Value {
    Value::Map(entries)
}
