//! Byte-level encodings shared by every layer above: hex, concatenation,
//! base58btc, base64url-no-pad, multicodec varints, and CBOR.

mod base58;
mod base64url;
pub mod cbor;
mod varint;

pub use base58::{base58btc_decode, base58btc_encode};
pub use base64url::{base64url_nopad_decode, base64url_nopad_encode, raw_decode, raw_encode};
pub use varint::{multicodec_strip, multicodec_wrap};

/// Decode a hex string (no leading `0x`) into bytes.
pub fn hex_to_bytes(s: &str) -> crate::error::Result<Vec<u8>> {
    hex::decode(s).map_err(|e| crate::error::Error::Decoding(format!("bad hex: {e}")))
}

/// Encode bytes as a lowercase hex string, no leading `0x`.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Concatenate any number of byte slices into one owned buffer.
pub fn concatenate(parts: &[&[u8]]) -> Vec<u8> {
    let total: usize = parts.iter().map(|p| p.len()).sum();
    let mut out = Vec::with_capacity(total);
    for p in parts {
        out.extend_from_slice(p);
    }
    out
}
