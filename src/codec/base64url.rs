//! base64url-no-pad multibase codec (RFC 4648 §5, no padding). Encoded
//! strings always begin with `u`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::error::{Error, Result};

pub fn base64url_nopad_encode(bytes: &[u8]) -> String {
    format!("u{}", URL_SAFE_NO_PAD.encode(bytes))
}

pub fn base64url_nopad_decode(s: &str) -> Result<Vec<u8>> {
    let rest = s
        .strip_prefix('u')
        .ok_or_else(|| Error::Decoding("base64url-no-pad string must start with 'u'".into()))?;
    URL_SAFE_NO_PAD
        .decode(rest)
        .map_err(|e| Error::Decoding(format!("bad base64url-no-pad: {e}")))
}

/// Plain RFC 4648 §5 base64url-no-pad, without the `u` multibase marker.
/// JWK members (`x`, `y`, `d`) and JWK thumbprints use this form, not the
/// multibase one: RFC 7517/7638 know nothing about multibase.
pub fn raw_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn raw_decode(s: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(s)
        .map_err(|e| Error::Decoding(format!("bad base64url: {e}")))
}
