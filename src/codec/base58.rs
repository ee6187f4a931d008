//! base58btc multibase codec. Encoded strings always begin with `z`.

use crate::error::{Error, Result};

pub fn base58btc_encode(bytes: &[u8]) -> String {
    format!("z{}", bs58::encode(bytes).into_string())
}

pub fn base58btc_decode(s: &str) -> Result<Vec<u8>> {
    let rest = s
        .strip_prefix('z')
        .ok_or_else(|| Error::Decoding("base58btc string must start with 'z'".into()))?;
    bs58::decode(rest)
        .into_vec()
        .map_err(|e| Error::Decoding(format!("bad base58btc: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let bytes = [1u8, 2, 3, 4, 250, 255];
        let encoded = base58btc_encode(&bytes);
        assert!(encoded.starts_with('z'));
        assert_eq!(base58btc_decode(&encoded).unwrap(), bytes);
    }

    #[test]
    fn rejects_missing_prefix() {
        assert!(base58btc_decode("not-multibase").is_err());
    }
}
