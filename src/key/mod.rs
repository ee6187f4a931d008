//! The keypair value object and its conversions into Multikey/JWK
//! verification methods, with bit-exact DER/SPKI/PKCS#8 framing.

mod der;
mod jwk;
mod keypair;
mod material;
mod multikey;

pub use jwk::{
    jwk_thumbprint, jwk_to_private_key, jwk_to_public_key, key_to_jwk_private, key_to_jwk_public,
    Jwk,
};
pub use keypair::{
    ECKeypair, ExportOptions, Flag, ImportOptions, JwkVerificationMethod,
    MultikeyVerificationMethod, VerificationMethod, VmCommon, VmKind,
};
pub use material::{
    key_to_material_private, key_to_material_public, material_to_private_key,
    material_to_public_key, KeyHandle, PrivateKeyHandle, PublicKeyHandle,
};
pub use multikey::{material_to_multibase, multibase_to_material};
