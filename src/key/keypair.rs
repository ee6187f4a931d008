//! `ECKeypair`: the value object spec.md §3 describes, its verification
//! method export/import, and fingerprint computation.

use chrono::{DateTime, Utc};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::jwk::{
    jwk_thumbprint, jwk_to_private_key, jwk_to_public_key, key_to_jwk_private, key_to_jwk_public,
    Jwk,
};
use super::material::{
    key_to_material_private, key_to_material_public, material_to_private_key,
    material_to_public_key, PrivateKeyHandle, PublicKeyHandle,
};
use super::multikey::{material_to_multibase, multibase_to_material};
use crate::codec::base58btc_decode;
use crate::curve::Curve;
use crate::error::{Error, Result};

/// Which half of a keypair a conversion or export targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Public,
    Private,
}

/// Which wire shape an export targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmKind {
    Multikey,
    JsonWebKey,
}

/// Shared fields carried by both verification method shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmCommon {
    pub id: Option<String>,
    pub controller: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked: Option<DateTime<Utc>>,
}

/// A `Multikey`-shaped verification method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultikeyVerificationMethod {
    #[serde(flatten)]
    pub common: VmCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_multibase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key_multibase: Option<String>,
}

/// A `JsonWebKey`-shaped verification method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JwkVerificationMethod {
    #[serde(flatten)]
    pub common: VmCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<Jwk>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key_jwk: Option<Jwk>,
}

/// The two verification-method shapes this suite understands.
#[derive(Debug, Clone)]
pub enum VerificationMethod {
    Multikey(MultikeyVerificationMethod),
    JsonWebKey(JwkVerificationMethod),
}

impl VerificationMethod {
    pub fn common(&self) -> &VmCommon {
        match self {
            VerificationMethod::Multikey(m) => &m.common,
            VerificationMethod::JsonWebKey(m) => &m.common,
        }
    }

    /// Serialize to the JSON-LD object form, re-injecting the `type`
    /// discriminator the two wire shapes share.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let (type_str, inner) = match self {
            VerificationMethod::Multikey(m) => (
                "Multikey",
                serde_json::to_value(m)
                    .map_err(|e| Error::KeypairExport(format!("cannot serialize Multikey: {e}")))?,
            ),
            VerificationMethod::JsonWebKey(m) => (
                "JsonWebKey",
                serde_json::to_value(m)
                    .map_err(|e| Error::KeypairExport(format!("cannot serialize JsonWebKey: {e}")))?,
            ),
        };
        let mut obj = inner.as_object().cloned().unwrap_or_default();
        obj.insert(
            "type".to_string(),
            serde_json::Value::String(type_str.to_string()),
        );
        Ok(serde_json::Value::Object(obj))
    }

    /// Parse the JSON-LD object form, dispatching on its `type` member.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let vtype = value.get("type").and_then(|t| t.as_str()).ok_or_else(|| {
            Error::InvalidVerificationMethod("verification method is missing 'type'".into())
        })?;
        match vtype {
            "Multikey" => Ok(VerificationMethod::Multikey(
                serde_json::from_value(value.clone()).map_err(|e| {
                    Error::InvalidVerificationMethod(format!("malformed Multikey: {e}"))
                })?,
            )),
            "JsonWebKey" => Ok(VerificationMethod::JsonWebKey(
                serde_json::from_value(value.clone()).map_err(|e| {
                    Error::InvalidVerificationMethod(format!("malformed JsonWebKey: {e}"))
                })?,
            )),
            other => Err(Error::InvalidVerificationMethod(format!(
                "unsupported verification method type {other}"
            ))),
        }
    }
}

/// Options gating `ECKeypair::export`.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    pub kind: VmKind,
    pub flag: Flag,
}

/// Options gating `ECKeypair::import`. Each check is opt-in: disabled, the
/// corresponding failure is never raised.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    pub curve: Option<Curve>,
    pub check_context: bool,
    pub check_expired: bool,
    pub check_revoked: bool,
}

/// An ECDSA keypair value object, immutable in its curve once constructed.
#[derive(Clone)]
pub struct ECKeypair {
    pub(crate) curve: Curve,
    pub id: Option<String>,
    pub controller: Option<String>,
    pub expires: Option<DateTime<Utc>>,
    pub revoked: Option<DateTime<Utc>>,
    pub public_key: Option<PublicKeyHandle>,
    pub private_key: Option<PrivateKeyHandle>,
}

impl ECKeypair {
    pub fn new(
        curve: Curve,
        id: Option<String>,
        controller: Option<String>,
        expires: Option<DateTime<Utc>>,
        revoked: Option<DateTime<Utc>>,
    ) -> Self {
        ECKeypair {
            curve,
            id,
            controller,
            expires,
            revoked,
            public_key: None,
            private_key: None,
        }
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Generate a fresh keypair for this curve, replacing any existing
    /// key material, and mint an `id` from the fingerprint if one isn't
    /// already set and a `controller` is present.
    pub fn initialize(&mut self) -> Result<()> {
        match self.curve {
            Curve::P256 => {
                let sk = p256::ecdsa::SigningKey::random(&mut OsRng);
                self.public_key = Some(PublicKeyHandle::P256(*sk.verifying_key()));
                self.private_key = Some(PrivateKeyHandle::P256(sk));
            }
            Curve::P384 => {
                let sk = p384::ecdsa::SigningKey::random(&mut OsRng);
                self.public_key = Some(PublicKeyHandle::P384(*sk.verifying_key()));
                self.private_key = Some(PrivateKeyHandle::P384(sk));
            }
        }
        self.ensure_id_from_fingerprint()?;
        Ok(())
    }

    fn ensure_id_from_fingerprint(&mut self) -> Result<()> {
        if self.id.is_none() {
            if let Some(controller) = &self.controller {
                let fingerprint = self.generate_fingerprint()?;
                self.id = Some(format!("{controller}#{fingerprint}"));
            }
        }
        Ok(())
    }

    /// base58btc(curve's 2-byte multicodec prefix ‖ compressed public
    /// point). A pure function of `(curve, compressed public point)`.
    pub fn generate_fingerprint(&self) -> Result<String> {
        let public = self
            .public_key
            .as_ref()
            .ok_or_else(|| Error::InvalidKeypairContent("keypair has no public key".into()))?;
        let material = key_to_material_public(public)?;
        material_to_multibase(&material, Flag::Public, self.curve)
    }

    pub fn verify_fingerprint(&self, fingerprint: &str) -> bool {
        matches!(self.generate_fingerprint(), Ok(f) if f == fingerprint)
    }

    /// Export this keypair into a verification method of the requested
    /// shape and flag, per the case-analysis table in spec.md §4.3.
    pub fn export(&mut self, options: ExportOptions) -> Result<VerificationMethod> {
        match options.flag {
            Flag::Private => {
                let private = self
                    .private_key
                    .as_ref()
                    .ok_or_else(|| Error::InvalidKeypairContent("no private key to export".into()))?
                    .clone();
                match options.kind {
                    VmKind::Multikey => {
                        let mut material = key_to_material_private(&private)?;
                        let secret = material_to_multibase(&material, Flag::Private, self.curve)?;
                        material.zeroize();
                        let public = match &self.public_key {
                            Some(pk) => Some(material_to_multibase(
                                &key_to_material_public(pk)?,
                                Flag::Public,
                                self.curve,
                            )?),
                            None => None,
                        };
                        self.ensure_id_from_fingerprint()?;
                        Ok(VerificationMethod::Multikey(MultikeyVerificationMethod {
                            common: self.common(),
                            public_key_multibase: public,
                            secret_key_multibase: Some(secret),
                        }))
                    }
                    VmKind::JsonWebKey => {
                        let secret_jwk = key_to_jwk_private(&private)?;
                        let public_jwk = match &self.public_key {
                            Some(pk) => Some(key_to_jwk_public(pk)?),
                            None => None,
                        };
                        self.ensure_id_from_jwk_thumbprint(&secret_jwk)?;
                        Ok(VerificationMethod::JsonWebKey(JwkVerificationMethod {
                            common: self.common(),
                            public_key_jwk: public_jwk,
                            secret_key_jwk: Some(secret_jwk),
                        }))
                    }
                }
            }
            Flag::Public => {
                let public = self
                    .public_key
                    .as_ref()
                    .ok_or_else(|| Error::InvalidKeypairContent("no public key to export".into()))?
                    .clone();
                match options.kind {
                    VmKind::Multikey => {
                        let material = key_to_material_public(&public)?;
                        let encoded = material_to_multibase(&material, Flag::Public, self.curve)?;
                        self.ensure_id_from_fingerprint()?;
                        Ok(VerificationMethod::Multikey(MultikeyVerificationMethod {
                            common: self.common(),
                            public_key_multibase: Some(encoded),
                            secret_key_multibase: None,
                        }))
                    }
                    VmKind::JsonWebKey => {
                        let jwk = key_to_jwk_public(&public)?;
                        self.ensure_id_from_jwk_thumbprint(&jwk)?;
                        Ok(VerificationMethod::JsonWebKey(JwkVerificationMethod {
                            common: self.common(),
                            public_key_jwk: Some(jwk),
                            secret_key_jwk: None,
                        }))
                    }
                }
            }
        }
    }

    fn ensure_id_from_jwk_thumbprint(&mut self, jwk: &Jwk) -> Result<()> {
        if self.id.is_none() {
            if let Some(controller) = &self.controller {
                let thumbprint = jwk_thumbprint(jwk)?;
                self.id = Some(format!("{controller}#{thumbprint}"));
            }
        }
        Ok(())
    }

    fn common(&self) -> VmCommon {
        VmCommon {
            id: self.id.clone(),
            controller: self.controller.clone(),
            expires: self.expires,
            revoked: self.revoked,
        }
    }

    /// `multibaseToKeypair` / `jwkToKeypair`: reconstruct a keypair from a
    /// verification method. Requires at least one of public/private.
    pub fn import(vm: &VerificationMethod, options: ImportOptions) -> Result<ECKeypair> {
        let common = vm.common().clone();
        if let Some(id) = &common.id {
            if options.check_context {
                if let Some(controller) = &common.controller {
                    if !id.starts_with(controller.as_str()) {
                        return Err(Error::InvalidKeypairContent(
                            "verification method id does not begin with its controller".into(),
                        ));
                    }
                }
            }
        }
        if options.check_expired {
            if let Some(expires) = common.expires {
                if expires < Utc::now() {
                    return Err(Error::KeypairExpired);
                }
            }
        }
        if options.check_revoked {
            if let Some(revoked) = common.revoked {
                if revoked < Utc::now() {
                    return Err(Error::KeypairExpired);
                }
            }
        }

        let (curve, public_key, private_key) = match vm {
            VerificationMethod::Multikey(m) => {
                let public_key = m
                    .public_key_multibase
                    .as_ref()
                    .map(|s| decode_multikey_public(s, options.curve))
                    .transpose()?;
                let private_key = m
                    .secret_key_multibase
                    .as_ref()
                    .map(|s| decode_multikey_private(s, options.curve))
                    .transpose()?;
                let curve = public_key
                    .as_ref()
                    .map(|k| k.curve())
                    .or_else(|| private_key.as_ref().map(|k| k.curve()))
                    .or(options.curve)
                    .ok_or_else(|| {
                        Error::InvalidKeypairContent("cannot determine curve for keypair".into())
                    })?;
                (curve, public_key, private_key)
            }
            VerificationMethod::JsonWebKey(m) => {
                let public_key = m
                    .public_key_jwk
                    .as_ref()
                    .map(jwk_to_public_key)
                    .transpose()?;
                let private_key = m
                    .secret_key_jwk
                    .as_ref()
                    .map(jwk_to_private_key)
                    .transpose()?;
                let curve = public_key
                    .as_ref()
                    .map(|k| k.curve())
                    .or_else(|| private_key.as_ref().map(|k| k.curve()))
                    .or(options.curve)
                    .ok_or_else(|| {
                        Error::InvalidKeypairContent("cannot determine curve for keypair".into())
                    })?;
                (curve, public_key, private_key)
            }
        };

        if public_key.is_none() && private_key.is_none() {
            return Err(Error::InvalidKeypairContent(
                "verification method carries neither a public nor a secret key".into(),
            ));
        }

        Ok(ECKeypair {
            curve,
            id: common.id,
            controller: common.controller,
            expires: common.expires,
            revoked: common.revoked,
            public_key,
            private_key,
        })
    }
}

fn decode_multikey_public(s: &str, curve_hint: Option<Curve>) -> Result<PublicKeyHandle> {
    let decoded = base58btc_decode(s)?;
    let (prefix, _payload) = crate::codec::multicodec_strip(&decoded)?;
    let curve = Curve::from_public_multicodec(prefix)?;
    if let Some(hint) = curve_hint {
        if hint != curve {
            return Err(Error::InvalidKeypairContent(
                "multibase curve does not match requested curve".into(),
            ));
        }
    }
    let material = multibase_to_material(s, Flag::Public, curve)?;
    material_to_public_key(&material, curve)
}

fn decode_multikey_private(s: &str, curve_hint: Option<Curve>) -> Result<PrivateKeyHandle> {
    let decoded = base58btc_decode(s)?;
    let (prefix, _payload) = crate::codec::multicodec_strip(&decoded)?;
    let curve = Curve::from_private_multicodec(prefix)?;
    if let Some(hint) = curve_hint {
        if hint != curve {
            return Err(Error::InvalidKeypairContent(
                "multibase curve does not match requested curve".into(),
            ));
        }
    }
    let material = multibase_to_material(s, Flag::Private, curve)?;
    material_to_private_key(&material, curve)
}
