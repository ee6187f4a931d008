//! The RDFC/JCS suite core (spec.md §4.4) and its façade: one four-stage
//! pipeline — transform, configure, hash, sign/verify — shared by
//! `ecdsa-rdfc-2019` and `ecdsa-jcs-2019`, varying only in which
//! canonicalizer the transform/configure stages call.

use serde_json::Value;

use crate::codec::{base58btc_decode, base58btc_encode, concatenate};
use crate::curve::Curve;
use crate::error::{Error, Result};
use crate::hash::digest;
use crate::interfaces::SuiteCollaborators;
use crate::key::{ECKeypair, PrivateKeyHandle, PublicKeyHandle};
use crate::proof::{Cryptosuite, Proof};

/// Result of a `verifyProof` call: the verified document is only present
/// when `verified` is true.
#[derive(Debug, Clone)]
pub struct VerifyResult {
    pub verified: bool,
    pub verified_document: Option<Value>,
}

fn canonicalize(
    document: &Value,
    suite: Cryptosuite,
    collaborators: &SuiteCollaborators,
) -> Result<String> {
    match suite {
        Cryptosuite::EcdsaRdfc2019 => {
            let rdfc = collaborators.rdfc.ok_or_else(|| {
                Error::ProofTransformation("no RDF dataset canonicalizer supplied".into())
            })?;
            rdfc.canonicalize(document, collaborators.loader)
        }
        Cryptosuite::EcdsaJcs2019 => {
            let jcs = collaborators
                .jcs
                .ok_or_else(|| Error::ProofTransformation("no JSON canonicalizer supplied".into()))?;
            jcs.canonicalize(document)
        }
        Cryptosuite::EcdsaSd2023 => Err(Error::ProofTransformation(
            "ecdsa-sd-2023 is handled by the selective-disclosure core, not this façade".into(),
        )),
    }
}

/// `Transform`: reject unless `proof.type`/`proof.cryptosuite` match, then
/// canonicalize the document.
fn transform(document: &Value, proof: &Proof, suite: Cryptosuite, collaborators: &SuiteCollaborators) -> Result<String> {
    proof.require_type_and_suite(suite)?;
    canonicalize(document, suite, collaborators)
}

/// `Configure`: clone the proof, validate `created`, inherit the
/// document's `@context`, canonicalize the resulting proof config.
fn configure(
    proof: &Proof,
    document_context: Option<&Value>,
    suite: Cryptosuite,
    collaborators: &SuiteCollaborators,
) -> Result<(Proof, String)> {
    proof.require_type_and_suite(suite)?;
    proof.parsed_created()?;
    let mut config = proof.without_proof_value();
    config.context = document_context.cloned();
    let canonical = canonicalize(
        &serde_json::to_value(&config)
            .map_err(|e| Error::ProofGeneration(format!("cannot serialize proof config: {e}")))?,
        suite,
        collaborators,
    )?;
    Ok((config, canonical))
}

/// `Hash`: `digest(curve, canonicalProofConfig) ‖ digest(curve, transformedDocument)`.
fn hash(curve: Curve, canonical_proof_config: &str, transformed_document: &str) -> Vec<u8> {
    let cfg_hash = digest(curve, canonical_proof_config.as_bytes());
    let doc_hash = digest(curve, transformed_document.as_bytes());
    concatenate(&[&cfg_hash, &doc_hash])
}

pub(crate) fn sign_raw(private: &PrivateKeyHandle, message: &[u8]) -> Vec<u8> {
    use p256::ecdsa::signature::Signer as P256Signer;
    use p384::ecdsa::signature::Signer as P384Signer;
    match private {
        PrivateKeyHandle::P256(sk) => {
            let sig: p256::ecdsa::Signature = P256Signer::sign(sk, message);
            sig.to_bytes().to_vec()
        }
        PrivateKeyHandle::P384(sk) => {
            let sig: p384::ecdsa::Signature = P384Signer::sign(sk, message);
            sig.to_bytes().to_vec()
        }
    }
}

pub(crate) fn verify_raw(public: &PublicKeyHandle, message: &[u8], signature: &[u8]) -> Result<bool> {
    use p256::ecdsa::signature::Verifier as P256Verifier;
    use p384::ecdsa::signature::Verifier as P384Verifier;
    match public {
        PublicKeyHandle::P256(vk) => {
            let sig = p256::ecdsa::Signature::from_slice(signature)
                .map_err(|e| Error::ProofVerification(format!("malformed P-256 signature: {e}")))?;
            Ok(P256Verifier::verify(vk, message, &sig).is_ok())
        }
        PublicKeyHandle::P384(vk) => {
            let sig = p384::ecdsa::Signature::from_slice(signature)
                .map_err(|e| Error::ProofVerification(format!("malformed P-384 signature: {e}")))?;
            Ok(P384Verifier::verify(vk, message, &sig).is_ok())
        }
    }
}

/// `createProof`: sign `unsecured_document` under `signer` with the given
/// `proof_options`, filling in `proofValue`.
#[tracing::instrument(level = "debug", skip_all, fields(cryptosuite = suite.as_str()))]
pub fn create_proof(
    unsecured_document: &Value,
    proof_options: Proof,
    suite: Cryptosuite,
    signer: &ECKeypair,
    collaborators: &SuiteCollaborators,
) -> Result<Proof> {
    let document_context = unsecured_document.get("@context");
    let transformed = transform(unsecured_document, &proof_options, suite, collaborators)?;
    let (mut configured_proof, canonical_config) =
        configure(&proof_options, document_context, suite, collaborators)?;

    let curve = signer.curve();
    let hash_data = hash(curve, &canonical_config, &transformed);

    let private = signer.private_key.as_ref().ok_or_else(|| {
        Error::InvalidVerificationMethod("signing keypair has no private key".into())
    })?;
    let signature = sign_raw(private, &hash_data);

    configured_proof.proof_value = Some(base58btc_encode(&signature));
    tracing::debug!(signature_len = signature.len(), "proof created");
    Ok(configured_proof)
}

/// `verifyProof`: strip `proof`/`proofValue` from `secured_document`,
/// rebuild the canonical forms, and check the signature against the
/// already-resolved `verification_method` keypair (public key only
/// required).
#[tracing::instrument(level = "debug", skip_all, fields(cryptosuite = suite.as_str()))]
pub fn verify_proof(
    secured_document: &Value,
    suite: Cryptosuite,
    verification_method: &ECKeypair,
    collaborators: &SuiteCollaborators,
) -> Result<VerifyResult> {
    let proof_value = secured_document
        .get("proof")
        .cloned()
        .ok_or_else(|| Error::ProofVerification("secured document has no 'proof'".into()))?;
    let proof: Proof = serde_json::from_value(proof_value)
        .map_err(|e| Error::ProofVerification(format!("malformed proof: {e}")))?;
    let signature_b58 = proof
        .proof_value
        .as_ref()
        .ok_or_else(|| Error::ProofVerification("proof has no 'proofValue'".into()))?;
    let signature = base58btc_decode(signature_b58)?;

    let mut unsecured_document = secured_document.clone();
    if let Some(obj) = unsecured_document.as_object_mut() {
        obj.remove("proof");
    }
    let document_context = unsecured_document.get("@context");

    let transformed = transform(&unsecured_document, &proof, suite, collaborators)?;

    let proof_without_value = proof.without_proof_value();
    let (_, canonical_config) = configure(&proof_without_value, document_context, suite, collaborators)?;

    let curve = verification_method.curve();
    let hash_data = hash(curve, &canonical_config, &transformed);

    let public = verification_method.public_key.as_ref().ok_or_else(|| {
        Error::InvalidVerificationMethod("resolved verification method has no public key".into())
    })?;
    let verified = verify_raw(public, &hash_data, &signature)?;

    tracing::debug!(verified, "proof verified");
    Ok(VerifyResult {
        verified,
        verified_document: if verified {
            Some(unsecured_document)
        } else {
            None
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::Jcs;
    use crate::interfaces::{DocumentLoader, LoadedDocument};
    use serde_json::json;

    struct NullLoader;
    impl DocumentLoader for NullLoader {
        fn load(&self, url: &str) -> Result<LoadedDocument> {
            Err(Error::ProofVerification(format!("no loader configured for {url}")))
        }
    }

    #[test]
    fn jcs_sign_and_verify_round_trip() {
        let mut signer = ECKeypair::new(Curve::P256, None, Some("did:example:issuer".into()), None, None);
        signer.initialize().unwrap();

        let doc = json!({"@context": ["https://www.w3.org/ns/credentials/v2"], "id": "urn:1", "type": ["VerifiableCredential"]});
        let proof_options = Proof {
            type_: "DataIntegrityProof".into(),
            cryptosuite: "ecdsa-jcs-2019".into(),
            proof_purpose: "assertionMethod".into(),
            verification_method: signer.id.clone().unwrap(),
            created: Some("2023-02-24T23:36:38Z".into()),
            context: None,
            proof_value: None,
            extra: serde_json::Map::new(),
        };

        let loader = NullLoader;
        let jcs = Jcs;
        let collaborators = SuiteCollaborators {
            rdfc: None,
            jcs: Some(&jcs),
            loader: &loader,
        };

        let proof = create_proof(&doc, proof_options, Cryptosuite::EcdsaJcs2019, &signer, &collaborators).unwrap();
        assert!(proof.proof_value.is_some());

        let mut secured = doc.clone();
        secured
            .as_object_mut()
            .unwrap()
            .insert("proof".to_string(), serde_json::to_value(&proof).unwrap());

        let verification_keypair = ECKeypair {
            public_key: signer.public_key.clone(),
            ..ECKeypair::new(Curve::P256, signer.id.clone(), signer.controller.clone(), None, None)
        };

        let result = verify_proof(&secured, Cryptosuite::EcdsaJcs2019, &verification_keypair, &collaborators).unwrap();
        assert!(result.verified);
        assert!(result.verified_document.is_some());
    }

    #[test]
    fn tampered_document_fails_verification() {
        let mut signer = ECKeypair::new(Curve::P256, None, Some("did:example:issuer".into()), None, None);
        signer.initialize().unwrap();

        let doc = json!({"@context": ["https://www.w3.org/ns/credentials/v2"], "id": "urn:1"});
        let proof_options = Proof {
            type_: "DataIntegrityProof".into(),
            cryptosuite: "ecdsa-jcs-2019".into(),
            proof_purpose: "assertionMethod".into(),
            verification_method: signer.id.clone().unwrap(),
            created: Some("2023-02-24T23:36:38Z".into()),
            context: None,
            proof_value: None,
            extra: serde_json::Map::new(),
        };

        let loader = NullLoader;
        let jcs = Jcs;
        let collaborators = SuiteCollaborators { rdfc: None, jcs: Some(&jcs), loader: &loader };
        let proof = create_proof(&doc, proof_options, Cryptosuite::EcdsaJcs2019, &signer, &collaborators).unwrap();

        let mut secured = doc.clone();
        secured.as_object_mut().unwrap().insert("id".to_string(), json!("urn:tampered"));
        secured.as_object_mut().unwrap().insert("proof".to_string(), serde_json::to_value(&proof).unwrap());

        let verification_keypair = ECKeypair {
            public_key: signer.public_key.clone(),
            ..ECKeypair::new(Curve::P256, signer.id.clone(), signer.controller.clone(), None, None)
        };
        let result = verify_proof(&secured, Cryptosuite::EcdsaJcs2019, &verification_keypair, &collaborators).unwrap();
        assert!(!result.verified);
        assert!(result.verified_document.is_none());
    }

    /// spec.md §8's concrete vector: the Alumni Credential's RDFC proof
    /// hash and document hash, already canonicalized and digested by an
    /// external URDNA2015 run this crate doesn't reproduce. Feeds them
    /// directly into the hash-concatenation/sign/verify stage this crate
    /// owns, rather than re-deriving them from RDF canonicalization.
    #[test]
    fn alumni_credential_vector_signs_and_verifies() {
        let proof_hash =
            crate::codec::hex_to_bytes("3a8a522f689025727fb9d1f0fa99a618da023e8494ac74f51015d009d35abc2e")
                .unwrap();
        let document_hash =
            crate::codec::hex_to_bytes("517744132ae165a5349155bef0bb0cf2258fff99dfe1dbd914b938d775a36017")
                .unwrap();
        let hash_data = concatenate(&[&proof_hash, &document_hash]);

        let mut signer = ECKeypair::new(Curve::P256, None, None, None, None);
        signer.initialize().unwrap();
        let private = signer.private_key.as_ref().unwrap();
        let signature = sign_raw(private, &hash_data);

        let public = signer.public_key.as_ref().unwrap();
        assert!(verify_raw(public, &hash_data, &signature).unwrap());

        let mut tampered = hash_data.clone();
        tampered[0] ^= 0xff;
        assert!(!verify_raw(public, &tampered, &signature).unwrap());
    }
}
