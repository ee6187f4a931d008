//! ECDSA Data Integrity cryptosuites for Verifiable Credentials:
//! `ecdsa-rdfc-2019`, `ecdsa-jcs-2019`, and `ecdsa-sd-2023`.
//!
//! This crate implements the cryptographic protocol machinery — the
//! keypair model, its Multikey/JWK verification-method encodings, the two
//! non-selective proof pipelines, and the full selective-disclosure
//! protocol. RDF Dataset Canonicalization, JSON Canonicalization (except
//! where noted), a JSON-LD document loader, and JSON-Pointer selection are
//! consumed through the traits in [`interfaces`], not implemented here.

#[cfg(feature = "jcs")]
pub mod canon;
pub mod codec;
pub mod curve;
pub mod error;
pub mod hash;
pub mod interfaces;
pub mod key;
pub mod proof;
mod sd;
mod suite;

pub use curve::Curve;
pub use error::{Error, Result};
pub use proof::{Cryptosuite, Proof};
pub use sd::{
    compress_label_map, create_hmac_id_label_map_function, create_label_map_function,
    decompress_label_map, parse_base_proof_value, parse_derived_proof_value,
    serialize_base_proof_value, serialize_derived_proof_value, BaseProofValue, DerivedProofValue,
};
pub use suite::VerifyResult;

use interfaces::{SdCollaborators, SuiteCollaborators};
use key::ECKeypair;
use serde_json::Value;

/// `ecdsa-rdfc-2019`: RDF Dataset Canonicalization followed by ECDSA.
pub struct EcdsaRdfc2019;

impl EcdsaRdfc2019 {
    pub fn create_proof(
        unsecured_document: &Value,
        proof_options: Proof,
        signer: &ECKeypair,
        collaborators: &SuiteCollaborators,
    ) -> Result<Proof> {
        suite::create_proof(
            unsecured_document,
            proof_options,
            Cryptosuite::EcdsaRdfc2019,
            signer,
            collaborators,
        )
    }

    pub fn verify_proof(
        secured_document: &Value,
        verification_method: &ECKeypair,
        collaborators: &SuiteCollaborators,
    ) -> Result<VerifyResult> {
        suite::verify_proof(
            secured_document,
            Cryptosuite::EcdsaRdfc2019,
            verification_method,
            collaborators,
        )
    }
}

/// `ecdsa-jcs-2019`: JSON Canonicalization Scheme followed by ECDSA.
pub struct EcdsaJcs2019;

impl EcdsaJcs2019 {
    pub fn create_proof(
        unsecured_document: &Value,
        proof_options: Proof,
        signer: &ECKeypair,
        collaborators: &SuiteCollaborators,
    ) -> Result<Proof> {
        suite::create_proof(
            unsecured_document,
            proof_options,
            Cryptosuite::EcdsaJcs2019,
            signer,
            collaborators,
        )
    }

    pub fn verify_proof(
        secured_document: &Value,
        verification_method: &ECKeypair,
        collaborators: &SuiteCollaborators,
    ) -> Result<VerifyResult> {
        suite::verify_proof(
            secured_document,
            Cryptosuite::EcdsaJcs2019,
            verification_method,
            collaborators,
        )
    }
}

/// `ecdsa-sd-2023`: selective-disclosure proofs over per-statement
/// signatures. Unlike the other two suites, curve selection governs only
/// the issuer's own base signature and document/proof hashing — the
/// HMAC-Id label map is always SHA-256 and per-statement signatures are
/// always P-256/SHA-256, regardless of the issuer's curve (spec.md §9).
pub struct EcdsaSd2023;

impl EcdsaSd2023 {
    pub fn create_proof(
        unsecured_document: &Value,
        proof_options: Proof,
        mandatory_pointers: &[String],
        curve: Curve,
        issuer: &ECKeypair,
        collaborators: &SdCollaborators,
    ) -> Result<Proof> {
        sd::create_base_proof(
            unsecured_document,
            proof_options,
            mandatory_pointers,
            curve,
            issuer,
            collaborators,
        )
    }

    pub fn derive_proof(
        secured_document: &Value,
        selective_pointers: &[String],
        curve: Curve,
        collaborators: &SdCollaborators,
    ) -> Result<Proof> {
        sd::derive_proof(secured_document, selective_pointers, curve, collaborators)
    }

    pub fn verify_proof(
        reveal_document: &Value,
        curve: Curve,
        issuer: &ECKeypair,
        collaborators: &SdCollaborators,
    ) -> Result<VerifyResult> {
        sd::verify_derived_proof(reveal_document, curve, issuer, collaborators)
    }
}
