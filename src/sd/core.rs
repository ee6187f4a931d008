//! The selective-disclosure core (spec.md §4.5): issuer `createBaseProof`,
//! holder `deriveProof`, verifier `verifyDerivedProof`.

use std::collections::{BTreeMap, HashMap};

use rand_core::{OsRng, RngCore};
use serde_json::Value;

use super::label_map::{
    compress_label_map, create_hmac_id_label_map_function, create_label_map_function,
    decompress_label_map,
};
use super::proof_value::{
    parse_base_proof_value, parse_derived_proof_value, serialize_base_proof_value,
    serialize_derived_proof_value, BaseProofValue, DerivedProofValue,
};
use crate::codec::concatenate;
use crate::curve::Curve;
use crate::error::{Error, Result};
use crate::hash::{digest, hash_mandatory_nquads};
use crate::interfaces::SdCollaborators;
use crate::key::{
    key_to_material_public, material_to_multibase, material_to_public_key, ECKeypair, Flag,
};
use crate::proof::{Cryptosuite, Proof};
use crate::suite::VerifyResult;

fn strip_blank_node_prefix(s: &str) -> &str {
    s.strip_prefix("_:").unwrap_or(s)
}

fn sign_message(keypair: &ECKeypair, message: &[u8]) -> Result<Vec<u8>> {
    let private = keypair.private_key.as_ref().ok_or_else(|| {
        Error::InvalidVerificationMethod("signing keypair has no private key".into())
    })?;
    Ok(crate::suite::sign_raw(private, message))
}

fn verify_message(keypair: &ECKeypair, message: &[u8], signature: &[u8]) -> Result<bool> {
    let public = keypair.public_key.as_ref().ok_or_else(|| {
        Error::InvalidVerificationMethod("keypair has no public key".into())
    })?;
    crate::suite::verify_raw(public, message, signature)
}

/// `proofHash`/base config hash shared by create/derive/verify: RDFC over
/// the proof options, with `@context` inherited from the document.
fn canonical_proof_config(
    proof: &Proof,
    document_context: Option<&Value>,
    collaborators: &SdCollaborators,
) -> Result<String> {
    proof.require_type_and_suite(Cryptosuite::EcdsaSd2023)?;
    proof.parsed_created()?;
    let mut config = proof.without_proof_value();
    config.context = document_context.cloned();
    collaborators.rdfc.canonicalize(
        &serde_json::to_value(&config)
            .map_err(|e| Error::ProofGeneration(format!("cannot serialize proof config: {e}")))?,
        collaborators.loader,
    )
}

fn ascending<'a>(map: &'a HashMap<u64, String>) -> Vec<(&'a u64, &'a String)> {
    let mut pairs: Vec<_> = map.iter().collect();
    pairs.sort_unstable_by_key(|(idx, _)| **idx);
    pairs
}

/// Issuer: `createBaseProof`. `curve` is the issuer's signing curve; the
/// proof-scoped keypair is always P-256/SHA-256 regardless (spec.md §9).
#[tracing::instrument(level = "debug", skip_all)]
pub fn create_base_proof(
    unsecured_document: &Value,
    proof_options: Proof,
    mandatory_pointers: &[String],
    curve: Curve,
    issuer: &ECKeypair,
    collaborators: &SdCollaborators,
) -> Result<Proof> {
    proof_options.require_type_and_suite(Cryptosuite::EcdsaSd2023)?;

    let mut hmac_key = [0u8; 32];
    OsRng.fill_bytes(&mut hmac_key);
    let label_map_factory = create_hmac_id_label_map_function(hmac_key);

    let mut group_definitions = HashMap::new();
    group_definitions.insert("mandatory".to_string(), mandatory_pointers.to_vec());

    let grouped = collaborators.group.canonicalize_and_group(
        unsecured_document,
        label_map_factory,
        &group_definitions,
        collaborators.loader,
    )?;
    let mandatory_group = grouped.groups.get("mandatory").cloned().unwrap_or_default();

    let document_context = unsecured_document.get("@context");
    let canonical_config = canonical_proof_config(&proof_options, document_context, collaborators)?;
    let proof_hash = digest(curve, canonical_config.as_bytes());

    let mandatory_nquads: Vec<&str> = ascending(&mandatory_group.matching)
        .into_iter()
        .map(|(_, nq)| nq.as_str())
        .collect();
    let mandatory_hash = hash_mandatory_nquads(curve, &mandatory_nquads);

    let mut psk = ECKeypair::new(Curve::P256, None, None, None, None);
    psk.initialize()?;
    tracing::trace!("proof-scoped keypair created");

    let non_mandatory_ordered = ascending(&mandatory_group.non_matching);
    let mut signatures = Vec::with_capacity(non_mandatory_ordered.len());
    for (_, nquad) in &non_mandatory_ordered {
        signatures.push(sign_message(&psk, nquad.as_bytes())?);
    }

    let psk_public_material = key_to_material_public(
        psk.public_key
            .as_ref()
            .ok_or_else(|| Error::InvalidKeypairContent("proof-scoped keypair has no public key".into()))?,
    )?;
    let psk_public_multibase = material_to_multibase(&psk_public_material, Flag::Public, Curve::P256)?;
    let psk_public_bytes = crate::codec::base58btc_decode(&psk_public_multibase)?;

    let to_sign = concatenate(&[&proof_hash, &psk_public_bytes, &mandatory_hash]);
    let base_signature = sign_message(issuer, &to_sign)?;

    drop(psk);
    tracing::trace!("proof-scoped keypair dropped");

    let proof_value = serialize_base_proof_value(&BaseProofValue {
        base_signature,
        public_key: psk_public_bytes,
        hmac_key,
        signatures,
        mandatory_pointers: mandatory_pointers.to_vec(),
    })?;

    let mut result = proof_options.without_proof_value();
    result.context = document_context.cloned();
    result.proof_value = Some(proof_value);
    Ok(result)
}

/// Holder: `deriveProof`. `curve` is accepted per spec.md §4.5.2's input
/// list but unused by any step here: the label map is always HMAC-SHA-256
/// and the per-statement signatures are always P-256, so nothing the
/// holder does is curve-dependent.
pub fn derive_proof(
    secured_document: &Value,
    selective_pointers: &[String],
    _curve: Curve,
    collaborators: &SdCollaborators,
) -> Result<Proof> {
    let proof_json = secured_document
        .get("proof")
        .ok_or_else(|| Error::ProofVerification("secured document has no 'proof'".into()))?;
    let proof: Proof = serde_json::from_value(proof_json.clone())
        .map_err(|e| Error::ProofVerification(format!("malformed proof: {e}")))?;
    let proof_value_str = proof
        .proof_value
        .as_ref()
        .ok_or_else(|| Error::ProofVerification("base proof has no 'proofValue'".into()))?;
    let base = parse_base_proof_value(proof_value_str)?;

    let label_map_factory = create_hmac_id_label_map_function(base.hmac_key);

    let mut combined_pointers = base.mandatory_pointers.clone();
    combined_pointers.extend(selective_pointers.iter().cloned());

    let mut group_definitions = HashMap::new();
    group_definitions.insert("mandatory".to_string(), base.mandatory_pointers.clone());
    group_definitions.insert("selective".to_string(), selective_pointers.to_vec());
    group_definitions.insert("combined".to_string(), combined_pointers.clone());

    let mut unsecured_document = secured_document.clone();
    if let Some(obj) = unsecured_document.as_object_mut() {
        obj.remove("proof");
    }

    let grouped = collaborators.group.canonicalize_and_group(
        &unsecured_document,
        label_map_factory,
        &group_definitions,
        collaborators.loader,
    )?;
    let mandatory_group = grouped.groups.get("mandatory").cloned().unwrap_or_default();
    let selective_group = grouped.groups.get("selective").cloned().unwrap_or_default();
    let combined_group = grouped.groups.get("combined").cloned().unwrap_or_default();

    let combined_matching_ordered = ascending(&combined_group.matching);
    let mut mandatory_indexes = Vec::new();
    for (counter, (idx, _)) in combined_matching_ordered.iter().enumerate() {
        if mandatory_group.matching.contains_key(idx) {
            mandatory_indexes.push(counter as u64);
        }
    }

    let non_mandatory_ordered = ascending(&mandatory_group.non_matching);
    if non_mandatory_ordered.len() != base.signatures.len() {
        return Err(Error::ProofVerification(format!(
            "base proof carries {} signatures but document has {} non-mandatory statements",
            base.signatures.len(),
            non_mandatory_ordered.len()
        )));
    }
    let mut filtered_signatures = Vec::new();
    for ((idx, _), signature) in non_mandatory_ordered.iter().zip(base.signatures.iter()) {
        if selective_group.matching.contains_key(idx) {
            filtered_signatures.push(signature.clone());
        }
    }

    let combined_nquads: Vec<String> = combined_matching_ordered
        .iter()
        .map(|(_, nq)| (*nq).clone())
        .collect();
    let (_canonical_text, canonical_id_map_raw) =
        collaborators.rdfc.canonize_nquads(&combined_nquads)?;
    let canonical_id_map: HashMap<String, String> = canonical_id_map_raw
        .into_iter()
        .map(|(k, v)| (strip_blank_node_prefix(&k).to_string(), strip_blank_node_prefix(&v).to_string()))
        .collect();

    let mut verifier_label_map = BTreeMap::new();
    for (input_label, verifier_label) in &canonical_id_map {
        if let Some(hmac_label) = grouped.label_map.get(&format!("_:{input_label}")) {
            verifier_label_map.insert(
                verifier_label.clone(),
                strip_blank_node_prefix(hmac_label).to_string(),
            );
        }
    }
    let compressed_label_map = compress_label_map(&verifier_label_map)?;

    let derived_value = serialize_derived_proof_value(&DerivedProofValue {
        base_signature: base.base_signature,
        public_key: base.public_key,
        signatures: filtered_signatures,
        compressed_label_map,
        mandatory_indexes,
    })?;

    let reveal_document = collaborators
        .selector
        .select(&combined_pointers, &unsecured_document)?;
    let document_context = reveal_document.get("@context").or(unsecured_document.get("@context"));

    let mut result = proof.without_proof_value();
    result.context = document_context.cloned();
    result.proof_value = Some(derived_value);
    Ok(result)
}

/// Verifier: `verifyDerivedProof`. `issuer` must carry the public key of
/// the original issuer's verification method.
pub fn verify_derived_proof(
    reveal_document: &Value,
    curve: Curve,
    issuer: &ECKeypair,
    collaborators: &SdCollaborators,
) -> Result<VerifyResult> {
    let proof_json = reveal_document
        .get("proof")
        .ok_or_else(|| Error::ProofVerification("reveal document has no 'proof'".into()))?;
    let proof: Proof = serde_json::from_value(proof_json.clone())
        .map_err(|e| Error::ProofVerification(format!("malformed proof: {e}")))?;
    let proof_value_str = proof
        .proof_value
        .as_ref()
        .ok_or_else(|| Error::ProofVerification("derived proof has no 'proofValue'".into()))?;
    let derived = parse_derived_proof_value(proof_value_str)?;

    let verifier_label_map = decompress_label_map(&derived.compressed_label_map);
    let label_map_factory = create_label_map_function(verifier_label_map);

    let mut unsecured_document = reveal_document.clone();
    if let Some(obj) = unsecured_document.as_object_mut() {
        obj.remove("proof");
    }

    let canonical_nquads = collaborators.label_replacement.canonicalize(
        &unsecured_document,
        label_map_factory,
        collaborators.loader,
    )?;

    let mandatory_index_set: std::collections::HashSet<u64> =
        derived.mandatory_indexes.iter().cloned().collect();
    let mut mandatory = Vec::new();
    let mut non_mandatory = Vec::new();
    for (i, nquad) in canonical_nquads.iter().enumerate() {
        if mandatory_index_set.contains(&(i as u64)) {
            mandatory.push(nquad.as_str());
        } else {
            non_mandatory.push(nquad.as_str());
        }
    }

    if derived.signatures.len() != non_mandatory.len() {
        return Err(Error::ProofVerification(format!(
            "derived proof carries {} signatures but {} non-mandatory statements were revealed",
            derived.signatures.len(),
            non_mandatory.len()
        )));
    }

    let mandatory_hash = hash_mandatory_nquads(curve, &mandatory);
    let document_context = unsecured_document.get("@context");
    let canonical_config = canonical_proof_config(&proof, document_context, collaborators)?;
    let proof_hash = digest(curve, canonical_config.as_bytes());

    let to_verify = concatenate(&[&proof_hash, &derived.public_key, &mandatory_hash]);
    let base_signature_ok = verify_message(issuer, &to_verify, &derived.base_signature)?;

    let psk_public_handle = material_to_public_key(&derived.public_key[2..], Curve::P256)?;
    let psk = ECKeypair {
        public_key: Some(psk_public_handle),
        private_key: None,
        ..ECKeypair::new(Curve::P256, None, None, None, None)
    };

    let mut per_statement_ok = true;
    for (nquad, signature) in non_mandatory.iter().zip(derived.signatures.iter()) {
        if !verify_message(&psk, nquad.as_bytes(), signature)? {
            per_statement_ok = false;
        }
    }

    let verified = base_signature_ok && per_statement_ok;
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
    use std::collections::HashSet;

    use serde_json::json;

    use super::*;
    use crate::interfaces::{
        CanonicalizeAndGroup, CanonicalizeAndGroupResult, DocumentLoader, JsonLdSelector,
        LabelMapFn, LabelReplacementCanonicalizer, LoadedDocument, NQuadGroup,
        RdfDatasetCanonicalizer,
    };

    /// A tiny five-statement fake dataset, with one blank node shared
    /// between statements 1 and 2. `idx:N` pointers select statement N;
    /// real JSON-LD pointers are out of scope here (see `crate::interfaces`).
    const QUADS: [&str; 5] = [
        "<urn:1> <urn:p1> \"a\" .",
        "<urn:1> <urn:p2> _:b0 .",
        "_:b0 <urn:p3> \"c\" .",
        "<urn:1> <urn:p4> \"d\" .",
        "<urn:1> <urn:p5> \"e\" .",
    ];

    fn pointer_indexes(pointers: &[String]) -> Vec<u64> {
        pointers
            .iter()
            .map(|p| p.strip_prefix("idx:").unwrap().parse().unwrap())
            .collect()
    }

    struct NullLoader;
    impl DocumentLoader for NullLoader {
        fn load(&self, url: &str) -> Result<LoadedDocument> {
            Err(Error::ProofVerification(format!(
                "no loader configured for {url}"
            )))
        }
    }

    struct FakeRdfc;
    impl RdfDatasetCanonicalizer for FakeRdfc {
        fn canonicalize(&self, document: &Value, _loader: &dyn DocumentLoader) -> Result<String> {
            serde_json::to_string(document)
                .map_err(|e| Error::ProofTransformation(format!("canonicalize failed: {e}")))
        }

        fn canonize_nquads(&self, nquads: &[String]) -> Result<(String, HashMap<String, String>)> {
            // Real RDFC input already carries the HMAC-relabeled blank node
            // text, so this scans for whatever token shows up rather than
            // the original "_:b0" — it only ever sees the substitute.
            let mut id_map = HashMap::new();
            let mut next = 0u64;
            for nq in nquads {
                for token in nq.split_whitespace() {
                    if token.starts_with("_:") && !id_map.contains_key(token) {
                        id_map.insert(token.to_string(), format!("_:c14n{next}"));
                        next += 1;
                    }
                }
            }
            Ok((nquads.join("\n"), id_map))
        }
    }

    /// Partitions the whole five-statement universe per named group,
    /// exactly as a real `canonicalizeAndGroup` would: each group's
    /// `matching`/`non_matching` together cover every statement, not just
    /// the ones that group's own pointers select.
    struct FakeGroup;
    impl CanonicalizeAndGroup for FakeGroup {
        fn canonicalize_and_group(
            &self,
            _document: &Value,
            label_map_factory: LabelMapFn,
            group_definitions: &HashMap<String, Vec<String>>,
            _loader: &dyn DocumentLoader,
        ) -> Result<CanonicalizeAndGroupResult> {
            // Grouped N-Quads keep the canonicalizer's own blank node ids
            // (matching what actually gets signed); `label_map` records
            // the HMAC substitute for each one, keyed by that same native
            // id, for the derived proof's compressed label map.
            let universe: HashSet<u64> = (0..QUADS.len() as u64).collect();
            let mut groups = HashMap::new();
            for (name, pointers) in group_definitions {
                let selected: HashSet<u64> = pointer_indexes(pointers).into_iter().collect();
                let matching = selected
                    .iter()
                    .map(|i| (*i, QUADS[*i as usize].to_string()))
                    .collect();
                let non_matching = universe
                    .difference(&selected)
                    .map(|i| (*i, QUADS[*i as usize].to_string()))
                    .collect();
                groups.insert(
                    name.clone(),
                    NQuadGroup {
                        matching,
                        non_matching,
                        deskolemized_nquads: Vec::new(),
                    },
                );
            }
            let mut label_map = HashMap::new();
            label_map.insert("_:b0".to_string(), label_map_factory("_:b0")?);
            Ok(CanonicalizeAndGroupResult { groups, label_map })
        }
    }

    struct FakeSelector;
    impl JsonLdSelector for FakeSelector {
        fn select(&self, pointers: &[String], document: &Value) -> Result<Value> {
            let mut indexes = pointer_indexes(pointers);
            indexes.sort_unstable();
            Ok(json!({
                "@context": document.get("@context").cloned().unwrap_or(json!([])),
                "revealed_indices": indexes,
            }))
        }
    }

    struct FakeLabelReplacement;
    impl LabelReplacementCanonicalizer for FakeLabelReplacement {
        fn canonicalize(
            &self,
            document: &Value,
            label_map_factory: LabelMapFn,
            _loader: &dyn DocumentLoader,
        ) -> Result<Vec<String>> {
            let indexes = document
                .get("revealed_indices")
                .and_then(|v| v.as_array())
                .ok_or_else(|| Error::ProofVerification("missing revealed_indices".into()))?;
            // A real label-replacement canonicalizer assigns its own fresh
            // canonical ids to the blank nodes it sees and resolves those
            // through the label map; with a single blank node in this
            // fixture that id is always "c14n0". The lookup is exercised
            // for its own sake (an unresolvable label is a verification
            // error) but the signed N-Quads already carry the
            // canonicalizer's native id, so that's what gets reproduced.
            let mut seen_blank_node = false;
            let mut out = Vec::new();
            for idx in indexes {
                let i = idx
                    .as_u64()
                    .ok_or_else(|| Error::ProofVerification("revealed index not a u64".into()))?
                    as usize;
                let nq = QUADS[i];
                if nq.contains("_:b0") {
                    if !seen_blank_node {
                        label_map_factory("c14n0")?;
                        seen_blank_node = true;
                    }
                }
                out.push(nq.to_string());
            }
            Ok(out)
        }
    }

    fn make_issuer() -> ECKeypair {
        let mut kp = ECKeypair::new(
            Curve::P256,
            None,
            Some("did:example:issuer".to_string()),
            None,
            None,
        );
        kp.initialize().unwrap();
        kp
    }

    fn verification_keypair(issuer: &ECKeypair) -> ECKeypair {
        ECKeypair {
            public_key: issuer.public_key.clone(),
            ..ECKeypair::new(
                Curve::P256,
                issuer.id.clone(),
                issuer.controller.clone(),
                None,
                None,
            )
        }
    }

    fn proof_options(issuer: &ECKeypair) -> Proof {
        Proof {
            type_: "DataIntegrityProof".to_string(),
            cryptosuite: "ecdsa-sd-2023".to_string(),
            proof_purpose: "assertionMethod".to_string(),
            verification_method: issuer.id.clone().unwrap(),
            created: Some("2023-08-15T23:36:38Z".to_string()),
            context: None,
            proof_value: None,
            extra: serde_json::Map::new(),
        }
    }

    struct Collaborators {
        loader: NullLoader,
        rdfc: FakeRdfc,
        group: FakeGroup,
        label_replacement: FakeLabelReplacement,
        selector: FakeSelector,
    }

    impl Collaborators {
        fn new() -> Self {
            Collaborators {
                loader: NullLoader,
                rdfc: FakeRdfc,
                group: FakeGroup,
                label_replacement: FakeLabelReplacement,
                selector: FakeSelector,
            }
        }

        fn bundle(&self) -> SdCollaborators<'_> {
            SdCollaborators {
                rdfc: &self.rdfc,
                group: &self.group,
                label_replacement: &self.label_replacement,
                selector: &self.selector,
                loader: &self.loader,
            }
        }
    }

    /// Issues a base proof over statements 0-4 (mandatory: 0, 1) and
    /// derives a reveal disclosing statement 3 as well, returning the
    /// reveal document (with `revealed_indices` so the fake
    /// label-replacement canonicalizer can reconstruct it) and the issuer.
    fn issue_and_derive() -> (Value, ECKeypair) {
        let issuer = make_issuer();
        let collaborators = Collaborators::new();
        let bundle = collaborators.bundle();

        let doc = json!({"@context": ["https://www.w3.org/ns/credentials/v2"], "id": "urn:1"});
        let mandatory_pointers = vec!["idx:0".to_string(), "idx:1".to_string()];
        let base_proof = create_base_proof(
            &doc,
            proof_options(&issuer),
            &mandatory_pointers,
            Curve::P256,
            &issuer,
            &bundle,
        )
        .unwrap();

        let mut secured = doc.clone();
        secured
            .as_object_mut()
            .unwrap()
            .insert("proof".to_string(), serde_json::to_value(&base_proof).unwrap());

        let selective_pointers = vec!["idx:3".to_string()];
        let derived_proof =
            derive_proof(&secured, &selective_pointers, Curve::P256, &bundle).unwrap();

        let mut reveal = json!({
            "@context": ["https://www.w3.org/ns/credentials/v2"],
            "revealed_indices": [0u64, 1, 3],
        });
        reveal
            .as_object_mut()
            .unwrap()
            .insert("proof".to_string(), serde_json::to_value(&derived_proof).unwrap());

        (reveal, issuer)
    }

    #[test]
    fn issue_derive_verify_round_trip() {
        let (reveal, issuer) = issue_and_derive();
        let collaborators = Collaborators::new();
        let verifier_keypair = verification_keypair(&issuer);

        let result =
            verify_derived_proof(&reveal, Curve::P256, &verifier_keypair, &collaborators.bundle())
                .unwrap();
        assert!(result.verified);
        assert!(result.verified_document.is_some());
    }

    #[test]
    fn substituting_a_never_signed_statement_fails_verification() {
        let (mut reveal, issuer) = issue_and_derive();
        // Statement 4 was never disclosed by the holder, so no signature in
        // the derived proof covers it; swapping it in for statement 3
        // leaves the signature count untouched but desyncs every
        // non-mandatory signature from the statement it actually covers.
        reveal
            .as_object_mut()
            .unwrap()
            .insert("revealed_indices".to_string(), json!([0u64, 1, 4]));
        let collaborators = Collaborators::new();
        let verifier_keypair = verification_keypair(&issuer);

        let result =
            verify_derived_proof(&reveal, Curve::P256, &verifier_keypair, &collaborators.bundle())
                .unwrap();
        assert!(!result.verified);
        assert!(result.verified_document.is_none());
    }

    #[test]
    fn signature_count_mismatch_is_a_verification_error() {
        let (mut reveal, issuer) = issue_and_derive();
        // Adding a fourth non-mandatory statement without a matching
        // signature must be rejected outright, not silently partially
        // verified.
        reveal
            .as_object_mut()
            .unwrap()
            .insert("revealed_indices".to_string(), json!([0u64, 1, 3, 4]));
        let collaborators = Collaborators::new();
        let verifier_keypair = verification_keypair(&issuer);

        let err =
            verify_derived_proof(&reveal, Curve::P256, &verifier_keypair, &collaborators.bundle())
                .unwrap_err();
        assert!(matches!(err, Error::ProofVerification(_)));
    }

    #[test]
    fn dropping_a_mandatory_statement_is_a_verification_error() {
        // Dropping statement 0 from the reveal shifts every later
        // statement's position, so `mandatoryIndexes` (relative counters
        // baked into the derived proof) no longer line up with the
        // mandatory/non-mandatory split the verifier recomputes from the
        // reveal — here it manifests as a signature-count mismatch.
        let (mut reveal, issuer) = issue_and_derive();
        reveal
            .as_object_mut()
            .unwrap()
            .insert("revealed_indices".to_string(), json!([1u64, 3]));
        let collaborators = Collaborators::new();
        let verifier_keypair = verification_keypair(&issuer);

        let err =
            verify_derived_proof(&reveal, Curve::P256, &verifier_keypair, &collaborators.bundle())
                .unwrap_err();
        assert!(matches!(err, Error::ProofVerification(_)));
    }
}
