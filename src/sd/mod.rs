//! The selective-disclosure core (spec.md §2 component 6, §4.5): HMAC-keyed
//! blank-node label map, per-N-Quad signatures under a proof-scoped
//! keypair, CBOR framing, label-map compression, and the issuer/holder/
//! verifier operations built on top of them.

mod core;
mod label_map;
mod proof_value;

pub use core::{create_base_proof, derive_proof, verify_derived_proof};
pub use label_map::{
    compress_label_map, create_hmac_id_label_map_function, create_label_map_function,
    decompress_label_map,
};
pub use proof_value::{
    parse_base_proof_value, parse_derived_proof_value, serialize_base_proof_value,
    serialize_derived_proof_value, BaseProofValue, DerivedProofValue, BASE_PROOF_HEADER,
    DERIVED_PROOF_HEADER,
};
