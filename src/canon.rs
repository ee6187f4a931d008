//! The canonicalization façade (spec.md §2 component 4): thin wrappers
//! over the external URDNA2015 and JCS implementations. This crate ships
//! a concrete JCS adapter since JCS needs no RDF dataset model or JSON-LD
//! processor; RDFC has no concrete adapter here (see `crate::interfaces`).

use serde_json::Value;

use crate::error::{Error, Result};
use crate::interfaces::JsonCanonicalizer;

/// `JsonCanonicalizer` over RFC 8785 via the `json-canon` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Jcs;

impl JsonCanonicalizer for Jcs {
    fn canonicalize(&self, document: &Value) -> Result<String> {
        json_canon::to_string(document)
            .map_err(|e| Error::ProofTransformation(format!("JCS canonicalization failed: {e}")))
    }
}
