//! External collaborators (spec.md §6): the document loader, the RDF/JCS
//! canonicalizers, and the selective-disclosure helpers that need a real
//! RDF dataset model and JSON-LD processor. Modeled as traits; this crate
//! ships one concrete `JsonCanonicalizer` (over `json-canon`) and leaves
//! the rest for callers to supply, per the suite's stated non-goals.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::Result;

/// Resolves a URL to a JSON-LD document: contexts and verification-method
/// documents both flow through this one seam.
pub trait DocumentLoader {
    fn load(&self, url: &str) -> Result<LoadedDocument>;
}

#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub document_url: String,
    pub document: Value,
}

/// RDF Dataset Canonicalization (URDNA2015 / RDFC-1.0), out of scope per
/// spec.md §1; consumed as a thin wrapper per §4.1.
pub trait RdfDatasetCanonicalizer {
    /// `normalize(doc, {algorithm, format: "application/n-quads", documentLoader})`.
    fn canonicalize(&self, document: &Value, loader: &dyn DocumentLoader) -> Result<String>;

    /// `canonize(nquads, {canonicalIdMap})`: re-canonicalize an already
    /// extracted set of N-Quads (the selective-disclosure core's "combined"
    /// reveal group), returning the joined canonical N-Quads text and the
    /// map from each input blank-node label to its canonical replacement.
    fn canonize_nquads(&self, nquads: &[String]) -> Result<(String, HashMap<String, String>)>;
}

/// JSON Canonicalization Scheme (RFC 8785), out of scope per spec.md §1;
/// consumed as a thin wrapper.
pub trait JsonCanonicalizer {
    fn canonicalize(&self, document: &Value) -> Result<String>;
}

/// A blank-node label remapping function, as produced by
/// `createHmacIdLabelMapFunction` or `createLabelMapFunction`.
pub type LabelMapFn = Box<dyn Fn(&str) -> Result<String>>;

/// One named group's matching/non-matching N-Quads, as produced by
/// `canonicalizeAndGroup`.
#[derive(Debug, Clone, Default)]
pub struct NQuadGroup {
    pub matching: HashMap<u64, String>,
    pub non_matching: HashMap<u64, String>,
    pub deskolemized_nquads: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CanonicalizeAndGroupResult {
    pub groups: HashMap<String, NQuadGroup>,
    pub label_map: HashMap<String, String>,
}

/// `canonicalizeAndGroup(doc, labelMapFactory, groups, options)`: needs a
/// real RDF dataset model and JSON-LD processor, so it is a trait seam
/// rather than an implementation.
pub trait CanonicalizeAndGroup {
    fn canonicalize_and_group(
        &self,
        document: &Value,
        label_map_factory: LabelMapFn,
        group_definitions: &HashMap<String, Vec<String>>,
        loader: &dyn DocumentLoader,
    ) -> Result<CanonicalizeAndGroupResult>;
}

/// `labelReplacementCanonicalizeJsonLd(doc, factory, options)`.
pub trait LabelReplacementCanonicalizer {
    fn canonicalize(
        &self,
        document: &Value,
        label_map_factory: LabelMapFn,
        loader: &dyn DocumentLoader,
    ) -> Result<Vec<String>>;
}

/// `selectJsonLd(pointers, doc)`: JSON-Pointer selection over JSON-LD, out
/// of scope per spec.md §1.
pub trait JsonLdSelector {
    fn select(&self, pointers: &[String], document: &Value) -> Result<Value>;
}

/// The bundle of collaborators the RDFC/JCS suite core needs.
pub struct SuiteCollaborators<'a> {
    pub rdfc: Option<&'a dyn RdfDatasetCanonicalizer>,
    pub jcs: Option<&'a dyn JsonCanonicalizer>,
    pub loader: &'a dyn DocumentLoader,
}

/// The bundle of collaborators the selective-disclosure core needs, beyond
/// the pure byte/string helpers this crate implements directly.
pub struct SdCollaborators<'a> {
    pub rdfc: &'a dyn RdfDatasetCanonicalizer,
    pub group: &'a dyn CanonicalizeAndGroup,
    pub label_replacement: &'a dyn LabelReplacementCanonicalizer,
    pub selector: &'a dyn JsonLdSelector,
    pub loader: &'a dyn DocumentLoader,
}
