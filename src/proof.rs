//! The JSON-LD proof / proof-options value object shared by all three
//! cryptosuites (spec.md §3 "Proof options / Proof").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

pub const DATA_INTEGRITY_PROOF_TYPE: &str = "DataIntegrityProof";

/// The three cryptosuite identifiers this crate accepts in `proof.cryptosuite`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cryptosuite {
    EcdsaRdfc2019,
    EcdsaJcs2019,
    EcdsaSd2023,
}

impl Cryptosuite {
    pub const fn as_str(self) -> &'static str {
        match self {
            Cryptosuite::EcdsaRdfc2019 => "ecdsa-rdfc-2019",
            Cryptosuite::EcdsaJcs2019 => "ecdsa-jcs-2019",
            Cryptosuite::EcdsaSd2023 => "ecdsa-sd-2023",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "ecdsa-rdfc-2019" => Ok(Cryptosuite::EcdsaRdfc2019),
            "ecdsa-jcs-2019" => Ok(Cryptosuite::EcdsaJcs2019),
            "ecdsa-sd-2023" => Ok(Cryptosuite::EcdsaSd2023),
            other => Err(Error::ProofTransformation(format!(
                "unrecognized cryptosuite {other}"
            ))),
        }
    }
}

/// A `DataIntegrityProof` JSON-LD object, in either its pre-signing
/// ("proof options") or post-signing ("proof") form. Extension members
/// (`domain`, `challenge`, `previousProof`, ...) round-trip unexamined
/// through `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proof {
    #[serde(rename = "type")]
    pub type_: String,
    pub cryptosuite: String,
    #[serde(rename = "proofPurpose")]
    pub proof_purpose: String,
    #[serde(rename = "verificationMethod")]
    pub verification_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(rename = "@context", skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(rename = "proofValue", skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Proof {
    /// `Transform` step's gate, shared by every suite: reject unless
    /// `type` and `cryptosuite` match what the caller expects.
    pub fn require_type_and_suite(&self, expected: Cryptosuite) -> Result<()> {
        if self.type_ != DATA_INTEGRITY_PROOF_TYPE {
            return Err(Error::ProofTransformation(format!(
                "proof.type must be '{DATA_INTEGRITY_PROOF_TYPE}', got '{}'",
                self.type_
            )));
        }
        if self.cryptosuite != expected.as_str() {
            return Err(Error::ProofTransformation(format!(
                "proof.cryptosuite must be '{}', got '{}'",
                expected.as_str(),
                self.cryptosuite
            )));
        }
        Ok(())
    }

    /// A clone with `proofValue` and `@context` cleared, as the `Configure`
    /// step and proof-value stripping both need.
    pub fn without_proof_value(&self) -> Proof {
        Proof {
            proof_value: None,
            ..self.clone()
        }
    }

    /// Parse and validate `created` as an RFC 3339 datetime. A
    /// non-parseable `created` is a `ProofGenerationError` per spec.md §4.4
    /// step 2.
    pub fn parsed_created(&self) -> Result<Option<DateTime<Utc>>> {
        match &self.created {
            None => Ok(None),
            Some(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|e| Error::ProofGeneration(format!("invalid 'created' datetime: {e}"))),
        }
    }
}
