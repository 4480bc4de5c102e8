//! Schema-based report verifier.
//!
//! `ReportSchemaVerifier` implements the `ReportVerifier` trait from
//! `a11y-core`. A raw engine payload is validated against a JSON Schema
//! document; every violation is collected before returning so operators see
//! the full failure set in one pass.
//!
//! The built-in schema accepts exactly what can complete an audit: an object
//! with `violations`, `passes`, and `incomplete` arrays (plus an optional
//! `inapplicable` array) of rule objects, each with a non-empty string `id`.

use serde_json::{json, Value};
use tracing::warn;

use a11y_contracts::verify::{VerificationFailure, VerificationReport};
use a11y_core::traits::ReportVerifier;

/// Check id used for every failure this verifier reports.
pub const SCHEMA_CHECK: &str = "json-schema";

/// The schema every scan report must satisfy before it is stored.
pub fn report_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "required": ["violations", "passes", "incomplete"],
        "properties": {
            "violations": { "$ref": "#/definitions/results" },
            "passes": { "$ref": "#/definitions/results" },
            "incomplete": { "$ref": "#/definitions/results" },
            "inapplicable": { "$ref": "#/definitions/results" }
        },
        "definitions": {
            "results": {
                "type": "array",
                "items": { "$ref": "#/definitions/rule" }
            },
            "rule": {
                "type": "object",
                "required": ["id"],
                "properties": {
                    "id": { "type": "string", "minLength": 1 },
                    "impact": { "enum": ["minor", "moderate", "serious", "critical", null] },
                    "help": { "type": ["string", "null"] },
                    "description": { "type": ["string", "null"] },
                    "helpUrl": { "type": ["string", "null"] },
                    "nodes": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": { "html": { "type": "string" } }
                        }
                    }
                }
            }
        }
    })
}

/// Structural verifier for raw scan reports.
#[derive(Debug, Clone)]
pub struct ReportSchemaVerifier {
    schema: Value,
}

impl ReportSchemaVerifier {
    /// A verifier using [`report_schema`].
    pub fn new() -> Self {
        Self::with_schema(report_schema())
    }

    /// A verifier using a caller-supplied schema document, for engines whose
    /// reports carry stricter guarantees.
    pub fn with_schema(schema: Value) -> Self {
        Self { schema }
    }
}

impl Default for ReportSchemaVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportVerifier for ReportSchemaVerifier {
    fn verify(&self, report: &Value) -> VerificationReport {
        let mut failures = Vec::new();

        match jsonschema::validator_for(&self.schema) {
            Ok(validator) => {
                for error in validator.iter_errors(report) {
                    let message = format!("at '{}': {}", error.instance_path, error);
                    warn!(%message, "scan report failed schema validation");
                    failures.push(VerificationFailure {
                        check_id: SCHEMA_CHECK.to_string(),
                        message,
                    });
                }
            }
            Err(e) => {
                // A broken schema must not let unverified reports through.
                let message = format!("invalid JSON Schema document: {e}");
                warn!(%message, "report schema compilation failure");
                failures.push(VerificationFailure {
                    check_id: SCHEMA_CHECK.to_string(),
                    message,
                });
            }
        }

        VerificationReport::from_failures(failures)
    }
}
