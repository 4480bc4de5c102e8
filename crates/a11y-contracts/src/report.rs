//! Scan report types.
//!
//! A `ScanReport` is the rule engine's answer for one page: every rule
//! result lands in exactly one of `violations`, `passes`, `incomplete`, or
//! `inapplicable`. The report keeps the engine's JSON exactly as received and
//! serializes back to it; the typed rule results are a read-only view decoded
//! from that JSON for summaries.

use std::collections::BTreeMap;

use serde::{de::Error as _, Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Severity the rule engine assigns to a rule result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Minor,
    Moderate,
    Serious,
    Critical,
}

impl Impact {
    pub fn as_str(self) -> &'static str {
        match self {
            Impact::Minor => "minor",
            Impact::Moderate => "moderate",
            Impact::Serious => "serious",
            Impact::Critical => "critical",
        }
    }
}

/// One DOM node a rule result applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeResult {
    /// Outer HTML snippet of the affected element.
    #[serde(default)]
    pub html: String,
    /// Selectors, failure summaries, and anything else the engine attaches.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One accessibility check outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleResult {
    /// Rule identifier, e.g. `"color-contrast"`.
    pub id: String,
    /// Severity; absent or null for passes and inapplicable rules.
    pub impact: Option<Impact>,
    pub help: Option<String>,
    pub description: Option<String>,
    pub help_url: Option<String>,
    #[serde(default)]
    pub nodes: Vec<NodeResult>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The structured report returned by a successful scan.
///
/// `violations`, `passes`, and `incomplete` are required: a payload without
/// them is not a report and cannot complete an audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Value", try_from = "Value")]
pub struct ScanReport {
    raw: Value,
    rules: RuleCategories,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct RuleCategories {
    violations: Vec<RuleResult>,
    passes: Vec<RuleResult>,
    incomplete: Vec<RuleResult>,
    #[serde(default)]
    inapplicable: Vec<RuleResult>,
}

impl ScanReport {
    /// Decode the rule categories of an engine report, keeping `raw` as is.
    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        if !raw.is_object() {
            return Err(serde_json::Error::custom("scan report must be a JSON object"));
        }
        let rules = RuleCategories::deserialize(&raw)?;
        Ok(Self { raw, rules })
    }

    /// The engine's report, unchanged.
    pub fn as_value(&self) -> &Value {
        &self.raw
    }

    pub fn into_value(self) -> Value {
        self.raw
    }

    pub fn violations(&self) -> &[RuleResult] {
        &self.rules.violations
    }

    pub fn passes(&self) -> &[RuleResult] {
        &self.rules.passes
    }

    pub fn incomplete(&self) -> &[RuleResult] {
        &self.rules.incomplete
    }

    pub fn inapplicable(&self) -> &[RuleResult] {
        &self.rules.inapplicable
    }

    /// Count results per category and violations per impact.
    pub fn summary(&self) -> ReportSummary {
        let mut by_impact = BTreeMap::new();
        for violation in self.violations() {
            if let Some(impact) = violation.impact {
                *by_impact.entry(impact).or_insert(0) += 1;
            }
        }

        ReportSummary {
            violations: self.rules.violations.len(),
            passes: self.rules.passes.len(),
            incomplete: self.rules.incomplete.len(),
            inapplicable: self.rules.inapplicable.len(),
            affected_nodes: self.rules.violations.iter().map(|v| v.nodes.len()).sum(),
            by_impact,
        }
    }
}

impl TryFrom<Value> for ScanReport {
    type Error = serde_json::Error;

    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        Self::from_value(raw)
    }
}

impl From<ScanReport> for Value {
    fn from(report: ScanReport) -> Self {
        report.raw
    }
}

/// Headline numbers for a report, as shown on the summary cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub violations: usize,
    pub passes: usize,
    pub incomplete: usize,
    pub inapplicable: usize,
    /// Total DOM nodes across all violations.
    pub affected_nodes: usize,
    /// Violations grouped by impact. Violations without an impact are not counted.
    pub by_impact: BTreeMap<Impact, usize>,
}

/// Why a scan produced no report.
///
/// Serialized as `{"error": "<message>"}`, which is exactly the `results`
/// payload of a failed record.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ScanFailure {
    #[serde(rename = "error")]
    pub message: String,
}

impl ScanFailure {
    /// Message recorded when the engine fails without saying why.
    pub const UNKNOWN: &'static str = "unknown scan failure";

    /// Build a failure from an engine message, substituting
    /// [`ScanFailure::UNKNOWN`] for blank messages.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            Self {
                message: Self::UNKNOWN.to_string(),
            }
        } else {
            Self { message }
        }
    }
}
