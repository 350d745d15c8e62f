//! Auto-analytics assignment: picks the cost center for a financial
//! transaction from a set of operator-defined rules.
//!
//! Every function here is stateless. Rule sets come from a [`RuleProvider`]
//! on each call and are never cached.

pub mod attributes;
pub mod bulk;
pub mod classifier;
pub mod coverage;
pub mod matching;
pub mod provider;
pub mod rules_file;
pub mod select;
pub mod validate;

pub use attributes::{extract, Attributes};
pub use bulk::{classify_batch, BulkItem, BulkReport, BulkSummary};
pub use classifier::{classify, classify_with_rules, explain, Decision, Explanation, Outcome};
pub use coverage::{
    coverage_for_rules, coverage_report, preview_rule, CoverageDetail, CoverageReport,
    PreviewMatch, RulePreview,
};
pub use matching::{any_field_matches, field_matches, matched_fields, score, Specificity};
pub use provider::{provider_fn, FileRuleProvider, FnProvider, RuleFetchError, RuleProvider};
pub use rules_file::{RulesFileError, RulesFormat};
pub use select::{rank, select_best, Candidate};
pub use validate::{build_rule, validate_rule, validate_rules, RuleReport, RuleViolation, ValidationReport};
