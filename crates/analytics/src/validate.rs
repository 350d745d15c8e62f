use serde::Serialize;
use std::collections::HashSet;
use tally_core::{Rule, RuleDefinition, RuleState};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("Rule id is required")]
    MissingId,
    #[error("Analytics to apply is required")]
    MissingAnalytics,
    #[error("Unknown state '{0}': expected draft, confirmed or cancelled")]
    UnknownState(String),
    #[error("At least one of partner, partner_tag, product or product_category must be set")]
    NoMatchFields,
    #[error("Duplicate rule id '{0}'")]
    DuplicateId(String),
}

/// Every problem found with a rule definition, as human-readable strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_violations(violations: &[RuleViolation]) -> Self {
        ValidationReport {
            valid: violations.is_empty(),
            errors: violations.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Validation result for one definition of a rules file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleReport {
    pub rule_id: String,
    #[serde(flatten)]
    pub report: ValidationReport,
}

/// Blank text counts as "not specified".
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn violations(def: &RuleDefinition) -> Vec<RuleViolation> {
    let mut found = Vec::new();

    if def.id.trim().is_empty() {
        found.push(RuleViolation::MissingId);
    }
    if present(&def.analytics_to_apply).is_none() {
        found.push(RuleViolation::MissingAnalytics);
    }
    if def.state.parse::<RuleState>().is_err() {
        found.push(RuleViolation::UnknownState(def.state.clone()));
    }

    let match_fields = [
        &def.partner,
        &def.partner_tag,
        &def.product,
        &def.product_category,
    ];
    if match_fields.iter().all(|field| present(field).is_none()) {
        found.push(RuleViolation::NoMatchFields);
    }

    found
}

pub fn validate_rule(def: &RuleDefinition) -> ValidationReport {
    ValidationReport::from_violations(&violations(def))
}

/// Validates a set of definitions; repeated ids are flagged on every later occurrence.
pub fn validate_rules(defs: &[RuleDefinition]) -> Vec<RuleReport> {
    let mut seen = HashSet::new();
    defs.iter()
        .map(|def| {
            let mut found = violations(def);
            let id = def.id.trim();
            if !id.is_empty() && !seen.insert(id.to_string()) {
                found.push(RuleViolation::DuplicateId(id.to_string()));
            }
            RuleReport {
                rule_id: def.id.clone(),
                report: ValidationReport::from_violations(&found),
            }
        })
        .collect()
}

/// Turns a valid definition into a [`Rule`], normalizing blank fields to `None`.
pub fn build_rule(def: RuleDefinition) -> Result<Rule, ValidationReport> {
    let report = validate_rule(&def);
    match (def.state.parse::<RuleState>(), present(&def.analytics_to_apply)) {
        (Ok(state), Some(analytics)) if report.valid => Ok(Rule {
            id: def.id.trim().into(),
            name: present(&def.name).map(str::to_string),
            partner: present(&def.partner).map(Into::into),
            partner_tag: present(&def.partner_tag).map(Into::into),
            product: present(&def.product).map(Into::into),
            product_category: present(&def.product_category).map(Into::into),
            analytics_to_apply: analytics.into(),
            state,
            created_at: def.created_at,
        }),
        _ => Err(report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::{AnalyticsId, CategoryId};

    fn def(id: &str, analytics: Option<&str>, state: &str) -> RuleDefinition {
        RuleDefinition {
            id: id.to_string(),
            analytics_to_apply: analytics.map(str::to_string),
            state: state.to_string(),
            ..RuleDefinition::default()
        }
    }

    #[test]
    fn valid_definition_has_no_errors() {
        let mut d = def("r1", Some("cc_administration"), "confirmed");
        d.product_category = Some("office_supplies".to_string());
        let report = validate_rule(&d);
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn reports_every_violation_at_once() {
        let report = validate_rule(&def("r1", None, "archived"));
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 3);
        assert!(report.errors[0].contains("Analytics to apply"));
        assert!(report.errors[1].contains("archived"));
        assert!(report.errors[2].contains("At least one"));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut d = def("r1", Some("   "), "draft");
        d.partner = Some(String::new());
        let report = validate_rule(&d);
        assert_eq!(
            report.errors,
            vec![
                RuleViolation::MissingAnalytics.to_string(),
                RuleViolation::NoMatchFields.to_string(),
            ]
        );
    }

    #[test]
    fn build_rule_trims_and_types_fields() {
        let mut d = def(" r1 ", Some(" cc_admin "), "Confirmed");
        d.product_category = Some(" office_supplies ".to_string());
        d.partner = Some("".to_string());
        let rule = build_rule(d).unwrap();
        assert_eq!(rule.id.as_str(), "r1");
        assert_eq!(rule.analytics_to_apply, AnalyticsId::from("cc_admin"));
        assert_eq!(rule.state, RuleState::Confirmed);
        assert_eq!(rule.partner, None);
        assert_eq!(rule.product_category, Some(CategoryId::from("office_supplies")));
    }

    #[test]
    fn build_rule_returns_report_for_invalid_definition() {
        let err = build_rule(def("r1", Some("cc"), "confirmed")).unwrap_err();
        assert!(!err.valid);
        assert_eq!(err.errors, vec![RuleViolation::NoMatchFields.to_string()]);
    }

    #[test]
    fn build_rule_rejects_unknown_state() {
        let mut d = def("r1", Some("cc"), "archived");
        d.partner = Some("acme".to_string());
        let err = build_rule(d).unwrap_err();
        assert_eq!(
            err.errors,
            vec![RuleViolation::UnknownState("archived".to_string()).to_string()]
        );
    }

    #[test]
    fn duplicate_ids_flagged_on_later_definitions() {
        let mut a = def("r1", Some("cc"), "confirmed");
        a.partner = Some("acme".to_string());
        let b = a.clone();
        let reports = validate_rules(&[a, b]);
        assert!(reports[0].report.valid);
        assert!(!reports[1].report.valid);
        assert_eq!(
            reports[1].report.errors,
            vec![RuleViolation::DuplicateId("r1".to_string()).to_string()]
        );
    }

    #[test]
    fn missing_id_is_reported() {
        let mut d = def("", Some("cc"), "draft");
        d.product = Some("widget".to_string());
        assert_eq!(
            validate_rule(&d).errors,
            vec![RuleViolation::MissingId.to_string()]
        );
    }
}
