use serde::Serialize;
use std::fmt;
use tally_core::{MatchField, Rule};

use crate::attributes::Attributes;

fn same<T: PartialEq>(rule_value: &Option<T>, tx_value: &Option<T>) -> bool {
    matches!((rule_value, tx_value), (Some(r), Some(t)) if r == t)
}

/// A field matches only when the rule and the transaction both carry it and agree.
pub fn field_matches(rule: &Rule, attrs: &Attributes, field: MatchField) -> bool {
    match field {
        MatchField::Partner => same(&rule.partner, &attrs.partner),
        MatchField::PartnerTag => same(&rule.partner_tag, &attrs.partner_tag),
        MatchField::Product => same(&rule.product, &attrs.product),
        MatchField::ProductCategory => same(&rule.product_category, &attrs.product_category),
    }
}

/// Permissive matching: one shared attribute is enough. Unset rule fields
/// neither require nor forbid a value on the transaction.
pub fn any_field_matches(rule: &Rule, attrs: &Attributes) -> bool {
    MatchField::ALL
        .into_iter()
        .any(|field| field_matches(rule, attrs, field))
}

pub fn matched_fields(rule: &Rule, attrs: &Attributes) -> Vec<MatchField> {
    MatchField::ALL
        .into_iter()
        .filter(|field| field_matches(rule, attrs, *field))
        .collect()
}

/// Number of fields shared and equal between rule and transaction (0..=4).
pub fn score(rule: &Rule, attrs: &Attributes) -> u8 {
    MatchField::ALL
        .into_iter()
        .filter(|field| field_matches(rule, attrs, *field))
        .count() as u8
}

/// How many fields a rule specifies. Used for display only, never for selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Specificity {
    None,
    Generic,
    Moderate,
    Specific,
    HighlySpecific,
}

impl Specificity {
    pub fn of(rule: &Rule) -> Self {
        Self::from_field_count(rule.specified_fields().len())
    }

    pub fn from_field_count(count: usize) -> Self {
        match count {
            0 => Specificity::None,
            1 => Specificity::Generic,
            2 => Specificity::Moderate,
            3 => Specificity::Specific,
            _ => Specificity::HighlySpecific,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Specificity::None => "none",
            Specificity::Generic => "generic",
            Specificity::Moderate => "moderate",
            Specificity::Specific => "specific",
            Specificity::HighlySpecific => "highly_specific",
        }
    }
}

impl fmt::Display for Specificity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
