use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AnalyticsId, CategoryId, PartnerId, ProductId, RuleId, TagId};

/// Lifecycle of an auto-analytics rule. Only confirmed rules take part in matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleState {
    Draft,
    Confirmed,
    Cancelled,
}

impl RuleState {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleState::Draft => "draft",
            RuleState::Confirmed => "confirmed",
            RuleState::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RuleState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(RuleState::Draft),
            "confirmed" => Ok(RuleState::Confirmed),
            "cancelled" => Ok(RuleState::Cancelled),
            other => Err(format!("Unknown rule state: '{other}'")),
        }
    }
}

/// The four attributes a rule can constrain, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchField {
    Partner,
    PartnerTag,
    Product,
    ProductCategory,
}

impl MatchField {
    pub const ALL: [MatchField; 4] = [
        MatchField::Partner,
        MatchField::PartnerTag,
        MatchField::Product,
        MatchField::ProductCategory,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MatchField::Partner => "partner",
            MatchField::PartnerTag => "partner_tag",
            MatchField::Product => "product",
            MatchField::ProductCategory => "product_category",
        }
    }
}

impl fmt::Display for MatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An auto-analytical model: a partial attribute signature mapped to a cost center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub partner: Option<PartnerId>,
    #[serde(default)]
    pub partner_tag: Option<TagId>,
    #[serde(default)]
    pub product: Option<ProductId>,
    #[serde(default)]
    pub product_category: Option<CategoryId>,
    pub analytics_to_apply: AnalyticsId,
    pub state: RuleState,
    pub created_at: DateTime<Utc>,
}

impl Rule {
    pub fn new(
        id: impl Into<RuleId>,
        analytics_to_apply: impl Into<AnalyticsId>,
        state: RuleState,
        created_at: DateTime<Utc>,
    ) -> Self {
        Rule {
            id: id.into(),
            name: None,
            partner: None,
            partner_tag: None,
            product: None,
            product_category: None,
            analytics_to_apply: analytics_to_apply.into(),
            state,
            created_at,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_partner(mut self, partner: impl Into<PartnerId>) -> Self {
        self.partner = Some(partner.into());
        self
    }

    pub fn with_partner_tag(mut self, tag: impl Into<TagId>) -> Self {
        self.partner_tag = Some(tag.into());
        self
    }

    pub fn with_product(mut self, product: impl Into<ProductId>) -> Self {
        self.product = Some(product.into());
        self
    }

    pub fn with_product_category(mut self, category: impl Into<CategoryId>) -> Self {
        self.product_category = Some(category.into());
        self
    }

    pub fn is_active(&self) -> bool {
        self.state == RuleState::Confirmed
    }

    pub fn specifies(&self, field: MatchField) -> bool {
        match field {
            MatchField::Partner => self.partner.is_some(),
            MatchField::PartnerTag => self.partner_tag.is_some(),
            MatchField::Product => self.product.is_some(),
            MatchField::ProductCategory => self.product_category.is_some(),
        }
    }

    /// Fields this rule constrains, in canonical order.
    pub fn specified_fields(&self) -> Vec<MatchField> {
        MatchField::ALL
            .into_iter()
            .filter(|field| self.specifies(*field))
            .collect()
    }
}

/// A rule as entered by an operator or read from a rules file, before validation.
///
/// The state is kept as raw text and the target classification is optional so
/// that every problem with a definition can be reported at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub partner: Option<String>,
    #[serde(default)]
    pub partner_tag: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub product_category: Option<String>,
    #[serde(default)]
    pub analytics_to_apply: Option<String>,
    #[serde(default = "default_state")]
    pub state: String,
    /// Missing timestamps deserialize to the Unix epoch and rank as oldest.
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

fn default_state() -> String {
    RuleState::Draft.as_str().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn ts() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn state_parses_case_insensitively() {
        assert_eq!(RuleState::from_str("Confirmed").unwrap(), RuleState::Confirmed);
        assert_eq!(RuleState::from_str(" draft ").unwrap(), RuleState::Draft);
        assert!(RuleState::from_str("archived").is_err());
    }

    #[test]
    fn state_display_matches_serde_name() {
        for state in [RuleState::Draft, RuleState::Confirmed, RuleState::Cancelled] {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{state}\""));
        }
    }

    #[test]
    fn only_confirmed_rules_are_active() {
        assert!(Rule::new("r1", "cc", RuleState::Confirmed, ts()).is_active());
        assert!(!Rule::new("r2", "cc", RuleState::Draft, ts()).is_active());
        assert!(!Rule::new("r3", "cc", RuleState::Cancelled, ts()).is_active());
    }

    #[test]
    fn specified_fields_in_canonical_order() {
        let rule = Rule::new("r1", "cc", RuleState::Confirmed, ts())
            .with_product_category("office_supplies")
            .with_partner("acme");
        assert_eq!(
            rule.specified_fields(),
            vec![MatchField::Partner, MatchField::ProductCategory]
        );
        assert!(Rule::new("r2", "cc", RuleState::Confirmed, ts())
            .specified_fields()
            .is_empty());
    }

    #[test]
    fn definition_defaults_to_draft() {
        let def: RuleDefinition =
            serde_json::from_str(r#"{"id": "r1", "partner": "acme"}"#).unwrap();
        assert_eq!(def.state, "draft");
        assert_eq!(def.analytics_to_apply, None);
        assert_eq!(def.created_at, DateTime::<Utc>::default());
    }

    #[test]
    fn rule_json_omits_missing_name() {
        let rule = Rule::new("r1", "cc", RuleState::Confirmed, ts()).with_partner("acme");
        let value = serde_json::to_value(&rule).unwrap();
        assert!(value.get("name").is_none());
        assert_eq!(value["partner"], "acme");
        assert_eq!(value["state"], "confirmed");
    }
}
