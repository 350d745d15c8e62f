use serde::Serialize;
use std::cmp::Ordering;
use tally_core::{MatchField, Rule};

use crate::attributes::Attributes;
use crate::matching::{matched_fields, score, Specificity};

/// A rule that matched a transaction, with the strength of that match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate<'a> {
    pub rule: &'a Rule,
    pub score: u8,
    pub matched_fields: Vec<MatchField>,
    pub specificity: Specificity,
}

impl<'a> Candidate<'a> {
    /// `None` when the rule shares no attribute with the transaction.
    pub fn evaluate(rule: &'a Rule, attrs: &Attributes) -> Option<Self> {
        let score = score(rule, attrs);
        if score == 0 {
            return None;
        }
        Some(Candidate {
            rule,
            score,
            matched_fields: matched_fields(rule, attrs),
            specificity: Specificity::of(rule),
        })
    }
}

/// Score descending, then newest rule first. Rules with equal score and
/// timestamp fall back to ascending rule id so the order is total.
pub fn compare(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.rule.created_at.cmp(&a.rule.created_at))
        .then_with(|| a.rule.id.cmp(&b.rule.id))
}

/// Every matching rule, best first.
pub fn rank<'a, I>(rules: I, attrs: &Attributes) -> Vec<Candidate<'a>>
where
    I: IntoIterator<Item = &'a Rule>,
{
    let mut candidates: Vec<Candidate<'a>> = rules
        .into_iter()
        .filter_map(|rule| Candidate::evaluate(rule, attrs))
        .collect();
    candidates.sort_by(compare);
    candidates
}

pub fn select_best<'a, I>(rules: I, attrs: &Attributes) -> Option<Candidate<'a>>
where
    I: IntoIterator<Item = &'a Rule>,
{
    rules
        .into_iter()
        .filter_map(|rule| Candidate::evaluate(rule, attrs))
        .min_by(compare)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use tally_core::RuleState;

    fn rule(id: &str, analytics: &str, created_secs: i64) -> Rule {
        Rule::new(
            id,
            analytics,
            RuleState::Confirmed,
            DateTime::from_timestamp(created_secs, 0).unwrap(),
        )
    }

    fn attrs() -> Attributes {
        Attributes {
            partner: Some("google_llc".into()),
            partner_tag: None,
            product: Some("ads".into()),
            product_category: Some("digital_marketing".into()),
        }
    }

    #[test]
    fn higher_score_wins_over_recency() {
        let old_specific = rule("old", "cc_specific", 100)
            .with_partner("google_llc")
            .with_product_category("digital_marketing");
        let new_generic = rule("new", "cc_generic", 200).with_partner("google_llc");
        let rules = [new_generic, old_specific];

        let best = select_best(&rules, &attrs()).unwrap();
        assert_eq!(best.rule.id.as_str(), "old");
        assert_eq!(best.score, 2);
    }

    #[test]
    fn tied_score_prefers_most_recent() {
        let older = rule("older", "cc_a", 100).with_partner("google_llc");
        let newer = rule("newer", "cc_b", 200).with_product("ads");
        let rules = [older, newer];

        let best = select_best(&rules, &attrs()).unwrap();
        assert_eq!(best.rule.id.as_str(), "newer");
    }

    #[test]
    fn identical_score_and_timestamp_falls_back_to_id() {
        let b = rule("b", "cc_b", 100).with_partner("google_llc");
        let a = rule("a", "cc_a", 100).with_product("ads");
        let rules = [b, a];

        assert_eq!(select_best(&rules, &attrs()).unwrap().rule.id.as_str(), "a");
        let ranked = rank(&rules, &attrs());
        assert_eq!(ranked[0].rule.id.as_str(), "a");
        assert_eq!(ranked[1].rule.id.as_str(), "b");
    }

    #[test]
    fn rank_drops_non_matching_rules() {
        let rules = [
            rule("hit", "cc", 100).with_partner("google_llc"),
            rule("miss", "cc", 300).with_partner("meta_inc"),
            rule("empty", "cc", 400),
        ];
        let ranked = rank(&rules, &attrs());
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].matched_fields, vec![MatchField::Partner]);
        assert_eq!(ranked[0].specificity, Specificity::Generic);
    }

    #[test]
    fn select_best_on_no_matches_is_none() {
        let rules: [Rule; 0] = [];
        assert!(select_best(&rules, &attrs()).is_none());
        assert!(rank(&rules, &attrs()).is_empty());
    }
}
