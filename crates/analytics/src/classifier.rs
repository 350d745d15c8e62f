use serde::Serialize;
use tally_core::{AnalyticsId, MatchField, Rule, Transaction, TransactionId};

use crate::attributes::{extract, Attributes};
use crate::matching::any_field_matches;
use crate::provider::{RuleFetchError, RuleProvider};
use crate::select::{rank, select_best, Candidate};

/// Why a classification did or did not apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    NotPosted,
    ManualClassification,
    NoActiveRules,
    NoMatchingRule,
    FetchFailed,
}

impl Outcome {
    pub fn reason(self) -> &'static str {
        match self {
            Outcome::Applied => "analytics applied",
            Outcome::NotPosted => "only posted transactions are classified",
            Outcome::ManualClassification => "manual classification present, not overwritten",
            Outcome::NoActiveRules => "no active rules",
            Outcome::NoMatchingRule => "no matching rule",
            Outcome::FetchFailed => "failed to apply",
        }
    }
}

/// Engine output for one transaction. Writing the classification back is the
/// caller's job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    /// `false` only when the rule provider failed.
    pub success: bool,
    pub applied: bool,
    pub selected_rule: Option<Rule>,
    pub matched_fields: Vec<MatchField>,
    pub score: u8,
    pub outcome: Outcome,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Decision {
    fn skipped(outcome: Outcome) -> Self {
        Decision {
            success: true,
            applied: false,
            selected_rule: None,
            matched_fields: Vec::new(),
            score: 0,
            outcome,
            reason: outcome.reason().to_string(),
            error: None,
        }
    }

    fn applied(candidate: Candidate<'_>) -> Self {
        Decision {
            success: true,
            applied: true,
            selected_rule: Some(candidate.rule.clone()),
            matched_fields: candidate.matched_fields,
            score: candidate.score,
            outcome: Outcome::Applied,
            reason: Outcome::Applied.reason().to_string(),
            error: None,
        }
    }

    fn failed(err: &RuleFetchError) -> Self {
        Decision {
            success: false,
            error: Some(err.to_string()),
            ..Decision::skipped(Outcome::FetchFailed)
        }
    }

    /// The cost center to write back, when a rule applied.
    pub fn analytics(&self) -> Option<&AnalyticsId> {
        self.selected_rule.as_ref().map(|rule| &rule.analytics_to_apply)
    }
}

/// Posted-only and manual-precedence checks; both run before any rule is fetched.
fn gate(tx: &Transaction) -> Option<Decision> {
    if !tx.is_posted() {
        return Some(Decision::skipped(Outcome::NotPosted));
    }
    if tx.has_manual_classification() {
        return Some(Decision::skipped(Outcome::ManualClassification));
    }
    None
}

fn decide(tx: &Transaction, rules: &[Rule]) -> Decision {
    let active: Vec<&Rule> = rules.iter().filter(|rule| rule.is_active()).collect();
    if active.is_empty() {
        return Decision::skipped(Outcome::NoActiveRules);
    }

    let attrs = extract(tx);
    let matching: Vec<&Rule> = active
        .into_iter()
        .filter(|rule| any_field_matches(rule, &attrs))
        .collect();

    match select_best(matching, &attrs) {
        Some(best) => Decision::applied(best),
        None => Decision::skipped(Outcome::NoMatchingRule),
    }
}

fn log_decision(tx: &Transaction, decision: &Decision) {
    match &decision.selected_rule {
        Some(rule) => tracing::debug!(
            transaction_id = %tx.id,
            rule_id = %rule.id,
            analytics = %rule.analytics_to_apply,
            score = decision.score,
            "analytics rule selected"
        ),
        None => tracing::debug!(
            transaction_id = %tx.id,
            outcome = ?decision.outcome,
            "no analytics applied"
        ),
    }
}

/// Classifies one transaction, fetching the rule set from `provider`.
///
/// Never fails: a provider error becomes a decision with `success: false`.
pub async fn classify<P>(tx: &Transaction, provider: &P) -> Decision
where
    P: RuleProvider + ?Sized,
{
    if let Some(decision) = gate(tx) {
        log_decision(tx, &decision);
        return decision;
    }

    let rules = match provider.fetch_rules().await {
        Ok(rules) => rules,
        Err(err) => {
            tracing::warn!(transaction_id = %tx.id, error = %err, "failed to fetch analytics rules");
            return Decision::failed(&err);
        }
    };

    let decision = decide(tx, &rules);
    log_decision(tx, &decision);
    decision
}

/// Same decision as [`classify`], against an already fetched rule snapshot.
pub fn classify_with_rules(tx: &Transaction, rules: &[Rule]) -> Decision {
    let decision = gate(tx).unwrap_or_else(|| decide(tx, rules));
    log_decision(tx, &decision);
    decision
}

/// Every confirmed rule that matches, best first, ignoring posting status and
/// manual classification.
#[derive(Debug, Clone, Serialize)]
pub struct Explanation<'a> {
    pub transaction_id: TransactionId,
    pub attributes: Attributes,
    pub candidates: Vec<Candidate<'a>>,
}

pub fn explain<'a>(tx: &Transaction, rules: &'a [Rule]) -> Explanation<'a> {
    let attributes = extract(tx);
    let candidates = rank(rules.iter().filter(|rule| rule.is_active()), &attributes);
    Explanation {
        transaction_id: tx.id.clone(),
        attributes,
        candidates,
    }
}
