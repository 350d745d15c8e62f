//! Diagnostic "what-if" views over a batch of transactions.
//!
//! Unlike classification, coverage ignores posting status and manual
//! classification: it answers whether the confirmed rules *would* assign
//! something to each transaction.

use serde::Serialize;
use tally_core::{AnalyticsId, MatchField, Rule, RuleId, Transaction, TransactionId};

use crate::attributes::extract;
use crate::matching::{any_field_matches, Specificity};
use crate::provider::{RuleFetchError, RuleProvider};
use crate::select::{select_best, Candidate};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageDetail {
    pub transaction_id: TransactionId,
    pub covered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<RuleId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics_to_apply: Option<AnalyticsId>,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    pub total_transactions: usize,
    pub covered_transactions: usize,
    pub uncovered_transactions: usize,
    /// Covered share in percent, two decimals. Zero for an empty batch.
    pub coverage_percentage: f64,
    pub details: Vec<CoverageDetail>,
}

fn percentage(covered: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = covered as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

/// Coverage of `transactions` by a rule snapshot; non-confirmed rules are ignored.
pub fn coverage_for_rules(transactions: &[Transaction], rules: &[Rule]) -> CoverageReport {
    let active: Vec<&Rule> = rules.iter().filter(|rule| rule.is_active()).collect();

    let details: Vec<CoverageDetail> = transactions
        .iter()
        .map(|tx| {
            let attrs = extract(tx);
            let best = select_best(
                active
                    .iter()
                    .copied()
                    .filter(|rule| any_field_matches(rule, &attrs)),
                &attrs,
            );
            match best {
                Some(Candidate { rule, score, .. }) => CoverageDetail {
                    transaction_id: tx.id.clone(),
                    covered: true,
                    rule_id: Some(rule.id.clone()),
                    analytics_to_apply: Some(rule.analytics_to_apply.clone()),
                    score,
                },
                None => CoverageDetail {
                    transaction_id: tx.id.clone(),
                    covered: false,
                    rule_id: None,
                    analytics_to_apply: None,
                    score: 0,
                },
            }
        })
        .collect();

    let total = details.len();
    let covered = details.iter().filter(|d| d.covered).count();

    CoverageReport {
        total_transactions: total,
        covered_transactions: covered,
        uncovered_transactions: total - covered,
        coverage_percentage: percentage(covered, total),
        details,
    }
}

/// Fetches one rule snapshot for the whole batch and reports its coverage.
pub async fn coverage_report<P>(
    transactions: &[Transaction],
    provider: &P,
) -> Result<CoverageReport, RuleFetchError>
where
    P: RuleProvider + ?Sized,
{
    let rules = provider.fetch_rules().await?;
    let report = coverage_for_rules(transactions, &rules);
    tracing::info!(
        total = report.total_transactions,
        covered = report.covered_transactions,
        percentage = report.coverage_percentage,
        "analytics coverage computed"
    );
    Ok(report)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewMatch {
    pub transaction_id: TransactionId,
    pub score: u8,
    pub matched_fields: Vec<MatchField>,
}

/// Which transactions a single rule would match, regardless of its state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RulePreview {
    pub rule_id: RuleId,
    pub specificity: Specificity,
    pub total_transactions: usize,
    pub matches: Vec<PreviewMatch>,
}

pub fn preview_rule(rule: &Rule, transactions: &[Transaction]) -> RulePreview {
    let matches = transactions
        .iter()
        .filter_map(|tx| {
            Candidate::evaluate(rule, &extract(tx)).map(|candidate| PreviewMatch {
                transaction_id: tx.id.clone(),
                score: candidate.score,
                matched_fields: candidate.matched_fields,
            })
        })
        .collect();

    RulePreview {
        rule_id: rule.id.clone(),
        specificity: Specificity::of(rule),
        total_transactions: transactions.len(),
        matches,
    }
}
