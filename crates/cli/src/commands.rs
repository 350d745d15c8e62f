use anyhow::{anyhow, Context};
use serde::Serialize;
use std::path::Path;
use tally_analytics::{
    classify_batch, coverage_report, explain, preview_rule, validate_rules, BulkReport,
    CoverageReport, Explanation, FileRuleProvider, RuleProvider, RuleReport, RulePreview,
};
use tally_core::{Rule, Transaction};

/// Output of `tally validate`.
#[derive(Debug, Serialize)]
pub struct ValidationOutput {
    pub valid: bool,
    pub rules: Vec<RuleReport>,
}

pub async fn read_transactions(path: &Path) -> anyhow::Result<Vec<Transaction>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read transactions from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse transactions in {}", path.display()))
}

async fn fetch_rules(rules: &Path) -> anyhow::Result<Vec<Rule>> {
    Ok(FileRuleProvider::new(rules).fetch_rules().await?)
}

pub async fn validate(rules: &Path) -> anyhow::Result<ValidationOutput> {
    let definitions = FileRuleProvider::new(rules).definitions().await?;
    let reports = validate_rules(&definitions);
    let valid = reports.iter().all(|r| r.report.valid);
    tracing::info!(
        path = %rules.display(),
        definitions = reports.len(),
        valid,
        "validated rules file"
    );
    Ok(ValidationOutput {
        valid,
        rules: reports,
    })
}

pub async fn classify(transactions: &Path, rules: &Path) -> anyhow::Result<BulkReport> {
    let transactions = read_transactions(transactions).await?;
    let provider = FileRuleProvider::new(rules);
    Ok(classify_batch(&transactions, &provider).await)
}

pub async fn coverage(transactions: &Path, rules: &Path) -> anyhow::Result<CoverageReport> {
    let transactions = read_transactions(transactions).await?;
    Ok(coverage_report(&transactions, &FileRuleProvider::new(rules)).await?)
}

/// Ranked candidates for one transaction. Owns its data so the caller can
/// print it after the rule snapshot is dropped.
pub async fn explain_transaction(
    transactions: &Path,
    rules: &Path,
    transaction_id: &str,
) -> anyhow::Result<serde_json::Value> {
    let transactions = read_transactions(transactions).await?;
    let rules = fetch_rules(rules).await?;
    let tx = transactions
        .iter()
        .find(|tx| tx.id.as_str() == transaction_id)
        .ok_or_else(|| anyhow!("Transaction not found: {transaction_id}"))?;
    let explanation: Explanation<'_> = explain(tx, &rules);
    Ok(serde_json::to_value(&explanation)?)
}

pub async fn preview(
    transactions: &Path,
    rules: &Path,
    rule_id: &str,
) -> anyhow::Result<RulePreview> {
    let transactions = read_transactions(transactions).await?;
    let definitions = FileRuleProvider::new(rules).definitions().await?;
    let definition = definitions
        .into_iter()
        .find(|def| def.id.trim() == rule_id)
        .ok_or_else(|| anyhow!("Rule not found: {rule_id}"))?;
    let rule = tally_analytics::build_rule(definition)
        .map_err(|report| anyhow!("Rule {rule_id} is invalid: {}", report.errors.join("; ")))?;
    Ok(preview_rule(&rule, &transactions))
}

pub fn emit<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
