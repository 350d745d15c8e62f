use serde::Serialize;
use tally_core::{Transaction, TransactionId};

use crate::classifier::{classify, Decision};
use crate::provider::RuleProvider;

#[derive(Debug, Clone, Serialize)]
pub struct BulkItem {
    pub transaction_id: TransactionId,
    pub decision: Decision,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkSummary {
    pub total: usize,
    pub applied: usize,
    /// Not applied, without a provider error.
    pub skipped: usize,
    pub errors: usize,
}

impl BulkSummary {
    fn record(&mut self, decision: &Decision) {
        self.total += 1;
        if !decision.success {
            self.errors += 1;
        } else if decision.applied {
            self.applied += 1;
        } else {
            self.skipped += 1;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkReport {
    pub summary: BulkSummary,
    pub results: Vec<BulkItem>,
}

/// Classifies each transaction in order. Every call fetches its own rules, and
/// one failed fetch does not stop the rest of the batch.
pub async fn classify_batch<P>(transactions: &[Transaction], provider: &P) -> BulkReport
where
    P: RuleProvider + ?Sized,
{
    let mut summary = BulkSummary::default();
    let mut results = Vec::with_capacity(transactions.len());

    for tx in transactions {
        let decision = classify(tx, provider).await;
        summary.record(&decision);
        results.push(BulkItem {
            transaction_id: tx.id.clone(),
            decision,
        });
    }

    tracing::info!(
        total = summary.total,
        applied = summary.applied,
        skipped = summary.skipped,
        errors = summary.errors,
        "bulk analytics classification finished"
    );

    BulkReport { summary, results }
}
