use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AnalyticsId, CategoryId, PartnerId, ProductId, TagId, TransactionId};

/// Only `Posted` matters to classification. Statuses this crate does not know
/// (e.g. `paid`) deserialize as `Other` and are treated as not posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingStatus {
    Draft,
    Posted,
    Cancelled,
    #[serde(other)]
    Other,
}

impl fmt::Display for PostingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostingStatus::Draft => write!(f, "draft"),
            PostingStatus::Posted => write!(f, "posted"),
            PostingStatus::Cancelled => write!(f, "cancelled"),
            PostingStatus::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for PostingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(PostingStatus::Draft),
            "posted" => Ok(PostingStatus::Posted),
            "cancelled" => Ok(PostingStatus::Cancelled),
            "other" => Ok(PostingStatus::Other),
            other => Err(format!("Unknown posting status: '{other}'")),
        }
    }
}

/// Document-specific attributes. Each kind names its counterparty and category
/// differently; the analytics engine normalizes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransactionKind {
    SalesInvoice {
        customer: Option<PartnerId>,
        customer_tag: Option<TagId>,
        product: Option<ProductId>,
        product_category: Option<CategoryId>,
    },
    PurchaseBill {
        supplier: Option<PartnerId>,
        supplier_tag: Option<TagId>,
        product: Option<ProductId>,
        product_category: Option<CategoryId>,
    },
    Expense {
        contact: Option<PartnerId>,
        contact_tag: Option<TagId>,
        expense_category: Option<CategoryId>,
    },
    JournalLine {
        partner: Option<PartnerId>,
        partner_tag: Option<TagId>,
        product: Option<ProductId>,
        product_category: Option<CategoryId>,
    },
}

impl TransactionKind {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::SalesInvoice { .. } => "sales_invoice",
            TransactionKind::PurchaseBill { .. } => "purchase_bill",
            TransactionKind::Expense { .. } => "expense",
            TransactionKind::JournalLine { .. } => "journal_line",
        }
    }
}

/// A financial transaction as handed to the analytics engine. Read-only there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub status: PostingStatus,
    /// Manually assigned cost center, if any.
    #[serde(default)]
    pub analytics: Option<AnalyticsId>,
    #[serde(flatten)]
    pub kind: TransactionKind,
}

impl Transaction {
    pub fn new(id: impl Into<TransactionId>, status: PostingStatus, kind: TransactionKind) -> Self {
        Transaction {
            id: id.into(),
            status,
            analytics: None,
            kind,
        }
    }

    pub fn with_analytics(mut self, analytics: impl Into<AnalyticsId>) -> Self {
        self.analytics = Some(analytics.into());
        self
    }

    pub fn is_posted(&self) -> bool {
        self.status == PostingStatus::Posted
    }

    pub fn has_manual_classification(&self) -> bool {
        self.analytics.is_some()
    }
}
