pub mod ids;
pub mod rule;
pub mod transaction;

pub use ids::{AnalyticsId, CategoryId, PartnerId, ProductId, RuleId, TagId, TransactionId};
pub use rule::{MatchField, Rule, RuleDefinition, RuleState};
pub use transaction::{PostingStatus, Transaction, TransactionKind};
