use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                $name(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                $name(value)
            }
        }
    };
}

string_id!(
    /// Opaque identifier of an auto-analytics rule.
    RuleId
);
string_id!(
    /// Identifier of a financial document or ledger line.
    TransactionId
);
string_id!(
    /// Counterparty: customer, supplier or contact depending on the document.
    PartnerId
);
string_id!(TagId);
string_id!(ProductId);
string_id!(CategoryId);
string_id!(
    /// Cost-center ("analytics") identifier assigned to a transaction.
    AnalyticsId
);
