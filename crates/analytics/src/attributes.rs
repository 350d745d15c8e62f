use serde::Serialize;
use tally_core::{CategoryId, PartnerId, ProductId, TagId, Transaction, TransactionKind};

/// Canonical attribute tuple every transaction kind is reduced to before matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attributes {
    pub partner: Option<PartnerId>,
    pub partner_tag: Option<TagId>,
    pub product: Option<ProductId>,
    pub product_category: Option<CategoryId>,
}

/// Maps the document-specific field names onto the four matchable attributes.
pub fn extract(tx: &Transaction) -> Attributes {
    match &tx.kind {
        TransactionKind::SalesInvoice {
            customer,
            customer_tag,
            product,
            product_category,
        } => Attributes {
            partner: customer.clone(),
            partner_tag: customer_tag.clone(),
            product: product.clone(),
            product_category: product_category.clone(),
        },
        TransactionKind::PurchaseBill {
            supplier,
            supplier_tag,
            product,
            product_category,
        } => Attributes {
            partner: supplier.clone(),
            partner_tag: supplier_tag.clone(),
            product: product.clone(),
            product_category: product_category.clone(),
        },
        TransactionKind::Expense {
            contact,
            contact_tag,
            expense_category,
        } => Attributes {
            partner: contact.clone(),
            partner_tag: contact_tag.clone(),
            product: None,
            product_category: expense_category.clone(),
        },
        TransactionKind::JournalLine {
            partner,
            partner_tag,
            product,
            product_category,
        } => Attributes {
            partner: partner.clone(),
            partner_tag: partner_tag.clone(),
            product: product.clone(),
            product_category: product_category.clone(),
        },
    }
}
