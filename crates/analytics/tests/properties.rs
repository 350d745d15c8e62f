use chrono::DateTime;
use proptest::prelude::*;
use proptest::test_runner::Config;
use tally_analytics::{
    any_field_matches, classify_with_rules, coverage_for_rules, extract, score, select_best,
    Attributes,
};
use tally_core::{PostingStatus, Rule, RuleState, Transaction, TransactionKind};

// A tiny alphabet so that rules and transactions collide often.
fn value() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::sample::select(vec!["a", "b", "c"]).prop_map(str::to_string))
}

fn state() -> impl Strategy<Value = RuleState> {
    prop::sample::select(vec![RuleState::Draft, RuleState::Confirmed, RuleState::Cancelled])
}

fn rule() -> impl Strategy<Value = Rule> {
    (
        "[a-z]{1,4}",
        value(),
        value(),
        value(),
        value(),
        state(),
        0_i64..5,
    )
        .prop_map(|(id, partner, tag, product, category, state, created)| Rule {
            id: id.as_str().into(),
            name: None,
            partner: partner.map(Into::into),
            partner_tag: tag.map(Into::into),
            product: product.map(Into::into),
            product_category: category.map(Into::into),
            analytics_to_apply: format!("cc_{id}").into(),
            state,
            created_at: DateTime::from_timestamp(created, 0).unwrap(),
        })
}

fn attributes() -> impl Strategy<Value = Attributes> {
    (value(), value(), value(), value()).prop_map(|(partner, tag, product, category)| Attributes {
        partner: partner.map(Into::into),
        partner_tag: tag.map(Into::into),
        product: product.map(Into::into),
        product_category: category.map(Into::into),
    })
}

fn transaction() -> impl Strategy<Value = Transaction> {
    (
        attributes(),
        prop::sample::select(vec![PostingStatus::Draft, PostingStatus::Posted]),
        prop::bool::weighted(0.2),
    )
        .prop_map(|(attrs, status, manual)| {
            let tx = Transaction::new(
                "tx",
                status,
                TransactionKind::JournalLine {
                    partner: attrs.partner,
                    partner_tag: attrs.partner_tag,
                    product: attrs.product,
                    product_category: attrs.product_category,
                },
            );
            if manual {
                tx.with_analytics("cc_manual")
            } else {
                tx
            }
        })
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn matching_is_equivalent_to_positive_score(r in rule(), attrs in attributes()) {
        prop_assert_eq!(any_field_matches(&r, &attrs), score(&r, &attrs) > 0);
    }

    #[test]
    fn selected_rule_has_top_score_then_newest(
        rules in prop::collection::vec(rule(), 0..8),
        attrs in attributes(),
    ) {
        let best = select_best(&rules, &attrs);
        let top = rules.iter().map(|r| score(r, &attrs)).max().unwrap_or(0);

        match best {
            None => prop_assert_eq!(top, 0),
            Some(candidate) => {
                prop_assert_eq!(candidate.score, top);
                let newest = rules
                    .iter()
                    .filter(|r| score(r, &attrs) == top)
                    .map(|r| r.created_at)
                    .max();
                prop_assert_eq!(Some(candidate.rule.created_at), newest);
            }
        }
    }

    #[test]
    fn classification_is_idempotent(
        rules in prop::collection::vec(rule(), 0..8),
        tx in transaction(),
    ) {
        prop_assert_eq!(classify_with_rules(&tx, &rules), classify_with_rules(&tx, &rules));
    }

    #[test]
    fn only_confirmed_rules_are_ever_selected(
        rules in prop::collection::vec(rule(), 0..8),
        tx in transaction(),
    ) {
        let decision = classify_with_rules(&tx, &rules);
        if let Some(selected) = &decision.selected_rule {
            prop_assert_eq!(selected.state, RuleState::Confirmed);
            prop_assert!(tx.is_posted());
            prop_assert!(!tx.has_manual_classification());
        }
    }

    #[test]
    fn coverage_percentage_is_bounded(
        rules in prop::collection::vec(rule(), 0..8),
        txs in prop::collection::vec(transaction(), 0..12),
    ) {
        let report = coverage_for_rules(&txs, &rules);
        prop_assert!((0.0..=100.0).contains(&report.coverage_percentage));
        prop_assert_eq!(
            report.covered_transactions + report.uncovered_transactions,
            report.total_transactions
        );
        if report.total_transactions == 0 {
            prop_assert_eq!(report.coverage_percentage, 0.0);
        }
        for (tx, detail) in txs.iter().zip(&report.details) {
            let confirmed_match = rules
                .iter()
                .any(|r| r.is_active() && any_field_matches(r, &extract(tx)));
            prop_assert_eq!(detail.covered, confirmed_match);
        }
    }
}
