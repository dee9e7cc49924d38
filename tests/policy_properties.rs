//! Property tests for the point check and the query restriction.

use authlevel_policy::{
    ClassificationRuleTable, Decision, DocumentRecord, Filter, PolicyEvaluator, Principal,
    PrivilegedIdentities, QueryPredicateInjector,
};
use proptest::prelude::*;
use std::sync::Arc;

const FIELD: &str = "file_schema:auth_level_cde";
const GROUPS: [&str; 5] = ["ACA-HO", "ACA-FR", "ACA-CLNT", "members", "everyone"];
const CODES: [&str; 4] = ["MCD_DEFAULT", "MCD_HOONLY", "MCD_HOFLD", "MCD_HOCLNT"];

fn table() -> Arc<ClassificationRuleTable> {
    Arc::new(ClassificationRuleTable::standard())
}

fn evaluator() -> PolicyEvaluator {
    PolicyEvaluator::new(table())
}

fn injector() -> QueryPredicateInjector {
    QueryPredicateInjector::new(table(), FIELD, PrivilegedIdentities::default())
}

// -- Strategy helpers --

fn arb_principal() -> impl Strategy<Value = Principal> {
    (
        prop_oneof![Just("alice".to_string()), Just("bob".to_string()), "[a-z]{1,8}"],
        prop::collection::btree_set(prop::sample::select(GROUPS.to_vec()), 0..4),
    )
        .prop_map(|(name, groups)| Principal::new(name, groups))
}

fn arb_classification() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        prop::sample::select(CODES.to_vec()).prop_map(|c| Some(c.to_string())),
        "[A-Z_]{0,12}".prop_map(Some),
    ]
}

fn arb_leaf() -> impl Strategy<Value = Filter> {
    let field = prop::sample::select(vec!["dc:title", "ecm:primaryType", FIELD]);
    prop_oneof![
        field.clone().prop_map(Filter::is_null),
        field.clone().prop_map(Filter::is_not_null),
        (field.clone(), "[a-z]{1,4}").prop_map(|(f, v)| Filter::eq(f, v)),
        (field, prop::collection::vec("[a-z]{1,4}", 1..3)).prop_map(|(f, vs)| Filter::in_list(f, vs)),
    ]
}

fn arb_filter() -> impl Strategy<Value = Filter> {
    arb_leaf().prop_recursive(3, 16, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| l.and(r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| l.or(r)),
            inner.prop_map(|f| f.not()),
        ]
    })
}

fn arb_document() -> impl Strategy<Value = DocumentRecord> {
    (
        arb_classification(),
        prop::option::of("[a-z]{1,4}"),
        prop::option::of(prop::sample::select(vec!["File", "Note"])),
    )
        .prop_map(|(code, title, kind)| {
            let mut doc = DocumentRecord::new("doc");
            if let Some(code) = code {
                doc = doc.with_property(FIELD, code);
            }
            if let Some(title) = title {
                doc = doc.with_property("dc:title", title);
            }
            if let Some(kind) = kind {
                doc = doc.with_property("ecm:primaryType", kind);
            }
            doc
        })
}

proptest! {
    /// Values with no rule, absence included, never produce an opinion.
    #[test]
    fn unruled_values_are_unknown(who in arb_principal(), code in "[A-Z_]{0,12}") {
        prop_assume!(!CODES.contains(&code.as_str()));
        let ev = evaluator();
        prop_assert_eq!(ev.evaluate(Some(code.as_str()), &who), Decision::Unknown);
        prop_assert_eq!(ev.evaluate(None, &who), Decision::Unknown);
    }

    /// Sentinels get their filter back untouched.
    #[test]
    fn sentinels_pass_through(
        name in prop::sample::select(vec!["system", "Administrator"]),
        groups in prop::collection::btree_set(prop::sample::select(GROUPS.to_vec()), 0..4),
        existing in prop::option::of(arb_filter()),
    ) {
        let who = Principal::new(name, groups);
        prop_assert_eq!(injector().inject(&who, existing.clone()), existing);
    }

    /// Membership in the rule's group decides Grant vs Deny for every rule.
    #[test]
    fn membership_decides_ruled_codes(who in arb_principal()) {
        let ev = evaluator();
        for rule in ev.table().rules() {
            let expected = if who.groups.contains(&rule.required_group) {
                Decision::Grant
            } else {
                Decision::Deny
            };
            prop_assert_eq!(ev.evaluate(Some(rule.code.as_str()), &who), expected);
        }
    }

    /// Injecting twice admits exactly the rows injecting once does.
    #[test]
    fn injection_is_idempotent(
        who in arb_principal(),
        existing in prop::option::of(arb_filter()),
        doc in arb_document(),
    ) {
        let inj = injector();
        let once = inj.inject(&who, existing);
        let twice = inj.inject(&who, once.clone());
        let admits = |f: &Option<Filter>| f.as_ref().map_or(true, |f| f.matches(&doc));
        prop_assert_eq!(admits(&once), admits(&twice));
    }

    /// Restricted output is the restriction alone, or `existing AND restriction`.
    #[test]
    fn composition_keeps_existing_as_left_branch(
        who in arb_principal(),
        existing in prop::option::of(arb_filter()),
    ) {
        let inj = injector();
        let out = inj.inject(&who, existing.clone());
        match inj.restriction_for(&who) {
            None => prop_assert_eq!(out, existing),
            Some(restriction) => match existing {
                None => prop_assert_eq!(out, Some(restriction)),
                Some(existing) if existing.contains_conjunct(&restriction) => {
                    prop_assert_eq!(out, Some(existing))
                }
                Some(existing) => prop_assert_eq!(out, Some(existing.and(restriction))),
            },
        }
    }

    /// A row the listing filter admits is never denied by the point check.
    #[test]
    fn listed_rows_are_never_denied(who in arb_principal(), doc in arb_document()) {
        let ev = evaluator();
        if let Some(filter) = injector().inject(&who, None) {
            if filter.matches(&doc) {
                prop_assert_ne!(ev.evaluate_document(&doc, FIELD, &who), Decision::Deny);
            }
        }
    }
}
