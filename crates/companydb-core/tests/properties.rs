//! Property-based tests for website normalization and merge planning.

use companydb_core::{
    plan_merge, BrandDraft, CoreError, DependentSet, EnrichmentAction, MergeTarget, PlanTarget,
    Website,
};
use proptest::prelude::*;

fn arb_domain() -> impl Strategy<Value = String> {
    (
        prop::collection::vec("[a-z0-9][a-z0-9-]{0,8}", 1..4),
        "[a-z]{2,6}",
    )
        .prop_map(|(labels, tld)| format!("{}.{tld}", labels.join(".")))
        .prop_filter("www prefix is reserved", |d| !d.starts_with("www"))
}

fn arb_path() -> impl Strategy<Value = String> {
    prop::collection::vec("[A-Za-z0-9_.-]{1,6}", 0..3).prop_map(|segments| {
        segments
            .iter()
            .map(|segment| format!("/{segment}"))
            .collect::<String>()
    })
}

fn arb_dependents() -> impl Strategy<Value = DependentSet> {
    (
        prop::collection::btree_set(1_i64..10_000, 0..8),
        prop::option::of(1_i64..10_000),
    )
        .prop_map(|(ids, enrichment_id)| DependentSet {
            sentiment_ids: ids.into_iter().collect(),
            enrichment_id,
        })
}

proptest! {
    /// Every well-formed domain is accepted and parsing its canonical form is a no-op.
    #[test]
    fn domains_parse_to_a_fixed_point(domain in arb_domain()) {
        let site = Website::parse(&domain).expect("domain-shaped input");
        prop_assert_eq!(site.as_str(), domain.as_str());
        prop_assert_eq!(Website::parse(site.as_str()).expect("canonical input"), site);
    }

    /// Any run of trailing slashes collapses onto the slash-free identity,
    /// and the result survives a second parse unchanged.
    #[test]
    fn trailing_slash_runs_are_canonicalized_once(
        domain in arb_domain(),
        path in arb_path(),
        slashes in 0_usize..4,
    ) {
        let bare = format!("{domain}{path}");
        let raw = format!("{bare}{}", "/".repeat(slashes));
        let site = Website::parse(&raw).expect("domain-shaped input");
        prop_assert_eq!(site.as_str(), bare.as_str());
        prop_assert_eq!(Website::parse(site.as_str()).expect("canonical input"), site);
    }

    /// Case in the host never produces a distinct identity.
    #[test]
    fn host_case_is_folded(domain in arb_domain()) {
        let upper = Website::parse(&domain.to_uppercase()).expect("upper-case input");
        let lower = Website::parse(&domain).expect("lower-case input");
        prop_assert_eq!(upper, lower);
    }

    /// Scheme-prefixed identities are always rejected with the input echoed back.
    #[test]
    fn scheme_prefixes_are_rejected(
        domain in arb_domain(),
        scheme in prop::sample::select(vec!["http://", "https://", "www."]),
    ) {
        let raw = format!("{scheme}{domain}");
        prop_assert_eq!(
            Website::parse(&raw),
            Err(CoreError::InvalidIdentityFormat(raw.clone()))
        );
    }

    /// Plans carry every located sentiment and never give a target two enrichments.
    #[test]
    fn plans_keep_all_sentiments_and_one_enrichment(
        dependents in arb_dependents(),
        survivor_enrichment in prop::option::of(10_000_i64..20_000),
        collide in any::<bool>(),
    ) {
        let target = if collide {
            MergeTarget::Existing { brand_id: 99_999, enrichment_id: survivor_enrichment }
        } else {
            MergeTarget::Fresh(BrandDraft::new(Website::parse("b.com").unwrap(), "B"))
        };
        let plan = plan_merge(1, dependents.clone(), target).expect("valid plan");

        prop_assert_eq!(&plan.sentiment_ids, &dependents.sentiment_ids);

        let target_has_enrichment = collide && survivor_enrichment.is_some();
        match plan.enrichment {
            EnrichmentAction::Untouched => prop_assert!(dependents.enrichment_id.is_none()),
            EnrichmentAction::Reassign { enrichment_id } => {
                prop_assert!(!target_has_enrichment);
                prop_assert_eq!(Some(enrichment_id), dependents.enrichment_id);
            }
            EnrichmentAction::Discard { enrichment_id } => {
                prop_assert!(target_has_enrichment);
                prop_assert_eq!(Some(enrichment_id), dependents.enrichment_id);
            }
        }

        let survives_elsewhere = match plan.target {
            PlanTarget::Create(_) => true,
            PlanTarget::Survivor { brand_id } => brand_id != plan.source_brand_id,
        };
        prop_assert!(survives_elsewhere);
    }
}
