//! Listing policy for operational-telemetry collections.
//!
//! Task logs and stats live in a small set of shared ops collections whose
//! journal names embed the originating task, as
//! `<collection>/kind=<kind>/name=<encoded-task-name>/...`. Users cannot hold
//! a prefix over the whole collection, so a listing of *only* ops collections
//! is performed without prefix enforcement and the returned journals are then
//! filtered to those of tasks the claims authorize.

use crate::auth::Claims;
use proto_gazette::broker;

/// Default ops collection names recognized by the carve-out.
// TODO: these should arrive from the control plane rather than being fixed
// at startup.
pub const DEFAULT_OPS_COLLECTIONS: &[&str] =
    &["ops.us-central1.v1/logs", "ops.us-central1.v1/stats"];

const OPS_KINDS: &[&str] = &["capture", "derivation", "materialization"];

/// If every `estuary.dev/collection` value of `selector` is an ops
/// collection, return those collection names. Otherwise return None, and the
/// regular prefix-enforcement policy applies.
pub fn ops_collections_of(
    selector: &broker::LabelSelector,
    ops_collections: &[String],
) -> Option<Vec<String>> {
    let include = selector.include.as_ref()?;
    let collections = labels::values(include, labels::COLLECTION);

    if collections.is_empty()
        || !collections
            .iter()
            .all(|label| ops_collections.iter().any(|ops| *ops == label.value))
    {
        return None;
    }
    Some(collections.iter().map(|l| l.value.clone()).collect())
}

/// Journal-name prefixes which `claims` authorize within the given ops
/// collections. Task names are embedded in journal names using the broker's
/// partition-value encoding.
pub fn allowed_journal_prefixes(collections: &[String], claims: &Claims) -> Vec<String> {
    let mut allowed = Vec::new();

    for collection in collections {
        for kind in OPS_KINDS {
            for prefix in &claims.prefixes {
                allowed.push(labels::partition::encode_field_value(
                    format!("{collection}/kind={kind}/name="),
                    prefix,
                ));
            }
        }
    }
    allowed
}

/// Filter listed journals to those whose name begins with an allowed prefix.
pub fn filter_journals(resp: &mut broker::ListResponse, allowed: &[String]) {
    resp.journals.retain(|journal| {
        journal
            .spec
            .as_ref()
            .is_some_and(|spec| allowed.iter().any(|prefix| spec.name.starts_with(prefix)))
    });
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::auth::test::test_claims;

    fn ops() -> Vec<String> {
        DEFAULT_OPS_COLLECTIONS
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn selector(collections: &[&str]) -> broker::LabelSelector {
        broker::LabelSelector {
            include: Some(labels::build_set(
                collections.iter().map(|c| (labels::COLLECTION, *c)),
            )),
            exclude: None,
        }
    }

    #[test]
    fn test_selector_classification() {
        // All-ops selectors trigger the carve-out.
        assert_eq!(
            ops_collections_of(&selector(&["ops.us-central1.v1/logs"]), &ops()),
            Some(vec!["ops.us-central1.v1/logs".to_string()]),
        );
        assert_eq!(
            ops_collections_of(
                &selector(&["ops.us-central1.v1/logs", "ops.us-central1.v1/stats"]),
                &ops()
            )
            .map(|c| c.len()),
            Some(2),
        );

        // A mixed or non-ops selector does not.
        assert_eq!(
            ops_collections_of(
                &selector(&["ops.us-central1.v1/logs", "acme/collection"]),
                &ops()
            ),
            None,
        );
        assert_eq!(ops_collections_of(&selector(&[]), &ops()), None);
        assert_eq!(
            ops_collections_of(&broker::LabelSelector::default(), &ops()),
            None,
        );
    }

    #[test]
    fn test_allowed_prefixes_and_filtering() {
        let claims = test_claims(&["acme/"]);
        let allowed = allowed_journal_prefixes(&["ops.us-central1.v1/logs".to_string()], &claims);

        insta::assert_debug_snapshot!(allowed, @r###"
        [
            "ops.us-central1.v1/logs/kind=capture/name=acme%2F",
            "ops.us-central1.v1/logs/kind=derivation/name=acme%2F",
            "ops.us-central1.v1/logs/kind=materialization/name=acme%2F",
        ]
        "###);

        let journal = |name: &str| broker::list_response::Journal {
            spec: Some(broker::JournalSpec {
                name: name.to_string(),
                ..Default::default()
            }),
            mod_revision: 1,
            route: None,
        };

        let mut resp = broker::ListResponse {
            status: broker::Status::Ok as i32,
            header: None,
            journals: vec![
                journal("ops.us-central1.v1/logs/kind=capture/name=acme%2Fsource/pivot=00"),
                journal("ops.us-central1.v1/logs/kind=derivation/name=evil%2Fderive/pivot=00"),
                journal("ops.us-central1.v1/logs/kind=materialization/name=acme%2Fmat/pivot=00"),
            ],
        };
        filter_journals(&mut resp, &allowed);

        let names: Vec<_> = resp
            .journals
            .iter()
            .map(|j| j.spec.as_ref().unwrap().name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "ops.us-central1.v1/logs/kind=capture/name=acme%2Fsource/pivot=00",
                "ops.us-central1.v1/logs/kind=materialization/name=acme%2Fmat/pivot=00",
            ],
        );
    }
}
