// NOTE constants in this file mirror the label names attached to task shards
// by the Flow control plane, and must not drift from it.

use proto_gazette::broker::{Label, LabelSet};

mod parse;
pub use parse::{shard_labeling, ShardLabeling};

pub mod partition;

// JournalSpec & ShardSpec labels.
pub const COLLECTION: &str = "estuary.dev/collection";
pub const FIELD_PREFIX: &str = "estuary.dev/field/";
pub const KEY_BEGIN: &str = "estuary.dev/key-begin";
pub const KEY_END: &str = "estuary.dev/key-end";

// ShardSpec labels.
pub const TASK_NAME: &str = "estuary.dev/task-name";
pub const TASK_TYPE: &str = "estuary.dev/task-type";
pub const TASK_TYPE_CAPTURE: &str = "capture";
pub const TASK_TYPE_DERIVATION: &str = "derivation";
pub const TASK_TYPE_MATERIALIZATION: &str = "materialization";
pub const RCLOCK_BEGIN: &str = "estuary.dev/rclock-begin";
pub const RCLOCK_END: &str = "estuary.dev/rclock-end";
// Shard labels related to network connectivity to shards.
pub const HOSTNAME: &str = "estuary.dev/hostname";
pub const EXPOSE_PORT: &str = "estuary.dev/expose-port";
pub const PORT_PROTO_PREFIX: &str = "estuary.dev/port-proto/";
pub const PORT_PUBLIC_PREFIX: &str = "estuary.dev/port-public/";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("expected one label for {0} (got {1:?})")]
    ExpectedOne(String, Vec<Label>),
    #[error("label {0} value is empty but shouldn't be")]
    ValueEmpty(String),
    #[error("invalid value {value:?} for label {name}")]
    InvalidValue { name: String, value: String },
    #[error("value is not valid percent-encoded UTF-8")]
    InvalidPartitionUtf8(#[from] std::str::Utf8Error),
}

pub type Result<Ok> = std::result::Result<Ok, Error>;

/// Fetch the sub-slice of Labels having the given `name`.
/// LabelSets are ordered on (name, value), so matched Labels are contiguous.
pub fn values<'s>(set: &'s LabelSet, name: &str) -> &'s [Label] {
    let begin = set
        .labels
        .partition_point(|label| label.name.as_str() < name);
    let end = begin
        + set.labels[begin..]
            .iter()
            .take_while(|label| label.name == name)
            .count();

    &set.labels[begin..end]
}

/// Add `name` with `value` into the LabelSet, preserving its sorted order.
pub fn add_value(set: &mut LabelSet, name: &str, value: &str) {
    let index = set
        .labels
        .partition_point(|label| (label.name.as_str(), label.value.as_str()) < (name, value));

    set.labels.insert(
        index,
        Label {
            name: name.to_string(),
            value: value.to_string(),
            prefix: false,
        },
    );
}

/// Set `name` to the single `value` in the LabelSet, replacing any current
/// values of the label.
pub fn set_value(set: &mut LabelSet, name: &str, value: &str) {
    remove(set, name);
    add_value(set, name, value);
}

/// Remove all values of label `name` from the LabelSet.
pub fn remove(set: &mut LabelSet, name: &str) {
    set.labels.retain(|label| label.name != name);
}

/// Build a LabelSet from (name, value) tuples, which need not be ordered.
pub fn build_set<I, N, V>(it: I) -> LabelSet
where
    I: IntoIterator<Item = (N, V)>,
    N: AsRef<str>,
    V: AsRef<str>,
{
    let mut set = LabelSet::default();
    for (name, value) in it {
        add_value(&mut set, name.as_ref(), value.as_ref());
    }
    set
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_set_accessors_and_mutators() {
        let mut set = build_set([
            ("banana", "two"),
            ("apple", "one"),
            ("banana", "one"),
            ("cherry", ""),
        ]);

        assert_eq!(values(&set, "apple").len(), 1);
        assert_eq!(
            values(&set, "banana")
                .iter()
                .map(|l| l.value.as_str())
                .collect::<Vec<_>>(),
            vec!["one", "two"],
        );
        assert!(values(&set, "missing").is_empty());

        set_value(&mut set, "banana", "three");
        assert_eq!(
            values(&set, "banana")
                .iter()
                .map(|l| l.value.as_str())
                .collect::<Vec<_>>(),
            vec!["three"],
        );

        remove(&mut set, "cherry");
        assert!(values(&set, "cherry").is_empty());

        // The set remains ordered on (name, value) across mutations.
        let mut sorted = set.labels.clone();
        sorted.sort_by(|l, r| (&l.name, &l.value).cmp(&(&r.name, &r.value)));
        assert_eq!(set.labels, sorted);
    }
}
