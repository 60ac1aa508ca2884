use crate::{Error, Result};
use proto_flow::flow;
use proto_gazette::broker::LabelSet;

/// ShardLabeling is the parsed subset of a task shard's LabelSet which the
/// gateway routes and authorizes against.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShardLabeling {
    /// Hostname under which the shard's exposed ports are reachable.
    pub hostname: String,
    /// Ports exposed by the shard's connector container.
    pub ports: Vec<flow::NetworkPort>,
    /// Name of the shard's task.
    pub task_name: String,
    /// Type of the shard's task, one of the TASK_TYPE_* constants.
    pub task_type: String,
}

impl ShardLabeling {
    /// Configuration of `port`, if it's exposed by this labeling.
    pub fn port_config(&self, port: u16) -> Option<&flow::NetworkPort> {
        self.ports.iter().find(|p| p.number == port as u32)
    }
}

/// Parse a LabelSet attached to a task shard into its ShardLabeling.
pub fn shard_labeling(set: &LabelSet) -> Result<ShardLabeling> {
    let hostname = maybe_one(set, crate::HOSTNAME)?.to_string();
    let ports = ports(set)?;
    let task_name = expect_one(set, crate::TASK_NAME)?.to_string();
    let task_type = expect_one(set, crate::TASK_TYPE)?.to_string();

    match task_type.as_str() {
        crate::TASK_TYPE_CAPTURE
        | crate::TASK_TYPE_DERIVATION
        | crate::TASK_TYPE_MATERIALIZATION => {}
        _ => {
            return Err(Error::InvalidValue {
                name: crate::TASK_TYPE.to_string(),
                value: task_type,
            })
        }
    }

    Ok(ShardLabeling {
        hostname,
        ports,
        task_name,
        task_type,
    })
}

/// Parse the exposed container ports of a LabelSet.
/// Each EXPOSE_PORT value names a port, whose protocol and visibility are
/// carried by companion PORT_PROTO_PREFIX and PORT_PUBLIC_PREFIX labels.
pub fn ports(set: &LabelSet) -> Result<Vec<flow::NetworkPort>> {
    crate::values(set, crate::EXPOSE_PORT)
        .iter()
        .map(|label| {
            let number = match label.value.parse::<u16>() {
                Ok(number) if number != 0 => number as u32,
                _ => {
                    return Err(Error::InvalidValue {
                        name: crate::EXPOSE_PORT.to_string(),
                        value: label.value.clone(),
                    })
                }
            };
            let protocol =
                maybe_one(set, &format!("{}{}", crate::PORT_PROTO_PREFIX, label.value))?
                    .to_string();
            let public =
                maybe_one(set, &format!("{}{}", crate::PORT_PUBLIC_PREFIX, label.value))? == "true";

            Ok(flow::NetworkPort {
                number,
                protocol,
                public,
            })
        })
        .collect()
}

pub(crate) fn expect_one<'s>(set: &'s LabelSet, name: &str) -> Result<&'s str> {
    let labels = crate::values(set, name);

    if labels.len() != 1 {
        Err(Error::ExpectedOne(name.to_string(), labels.to_vec()))
    } else if labels[0].value.is_empty() {
        Err(Error::ValueEmpty(name.to_string()))
    } else {
        Ok(labels[0].value.as_str())
    }
}

pub(crate) fn maybe_one<'s>(set: &'s LabelSet, name: &str) -> Result<&'s str> {
    let labels = crate::values(set, name);

    if labels.len() > 1 {
        Err(Error::ExpectedOne(name.to_string(), labels.to_vec()))
    } else if labels.is_empty() {
        Ok("")
    } else {
        Ok(labels[0].value.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::build_set;

    #[test]
    fn test_labeling_cases() {
        let case = |set| match shard_labeling(&set) {
            Ok(ok) => format!("{ok:?}"),
            Err(err) => err.to_string(),
        };

        let model = build_set([
            (crate::HOSTNAME, "task-one"),
            (crate::EXPOSE_PORT, "6000"),
            (crate::EXPOSE_PORT, "8080"),
            ("estuary.dev/port-proto/8080", "http/1.1"),
            ("estuary.dev/port-public/6000", "true"),
            (crate::TASK_NAME, "acme/task/one"),
            (crate::TASK_TYPE, "capture"),
        ]);

        insta::assert_snapshot!(case(model.clone()), @r###"ShardLabeling { hostname: "task-one", ports: [NetworkPort { number: 6000, protocol: "", public: true }, NetworkPort { number: 8080, protocol: "http/1.1", public: false }], task_name: "acme/task/one", task_type: "capture" }"###);

        // Hostname and ports are optional.
        let mut set = model.clone();
        crate::remove(&mut set, crate::HOSTNAME);
        crate::remove(&mut set, crate::EXPOSE_PORT);
        insta::assert_snapshot!(case(set), @r###"ShardLabeling { hostname: "", ports: [], task_name: "acme/task/one", task_type: "capture" }"###);

        // Task name is required.
        let mut set = model.clone();
        crate::remove(&mut set, crate::TASK_NAME);
        insta::assert_snapshot!(case(set), @"expected one label for estuary.dev/task-name (got [])");

        // Invalid task type.
        let mut set = model.clone();
        crate::set_value(&mut set, crate::TASK_TYPE, "invalid");
        insta::assert_snapshot!(case(set), @r###"invalid value "invalid" for label estuary.dev/task-type"###);

        // Invalid exposed port.
        let mut set = model.clone();
        crate::add_value(&mut set, crate::EXPOSE_PORT, "bogus");
        insta::assert_snapshot!(case(set), @r###"invalid value "bogus" for label estuary.dev/expose-port"###);

        // Port zero is rejected.
        let mut set = model.clone();
        crate::add_value(&mut set, crate::EXPOSE_PORT, "0");
        insta::assert_snapshot!(case(set), @r###"invalid value "0" for label estuary.dev/expose-port"###);
    }

    #[test]
    fn test_port_config_lookup() {
        let set = build_set([
            (crate::EXPOSE_PORT, "9000"),
            ("estuary.dev/port-proto/9000", "h2,http/1.1"),
            (crate::TASK_NAME, "a/task"),
            (crate::TASK_TYPE, "derivation"),
        ]);
        let labeling = shard_labeling(&set).unwrap();

        let config = labeling.port_config(9000).unwrap();
        assert_eq!(config.protocol, "h2,http/1.1");
        assert!(!config.public);
        assert!(labeling.port_config(9001).is_none());
    }
}
