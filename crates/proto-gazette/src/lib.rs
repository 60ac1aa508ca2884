// Hand-maintained message types for the subset of the Gazette broker
// (`protocol`) and consumer (`consumer`) gRPC protocols which the gateway
// speaks. Field numbers track the upstream .proto definitions and must not
// be re-assigned: these types are decoded from, and re-encoded onto, live
// broker and consumer connections.

pub mod broker;
pub mod consumer;

pub use broker as protocol;

impl std::fmt::Display for broker::Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str_name())
    }
}

impl std::fmt::Display for consumer::Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str_name())
    }
}
