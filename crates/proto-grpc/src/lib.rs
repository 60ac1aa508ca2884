// gRPC client and server stubs for the broker (`protocol.Journal`), consumer
// (`consumer.Shard`), and reactor (`flow.NetworkProxy`) services. Stubs are
// checked in rather than generated at build time, and are feature-gated per
// service and direction so that dependents compile only what they dispatch.

#[cfg(any(feature = "broker_client", feature = "broker_server"))]
pub mod broker;

#[cfg(any(feature = "consumer_client", feature = "consumer_server"))]
pub mod consumer;

#[cfg(any(feature = "flow_client", feature = "flow_server"))]
pub mod flow;
