//! Messages of the Gazette `consumer` package: shard specifications and the
//! Shard RPC request / response pairs.

use crate::broker::{self, LabelSelector, LabelSet, Route};

/// ShardSpec describes a shard and its configuration, and is the long-lived
/// unit of work and scaling for a consumer application.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ShardSpec {
    /// ID of the shard.
    #[prost(string, tag = "1")]
    pub id: String,
    /// Sources of the shard, uniquely ordered on Source journal.
    #[prost(message, repeated, tag = "2")]
    pub sources: Vec<shard_spec::Source>,
    /// Prefix of the Journal into which the shard's recovery log will be
    /// recorded.
    #[prost(string, tag = "3")]
    pub recovery_log_prefix: String,
    /// Prefix of Etcd keys into which recovery log FSMHints are written to
    /// and read from.
    #[prost(string, tag = "4")]
    pub hint_prefix: String,
    /// Backups of verified recovery log FSMHints, retained as
    /// hint_prefix/backups.N.
    #[prost(int32, tag = "5")]
    pub hint_backups: i32,
    /// Max duration of shard transactions.
    #[prost(message, optional, tag = "6")]
    pub max_txn_duration: Option<::pbjson_types::Duration>,
    /// Min duration of shard transactions.
    #[prost(message, optional, tag = "7")]
    pub min_txn_duration: Option<::pbjson_types::Duration>,
    /// Disable processing of the shard.
    #[prost(bool, tag = "8")]
    pub disable: bool,
    /// Hot standbys is the desired number of consumer processes which should
    /// replicate the primary consumer's recovery log.
    #[prost(int32, tag = "9")]
    pub hot_standbys: i32,
    /// User-defined Labels of this ShardSpec.
    #[prost(message, optional, tag = "10")]
    pub labels: Option<LabelSet>,
    /// Disable waiting for acknowledgements of pending message(s).
    #[prost(bool, tag = "11")]
    pub disable_wait_for_ack: bool,
    /// Size of the ring buffer used to sequence read-uncommitted messages.
    #[prost(uint32, tag = "12")]
    pub ring_buffer_size: u32,
    /// Size of the channel used to bridge message read and consumption.
    #[prost(uint32, tag = "13")]
    pub read_channel_size: u32,
}

pub mod shard_spec {
    /// Sources define the set of journals which this shard consumes.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Source {
        /// Journal which this shard is consuming.
        #[prost(string, tag = "1")]
        pub journal: String,
        /// Minimum journal byte offset the shard should begin reading from.
        #[prost(int64, tag = "2")]
        pub min_offset: i64,
    }
}

/// ReplicaStatus is the status of a ShardSpec assigned to a consumer process.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReplicaStatus {
    #[prost(enumeration = "replica_status::Code", tag = "1")]
    pub code: i32,
    /// Errors encountered during replica processing. Set iff |code| is
    /// FAILED.
    #[prost(string, repeated, tag = "2")]
    pub errors: Vec<String>,
}

pub mod replica_status {
    /// Code of the replica status. Ordered such that the maximum code of a
    /// set of statuses is the status of the set.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Code {
        Idle = 0,
        Backfill = 100,
        Standby = 200,
        Primary = 300,
        Failed = 400,
    }

    impl Code {
        pub fn as_str_name(&self) -> &'static str {
            match self {
                Code::Idle => "IDLE",
                Code::Backfill => "BACKFILL",
                Code::Standby => "STANDBY",
                Code::Primary => "PRIMARY",
                Code::Failed => "FAILED",
            }
        }
    }
}

/// ListRequest is the unary request message of the Shard List RPC.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListRequest {
    /// Selector optionally refines the set of shards which will be
    /// enumerated. If zero-valued, all shards are returned.
    #[prost(message, optional, tag = "1")]
    pub selector: Option<LabelSelector>,
}

/// ListResponse is the unary response message of the Shard List RPC.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListResponse {
    /// Status of the List RPC.
    #[prost(enumeration = "Status", tag = "1")]
    pub status: i32,
    /// Header of the response.
    #[prost(message, optional, tag = "2")]
    pub header: Option<broker::Header>,
    #[prost(message, repeated, tag = "3")]
    pub shards: Vec<list_response::Shard>,
}

pub mod list_response {
    /// Shards of the response.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Shard {
        #[prost(message, optional, tag = "1")]
        pub spec: Option<super::ShardSpec>,
        /// Current ModRevision of the ShardSpec.
        #[prost(int64, tag = "2")]
        pub mod_revision: i64,
        /// Route of the shard, including endpoints.
        #[prost(message, optional, tag = "3")]
        pub route: Option<super::Route>,
        /// Status of each replica. Cardinality and ordering matches |route|.
        #[prost(message, repeated, tag = "4")]
        pub status: Vec<super::ReplicaStatus>,
    }
}

/// StatRequest is the unary request message of the Shard Stat RPC.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StatRequest {
    /// Header may be attached by a proxying consumer peer.
    #[prost(message, optional, tag = "1")]
    pub header: Option<broker::Header>,
    /// Shard to Stat.
    #[prost(string, tag = "2")]
    pub shard: String,
    /// Journals and offsets which must be reflected in a completed consumer
    /// transaction before Stat returns, blocking if required.
    #[prost(map = "string, int64", tag = "3")]
    pub read_through: std::collections::HashMap<String, i64>,
}

/// StatResponse is the unary response message of the Shard Stat RPC.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StatResponse {
    /// Status of the Stat RPC.
    #[prost(enumeration = "Status", tag = "1")]
    pub status: i32,
    /// Header of the response.
    #[prost(message, optional, tag = "2")]
    pub header: Option<broker::Header>,
    /// Journals and offsets read through by the most recent completed
    /// consumer transaction.
    #[prost(map = "string, int64", tag = "3")]
    pub read_through: std::collections::HashMap<String, i64>,
    /// Journals and offsets this shard has published through, including
    /// acknowledgements, as-of the most recent completed transaction.
    #[prost(map = "string, int64", tag = "4")]
    pub publish_at: std::collections::HashMap<String, i64>,
}

/// ApplyRequest is the unary request message of the Shard Apply RPC.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ApplyRequest {
    #[prost(message, repeated, tag = "1")]
    pub changes: Vec<apply_request::Change>,
}

pub mod apply_request {
    /// Change defines an insertion, update, or deletion to be applied to the
    /// set of ShardSpecs.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Change {
        /// Expected ModRevision of the current ShardSpec. If the shard is
        /// being created, expect_mod_revision is zero.
        #[prost(int64, tag = "1")]
        pub expect_mod_revision: i64,
        /// ShardSpec to be updated (if expect_mod_revision > 0) or created
        /// (if expect_mod_revision == 0).
        #[prost(message, optional, tag = "2")]
        pub upsert: Option<super::ShardSpec>,
        /// Shard to be deleted.
        #[prost(string, tag = "3")]
        pub delete: String,
    }
}

/// ApplyResponse is the unary response message of the Shard Apply RPC.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ApplyResponse {
    /// Status of the Apply RPC.
    #[prost(enumeration = "Status", tag = "1")]
    pub status: i32,
    /// Header of the response.
    #[prost(message, optional, tag = "2")]
    pub header: Option<broker::Header>,
}

/// GetHintsRequest is the unary request message of the Shard GetHints RPC.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetHintsRequest {
    /// Shard to fetch hints for.
    #[prost(string, tag = "1")]
    pub shard: String,
}

/// GetHintsResponse is the unary response message of the Shard GetHints RPC.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetHintsResponse {
    /// Status of the GetHints RPC.
    #[prost(enumeration = "Status", tag = "1")]
    pub status: i32,
    /// Header of the response.
    #[prost(message, optional, tag = "2")]
    pub header: Option<broker::Header>,
    /// Primary hints for the shard.
    #[prost(message, optional, tag = "3")]
    pub primary_hints: Option<get_hints_response::ResponseHints>,
    /// List of backup hints for a shard. The most recent recovery log hints
    /// will be first, any subsequent hints are for historical backup.
    #[prost(message, repeated, tag = "4")]
    pub backup_hints: Vec<get_hints_response::ResponseHints>,
}

pub mod get_hints_response {
    /// ResponseHints hold the hints for the shard, serialized as JSON.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ResponseHints {
        /// If the hints value does not exist, hints is empty.
        #[prost(string, tag = "1")]
        pub hints: String,
    }
}

/// UnassignRequest is the unary request message of the Shard Unassign RPC.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UnassignRequest {
    /// Shards to unassign.
    #[prost(string, repeated, tag = "1")]
    pub shards: Vec<String>,
    /// Only unassign shards which have a primary in FAILED status.
    #[prost(bool, tag = "2")]
    pub only_failed: bool,
    /// Skip actually removing shard assignments. Used to test the unassign
    /// operation before comitting to it.
    #[prost(bool, tag = "3")]
    pub dry_run: bool,
}

/// UnassignResponse is the unary response message of the Shard Unassign RPC.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UnassignResponse {
    /// Status of the Unassign RPC.
    #[prost(enumeration = "Status", tag = "1")]
    pub status: i32,
    /// Shards which had assignments removed.
    #[prost(string, repeated, tag = "2")]
    pub shards: Vec<String>,
}

/// Status is a response status code, used across Shard RPCs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Status {
    Ok = 0,
    /// The named shard does not exist.
    ShardNotFound = 1,
    /// There is no current primary consumer process for the shard. This is a
    /// temporary condition which should quickly resolve, assuming sufficient
    /// consumer capacity.
    NoShardPrimary = 2,
    /// The present consumer process is not the assigned primary for the
    /// shard, and was not instructed to proxy the request.
    NotShardPrimary = 3,
    /// The Etcd transaction failed. Returned by Update RPC when an
    /// expect_mod_revision of the UpdateRequest differs from the current
    /// ModRevision of the ShardSpec within the store.
    EtcdTransactionFailed = 4,
    /// The current primary shard has stopped, either due to reassignment or
    /// processing failure, and will not make further progress toward the
    /// requested operation.
    ShardStopped = 5,
}

impl Status {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::ShardNotFound => "SHARD_NOT_FOUND",
            Status::NoShardPrimary => "NO_SHARD_PRIMARY",
            Status::NotShardPrimary => "NOT_SHARD_PRIMARY",
            Status::EtcdTransactionFailed => "ETCD_TRANSACTION_FAILED",
            Status::ShardStopped => "SHARD_STOPPED",
        }
    }
}
