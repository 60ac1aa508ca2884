//! Messages of the Gazette `protocol` package: labels and selectors, journal
//! specifications, routing topology, and the Journal RPC request / response
//! pairs.

/// Label defines a key & value pair which can be attached to entities like
/// JournalSpecs and BrokerSpecs. Labels may be used to provide identifying
/// attributes which do not directly imply semantics to the core system, but
/// are meaningful to users or for higher-level tools.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Label {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub value: String,
    /// If true, the label value is treated as a prefix of matched values,
    /// rather than an exact match.
    #[prost(bool, tag = "3")]
    #[serde(skip_serializing_if = "is_false")]
    pub prefix: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// LabelSet is a collection of labels and their values,
/// maintained in sorted order.
#[derive(Clone, PartialEq, Eq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LabelSet {
    /// Labels of the set, ordered on (name, value).
    #[prost(message, repeated, tag = "1")]
    pub labels: Vec<Label>,
}

/// LabelSelector defines a filter over LabelSets.
#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LabelSelector {
    /// Include is Labels which must be matched for a LabelSet to be selected.
    /// If empty, all Labels are included.
    #[prost(message, optional, tag = "1")]
    pub include: Option<LabelSet>,
    /// Exclude is Labels which cannot be matched for a LabelSet to be
    /// selected. If empty, no Labels are excluded.
    #[prost(message, optional, tag = "2")]
    pub exclude: Option<LabelSet>,
}

/// JournalSpec describes a Journal and its configuration.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct JournalSpec {
    /// Name of the Journal.
    #[prost(string, tag = "1")]
    pub name: String,
    /// Desired replication of this Journal.
    #[prost(int32, tag = "2")]
    pub replication: i32,
    /// User-defined Labels of this JournalSpec.
    #[prost(message, optional, tag = "4")]
    pub labels: Option<LabelSet>,
    #[prost(message, optional, tag = "5")]
    pub fragment: Option<journal_spec::Fragment>,
    /// Flags of the Journal, as a combination of Flag enum values.
    #[prost(uint32, tag = "6")]
    pub flags: u32,
    /// Maximum rate, in bytes-per-second, at which appends of this journal
    /// will be processed.
    #[prost(int64, tag = "7")]
    pub max_append_rate: i64,
    #[prost(message, optional, tag = "8")]
    pub suspend: Option<journal_spec::Suspend>,
}

pub mod journal_spec {
    /// Fragment is JournalSpec configuration which pertains to the creation,
    /// persistence, and indexing of the Journal's Fragments.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Fragment {
        /// Target content length of each Fragment.
        #[prost(int64, tag = "1")]
        pub length: i64,
        /// Codec used to compress Journal Fragments.
        #[prost(enumeration = "super::CompressionCodec", tag = "2")]
        pub compression_codec: i32,
        /// Storage backend base path for this Journal's Fragments.
        #[prost(string, repeated, tag = "3")]
        pub stores: Vec<String>,
        /// Interval of time between refreshes of remote fragment listings
        /// from configured fragment_stores.
        #[prost(message, optional, tag = "4")]
        pub refresh_interval: Option<::pbjson_types::Duration>,
        /// Retention duration for historical Fragments of this Journal within
        /// the Fragment stores.
        #[prost(message, optional, tag = "5")]
        pub retention: Option<::pbjson_types::Duration>,
        /// Flush interval defines a uniform UTC time segment which, when
        /// passed while a Fragment remains open, will prompt its closure.
        #[prost(message, optional, tag = "6")]
        pub flush_interval: Option<::pbjson_types::Duration>,
        /// Path postfix template is a Go template evaluated to build a
        /// directory path postfix for persisted fragments.
        #[prost(string, tag = "7")]
        pub path_postfix_template: String,
    }

    /// Suspend describes the suspension state of the journal.
    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct Suspend {
        #[prost(enumeration = "suspend::Level", tag = "1")]
        pub level: i32,
        /// Journal offset at which the suspension took effect.
        #[prost(int64, tag = "2")]
        pub offset: i64,
    }

    pub mod suspend {
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
        )]
        #[repr(i32)]
        pub enum Level {
            None = 0,
            Partial = 1,
            Full = 2,
        }

        impl Level {
            pub fn as_str_name(&self) -> &'static str {
                match self {
                    Level::None => "NONE",
                    Level::Partial => "PARTIAL",
                    Level::Full => "FULL",
                }
            }
        }
    }
}

/// ProcessSpec describes a uniquely identified process and its addressable
/// endpoint.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProcessSpec {
    #[prost(message, optional, tag = "1")]
    pub id: Option<process_spec::Id>,
    /// Advertised URL of the process.
    #[prost(string, tag = "2")]
    pub endpoint: String,
}

pub mod process_spec {
    /// ID composes a zone and a suffix to uniquely identify a ProcessSpec.
    #[derive(
        Clone,
        PartialEq,
        Eq,
        Hash,
        PartialOrd,
        Ord,
        ::prost::Message,
        serde::Serialize,
        serde::Deserialize,
    )]
    #[serde(default)]
    pub struct Id {
        /// "Zone" in which the process is running.
        #[prost(string, tag = "1")]
        pub zone: String,
        /// Unique suffix of the process within its zone.
        #[prost(string, tag = "2")]
        pub suffix: String,
    }
}

/// Route captures the current topology of an item and the processes serving
/// it.
#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Route {
    /// Members of the Route, ordered on ascending ProcessSpec.ID (zone,
    /// suffix).
    #[prost(message, repeated, tag = "1")]
    pub members: Vec<process_spec::Id>,
    /// Index of the ProcessSpec serving as primary within `members`, or -1 of
    /// no member is currently primary.
    #[prost(int32, tag = "2")]
    pub primary: i32,
    /// Endpoints of each Route member. If not empty, `endpoints` has the same
    /// length and order as `members`, and captures the endpoint of each one.
    #[prost(string, repeated, tag = "3")]
    pub endpoints: Vec<String>,
}

/// Header captures metadata such as the process responsible for processing an
/// RPC, and its effective Etcd state.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Header {
    /// ID of the process responsible for request processing. May be empty iff
    /// Header is being used within a proxied request, and that request may be
    /// dispatched to any member of the Route.
    #[prost(message, optional, tag = "1")]
    pub process_id: Option<process_spec::Id>,
    /// Route of processes specifically responsible for this RPC, or an empty
    /// Route if any process is capable of serving the RPC.
    #[prost(message, optional, tag = "2")]
    pub route: Option<Route>,
    #[prost(message, optional, tag = "3")]
    pub etcd: Option<header::Etcd>,
}

pub mod header {
    /// Etcd represents the effective Etcd MVCC state under which a Gazette
    /// broker is operating in its processing of requests and responses.
    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct Etcd {
        #[prost(uint64, tag = "1")]
        pub cluster_id: u64,
        #[prost(uint64, tag = "2")]
        pub member_id: u64,
        #[prost(int64, tag = "3")]
        pub revision: i64,
        #[prost(uint64, tag = "4")]
        pub raft_term: u64,
    }
}

/// Fragment is a content-addressed description of a contiguous Journal span.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Fragment {
    /// Journal of the Fragment.
    #[prost(string, tag = "1")]
    pub journal: String,
    /// Begin (inclusive) and end (exclusive) offset of the Fragment within
    /// the Journal.
    #[prost(int64, tag = "2")]
    pub begin: i64,
    #[prost(int64, tag = "3")]
    pub end: i64,
    /// SHA1 sum of the Fragment's content.
    #[prost(message, optional, tag = "4")]
    pub sum: Option<Sha1Sum>,
    /// Codec with which the Fragment's content is compressed.
    #[prost(enumeration = "CompressionCodec", tag = "5")]
    pub compression_codec: i32,
    /// Fragment store which backs the Fragment.
    #[prost(string, tag = "6")]
    pub backing_store: String,
    /// Modification timestamp of the Fragment within the backing store,
    /// represented as seconds since the epoch.
    #[prost(int64, tag = "7")]
    pub mod_time: i64,
    /// Path postfix under which the fragment is persisted to the store.
    #[prost(string, tag = "8")]
    pub path_postfix: String,
}

/// SHA1Sum is a 160-bit SHA1 digest.
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Sha1Sum {
    #[prost(fixed64, tag = "1")]
    pub part1: u64,
    #[prost(fixed64, tag = "2")]
    pub part2: u64,
    #[prost(fixed32, tag = "3")]
    pub part3: u32,
}

/// ListRequest is the unary request message of the broker List RPC.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListRequest {
    /// Selector optionally refines the set of journals which will be
    /// enumerated. If zero-valued, all journals are returned.
    #[prost(message, optional, tag = "1")]
    pub selector: Option<LabelSelector>,
}

/// ListResponse is the unary response message of the broker List RPC.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListResponse {
    /// Status of the List RPC.
    #[prost(enumeration = "Status", tag = "1")]
    pub status: i32,
    /// Header of the response.
    #[prost(message, optional, tag = "2")]
    pub header: Option<Header>,
    #[prost(message, repeated, tag = "3")]
    pub journals: Vec<list_response::Journal>,
}

pub mod list_response {
    /// Journals of the response.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Journal {
        #[prost(message, optional, tag = "1")]
        pub spec: Option<super::JournalSpec>,
        /// Current ModRevision of the JournalSpec.
        #[prost(int64, tag = "2")]
        pub mod_revision: i64,
        /// Route of the journal, including endpoints.
        #[prost(message, optional, tag = "3")]
        pub route: Option<super::Route>,
    }
}

/// FragmentsRequest is the unary request message of the broker ListFragments
/// RPC.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FragmentsRequest {
    /// Header is attached by a proxying broker peer.
    #[prost(message, optional, tag = "1")]
    pub header: Option<Header>,
    /// Journal to be read.
    #[prost(string, tag = "2")]
    pub journal: String,
    /// BeginModTime is an optional field specifying an inclusive lower bound
    /// on the modification timestamp for a fragment to be returned.
    #[prost(int64, tag = "3")]
    pub begin_mod_time: i64,
    /// EndModTime is an optional field specifying an exclusive upper bound on
    /// the modification timestamp for a fragment to be returned.
    #[prost(int64, tag = "4")]
    pub end_mod_time: i64,
    /// The NextPageToken value returned from a previous, continued
    /// FragmentsRequest, if any.
    #[prost(int64, tag = "5")]
    pub next_page_token: i64,
    /// PageLimit is an optional field specifying how many fragments to return
    /// with the response. The default value for PageLimit is 1000.
    #[prost(int32, tag = "6")]
    pub page_limit: i32,
    /// SignatureTTL indicates that a temporary signed GET URL should be
    /// returned with each response Fragment, valid for `signatureTTL`.
    #[prost(message, optional, tag = "7")]
    pub signature_ttl: Option<::pbjson_types::Duration>,
    /// DoNotProxy indicates this request must not be proxied to another
    /// broker.
    #[prost(bool, tag = "8")]
    pub do_not_proxy: bool,
}

/// FragmentsResponse is the unary response message of the broker
/// ListFragments RPC.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FragmentsResponse {
    /// Status of the ListFragments RPC.
    #[prost(enumeration = "Status", tag = "1")]
    pub status: i32,
    /// Header of the response.
    #[prost(message, optional, tag = "2")]
    pub header: Option<Header>,
    #[prost(message, repeated, tag = "3")]
    pub fragments: Vec<fragments_response::Fragment>,
    /// The NextPageToken to be returned on a following FragmentsRequest.
    /// If the value is zero then there are no more fragments to be returned.
    #[prost(int64, tag = "4")]
    pub next_page_token: i64,
}

pub mod fragments_response {
    /// Fragments of the response.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Fragment {
        #[prost(message, optional, tag = "1")]
        pub spec: Option<super::Fragment>,
        /// SignedURL of the Fragment, if requested.
        #[prost(string, tag = "2")]
        pub signed_url: String,
    }
}

/// ReadRequest is the request message of the broker Read RPC.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadRequest {
    /// Header is attached by a proxying broker peer.
    #[prost(message, optional, tag = "1")]
    pub header: Option<Header>,
    /// Journal to be read.
    #[prost(string, tag = "2")]
    pub journal: String,
    /// Desired offset to begin reading from.
    #[prost(int64, tag = "3")]
    pub offset: i64,
    /// Whether the operation should block until content becomes available.
    #[prost(bool, tag = "4")]
    pub block: bool,
    /// If do_not_proxy is true, the broker will not proxy the read to another
    /// broker, or open and proxy a remote Fragment on the client's behalf.
    #[prost(bool, tag = "5")]
    pub do_not_proxy: bool,
    /// If metadata_only is true, the broker will respond with Journal and
    /// Fragment metadata but not content.
    #[prost(bool, tag = "6")]
    pub metadata_only: bool,
    /// Offset to read through. If zero, then the read end offset is
    /// unconstrained.
    #[prost(int64, tag = "7")]
    pub end_offset: i64,
    /// BeginModTime is an optional inclusive lower bound on the modification
    /// timestamps of fragments read from the backing store.
    #[prost(int64, tag = "8")]
    pub begin_mod_time: i64,
}

/// ReadResponse is the response message of the broker Read RPC.
/// Responses messages are of two types: "metadata" messages which describe
/// the current Fragment and Route of the read, and "chunk" messages which
/// carry journal content.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadResponse {
    /// Status of the Read RPC.
    #[prost(enumeration = "Status", tag = "1")]
    pub status: i32,
    /// Header of the response. Accompanies the first ReadResponse of the
    /// response stream.
    #[prost(message, optional, tag = "2")]
    pub header: Option<Header>,
    /// The effective offset of the read.
    #[prost(int64, tag = "3")]
    pub offset: i64,
    /// The offset to next be written, by the next append transaction served
    /// by the journal primary.
    #[prost(int64, tag = "4")]
    pub write_head: i64,
    /// Fragment to which the offset was mapped.
    #[prost(message, optional, tag = "5")]
    pub fragment: Option<Fragment>,
    /// If Fragment is remote, a URL from which it may be directly read.
    #[prost(string, tag = "6")]
    pub fragment_url: String,
    /// Content chunks of the read.
    #[prost(bytes = "bytes", tag = "7")]
    pub content: ::bytes::Bytes,
}

/// AppendRequest is the request message of the broker Append RPC.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AppendRequest {
    /// Header is attached by a proxying broker peer to the first request.
    #[prost(message, optional, tag = "1")]
    pub header: Option<Header>,
    /// Journal to be appended to.
    #[prost(string, tag = "2")]
    pub journal: String,
    /// If do_not_proxy is true, the broker will not proxy the append if it is
    /// not the current primary.
    #[prost(bool, tag = "3")]
    pub do_not_proxy: bool,
    /// Journal offset at which the append should begin.
    #[prost(int64, tag = "4")]
    pub offset: i64,
    /// Selector of journal registers which must be satisfied for the request
    /// to proceed.
    #[prost(message, optional, tag = "5")]
    pub check_registers: Option<LabelSelector>,
    /// Labels to union with current registers if the append succeeds.
    #[prost(message, optional, tag = "6")]
    pub union_registers: Option<LabelSet>,
    /// Labels to subtract from current registers if the append succeeds.
    #[prost(message, optional, tag = "7")]
    pub subtract_registers: Option<LabelSet>,
    /// Content chunks to be appended.
    #[prost(bytes = "bytes", tag = "8")]
    pub content: ::bytes::Bytes,
}

/// AppendResponse is the response message of the broker Append RPC.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AppendResponse {
    /// Status of the Append RPC.
    #[prost(enumeration = "Status", tag = "1")]
    pub status: i32,
    /// Header of the response.
    #[prost(message, optional, tag = "2")]
    pub header: Option<Header>,
    /// If status is OK, then |commit| is the Fragment which places the
    /// committed content within the Journal.
    #[prost(message, optional, tag = "3")]
    pub commit: Option<Fragment>,
    /// Current registers of the journal.
    #[prost(message, optional, tag = "4")]
    pub registers: Option<LabelSet>,
    /// Total number of RPC content chunks processed in this append.
    #[prost(int64, tag = "5")]
    pub total_chunks: i64,
    /// Number of content chunks which were delayed by journal flow control.
    #[prost(int64, tag = "6")]
    pub delayed_chunks: i64,
}

/// ApplyRequest is the request message of the broker Apply RPC.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ApplyRequest {
    #[prost(message, repeated, tag = "1")]
    pub changes: Vec<apply_request::Change>,
}

pub mod apply_request {
    /// Change defines an insertion, update, or deletion to be applied to the
    /// set of JournalSpecs.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Change {
        /// Expected ModRevision of the current JournalSpec. If the Journal is
        /// being created, expect_mod_revision is zero.
        #[prost(int64, tag = "1")]
        pub expect_mod_revision: i64,
        /// JournalSpec to be updated (if expect_mod_revision > 0) or created
        /// (if expect_mod_revision == 0).
        #[prost(message, optional, tag = "2")]
        pub upsert: Option<super::JournalSpec>,
        /// Journal to be deleted.
        #[prost(string, tag = "3")]
        pub delete: String,
    }
}

/// ApplyResponse is the response message of the broker Apply RPC.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ApplyResponse {
    /// Status of the Apply RPC.
    #[prost(enumeration = "Status", tag = "1")]
    pub status: i32,
    /// Header of the response.
    #[prost(message, optional, tag = "2")]
    pub header: Option<Header>,
}

/// ReplicateRequest is the request message of the broker's internal Replicate
/// RPC.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReplicateRequest {
    /// Header defines the primary broker, effective Etcd state, and Route of
    /// the replication pipeline.
    #[prost(message, optional, tag = "1")]
    pub header: Option<Header>,
    /// Proposed Fragment to commit.
    #[prost(message, optional, tag = "3")]
    pub proposal: Option<Fragment>,
    /// Registers proposed to apply.
    #[prost(message, optional, tag = "7")]
    pub registers: Option<LabelSet>,
    /// Acknowledge requests that the peer send an acknowledging
    /// ReplicateResponse.
    #[prost(bool, tag = "6")]
    pub acknowledge: bool,
    /// Journal to be replicated to, present in the first request only.
    #[prost(string, tag = "2")]
    pub deprecated_journal: String,
    /// Content to be replicated.
    #[prost(bytes = "bytes", tag = "4")]
    pub content: ::bytes::Bytes,
    /// Delta offset of |content| relative to the Fragment's end.
    #[prost(int64, tag = "5")]
    pub content_delta: i64,
}

/// ReplicateResponse is the response message of the broker's internal
/// Replicate RPC.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReplicateResponse {
    /// Status of the Replicate RPC.
    #[prost(enumeration = "Status", tag = "1")]
    pub status: i32,
    /// Header of the response.
    #[prost(message, optional, tag = "2")]
    pub header: Option<Header>,
    /// If status is FRAGMENT_MISMATCH, then |fragment| is the replica's
    /// current journal Fragment.
    #[prost(message, optional, tag = "3")]
    pub fragment: Option<Fragment>,
    /// If status is REGISTER_MISMATCH, then |registers| are the replica's
    /// current journal registers.
    #[prost(message, optional, tag = "4")]
    pub registers: Option<LabelSet>,
}

/// Status is a response status code, used universally across broker RPCs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Status {
    Ok = 0,
    /// The named journal does not exist.
    JournalNotFound = 1,
    /// There is no current primary broker for the journal. This is a
    /// temporary condition which should quickly resolve, assuming sufficient
    /// broker capacity.
    NoJournalPrimaryBroker = 2,
    /// The present broker is not the assigned primary broker for the journal.
    NotJournalPrimaryBroker = 3,
    /// The present broker is not an assigned broker for the journal.
    NotJournalBroker = 4,
    /// There are an insufficient number of assigned brokers for the journal
    /// to meet its required replication.
    InsufficientJournalBrokers = 5,
    /// The requested offset is not yet available. This indicates either that
    /// the offset has not yet been written, or that the broker is not yet
    /// aware of a written fragment covering the offset.
    OffsetNotYetAvailable = 6,
    /// The append is refused because its requested offset is not equal to the
    /// furthest written offset of the journal.
    WrongAppendOffset = 7,
    /// The append is refused because the journal's fragment index includes an
    /// offset greater than the append offset.
    IndexHasGreaterOffset = 8,
    /// The append is refused because a register of the journal does not match
    /// the request's expectation.
    RegisterMismatch = 9,
}

impl Status {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::JournalNotFound => "JOURNAL_NOT_FOUND",
            Status::NoJournalPrimaryBroker => "NO_JOURNAL_PRIMARY_BROKER",
            Status::NotJournalPrimaryBroker => "NOT_JOURNAL_PRIMARY_BROKER",
            Status::NotJournalBroker => "NOT_JOURNAL_BROKER",
            Status::InsufficientJournalBrokers => "INSUFFICIENT_JOURNAL_BROKERS",
            Status::OffsetNotYetAvailable => "OFFSET_NOT_YET_AVAILABLE",
            Status::WrongAppendOffset => "WRONG_APPEND_OFFSET",
            Status::IndexHasGreaterOffset => "INDEX_HAS_GREATER_OFFSET",
            Status::RegisterMismatch => "REGISTER_MISMATCH",
        }
    }
}

/// CompressionCodec defines codecs known to Gazette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum CompressionCodec {
    /// Invalid is the zero-valued CompressionCodec, and is not a valid codec.
    Invalid = 0,
    /// No compression.
    None = 1,
    Gzip = 2,
    Zstandard = 3,
    Snappy = 4,
    /// The Fragment is stored gzipped, but is decompressed by the store on
    /// read (eg, using a "Content-Encoding: gzip" header).
    GzipOffloadDecompression = 5,
}

impl CompressionCodec {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            CompressionCodec::Invalid => "INVALID",
            CompressionCodec::None => "NONE",
            CompressionCodec::Gzip => "GZIP",
            CompressionCodec::Zstandard => "ZSTANDARD",
            CompressionCodec::Snappy => "SNAPPY",
            CompressionCodec::GzipOffloadDecompression => "GZIP_OFFLOAD_DECOMPRESSION",
        }
    }
}
