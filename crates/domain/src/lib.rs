pub mod config;
pub mod entry;
pub mod errors;
pub mod protocol;

pub use config::{ServerConfig, DEFAULT_UPSTREAM};
pub use entry::DnsEntry;
pub use errors::{DnsError, HostsFileError};
pub use protocol::{
    query_shape_supported, Opcode, Rcode, CACHE_TTL_SECS, QCLASS_ANY, QCLASS_IN, QTYPE_A,
    QTYPE_ANY,
};
