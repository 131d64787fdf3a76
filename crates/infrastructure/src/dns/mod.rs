pub mod cache;
pub mod codec;
pub mod hosts;

pub use cache::{unix_time_secs, DnsCache};
pub use codec::{DnsHeader, DnsQuery, DnsResponse, QueryRecord, ResponseRecord, WireError};
