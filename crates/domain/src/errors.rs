use crate::protocol::Rcode;
use thiserror::Error;

/// Per-request error taxonomy, mapped 1:1 to the RCODE returned to the
/// client. Every variant carries the id of the offending request so the
/// error response can echo it.
#[derive(Error, Debug, Clone)]
pub enum DnsError {
    #[error("unable to interpret the query (message id: {id})")]
    Format { id: u16 },

    #[error("server internal error (message id: {id}): {detail}")]
    ServerFailure { id: u16, detail: String },

    #[error("domain name does not exist (message id: {id})")]
    NameError { id: u16 },

    #[error("query is not supported (message id: {id})")]
    NotImplemented { id: u16 },

    #[error("query refused (message id: {id})")]
    Refused { id: u16 },
}

impl DnsError {
    pub fn rcode(&self) -> Rcode {
        match self {
            DnsError::Format { .. } => Rcode::Format,
            DnsError::ServerFailure { .. } => Rcode::ServerFail,
            DnsError::NameError { .. } => Rcode::NameError,
            DnsError::NotImplemented { .. } => Rcode::NotImpl,
            DnsError::Refused { .. } => Rcode::Refused,
        }
    }

    pub fn id(&self) -> u16 {
        match self {
            DnsError::Format { id }
            | DnsError::ServerFailure { id, .. }
            | DnsError::NameError { id }
            | DnsError::NotImplemented { id }
            | DnsError::Refused { id } => *id,
        }
    }
}

/// Hosts-file loading failures. Fatal to startup.
#[derive(Error, Debug)]
pub enum HostsFileError {
    #[error("failed to read hosts file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create hosts file {path}: {source}")]
    Create {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed hosts file entry at line {line}: missing separator")]
    MissingSeparator { line: usize },
}
