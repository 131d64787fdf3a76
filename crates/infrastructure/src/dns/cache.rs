//! In-memory DNS cache with hosts-file hydration and persistence.
//!
//! Many readers, one writer: lookups take the shared side of the lock,
//! updates the exclusive side, both only for the duration of the map
//! operation. Updates replace entries wholesale; concurrent writers for the
//! same key race as last-writer-wins.

use super::hosts;
use ember_dns_domain::{DnsEntry, HostsFileError};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

pub struct DnsCache {
    entries: RwLock<HashMap<String, DnsEntry>>,
    path: PathBuf,
    persist_on_drop: bool,
}

impl DnsCache {
    /// Hydrates the cache from `path`. When the file does not exist it is
    /// created immediately and the cache is marked to persist on drop;
    /// failing to create it is as fatal as failing to parse it.
    pub fn open(path: &Path) -> Result<DnsCache, HostsFileError> {
        if path.exists() {
            let now = unix_time_secs();
            let entries = hosts::load_records(path)?
                .into_iter()
                .map(|(domain, address)| {
                    (
                        domain.to_ascii_lowercase(),
                        DnsEntry::preloaded(address, now),
                    )
                })
                .collect();
            Ok(DnsCache {
                entries: RwLock::new(entries),
                path: path.to_path_buf(),
                persist_on_drop: false,
            })
        } else {
            tracing::info!(path = %path.display(), "hosts file not found, creating it");
            hosts::create_file(path)?;
            Ok(DnsCache {
                entries: RwLock::new(HashMap::new()),
                path: path.to_path_buf(),
                persist_on_drop: true,
            })
        }
    }

    pub fn lookup(&self, name: &str) -> Option<DnsEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn upsert(&self, name: String, entry: DnsEntry) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, entry);
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn must_persist(&self) -> bool {
        self.persist_on_drop
    }

    /// Writes every entry back to the hosts file, preloaded or not.
    pub fn persist(&self) -> io::Result<()> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        hosts::write_records(
            &self.path,
            entries
                .iter()
                .map(|(domain, entry)| (domain.as_str(), entry.address.as_str())),
        )
    }
}

impl Drop for DnsCache {
    fn drop(&mut self) {
        if !self.persist_on_drop {
            return;
        }
        match self.persist() {
            Ok(()) => tracing::info!(path = %self.path.display(), "cache persisted"),
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "failed to persist cache")
            }
        }
    }
}

/// Seconds since the Unix epoch; the timestamp source for entry freshness.
pub fn unix_time_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
