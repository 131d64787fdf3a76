use crate::protocol::CACHE_TTL_SECS;

/// A single cached name→address binding.
///
/// `preloaded` marks entries hydrated from the hosts file; those never
/// expire. Entries learned from upstream replies expire `CACHE_TTL_SECS`
/// after `last_updated`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsEntry {
    /// IPv4 address as dotted-quad text.
    pub address: String,
    /// Unix timestamp (seconds) of the last update for this key.
    pub last_updated: u64,
    pub preloaded: bool,
}

impl DnsEntry {
    pub fn preloaded(address: String, now: u64) -> Self {
        DnsEntry {
            address,
            last_updated: now,
            preloaded: true,
        }
    }

    pub fn resolved(address: String, now: u64) -> Self {
        DnsEntry {
            address,
            last_updated: now,
            preloaded: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.address.is_empty()
    }

    /// Freshness rule applied by the request handler: non-empty, and either
    /// preloaded or still inside the TTL window.
    pub fn is_fresh(&self, now: u64) -> bool {
        !self.is_empty()
            && (self.preloaded || now.saturating_sub(self.last_updated) <= CACHE_TTL_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_entry_expires_after_ttl() {
        let entry = DnsEntry::resolved("93.184.216.34".into(), 1_000);
        assert!(entry.is_fresh(1_000));
        assert!(entry.is_fresh(1_000 + CACHE_TTL_SECS));
        assert!(!entry.is_fresh(1_000 + CACHE_TTL_SECS + 1));
    }

    #[test]
    fn preloaded_entry_never_expires() {
        let entry = DnsEntry::preloaded("10.0.0.1".into(), 1_000);
        assert!(entry.is_fresh(1_000 + 365 * 24 * 3600));
    }

    #[test]
    fn empty_address_is_never_fresh() {
        let entry = DnsEntry::preloaded(String::new(), 1_000);
        assert!(!entry.is_fresh(1_000));
    }

    #[test]
    fn clock_going_backwards_is_not_expiry() {
        let entry = DnsEntry::resolved("1.2.3.4".into(), 2_000);
        assert!(entry.is_fresh(1_500));
    }
}
