use std::collections::BTreeSet;

/// Known peer endpoints, never including this node's own endpoint.
#[derive(Clone, Debug, Default)]
pub struct PeerRegistry {
    own_url: String,
    peers: BTreeSet<String>,
}

impl PeerRegistry {
    pub fn new(own_url: impl AsRef<str>) -> Self {
        Self {
            own_url: normalize_url(own_url.as_ref()),
            peers: BTreeSet::new(),
        }
    }

    pub fn own_url(&self) -> &str {
        &self.own_url
    }

    /// Inserts `url`; returns whether the registry changed. Duplicates, blank
    /// values and this node's own endpoint are ignored.
    pub fn register(&mut self, url: &str) -> bool {
        let url = normalize_url(url);
        if url.is_empty() || url == self.own_url {
            return false;
        }
        self.peers.insert(url)
    }

    /// Returns how many new peers were added.
    pub fn register_all<'a>(&mut self, urls: impl IntoIterator<Item = &'a str>) -> usize {
        urls.into_iter().filter(|url| self.register(url)).count()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.peers.contains(&normalize_url(url))
    }

    pub fn peers(&self) -> Vec<String> {
        self.peers.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

/// Canonical form of a peer endpoint: trimmed, without trailing `/`.
pub fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
