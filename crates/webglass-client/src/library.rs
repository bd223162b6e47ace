//! Bookmarks and history as last reported by the remote.

use webglass_core::protocol::Bookmark;

#[derive(Debug, Default)]
pub struct Library {
    bookmarks: Vec<Bookmark>,
    history: Vec<String>,
}

/// One row of the history listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Host of the URL, or the URL itself when it has none.
    pub title: String,
    pub url: String,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bookmarks(&mut self, bookmarks: Vec<Bookmark>) {
        self.bookmarks = bookmarks;
    }

    pub fn set_history(&mut self, history: Vec<String>) {
        self.history = history;
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Bookmarks newest first, filtered by a case-insensitive search over
    /// title and URL. An empty term matches everything.
    pub fn bookmarks(&self, term: &str) -> Vec<&Bookmark> {
        let term = term.to_lowercase();
        let mut out: Vec<&Bookmark> = self
            .bookmarks
            .iter()
            .filter(|b| {
                term.is_empty()
                    || b.title.to_lowercase().contains(&term)
                    || b.url.to_lowercase().contains(&term)
            })
            .collect();
        out.sort_by(|a, b| b.created.total_cmp(&a.created));
        out
    }

    /// History newest first, `about:blank` skipped, filtered by a
    /// case-insensitive search over the URL.
    pub fn history(&self, term: &str) -> Vec<HistoryEntry> {
        let term = term.to_lowercase();
        self.history
            .iter()
            .rev()
            .filter(|url| url.as_str() != "about:blank")
            .filter(|url| term.is_empty() || url.to_lowercase().contains(&term))
            .map(|url| HistoryEntry {
                title: host_of(url).unwrap_or(url).to_string(),
                url: url.clone(),
            })
            .collect()
    }
}

/// Host part of an absolute URL (`scheme://host[:port]/...`).
fn host_of(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host_port = authority.rsplit('@').next()?;
    let host = match host_port.strip_prefix('[') {
        Some(v6) => v6.split(']').next()?,
        None => host_port.split(':').next()?,
    };
    (!host.is_empty()).then_some(host)
}
