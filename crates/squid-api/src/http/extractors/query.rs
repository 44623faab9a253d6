//! Query parameter extractors for list endpoints.
//!
//! Limits are optional; each endpoint falls back to its own default and
//! every limit is capped at [`MAX_LIMIT`].

use serde::Deserialize;

/// Upper bound on any list request.
pub const MAX_LIMIT: u32 = 1000;

/// `GET /memory` parameters.
#[derive(Debug, Deserialize, Default)]
pub struct MemoryQuery {
    /// Restrict to one channel.
    pub channel: Option<String>,
    /// Case-insensitive substring search across all channels.
    pub search: Option<String>,
    pub limit: Option<u32>,
}

impl MemoryQuery {
    pub const SEARCH_DEFAULT: u32 = 20;
    pub const CHANNEL_DEFAULT: u32 = 50;
    pub const ALL_DEFAULT: u32 = 100;
}

/// `DELETE /memory` parameters. No channel means everything.
#[derive(Debug, Deserialize, Default)]
pub struct PurgeQuery {
    pub channel: Option<String>,
}

/// `GET /scan/history` parameters.
#[derive(Debug, Deserialize, Default)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

impl HistoryQuery {
    pub const DEFAULT: u32 = 50;
}

/// `GET /posts` parameters.
#[derive(Debug, Deserialize, Default)]
pub struct PostsQuery {
    pub channel: Option<String>,
    pub limit: Option<u32>,
}

impl PostsQuery {
    pub const DEFAULT: u32 = 20;
}

/// Apply the endpoint default and the global cap. Zero means "use the default".
pub fn effective_limit(requested: Option<u32>, default: u32) -> u32 {
    match requested {
        Some(0) | None => default,
        Some(n) => n.min(MAX_LIMIT),
    }
}

/// Treat blank strings as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_limit() {
        assert_eq!(effective_limit(None, 50), 50);
        assert_eq!(effective_limit(Some(0), 50), 50);
        assert_eq!(effective_limit(Some(7), 50), 7);
        assert_eq!(effective_limit(Some(50_000), 50), MAX_LIMIT);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some("sms".into())), Some("sms".into()));
        assert_eq!(non_blank(None), None);
    }
}
