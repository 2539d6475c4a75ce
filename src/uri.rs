//! Resource URI - addressing for provider resources
//!
//! Format: `<scheme>://<authority>/<segment>/<segment>...`
//!
//! Examples:
//! - `content://com.example.android.books/books`
//! - `content://com.example.android.books/books/42`

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// A parsed resource URI.
///
/// Empty path segments are dropped, so `books/` and `books` address the same
/// resource. Query strings and fragments are not part of the identity and are
/// discarded on parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceUri {
    /// URI scheme, e.g. `content`
    pub scheme: String,
    /// Authority that owns the resource
    pub authority: String,
    /// Path segments after the authority
    pub segments: Vec<String>,
}

impl ResourceUri {
    /// Create a URI from its parts
    pub fn new(scheme: impl Into<String>, authority: impl Into<String>, segments: &[&str]) -> Self {
        Self {
            scheme: scheme.into(),
            authority: authority.into(),
            segments: segments
                .iter()
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Parse a URI string into a ResourceUri
    ///
    /// Expected format: `<scheme>://<authority>[/<path>]`
    pub fn parse(uri: &str) -> Result<Self> {
        let (scheme, rest) = uri.split_once("://")
            .ok_or_else(|| Error::InvalidUri(format!("missing scheme separator in {}", uri)))?;

        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c)) {
            return Err(Error::InvalidUri(format!("invalid scheme in {}", uri)));
        }

        // Drop query and fragment
        let rest = rest.split(['?', '#']).next().unwrap_or("");

        let (authority, path) = match rest.split_once('/') {
            Some((authority, path)) => (authority, path),
            None => (rest, ""),
        };

        if authority.is_empty() || authority.chars().any(char::is_whitespace) {
            return Err(Error::InvalidUri(format!("invalid authority in {}", uri)));
        }

        let segments: Vec<&str> = path.split('/').collect();
        Ok(Self::new(scheme, authority, &segments))
    }

    /// Append a numeric id as a new trailing segment
    pub fn with_appended_id(&self, id: i64) -> Self {
        let mut uri = self.clone();
        uri.segments.push(id.to_string());
        uri
    }

    /// Extract the trailing numeric id, if the last segment is a non-negative decimal
    pub fn parse_id(&self) -> Option<i64> {
        self.segments.last().and_then(|s| parse_decimal_id(s))
    }

    /// Whether `other` lives strictly below this URI
    pub fn is_ancestor_of(&self, other: &ResourceUri) -> bool {
        self.scheme == other.scheme
            && self.authority == other.authority
            && self.segments.len() < other.segments.len()
            && other.segments.starts_with(&self.segments)
    }

    /// Convert to URI string
    pub fn to_uri_string(&self) -> String {
        let mut out = format!("{}://{}", self.scheme, self.authority);
        for segment in &self.segments {
            out.push('/');
            out.push_str(segment);
        }
        out
    }
}

/// Parse a decimal id segment. Signs, whitespace and overflow are rejected.
pub(crate) fn parse_decimal_id(segment: &str) -> Option<i64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uri_string())
    }
}

impl FromStr for ResourceUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ResourceUri {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_uri_string())
    }
}

impl<'de> Deserialize<'de> for ResourceUri {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ResourceUri::parse(&s).map_err(serde::de::Error::custom)
    }
}
