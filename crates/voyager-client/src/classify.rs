//! Classification of invitation responses.
//!
//! The invitation endpoint is loosely typed: the same 422 status covers
//! "you are already connected to this member" and "the identifier you sent
//! is wrong". Classification is a single pure function over status + body
//! so that distinction lives in exactly one place instead of being
//! re-derived at every call site.
//!
//! Login redirects never reach classification; the client surfaces those
//! as [`crate::VoyagerError::SessionExpired`] before a body is read.

use serde::{Deserialize, Serialize};

/// Default phrases that mark a 422 as an already-existing relationship.
///
/// A fixed English allow-list is a known precision risk (localization,
/// platform copy changes); extend it from observed evidence via
/// [`Classifier::new`] rather than guessing here.
pub const DEFAULT_DUPLICATE_PHRASES: &[&str] = &[
    "already connected",
    "pending invitation",
    "invitation is pending",
    "already invited",
];

/// Default phrases that mark a response as throttled regardless of status.
pub const DEFAULT_THROTTLE_PHRASES: &[&str] = &["too many requests", "quota exceeded"];

/// What one invitation attempt amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// The invitation was created.
    Success,
    /// The relationship already exists or an invitation is already
    /// pending. Equivalent to success for persistence purposes.
    Duplicate,
    /// The request shape or identifier kind was wrong. Never a success.
    InvalidRequest,
    /// The platform throttled the action.
    RateLimited,
    /// Anything the rules cannot interpret.
    UnknownError,
}

impl Classification {
    /// Whether this classification means the relationship now exists.
    ///
    /// Only `Success` and `Duplicate` may ever lead to a persisted
    /// "connected" record.
    pub fn connection_exists(self) -> bool {
        matches!(self, Classification::Success | Classification::Duplicate)
    }

    /// Whether the attempt counted against the platform's own limits.
    ///
    /// Non-counting attempts hand their budget reservation back.
    pub fn counts_against_budget(self) -> bool {
        self.connection_exists()
    }
}

/// A classification plus the evidence that produced it.
#[derive(Debug, Clone)]
pub struct Classified {
    /// The classified outcome.
    pub classification: Classification,
    /// Matched phrase, or a truncated body snippet for diagnostics.
    pub evidence: Option<String>,
}

/// Classifies raw invitation responses.
#[derive(Debug, Clone)]
pub struct Classifier {
    duplicate_phrases: Vec<String>,
    throttle_phrases: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(
            DEFAULT_DUPLICATE_PHRASES.iter().map(|p| p.to_string()).collect(),
            DEFAULT_THROTTLE_PHRASES.iter().map(|p| p.to_string()).collect(),
        )
    }
}

impl Classifier {
    /// Create a classifier with explicit phrase allow-lists. Matching is
    /// case-insensitive.
    pub fn new(duplicate_phrases: Vec<String>, throttle_phrases: Vec<String>) -> Self {
        Self {
            duplicate_phrases: duplicate_phrases.into_iter().map(|p| p.to_lowercase()).collect(),
            throttle_phrases: throttle_phrases.into_iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    /// Map a raw status + body to a classification.
    ///
    /// Total and deterministic over the whole input domain: unknown shapes
    /// map to `UnknownError`, never a panic or an error.
    pub fn classify(&self, status: u16, body: &str) -> Classified {
        let lower = body.to_lowercase();

        match status {
            201 => Classified {
                classification: Classification::Success,
                evidence: None,
            },
            422 => {
                if let Some(phrase) = match_phrase(&self.duplicate_phrases, &lower) {
                    Classified {
                        classification: Classification::Duplicate,
                        evidence: Some(phrase.to_string()),
                    }
                } else {
                    Classified {
                        classification: Classification::InvalidRequest,
                        evidence: snippet(body),
                    }
                }
            }
            429 => Classified {
                classification: Classification::RateLimited,
                evidence: snippet(body),
            },
            _ => {
                if let Some(phrase) = match_phrase(&self.throttle_phrases, &lower) {
                    Classified {
                        classification: Classification::RateLimited,
                        evidence: Some(phrase.to_string()),
                    }
                } else {
                    Classified {
                        classification: Classification::UnknownError,
                        evidence: snippet(body),
                    }
                }
            }
        }
    }
}

/// First allow-list phrase contained in the lowercased haystack.
fn match_phrase<'a>(phrases: &'a [String], haystack_lower: &str) -> Option<&'a str> {
    phrases
        .iter()
        .find(|phrase| haystack_lower.contains(phrase.as_str()))
        .map(String::as_str)
}

/// Short diagnostic snippet of the body, or `None` when it is empty.
fn snippet(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(160).collect())
}
