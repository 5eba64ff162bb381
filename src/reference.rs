//! Extraction and parsing of GitHub repository references from free text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static REFERENCE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:https?://)?(?:www\.)?github\.com/[\w-]+/[\w.-]+(?:\.git)?")
        .expect("reference pattern is valid")
});

static CAPTURE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)github\.com/([\w-]+)/([\w.-]+?)(?:\.git)?(?:/|$)")
        .expect("capture pattern is valid")
});

static OWNER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("owner pattern is valid"));

static REPO_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("repo pattern is valid"));

/// A parsed (owner, repository) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoReference {
    /// Account or organization login
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl RepoReference {
    /// Cache key, case-folded because the host treats names case-insensitively
    pub fn cache_key(&self) -> String {
        format!("{}/{}", self.owner, self.repo).to_lowercase()
    }
}

impl fmt::Display for RepoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Returns every repository URL substring in order of first appearance.
///
/// Trailing periods are sentence punctuation, not part of the repository name.
pub fn extract_references(text: &str) -> Vec<&str> {
    REFERENCE_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches('.'))
        .collect()
}

/// Collapses references that point at the same repository.
///
/// Scheme, `www.`, a `.git` suffix and letter case do not make two
/// references distinct.
pub fn distinct_references<'a>(references: &[&'a str]) -> Vec<&'a str> {
    let mut seen = Vec::new();
    let mut distinct = Vec::new();

    for reference in references {
        let key = normalized_key(reference);
        if !seen.contains(&key) {
            seen.push(key);
            distinct.push(*reference);
        }
    }

    distinct
}

fn normalized_key(reference: &str) -> String {
    let lower = reference.to_lowercase();
    let path = lower
        .find("github.com/")
        .map_or(lower.as_str(), |start| &lower[start..]);
    path.strip_suffix(".git").unwrap_or(path).to_string()
}

/// Decomposes a matched URL into owner and repository.
///
/// Captures that pass the loose syntactic match but contain characters
/// outside the strict identifier sets (e.g. non-ASCII letters) are rejected.
pub fn parse_reference(url: &str) -> Option<RepoReference> {
    let captures = CAPTURE_PATTERN.captures(url)?;
    let owner = captures.get(1)?.as_str();
    let repo = captures.get(2)?.as_str();

    if !OWNER_PATTERN.is_match(owner) || !REPO_PATTERN.is_match(repo) {
        return None;
    }
    if repo == "." || repo == ".." {
        return None;
    }

    Some(RepoReference {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

/// Removes all given references from the text and trims the remainder.
pub fn strip_references(text: &str, references: &[&str]) -> String {
    let mut remainder = text.to_string();
    for reference in references {
        remainder = remainder.replace(reference, "");
    }
    remainder.trim().to_string()
}
