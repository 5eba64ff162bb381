use serde::{Deserialize, Serialize};

use crate::reference::RepoReference;

/// Description used when the repository has none
pub const DEFAULT_DESCRIPTION: &str = "No description provided";
/// Language used when the host detected none
pub const DEFAULT_LANGUAGE: &str = "Not specified";
/// Branch used when the host reports none
pub const DEFAULT_BRANCH: &str = "main";

/// Repository payload exactly as loose as the host sends it
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRepository {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stargazers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub topics: Option<Vec<String>>,
    pub license: Option<RawLicense>,
    pub homepage: Option<String>,
    pub default_branch: Option<String>,
}

/// License object nested in the repository payload
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLicense {
    pub name: Option<String>,
    pub spdx_id: Option<String>,
}

/// Normalized repository metadata handed to the prompt builder
///
/// Every field is defined. `license` and `homepage` stay optional because
/// absent values mean the corresponding section is left out.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryMetadata {
    pub name: String,
    pub full_name: String,
    pub description: String,
    pub primary_language: String,
    pub star_count: u64,
    pub fork_count: u64,
    pub topics: Vec<String>,
    pub license: Option<String>,
    pub homepage: Option<String>,
    pub default_branch: String,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RepositoryMetadata {
    /// Maps the loose payload field by field, applying every default here
    pub fn normalize(raw: RawRepository, reference: &RepoReference) -> Self {
        let license = raw
            .license
            .and_then(|license| present(license.name).or_else(|| present(license.spdx_id)));

        Self {
            name: present(raw.name).unwrap_or_else(|| reference.repo.clone()),
            full_name: present(raw.full_name).unwrap_or_else(|| reference.to_string()),
            description: present(raw.description)
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            primary_language: present(raw.language).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            star_count: raw.stargazers_count.unwrap_or(0),
            fork_count: raw.forks_count.unwrap_or(0),
            topics: raw
                .topics
                .unwrap_or_default()
                .into_iter()
                .filter_map(|t| present(Some(t)))
                .collect(),
            license,
            homepage: present(raw.homepage),
            default_branch: present(raw.default_branch)
                .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> RepoReference {
        RepoReference {
            owner: "acme".into(),
            repo: "widget".into(),
        }
    }

    #[test]
    fn test_null_fields_get_defaults() {
        let raw: RawRepository = serde_json::from_str(
            r#"{"name": null, "description": null, "language": null,
                "topics": null, "license": null, "homepage": "", "default_branch": null}"#,
        )
        .unwrap();

        let metadata = RepositoryMetadata::normalize(raw, &reference());
        assert_eq!(metadata.name, "widget");
        assert_eq!(metadata.full_name, "acme/widget");
        assert_eq!(metadata.description, DEFAULT_DESCRIPTION);
        assert_eq!(metadata.primary_language, DEFAULT_LANGUAGE);
        assert_eq!(metadata.star_count, 0);
        assert!(metadata.topics.is_empty());
        assert_eq!(metadata.license, None);
        assert_eq!(metadata.homepage, None);
        assert_eq!(metadata.default_branch, "main");
    }

    #[test]
    fn test_full_payload_is_kept() {
        let raw: RawRepository = serde_json::from_str(
            r#"{"name": "widget", "full_name": "acme/widget", "description": "A widget",
                "language": "Go", "stargazers_count": 10, "forks_count": 2,
                "topics": ["cli", " "], "license": {"name": "MIT License", "spdx_id": "MIT"},
                "homepage": "https://widget.dev", "default_branch": "trunk",
                "private": false}"#,
        )
        .unwrap();

        let metadata = RepositoryMetadata::normalize(raw, &reference());
        assert_eq!(metadata.description, "A widget");
        assert_eq!(metadata.primary_language, "Go");
        assert_eq!(metadata.star_count, 10);
        assert_eq!(metadata.fork_count, 2);
        assert_eq!(metadata.topics, vec!["cli".to_string()]);
        assert_eq!(metadata.license.as_deref(), Some("MIT License"));
        assert_eq!(metadata.homepage.as_deref(), Some("https://widget.dev"));
        assert_eq!(metadata.default_branch, "trunk");
    }
}
