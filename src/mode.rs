//! Caller-selected tracks and the per-request generation state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReadmeError;

/// Generation track selected by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallerMode {
    /// README for an existing repository
    Readme,
    /// README template from a project description
    Template,
}

impl CallerMode {
    /// Wire name, also used as the session key suffix
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Readme => "readme",
            Self::Template => "template",
        }
    }
}

impl fmt::Display for CallerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallerMode {
    type Err = ReadmeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "readme" => Ok(Self::Readme),
            "template" => Ok(Self::Template),
            other => Err(ReadmeError::InvalidMode(Some(other.to_string()))),
        }
    }
}

/// Resolved state for one request; never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Fresh README built from repository metadata
    NewWithReference,
    /// Fresh template built from the description alone
    NewFromDescription,
    /// Edit of the previously generated document
    Iteration,
}

impl GenerationMode {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewWithReference => "new_with_reference",
            Self::NewFromDescription => "new_from_description",
            Self::Iteration => "iteration",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a request.
///
/// `has_reference` is true when the input contained any repository
/// reference; `has_prior` when a live session record exists for the
/// session and caller mode.
pub fn resolve_mode(
    caller: CallerMode,
    has_reference: bool,
    has_prior: bool,
) -> Result<GenerationMode, ReadmeError> {
    match (caller, has_reference, has_prior) {
        (CallerMode::Readme, true, _) => Ok(GenerationMode::NewWithReference),
        (CallerMode::Readme, false, true) => Ok(GenerationMode::Iteration),
        (CallerMode::Readme, false, false) => Err(ReadmeError::UrlRequired),
        (CallerMode::Template, true, _) => Err(ReadmeError::UrlNotAllowed),
        (CallerMode::Template, false, true) => Ok(GenerationMode::Iteration),
        (CallerMode::Template, false, false) => Ok(GenerationMode::NewFromDescription),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(CallerMode::Readme, true, false => Some(GenerationMode::NewWithReference) ; "readme with reference")]
    #[test_case(CallerMode::Readme, true, true => Some(GenerationMode::NewWithReference) ; "readme reference beats prior")]
    #[test_case(CallerMode::Readme, false, true => Some(GenerationMode::Iteration) ; "readme iteration")]
    #[test_case(CallerMode::Readme, false, false => None ; "readme needs reference")]
    #[test_case(CallerMode::Template, false, false => Some(GenerationMode::NewFromDescription) ; "fresh template")]
    #[test_case(CallerMode::Template, false, true => Some(GenerationMode::Iteration) ; "template iteration")]
    #[test_case(CallerMode::Template, true, false => None ; "template rejects reference")]
    #[test_case(CallerMode::Template, true, true => None ; "template rejects reference with prior")]
    fn transition_table(caller: CallerMode, reference: bool, prior: bool) -> Option<GenerationMode> {
        resolve_mode(caller, reference, prior).ok()
    }

    #[test]
    fn test_error_kinds() {
        let err = resolve_mode(CallerMode::Readme, false, false).unwrap_err();
        assert_eq!(err.kind(), "url_required");

        let err = resolve_mode(CallerMode::Template, true, true).unwrap_err();
        assert_eq!(err.kind(), "url_not_allowed");
    }

    #[test]
    fn test_caller_mode_parsing() {
        assert_eq!("readme".parse::<CallerMode>().unwrap(), CallerMode::Readme);
        assert_eq!("template".parse::<CallerMode>().unwrap(), CallerMode::Template);

        let err = "README".parse::<CallerMode>().unwrap_err();
        assert_eq!(err.kind(), "invalid_mode");
    }

    #[test]
    fn test_generation_mode_wire_names() {
        let json = serde_json::to_string(&GenerationMode::NewWithReference).unwrap();
        assert_eq!(json, "\"new_with_reference\"");
        assert_eq!(GenerationMode::Iteration.to_string(), "iteration");
    }
}
