//! Input screening performed before any external call.

use std::fmt;

/// Minimum number of characters after trimming
pub const MIN_INPUT_CHARS: usize = 5;

/// Length of a run of one repeated character treated as spam
pub const SPAM_RUN_LENGTH: usize = 16;

/// Reason an input was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRejection {
    /// Fewer than [`MIN_INPUT_CHARS`] characters after trimming
    TooShort,
    /// No alphabetic character anywhere
    NoLetters,
    /// A run of [`SPAM_RUN_LENGTH`] or more identical characters
    RepeatedCharacters,
}

impl fmt::Display for InputRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort => write!(
                f,
                "Input is too short (minimum {MIN_INPUT_CHARS} characters)"
            ),
            Self::NoLetters => write!(f, "Input must contain letters"),
            Self::RepeatedCharacters => write!(f, "Invalid input pattern detected"),
        }
    }
}

/// Checks free-form user text.
///
/// Pure function; callers short-circuit the whole pipeline on `Err`.
pub fn validate_input(text: &str) -> Result<(), InputRejection> {
    let trimmed = text.trim();

    if trimmed.chars().count() < MIN_INPUT_CHARS {
        return Err(InputRejection::TooShort);
    }

    if !trimmed.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(InputRejection::NoLetters);
    }

    if longest_run(trimmed) >= SPAM_RUN_LENGTH {
        return Err(InputRejection::RepeatedCharacters);
    }

    Ok(())
}

fn longest_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut previous = None;

    for c in text.chars() {
        if Some(c) == previous {
            current += 1;
        } else {
            current = 1;
            previous = Some(c);
        }
        longest = longest.max(current);
    }

    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("" ; "empty")]
    #[test_case("    " ; "whitespace only")]
    #[test_case("abcd" ; "four letters")]
    #[test_case("  ab  " ; "short after trim")]
    fn rejects_short_input(text: &str) {
        assert_eq!(validate_input(text), Err(InputRejection::TooShort));
    }

    #[test_case("12345" ; "digits")]
    #[test_case("!!!???..." ; "punctuation")]
    #[test_case("12 34 56 78" ; "spaced digits")]
    fn rejects_input_without_letters(text: &str) {
        assert_eq!(validate_input(text), Err(InputRejection::NoLetters));
    }

    #[test]
    fn test_spam_run_boundary() {
        let fifteen = format!("hello {}", "a".repeat(15));
        let sixteen = format!("hello {}", "a".repeat(16));

        assert_eq!(validate_input(&fifteen), Ok(()));
        assert_eq!(
            validate_input(&sixteen),
            Err(InputRejection::RepeatedCharacters)
        );
    }

    #[test]
    fn test_accepts_reasonable_text() {
        assert!(validate_input("A CLI tool for parsing logs").is_ok());
        assert!(validate_input("https://github.com/foo/bar").is_ok());
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            InputRejection::TooShort.to_string(),
            "Input is too short (minimum 5 characters)"
        );
        assert_eq!(
            InputRejection::NoLetters.to_string(),
            "Input must contain letters"
        );
    }
}
