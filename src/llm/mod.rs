//! Language model invocation and response normalization.

mod client;
pub mod types;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::CompletionError;

pub use client::ChatCompletionClient;

static LEADING_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\A```[a-z0-9_+-]*[ \t]*(?:\r?\n|\z)").expect("leading fence pattern is valid")
});

static TRAILING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\r?\n)?```[ \t]*\z").expect("trailing fence pattern is valid"));

/// Turns a rendered prompt into a markdown document
#[async_trait]
pub trait DocumentGenerator: Send + Sync {
    /// Runs one completion; the result is raw markdown, never fenced
    async fn generate(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Removes a code-fence wrapper the model put around its whole answer.
///
/// The closing fence is only removed together with an opening one, so a
/// document that merely ends in a code block keeps it.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some(opening) = LEADING_FENCE.find(trimmed) else {
        return trimmed.to_string();
    };

    let body = &trimmed[opening.end()..];
    TRAILING_FENCE.replace(body, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strips_markdown_fence() {
        let raw = "```markdown\n# widget\n\nA widget\n```";
        assert_eq!(strip_code_fences(raw), "# widget\n\nA widget");
    }

    #[test]
    fn test_strips_case_insensitive_and_bare_fences() {
        assert_eq!(strip_code_fences("```Markdown\n# A\n```\n"), "# A");
        assert_eq!(strip_code_fences("```\n# A\n```"), "# A");
        assert_eq!(strip_code_fences("  \n```md\r\n# A\r\n```  \n"), "# A");
    }

    #[test]
    fn test_keeps_inner_code_blocks() {
        let raw = "```markdown\n# A\n\n```bash\nmake\n```\n```";
        assert_eq!(strip_code_fences(raw), "# A\n\n```bash\nmake\n```");
    }

    #[test]
    fn test_unwrapped_document_is_only_trimmed() {
        assert_eq!(strip_code_fences("\n# A\n\n```sh\nmake\n```\n"), "# A\n\n```sh\nmake\n```");
        assert_eq!(strip_code_fences("  plain text  "), "plain text");
    }

    #[test]
    fn test_unterminated_fence() {
        assert_eq!(strip_code_fences("```markdown\n# A\ntruncated"), "# A\ntruncated");
    }
}
