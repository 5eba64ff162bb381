//! Mode-specific instruction sets for the language model.
//!
//! Each [`GenerationMode`] maps to a static [`PromptTemplate`]: an ordered
//! list of [`Section`]s. Value-bearing sections name the [`Slot`] they are
//! filled from and whether the slot is required (rendered with a fixed
//! fallback when absent) or optional (left out when absent). The
//! anti-fabrication rules are plain data inside the templates, so they can
//! be inspected and tested without rendering.
//!
//! Rendering is pure and deterministic. Every user-derived value has its
//! code-fence markers escaped so the rendered prompt never contains a run
//! of three backticks.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::github::RepositoryMetadata;
use crate::mode::GenerationMode;

/// Placeholder the model must use for missing required information
pub const MISSING_PLACEHOLDER: &str = "[To be added]";

/// Placeholder the model must use for installation commands in templates
pub const INSTALL_PLACEHOLDER: &str = "[Install command here]";

static FENCE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`{3,}").expect("fence run pattern is valid"));

static SLOT_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").expect("slot token pattern is valid"));

/// Named value a section is filled from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Repository name
    Name,
    /// Repository description
    Description,
    /// Primary language
    Language,
    /// Star count
    Stars,
    /// Fork count
    Forks,
    /// Comma separated topics; absent when there are none
    Topics,
    /// License name
    License,
    /// Homepage URL
    Homepage,
    /// Default branch
    DefaultBranch,
    /// The user's free text with references removed
    Request,
    /// Document produced by the previous turn
    PreviousDocument,
}

impl Slot {
    const ALL: [Slot; 11] = [
        Slot::Name,
        Slot::Description,
        Slot::Language,
        Slot::Stars,
        Slot::Forks,
        Slot::Topics,
        Slot::License,
        Slot::Homepage,
        Slot::DefaultBranch,
        Slot::Request,
        Slot::PreviousDocument,
    ];

    /// Token name used for `{key}` substitution in fixed text
    pub fn key(self) -> &'static str {
        match self {
            Slot::Name => "name",
            Slot::Description => "description",
            Slot::Language => "language",
            Slot::Stars => "stars",
            Slot::Forks => "forks",
            Slot::Topics => "topics",
            Slot::License => "license",
            Slot::Homepage => "homepage",
            Slot::DefaultBranch => "default_branch",
            Slot::Request => "request",
            Slot::PreviousDocument => "previous_document",
        }
    }

    fn from_key(key: &str) -> Option<Slot> {
        Slot::ALL.into_iter().find(|slot| slot.key() == key)
    }

    /// Text rendered for a required slot that has no value
    pub fn absent_text(self) -> &'static str {
        match self {
            Slot::License => "No license specified",
            Slot::Language => "Not specified",
            Slot::PreviousDocument => "(no previous document)",
            _ => "None",
        }
    }

    fn resolve(self, inputs: &PromptInputs<'_>) -> Option<String> {
        let metadata = inputs.metadata;
        let value = match self {
            Slot::Name => metadata.map(|m| m.name.clone()),
            Slot::Description => metadata.map(|m| m.description.clone()),
            Slot::Language => metadata.map(|m| m.primary_language.clone()),
            Slot::Stars => metadata.map(|m| m.star_count.to_string()),
            Slot::Forks => metadata.map(|m| m.fork_count.to_string()),
            Slot::Topics => metadata
                .filter(|m| !m.topics.is_empty())
                .map(|m| m.topics.join(", ")),
            Slot::License => metadata.and_then(|m| m.license.clone()),
            Slot::Homepage => metadata.and_then(|m| m.homepage.clone()),
            Slot::DefaultBranch => metadata.map(|m| m.default_branch.clone()),
            Slot::Request => Some(inputs.free_text.trim().to_string()).filter(|t| !t.is_empty()),
            Slot::PreviousDocument => inputs.previous_document.map(str::to_string),
        };
        value.map(|v| escape_fences(&v))
    }

    fn render(self, presence: Presence, inputs: &PromptInputs<'_>) -> Option<String> {
        match (self.resolve(inputs), presence) {
            (Some(value), _) => Some(value),
            (None, Presence::Required) => Some(self.absent_text().to_string()),
            (None, Presence::Optional) => None,
        }
    }
}

/// Whether a slot must appear in the rendered prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Rendered with [`Slot::absent_text`] when the slot has no value
    Required,
    /// Left out entirely when the slot has no value
    Optional,
}

/// One `- Label: value` line inside a [`Section::Fields`] block
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// Line label
    pub label: &'static str,
    /// Value source
    pub slot: Slot,
    /// Fill rule
    pub presence: Presence,
}

/// One numbered entry of a [`Section::Outline`]
#[derive(Debug, Clone, Copy)]
pub struct OutlineItem {
    /// Entry text; may contain `{key}` slot tokens
    pub text: &'static str,
    /// Entry is left out unless this slot has a value
    pub requires: Option<Slot>,
}

/// Building block of a template, rendered as one paragraph
#[derive(Debug, Clone, Copy)]
pub enum Section {
    /// Fixed prose; may contain `{key}` slot tokens
    Text(&'static str),
    /// `Label: value`
    Labeled {
        /// Label
        label: &'static str,
        /// Value source
        slot: Slot,
        /// Fill rule
        presence: Presence,
    },
    /// `Label: "value"`
    Quoted {
        /// Label
        label: &'static str,
        /// Value source
        slot: Slot,
        /// Fill rule
        presence: Presence,
    },
    /// `Label:` followed by the value verbatim on the next lines
    Block {
        /// Label
        label: &'static str,
        /// Value source
        slot: Slot,
        /// Fill rule
        presence: Presence,
    },
    /// Heading followed by `- label: value` lines
    Fields {
        /// Heading
        heading: &'static str,
        /// Lines in order
        fields: &'static [Field],
    },
    /// Heading followed by `- rule` lines
    Rules {
        /// Heading
        heading: &'static str,
        /// Rules in order; may contain `{key}` slot tokens
        rules: &'static [&'static str],
    },
    /// Heading followed by numbered entries; numbering skips omitted entries
    Outline {
        /// Heading
        heading: &'static str,
        /// Entries in order
        items: &'static [OutlineItem],
    },
}

/// Values available to a template
#[derive(Debug, Clone, Copy)]
pub struct PromptInputs<'a> {
    /// Normalized repository metadata, if a reference was fetched
    pub metadata: Option<&'a RepositoryMetadata>,
    /// Free text with references removed
    pub free_text: &'a str,
    /// Previous document, for iterations
    pub previous_document: Option<&'a str>,
}

/// Ordered sections making up the instructions for one mode
#[derive(Debug)]
pub struct PromptTemplate {
    /// Mode this template serves
    pub mode: GenerationMode,
    /// Sections in render order
    pub sections: &'static [Section],
}

impl PromptTemplate {
    /// Every rule line in the template, unrendered
    pub fn rules(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.sections.iter().flat_map(|section| {
            let rules: &'static [&'static str] = match section {
                Section::Rules { rules, .. } => *rules,
                _ => &[],
            };
            rules.iter().copied()
        })
    }

    /// Renders all sections, separated by blank lines
    pub fn render(&self, inputs: &PromptInputs<'_>) -> String {
        self.sections
            .iter()
            .filter_map(|section| render_section(section, inputs))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn render_section(section: &Section, inputs: &PromptInputs<'_>) -> Option<String> {
    match *section {
        Section::Text(text) => Some(interpolate(text, inputs)),
        Section::Labeled { label, slot, presence } => slot
            .render(presence, inputs)
            .map(|value| format!("{label}: {value}")),
        Section::Quoted { label, slot, presence } => slot
            .render(presence, inputs)
            .map(|value| format!("{label}: \"{value}\"")),
        Section::Block { label, slot, presence } => slot
            .render(presence, inputs)
            .map(|value| format!("{label}:\n{value}")),
        Section::Fields { heading, fields } => {
            let mut lines = vec![format!("{heading}:")];
            lines.extend(fields.iter().filter_map(|field| {
                field
                    .slot
                    .render(field.presence, inputs)
                    .map(|value| format!("- {}: {}", field.label, value))
            }));
            Some(lines.join("\n"))
        }
        Section::Rules { heading, rules } => {
            let mut lines = vec![format!("{heading}:")];
            lines.extend(rules.iter().map(|rule| format!("- {}", interpolate(rule, inputs))));
            Some(lines.join("\n"))
        }
        Section::Outline { heading, items } => {
            let mut lines = vec![heading.to_string()];
            let included = items.iter().filter(|item| {
                item.requires
                    .map_or(true, |slot| slot.resolve(inputs).is_some())
            });
            lines.extend(
                included
                    .enumerate()
                    .map(|(i, item)| format!("{}. {}", i + 1, interpolate(item.text, inputs))),
            );
            Some(lines.join("\n"))
        }
    }
}

/// Replaces `{key}` slot tokens in fixed text; unknown tokens are kept
fn interpolate(text: &str, inputs: &PromptInputs<'_>) -> String {
    SLOT_TOKEN
        .replace_all(text, |caps: &Captures<'_>| match Slot::from_key(&caps[1]) {
            Some(slot) => slot
                .resolve(inputs)
                .unwrap_or_else(|| slot.absent_text().to_string()),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Escapes code-fence markers so the value cannot open or close a fence
///
/// Every backtick in a run of three or more is escaped, so no unescaped
/// pair can combine with a neighbour into a new fence.
pub fn escape_fences(value: &str) -> String {
    FENCE_RUN
        .replace_all(value, |caps: &Captures<'_>| "\\`".repeat(caps[0].len()))
        .into_owned()
}

static ITERATION: PromptTemplate = PromptTemplate {
    mode: GenerationMode::Iteration,
    sections: &[
        Section::Text("You are a professional README editor."),
        Section::Block {
            label: "Current README",
            slot: Slot::PreviousDocument,
            presence: Presence::Required,
        },
        Section::Quoted {
            label: "User's modification request",
            slot: Slot::Request,
            presence: Presence::Required,
        },
        Section::Rules {
            heading: "Instructions",
            rules: &[
                "Apply only the changes requested by the user",
                "Do NOT invent any new information",
                "Keep all other sections unchanged",
                "Return the COMPLETE updated README (not just modified parts)",
                "Runs of escaped backticks such as \\`\\`\\` in the current README stand for code fences; write them as plain backticks",
                "Output only markdown content, do not wrap the document in code fences",
            ],
        },
    ],
};

static NEW_WITH_REFERENCE: PromptTemplate = PromptTemplate {
    mode: GenerationMode::NewWithReference,
    sections: &[
        Section::Text(
            "You are a professional README generator. Create comprehensive, well-organized READMEs.",
        ),
        Section::Fields {
            heading: "Repository Information",
            fields: &[
                Field { label: "Name", slot: Slot::Name, presence: Presence::Required },
                Field { label: "Description", slot: Slot::Description, presence: Presence::Required },
                Field { label: "Language", slot: Slot::Language, presence: Presence::Required },
                Field { label: "Stars", slot: Slot::Stars, presence: Presence::Required },
                Field { label: "Forks", slot: Slot::Forks, presence: Presence::Required },
                Field { label: "Topics", slot: Slot::Topics, presence: Presence::Optional },
                Field { label: "License", slot: Slot::License, presence: Presence::Required },
                Field { label: "Homepage", slot: Slot::Homepage, presence: Presence::Optional },
                Field { label: "Default Branch", slot: Slot::DefaultBranch, presence: Presence::Required },
            ],
        },
        Section::Quoted {
            label: "Additional requirements from user",
            slot: Slot::Request,
            presence: Presence::Optional,
        },
        Section::Rules {
            heading: "CRITICAL RULES",
            rules: &[
                "Do NOT invent contact information (emails, social media, author names)",
                "Do NOT invent specific features not mentioned in the description",
                "Do NOT invent external URLs or resources not provided",
                "For installation: use appropriate generic commands for {language}",
                "Write professional, complete sections even when specific details are limited",
                "Provide helpful generic examples for usage sections",
                "Do NOT add \"Contact\" or \"Authors\" sections",
                "Do NOT add topic or homepage sections unless they are listed above",
                "Output only markdown, do not wrap the document in code fences",
            ],
        },
        Section::Outline {
            heading: "Generate a complete, professional README with these sections:",
            items: &[
                OutlineItem { text: "Title (# {name})", requires: None },
                OutlineItem {
                    text: "Description - comprehensive explanation of what the project does",
                    requires: None,
                },
                OutlineItem {
                    text: "Installation - language-appropriate generic instructions",
                    requires: None,
                },
                OutlineItem { text: "Usage - helpful generic examples", requires: None },
                OutlineItem {
                    text: "Contributing - standard contribution guidelines",
                    requires: None,
                },
                OutlineItem { text: "License - state: {license}", requires: None },
                OutlineItem { text: "Topics/Tags: {topics}", requires: Some(Slot::Topics) },
                OutlineItem { text: "Homepage: {homepage}", requires: Some(Slot::Homepage) },
            ],
        },
    ],
};

static NEW_FROM_DESCRIPTION: PromptTemplate = PromptTemplate {
    mode: GenerationMode::NewFromDescription,
    sections: &[
        Section::Text(
            "You are a professional README Template generator. Create clean, well-organized README templates.",
        ),
        Section::Rules {
            heading: "CRITICAL RULES",
            rules: &[
                "Use ONLY the information from the user's project description",
                "Do NOT invent contact information (emails, phone numbers, social media handles)",
                "Do NOT invent specific installation commands beyond generic placeholders",
                "Do NOT invent project features not mentioned in the description",
                "Do NOT invent URLs, links, or external resources not provided",
                "For the Installation section: use generic placeholders like \"[Install command here]\"",
                "If critical information is missing, use \"[To be added]\" as placeholder",
                "Do NOT add \"Contact\" or \"Authors\" sections",
                "Output only markdown content, do not wrap the document in code fences",
            ],
        },
        Section::Labeled {
            label: "Project description",
            slot: Slot::Request,
            presence: Presence::Required,
        },
        Section::Text(
            "Generate a professional README template. Use generic placeholders for sections where specific information is not provided.",
        ),
        Section::Outline {
            heading: "Required/Core Sections:",
            items: &[
                OutlineItem { text: "Title - Project name", requires: None },
                OutlineItem { text: "Description - What the project does", requires: None },
                OutlineItem { text: "Installation - How to install", requires: None },
                OutlineItem { text: "Usage - How to use it", requires: None },
                OutlineItem { text: "Contributing - How to contribute (generic)", requires: None },
                OutlineItem { text: "License - License info", requires: None },
            ],
        },
    ],
};

/// Static template serving `mode`
pub fn template_for(mode: GenerationMode) -> &'static PromptTemplate {
    match mode {
        GenerationMode::Iteration => &ITERATION,
        GenerationMode::NewWithReference => &NEW_WITH_REFERENCE,
        GenerationMode::NewFromDescription => &NEW_FROM_DESCRIPTION,
    }
}

/// Renders the instructions for one request
pub fn build_prompt(
    mode: GenerationMode,
    metadata: Option<&RepositoryMetadata>,
    free_text: &str,
    previous_document: Option<&str>,
) -> String {
    let inputs = PromptInputs {
        metadata,
        free_text,
        previous_document,
    };
    template_for(mode).render(&inputs)
}
