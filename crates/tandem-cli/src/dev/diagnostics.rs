//! Bundler diagnostics: parsing of statistics documents and message cleanup.
//!
//! Webpack reports errors with loader chains, verbose resolver wording and
//! internal stack frames. [`format_messages`] turns a raw statistics document
//! into the short messages printed to the terminal and shown in the browser
//! overlay. Formatting is pure and idempotent.

use serde::Deserialize;
use std::fmt;

const SYNTAX_ERROR_LABEL: &str = "Syntax error:";

/// One message as found in the statistics document.
///
/// Webpack 4 prints plain strings; webpack 5 prints objects.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawMessage {
    Text(String),
    Detailed {
        message: String,
        #[serde(default, rename = "moduleName")]
        module_name: Option<String>,
    },
}

impl RawMessage {
    fn text(&self) -> String {
        match self {
            RawMessage::Text(text) => text.clone(),
            RawMessage::Detailed {
                message,
                module_name: Some(module),
            } if !message.starts_with(module.as_str()) => format!("{}\n{}", module, message),
            RawMessage::Detailed { message, .. } => message.clone(),
        }
    }
}

/// Raw `{errors, warnings}` statistics of one compiler pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawStats {
    #[serde(default)]
    pub errors: Vec<RawMessage>,
    #[serde(default)]
    pub warnings: Vec<RawMessage>,
}

impl RawStats {
    /// Parse a statistics document from bundler output.
    ///
    /// Anything printed before the opening brace or after the closing one
    /// (npm notices, progress lines) is skipped.
    pub fn from_json(output: &str) -> Option<Self> {
        let trimmed = output.trim();
        if let Ok(stats) = serde_json::from_str(trimmed) {
            return Some(stats);
        }
        let start = trimmed.find('{')?;
        let end = trimmed.rfind('}')?;
        if end <= start {
            return None;
        }
        serde_json::from_str(&trimmed[start..=end]).ok()
    }

    /// Statistics holding a single error.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            errors: vec![RawMessage::Text(message.into())],
            warnings: Vec::new(),
        }
    }
}

/// Formatted result of one compiler pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl BuildResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn outcome(&self) -> Outcome {
        if !self.errors.is_empty() {
            Outcome::Failed
        } else if !self.warnings.is_empty() {
            Outcome::Warned
        } else {
            Outcome::Succeeded
        }
    }
}

/// Which pipeline a pass belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildTarget {
    Client,
    Server,
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildTarget::Client => f.write_str("client"),
            BuildTarget::Server => f.write_str("server"),
        }
    }
}

/// Classification of a finished pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Failed,
    Warned,
    Succeeded,
}

impl Outcome {
    /// Headline printed when a pass of `target` finishes.
    pub fn headline(self, target: BuildTarget) -> String {
        match self {
            Outcome::Failed => format!("Failed to {} compile.", target),
            Outcome::Warned => format!("Compiled {} with warnings.", target),
            Outcome::Succeeded => format!("Successfully {} compiled.", target),
        }
    }
}

/// Turn raw statistics into printable messages.
///
/// When any error is a syntax error only the syntax errors are kept; they
/// usually cause every other error in the same pass.
pub fn format_messages(stats: &RawStats) -> BuildResult {
    let mut errors = format_all(&stats.errors);
    let warnings = format_all(&stats.warnings);

    if errors.iter().any(|e| is_syntax_error(e)) {
        errors.retain(|e| is_syntax_error(e));
    }

    BuildResult { errors, warnings }
}

fn format_all(messages: &[RawMessage]) -> Vec<String> {
    let mut formatted: Vec<String> = Vec::with_capacity(messages.len());
    for message in messages {
        let message = format_message(&message.text());
        if !message.is_empty() && !formatted.contains(&message) {
            formatted.push(message);
        }
    }
    formatted
}

fn is_syntax_error(message: &str) -> bool {
    message.contains(SYNTAX_ERROR_LABEL) || message.contains("SyntaxError:")
}

/// Clean up a single bundler message.
pub fn format_message(raw: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    for (index, line) in raw.lines().enumerate() {
        let mut line = line.trim_end().to_string();

        // ./~/css-loader!./~/postcss-loader!./src/App.css -> ./src/App.css
        if index == 0 && !line.contains(char::is_whitespace) {
            if let Some(pos) = line.rfind('!') {
                line = line[pos + 1..].to_string();
            }
        }

        if is_stack_frame(&line) {
            continue;
        }

        if let Some(rest) = line.strip_prefix("Module build failed: ") {
            line = rest.to_string();
        }
        if let Some(rest) = line.strip_prefix("SyntaxError:") {
            line = format!("{}{}", SYNTAX_ERROR_LABEL, rest);
        }

        line = line
            .replace(
                "Module not found: Error: Cannot resolve 'file' or 'directory'",
                "Module not found:",
            )
            .replace("Module not found: Error: Can't resolve", "Module not found:");

        // Collapse runs of blank lines
        if line.trim().is_empty() && lines.last().is_some_and(|l| l.trim().is_empty()) {
            continue;
        }
        lines.push(line);
    }

    lines.join("\n").trim().to_string()
}

fn is_stack_frame(line: &str) -> bool {
    line.starts_with(char::is_whitespace) && line.trim_start().starts_with("at ")
}
