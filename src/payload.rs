//! Record → webhook payload transformation.
//!
//! All lengths are counted in Unicode scalar values and every cut happens
//! on a character boundary, so truncation can never split a multi-byte
//! character.

use crate::record::{ExceptionInfo, LogRecord};
use crate::severity::StyleTable;
use serde::Serialize;

/// Marker appended to truncated text.
pub const ELLIPSIS: &str = "...";
/// Limit used by [`truncate_default`].
pub const DEFAULT_TRUNCATE_LIMIT: usize = 1000;
/// Budget for the first message line before the emoji is prepended.
pub const TITLE_TEXT_LIMIT: usize = 200;
/// Absolute cap for the rendered title.
pub const TITLE_LIMIT: usize = 250;
/// Documented embed description limit of the webhook API.
pub const DESCRIPTION_LIMIT: usize = 2000;
/// Documented embed field value limit of the webhook API.
pub const FIELD_VALUE_LIMIT: usize = 1024;

const EXCEPTION_TYPE_LIMIT: usize = 100;
const EXCEPTION_MESSAGE_LIMIT: usize = 500;
const MIN_TRACEBACK_BUDGET: usize = 20;
const SECTION_SEPARATOR: &str = "\n\n";
const CODE_OPEN: &str = "\n```\n";
const CODE_CLOSE: &str = "\n```";
const NONE: &str = "None";

/// Body POSTed to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationPayload {
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: u32,
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
}

impl EmbedField {
    fn new(name: &str, value: Option<String>) -> Self {
        EmbedField {
            name: name.to_string(),
            value: value
                .map(|v| truncate(&v, FIELD_VALUE_LIMIT))
                .unwrap_or_else(|| NONE.to_string()),
        }
    }
}

/// Bound `text` to at most `limit` characters.
///
/// Text that already fits is returned unchanged. Otherwise the result is a
/// prefix of `text` followed by [`ELLIPSIS`], sized so the whole string
/// still fits; for limits shorter than the marker, the marker itself is cut.
pub fn truncate(text: &str, limit: usize) -> String {
    if text.len() <= limit || text.chars().count() <= limit {
        return text.to_string();
    }
    let marker_len = ELLIPSIS.chars().count();
    if limit < marker_len {
        return ELLIPSIS.chars().take(limit).collect();
    }
    let mut out: String = text.chars().take(limit - marker_len).collect();
    out.push_str(ELLIPSIS);
    out
}

/// [`truncate`] with [`DEFAULT_TRUNCATE_LIMIT`].
pub fn truncate_default(text: &str) -> String {
    truncate(text, DEFAULT_TRUNCATE_LIMIT)
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Builds bounded notification payloads from log records.
#[derive(Debug, Clone, Default)]
pub struct PayloadBuilder {
    styles: StyleTable,
}

impl PayloadBuilder {
    pub fn new(styles: StyleTable) -> Self {
        PayloadBuilder { styles }
    }

    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    /// Render `record` as a single-embed payload. Never fails.
    pub fn build(&self, record: &LogRecord) -> NotificationPayload {
        let style = self.styles.style_for(record.severity);

        let mut lines = record.message.lines();
        let first_line = lines.next().map(str::trim_end).unwrap_or("");
        let headline = if first_line.trim_start().is_empty() {
            style.name.as_str()
        } else {
            first_line
        };
        let title = truncate(
            &format!("{} {}", style.emoji, truncate(headline, TITLE_TEXT_LIMIT)),
            TITLE_LIMIT,
        );

        let body = lines.collect::<Vec<_>>().join("\n");
        let body = if body.trim().is_empty() { String::new() } else { body };
        let description = match &record.exception {
            Some(exception) => with_exception(&body, exception),
            None => body,
        };
        let description = truncate(&description, DESCRIPTION_LIMIT);

        let fields = vec![
            EmbedField::new("Status", record.status_code.map(|code| format!("**{}**", code))),
            EmbedField::new("Level", Some(style.name.clone())),
            EmbedField::new("Scope", record.logger.clone()),
            EmbedField::new("Module", record.module.clone()),
            EmbedField::new("User", record.user.clone()),
            EmbedField::new(
                "Filename",
                record.file.as_ref().map(|file| match record.line {
                    Some(line) => format!("{}:{}", file, line),
                    None => file.clone(),
                }),
            ),
        ];

        NotificationPayload {
            embeds: vec![Embed {
                title,
                description: if description.is_empty() {
                    None
                } else {
                    Some(description)
                },
                color: style.color,
                fields,
            }],
        }
    }
}

/// Append the exception section to `body`.
///
/// The body is cut first so the `EXCEPTION` header and type name always
/// fit; the traceback only gets whatever budget is left.
fn with_exception(body: &str, exception: &ExceptionInfo) -> String {
    let mut section = format!(
        "**EXCEPTION** `{}`",
        truncate(&exception.type_name, EXCEPTION_TYPE_LIMIT)
    );
    if !exception.message.is_empty() {
        section.push('\n');
        section.push_str(&truncate(&exception.message, EXCEPTION_MESSAGE_LIMIT));
    }

    let mut description = if body.is_empty() {
        section
    } else {
        let budget = DESCRIPTION_LIMIT
            .saturating_sub(char_len(&section) + char_len(SECTION_SEPARATOR));
        format!("{}{}{}", truncate(body, budget), SECTION_SEPARATOR, section)
    };

    if let Some(traceback) = exception.traceback.as_deref().filter(|t| !t.trim().is_empty()) {
        let overhead = char_len(CODE_OPEN) + char_len(CODE_CLOSE);
        let remaining = DESCRIPTION_LIMIT.saturating_sub(char_len(&description) + overhead);
        if remaining >= MIN_TRACEBACK_BUDGET {
            description.push_str(CODE_OPEN);
            description.push_str(&truncate(traceback, remaining));
            description.push_str(CODE_CLOSE);
        }
    }

    description
}
