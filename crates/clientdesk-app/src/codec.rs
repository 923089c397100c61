// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Conversion between stored field values and their single-line editing text.

use crate::{FieldKind, FieldValue};

const LIST_SEPARATOR: &str = ", ";

/// Splits comma separated text into trimmed, non-empty tokens. Order and
/// duplicates are preserved.
pub fn parse_multi_value(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

pub fn format_multi_value(tokens: &[String]) -> String {
    tokens.join(LIST_SEPARATOR)
}

/// Replaces the token being typed with `suggestion`.
///
/// Text without a comma is replaced wholesale. Otherwise only the text after
/// the last comma is replaced (an empty tail appends a new token) and every
/// comma, together with its surrounding whitespace, becomes `", "`.
pub fn merge_suggestion_into_multi_value(current: &str, suggestion: &str) -> String {
    let Some((head, _partial)) = current.rsplit_once(',') else {
        return suggestion.to_owned();
    };

    let mut parts = head.split(',').collect::<Vec<_>>();
    parts.push(suggestion);
    let last = parts.len() - 1;
    parts
        .iter()
        .enumerate()
        .map(|(index, part)| match index {
            0 => part.trim_end(),
            index if index == last => part.trim_start(),
            _ => part.trim(),
        })
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

/// The partial token after the last comma, trimmed. Used to narrow
/// suggestion lists while typing.
pub fn trailing_token(current: &str) -> &str {
    current
        .rsplit_once(',')
        .map_or(current, |(_, tail)| tail)
        .trim()
}

pub fn display_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(text) => text.clone().unwrap_or_default(),
        FieldValue::List(tokens) => format_multi_value(tokens),
        FieldValue::Flag(true) => "yes".to_owned(),
        FieldValue::Flag(false) => "no".to_owned(),
    }
}

/// Parses cell text for a field kind. Empty scalar text means absent. Flags
/// are toggled, never typed, so they have no text form.
pub fn parse_cell_text(kind: FieldKind, text: &str) -> Option<FieldValue> {
    match kind {
        FieldKind::Text => Some(FieldValue::Text(if text.is_empty() {
            None
        } else {
            Some(text.to_owned())
        })),
        FieldKind::List => Some(FieldValue::List(parse_multi_value(text))),
        FieldKind::Flag => None,
    }
}
