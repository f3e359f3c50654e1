/// Per-column value formatting and editing
///
/// Maps stored values to display values and to editor widgets, and parses
/// widget input back into stored values. Choice labels that no longer
/// resolve against the column's options are shown as raw text.

use crate::workspace::types::{ColumnDefinition, ColumnType, FieldValue};
use crate::workspace::validation::parse_date;
use serde::{Deserialize, Serialize};

/// A stored value prepared for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FormattedValue {
    Empty,
    Plain { text: String },
    Date { date: String },
    Badge { badge: Badge },
    Badges { badges: Vec<Badge> },
}

/// A choice label; `color` is `None` when the label did not resolve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl FormattedValue {
    /// Plain-text rendering, used for grouping keys
    pub fn text(&self) -> Option<String> {
        match self {
            FormattedValue::Empty => None,
            FormattedValue::Plain { text } => Some(text.clone()),
            FormattedValue::Date { date } => Some(date.clone()),
            FormattedValue::Badge { badge } => Some(badge.label.clone()),
            FormattedValue::Badges { badges } => Some(
                badges.iter().map(|b| b.label.as_str()).collect::<Vec<_>>().join(", "),
            ),
        }
    }
}

/// Format a stored value for its column
pub fn format_value(value: &FieldValue, column: &ColumnDefinition) -> FormattedValue {
    match (column.column_type, value) {
        (_, FieldValue::Null) => FormattedValue::Empty,
        (ColumnType::Date, FieldValue::Text(s)) => match parse_date(s) {
            Some(date) => FormattedValue::Date { date: date.format("%Y-%m-%d").to_string() },
            None => FormattedValue::Plain { text: s.clone() },
        },
        (ColumnType::Select | ColumnType::Status, FieldValue::Text(label)) => {
            FormattedValue::Badge { badge: badge(column, label) }
        }
        (ColumnType::Multiselect, FieldValue::List(labels)) => FormattedValue::Badges {
            badges: labels.iter().map(|l| badge(column, l)).collect(),
        },
        (ColumnType::Multiselect, FieldValue::Text(label)) => FormattedValue::Badges {
            badges: vec![badge(column, label)],
        },
        (_, other) => FormattedValue::Plain { text: plain_text(other) },
    }
}

fn badge(column: &ColumnDefinition, label: &str) -> Badge {
    Badge {
        label: label.to_string(),
        color: column.option(label).map(|o| o.color.clone()),
    }
}

fn plain_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Null => String::new(),
        FieldValue::Number(n) => format_number(*n),
        FieldValue::Text(s) => s.clone(),
        FieldValue::List(items) => items.join(", "),
    }
}

/// Integers print without a fractional part
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Input widget selected for a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "widget", rename_all = "camelCase")]
pub enum FieldEditor {
    TextInput,
    NumberInput,
    DateInput,
    SingleChoice { options: Vec<String> },
    MultiChoice { options: Vec<String> },
}

pub fn editor_for(column: &ColumnDefinition) -> FieldEditor {
    let labels = || -> Vec<String> { column.choices().iter().map(|o| o.label.clone()).collect() };
    match column.column_type {
        ColumnType::Text => FieldEditor::TextInput,
        ColumnType::Number => FieldEditor::NumberInput,
        ColumnType::Date => FieldEditor::DateInput,
        ColumnType::Select | ColumnType::Status => FieldEditor::SingleChoice { options: labels() },
        ColumnType::Multiselect => FieldEditor::MultiChoice { options: labels() },
    }
}

/// Raw value as held by an editor widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorInput {
    Single(String),
    Many(Vec<String>),
}

/// Stored value -> widget value
pub fn editor_value(column: &ColumnDefinition, value: &FieldValue) -> EditorInput {
    match (column.column_type, value) {
        (ColumnType::Multiselect, FieldValue::List(labels)) => EditorInput::Many(labels.clone()),
        (ColumnType::Multiselect, FieldValue::Text(label)) => EditorInput::Many(vec![label.clone()]),
        (ColumnType::Multiselect, _) => EditorInput::Many(Vec::new()),
        (_, value) => EditorInput::Single(plain_text(value)),
    }
}

/// Widget value -> stored value
///
/// Empty input clears the cell. Number input that does not parse to a finite
/// number also clears it.
pub fn parse_input(column: &ColumnDefinition, input: EditorInput) -> FieldValue {
    match (column.column_type, input) {
        (ColumnType::Multiselect, EditorInput::Many(labels)) => FieldValue::List(labels),
        (ColumnType::Multiselect, EditorInput::Single(s)) if s.is_empty() => FieldValue::List(Vec::new()),
        (ColumnType::Multiselect, EditorInput::Single(s)) => FieldValue::List(vec![s]),
        (_, EditorInput::Many(labels)) => match labels.into_iter().next() {
            Some(first) => parse_input(column, EditorInput::Single(first)),
            None => FieldValue::Null,
        },
        (_, EditorInput::Single(s)) if s.trim().is_empty() => FieldValue::Null,
        (ColumnType::Number, EditorInput::Single(s)) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => FieldValue::Number(n),
            _ => FieldValue::Null,
        },
        (_, EditorInput::Single(s)) => FieldValue::Text(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::types::SelectOption;

    fn status() -> ColumnDefinition {
        ColumnDefinition::new("Status", ColumnType::Status).with_options(vec![
            SelectOption { label: "Todo".into(), color: "#888888".into() },
            SelectOption { label: "Done".into(), color: "#00FF00".into() },
        ])
    }

    #[test]
    fn resolves_choice_colors_and_falls_back_to_raw_text() {
        let done = format_value(&"Done".into(), &status());
        assert_eq!(
            done,
            FormattedValue::Badge {
                badge: Badge { label: "Done".into(), color: Some("#00FF00".into()) }
            }
        );

        let unknown = format_value(&"Blocked".into(), &status());
        assert_eq!(
            unknown,
            FormattedValue::Badge { badge: Badge { label: "Blocked".into(), color: None } }
        );
    }

    #[test]
    fn multiselect_formats_each_label() {
        let tags = ColumnDefinition::new("Tags", ColumnType::Multiselect).with_options(vec![
            SelectOption { label: "red".into(), color: "#FF0000".into() },
        ]);
        let value = FieldValue::List(vec!["red".into(), "blue".into()]);

        match format_value(&value, &tags) {
            FormattedValue::Badges { badges } => {
                assert_eq!(badges.len(), 2);
                assert_eq!(badges[0].color.as_deref(), Some("#FF0000"));
                assert_eq!(badges[1].color, None);
            }
            other => panic!("unexpected format: {other:?}"),
        }
    }

    #[test]
    fn formats_scalars() {
        let number = ColumnDefinition::new("Estimate", ColumnType::Number);
        let date = ColumnDefinition::new("Due", ColumnType::Date);

        assert_eq!(format_value(&FieldValue::Null, &number), FormattedValue::Empty);
        assert_eq!(format_value(&FieldValue::Number(3.0), &number).text().as_deref(), Some("3"));
        assert_eq!(format_value(&FieldValue::Number(2.5), &number).text().as_deref(), Some("2.5"));
        assert_eq!(
            format_value(&"2024-03-01T09:30:00Z".into(), &date),
            FormattedValue::Date { date: "2024-03-01".into() }
        );
        assert_eq!(
            format_value(&"soon".into(), &date),
            FormattedValue::Plain { text: "soon".into() }
        );
    }

    #[test]
    fn selects_editor_per_column_type() {
        assert_eq!(
            editor_for(&status()),
            FieldEditor::SingleChoice { options: vec!["Todo".into(), "Done".into()] }
        );
        assert_eq!(
            editor_for(&ColumnDefinition::new("Due", ColumnType::Date)),
            FieldEditor::DateInput
        );
    }

    #[test]
    fn parses_widget_input_back_to_values() {
        let number = ColumnDefinition::new("Estimate", ColumnType::Number);
        let tags = ColumnDefinition::new("Tags", ColumnType::Multiselect);

        assert_eq!(parse_input(&number, EditorInput::Single("4".into())), FieldValue::Number(4.0));
        assert_eq!(parse_input(&number, EditorInput::Single("four".into())), FieldValue::Null);
        assert_eq!(parse_input(&number, EditorInput::Single("".into())), FieldValue::Null);
        assert_eq!(
            parse_input(&status(), EditorInput::Single("Done".into())),
            FieldValue::Text("Done".into())
        );
        assert_eq!(
            parse_input(&tags, EditorInput::Many(vec!["a".into(), "b".into()])),
            FieldValue::List(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn editor_value_mirrors_parse_input() {
        let number = ColumnDefinition::new("Estimate", ColumnType::Number);
        let input = editor_value(&number, &FieldValue::Number(7.0));
        assert_eq!(input, EditorInput::Single("7".into()));
        assert_eq!(parse_input(&number, input), FieldValue::Number(7.0));
    }
}
