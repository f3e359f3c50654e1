/// Workspace type definitions
///
/// Pages, database schemas, items and views as they are stored and as they
/// travel over the API. JSON field names are camelCase to match the web client.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Discriminates plain document pages from database pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Document,
    Database,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Document => "document",
            PageType::Database => "database",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "document" => Some(PageType::Document),
            "database" => Some(PageType::Database),
            _ => None,
        }
    }
}

/// A titled container owned by exactly one user
///
/// Database pages carry an ordered list of column definitions; document pages
/// keep an empty schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub owner_id: String,
    #[serde(rename = "type")]
    pub page_type: PageType,
    #[serde(default)]
    pub schema: Vec<ColumnDefinition>,
}

impl Page {
    pub fn is_database(&self) -> bool {
        self.page_type == PageType::Database
    }
}

/// Declared type of a database column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Number,
    Date,
    Select,
    Multiselect,
    Status,
}

impl ColumnType {
    /// Whether `options` carries meaning for this column type
    pub fn has_options(&self) -> bool {
        matches!(self, ColumnType::Select | ColumnType::Multiselect | ColumnType::Status)
    }
}

/// One entry of a choice column's option set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    /// CSS color, e.g. "#00FF00"
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self { name: name.into(), column_type, options: None }
    }

    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = Some(options);
        self
    }

    /// Options of a choice column; stored options on any other column type are ignored
    pub fn choices(&self) -> &[SelectOption] {
        match (&self.options, self.column_type.has_options()) {
            (Some(options), true) => options,
            _ => &[],
        }
    }

    /// Resolve a stored label against the option set
    pub fn option(&self, label: &str) -> Option<&SelectOption> {
        self.choices().iter().find(|o| o.label == label)
    }
}

/// A single stored cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Number(_) => "number",
            FieldValue::Text(_) => "string",
            FieldValue::List(_) => "string array",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

/// Column name -> stored value
pub type Fields = BTreeMap<String, FieldValue>;

/// One row of a database page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub page_id: String,
    pub fields: Fields,
    pub owner_id: String,
}

impl Item {
    pub fn field(&self, column: &str) -> &FieldValue {
        self.fields.get(column).unwrap_or(&FieldValue::Null)
    }
}

/// Layout a view renders its items with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewType {
    Table,
    List,
    Gallery,
    Calendar,
    Kanban,
}

impl ViewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewType::Table => "table",
            ViewType::List => "list",
            ViewType::Gallery => "gallery",
            ViewType::Calendar => "calendar",
            ViewType::Kanban => "kanban",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "table" => Some(ViewType::Table),
            "list" => Some(ViewType::List),
            "gallery" => Some(ViewType::Gallery),
            "calendar" => Some(ViewType::Calendar),
            "kanban" => Some(ViewType::Kanban),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Per-view presentation hints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_direction: Option<SortDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kanban_field: Option<String>,
}

/// A saved presentation of a database page's items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub id: String,
    pub page_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub view_type: ViewType,
    #[serde(default)]
    pub config: ViewConfig,
    pub owner_id: String,
}

/// Partial update for a view; only supplied parts are written
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ViewConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_values_decode_from_plain_json() {
        let fields: Fields = serde_json::from_value(json!({
            "Title": "Write report",
            "Estimate": 3,
            "Tags": ["urgent", "q3"],
            "Due": null,
        }))
        .unwrap();

        assert_eq!(fields["Title"], FieldValue::Text("Write report".into()));
        assert_eq!(fields["Estimate"], FieldValue::Number(3.0));
        assert_eq!(fields["Tags"], FieldValue::List(vec!["urgent".into(), "q3".into()]));
        assert_eq!(fields["Due"], FieldValue::Null);
    }

    #[test]
    fn empty_view_config_serializes_to_empty_object() {
        assert_eq!(serde_json::to_value(ViewConfig::default()).unwrap(), json!({}));

        let config: ViewConfig =
            serde_json::from_value(json!({ "sortBy": "Due", "sortDirection": "desc" })).unwrap();
        assert_eq!(config.sort_by.as_deref(), Some("Due"));
        assert_eq!(config.sort_direction, Some(SortDirection::Desc));
    }

    #[test]
    fn options_are_ignored_on_non_choice_columns() {
        let option = SelectOption { label: "Done".into(), color: "#00FF00".into() };
        let text = ColumnDefinition::new("Notes", ColumnType::Text).with_options(vec![option.clone()]);
        let status = ColumnDefinition::new("Status", ColumnType::Status).with_options(vec![option]);

        assert!(text.option("Done").is_none());
        assert_eq!(status.option("Done").map(|o| o.color.as_str()), Some("#00FF00"));
    }
}
