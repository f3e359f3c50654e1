/// View dispatch
///
/// Given a view and a page's items and schema, produce the layout for the
/// view's type. Every layout is a plain serializable structure so any client
/// can draw it. Calendar and kanban layouts need a configured field and
/// return a configuration prompt without one.

use crate::render::field::{format_value, FormattedValue};
use crate::workspace::types::{
    ColumnDefinition, ColumnType, FieldValue, Item, SortDirection, View, ViewConfig, ViewType,
};
use crate::workspace::validation::parse_date;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub const NO_VIEWS_PROMPT: &str = "Create a view to get started";
pub const CALENDAR_PROMPT: &str = "Please configure a date field for the calendar view";
pub const KANBAN_PROMPT: &str = "Please configure a status field for the kanban view";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "camelCase")]
pub enum Layout {
    Table { columns: Vec<String>, groups: Vec<Group<Row>> },
    List { groups: Vec<Group<Card>> },
    Gallery { groups: Vec<Group<Card>> },
    Calendar { field: String, days: Vec<CalendarDay>, undated: Vec<Card> },
    Kanban { field: String, lanes: Vec<Lane> },
    Prompt { message: String },
}

/// Rows sharing a `groupBy` value; a single unkeyed group when no grouping is set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group<T> {
    pub key: Option<String>,
    pub entries: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub item_id: String,
    pub cells: Vec<FormattedValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub item_id: String,
    pub fields: Vec<CardField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardField {
    pub column: String,
    pub value: FormattedValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    /// ISO date, `YYYY-MM-DD`
    pub date: String,
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    /// `None` collects items with no value
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub cards: Vec<Card>,
}

/// Layout for a page that has no views yet
pub fn no_views() -> Layout {
    Layout::Prompt { message: NO_VIEWS_PROMPT.to_string() }
}

/// Select and build the layout for `view`
pub fn render(view: &View, items: &[Item], schema: &[ColumnDefinition]) -> Layout {
    let sorted = sort_items(items, &view.config, schema);

    match view.view_type {
        ViewType::Table => Layout::Table {
            columns: schema.iter().map(|c| c.name.clone()).collect(),
            groups: group_by(&sorted, &view.config, schema, |item| row(item, schema)),
        },
        ViewType::List => Layout::List {
            groups: group_by(&sorted, &view.config, schema, |item| card(item, schema)),
        },
        ViewType::Gallery => Layout::Gallery {
            groups: group_by(&sorted, &view.config, schema, |item| card(item, schema)),
        },
        ViewType::Calendar => match &view.config.calendar_field {
            Some(field) => calendar(field, &sorted, schema),
            None => Layout::Prompt { message: CALENDAR_PROMPT.to_string() },
        },
        ViewType::Kanban => match &view.config.kanban_field {
            Some(field) => kanban(field, &sorted, schema),
            None => Layout::Prompt { message: KANBAN_PROMPT.to_string() },
        },
    }
}

fn row(item: &Item, schema: &[ColumnDefinition]) -> Row {
    Row {
        item_id: item.id.clone(),
        cells: schema.iter().map(|c| format_value(item.field(&c.name), c)).collect(),
    }
}

fn card(item: &Item, schema: &[ColumnDefinition]) -> Card {
    Card {
        item_id: item.id.clone(),
        fields: schema
            .iter()
            .map(|c| CardField {
                column: c.name.clone(),
                value: format_value(item.field(&c.name), c),
            })
            .collect(),
    }
}

/// Order items by `sortBy`; items without a value always come last
fn sort_items<'a>(items: &'a [Item], config: &ViewConfig, schema: &[ColumnDefinition]) -> Vec<&'a Item> {
    let mut sorted: Vec<&Item> = items.iter().collect();
    let Some(column) = &config.sort_by else {
        return sorted;
    };
    let is_date = schema
        .iter()
        .any(|c| &c.name == column && c.column_type == ColumnType::Date);
    let direction = config.sort_direction.unwrap_or_default();

    sorted.sort_by(|a, b| {
        let (a, b) = (a.field(column), b.field(column));
        match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ordering = compare_values(a, b, is_date);
                match direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            }
        }
    });
    sorted
}

fn compare_values(a: &FieldValue, b: &FieldValue, is_date: bool) -> Ordering {
    match (a, b) {
        (FieldValue::Number(x), FieldValue::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (FieldValue::Text(x), FieldValue::Text(y)) if is_date => {
            match (parse_date(x), parse_date(y)) {
                (Some(dx), Some(dy)) => dx.cmp(&dy),
                _ => x.cmp(y),
            }
        }
        (FieldValue::Text(x), FieldValue::Text(y)) => x.cmp(y),
        (FieldValue::List(x), FieldValue::List(y)) => x.cmp(y),
        // numbers before text before lists when shapes differ
        (a, b) => shape_rank(a).cmp(&shape_rank(b)),
    }
}

fn shape_rank(value: &FieldValue) -> u8 {
    match value {
        FieldValue::Number(_) => 0,
        FieldValue::Text(_) => 1,
        FieldValue::List(_) => 2,
        FieldValue::Null => 3,
    }
}

/// Partition entries by the formatted `groupBy` value, in first-seen order
fn group_by<T>(
    items: &[&Item],
    config: &ViewConfig,
    schema: &[ColumnDefinition],
    build: impl Fn(&Item) -> T,
) -> Vec<Group<T>> {
    let Some(column_name) = &config.group_by else {
        return vec![Group { key: None, entries: items.iter().map(|i| build(*i)).collect() }];
    };
    let column = schema
        .iter()
        .find(|c| &c.name == column_name)
        .cloned()
        .unwrap_or_else(|| ColumnDefinition::new(column_name.clone(), ColumnType::Text));

    let mut groups: Vec<Group<T>> = Vec::new();
    for item in items {
        let key = format_value(item.field(&column.name), &column).text();
        let entry = build(*item);
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.entries.push(entry),
            None => groups.push(Group { key, entries: vec![entry] }),
        }
    }
    groups
}

fn calendar(field: &str, items: &[&Item], schema: &[ColumnDefinition]) -> Layout {
    let mut days: BTreeMap<String, Vec<Card>> = BTreeMap::new();
    let mut undated = Vec::new();

    for item in items {
        let date = match item.field(field) {
            FieldValue::Text(s) => parse_date(s),
            _ => None,
        };
        match date {
            Some(date) => days
                .entry(date.format("%Y-%m-%d").to_string())
                .or_default()
                .push(card(item, schema)),
            None => undated.push(card(item, schema)),
        }
    }

    Layout::Calendar {
        field: field.to_string(),
        days: days.into_iter().map(|(date, cards)| CalendarDay { date, cards }).collect(),
        undated,
    }
}

/// One lane per declared option, then unknown labels in first-seen order,
/// then an unlabeled lane when some items have no value
fn kanban(field: &str, items: &[&Item], schema: &[ColumnDefinition]) -> Layout {
    let column = schema.iter().find(|c| c.name == field);
    let mut lanes: Vec<Lane> = column
        .map(|c| c.choices())
        .unwrap_or_default()
        .iter()
        .map(|o| Lane { label: Some(o.label.clone()), color: Some(o.color.clone()), cards: Vec::new() })
        .collect();
    let mut unlabeled = Vec::new();

    for item in items {
        let labels = match item.field(field) {
            FieldValue::Text(s) if !s.is_empty() => vec![s.clone()],
            FieldValue::Number(n) => vec![crate::render::field::format_number(*n)],
            FieldValue::List(labels) if !labels.is_empty() => labels.clone(),
            _ => Vec::new(),
        };
        if labels.is_empty() {
            unlabeled.push(card(item, schema));
            continue;
        }
        for label in labels {
            let position = lanes.iter().position(|l| l.label.as_deref() == Some(label.as_str()));
            let lane = match position {
                Some(index) => &mut lanes[index],
                None => {
                    lanes.push(Lane { label: Some(label), color: None, cards: Vec::new() });
                    let last = lanes.len() - 1;
                    &mut lanes[last]
                }
            };
            lane.cards.push(card(item, schema));
        }
    }

    if !unlabeled.is_empty() {
        lanes.push(Lane { label: None, color: None, cards: unlabeled });
    }

    Layout::Kanban { field: field.to_string(), lanes }
}
