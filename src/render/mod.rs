/// Headless rendering
///
/// Field formatting/editing and the view-type dispatcher. Output is data, not
/// markup, so the API can hand it to any client.

pub mod field;
pub mod view;

pub use field::{editor_for, format_value, parse_input, EditorInput, FieldEditor, FormattedValue};
pub use view::{render, Layout};
