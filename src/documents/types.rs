/// Document type definitions

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Reference to an uploaded file stored on a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Storage id of the uploaded bytes
    pub file_id: String,
    pub name: String,
    /// MIME type
    #[serde(rename = "type")]
    pub content_type: String,
}

/// Serialized editor document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(pub Value);

impl RichText {
    /// An empty editor document
    pub fn empty() -> Self {
        RichText(json!({ "type": "doc", "content": [] }))
    }

    pub fn attachments(&self) -> Vec<Attachment> {
        self.0
            .get("attachments")
            .and_then(|a| serde_json::from_value(a.clone()).ok())
            .unwrap_or_default()
    }

    /// Append an attachment, keeping the rest of the tree as is
    ///
    /// Content that is not a JSON object is wrapped as `{"content": <old>}`
    /// first so the attachment has somewhere to live.
    pub fn push_attachment(&mut self, attachment: &Attachment) -> serde_json::Result<()> {
        if !self.0.is_object() {
            let previous = self.0.take();
            self.0 = json!({ "content": previous });
        }
        let entry = serde_json::to_value(attachment)?;

        if let Some(object) = self.0.as_object_mut() {
            match object.get_mut("attachments").and_then(Value::as_array_mut) {
                Some(list) => list.push(entry),
                None => {
                    object.insert("attachments".to_string(), Value::Array(vec![entry]));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: RichText,
    pub owner_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(name: &str) -> Attachment {
        Attachment {
            file_id: format!("blob-{name}"),
            name: name.to_string(),
            content_type: "image/png".to_string(),
        }
    }

    #[test]
    fn appends_attachments_in_order() {
        let mut content = RichText::empty();
        content.push_attachment(&attachment("a.png")).unwrap();
        content.push_attachment(&attachment("b.png")).unwrap();

        let names: Vec<String> = content.attachments().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
        assert_eq!(content.0["type"], "doc");
        assert_eq!(content.0["attachments"][0]["type"], "image/png");
    }

    #[test]
    fn wraps_non_object_content() {
        let mut content = RichText(json!("plain text"));
        content.push_attachment(&attachment("a.png")).unwrap();

        assert_eq!(content.0["content"], "plain text");
        assert_eq!(content.attachments().len(), 1);
    }
}
