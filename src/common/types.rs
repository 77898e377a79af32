use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Username used before the first auth notification arrives.
pub const ANONYMOUS: &str = "anonymous";

/// Domain model đại diện một tin nhắn chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub key: String,
    pub sender: String,
    pub body: MessageBody,
}

/// A message carries exactly one of text or an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    Image { url: String },
}

impl Message {
    #[cfg(test)]
    pub fn is_image(&self) -> bool {
        matches!(self.body, MessageBody::Image { .. })
    }
}

/// Record stored as the JSON value of a feed child.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "photoUrl")]
    pub photo_url: Option<String>,
}

impl MessageRecord {
    pub fn text(text: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            name: Some(sender.into()),
            photo_url: None,
        }
    }

    pub fn image(url: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            text: None,
            name: Some(sender.into()),
            photo_url: Some(url.into()),
        }
    }

    /// Decode a raw feed value into a display message.
    pub fn decode(key: &str, value: &serde_json::Value) -> Result<Message, ChatError> {
        let record: MessageRecord =
            serde_json::from_value(value.clone()).map_err(|err| ChatError::Decode {
                key: key.to_string(),
                reason: err.to_string(),
            })?;
        record.into_message(key)
    }

    pub fn into_message(self, key: &str) -> Result<Message, ChatError> {
        let body = match (self.text, self.photo_url) {
            (Some(text), None) => MessageBody::Text(text),
            (None, Some(url)) => MessageBody::Image { url },
            (Some(_), Some(_)) => {
                return Err(ChatError::Decode {
                    key: key.to_string(),
                    reason: "both text and photoUrl are set".to_string(),
                });
            }
            (None, None) => {
                return Err(ChatError::Decode {
                    key: key.to_string(),
                    reason: "neither text nor photoUrl is set".to_string(),
                });
            }
        };

        Ok(Message {
            key: key.to_string(),
            sender: self.name.unwrap_or_default(),
            body,
        })
    }
}

/// Identity providers offered by the sign-in flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Email,
    Google,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Email, Provider::Google];
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Email => f.write_str("Email"),
            Provider::Google => f.write_str("Google"),
        }
    }
}

/// Signed-in identity as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub display_name: String,
    pub provider: Provider,
    #[serde(default)]
    pub email: Option<String>,
}

/// What the interactive sign-in flow hands back on confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub provider: Provider,
    pub display_name: String,
    pub email: Option<String>,
}

/// Constraints for the photo chooser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerRequest {
    pub mime_type: &'static str,
    pub local_only: bool,
}

impl PickerRequest {
    pub fn jpeg() -> Self {
        Self {
            mime_type: "image/jpeg",
            local_only: true,
        }
    }

    /// File extensions accepted for the declared MIME type.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self.mime_type {
            "image/jpeg" => &["jpg", "jpeg"],
            "image/png" => &["png"],
            _ => &[],
        }
    }
}
