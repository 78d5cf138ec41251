//! Message shapes exchanged with the chat transport.

use serde::{Deserialize, Serialize};

/// A message received from the chat stream.
///
/// The dispatcher only reads [`text`](Self::text) and [`channel`](Self::channel);
/// the sender is carried through for handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Raw message text.
    pub text: String,
    /// Identifier of the channel the message arrived on.
    pub channel: String,
    /// Identifier of the sender.
    #[serde(default)]
    pub user: String,
}

impl InboundMessage {
    /// Creates a message with no sender.
    pub fn new(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            channel: channel.into(),
            user: String::new(),
        }
    }

    /// Sets the sender identifier.
    pub fn from_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }
}

/// A titled value shown inside an [`Attachment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentField {
    pub title: String,
    pub value: String,
}

impl AttachmentField {
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
        }
    }
}

/// A block of structured content attached to a [`PostMessage`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Hex colour without the leading `#`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Plain-text summary for clients that cannot render fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
    #[serde(default)]
    pub fields: Vec<AttachmentField>,
}

impl Attachment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    pub fn field(mut self, title: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(AttachmentField::new(title, value));
        self
    }
}

/// A rich message with an optional custom identity and attachments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMessage {
    pub text: String,
    /// Post as the bot's own user rather than a custom identity.
    #[serde(default)]
    pub as_user: bool,
    /// Display name shown instead of the bot's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Avatar shown instead of the bot's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl PostMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn as_user(mut self, as_user: bool) -> Self {
        self.as_user = as_user;
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn icon_url(mut self, icon_url: impl Into<String>) -> Self {
        self.icon_url = Some(icon_url.into());
        self
    }

    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// Anything the bot asks the transport to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Plain text to a channel.
    Text { channel: String, text: String },
    /// A rich post to a channel.
    Post { channel: String, post: PostMessage },
}

impl OutboundMessage {
    /// The destination channel.
    pub fn channel(&self) -> &str {
        match self {
            Self::Text { channel, .. } | Self::Post { channel, .. } => channel,
        }
    }

    /// The main text body.
    pub fn text(&self) -> &str {
        match self {
            Self::Text { text, .. } => text,
            Self::Post { post, .. } => &post.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_serializes_with_kind_tag() {
        let msg = OutboundMessage::Text {
            channel: "C1".into(),
            text: "hi".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["kind"], "text");
        assert_eq!(json["channel"], "C1");
    }

    #[test]
    fn test_post_skips_empty_identity() {
        let post = PostMessage::new("hello").as_user(true);
        let json = serde_json::to_value(&post).unwrap();
        assert!(json.get("username").is_none());
        assert!(json.get("attachments").is_none());
        assert_eq!(json["as_user"], true);
    }

    #[test]
    fn test_outbound_accessors() {
        let msg = OutboundMessage::Post {
            channel: "D9".into(),
            post: PostMessage::new("body").username("Alice"),
        };
        assert_eq!(msg.channel(), "D9");
        assert_eq!(msg.text(), "body");
    }

    #[test]
    fn test_inbound_user_defaults_when_missing() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"text":".help","channel":"D1"}"#).unwrap();
        assert_eq!(msg, InboundMessage::new("D1", ".help"));
    }
}
