//! Message entity.
//!
//! Messages live in the owning channel's message collection; the channel ID
//! is threaded through as the `Extra` construction argument because partial
//! message payloads (edits, pin toggles) may omit it. The embedded author
//! object is upserted into the top-level user collection by the routing
//! layer; the message itself stores only the author's ID.

use serde::{Deserialize, Serialize};

use crate::{
    collection::{Entity, RawEntity},
    id::{
        marker::{ChannelMarker, GuildMarker, MessageMarker, UserMarker},
        Id,
    },
    user::RawUser,
    util::{is_false, Maybe},
};

/// A cached message.
#[derive(Clone, Debug, Serialize)]
pub struct Message {
    pub id: Id<MessageMarker>,
    pub channel_id: Id<ChannelMarker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Id<GuildMarker>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<Id<UserMarker>>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_timestamp: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "is_false")]
    pub tts: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub pinned: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub mention_everyone: bool,
    /// IDs of mentioned users; the full user objects are cached top-level.
    pub mentions: Vec<Id<UserMarker>>,
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Whether a given user is mentioned in the message.
    pub fn mentions_user(&self, user_id: Id<UserMarker>) -> bool {
        self.mentions.contains(&user_id)
    }
}

/// A file attached to a message. Value object, replaced wholesale on update.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Attachment {
    pub id: Id<crate::id::marker::GenericMarker>,
    pub filename: String,
    pub size: u64,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Sparse wire form of a message.
#[derive(Clone, Debug, Deserialize)]
pub struct RawMessage {
    pub id: Id<MessageMarker>,
    #[serde(default)]
    pub channel_id: Option<Id<ChannelMarker>>,
    #[serde(default)]
    pub guild_id: Option<Id<GuildMarker>>,
    #[serde(default)]
    pub author: Option<RawUser>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub edited_timestamp: Maybe<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub tts: Option<bool>,
    #[serde(default)]
    pub pinned: Option<bool>,
    #[serde(default)]
    pub mention_everyone: Option<bool>,
    #[serde(default)]
    pub mentions: Option<Vec<RawUser>>,
    #[serde(default)]
    pub attachments: Option<Vec<Attachment>>,
}

impl RawEntity for RawMessage {
    type Marker = MessageMarker;

    fn entity_id(&self) -> Option<Id<MessageMarker>> {
        Some(self.id)
    }
}

impl Entity for Message {
    type Marker = MessageMarker;
    type Raw = RawMessage;
    /// The owning channel's ID; partial payloads may omit `channel_id`.
    type Extra = Id<ChannelMarker>;

    fn from_raw(raw: RawMessage, channel_id: &Id<ChannelMarker>) -> Self {
        let mut message = Self {
            id: raw.id,
            channel_id: *channel_id,
            guild_id: None,
            author_id: None,
            content: String::new(),
            edited_timestamp: None,
            tts: false,
            pinned: false,
            mention_everyone: false,
            mentions: Vec::new(),
            attachments: Vec::new(),
        };
        message.apply(&raw);
        message
    }

    fn id(&self) -> Id<MessageMarker> {
        self.id
    }

    fn apply(&mut self, raw: &RawMessage) {
        if let Some(guild_id) = raw.guild_id {
            self.guild_id = Some(guild_id);
        }
        if let Some(author) = &raw.author {
            self.author_id = Some(author.id);
        }
        if let Some(content) = &raw.content {
            self.content = content.clone();
        }
        raw.edited_timestamp.apply_to(&mut self.edited_timestamp);
        if let Some(tts) = raw.tts {
            self.tts = tts;
        }
        if let Some(pinned) = raw.pinned {
            self.pinned = pinned;
        }
        if let Some(mention_everyone) = raw.mention_everyone {
            self.mention_everyone = mention_everyone;
        }
        if let Some(mentions) = &raw.mentions {
            self.mentions = mentions.iter().map(|user| user.id).collect();
        }
        if let Some(attachments) = &raw.attachments {
            self.attachments = attachments.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Message, RawMessage};
    use crate::{collection::Entity, id::Id};
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawMessage {
        serde_json::from_value(value).expect("valid raw message")
    }

    #[test]
    fn edit_payload_only_touches_present_keys() {
        let channel = Id::new(10);
        let mut message = Message::from_raw(
            raw(json!({
                "id": "1",
                "author": { "id": "200", "username": "alice" },
                "content": "hello",
                "pinned": true,
            })),
            &channel,
        );

        message.apply(&raw(json!({ "id": "1", "content": "hello, edited" })));
        assert_eq!(message.content, "hello, edited");
        assert!(message.pinned);
        assert_eq!(message.author_id, Some(Id::new(200)));

        // Un-pin is a present falsy value, not an omission.
        message.apply(&raw(json!({ "id": "1", "pinned": false })));
        assert!(!message.pinned);
    }

    #[test]
    fn edited_timestamp_clears_on_null() {
        let channel = Id::new(10);
        let mut message = Message::from_raw(
            raw(json!({
                "id": "1",
                "content": "x",
                "edited_timestamp": "2021-08-10T11:16:37.020000+00:00",
            })),
            &channel,
        );
        assert!(message.edited_timestamp.is_some());

        message.apply(&raw(json!({ "id": "1", "edited_timestamp": null })));
        assert!(message.edited_timestamp.is_none());
    }

    #[test]
    fn mentions_collapse_to_ids() {
        let channel = Id::new(10);
        let message = Message::from_raw(
            raw(json!({
                "id": "1",
                "content": "hi",
                "mentions": [
                    { "id": "200", "username": "a" },
                    { "id": "201", "username": "b" },
                ],
            })),
            &channel,
        );
        assert!(message.mentions_user(Id::new(201)));
        assert!(!message.mentions_user(Id::new(999)));
    }

    #[test]
    fn attachments_replace_wholesale() {
        let channel = Id::new(10);
        let mut message = Message::from_raw(
            raw(json!({
                "id": "1",
                "attachments": [
                    { "id": "7", "filename": "a.png", "size": 10, "url": "u", "proxy_url": "p" },
                ],
            })),
            &channel,
        );
        assert_eq!(message.attachments.len(), 1);

        message.apply(&raw(json!({ "id": "1", "attachments": [] })));
        assert!(message.attachments.is_empty());
    }
}
