//! User entity.

use serde::{Deserialize, Serialize};

use crate::{
    collection::{Entity, RawEntity},
    id::{marker::UserMarker, Id},
    util::{is_false, Maybe},
};

/// A cached Discord user.
#[derive(Clone, Debug, Serialize)]
pub struct User {
    pub id: Id<UserMarker>,
    pub username: String,
    /// `"0"` under the new username system.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub bot: bool,
}

impl User {
    /// `Username#Discriminator`, or just `Username` for the new username
    /// system.
    pub fn tag(&self) -> String {
        match self.discriminator.as_deref() {
            Some("0") | None => self.username.clone(),
            Some(disc) => format!("{}#{}", self.username, disc),
        }
    }

    /// CDN URL for the user's avatar, or `None` if no avatar is set.
    pub fn avatar_url(&self) -> Option<String> {
        self.avatar.as_ref().map(|hash| {
            format!(
                "https://cdn.discordapp.com/avatars/{}/{}.png",
                self.id, hash
            )
        })
    }
}

/// Sparse wire form of a user.
#[derive(Clone, Debug, Deserialize)]
pub struct RawUser {
    pub id: Id<UserMarker>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub global_name: Maybe<String>,
    #[serde(default)]
    pub avatar: Maybe<String>,
    #[serde(default)]
    pub bot: Option<bool>,
}

impl RawEntity for RawUser {
    type Marker = UserMarker;

    fn entity_id(&self) -> Option<Id<UserMarker>> {
        Some(self.id)
    }
}

impl Entity for User {
    type Marker = UserMarker;
    type Raw = RawUser;
    type Extra = ();

    fn from_raw(raw: RawUser, _extra: &()) -> Self {
        let mut user = Self {
            id: raw.id,
            username: String::new(),
            discriminator: None,
            global_name: None,
            avatar: None,
            bot: false,
        };
        user.apply(&raw);
        user
    }

    fn id(&self) -> Id<UserMarker> {
        self.id
    }

    fn apply(&mut self, raw: &RawUser) {
        if let Some(username) = &raw.username {
            self.username = username.clone();
        }
        if let Some(discriminator) = &raw.discriminator {
            self.discriminator = Some(discriminator.clone());
        }
        raw.global_name.apply_to(&mut self.global_name);
        raw.avatar.apply_to(&mut self.avatar);
        if let Some(bot) = raw.bot {
            self.bot = bot;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RawUser, User};
    use crate::collection::Entity;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawUser {
        serde_json::from_value(value).expect("valid raw user")
    }

    #[test]
    fn tag_with_discriminator() {
        let user = User::from_raw(
            raw(json!({ "id": "789", "username": "alice", "discriminator": "0001" })),
            &(),
        );
        assert_eq!(user.tag(), "alice#0001");
    }

    #[test]
    fn tag_new_username_system() {
        let user = User::from_raw(
            raw(json!({ "id": "789", "username": "alice", "discriminator": "0" })),
            &(),
        );
        assert_eq!(user.tag(), "alice");
    }

    #[test]
    fn avatar_url_present_and_absent() {
        let mut user = User::from_raw(raw(json!({ "id": "789", "username": "alice" })), &());
        assert!(user.avatar_url().is_none());

        user.apply(&raw(json!({ "id": "789", "avatar": "1a2b3c4d" })));
        let url = user.avatar_url().unwrap();
        assert!(url.starts_with("https://cdn.discordapp.com/avatars/789/"));
    }

    #[test]
    fn sparse_apply_checks_presence_not_truthiness() {
        let mut user = User::from_raw(
            raw(json!({ "id": "1", "username": "alice", "bot": true })),
            &(),
        );

        // No keys: nothing changes.
        user.apply(&raw(json!({ "id": "1" })));
        assert!(user.bot);

        // Present falsy value is a real update.
        user.apply(&raw(json!({ "id": "1", "bot": false })));
        assert!(!user.bot);

        // Nullable field: explicit null clears, absence leaves alone.
        user.apply(&raw(json!({ "id": "1", "avatar": "ff00" })));
        user.apply(&raw(json!({ "id": "1" })));
        assert_eq!(user.avatar.as_deref(), Some("ff00"));
        user.apply(&raw(json!({ "id": "1", "avatar": null })));
        assert_eq!(user.avatar, None);
    }
}
