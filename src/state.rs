//! The single-owner cache root.
//!
//! Entities never hold references back to the state that caches them; they
//! carry IDs, and every cross-collection effect (routing a guild payload's
//! channels, upserting a message author, hanging a thread off its parent)
//! runs here. Mutation goes through `&mut self`, so the borrow checker
//! enforces the one-writer model that the cache's merge semantics assume.

use tracing::{debug, warn};

use crate::{
    channel::{Channel, ChannelType, RawChannel},
    collection::{Collection, Entity, Incoming},
    error::CacheError,
    guild::{Guild, Member, RawGuild, RawMember},
    id::{
        marker::{ChannelMarker, GuildMarker, MessageMarker, UserMarker},
        Id,
    },
    interaction::{Interaction, RawInteraction},
    message::{Message, RawMessage},
    user::{RawUser, User},
};

/// Top-level cache over users, guilds, and channels.
///
/// Guild-scoped entities (roles, members) live inside their [`Guild`];
/// messages and threads live inside their [`Channel`]. This struct owns
/// only the three root collections and the routing between them.
#[derive(Debug, Default)]
pub struct ClientState {
    pub users: Collection<User>,
    pub guilds: Collection<Guild>,
    pub channels: Collection<Channel>,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge or construct a user from a payload.
    pub fn update_user(&mut self, raw: RawUser) -> Result<&mut User, CacheError> {
        self.users.update(Incoming::Raw(raw), &())
    }

    /// Merge or construct a guild, routing any embedded channel list into
    /// the top-level channel collection.
    pub fn update_guild(&mut self, mut raw: RawGuild) -> Result<&mut Guild, CacheError> {
        let guild_id = raw.id;
        let channels = raw.channels.take();
        for mut channel in channels.into_iter().flatten() {
            // Guild payloads omit guild_id on nested channels.
            channel.guild_id.get_or_insert(guild_id);
            if let Err(error) = self.update_channel(channel) {
                warn!(%guild_id, %error, "skipping embedded channel");
            }
        }
        debug!(%guild_id, "updating guild");
        self.guilds.update(Incoming::Raw(raw), &())
    }

    /// Merge or construct a channel.
    ///
    /// Thread payloads are routed into the cached parent's thread
    /// collection when the parent is textable and present; otherwise the
    /// thread is cached at the top level so it is not lost.
    pub fn update_channel(&mut self, raw: RawChannel) -> Result<Id<ChannelMarker>, CacheError> {
        if let Some(kind) = raw.kind {
            if let ChannelType::Unknown(tag) = kind {
                warn!(channel_id = %raw.id, tag, "unknown channel discriminant");
            }
            if kind.is_thread() {
                if let Some(parent_id) = raw.parent_id.as_ref().copied() {
                    if self.channels.get(parent_id).and_then(Channel::threads).is_some() {
                        // A thread cached top-level while the parent was
                        // unknown migrates into it now; otherwise the next
                        // payload would fork the identity into a second
                        // instance.
                        let orphan = match self.channels.remove(raw.id) {
                            Some(
                                Channel::AnnouncementThread(thread)
                                | Channel::PublicThread(thread)
                                | Channel::PrivateThread(thread),
                            ) => Some(thread),
                            Some(other) => {
                                self.channels.add(other);
                                None
                            }
                            None => None,
                        };
                        if let Some(threads) =
                            self.channels.get_mut(parent_id).and_then(Channel::threads_mut)
                        {
                            if let Some(orphan) = orphan {
                                threads.update(Incoming::Materialized(orphan), &())?;
                            }
                            let thread = threads.update(Incoming::Raw(raw), &())?;
                            return Ok(thread.id());
                        }
                    }
                }
            }
        }
        let channel = self.channels.update(Incoming::Raw(raw), &())?;
        Ok(channel.id())
    }

    /// Merge or construct a member inside its guild, upserting the
    /// embedded user into the user collection first.
    pub fn update_member(
        &mut self,
        guild_id: Id<GuildMarker>,
        raw: RawMember,
    ) -> Result<&mut Member, CacheError> {
        if let Some(user) = raw.user.clone() {
            self.users.update(Incoming::Raw(user), &())?;
        }
        let guild = self
            .guilds
            .get_mut(guild_id)
            .ok_or(CacheError::UncachedGuild(guild_id))?;
        guild.members.update(Incoming::Raw(raw), &guild_id)
    }

    /// Merge or construct a message inside its channel's message cache,
    /// upserting the author into the user collection.
    ///
    /// The channel must already be cached and textable; messages are never
    /// cached without a home.
    pub fn update_message(&mut self, raw: RawMessage) -> Result<&mut Message, CacheError> {
        if let Some(author) = raw.author.clone() {
            self.users.update(Incoming::Raw(author), &())?;
        }
        for mention in raw.mentions.iter().flatten() {
            self.users.update(Incoming::Raw(mention.clone()), &())?;
        }
        // Partial payloads routed here must say which channel they belong to.
        let channel_id = raw.channel_id.ok_or(CacheError::MissingIdentity)?;
        let channel = self
            .channels
            .get_mut(channel_id)
            .ok_or(CacheError::UncachedChannel(channel_id))?;
        let messages = channel
            .messages_mut()
            .ok_or(CacheError::NotTextable(channel_id))?;
        debug!(%channel_id, message_id = %raw.id, "updating message");
        messages.update(Incoming::Raw(raw), &channel_id)
    }

    /// Construct the concrete interaction variant for a payload, caching
    /// the invoking user as a side effect.
    ///
    /// Interactions themselves are never cached.
    pub fn interaction(&mut self, raw: RawInteraction) -> Result<Interaction, CacheError> {
        let user = raw
            .member
            .as_ref()
            .and_then(|member| member.user.clone())
            .or_else(|| raw.user.clone());
        if let Some(user) = user {
            self.users.update(Incoming::Raw(user), &())?;
        }
        Ok(Interaction::from_raw(raw))
    }

    /// Drop a channel, and with it every message and thread it holds.
    pub fn delete_channel(&mut self, channel_id: Id<ChannelMarker>) -> Option<Channel> {
        let removed = self.channels.remove(channel_id);
        if removed.is_none() {
            // Threads live inside their parent; scan for one to evict.
            for channel in self.channels.values_mut() {
                if let Some(threads) = channel.threads_mut() {
                    if let Some(thread) = threads.remove(channel_id) {
                        return Some(match thread.kind {
                            ChannelType::AnnouncementThread => Channel::AnnouncementThread(thread),
                            ChannelType::PrivateThread => Channel::PrivateThread(thread),
                            _ => Channel::PublicThread(thread),
                        });
                    }
                }
            }
        }
        removed
    }

    /// Drop a message from its channel's cache.
    pub fn delete_message(
        &mut self,
        channel_id: Id<ChannelMarker>,
        message_id: Id<MessageMarker>,
    ) -> Option<Message> {
        self.channels
            .get_mut(channel_id)
            .and_then(|channel| channel.messages_mut())
            .and_then(|messages| messages.remove(message_id))
    }

    /// Drop a member from its guild. The user collection is left alone;
    /// the user may be visible through other guilds.
    pub fn remove_member(
        &mut self,
        guild_id: Id<GuildMarker>,
        user_id: Id<UserMarker>,
    ) -> Option<Member> {
        self.guilds
            .get_mut(guild_id)
            .and_then(|guild| guild.members.remove(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::ClientState;
    use crate::{
        channel::Channel,
        error::CacheError,
        id::Id,
    };
    use serde_json::json;

    fn state_with_guild_and_channel() -> ClientState {
        let mut state = ClientState::new();
        state
            .update_guild(
                serde_json::from_value(json!({
                    "id": "100",
                    "name": "rust hangout",
                    "owner_id": "200",
                    "channels": [
                        { "id": "10", "type": 0, "name": "general" },
                        { "id": "11", "type": 2, "name": "voice" },
                    ],
                }))
                .unwrap(),
            )
            .unwrap();
        state
    }

    #[test]
    fn guild_payload_routes_channels_to_the_top_level() {
        let state = state_with_guild_and_channel();
        assert!(state.guilds.contains(Id::new(100)));
        assert_eq!(state.channels.len(), 2);
        let channel = state.channels.get(Id::new(10)).unwrap();
        assert_eq!(channel.guild_id(), Some(Id::new(100)));
        assert!(matches!(channel, Channel::Text(_)));
    }

    #[test]
    fn message_update_upserts_author_and_lands_in_channel() {
        let mut state = state_with_guild_and_channel();
        state
            .update_message(
                serde_json::from_value(json!({
                    "id": "500",
                    "channel_id": "10",
                    "content": "hello",
                    "author": { "id": "200", "username": "amy" },
                }))
                .unwrap(),
            )
            .unwrap();

        assert!(state.users.contains(Id::new(200)));
        let messages = state.channels.get(Id::new(10)).unwrap().messages().unwrap();
        assert_eq!(messages.get(Id::new(500)).unwrap().content, "hello");
    }

    #[test]
    fn message_into_uncached_channel_is_an_error() {
        let mut state = ClientState::new();
        let result = state.update_message(
            serde_json::from_value(json!({
                "id": "500",
                "channel_id": "77",
                "content": "hello",
            }))
            .unwrap(),
        );
        assert!(matches!(result, Err(CacheError::UncachedChannel(id)) if id == Id::new(77)));
    }

    #[test]
    fn message_into_voice_channel_is_an_error() {
        let mut state = state_with_guild_and_channel();
        let result = state.update_message(
            serde_json::from_value(json!({
                "id": "500",
                "channel_id": "11",
                "content": "hello",
            }))
            .unwrap(),
        );
        assert!(matches!(result, Err(CacheError::NotTextable(id)) if id == Id::new(11)));
    }

    #[test]
    fn threads_hang_off_their_cached_parent() {
        let mut state = state_with_guild_and_channel();
        let thread_id = state
            .update_channel(
                serde_json::from_value(json!({
                    "id": "12",
                    "type": 11,
                    "parent_id": "10",
                    "name": "help",
                }))
                .unwrap(),
            )
            .unwrap();

        assert_eq!(thread_id, Id::new(12));
        // The thread is inside the parent, not at the top level.
        assert!(!state.channels.contains(Id::new(12)));
        let Channel::Text(parent) = state.channels.get(Id::new(10)).unwrap() else {
            panic!("expected text channel");
        };
        assert!(parent.threads.contains(Id::new(12)));
    }

    #[test]
    fn orphan_thread_is_cached_at_the_top_level() {
        let mut state = ClientState::new();
        state
            .update_channel(
                serde_json::from_value(json!({
                    "id": "12",
                    "type": 11,
                    "parent_id": "10",
                    "name": "help",
                }))
                .unwrap(),
            )
            .unwrap();
        assert!(state.channels.contains(Id::new(12)));
    }

    #[test]
    fn orphan_thread_migrates_into_a_late_parent() {
        let mut state = ClientState::new();
        state
            .update_channel(
                serde_json::from_value(json!({
                    "id": "12",
                    "type": 11,
                    "parent_id": "10",
                    "name": "help",
                }))
                .unwrap(),
            )
            .unwrap();
        state
            .update_message(
                serde_json::from_value(json!({
                    "id": "500",
                    "channel_id": "12",
                    "content": "early",
                }))
                .unwrap(),
            )
            .unwrap();

        // The parent shows up only now, then the thread is updated again.
        state
            .update_channel(
                serde_json::from_value(json!({ "id": "10", "type": 0, "name": "general" }))
                    .unwrap(),
            )
            .unwrap();
        state
            .update_channel(
                serde_json::from_value(json!({
                    "id": "12",
                    "type": 11,
                    "parent_id": "10",
                    "thread_metadata": { "archived": true },
                }))
                .unwrap(),
            )
            .unwrap();

        // One instance, inside the parent, keeping its pre-migration state.
        assert!(!state.channels.contains(Id::new(12)));
        let Channel::Text(parent) = state.channels.get(Id::new(10)).unwrap() else {
            panic!("expected text channel");
        };
        let thread = parent.threads.get(Id::new(12)).unwrap();
        assert_eq!(thread.name.as_deref(), Some("help"));
        assert!(thread.archived);
        assert_eq!(thread.messages.get(Id::new(500)).unwrap().content, "early");

        // Deletion finds the migrated copy, not a stale orphan.
        assert!(state.delete_channel(Id::new(12)).is_some());
        assert!(state.delete_channel(Id::new(12)).is_none());
    }

    #[test]
    fn member_update_requires_a_cached_guild() {
        let mut state = state_with_guild_and_channel();
        let member = state
            .update_member(
                Id::new(100),
                serde_json::from_value(json!({
                    "user": { "id": "201", "username": "ben" },
                    "nick": "b",
                }))
                .unwrap(),
            )
            .unwrap();
        assert_eq!(member.id, Id::new(201));
        assert!(state.users.contains(Id::new(201)));

        let result = state.update_member(
            Id::new(999),
            serde_json::from_value(json!({
                "user": { "id": "201", "username": "ben" },
            }))
            .unwrap(),
        );
        assert!(matches!(result, Err(CacheError::UncachedGuild(id)) if id == Id::new(999)));
    }

    #[test]
    fn interaction_construction_caches_the_invoker() {
        let mut state = ClientState::new();
        let interaction = state
            .interaction(
                serde_json::from_value(json!({
                    "id": "1",
                    "application_id": "2",
                    "type": 2,
                    "token": "tok",
                    "member": { "user": { "id": "200", "username": "amy" } },
                    "data": { "name": "ping" },
                }))
                .unwrap(),
            )
            .unwrap();

        assert_eq!(interaction.author_id(), Some(Id::new(200)));
        assert!(state.users.contains(Id::new(200)));
    }

    #[test]
    fn deletions_cascade_through_ownership() {
        let mut state = state_with_guild_and_channel();
        state
            .update_message(
                serde_json::from_value(json!({
                    "id": "500",
                    "channel_id": "10",
                    "content": "hello",
                }))
                .unwrap(),
            )
            .unwrap();

        assert!(state.delete_message(Id::new(10), Id::new(500)).is_some());
        assert!(state.delete_message(Id::new(10), Id::new(500)).is_none());

        assert!(state.delete_channel(Id::new(10)).is_some());
        assert!(!state.channels.contains(Id::new(10)));
    }

    #[test]
    fn deleting_a_thread_evicts_it_from_its_parent() {
        let mut state = state_with_guild_and_channel();
        state
            .update_channel(
                serde_json::from_value(json!({
                    "id": "12",
                    "type": 11,
                    "parent_id": "10",
                })).unwrap(),
            )
            .unwrap();

        assert!(state.delete_channel(Id::new(12)).is_some());
        let Channel::Text(parent) = state.channels.get(Id::new(10)).unwrap() else {
            panic!("expected text channel");
        };
        assert!(!parent.threads.contains(Id::new(12)));
    }

    #[test]
    fn user_identity_is_stable_across_updates() {
        let mut state = ClientState::new();
        state
            .update_user(
                serde_json::from_value(json!({ "id": "200", "username": "amy" })).unwrap(),
            )
            .unwrap();
        let first = state.users.get(Id::new(200)).unwrap() as *const _;
        state
            .update_user(
                serde_json::from_value(
                    json!({ "id": "200", "username": "amy2", "avatar": "abc" }),
                )
                .unwrap(),
            )
            .unwrap();
        let second = state.users.get(Id::new(200)).unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(second.username, "amy2");
        assert_eq!(second.avatar.as_deref(), Some("abc"));
    }
}
