//! Channel entities: the discriminated union and its construction dispatch.
//!
//! Every channel variant is defined in this one module, so the dispatch in
//! [`Channel::from_raw`] is a plain match over the integer discriminant;
//! the mutual references between the union and its variants need no lazy
//! binding when they share a compilation unit.
//!
//! Updates layer strictly: each variant's `apply` delegates to the core
//! struct it embeds first, then touches only the fields it owns, so shared
//! fields are handled exactly once.

use serde::{
    de::{Deserializer, Error as DeError},
    ser::Serializer,
    Deserialize, Serialize,
};

use crate::{
    collection::{Collection, Entity, Incoming, RawEntity},
    guild::Member,
    id::{
        marker::{ChannelMarker, GuildMarker, MessageMarker, UserMarker},
        Id,
    },
    message::Message,
    permission::{
        resolve_overwrites, PermissionOverwrite, Permissions, RawPermissionOverwrite,
    },
    user::RawUser,
    util::{is_false, Maybe},
};

// ---------------------------------------------------------------------------
// Discriminant
// ---------------------------------------------------------------------------

/// The integer `type` tag on a channel payload.
///
/// Open enum: an unrecognized tag deserializes as `Unknown` instead of
/// failing, so future channel kinds degrade to base-capability objects.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ChannelType {
    GuildText,
    Private,
    GuildVoice,
    Group,
    GuildCategory,
    GuildAnnouncement,
    AnnouncementThread,
    PublicThread,
    PrivateThread,
    GuildStageVoice,
    GuildForum,
    Unknown(u8),
}

impl ChannelType {
    /// The wire value of the tag.
    pub const fn value(self) -> u8 {
        match self {
            Self::GuildText => 0,
            Self::Private => 1,
            Self::GuildVoice => 2,
            Self::Group => 3,
            Self::GuildCategory => 4,
            Self::GuildAnnouncement => 5,
            Self::AnnouncementThread => 10,
            Self::PublicThread => 11,
            Self::PrivateThread => 12,
            Self::GuildStageVoice => 13,
            Self::GuildForum => 15,
            Self::Unknown(value) => value,
        }
    }

    /// Whether the kind is one of the three thread kinds.
    pub const fn is_thread(self) -> bool {
        matches!(
            self,
            Self::AnnouncementThread | Self::PublicThread | Self::PrivateThread
        )
    }

    /// Whether the kind lives inside a guild.
    pub const fn is_guild(self) -> bool {
        !matches!(self, Self::Private | Self::Group)
    }

    /// Whether messages can be sent in a channel of this kind.
    pub const fn is_textable(self) -> bool {
        matches!(
            self,
            Self::GuildText
                | Self::Private
                | Self::Group
                | Self::GuildAnnouncement
                | Self::AnnouncementThread
                | Self::PublicThread
                | Self::PrivateThread
        )
    }
}

impl From<u8> for ChannelType {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::GuildText,
            1 => Self::Private,
            2 => Self::GuildVoice,
            3 => Self::Group,
            4 => Self::GuildCategory,
            5 => Self::GuildAnnouncement,
            10 => Self::AnnouncementThread,
            11 => Self::PublicThread,
            12 => Self::PrivateThread,
            13 => Self::GuildStageVoice,
            15 => Self::GuildForum,
            other => Self::Unknown(other),
        }
    }
}

impl Serialize for ChannelType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.value())
    }
}

impl<'de> Deserialize<'de> for ChannelType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u64::deserialize(deserializer)?;
        let value = u8::try_from(value).map_err(DeError::custom)?;
        Ok(Self::from(value))
    }
}

// ---------------------------------------------------------------------------
// Raw payload
// ---------------------------------------------------------------------------

/// Sparse wire form of any channel kind.
///
/// One struct covers the whole family; each variant's `apply` reads only the
/// keys it owns.
#[derive(Clone, Debug, Deserialize)]
pub struct RawChannel {
    pub id: Id<ChannelMarker>,
    #[serde(rename = "type", default)]
    pub kind: Option<ChannelType>,
    #[serde(default)]
    pub guild_id: Option<Id<GuildMarker>>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub parent_id: Maybe<Id<ChannelMarker>>,
    #[serde(default)]
    pub nsfw: Option<bool>,
    #[serde(default)]
    pub topic: Maybe<String>,
    #[serde(default)]
    pub rate_limit_per_user: Option<u64>,
    #[serde(default)]
    pub last_message_id: Maybe<Id<MessageMarker>>,
    #[serde(default)]
    pub bitrate: Option<u64>,
    #[serde(default)]
    pub user_limit: Option<u64>,
    #[serde(default)]
    pub permission_overwrites: Option<Vec<RawPermissionOverwrite>>,
    #[serde(default)]
    pub owner_id: Option<Id<UserMarker>>,
    #[serde(default)]
    pub icon: Maybe<String>,
    #[serde(default)]
    pub recipients: Option<Vec<RawUser>>,
    #[serde(default)]
    pub thread_metadata: Option<RawThreadMetadata>,
    #[serde(default)]
    pub message_count: Option<u64>,
    #[serde(default)]
    pub member_count: Option<u64>,
    #[serde(default)]
    pub default_auto_archive_duration: Option<u64>,
}

/// Sparse wire form of a thread's metadata sub-object.
#[derive(Clone, Debug, Deserialize)]
pub struct RawThreadMetadata {
    #[serde(default)]
    pub archived: Option<bool>,
    #[serde(default)]
    pub auto_archive_duration: Option<u64>,
    #[serde(default)]
    pub archive_timestamp: Maybe<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub locked: Option<bool>,
}

impl RawEntity for RawChannel {
    type Marker = ChannelMarker;

    fn entity_id(&self) -> Option<Id<ChannelMarker>> {
        Some(self.id)
    }
}

// ---------------------------------------------------------------------------
// Shared guild-channel core
// ---------------------------------------------------------------------------

/// Fields shared by every guild channel kind, including the overwrite
/// collection used for permission resolution.
#[derive(Clone, Debug, Serialize)]
pub struct ChannelCore {
    pub id: Id<ChannelMarker>,
    #[serde(rename = "type")]
    pub kind: ChannelType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Id<GuildMarker>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Id<ChannelMarker>>,
    #[serde(skip_serializing_if = "is_false")]
    pub nsfw: bool,
    pub permission_overwrites: Collection<PermissionOverwrite>,
}

impl ChannelCore {
    fn from_raw(raw: &RawChannel, kind: ChannelType) -> Self {
        let mut core = Self {
            id: raw.id,
            kind,
            guild_id: None,
            name: None,
            position: None,
            parent_id: None,
            nsfw: false,
            permission_overwrites: Collection::new(),
        };
        core.apply(raw);
        core
    }

    fn apply(&mut self, raw: &RawChannel) {
        if let Some(guild_id) = raw.guild_id {
            self.guild_id = Some(guild_id);
        }
        if let Some(name) = &raw.name {
            self.name = Some(name.clone());
        }
        if let Some(position) = raw.position {
            self.position = Some(position);
        }
        raw.parent_id.apply_to(&mut self.parent_id);
        if let Some(nsfw) = raw.nsfw {
            self.nsfw = nsfw;
        }
        for overwrite in raw.permission_overwrites.iter().flatten() {
            // RawPermissionOverwrite's id is required, so this cannot fail.
            let _ = self
                .permission_overwrites
                .update(Incoming::Raw(overwrite.clone()), &());
        }
    }

    /// Resolve a member's effective permissions in this channel.
    ///
    /// `base` is the guild-level role aggregate
    /// ([`Guild::base_permissions`]); the guild's own ID keys the
    /// `@everyone` overwrite.
    ///
    /// [`Guild::base_permissions`]: crate::guild::Guild::base_permissions
    pub fn permissions_of(
        &self,
        guild_id: Id<GuildMarker>,
        member_id: Id<UserMarker>,
        roles: &[Id<crate::id::marker::RoleMarker>],
        base: Permissions,
    ) -> Permissions {
        resolve_overwrites(
            base,
            self.permission_overwrites.values(),
            guild_id,
            member_id,
            roles,
        )
    }
}

// ---------------------------------------------------------------------------
// Concrete variants
// ---------------------------------------------------------------------------

/// A guild text or announcement channel (same shape, distinct tags).
#[derive(Clone, Debug, Serialize)]
pub struct TextChannel {
    #[serde(flatten)]
    pub core: ChannelCore,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_per_user: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message_id: Option<Id<MessageMarker>>,
    pub messages: Collection<Message>,
    pub threads: Collection<ThreadChannel>,
}

impl TextChannel {
    fn from_raw(raw: &RawChannel, kind: ChannelType) -> Self {
        let mut channel = Self {
            core: ChannelCore::from_raw(raw, kind),
            topic: None,
            rate_limit_per_user: None,
            last_message_id: None,
            messages: Collection::new(),
            threads: Collection::new(),
        };
        channel.apply_own(raw);
        channel
    }

    fn apply(&mut self, raw: &RawChannel) {
        self.core.apply(raw);
        self.apply_own(raw);
    }

    fn apply_own(&mut self, raw: &RawChannel) {
        raw.topic.apply_to(&mut self.topic);
        if let Some(rate_limit) = raw.rate_limit_per_user {
            self.rate_limit_per_user = Some(rate_limit);
        }
        raw.last_message_id.apply_to(&mut self.last_message_id);
    }
}

/// A guild voice or stage channel.
#[derive(Clone, Debug, Serialize)]
pub struct VoiceChannel {
    #[serde(flatten)]
    pub core: ChannelCore,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_limit: Option<u64>,
    /// Members currently connected, merged in from voice state events.
    pub voice_members: Collection<Member>,
}

impl VoiceChannel {
    fn from_raw(raw: &RawChannel, kind: ChannelType) -> Self {
        let mut channel = Self {
            core: ChannelCore::from_raw(raw, kind),
            bitrate: None,
            user_limit: None,
            voice_members: Collection::new(),
        };
        channel.apply_own(raw);
        channel
    }

    fn apply(&mut self, raw: &RawChannel) {
        self.core.apply(raw);
        self.apply_own(raw);
    }

    fn apply_own(&mut self, raw: &RawChannel) {
        if let Some(bitrate) = raw.bitrate {
            self.bitrate = Some(bitrate);
        }
        if let Some(user_limit) = raw.user_limit {
            self.user_limit = Some(user_limit);
        }
    }
}

/// A guild category.
#[derive(Clone, Debug, Serialize)]
pub struct CategoryChannel {
    #[serde(flatten)]
    pub core: ChannelCore,
}

/// A guild forum channel.
#[derive(Clone, Debug, Serialize)]
pub struct ForumChannel {
    #[serde(flatten)]
    pub core: ChannelCore,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_auto_archive_duration: Option<u64>,
    pub threads: Collection<ThreadChannel>,
}

impl ForumChannel {
    fn from_raw(raw: &RawChannel) -> Self {
        let mut channel = Self {
            core: ChannelCore::from_raw(raw, ChannelType::GuildForum),
            topic: None,
            default_auto_archive_duration: None,
            threads: Collection::new(),
        };
        channel.apply_own(raw);
        channel
    }

    fn apply(&mut self, raw: &RawChannel) {
        self.core.apply(raw);
        self.apply_own(raw);
    }

    fn apply_own(&mut self, raw: &RawChannel) {
        raw.topic.apply_to(&mut self.topic);
        if let Some(duration) = raw.default_auto_archive_duration {
            self.default_auto_archive_duration = Some(duration);
        }
    }
}

/// A thread of any of the three thread kinds.
#[derive(Clone, Debug, Serialize)]
pub struct ThreadChannel {
    pub id: Id<ChannelMarker>,
    #[serde(rename = "type")]
    pub kind: ChannelType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Id<GuildMarker>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Id<ChannelMarker>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Id<UserMarker>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message_id: Option<Id<MessageMarker>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u64>,
    #[serde(skip_serializing_if = "is_false")]
    pub archived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_archive_duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_timestamp: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "is_false")]
    pub locked: bool,
    pub messages: Collection<Message>,
}

impl Entity for ThreadChannel {
    type Marker = ChannelMarker;
    type Raw = RawChannel;
    type Extra = ();

    fn from_raw(raw: RawChannel, _extra: &()) -> Self {
        let kind = raw
            .kind
            .filter(|kind| kind.is_thread())
            .unwrap_or(ChannelType::PublicThread);
        let mut thread = Self {
            id: raw.id,
            kind,
            guild_id: None,
            parent_id: None,
            owner_id: None,
            name: None,
            last_message_id: None,
            message_count: None,
            member_count: None,
            archived: false,
            auto_archive_duration: None,
            archive_timestamp: None,
            locked: false,
            messages: Collection::new(),
        };
        thread.apply(&raw);
        thread
    }

    fn id(&self) -> Id<ChannelMarker> {
        self.id
    }

    fn apply(&mut self, raw: &RawChannel) {
        if let Some(guild_id) = raw.guild_id {
            self.guild_id = Some(guild_id);
        }
        raw.parent_id.apply_to(&mut self.parent_id);
        if let Some(owner_id) = raw.owner_id {
            self.owner_id = Some(owner_id);
        }
        if let Some(name) = &raw.name {
            self.name = Some(name.clone());
        }
        raw.last_message_id.apply_to(&mut self.last_message_id);
        if let Some(message_count) = raw.message_count {
            self.message_count = Some(message_count);
        }
        if let Some(member_count) = raw.member_count {
            self.member_count = Some(member_count);
        }
        if let Some(metadata) = &raw.thread_metadata {
            if let Some(archived) = metadata.archived {
                self.archived = archived;
            }
            if let Some(duration) = metadata.auto_archive_duration {
                self.auto_archive_duration = Some(duration);
            }
            metadata
                .archive_timestamp
                .apply_to(&mut self.archive_timestamp);
            if let Some(locked) = metadata.locked {
                self.locked = locked;
            }
        }
    }
}

/// A direct-message channel.
#[derive(Clone, Debug, Serialize)]
pub struct PrivateChannel {
    pub id: Id<ChannelMarker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<Id<UserMarker>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message_id: Option<Id<MessageMarker>>,
    pub messages: Collection<Message>,
}

impl PrivateChannel {
    fn from_raw(raw: &RawChannel) -> Self {
        let mut channel = Self {
            id: raw.id,
            recipient_id: None,
            last_message_id: None,
            messages: Collection::new(),
        };
        channel.apply(raw);
        channel
    }

    fn apply(&mut self, raw: &RawChannel) {
        if let Some(recipients) = &raw.recipients {
            self.recipient_id = recipients.first().map(|user| user.id);
        }
        raw.last_message_id.apply_to(&mut self.last_message_id);
    }
}

/// A group direct-message channel.
#[derive(Clone, Debug, Serialize)]
pub struct GroupChannel {
    pub id: Id<ChannelMarker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Id<UserMarker>>,
    pub recipient_ids: Vec<Id<UserMarker>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message_id: Option<Id<MessageMarker>>,
    pub messages: Collection<Message>,
}

impl GroupChannel {
    fn from_raw(raw: &RawChannel) -> Self {
        let mut channel = Self {
            id: raw.id,
            name: None,
            icon: None,
            owner_id: None,
            recipient_ids: Vec::new(),
            last_message_id: None,
            messages: Collection::new(),
        };
        channel.apply(raw);
        channel
    }

    fn apply(&mut self, raw: &RawChannel) {
        if let Some(name) = &raw.name {
            self.name = Some(name.clone());
        }
        raw.icon.apply_to(&mut self.icon);
        if let Some(owner_id) = raw.owner_id {
            self.owner_id = Some(owner_id);
        }
        if let Some(recipients) = &raw.recipients {
            self.recipient_ids = recipients.iter().map(|user| user.id).collect();
        }
        raw.last_message_id.apply_to(&mut self.last_message_id);
    }
}

/// The forward-compatibility fallback for unrecognized discriminants.
///
/// `kind` is `None` when the payload carried no `type` key at all; the
/// projection then omits the key rather than inventing a tag.
#[derive(Clone, Debug, Serialize)]
pub struct BaseChannel {
    pub id: Id<ChannelMarker>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ChannelType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Id<GuildMarker>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl BaseChannel {
    fn from_raw(raw: &RawChannel) -> Self {
        let mut channel = Self {
            id: raw.id,
            kind: raw.kind,
            guild_id: None,
            name: None,
        };
        channel.apply(raw);
        channel
    }

    fn apply(&mut self, raw: &RawChannel) {
        if let Some(guild_id) = raw.guild_id {
            self.guild_id = Some(guild_id);
        }
        if let Some(name) = &raw.name {
            self.name = Some(name.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// The union
// ---------------------------------------------------------------------------

/// Any channel, discriminated by the wire `type` tag.
///
/// The variant is fixed at construction time and never changes for the
/// lifetime of the cached object; a later payload with a different tag only
/// has its field content merged.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Channel {
    Text(TextChannel),
    Private(PrivateChannel),
    Voice(VoiceChannel),
    Group(GroupChannel),
    Category(CategoryChannel),
    Announcement(TextChannel),
    AnnouncementThread(ThreadChannel),
    PublicThread(ThreadChannel),
    PrivateThread(ThreadChannel),
    Stage(VoiceChannel),
    Forum(ForumChannel),
    Unknown(BaseChannel),
}

impl Channel {
    /// The channel's discriminant.
    ///
    /// `None` only for a fallback channel whose payload never carried a
    /// `type` key.
    pub fn kind(&self) -> Option<ChannelType> {
        match self {
            Self::Text(_) => Some(ChannelType::GuildText),
            Self::Private(_) => Some(ChannelType::Private),
            Self::Voice(_) => Some(ChannelType::GuildVoice),
            Self::Group(_) => Some(ChannelType::Group),
            Self::Category(_) => Some(ChannelType::GuildCategory),
            Self::Announcement(_) => Some(ChannelType::GuildAnnouncement),
            Self::AnnouncementThread(_) => Some(ChannelType::AnnouncementThread),
            Self::PublicThread(_) => Some(ChannelType::PublicThread),
            Self::PrivateThread(_) => Some(ChannelType::PrivateThread),
            Self::Stage(_) => Some(ChannelType::GuildStageVoice),
            Self::Forum(_) => Some(ChannelType::GuildForum),
            Self::Unknown(channel) => channel.kind,
        }
    }

    /// The channel's name, where the kind has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Text(c) | Self::Announcement(c) => c.core.name.as_deref(),
            Self::Voice(c) | Self::Stage(c) => c.core.name.as_deref(),
            Self::Category(c) => c.core.name.as_deref(),
            Self::Forum(c) => c.core.name.as_deref(),
            Self::Group(c) => c.name.as_deref(),
            Self::AnnouncementThread(c) | Self::PublicThread(c) | Self::PrivateThread(c) => {
                c.name.as_deref()
            }
            Self::Private(_) => None,
            Self::Unknown(c) => c.name.as_deref(),
        }
    }

    /// The owning guild, for guild channel kinds.
    pub fn guild_id(&self) -> Option<Id<GuildMarker>> {
        match self {
            Self::Text(c) | Self::Announcement(c) => c.core.guild_id,
            Self::Voice(c) | Self::Stage(c) => c.core.guild_id,
            Self::Category(c) => c.core.guild_id,
            Self::Forum(c) => c.core.guild_id,
            Self::AnnouncementThread(c) | Self::PublicThread(c) | Self::PrivateThread(c) => {
                c.guild_id
            }
            Self::Private(_) | Self::Group(_) => None,
            Self::Unknown(c) => c.guild_id,
        }
    }

    /// The shared guild-channel core, for kinds that have one.
    pub fn core(&self) -> Option<&ChannelCore> {
        match self {
            Self::Text(c) | Self::Announcement(c) => Some(&c.core),
            Self::Voice(c) | Self::Stage(c) => Some(&c.core),
            Self::Category(c) => Some(&c.core),
            Self::Forum(c) => Some(&c.core),
            _ => None,
        }
    }

    /// The message cache, for kinds that carry one.
    pub fn messages(&self) -> Option<&Collection<Message>> {
        match self {
            Self::Text(c) | Self::Announcement(c) => Some(&c.messages),
            Self::Private(c) => Some(&c.messages),
            Self::Group(c) => Some(&c.messages),
            Self::AnnouncementThread(c) | Self::PublicThread(c) | Self::PrivateThread(c) => {
                Some(&c.messages)
            }
            _ => None,
        }
    }

    /// Mutable access to the message cache, for kinds that carry one.
    pub fn messages_mut(&mut self) -> Option<&mut Collection<Message>> {
        match self {
            Self::Text(c) | Self::Announcement(c) => Some(&mut c.messages),
            Self::Private(c) => Some(&mut c.messages),
            Self::Group(c) => Some(&mut c.messages),
            Self::AnnouncementThread(c) | Self::PublicThread(c) | Self::PrivateThread(c) => {
                Some(&mut c.messages)
            }
            _ => None,
        }
    }

    /// The thread cache, for kinds that carry one.
    pub fn threads(&self) -> Option<&Collection<ThreadChannel>> {
        match self {
            Self::Text(c) | Self::Announcement(c) => Some(&c.threads),
            Self::Forum(c) => Some(&c.threads),
            _ => None,
        }
    }

    /// Mutable access to the thread cache, for kinds that carry one.
    pub fn threads_mut(&mut self) -> Option<&mut Collection<ThreadChannel>> {
        match self {
            Self::Text(c) | Self::Announcement(c) => Some(&mut c.threads),
            Self::Forum(c) => Some(&mut c.threads),
            _ => None,
        }
    }
}

impl Entity for Channel {
    type Marker = ChannelMarker;
    type Raw = RawChannel;
    type Extra = ();

    /// Construct the concrete variant selected by the discriminant.
    ///
    /// An unrecognized or missing tag falls back to [`Channel::Unknown`]
    /// rather than failing.
    fn from_raw(raw: RawChannel, _extra: &()) -> Self {
        match raw.kind {
            Some(ChannelType::GuildText) => Self::Text(TextChannel::from_raw(&raw, ChannelType::GuildText)),
            Some(ChannelType::Private) => Self::Private(PrivateChannel::from_raw(&raw)),
            Some(ChannelType::GuildVoice) => Self::Voice(VoiceChannel::from_raw(&raw, ChannelType::GuildVoice)),
            Some(ChannelType::Group) => Self::Group(GroupChannel::from_raw(&raw)),
            Some(ChannelType::GuildCategory) => Self::Category(CategoryChannel {
                core: ChannelCore::from_raw(&raw, ChannelType::GuildCategory),
            }),
            Some(ChannelType::GuildAnnouncement) => {
                Self::Announcement(TextChannel::from_raw(&raw, ChannelType::GuildAnnouncement))
            }
            Some(ChannelType::AnnouncementThread) => {
                Self::AnnouncementThread(ThreadChannel::from_raw(raw, &()))
            }
            Some(ChannelType::PublicThread) => {
                Self::PublicThread(ThreadChannel::from_raw(raw, &()))
            }
            Some(ChannelType::PrivateThread) => {
                Self::PrivateThread(ThreadChannel::from_raw(raw, &()))
            }
            Some(ChannelType::GuildStageVoice) => {
                Self::Stage(VoiceChannel::from_raw(&raw, ChannelType::GuildStageVoice))
            }
            Some(ChannelType::GuildForum) => Self::Forum(ForumChannel::from_raw(&raw)),
            Some(ChannelType::Unknown(_)) | None => Self::Unknown(BaseChannel::from_raw(&raw)),
        }
    }

    fn id(&self) -> Id<ChannelMarker> {
        match self {
            Self::Text(c) | Self::Announcement(c) => c.core.id,
            Self::Voice(c) | Self::Stage(c) => c.core.id,
            Self::Category(c) => c.core.id,
            Self::Forum(c) => c.core.id,
            Self::Private(c) => c.id,
            Self::Group(c) => c.id,
            Self::AnnouncementThread(c) | Self::PublicThread(c) | Self::PrivateThread(c) => c.id,
            Self::Unknown(c) => c.id,
        }
    }

    fn apply(&mut self, raw: &RawChannel) {
        match self {
            Self::Text(c) | Self::Announcement(c) => c.apply(raw),
            Self::Voice(c) | Self::Stage(c) => c.apply(raw),
            Self::Category(c) => c.core.apply(raw),
            Self::Forum(c) => c.apply(raw),
            Self::Private(c) => c.apply(raw),
            Self::Group(c) => c.apply(raw),
            Self::AnnouncementThread(c) | Self::PublicThread(c) | Self::PrivateThread(c) => {
                c.apply(raw)
            }
            Self::Unknown(c) => c.apply(raw),
        }
    }
}
