//! Guild, role, and member entities.
//!
//! A guild owns its role and member collections; both are created once at
//! construction and merged into as nested arrays arrive in guild payloads.
//! Role and member payloads do not redundantly embed their owning guild's
//! ID, so it is threaded through as the `Extra` construction argument.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    collection::{Collection, Entity, Incoming, RawEntity},
    id::{
        marker::{GuildMarker, RoleMarker, UserMarker},
        Id,
    },
    permission::Permissions,
    user::RawUser,
    util::{is_false, Maybe},
};

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// A cached guild role.
#[derive(Clone, Debug, Serialize)]
pub struct Role {
    pub id: Id<RoleMarker>,
    pub guild_id: Id<GuildMarker>,
    pub name: String,
    pub permissions: Permissions,
    pub position: i64,
    pub color: u32,
    #[serde(skip_serializing_if = "is_false")]
    pub hoist: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub managed: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub mentionable: bool,
}

/// Sparse wire form of a role.
#[derive(Clone, Debug, Deserialize)]
pub struct RawRole {
    pub id: Id<RoleMarker>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub permissions: Option<Permissions>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub color: Option<u32>,
    #[serde(default)]
    pub hoist: Option<bool>,
    #[serde(default)]
    pub managed: Option<bool>,
    #[serde(default)]
    pub mentionable: Option<bool>,
}

impl RawEntity for RawRole {
    type Marker = RoleMarker;

    fn entity_id(&self) -> Option<Id<RoleMarker>> {
        Some(self.id)
    }
}

impl Entity for Role {
    type Marker = RoleMarker;
    type Raw = RawRole;
    /// The owning guild's ID; role payloads don't carry it.
    type Extra = Id<GuildMarker>;

    fn from_raw(raw: RawRole, guild_id: &Id<GuildMarker>) -> Self {
        let mut role = Self {
            id: raw.id,
            guild_id: *guild_id,
            name: String::new(),
            permissions: Permissions::empty(),
            position: 0,
            color: 0,
            hoist: false,
            managed: false,
            mentionable: false,
        };
        role.apply(&raw);
        role
    }

    fn id(&self) -> Id<RoleMarker> {
        self.id
    }

    fn apply(&mut self, raw: &RawRole) {
        if let Some(name) = &raw.name {
            self.name = name.clone();
        }
        if let Some(permissions) = raw.permissions {
            self.permissions = permissions;
        }
        if let Some(position) = raw.position {
            self.position = position;
        }
        if let Some(color) = raw.color {
            self.color = color;
        }
        if let Some(hoist) = raw.hoist {
            self.hoist = hoist;
        }
        if let Some(managed) = raw.managed {
            self.managed = managed;
        }
        if let Some(mentionable) = raw.mentionable {
            self.mentionable = mentionable;
        }
    }
}

// ---------------------------------------------------------------------------
// Member
// ---------------------------------------------------------------------------

/// A cached guild member, keyed by the member's user ID.
#[derive(Clone, Debug, Serialize)]
pub struct Member {
    pub id: Id<UserMarker>,
    pub guild_id: Id<GuildMarker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nick: Option<String>,
    pub roles: Vec<Id<RoleMarker>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "is_false")]
    pub deaf: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub mute: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub pending: bool,
}

/// Sparse wire form of a member. The identity comes from the embedded user.
#[derive(Clone, Debug, Deserialize)]
pub struct RawMember {
    #[serde(default)]
    pub user: Option<RawUser>,
    #[serde(default)]
    pub nick: Maybe<String>,
    #[serde(default)]
    pub roles: Option<Vec<Id<RoleMarker>>>,
    #[serde(default)]
    pub joined_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub deaf: Option<bool>,
    #[serde(default)]
    pub mute: Option<bool>,
    #[serde(default)]
    pub pending: Option<bool>,
}

impl RawEntity for RawMember {
    type Marker = UserMarker;

    fn entity_id(&self) -> Option<Id<UserMarker>> {
        self.user.as_ref().map(|user| user.id)
    }
}

impl Entity for Member {
    type Marker = UserMarker;
    type Raw = RawMember;
    /// The owning guild's ID; member payloads don't carry it.
    type Extra = Id<GuildMarker>;

    fn from_raw(raw: RawMember, guild_id: &Id<GuildMarker>) -> Self {
        // A missing user is rejected by Collection::update before this runs.
        debug_assert!(
            raw.entity_id().is_some(),
            "member payload without an embedded user"
        );
        let id = raw.entity_id().unwrap_or(Id::new(0));
        let mut member = Self {
            id,
            guild_id: *guild_id,
            nick: None,
            roles: Vec::new(),
            joined_at: None,
            deaf: false,
            mute: false,
            pending: false,
        };
        member.apply(&raw);
        member
    }

    fn id(&self) -> Id<UserMarker> {
        self.id
    }

    fn apply(&mut self, raw: &RawMember) {
        raw.nick.apply_to(&mut self.nick);
        if let Some(roles) = &raw.roles {
            self.roles = roles.clone();
        }
        if let Some(joined_at) = raw.joined_at {
            self.joined_at = Some(joined_at);
        }
        if let Some(deaf) = raw.deaf {
            self.deaf = deaf;
        }
        if let Some(mute) = raw.mute {
            self.mute = mute;
        }
        if let Some(pending) = raw.pending {
            self.pending = pending;
        }
    }
}

// ---------------------------------------------------------------------------
// Guild
// ---------------------------------------------------------------------------

/// A cached guild with its role and member collections.
#[derive(Clone, Debug, Serialize)]
pub struct Guild {
    pub id: Id<GuildMarker>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Id<UserMarker>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u64>,
    pub roles: Collection<Role>,
    pub members: Collection<Member>,
}

/// Sparse wire form of a guild. Nested `channels` are routed by the owning
/// [`ClientState`], not merged here.
///
/// [`ClientState`]: crate::state::ClientState
#[derive(Clone, Debug, Deserialize)]
pub struct RawGuild {
    pub id: Id<GuildMarker>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icon: Maybe<String>,
    #[serde(default)]
    pub owner_id: Option<Id<UserMarker>>,
    #[serde(default)]
    pub member_count: Option<u64>,
    #[serde(default)]
    pub roles: Option<Vec<RawRole>>,
    #[serde(default)]
    pub members: Option<Vec<RawMember>>,
    #[serde(default)]
    pub channels: Option<Vec<crate::channel::RawChannel>>,
}

impl RawEntity for RawGuild {
    type Marker = GuildMarker;

    fn entity_id(&self) -> Option<Id<GuildMarker>> {
        Some(self.id)
    }
}

impl Entity for Guild {
    type Marker = GuildMarker;
    type Raw = RawGuild;
    type Extra = ();

    fn from_raw(raw: RawGuild, _extra: &()) -> Self {
        let mut guild = Self {
            id: raw.id,
            name: String::new(),
            icon: None,
            owner_id: None,
            member_count: None,
            roles: Collection::new(),
            members: Collection::new(),
        };
        guild.apply(&raw);
        guild
    }

    fn id(&self) -> Id<GuildMarker> {
        self.id
    }

    fn apply(&mut self, raw: &RawGuild) {
        if let Some(name) = &raw.name {
            self.name = name.clone();
        }
        raw.icon.apply_to(&mut self.icon);
        if let Some(owner_id) = raw.owner_id {
            self.owner_id = Some(owner_id);
        }
        if let Some(member_count) = raw.member_count {
            self.member_count = Some(member_count);
        }
        let guild_id = self.id;
        for role in raw.roles.iter().flatten() {
            // RawRole's id is a required field, so this cannot fail.
            let _ = self.roles.update(Incoming::Raw(role.clone()), &guild_id);
        }
        for member in raw.members.iter().flatten() {
            if let Err(error) = self.members.update(Incoming::Raw(member.clone()), &guild_id) {
                warn!(%guild_id, %error, "skipping embedded member");
            }
        }
    }
}

impl Guild {
    /// The member's guild-level base permissions: the `@everyone` role
    /// (whose ID equals the guild's) unioned with each held role.
    ///
    /// This is the input to channel-level overwrite resolution; a result
    /// containing `ADMINISTRATOR` collapses to the full mask there.
    pub fn base_permissions(&self, member: &Member) -> Permissions {
        let mut permissions = self
            .roles
            .get(self.id.cast())
            .map(|role| role.permissions)
            .unwrap_or_default();
        for role_id in &member.roles {
            if let Some(role) = self.roles.get(*role_id) {
                permissions |= role.permissions;
            }
        }
        permissions
    }
}
