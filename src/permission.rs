//! Permission bitmasks and channel-level overwrite resolution.
//!
//! Bitmasks cross the wire as decimal strings, since several bits sit above
//! what an IEEE-754 double can carry losslessly, and are parsed into a
//! native `u64`-backed [`bitflags`] set on ingestion.

use std::fmt::{Formatter, Result as FmtResult};

use bitflags::bitflags;
use serde::{
    de::{Deserializer, Error as DeError, Visitor},
    ser::Serializer,
    Deserialize, Serialize,
};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::{
    collection::{Entity, RawEntity},
    id::{
        marker::{GenericMarker, GuildMarker, RoleMarker, UserMarker},
        Id,
    },
};

bitflags! {
    /// The documented Discord permission bits.
    ///
    /// Unknown bits received from the wire are retained so that re-serialized
    /// masks round-trip even when Discord ships a permission this crate does
    /// not know about yet.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct Permissions: u64 {
        const CREATE_INSTANT_INVITE = 1;
        const KICK_MEMBERS = 1 << 1;
        const BAN_MEMBERS = 1 << 2;
        const ADMINISTRATOR = 1 << 3;
        const MANAGE_CHANNELS = 1 << 4;
        const MANAGE_GUILD = 1 << 5;
        const ADD_REACTIONS = 1 << 6;
        const VIEW_AUDIT_LOG = 1 << 7;
        const PRIORITY_SPEAKER = 1 << 8;
        const STREAM = 1 << 9;
        const VIEW_CHANNEL = 1 << 10;
        const SEND_MESSAGES = 1 << 11;
        const SEND_TTS_MESSAGES = 1 << 12;
        const MANAGE_MESSAGES = 1 << 13;
        const EMBED_LINKS = 1 << 14;
        const ATTACH_FILES = 1 << 15;
        const READ_MESSAGE_HISTORY = 1 << 16;
        const MENTION_EVERYONE = 1 << 17;
        const USE_EXTERNAL_EMOJIS = 1 << 18;
        const VIEW_GUILD_INSIGHTS = 1 << 19;
        const CONNECT = 1 << 20;
        const SPEAK = 1 << 21;
        const MUTE_MEMBERS = 1 << 22;
        const DEAFEN_MEMBERS = 1 << 23;
        const MOVE_MEMBERS = 1 << 24;
        const USE_VAD = 1 << 25;
        const CHANGE_NICKNAME = 1 << 26;
        const MANAGE_NICKNAMES = 1 << 27;
        const MANAGE_ROLES = 1 << 28;
        const MANAGE_WEBHOOKS = 1 << 29;
        const MANAGE_GUILD_EXPRESSIONS = 1 << 30;
        const USE_APPLICATION_COMMANDS = 1 << 31;
        const REQUEST_TO_SPEAK = 1 << 32;
        const MANAGE_EVENTS = 1 << 33;
        const MANAGE_THREADS = 1 << 34;
        const CREATE_PUBLIC_THREADS = 1 << 35;
        const CREATE_PRIVATE_THREADS = 1 << 36;
        const USE_EXTERNAL_STICKERS = 1 << 37;
        const SEND_MESSAGES_IN_THREADS = 1 << 38;
        const USE_EMBEDDED_ACTIVITIES = 1 << 39;
        const MODERATE_MEMBERS = 1 << 40;
    }
}

impl Serialize for Permissions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.bits())
    }
}

struct PermissionsVisitor;

impl Visitor<'_> for PermissionsVisitor {
    type Value = Permissions;

    fn expecting(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("a permission bitmask as a decimal string or integer")
    }

    fn visit_u64<E: DeError>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Permissions::from_bits_retain(value))
    }

    fn visit_str<E: DeError>(self, value: &str) -> Result<Self::Value, E> {
        value
            .parse::<u64>()
            .map(Permissions::from_bits_retain)
            .map_err(DeError::custom)
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PermissionsVisitor)
    }
}

/// What a [`PermissionOverwrite`]'s target ID refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize_repr, Serialize_repr)]
#[repr(u8)]
pub enum OverwriteType {
    Role = 0,
    Member = 1,
}

/// A channel-level allow/deny pair keyed to a role, a member, or the guild's
/// own ID (the `@everyone` pseudo-role).
///
/// `allow` and `deny` are disjoint by convention; the resolution algorithm
/// does not rely on it.
#[derive(Clone, Debug, Serialize)]
pub struct PermissionOverwrite {
    pub id: Id<GenericMarker>,
    #[serde(rename = "type")]
    pub kind: OverwriteType,
    pub allow: Permissions,
    pub deny: Permissions,
}

/// Sparse wire form of a permission overwrite.
#[derive(Clone, Debug, Deserialize)]
pub struct RawPermissionOverwrite {
    pub id: Id<GenericMarker>,
    #[serde(rename = "type")]
    pub kind: OverwriteType,
    #[serde(default)]
    pub allow: Option<Permissions>,
    #[serde(default)]
    pub deny: Option<Permissions>,
}

impl RawEntity for RawPermissionOverwrite {
    type Marker = GenericMarker;

    fn entity_id(&self) -> Option<Id<GenericMarker>> {
        Some(self.id)
    }
}

impl Entity for PermissionOverwrite {
    type Marker = GenericMarker;
    type Raw = RawPermissionOverwrite;
    type Extra = ();

    fn from_raw(raw: RawPermissionOverwrite, _extra: &()) -> Self {
        Self {
            id: raw.id,
            kind: raw.kind,
            allow: raw.allow.unwrap_or_default(),
            deny: raw.deny.unwrap_or_default(),
        }
    }

    fn id(&self) -> Id<GenericMarker> {
        self.id
    }

    fn apply(&mut self, raw: &RawPermissionOverwrite) {
        self.kind = raw.kind;
        if let Some(allow) = raw.allow {
            self.allow = allow;
        }
        if let Some(deny) = raw.deny {
            self.deny = deny;
        }
    }
}

/// Resolve a member's effective permissions in a channel.
///
/// Fixed precedence, per the platform rules:
///
/// 1. An `ADMINISTRATOR` base bypasses every overwrite and yields the full
///    mask.
/// 2. The `@everyone` overwrite (keyed by the guild's own ID) applies first.
/// 3. All overwrites matching the member's roles are *accumulated* into one
///    combined allow and one combined deny, then applied as a single step.
///    Applying them one at a time is a different (wrong) algorithm: when one
///    role allows a bit another denies, the combined deny is subtracted
///    before the combined allow is added back, so allow wins across roles.
/// 4. The member-specific overwrite applies last.
///
/// `base` is the member's role-derived guild-level mask, supplied by the
/// caller (see [`Guild::base_permissions`]).
///
/// [`Guild::base_permissions`]: crate::guild::Guild::base_permissions
pub fn resolve_overwrites<'a>(
    base: Permissions,
    overwrites: impl Iterator<Item = &'a PermissionOverwrite> + Clone,
    guild_id: Id<GuildMarker>,
    member_id: Id<UserMarker>,
    roles: &[Id<RoleMarker>],
) -> Permissions {
    if base.contains(Permissions::ADMINISTRATOR) {
        return Permissions::all();
    }

    let mut permissions = base;

    let everyone_id: Id<GenericMarker> = guild_id.cast();
    if let Some(overwrite) = overwrites.clone().find(|o| o.id == everyone_id) {
        permissions = (permissions & !overwrite.deny) | overwrite.allow;
    }

    let mut allow = Permissions::empty();
    let mut deny = Permissions::empty();
    for overwrite in overwrites.clone() {
        if overwrite.kind == OverwriteType::Role && roles.contains(&overwrite.id.cast()) {
            allow |= overwrite.allow;
            deny |= overwrite.deny;
        }
    }
    permissions = (permissions & !deny) | allow;

    let member_target: Id<GenericMarker> = member_id.cast();
    if let Some(overwrite) = overwrites
        .into_iter()
        .find(|o| o.kind == OverwriteType::Member && o.id == member_target)
    {
        permissions = (permissions & !overwrite.deny) | overwrite.allow;
    }

    permissions
}

#[cfg(test)]
mod tests {
    use super::{
        resolve_overwrites, OverwriteType, PermissionOverwrite, Permissions,
    };
    use crate::id::Id;

    const GUILD: u64 = 100;
    const MEMBER: u64 = 200;
    const R1: u64 = 301;
    const R2: u64 = 302;

    fn role_overwrite(id: u64, allow: Permissions, deny: Permissions) -> PermissionOverwrite {
        PermissionOverwrite {
            id: Id::new(id),
            kind: OverwriteType::Role,
            allow,
            deny,
        }
    }

    #[test]
    fn serde_round_trips_as_decimal_string() {
        let mask = Permissions::MODERATE_MEMBERS | Permissions::SEND_MESSAGES;
        let json = serde_json::to_string(&mask).unwrap();
        // 1 << 40 is above 2^39; a string keeps it transport-safe.
        assert_eq!(json, format!("\"{}\"", mask.bits()));

        let parsed: Permissions = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, mask);
    }

    #[test]
    fn deserialize_retains_unknown_bits() {
        let parsed: Permissions = serde_json::from_str("\"2251799813685248\"").unwrap();
        assert_eq!(parsed.bits(), 1 << 51);
    }

    #[test]
    fn administrator_short_circuits_all_overwrites() {
        // Channel denies everything for @everyone; admin still gets it all.
        let overwrites = vec![PermissionOverwrite {
            id: Id::new(GUILD),
            kind: OverwriteType::Role,
            allow: Permissions::empty(),
            deny: Permissions::all(),
        }];
        let result = resolve_overwrites(
            Permissions::ADMINISTRATOR,
            overwrites.iter(),
            Id::new(GUILD),
            Id::new(MEMBER),
            &[],
        );
        assert_eq!(result, Permissions::all());
    }

    #[test]
    fn role_overwrites_combine_before_applying() {
        // R1 allows SEND_MESSAGES, R2 denies it. Combined-then-applied:
        // the accumulated deny is subtracted first, the accumulated allow
        // added back, so the allow wins across different role overwrites.
        let overwrites = vec![
            role_overwrite(R1, Permissions::SEND_MESSAGES, Permissions::empty()),
            role_overwrite(R2, Permissions::empty(), Permissions::SEND_MESSAGES),
        ];
        let result = resolve_overwrites(
            Permissions::VIEW_CHANNEL,
            overwrites.iter(),
            Id::new(GUILD),
            Id::new(MEMBER),
            &[Id::new(R1), Id::new(R2)],
        );
        assert!(result.contains(Permissions::SEND_MESSAGES));

        // A deny only sticks when no matching role allows the same bit.
        let overwrites = vec![
            role_overwrite(R1, Permissions::empty(), Permissions::empty()),
            role_overwrite(R2, Permissions::empty(), Permissions::SEND_MESSAGES),
        ];
        let result = resolve_overwrites(
            Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES,
            overwrites.iter(),
            Id::new(GUILD),
            Id::new(MEMBER),
            &[Id::new(R1), Id::new(R2)],
        );
        assert!(!result.contains(Permissions::SEND_MESSAGES));
        assert!(result.contains(Permissions::VIEW_CHANNEL));
    }

    #[test]
    fn everyone_then_roles_then_member_precedence() {
        let overwrites = vec![
            // @everyone: deny VIEW_CHANNEL.
            role_overwrite(GUILD, Permissions::empty(), Permissions::VIEW_CHANNEL),
            // R1: allow it back.
            role_overwrite(R1, Permissions::VIEW_CHANNEL, Permissions::empty()),
            // Member-specific: deny again, highest precedence.
            PermissionOverwrite {
                id: Id::new(MEMBER),
                kind: OverwriteType::Member,
                allow: Permissions::empty(),
                deny: Permissions::VIEW_CHANNEL,
            },
        ];
        let result = resolve_overwrites(
            Permissions::VIEW_CHANNEL,
            overwrites.iter(),
            Id::new(GUILD),
            Id::new(MEMBER),
            &[Id::new(R1)],
        );
        assert!(!result.contains(Permissions::VIEW_CHANNEL));
    }

    #[test]
    fn overwrites_only_match_listed_roles() {
        let overwrites = vec![role_overwrite(
            R2,
            Permissions::empty(),
            Permissions::SEND_MESSAGES,
        )];
        // Member does not hold R2; the deny must not apply.
        let result = resolve_overwrites(
            Permissions::SEND_MESSAGES,
            overwrites.iter(),
            Id::new(GUILD),
            Id::new(MEMBER),
            &[Id::new(R1)],
        );
        assert!(result.contains(Permissions::SEND_MESSAGES));
    }
}
