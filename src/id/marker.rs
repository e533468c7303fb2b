//! Markers for various resource types, such as channels or users.
//!
//! Markers themselves perform no logical action, and are only used to
//! ensure that IDs of incorrect types aren't used. If IDs were only 64-bit
//! integers then a role's ID may be erroneously used in the place of where
//! a user's ID is required; by using markers it can be ensured that only an
//! ID with a [`RoleMarker`] can be used where a role's ID is required.

/// Marker for application IDs.
///
/// Used by interaction payloads, which carry the owning application's ID.
#[derive(Debug)]
#[non_exhaustive]
pub struct ApplicationMarker;

/// Marker for channel IDs.
///
/// Types such as [`Channel`] or [`Message`] use this ID marker.
///
/// [`Channel`]: crate::channel::Channel
/// [`Message`]: crate::message::Message
#[derive(Debug)]
#[non_exhaustive]
pub struct ChannelMarker;

/// Marker for application command IDs.
#[derive(Debug)]
#[non_exhaustive]
pub struct CommandMarker;

/// Marker for generic IDs.
///
/// Used where an ID's resource kind is only known at runtime, such as a
/// [`PermissionOverwrite`] target (a role, a member, or the guild itself).
///
/// [`PermissionOverwrite`]: crate::permission::PermissionOverwrite
#[derive(Debug)]
#[non_exhaustive]
pub struct GenericMarker;

/// Marker for guild IDs.
///
/// Types such as [`Guild`] or [`Member`] use this ID marker.
///
/// [`Guild`]: crate::guild::Guild
/// [`Member`]: crate::guild::Member
#[derive(Debug)]
#[non_exhaustive]
pub struct GuildMarker;

/// Marker for interaction IDs.
///
/// Types such as [`Interaction`] use this ID marker.
///
/// [`Interaction`]: crate::interaction::Interaction
#[derive(Debug)]
#[non_exhaustive]
pub struct InteractionMarker;

/// Marker for message IDs.
///
/// Types such as [`Message`] use this ID marker.
///
/// [`Message`]: crate::message::Message
#[derive(Debug)]
#[non_exhaustive]
pub struct MessageMarker;

/// Marker for role IDs.
///
/// Types such as [`Role`] or [`Member::roles`] use this ID marker.
///
/// [`Role`]: crate::guild::Role
/// [`Member::roles`]: crate::guild::Member::roles
#[derive(Debug)]
#[non_exhaustive]
pub struct RoleMarker;

/// Marker for user IDs.
///
/// Types such as [`User`] or [`Member`] use this ID marker.
///
/// [`User`]: crate::user::User
/// [`Member`]: crate::guild::Member
#[derive(Debug)]
#[non_exhaustive]
pub struct UserMarker;
