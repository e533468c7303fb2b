//! Typed, identity-preserving client state for Discord payloads.
//!
//! The crate caches sparse wire payloads into long-lived typed entities.
//! Three properties hold everywhere:
//!
//! * **Identity preservation.** Re-delivering a payload for a cached entity
//!   merges into the existing object instead of replacing it, so data one
//!   payload omitted survives the next.
//! * **Presence-driven merges.** A key absent from a payload means
//!   "unchanged"; an explicit `null` means "cleared". See [`util::Maybe`].
//! * **Single writer.** [`state::ClientState`] is the one mutation root;
//!   entities carry IDs, never back-references, so the borrow checker
//!   enforces the ownership tree.
//!
//! Start at [`ClientState`] for ingestion, [`Collection`] for the per-type
//! store, and [`channel::Channel`] / [`interaction::Interaction`] for the
//! discriminated unions.

// ===========================================================================
// Modules
// ===========================================================================

/// The channel union and its per-kind variants.
pub mod channel;

/// The generic entity store and the `Entity` construction/merge contract.
pub mod collection;

/// Error type for cache operations.
pub mod error;

/// Guilds, roles, and members.
pub mod guild;

/// Type-safe snowflake IDs with marker types.
pub mod id;

/// The interaction union and its per-kind variants.
pub mod interaction;

/// Messages and attachments.
pub mod message;

/// Permission bit flags, overwrites, and resolution.
pub mod permission;

/// The single-owner cache root.
pub mod state;

/// Users.
pub mod user;

/// Tri-state presence and other serde helpers.
pub mod util;

// ===========================================================================
// Convenience re-exports
// ===========================================================================

pub use self::{
    channel::{Channel, ChannelType},
    collection::{Collection, Entity, Incoming, RawEntity, Resolved},
    error::CacheError,
    guild::{Guild, Member, Role},
    id::Id,
    interaction::{Interaction, InteractionType},
    message::Message,
    permission::{PermissionOverwrite, Permissions},
    state::ClientState,
    user::User,
    util::Maybe,
};
