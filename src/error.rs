//! Error type for cache operations.
//!
//! The cache performs no I/O, so every variant here is either a caller
//! contract violation or a payload that cannot be keyed. Expected-absence
//! conditions (an uncached cross-reference) are *not* errors; they surface
//! as [`Resolved::Uncached`] stand-ins instead.
//!
//! [`Resolved::Uncached`]: crate::collection::Resolved::Uncached

use crate::id::{
    marker::{ChannelMarker, GuildMarker},
    Id,
};

#[derive(Debug)]
pub enum CacheError {
    /// A raw payload carried no usable identity (e.g. a member payload with
    /// no embedded user object).
    MissingIdentity,
    /// A message payload referenced a channel the cache has never seen.
    UncachedChannel(Id<ChannelMarker>),
    /// A member payload referenced a guild the cache has never seen.
    UncachedGuild(Id<GuildMarker>),
    /// A message payload was routed to a channel kind with no message store
    /// (category, voice without text, unknown fallback).
    NotTextable(Id<ChannelMarker>),
    /// A required interaction option was absent from the payload.
    ///
    /// Distinct from an optional option being absent, which is `None`.
    MissingOption {
        name: String,
    },
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::MissingIdentity => {
                f.write_str("raw payload carries no identity; cannot be cached")
            }
            CacheError::UncachedChannel(id) => {
                write!(f, "channel {} is not cached", id)
            }
            CacheError::UncachedGuild(id) => {
                write!(f, "guild {} is not cached", id)
            }
            CacheError::NotTextable(id) => {
                write!(f, "channel {} has no message store", id)
            }
            CacheError::MissingOption { name } => {
                write!(f, "required interaction option {:?} is absent", name)
            }
        }
    }
}

impl std::error::Error for CacheError {}

#[cfg(test)]
mod tests {
    use super::CacheError;
    use crate::id::Id;

    #[test]
    fn display_names_the_violated_contract() {
        let err = CacheError::MissingOption {
            name: "query".to_owned(),
        };
        assert_eq!(err.to_string(), "required interaction option \"query\" is absent");

        let err = CacheError::UncachedChannel(Id::new(42));
        assert_eq!(err.to_string(), "channel 42 is not cached");
    }
}
