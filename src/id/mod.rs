//! Type-safe snowflake IDs with zero-sized marker parameters.
//!
//! Discord issues every resource a 64-bit snowflake that encodes its
//! creation instant: the top 42 bits are milliseconds since the Discord
//! epoch (2015-01-01T00:00:00Z). IDs cross the wire as JSON strings to
//! survive transports that only have IEEE-754 doubles, so [`Id`]
//! deserializes from either a string or an integer and always serializes
//! back as a decimal string.
//!
//! The marker parameter exists purely at the type level; see [`marker`].

pub mod marker;

use std::{
    cmp::Ordering,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    hash::{Hash, Hasher},
    marker::PhantomData,
    num::ParseIntError,
    str::FromStr,
};

use chrono::{DateTime, TimeZone, Utc};
use serde::{
    de::{Deserializer, Error as DeError, Visitor},
    ser::Serializer,
    Deserialize, Serialize,
};

/// The Discord epoch as milliseconds since the Unix epoch
/// (2015-01-01T00:00:00Z).
pub const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

/// Bits occupied by the worker/process/increment fields below the timestamp.
const TIMESTAMP_SHIFT: u32 = 22;

/// ID of a resource, such as the ID of a [channel] or [user].
///
/// The marker parameter `M` ties an ID to one resource kind at compile time
/// and carries no data. Use [`cast`] when a context genuinely re-tags an ID
/// (an overwrite target compared against role IDs, for example).
///
/// [channel]: crate::channel::Channel
/// [user]: crate::user::User
/// [`cast`]: Self::cast
pub struct Id<M> {
    value: u64,
    phantom: PhantomData<fn(M) -> M>,
}

impl<M> Id<M> {
    /// Create an ID from a raw snowflake value.
    pub const fn new(value: u64) -> Self {
        Self {
            value,
            phantom: PhantomData,
        }
    }

    /// The raw snowflake value.
    pub const fn get(self) -> u64 {
        self.value
    }

    /// Re-tag the ID with a different marker.
    pub const fn cast<N>(self) -> Id<N> {
        Id::new(self.value)
    }

    /// Milliseconds since the Unix epoch at which the resource was created.
    ///
    /// Decoded with pure integer arithmetic; the 42-bit timestamp field
    /// exceeds what an f64 bit-shift could represent losslessly.
    pub const fn timestamp_ms(self) -> u64 {
        (self.value >> TIMESTAMP_SHIFT) + DISCORD_EPOCH_MS
    }

    /// The creation instant decoded from the snowflake.
    pub fn created_at(self) -> DateTime<Utc> {
        let ms = self.timestamp_ms();
        Utc.timestamp_millis_opt(ms as i64)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

// Manual impls: derives would bound `M`, which is never instantiated.

impl<M> Clone for Id<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for Id<M> {}

impl<M> Debug for Id<M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("Id(")?;
        Display::fmt(&self.value, f)?;
        f.write_str(")")
    }
}

impl<M> Display for Id<M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.value, f)
    }
}

impl<M> PartialEq for Id<M> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<M> Eq for Id<M> {}

impl<M> Hash for Id<M> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<M> PartialOrd for Id<M> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<M> Ord for Id<M> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<M> From<u64> for Id<M> {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl<M> FromStr for Id<M> {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self::new)
    }
}

impl<M> Serialize for Id<M> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.value)
    }
}

struct IdVisitor<M> {
    phantom: PhantomData<fn(M) -> M>,
}

impl<'de, M> Visitor<'de> for IdVisitor<M> {
    type Value = Id<M>;

    fn expecting(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("a snowflake as a string or integer")
    }

    fn visit_u64<E: DeError>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Id::new(value))
    }

    fn visit_str<E: DeError>(self, value: &str) -> Result<Self::Value, E> {
        value.parse().map_err(DeError::custom)
    }
}

impl<'de, M> Deserialize<'de> for Id<M> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(IdVisitor {
            phantom: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{marker::GuildMarker, marker::UserMarker, Id};

    // The fixture pair from the Discord developer docs: this snowflake was
    // minted at 2016-04-30T11:18:25.796Z.
    const SAMPLE_ID: u64 = 175_928_847_299_117_063;
    const SAMPLE_MS: u64 = 1_462_015_105_796;

    #[test]
    fn timestamp_decode_matches_fixture() {
        let id = Id::<GuildMarker>::new(SAMPLE_ID);
        assert_eq!(id.timestamp_ms(), SAMPLE_MS);
        assert_eq!(id.created_at().timestamp_millis() as u64, SAMPLE_MS);
    }

    #[test]
    fn deserializes_from_string_and_integer() {
        let from_str: Id<UserMarker> = serde_json::from_str("\"12345\"").unwrap();
        let from_int: Id<UserMarker> = serde_json::from_str("12345").unwrap();
        assert_eq!(from_str, from_int);
        assert_eq!(from_str.get(), 12345);
    }

    #[test]
    fn serializes_as_decimal_string() {
        // Above 2^53: would corrupt if treated as an f64 anywhere along the way.
        let id = Id::<UserMarker>::new(SAMPLE_ID);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", SAMPLE_ID));
    }

    #[test]
    fn cast_retags_without_changing_value() {
        let user = Id::<UserMarker>::new(77);
        let generic = user.cast::<super::marker::GenericMarker>();
        assert_eq!(generic.get(), 77);
    }

    #[test]
    fn display_and_fromstr_round_trip() {
        let id = Id::<GuildMarker>::new(9_001);
        let parsed: Id<GuildMarker> = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn serde_tokens() {
        serde_test::assert_ser_tokens(
            &Id::<UserMarker>::new(SAMPLE_ID),
            &[serde_test::Token::Str("175928847299117063")],
        );
    }
}
