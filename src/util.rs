//! Shared serde machinery for sparse payloads.
//!
//! Discord sends partial objects: a key that is absent means "unchanged",
//! while an explicit `null` means "present but cleared". [`Maybe`] keeps all
//! three states representable so update code can check presence instead of
//! truthiness.

use std::fmt::{Formatter, Result as FmtResult};

use serde::{
    de::Deserializer,
    ser::Serializer,
    Deserialize, Serialize,
};

/// Tri-state for a nullable field in a partial payload.
///
/// With `#[serde(default)]` on the field, a missing key deserializes as
/// [`Maybe::Absent`], JSON `null` as [`Maybe::Null`], and anything else as
/// [`Maybe::Value`]. Pair with
/// `#[serde(skip_serializing_if = "Maybe::is_absent")]` so absent fields are
/// omitted on re-serialization rather than padded with `null`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Maybe<T> {
    /// The key was not present in the payload.
    #[default]
    Absent,
    /// The key was present and explicitly `null`.
    Null,
    /// The key was present with a value.
    Value(T),
}

impl<T> Maybe<T> {
    /// Whether the key was missing entirely.
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Whether the key was present and `null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the inner value, if any.
    pub const fn as_ref(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Convert into an `Option`, collapsing `Absent` and `Null`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl<T: Clone> Maybe<T> {
    /// Merge this payload field into a cached slot.
    ///
    /// `Absent` leaves the slot untouched, `Null` clears it, and `Value`
    /// replaces it. This is the single place the present-vs-absent rule is
    /// implemented for nullable fields.
    pub fn apply_to(&self, slot: &mut Option<T>) {
        match self {
            Self::Absent => {}
            Self::Null => *slot = None,
            Self::Value(value) => *slot = Some(value.clone()),
        }
    }
}

impl<T> From<Option<T>> for Maybe<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Value(value),
            None => Self::Null,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Maybe<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::deserialize(deserializer).map(Self::from)
    }
}

impl<T: Serialize> Serialize for Maybe<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Serializing `Absent` only happens when the skip attribute was
            // forgotten; emit `null` rather than fail.
            Self::Absent | Self::Null => serializer.serialize_none(),
            Self::Value(value) => serializer.serialize_some(value),
        }
    }
}

impl<T> std::fmt::Display for Maybe<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Absent => f.write_str("<absent>"),
            Self::Null => f.write_str("null"),
            Self::Value(value) => value.fmt(f),
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
pub(crate) fn is_false(value: &bool) -> bool {
    !value
}
