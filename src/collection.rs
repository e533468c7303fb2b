//! The keyed entity cache and the contracts it is built on.
//!
//! Every cacheable object implements [`Entity`]: a stable snowflake
//! identity, a constructor from a raw payload, and an in-place sparse merge.
//! [`Collection`] is the single mutation point for "raw payload in, live
//! cached entity out": it guarantees at most one live instance per ID and
//! dispatches construction vs. merge so callers never have to care which
//! happened.

use std::collections::{hash_map, HashMap};

use serde::{ser::SerializeSeq, Serialize, Serializer};
use serde_json::Value;

use crate::{error::CacheError, id::Id};

/// A raw wire payload that may carry an identity.
///
/// Raw structs are sparse serde mirrors of the wire schema. Most carry a
/// required `id`; the exceptions (member payloads identify themselves via an
/// embedded user) return `None` and are rejected by [`Collection::update`].
pub trait RawEntity {
    /// The marker of the ID this payload is keyed by.
    type Marker;

    /// The identity of the resource this payload describes, if present.
    fn entity_id(&self) -> Option<Id<Self::Marker>>;
}

/// A cacheable object with a stable identity and a sparse-merge contract.
///
/// Implementations must uphold two rules:
///
/// - `apply` only touches fields whose key is present in the raw payload
///   (a presence check, never a truthiness check) and is idempotent when
///   re-applied with the same payload.
/// - child [`Collection`]s are created once in `from_raw` and only merged
///   into afterwards; the container is never replaced.
pub trait Entity: Sized {
    /// Marker type of this entity's ID.
    type Marker;

    /// The raw wire payload this entity is built from and merged with.
    type Raw: RawEntity<Marker = Self::Marker>;

    /// Out-of-band construction context not present in the payload itself
    /// (a role's owning guild ID, a message's channel ID). `()` when the
    /// payload is self-describing.
    type Extra;

    /// Construct a fresh entity from a raw payload.
    fn from_raw(raw: Self::Raw, extra: &Self::Extra) -> Self;

    /// The entity's identity. Immutable after construction.
    fn id(&self) -> Id<Self::Marker>;

    /// Merge a sparse raw payload into this entity in place.
    fn apply(&mut self, raw: &Self::Raw);

    /// Milliseconds since the Unix epoch at which the resource was created,
    /// decoded from the snowflake.
    fn created_at_ms(&self) -> u64 {
        self.id().timestamp_ms()
    }

    /// Project the entity to a plain JSON value.
    ///
    /// The shape is the entity's `Serialize` impl (IDs and permission
    /// bitmasks as decimal strings, absent fields omitted) plus a derived
    /// `created_at` millisecond timestamp.
    fn to_json(&self) -> Value
    where
        Self: Serialize,
    {
        let mut value = serde_json::to_value(self).unwrap_or(Value::Null);
        if let Value::Object(map) = &mut value {
            map.insert("created_at".to_owned(), Value::from(self.created_at_ms()));
        }
        value
    }
}

/// Input to [`Collection::update`]: either an already-materialized entity or
/// a raw payload still to be dispatched.
///
/// Making the two cases an explicit sum keeps the construct-vs-merge branch
/// exhaustive instead of a runtime "is this a live instance?" check.
pub enum Incoming<E: Entity> {
    /// An entity the caller already constructed; its identity is known fresh.
    Materialized(E),
    /// A raw partial payload to merge or construct from.
    Raw(E::Raw),
}

/// A cross-collection reference, resolved through the cache.
///
/// An uncached target is normal under eventual consistency: the lookup
/// yields a stand-in carrying only the ID rather than an error, and never
/// triggers I/O.
#[derive(Debug)]
pub enum Resolved<'a, E: Entity> {
    /// The target is live in the cache.
    Cached(&'a E),
    /// The target has not been observed; only its ID is known.
    Uncached(Id<E::Marker>),
}

impl<'a, E: Entity> Resolved<'a, E> {
    /// The identity of the referenced entity, cached or not.
    pub fn id(&self) -> Id<E::Marker> {
        match self {
            Self::Cached(entity) => entity.id(),
            Self::Uncached(id) => *id,
        }
    }

    /// The cached entity, if live.
    pub fn get(&self) -> Option<&'a E> {
        match self {
            Self::Cached(entity) => Some(*entity),
            Self::Uncached(_) => None,
        }
    }
}

/// The keyed cache mapping IDs to entities for one resource kind.
///
/// Requiring `E: Entity` at the type level is the "cacheable entity"
/// guard: a collection over a non-entity type is a compile error, caught
/// before any runtime use.
#[derive(Debug)]
pub struct Collection<E: Entity> {
    items: HashMap<Id<E::Marker>, E>,
}

impl<E: Entity> Collection<E> {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
        }
    }

    /// Look up an entity by ID. No side effects.
    pub fn get(&self, id: Id<E::Marker>) -> Option<&E> {
        self.items.get(&id)
    }

    /// Look up an entity by ID for mutation. No side effects.
    pub fn get_mut(&mut self, id: Id<E::Marker>) -> Option<&mut E> {
        self.items.get_mut(&id)
    }

    /// Resolve a cross-collection reference, substituting an ID-only
    /// stand-in when the target is not cached.
    pub fn resolve(&self, id: Id<E::Marker>) -> Resolved<'_, E> {
        match self.items.get(&id) {
            Some(entity) => Resolved::Cached(entity),
            None => Resolved::Uncached(id),
        }
    }

    /// Insert an entity under its own ID, overwriting any existing entry.
    ///
    /// Last-insert-wins: it is the caller's responsibility not to clobber a
    /// live object that should have been merged via [`update`] instead.
    /// External code should prefer [`update`]; `add` exists for entities
    /// whose identity is already known to be fresh.
    ///
    /// [`update`]: Self::update
    pub fn add(&mut self, entity: E) -> &mut E {
        let id = entity.id();
        match self.items.entry(id) {
            hash_map::Entry::Occupied(mut occupied) => {
                occupied.insert(entity);
                occupied.into_mut()
            }
            hash_map::Entry::Vacant(vacant) => vacant.insert(entity),
        }
    }

    /// The single external mutation entry point: merge or construct.
    ///
    /// A raw payload keyed to a cached entity is merged into it in place;
    /// an unseen identity constructs a new entity via
    /// [`Entity::from_raw`]. The two paths are indistinguishable to the
    /// caller. A payload with no identity is a contract violation.
    pub fn update(
        &mut self,
        incoming: Incoming<E>,
        extra: &E::Extra,
    ) -> Result<&mut E, CacheError> {
        match incoming {
            // Ownership makes a second live instance impossible, so the
            // re-entrant merge path degenerates to insertion.
            Incoming::Materialized(entity) => Ok(self.add(entity)),
            Incoming::Raw(raw) => {
                let id = raw.entity_id().ok_or(CacheError::MissingIdentity)?;
                match self.items.entry(id) {
                    hash_map::Entry::Occupied(occupied) => {
                        let entity = occupied.into_mut();
                        entity.apply(&raw);
                        Ok(entity)
                    }
                    hash_map::Entry::Vacant(vacant) => {
                        Ok(vacant.insert(E::from_raw(raw, extra)))
                    }
                }
            }
        }
    }

    /// Remove an entity, returning it if it was cached.
    ///
    /// Driven by external deletion events; the cache itself never evicts.
    pub fn remove(&mut self, id: Id<E::Marker>) -> Option<E> {
        self.items.remove(&id)
    }

    /// Whether an entity with this ID is cached.
    pub fn contains(&self, id: Id<E::Marker>) -> bool {
        self.items.contains_key(&id)
    }

    /// Number of cached entities.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over `(id, entity)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (Id<E::Marker>, &E)> + '_ {
        self.items.iter().map(|(id, entity)| (*id, entity))
    }

    /// Iterate over cached entities in arbitrary order.
    pub fn values(&self) -> impl Iterator<Item = &E> + Clone + '_ {
        self.items.values()
    }

    /// Iterate mutably over cached entities in arbitrary order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut E> + '_ {
        self.items.values_mut()
    }

    /// Iterate over cached IDs in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = Id<E::Marker>> + '_ {
        self.items.keys().copied()
    }
}

impl<E: Entity + Clone> Clone for Collection<E> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<E: Entity> Default for Collection<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity + Serialize> Serialize for Collection<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.items.len()))?;
        for entity in self.items.values() {
            seq.serialize_element(entity)?;
        }
        seq.end()
    }
}
