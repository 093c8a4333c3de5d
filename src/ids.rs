//! Opaque, type-safe integer handles and index ranges.
//!
//! Every identifier in the transport core is a thin wrapper around an
//! index into some backing array; the wrapper exists purely so the
//! compiler rejects passing a `MaterialId` where a `ParticleId` is
//! expected. A default-constructed handle is "null": it compares `false`
//! and [`ItemId::get`] returns [`None`].

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::Range;

/// Sentinel marking an invalid index.
const INVALID: u32 = u32::MAX;

/// An opaque, type-tagged index. `Tag` is a zero-sized marker type; it
/// exists only to keep handles of different kinds from being confused.
pub struct ItemId<Tag> {
    index: u32,
    tag: PhantomData<Tag>,
}

impl<Tag> ItemId<Tag> {
    /// The null handle.
    #[must_use]
    pub const fn null() -> Self {
        Self {
            index: INVALID,
            tag: PhantomData,
        }
    }

    /// Construct a handle referring to `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` cannot be represented (i.e. is `u32::MAX`).
    #[must_use]
    pub fn new(index: usize) -> Self {
        let index = u32::try_from(index).expect("index out of range for ItemId");
        assert!(index != INVALID, "index collides with the null sentinel");
        Self {
            index,
            tag: PhantomData,
        }
    }

    /// Whether this handle refers to a valid index.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.index != INVALID
    }

    /// The underlying index, or `None` for a null handle.
    #[must_use]
    pub const fn get(&self) -> Option<usize> {
        if self.is_valid() {
            Some(self.index as usize)
        } else {
            None
        }
    }

    /// The underlying index.
    ///
    /// # Panics
    ///
    /// Panics if this handle is null.
    #[must_use]
    pub fn unchecked_get(&self) -> usize {
        self.get().expect("dereferenced a null ItemId")
    }
}

impl<Tag> From<ItemId<Tag>> for bool {
    fn from(id: ItemId<Tag>) -> Self {
        id.is_valid()
    }
}

impl<Tag> Default for ItemId<Tag> {
    fn default() -> Self {
        Self::null()
    }
}

impl<Tag> Clone for ItemId<Tag> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<Tag> Copy for ItemId<Tag> {}

impl<Tag> PartialEq for ItemId<Tag> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}
impl<Tag> Eq for ItemId<Tag> {}

impl<Tag> Hash for ItemId<Tag> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<Tag> fmt::Debug for ItemId<Tag> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(i) => write!(f, "ItemId({i})"),
            None => write!(f, "ItemId(null)"),
        }
    }
}

/// A contiguous half-open span of indices into a backing array, tagged by
/// the kind of item it indexes.
pub struct ItemRange<Tag> {
    range: Range<u32>,
    tag: PhantomData<Tag>,
}

impl<Tag> ItemRange<Tag> {
    /// An empty range.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            range: 0..0,
            tag: PhantomData,
        }
    }

    /// Construct from a `start..end` index range.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "ItemRange start must not exceed end");
        Self {
            range: u32::try_from(start).unwrap()..u32::try_from(end).unwrap(),
            tag: PhantomData,
        }
    }

    /// Number of items in the range.
    #[must_use]
    pub fn len(&self) -> usize {
        (self.range.end - self.range.start) as usize
    }

    /// Whether the range contains no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// The range of raw indices.
    #[must_use]
    pub fn as_range(&self) -> Range<usize> {
        self.range.start as usize..self.range.end as usize
    }
}

impl<Tag> Clone for ItemRange<Tag> {
    fn clone(&self) -> Self {
        Self {
            range: self.range.clone(),
            tag: PhantomData,
        }
    }
}

impl<Tag> fmt::Debug for ItemRange<Tag> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemRange({}..{})", self.range.start, self.range.end)
    }
}

/// Marker types for each handle kind named in the spec.
pub mod markers {
    /// Marker for [`super::ItemId<Particle>`].
    pub struct Particle;
    /// Marker for [`super::ItemId<Material>`].
    pub struct Material;
    /// Marker for [`super::ItemId<Element>`].
    pub struct Element;
    /// Marker for [`super::ItemId<ElementComponent>`].
    pub struct ElementComponent;
    /// Marker for [`super::ItemId<Process>`].
    pub struct Process;
    /// Marker for [`super::ItemId<Model>`].
    pub struct Model;
    /// Marker for [`super::ItemId<ParticleProcess>`], dense within one
    /// particle's [`crate::phys::registry::ProcessGroup`].
    pub struct ParticleProcess;
    /// Marker for [`super::ItemId<ParticleModel>`], dense across all
    /// particles.
    pub struct ParticleModel;
    /// Marker for [`super::ItemId<Action>`], unifying all schedulable
    /// operations.
    pub struct Action;
    /// Marker for [`super::ItemId<TrackSlot>`].
    pub struct TrackSlot;
}

/// Identifies a particle type.
pub type ParticleId = ItemId<markers::Particle>;
/// Identifies a material.
pub type MaterialId = ItemId<markers::Material>;
/// Identifies an element.
pub type ElementId = ItemId<markers::Element>;
/// Identifies one element component within a material.
pub type ElementComponentId = ItemId<markers::ElementComponent>;
/// Identifies a physics process.
pub type ProcessId = ItemId<markers::Process>;
/// Identifies a physics model.
pub type ModelId = ItemId<markers::Model>;
/// Identifies a process within one particle's [`ProcessGroup`](crate::phys::registry::ProcessGroup), dense per particle.
pub type ParticleProcessId = ItemId<markers::ParticleProcess>;
/// Identifies a model, dense across all particles.
pub type ParticleModelId = ItemId<markers::ParticleModel>;
/// Identifies a schedulable action; unifies models, built-in pre/post-step
/// actions, and the failure sentinel into one id space.
pub type ActionId = ItemId<markers::Action>;
/// Identifies a track slot in the fixed-size pool.
pub type TrackSlotId = ItemId<markers::TrackSlot>;
