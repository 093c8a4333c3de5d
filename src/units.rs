//! Compile-time-tagged physical quantities.
//!
//! Mirrors `corecel/math/Quantity.hh` in the original source: a bare `f64`
//! carries a marker type naming its unit, so that e.g. an energy in MeV and
//! a momentum in MeV/c cannot be added by accident. Conversion to and from
//! the host's "native" unit system (whatever scale the embedding simulation
//! picks for internal bookkeeping) goes through explicit methods rather than
//! an implicit `From`/`Into`, so a native-unit value is never silently
//! treated as a tagged one.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};

/// A unit tag: names a physical unit and its scale relative to the native
/// unit system (`native = value * T::NATIVE_PER_UNIT`).
pub trait UnitTag {
    /// Human-readable unit label, e.g. `"MeV"`.
    const LABEL: &'static str;
    /// Number of native units per one unit of `Self`.
    const NATIVE_PER_UNIT: f64;
}

/// Energy, MeV.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Mev;
impl UnitTag for Mev {
    const LABEL: &'static str = "MeV";
    const NATIVE_PER_UNIT: f64 = 1.0;
}

/// Mass, `MeV/c^2`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MevPerCsq;
impl UnitTag for MevPerCsq {
    const LABEL: &'static str = "MeV/c^2";
    const NATIVE_PER_UNIT: f64 = 1.0;
}

/// Momentum, `MeV/c`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MevPerC;
impl UnitTag for MevPerC {
    const LABEL: &'static str = "MeV/c";
    const NATIVE_PER_UNIT: f64 = 1.0;
}

/// Length, cm.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Centimeter;
impl UnitTag for Centimeter {
    const LABEL: &'static str = "cm";
    const NATIVE_PER_UNIT: f64 = 1.0;
}

/// A value tagged with the unit `T` it is expressed in.
pub struct Quantity<T> {
    value: f64,
    tag: PhantomData<T>,
}

impl<T> Quantity<T> {
    /// Construct from a raw value already expressed in unit `T`.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self {
            value,
            tag: PhantomData,
        }
    }

    /// The additive identity.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0.0)
    }

    /// The raw value, still expressed in unit `T`.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }
}

impl<T: UnitTag> Quantity<T> {
    /// Build a tagged quantity from a value already expressed in the host's
    /// native unit system.
    #[must_use]
    pub fn native_value_from(native: f64) -> Self {
        Self::new(native / T::NATIVE_PER_UNIT)
    }

    /// Convert this quantity to the host's native unit system.
    #[must_use]
    pub fn native_value_to(&self) -> f64 {
        self.value * T::NATIVE_PER_UNIT
    }
}

impl<T> Clone for Quantity<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Quantity<T> {}

impl<T> fmt::Debug for Quantity<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Quantity").field(&self.value).finish()
    }
}

impl<T> PartialEq for Quantity<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> PartialOrd for Quantity<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

// equal-tag arithmetic: addition and subtraction compose without changing
// the tag; multiplication/division by a bare scalar scales the value.

impl<T> Add for Quantity<T> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.value + rhs.value)
    }
}

impl<T> Sub for Quantity<T> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.value - rhs.value)
    }
}

impl<T> AddAssign for Quantity<T> {
    fn add_assign(&mut self, rhs: Self) {
        self.value += rhs.value;
    }
}

impl<T> SubAssign for Quantity<T> {
    fn sub_assign(&mut self, rhs: Self) {
        self.value -= rhs.value;
    }
}

impl<T> Mul<f64> for Quantity<T> {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.value * rhs)
    }
}

impl<T> Div<f64> for Quantity<T> {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        Self::new(self.value / rhs)
    }
}

/// Mixing two distinct unit tags (e.g. to form a product quantity) only
/// makes sense at the level of native values: compose via
/// [`Quantity::native_value_to`] on each operand rather than through a typed
/// `Mul<Quantity<U>>`, which would need a dimensional-analysis type system
/// out of scope for this crate.
#[must_use]
pub fn native_product<A: UnitTag, B: UnitTag>(a: Quantity<A>, b: Quantity<B>) -> f64 {
    a.native_value_to() * b.native_value_to()
}
