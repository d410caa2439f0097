use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Trait bound for the integer cell types a `SquareMatrix` can hold.
/// Supports `i32` and `i64`.
pub trait Element:
    Copy
    + Clone
    + Default
    + PartialEq
    + Eq
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + Add<Output = Self>
    + Mul<Output = Self>
    + AddAssign
    + Sum
    + Serialize
    + DeserializeOwned
    + 'static
{
    const ZERO: Self;
    const ONE: Self;

    /// Parse a single cell from text, ignoring surrounding whitespace.
    fn parse_str(s: &str) -> Option<Self>;
}

impl Element for i32 {
    const ZERO: Self = 0;
    const ONE: Self = 1;

    #[inline] fn parse_str(s: &str) -> Option<Self> { s.trim().parse().ok() }
}

impl Element for i64 {
    const ZERO: Self = 0;
    const ONE: Self = 1;

    #[inline] fn parse_str(s: &str) -> Option<Self> { s.trim().parse().ok() }
}
