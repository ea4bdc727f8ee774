/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! An optional value: [`Maybe<T>`] holds either a value or nothing.
//!
//! ```
//! use monadic::Maybe;
//!
//! let doubled = Maybe::value(5).map(|x| x * 2);
//! assert_eq!(doubled.value_or(0), 10);
//! assert_eq!(Maybe::<i32>::none().value_or(7), 7);
//! ```

use serde::Deserialize;
use serde::Serialize;

use crate::either::Either;
use crate::error::AccessError;
use crate::result::Try;

/// A value-or-absent container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Maybe<T> {
    /// A value is present.
    Value(T),
    /// No value.
    None,
}

/// Construct a [`Maybe`] holding `value`.
pub fn value<T>(value: T) -> Maybe<T> {
    Maybe::Value(value)
}

/// Construct an empty [`Maybe`].
pub fn none<T>() -> Maybe<T> {
    Maybe::None
}

impl<T> Default for Maybe<T> {
    fn default() -> Self {
        Maybe::None
    }
}

impl<T> Maybe<T> {
    /// Construct a [`Maybe`] holding `value`.
    pub fn value(value: T) -> Self {
        Maybe::Value(value)
    }

    /// Construct an empty [`Maybe`].
    pub fn none() -> Self {
        Maybe::None
    }

    /// Whether a value is present.
    pub fn is_value(&self) -> bool {
        matches!(self, Maybe::Value(_))
    }

    /// Whether no value is present.
    pub fn is_none(&self) -> bool {
        matches!(self, Maybe::None)
    }

    /// Borrow the payload.
    pub fn as_ref(&self) -> Maybe<&T> {
        match self {
            Maybe::Value(value) => Maybe::Value(value),
            Maybe::None => Maybe::None,
        }
    }

    /// Mutably borrow the payload.
    pub fn as_mut(&mut self) -> Maybe<&mut T> {
        match self {
            Maybe::Value(value) => Maybe::Value(value),
            Maybe::None => Maybe::None,
        }
    }

    /// Take the payload, or fail with [`AccessError::Absent`].
    pub fn into_value(self) -> Result<T, AccessError> {
        match self {
            Maybe::Value(value) => Ok(value),
            Maybe::None => Err(AccessError::Absent),
        }
    }

    /// Convert into the standard library's `Option`.
    pub fn into_option(self) -> Option<T> {
        self.into()
    }

    /// Apply `f` to the payload. `f` is not invoked on `None`.
    pub fn map<U, F>(self, f: F) -> Maybe<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Maybe::Value(value) => Maybe::Value(f(value)),
            Maybe::None => Maybe::None,
        }
    }

    /// Apply `f`, which itself produces a [`Maybe`], without re-wrapping
    /// its result.
    pub fn map_flatten<U, F>(self, f: F) -> Maybe<U>
    where
        F: FnOnce(T) -> Maybe<U>,
    {
        match self {
            Maybe::Value(value) => f(value),
            Maybe::None => Maybe::None,
        }
    }

    /// Keep the value only if `predicate` holds for it.
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: FnOnce(&T) -> bool,
    {
        match self {
            Maybe::Value(value) if predicate(&value) => Maybe::Value(value),
            _ => Maybe::None,
        }
    }

    /// `self` if it holds a value, otherwise `other`.
    pub fn or(self, other: Maybe<T>) -> Self {
        match self {
            Maybe::Value(_) => self,
            Maybe::None => other,
        }
    }

    /// `self` if it holds a value, otherwise the result of `f`.
    pub fn or_else<F>(self, f: F) -> Self
    where
        F: FnOnce() -> Maybe<T>,
    {
        match self {
            Maybe::Value(_) => self,
            Maybe::None => f(),
        }
    }

    /// The payload, or `default`.
    pub fn value_or(self, default: T) -> T {
        match self {
            Maybe::Value(value) => value,
            Maybe::None => default,
        }
    }

    /// The payload, or the result of `f`. `f` runs only on `None`.
    pub fn value_or_else<F>(self, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        match self {
            Maybe::Value(value) => value,
            Maybe::None => f(),
        }
    }

    /// Convert into a [`Try`], using `on_absent` to build the failure.
    pub fn to_try<E, F>(self, on_absent: F) -> Try<T>
    where
        F: FnOnce() -> E,
        E: Into<anyhow::Error>,
    {
        match self {
            Maybe::Value(value) => Try::Success(value),
            Maybe::None => Try::Failure(on_absent().into()),
        }
    }

    /// Convert into an [`Either`] whose right branch holds the value.
    pub fn to_either<L, F>(self, on_absent: F) -> Either<L, T>
    where
        F: FnOnce() -> L,
    {
        match self {
            Maybe::Value(value) => Either::Right(value),
            Maybe::None => Either::Left(on_absent()),
        }
    }

    /// Run exactly one of `on_value` and `on_absent`.
    pub fn do_effect<V, A>(self, on_value: V, on_absent: A)
    where
        V: FnOnce(T),
        A: FnOnce(),
    {
        match self {
            Maybe::Value(value) => on_value(value),
            Maybe::None => on_absent(),
        }
    }
}

impl<T> Maybe<Maybe<T>> {
    /// Remove one level of nesting.
    pub fn flatten(self) -> Maybe<T> {
        match self {
            Maybe::Value(inner) => inner,
            Maybe::None => Maybe::None,
        }
    }
}

impl<T> From<Option<T>> for Maybe<T> {
    fn from(option: Option<T>) -> Self {
        match option {
            Some(value) => Maybe::Value(value),
            None => Maybe::None,
        }
    }
}

impl<T> From<Maybe<T>> for Option<T> {
    fn from(maybe: Maybe<T>) -> Self {
        match maybe {
            Maybe::Value(value) => Some(value),
            Maybe::None => None,
        }
    }
}

impl<T> IntoIterator for Maybe<T> {
    type Item = T;
    type IntoIter = std::option::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_option().into_iter()
    }
}
