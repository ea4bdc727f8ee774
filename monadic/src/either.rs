/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! A disjoint union: [`Either<L, R>`] holds exactly one of two branches.

use serde::Deserialize;
use serde::Serialize;

use crate::error::AccessError;
use crate::error::Side;
use crate::maybe::Maybe;
use crate::result::Try;

/// Exactly one of a left value or a right value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Either<L, R> {
    /// The left branch.
    Left(L),
    /// The right branch.
    Right(R),
}

/// Construct an [`Either`] on the left branch.
pub fn left<L, R>(value: L) -> Either<L, R> {
    Either::Left(value)
}

/// Construct an [`Either`] on the right branch.
pub fn right<L, R>(value: R) -> Either<L, R> {
    Either::Right(value)
}

impl<L, R> Either<L, R> {
    /// Construct an [`Either`] on the left branch.
    pub fn left(value: L) -> Self {
        Either::Left(value)
    }

    /// Construct an [`Either`] on the right branch.
    pub fn right(value: R) -> Self {
        Either::Right(value)
    }

    /// Which branch is populated.
    pub fn side(&self) -> Side {
        match self {
            Either::Left(_) => Side::Left,
            Either::Right(_) => Side::Right,
        }
    }

    /// Whether the left branch is populated.
    pub fn is_left(&self) -> bool {
        self.side() == Side::Left
    }

    /// Whether the right branch is populated.
    pub fn is_right(&self) -> bool {
        self.side() == Side::Right
    }

    /// Borrow whichever branch is populated.
    pub fn as_ref(&self) -> Either<&L, &R> {
        match self {
            Either::Left(value) => Either::Left(value),
            Either::Right(value) => Either::Right(value),
        }
    }

    /// The left payload, if any.
    pub fn into_left(self) -> Maybe<L> {
        match self {
            Either::Left(value) => Maybe::Value(value),
            Either::Right(_) => Maybe::None,
        }
    }

    /// The right payload, if any.
    pub fn into_right(self) -> Maybe<R> {
        match self {
            Either::Left(_) => Maybe::None,
            Either::Right(value) => Maybe::Value(value),
        }
    }

    /// The left payload, or [`AccessError::WrongBranch`].
    pub fn try_left(self) -> Result<L, AccessError> {
        match self {
            Either::Left(value) => Ok(value),
            Either::Right(_) => Err(AccessError::WrongBranch(Side::Right)),
        }
    }

    /// The right payload, or [`AccessError::WrongBranch`].
    pub fn try_right(self) -> Result<R, AccessError> {
        match self {
            Either::Left(_) => Err(AccessError::WrongBranch(Side::Left)),
            Either::Right(value) => Ok(value),
        }
    }

    /// Apply `f` to a left payload; a right payload passes through.
    pub fn map_left<U, F>(self, f: F) -> Either<U, R>
    where
        F: FnOnce(L) -> U,
    {
        match self {
            Either::Left(value) => Either::Left(f(value)),
            Either::Right(value) => Either::Right(value),
        }
    }

    /// Apply `f` to a right payload; a left payload passes through.
    pub fn map_right<U, F>(self, f: F) -> Either<L, U>
    where
        F: FnOnce(R) -> U,
    {
        match self {
            Either::Left(value) => Either::Left(value),
            Either::Right(value) => Either::Right(f(value)),
        }
    }

    /// Apply whichever of `on_left` and `on_right` matches the branch.
    pub fn map_both<U, V, FL, FR>(self, on_left: FL, on_right: FR) -> Either<U, V>
    where
        FL: FnOnce(L) -> U,
        FR: FnOnce(R) -> V,
    {
        match self {
            Either::Left(value) => Either::Left(on_left(value)),
            Either::Right(value) => Either::Right(on_right(value)),
        }
    }

    /// Like [`Either::map_left`], for a transformation that produces an
    /// [`Either`] itself.
    pub fn map_flatten_left<U, F>(self, f: F) -> Either<U, R>
    where
        F: FnOnce(L) -> Either<U, R>,
    {
        match self {
            Either::Left(value) => f(value),
            Either::Right(value) => Either::Right(value),
        }
    }

    /// Like [`Either::map_right`], for a transformation that produces an
    /// [`Either`] itself.
    pub fn map_flatten_right<U, F>(self, f: F) -> Either<L, U>
    where
        F: FnOnce(R) -> Either<L, U>,
    {
        match self {
            Either::Left(value) => Either::Left(value),
            Either::Right(value) => f(value),
        }
    }

    /// Swap the branches.
    pub fn invert(self) -> Either<R, L> {
        match self {
            Either::Left(value) => Either::Right(value),
            Either::Right(value) => Either::Left(value),
        }
    }

    /// The left payload, or `default`.
    pub fn left_or(self, default: L) -> L {
        match self {
            Either::Left(value) => value,
            Either::Right(_) => default,
        }
    }

    /// The left payload, or `f` applied to the right payload.
    pub fn left_or_else<F>(self, f: F) -> L
    where
        F: FnOnce(R) -> L,
    {
        match self {
            Either::Left(value) => value,
            Either::Right(value) => f(value),
        }
    }

    /// The right payload, or `default`.
    pub fn right_or(self, default: R) -> R {
        match self {
            Either::Left(_) => default,
            Either::Right(value) => value,
        }
    }

    /// The right payload, or `f` applied to the left payload.
    pub fn right_or_else<F>(self, f: F) -> R
    where
        F: FnOnce(L) -> R,
    {
        match self {
            Either::Left(value) => f(value),
            Either::Right(value) => value,
        }
    }

    /// Collapse both branches into one value.
    pub fn fold<U, FL, FR>(self, on_left: FL, on_right: FR) -> U
    where
        FL: FnOnce(L) -> U,
        FR: FnOnce(R) -> U,
    {
        match self {
            Either::Left(value) => on_left(value),
            Either::Right(value) => on_right(value),
        }
    }

    /// Convert into a [`Try`]: the right branch succeeds, the left branch
    /// becomes the failure built by `on_left`.
    pub fn to_try<E, F>(self, on_left: F) -> Try<R>
    where
        F: FnOnce(L) -> E,
        E: Into<anyhow::Error>,
    {
        match self {
            Either::Left(value) => Try::Failure(on_left(value).into()),
            Either::Right(value) => Try::Success(value),
        }
    }

    /// Run exactly one of `on_left` and `on_right`.
    pub fn do_effect<FL, FR>(self, on_left: FL, on_right: FR)
    where
        FL: FnOnce(L),
        FR: FnOnce(R),
    {
        match self {
            Either::Left(value) => on_left(value),
            Either::Right(value) => on_right(value),
        }
    }
}

impl<L, R> From<Result<R, L>> for Either<L, R> {
    fn from(result: Result<R, L>) -> Self {
        match result {
            Ok(value) => Either::Right(value),
            Err(value) => Either::Left(value),
        }
    }
}
