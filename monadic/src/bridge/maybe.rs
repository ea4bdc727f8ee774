/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Combinators over a future of a [`Maybe`].

use std::convert::identity;
use std::future::Future;

use tokio_util::sync::CancellationToken;

use super::bridge;
use super::bridge_async;
use super::bridge_catching;
use super::bridge_catching_async;
use super::lifted;
use crate::either::Either;
use crate::error::Cancelled;
use crate::eventual::Bridged;
use crate::eventual::Eventual;
use crate::eventual::Resolution;
use crate::maybe::Maybe;
use crate::result::Try;

/// The [`Maybe`] combinators, lifted over any [`Eventual`] source of a
/// `Maybe`.
///
/// Each combinator takes the token that governs the wait and, for the
/// `*_async` forms, the transformation. Transformations run exactly once,
/// and never when the wait is cancelled.
///
/// ```
/// use monadic::EventualMaybe;
/// use monadic::Maybe;
/// use tokio_util::sync::CancellationToken;
///
/// let token = CancellationToken::new();
/// let doubled = monadic::resolved(Maybe::value(21)).map(&token, |x| x * 2);
/// assert_eq!(futures::executor::block_on(doubled), Ok(Maybe::value(42)));
/// ```
///
/// The method names overlap with [`futures::FutureExt`]; avoid importing
/// both traits into the same scope.
pub trait EventualMaybe<T>: Eventual<Output = Maybe<T>> {
    /// See [`Maybe::map`].
    fn map<U, F>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Maybe<U>, impl Future<Output = Result<Maybe<U>, Cancelled>>>
    where
        F: FnOnce(T) -> U,
    {
        bridge(self, token, |maybe| maybe.map(f))
    }

    /// Like [`map`](Self::map), with an asynchronous transformation.
    fn map_async<U, F, Fut>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Maybe<U>, impl Future<Output = Result<Maybe<U>, Cancelled>>>
    where
        F: FnOnce(T, CancellationToken) -> Fut,
        Fut: Future<Output = U>,
    {
        bridge_async(self, token, |maybe, token| match maybe {
            Maybe::Value(value) => Resolution::Pending(lifted(f(value, token), Maybe::Value)),
            Maybe::None => Resolution::Ready(Ok(Maybe::None)),
        })
    }

    /// See [`Maybe::map_flatten`].
    fn map_flatten<U, F>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Maybe<U>, impl Future<Output = Result<Maybe<U>, Cancelled>>>
    where
        F: FnOnce(T) -> Maybe<U>,
    {
        bridge(self, token, |maybe| maybe.map_flatten(f))
    }

    /// Like [`map_flatten`](Self::map_flatten), with an asynchronous
    /// transformation.
    fn map_flatten_async<U, F, Fut>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Maybe<U>, impl Future<Output = Result<Maybe<U>, Cancelled>>>
    where
        F: FnOnce(T, CancellationToken) -> Fut,
        Fut: Future<Output = Maybe<U>>,
    {
        bridge_async(self, token, |maybe, token| match maybe {
            Maybe::Value(value) => Resolution::Pending(lifted(f(value, token), identity)),
            Maybe::None => Resolution::Ready(Ok(Maybe::None)),
        })
    }

    /// See [`Maybe::filter`].
    fn filter<P>(
        self,
        token: &CancellationToken,
        predicate: P,
    ) -> Bridged<Maybe<T>, impl Future<Output = Result<Maybe<T>, Cancelled>>>
    where
        P: FnOnce(&T) -> bool,
    {
        bridge(self, token, |maybe| maybe.filter(predicate))
    }

    /// Like [`filter`](Self::filter), with an asynchronous predicate. The
    /// predicate's future may not borrow the value.
    fn filter_async<P, Fut>(
        self,
        token: &CancellationToken,
        predicate: P,
    ) -> Bridged<Maybe<T>, impl Future<Output = Result<Maybe<T>, Cancelled>>>
    where
        P: FnOnce(&T, CancellationToken) -> Fut,
        Fut: Future<Output = bool>,
    {
        bridge_async(self, token, |maybe, token| match maybe {
            Maybe::Value(value) => {
                let keep = predicate(&value, token);
                Resolution::Pending(lifted(keep, move |keep| {
                    if keep {
                        Maybe::Value(value)
                    } else {
                        Maybe::None
                    }
                }))
            }
            Maybe::None => Resolution::Ready(Ok(Maybe::None)),
        })
    }

    /// The value, or whatever `other` resolves to. `other` is not observed
    /// when a value is present.
    fn or<O>(
        self,
        token: &CancellationToken,
        other: O,
    ) -> Bridged<Maybe<T>, impl Future<Output = Result<Maybe<T>, Cancelled>>>
    where
        O: Eventual<Output = Maybe<T>>,
    {
        bridge_async(self, token, |maybe, _| match maybe {
            Maybe::Value(_) => Resolution::Ready(Ok(maybe)),
            Maybe::None => other.resolve(),
        })
    }

    /// See [`Maybe::or_else`].
    fn or_else<F>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Maybe<T>, impl Future<Output = Result<Maybe<T>, Cancelled>>>
    where
        F: FnOnce() -> Maybe<T>,
    {
        bridge(self, token, |maybe| maybe.or_else(f))
    }

    /// Like [`or_else`](Self::or_else), with an asynchronous fallback.
    fn or_else_async<F, Fut>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Maybe<T>, impl Future<Output = Result<Maybe<T>, Cancelled>>>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Maybe<T>>,
    {
        bridge_async(self, token, |maybe, token| match maybe {
            Maybe::Value(_) => Resolution::Ready(Ok(maybe)),
            Maybe::None => Resolution::Pending(lifted(f(token), identity)),
        })
    }

    /// See [`Maybe::value_or`].
    fn value_or(
        self,
        token: &CancellationToken,
        default: T,
    ) -> Bridged<T, impl Future<Output = Result<T, Cancelled>>> {
        bridge(self, token, |maybe| maybe.value_or(default))
    }

    /// See [`Maybe::value_or_else`].
    fn value_or_else<F>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<T, impl Future<Output = Result<T, Cancelled>>>
    where
        F: FnOnce() -> T,
    {
        bridge(self, token, |maybe| maybe.value_or_else(f))
    }

    /// Like [`value_or_else`](Self::value_or_else), with an asynchronous
    /// fallback.
    fn value_or_else_async<F, Fut>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<T, impl Future<Output = Result<T, Cancelled>>>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = T>,
    {
        bridge_async(self, token, |maybe, token| match maybe {
            Maybe::Value(value) => Resolution::Ready(Ok(value)),
            Maybe::None => Resolution::Pending(lifted(f(token), identity)),
        })
    }

    /// See [`Maybe::to_try`]. A panic raised while producing the container
    /// or the failure is captured as a [`Try::Failure`].
    fn to_try<E, F>(
        self,
        token: &CancellationToken,
        on_absent: F,
    ) -> Bridged<Try<T>, impl Future<Output = Result<Try<T>, Cancelled>>>
    where
        F: FnOnce() -> E,
        E: Into<anyhow::Error>,
    {
        bridge_catching(self, token, |maybe| maybe.to_try(on_absent))
    }

    /// Like [`to_try`](Self::to_try), building the failure asynchronously.
    fn to_try_async<E, F, Fut>(
        self,
        token: &CancellationToken,
        on_absent: F,
    ) -> Bridged<Try<T>, impl Future<Output = Result<Try<T>, Cancelled>>>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = E>,
        E: Into<anyhow::Error>,
    {
        bridge_catching_async(self, token, |maybe, token| match maybe {
            Maybe::Value(value) => Resolution::Ready(Ok(Try::Success(value))),
            Maybe::None => Resolution::Pending(lifted(on_absent(token), |error: E| {
                Try::Failure(error.into())
            })),
        })
    }

    /// See [`Maybe::to_either`].
    fn to_either<L, F>(
        self,
        token: &CancellationToken,
        on_absent: F,
    ) -> Bridged<Either<L, T>, impl Future<Output = Result<Either<L, T>, Cancelled>>>
    where
        F: FnOnce() -> L,
    {
        bridge(self, token, |maybe| maybe.to_either(on_absent))
    }

    /// Like [`to_either`](Self::to_either), building the left branch
    /// asynchronously.
    fn to_either_async<L, F, Fut>(
        self,
        token: &CancellationToken,
        on_absent: F,
    ) -> Bridged<Either<L, T>, impl Future<Output = Result<Either<L, T>, Cancelled>>>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = L>,
    {
        bridge_async(self, token, |maybe, token| match maybe {
            Maybe::Value(value) => Resolution::Ready(Ok(Either::Right(value))),
            Maybe::None => Resolution::Pending(lifted(on_absent(token), Either::Left)),
        })
    }

    /// See [`Maybe::do_effect`].
    fn do_effect<V, A>(
        self,
        token: &CancellationToken,
        on_value: V,
        on_absent: A,
    ) -> Bridged<(), impl Future<Output = Result<(), Cancelled>>>
    where
        V: FnOnce(T),
        A: FnOnce(),
    {
        bridge(self, token, |maybe| maybe.do_effect(on_value, on_absent))
    }

    /// Like [`do_effect`](Self::do_effect), with asynchronous effects.
    fn do_effect_async<V, A, VFut, AFut>(
        self,
        token: &CancellationToken,
        on_value: V,
        on_absent: A,
    ) -> Bridged<(), impl Future<Output = Result<(), Cancelled>>>
    where
        V: FnOnce(T, CancellationToken) -> VFut,
        A: FnOnce(CancellationToken) -> AFut,
        VFut: Future<Output = ()>,
        AFut: Future<Output = ()>,
    {
        bridge_async(self, token, |maybe, token| {
            let effect = match maybe {
                Maybe::Value(value) => futures::future::Either::Left(on_value(value, token)),
                Maybe::None => futures::future::Either::Right(on_absent(token)),
            };
            Resolution::Pending(lifted(effect, identity))
        })
    }
}

impl<S, T> EventualMaybe<T> for S where S: Eventual<Output = Maybe<T>> {}

/// Combinators over a future of a nested [`Maybe`].
pub trait EventualNestedMaybe<T>: Eventual<Output = Maybe<Maybe<T>>> {
    /// See [`Maybe::flatten`].
    fn flatten(
        self,
        token: &CancellationToken,
    ) -> Bridged<Maybe<T>, impl Future<Output = Result<Maybe<T>, Cancelled>>> {
        bridge(self, token, Maybe::flatten)
    }
}

impl<S, T> EventualNestedMaybe<T> for S where S: Eventual<Output = Maybe<Maybe<T>>> {}
