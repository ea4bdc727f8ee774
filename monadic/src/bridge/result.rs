/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Combinators over a future of a [`Try`].

use std::convert::identity;
use std::future::Future;

use tokio_util::sync::CancellationToken;

use super::bridge;
use super::bridge_async;
use super::bridge_catching;
use super::bridge_catching_async;
use super::lifted;
use crate::error::Cancelled;
use crate::eventual::Bridged;
use crate::eventual::Eventual;
use crate::eventual::Resolution;
use crate::maybe::Maybe;
use crate::result::Try;

/// The [`Try`] combinators, lifted over any [`Eventual`] source of a `Try`.
///
/// Only [`map_catching`](Self::map_catching) and its async form capture
/// panics; every other combinator lets them propagate.
pub trait EventualTry<T>: Eventual<Output = Try<T>> {
    /// See [`Try::map`].
    fn map<U, F>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Try<U>, impl Future<Output = Result<Try<U>, Cancelled>>>
    where
        F: FnOnce(T) -> U,
    {
        bridge(self, token, |attempt| attempt.map(f))
    }

    /// Like [`map`](Self::map), with an asynchronous transformation.
    fn map_async<U, F, Fut>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Try<U>, impl Future<Output = Result<Try<U>, Cancelled>>>
    where
        F: FnOnce(T, CancellationToken) -> Fut,
        Fut: Future<Output = U>,
    {
        bridge_async(self, token, |attempt, token| match attempt {
            Try::Success(value) => Resolution::Pending(lifted(f(value, token), Try::Success)),
            Try::Failure(error) => Resolution::Ready(Ok(Try::Failure(error))),
        })
    }

    /// See [`Try::map_flatten`].
    fn map_flatten<U, F>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Try<U>, impl Future<Output = Result<Try<U>, Cancelled>>>
    where
        F: FnOnce(T) -> Try<U>,
    {
        bridge(self, token, |attempt| attempt.map_flatten(f))
    }

    /// Like [`map_flatten`](Self::map_flatten), with an asynchronous
    /// transformation.
    fn map_flatten_async<U, F, Fut>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Try<U>, impl Future<Output = Result<Try<U>, Cancelled>>>
    where
        F: FnOnce(T, CancellationToken) -> Fut,
        Fut: Future<Output = Try<U>>,
    {
        bridge_async(self, token, |attempt, token| match attempt {
            Try::Success(value) => Resolution::Pending(lifted(f(value, token), identity)),
            Try::Failure(error) => Resolution::Ready(Ok(Try::Failure(error))),
        })
    }

    /// Apply a fallible `f`. Its error, a panic it raises, or a panic
    /// raised while producing the source all become a [`Try::Failure`].
    fn map_catching<U, F>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Try<U>, impl Future<Output = Result<Try<U>, Cancelled>>>
    where
        F: FnOnce(T) -> anyhow::Result<U>,
    {
        bridge_catching(self, token, |attempt| {
            attempt.map_flatten(|value| Try::capture(|| f(value)))
        })
    }

    /// Like [`map_catching`](Self::map_catching), with an asynchronous
    /// transformation.
    fn map_catching_async<U, F, Fut>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Try<U>, impl Future<Output = Result<Try<U>, Cancelled>>>
    where
        F: FnOnce(T, CancellationToken) -> Fut,
        Fut: Future<Output = anyhow::Result<U>>,
    {
        bridge_catching_async(self, token, |attempt, token| match attempt {
            Try::Success(value) => Resolution::Pending(lifted(f(value, token), Try::<U>::from)),
            Try::Failure(error) => Resolution::Ready(Ok(Try::Failure(error))),
        })
    }

    /// See [`Try::map_error`].
    fn map_error<F>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Try<T>, impl Future<Output = Result<Try<T>, Cancelled>>>
    where
        F: FnOnce(anyhow::Error) -> anyhow::Error,
    {
        bridge(self, token, |attempt| attempt.map_error(f))
    }

    /// Like [`map_error`](Self::map_error), with an asynchronous
    /// transformation.
    fn map_error_async<F, Fut>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Try<T>, impl Future<Output = Result<Try<T>, Cancelled>>>
    where
        F: FnOnce(anyhow::Error, CancellationToken) -> Fut,
        Fut: Future<Output = anyhow::Error>,
    {
        bridge_async(self, token, |attempt, token| match attempt {
            Try::Success(value) => Resolution::Ready(Ok(Try::Success(value))),
            Try::Failure(error) => Resolution::Pending(lifted(f(error, token), Try::Failure)),
        })
    }

    /// See [`Try::filter`].
    fn filter<P, E, F>(
        self,
        token: &CancellationToken,
        predicate: P,
        on_rejected: F,
    ) -> Bridged<Try<T>, impl Future<Output = Result<Try<T>, Cancelled>>>
    where
        P: FnOnce(&T) -> bool,
        F: FnOnce(T) -> E,
        E: Into<anyhow::Error>,
    {
        bridge(self, token, |attempt| attempt.filter(predicate, on_rejected))
    }

    /// Like [`filter`](Self::filter), with an asynchronous predicate. The
    /// predicate's future may not borrow the value.
    fn filter_async<P, PFut, E, F>(
        self,
        token: &CancellationToken,
        predicate: P,
        on_rejected: F,
    ) -> Bridged<Try<T>, impl Future<Output = Result<Try<T>, Cancelled>>>
    where
        P: FnOnce(&T, CancellationToken) -> PFut,
        PFut: Future<Output = bool>,
        F: FnOnce(T) -> E,
        E: Into<anyhow::Error>,
    {
        bridge_async(self, token, |attempt, token| match attempt {
            Try::Success(value) => {
                let keep = predicate(&value, token);
                Resolution::Pending(lifted(keep, move |keep| {
                    if keep {
                        Try::Success(value)
                    } else {
                        Try::Failure(on_rejected(value).into())
                    }
                }))
            }
            Try::Failure(error) => Resolution::Ready(Ok(Try::Failure(error))),
        })
    }

    /// The success, or whatever `other` resolves to. `other` is not
    /// observed when the source succeeded.
    fn or<O>(
        self,
        token: &CancellationToken,
        other: O,
    ) -> Bridged<Try<T>, impl Future<Output = Result<Try<T>, Cancelled>>>
    where
        O: Eventual<Output = Try<T>>,
    {
        bridge_async(self, token, |attempt, _| match attempt {
            Try::Success(_) => Resolution::Ready(Ok(attempt)),
            Try::Failure(_) => other.resolve(),
        })
    }

    /// See [`Try::or_else`].
    fn or_else<F>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Try<T>, impl Future<Output = Result<Try<T>, Cancelled>>>
    where
        F: FnOnce(anyhow::Error) -> Try<T>,
    {
        bridge(self, token, |attempt| attempt.or_else(f))
    }

    /// Like [`or_else`](Self::or_else), recovering asynchronously.
    fn or_else_async<F, Fut>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Try<T>, impl Future<Output = Result<Try<T>, Cancelled>>>
    where
        F: FnOnce(anyhow::Error, CancellationToken) -> Fut,
        Fut: Future<Output = Try<T>>,
    {
        bridge_async(self, token, |attempt, token| match attempt {
            Try::Success(_) => Resolution::Ready(Ok(attempt)),
            Try::Failure(error) => Resolution::Pending(lifted(f(error, token), identity)),
        })
    }

    /// See [`Try::value_or`].
    fn value_or(
        self,
        token: &CancellationToken,
        default: T,
    ) -> Bridged<T, impl Future<Output = Result<T, Cancelled>>> {
        bridge(self, token, |attempt| attempt.value_or(default))
    }

    /// See [`Try::value_or_else`].
    fn value_or_else<F>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<T, impl Future<Output = Result<T, Cancelled>>>
    where
        F: FnOnce(anyhow::Error) -> T,
    {
        bridge(self, token, |attempt| attempt.value_or_else(f))
    }

    /// Like [`value_or_else`](Self::value_or_else), with an asynchronous
    /// fallback.
    fn value_or_else_async<F, Fut>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<T, impl Future<Output = Result<T, Cancelled>>>
    where
        F: FnOnce(anyhow::Error, CancellationToken) -> Fut,
        Fut: Future<Output = T>,
    {
        bridge_async(self, token, |attempt, token| match attempt {
            Try::Success(value) => Resolution::Ready(Ok(value)),
            Try::Failure(error) => Resolution::Pending(lifted(f(error, token), identity)),
        })
    }

    /// See [`Try::to_maybe`].
    fn to_maybe(
        self,
        token: &CancellationToken,
    ) -> Bridged<Maybe<T>, impl Future<Output = Result<Maybe<T>, Cancelled>>> {
        bridge(self, token, Try::to_maybe)
    }

    /// See [`Try::failure`].
    fn failure(
        self,
        token: &CancellationToken,
    ) -> Bridged<Maybe<anyhow::Error>, impl Future<Output = Result<Maybe<anyhow::Error>, Cancelled>>>
    {
        bridge(self, token, Try::failure)
    }

    /// See [`Try::do_effect`].
    fn do_effect<FS, FF>(
        self,
        token: &CancellationToken,
        on_success: FS,
        on_failure: FF,
    ) -> Bridged<(), impl Future<Output = Result<(), Cancelled>>>
    where
        FS: FnOnce(T),
        FF: FnOnce(anyhow::Error),
    {
        bridge(self, token, |attempt| attempt.do_effect(on_success, on_failure))
    }

    /// Like [`do_effect`](Self::do_effect), with asynchronous effects.
    fn do_effect_async<FS, FF, SFut, FFut>(
        self,
        token: &CancellationToken,
        on_success: FS,
        on_failure: FF,
    ) -> Bridged<(), impl Future<Output = Result<(), Cancelled>>>
    where
        FS: FnOnce(T, CancellationToken) -> SFut,
        FF: FnOnce(anyhow::Error, CancellationToken) -> FFut,
        SFut: Future<Output = ()>,
        FFut: Future<Output = ()>,
    {
        bridge_async(self, token, |attempt, token| {
            let effect = match attempt {
                Try::Success(value) => futures::future::Either::Left(on_success(value, token)),
                Try::Failure(error) => futures::future::Either::Right(on_failure(error, token)),
            };
            Resolution::Pending(lifted(effect, identity))
        })
    }
}

impl<S, T> EventualTry<T> for S where S: Eventual<Output = Try<T>> {}

/// Combinators over a future of a nested [`Try`].
pub trait EventualNestedTry<T>: Eventual<Output = Try<Try<T>>> {
    /// See [`Try::flatten`].
    fn flatten(
        self,
        token: &CancellationToken,
    ) -> Bridged<Try<T>, impl Future<Output = Result<Try<T>, Cancelled>>> {
        bridge(self, token, Try::flatten)
    }
}

impl<S, T> EventualNestedTry<T> for S where S: Eventual<Output = Try<Try<T>>> {}
