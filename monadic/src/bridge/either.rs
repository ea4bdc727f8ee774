/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Combinators over a future of an [`Either`].

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

/// The [`Either`] combinators, lifted over any [`Eventual`] source of an
/// `Either`.
///
/// ```
/// use monadic::Either;
/// use monadic::EventualEither;
/// use tokio_util::sync::CancellationToken;
///
/// let token = CancellationToken::new();
/// let source = monadic::resolved(Either::<&str, i32>::right(1));
/// let swapped = source.map_right(&token, |x| x + 1).invert(&token);
/// assert_eq!(futures::executor::block_on(swapped), Ok(Either::left(2)));
/// ```
pub trait EventualEither<L, R>: Eventual<Output = Either<L, R>> {
    /// See [`Either::map_left`].
    fn map_left<U, F>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Either<U, R>, impl Future<Output = Result<Either<U, R>, Cancelled>>>
    where
        F: FnOnce(L) -> U,
    {
        bridge(self, token, |either| either.map_left(f))
    }

    /// Like [`map_left`](Self::map_left), with an asynchronous
    /// transformation.
    fn map_left_async<U, F, Fut>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Either<U, R>, impl Future<Output = Result<Either<U, R>, Cancelled>>>
    where
        F: FnOnce(L, CancellationToken) -> Fut,
        Fut: Future<Output = U>,
    {
        bridge_async(self, token, |either, token| match either {
            Either::Left(value) => Resolution::Pending(lifted(f(value, token), Either::Left)),
            Either::Right(value) => Resolution::Ready(Ok(Either::Right(value))),
        })
    }

    /// See [`Either::map_right`].
    fn map_right<U, F>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Either<L, U>, impl Future<Output = Result<Either<L, U>, Cancelled>>>
    where
        F: FnOnce(R) -> U,
    {
        bridge(self, token, |either| either.map_right(f))
    }

    /// Like [`map_right`](Self::map_right), with an asynchronous
    /// transformation.
    fn map_right_async<U, F, Fut>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Either<L, U>, impl Future<Output = Result<Either<L, U>, Cancelled>>>
    where
        F: FnOnce(R, CancellationToken) -> Fut,
        Fut: Future<Output = U>,
    {
        bridge_async(self, token, |either, token| match either {
            Either::Left(value) => Resolution::Ready(Ok(Either::Left(value))),
            Either::Right(value) => Resolution::Pending(lifted(f(value, token), Either::Right)),
        })
    }

    /// See [`Either::map_flatten_left`].
    fn map_flatten_left<U, F>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Either<U, R>, impl Future<Output = Result<Either<U, R>, Cancelled>>>
    where
        F: FnOnce(L) -> Either<U, R>,
    {
        bridge(self, token, |either| either.map_flatten_left(f))
    }

    /// Like [`map_flatten_left`](Self::map_flatten_left), with an
    /// asynchronous transformation.
    fn map_flatten_left_async<U, F, Fut>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Either<U, R>, impl Future<Output = Result<Either<U, R>, Cancelled>>>
    where
        F: FnOnce(L, CancellationToken) -> Fut,
        Fut: Future<Output = Either<U, R>>,
    {
        bridge_async(self, token, |either, token| match either {
            Either::Left(value) => Resolution::Pending(lifted(f(value, token), identity)),
            Either::Right(value) => Resolution::Ready(Ok(Either::Right(value))),
        })
    }

    /// See [`Either::map_flatten_right`].
    fn map_flatten_right<U, F>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Either<L, U>, impl Future<Output = Result<Either<L, U>, Cancelled>>>
    where
        F: FnOnce(R) -> Either<L, U>,
    {
        bridge(self, token, |either| either.map_flatten_right(f))
    }

    /// Like [`map_flatten_right`](Self::map_flatten_right), with an
    /// asynchronous transformation.
    fn map_flatten_right_async<U, F, Fut>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<Either<L, U>, impl Future<Output = Result<Either<L, U>, Cancelled>>>
    where
        F: FnOnce(R, CancellationToken) -> Fut,
        Fut: Future<Output = Either<L, U>>,
    {
        bridge_async(self, token, |either, token| match either {
            Either::Left(value) => Resolution::Ready(Ok(Either::Left(value))),
            Either::Right(value) => Resolution::Pending(lifted(f(value, token), identity)),
        })
    }

    /// See [`Either::map_both`].
    fn map_both<U, V, FL, FR>(
        self,
        token: &CancellationToken,
        on_left: FL,
        on_right: FR,
    ) -> Bridged<Either<U, V>, impl Future<Output = Result<Either<U, V>, Cancelled>>>
    where
        FL: FnOnce(L) -> U,
        FR: FnOnce(R) -> V,
    {
        bridge(self, token, |either| either.map_both(on_left, on_right))
    }

    /// Like [`map_both`](Self::map_both), with asynchronous
    /// transformations.
    fn map_both_async<U, V, FL, FR, LFut, RFut>(
        self,
        token: &CancellationToken,
        on_left: FL,
        on_right: FR,
    ) -> Bridged<Either<U, V>, impl Future<Output = Result<Either<U, V>, Cancelled>>>
    where
        FL: FnOnce(L, CancellationToken) -> LFut,
        FR: FnOnce(R, CancellationToken) -> RFut,
        LFut: Future<Output = U>,
        RFut: Future<Output = V>,
    {
        bridge_async(self, token, |either, token| {
            let mapped = match either {
                Either::Left(value) => {
                    futures::future::Either::Left(lifted(on_left(value, token), Either::Left))
                }
                Either::Right(value) => {
                    futures::future::Either::Right(lifted(on_right(value, token), Either::Right))
                }
            };
            Resolution::Pending(mapped)
        })
    }

    /// See [`Either::fold`].
    fn fold<U, FL, FR>(
        self,
        token: &CancellationToken,
        on_left: FL,
        on_right: FR,
    ) -> Bridged<U, impl Future<Output = Result<U, Cancelled>>>
    where
        FL: FnOnce(L) -> U,
        FR: FnOnce(R) -> U,
    {
        bridge(self, token, |either| either.fold(on_left, on_right))
    }

    /// Like [`fold`](Self::fold), with asynchronous transformations.
    fn fold_async<U, FL, FR, LFut, RFut>(
        self,
        token: &CancellationToken,
        on_left: FL,
        on_right: FR,
    ) -> Bridged<U, impl Future<Output = Result<U, Cancelled>>>
    where
        FL: FnOnce(L, CancellationToken) -> LFut,
        FR: FnOnce(R, CancellationToken) -> RFut,
        LFut: Future<Output = U>,
        RFut: Future<Output = U>,
    {
        bridge_async(self, token, |either, token| {
            let folded = match either {
                Either::Left(value) => futures::future::Either::Left(on_left(value, token)),
                Either::Right(value) => futures::future::Either::Right(on_right(value, token)),
            };
            Resolution::Pending(lifted(folded, identity))
        })
    }

    /// See [`Either::invert`].
    fn invert(
        self,
        token: &CancellationToken,
    ) -> Bridged<Either<R, L>, impl Future<Output = Result<Either<R, L>, Cancelled>>> {
        bridge(self, token, Either::invert)
    }

    /// See [`Either::left_or`].
    fn left_or(
        self,
        token: &CancellationToken,
        default: L,
    ) -> Bridged<L, impl Future<Output = Result<L, Cancelled>>> {
        bridge(self, token, |either| either.left_or(default))
    }

    /// See [`Either::left_or_else`].
    fn left_or_else<F>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<L, impl Future<Output = Result<L, Cancelled>>>
    where
        F: FnOnce(R) -> L,
    {
        bridge(self, token, |either| either.left_or_else(f))
    }

    /// Like [`left_or_else`](Self::left_or_else), with an asynchronous
    /// fallback.
    fn left_or_else_async<F, Fut>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<L, impl Future<Output = Result<L, Cancelled>>>
    where
        F: FnOnce(R, CancellationToken) -> Fut,
        Fut: Future<Output = L>,
    {
        bridge_async(self, token, |either, token| match either {
            Either::Left(value) => Resolution::Ready(Ok(value)),
            Either::Right(value) => Resolution::Pending(lifted(f(value, token), identity)),
        })
    }

    /// See [`Either::right_or`].
    fn right_or(
        self,
        token: &CancellationToken,
        default: R,
    ) -> Bridged<R, impl Future<Output = Result<R, Cancelled>>> {
        bridge(self, token, |either| either.right_or(default))
    }

    /// See [`Either::right_or_else`].
    fn right_or_else<F>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<R, impl Future<Output = Result<R, Cancelled>>>
    where
        F: FnOnce(L) -> R,
    {
        bridge(self, token, |either| either.right_or_else(f))
    }

    /// Like [`right_or_else`](Self::right_or_else), with an asynchronous
    /// fallback.
    fn right_or_else_async<F, Fut>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> Bridged<R, impl Future<Output = Result<R, Cancelled>>>
    where
        F: FnOnce(L, CancellationToken) -> Fut,
        Fut: Future<Output = R>,
    {
        bridge_async(self, token, |either, token| match either {
            Either::Left(value) => Resolution::Pending(lifted(f(value, token), identity)),
            Either::Right(value) => Resolution::Ready(Ok(value)),
        })
    }

    /// See [`Either::into_left`].
    fn into_left(
        self,
        token: &CancellationToken,
    ) -> Bridged<Maybe<L>, impl Future<Output = Result<Maybe<L>, Cancelled>>> {
        bridge(self, token, Either::into_left)
    }

    /// See [`Either::into_right`].
    fn into_right(
        self,
        token: &CancellationToken,
    ) -> Bridged<Maybe<R>, impl Future<Output = Result<Maybe<R>, Cancelled>>> {
        bridge(self, token, Either::into_right)
    }

    /// See [`Either::to_try`]. A panic raised while producing the container
    /// or the failure is captured as a [`Try::Failure`].
    fn to_try<E, F>(
        self,
        token: &CancellationToken,
        on_left: F,
    ) -> Bridged<Try<R>, impl Future<Output = Result<Try<R>, Cancelled>>>
    where
        F: FnOnce(L) -> E,
        E: Into<anyhow::Error>,
    {
        bridge_catching(self, token, |either| either.to_try(on_left))
    }

    /// Like [`to_try`](Self::to_try), building the failure asynchronously.
    fn to_try_async<E, F, Fut>(
        self,
        token: &CancellationToken,
        on_left: F,
    ) -> Bridged<Try<R>, impl Future<Output = Result<Try<R>, Cancelled>>>
    where
        F: FnOnce(L, CancellationToken) -> Fut,
        Fut: Future<Output = E>,
        E: Into<anyhow::Error>,
    {
        bridge_catching_async(self, token, |either, token| match either {
            Either::Left(value) => Resolution::Pending(lifted(on_left(value, token), |error: E| {
                Try::Failure(error.into())
            })),
            Either::Right(value) => Resolution::Ready(Ok(Try::Success(value))),
        })
    }

    /// See [`Either::do_effect`].
    fn do_effect<FL, FR>(
        self,
        token: &CancellationToken,
        on_left: FL,
        on_right: FR,
    ) -> Bridged<(), impl Future<Output = Result<(), Cancelled>>>
    where
        FL: FnOnce(L),
        FR: FnOnce(R),
    {
        bridge(self, token, |either| either.do_effect(on_left, on_right))
    }

    /// Like [`do_effect`](Self::do_effect), with asynchronous effects.
    fn do_effect_async<FL, FR, LFut, RFut>(
        self,
        token: &CancellationToken,
        on_left: FL,
        on_right: FR,
    ) -> Bridged<(), impl Future<Output = Result<(), Cancelled>>>
    where
        FL: FnOnce(L, CancellationToken) -> LFut,
        FR: FnOnce(R, CancellationToken) -> RFut,
        LFut: Future<Output = ()>,
        RFut: Future<Output = ()>,
    {
        bridge_async(self, token, |either, token| {
            let effect = match either {
                Either::Left(value) => futures::future::Either::Left(on_left(value, token)),
                Either::Right(value) => futures::future::Either::Right(on_right(value, token)),
            };
            Resolution::Pending(lifted(effect, identity))
        })
    }
}

impl<S, L, R> EventualEither<L, R> for S where S: Eventual<Output = Either<L, R>> {}
