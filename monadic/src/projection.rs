/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Lazy projection of a stream of containers onto the values they hold.
//!
//! ```
//! # tokio_test::block_on(async {
//! use futures::StreamExt;
//! use monadic::Maybe;
//! use tokio_util::sync::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let source = futures::stream::iter([Maybe::value(1), Maybe::none(), Maybe::value(2)]);
//! let values: Vec<_> = monadic::projection::values(source, &token).collect().await;
//! assert_eq!(values, vec![Ok(1), Ok(2)]);
//! # })
//! ```

use std::future::Future;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;
use std::task::ready;

use futures::Stream;
use futures::stream::FusedStream;
use pin_project::pin_project;
use tokio_util::sync::CancellationToken;
use tokio_util::sync::WaitForCancellationFutureOwned;

use crate::either::Either;
use crate::error::Cancelled;
use crate::maybe::Maybe;
use crate::result::Try;

/// A stream that yields the items `project` keeps, in upstream order.
///
/// Items are pulled from upstream one at a time, only when the projection
/// itself is polled. Once the token fires, the projection yields a single
/// `Err(Cancelled)` and then ends without advancing upstream again.
#[pin_project]
#[must_use = "streams do nothing unless polled"]
pub struct Project<S, F> {
    #[pin]
    upstream: S,
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
    token: CancellationToken,
    project: F,
    done: bool,
}

/// Project `upstream` through `project`, skipping items it maps to `None`.
pub fn project<S, F, T>(upstream: S, token: &CancellationToken, project: F) -> Project<S, F>
where
    S: Stream,
    F: FnMut(S::Item) -> Option<T>,
{
    Project {
        upstream,
        cancelled: Box::pin(token.clone().cancelled_owned()),
        token: token.clone(),
        project,
        done: false,
    }
}

impl<S, F, T> Stream for Project<S, F>
where
    S: Stream,
    F: FnMut(S::Item) -> Option<T>,
{
    type Item = Result<T, Cancelled>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        if *this.done {
            return Poll::Ready(None);
        }
        if this.cancelled.as_mut().poll(cx).is_ready() {
            return Poll::Ready(Some(abandon(this.done)));
        }
        loop {
            // Skipped items do not yield, so recheck between advances.
            if this.token.is_cancelled() {
                return Poll::Ready(Some(abandon(this.done)));
            }
            match ready!(this.upstream.as_mut().poll_next(cx)) {
                Some(item) => {
                    if let Some(value) = (this.project)(item) {
                        return Poll::Ready(Some(Ok(value)));
                    }
                }
                None => {
                    *this.done = true;
                    return Poll::Ready(None);
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        // Any item may be skipped; cancellation adds one.
        let (_, upper) = self.upstream.size_hint();
        (0, upper.and_then(|upper| upper.checked_add(1)))
    }
}

impl<S, F, T> FusedStream for Project<S, F>
where
    S: Stream,
    F: FnMut(S::Item) -> Option<T>,
{
    fn is_terminated(&self) -> bool {
        self.done
    }
}

fn abandon<T>(done: &mut bool) -> Result<T, Cancelled> {
    *done = true;
    tracing::debug!("projection abandoned: cancellation requested");
    Err(Cancelled)
}

/// The payloads of the `Value` items.
pub fn values<S, T>(
    upstream: S,
    token: &CancellationToken,
) -> Project<S, impl FnMut(Maybe<T>) -> Option<T>>
where
    S: Stream<Item = Maybe<T>>,
{
    project(upstream, token, Maybe::into_option)
}

/// The payloads of the `Left` items.
pub fn lefts<S, L, R>(
    upstream: S,
    token: &CancellationToken,
) -> Project<S, impl FnMut(Either<L, R>) -> Option<L>>
where
    S: Stream<Item = Either<L, R>>,
{
    project(upstream, token, |either: Either<L, R>| {
        either.into_left().into_option()
    })
}

/// The payloads of the `Right` items.
pub fn rights<S, L, R>(
    upstream: S,
    token: &CancellationToken,
) -> Project<S, impl FnMut(Either<L, R>) -> Option<R>>
where
    S: Stream<Item = Either<L, R>>,
{
    project(upstream, token, |either: Either<L, R>| {
        either.into_right().into_option()
    })
}

/// The values of the successful items.
pub fn successes<S, T>(
    upstream: S,
    token: &CancellationToken,
) -> Project<S, impl FnMut(Try<T>) -> Option<T>>
where
    S: Stream<Item = Try<T>>,
{
    project(upstream, token, |attempt: Try<T>| {
        attempt.to_maybe().into_option()
    })
}

/// The errors of the failed items.
pub fn failures<S, T>(
    upstream: S,
    token: &CancellationToken,
) -> Project<S, impl FnMut(Try<T>) -> Option<anyhow::Error>>
where
    S: Stream<Item = Try<T>>,
{
    project(upstream, token, |attempt: Try<T>| {
        attempt.failure().into_option()
    })
}
