/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Waiting on an [`Eventual`] source under a [`CancellationToken`].

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::config;
use crate::error::Cancelled;
use crate::eventual::Bridged;
use crate::eventual::Eventual;
use crate::eventual::Resolution;

/// Wait for `source`, giving up when `token` fires first.
///
/// A source that has already resolved yields its result immediately, even if
/// the token has also fired: the source finished first. Otherwise the source's
/// future is polled until it resolves or the token is cancelled, whichever
/// comes first. On cancellation the source's future is dropped: a
/// [`Shared`](futures::future::Shared) computation keeps running for its
/// other holders, and a [`JoinHandle`](tokio::task::JoinHandle) detaches its
/// task.
///
/// ```
/// # tokio_test::block_on(async {
/// use monadic::Cancelled;
/// use tokio_util::sync::CancellationToken;
///
/// let token = CancellationToken::new();
/// token.cancel();
///
/// let never = monadic::deferred(futures::future::pending::<i32>());
/// assert_eq!(monadic::await_cancellable(never, &token).await, Err(Cancelled));
/// assert_eq!(monadic::await_cancellable(monadic::resolved(1), &token).await, Ok(1));
/// # })
/// ```
pub fn await_cancellable<S>(
    source: S,
    token: &CancellationToken,
) -> Bridged<S::Output, impl Future<Output = Result<S::Output, Cancelled>>>
where
    S: Eventual,
{
    let resolution = match source.resolve() {
        Resolution::Ready(settled) if config::global::fast_path() => {
            return Bridged::Ready(Some(settled));
        }
        resolution => resolution,
    };
    let token = token.clone();
    Bridged::Pending(async move { settle(resolution, &token).await })
}

/// The slow path: finish observing a source whose resolution was taken
/// earlier.
pub(crate) async fn settle<T, F>(
    resolution: Resolution<Result<T, Cancelled>, F>,
    token: &CancellationToken,
) -> Result<T, Cancelled>
where
    F: Future<Output = Result<T, Cancelled>>,
{
    match resolution {
        Resolution::Ready(settled) => settled,
        Resolution::Pending(future) => race(future, token).await,
    }
}

/// Poll `future` until it resolves or `token` fires. Cancellation is checked
/// first, so a token that has already fired never polls the future.
pub(crate) async fn race<T, F>(future: F, token: &CancellationToken) -> Result<T, Cancelled>
where
    F: Future<Output = Result<T, Cancelled>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => {
            tracing::debug!("wait abandoned: cancellation requested before the source resolved");
            Err(Cancelled)
        }
        settled = future => settled,
    }
}
