/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The async combinator bridge.
//!
//! Every combinator over a future of a container funnels through one of the
//! four functions in this module:
//!
//! - [`bridge`]: apply a synchronous operation to the source's output.
//! - [`bridge_async`]: apply an operation that may need to await (an
//!   asynchronous transformation, or another source).
//! - [`bridge_catching`] and [`bridge_catching_async`]: the same, but
//!   panics raised while producing the result are captured as a
//!   [`Try::Failure`] instead of propagating.
//!
//! All four observe the same contract:
//!
//! 1. If the source has already resolved, the operation runs at call time
//!    and the returned [`Bridged`] is ready; no continuation is created.
//! 2. Otherwise the source is awaited (once) under the token, and the
//!    operation runs afterwards. If the token fires first, the operation
//!    never runs and the result is [`Cancelled`].
//! 3. Asynchronous transformations receive a clone of the token, and their
//!    futures are awaited under the same token.
//!
//! The per-container combinators live in [`maybe`], [`either`] and
//! [`result`].

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt as _;
use tokio_util::sync::CancellationToken;

use crate::config;
use crate::error::Cancelled;
use crate::error::Panicked;
use crate::eventual::Bridged;
use crate::eventual::Eventual;
use crate::eventual::Resolution;
use crate::result::Try;
use crate::wait::race;
use crate::wait::settle;

pub mod either;
pub mod maybe;
pub mod result;

/// Apply `op` to the output of `source`.
///
/// ```
/// use monadic::bridge::bridge;
/// use tokio_util::sync::CancellationToken;
///
/// let token = CancellationToken::new();
/// let doubled = bridge(monadic::resolved(4), &token, |x| x * 2);
/// assert!(doubled.is_ready());
/// assert_eq!(futures::executor::block_on(doubled), Ok(8));
/// ```
pub fn bridge<S, U, F>(
    source: S,
    token: &CancellationToken,
    op: F,
) -> Bridged<U, impl Future<Output = Result<U, Cancelled>>>
where
    S: Eventual,
    F: FnOnce(S::Output) -> U,
{
    let resolution = match source.resolve() {
        Resolution::Ready(settled) if config::global::fast_path() => {
            tracing::trace!(path = "fast", "bridge");
            return Bridged::Ready(Some(settled.map(op)));
        }
        resolution => resolution,
    };
    tracing::trace!(path = "slow", "bridge");
    let token = token.clone();
    Bridged::Pending(async move {
        let output = settle(resolution, &token).await?;
        Ok(op(output))
    })
}

/// Apply `op`, which either produces its result directly or hands back a
/// future for it, to the output of `source`.
///
/// On the fast path `op` runs at call time; the result is ready only if
/// `op` itself answers with [`Resolution::Ready`].
pub fn bridge_async<S, U, F, Fut>(
    source: S,
    token: &CancellationToken,
    op: F,
) -> Bridged<U, impl Future<Output = Result<U, Cancelled>>>
where
    S: Eventual,
    F: FnOnce(S::Output, CancellationToken) -> Resolution<Result<U, Cancelled>, Fut>,
    Fut: Future<Output = Result<U, Cancelled>>,
{
    match stage(source, token, op) {
        Staged::Done(settled) => Bridged::Ready(Some(settled)),
        Staged::Continue(stage) => Bridged::Pending(drive(stage, token.clone())),
    }
}

/// Like [`bridge`], for operations that materialize a [`Try`]: a panic
/// raised while awaiting the source or running `op` becomes a
/// [`Try::Failure`]. Cancellation is not captured.
pub fn bridge_catching<S, U, F>(
    source: S,
    token: &CancellationToken,
    op: F,
) -> Bridged<Try<U>, impl Future<Output = Result<Try<U>, Cancelled>>>
where
    S: Eventual,
    F: FnOnce(S::Output) -> Try<U>,
{
    let resolution = match source.resolve() {
        Resolution::Ready(settled) if config::global::fast_path() => {
            tracing::trace!(path = "fast", "bridge");
            return Bridged::Ready(Some(settled.map(|output| catch(|| op(output)))));
        }
        resolution => resolution,
    };
    tracing::trace!(path = "slow", "bridge");
    let token = token.clone();
    Bridged::Pending(async move {
        let attempt = AssertUnwindSafe(async move {
            let output = settle(resolution, &token).await?;
            Ok(op(output))
        });
        attempt
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Ok(captured(payload)))
    })
}

/// Like [`bridge_async`], capturing panics raised by the source, by `op`,
/// or by the future `op` hands back as a [`Try::Failure`].
pub fn bridge_catching_async<S, U, F, Fut>(
    source: S,
    token: &CancellationToken,
    op: F,
) -> Bridged<Try<U>, impl Future<Output = Result<Try<U>, Cancelled>>>
where
    S: Eventual,
    F: FnOnce(S::Output, CancellationToken) -> Resolution<Result<Try<U>, Cancelled>, Fut>,
    Fut: Future<Output = Result<Try<U>, Cancelled>>,
{
    let staged = std::panic::catch_unwind(AssertUnwindSafe(|| stage(source, token, op)));
    match staged {
        Ok(Staged::Done(settled)) => Bridged::Ready(Some(settled)),
        Err(payload) => Bridged::Ready(Some(Ok(captured(payload)))),
        Ok(Staged::Continue(stage)) => {
            let token = token.clone();
            Bridged::Pending(async move {
                AssertUnwindSafe(drive(stage, token))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|payload| Ok(captured(payload)))
            })
        }
    }
}

/// Where an asynchronous bridge call stands once the call-time work is
/// done.
enum Stage<R, F, Fut> {
    /// The source has not been observed to resolve; `op` has not run.
    Waiting(R, F),
    /// `op` ran at call time and handed back a future.
    Transforming(Fut),
}

enum Staged<T, R, F, Fut> {
    Done(Result<T, Cancelled>),
    Continue(Stage<R, F, Fut>),
}

/// The call-time half of [`bridge_async`].
#[allow(clippy::type_complexity)]
fn stage<S, U, F, Fut>(
    source: S,
    token: &CancellationToken,
    op: F,
) -> Staged<U, Resolution<Result<S::Output, Cancelled>, S::Future>, F, Fut>
where
    S: Eventual,
    F: FnOnce(S::Output, CancellationToken) -> Resolution<Result<U, Cancelled>, Fut>,
{
    match source.resolve() {
        Resolution::Ready(settled) if config::global::fast_path() => {
            tracing::trace!(path = "fast", "bridge");
            let output = match settled {
                Ok(output) => output,
                Err(cancelled) => return Staged::Done(Err(cancelled)),
            };
            match op(output, token.clone()) {
                Resolution::Ready(settled) => Staged::Done(settled),
                Resolution::Pending(future) => Staged::Continue(Stage::Transforming(future)),
            }
        }
        resolution => {
            tracing::trace!(path = "slow", "bridge");
            Staged::Continue(Stage::Waiting(resolution, op))
        }
    }
}

/// The deferred half of [`bridge_async`].
async fn drive<T, SF, U, F, Fut>(
    stage: Stage<Resolution<Result<T, Cancelled>, SF>, F, Fut>,
    token: CancellationToken,
) -> Result<U, Cancelled>
where
    SF: Future<Output = Result<T, Cancelled>>,
    F: FnOnce(T, CancellationToken) -> Resolution<Result<U, Cancelled>, Fut>,
    Fut: Future<Output = Result<U, Cancelled>>,
{
    let future = match stage {
        Stage::Transforming(future) => future,
        Stage::Waiting(resolution, op) => {
            let output = settle(resolution, &token).await?;
            match op(output, token.clone()) {
                Resolution::Ready(settled) => return settled,
                Resolution::Pending(future) => future,
            }
        }
    };
    race(future, &token).await
}

/// Await `future` and wrap its output; the building block of the `*_async`
/// combinators.
pub(crate) async fn lifted<T, U>(
    future: impl Future<Output = T>,
    wrap: impl FnOnce(T) -> U,
) -> Result<U, Cancelled> {
    Ok(wrap(future.await))
}

fn catch<U>(op: impl FnOnce() -> Try<U>) -> Try<U> {
    std::panic::catch_unwind(AssertUnwindSafe(op)).unwrap_or_else(captured)
}

fn captured<U>(payload: Box<dyn std::any::Any + Send>) -> Try<U> {
    let panicked = Panicked::from_payload(payload);
    tracing::debug!(panic = panicked.message(), "captured panic as failure");
    Try::Failure(panicked.into())
}

#[cfg(test)]
mod tests {
    use std::task::Poll;

    use futures::future::Ready;
    use proptest::prelude::*;
    use timed_test::async_timed_test;

    use super::*;
    use crate::eventual::deferred;
    use crate::eventual::resolved;
    use crate::test_utils::Counter;
    use crate::test_utils::gated;
    use crate::test_utils::poll_once;

    fn ready_op<U>(value: U) -> Resolution<Result<U, Cancelled>, Ready<Result<U, Cancelled>>> {
        Resolution::Ready(Ok(value))
    }

    #[test]
    fn test_fast_path_is_ready() {
        let _config = config::global::lock();
        let token = CancellationToken::new();
        let counter = Counter::new();
        let bridged = bridge(resolved(2), &token, counter.counting(|x: i32| x + 1));
        // Applied at call time.
        assert_eq!(counter.count(), 1);
        assert!(bridged.is_ready());
        assert_eq!(poll_once(bridged), Poll::Ready(Ok(3)));
    }

    #[async_timed_test(timeout_secs = 30)]
    async fn test_slow_path_runs_after_source() {
        let token = CancellationToken::new();
        let counter = Counter::new();
        let (gate, source) = gated::<i32>();
        let bridged = bridge(source, &token, counter.counting(|x: i32| x + 1));
        assert!(!bridged.is_ready());
        assert_eq!(counter.count(), 0);
        gate.send(2).unwrap();
        assert_eq!(bridged.await, Ok(3));
        assert_eq!(counter.count(), 1);
    }

    #[async_timed_test(timeout_secs = 30, flavor = "current_thread")]
    async fn test_cancellation_skips_op() {
        let token = CancellationToken::new();
        let counter = Counter::new();
        let (_gate, source) = gated::<i32>();
        let bridged = bridge(source, &token, counter.counting(|x: i32| x + 1));
        token.cancel();
        assert_eq!(bridged.await, Err(Cancelled));
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn test_cancelled_source_propagates() {
        let token = CancellationToken::new();
        let counter = Counter::new();
        let source = crate::eventual::cancelled::<i32>();
        let bridged = bridge(source, &token, counter.counting(|x: i32| x));
        assert_eq!(futures::executor::block_on(bridged), Err(Cancelled));
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn test_async_fast_path_short_circuit() {
        let _config = config::global::lock();
        let token = CancellationToken::new();
        let bridged = bridge_async(resolved(5), &token, |x: i32, _| ready_op(x * 2));
        assert!(bridged.is_ready());
        assert_eq!(poll_once(bridged), Poll::Ready(Ok(10)));
    }

    #[async_timed_test(timeout_secs = 30)]
    async fn test_async_transformation_receives_token() {
        let token = CancellationToken::new();
        let (gate, source) = gated::<i32>();
        let bridged = bridge_async(source, &token, |x: i32, token: CancellationToken| {
            Resolution::Pending(async move {
                assert!(!token.is_cancelled());
                Ok(x + 1)
            })
        });
        gate.send(1).unwrap();
        assert_eq!(bridged.await, Ok(2));
    }

    #[async_timed_test(timeout_secs = 30)]
    async fn test_cancellation_during_transformation() {
        let token = CancellationToken::new();
        let (_gate, transformed) = gated::<i32>();
        let bridged = bridge_async(resolved(1), &token, move |_: i32, _| {
            Resolution::Pending(transformed)
        });
        token.cancel();
        assert_eq!(bridged.await, Err(Cancelled));
    }

    #[test]
    fn test_catching_fast_path() {
        let token = CancellationToken::new();
        let bridged = bridge_catching(resolved(1), &token, |x: i32| Try::ok(x + boom("boom")));
        let caught = futures::executor::block_on(bridged).unwrap();
        assert_eq!(caught.failure().into_value().unwrap().to_string(), "boom");
    }

    fn boom(message: &'static str) -> i32 {
        panic!("{}", message)
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    async fn test_catching_source_panic() {
        let token = CancellationToken::new();
        let source = deferred(async {
            tokio::task::yield_now().await;
            boom("boom")
        });
        let caught = bridge_catching(source, &token, Try::ok).await.unwrap();
        assert_eq!(caught.failure().into_value().unwrap().to_string(), "boom");
        assert!(logs_contain("captured panic as failure"));
    }

    #[async_timed_test(timeout_secs = 30)]
    async fn test_catching_passes_cancellation() {
        let token = CancellationToken::new();
        let (_gate, source) = gated::<i32>();
        let bridged = bridge_catching(source, &token, Try::ok);
        token.cancel();
        assert!(matches!(bridged.await, Err(Cancelled)));
    }

    #[tokio::test]
    async fn test_catching_async_transformation_panic() {
        let token = CancellationToken::new();
        let bridged = bridge_catching_async(resolved(1), &token, |_: i32, _| {
            Resolution::Pending(async move {
                tokio::task::yield_now().await;
                Ok(Try::ok(boom("late boom")))
            })
        });
        let caught = bridged.await.unwrap();
        assert_eq!(caught.failure().into_value().unwrap().to_string(), "late boom");
    }

    #[test]
    fn test_catching_async_op_panic() {
        let token = CancellationToken::new();
        let bridged = bridge_catching_async(resolved(1), &token, |_: i32, _| {
            let value = boom("eager boom");
            ready_op(Try::ok(value))
        });
        let caught = futures::executor::block_on(bridged).unwrap();
        assert_eq!(caught.failure().into_value().unwrap().to_string(), "eager boom");
    }

    #[test]
    #[should_panic(expected = "propagated")]
    fn test_plain_bridge_propagates_panic() {
        let token = CancellationToken::new();
        let _ = bridge(resolved(1), &token, |_: i32| -> i32 { panic!("propagated") });
    }

    proptest! {
        #[test]
        fn prop_fast_and_slow_paths_agree(x in any::<i32>(), add in any::<i16>()) {
            let token = CancellationToken::new();
            let op = |v: i32| v.wrapping_add(i32::from(add));
            let fast = futures::executor::block_on(bridge(resolved(x), &token, op));
            let slow = futures::executor::block_on(bridge(deferred(async move { x }), &token, op));
            prop_assert_eq!(fast, slow);
            prop_assert_eq!(fast, Ok(op(x)));
        }

        #[test]
        fn prop_op_runs_exactly_once(x in any::<i32>(), slow in any::<bool>()) {
            let token = CancellationToken::new();
            let counter = Counter::new();
            let op = counter.counting(|v: i32| v / 2);
            let out = if slow {
                futures::executor::block_on(bridge(deferred(async move { x }), &token, op))
            } else {
                futures::executor::block_on(bridge(resolved(x), &token, op))
            };
            prop_assert_eq!(out, Ok(x / 2));
            prop_assert_eq!(counter.count(), 1);
        }
    }
}
