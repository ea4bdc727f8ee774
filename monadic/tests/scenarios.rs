/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! End-to-end behavior of the containers and the bridge through the public
//! API.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use anyhow::anyhow;
use futures::StreamExt;
use monadic::Cancelled;
use monadic::Either;
use monadic::EventualEither;
use monadic::EventualMaybe;
use monadic::EventualTry;
use monadic::Maybe;
use monadic::Try;
use proptest::prelude::*;
use timed_test::async_timed_test;
use tokio_util::sync::CancellationToken;

fn failure_message<T>(attempt: Try<T>) -> String {
    match attempt {
        Try::Success(_) => panic!("expected a failure"),
        Try::Failure(error) => error.to_string(),
    }
}

fn boom(x: i32) -> i32 {
    if x >= 0 {
        panic!("boom");
    }
    x
}

#[tokio::test]
async fn map_then_value_or() {
    let token = CancellationToken::new();
    let doubled = monadic::resolved(Maybe::value(5))
        .map(&token, |x| x * 2)
        .value_or(&token, 0)
        .await;
    assert_eq!(doubled, Ok(10));
}

#[tokio::test]
async fn value_or_on_none() {
    let token = CancellationToken::new();
    let fallback = monadic::resolved(Maybe::<i32>::none())
        .value_or(&token, 7)
        .await;
    assert_eq!(fallback, Ok(7));
}

#[tokio::test]
async fn map_left_on_left() {
    let token = CancellationToken::new();
    let mapped = monadic::resolved(Either::<i32, String>::left(3))
        .map_left(&token, |x| x + 1)
        .await;
    assert_eq!(mapped, Ok(Either::left(4)));
}

#[tokio::test]
async fn throwing_transformation_becomes_failure() {
    let token = CancellationToken::new();
    let caught = monadic::resolved(Try::ok(1))
        .map_catching(&token, |x| Ok(boom(x)))
        .await
        .unwrap();
    assert_eq!(failure_message(caught), "boom");

    let caught = monadic::deferred(async { Try::ok(1) })
        .map_catching_async(&token, |x, _| async move { Ok(boom(x)) })
        .await
        .unwrap();
    assert_eq!(failure_message(caught), "boom");
}

#[tokio::test]
async fn values_of_stream() {
    let token = CancellationToken::new();
    let upstream = futures::stream::iter([Maybe::value(1), Maybe::none(), Maybe::value(2)]);
    let values: Vec<_> = monadic::projection::values(upstream, &token)
        .collect()
        .await;
    assert_eq!(values, vec![Ok(1), Ok(2)]);
}

#[tokio::test]
async fn or_never_awaits_other() {
    let token = CancellationToken::new();
    let observed = Arc::new(AtomicUsize::new(0));
    let other = monadic::deferred({
        let observed = Arc::clone(&observed);
        async move {
            observed.fetch_add(1, Ordering::SeqCst);
            Maybe::value(0)
        }
    });
    let kept = monadic::resolved(Maybe::value(1)).or(&token, other).await;
    assert_eq!(kept, Ok(Maybe::value(1)));
    assert_eq!(observed.load(Ordering::SeqCst), 0);
}

#[async_timed_test(timeout_secs = 30)]
async fn cancellation_before_resolution() {
    let token = CancellationToken::new();
    let invoked = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = tokio::sync::oneshot::channel::<Maybe<i32>>();
    let source = monadic::deferred(async move { rx.await.unwrap_or(Maybe::none()) });

    let mapped = source.map(&token, {
        let invoked = Arc::clone(&invoked);
        move |x| {
            invoked.fetch_add(1, Ordering::SeqCst);
            x
        }
    });
    token.cancel();
    assert_eq!(mapped.await, Err(Cancelled));
    assert_eq!(invoked.load(Ordering::SeqCst), 0);
    drop(tx);
}

#[async_timed_test(timeout_secs = 30)]
async fn spawned_task_as_source() {
    let token = CancellationToken::new();
    let task = tokio::spawn(async {
        tokio::task::yield_now().await;
        Either::<String, i32>::right(20)
    });
    let total = task
        .map_right(&token, |x| x + 1)
        .right_or(&token, 0)
        .await;
    assert_eq!(total, Ok(21));
}

fn explode<T>(message: &str) -> T {
    panic!("{}", message)
}

async fn finished<T>(handle: &tokio::task::JoinHandle<T>) {
    while !handle.is_finished() {
        tokio::task::yield_now().await;
    }
}

#[async_timed_test(timeout_secs = 30, flavor = "current_thread")]
async fn finished_panicked_task_becomes_failure() {
    let token = CancellationToken::new();

    let handle = tokio::spawn(async { explode::<Maybe<i32>>("task boom") });
    finished(&handle).await;
    let converted = handle.to_try(&token, || anyhow!("absent"));
    assert!(!converted.is_ready());
    assert_eq!(failure_message(converted.await.unwrap()), "task boom");

    let handle = tokio::spawn(async { explode::<Try<i32>>("task boom") });
    finished(&handle).await;
    let caught = handle
        .map_catching(&token, |x| Ok(x + 1))
        .await
        .unwrap();
    assert_eq!(failure_message(caught), "task boom");
}

#[async_timed_test(timeout_secs = 30, flavor = "current_thread")]
async fn pending_panicked_task_becomes_failure() {
    let token = CancellationToken::new();

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        let _ = rx.await;
        explode::<Maybe<i32>>("task boom")
    });
    let converted = handle.to_try(&token, || anyhow!("absent"));
    tx.send(()).unwrap();
    assert_eq!(failure_message(converted.await.unwrap()), "task boom");

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        let _ = rx.await;
        explode::<Try<i32>>("task boom")
    });
    let caught = handle.map_catching(&token, |x| Ok(x + 1));
    tx.send(()).unwrap();
    assert_eq!(failure_message(caught.await.unwrap()), "task boom");
}

#[async_timed_test(timeout_secs = 30, flavor = "current_thread")]
async fn panicked_task_panics_where_awaited() {
    let token = CancellationToken::new();
    let handle = tokio::spawn(async { explode::<Maybe<i32>>("task boom") });
    finished(&handle).await;

    // Building the chain does not raise; awaiting it does.
    let mapped = handle.map(&token, |x| x + 1);
    assert!(!mapped.is_ready());
    let raised = futures::FutureExt::catch_unwind(AssertUnwindSafe(mapped)).await;
    assert!(raised.is_err());
}

#[async_timed_test(timeout_secs = 30, flavor = "current_thread")]
async fn aborted_task_is_cancelled() {
    let token = CancellationToken::new();

    let handle = tokio::spawn(futures::future::pending::<Maybe<i32>>());
    handle.abort();
    assert_eq!(handle.map(&token, |x| x + 1).await, Err(Cancelled));

    let handle = tokio::spawn(futures::future::pending::<Maybe<i32>>());
    handle.abort();
    finished(&handle).await;
    assert_eq!(handle.map(&token, |x| x + 1).await, Err(Cancelled));
}

#[async_timed_test(timeout_secs = 30, flavor = "current_thread")]
async fn shared_source_feeds_several_chains() {
    let token = CancellationToken::new();
    let shared = futures::FutureExt::shared(async { Maybe::value(3) });

    let first = shared.clone().map(&token, |x| x + 1).await;
    // Resolved now, so the second chain takes the fast path.
    let second = shared.clone().map(&token, |x| x * 2);
    assert!(second.is_ready());
    assert_eq!(first, Ok(Maybe::value(4)));
    assert_eq!(second.await, Ok(Maybe::value(6)));
}

#[tokio::test]
async fn absent_value_to_try() {
    let token = CancellationToken::new();
    let converted = monadic::resolved(Maybe::<i32>::none())
        .to_try(&token, || anyhow!("nothing to report"))
        .await
        .unwrap();
    assert_eq!(failure_message(converted), "nothing to report");
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    futures::executor::block_on(future)
}

proptest! {
    #[test]
    fn map_on_none_never_invokes(add in any::<i32>()) {
        let token = CancellationToken::new();
        let invoked = Arc::new(AtomicUsize::new(0));
        let mapped = monadic::resolved(Maybe::<i32>::none()).map(&token, {
            let invoked = Arc::clone(&invoked);
            move |x: i32| {
                invoked.fetch_add(1, Ordering::SeqCst);
                x.wrapping_add(add)
            }
        });
        prop_assert_eq!(block_on(mapped), Ok(Maybe::none()));
        prop_assert_eq!(invoked.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn filter_keeps_iff_predicate(x in any::<i32>(), bound in any::<i32>()) {
        let token = CancellationToken::new();
        let filtered = block_on(monadic::resolved(Maybe::value(x)).filter(&token, |v| *v > bound));
        let expected = if x > bound { Maybe::value(x) } else { Maybe::none() };
        prop_assert_eq!(filtered, Ok(expected));
    }

    #[test]
    fn fast_and_slow_paths_agree(x in proptest::option::of(any::<i32>()), fallback in any::<i32>()) {
        let token = CancellationToken::new();
        let maybe = Maybe::from(x);
        let fast = block_on(
            monadic::resolved(maybe)
                .map(&token, |v| v.wrapping_mul(3))
                .value_or(&token, fallback),
        );
        let slow = block_on(
            monadic::deferred(async move { maybe })
                .map(&token, |v| v.wrapping_mul(3))
                .value_or(&token, fallback),
        );
        prop_assert_eq!(fast, slow);
        prop_assert_eq!(fast, Ok(maybe.map(|v| v.wrapping_mul(3)).value_or(fallback)));
    }

    #[test]
    fn double_invert_is_identity(x in any::<i32>(), left in any::<bool>()) {
        let token = CancellationToken::new();
        let either: Either<i32, i32> = if left { Either::left(x) } else { Either::right(x) };
        let inverted = block_on(monadic::resolved(either).invert(&token).invert(&token));
        prop_assert_eq!(inverted, Ok(either));
    }
}
