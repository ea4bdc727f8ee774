/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Helpers shared by the unit tests.

use std::future::Future;
use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::task::Context;
use std::task::Poll;

use tokio::sync::oneshot;

use crate::eventual::Deferred;
use crate::eventual::deferred;

/// Counts invocations of the closures it wraps.
#[derive(Debug, Clone, Default)]
pub(crate) struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record one invocation.
    pub(crate) fn tick(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    /// Wrap `f` so that each call is counted.
    pub(crate) fn counting<A, U>(&self, f: impl FnOnce(A) -> U) -> impl FnOnce(A) -> U {
        let counter = self.clone();
        move |arg| {
            counter.tick();
            f(arg)
        }
    }
}

/// A future that resolves with the value sent through the returned sender.
pub(crate) fn gate<T>() -> (oneshot::Sender<T>, impl Future<Output = T>) {
    let (tx, rx) = oneshot::channel();
    (tx, async move { rx.await.expect("gate sender dropped") })
}

/// A pending source that resolves with the value sent through the returned
/// sender.
pub(crate) fn gated<T>() -> (oneshot::Sender<T>, Deferred<impl Future<Output = T>>) {
    let (tx, future) = gate();
    (tx, deferred(future))
}

/// Poll `future` exactly once with a no-op waker.
pub(crate) fn poll_once<F: Future>(future: F) -> Poll<F::Output> {
    let waker = futures::task::noop_waker();
    let mut cx = Context::from_waker(&waker);
    pin!(future).poll(&mut cx)
}
