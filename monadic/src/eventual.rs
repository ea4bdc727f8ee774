/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! A uniform view of "a future of `T`" that can report whether it has
//! already resolved.
//!
//! Rust futures do not expose their completion state, so the bridge works
//! over [`Eventual`] instead: a source that either hands over its result
//! right away or surrenders the future that will produce it. Sources may be
//! single-use ([`Deferred`], [`futures::future::Ready`],
//! [`tokio::task::JoinHandle`]) or reusable ([`futures::future::Shared`]).
//!
//! ```
//! use monadic::Eventual;
//! use monadic::Resolution;
//!
//! let resolution = monadic::resolved(3).resolve();
//! assert!(matches!(resolution, Resolution::Ready(Ok(3))));
//! ```

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use futures::FutureExt as _;
use futures::future;
use futures::future::Ready;
use futures::future::Shared;
use pin_project::pin_project;
use tokio::task::JoinError;
use tokio::task::JoinHandle;

use crate::error::Cancelled;

/// Either a result that is available now, or the future that will produce
/// it.
#[derive(Debug)]
pub enum Resolution<T, F> {
    /// Already resolved.
    Ready(T),
    /// Still pending.
    Pending(F),
}

impl<T, F> Resolution<T, F> {
    /// Whether the result is available now.
    pub fn is_ready(&self) -> bool {
        matches!(self, Resolution::Ready(_))
    }
}

/// A future of [`Eventual::Output`] whose completion state can be observed
/// without scheduling.
///
/// A source may itself resolve to [`Cancelled`] (for example, the result of
/// a bridge call whose token fired, or an aborted task).
pub trait Eventual: Sized {
    /// The value the source resolves to.
    type Output;

    /// The future to await when the source is still pending.
    type Future: Future<Output = Result<Self::Output, Cancelled>>;

    /// Observe the source. A resolved source hands over its result; a
    /// pending one hands over the future, which the caller awaits at most
    /// once.
    fn resolve(self) -> Resolution<Result<Self::Output, Cancelled>, Self::Future>;
}

/// The future returned by every bridge operation.
///
/// `Ready` results were computed at call time and resolve on the first
/// poll; `Pending` results wrap the continuation that awaits the source.
#[pin_project(project = BridgedProj)]
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub enum Bridged<T, F> {
    /// Computed at call time. `None` once the result has been taken.
    Ready(Option<Result<T, Cancelled>>),
    /// Awaiting the source or an asynchronous transformation.
    Pending(#[pin] F),
}

impl<T, F> Bridged<T, F> {
    /// Whether the result was computed at call time.
    pub fn is_ready(&self) -> bool {
        matches!(self, Bridged::Ready(Some(_)))
    }
}

impl<T, F> Future for Bridged<T, F>
where
    F: Future<Output = Result<T, Cancelled>>,
{
    type Output = Result<T, Cancelled>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.project() {
            BridgedProj::Ready(settled) => {
                Poll::Ready(settled.take().expect("Bridged polled after completion"))
            }
            BridgedProj::Pending(future) => future.poll(cx),
        }
    }
}

impl<T, F> Eventual for Bridged<T, F>
where
    F: Future<Output = Result<T, Cancelled>>,
{
    type Output = T;
    type Future = Self;

    fn resolve(self) -> Resolution<Result<T, Cancelled>, Self> {
        match self {
            Bridged::Ready(Some(settled)) => Resolution::Ready(settled),
            pending => Resolution::Pending(pending),
        }
    }
}

/// A single-use future that is always observed as pending.
#[pin_project]
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Deferred<F> {
    #[pin]
    future: F,
}

/// Adapt an arbitrary future into an [`Eventual`] source.
pub fn deferred<F: Future>(future: F) -> Deferred<F> {
    Deferred { future }
}

impl<F: Future> Future for Deferred<F> {
    type Output = Result<F::Output, Cancelled>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.project().future.poll(cx).map(Ok)
    }
}

impl<F: Future> Eventual for Deferred<F> {
    type Output = F::Output;
    type Future = Self;

    fn resolve(self) -> Resolution<Result<F::Output, Cancelled>, Self> {
        Resolution::Pending(self)
    }
}

/// An already-resolved source.
pub fn resolved<T>(value: T) -> Ready<T> {
    future::ready(value)
}

/// A source that has already resolved to [`Cancelled`].
pub fn cancelled<T>() -> Bridged<T, future::Pending<Result<T, Cancelled>>> {
    Bridged::Ready(Some(Err(Cancelled)))
}

impl<T> Eventual for Ready<T> {
    type Output = T;
    type Future = Ready<Result<T, Cancelled>>;

    fn resolve(self) -> Resolution<Result<T, Cancelled>, Self::Future> {
        Resolution::Ready(Ok(self.into_inner()))
    }
}

/// A reusable future: every clone observes the same result, and a clone
/// that resolves after the shared computation finished does not poll it.
impl<F> Eventual for Shared<F>
where
    F: Future,
    F::Output: Clone,
{
    type Output = F::Output;
    type Future = Deferred<Shared<F>>;

    fn resolve(self) -> Resolution<Result<F::Output, Cancelled>, Self::Future> {
        match self.peek() {
            Some(output) => Resolution::Ready(Ok(output.clone())),
            None => Resolution::Pending(deferred(self)),
        }
    }
}

/// The pending form of a [`JoinHandle`] source. Panics raised by the task
/// are resumed on the awaiting task, never at the call that observed the
/// handle; an aborted task resolves to [`Cancelled`].
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Joined<T>(JoinState<T>);

enum JoinState<T> {
    Running(JoinHandle<T>),
    /// The task had already panicked when the handle was observed.
    Panicked(Option<Box<dyn Any + Send>>),
}

impl<T: fmt::Debug> fmt::Debug for Joined<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            JoinState::Running(handle) => f.debug_tuple("Joined").field(handle).finish(),
            JoinState::Panicked(_) => f.debug_tuple("Joined").field(&"panicked").finish(),
        }
    }
}

impl<T> Future for Joined<T> {
    type Output = Result<T, Cancelled>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.0 {
            JoinState::Running(handle) => handle.poll_unpin(cx).map(settle_join),
            JoinState::Panicked(payload) => match payload.take() {
                Some(payload) => std::panic::resume_unwind(payload),
                None => panic!("Joined polled after completion"),
            },
        }
    }
}

fn settle_join<T>(joined: Result<T, JoinError>) -> Result<T, Cancelled> {
    match joined {
        Ok(output) => Ok(output),
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        Err(_) => Err(Cancelled),
    }
}

/// A spawned task is resolved once it has finished. A task that finished
/// by panicking stays pending so that the panic surfaces where the result
/// is awaited. Dropping the pending form detaches the task rather than
/// aborting it.
impl<T> Eventual for JoinHandle<T> {
    type Output = T;
    type Future = Joined<T>;

    fn resolve(mut self) -> Resolution<Result<T, Cancelled>, Joined<T>> {
        if self.is_finished() {
            match (&mut self).now_or_never() {
                Some(Err(err)) if err.is_panic() => {
                    let payload = err.into_panic();
                    return Resolution::Pending(Joined(JoinState::Panicked(Some(payload))));
                }
                Some(joined) => return Resolution::Ready(settle_join(joined)),
                None => {}
            }
        }
        Resolution::Pending(Joined(JoinState::Running(self)))
    }
}
