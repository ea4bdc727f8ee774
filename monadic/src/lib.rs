/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

#![deny(missing_docs)]

//! Value containers with one set of combinators for values in hand and
//! for values still being computed.
//!
//! # Quick Start
//!
//! ```rust
//! use monadic::EventualMaybe;
//! use monadic::Maybe;
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio_test::block_on(async {
//! let token = CancellationToken::new();
//!
//! // Already resolved: applied at call time.
//! let ready = monadic::resolved(Maybe::value(2)).map(&token, |x| x + 1);
//! assert!(ready.is_ready());
//! assert_eq!(ready.await, Ok(Maybe::value(3)));
//!
//! // Still pending: applied once the source resolves.
//! let pending = monadic::deferred(async { Maybe::value(2) }).map(&token, |x| x + 1);
//! assert!(!pending.is_ready());
//! assert_eq!(pending.await, Ok(Maybe::value(3)));
//! # })
//! ```
//!
//! # Core Concepts
//!
//! - **Containers**: [`Maybe`], [`Either`] and [`Try`], each with its
//!   synchronous combinators as inherent methods.
//!
//! - **Sources**: anything implementing [`Eventual`], a future that can
//!   report whether it has already resolved. Ready futures, shared
//!   futures, spawned tasks and [`deferred`] futures are all sources, as
//!   is the [`Bridged`] result of every combinator, so calls chain.
//!
//! - **The bridge**: [`EventualMaybe`], [`EventualEither`] and
//!   [`EventualTry`] lift the synchronous combinators over sources. An
//!   already-resolved source takes the fast path (no scheduling); a
//!   pending one is awaited under a
//!   [`CancellationToken`](tokio_util::sync::CancellationToken), and the
//!   transformation is skipped if the token fires first.
//!
//! - **Projection**: [`projection`] filters a stream of containers down to
//!   the values they hold.
//!
//! Bridge behavior is configured through [`config`].

/// The async combinator bridge.
pub mod bridge;
/// Bridge configuration.
pub mod config;
/// The [`Either`] container.
pub mod either;
/// Error types.
pub mod error;
/// The [`Eventual`] source abstraction.
pub mod eventual;
/// The [`Maybe`] container.
pub mod maybe;
/// Lazy projection over streams of containers.
pub mod projection;
/// The [`Try`] container.
pub mod result;
mod wait;

#[cfg(test)]
mod test_utils;

pub use bridge::either::EventualEither;
pub use bridge::maybe::EventualMaybe;
pub use bridge::maybe::EventualNestedMaybe;
pub use bridge::result::EventualNestedTry;
pub use bridge::result::EventualTry;
pub use either::Either;
pub use error::AccessError;
pub use error::Cancelled;
pub use error::Panicked;
pub use error::Side;
pub use eventual::Bridged;
pub use eventual::Deferred;
pub use eventual::Eventual;
pub use eventual::Joined;
pub use eventual::Resolution;
pub use eventual::cancelled;
pub use eventual::deferred;
pub use eventual::resolved;
pub use maybe::Maybe;
pub use result::Try;
pub use wait::await_cancellable;
