/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! A success-or-failure container: [`Try<T>`] holds a value or a captured
//! error.
//!
//! Unlike `Result`, the failure type is fixed to [`anyhow::Error`], and
//! [`Try::capture`] turns panics into failures as well as errors:
//!
//! ```
//! use monadic::Try;
//!
//! let failed: Try<i32> = Try::capture(|| panic!("boom"));
//! assert_eq!(failed.failure().into_value().unwrap().to_string(), "boom");
//! ```

use std::panic::AssertUnwindSafe;

use crate::error::Panicked;
use crate::maybe::Maybe;

/// A value or a captured failure.
#[derive(Debug)]
pub enum Try<T> {
    /// The computation succeeded.
    Success(T),
    /// The computation failed.
    Failure(anyhow::Error),
}

/// Construct a successful [`Try`].
pub fn ok<T>(value: T) -> Try<T> {
    Try::Success(value)
}

/// Construct a failed [`Try`].
pub fn error<T>(error: impl Into<anyhow::Error>) -> Try<T> {
    Try::Failure(error.into())
}

impl<T> Try<T> {
    /// Construct a successful [`Try`].
    pub fn ok(value: T) -> Self {
        Try::Success(value)
    }

    /// Construct a failed [`Try`].
    pub fn error(error: impl Into<anyhow::Error>) -> Self {
        Try::Failure(error.into())
    }

    /// Run `f`, capturing both its error and any panic it raises.
    pub fn capture<F>(f: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<T>,
    {
        match std::panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(result) => result.into(),
            Err(payload) => Try::Failure(Panicked::from_payload(payload).into()),
        }
    }

    /// Whether the computation succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Try::Success(_))
    }

    /// Whether the computation failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, Try::Failure(_))
    }

    /// Borrow the payload of either branch.
    pub fn as_ref(&self) -> Result<&T, &anyhow::Error> {
        match self {
            Try::Success(value) => Ok(value),
            Try::Failure(error) => Err(error),
        }
    }

    /// Convert into an `anyhow::Result`.
    pub fn into_result(self) -> anyhow::Result<T> {
        match self {
            Try::Success(value) => Ok(value),
            Try::Failure(error) => Err(error),
        }
    }

    /// Apply `f` to a successful value. Failures pass through and `f` is
    /// not invoked.
    pub fn map<U, F>(self, f: F) -> Try<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Try::Success(value) => Try::Success(f(value)),
            Try::Failure(error) => Try::Failure(error),
        }
    }

    /// Apply `f`, which itself produces a [`Try`], without re-wrapping its
    /// result.
    pub fn map_flatten<U, F>(self, f: F) -> Try<U>
    where
        F: FnOnce(T) -> Try<U>,
    {
        match self {
            Try::Success(value) => f(value),
            Try::Failure(error) => Try::Failure(error),
        }
    }

    /// Transform the captured failure.
    pub fn map_error<F>(self, f: F) -> Self
    where
        F: FnOnce(anyhow::Error) -> anyhow::Error,
    {
        match self {
            Try::Success(value) => Try::Success(value),
            Try::Failure(error) => Try::Failure(f(error)),
        }
    }

    /// Keep a success only if `predicate` holds; otherwise fail with the
    /// error built by `on_rejected`.
    pub fn filter<P, E, F>(self, predicate: P, on_rejected: F) -> Self
    where
        P: FnOnce(&T) -> bool,
        F: FnOnce(T) -> E,
        E: Into<anyhow::Error>,
    {
        match self {
            Try::Success(value) if predicate(&value) => Try::Success(value),
            Try::Success(value) => Try::Failure(on_rejected(value).into()),
            Try::Failure(error) => Try::Failure(error),
        }
    }

    /// `self` if it succeeded, otherwise `other`.
    pub fn or(self, other: Try<T>) -> Self {
        match self {
            Try::Success(_) => self,
            Try::Failure(_) => other,
        }
    }

    /// Recover from a failure.
    pub fn or_else<F>(self, f: F) -> Self
    where
        F: FnOnce(anyhow::Error) -> Try<T>,
    {
        match self {
            Try::Success(_) => self,
            Try::Failure(error) => f(error),
        }
    }

    /// The successful value, or `default`.
    pub fn value_or(self, default: T) -> T {
        match self {
            Try::Success(value) => value,
            Try::Failure(_) => default,
        }
    }

    /// The successful value, or `f` applied to the failure.
    pub fn value_or_else<F>(self, f: F) -> T
    where
        F: FnOnce(anyhow::Error) -> T,
    {
        match self {
            Try::Success(value) => value,
            Try::Failure(error) => f(error),
        }
    }

    /// The successful value, dropping any failure.
    pub fn to_maybe(self) -> Maybe<T> {
        match self {
            Try::Success(value) => Maybe::Value(value),
            Try::Failure(_) => Maybe::None,
        }
    }

    /// The failure, if any.
    pub fn failure(self) -> Maybe<anyhow::Error> {
        match self {
            Try::Success(_) => Maybe::None,
            Try::Failure(error) => Maybe::Value(error),
        }
    }

    /// Run exactly one of `on_success` and `on_failure`.
    pub fn do_effect<S, F>(self, on_success: S, on_failure: F)
    where
        S: FnOnce(T),
        F: FnOnce(anyhow::Error),
    {
        match self {
            Try::Success(value) => on_success(value),
            Try::Failure(error) => on_failure(error),
        }
    }
}

impl<T> Try<Try<T>> {
    /// Remove one level of nesting.
    pub fn flatten(self) -> Try<T> {
        match self {
            Try::Success(inner) => inner,
            Try::Failure(error) => Try::Failure(error),
        }
    }
}

impl<T, E> From<Result<T, E>> for Try<T>
where
    E: Into<anyhow::Error>,
{
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Try::Success(value),
            Err(error) => Try::Failure(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    fn message<T: std::fmt::Debug>(t: Try<T>) -> String {
        t.failure().into_value().unwrap().to_string()
    }

    #[test]
    fn test_capture() {
        assert_eq!(Try::capture(|| Ok(3)).into_result().unwrap(), 3);
        assert_eq!(message(Try::<i32>::capture(|| Err(anyhow!("bad")))), "bad");
        assert_eq!(message(Try::<i32>::capture(|| panic!("boom"))), "boom");
    }

    #[test]
    fn test_map_skips_failure() {
        assert_eq!(ok(2).map(|x| x + 1).value_or(0), 3);
        let failed: Try<i32> = error(anyhow!("bad"));
        assert_eq!(message(failed.map(|_| -> i32 { panic!("invoked") })), "bad");
    }

    #[test]
    fn test_map_flatten() {
        let checked = |x: i32| if x > 0 { ok(x) } else { error(anyhow!("negative")) };
        assert_eq!(ok(1).map_flatten(checked).value_or(0), 1);
        assert_eq!(message(ok(-1).map_flatten(checked)), "negative");
        assert_eq!(ok(ok(5)).flatten().value_or(0), 5);
    }

    #[test]
    fn test_filter() {
        let rejected = ok(3).filter(|x| *x > 5, |x| anyhow!("{} too small", x));
        assert_eq!(message(rejected), "3 too small");
        assert!(ok(9).filter(|x| *x > 5, |_| anyhow!("unused")).is_success());
    }

    #[test]
    fn test_fallbacks() {
        let failed: Try<i32> = error(anyhow!("bad"));
        assert_eq!(failed.or(ok(4)).value_or(0), 4);
        let recovered = error::<i32>(anyhow!("bad")).or_else(|e| ok(e.to_string().len() as i32));
        assert_eq!(recovered.value_or(0), 3);
        assert_eq!(error::<i32>(anyhow!("bad")).value_or_else(|_| 11), 11);
        assert_eq!(
            message(error::<i32>(anyhow!("bad")).map_error(|e| e.context("outer"))),
            "outer"
        );
    }

    #[test]
    fn test_conversions() {
        assert_eq!(ok(1).to_maybe(), Maybe::Value(1));
        assert_eq!(error::<i32>(anyhow!("bad")).to_maybe(), Maybe::None);
        let parsed: Try<i32> = "12".parse::<i32>().into();
        assert_eq!(parsed.value_or(0), 12);
        let parsed: Try<i32> = "x".parse::<i32>().into();
        assert!(parsed.is_failure());
    }

    #[test]
    fn test_do_effect() {
        let mut log = Vec::new();
        ok(1).do_effect(|v| log.push(format!("ok {}", v)), |_| unreachable!());
        error::<i32>(anyhow!("bad")).do_effect(|_| unreachable!(), |e| log.push(e.to_string()));
        assert_eq!(log, vec!["ok 1".to_string(), "bad".to_string()]);
    }
}
