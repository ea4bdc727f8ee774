/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Error types shared by the containers and the async bridge.

use std::any::Any;
use std::fmt;

/// The governing [`CancellationToken`](tokio_util::sync::CancellationToken)
/// fired before the awaited computation resolved.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[error("operation was cancelled")]
pub struct Cancelled;

/// One of the two branches of an [`Either`](crate::Either).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The left branch.
    Left,
    /// The right branch.
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Payload access on the branch that does not hold it.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// A [`Maybe`](crate::Maybe) was `None`.
    #[error("no value present")]
    Absent,

    /// An [`Either`](crate::Either) held the given branch instead of the
    /// requested one.
    #[error("either holds the {0} branch")]
    WrongBranch(Side),
}

/// A panic captured by one of the Try-materializing operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct Panicked {
    message: String,
}

impl Panicked {
    /// Build from the payload returned by `catch_unwind`. String payloads
    /// (the ones produced by `panic!`) keep their message.
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(message) => (*message).to_string(),
                Err(_) => "panic with a non-string payload".to_string(),
            },
        };
        Self { message }
    }

    /// The panic message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panicked_keeps_message() {
        let payload = std::panic::catch_unwind(|| panic!("boom")).unwrap_err();
        let panicked = Panicked::from_payload(payload);
        assert_eq!(panicked.message(), "boom");
        assert_eq!(panicked.to_string(), "boom");

        let payload = std::panic::catch_unwind(|| panic!("code {}", 7)).unwrap_err();
        assert_eq!(Panicked::from_payload(payload).message(), "code 7");
    }

    #[test]
    fn test_panicked_opaque_payload() {
        let payload = std::panic::catch_unwind(|| std::panic::panic_any(42u32)).unwrap_err();
        assert_eq!(
            Panicked::from_payload(payload).message(),
            "panic with a non-string payload"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Cancelled.to_string(), "operation was cancelled");
        assert_eq!(AccessError::Absent.to_string(), "no value present");
        assert_eq!(
            AccessError::WrongBranch(Side::Left).to_string(),
            "either holds the left branch"
        );
    }
}
