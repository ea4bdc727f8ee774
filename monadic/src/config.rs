/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Configuration for the async bridge.
//!
//! Settings are loaded from the environment (or a YAML file) into a
//! process-wide [`Config`]. Tests may temporarily override settings through
//! [`global::lock`].

use std::env;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::sync::LazyLock;
use std::sync::RwLock;

use serde::Deserialize;
use serde::Serialize;

/// Environment variable controlling [`Config::fast_path`].
pub const FAST_PATH_ENV: &str = "MONADIC_FAST_PATH";

/// Bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Apply combinators inline when the source has already resolved. When
    /// disabled, every bridge call goes through the cancellable wait, which
    /// makes scheduling-dependent behavior reproducible.
    pub fast_path: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { fast_path: true }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables. Unparseable values
    /// keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = env::var(FAST_PATH_ENV) {
            match parse_bool(&val) {
                Some(parsed) => config.fast_path = parsed,
                None => tracing::warn!(
                    name = FAST_PATH_ENV,
                    value = %val,
                    "ignoring unparseable configuration value"
                ),
            }
        }

        config
    }

    /// Load configuration from a YAML file
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Save configuration to a YAML file
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), anyhow::Error> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Global configuration functions
///
/// Tests can override global configuration using [`global::lock`]. This
/// ensures that such tests are serialized (and cannot clobber each other's
/// overrides).
///
/// ```
/// let config = monadic::config::global::lock();
/// let _guard = config.override_fast_path(false);
/// assert!(!monadic::config::global::fast_path());
/// ```
pub mod global {
    use super::*;

    /// Global configuration instance, initialized from environment variables.
    static CONFIG: LazyLock<Arc<RwLock<Config>>> =
        LazyLock::new(|| Arc::new(RwLock::new(Config::from_env())));

    /// Acquire the global configuration lock for testing.
    ///
    /// The returned [`ConfigLock`] is the only way to create overrides, and
    /// holding it keeps other tests from modifying global config
    /// concurrently.
    pub fn lock() -> ConfigLock {
        static MUTEX: LazyLock<std::sync::Mutex<()>> = LazyLock::new(|| std::sync::Mutex::new(()));
        ConfigLock {
            // A test that panicked while holding the lock has already
            // restored its overrides through the guards' destructors.
            _guard: MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner()),
        }
    }

    /// Initialize the global configuration from environment variables
    pub fn init_from_env() {
        let config = Config::from_env();
        *CONFIG.write().unwrap() = config;
    }

    /// Initialize the global configuration from a YAML file
    pub fn init_from_yaml<P: AsRef<Path>>(path: P) -> Result<(), anyhow::Error> {
        let config = Config::from_yaml(path)?;
        *CONFIG.write().unwrap() = config;
        Ok(())
    }

    /// Get a reference to the global configuration
    pub fn get() -> Arc<RwLock<Config>> {
        CONFIG.clone()
    }

    /// Whether bridge calls may take the resolved fast path.
    pub fn fast_path() -> bool {
        CONFIG.read().unwrap().fast_path
    }

    /// Reset the global configuration to defaults. Call with the
    /// [`lock`] held.
    pub fn reset_to_defaults() {
        *CONFIG.write().unwrap() = Config::default();
    }

    /// A guard that holds the global configuration lock and provides
    /// override functionality.
    pub struct ConfigLock {
        _guard: std::sync::MutexGuard<'static, ()>,
    }

    impl ConfigLock {
        /// Override [`Config::fast_path`] until the returned guard is
        /// dropped. The guard must not outlive this lock.
        pub fn override_fast_path(&self, value: bool) -> ConfigOverride<'_> {
            let mut config = CONFIG.write().unwrap();
            let previous = std::mem::replace(&mut config.fast_path, value);
            ConfigOverride {
                previous,
                _lock: self,
            }
        }
    }

    /// Restores the overridden setting when dropped.
    pub struct ConfigOverride<'a> {
        previous: bool,
        _lock: &'a ConfigLock,
    }

    impl Drop for ConfigOverride<'_> {
        fn drop(&mut self) {
            CONFIG.write().unwrap().fast_path = self.previous;
        }
    }
}
