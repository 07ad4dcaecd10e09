// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Router defaults and their one-shot configuration.
//!
//! [`Defaults`] bundles the collaborators every finder, action, and router needs: the window
//! provider, the container adapter locator, and the default stack iterator. Build them with
//! [`Defaults::builder`]; anything not overridden uses the built-ins.
//!
//! [`Configuration`] holds defaults that must be installed exactly once before use, for hosts
//! that keep a single process-wide setup.

use alloc::rc::Rc;
use core::cell::OnceCell;

use crate::adapters::{ContainerAdapterLocator, DefaultContainerAdapterLocator};
use crate::iterator::{DefaultStackIterator, SearchOptions, StackIterator, StartingPoint};
use crate::types::ConfigurationError;
use crate::window::WindowProvider;

/// Shared collaborators for routers, finders, and actions.
#[derive(Clone)]
pub struct Defaults {
    window_provider: Rc<dyn WindowProvider>,
    locator: Rc<dyn ContainerAdapterLocator>,
    stack_iterator: Rc<dyn StackIterator>,
}

impl Defaults {
    /// Built-in defaults over `window_provider`.
    pub fn new(window_provider: impl WindowProvider + 'static) -> Self {
        Self::builder(window_provider).build()
    }

    /// Start overriding defaults.
    pub fn builder(window_provider: impl WindowProvider + 'static) -> DefaultsBuilder {
        DefaultsBuilder {
            window_provider: Rc::new(window_provider),
            locator: None,
            stack_iterator: None,
        }
    }

    /// Source of the window to navigate in.
    pub fn window_provider(&self) -> &Rc<dyn WindowProvider> {
        &self.window_provider
    }

    /// Container adapter lookup.
    pub fn locator(&self) -> &Rc<dyn ContainerAdapterLocator> {
        &self.locator
    }

    /// Traversal used by finders that are not given one.
    pub fn stack_iterator(&self) -> &Rc<dyn StackIterator> {
        &self.stack_iterator
    }
}

impl core::fmt::Debug for Defaults {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Defaults").finish_non_exhaustive()
    }
}

/// Builder for [`Defaults`].
pub struct DefaultsBuilder {
    window_provider: Rc<dyn WindowProvider>,
    locator: Option<Rc<dyn ContainerAdapterLocator>>,
    stack_iterator: Option<Rc<dyn StackIterator>>,
}

impl DefaultsBuilder {
    /// Replace the container adapter locator.
    pub fn locator(mut self, locator: impl ContainerAdapterLocator + 'static) -> Self {
        self.locator = Some(Rc::new(locator));
        self
    }

    /// Replace the default stack iterator.
    pub fn stack_iterator(mut self, iterator: impl StackIterator + 'static) -> Self {
        self.stack_iterator = Some(Rc::new(iterator));
        self
    }

    /// Finish. The default iterator searches [`SearchOptions::CURRENT_AND_DOWN`] from the
    /// topmost context, using the configured locator.
    pub fn build(self) -> Defaults {
        let locator = self
            .locator
            .unwrap_or_else(|| Rc::new(DefaultContainerAdapterLocator::new()));
        let stack_iterator = self.stack_iterator.unwrap_or_else(|| {
            Rc::new(DefaultStackIterator::new(
                SearchOptions::CURRENT_AND_DOWN,
                StartingPoint::Topmost,
                locator.clone(),
            ))
        });
        Defaults {
            window_provider: self.window_provider,
            locator,
            stack_iterator,
        }
    }
}

impl core::fmt::Debug for DefaultsBuilder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DefaultsBuilder")
            .field("custom_locator", &self.locator.is_some())
            .field("custom_stack_iterator", &self.stack_iterator.is_some())
            .finish_non_exhaustive()
    }
}

/// Defaults installed exactly once.
///
/// ```
/// use waypoint_router::config::{Configuration, Defaults};
/// use waypoint_router::types::ConfigurationError;
/// use waypoint_router::window::Window;
///
/// let config = Configuration::new();
/// assert_eq!(config.defaults().err(), Some(ConfigurationError::NotConfigured));
///
/// config.configure(Defaults::new(Window::new())).unwrap();
/// assert!(config.defaults().is_ok());
///
/// let again = config.configure(Defaults::new(Window::new()));
/// assert_eq!(again.err(), Some(ConfigurationError::AlreadyConfigured));
/// ```
#[derive(Debug, Default)]
pub struct Configuration {
    defaults: OnceCell<Rc<Defaults>>,
}

impl Configuration {
    /// An unconfigured slot.
    pub const fn new() -> Self {
        Self {
            defaults: OnceCell::new(),
        }
    }

    /// Install `defaults`. Fails if defaults were already installed.
    pub fn configure(&self, defaults: Defaults) -> Result<Rc<Defaults>, ConfigurationError> {
        let defaults = Rc::new(defaults);
        if self.defaults.set(defaults.clone()).is_err() {
            log::warn!(target: "waypoint::config", "defaults configured twice; keeping the first");
            return Err(ConfigurationError::AlreadyConfigured);
        }
        log::info!(target: "waypoint::config", "defaults configured");
        Ok(defaults)
    }

    /// Installed defaults.
    pub fn defaults(&self) -> Result<Rc<Defaults>, ConfigurationError> {
        self.defaults
            .get()
            .cloned()
            .ok_or(ConfigurationError::NotConfigured)
    }

    /// Returns true once [`configure`](Self::configure) succeeded.
    pub fn is_configured(&self) -> bool {
        self.defaults.get().is_some()
    }
}
