// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Container adapters: per-kind policy for how a container shows its children.
//!
//! ## Overview
//!
//! The [`Hierarchy`] stores children in order; an adapter decides which of them are
//! visible and how to change that. Adapters are looked up by [`ContainerKind`] through a
//! [`ContainerAdapterLocator`], walking the kind's lineage most specific first, so a custom
//! kind derived from [`ContainerKind::STACK`] gets stack behavior unless it registers its own.
//!
//! Built-in adapters:
//! - [`StackAdapter`]: only the last child is visible; revealing a child pops everything above it.
//! - [`TabsAdapter`]: the selected child (or the first, when nothing is selected) is visible.
//! - [`SplitAdapter`]: the primary (first) child and the last detail child are visible.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::rc::Rc;
use alloc::vec::Vec;

use waypoint_hierarchy::{ContainerKind, Hierarchy, ScreenId};

use crate::types::{Completion, RoutingError, RoutingResult};
use crate::window::Window;

mod split;
mod stack;
mod tabs;

pub use split::SplitAdapter;
pub use stack::StackAdapter;
pub use tabs::TabsAdapter;

/// Policy object for one container kind.
///
/// Every method takes the container it acts on; adapters hold no per-container state.
pub trait ContainerAdapter {
    /// All children in display order.
    fn children(&self, hierarchy: &Hierarchy, container: ScreenId) -> Vec<ScreenId> {
        hierarchy.children(container).to_vec()
    }

    /// Children currently shown to the user.
    fn visible_children(&self, hierarchy: &Hierarchy, container: ScreenId) -> Vec<ScreenId>;

    /// Returns true if `child` is currently shown.
    fn is_visible(&self, hierarchy: &Hierarchy, container: ScreenId, child: ScreenId) -> bool {
        self.visible_children(hierarchy, container).contains(&child)
    }

    /// Make `child` visible. Fails with [`RoutingError::CompositionFailed`] if it is not a child.
    fn make_visible(
        &self,
        window: &Window,
        container: ScreenId,
        child: ScreenId,
        animated: bool,
        completion: Completion,
    );

    /// Screens that [`make_visible`](Self::make_visible) would remove to show `child`.
    fn removed_by_make_visible(
        &self,
        hierarchy: &Hierarchy,
        container: ScreenId,
        child: ScreenId,
    ) -> Vec<ScreenId> {
        let _ = (hierarchy, container, child);
        Vec::new()
    }

    /// Replace the children of `container`. Displaced screens are removed from the hierarchy.
    fn set_children(
        &self,
        window: &Window,
        container: ScreenId,
        children: Vec<ScreenId>,
        animated: bool,
        completion: Completion,
    ) {
        let result = commit_children(window, container, children);
        finish(window, animated, completion, result);
    }
}

/// Lookup from container kind to adapter.
pub trait ContainerAdapterLocator {
    /// Adapter for `kind`; [`RoutingError::CompositionFailed`] if none is registered for its lineage.
    fn get_adapter(&self, kind: ContainerKind) -> Result<Rc<dyn ContainerAdapter>, RoutingError>;
}

/// Adapter for the container `screen`, or `None` if it is not a container.
pub fn adapter_for(
    locator: &dyn ContainerAdapterLocator,
    hierarchy: &Hierarchy,
    screen: ScreenId,
) -> Result<Option<Rc<dyn ContainerAdapter>>, RoutingError> {
    hierarchy
        .container_kind(screen)
        .map(|kind| locator.get_adapter(kind))
        .transpose()
}

/// Registry of adapters keyed by kind name.
pub struct DefaultContainerAdapterLocator {
    adapters: BTreeMap<&'static str, Rc<dyn ContainerAdapter>>,
}

impl DefaultContainerAdapterLocator {
    /// Locator with the stack, tabs, and split adapters registered.
    pub fn new() -> Self {
        let mut locator = Self::empty();
        locator.register(ContainerKind::STACK, StackAdapter);
        locator.register(ContainerKind::TABS, TabsAdapter);
        locator.register(ContainerKind::SPLIT, SplitAdapter);
        locator
    }

    /// Locator with nothing registered.
    pub fn empty() -> Self {
        Self {
            adapters: BTreeMap::new(),
        }
    }

    /// Register `adapter` for `kind` and return the adapter it replaces.
    pub fn register(
        &mut self,
        kind: ContainerKind,
        adapter: impl ContainerAdapter + 'static,
    ) -> Option<Rc<dyn ContainerAdapter>> {
        self.adapters.insert(kind.name(), Rc::new(adapter))
    }
}

impl Default for DefaultContainerAdapterLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for DefaultContainerAdapterLocator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DefaultContainerAdapterLocator")
            .field("kinds", &self.adapters.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ContainerAdapterLocator for DefaultContainerAdapterLocator {
    fn get_adapter(&self, kind: ContainerKind) -> Result<Rc<dyn ContainerAdapter>, RoutingError> {
        kind.lineage()
            .find_map(|k| self.adapters.get(k.name()).cloned())
            .ok_or_else(|| {
                RoutingError::composition(format!(
                    "no container adapter registered for kind `{}`",
                    kind.name()
                ))
            })
    }
}

/// Install `children` and remove displaced screens.
pub(crate) fn commit_children(
    window: &Window,
    container: ScreenId,
    children: Vec<ScreenId>,
) -> RoutingResult {
    let mut h = window.hierarchy_mut();
    let displaced = h.set_children(container, children)?;
    for screen in displaced {
        log::debug!(target: "waypoint::adapters", "removing displaced {}", h.describe(screen));
        h.remove(screen);
    }
    Ok(())
}

/// Complete now, or on the main queue when the change is animated.
pub(crate) fn finish(window: &Window, animated: bool, completion: Completion, result: RoutingResult) {
    if animated && result.is_ok() {
        window.schedule(move || completion.complete(result));
    } else {
        completion.complete(result);
    }
}

/// Position of `child` in `children`, or the "not a child" composition failure.
pub(crate) fn position_of(
    hierarchy: &Hierarchy,
    children: &[ScreenId],
    container: ScreenId,
    child: ScreenId,
) -> Result<usize, RoutingError> {
    children.iter().position(|&c| c == child).ok_or_else(|| {
        RoutingError::composition(format!(
            "{} is not a child of {}",
            hierarchy.describe(child),
            hierarchy.describe(container)
        ))
    })
}
