// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stack iteration: the order in which finders look at screens.
//!
//! ## Traversal order
//!
//! [`DefaultStackIterator`] starts at a [`StartingPoint`] (the topmost presentation context by
//! default) and visits, in order:
//!
//! 1. the starting screen and its container descendants, if [`SearchOptions::CURRENT`] is set;
//! 2. every active presentation above it, nearest first, if [`SearchOptions::PRESENTED`] is set;
//! 3. every presentation context below it, nearest first, if [`SearchOptions::PRESENTING`] is set;
//! 4. its container ancestors, nearest first, if [`SearchOptions::PARENT`] is set.
//!
//! Each region is walked depth-first in pre-order. Container children are taken in the
//! adapter's display order: all of them with [`SearchOptions::CONTAINED`], only the visible
//! ones with [`SearchOptions::VISIBLE`], none with neither. A screen is tested at most once.

use alloc::collections::BTreeSet;
use alloc::rc::Rc;
use alloc::vec::Vec;

use waypoint_hierarchy::{Hierarchy, ScreenId};

use crate::adapters::{ContainerAdapterLocator, adapter_for};
use crate::types::RoutingError;

bitflags::bitflags! {
    /// Which regions of the window a search covers.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct SearchOptions: u8 {
        /// The starting screen's own context.
        const CURRENT = 1 << 0;
        /// Descend into the visible children of containers.
        const VISIBLE = 1 << 1;
        /// Descend into all children of containers.
        const CONTAINED = 1 << 2;
        /// Presentation contexts below the starting point.
        const PRESENTING = 1 << 3;
        /// Presentations above the starting point.
        const PRESENTED = 1 << 4;
        /// Container ancestors of the starting point.
        const PARENT = 1 << 5;

        /// What the user sees in the current context.
        const CURRENT_VISIBLE_ONLY = Self::CURRENT.bits() | Self::VISIBLE.bits();
        /// Everything in the current context.
        const CURRENT_ALL_STACK = Self::CURRENT.bits() | Self::CONTAINED.bits();
        /// What the user sees, in every context down to the root.
        const ALL_VISIBLE = Self::CURRENT_VISIBLE_ONLY.bits() | Self::PRESENTING.bits();
        /// The current context and every context below it.
        const CURRENT_AND_UP = Self::CURRENT_ALL_STACK.bits() | Self::PRESENTING.bits();
        /// The current context and every presentation above it.
        const CURRENT_AND_DOWN = Self::CURRENT_ALL_STACK.bits() | Self::PRESENTED.bits();
        /// Every context of the window.
        const FULL_STACK = Self::CURRENT_ALL_STACK.bits()
            | Self::PRESENTING.bits()
            | Self::PRESENTED.bits();
    }
}

/// Where a search starts.
#[derive(Clone, Copy, Debug, Default)]
pub enum StartingPoint {
    /// The topmost presentation context, see [`Hierarchy::topmost`].
    #[default]
    Topmost,
    /// The window root.
    Root,
    /// A caller-provided resolver.
    Custom(fn(&Hierarchy) -> Option<ScreenId>),
}

impl StartingPoint {
    /// Resolve against `hierarchy`.
    pub fn resolve(&self, hierarchy: &Hierarchy) -> Option<ScreenId> {
        match self {
            Self::Topmost => hierarchy.topmost(),
            Self::Root => hierarchy.root(),
            Self::Custom(f) => f(hierarchy).filter(|&id| hierarchy.is_alive(id)),
        }
    }
}

/// Search over the screens of a window.
pub trait StackIterator {
    /// First screen, in traversal order, for which `predicate` holds.
    ///
    /// Fails only if a container on the way has no adapter.
    fn first_screen(
        &self,
        hierarchy: &Hierarchy,
        predicate: &mut dyn FnMut(ScreenId) -> bool,
    ) -> Result<Option<ScreenId>, RoutingError>;
}

/// Search driven by [`SearchOptions`] and a [`StartingPoint`].
#[derive(Clone)]
pub struct DefaultStackIterator {
    options: SearchOptions,
    starting_point: StartingPoint,
    locator: Rc<dyn ContainerAdapterLocator>,
}

impl DefaultStackIterator {
    /// Iterator over `options` from `starting_point`, using `locator` to order container children.
    pub fn new(
        options: SearchOptions,
        starting_point: StartingPoint,
        locator: Rc<dyn ContainerAdapterLocator>,
    ) -> Self {
        Self {
            options,
            starting_point,
            locator,
        }
    }

    /// Search options in effect.
    pub fn options(&self) -> SearchOptions {
        self.options
    }

    /// Starting point in effect.
    pub fn starting_point(&self) -> StartingPoint {
        self.starting_point
    }
}

impl core::fmt::Debug for DefaultStackIterator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DefaultStackIterator")
            .field("options", &self.options)
            .field("starting_point", &self.starting_point)
            .finish_non_exhaustive()
    }
}

impl StackIterator for DefaultStackIterator {
    fn first_screen(
        &self,
        hierarchy: &Hierarchy,
        predicate: &mut dyn FnMut(ScreenId) -> bool,
    ) -> Result<Option<ScreenId>, RoutingError> {
        let Some(start) = self.starting_point.resolve(hierarchy) else {
            return Ok(None);
        };
        let mut search = Search {
            hierarchy,
            locator: &*self.locator,
            options: self.options,
            visited: BTreeSet::new(),
            predicate,
        };

        if self.options.contains(SearchOptions::CURRENT)
            && let Some(found) = search.region(start)?
        {
            return Ok(Some(found));
        }

        if self.options.contains(SearchOptions::PRESENTED) {
            let mut context = start;
            while let Some(presented) = hierarchy.active_presentation(context) {
                if let Some(found) = search.region(presented)? {
                    return Ok(Some(found));
                }
                context = presented;
            }
        }

        if self.options.contains(SearchOptions::PRESENTING) {
            let mut context = hierarchy.presentation_root(start);
            while let Some(presenter) = context.and_then(|c| hierarchy.presenting(c)) {
                context = hierarchy.presentation_root(presenter);
                if let Some(root) = context
                    && let Some(found) = search.region(root)?
                {
                    return Ok(Some(found));
                }
            }
        }

        if self.options.contains(SearchOptions::PARENT) {
            for parent in hierarchy.ancestors(start) {
                if let Some(found) = search.region(parent)? {
                    return Ok(Some(found));
                }
            }
        }

        Ok(None)
    }
}

struct Search<'a, 'p> {
    hierarchy: &'a Hierarchy,
    locator: &'a dyn ContainerAdapterLocator,
    options: SearchOptions,
    visited: BTreeSet<ScreenId>,
    predicate: &'p mut dyn FnMut(ScreenId) -> bool,
}

impl Search<'_, '_> {
    /// Pre-order walk of `top` and the children the options allow.
    fn region(&mut self, top: ScreenId) -> Result<Option<ScreenId>, RoutingError> {
        let mut stack = alloc::vec![top];
        while let Some(id) = stack.pop() {
            if !self.visited.insert(id) {
                continue;
            }
            if (self.predicate)(id) {
                return Ok(Some(id));
            }
            let mut children = self.children(id)?;
            children.reverse();
            stack.extend(children);
        }
        Ok(None)
    }

    fn children(&self, id: ScreenId) -> Result<Vec<ScreenId>, RoutingError> {
        let descend = self.options.contains(SearchOptions::CONTAINED)
            || self.options.contains(SearchOptions::VISIBLE);
        if !descend {
            return Ok(Vec::new());
        }
        let Some(adapter) = adapter_for(self.locator, self.hierarchy, id)? else {
            return Ok(Vec::new());
        };
        Ok(if self.options.contains(SearchOptions::CONTAINED) {
            adapter.children(self.hierarchy, id)
        } else {
            adapter.visible_children(self.hierarchy, id)
        })
    }
}
