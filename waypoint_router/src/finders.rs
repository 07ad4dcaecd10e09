// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Finders: locate an existing screen that satisfies a step.
//!
//! ## Overview
//!
//! A [`Finder`] answers "is the screen this step stands for already on the window?".
//! Most finders are [`StackIteratingFinder`]s: they walk the window with a
//! [`StackIterator`] and test each screen whose model has the expected type.
//!
//! Provided finders:
//! - [`ModelFinder`]: any screen whose model is an `M`.
//! - [`ContextFinder`]: a screen whose model is an `M` that accepts the context, see [`ContextChecking`].
//! - [`InlineFinder`]: a closure.
//! - [`DetailsFinder`]: the detail stack of a split view.
//! - [`NilFinder`]: never finds anything; the step always builds.

use alloc::rc::Rc;
use core::marker::PhantomData;

use waypoint_hierarchy::{ContainerKind, Hierarchy, ScreenId};

use crate::config::Defaults;
use crate::iterator::{DefaultStackIterator, SearchOptions, StackIterator, StartingPoint};
use crate::types::RoutingError;

/// Locates an existing screen for a context.
pub trait Finder {
    /// Context type of the navigation.
    type Context: 'static;

    /// The matching screen, if any.
    fn find(
        &self,
        hierarchy: &Hierarchy,
        context: &Self::Context,
    ) -> Result<Option<ScreenId>, RoutingError>;
}

/// A finder that tests screens one by one in stack-iterator order.
///
/// Only screens whose model is a [`Self::Model`] are offered to [`is_target`](Self::is_target).
pub trait StackIteratingFinder {
    /// Model type of the screens this finder looks for.
    type Model: 'static;
    /// Context type of the navigation.
    type Context: 'static;

    /// Traversal used for the search.
    fn iterator(&self) -> &dyn StackIterator;

    /// Returns true if `model` is the screen being looked for.
    fn is_target(&self, model: &Self::Model, context: &Self::Context) -> bool;
}

impl<T: StackIteratingFinder> Finder for T {
    type Context = T::Context;

    fn find(
        &self,
        hierarchy: &Hierarchy,
        context: &Self::Context,
    ) -> Result<Option<ScreenId>, RoutingError> {
        self.iterator().first_screen(hierarchy, &mut |id| {
            hierarchy
                .model::<T::Model>(id)
                .is_some_and(|model| self.is_target(model, context))
        })
    }
}

/// Finds the first screen whose model is an `M`.
pub struct ModelFinder<M, C> {
    iterator: Rc<dyn StackIterator>,
    _types: PhantomData<fn(&M, &C)>,
}

impl<M, C> ModelFinder<M, C> {
    /// Search with the configured default iterator.
    pub fn new(defaults: &Defaults) -> Self {
        Self::with_iterator(defaults.stack_iterator().clone())
    }

    /// Search with `options` from `starting_point`.
    pub fn with_options(
        defaults: &Defaults,
        options: SearchOptions,
        starting_point: StartingPoint,
    ) -> Self {
        Self::with_iterator(Rc::new(DefaultStackIterator::new(
            options,
            starting_point,
            defaults.locator().clone(),
        )))
    }

    /// Search with a custom iterator.
    pub fn with_iterator(iterator: Rc<dyn StackIterator>) -> Self {
        Self {
            iterator,
            _types: PhantomData,
        }
    }
}

impl<M, C> core::fmt::Debug for ModelFinder<M, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ModelFinder")
            .field("model", &core::any::type_name::<M>())
            .finish_non_exhaustive()
    }
}

impl<M: 'static, C: 'static> StackIteratingFinder for ModelFinder<M, C> {
    type Model = M;
    type Context = C;

    fn iterator(&self) -> &dyn StackIterator {
        &*self.iterator
    }

    fn is_target(&self, _model: &M, _context: &C) -> bool {
        true
    }
}

/// A screen model that can tell whether it already shows a context.
pub trait ContextChecking {
    /// Context type of the navigation.
    type Context: 'static;

    /// Returns true if this screen already represents `context`.
    fn is_target(&self, context: &Self::Context) -> bool;
}

/// Finds the first `M` whose [`ContextChecking::is_target`] accepts the context.
pub struct ContextFinder<M> {
    iterator: Rc<dyn StackIterator>,
    _model: PhantomData<fn(&M)>,
}

impl<M> ContextFinder<M> {
    /// Search with the configured default iterator.
    pub fn new(defaults: &Defaults) -> Self {
        Self::with_iterator(defaults.stack_iterator().clone())
    }

    /// Search with a custom iterator.
    pub fn with_iterator(iterator: Rc<dyn StackIterator>) -> Self {
        Self {
            iterator,
            _model: PhantomData,
        }
    }
}

impl<M> core::fmt::Debug for ContextFinder<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ContextFinder")
            .field("model", &core::any::type_name::<M>())
            .finish_non_exhaustive()
    }
}

impl<M: ContextChecking + 'static> StackIteratingFinder for ContextFinder<M> {
    type Model = M;
    type Context = M::Context;

    fn iterator(&self) -> &dyn StackIterator {
        &*self.iterator
    }

    fn is_target(&self, model: &M, context: &M::Context) -> bool {
        model.is_target(context)
    }
}

/// Finder backed by a closure.
pub struct InlineFinder<C, F> {
    find: F,
    _context: PhantomData<fn(&C)>,
}

impl<C, F> InlineFinder<C, F>
where
    F: Fn(&Hierarchy, &C) -> Option<ScreenId>,
{
    /// Wrap `find`.
    pub fn new(find: F) -> Self {
        Self {
            find,
            _context: PhantomData,
        }
    }
}

impl<C, F> core::fmt::Debug for InlineFinder<C, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InlineFinder").finish_non_exhaustive()
    }
}

impl<C: 'static, F> Finder for InlineFinder<C, F>
where
    F: Fn(&Hierarchy, &C) -> Option<ScreenId>,
{
    type Context = C;

    fn find(&self, hierarchy: &Hierarchy, context: &C) -> Result<Option<ScreenId>, RoutingError> {
        Ok((self.find)(hierarchy, context).filter(|&id| hierarchy.is_alive(id)))
    }
}

/// Finds the detail stack of a split view.
///
/// The detail stack is the last child of the first split container found, when that child is
/// a stack. A collapsed split with a single stack holding another stack yields the inner one.
pub struct DetailsFinder<C> {
    iterator: Rc<dyn StackIterator>,
    _context: PhantomData<fn(&C)>,
}

impl<C> DetailsFinder<C> {
    /// Search with the configured default iterator.
    pub fn new(defaults: &Defaults) -> Self {
        Self {
            iterator: defaults.stack_iterator().clone(),
            _context: PhantomData,
        }
    }
}

impl<C> core::fmt::Debug for DetailsFinder<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DetailsFinder").finish_non_exhaustive()
    }
}

impl<C: 'static> Finder for DetailsFinder<C> {
    type Context = C;

    fn find(&self, hierarchy: &Hierarchy, _context: &C) -> Result<Option<ScreenId>, RoutingError> {
        let is_kind = |id: ScreenId, kind: ContainerKind| {
            hierarchy
                .container_kind(id)
                .is_some_and(|k| k.is_kind_of(kind))
        };
        let Some(split) = self
            .iterator
            .first_screen(hierarchy, &mut |id| is_kind(id, ContainerKind::SPLIT))?
        else {
            return Ok(None);
        };
        let details = match hierarchy.children(split) {
            [] => None,
            [only] => hierarchy.children(*only).last().copied(),
            [.., last] => Some(*last),
        };
        Ok(details.filter(|&id| is_kind(id, ContainerKind::STACK)))
    }
}

/// Finder that never finds a screen.
pub struct NilFinder<C>(PhantomData<fn(&C)>);

impl<C> NilFinder<C> {
    /// A finder for steps that always build.
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<C> Default for NilFinder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> core::fmt::Debug for NilFinder<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("NilFinder")
    }
}

impl<C: 'static> Finder for NilFinder<C> {
    type Context = C;

    fn find(&self, _: &Hierarchy, _: &C) -> Result<Option<ScreenId>, RoutingError> {
        Ok(None)
    }
}
