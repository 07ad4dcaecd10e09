// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Factories: build screens that were not found.
//!
//! ## Overview
//!
//! A [`Factory`] inserts a new, detached screen into the hierarchy. A [`ContainerFactory`] does
//! the same for a container and may integrate children before the container is attached.
//!
//! ## Postponed integration
//!
//! When consecutive steps after a container step embed into that container's kind, the router
//! does not build and attach them one by one. It hands them to the container factory through a
//! [`ChildCoordinator`]; the factory calls [`ChildCoordinator::build`] to get the finished child
//! list and installs it in one structural change. [`ContainerAssembly`] adds fixed children that
//! every built container starts with.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::marker::PhantomData;

use waypoint_hierarchy::{CanBeDismissed, ContainerKind, Hierarchy, Screen, ScreenId};

use crate::actions::Action;
use crate::erased::{AnyContextTask, AnyFactory, FactoryBox};
use crate::types::{AnyContext, RoutingError, RoutingResult};

/// Builds a screen for a context.
pub trait Factory {
    /// Context type of the navigation.
    type Context: 'static;

    /// Synchronous check run before anything in the chain is built.
    fn prepare(&self, context: &Self::Context) -> RoutingResult {
        let _ = context;
        Ok(())
    }

    /// Insert a new detached screen.
    fn build(
        &self,
        hierarchy: &mut Hierarchy,
        context: &Self::Context,
    ) -> Result<ScreenId, RoutingError>;
}

/// Builds a container screen, integrating postponed children.
pub trait ContainerFactory {
    /// Context type of the navigation.
    type Context: 'static;

    /// Kind of the containers built.
    fn kind(&self) -> ContainerKind;

    /// Synchronous check run before anything in the chain is built.
    fn prepare(&self, context: &Self::Context) -> RoutingResult {
        let _ = context;
        Ok(())
    }

    /// Insert a new detached container whose children come from `coordinator`.
    ///
    /// On error, implementations remove every screen they inserted, including the children
    /// `coordinator` built.
    fn build(
        &self,
        hierarchy: &mut Hierarchy,
        context: &Self::Context,
        coordinator: &mut ChildCoordinator,
    ) -> Result<ScreenId, RoutingError>;
}

type Configure<M, C> = Box<dyn Fn(&mut M, &C)>;

/// Builds a screen holding a default `M`, optionally configured from the context.
pub struct ModelFactory<M, C> {
    configure: Option<Configure<M, C>>,
    label: Option<&'static str>,
    screen: fn(M) -> Screen,
}

impl<M: Default + 'static, C: 'static> ModelFactory<M, C> {
    /// Factory for `M::default()`.
    pub fn new() -> Self {
        Self {
            configure: None,
            label: None,
            screen: Screen::new::<M>,
        }
    }

    /// Configure each new model from the context.
    pub fn configured(mut self, configure: impl Fn(&mut M, &C) + 'static) -> Self {
        self.configure = Some(Box::new(configure));
        self
    }

    /// Label new screens for diagnostics.
    pub fn labeled(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }
}

impl<M: CanBeDismissed + Default, C: 'static> ModelFactory<M, C> {
    /// Build guarded screens, see [`Screen::guarded`].
    pub fn guarded(mut self) -> Self {
        self.screen = Screen::guarded::<M>;
        self
    }
}

impl<M: Default + 'static, C: 'static> Default for ModelFactory<M, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, C> core::fmt::Debug for ModelFactory<M, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ModelFactory")
            .field("model", &core::any::type_name::<M>())
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl<M: Default + 'static, C: 'static> Factory for ModelFactory<M, C> {
    type Context = C;

    fn build(&self, hierarchy: &mut Hierarchy, context: &C) -> Result<ScreenId, RoutingError> {
        let mut model = M::default();
        if let Some(configure) = &self.configure {
            configure(&mut model, context);
        }
        let mut screen = (self.screen)(model);
        if let Some(label) = self.label {
            screen = screen.with_label(label);
        }
        Ok(hierarchy.insert(screen))
    }
}

/// Factory backed by a closure.
pub struct InlineFactory<C, F> {
    build: F,
    _context: PhantomData<fn(&C)>,
}

impl<C, F> InlineFactory<C, F>
where
    F: Fn(&mut Hierarchy, &C) -> Result<ScreenId, RoutingError>,
{
    /// Wrap `build`.
    pub fn new(build: F) -> Self {
        Self {
            build,
            _context: PhantomData,
        }
    }
}

impl<C, F> core::fmt::Debug for InlineFactory<C, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InlineFactory").finish_non_exhaustive()
    }
}

impl<C: 'static, F> Factory for InlineFactory<C, F>
where
    F: Fn(&mut Hierarchy, &C) -> Result<ScreenId, RoutingError>,
{
    type Context = C;

    fn build(&self, hierarchy: &mut Hierarchy, context: &C) -> Result<ScreenId, RoutingError> {
        (self.build)(hierarchy, context)
    }
}

/// Builds a container of a fixed kind holding a default `M`.
pub struct ContainerModelFactory<M, C> {
    kind: ContainerKind,
    configure: Option<Configure<M, C>>,
    label: Option<&'static str>,
}

impl<M: Default + 'static, C: 'static> ContainerModelFactory<M, C> {
    /// Factory for containers of `kind`.
    pub fn new(kind: ContainerKind) -> Self {
        Self {
            kind,
            configure: None,
            label: None,
        }
    }

    /// A navigation stack.
    pub fn stack() -> Self {
        Self::new(ContainerKind::STACK)
    }

    /// A tab switcher.
    pub fn tabs() -> Self {
        Self::new(ContainerKind::TABS)
    }

    /// A split view.
    pub fn split() -> Self {
        Self::new(ContainerKind::SPLIT)
    }

    /// Configure each new model from the context.
    pub fn configured(mut self, configure: impl Fn(&mut M, &C) + 'static) -> Self {
        self.configure = Some(Box::new(configure));
        self
    }

    /// Label new containers for diagnostics.
    pub fn labeled(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }
}

impl<M, C> core::fmt::Debug for ContainerModelFactory<M, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ContainerModelFactory")
            .field("kind", &self.kind.name())
            .field("model", &core::any::type_name::<M>())
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl<M: Default + 'static, C: 'static> ContainerFactory for ContainerModelFactory<M, C> {
    type Context = C;

    fn kind(&self) -> ContainerKind {
        self.kind
    }

    fn build(
        &self,
        hierarchy: &mut Hierarchy,
        context: &C,
        coordinator: &mut ChildCoordinator,
    ) -> Result<ScreenId, RoutingError> {
        let mut model = M::default();
        if let Some(configure) = &self.configure {
            configure(&mut model, context);
        }
        let mut screen = Screen::container(self.kind, model);
        if let Some(label) = self.label {
            screen = screen.with_label(label);
        }
        let container = hierarchy.insert(screen);
        let children = match coordinator.build(hierarchy, Vec::new()) {
            Ok(children) => children,
            Err(err) => {
                hierarchy.remove(container);
                return Err(err);
            }
        };
        if !children.is_empty()
            && let Err(err) = hierarchy.set_children(container, children.clone())
        {
            for child in children {
                hierarchy.remove(child);
            }
            hierarchy.remove(container);
            return Err(err.into());
        }
        Ok(container)
    }
}

pub(crate) struct PendingChild {
    pub(crate) step: Option<usize>,
    pub(crate) factory: Rc<dyn AnyFactory>,
    pub(crate) action: Rc<dyn Action>,
    pub(crate) context_tasks: Vec<Rc<dyn AnyContextTask>>,
}

/// Children waiting to be integrated into a container under construction.
pub struct ChildCoordinator {
    context: AnyContext,
    pending: Vec<PendingChild>,
    built: Vec<(Option<usize>, ScreenId)>,
}

impl ChildCoordinator {
    pub(crate) fn new(context: AnyContext) -> Self {
        Self {
            context,
            pending: Vec::new(),
            built: Vec::new(),
        }
    }

    pub(crate) fn postpone(&mut self, child: PendingChild) {
        self.pending.push(child);
    }

    /// Number of children waiting.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if no child is waiting.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Build every waiting child, run its context tasks, and embed it into `existing`.
    ///
    /// Returns the resulting child list for the container to install.
    pub fn build(
        &mut self,
        hierarchy: &mut Hierarchy,
        existing: Vec<ScreenId>,
    ) -> Result<Vec<ScreenId>, RoutingError> {
        let first = self.built.len();
        let mut children = existing;
        for child in core::mem::take(&mut self.pending) {
            if let Err(err) = self.integrate(hierarchy, &child, &mut children) {
                for (_, screen) in self.built.drain(first..) {
                    hierarchy.remove(screen);
                }
                return Err(err);
            }
        }
        Ok(children)
    }

    fn integrate(
        &mut self,
        hierarchy: &mut Hierarchy,
        child: &PendingChild,
        children: &mut Vec<ScreenId>,
    ) -> RoutingResult {
        let mut nested = Self::new(self.context.clone());
        let screen = child.factory.build(hierarchy, &self.context, &mut nested)?;
        let integrated = child
            .context_tasks
            .iter()
            .try_for_each(|task| task.perform(hierarchy, screen, &self.context))
            .and_then(|()| child.action.embed(hierarchy, screen, children));
        if let Err(err) = integrated {
            hierarchy.remove(screen);
            return Err(err);
        }
        log::debug!(
            target: "waypoint::router",
            "integrated {} into a container under construction",
            hierarchy.describe(screen)
        );
        self.built.push((child.step, screen));
        Ok(())
    }

    /// Screens built by the last [`build`](Self::build), with the chain step they belong to.
    pub(crate) fn take_built(&mut self) -> Vec<(Option<usize>, ScreenId)> {
        core::mem::take(&mut self.built)
    }
}

impl core::fmt::Debug for ChildCoordinator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChildCoordinator")
            .field("context", &self.context)
            .field("pending", &self.pending.len())
            .field("built", &self.built.len())
            .finish()
    }
}

/// A container factory whose containers always start with fixed children.
pub struct ContainerAssembly<F: ContainerFactory> {
    factory: F,
    children: Vec<(Rc<dyn AnyFactory>, Rc<dyn Action>)>,
}

impl<F: ContainerFactory> ContainerAssembly<F> {
    /// Start from `factory`.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            children: Vec::new(),
        }
    }

    /// Add a fixed child built by `factory` and embedded with `action`.
    pub fn with<Ch>(mut self, factory: Ch, action: impl Action + 'static) -> Self
    where
        Ch: Factory<Context = F::Context> + 'static,
    {
        self.children
            .push((Rc::new(FactoryBox(factory)), Rc::new(action)));
        self
    }
}

impl<F: ContainerFactory> core::fmt::Debug for ContainerAssembly<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ContainerAssembly")
            .field("kind", &self.factory.kind().name())
            .field("children", &self.children.len())
            .finish_non_exhaustive()
    }
}

impl<F: ContainerFactory> ContainerFactory for ContainerAssembly<F> {
    type Context = F::Context;

    fn kind(&self) -> ContainerKind {
        self.factory.kind()
    }

    fn prepare(&self, context: &F::Context) -> RoutingResult {
        self.factory.prepare(context)
    }

    fn build(
        &self,
        hierarchy: &mut Hierarchy,
        context: &F::Context,
        coordinator: &mut ChildCoordinator,
    ) -> Result<ScreenId, RoutingError> {
        let postponed = core::mem::take(&mut coordinator.pending);
        coordinator.pending = self
            .children
            .iter()
            .map(|(factory, action)| PendingChild {
                step: None,
                factory: factory.clone(),
                action: action.clone(),
                context_tasks: Vec::new(),
            })
            .chain(postponed)
            .collect();
        self.factory.build(hierarchy, context, coordinator)
    }
}
