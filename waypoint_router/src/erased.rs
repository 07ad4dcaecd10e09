// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Context-erased views of typed step components.
//!
//! Steps are stored without their context type so that one chain can hold them uniformly.
//! Each wrapper downcasts the shared [`AnyContext`] back to the type it was composed with and
//! reports [`RoutingError::TypeMismatch`] otherwise.

use alloc::rc::Rc;

use waypoint_hierarchy::{ContainerKind, Hierarchy, ScreenId};

use crate::factories::{ChildCoordinator, ContainerFactory, Factory};
use crate::finders::Finder;
use crate::tasks::{ContextTask, PostTask, RoutingInterceptor};
use crate::types::{AnyContext, Completion, RoutingError, RoutingResult};
use crate::window::Window;

pub(crate) trait AnyFinder {
    fn find(
        &self,
        hierarchy: &Hierarchy,
        context: &AnyContext,
    ) -> Result<Option<ScreenId>, RoutingError>;

    fn name(&self) -> &'static str;
}

pub(crate) struct FinderBox<F>(pub(crate) F);

impl<F: Finder> AnyFinder for FinderBox<F> {
    fn find(
        &self,
        hierarchy: &Hierarchy,
        context: &AnyContext,
    ) -> Result<Option<ScreenId>, RoutingError> {
        self.0.find(hierarchy, context.downcast::<F::Context>()?)
    }

    fn name(&self) -> &'static str {
        core::any::type_name::<F>()
    }
}

pub(crate) trait AnyFactory {
    fn prepare(&self, context: &AnyContext) -> RoutingResult;

    fn build(
        &self,
        hierarchy: &mut Hierarchy,
        context: &AnyContext,
        coordinator: &mut ChildCoordinator,
    ) -> Result<ScreenId, RoutingError>;

    /// Kind of the built container, for factories that build containers.
    fn container_kind(&self) -> Option<ContainerKind>;

    fn name(&self) -> &'static str;
}

pub(crate) struct FactoryBox<F>(pub(crate) F);

impl<F: Factory> AnyFactory for FactoryBox<F> {
    fn prepare(&self, context: &AnyContext) -> RoutingResult {
        self.0.prepare(context.downcast::<F::Context>()?)
    }

    fn build(
        &self,
        hierarchy: &mut Hierarchy,
        context: &AnyContext,
        _coordinator: &mut ChildCoordinator,
    ) -> Result<ScreenId, RoutingError> {
        self.0.build(hierarchy, context.downcast::<F::Context>()?)
    }

    fn container_kind(&self) -> Option<ContainerKind> {
        None
    }

    fn name(&self) -> &'static str {
        core::any::type_name::<F>()
    }
}

pub(crate) struct ContainerFactoryBox<F>(pub(crate) F);

impl<F: ContainerFactory> AnyFactory for ContainerFactoryBox<F> {
    fn prepare(&self, context: &AnyContext) -> RoutingResult {
        self.0.prepare(context.downcast::<F::Context>()?)
    }

    fn build(
        &self,
        hierarchy: &mut Hierarchy,
        context: &AnyContext,
        coordinator: &mut ChildCoordinator,
    ) -> Result<ScreenId, RoutingError> {
        self.0
            .build(hierarchy, context.downcast::<F::Context>()?, coordinator)
    }

    fn container_kind(&self) -> Option<ContainerKind> {
        Some(self.0.kind())
    }

    fn name(&self) -> &'static str {
        core::any::type_name::<F>()
    }
}

pub(crate) trait AnyInterceptor {
    fn prepare(&self, context: &AnyContext) -> RoutingResult;

    fn perform(&self, context: &AnyContext, completion: Completion);
}

pub(crate) struct InterceptorBox<I>(pub(crate) I);

impl<I: RoutingInterceptor> AnyInterceptor for InterceptorBox<I> {
    fn prepare(&self, context: &AnyContext) -> RoutingResult {
        self.0.prepare(context.downcast::<I::Context>()?)
    }

    fn perform(&self, context: &AnyContext, completion: Completion) {
        match context.downcast::<I::Context>() {
            Ok(context) => self.0.perform(context, completion),
            Err(err) => completion.fail(err),
        }
    }
}

pub(crate) trait AnyContextTask {
    fn prepare(&self, context: &AnyContext) -> RoutingResult;

    fn perform(
        &self,
        hierarchy: &mut Hierarchy,
        screen: ScreenId,
        context: &AnyContext,
    ) -> RoutingResult;
}

pub(crate) struct ContextTaskBox<T>(pub(crate) T);

impl<T: ContextTask> AnyContextTask for ContextTaskBox<T> {
    fn prepare(&self, context: &AnyContext) -> RoutingResult {
        self.0.prepare(context.downcast::<T::Context>()?)
    }

    fn perform(
        &self,
        hierarchy: &mut Hierarchy,
        screen: ScreenId,
        context: &AnyContext,
    ) -> RoutingResult {
        let context = context.downcast::<T::Context>()?;
        let found = hierarchy.model_type_name(screen).unwrap_or("<stale screen>");
        let Some(model) = hierarchy.model_mut::<T::Model>(screen) else {
            return Err(RoutingError::TypeMismatch {
                expected: core::any::type_name::<T::Model>(),
                found,
            });
        };
        self.0.perform(model, context)
    }
}

pub(crate) trait AnyPostTask {
    fn perform(
        &self,
        window: &Window,
        screen: ScreenId,
        context: &AnyContext,
        navigation: &[ScreenId],
    ) -> RoutingResult;
}

pub(crate) struct PostTaskBox<T>(pub(crate) T);

impl<T: PostTask> AnyPostTask for PostTaskBox<T> {
    fn perform(
        &self,
        window: &Window,
        screen: ScreenId,
        context: &AnyContext,
        navigation: &[ScreenId],
    ) -> RoutingResult {
        self.0
            .perform(window, screen, context.downcast::<T::Context>()?, navigation)
    }
}

/// Shorthand used by the step builders.
pub(crate) fn erase_finder<F: Finder + 'static>(finder: F) -> Rc<dyn AnyFinder> {
    Rc::new(FinderBox(finder))
}
