// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Routing steps and the builders that chain them.
//!
//! ## Overview
//!
//! A destination is described leaf first: every step points back to the step it starts from,
//! down to an anchor ([`GeneralStep::root`], [`GeneralStep::current`], or
//! [`GeneralStep::custom`]). Steps are immutable and shared, so one step can be the origin of
//! many destinations and a chain can never loop.
//!
//! - [`StepAssembly`]: a step with a finder, optional factory and action, and its tasks.
//! - [`SwitchAssembly`]: picks which chain to continue with at navigation time.
//! - [`DestinationStep`]: typed handle to the last step of a chain.
//! - [`Destination`]: a destination step together with its context.
//!
//! ```
//! use waypoint_router::actions::Embed;
//! use waypoint_router::config::Defaults;
//! use waypoint_router::factories::ModelFactory;
//! use waypoint_router::finders::ModelFinder;
//! use waypoint_router::step::{GeneralStep, StepAssembly};
//! use waypoint_router::window::Window;
//!
//! #[derive(Default)]
//! struct Profile { user: u32 }
//!
//! let defaults = Defaults::new(Window::new());
//! let profile = StepAssembly::new(
//!     ModelFinder::<Profile, u32>::new(&defaults),
//!     ModelFactory::<Profile, u32>::new().configured(|p, user| p.user = *user),
//! )
//! .using(Embed::push(&defaults))
//! .from(&GeneralStep::root())
//! .assemble();
//!
//! let destination = profile.destination(42);
//! assert_eq!(*destination.context(), 42);
//! ```

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::marker::PhantomData;

use waypoint_hierarchy::Hierarchy;

use crate::actions::Action;
use crate::erased::{
    AnyContextTask, AnyFactory, AnyFinder, AnyInterceptor, AnyPostTask, ContainerFactoryBox,
    ContextTaskBox, FactoryBox, InterceptorBox, PostTaskBox, erase_finder,
};
use crate::factories::{ContainerFactory, Factory};
use crate::finders::Finder;
use crate::tasks::{ContextTask, PostTask, RoutingInterceptor};
use crate::types::{AnyContext, ContextType, RoutingError};

pub(crate) struct BaseStep {
    pub(crate) finder: Rc<dyn AnyFinder>,
    pub(crate) factory: Option<Rc<dyn AnyFactory>>,
    pub(crate) action: Option<Rc<dyn Action>>,
    pub(crate) interceptors: Vec<Rc<dyn AnyInterceptor>>,
    pub(crate) context_tasks: Vec<Rc<dyn AnyContextTask>>,
    pub(crate) post_tasks: Vec<Rc<dyn AnyPostTask>>,
}

pub(crate) enum StepKind {
    Base(BaseStep),
    Switcher(Vec<Rc<dyn CaseResolver>>),
    Root,
    Current,
    Custom(Rc<dyn AnyFinder>),
}

pub(crate) struct StepNode {
    pub(crate) kind: StepKind,
    pub(crate) context: Option<ContextType>,
    pub(crate) previous: Option<Rc<StepNode>>,
}

impl StepNode {
    pub(crate) fn base(&self) -> Option<&BaseStep> {
        match &self.kind {
            StepKind::Base(base) => Some(base),
            _ => None,
        }
    }

    pub(crate) fn describe(&self) -> String {
        match &self.kind {
            StepKind::Base(base) => match &base.factory {
                Some(factory) => format!("step({} / {})", base.finder.name(), factory.name()),
                None => format!("step({})", base.finder.name()),
            },
            StepKind::Switcher(cases) => format!("switch({} cases)", cases.len()),
            StepKind::Root => String::from("root"),
            StepKind::Current => String::from("current"),
            StepKind::Custom(finder) => format!("custom({})", finder.name()),
        }
    }
}

impl core::fmt::Debug for StepNode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("StepNode").field(&self.describe()).finish()
    }
}

pub(crate) trait CaseResolver {
    fn resolve(
        &self,
        hierarchy: &Hierarchy,
        context: &AnyContext,
    ) -> Result<Option<Rc<StepNode>>, RoutingError>;
}

struct ContextCase<C> {
    select: Box<dyn Fn(&C) -> Option<DestinationStep<C>>>,
}

impl<C: 'static> CaseResolver for ContextCase<C> {
    fn resolve(
        &self,
        _hierarchy: &Hierarchy,
        context: &AnyContext,
    ) -> Result<Option<Rc<StepNode>>, RoutingError> {
        Ok((self.select)(context.downcast::<C>()?).map(|step| step.node))
    }
}

struct FinderCase {
    finder: Rc<dyn AnyFinder>,
    step: Rc<StepNode>,
}

impl CaseResolver for FinderCase {
    fn resolve(
        &self,
        hierarchy: &Hierarchy,
        context: &AnyContext,
    ) -> Result<Option<Rc<StepNode>>, RoutingError> {
        Ok(self
            .finder
            .find(hierarchy, context)?
            .map(|_| self.step.clone()))
    }
}

struct DefaultCase(Rc<StepNode>);

impl CaseResolver for DefaultCase {
    fn resolve(&self, _: &Hierarchy, _: &AnyContext) -> Result<Option<Rc<StepNode>>, RoutingError> {
        Ok(Some(self.0.clone()))
    }
}

/// Flatten the chain ending at `head` into anchor-first order.
///
/// Switchers are resolved against the current hierarchy and do not appear in the result.
/// Every step is checked against the context type.
pub(crate) fn assemble_chain(
    head: &Rc<StepNode>,
    hierarchy: &Hierarchy,
    context: &AnyContext,
) -> Result<Vec<Rc<StepNode>>, RoutingError> {
    let mut chain = Vec::new();
    let mut next = Some(head.clone());
    while let Some(node) = next {
        if let Some(expected) = node.context {
            expected.check(context)?;
        }
        if let StepKind::Switcher(cases) = &node.kind {
            next = Some(resolve_switch(cases, hierarchy, context)?);
            continue;
        }
        next = node.previous.clone();
        chain.push(node);
    }
    chain.reverse();
    Ok(chain)
}

fn resolve_switch(
    cases: &[Rc<dyn CaseResolver>],
    hierarchy: &Hierarchy,
    context: &AnyContext,
) -> Result<Rc<StepNode>, RoutingError> {
    for case in cases {
        if let Some(step) = case.resolve(hierarchy, context)? {
            return Ok(step);
        }
    }
    Err(RoutingError::composition(
        "no case of the switch accepted the context",
    ))
}

/// Typed handle to the last step of a chain.
pub struct DestinationStep<C> {
    pub(crate) node: Rc<StepNode>,
    _context: PhantomData<fn(C)>,
}

impl<C> Clone for DestinationStep<C> {
    fn clone(&self) -> Self {
        Self::wrap(self.node.clone())
    }
}

impl<C> core::fmt::Debug for DestinationStep<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("DestinationStep")
            .field(&self.node.describe())
            .finish()
    }
}

impl<C> DestinationStep<C> {
    fn wrap(node: Rc<StepNode>) -> Self {
        Self {
            node,
            _context: PhantomData,
        }
    }

    /// Reinterpret the context type.
    ///
    /// Nothing is checked here; a navigation with a context the steps were not composed with
    /// fails with [`RoutingError::TypeMismatch`] before any screen is touched.
    pub fn unsafely_rewrap<D>(self) -> DestinationStep<D> {
        DestinationStep::wrap(self.node)
    }

    /// Pair with a context.
    pub fn destination(&self, context: C) -> Destination<C>
    where
        C: 'static,
    {
        Destination::new(self.clone(), context)
    }
}

/// A destination step and the context to navigate with.
pub struct Destination<C> {
    step: DestinationStep<C>,
    context: Rc<C>,
}

impl<C: 'static> Destination<C> {
    /// Pair `step` with `context`.
    pub fn new(step: DestinationStep<C>, context: C) -> Self {
        Self {
            step,
            context: Rc::new(context),
        }
    }

    /// The final step.
    pub fn step(&self) -> &DestinationStep<C> {
        &self.step
    }

    /// The context.
    pub fn context(&self) -> &C {
        &self.context
    }

    pub(crate) fn erased_context(&self) -> AnyContext {
        AnyContext::from_rc(self.context.clone())
    }
}

impl<C> Clone for Destination<C> {
    fn clone(&self) -> Self {
        Self {
            step: self.step.clone(),
            context: self.context.clone(),
        }
    }
}

impl<C> core::fmt::Debug for Destination<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Destination")
            .field("step", &self.step)
            .field("context", &core::any::type_name::<C>())
            .finish()
    }
}

/// Builder for one step.
pub struct StepAssembly<C> {
    base: BaseStep,
    previous: Option<Rc<StepNode>>,
    _context: PhantomData<fn(C)>,
}

impl<C: 'static> StepAssembly<C> {
    fn with_parts(finder: Rc<dyn AnyFinder>, factory: Option<Rc<dyn AnyFactory>>) -> Self {
        Self {
            base: BaseStep {
                finder,
                factory,
                action: None,
                interceptors: Vec::new(),
                context_tasks: Vec::new(),
                post_tasks: Vec::new(),
            },
            previous: None,
            _context: PhantomData,
        }
    }

    /// A step that reuses what `finder` finds or builds a screen with `factory`.
    pub fn new<F, Fa>(finder: F, factory: Fa) -> Self
    where
        F: Finder<Context = C> + 'static,
        Fa: Factory<Context = C> + 'static,
    {
        Self::with_parts(erase_finder(finder), Some(Rc::new(FactoryBox(factory))))
    }

    /// A step that reuses what `finder` finds or builds a container with `factory`.
    pub fn container<F, Fa>(finder: F, factory: Fa) -> Self
    where
        F: Finder<Context = C> + 'static,
        Fa: ContainerFactory<Context = C> + 'static,
    {
        Self::with_parts(erase_finder(finder), Some(Rc::new(ContainerFactoryBox(factory))))
    }

    /// A step that can only reuse an existing screen.
    pub fn finder_only<F>(finder: F) -> Self
    where
        F: Finder<Context = C> + 'static,
    {
        Self::with_parts(erase_finder(finder), None)
    }

    /// Gate the navigation.
    pub fn adding_interceptor<I>(mut self, interceptor: I) -> Self
    where
        I: RoutingInterceptor<Context = C> + 'static,
    {
        self.base
            .interceptors
            .push(Rc::new(InterceptorBox(interceptor)));
        self
    }

    /// Configure the step's screen once it is found or built.
    pub fn adding_context_task<T>(mut self, task: T) -> Self
    where
        T: ContextTask<Context = C> + 'static,
    {
        self.base.context_tasks.push(Rc::new(ContextTaskBox(task)));
        self
    }

    /// Run work after the navigation has revealed the destination.
    pub fn adding_post_task<T>(mut self, task: T) -> Self
    where
        T: PostTask<Context = C> + 'static,
    {
        self.base.post_tasks.push(Rc::new(PostTaskBox(task)));
        self
    }

    /// Attach built screens with `action`.
    pub fn using(mut self, action: impl Action + 'static) -> Self {
        self.base.action = Some(Rc::new(action));
        self
    }

    /// Start from `previous`.
    pub fn from(mut self, previous: &DestinationStep<C>) -> Self {
        self.previous = Some(previous.node.clone());
        self
    }

    /// Finish the step.
    pub fn assemble(self) -> DestinationStep<C> {
        DestinationStep::wrap(Rc::new(StepNode {
            kind: StepKind::Base(self.base),
            context: Some(ContextType::of::<C>()),
            previous: self.previous,
        }))
    }
}

impl<C> core::fmt::Debug for StepAssembly<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StepAssembly")
            .field("finder", &self.base.finder.name())
            .field("factory", &self.base.factory.as_ref().map(|f| f.name()))
            .field("has_action", &self.base.action.is_some())
            .finish_non_exhaustive()
    }
}

/// Anchor steps that every chain starts from.
#[derive(Clone, Copy, Debug)]
pub struct GeneralStep;

impl GeneralStep {
    fn anchor<C>(kind: StepKind, context: Option<ContextType>) -> DestinationStep<C> {
        DestinationStep::wrap(Rc::new(StepNode {
            kind,
            context,
            previous: None,
        }))
    }

    /// The window root. Fails the navigation if the window has none.
    pub fn root<C>() -> DestinationStep<C> {
        Self::anchor(StepKind::Root, None)
    }

    /// The topmost presentation context. Fails the navigation if the window has none.
    pub fn current<C>() -> DestinationStep<C> {
        Self::anchor(StepKind::Current, None)
    }

    /// Whatever `finder` finds. Fails the navigation if it finds nothing.
    pub fn custom<F>(finder: F) -> DestinationStep<F::Context>
    where
        F: Finder + 'static,
    {
        Self::anchor(
            StepKind::Custom(erase_finder(finder)),
            Some(ContextType::of::<F::Context>()),
        )
    }
}

/// Builder for a step that chooses how a chain continues.
///
/// Cases are tried in insertion order when a navigation starts; the first one that yields a
/// step wins. A switch takes no place of its own in the resolved chain.
pub struct SwitchAssembly<C> {
    cases: Vec<Rc<dyn CaseResolver>>,
    _context: PhantomData<fn(C)>,
}

impl<C: 'static> SwitchAssembly<C> {
    /// No cases yet.
    pub fn new() -> Self {
        Self {
            cases: Vec::new(),
            _context: PhantomData,
        }
    }

    /// Continue with the step `select` returns, if any.
    pub fn add_case(
        mut self,
        select: impl Fn(&C) -> Option<DestinationStep<C>> + 'static,
    ) -> Self {
        self.cases.push(Rc::new(ContextCase {
            select: Box::new(select),
        }));
        self
    }

    /// Continue with `step` when `finder` finds a screen.
    pub fn add_case_when<F>(mut self, finder: F, step: DestinationStep<C>) -> Self
    where
        F: Finder<Context = C> + 'static,
    {
        self.cases.push(Rc::new(FinderCase {
            finder: erase_finder(finder),
            step: step.node,
        }));
        self
    }

    /// Finish, continuing with `default` when no case applies.
    pub fn assemble(mut self, default: DestinationStep<C>) -> DestinationStep<C> {
        self.cases.push(Rc::new(DefaultCase(default.node)));
        self.assemble_without_default()
    }

    /// Finish; the navigation fails when no case applies.
    pub fn assemble_without_default(self) -> DestinationStep<C> {
        DestinationStep::wrap(Rc::new(StepNode {
            kind: StepKind::Switcher(self.cases),
            context: Some(ContextType::of::<C>()),
            previous: None,
        }))
    }
}

impl<C: 'static> Default for SwitchAssembly<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> core::fmt::Debug for SwitchAssembly<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SwitchAssembly")
            .field("cases", &self.cases.len())
            .finish()
    }
}
