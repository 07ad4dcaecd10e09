// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Router implementation.
//!
//! ## Overview
//!
//! Resolves a [`Destination`] against the live hierarchy and drives it to the screen.
//! One navigation moves through [`NavigationState`]s in strict order:
//!
//! 1. `ChainAssembled`: the chain is flattened anchor first and every step is checked against
//!    the context type.
//! 2. `Intercepting`: every interceptor and context task prepares, then interceptors perform one
//!    after another.
//! 3. `Resolving`: finders run from the destination back towards the anchor; the deepest step
//!    that finds a screen becomes the base. Screens that revealing the base would pop or dismiss
//!    are asked whether they can go.
//! 4. `Building`: every remaining step is checked for a factory and an action, then built and
//!    configured by its context tasks.
//! 5. `Attaching`: built screens are attached in chain order, each action waiting for the
//!    previous one.
//! 6. `RestoringVisibility`: covering presentations are dismissed and containers reveal the
//!    path to the destination.
//! 7. `PostProcessing`: post tasks run for every screen of the navigation.
//! 8. `Completed`: the caller's completion is called exactly once.
//!
//! ## Failures
//!
//! Failures before `Building` leave the hierarchy untouched, and so do failures of the checks
//! that open `Building`. Later failures stop the pipeline without undoing what was already
//! attached; screens that were built but never attached are removed. Every post task runs; the first failing one decides the result.
//!
//! ## Overlapping requests
//!
//! Navigations are not serialized. A request issued while another is still waiting on an
//! animation sees the hierarchy as it is at that moment; callers that need ordering wait for the
//! first completion before issuing the next request.
//!
//! ## See Also
//!
//! [`step`](crate::step) for composing destinations and
//! [`presentation`](crate::presentation) for the visibility walk.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::format;
use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;

use waypoint_hierarchy::{Hierarchy, ScreenId};

use crate::actions::Action;
use crate::adapters::ContainerAdapterLocator;
use crate::config::Defaults;
use crate::erased::AnyInterceptor;
use crate::factories::{ChildCoordinator, PendingChild};
use crate::presentation::{PresentationHandler, check_dismissible};
use crate::step::{Destination, DestinationStep, StepKind, StepNode, assemble_chain};
use crate::types::{AnyContext, Completion, RoutingError, RoutingResult};
use crate::window::{Window, WindowProvider};

/// Stage of a navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NavigationState {
    /// The chain was flattened and type checked.
    ChainAssembled,
    /// Interceptors are preparing and performing.
    Intercepting,
    /// Finders are looking for the base screen.
    Resolving,
    /// Missing screens are being built.
    Building,
    /// Built screens are being attached.
    Attaching,
    /// The destination is being revealed.
    RestoringVisibility,
    /// Post tasks are running.
    PostProcessing,
    /// The completion is being called.
    Completed,
}

type Observer = Rc<dyn Fn(NavigationState)>;

/// Navigates to destinations.
///
/// ## Usage
///
/// - Construct with [`Router::new`] from the configured [`Defaults`].
/// - Optionally observe stage transitions with [`Router::on_transition`].
/// - Call [`Router::navigate`] with a [`Destination`]; the completion receives the result once
///   the destination is on screen or the navigation failed.
///
/// Animated steps complete through the window's main queue, so with animation the completion
/// runs from [`Window::run_until_idle`] rather than from `navigate` itself.
#[derive(Clone)]
pub struct Router {
    window_provider: Rc<dyn WindowProvider>,
    locator: Rc<dyn ContainerAdapterLocator>,
    observer: Option<Observer>,
}

impl core::fmt::Debug for Router {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Router")
            .field("observed", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl Router {
    /// Router using the window provider and locator of `defaults`.
    pub fn new(defaults: &Defaults) -> Self {
        Self {
            window_provider: defaults.window_provider().clone(),
            locator: defaults.locator().clone(),
            observer: None,
        }
    }

    /// Call `observer` on every stage transition of every navigation.
    pub fn on_transition(mut self, observer: impl Fn(NavigationState) + 'static) -> Self {
        self.observer = Some(Rc::new(observer));
        self
    }

    /// Navigate to `destination`.
    ///
    /// Synchronous failures (no window, wrong context type, a failing `prepare`) are reported
    /// through `completion` before this returns.
    pub fn navigate<C: 'static>(
        &self,
        destination: &Destination<C>,
        animated: bool,
        completion: impl FnOnce(RoutingResult) + 'static,
    ) {
        self.start(
            destination.step().node.clone(),
            destination.erased_context(),
            animated,
            Completion::new(completion),
        );
    }

    /// Navigate to `step` with `context`.
    pub fn navigate_to<C: 'static>(
        &self,
        step: &DestinationStep<C>,
        context: C,
        animated: bool,
        completion: impl FnOnce(RoutingResult) + 'static,
    ) {
        self.navigate(&step.destination(context), animated, completion);
    }

    fn start(
        &self,
        head: Rc<StepNode>,
        context: AnyContext,
        animated: bool,
        completion: Completion,
    ) {
        let Some(window) = self.window_provider.window() else {
            log::warn!(target: "waypoint::router", "navigation failed: window was not found");
            completion.fail(RoutingError::composition("window was not found"));
            return;
        };
        let chain = {
            let h = window.hierarchy();
            assemble_chain(&head, &h, &context)
        };
        let chain = match chain {
            Ok(chain) => chain,
            Err(err) => {
                log::warn!(target: "waypoint::router", "navigation failed: {err}");
                completion.fail(err);
                return;
            }
        };
        let navigation = Box::new(Navigation {
            window,
            locator: self.locator.clone(),
            observer: self.observer.clone(),
            context,
            animated,
            screens: vec![None; chain.len()],
            chain,
            base: None,
            attachments: Vec::new(),
            attached: 0,
            completion,
        });
        navigation.enter(NavigationState::ChainAssembled);
        navigation.intercept();
    }
}

/// One navigation in flight, handed from stage to stage.
struct Navigation {
    window: Window,
    locator: Rc<dyn ContainerAdapterLocator>,
    observer: Option<Observer>,
    context: AnyContext,
    animated: bool,
    chain: Vec<Rc<StepNode>>,
    /// Screen of each chain step, once found or built.
    screens: Vec<Option<ScreenId>>,
    base: Option<usize>,
    /// Chain indices whose screens still need their action.
    attachments: Vec<usize>,
    attached: usize,
    completion: Completion,
}

impl Navigation {
    fn enter(&self, state: NavigationState) {
        log::trace!(target: "waypoint::router", "navigation {:?}", state);
        if let Some(observer) = &self.observer {
            observer(state);
        }
    }

    fn intercept(self: Box<Self>) {
        self.enter(NavigationState::Intercepting);
        if let Err(err) = self.prepare() {
            self.finish(Err(err));
            return;
        }
        let interceptors = self
            .chain
            .iter()
            .filter_map(|node| node.base())
            .flat_map(|step| step.interceptors.iter().cloned())
            .collect();
        self.run_interceptors(interceptors);
    }

    fn prepare(&self) -> RoutingResult {
        for step in self.chain.iter().filter_map(|node| node.base()) {
            for interceptor in &step.interceptors {
                interceptor.prepare(&self.context)?;
            }
            for task in &step.context_tasks {
                task.prepare(&self.context)?;
            }
        }
        Ok(())
    }

    fn run_interceptors(self: Box<Self>, mut queue: VecDeque<Rc<dyn AnyInterceptor>>) {
        let Some(interceptor) = queue.pop_front() else {
            self.resolve();
            return;
        };
        let context = self.context.clone();
        interceptor.perform(
            &context,
            Completion::new(move |result| match result {
                Ok(()) => self.run_interceptors(queue),
                Err(err) => self.finish(Err(err)),
            }),
        );
    }

    fn resolve(mut self: Box<Self>) {
        self.enter(NavigationState::Resolving);
        let found = {
            let h = self.window.hierarchy();
            self.find_base(&h)
        };
        match found {
            Ok(Some((index, screen))) => {
                log::debug!(
                    target: "waypoint::router",
                    "step {index} of {} resolved to {screen}",
                    self.chain.len()
                );
                let dismissible = {
                    let h = self.window.hierarchy();
                    check_dismissible(self.locator.as_ref(), &h, screen)
                };
                if let Err(err) = dismissible {
                    self.finish(Err(err));
                    return;
                }
                self.screens[index] = Some(screen);
                self.base = Some(index);
                self.build();
            }
            Ok(None) => {
                let buildable = self
                    .chain
                    .first()
                    .and_then(|node| node.base())
                    .is_some_and(|step| step.factory.is_some());
                if buildable {
                    self.build();
                } else {
                    self.finish(Err(RoutingError::composition(
                        "no step found a screen and the first step cannot build one",
                    )));
                }
            }
            Err(err) => self.finish(Err(err)),
        }
    }

    /// The deepest step that resolves to a screen.
    fn find_base(&self, h: &Hierarchy) -> Result<Option<(usize, ScreenId)>, RoutingError> {
        for (index, node) in self.chain.iter().enumerate().rev() {
            let found = match &node.kind {
                StepKind::Base(step) => step.finder.find(h, &self.context)?,
                StepKind::Root => Some(
                    h.root()
                        .ok_or_else(|| RoutingError::composition("root screen was not found"))?,
                ),
                StepKind::Current => Some(
                    h.topmost()
                        .ok_or_else(|| RoutingError::composition("current screen was not found"))?,
                ),
                StepKind::Custom(finder) => {
                    Some(finder.find(h, &self.context)?.ok_or_else(|| {
                        RoutingError::composition(format!("{} found nothing", finder.name()))
                    })?)
                }
                StepKind::Switcher(_) => None,
            };
            if let Some(screen) = found {
                return Ok(Some((index, screen)));
            }
        }
        Ok(None)
    }

    fn build(mut self: Box<Self>) {
        self.enter(NavigationState::Building);
        let result = {
            let window = self.window.clone();
            let mut h = window.hierarchy_mut();
            self.build_screens(&mut h)
        };
        match result {
            Ok(()) => self.attach_next(),
            Err(err) => {
                self.discard_unattached();
                self.finish(Err(err));
            }
        }
    }

    fn build_screens(&mut self, h: &mut Hierarchy) -> RoutingResult {
        let start = self.base.map_or(0, |base| base + 1);
        for (index, node) in self.chain.iter().enumerate().skip(start) {
            let step = node.base();
            let factory = step.and_then(|step| step.factory.as_ref()).ok_or_else(|| {
                RoutingError::composition(format!(
                    "{} found nothing and has no factory",
                    node.describe()
                ))
            })?;
            let becomes_root = self.base.is_none() && index == 0;
            if !becomes_root && step.is_none_or(|step| step.action.is_none()) {
                return Err(RoutingError::composition(format!(
                    "{} has no action",
                    node.describe()
                )));
            }
            factory.prepare(&self.context)?;
        }

        if let Some(base) = self.base
            && let (Some(step), Some(screen)) = (self.chain[base].base(), self.screens[base])
        {
            for task in &step.context_tasks {
                task.perform(h, screen, &self.context)?;
            }
        }

        let mut index = start;
        while index < self.chain.len() {
            let node = self.chain[index].clone();
            let Some((step, factory)) = node
                .base()
                .and_then(|step| Some((step, step.factory.clone()?)))
            else {
                return Err(RoutingError::composition(format!(
                    "{} has no factory",
                    node.describe()
                )));
            };

            let mut coordinator = ChildCoordinator::new(self.context.clone());
            let mut next = index + 1;
            if let Some(kind) = factory.container_kind() {
                while let Some(child) = self.chain.get(next).and_then(|n| n.base()) {
                    let (Some(action), Some(child_factory)) = (&child.action, &child.factory)
                    else {
                        break;
                    };
                    if !action.is_embedding() || !action.is_embeddable(kind) {
                        break;
                    }
                    coordinator.postpone(PendingChild {
                        step: Some(next),
                        factory: child_factory.clone(),
                        action: action.clone(),
                        context_tasks: child.context_tasks.clone(),
                    });
                    next += 1;
                    if child_factory.container_kind().is_some() {
                        break;
                    }
                }
            }

            let screen = factory.build(h, &self.context, &mut coordinator)?;
            self.screens[index] = Some(screen);
            self.attachments.push(index);
            for (step, child) in coordinator.take_built() {
                if let Some(step) = step {
                    self.screens[step] = Some(child);
                }
            }
            if !coordinator.is_empty() {
                return Err(RoutingError::composition(format!(
                    "{} left {} children unintegrated",
                    factory.name(),
                    coordinator.len()
                )));
            }
            for task in &step.context_tasks {
                task.perform(h, screen, &self.context)?;
            }
            log::debug!(target: "waypoint::router", "built {}", h.describe(screen));
            index = next;
        }
        Ok(())
    }

    /// Remove screens built by this navigation that never made it into the hierarchy.
    fn discard_unattached(&self) {
        let mut h = self.window.hierarchy_mut();
        for &index in &self.attachments {
            if let Some(screen) = self.screens[index]
                && h.is_detached(screen)
            {
                log::debug!(target: "waypoint::router", "discarding unattached {screen}");
                h.remove(screen);
            }
        }
    }

    fn attach_next(mut self: Box<Self>) {
        if self.attached == 0 {
            self.enter(NavigationState::Attaching);
        }
        let Some(&index) = self.attachments.get(self.attached) else {
            self.restore_visibility();
            return;
        };
        let Some(screen) = self.screens[index] else {
            self.finish(Err(RoutingError::composition("built screen went missing")));
            return;
        };
        self.attached += 1;

        if self.base.is_none() && index == 0 {
            let installed = {
                let mut h = self.window.hierarchy_mut();
                if h.root().is_some() {
                    Err(RoutingError::composition(format!(
                        "window already has a root, {} cannot replace it",
                        h.describe(screen)
                    )))
                } else {
                    h.set_root(screen)
                        .map(|_| ())
                        .map_err(RoutingError::from)
                }
            };
            match installed {
                Ok(()) => self.attach_next(),
                Err(err) => self.fail_attaching(err),
            }
            return;
        }

        let planned = self.plan_attachment(index, screen);
        let (action, target) = match planned {
            Ok(planned) => planned,
            Err(err) => {
                self.fail_attaching(err);
                return;
            }
        };
        let window = self.window.clone();
        let animated = self.animated;
        action.perform(
            &window,
            screen,
            target,
            animated,
            Completion::new(move |result| match result {
                Ok(()) => {
                    log::debug!(target: "waypoint::router", "attached {screen} to {target}");
                    self.attach_next();
                }
                Err(err) => self.fail_attaching(err),
            }),
        );
    }

    /// Action of step `index` and the screen it attaches to.
    fn plan_attachment(
        &self,
        index: usize,
        screen: ScreenId,
    ) -> Result<(Rc<dyn Action>, ScreenId), RoutingError> {
        let node = &self.chain[index];
        let action = node
            .base()
            .and_then(|step| step.action.clone())
            .ok_or_else(|| {
                RoutingError::composition(format!("{} has no action", node.describe()))
            })?;
        let existing = self.screens[..index]
            .iter()
            .rev()
            .flatten()
            .copied()
            .next()
            .ok_or_else(|| RoutingError::composition("no screen to attach to"))?;
        if !action.is_embedding() {
            return Ok((action, existing));
        }
        let h = self.window.hierarchy();
        let target = core::iter::once(existing)
            .chain(h.ancestors(existing))
            .find(|&candidate| {
                h.container_kind(candidate)
                    .is_some_and(|kind| action.is_embeddable(kind))
            });
        match target {
            Some(target) => Ok((action, target)),
            None => Err(RoutingError::composition(format!(
                "no container around {} accepts {}",
                h.describe(existing),
                h.describe(screen)
            ))),
        }
    }

    fn fail_attaching(self: Box<Self>, err: RoutingError) {
        self.discard_unattached();
        self.finish(Err(err));
    }

    fn restore_visibility(self: Box<Self>) {
        self.enter(NavigationState::RestoringVisibility);
        let Some(destination) = self.screens.iter().rev().flatten().copied().next() else {
            self.finish(Err(RoutingError::composition("destination screen was not found")));
            return;
        };
        let handler = PresentationHandler::with_locator(self.locator.clone());
        let window = self.window.clone();
        let animated = self.animated;
        handler.reveal(
            &window,
            destination,
            animated,
            Completion::new(move |result| match result {
                Ok(()) => self.post_process(),
                Err(err) => self.finish(Err(err)),
            }),
        );
    }

    fn post_process(self: Box<Self>) {
        self.enter(NavigationState::PostProcessing);
        let navigation: Vec<ScreenId> = self.screens.iter().flatten().copied().collect();
        let mut first_error = None;
        for (node, screen) in self.chain.iter().zip(&self.screens) {
            let (Some(step), Some(screen)) = (node.base(), *screen) else {
                continue;
            };
            for task in &step.post_tasks {
                if let Err(err) = task.perform(&self.window, screen, &self.context, &navigation) {
                    log::warn!(target: "waypoint::router", "post task failed: {err}");
                    first_error.get_or_insert(err);
                }
            }
        }
        self.finish(first_error.map_or(Ok(()), Err));
    }

    fn finish(self: Box<Self>, result: RoutingResult) {
        self.enter(NavigationState::Completed);
        match &result {
            Ok(()) => log::info!(target: "waypoint::router", "navigation completed"),
            Err(err) => log::warn!(target: "waypoint::router", "navigation failed: {err}"),
        }
        let Self { completion, .. } = *self;
        completion.complete(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{Embed, NoOp, PresentModally};
    use crate::factories::{ContainerModelFactory, InlineFactory, ModelFactory};
    use crate::finders::{ModelFinder, NilFinder};
    use crate::step::{GeneralStep, StepAssembly};
    use crate::tasks::{InlineContextTask, InlineInterceptor};
    use core::cell::{Cell, RefCell};
    use waypoint_hierarchy::{CanBeDismissed, ContainerKind, Screen};

    #[derive(Default)]
    struct Home;

    struct Draft {
        dirty: bool,
    }

    impl CanBeDismissed for Draft {
        fn can_be_dismissed(&self) -> bool {
            !self.dirty
        }
    }

    #[derive(Default)]
    struct Detail {
        item: u32,
    }

    struct Outcome(Rc<RefCell<Option<RoutingResult>>>);

    impl Outcome {
        fn new() -> Self {
            Self(Rc::new(RefCell::new(None)))
        }

        fn callback(&self) -> impl FnOnce(RoutingResult) + 'static {
            let slot = self.0.clone();
            move |result| {
                assert!(slot.borrow().is_none(), "completion called twice");
                *slot.borrow_mut() = Some(result);
            }
        }

        fn get(&self) -> Option<RoutingResult> {
            self.0.borrow().clone()
        }
    }

    fn window_with_stack() -> (Window, ScreenId, ScreenId) {
        let window = Window::new();
        let (nav, home) = {
            let mut h = window.hierarchy_mut();
            let nav = h.insert(Screen::container(ContainerKind::STACK, ()));
            let home = h.insert(Screen::new(Home));
            h.set_root(nav).unwrap();
            h.set_children(nav, vec![home]).unwrap();
            (nav, home)
        };
        (window, nav, home)
    }

    #[test]
    fn states_are_entered_in_order() {
        let (window, nav, _) = window_with_stack();
        let defaults = Defaults::new(window.clone());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let router = Router::new(&defaults).on_transition(move |state| s.borrow_mut().push(state));
        let detail = StepAssembly::new(
            ModelFinder::<Detail, u32>::new(&defaults),
            ModelFactory::<Detail, u32>::new().configured(|d, item| d.item = *item),
        )
        .using(Embed::push(&defaults))
        .from(&GeneralStep::root())
        .assemble();

        let outcome = Outcome::new();
        router.navigate_to(&detail, 4, false, outcome.callback());
        assert_eq!(outcome.get(), Some(Ok(())));
        assert_eq!(
            *seen.borrow(),
            [
                NavigationState::ChainAssembled,
                NavigationState::Intercepting,
                NavigationState::Resolving,
                NavigationState::Building,
                NavigationState::Attaching,
                NavigationState::RestoringVisibility,
                NavigationState::PostProcessing,
                NavigationState::Completed,
            ]
        );
        let h = window.hierarchy();
        let top = h.children(nav)[1];
        assert_eq!(h.model::<Detail>(top).map(|d| d.item), Some(4));
    }

    #[test]
    fn animated_navigation_completes_from_the_queue() {
        let (window, nav, _) = window_with_stack();
        let defaults = Defaults::new(window.clone());
        let detail = StepAssembly::new(NilFinder::new(), ModelFactory::<Detail, u32>::new())
            .using(Embed::push(&defaults))
            .from(&GeneralStep::root())
            .assemble();

        let outcome = Outcome::new();
        Router::new(&defaults).navigate_to(&detail, 1, true, outcome.callback());
        assert_eq!(outcome.get(), None);
        window.run_until_idle();
        assert_eq!(outcome.get(), Some(Ok(())));
        assert_eq!(window.hierarchy().children(nav).len(), 2);
    }

    #[test]
    fn container_steps_integrate_following_children() {
        let window = Window::new();
        let defaults = Defaults::new(window.clone());
        let nav = StepAssembly::container(
            NilFinder::new(),
            ContainerModelFactory::<(), u32>::stack(),
        )
        .using(NoOp)
        .assemble();
        let home = StepAssembly::new(NilFinder::new(), ModelFactory::<Home, u32>::new())
            .using(Embed::push(&defaults))
            .from(&nav)
            .assemble();
        let detail = StepAssembly::new(NilFinder::new(), ModelFactory::<Detail, u32>::new())
            .adding_context_task(InlineContextTask::new(|d: &mut Detail, item: &u32| {
                d.item = *item;
            }))
            .using(Embed::push(&defaults))
            .from(&home)
            .assemble();

        let outcome = Outcome::new();
        Router::new(&defaults).navigate_to(&detail, 8, false, outcome.callback());
        assert_eq!(outcome.get(), Some(Ok(())));

        let h = window.hierarchy();
        let root = h.root().unwrap();
        assert_eq!(h.container_kind(root), Some(ContainerKind::STACK));
        let children = h.children(root);
        assert_eq!(children.len(), 2);
        assert!(h.model::<Home>(children[0]).is_some());
        assert_eq!(h.model::<Detail>(children[1]).map(|d| d.item), Some(8));
    }

    #[test]
    fn first_step_cannot_replace_an_existing_root() {
        let (window, _, _) = window_with_stack();
        let defaults = Defaults::new(window.clone());
        let detail = StepAssembly::new(NilFinder::new(), ModelFactory::<Detail, u32>::new())
            .using(NoOp)
            .assemble();
        let outcome = Outcome::new();
        let before = window.hierarchy().len();
        Router::new(&defaults).navigate_to(&detail, 1, false, outcome.callback());
        assert!(matches!(outcome.get(), Some(Err(e)) if e.is_composition_failed()));
        assert_eq!(window.hierarchy().len(), before);
    }

    #[test]
    fn interceptor_can_delay_the_navigation() {
        let (window, nav, _) = window_with_stack();
        let defaults = Defaults::new(window.clone());
        let parked = Rc::new(RefCell::new(None));
        let p = parked.clone();
        let detail = StepAssembly::new(NilFinder::new(), ModelFactory::<Detail, u32>::new())
            .adding_interceptor(InlineInterceptor::new(move |_: &u32, completion| {
                *p.borrow_mut() = Some(completion);
            }))
            .using(Embed::push(&defaults))
            .from(&GeneralStep::root())
            .assemble();

        let outcome = Outcome::new();
        Router::new(&defaults).navigate_to(&detail, 1, false, outcome.callback());
        assert_eq!(outcome.get(), None);
        assert_eq!(window.hierarchy().children(nav).len(), 1);

        let completion = parked.borrow_mut().take().unwrap();
        completion.succeed();
        assert_eq!(outcome.get(), Some(Ok(())));
        assert_eq!(window.hierarchy().children(nav).len(), 2);
    }

    #[test]
    fn failed_attachment_discards_what_was_not_attached() {
        let (window, _, home) = window_with_stack();
        let defaults = Defaults::new(window.clone());
        let sheet = StepAssembly::new(NilFinder::new(), ModelFactory::<Detail, u32>::new())
            .using(PresentModally::new())
            .from(&GeneralStep::root())
            .assemble();
        let tail = StepAssembly::new(
            NilFinder::new(),
            InlineFactory::new(|h: &mut Hierarchy, _: &u32| Ok(h.insert(Screen::new(Home)))),
        )
        .using(PresentModally::new())
        .from(&sheet)
        .assemble();

        {
            let mut h = window.hierarchy_mut();
            let blocker = h.insert(Screen::new(()));
            let root = h.root().unwrap();
            h.present(root, blocker).unwrap();
        }
        let before = window.hierarchy().len();
        let outcome = Outcome::new();
        Router::new(&defaults).navigate_to(&tail, 1, false, outcome.callback());
        assert!(matches!(outcome.get(), Some(Err(e)) if e.is_composition_failed()));
        assert_eq!(window.hierarchy().len(), before);
        assert!(window.hierarchy().is_alive(home));
    }

    #[test]
    fn failed_child_build_removes_the_half_built_container() {
        let window = Window::new();
        let tabs = {
            let mut h = window.hierarchy_mut();
            let tabs = h.insert(Screen::container(ContainerKind::TABS, ()));
            h.set_root(tabs).unwrap();
            tabs
        };
        let defaults = Defaults::new(window.clone());
        let nav = StepAssembly::container(
            NilFinder::new(),
            ContainerModelFactory::<(), u32>::stack(),
        )
        .using(Embed::add_tab(&defaults))
        .from(&GeneralStep::root())
        .assemble();
        let detail = StepAssembly::new(NilFinder::new(), ModelFactory::<Detail, u32>::new())
            .using(Embed::push(&defaults))
            .from(&nav)
            .assemble();
        let broken = StepAssembly::new(
            NilFinder::new(),
            InlineFactory::new(|_: &mut Hierarchy, _: &u32| -> Result<ScreenId, RoutingError> {
                Err(RoutingError::composition("no resource"))
            }),
        )
        .using(Embed::push(&defaults))
        .from(&detail)
        .assemble();

        let before = window.hierarchy().len();
        let outcome = Outcome::new();
        Router::new(&defaults).navigate_to(&broken, 1, false, outcome.callback());
        assert_eq!(
            outcome.get(),
            Some(Err(RoutingError::composition("no resource")))
        );
        let h = window.hierarchy();
        assert_eq!(h.len(), before);
        assert!(h.children(tabs).is_empty());
    }

    #[test]
    fn step_without_action_fails_before_building() {
        let (window, nav, home) = window_with_stack();
        let defaults = Defaults::new(window.clone());
        let configured = Rc::new(Cell::new(false));
        let built = Rc::new(Cell::new(false));
        let (c, b) = (configured.clone(), built.clone());
        let base = StepAssembly::new(
            ModelFinder::<Home, u32>::new(&defaults),
            ModelFactory::<Home, u32>::new(),
        )
        .adding_context_task(InlineContextTask::new(move |_: &mut Home, _: &u32| c.set(true)))
        .using(Embed::push(&defaults))
        .from(&GeneralStep::root())
        .assemble();
        let detail = StepAssembly::new(
            NilFinder::new(),
            ModelFactory::<Detail, u32>::new().configured(move |_, _| b.set(true)),
        )
        .from(&base)
        .assemble();

        let before = window.hierarchy().len();
        let outcome = Outcome::new();
        Router::new(&defaults).navigate_to(&detail, 1, false, outcome.callback());
        assert!(matches!(outcome.get(), Some(Err(e)) if e.is_composition_failed()));
        assert!(!configured.get());
        assert!(!built.get());
        assert_eq!(window.hierarchy().len(), before);
        assert_eq!(window.hierarchy().children(nav), [home]);
    }

    #[test]
    fn guarded_screen_stops_the_navigation_before_building() {
        let (window, nav, home) = window_with_stack();
        let draft = {
            let mut h = window.hierarchy_mut();
            let draft = h.insert(Screen::guarded(Draft { dirty: true }));
            h.set_children(nav, vec![home, draft]).unwrap();
            draft
        };
        let defaults = Defaults::new(window.clone());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let router = Router::new(&defaults).on_transition(move |state| s.borrow_mut().push(state));
        let back_home =
            StepAssembly::finder_only(ModelFinder::<Home, u32>::new(&defaults)).assemble();

        let outcome = Outcome::new();
        router.navigate_to(&back_home, 0, false, outcome.callback());
        assert_eq!(
            outcome.get(),
            Some(Err(RoutingError::composition(format!(
                "{} cannot be dismissed",
                window.hierarchy().describe(draft)
            ))))
        );
        assert!(!seen.borrow().contains(&NavigationState::Building));
        assert_eq!(window.hierarchy().children(nav), [home, draft]);

        window.hierarchy_mut().model_mut::<Draft>(draft).unwrap().dirty = false;
        let outcome = Outcome::new();
        router.navigate_to(&back_home, 0, false, outcome.callback());
        assert_eq!(outcome.get(), Some(Ok(())));
        assert_eq!(window.hierarchy().children(nav), [home]);
        assert!(!window.hierarchy().is_alive(draft));
    }
}
