// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end navigation scenarios against a live window.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use waypoint_hierarchy::{CanBeDismissed, ContainerKind, Hierarchy, Screen, ScreenFlags, ScreenId};
use waypoint_router::actions::{Action, Embed, PresentModally, PresentationStart};
use waypoint_router::adapters::{ContainerAdapter, DefaultContainerAdapterLocator, StackAdapter};
use waypoint_router::config::Defaults;
use waypoint_router::factories::{ContainerModelFactory, ModelFactory};
use waypoint_router::finders::{ContextChecking, ContextFinder, ModelFinder, NilFinder};
use waypoint_router::iterator::{SearchOptions, StartingPoint};
use waypoint_router::step::{GeneralStep, StepAssembly};
use waypoint_router::tasks::{InlineContextTask, InlineInterceptor, InlinePostTask, PostTask};
use waypoint_router::window::{Window, WindowProvider};
use waypoint_router::{Completion, DestinationStep, Router, RoutingError, RoutingResult};

#[derive(Default)]
struct Inbox;

#[derive(Default)]
struct Thread {
    id: u32,
}

impl ContextChecking for Thread {
    type Context = u32;

    fn is_target(&self, id: &u32) -> bool {
        self.id == *id
    }
}

#[derive(Default)]
struct Login;

/// Records every completion call.
#[derive(Clone, Default)]
struct Outcome(Rc<RefCell<Vec<RoutingResult>>>);

impl Outcome {
    fn callback(&self) -> impl FnOnce(RoutingResult) + 'static {
        let results = self.0.clone();
        move |result| results.borrow_mut().push(result)
    }

    fn single(&self) -> Option<RoutingResult> {
        let results = self.0.borrow();
        assert!(results.len() <= 1, "completion called {} times", results.len());
        results.first().cloned()
    }
}

/// Counts how often the wrapped action performs.
struct Counted<A> {
    inner: A,
    count: Rc<Cell<usize>>,
}

impl<A> Counted<A> {
    fn new(inner: A, count: &Rc<Cell<usize>>) -> Self {
        Self {
            inner,
            count: count.clone(),
        }
    }
}

impl<A: Action> Action for Counted<A> {
    fn perform(
        &self,
        window: &Window,
        screen: ScreenId,
        existing: ScreenId,
        animated: bool,
        completion: Completion,
    ) {
        self.count.set(self.count.get() + 1);
        self.inner
            .perform(window, screen, existing, animated, completion);
    }

    fn is_embedding(&self) -> bool {
        self.inner.is_embedding()
    }

    fn is_embeddable(&self, kind: ContainerKind) -> bool {
        self.inner.is_embeddable(kind)
    }

    fn embed(
        &self,
        hierarchy: &mut Hierarchy,
        screen: ScreenId,
        children: &mut Vec<ScreenId>,
    ) -> RoutingResult {
        self.inner.embed(hierarchy, screen, children)
    }
}

fn counting<M: Default + 'static>(count: &Rc<Cell<usize>>) -> ModelFactory<M, u32> {
    let count = count.clone();
    ModelFactory::new().configured(move |_, _| count.set(count.get() + 1))
}

fn set_thread_id() -> InlineContextTask<Thread, u32> {
    InlineContextTask::new(|thread: &mut Thread, id: &u32| thread.id = *id)
}

/// A window whose root is a stack holding an inbox.
fn inbox_window() -> (Window, ScreenId, ScreenId) {
    let window = Window::new();
    let (nav, inbox) = {
        let mut h = window.hierarchy_mut();
        let nav = h.insert(Screen::container(ContainerKind::STACK, ()).with_label("nav"));
        let inbox = h.insert(Screen::new(Inbox));
        h.set_root(nav).unwrap();
        h.set_children(nav, vec![inbox]).unwrap();
        (nav, inbox)
    };
    (window, nav, inbox)
}

fn thread_step(defaults: &Defaults, from: &DestinationStep<u32>) -> DestinationStep<u32> {
    StepAssembly::new(ContextFinder::<Thread>::new(defaults), ModelFactory::<Thread, u32>::new())
        .adding_context_task(set_thread_id())
        .using(Embed::push(defaults))
        .from(from)
        .assemble()
}

#[test]
fn existing_screens_are_reused() {
    let (window, nav, inbox) = inbox_window();
    let defaults = Defaults::new(window.clone());
    let inbox_built = Rc::new(Cell::new(0));
    let thread_built = Rc::new(Cell::new(0));
    let performed = Rc::new(Cell::new(0));

    let inbox_step = StepAssembly::new(
        ModelFinder::<Inbox, u32>::new(&defaults),
        counting::<Inbox>(&inbox_built),
    )
    .using(Counted::new(Embed::push(&defaults), &performed))
    .from(&GeneralStep::root())
    .assemble();
    let thread = StepAssembly::new(
        ContextFinder::<Thread>::new(&defaults),
        counting::<Thread>(&thread_built),
    )
    .adding_context_task(set_thread_id())
    .using(Counted::new(Embed::push(&defaults), &performed))
    .from(&inbox_step)
    .assemble();

    let router = Router::new(&defaults);
    let outcome = Outcome::default();
    router.navigate_to(&thread, 5, false, outcome.callback());
    assert_eq!(outcome.single(), Some(Ok(())));
    assert_eq!(inbox_built.get(), 0);
    assert_eq!(thread_built.get(), 1);
    assert_eq!(performed.get(), 1);

    let top = {
        let h = window.hierarchy();
        let children = h.children(nav).to_vec();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0], inbox);
        assert_eq!(h.model::<Thread>(children[1]).map(|t| t.id), Some(5));
        children[1]
    };

    let again = Outcome::default();
    router.navigate_to(&thread, 5, false, again.callback());
    assert_eq!(again.single(), Some(Ok(())));
    assert_eq!(thread_built.get(), 1);
    assert_eq!(performed.get(), 1);
    assert_eq!(window.hierarchy().children(nav), [inbox, top]);
}

#[test]
fn missing_screens_are_built_and_revealed() {
    let window = Window::new();
    let (tabs, feed) = {
        let mut h = window.hierarchy_mut();
        let tabs = h.insert(Screen::container(ContainerKind::TABS, ()));
        let feed = h.insert(Screen::new(()));
        h.set_root(tabs).unwrap();
        h.set_children(tabs, vec![feed]).unwrap();
        h.select(tabs, feed).unwrap();
        (tabs, feed)
    };
    let defaults = Defaults::new(window.clone());
    let performed = Rc::new(Cell::new(0));

    let messages = StepAssembly::container(
        NilFinder::new(),
        ContainerModelFactory::<(), u32>::stack().labeled("messages"),
    )
    .using(Counted::new(Embed::add_tab(&defaults), &performed))
    .from(&GeneralStep::root())
    .assemble();
    let thread = StepAssembly::new(NilFinder::new(), ModelFactory::<Thread, u32>::new())
        .adding_context_task(set_thread_id())
        .using(Counted::new(Embed::push(&defaults), &performed))
        .from(&messages)
        .assemble();

    let outcome = Outcome::default();
    Router::new(&defaults).navigate_to(&thread, 12, true, outcome.callback());
    assert_eq!(outcome.single(), None);
    window.run_until_idle();
    assert_eq!(outcome.single(), Some(Ok(())));

    // The thread was integrated while its stack was built; only the stack needed an action.
    assert_eq!(performed.get(), 1);
    let h = window.hierarchy();
    let children = h.children(tabs);
    assert_eq!(children.len(), 2);
    assert_eq!(children[0], feed);
    let stack = children[1];
    assert_eq!(h.label(stack), Some("messages"));
    assert_eq!(h.selected(tabs), Some(stack));
    let thread = h.children(stack)[0];
    assert_eq!(h.model::<Thread>(thread).map(|t| t.id), Some(12));
}

#[test]
fn failing_prepare_touches_nothing() {
    let (window, nav, inbox) = inbox_window();
    let defaults = Defaults::new(window.clone());
    let built = Rc::new(Cell::new(0));
    let performed = Rc::new(Cell::new(0));
    let interceptor_ran = Rc::new(Cell::new(false));
    let ran = interceptor_ran.clone();

    let first = StepAssembly::new(NilFinder::new(), counting::<Inbox>(&built))
        .adding_interceptor(InlineInterceptor::sync(move |_: &u32| {
            ran.set(true);
            Ok(())
        }))
        .using(Counted::new(Embed::push(&defaults), &performed))
        .from(&GeneralStep::root())
        .assemble();
    let second = StepAssembly::new(NilFinder::new(), counting::<Thread>(&built))
        .adding_interceptor(
            InlineInterceptor::sync(|_: &u32| Ok(()))
                .with_prepare(|_| Err(RoutingError::generic("offline"))),
        )
        .using(Counted::new(Embed::push(&defaults), &performed))
        .from(&first)
        .assemble();

    let outcome = Outcome::default();
    Router::new(&defaults).navigate_to(&second, 1, false, outcome.callback());
    assert_eq!(outcome.single(), Some(Err(RoutingError::generic("offline"))));
    assert!(!interceptor_ran.get());
    assert_eq!(built.get(), 0);
    assert_eq!(performed.get(), 0);
    assert_eq!(window.hierarchy().children(nav), [inbox]);
}

#[test]
fn interceptor_veto_short_circuits() {
    let (window, nav, inbox) = inbox_window();
    let defaults = Defaults::new(window.clone());
    let built = Rc::new(Cell::new(0));
    let later_ran = Rc::new(Cell::new(false));
    let ran = later_ran.clone();

    let first = StepAssembly::new(NilFinder::new(), counting::<Inbox>(&built))
        .adding_interceptor(InlineInterceptor::sync(|_: &u32| {
            Err(RoutingError::generic("not allowed"))
        }))
        .using(Embed::push(&defaults))
        .from(&GeneralStep::root())
        .assemble();
    let second = StepAssembly::new(NilFinder::new(), counting::<Thread>(&built))
        .adding_interceptor(InlineInterceptor::sync(move |_: &u32| {
            ran.set(true);
            Ok(())
        }))
        .using(Embed::push(&defaults))
        .from(&first)
        .assemble();

    let outcome = Outcome::default();
    Router::new(&defaults).navigate_to(&second, 1, false, outcome.callback());
    assert_eq!(
        outcome.single(),
        Some(Err(RoutingError::generic("not allowed")))
    );
    assert!(!later_ran.get());
    assert_eq!(built.get(), 0);
    assert_eq!(window.hierarchy().children(nav), [inbox]);
}

#[test]
fn presenting_over_a_presentation_fails() {
    let (window, nav, _) = inbox_window();
    let blocker = {
        let mut h = window.hierarchy_mut();
        let blocker = h.insert(Screen::new(()));
        h.present(nav, blocker).unwrap();
        blocker
    };
    let defaults = Defaults::new(window.clone());
    let sheet = StepAssembly::new(NilFinder::new(), ModelFactory::<Login, u32>::new())
        .using(PresentModally::new())
        .from(&GeneralStep::root())
        .assemble();

    let before = window.hierarchy().len();
    let outcome = Outcome::default();
    Router::new(&defaults).navigate_to(&sheet, 0, true, outcome.callback());
    window.run_until_idle();
    assert!(matches!(outcome.single(), Some(Err(e)) if e.is_composition_failed()));
    assert_eq!(window.hierarchy().presented(nav), Some(blocker));
    assert_eq!(window.hierarchy().len(), before);
}

fn inbox_anywhere(defaults: &Defaults) -> DestinationStep<u32> {
    StepAssembly::finder_only(ModelFinder::<Inbox, u32>::with_options(
        defaults,
        SearchOptions::FULL_STACK,
        StartingPoint::Root,
    ))
    .from(&GeneralStep::root())
    .assemble()
}

#[test]
fn covering_presentation_is_dismissed() {
    let (window, nav, _) = inbox_window();
    let sheet = {
        let mut h = window.hierarchy_mut();
        let sheet = h.insert(Screen::new(Login));
        h.present(nav, sheet).unwrap();
        sheet
    };
    let defaults = Defaults::new(window.clone());

    let outcome = Outcome::default();
    Router::new(&defaults).navigate_to(&inbox_anywhere(&defaults), 0, true, outcome.callback());
    assert!(window.hierarchy().flags(sheet).contains(ScreenFlags::BEING_DISMISSED));
    window.run_until_idle();
    assert_eq!(outcome.single(), Some(Ok(())));
    assert_eq!(window.hierarchy().presented(nav), None);
    assert!(!window.hierarchy().is_alive(sheet));
}

#[test]
fn presentation_already_being_dismissed_fails() {
    let (window, nav, _) = inbox_window();
    let sheet = {
        let mut h = window.hierarchy_mut();
        let sheet = h.insert(Screen::new(Login));
        h.present(nav, sheet).unwrap();
        h.insert_flags(sheet, ScreenFlags::BEING_DISMISSED);
        sheet
    };
    let defaults = Defaults::new(window.clone());

    let outcome = Outcome::default();
    Router::new(&defaults).navigate_to(&inbox_anywhere(&defaults), 0, true, outcome.callback());
    window.run_until_idle();
    assert!(matches!(outcome.single(), Some(Err(e)) if e.is_composition_failed()));
    assert_eq!(window.hierarchy().presented(nav), Some(sheet));
}

struct FailingAnalytics;

impl PostTask for FailingAnalytics {
    type Context = u32;

    fn perform(&self, _: &Window, _: ScreenId, _: &u32, _: &[ScreenId]) -> RoutingResult {
        Err(RoutingError::generic("analytics offline"))
    }
}

#[test]
fn every_post_task_runs_and_the_first_failure_wins() {
    let (window, nav, inbox) = inbox_window();
    let defaults = Defaults::new(window.clone());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();

    let thread = StepAssembly::new(NilFinder::new(), ModelFactory::<Thread, u32>::new())
        .adding_post_task(FailingAnalytics)
        .adding_post_task(InlinePostTask::new(
            move |_: &Window, screen, _: &u32, navigation: &[ScreenId]| {
                s.borrow_mut().push((screen, navigation.to_vec()));
            },
        ))
        .using(Embed::push(&defaults))
        .from(&GeneralStep::root())
        .assemble();

    let outcome = Outcome::default();
    Router::new(&defaults).navigate_to(&thread, 2, false, outcome.callback());
    assert_eq!(
        outcome.single(),
        Some(Err(RoutingError::generic("analytics offline")))
    );

    let children = window.hierarchy().children(nav).to_vec();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0], inbox);
    assert_eq!(*seen.borrow(), [(children[1], vec![nav, children[1]])]);
}

#[test]
fn wrong_context_type_is_rejected_before_any_change() {
    let (window, nav, inbox) = inbox_window();
    let defaults = Defaults::new(window.clone());
    let built = Rc::new(Cell::new(0));
    let step = StepAssembly::new(NilFinder::new(), counting::<Thread>(&built))
        .using(Embed::push(&defaults))
        .from(&GeneralStep::root())
        .assemble()
        .unsafely_rewrap::<&'static str>();

    let outcome = Outcome::default();
    Router::new(&defaults).navigate_to(&step, "seven", false, outcome.callback());
    assert!(matches!(
        outcome.single(),
        Some(Err(RoutingError::TypeMismatch { expected: "u32", .. }))
    ));
    assert_eq!(built.get(), 0);
    assert_eq!(window.hierarchy().children(nav), [inbox]);
}

struct NoWindow;

impl WindowProvider for NoWindow {
    fn window(&self) -> Option<Window> {
        None
    }
}

#[test]
fn navigation_without_a_window_fails() {
    let defaults = Defaults::new(NoWindow);
    let step = StepAssembly::new(NilFinder::new(), ModelFactory::<Inbox, u32>::new())
        .using(Embed::push(&defaults))
        .from(&GeneralStep::root())
        .assemble();
    let outcome = Outcome::default();
    Router::new(&defaults).navigate_to(&step, 0, false, outcome.callback());
    assert_eq!(
        outcome.single(),
        Some(Err(RoutingError::composition("window was not found")))
    );
}

#[test]
fn overlapping_requests_see_the_hierarchy_mid_transition() {
    let (window, nav, inbox) = inbox_window();
    let defaults = Defaults::new(window.clone());
    let thread = thread_step(&defaults, &GeneralStep::root());
    let router = Router::new(&defaults);

    let order = Rc::new(RefCell::new(Vec::new()));
    let (o1, o2) = (order.clone(), order.clone());
    router.navigate_to(&thread, 3, true, move |r| o1.borrow_mut().push(("first", r)));
    // The push is already in the hierarchy while its animation is pending, so the second request
    // reuses the screen and finishes first.
    router.navigate_to(&thread, 3, true, move |r| o2.borrow_mut().push(("second", r)));
    assert_eq!(*order.borrow(), [("second", RoutingResult::Ok(()))]);

    window.run_until_idle();
    assert_eq!(*order.borrow(), [("second", RoutingResult::Ok(())), ("first", Ok(()))]);
    let h = window.hierarchy();
    assert_eq!(h.children(nav).len(), 2);
    assert_eq!(h.children(nav)[0], inbox);
}

#[test]
fn interceptor_can_run_its_own_navigation() {
    let (window, nav, _) = inbox_window();
    let defaults = Defaults::new(window.clone());
    let router = Router::new(&defaults);
    let login = StepAssembly::new(
        ModelFinder::<Login, ()>::with_options(
            &defaults,
            SearchOptions::FULL_STACK,
            StartingPoint::Root,
        ),
        ModelFactory::<Login, ()>::new(),
    )
    .using(PresentModally::new())
    .from(&GeneralStep::current())
    .assemble();

    let logged_in = Rc::new(Cell::new(false));
    let check = logged_in.clone();
    let nested = router.clone();
    let gate = InlineInterceptor::new(move |_: &u32, completion| {
        if check.get() {
            completion.succeed();
            return;
        }
        nested.navigate_to(&login, (), false, move |shown| {
            assert_eq!(shown, Ok(()));
            completion.fail(RoutingError::generic("login required"));
        });
    });
    let thread = StepAssembly::new(
        ContextFinder::<Thread>::new(&defaults),
        ModelFactory::<Thread, u32>::new(),
    )
    .adding_interceptor(gate)
    .adding_context_task(set_thread_id())
    .using(Embed::push(&defaults))
    .from(&GeneralStep::root())
    .assemble();

    let outcome = Outcome::default();
    router.navigate_to(&thread, 4, false, outcome.callback());
    assert_eq!(
        outcome.single(),
        Some(Err(RoutingError::generic("login required")))
    );
    let sheet = window.hierarchy().presented(nav);
    assert!(sheet.is_some_and(|s| window.hierarchy().model::<Login>(s).is_some()));
    assert_eq!(window.hierarchy().children(nav).len(), 1);

    logged_in.set(true);
    {
        let mut h = window.hierarchy_mut();
        h.dismiss(nav);
    }
    let outcome = Outcome::default();
    router.navigate_to(&thread, 4, false, outcome.callback());
    assert_eq!(outcome.single(), Some(Ok(())));
    assert_eq!(window.hierarchy().children(nav).len(), 2);
}

/// Stack adapter that counts reveal requests.
struct CountingStack(Rc<Cell<usize>>);

impl ContainerAdapter for CountingStack {
    fn visible_children(&self, hierarchy: &Hierarchy, container: ScreenId) -> Vec<ScreenId> {
        StackAdapter.visible_children(hierarchy, container)
    }

    fn make_visible(
        &self,
        window: &Window,
        container: ScreenId,
        child: ScreenId,
        animated: bool,
        completion: Completion,
    ) {
        self.0.set(self.0.get() + 1);
        StackAdapter.make_visible(window, container, child, animated, completion);
    }
}

#[test]
fn visible_screens_are_not_revealed_again() {
    let (window, nav, inbox) = inbox_window();
    let reveals = Rc::new(Cell::new(0));
    let mut locator = DefaultContainerAdapterLocator::new();
    locator.register(ContainerKind::STACK, CountingStack(reveals.clone()));
    let defaults = Defaults::builder(window.clone()).locator(locator).build();
    let router = Router::new(&defaults);

    let outcome = Outcome::default();
    router.navigate_to(&thread_step(&defaults, &GeneralStep::root()), 1, false, outcome.callback());
    assert_eq!(outcome.single(), Some(Ok(())));
    assert_eq!(reveals.get(), 0);
    assert_eq!(window.hierarchy().children(nav).len(), 2);

    let outcome = Outcome::default();
    router.navigate_to(&inbox_anywhere(&defaults), 0, false, outcome.callback());
    assert_eq!(outcome.single(), Some(Ok(())));
    assert_eq!(reveals.get(), 1);
    assert_eq!(window.hierarchy().children(nav), [inbox]);
}

#[derive(Default)]
struct MailStack;

#[test]
fn presentation_from_another_tab_is_dismissed() {
    let window = Window::new();
    let (tabs, mail, feed, modal) = {
        let mut h = window.hierarchy_mut();
        let tabs = h.insert(Screen::container(ContainerKind::TABS, ()));
        let feed_stack = h.insert(Screen::container(ContainerKind::STACK, ()));
        let mail = h.insert(Screen::container(ContainerKind::STACK, MailStack));
        let feed = h.insert(Screen::new(()));
        let inbox = h.insert(Screen::new(Inbox));
        let modal = h.insert(Screen::new(Login));
        h.set_root(tabs).unwrap();
        h.set_children(tabs, vec![feed_stack, mail]).unwrap();
        h.set_children(feed_stack, vec![feed]).unwrap();
        h.set_children(mail, vec![inbox]).unwrap();
        h.select(tabs, feed_stack).unwrap();
        h.present(feed, modal).unwrap();
        (tabs, mail, feed, modal)
    };
    let defaults = Defaults::new(window.clone());
    let mail_step = StepAssembly::finder_only(ModelFinder::<MailStack, u32>::with_options(
        &defaults,
        SearchOptions::FULL_STACK,
        StartingPoint::Root,
    ))
    .from(&GeneralStep::root())
    .assemble();
    let thread = thread_step(&defaults, &mail_step);

    let outcome = Outcome::default();
    Router::new(&defaults).navigate_to(&thread, 9, true, outcome.callback());
    window.run_until_idle();
    assert_eq!(outcome.single(), Some(Ok(())));

    let h = window.hierarchy();
    assert!(!h.is_alive(modal));
    assert_eq!(h.presented(feed), None);
    assert_eq!(h.selected(tabs), Some(mail));
    assert_eq!(h.topmost(), Some(tabs));
    let top = h.children(mail)[1];
    assert_eq!(h.model::<Thread>(top).map(|t| t.id), Some(9));
}

#[test]
fn later_attach_failure_keeps_earlier_attachments() {
    let (window, nav, inbox) = inbox_window();
    let blocker = {
        let mut h = window.hierarchy_mut();
        let blocker = h.insert(Screen::new(()));
        h.present(nav, blocker).unwrap();
        blocker
    };
    let defaults = Defaults::new(window.clone());
    let thread = thread_step(&defaults, &GeneralStep::root());
    let login = StepAssembly::new(NilFinder::new(), ModelFactory::<Login, u32>::new())
        .using(PresentModally::starting_at(PresentationStart::TopmostParent))
        .from(&thread)
        .assemble();

    let before = window.hierarchy().len();
    let outcome = Outcome::default();
    Router::new(&defaults).navigate_to(&login, 6, false, outcome.callback());
    assert!(matches!(outcome.single(), Some(Err(e)) if e.is_composition_failed()));

    // Nothing is rolled back: the thread stays pushed, only the login sheet is dropped.
    let h = window.hierarchy();
    assert_eq!(h.len(), before + 1);
    let children = h.children(nav);
    assert_eq!(children.len(), 2);
    assert_eq!(children[0], inbox);
    assert_eq!(h.model::<Thread>(children[1]).map(|t| t.id), Some(6));
    assert_eq!(h.presented(nav), Some(blocker));
    assert!(h.descendants(nav).all(|id| h.model::<Login>(id).is_none()));
}

#[derive(Default)]
struct Draft {
    unsaved: bool,
}

impl CanBeDismissed for Draft {
    fn can_be_dismissed(&self) -> bool {
        !self.unsaved
    }
}

#[test]
fn unsaved_draft_blocks_navigation_until_saved() {
    let (window, nav, inbox) = inbox_window();
    let draft = {
        let mut h = window.hierarchy_mut();
        let draft = h.insert(Screen::guarded(Draft { unsaved: true }));
        h.present(nav, draft).unwrap();
        draft
    };
    let defaults = Defaults::new(window.clone());
    let built = Rc::new(Cell::new(0));
    let thread = StepAssembly::new(NilFinder::new(), counting::<Thread>(&built))
        .using(Embed::push(&defaults))
        .from(&GeneralStep::root())
        .assemble();
    let router = Router::new(&defaults);

    let revision = window.hierarchy().revision();
    let outcome = Outcome::default();
    router.navigate_to(&thread, 1, true, outcome.callback());
    window.run_until_idle();
    assert!(matches!(outcome.single(), Some(Err(e)) if e.is_composition_failed()));
    assert_eq!(built.get(), 0);
    assert_eq!(window.hierarchy().revision(), revision);
    assert_eq!(window.hierarchy().presented(nav), Some(draft));

    window
        .hierarchy_mut()
        .model_mut::<Draft>(draft)
        .unwrap()
        .unsaved = false;
    let outcome = Outcome::default();
    router.navigate_to(&thread, 1, true, outcome.callback());
    window.run_until_idle();
    assert_eq!(outcome.single(), Some(Ok(())));
    assert_eq!(built.get(), 1);
    assert!(!window.hierarchy().is_alive(draft));
    assert_eq!(window.hierarchy().children(nav)[0], inbox);
    assert_eq!(window.hierarchy().children(nav).len(), 2);
}

#[test]
fn guarded_factory_screens_are_asked_too() {
    let (window, nav, inbox) = inbox_window();
    let defaults = Defaults::new(window.clone());
    let draft = StepAssembly::new(
        ModelFinder::<Draft, u32>::new(&defaults),
        ModelFactory::<Draft, u32>::new()
            .configured(|draft, _| draft.unsaved = true)
            .guarded(),
    )
    .using(Embed::push(&defaults))
    .from(&GeneralStep::root())
    .assemble();
    let back_to_inbox = inbox_anywhere(&defaults);
    let router = Router::new(&defaults);

    let outcome = Outcome::default();
    router.navigate_to(&draft, 0, false, outcome.callback());
    assert_eq!(outcome.single(), Some(Ok(())));
    let pushed = window.hierarchy().children(nav)[1];
    assert!(!window.hierarchy().can_be_dismissed(pushed));

    let outcome = Outcome::default();
    router.navigate_to(&back_to_inbox, 0, false, outcome.callback());
    assert!(matches!(outcome.single(), Some(Err(e)) if e.is_composition_failed()));
    assert_eq!(window.hierarchy().children(nav), [inbox, pushed]);
}

