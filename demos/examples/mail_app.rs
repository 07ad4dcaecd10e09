// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mail app walkthrough.
//!
//! Builds a tab bar from an empty window, opens a thread inside the mail tab, switches to the
//! settings tab, navigates back to the same thread (which is reused, not rebuilt), presents a
//! compose sheet and dismisses it through the method stored on its model.
//!
//! Run:
//! - `cargo run -p waypoint_demos --example mail_app`
//! - `RUST_LOG=waypoint=trace cargo run -p waypoint_demos --example mail_app`

use std::rc::Rc;

use tracing_subscriber::EnvFilter;
use waypoint_hierarchy::{ContainerKind, Hierarchy, ScreenId};
use waypoint_router::actions::{Embed, Placement, PresentModally, PresentationStart};
use waypoint_router::config::{Configuration, Defaults};
use waypoint_router::dismissal::{Dismissal, DismissalWiring, Dismissible, dismiss_screen};
use waypoint_router::factories::{ContainerAssembly, ContainerModelFactory, ModelFactory};
use waypoint_router::finders::{ContextChecking, ContextFinder, ModelFinder, NilFinder};
use waypoint_router::iterator::{DefaultStackIterator, SearchOptions, StackIterator, StartingPoint};
use waypoint_router::step::StepAssembly;
use waypoint_router::types::Completion;
use waypoint_router::{Router, RoutingResult, Window};

#[derive(Default)]
struct TabBar;

#[derive(Default)]
struct MailStack;

#[derive(Default)]
struct Mailbox;

#[derive(Default)]
struct Settings;

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
struct Compose {
    dismissal: Option<Dismissal<()>>,
}

impl Dismissible for Compose {
    type DismissalContext = ();

    fn dismissal(&self) -> Option<&Dismissal<()>> {
        self.dismissal.as_ref()
    }

    fn set_dismissal(&mut self, dismissal: Dismissal<()>) {
        self.dismissal = Some(dismissal);
    }
}

fn name(h: &Hierarchy, id: ScreenId) -> String {
    if let Some(thread) = h.model::<Thread>(id) {
        return format!("Thread #{}", thread.id);
    }
    h.describe(id).to_string()
}

fn print_node(h: &Hierarchy, id: ScreenId, depth: usize) {
    println!("{:indent$}- {}", "", name(h, id), indent = depth * 2);
    for &child in h.children(id) {
        print_node(h, child, depth + 1);
    }
    if let Some(presented) = h.presented(id) {
        println!("{:indent$}  presents:", "", indent = depth * 2);
        print_node(h, presented, depth + 2);
    }
}

fn print_tree(title: &str, window: &Window) {
    println!("== {title} ==");
    let h = window.hierarchy();
    match h.root() {
        Some(root) => print_node(&h, root, 0),
        None => println!("(empty window)"),
    }
    println!();
}

fn report(what: &'static str) -> impl FnOnce(RoutingResult) + 'static {
    move |result| match result {
        Ok(()) => println!("{what}: ok"),
        Err(err) => println!("{what}: failed: {err}"),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("waypoint=debug")),
        )
        .init();

    let window = Window::new();
    let configuration = Configuration::new();
    let defaults = configuration
        .configure(Defaults::new(window.clone()))
        .expect("fresh configuration");

    // Every screen of the app is findable, whatever is presented on top of it.
    let everywhere: Rc<dyn StackIterator> = Rc::new(DefaultStackIterator::new(
        SearchOptions::FULL_STACK,
        StartingPoint::Root,
        defaults.locator().clone(),
    ));

    // With no root yet, the first step's screen becomes the root.
    let tabs = StepAssembly::container(
        ModelFinder::<TabBar, u32>::with_iterator(everywhere.clone()),
        ContainerAssembly::new(ContainerModelFactory::<TabBar, u32>::tabs().labeled("TabBar"))
            .with(
                ModelFactory::<Settings, u32>::new().labeled("Settings"),
                Embed::add_tab(&defaults),
            ),
    )
    .assemble();

    let mail_stack = StepAssembly::container(
        ModelFinder::<MailStack, u32>::with_iterator(everywhere.clone()),
        ContainerModelFactory::<MailStack, u32>::stack().labeled("MailStack"),
    )
    .using(Embed::new(ContainerKind::TABS, Placement::Insert(0), &defaults))
    .from(&tabs)
    .assemble();

    let mailbox = StepAssembly::new(
        ModelFinder::<Mailbox, u32>::with_iterator(everywhere.clone()),
        ModelFactory::<Mailbox, u32>::new().labeled("Mailbox"),
    )
    .using(Embed::push(&defaults))
    .from(&mail_stack)
    .assemble();

    let thread = StepAssembly::new(
        ContextFinder::<Thread>::with_iterator(everywhere.clone()),
        ModelFactory::<Thread, u32>::new().configured(|thread, id| thread.id = *id),
    )
    .using(Embed::push(&defaults))
    .from(&mailbox)
    .assemble();

    let settings = StepAssembly::finder_only(ModelFinder::<Settings, u32>::with_iterator(
        everywhere.clone(),
    ))
    .from(&tabs)
    .assemble();

    let compose = StepAssembly::new(
        NilFinder::<u32>::new(),
        ModelFactory::<Compose, u32>::new().labeled("Compose"),
    )
    .adding_post_task(DismissalWiring::<Compose, u32>::dismissing_presentation())
    .using(PresentModally::starting_at(PresentationStart::TopmostParent))
    .from(&thread)
    .assemble();

    let router = Router::new(&defaults).on_transition(|state| log::trace!("state: {state:?}"));
    print_tree("Empty window", &window);

    router.navigate(&thread.destination(42), true, report("open thread 42"));
    window.run_until_idle();
    print_tree("Thread 42 built from nothing", &window);

    router.navigate(&settings.destination(0), true, report("show settings"));
    window.run_until_idle();
    {
        let h = window.hierarchy();
        let selected = h.root().and_then(|root| h.selected(root));
        println!("selected tab: {}\n", selected.map(|tab| name(&h, tab)).unwrap_or_default());
    }

    let before = window.hierarchy().len();
    router.navigate(&thread.destination(42), true, report("reopen thread 42"));
    window.run_until_idle();
    println!(
        "screens before: {before}, after: {} (thread reused, mail tab selected again)",
        window.hierarchy().len()
    );
    println!();

    router.navigate(&compose.destination(42), true, report("compose reply"));
    window.run_until_idle();
    print_tree("Compose sheet over the tab bar", &window);

    let sheet = window.hierarchy().topmost();
    if let Some(sheet) = sheet {
        dismiss_screen::<Compose>(
            &window,
            sheet,
            (),
            true,
            Completion::new(report("dismiss compose")),
        );
        window.run_until_idle();
    }
    print_tree("After dismissing the sheet", &window);
}
