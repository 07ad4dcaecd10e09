// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Login gate.
//!
//! An interceptor guards the account screen. While signed out it presents a login sheet through
//! a nested navigation and vetoes the first attempt. Once signed in, the same destination goes
//! through, and a switch decides from the context whether the account is pushed or presented.
//!
//! Run:
//! - `cargo run -p waypoint_demos --example login_gate`

use std::cell::Cell;
use std::rc::Rc;

use tracing_subscriber::EnvFilter;
use waypoint_hierarchy::{ContainerKind, Hierarchy, Screen, ScreenId};
use waypoint_router::actions::{Embed, PresentModally};
use waypoint_router::config::Defaults;
use waypoint_router::factories::ModelFactory;
use waypoint_router::finders::{ContextChecking, ContextFinder, ModelFinder};
use waypoint_router::iterator::{DefaultStackIterator, SearchOptions, StartingPoint};
use waypoint_router::presentation::PresentationHandler;
use waypoint_router::step::{GeneralStep, StepAssembly, SwitchAssembly};
use waypoint_router::tasks::{InlineContextTask, InlineInterceptor};
use waypoint_router::types::{Completion, RoutingError};
use waypoint_router::{DestinationStep, Router, RoutingResult, Window};

#[derive(Default)]
struct Home;

#[derive(Default)]
struct Login;

#[derive(Default)]
struct Account {
    user: String,
    visits: u32,
}

struct Request {
    user: &'static str,
    modal: bool,
}

impl ContextChecking for Account {
    type Context = Request;

    fn is_target(&self, request: &Request) -> bool {
        self.user == request.user
    }
}

fn print_node(h: &Hierarchy, id: ScreenId, depth: usize) {
    let name = match h.model::<Account>(id) {
        Some(account) => format!("Account({}, visits: {})", account.user, account.visits),
        None => h.describe(id).to_string(),
    };
    println!("{:indent$}- {name}", "", indent = depth * 2);
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
    if let Some(root) = h.root() {
        print_node(&h, root, 0);
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
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("waypoint=info")),
        )
        .init();

    let window = Window::new();
    {
        let mut h = window.hierarchy_mut();
        let nav = h.insert(Screen::container(ContainerKind::STACK, ()).with_label("Nav"));
        let home = h.insert(Screen::new(Home));
        h.set_root(nav).expect("fresh screen");
        h.set_children(nav, vec![home]).expect("fresh screens");
    }
    let defaults = Defaults::new(window.clone());
    let router = Router::new(&defaults);
    let signed_in = Rc::new(Cell::new(false));

    let login = StepAssembly::new(
        ModelFinder::<Login, ()>::new(&defaults),
        ModelFactory::<Login, ()>::new(),
    )
    .using(PresentModally::new())
    .from(&GeneralStep::current())
    .assemble();

    let gate = {
        let signed_in = signed_in.clone();
        let router = router.clone();
        move || {
            let signed_in = signed_in.clone();
            let router = router.clone();
            let login = login.clone();
            InlineInterceptor::new(move |request: &Request, completion: Completion| {
                if signed_in.get() {
                    completion.succeed();
                    return;
                }
                println!("{} is signed out, showing login first", request.user);
                router.navigate_to(&login, (), true, move |shown| {
                    completion.fail(RoutingError::generic(match shown {
                        Ok(()) => "sign-in required".to_string(),
                        Err(err) => format!("sign-in required, and login failed: {err}"),
                    }));
                });
            })
        }
    };

    // Accounts are found anywhere, including under other presentations.
    let everywhere = Rc::new(DefaultStackIterator::new(
        SearchOptions::FULL_STACK,
        StartingPoint::Root,
        defaults.locator().clone(),
    ));
    let account = |action_is_modal: bool| -> DestinationStep<Request> {
        let assembly = StepAssembly::new(
            ContextFinder::<Account>::with_iterator(everywhere.clone()),
            ModelFactory::<Account, Request>::new()
                .configured(|account, request| account.user = request.user.to_string()),
        )
        .adding_interceptor(gate())
        .adding_context_task(InlineContextTask::new(|account: &mut Account, _: &Request| {
            account.visits += 1;
        }));
        if action_is_modal {
            assembly
                .using(PresentModally::new())
                .from(&GeneralStep::current())
                .assemble()
        } else {
            assembly
                .using(Embed::push(&defaults))
                .from(&GeneralStep::root())
                .assemble()
        }
    };
    let modal_account = account(true);
    let destination = SwitchAssembly::new()
        .add_case(move |request: &Request| request.modal.then(|| modal_account.clone()))
        .assemble(account(false));

    let ada = Request {
        user: "ada",
        modal: false,
    };
    router.navigate_to(&destination, ada, true, report("open ada's account"));
    window.run_until_idle();
    print_tree("Vetoed, login presented instead", &window);

    signed_in.set(true);
    let root = window.hierarchy().root();
    if let Some(root) = root {
        PresentationHandler::new(&defaults).dismiss_presented(
            &window,
            root,
            true,
            Completion::new(report("dismiss login")),
        );
        window.run_until_idle();
    }

    let ada = Request {
        user: "ada",
        modal: false,
    };
    router.navigate_to(&destination, ada, true, report("open ada's account"));
    window.run_until_idle();
    print_tree("Signed in, account pushed", &window);

    let grace = Request {
        user: "grace",
        modal: true,
    };
    router.navigate_to(&destination, grace, true, report("open grace's account"));
    window.run_until_idle();
    print_tree("Second account presented on top", &window);

    let ada = Request {
        user: "ada",
        modal: true,
    };
    router.navigate_to(&destination, ada, false, report("back to ada"));
    print_tree("Ada's account reused, grace's sheet dismissed", &window);
}
