// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Waypoint Router: declarative navigation over a live screen hierarchy.
//!
//! ## Overview
//!
//! A destination is composed once, as a chain of steps from an anchor (the root, the current
//! screen, or a custom finder) to the screen you want. Each step says how to *find* an existing
//! screen, how to *build* one if none exists, and how to *attach* what it built. Navigating to a
//! destination reuses the deepest screen that already exists and builds only what is missing.
//!
//! The router does not render anything. It mutates a [`waypoint_hierarchy::Hierarchy`] owned by a
//! [`Window`](crate::window::Window), and animated changes complete through the window's main
//! queue.
//!
//! ## Pieces
//!
//! - [`finders`]: search the hierarchy, usually through a [`StackIterator`](crate::iterator::StackIterator).
//! - [`factories`]: build screens and containers, integrating postponed children.
//! - [`actions`]: attach built screens ([`ReplaceRoot`](crate::actions::ReplaceRoot),
//!   [`PresentModally`](crate::actions::PresentModally), [`Embed`](crate::actions::Embed),
//!   [`NoOp`](crate::actions::NoOp)).
//! - [`tasks`]: interceptors that gate a navigation, context tasks that configure screens, and
//!   post tasks that run at the end.
//! - [`adapters`]: per container kind policy for which children are visible.
//! - [`step`]: builders that compose steps into destinations.
//! - [`router`]: the [`Router`](crate::router::Router) that drives a navigation.
//! - [`config`]: [`Defaults`](crate::config::Defaults) and the configure-once guard.
//! - [`dismissal`]: dismissal methods stored on screen models.
//!
//! ## Failures
//!
//! Every navigation reports exactly one [`RoutingResult`](crate::types::RoutingResult).
//! Problems found before the hierarchy is touched (a context of the wrong type, a failing
//! `prepare`, an interceptor veto) leave it unchanged. Later failures stop the navigation where
//! it is; nothing already attached is rolled back.
//!
//! ## Example
//!
//! ```
//! use waypoint_hierarchy::{ContainerKind, Screen};
//! use waypoint_router::actions::Embed;
//! use waypoint_router::config::Defaults;
//! use waypoint_router::factories::ModelFactory;
//! use waypoint_router::finders::ModelFinder;
//! use waypoint_router::router::Router;
//! use waypoint_router::step::{GeneralStep, StepAssembly};
//! use waypoint_router::window::Window;
//!
//! #[derive(Default)]
//! struct Article { id: u32 }
//!
//! let window = Window::new();
//! {
//!     let mut h = window.hierarchy_mut();
//!     let nav = h.insert(Screen::container(ContainerKind::STACK, ()));
//!     h.set_root(nav).unwrap();
//! }
//! let defaults = Defaults::new(window.clone());
//!
//! let article = StepAssembly::new(
//!     ModelFinder::<Article, u32>::new(&defaults),
//!     ModelFactory::<Article, u32>::new().configured(|a, id| a.id = *id),
//! )
//! .using(Embed::push(&defaults))
//! .from(&GeneralStep::root())
//! .assemble();
//!
//! let router = Router::new(&defaults);
//! router.navigate(&article.destination(7), false, |result| assert_eq!(result, Ok(())));
//!
//! let h = window.hierarchy();
//! let nav = h.root().unwrap();
//! assert_eq!(h.model::<Article>(h.children(nav)[0]).map(|a| a.id), Some(7));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod actions;
pub mod adapters;
pub mod config;
pub mod dismissal;
pub mod factories;
pub mod finders;
pub mod iterator;
pub mod presentation;
pub mod router;
pub mod step;
pub mod tasks;
pub mod types;
pub mod window;

mod erased;

pub use router::{NavigationState, Router};
pub use step::{Destination, DestinationStep};
pub use types::{Completion, RoutingError, RoutingResult};
pub use window::Window;
