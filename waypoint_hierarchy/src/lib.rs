// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Waypoint Hierarchy: the live screen tree of a window.
//!
//! Waypoint Hierarchy is the persistent, mutable state that navigation operates on.
//!
//! - Represents screens in generational slots addressed by [`ScreenId`].
//! - Models container screens (stacks, tab switchers, split views, and custom kinds) with ordered children and a selected child.
//! - Models modal presentations as a separate link between a presenting screen and the screen it presents.
//! - Carries per-screen transition [`ScreenFlags`] while an animated change is in flight.
//!
//! It does not decide *how* a container shows its children; that policy belongs to container
//! adapters in `waypoint_router`. The hierarchy only stores structure and answers structural queries.
//!
//! ## Where this fits
//!
//! - Screen models: application state, owned by the application and stored here as `Box<dyn Any>`.
//! - Hierarchy: structure of the window (this crate).
//! - Router: finds, builds, and attaches screens by mutating the hierarchy (`waypoint_router`).
//!
//! ## API overview
//!
//! - [`Hierarchy`]: arena managing screens and their links.
//! - [`Screen`]: description of a screen to insert (model, optional [`ContainerKind`], label).
//! - [`ContainerKind`]: container kind with a base lineage, resolved most-specific first.
//! - [`ScreenFlags`]: transition flags (`BEING_PRESENTED`, `BEING_DISMISSED`).
//! - [`HierarchyError`]: rejected structural updates; a rejected update never changes the hierarchy.
//!
//! Key operations:
//! - [`Hierarchy::insert`] → detached [`ScreenId`]
//! - [`Hierarchy::set_root`], [`Hierarchy::set_children`], [`Hierarchy::select`]
//! - [`Hierarchy::present`] / [`Hierarchy::dismiss`]
//! - [`Hierarchy::topmost`], [`Hierarchy::ancestors`], [`Hierarchy::descendants`]
//!
//! ### Minimal usage
//!
//! ```
//! use waypoint_hierarchy::{ContainerKind, Hierarchy, Screen};
//!
//! struct Home;
//! struct Details { id: u32 }
//!
//! let mut h = Hierarchy::new();
//! let nav = h.insert(Screen::container(ContainerKind::STACK, ()).with_label("nav"));
//! let home = h.insert(Screen::new(Home));
//! h.set_root(nav).unwrap();
//! h.set_children(nav, vec![home]).unwrap();
//!
//! // Present a details screen modally from the navigation stack.
//! let details = h.insert(Screen::new(Details { id: 7 }));
//! h.present(nav, details).unwrap();
//!
//! assert_eq!(h.topmost(), Some(details));
//! assert_eq!(h.model::<Details>(details).map(|d| d.id), Some(7));
//! assert_eq!(h.ancestors(home).collect::<Vec<_>>(), vec![nav]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod hierarchy;
mod types;

pub use error::HierarchyError;
pub use hierarchy::{Described, Descendants, Hierarchy};
pub use types::{CanBeDismissed, ContainerKind, Screen, ScreenFlags, ScreenId};
