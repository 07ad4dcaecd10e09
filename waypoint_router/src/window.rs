// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The window a router navigates in.
//!
//! A [`Window`] couples the live [`Hierarchy`] with the main queue: the single execution
//! context on which every mutation and every deferred completion runs.
//! Animated transitions mutate the hierarchy immediately and [`schedule`](Window::schedule)
//! their completion; the host drains the queue with [`run_until_idle`](Window::run_until_idle).
//!
//! Borrows handed out by [`Window::hierarchy`] and [`Window::hierarchy_mut`] must be released
//! before any [`Completion`](crate::types::Completion) is called.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use core::cell::{Ref, RefCell, RefMut};

use waypoint_hierarchy::Hierarchy;

type Task = Box<dyn FnOnce()>;

struct Shared {
    hierarchy: RefCell<Hierarchy>,
    queue: RefCell<VecDeque<Task>>,
}

/// Shared handle to a window's hierarchy and main queue.
///
/// Cloning is cheap and yields a handle to the same window.
#[derive(Clone)]
pub struct Window {
    shared: Rc<Shared>,
}

impl Window {
    /// A window with an empty hierarchy.
    pub fn new() -> Self {
        Self::with_hierarchy(Hierarchy::new())
    }

    /// A window over an existing hierarchy.
    pub fn with_hierarchy(hierarchy: Hierarchy) -> Self {
        Self {
            shared: Rc::new(Shared {
                hierarchy: RefCell::new(hierarchy),
                queue: RefCell::new(VecDeque::new()),
            }),
        }
    }

    /// Read access to the hierarchy.
    ///
    /// # Panics
    ///
    /// Panics if the hierarchy is currently borrowed mutably.
    pub fn hierarchy(&self) -> Ref<'_, Hierarchy> {
        self.shared.hierarchy.borrow()
    }

    /// Write access to the hierarchy.
    ///
    /// # Panics
    ///
    /// Panics if the hierarchy is currently borrowed.
    pub fn hierarchy_mut(&self) -> RefMut<'_, Hierarchy> {
        self.shared.hierarchy.borrow_mut()
    }

    /// Enqueue `task` on the main queue.
    pub fn schedule(&self, task: impl FnOnce() + 'static) {
        self.shared.queue.borrow_mut().push_back(Box::new(task));
    }

    /// Number of tasks waiting on the main queue.
    pub fn pending_tasks(&self) -> usize {
        self.shared.queue.borrow().len()
    }

    /// Run queued tasks, including tasks they enqueue, until the queue is empty.
    ///
    /// Returns how many tasks ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.shared.queue.borrow_mut().pop_front();
            let Some(task) = next else {
                return ran;
            };
            task();
            ran += 1;
        }
    }

    /// Returns true if both handles refer to the same window.
    pub fn same_window(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Window {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let screens = self
            .shared
            .hierarchy
            .try_borrow()
            .map(|h| h.len())
            .ok();
        f.debug_struct("Window")
            .field("screens", &screens)
            .field("pending_tasks", &self.shared.queue.try_borrow().map(|q| q.len()).ok())
            .finish_non_exhaustive()
    }
}

/// Source of the window navigation happens in.
pub trait WindowProvider {
    /// The current window, if one exists.
    fn window(&self) -> Option<Window>;
}

impl WindowProvider for Window {
    fn window(&self) -> Option<Window> {
        Some(self.clone())
    }
}
