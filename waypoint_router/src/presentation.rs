// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dismissing presentations and revealing screens.
//!
//! ## Revealing
//!
//! [`PresentationHandler::reveal`] makes a screen the one the user sees. Starting at the
//! screen it walks outward, one link at a time:
//!
//! - every presentation made from the container subtree of the current screen is dismissed,
//!   except the ones the walk came through;
//! - a container parent is asked to show the current screen, but only if its adapter says the
//!   screen is hidden;
//! - a presentation root continues with the screen presenting it.
//!
//! Each change runs to completion before the walk continues.
//! Dismissing a presentation that is already being dismissed fails with
//! [`RoutingError::CompositionFailed`].
//!
//! Before the first change, every screen the walk would pop or dismiss is asked through
//! [`Hierarchy::can_be_dismissed`]. One refusal fails the reveal and nothing is touched.

use alloc::format;
use alloc::rc::Rc;
use alloc::vec::Vec;

use waypoint_hierarchy::{Hierarchy, ScreenFlags, ScreenId};

use crate::adapters::{ContainerAdapter, ContainerAdapterLocator};
use crate::config::Defaults;
use crate::types::{Completion, RoutingError, RoutingResult};
use crate::window::Window;

/// Shared dismissal and reveal logic.
#[derive(Clone)]
pub struct PresentationHandler {
    locator: Rc<dyn ContainerAdapterLocator>,
}

impl PresentationHandler {
    /// Handler using the configured locator.
    pub fn new(defaults: &Defaults) -> Self {
        Self::with_locator(defaults.locator().clone())
    }

    /// Handler using `locator`.
    pub fn with_locator(locator: Rc<dyn ContainerAdapterLocator>) -> Self {
        Self { locator }
    }

    /// Dismiss whatever `presenter` presents. Completes immediately if it presents nothing.
    pub fn dismiss_presented(
        &self,
        window: &Window,
        presenter: ScreenId,
        animated: bool,
        completion: Completion,
    ) {
        dismiss_presented(window, presenter, animated, completion);
    }

    /// Make `screen` visible to the user.
    pub fn reveal(&self, window: &Window, screen: ScreenId, animated: bool, completion: Completion) {
        let path = {
            let h = window.hierarchy();
            check_dismissible(self.locator.as_ref(), &h, screen)
                .map(|()| presentations_on_path(&h, screen))
        };
        match path {
            Ok(path) => reveal_step(
                self.locator.clone(),
                window.clone(),
                screen,
                Rc::new(path),
                animated,
                completion,
            ),
            Err(err) => completion.fail(err),
        }
    }
}

impl core::fmt::Debug for PresentationHandler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PresentationHandler").finish_non_exhaustive()
    }
}

pub(crate) fn dismiss_presented(
    window: &Window,
    presenter: ScreenId,
    animated: bool,
    completion: Completion,
) {
    let presented = window.hierarchy().presented(presenter);
    let Some(presented) = presented else {
        completion.succeed();
        return;
    };
    let flags = window.hierarchy().flags(presented);
    if flags.contains(ScreenFlags::BEING_DISMISSED) {
        let reason = {
            let h = window.hierarchy();
            format!(
                "attempt to dismiss {} while it is being dismissed",
                h.describe(presented)
            )
        };
        completion.fail(RoutingError::composition(reason));
        return;
    }
    if animated {
        window
            .hierarchy_mut()
            .insert_flags(presented, ScreenFlags::BEING_DISMISSED);
        let w = window.clone();
        window.schedule(move || {
            w.hierarchy_mut().dismiss(presenter);
            log::debug!(target: "waypoint::presentation", "dismissed {presented}");
            completion.succeed();
        });
    } else {
        window.hierarchy_mut().dismiss(presenter);
        log::debug!(target: "waypoint::presentation", "dismissed {presented}");
        completion.succeed();
    }
}

/// Presentation roots between `screen` and the window root.
fn presentations_on_path(h: &Hierarchy, screen: ScreenId) -> Vec<ScreenId> {
    let mut path = Vec::new();
    let mut next = h.presentation_root(screen);
    while let Some(root) = next {
        let Some(presenter) = h.presenting(root) else {
            break;
        };
        path.push(root);
        next = h.presentation_root(presenter);
    }
    path
}

/// Screens in the container subtree of `context` presenting something off `path`.
fn covering_presenters<'a>(
    h: &'a Hierarchy,
    context: ScreenId,
    path: &'a [ScreenId],
) -> impl Iterator<Item = ScreenId> + 'a {
    h.descendants(context)
        .filter(move |&id| h.presented(id).is_some_and(|presented| !path.contains(&presented)))
}

/// First screen in the subtrees of `doomed`, presentations included, that refuses to go.
fn first_refusing(h: &Hierarchy, mut doomed: Vec<ScreenId>) -> Option<ScreenId> {
    while let Some(top) = doomed.pop() {
        for id in h.descendants(top) {
            if !h.can_be_dismissed(id) {
                return Some(id);
            }
            doomed.extend(h.presented(id));
        }
    }
    None
}

fn adapter_of(
    locator: &dyn ContainerAdapterLocator,
    h: &Hierarchy,
    container: ScreenId,
) -> Result<Rc<dyn ContainerAdapter>, RoutingError> {
    let kind = h.container_kind(container).ok_or_else(|| {
        RoutingError::composition(format!("{} is not a container", h.describe(container)))
    })?;
    locator.get_adapter(kind)
}

/// Fails if revealing `screen` would pop or dismiss a screen that refuses to go.
pub(crate) fn check_dismissible(
    locator: &dyn ContainerAdapterLocator,
    h: &Hierarchy,
    screen: ScreenId,
) -> RoutingResult {
    let path = presentations_on_path(h, screen);
    let mut current = screen;
    loop {
        let mut doomed: Vec<ScreenId> = covering_presenters(h, current, &path)
            .filter_map(|id| h.presented(id))
            .collect();
        let next = match h.parent(current) {
            Some(container) => {
                let adapter = adapter_of(locator, h, container)?;
                if !adapter.is_visible(h, container, current) {
                    doomed.extend(adapter.removed_by_make_visible(h, container, current));
                }
                Some(container)
            }
            None => h.presenting(current),
        };
        if let Some(refusing) = first_refusing(h, doomed) {
            log::debug!(
                target: "waypoint::presentation",
                "{} refuses to be dismissed",
                h.describe(refusing)
            );
            return Err(RoutingError::composition(format!(
                "{} cannot be dismissed",
                h.describe(refusing)
            )));
        }
        match next {
            Some(next) => current = next,
            None => return Ok(()),
        }
    }
}

enum Outward {
    Container {
        container: ScreenId,
        adapter: Rc<dyn ContainerAdapter>,
        visible: bool,
    },
    Presenter(ScreenId),
    Done,
}

fn reveal_step(
    locator: Rc<dyn ContainerAdapterLocator>,
    window: Window,
    current: ScreenId,
    path: Rc<Vec<ScreenId>>,
    animated: bool,
    completion: Completion,
) {
    let covering = covering_presenters(&window.hierarchy(), current, &path).next();
    if let Some(presenter) = covering {
        let w = window.clone();
        dismiss_presented(
            &window,
            presenter,
            animated,
            Completion::new(move |result| match result {
                Ok(()) => reveal_step(locator, w, current, path, animated, completion),
                Err(err) => completion.fail(err),
            }),
        );
        return;
    }

    let outward = {
        let h = window.hierarchy();
        if let Some(container) = h.parent(current) {
            adapter_of(locator.as_ref(), &h, container).map(|adapter| Outward::Container {
                container,
                visible: adapter.is_visible(&h, container, current),
                adapter,
            })
        } else if let Some(presenter) = h.presenting(current) {
            Ok(Outward::Presenter(presenter))
        } else {
            Ok(Outward::Done)
        }
    };

    match outward {
        Err(err) => completion.fail(err),
        Ok(Outward::Done) => completion.succeed(),
        Ok(Outward::Presenter(presenter)) => {
            reveal_step(locator, window, presenter, path, animated, completion);
        }
        Ok(Outward::Container {
            container,
            visible: true,
            ..
        }) => {
            log::trace!(
                target: "waypoint::presentation",
                "{current} already visible in {container}"
            );
            reveal_step(locator, window, container, path, animated, completion);
        }
        Ok(Outward::Container {
            container, adapter, ..
        }) => {
            let w = window.clone();
            adapter.make_visible(
                &window,
                container,
                current,
                animated,
                Completion::new(move |result| match result {
                    Ok(()) => {
                        log::debug!(
                            target: "waypoint::presentation",
                            "made {current} visible in {container}"
                        );
                        reveal_step(locator, w, container, path, animated, completion);
                    }
                    Err(err) => completion.fail(err),
                }),
            );
        }
    }
}
