// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dismissal methods stored on screen models.
//!
//! A model that implements [`Dismissible`] keeps an optional [`Dismissal`] in its own state.
//! Adding a [`DismissalWiring`] post task to the step that builds the screen fills it in once
//! the navigation is done, so the screen can later undo the way it was shown with
//! [`dismiss_screen`] without knowing how it got there.

use alloc::format;
use alloc::rc::Rc;
use core::marker::PhantomData;

use waypoint_hierarchy::{ContainerKind, ScreenId};

use crate::adapters::ContainerAdapterLocator;
use crate::config::Defaults;
use crate::presentation::dismiss_presented;
use crate::tasks::PostTask;
use crate::types::{Completion, RoutingError, RoutingResult};
use crate::window::Window;

type DismissFn<D> = dyn Fn(&Window, ScreenId, D, bool, Completion);

/// A way to dismiss one screen.
pub struct Dismissal<D> {
    method: Rc<DismissFn<D>>,
}

impl<D> Clone for Dismissal<D> {
    fn clone(&self) -> Self {
        Self {
            method: self.method.clone(),
        }
    }
}

impl<D> core::fmt::Debug for Dismissal<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dismissal").finish_non_exhaustive()
    }
}

impl<D: 'static> Dismissal<D> {
    /// Wrap `method`.
    pub fn new(method: impl Fn(&Window, ScreenId, D, bool, Completion) + 'static) -> Self {
        Self {
            method: Rc::new(method),
        }
    }

    /// Dismiss the presentation that holds the screen.
    pub fn dismissing_presentation() -> Self {
        Self::new(|window, screen, _, animated, completion| {
            let presenter = {
                let h = window.hierarchy();
                h.presentation_root(screen)
                    .and_then(|root| h.presenting(root))
                    .ok_or_else(|| {
                        RoutingError::composition(format!(
                            "{} is not part of a presentation",
                            h.describe(screen)
                        ))
                    })
            };
            match presenter {
                Ok(presenter) => dismiss_presented(window, presenter, animated, completion),
                Err(err) => completion.fail(err),
            }
        })
    }

    /// Pop the screen, and everything above it, from the nearest stack holding it.
    pub fn popping(defaults: &Defaults) -> Self {
        let locator = defaults.locator().clone();
        Self::new(move |window, screen, _, animated, completion| {
            pop(&*locator, window, screen, animated, completion);
        })
    }

    /// Run the method for `screen`.
    pub fn dismiss(
        &self,
        window: &Window,
        screen: ScreenId,
        context: D,
        animated: bool,
        completion: Completion,
    ) {
        (self.method)(window, screen, context, animated, completion);
    }
}

fn pop(
    locator: &dyn ContainerAdapterLocator,
    window: &Window,
    screen: ScreenId,
    animated: bool,
    completion: Completion,
) {
    let planned = {
        let h = window.hierarchy();
        let found = core::iter::once(screen)
            .chain(h.ancestors(screen))
            .find_map(|child| {
                let stack = h.parent(child)?;
                h.container_kind(stack)
                    .filter(|kind| kind.is_kind_of(ContainerKind::STACK))
                    .map(|kind| (stack, kind, child))
            });
        match found {
            None => Err(RoutingError::composition(format!(
                "{} is not in a stack",
                h.describe(screen)
            ))),
            Some((stack, kind, child)) => locator.get_adapter(kind).and_then(|adapter| {
                let children = adapter.children(&h, stack);
                match children.iter().position(|&c| c == child) {
                    Some(0) | None => Err(RoutingError::composition(format!(
                        "{} is at the bottom of its stack",
                        h.describe(child)
                    ))),
                    Some(index) => Ok((adapter, stack, children[..index].to_vec())),
                }
            }),
        }
    };
    match planned {
        Ok((adapter, stack, children)) => {
            adapter.set_children(window, stack, children, animated, completion);
        }
        Err(err) => completion.fail(err),
    }
}

/// A model that stores its own dismissal method.
pub trait Dismissible: 'static {
    /// What the dismissal needs to know, `()` if nothing.
    type DismissalContext: 'static;

    /// The stored method, if one was set.
    fn dismissal(&self) -> Option<&Dismissal<Self::DismissalContext>>;

    /// Store `dismissal`.
    fn set_dismissal(&mut self, dismissal: Dismissal<Self::DismissalContext>);
}

/// Post task that stores a dismissal method on the step's screen.
pub struct DismissalWiring<M: Dismissible, C> {
    dismissal: Dismissal<M::DismissalContext>,
    _context: PhantomData<fn(&C)>,
}

impl<M: Dismissible, C: 'static> DismissalWiring<M, C> {
    /// Store `dismissal`.
    pub fn new(dismissal: Dismissal<M::DismissalContext>) -> Self {
        Self {
            dismissal,
            _context: PhantomData,
        }
    }

    /// Store [`Dismissal::dismissing_presentation`].
    pub fn dismissing_presentation() -> Self {
        Self::new(Dismissal::dismissing_presentation())
    }

    /// Store [`Dismissal::popping`].
    pub fn popping(defaults: &Defaults) -> Self {
        Self::new(Dismissal::popping(defaults))
    }
}

impl<M: Dismissible, C> core::fmt::Debug for DismissalWiring<M, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DismissalWiring")
            .field("model", &core::any::type_name::<M>())
            .finish_non_exhaustive()
    }
}

impl<M: Dismissible, C: 'static> PostTask for DismissalWiring<M, C> {
    type Context = C;

    fn perform(&self, window: &Window, screen: ScreenId, _: &C, _: &[ScreenId]) -> RoutingResult {
        let mut h = window.hierarchy_mut();
        let found = h.model_type_name(screen).unwrap_or("<stale screen>");
        let Some(model) = h.model_mut::<M>(screen) else {
            return Err(RoutingError::TypeMismatch {
                expected: core::any::type_name::<M>(),
                found,
            });
        };
        model.set_dismissal(self.dismissal.clone());
        Ok(())
    }
}

/// Dismiss `screen` with the method stored on its `M` model.
///
/// Fails with [`RoutingError::Generic`] if no method was stored.
pub fn dismiss_screen<M: Dismissible>(
    window: &Window,
    screen: ScreenId,
    context: M::DismissalContext,
    animated: bool,
    completion: Completion,
) {
    let dismissal = {
        let h = window.hierarchy();
        match h.model::<M>(screen) {
            Some(model) => model.dismissal().cloned().ok_or_else(|| {
                RoutingError::generic(format!("{} has no dismissal method", h.describe(screen)))
            }),
            None => Err(RoutingError::TypeMismatch {
                expected: core::any::type_name::<M>(),
                found: h.model_type_name(screen).unwrap_or("<stale screen>"),
            }),
        }
    };
    match dismissal {
        Ok(dismissal) => dismissal.dismiss(window, screen, context, animated, completion),
        Err(err) => completion.fail(err),
    }
}
