//! Transition plans and the executor boundary.
//!
//! Once a navigation has been resolved, intercepted and built, the router
//! describes the required hierarchy mutation as a [`TransitionPlan`] and hands
//! it to a [`TransitionExecutor`]. The executor is the only component allowed to
//! mutate the live hierarchy.
//!
//! A plan is either a **reuse** (the target already exists; make it the
//! visible screen) or an **attach** (an optional existing anchor plus the
//! freshly built screens, ancestors first, each with the [`Action`] that
//! attaches it).

use crate::error::TransitionError;
use crate::hierarchy::{ScreenHandle, StackSnapshot};
use async_trait::async_trait;
use std::sync::Arc;

/// How a newly built screen is attached to the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Action {
    /// Push onto the current presentation layer.
    #[default]
    Push,
    /// Present modally, starting a new layer.
    Present,
    /// Replace the whole hierarchy with this screen.
    ReplaceRoot,
}

/// A built screen waiting to be attached.
#[derive(Debug, Clone)]
pub struct PlannedScreen {
    pub screen: ScreenHandle,
    pub action: Action,
}

impl PlannedScreen {
    pub fn new(screen: ScreenHandle, action: Action) -> Self {
        Self { screen, action }
    }
}

/// The hierarchy mutation a navigation resolved to.
#[derive(Debug, Clone)]
pub struct TransitionPlan {
    anchor: Option<ScreenHandle>,
    screens: Vec<PlannedScreen>,
    target: ScreenHandle,
}

impl TransitionPlan {
    /// Make an existing screen the visible one.
    pub fn reuse(screen: ScreenHandle) -> Self {
        Self {
            anchor: Some(screen.clone()),
            screens: Vec::new(),
            target: screen,
        }
    }

    /// Attach `screens` (ancestors first) above `anchor`.
    ///
    /// With no anchor the screens attach to the current top of the hierarchy.
    /// Returns `None` when `screens` is empty.
    pub fn attach(anchor: Option<ScreenHandle>, screens: Vec<PlannedScreen>) -> Option<Self> {
        let target = screens.last()?.screen.clone();
        Some(Self {
            anchor,
            screens,
            target,
        })
    }

    pub fn is_reuse(&self) -> bool {
        self.screens.is_empty()
    }

    /// Existing screen the plan is rooted at.
    pub fn anchor(&self) -> Option<&ScreenHandle> {
        self.anchor.as_ref()
    }

    /// Newly built screens, ancestors first.
    pub fn screens(&self) -> &[PlannedScreen] {
        &self.screens
    }

    /// The screen that ends up displayed.
    pub fn target(&self) -> &ScreenHandle {
        &self.target
    }
}

/// Performs the actual hierarchy mutation.
///
/// `hierarchy` is the snapshot the plan was resolved against; implementations
/// use it to detect that the live hierarchy moved underneath the plan. An
/// implementation must either apply the whole plan or leave the hierarchy
/// untouched and return an error.
#[async_trait]
pub trait TransitionExecutor: Send + Sync {
    async fn execute(
        &self,
        plan: &TransitionPlan,
        animated: bool,
        hierarchy: &StackSnapshot,
    ) -> Result<(), TransitionError>;
}

#[async_trait]
impl<E: TransitionExecutor + ?Sized> TransitionExecutor for Arc<E> {
    async fn execute(
        &self,
        plan: &TransitionPlan,
        animated: bool,
        hierarchy: &StackSnapshot,
    ) -> Result<(), TransitionError> {
        (**self).execute(plan, animated, hierarchy).await
    }
}
