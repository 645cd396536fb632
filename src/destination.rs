//! Target specifications: what to show and how to get there.
//!
//! A [`Destination<S, C>`] names the screen type `S` the caller wants and the
//! context type `C` the caller must supply. Internally it is an ordered list
//! of [`Step`]s — ancestor containers first, the target screen last. Each
//! step knows how to *find* an existing screen, how to *build* a new one, and
//! how a built screen is *attached* ([`Action`]).
//!
//! Nothing runs when a destination is built; all work is deferred until a
//! router navigates to it.
//!
//! # Example
//!
//! ```
//! use screen_navigator::{factory_fn, finder_fn, Action, Destination, Screen, ScreenStep, Step};
//! use std::sync::RwLock;
//!
//! #[derive(Debug)]
//! struct NavigationContainer;
//! impl Screen for NavigationContainer {}
//!
//! #[derive(Debug)]
//! struct ColorScreen {
//!     hex: RwLock<String>,
//! }
//! impl Screen for ColorScreen {}
//!
//! let color = ScreenStep::new(factory_fn(|hex: &String| {
//!     Ok(ColorScreen { hex: RwLock::new(hex.clone()) })
//! }))
//! .with_finder(finder_fn(|screen: &ColorScreen, hex: &String| {
//!     *screen.hex.write().unwrap() = hex.clone();
//!     true
//! }));
//!
//! let destination: Destination<ColorScreen, String> = Destination::new(color)
//!     .within(Step::new(factory_fn(|_: &()| Ok(NavigationContainer))).with_action(Action::Present));
//!
//! assert_eq!(destination.steps().len(), 2);
//! assert_eq!(destination.target().label(), "ColorScreen");
//! ```

use crate::error::RoutingError;
use crate::factory::{ErasedFactory, Factory, FactoryBox};
use crate::finder::{ClassFinder, Finder, StackFinder, StackIteratingFinder};
use crate::hierarchy::{short_type_name, Screen, StackIterator};
use crate::interceptor::Interceptor;
use crate::transition::Action;
use std::any::{self, Any};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

// ============================================================================
// Step
// ============================================================================

/// One screen (or container) on the way to a destination.
#[derive(Clone)]
pub struct Step {
    label: &'static str,
    finder: Option<Arc<dyn Finder>>,
    factory: Option<Arc<dyn ErasedFactory>>,
    action: Action,
}

impl Step {
    /// A step that builds its screen with `factory` when nothing matches.
    pub fn new<F: Factory>(factory: F) -> Self {
        Self {
            label: short_type_name(any::type_name::<F::Screen>()),
            finder: None,
            factory: Some(Arc::new(FactoryBox::new(factory))),
            action: Action::default(),
        }
    }

    /// A step that must already exist in the hierarchy.
    pub fn existing<F: StackIteratingFinder>(finder: F) -> Self {
        Self {
            label: short_type_name(any::type_name::<F::Screen>()),
            finder: Some(Arc::new(StackFinder::new(finder))),
            factory: None,
            action: Action::default(),
        }
    }

    /// Look for an existing screen with `finder` before building.
    #[must_use]
    pub fn with_finder<F: StackIteratingFinder>(self, finder: F) -> Self {
        self.with_search(StackFinder::new(finder))
    }

    /// Use a custom search strategy.
    #[must_use]
    pub fn with_search(mut self, finder: impl Finder) -> Self {
        self.finder = Some(Arc::new(finder));
        self
    }

    /// Set how a newly built screen is attached.
    #[must_use]
    pub fn with_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn has_finder(&self) -> bool {
        self.finder.is_some()
    }

    pub fn has_factory(&self) -> bool {
        self.factory.is_some()
    }

    pub fn finder(&self) -> Option<&dyn Finder> {
        self.finder.as_deref()
    }

    pub(crate) fn factory(&self) -> Option<&dyn ErasedFactory> {
        self.factory.as_deref()
    }

    fn signature(&self) -> (&'static str, Option<&'static str>, Option<&'static str>, Action) {
        (
            self.label,
            self.finder.as_ref().map(|f| f.name()),
            self.factory.as_ref().map(|f| f.name()),
            self.action,
        )
    }
}

impl PartialEq for Step {
    fn eq(&self, other: &Self) -> bool {
        self.signature() == other.signature()
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("label", &self.label)
            .field("finder", &self.finder.as_ref().map(|f| f.name()))
            .field("factory", &self.factory.as_ref().map(|f| f.name()))
            .field("action", &self.action)
            .finish()
    }
}

// ============================================================================
// ScreenStep
// ============================================================================

/// The typed final step of a destination: produces an `S` from a `C`.
pub struct ScreenStep<S, C> {
    step: Step,
    marker: PhantomData<fn(&C) -> S>,
}

impl<S: Screen, C: Any + Send + Sync> ScreenStep<S, C> {
    /// Build with `factory` when no existing screen matches.
    pub fn new<F>(factory: F) -> Self
    where
        F: Factory<Screen = S, Context = C>,
    {
        Self::wrap(Step::new(factory))
    }

    /// Build with a factory that does not read the context.
    pub fn context_free<F>(factory: F) -> Self
    where
        F: Factory<Screen = S, Context = ()>,
    {
        Self::wrap(Step::new(factory))
    }

    /// Only reuse an existing screen; never build.
    pub fn existing<F>(finder: F) -> Self
    where
        F: StackIteratingFinder<Screen = S, Context = C>,
    {
        Self::wrap(Step::existing(finder))
    }

    /// Look for an existing screen with `finder` before building.
    #[must_use]
    pub fn with_finder<F>(self, finder: F) -> Self
    where
        F: StackIteratingFinder<Screen = S, Context = C>,
    {
        Self::wrap(self.step.with_finder(finder))
    }

    /// Reuse any existing `S` reachable through `iterator`.
    #[must_use]
    pub fn reuse_any(self, iterator: StackIterator) -> Self {
        Self::wrap(self.step.with_finder(ClassFinder::<S>::new().iterator(iterator)))
    }

    #[must_use]
    pub fn with_action(self, action: Action) -> Self {
        Self::wrap(self.step.with_action(action))
    }

    fn wrap(step: Step) -> Self {
        Self {
            step,
            marker: PhantomData,
        }
    }
}

// ============================================================================
// DestinationStep (erased)
// ============================================================================

/// Type-erased, immutable step chain carried by a
/// [`NavigationRequest`](crate::NavigationRequest).
#[derive(Clone, PartialEq)]
pub struct DestinationStep {
    steps: Arc<[Step]>,
}

impl DestinationStep {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
        }
    }

    /// Steps, ancestors first.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Label of the target (last) step.
    pub fn label(&self) -> &'static str {
        self.steps.last().map_or("<empty>", Step::label)
    }

    /// Pre-flight check run before a router commits to a navigation.
    pub fn validate(&self) -> Result<(), RoutingError> {
        if self.steps.is_empty() {
            return Err(RoutingError::invalid_destination("destination has no steps"));
        }
        if let Some(step) = self
            .steps
            .iter()
            .find(|step| !step.has_finder() && !step.has_factory())
        {
            return Err(RoutingError::invalid_destination(format!(
                "step '{}' has neither a finder nor a factory",
                step.label()
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for DestinationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(Step::label))
            .finish()
    }
}

// ============================================================================
// Destination
// ============================================================================

/// Typed target specification: reach a screen `S` given a context `C`.
///
/// Equality is structural: same screen and context types, same steps.
pub struct Destination<S, C> {
    step: DestinationStep,
    interceptors: Vec<Arc<dyn Interceptor>>,
    marker: PhantomData<fn(&C) -> S>,
}

impl<S: Screen, C: Any + Send + Sync> Destination<S, C> {
    /// A destination made of the target step alone.
    pub fn new(target: ScreenStep<S, C>) -> Self {
        Self {
            step: DestinationStep::new(vec![target.step]),
            interceptors: Vec::new(),
            marker: PhantomData,
        }
    }

    /// Wrap everything declared so far in `ancestor`.
    ///
    /// Each call adds a step further out: `new(leaf).within(a).within(b)`
    /// yields `[b, a, leaf]`.
    #[must_use]
    pub fn within(self, ancestor: Step) -> Self {
        let mut steps = Vec::with_capacity(self.step.steps().len() + 1);
        steps.push(ancestor);
        steps.extend_from_slice(self.step.steps());
        Self {
            step: DestinationStep::new(steps),
            interceptors: self.interceptors,
            marker: PhantomData,
        }
    }

    /// Run `interceptor` for every navigation to this destination, after the
    /// router's global and router-local interceptors.
    #[must_use]
    pub fn intercepted_by(mut self, interceptor: impl Interceptor) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Steps, ancestors first.
    pub fn steps(&self) -> &[Step] {
        self.step.steps()
    }

    /// The step producing `S`.
    pub fn target(&self) -> &Step {
        // `new` always installs the target step, and `within` only prepends.
        &self.step.steps()[self.step.steps().len() - 1]
    }

    pub fn interceptors(&self) -> &[Arc<dyn Interceptor>] {
        &self.interceptors
    }

    /// The erased form used by routers.
    pub fn as_step(&self) -> &DestinationStep {
        &self.step
    }
}

impl<S, C> Clone for Destination<S, C> {
    fn clone(&self) -> Self {
        Self {
            step: self.step.clone(),
            interceptors: self.interceptors.clone(),
            marker: PhantomData,
        }
    }
}

impl<S, C> PartialEq for Destination<S, C> {
    fn eq(&self, other: &Self) -> bool {
        self.step == other.step
    }
}

impl<S, C> fmt::Debug for Destination<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Destination")
            .field("screen", &short_type_name(any::type_name::<S>()))
            .field("context", &any::type_name::<C>())
            .field("steps", &self.step)
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}
