//! Stack finders: locating a reusable screen in the live hierarchy.
//!
//! A finder answers one question: *is there already a screen in the hierarchy
//! that satisfies this step for this context?* The router consults finders
//! before any factory is involved, so a match always wins over construction.
//!
//! # Creating finders
//!
//! | Approach | When to use |
//! |----------|-------------|
//! | Implement [`StackIteratingFinder`] | Typed predicate over screens of one type |
//! | [`finder_fn`] | Quick predicate from a closure |
//! | [`ClassFinder`] | Any screen of a given type, context ignored |
//! | Implement [`Finder`] | Custom search strategy over the raw snapshot |
//!
//! # Refreshing on match
//!
//! [`is_target`](StackIteratingFinder::is_target) may update the candidate it
//! is looking at. That is how reuse refreshes a screen: the finder writes the
//! new context into the matched screen and reports the match. The router does
//! not know or care whether matching had side effects.
//!
//! ```
//! use screen_navigator::{Screen, StackIteratingFinder};
//! use std::sync::RwLock;
//!
//! #[derive(Debug)]
//! struct ColorScreen {
//!     hex: RwLock<String>,
//! }
//! impl Screen for ColorScreen {}
//!
//! struct ColorFinder;
//!
//! impl StackIteratingFinder for ColorFinder {
//!     type Screen = ColorScreen;
//!     type Context = String;
//!
//!     fn is_target(&self, screen: &ColorScreen, hex: &String) -> bool {
//!         *screen.hex.write().unwrap() = hex.clone();
//!         true
//!     }
//! }
//! ```

use crate::context::RoutingContext;
use crate::error::RoutingError;
use crate::hierarchy::{short_type_name, Screen, ScreenHandle, StackIterator, StackSnapshot};
use crate::trace_log;
use std::any::{self, Any};
use std::marker::PhantomData;

// ============================================================================
// Finder (erased)
// ============================================================================

/// Search strategy over a hierarchy snapshot.
pub trait Finder: Send + Sync + 'static {
    /// Return the first matching screen, if any.
    fn find(
        &self,
        hierarchy: &StackSnapshot,
        context: &RoutingContext,
    ) -> Result<Option<ScreenHandle>, RoutingError>;

    /// Finder name for debugging.
    fn name(&self) -> &'static str {
        short_type_name(any::type_name::<Self>())
    }
}

// ============================================================================
// StackIteratingFinder
// ============================================================================

/// Typed finder that walks the hierarchy with a [`StackIterator`] and tests
/// every screen of type [`Screen`](Self::Screen).
pub trait StackIteratingFinder: Send + Sync + 'static {
    /// Screen type this finder matches.
    type Screen: Screen;
    /// Context type the predicate reads. `()` makes the finder context-agnostic.
    type Context: Any + Send + Sync;

    /// Scope and order of the walk. Defaults to the whole stack, top first.
    fn iterator(&self) -> StackIterator {
        StackIterator::current_all_stack()
    }

    /// Decide whether `screen` satisfies the target for `context`.
    ///
    /// May update `screen` as a side effect of matching.
    fn is_target(&self, screen: &Self::Screen, context: &Self::Context) -> bool;
}

/// Adapter exposing a [`StackIteratingFinder`] as a [`Finder`].
pub struct StackFinder<F> {
    finder: F,
}

impl<F: StackIteratingFinder> StackFinder<F> {
    pub fn new(finder: F) -> Self {
        Self { finder }
    }
}

impl<F: StackIteratingFinder> Finder for StackFinder<F> {
    fn find(
        &self,
        hierarchy: &StackSnapshot,
        context: &RoutingContext,
    ) -> Result<Option<ScreenHandle>, RoutingError> {
        let context = context.resolve::<F::Context>(self.name())?;
        let iterator = self.finder.iterator();
        for candidate in iterator.candidates(hierarchy) {
            let Some(screen) = candidate.downcast_ref::<F::Screen>() else {
                continue;
            };
            if self.finder.is_target(screen, context) {
                trace_log!("Finder '{}' matched '{}'", self.name(), screen.label());
                return Ok(Some(candidate.clone()));
            }
        }
        Ok(None)
    }

    fn name(&self) -> &'static str {
        short_type_name(any::type_name::<F>())
    }
}

// ============================================================================
// ClassFinder
// ============================================================================

/// Matches the first screen of type `S`, whatever the context.
///
/// # Example
///
/// ```
/// use screen_navigator::finder::ClassFinder;
/// use screen_navigator::hierarchy::{SearchScope, StackIterator};
/// use screen_navigator::Screen;
///
/// #[derive(Debug)]
/// struct Home;
/// impl Screen for Home {}
///
/// let finder = ClassFinder::<Home>::new().iterator(StackIterator::new(SearchScope::Visible));
/// # let _ = finder;
/// ```
pub struct ClassFinder<S> {
    iterator: StackIterator,
    marker: PhantomData<fn() -> S>,
}

impl<S: Screen> ClassFinder<S> {
    pub fn new() -> Self {
        Self {
            iterator: StackIterator::current_all_stack(),
            marker: PhantomData,
        }
    }

    #[must_use]
    pub fn iterator(mut self, iterator: StackIterator) -> Self {
        self.iterator = iterator;
        self
    }
}

impl<S: Screen> Default for ClassFinder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Screen> StackIteratingFinder for ClassFinder<S> {
    type Screen = S;
    type Context = ();

    fn iterator(&self) -> StackIterator {
        self.iterator
    }

    fn is_target(&self, _screen: &S, _context: &()) -> bool {
        true
    }
}

// ============================================================================
// finder_fn helper
// ============================================================================

/// Create a finder from a predicate closure.
///
/// # Example
///
/// ```
/// use screen_navigator::finder_fn;
/// use screen_navigator::Screen;
///
/// #[derive(Debug)]
/// struct Profile {
///     user_id: u64,
/// }
/// impl Screen for Profile {}
///
/// let finder = finder_fn(|screen: &Profile, id: &u64| screen.user_id == *id);
/// # let _ = finder;
/// ```
pub fn finder_fn<S, C, P>(predicate: P) -> FnFinder<S, C, P>
where
    S: Screen,
    C: Any + Send + Sync,
    P: Fn(&S, &C) -> bool + Send + Sync + 'static,
{
    FnFinder {
        predicate,
        iterator: StackIterator::current_all_stack(),
        marker: PhantomData,
    }
}

/// Finder created from a closure via [`finder_fn`].
pub struct FnFinder<S, C, P> {
    predicate: P,
    iterator: StackIterator,
    marker: PhantomData<fn(&S, &C)>,
}

impl<S, C, P> FnFinder<S, C, P> {
    #[must_use]
    pub fn iterator(mut self, iterator: StackIterator) -> Self {
        self.iterator = iterator;
        self
    }
}

impl<S, C, P> StackIteratingFinder for FnFinder<S, C, P>
where
    S: Screen,
    C: Any + Send + Sync,
    P: Fn(&S, &C) -> bool + Send + Sync + 'static,
{
    type Screen = S;
    type Context = C;

    fn iterator(&self) -> StackIterator {
        self.iterator
    }

    fn is_target(&self, screen: &S, context: &C) -> bool {
        (self.predicate)(screen, context)
    }
}

// ============================================================================
// Tests
// ============================================================================
