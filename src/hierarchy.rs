//! Read-only view of the live screen hierarchy.
//!
//! The router never touches the UI toolkit directly. It sees the hierarchy as a
//! [`StackSnapshot`]: an ordered list of [`StackEntry`] values from the root
//! (index 0) to the top-most screen, each tagged with how it was attached
//! ([`Presentation`]). A new presentation layer starts at every
//! [`Presentation::Presented`] entry; screens pushed after it belong to that
//! layer.
//!
//! ```text
//!  index  screen        presentation   layer   visible
//!  0      Home          Root           0
//!  1      Catalog       Pushed         0       yes (top of layer 0)
//!  2      Login         Presented      1
//!  3      Color         Pushed         1       yes (top of layer 1, current)
//! ```
//!
//! [`StackIterator`] turns a snapshot into the ordered candidate list a finder
//! walks, according to a [`SearchScope`] and [`SearchOrder`].

use std::any::{self, Any};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Screen
// ============================================================================

/// Type-erasure helper implemented for every `'static` screen type.
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A screen that can live in the hierarchy.
///
/// Screens are shared as [`ScreenHandle`]s. A finder's match predicate may
/// refresh a screen's displayed data, so screens that support that keep the
/// data behind interior mutability.
///
/// # Example
///
/// ```
/// use screen_navigator::Screen;
/// use std::sync::RwLock;
///
/// #[derive(Debug)]
/// struct ColorScreen {
///     hex: RwLock<String>,
/// }
///
/// impl Screen for ColorScreen {}
/// ```
pub trait Screen: AsAny + fmt::Debug {
    /// Short name used in logs and errors. Defaults to the type name.
    fn label(&self) -> &'static str {
        short_type_name(any::type_name::<Self>())
    }
}

/// Shared handle to a screen in (or destined for) the hierarchy.
pub type ScreenHandle = Arc<dyn Screen>;

impl dyn Screen {
    /// Check whether this screen is an `S`.
    pub fn is<S: Screen>(&self) -> bool {
        AsAny::as_any(self).is::<S>()
    }

    /// Borrow this screen as an `S`.
    pub fn downcast_ref<S: Screen>(&self) -> Option<&S> {
        AsAny::as_any(self).downcast_ref::<S>()
    }
}

/// Recover the concrete type of a shared screen.
pub fn downcast_screen<S: Screen>(screen: &ScreenHandle) -> Option<Arc<S>> {
    AsAny::into_any_arc(Arc::clone(screen)).downcast::<S>().ok()
}

/// Identity comparison between two handles (same instance, not equal data).
pub fn same_screen(a: &ScreenHandle, b: &ScreenHandle) -> bool {
    Arc::as_ptr(a).cast::<()>() == Arc::as_ptr(b).cast::<()>()
}

/// `a::b::Foo<c::Bar>` → `Foo`
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

// ============================================================================
// Snapshot
// ============================================================================

/// How an entry was attached to the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presentation {
    /// The root screen.
    Root,
    /// Pushed on top of the current layer.
    Pushed,
    /// Presented modally; starts a new layer.
    Presented,
}

/// One screen in a [`StackSnapshot`].
#[derive(Debug, Clone)]
pub struct StackEntry {
    pub screen: ScreenHandle,
    pub presentation: Presentation,
}

impl StackEntry {
    pub fn new(screen: ScreenHandle, presentation: Presentation) -> Self {
        Self {
            screen,
            presentation,
        }
    }
}

/// Immutable, ordered view of the hierarchy (root first).
#[derive(Debug, Clone, Default)]
pub struct StackSnapshot {
    entries: Vec<StackEntry>,
}

impl StackSnapshot {
    pub fn new(entries: Vec<StackEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The top-most (current) screen.
    pub fn top(&self) -> Option<&ScreenHandle> {
        self.entries.last().map(|entry| &entry.screen)
    }

    /// Index of `screen` in the snapshot, by identity.
    pub fn position(&self, screen: &ScreenHandle) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| same_screen(&entry.screen, screen))
    }

    pub fn contains(&self, screen: &ScreenHandle) -> bool {
        self.position(screen).is_some()
    }

    /// Indices of the top screen of every presentation layer, root layer first.
    pub fn visible_indices(&self) -> Vec<usize> {
        let mut visible = Vec::new();
        for (index, window) in self.entries.windows(2).enumerate() {
            if window[1].presentation == Presentation::Presented {
                visible.push(index);
            }
        }
        if !self.entries.is_empty() {
            visible.push(self.entries.len() - 1);
        }
        visible
    }
}

// ============================================================================
// Iteration
// ============================================================================

/// Which part of the hierarchy a finder looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchScope {
    /// Only the top-most screen.
    Current,
    /// The top screen of every presentation layer.
    Visible,
    /// Every screen in the hierarchy.
    #[default]
    AllStack,
}

/// Order in which candidates are offered to the match predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchOrder {
    /// Top-most screen first.
    #[default]
    TopDown,
    /// Root first.
    BottomUp,
}

/// Produces the deterministic candidate list for a finder.
///
/// # Example
///
/// ```
/// use screen_navigator::hierarchy::{SearchOrder, SearchScope, StackIterator};
///
/// let iterator = StackIterator::new(SearchScope::Visible).order(SearchOrder::BottomUp);
/// assert_eq!(iterator.scope(), SearchScope::Visible);
/// assert_eq!(StackIterator::default(), StackIterator::current_all_stack());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StackIterator {
    scope: SearchScope,
    order: SearchOrder,
}

impl StackIterator {
    pub const fn new(scope: SearchScope) -> Self {
        Self {
            scope,
            order: SearchOrder::TopDown,
        }
    }

    /// Whole stack, top-most first.
    pub const fn current_all_stack() -> Self {
        Self::new(SearchScope::AllStack)
    }

    #[must_use]
    pub const fn order(mut self, order: SearchOrder) -> Self {
        self.order = order;
        self
    }

    pub const fn scope(&self) -> SearchScope {
        self.scope
    }

    pub const fn search_order(&self) -> SearchOrder {
        self.order
    }

    /// Candidates in the order they must be tested.
    pub fn candidates<'a>(&self, snapshot: &'a StackSnapshot) -> Vec<&'a ScreenHandle> {
        let entries = snapshot.entries();
        let mut indices: Vec<usize> = match self.scope {
            SearchScope::Current => entries.len().checked_sub(1).into_iter().collect(),
            SearchScope::Visible => snapshot.visible_indices(),
            SearchScope::AllStack => (0..entries.len()).collect(),
        };
        if self.order == SearchOrder::TopDown {
            indices.reverse();
        }
        indices.into_iter().map(|i| &entries[i].screen).collect()
    }
}

// ============================================================================
// ScreenHierarchy
// ============================================================================

/// Source of hierarchy snapshots.
///
/// Implemented by whatever owns the live screens; see
/// [`ScreenStack`](crate::stack::ScreenStack) for the in-memory model.
pub trait ScreenHierarchy: Send + Sync {
    fn snapshot(&self) -> StackSnapshot;
}

impl<H: ScreenHierarchy + ?Sized> ScreenHierarchy for Arc<H> {
    fn snapshot(&self) -> StackSnapshot {
        (**self).snapshot()
    }
}

// ============================================================================
// Tests
// ============================================================================
