//! Screen factories: building a screen when no existing one matches.
//!
//! Factories run in two passes. [`prepare`](Factory::prepare) validates the
//! context while the router is still resolving, before any interceptor is
//! consulted. [`build`](Factory::build) runs only after every interceptor has
//! agreed, in ancestor-to-leaf order, and before anything is presented; a
//! failure there discards whatever was already built.

use crate::context::RoutingContext;
use crate::error::{BuildError, RoutingError};
use crate::hierarchy::{short_type_name, Screen, ScreenHandle};
use std::any::{self, Any};
use std::marker::PhantomData;
use std::sync::Arc;

/// Builds a screen from the navigation context.
///
/// Factories must not touch global state: two builds with equal contexts
/// produce equivalent screens.
///
/// # Example
///
/// ```
/// use screen_navigator::error::BuildError;
/// use screen_navigator::{Factory, Screen};
///
/// #[derive(Debug)]
/// struct ColorScreen {
///     hex: String,
/// }
/// impl Screen for ColorScreen {}
///
/// struct ColorFactory;
///
/// impl Factory for ColorFactory {
///     type Screen = ColorScreen;
///     type Context = String;
///
///     fn prepare(&self, hex: &String) -> Result<(), BuildError> {
///         if hex.starts_with('#') {
///             Ok(())
///         } else {
///             Err(BuildError::new("ColorScreen", format!("'{hex}' is not a hex color")))
///         }
///     }
///
///     fn build(&self, hex: &String) -> Result<ColorScreen, BuildError> {
///         Ok(ColorScreen { hex: hex.clone() })
///     }
/// }
/// ```
pub trait Factory: Send + Sync + 'static {
    /// Screen type produced.
    type Screen: Screen;
    /// Context type consumed. `()` makes the factory context-agnostic.
    type Context: Any + Send + Sync;

    /// Check the context before interceptors run. Default: accept.
    fn prepare(&self, _context: &Self::Context) -> Result<(), BuildError> {
        Ok(())
    }

    /// Construct the screen.
    fn build(&self, context: &Self::Context) -> Result<Self::Screen, BuildError>;
}

// ============================================================================
// Erased factory
// ============================================================================

/// Object-safe view of a [`Factory`] used inside steps.
pub(crate) trait ErasedFactory: Send + Sync {
    fn name(&self) -> &'static str;
    fn prepare(&self, context: &RoutingContext) -> Result<(), RoutingError>;
    fn build(&self, context: &RoutingContext) -> Result<ScreenHandle, RoutingError>;
}

pub(crate) struct FactoryBox<F> {
    factory: F,
}

impl<F: Factory> FactoryBox<F> {
    pub(crate) fn new(factory: F) -> Self {
        Self { factory }
    }
}

impl<F: Factory> ErasedFactory for FactoryBox<F> {
    fn name(&self) -> &'static str {
        short_type_name(any::type_name::<F>())
    }

    fn prepare(&self, context: &RoutingContext) -> Result<(), RoutingError> {
        let label = short_type_name(any::type_name::<F::Screen>());
        let context = context.resolve::<F::Context>(label)?;
        self.factory.prepare(context).map_err(RoutingError::from)
    }

    fn build(&self, context: &RoutingContext) -> Result<ScreenHandle, RoutingError> {
        let label = short_type_name(any::type_name::<F::Screen>());
        let context = context.resolve::<F::Context>(label)?;
        let screen: ScreenHandle = Arc::new(self.factory.build(context)?);
        Ok(screen)
    }
}

// ============================================================================
// factory_fn helper
// ============================================================================

/// Create a factory from a build closure.
///
/// # Example
///
/// ```
/// use screen_navigator::factory_fn;
/// use screen_navigator::Screen;
///
/// #[derive(Debug)]
/// struct Profile {
///     user_id: u64,
/// }
/// impl Screen for Profile {}
///
/// let factory = factory_fn(|id: &u64| Ok(Profile { user_id: *id }));
/// # let _ = factory;
/// ```
pub fn factory_fn<S, C, B>(build: B) -> FnFactory<S, C, B>
where
    S: Screen,
    C: Any + Send + Sync,
    B: Fn(&C) -> Result<S, BuildError> + Send + Sync + 'static,
{
    FnFactory {
        build,
        marker: PhantomData,
    }
}

/// Factory created from a closure via [`factory_fn`].
pub struct FnFactory<S, C, B> {
    build: B,
    marker: PhantomData<fn(&C) -> S>,
}

impl<S, C, B> Factory for FnFactory<S, C, B>
where
    S: Screen,
    C: Any + Send + Sync,
    B: Fn(&C) -> Result<S, BuildError> + Send + Sync + 'static,
{
    type Screen = S;
    type Context = C;

    fn build(&self, context: &C) -> Result<S, BuildError> {
        (self.build)(context)
    }
}
