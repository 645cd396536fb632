//! # screen-navigator
//!
//! Screen navigation for applications that keep a live hierarchy of screens:
//! describe *where* to go, and the router figures out *how* to get there.
//!
//! A navigation call names a typed [`Destination`] and supplies a context
//! value. The router then:
//!
//! 1. looks for an existing screen that already satisfies the destination
//!    ([finders](finder)), refreshing it in place when found;
//! 2. otherwise validates the [factories](factory) that would build the
//!    missing screens;
//! 3. runs the [interceptor chain](interceptor), global interceptors first;
//! 4. builds the screens and hands a [`TransitionPlan`] to the
//!    [`TransitionExecutor`], the only component allowed to mutate the
//!    hierarchy.
//!
//! Every call produces exactly one result. Failures never leave a partially
//! built chain on screen.
//!
//! # Quick start
//!
//! ```
//! use screen_navigator::stack::ScreenStack;
//! use screen_navigator::{
//!     factory_fn, finder_fn, Destination, RouterBuilder, RouterExt, Screen, ScreenStep,
//! };
//! use std::sync::{Arc, RwLock};
//!
//! #[derive(Debug)]
//! struct Home;
//! impl Screen for Home {}
//!
//! #[derive(Debug)]
//! struct ColorScreen {
//!     hex: RwLock<String>,
//! }
//! impl Screen for ColorScreen {}
//!
//! let color: Destination<ColorScreen, String> = Destination::new(
//!     ScreenStep::new(factory_fn(|hex: &String| {
//!         Ok(ColorScreen { hex: RwLock::new(hex.clone()) })
//!     }))
//!     .with_finder(finder_fn(|screen: &ColorScreen, hex: &String| {
//!         *screen.hex.write().unwrap() = hex.clone();
//!         true
//!     })),
//! );
//!
//! let stack = Arc::new(ScreenStack::with_root(Arc::new(Home)));
//! let router = RouterBuilder::over(stack.clone()).build();
//!
//! pollster::block_on(async {
//!     router.navigate_to(&color, "#FFAA00".to_string(), true).await.unwrap();
//!     // Already on screen: refreshed in place, nothing new is pushed.
//!     router.navigate_to(&color, "#00AAFF".to_string(), true).await.unwrap();
//! });
//! assert_eq!(stack.len(), 2);
//! ```
//!
//! # Feature flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `log` | yes | Diagnostics through the `log` crate |
//! | `tracing` | no | Diagnostics through the `tracing` crate (instead of `log`) |

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod analytics;
pub mod config;
pub mod context;
pub mod decorators;
pub mod destination;
pub mod error;
pub mod factory;
pub mod finder;
pub mod hierarchy;
pub mod interceptor;
pub mod logging;
pub mod router;
pub mod stack;
pub mod transition;

pub use analytics::{AnalyticsRouterDecorator, AnalyticsSink, LoggingAnalyticsSink, RoutingEvent};
pub use config::{ConcurrencyPolicy, RouterBuilder, RouterConfig};
pub use context::{NavigationRequest, RoutingContext};
pub use decorators::{FailingRouter, GlobalInterceptorRouter};
pub use destination::{Destination, DestinationStep, ScreenStep, Step};
pub use error::{BuildError, InterceptorError, RoutingError, RoutingResult, TransitionError};
pub use factory::{factory_fn, Factory};
pub use finder::{finder_fn, ClassFinder, Finder, StackIteratingFinder};
pub use hierarchy::{
    downcast_screen, same_screen, Screen, ScreenHandle, ScreenHierarchy, SearchOrder,
    SearchScope, StackIterator, StackSnapshot,
};
pub use interceptor::{
    callback_fn, callback_interceptor, interceptor_fn, CallbackInterceptor, Completion,
    DelayStrategy, Interceptor, InterceptorChain, LoggingInterceptor,
    NavigationDelayingInterceptor, ReadinessSignal,
};
pub use logging::{DefaultLogger, LogLevel, Logger};
pub use router::{DefaultRouter, NavigationPhase, Router, RouterExt};
pub use transition::{Action, TransitionExecutor, TransitionPlan};
