//! Error handling for the router.
//!
//! This module defines the types returned when a navigation attempt cannot
//! complete successfully:
//!
//! - [`RoutingResult`] — the terminal outcome of a navigation
//!   (`Success` or `Failure`).
//! - [`RoutingError`] — the error taxonomy. The four public kinds are
//!   [`Build`](RoutingError::Build), [`Interceptor`](RoutingError::Interceptor),
//!   [`Transition`](RoutingError::Transition) and [`Busy`](RoutingError::Busy).
//!   The base router can also emit low-level variants (context mismatch,
//!   invalid destination, cancellation) which
//!   [`FailingRouter`](crate::decorators::FailingRouter) folds into those four.
//! - [`BuildError`], [`InterceptorError`], [`TransitionError`] — the errors
//!   returned at the factory, interceptor and executor boundaries.
//!
//! # Examples
//!
//! ```
//! use screen_navigator::error::{InterceptorError, RoutingError, RoutingResult};
//!
//! let result = RoutingResult::Success;
//! assert!(result.is_success());
//!
//! let blocked = RoutingResult::from(Err(RoutingError::from(InterceptorError::new("blocked"))));
//! assert!(blocked.is_failure());
//! assert_eq!(blocked.error().unwrap().to_string(), "navigation blocked: blocked");
//! ```

use crate::router::NavigationPhase;
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// Shared, clonable error cause.
pub type Cause = Arc<dyn StdError + Send + Sync + 'static>;

// ============================================================================
// Routing result
// ============================================================================

/// Terminal outcome of one navigation call.
///
/// Every navigation produces exactly one of these.
#[derive(Debug, Clone)]
pub enum RoutingResult {
    /// The destination is displayed.
    Success,
    /// The navigation stopped at some stage.
    Failure(RoutingError),
}

impl RoutingResult {
    /// Check if navigation was successful
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Check if navigation failed
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Get the failure, if any
    pub fn error(&self) -> Option<&RoutingError> {
        match self {
            Self::Success => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// Convert back into a `Result` so it can be used with `?`.
    pub fn into_result(self) -> Result<(), RoutingError> {
        match self {
            Self::Success => Ok(()),
            Self::Failure(error) => Err(error),
        }
    }
}

impl From<Result<(), RoutingError>> for RoutingResult {
    fn from(result: Result<(), RoutingError>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(error) => Self::Failure(error),
        }
    }
}

// ============================================================================
// RoutingError
// ============================================================================

/// Everything that can stop a navigation.
#[derive(Debug, Clone, Error)]
pub enum RoutingError {
    /// A factory could not construct a required screen.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// An interceptor vetoed the navigation.
    #[error(transparent)]
    Interceptor(#[from] InterceptorError),

    /// The hierarchy mutation could not be completed.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Another navigation is in flight and the router rejects overlap.
    #[error("navigation already in progress")]
    Busy,

    /// The call context is not the type a finder or factory expects.
    #[error("step '{step}' expects a `{expected}` context but received `{found}`")]
    ContextMismatch {
        step: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The destination cannot be navigated to as declared.
    #[error("invalid destination: {reason}")]
    InvalidDestination { reason: String },

    /// A completion sink was dropped before it was resolved.
    #[error("navigation cancelled while {phase}")]
    Cancelled { phase: NavigationPhase },
}

impl RoutingError {
    /// Create an [`InvalidDestination`](Self::InvalidDestination) error.
    pub fn invalid_destination(reason: impl Into<String>) -> Self {
        Self::InvalidDestination {
            reason: reason.into(),
        }
    }

    /// Check if this error belongs to the public four-kind taxonomy.
    pub fn is_normalized(&self) -> bool {
        matches!(
            self,
            Self::Build(_) | Self::Interceptor(_) | Self::Transition(_) | Self::Busy
        )
    }

    /// Fold low-level variants into the public taxonomy.
    ///
    /// Normalized errors are returned unchanged.
    pub fn normalize(self) -> Self {
        match self {
            Self::ContextMismatch {
                step,
                expected,
                found,
            } => {
                let original = Self::ContextMismatch {
                    step: step.clone(),
                    expected,
                    found,
                };
                Self::Build(BuildError::new(step, original.to_string()).with_cause(original))
            }
            Self::InvalidDestination { reason } => {
                Self::Build(BuildError::new("destination", reason))
            }
            Self::Cancelled { phase } => {
                let original = Self::Cancelled { phase };
                if phase < NavigationPhase::Transitioning {
                    Self::Interceptor(
                        InterceptorError::new(original.to_string()).with_cause(original),
                    )
                } else {
                    Self::Transition(TransitionError::new(original.to_string()).with_cause(original))
                }
            }
            normalized => normalized,
        }
    }
}

// ============================================================================
// Boundary errors
// ============================================================================

/// A factory could not construct its screen from the given context.
#[derive(Debug, Clone, Error)]
#[error("failed to build '{screen}': {message}")]
pub struct BuildError {
    /// Label of the screen being built.
    pub screen: String,
    /// What went wrong.
    pub message: String,
    #[source]
    cause: Option<Cause>,
}

impl BuildError {
    pub fn new(screen: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            screen: screen.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// Attach the underlying cause.
    #[must_use]
    pub fn with_cause(mut self, cause: impl StdError + Send + Sync + 'static) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }
}

/// An interceptor refused to let the navigation proceed.
#[derive(Debug, Clone, Error)]
#[error("navigation blocked: {reason}")]
pub struct InterceptorError {
    /// Human-readable veto reason.
    pub reason: String,
    #[source]
    cause: Option<Cause>,
}

impl InterceptorError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            cause: None,
        }
    }

    /// Attach the underlying cause.
    #[must_use]
    pub fn with_cause(mut self, cause: impl StdError + Send + Sync + 'static) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }
}

/// The hierarchy could not be mutated as planned.
#[derive(Debug, Clone, Error)]
#[error("transition failed: {message}")]
pub struct TransitionError {
    pub message: String,
    #[source]
    cause: Option<Cause>,
}

impl TransitionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// Attach the underlying cause.
    #[must_use]
    pub fn with_cause(mut self, cause: impl StdError + Send + Sync + 'static) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }
}

// ============================================================================
// Tests
// ============================================================================
