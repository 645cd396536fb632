//! Navigation analytics.
//!
//! [`AnalyticsRouterDecorator`] reports a start event and one terminal event
//! per navigation to an [`AnalyticsSink`]. It never changes the result.

use crate::context::NavigationRequest;
use crate::error::RoutingError;
use crate::logging::{emit, LogLevel, Logger, SharedLogger};
use crate::router::Router;
use crate::{info_log, warn_log};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What an [`AnalyticsSink`] is told about a navigation.
#[derive(Debug, Clone)]
pub enum RoutingEvent {
    Started {
        destination: &'static str,
        animated: bool,
    },
    Succeeded {
        destination: &'static str,
        elapsed: Duration,
    },
    Failed {
        destination: &'static str,
        error: RoutingError,
        elapsed: Duration,
    },
}

impl RoutingEvent {
    pub fn destination(&self) -> &'static str {
        match self {
            Self::Started { destination, .. }
            | Self::Succeeded { destination, .. }
            | Self::Failed { destination, .. } => destination,
        }
    }

    /// Check if this event ends a navigation.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Started { .. })
    }
}

/// Receives [`RoutingEvent`]s. Must not block.
pub trait AnalyticsSink: Send + Sync {
    fn record(&self, event: &RoutingEvent);
}

impl<A: AnalyticsSink + ?Sized> AnalyticsSink for Arc<A> {
    fn record(&self, event: &RoutingEvent) {
        (**self).record(event);
    }
}

/// Sink that writes events to a [`Logger`], or to the crate's log macros when
/// none is injected.
#[derive(Default)]
pub struct LoggingAnalyticsSink {
    logger: SharedLogger,
}

impl LoggingAnalyticsSink {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }
}

impl AnalyticsSink for LoggingAnalyticsSink {
    fn record(&self, event: &RoutingEvent) {
        let (level, message) = match event {
            RoutingEvent::Started {
                destination,
                animated,
            } => (
                LogLevel::Info,
                format!("navigation to '{destination}' started (animated: {animated})"),
            ),
            RoutingEvent::Succeeded {
                destination,
                elapsed,
            } => (
                LogLevel::Info,
                format!("navigation to '{destination}' succeeded in {elapsed:?}"),
            ),
            RoutingEvent::Failed {
                destination,
                error,
                elapsed,
            } => (
                LogLevel::Warn,
                format!("navigation to '{destination}' failed after {elapsed:?}: {error}"),
            ),
        };
        if self.logger.is_some() {
            emit(&self.logger, level, || message);
        } else if level == LogLevel::Warn {
            warn_log!("{}", message);
        } else {
            info_log!("{}", message);
        }
    }
}

impl fmt::Debug for LoggingAnalyticsSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingAnalyticsSink")
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

/// Reports every navigation through the inner router to a sink.
pub struct AnalyticsRouterDecorator<R> {
    inner: R,
    sink: Arc<dyn AnalyticsSink>,
}

impl<R: Router> AnalyticsRouterDecorator<R> {
    pub fn new(inner: R, sink: Arc<dyn AnalyticsSink>) -> Self {
        Self { inner, sink }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[async_trait]
impl<R: Router> Router for AnalyticsRouterDecorator<R> {
    async fn navigate(&self, request: NavigationRequest) -> Result<(), RoutingError> {
        let destination = request.target();
        self.sink.record(&RoutingEvent::Started {
            destination,
            animated: request.animated,
        });

        let started = Instant::now();
        let result = self.inner.navigate(request).await;
        let elapsed = started.elapsed();

        let event = match &result {
            Ok(()) => RoutingEvent::Succeeded {
                destination,
                elapsed,
            },
            Err(error) => RoutingEvent::Failed {
                destination,
                error: error.clone(),
                elapsed,
            },
        };
        self.sink.record(&event);
        result
    }
}

impl<R: fmt::Debug> fmt::Debug for AnalyticsRouterDecorator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyticsRouterDecorator")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}
