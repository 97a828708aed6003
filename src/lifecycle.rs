use crate::adjuster::LayoutAdjuster;
use crate::debug::DebugLogger;
use crate::document::Document;
use crate::error::PrintPrepError;
use crate::metrics::{HandlerFailure, PassOutcome};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// Document structure is complete; assets may still be loading.
    ContentReady,
    Load,
    Resize,
}

impl LifecycleEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleEvent::ContentReady => "content-ready",
            LifecycleEvent::Load => "load",
            LifecycleEvent::Resize => "resize",
        }
    }
}

pub type Handler = Box<dyn Fn(&Document) -> Result<PassOutcome, PrintPrepError> + Send + Sync>;

/// What one dispatch produced: outcomes of the handlers that completed and
/// the faults of those that did not.
#[derive(Debug, Default)]
pub struct Dispatch {
    pub outcomes: Vec<PassOutcome>,
    pub failures: Vec<HandlerFailure>,
}

/// Explicit subscription table standing in for the host's event loop.
///
/// Handlers run synchronously, in registration order, one dispatch at a time.
/// Nothing is coalesced: every dispatch re-runs every subscribed handler. A
/// faulting handler is recorded and does not stop the handlers after it.
#[derive(Default)]
pub struct EventHost {
    subscriptions: Vec<(LifecycleEvent, Handler)>,
    debug: Option<Arc<DebugLogger>>,
}

impl EventHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content-ready applies page breaks; load and every resize re-fit the
    /// name label.
    pub fn standard(adjuster: LayoutAdjuster) -> Self {
        let adjuster = Arc::new(adjuster);
        let mut host = EventHost {
            subscriptions: Vec::new(),
            debug: adjuster.debug_logger(),
        };

        let breaks = Arc::clone(&adjuster);
        host.subscribe(LifecycleEvent::ContentReady, move |doc| {
            breaks.apply_page_breaks(doc).map(PassOutcome::PageBreaks)
        });
        for event in [LifecycleEvent::Load, LifecycleEvent::Resize] {
            let label = Arc::clone(&adjuster);
            host.subscribe(event, move |doc| {
                label
                    .adjust_name_label_font_size(doc)
                    .map(PassOutcome::Label)
            });
        }
        host
    }

    pub fn subscribe<F>(&mut self, event: LifecycleEvent, handler: F)
    where
        F: Fn(&Document) -> Result<PassOutcome, PrintPrepError> + Send + Sync + 'static,
    {
        self.subscriptions.push((event, Box::new(handler)));
    }

    pub fn handler_count(&self, event: LifecycleEvent) -> usize {
        self.subscriptions
            .iter()
            .filter(|(subscribed, _)| *subscribed == event)
            .count()
    }

    pub fn dispatch(&self, event: LifecycleEvent, document: &Document) -> Dispatch {
        let mut dispatch = Dispatch::default();
        for (subscribed, handler) in &self.subscriptions {
            if *subscribed != event {
                continue;
            }
            match handler(document) {
                Ok(outcome) => dispatch.outcomes.push(outcome),
                Err(err) => {
                    if let Some(logger) = &self.debug {
                        logger.log(
                            "lifecycle.handler_failed",
                            json!({ "event": event.as_str(), "error": err.to_string() }),
                        );
                        logger.increment("handlers.failed", 1);
                    }
                    dispatch.failures.push(HandlerFailure {
                        event,
                        message: err.to_string(),
                    });
                }
            }
        }
        if let Some(logger) = &self.debug {
            logger.log(
                "lifecycle.dispatch",
                json!({
                    "event": event.as_str(),
                    "completed": dispatch.outcomes.len(),
                    "failed": dispatch.failures.len(),
                }),
            );
            logger.increment(&format!("events.{}", event.as_str()), 1);
        }
        dispatch
    }
}
