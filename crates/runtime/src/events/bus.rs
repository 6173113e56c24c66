//! Name-keyed synchronous event bus.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, error, trace};

/// Error a handler may report back to the bus.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result of a single handler invocation.
pub type HandlerResult = Result<(), HandlerError>;

type Handler<P> = Arc<dyn Fn(&P) -> HandlerResult + Send + Sync>;

/// Identifies one registration; returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct SubscriptionId(u64);

/// How loudly a failing handler is reported.
///
/// The bus never propagates handler failures; criticality only picks the log
/// level so that consumers with side effects surface at `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandlerCriticality {
    /// Failure is logged at `error` level (default).
    #[default]
    Important,
    /// Failure is logged at `debug` level.
    Optional,
}

/// Delivery summary of one [`EventBus::publish`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    pub failed: usize,
}

struct Subscriber<P> {
    id: SubscriptionId,
    criticality: HandlerCriticality,
    handler: Handler<P>,
}

impl<P> Clone for Subscriber<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            criticality: self.criticality,
            handler: Arc::clone(&self.handler),
        }
    }
}

struct Registry<P> {
    next_id: u64,
    topics: HashMap<String, Vec<Subscriber<P>>>,
}

/// Publish/subscribe bus keyed by event name.
///
/// Handlers run synchronously on the publishing thread, in registration order.
/// Each handler is isolated: an `Err` or a panic is logged and the remaining
/// handlers still run. Clones share the same registry.
pub struct EventBus<P> {
    registry: Arc<RwLock<Registry<P>>>,
}

impl<P> EventBus<P> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(RwLock::new(Registry {
                next_id: 0,
                topics: HashMap::new(),
            })),
        }
    }

    /// Registers `handler` for `event`, reported at [`HandlerCriticality::Important`].
    pub fn subscribe<F>(&self, event: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&P) -> HandlerResult + Send + Sync + 'static,
    {
        self.subscribe_with(event, HandlerCriticality::Important, handler)
    }

    /// Registers `handler` for `event` with an explicit criticality.
    pub fn subscribe_with<F>(
        &self,
        event: &str,
        criticality: HandlerCriticality,
        handler: F,
    ) -> SubscriptionId
    where
        F: Fn(&P) -> HandlerResult + Send + Sync + 'static,
    {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry
            .topics
            .entry(event.to_owned())
            .or_default()
            .push(Subscriber {
                id,
                criticality,
                handler: Arc::new(handler),
            });

        trace!(target: "runtime::events", event, id = id.0, "handler subscribed");
        id
    }

    /// Removes the registration `id` from `event`.
    ///
    /// Returns `false` (and does nothing) when it was not registered there.
    pub fn unsubscribe(&self, event: &str, id: SubscriptionId) -> bool {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        let Some(subscribers) = registry.topics.get_mut(event) else {
            return false;
        };

        let before = subscribers.len();
        subscribers.retain(|subscriber| subscriber.id != id);
        let removed = subscribers.len() != before;
        if subscribers.is_empty() {
            registry.topics.remove(event);
        }

        if removed {
            trace!(target: "runtime::events", event, id = id.0, "handler unsubscribed");
        }
        removed
    }

    /// Invokes every handler registered for `event` at the time of the call.
    ///
    /// Handlers may subscribe or unsubscribe while being dispatched; changes
    /// take effect from the next publish.
    pub fn publish(&self, event: &str, payload: &P) -> PublishReport {
        let subscribers = {
            let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
            registry.topics.get(event).cloned().unwrap_or_default()
        };

        if subscribers.is_empty() {
            trace!(target: "runtime::events", event, "no subscribers");
            return PublishReport::default();
        }

        let mut report = PublishReport::default();
        for subscriber in &subscribers {
            let outcome = catch_unwind(AssertUnwindSafe(|| (subscriber.handler)(payload)));
            let failure = match outcome {
                Ok(Ok(())) => {
                    report.delivered += 1;
                    continue;
                }
                Ok(Err(err)) => err.to_string(),
                Err(panic) => panic_message(panic.as_ref()),
            };

            report.failed += 1;
            match subscriber.criticality {
                HandlerCriticality::Important => error!(
                    target: "runtime::events",
                    event,
                    id = subscriber.id.0,
                    error = %failure,
                    "Handler failed, continuing"
                ),
                HandlerCriticality::Optional => debug!(
                    target: "runtime::events",
                    event,
                    id = subscriber.id.0,
                    error = %failure,
                    "Optional handler failed"
                ),
            }
        }

        report
    }

    /// Number of handlers currently registered for `event`.
    pub fn subscriber_count(&self, event: &str) -> usize {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        registry.topics.get(event).map_or(0, Vec::len)
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("handler panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("handler panicked: {message}")
    } else {
        "handler panicked".to_owned()
    }
}

impl<P> Clone for EventBus<P> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<P> Default for EventBus<P> {
    fn default() -> Self {
        Self::new()
    }
}
