//! Event registration and dispatch.
//!
//! Handlers register per uppercased event name and run concurrently when the
//! event fires. Dispatch is supervised fire-and-forget: [`EventDispatcher::trigger`]
//! returns once every handler task is spawned, and a handler that fails is
//! logged and counted without disturbing its siblings, later events, or the
//! read loop. Start order across successive triggers follows trigger order;
//! completion order is unconstrained.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tracing::warn;

use crate::diag::Diagnostics;
use crate::event::Event;

/// A registered event handler.
///
/// Implemented for any `Fn(Event) -> impl Future<Output = anyhow::Result<()>>`
/// closure; handlers carrying state implement the trait directly.
pub trait EventHandler: Send + Sync + 'static {
    fn handle(&self, event: Event) -> BoxFuture<'static, anyhow::Result<()>>;
}

impl<F, Fut> EventHandler for F
where
    F: Fn(Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn handle(&self, event: Event) -> BoxFuture<'static, anyhow::Result<()>> {
        Box::pin((self)(event))
    }
}

/// Handle returned by [`EventDispatcher::add`]; pass it back to
/// [`EventDispatcher::remove`] to deregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerId(u64);

struct Registration {
    id: HandlerId,
    handler: Arc<dyn EventHandler>,
}

/// Registry of event name to handler set, plus the runtime handle the
/// handler tasks are spawned on.
///
/// The scheduler is supplied at construction; the dispatcher never reaches
/// for ambient runtime state.
pub struct EventDispatcher {
    runtime: Handle,
    registry: RwLock<HashMap<String, Vec<Registration>>>,
    next_id: AtomicU64,
    diagnostics: Arc<Diagnostics>,
}

impl EventDispatcher {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            registry: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            diagnostics: Arc::new(Diagnostics::default()),
        }
    }

    /// The sink where recovered failures are counted.
    pub fn diagnostics(&self) -> Arc<Diagnostics> {
        Arc::clone(&self.diagnostics)
    }

    /// Register `handler` for `event` (case-insensitive).
    ///
    /// Set semantics by handler identity: adding the same `Arc` under the
    /// same event again is a no-op that returns the existing id, so a
    /// double-registered handler still runs once per trigger.
    pub fn add(&self, event: &str, handler: Arc<dyn EventHandler>) -> HandlerId {
        let mut registry = self.registry.write().unwrap_or_else(|e| e.into_inner());
        let entries = registry.entry(event.to_uppercase()).or_default();
        if let Some(existing) = entries
            .iter()
            .find(|registration| Arc::ptr_eq(&registration.handler, &handler))
        {
            return existing.id;
        }
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        entries.push(Registration { id, handler });
        id
    }

    /// Deregister a handler. Returns whether anything was removed.
    pub fn remove(&self, event: &str, id: HandlerId) -> bool {
        let mut registry = self.registry.write().unwrap_or_else(|e| e.into_inner());
        let Some(entries) = registry.get_mut(&event.to_uppercase()) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|registration| registration.id != id);
        entries.len() != before
    }

    /// Schedule every handler registered for `event.name`, concurrently.
    /// Returns the number of handler tasks spawned.
    pub fn trigger(&self, event: &Event) -> usize {
        let handlers: Vec<Arc<dyn EventHandler>> = {
            let registry = self.registry.read().unwrap_or_else(|e| e.into_inner());
            match registry.get(&event.name.to_uppercase()) {
                Some(entries) => entries
                    .iter()
                    .map(|registration| Arc::clone(&registration.handler))
                    .collect(),
                None => return 0,
            }
        };

        for handler in &handlers {
            let future = handler.handle(event.clone());
            let diagnostics = Arc::clone(&self.diagnostics);
            let name = event.name.clone();
            self.runtime.spawn(async move {
                if let Err(error) = future.await {
                    diagnostics.record_handler_failure();
                    warn!(event = %name, error = %error, "event handler failed");
                }
            });
        }
        handlers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Fields;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    fn dispatcher() -> EventDispatcher {
        EventDispatcher::new(Handle::current())
    }

    fn ping() -> Event {
        Event::new("PING", Fields::Positional(vec!["server1".into()]))
    }

    /// Handler that reports each invocation on a channel.
    fn reporting(tx: mpsc::UnboundedSender<String>) -> Arc<dyn EventHandler> {
        Arc::new(move |event: Event| {
            let tx = tx.clone();
            async move {
                tx.send(event.name).ok();
                anyhow::Ok(())
            }
        })
    }

    async fn recv_one(rx: &mut mpsc::UnboundedReceiver<String>) -> Option<String> {
        timeout(Duration::from_secs(1), rx.recv()).await.ok()?
    }

    #[tokio::test]
    async fn test_duplicate_registration_runs_once() {
        let events = dispatcher();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handler = reporting(tx);
        let first = events.add("ping", handler.clone());
        let second = events.add("PING", handler.clone());
        assert_eq!(first, second);

        assert_eq!(events.trigger(&ping()), 1);
        assert_eq!(recv_one(&mut rx).await.as_deref(), Some("PING"));
        assert!(
            timeout(Duration::from_millis(50), rx.recv()).await.is_err(),
            "handler must not run twice"
        );
    }

    #[tokio::test]
    async fn test_distinct_handlers_all_run() {
        let events = dispatcher();
        let (tx, mut rx) = mpsc::unbounded_channel();
        events.add("PING", reporting(tx.clone()));
        events.add("PING", reporting(tx.clone()));
        assert_eq!(events.trigger(&ping()), 2);
        assert!(recv_one(&mut rx).await.is_some());
        assert!(recv_one(&mut rx).await.is_some());
    }

    #[tokio::test]
    async fn test_event_name_case_insensitive() {
        let events = dispatcher();
        let (tx, mut rx) = mpsc::unbounded_channel();
        events.add("privmsg", reporting(tx));
        let event = Event::new("PRIVMSG", Fields::Positional(vec![]));
        assert_eq!(events.trigger(&event), 1);
        assert!(recv_one(&mut rx).await.is_some());
    }

    #[tokio::test]
    async fn test_trigger_without_handlers() {
        let events = dispatcher();
        assert_eq!(events.trigger(&ping()), 0);
    }

    #[tokio::test]
    async fn test_remove_deregisters() {
        let events = dispatcher();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = events.add("PING", reporting(tx));
        assert!(events.remove("ping", id));
        assert!(!events.remove("ping", id));
        assert_eq!(events.trigger(&ping()), 0);
        assert!(timeout(Duration::from_millis(50), rx.recv()).await.is_err());
    }

    async fn failing(_: Event) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("handler exploded"))
    }

    #[tokio::test]
    async fn test_failing_handler_isolated_and_counted() {
        let events = dispatcher();
        let (tx, mut rx) = mpsc::unbounded_channel();
        events.add("PING", Arc::new(failing));
        events.add("PING", reporting(tx));

        assert_eq!(events.trigger(&ping()), 2);
        // The sibling still runs.
        assert!(recv_one(&mut rx).await.is_some());
        // A later event is unaffected.
        assert_eq!(events.trigger(&ping()), 2);
        assert!(recv_one(&mut rx).await.is_some());

        let diagnostics = events.diagnostics();
        for _ in 0..100 {
            if diagnostics.snapshot().handler_failures == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(diagnostics.snapshot().handler_failures, 2);
    }
}
