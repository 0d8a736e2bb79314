//! Lifecycle notifications raised while dependencies are resolved.

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyEvent {
    PreEmit { emitter: String },
    PostEmit { emitter: String, emitted: usize },
    PreFlatten,
    PostFlatten { inherited: usize },
}

pub trait DependencyEventListener: Send + Sync {
    fn on_event(&self, event: &DependencyEvent);
}

impl<F> DependencyEventListener for F
where
    F: Fn(&DependencyEvent) + Send + Sync,
{
    fn on_event(&self, event: &DependencyEvent) {
        self(event)
    }
}

/// Fans events out to listeners in subscription order.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: Vec<Box<dyn DependencyEventListener>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl DependencyEventListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn dispatch(&self, event: DependencyEvent) {
        for listener in &self.listeners {
            listener.on_event(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// Logs every event at debug level.
pub struct TracingListener;

impl DependencyEventListener for TracingListener {
    fn on_event(&self, event: &DependencyEvent) {
        match event {
            DependencyEvent::PreEmit { emitter } => {
                debug!(emitter = %emitter, "emitting dependencies")
            }
            DependencyEvent::PostEmit { emitter, emitted } => {
                debug!(emitter = %emitter, emitted, "emitted dependencies")
            }
            DependencyEvent::PreFlatten => debug!("flattening inherited dependencies"),
            DependencyEvent::PostFlatten { inherited } => {
                debug!(inherited, "flattened inherited dependencies")
            }
        }
    }
}
