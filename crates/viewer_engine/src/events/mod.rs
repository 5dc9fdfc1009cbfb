//! Outbound notification events
//!
//! The scheduling core never calls into UI or navigation code directly; it
//! emits typed events through an [`EventSink`] and the embedding layer
//! decides what to do with them. Payloads are plain scalars so sinks can be
//! forwarded across thread or FFI boundaries without borrowing core state.

/// Events emitted by the viewer core
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    /// The camera moved or was programmatically updated this tick
    CameraChanged,

    /// The drawing surface was resized
    Resized {
        /// New surface width in pixels
        width: u32,
        /// New surface height in pixels
        height: u32,
    },

    /// Progressive render progress changed
    ///
    /// Emitted at whole-percent granularity; reaches 100 exactly once per
    /// redraw cycle, when the phase machine enters `Finished`.
    RenderProgress {
        /// Completion in percent, 0..=100
        percent: u32,
    },

    /// Geometry arrived or was removed, invalidating cached world bounds
    SceneUpdated,
}

/// Receiver for viewer events
///
/// Implementations must not call back into the orchestrator; events are
/// delivered mid-tick and the core's state is not reentrant.
pub trait EventSink {
    /// Deliver one event
    fn emit(&mut self, event: ViewerEvent);
}

/// Vec-backed sink for tests and headless runs
#[derive(Debug, Default)]
pub struct CollectedEvents {
    events: Vec<ViewerEvent>,
}

impl CollectedEvents {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All events emitted so far, in delivery order
    pub fn events(&self) -> &[ViewerEvent] {
        &self.events
    }

    /// Drop all collected events
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Progress percentages seen, in order
    pub fn progress_values(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ViewerEvent::RenderProgress { percent } => Some(*percent),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for CollectedEvents {
    fn emit(&mut self, event: ViewerEvent) {
        self.events.push(event);
    }
}

/// Sink that drops everything, for embeddings with no UI layer
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: ViewerEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collected_events_preserve_order() {
        let mut sink = CollectedEvents::new();
        sink.emit(ViewerEvent::CameraChanged);
        sink.emit(ViewerEvent::RenderProgress { percent: 50 });
        sink.emit(ViewerEvent::RenderProgress { percent: 100 });

        assert_eq!(sink.events().len(), 3);
        assert_eq!(sink.progress_values(), vec![50, 100]);
    }

    #[test]
    fn test_clear_drops_history() {
        let mut sink = CollectedEvents::new();
        sink.emit(ViewerEvent::SceneUpdated);
        sink.clear();
        assert!(sink.events().is_empty());
    }
}
