//! Minimal view stack
//!
//! Turns "go back" requests into "view became active" announcements so the
//! map can reload without knowing who sent the user back.

use addrmap_common::events::{AppEvent, EventBus, View};
use tracing::debug;

pub struct Navigator {
    stack: Vec<View>,
    bus: EventBus,
}

impl Navigator {
    /// Start on `root` and announce it as active
    pub fn new(root: View, bus: EventBus) -> Self {
        bus.emit_lossy(AppEvent::view_activated(root));
        Self {
            stack: vec![root],
            bus,
        }
    }

    pub fn current(&self) -> View {
        // The root is never popped
        self.stack[self.stack.len() - 1]
    }

    /// Push `view` and announce it
    pub fn navigate(&mut self, view: View) {
        self.stack.push(view);
        debug!(?view, depth = self.stack.len(), "Navigated");
        self.bus.emit_lossy(AppEvent::view_activated(view));
    }

    /// Pop the current view and re-announce the one below; no-op at the root
    pub fn back(&mut self) -> View {
        if self.stack.len() > 1 {
            self.stack.pop();
            let view = self.current();
            debug!(?view, "Navigated back");
            self.bus.emit_lossy(AppEvent::view_activated(view));
        }
        self.current()
    }

    /// Honour `NavigateBack` requests coming from the top view
    pub fn handle_event(&mut self, event: &AppEvent) {
        if let AppEvent::NavigateBack { from, .. } = event {
            if *from == self.current() {
                self.back();
            }
        }
    }
}
