use std::time::{Duration, Instant};

/// Default coalescing window for re-render requests; rapid edit bursts
/// within it collapse into one render pass.
pub const DEFAULT_RENDER_DEBOUNCE: Duration = Duration::from_millis(50);

/// Cancel-pending-then-enqueue coalescing policy.
///
/// Scheduling replaces whatever is pending and restarts the window, so only
/// the last item of a burst survives. The policy holds no timers: the host
/// drives it by calling [`DebouncePolicy::poll`] with its own clock, which
/// keeps the core synchronous and testable with explicit instants.
/// Coalescing is a performance policy only; the delivered item is always the
/// latest one, so the final rendered state matches rendering on every edit.
#[derive(Debug)]
pub struct DebouncePolicy<T> {
    window: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> DebouncePolicy<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn schedule(&mut self, now: Instant, item: T) {
        self.pending = Some((now + self.window, item));
    }

    /// Takes the pending item once its window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if *deadline <= now => self.pending.take().map(|(_, item)| item),
            _ => None,
        }
    }

    /// Takes the pending item immediately, elapsed or not.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(_, item)| item)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<T> Default for DebouncePolicy<T> {
    fn default() -> Self {
        Self::new(DEFAULT_RENDER_DEBOUNCE)
    }
}
