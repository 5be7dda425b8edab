//! Adaptive debouncing of editor updates
//!
//! Coalesces a rapid stream of update calls into a single deferred
//! invocation of a target operation. The quiet period depends on the current
//! [`DebounceMode`]: short while pasting, medium while typing, long when idle.
//!
//! # Scheduling
//!
//! Each [`Debouncer::call`] replaces the pending arguments and reschedules a
//! Tokio task that sleeps for the current delay and then invokes the target.
//! Rescheduling aborts the previous task. A generation counter is bumped on
//! every call/cancel/flush so a timer that already woke but lost the race is
//! a no-op.
//!
//! # Mode switches
//!
//! [`Debouncer::set_mode`] flushes any pending invocation before rebinding the
//! delay, so the last update issued under the old timing regime is never
//! dropped.
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use tms_common::debounce::{DebounceMode, Debouncer, DelayProfile};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> tms_common::Result<()> {
//! let saved = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&saved);
//! let debouncer = Debouncer::new(DelayProfile::default(), move |text: String| {
//!     sink.lock().unwrap().push(text);
//! })?;
//!
//! debouncer.call("h".to_string());
//! debouncer.call("hi".to_string());
//!
//! // Switching mode flushes the pending "hi" immediately
//! debouncer.set_mode(DebounceMode::Idle);
//! assert_eq!(*saved.lock().unwrap(), vec!["hi".to_string()]);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::{Error, Result};

/// Timing regime of the debouncer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebounceMode {
    /// Keystroke-by-keystroke editing
    #[default]
    Typing,
    /// Bulk insertion (paste, import)
    Paste,
    /// No recent user activity
    Idle,
}

impl DebounceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebounceMode::Typing => "typing",
            DebounceMode::Paste => "paste",
            DebounceMode::Idle => "idle",
        }
    }
}

impl fmt::Display for DebounceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DebounceMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "typing" => Ok(DebounceMode::Typing),
            "paste" => Ok(DebounceMode::Paste),
            "idle" => Ok(DebounceMode::Idle),
            other => Err(Error::InvalidInput(format!(
                "Unknown debounce mode '{}' (expected typing, paste or idle)",
                other
            ))),
        }
    }
}

/// Delay bound to each [`DebounceMode`], in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayProfile {
    pub typing_ms: u64,
    pub paste_ms: u64,
    pub idle_ms: u64,
}

impl Default for DelayProfile {
    fn default() -> Self {
        Self {
            typing_ms: 300,
            paste_ms: 100,
            idle_ms: 1000,
        }
    }
}

impl DelayProfile {
    /// Delay for the given mode
    pub fn delay(&self, mode: DebounceMode) -> Duration {
        let ms = match mode {
            DebounceMode::Typing => self.typing_ms,
            DebounceMode::Paste => self.paste_ms,
            DebounceMode::Idle => self.idle_ms,
        };
        Duration::from_millis(ms)
    }
}

type Target<A> = Box<dyn Fn(A) + Send + Sync + 'static>;

/// Debounced wrapper around a target operation
///
/// At most one deferred invocation is outstanding at any time. Dropping the
/// debouncer cancels it without invoking the target.
pub struct Debouncer<A: Send + 'static> {
    shared: Arc<Shared<A>>,
    runtime: Handle,
}

struct Shared<A> {
    target: Target<A>,
    profile: DelayProfile,
    state: Mutex<State<A>>,
}

struct State<A> {
    mode: DebounceMode,
    pending: Option<A>,
    timer: Option<JoinHandle<()>>,
    /// Bumped whenever the scheduled window is replaced or closed
    generation: u64,
}

impl<A> State<A> {
    /// Close the current window: stop its timer and hand back its arguments
    fn take_pending(&mut self) -> Option<A> {
        self.generation = self.generation.wrapping_add(1);
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.pending.take()
    }
}

impl<A> Shared<A> {
    fn lock(&self) -> MutexGuard<'_, State<A>> {
        // The target never runs under the lock, so poisoning cannot leave
        // the state half-updated
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Timer expiry for the window identified by `generation`
    fn fire(&self, generation: u64) {
        let args = {
            let mut state = self.lock();
            if state.generation != generation {
                trace!("Stale debounce timer (generation {}) ignored", generation);
                return;
            }
            state.timer = None;
            state.pending.take()
        };

        if let Some(args) = args {
            trace!("Debounce timer fired (generation {})", generation);
            (self.target)(args);
        }
    }
}

impl<A: Send + 'static> Debouncer<A> {
    /// Create a debouncer in [`DebounceMode::Typing`]
    ///
    /// Must be called from within a Tokio runtime; timers are spawned on
    /// that runtime.
    ///
    /// # Errors
    /// [`Error::Config`] if no Tokio runtime is active.
    pub fn new<F>(profile: DelayProfile, target: F) -> Result<Self>
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        let runtime = Handle::try_current()
            .map_err(|e| Error::Config(format!("Debouncer requires a Tokio runtime: {}", e)))?;

        Ok(Self {
            shared: Arc::new(Shared {
                target: Box::new(target),
                profile,
                state: Mutex::new(State {
                    mode: DebounceMode::default(),
                    pending: None,
                    timer: None,
                    generation: 0,
                }),
            }),
            runtime,
        })
    }

    /// Record `args` and (re)schedule the deferred invocation
    ///
    /// Never invokes the target immediately.
    pub fn call(&self, args: A) {
        let mut state = self.shared.lock();

        // Replace the current window
        state.take_pending();
        state.pending = Some(args);

        let generation = state.generation;
        let delay = self.shared.profile.delay(state.mode);
        let shared = Arc::clone(&self.shared);

        state.timer = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            shared.fire(generation);
        }));

        trace!(
            "Debounce scheduled in {:?} (mode={}, generation={})",
            delay,
            state.mode,
            generation
        );
    }

    /// Discard the pending invocation without calling the target
    pub fn cancel(&self) {
        if self.shared.lock().take_pending().is_some() {
            debug!("Pending debounced call cancelled");
        }
    }

    /// Invoke the target now with the last recorded arguments, if any
    pub fn flush(&self) {
        let args = self.shared.lock().take_pending();

        if let Some(args) = args {
            debug!("Pending debounced call flushed");
            (self.shared.target)(args);
        }
    }

    /// Switch timing regime
    ///
    /// A pending invocation is flushed before the new delay takes effect.
    /// Setting the current mode again is a no-op.
    pub fn set_mode(&self, mode: DebounceMode) {
        // Rebind and take the pending window under one lock so a concurrent
        // call() lands in the new mode, never in a window of the old one
        let (current, flushed) = {
            let mut state = self.shared.lock();
            if state.mode == mode {
                return;
            }
            let current = std::mem::replace(&mut state.mode, mode);
            (current, state.take_pending())
        };

        if let Some(args) = flushed {
            debug!("Pending debounced call flushed on mode switch");
            (self.shared.target)(args);
        }

        debug!(
            "Debounce mode {} -> {} (delay {:?})",
            current,
            mode,
            self.shared.profile.delay(mode)
        );
    }

    /// Current timing regime
    pub fn mode(&self) -> DebounceMode {
        self.shared.lock().mode
    }

    /// Delay applied to the next call
    pub fn delay(&self) -> Duration {
        self.shared.profile.delay(self.mode())
    }

    /// Whether an invocation is scheduled
    pub fn is_pending(&self) -> bool {
        self.shared.lock().pending.is_some()
    }
}

impl<A: Send + 'static> Drop for Debouncer<A> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_delays() {
        let profile = DelayProfile::default();
        assert_eq!(profile.delay(DebounceMode::Typing), Duration::from_millis(300));
        assert_eq!(profile.delay(DebounceMode::Paste), Duration::from_millis(100));
        assert_eq!(profile.delay(DebounceMode::Idle), Duration::from_millis(1000));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("typing".parse::<DebounceMode>().unwrap(), DebounceMode::Typing);
        assert_eq!(" Paste ".parse::<DebounceMode>().unwrap(), DebounceMode::Paste);
        assert_eq!("IDLE".parse::<DebounceMode>().unwrap(), DebounceMode::Idle);
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let err = "scrolling".parse::<DebounceMode>().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_mode_display_round_trips() {
        for mode in [DebounceMode::Typing, DebounceMode::Paste, DebounceMode::Idle] {
            assert_eq!(mode.to_string().parse::<DebounceMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_new_outside_runtime_fails() {
        let result = Debouncer::new(DelayProfile::default(), |_: u32| {});
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_starts_in_typing_mode() {
        let debouncer = Debouncer::new(DelayProfile::default(), |_: u32| {}).unwrap();
        assert_eq!(debouncer.mode(), DebounceMode::Typing);
        assert_eq!(debouncer.delay(), Duration::from_millis(300));
        assert!(!debouncer.is_pending());
    }
}
