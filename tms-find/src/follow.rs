//! Follow mode: re-render a transcript while it is being edited
//!
//! The file is polled at a fixed interval. Every detected change is passed
//! through an adaptive [`Debouncer`]: small edits are debounced as typing,
//! large jumps in length as a paste. Once the file has been quiet for longer
//! than the idle delay the debouncer drops back to idle mode. Shutdown
//! flushes any pending update so the final state is always rendered.

use anyhow::{Context, Result};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use tms_common::config::TomlConfig;
use tms_common::{DebounceMode, Debouncer, DelayProfile};

/// Polling and debounce settings for follow mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowSettings {
    pub poll_interval: Duration,
    /// Length change (in chars) at or above which an edit counts as a paste
    pub paste_threshold: usize,
    pub profile: DelayProfile,
}

impl From<&TomlConfig> for FollowSettings {
    fn from(config: &TomlConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.follow.poll_interval_ms),
            paste_threshold: config.follow.paste_threshold,
            profile: config.debounce,
        }
    }
}

/// Debounce mode for an edit from `previous` to `next`
pub fn classify_edit(previous: &str, next: &str, paste_threshold: usize) -> DebounceMode {
    let delta = previous.chars().count().abs_diff(next.chars().count());
    if delta >= paste_threshold {
        DebounceMode::Paste
    } else {
        DebounceMode::Typing
    }
}

/// Watch `path` until `shutdown` resolves
///
/// `on_update` receives the initial file contents immediately, then the
/// contents after each debounced burst of changes. Read errors during
/// polling (e.g. the file is mid-rewrite) are logged and retried on the next
/// tick; failing to read the file at startup is an error.
pub async fn follow<F, S>(
    path: &Path,
    settings: FollowSettings,
    on_update: F,
    shutdown: S,
) -> Result<()>
where
    F: Fn(String) + Send + Sync + 'static,
    S: Future<Output = ()>,
{
    let initial = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let on_update = Arc::new(on_update);
    (*on_update)(initial.clone());

    let sink = Arc::clone(&on_update);
    let debouncer = Debouncer::new(settings.profile, move |content: String| (*sink)(content))?;
    debouncer.set_mode(DebounceMode::Idle);

    let idle_after = settings.profile.delay(DebounceMode::Idle);
    let mut last = initial;
    let mut last_change = Instant::now();

    let mut ticker = tokio::time::interval(settings.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    info!(
        "Following {} (poll every {:?})",
        path.display(),
        settings.poll_interval
    );

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                debouncer.flush();
                info!("Stopped following {}", path.display());
                return Ok(());
            }
            _ = ticker.tick() => {}
        }

        let current = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                continue;
            }
        };

        if current == last {
            if debouncer.mode() != DebounceMode::Idle && last_change.elapsed() >= idle_after {
                debouncer.set_mode(DebounceMode::Idle);
            }
            continue;
        }

        let mode = classify_edit(&last, &current, settings.paste_threshold);
        debug!("Change detected in {} ({} edit)", path.display(), mode);

        debouncer.set_mode(mode);
        debouncer.call(current.clone());

        last = current;
        last_change = Instant::now();
    }
}
