pub mod rasterize;
pub mod source;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::config::AppConfig;
use crate::model::issue::IssueType;
use crate::model::result_item::Icon;
use rasterize::{CommandRasterizer, Rasterizer};
use source::{HttpIconSource, IconSource};

#[derive(Debug, Clone, thiserror::Error)]
pub enum IconError {
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("conversion failed: {0}")]
    Convert(String),
    #[error("write failed: {0}")]
    Write(String),
}

/// How a background population task ended.
#[derive(Debug, Clone)]
pub enum IconOutcome {
    Stored { path: PathBuf, bytes: usize },
    NotFound,
    Failed(IconError),
}

/// Receives the outcome of every population task.
pub trait IconObserver: Send + Sync {
    fn record(&self, avatar_id: &str, outcome: &IconOutcome);
}

pub struct LogObserver;

impl IconObserver for LogObserver {
    fn record(&self, avatar_id: &str, outcome: &IconOutcome) {
        match outcome {
            IconOutcome::Stored { path, bytes } => {
                tracing::debug!(avatar_id, path = %path.display(), bytes, "cached icon")
            }
            IconOutcome::NotFound => tracing::info!(avatar_id, "icon not found"),
            IconOutcome::Failed(e) => tracing::warn!(avatar_id, error = %e, "icon population failed"),
        }
    }
}

pub type PendingIcon = Shared<BoxFuture<'static, IconOutcome>>;

type InFlight = Arc<Mutex<HashMap<String, PendingIcon>>>;

/// Maps issue-type avatar ids to PNG files under `cache_root`.
///
/// A file on disk is a hit. On a miss the path is still returned right away
/// and a background task fills it in, so the icon shows up on a later run.
/// Concurrent misses for one avatar id share a single task.
pub struct IconCache {
    cache_root: PathBuf,
    default_icon: PathBuf,
    source: Arc<dyn IconSource>,
    rasterizer: Arc<dyn Rasterizer>,
    observer: Arc<dyn IconObserver>,
    in_flight: InFlight,
}

impl IconCache {
    pub fn new(
        cache_root: impl Into<PathBuf>,
        default_icon: impl Into<PathBuf>,
        source: Arc<dyn IconSource>,
        rasterizer: Arc<dyn Rasterizer>,
    ) -> Self {
        Self {
            cache_root: cache_root.into(),
            default_icon: default_icon.into(),
            source,
            rasterizer,
            observer: Arc::new(LogObserver),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let (program, args) = config.rasterizer_command();
        Self::new(
            config.cache_dir(),
            config.default_icon(),
            Arc::new(HttpIconSource::new()),
            Arc::new(CommandRasterizer::new(program, args)),
        )
    }

    #[cfg(test)]
    pub fn with_observer(mut self, observer: Arc<dyn IconObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn icon_path(&self, avatar_id: &str) -> PathBuf {
        self.cache_root.join(format!("{avatar_id}.png"))
    }

    /// Resolve the icon for an issue type. Never blocks on the network.
    ///
    /// Must be called from within a Tokio runtime when the icon is not cached yet.
    pub fn resolve(&self, issue_type: &IssueType) -> Icon {
        let Some(avatar_id) = issue_type.avatar_id.as_deref() else {
            return Icon::png(self.default_icon.to_string_lossy());
        };

        let path = self.icon_path(avatar_id);
        if !path.exists() {
            self.populate(avatar_id, issue_type.icon_url.clone(), path.clone());
        }
        Icon::png(path.to_string_lossy())
    }

    /// The running population task for `avatar_id`, if any.
    pub fn pending(&self, avatar_id: &str) -> Option<PendingIcon> {
        lock(&self.in_flight).get(avatar_id).cloned()
    }

    /// Wait for every in-flight task, including ones started while waiting.
    pub async fn wait_idle(&self) -> Vec<(String, IconOutcome)> {
        let mut outcomes = Vec::new();
        loop {
            let ids: Vec<String> = lock(&self.in_flight).keys().cloned().collect();
            let pending: Vec<(String, PendingIcon)> = ids
                .into_iter()
                .filter_map(|id| self.pending(&id).map(|task| (id, task)))
                .collect();
            if pending.is_empty() {
                return outcomes;
            }
            let (ids, tasks): (Vec<_>, Vec<_>) = pending.into_iter().unzip();
            let results = futures::future::join_all(tasks).await;
            outcomes.extend(ids.into_iter().zip(results));
        }
    }

    fn populate(&self, avatar_id: &str, icon_url: Option<String>, path: PathBuf) {
        let mut in_flight = lock(&self.in_flight);
        if in_flight.contains_key(avatar_id) {
            tracing::debug!(avatar_id, "icon fetch already in flight");
            return;
        }

        let id = avatar_id.to_string();
        let source = Arc::clone(&self.source);
        let rasterizer = Arc::clone(&self.rasterizer);
        let observer = Arc::clone(&self.observer);
        let registry = Arc::clone(&self.in_flight);

        let task_id = id.clone();
        let task = async move {
            let result = fetch_and_store(&*source, &*rasterizer, icon_url.as_deref(), &path).await;
            let outcome = match result {
                Ok(Some(bytes)) => IconOutcome::Stored { path, bytes },
                Ok(None) => IconOutcome::NotFound,
                Err(e) => IconOutcome::Failed(e),
            };
            observer.record(&task_id, &outcome);
            lock(&registry).remove(&task_id);
            outcome
        }
        .boxed()
        .shared();

        tracing::debug!(avatar_id, "fetching icon in background");
        in_flight.insert(id, task.clone());
        drop(in_flight);
        tokio::spawn(task);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Icons are served at 16px; bump the declared size so the raster is crisp.
fn upscale(svg: &str) -> String {
    svg.trim().replace("16px", "32px")
}

async fn fetch_and_store(
    source: &dyn IconSource,
    rasterizer: &dyn Rasterizer,
    icon_url: Option<&str>,
    path: &Path,
) -> Result<Option<usize>, IconError> {
    let Some(url) = icon_url else {
        return Ok(None);
    };
    let Some(svg) = source.fetch_svg(url).await? else {
        return Ok(None);
    };

    let png = rasterizer.rasterize(&upscale(&svg)).await?;
    write_icon(path, &png)
        .await
        .map_err(|e| IconError::Write(format!("{}: {e}", path.display())))?;
    Ok(Some(png.len()))
}

/// Write through a temporary sibling so readers never see a partial PNG.
async fn write_icon(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{file_name}.{}.part", std::process::id()));

    if let Err(e) = tokio::fs::write(&tmp, bytes).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }
    if path.exists() {
        // another process got there first
        let _ = tokio::fs::remove_file(&tmp).await;
        return Ok(());
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }
    Ok(())
}
