//! Backup orchestration around [`SwitchSession`].
//!
//! This module loads the switch inventory, stores downloaded configurations
//! on disk and walks the inventory one switch at a time. A failing switch is
//! logged and recorded; the run always continues with the next target.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_HTTP_PORT;
use crate::error::SwitchError;
use crate::session::SwitchSession;

/// One switch to back up.
#[derive(Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwitchTarget {
    /// Host name or IP address of the management interface.
    #[serde(rename = "hostname_IP", alias = "host")]
    pub host: String,

    /// HTTP port of the management interface.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Login user.
    #[serde(alias = "username")]
    pub user: String,

    /// Login password.
    pub password: String,
}

impl fmt::Debug for SwitchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwitchTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

fn default_port() -> u16 {
    DEFAULT_HTTP_PORT
}

/// Inventory file contents.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Inventory {
    pub switches: Vec<SwitchTarget>,

    /// Directory receiving the configuration files. Defaults to the working
    /// directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Store the running configuration as startup configuration when the
    /// switch does not deliver the latter.
    #[serde(default)]
    pub startup_fallback: bool,
}

impl Inventory {
    /// Parses an inventory from JSON text.
    pub fn from_json(text: &str) -> Result<Self, SwitchError> {
        serde_json::from_str(text).map_err(|e| SwitchError::Inventory(e.to_string()))
    }

    /// Loads an inventory file.
    pub fn load(path: &Path) -> Result<Self, SwitchError> {
        let text = fs::read_to_string(path).map_err(|e| {
            SwitchError::Inventory(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    /// JSON schema of the inventory file, pretty printed.
    pub fn json_schema() -> Result<String, SwitchError> {
        let schema = schemars::schema_for!(Inventory);
        serde_json::to_string_pretty(&schema).map_err(|e| SwitchError::Inventory(e.to_string()))
    }
}

/// Kind of configuration artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ConfigKind {
    Running,
    Startup,
}

impl ConfigKind {
    /// File name suffix of this kind.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Running => "running.config.txt",
            Self::Startup => "startup.config.txt",
        }
    }
}

/// Directory that receives configuration artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the artifact `kind` stored under `label`.
    pub fn path_for(&self, label: &str, kind: ConfigKind) -> PathBuf {
        self.dir
            .join(format!("{}.{}", sanitize_label(label), kind.suffix()))
    }

    /// Writes `text` as artifact `kind` under `label`, replacing older files.
    pub fn save(&self, label: &str, kind: ConfigKind, text: &str) -> Result<PathBuf, SwitchError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(label, kind);
        fs::write(&path, text)?;
        info!("{:?} config saved: {}", kind, path.display());
        Ok(path)
    }

    /// Moves an artifact from `old_label` to `new_label`.
    ///
    /// Returns the new path, or `None` when the labels map to the same file or
    /// no artifact exists under `old_label`.
    pub fn relabel(
        &self,
        old_label: &str,
        new_label: &str,
        kind: ConfigKind,
    ) -> Result<Option<PathBuf>, SwitchError> {
        let from = self.path_for(old_label, kind);
        let to = self.path_for(new_label, kind);
        if from == to || !from.exists() {
            return Ok(None);
        }
        fs::rename(&from, &to)?;
        info!("renamed {} -> {}", from.display(), to.display());
        Ok(Some(to))
    }
}

/// Makes a label safe to use as a file name component.
pub fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Behaviour switches of a backup run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackupOptions {
    /// Save the running configuration as startup configuration when the
    /// device does not deliver one.
    pub startup_fallback: bool,
}

/// Where the stored startup artifact came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum StartupSource {
    /// Downloaded from the switch.
    Device,
    /// Copy of the running configuration.
    RunningFallback,
    /// Not stored.
    Unavailable,
}

/// Result of a successful backup of one switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupReport {
    /// Host the session connected to.
    pub host: String,
    /// Label the artifacts are stored under.
    pub label: String,
    pub running_path: PathBuf,
    pub startup_path: Option<PathBuf>,
    pub startup_source: StartupSource,
}

/// Backs up one switch.
///
/// The running configuration is first stored under the host label and moved
/// once the hostname from its content is known. Nothing is written when the
/// login or the running configuration download fails.
pub async fn backup_switch(
    target: &SwitchTarget,
    store: &ArtifactStore,
    options: BackupOptions,
) -> Result<BackupReport, SwitchError> {
    let mut session = SwitchSession::new(
        target.host.clone(),
        target.port,
        target.user.clone(),
        target.password.clone(),
    )?;
    session.authenticate().await?;

    let running = session.download_running_config().await?;
    let mut running_path = store.save(&target.host, ConfigKind::Running, &running)?;

    let label = session.extract_hostname(&running);
    if let Some(path) = store.relabel(&target.host, &label, ConfigKind::Running)? {
        running_path = path;
    }

    let (startup_path, startup_source) = match session.download_startup_config().await? {
        Some(startup) => (
            Some(store.save(&label, ConfigKind::Startup, &startup)?),
            StartupSource::Device,
        ),
        None if options.startup_fallback => {
            info!("{} using running config as startup config", target.host);
            (
                Some(store.save(&label, ConfigKind::Startup, &running)?),
                StartupSource::RunningFallback,
            )
        }
        None => {
            warn!(
                "{} startup config unavailable, switch may not support direct download",
                target.host
            );
            (None, StartupSource::Unavailable)
        }
    };

    info!("backup completed for {} (saved as {})", target.host, label);
    Ok(BackupReport {
        host: target.host.clone(),
        label,
        running_path,
        startup_path,
        startup_source,
    })
}

/// Outcome of a run over the whole inventory.
#[derive(Debug, Default)]
pub struct BackupSummary {
    pub completed: Vec<BackupReport>,
    /// Host and error of every failed switch, in inventory order.
    pub failed: Vec<(String, SwitchError)>,
}

impl BackupSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Backs up every switch of the inventory, one after another.
pub async fn run_backup(
    switches: &[SwitchTarget],
    store: &ArtifactStore,
    options: BackupOptions,
) -> BackupSummary {
    let mut summary = BackupSummary::default();
    for target in switches {
        info!("processing switch {}", target.host);
        match backup_switch(target, store, options).await {
            Ok(report) => summary.completed.push(report),
            Err(err) => {
                error!("{} backup failed ({}): {}", target.host, err.kind(), err);
                summary.failed.push((target.host.clone(), err));
            }
        }
    }
    summary
}
