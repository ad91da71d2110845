//! Workspace session: loads the `--state` file into a `DataStore` and
//! writes it back after mutating commands.

use std::path::{Path, PathBuf};

use opsdeck_core::store::seed;
use opsdeck_core::{DataStore, Workspace};

use crate::error::CliError;

pub struct Session {
    store: DataStore,
    path: Option<PathBuf>,
}

impl Session {
    /// Open the workspace at `path`. Missing file (or no path) means demo data.
    pub fn open(path: Option<&Path>) -> Result<Self, CliError> {
        let workspace = match path {
            Some(path) => read_workspace(path)?,
            None => {
                tracing::debug!("no workspace file; using demo data");
                seed::workspace()
            }
        };
        Ok(Self {
            store: DataStore::from_workspace(workspace),
            path: path.map(Path::to_path_buf),
        })
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    /// Write the store back to the workspace file.
    ///
    /// Without one the change only lived for this invocation; say so.
    pub fn persist(&self, quiet: bool) -> Result<(), CliError> {
        let Some(ref path) = self.path else {
            if !quiet {
                eprintln!("note: no --state file given; change not saved");
            }
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = self.store.to_workspace().to_json()?;
        std::fs::write(path, json)?;
        tracing::debug!(
            path = %path.display(),
            revision = self.store.revision(),
            "workspace saved"
        );
        Ok(())
    }
}

fn read_workspace(path: &Path) -> Result<Workspace, CliError> {
    match std::fs::read_to_string(path) {
        Ok(json) => Workspace::from_json(&json).map_err(|source| CliError::State {
            path: path.display().to_string(),
            source,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "workspace file missing; using demo data");
            Ok(seed::workspace())
        }
        Err(e) => Err(e.into()),
    }
}
