use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use tracing::info;

use crate::config::Shortcut;

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("application path does not exist: {}", .0.display())]
    MissingExecutable(PathBuf),

    #[error("failed to launch {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Starts the shortcut's executable, in its working directory when one is set.
pub fn launch(shortcut: &Shortcut) -> Result<Child, LaunchError> {
    let app_path = Path::new(&shortcut.app_path);
    if !app_path.exists() {
        return Err(LaunchError::MissingExecutable(app_path.to_path_buf()));
    }

    let mut command = Command::new(app_path);
    if !shortcut.env_path.is_empty() {
        command.current_dir(&shortcut.env_path);
    }

    let child = command.spawn().map_err(|source| LaunchError::Spawn {
        path: app_path.to_path_buf(),
        source,
    })?;
    info!("Launched {} (pid {})", shortcut.app_path, child.id());
    Ok(child)
}
