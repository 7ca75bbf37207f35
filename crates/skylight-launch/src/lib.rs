//! Login item installation for skylight.
//!
//! Installing writes a LaunchAgent property list into the user's agent
//! directory and registers it with `launchctl`, so the app starts at login.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while installing or removing the login item.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("could not locate the installed executable: {0}")]
    ExecutableNotFound(String),

    #[error("could not determine the home directory")]
    NoHomeDirectory,

    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write login item descriptor: {0}")]
    Plist(#[from] plist::Error),

    #[error("launchctl {action} failed: {detail}")]
    ServiceManager { action: &'static str, detail: String },
}

/// Result type for login item operations.
pub type Result<T> = std::result::Result<T, LaunchError>;

/// The LaunchAgent property list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LaunchAgent {
    pub label: String,
    pub program_arguments: Vec<String>,
    pub run_at_load: bool,
    pub keep_alive: bool,
}

impl LaunchAgent {
    /// Agent that starts `executable` once at login and does not restart it.
    pub fn at_login(label: impl Into<String>, executable: &Path) -> Self {
        Self {
            label: label.into(),
            program_arguments: vec![executable.to_string_lossy().into_owned()],
            run_at_load: true,
            keep_alive: false,
        }
    }
}

/// The session's service manager.
pub trait ServiceManager {
    fn load(&self, descriptor: &Path) -> Result<()>;
    fn unload(&self, descriptor: &Path) -> Result<()>;
}

/// Registers agents by shelling out to `launchctl`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Launchctl;

impl Launchctl {
    fn run(action: &'static str, descriptor: &Path) -> Result<()> {
        let output = Command::new("launchctl")
            .arg(action)
            .arg(descriptor)
            .output()
            .map_err(|source| LaunchError::Io {
                path: PathBuf::from("launchctl"),
                source,
            })?;
        if !output.status.success() {
            return Err(LaunchError::ServiceManager {
                action,
                detail: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(())
    }
}

impl ServiceManager for Launchctl {
    fn load(&self, descriptor: &Path) -> Result<()> {
        Self::run("load", descriptor)
    }

    fn unload(&self, descriptor: &Path) -> Result<()> {
        Self::run("unload", descriptor)
    }
}

/// Label unique per user, e.g. `com.alex.skylight`.
pub fn label_for_user(user: &str) -> String {
    format!("com.{user}.skylight")
}

/// Absolute path of the running executable.
pub fn current_executable() -> Result<PathBuf> {
    let exe = std::env::current_exe()
        .map_err(|e| LaunchError::ExecutableNotFound(e.to_string()))?;
    exe.canonicalize().map_err(|source| LaunchError::Io { path: exe, source })
}

/// Installs and removes the skylight login item.
pub struct StartupInstaller<M = Launchctl> {
    agents_dir: PathBuf,
    label: String,
    manager: M,
}

impl StartupInstaller<Launchctl> {
    /// Installer for the current user's `~/Library/LaunchAgents`.
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir().ok_or(LaunchError::NoHomeDirectory)?;
        let user = std::env::var("USER").ok().or_else(|| {
            home.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        });
        let label = label_for_user(user.as_deref().unwrap_or("user"));
        Ok(Self::with_manager(
            home.join("Library").join("LaunchAgents"),
            label,
            Launchctl,
        ))
    }
}

impl<M: ServiceManager> StartupInstaller<M> {
    pub fn with_manager(agents_dir: impl Into<PathBuf>, label: impl Into<String>, manager: M) -> Self {
        Self {
            agents_dir: agents_dir.into(),
            label: label.into(),
            manager,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Where the descriptor for this label lives.
    pub fn descriptor_path(&self) -> PathBuf {
        self.agents_dir.join(format!("{}.plist", self.label))
    }

    /// Writes the descriptor for `executable` and registers it. An existing
    /// descriptor is unregistered and overwritten.
    ///
    /// Nothing is written if `executable` does not exist, and the descriptor is
    /// removed again if registering it fails.
    pub fn install(&self, executable: &Path) -> Result<PathBuf> {
        if !executable.is_absolute() || !executable.is_file() {
            return Err(LaunchError::ExecutableNotFound(
                executable.display().to_string(),
            ));
        }

        let descriptor = self.descriptor_path();
        if descriptor.exists() {
            if let Err(e) = self.manager.unload(&descriptor) {
                warn!(error = %e, "Failed to unload previous login item");
            }
        }

        fs::create_dir_all(&self.agents_dir).map_err(|source| LaunchError::Io {
            path: self.agents_dir.clone(),
            source,
        })?;
        plist::to_file_xml(&descriptor, &LaunchAgent::at_login(&self.label, executable))?;
        if let Err(e) = self.manager.load(&descriptor) {
            // launchd picks up every descriptor in the directory at login.
            if let Err(remove) = fs::remove_file(&descriptor) {
                warn!(error = %remove, descriptor = ?descriptor, "Failed to remove unregistered login item");
            }
            return Err(e);
        }

        info!(descriptor = ?descriptor, "Installed login item");
        info!("To disable, run: launchctl unload {}", descriptor.display());
        Ok(descriptor)
    }

    /// Unregisters and deletes the descriptor. Succeeds if nothing is installed.
    pub fn uninstall(&self) -> Result<()> {
        let descriptor = self.descriptor_path();
        if !descriptor.exists() {
            info!("No login item installed");
            return Ok(());
        }

        if let Err(e) = self.manager.unload(&descriptor) {
            warn!(error = %e, "Failed to unload login item, removing it anyway");
        }
        fs::remove_file(&descriptor).map_err(|source| LaunchError::Io {
            path: descriptor.clone(),
            source,
        })?;

        info!(descriptor = ?descriptor, "Removed login item");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use tempfile::tempdir;

    use super::*;

    #[derive(Default)]
    struct RecordingManager {
        calls: RefCell<Vec<(&'static str, PathBuf)>>,
        fail_load: bool,
    }

    impl ServiceManager for RecordingManager {
        fn load(&self, descriptor: &Path) -> Result<()> {
            self.calls
                .borrow_mut()
                .push(("load", descriptor.to_path_buf()));
            if self.fail_load {
                return Err(LaunchError::ServiceManager {
                    action: "load",
                    detail: "denied".into(),
                });
            }
            Ok(())
        }

        fn unload(&self, descriptor: &Path) -> Result<()> {
            self.calls
                .borrow_mut()
                .push(("unload", descriptor.to_path_buf()));
            Ok(())
        }
    }

    fn descriptor_count(dir: &Path) -> usize {
        match fs::read_dir(dir) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    #[test]
    fn test_install_writes_descriptor() {
        let temp = tempdir().unwrap();
        let agents = temp.path().join("LaunchAgents");
        let exe = temp.path().join("skylight");
        fs::write(&exe, b"").unwrap();

        let installer =
            StartupInstaller::with_manager(&agents, label_for_user("alex"), RecordingManager::default());
        let descriptor = installer.install(&exe).unwrap();

        assert_eq!(descriptor, agents.join("com.alex.skylight.plist"));
        let agent: LaunchAgent = plist::from_file(&descriptor).unwrap();
        assert_eq!(agent.label, "com.alex.skylight");
        assert_eq!(agent.program_arguments, vec![exe.to_string_lossy().into_owned()]);
        assert!(agent.run_at_load);
        assert!(!agent.keep_alive);

        let raw = fs::read_to_string(&descriptor).unwrap();
        assert!(raw.contains("<key>RunAtLoad</key>"));
        assert!(raw.contains("<key>ProgramArguments</key>"));

        assert_eq!(
            *installer.manager.calls.borrow(),
            vec![("load", descriptor.clone())]
        );
    }

    #[test]
    fn test_install_twice_then_uninstall() {
        let temp = tempdir().unwrap();
        let agents = temp.path().join("LaunchAgents");
        let exe = temp.path().join("skylight");
        fs::write(&exe, b"").unwrap();

        let installer =
            StartupInstaller::with_manager(&agents, label_for_user("alex"), RecordingManager::default());
        installer.install(&exe).unwrap();
        installer.install(&exe).unwrap();
        assert_eq!(descriptor_count(&agents), 1);

        let calls: Vec<_> = installer
            .manager
            .calls
            .borrow()
            .iter()
            .map(|(action, _)| *action)
            .collect();
        assert_eq!(calls, vec!["load", "unload", "load"]);

        installer.uninstall().unwrap();
        assert_eq!(descriptor_count(&agents), 0);
    }

    #[test]
    fn test_uninstall_when_absent_is_ok() {
        let temp = tempdir().unwrap();
        let installer = StartupInstaller::with_manager(
            temp.path().join("LaunchAgents"),
            label_for_user("alex"),
            RecordingManager::default(),
        );
        installer.uninstall().unwrap();
        installer.uninstall().unwrap();
        assert!(installer.manager.calls.borrow().is_empty());
    }

    #[test]
    fn test_missing_executable_writes_nothing() {
        let temp = tempdir().unwrap();
        let agents = temp.path().join("LaunchAgents");
        let installer =
            StartupInstaller::with_manager(&agents, label_for_user("alex"), RecordingManager::default());

        let result = installer.install(&temp.path().join("missing"));
        assert!(matches!(result, Err(LaunchError::ExecutableNotFound(_))));
        assert!(!agents.exists());
        assert!(installer.manager.calls.borrow().is_empty());
    }

    #[test]
    fn test_failed_registration_is_reported() {
        let temp = tempdir().unwrap();
        let exe = temp.path().join("skylight");
        fs::write(&exe, b"").unwrap();
        let installer = StartupInstaller::with_manager(
            temp.path().join("LaunchAgents"),
            label_for_user("alex"),
            RecordingManager {
                fail_load: true,
                ..Default::default()
            },
        );
        assert!(matches!(
            installer.install(&exe),
            Err(LaunchError::ServiceManager { action: "load", .. })
        ));
        assert!(!installer.descriptor_path().exists());
        assert_eq!(descriptor_count(&temp.path().join("LaunchAgents")), 0);
    }
}
