//! Configuration file discovery, loading and saving.
//!
//! Search order:
//! 1. Current directory (`./.paddleocr_cli.yaml`)
//! 2. Project root, the nearest ancestor holding a `.claude/` directory
//! 3. User config (`~/.config/paddleocr_cli/config.yaml`)

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_FILENAME: &str = ".paddleocr_cli.yaml";
const USER_CONFIG_DIR: &str = ".config/paddleocr_cli";
const USER_CONFIG_FILE: &str = "config.yaml";
const PROJECT_MARKER: &str = ".claude";

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub server_url: String,
    pub access_token: String,
}

impl Configuration {
    pub fn is_configured(&self) -> bool {
        !self.server_url.is_empty() && !self.access_token.is_empty()
    }

    /// Token suitable for display: `***` plus its last 8 characters.
    pub fn masked_token(&self) -> Option<String> {
        let chars: Vec<char> = self.access_token.chars().collect();
        if chars.len() <= 8 {
            return None;
        }
        let tail: String = chars[chars.len() - 8..].iter().collect();
        Some(format!("***{}", tail))
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("server_url", &self.server_url)
            .field(
                "access_token",
                &if self.access_token.is_empty() { "" } else { "***" },
            )
            .finish()
    }
}

/// On-disk layout: everything lives under a `paddleocr` key.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    paddleocr: Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Scope {
    #[default]
    User,
    Project,
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub description: &'static str,
    pub path: String,
    pub exists: bool,
}

/// Resolves config paths relative to a working directory and home directory.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    cwd: PathBuf,
    home: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cwd: impl Into<PathBuf>, home: Option<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            home,
        }
    }

    pub fn from_env() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(cwd, dirs::home_dir())
    }

    pub fn local_path(&self) -> PathBuf {
        self.cwd.join(CONFIG_FILENAME)
    }

    pub fn user_path(&self) -> Option<PathBuf> {
        self.home
            .as_ref()
            .map(|home| home.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE))
    }

    /// Walk up from the working directory looking for a `.claude/` directory.
    /// The walk stops at the home directory or the filesystem root.
    pub fn project_root(&self) -> Option<PathBuf> {
        let mut current = self.cwd.as_path();
        loop {
            if current.join(PROJECT_MARKER).is_dir() {
                return Some(current.to_path_buf());
            }
            if self.home.as_deref() == Some(current) {
                return None;
            }
            current = current.parent()?;
        }
    }

    pub fn project_path(&self) -> Option<PathBuf> {
        self.project_root().map(|root| root.join(CONFIG_FILENAME))
    }

    pub fn find_config(&self) -> Option<PathBuf> {
        let candidates = [Some(self.local_path()), self.project_path(), self.user_path()];
        let found = candidates.into_iter().flatten().find(|p| p.is_file());
        match &found {
            Some(path) => debug!(path = %path.display(), "Found config file"),
            None => debug!("No config file found"),
        }
        found
    }

    /// Load from an explicit path, or from the first file the search finds.
    ///
    /// A missing explicit path is an error; finding nothing during the search
    /// yields an empty configuration.
    pub fn load(&self, explicit: Option<&Path>) -> Result<Configuration> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::ConfigNotFound(path.to_path_buf()));
                }
                path.to_path_buf()
            }
            None => match self.find_config() {
                Some(path) => path,
                None => return Ok(Configuration::default()),
            },
        };
        read_config(&path)
    }

    /// Write the configuration, defaulting to the user config path.
    /// Returns the path written.
    pub fn save(&self, config: &Configuration, explicit: Option<&Path>) -> Result<PathBuf> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => self.user_path().ok_or(Error::NoHomeDir)?,
        };
        write_config(config, &path)?;
        Ok(path)
    }

    pub fn resolve_save_path(&self, scope: Scope) -> Result<PathBuf> {
        match scope {
            Scope::Local => Ok(self.local_path()),
            Scope::Project => self.project_path().ok_or(Error::NoProjectRoot),
            Scope::User => self.user_path().ok_or(Error::NoHomeDir),
        }
    }

    pub fn list_locations(&self) -> Vec<ConfigLocation> {
        vec![
            location("Current directory", Some(self.local_path())),
            location("Project root", self.project_path()),
            location("User config", self.user_path()),
        ]
    }
}

fn location(description: &'static str, path: Option<PathBuf>) -> ConfigLocation {
    match path {
        Some(path) => ConfigLocation {
            description,
            exists: path.exists(),
            path: path.display().to_string(),
        },
        None => ConfigLocation {
            description,
            path: "(not found)".to_string(),
            exists: false,
        },
    }
}

fn read_config(path: &Path) -> Result<Configuration> {
    let raw = fs::read_to_string(path)
        .map_err(|e| Error::io(format!("Failed to read config {}", path.display()), e))?;

    if raw.trim().is_empty() {
        return Ok(Configuration::default());
    }

    let file: ConfigFile = serde_yaml::from_str(&raw).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), "Loaded config");
    Ok(file.paddleocr)
}

fn write_config(config: &Configuration, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::io(
                    format!("Failed to create config directory {}", parent.display()),
                    e,
                )
            })?;
        }
    }

    let yaml = serde_yaml::to_string(&ConfigFile {
        paddleocr: config.clone(),
    })
    .map_err(Error::ConfigSerialize)?;

    write_private(path, yaml.as_bytes())
        .map_err(|e| Error::io(format!("Failed to write config {}", path.display()), e))?;

    info!(path = %path.display(), "Wrote config");
    Ok(())
}

// The file holds a bearer token, so only the owner may read it.
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    fs::write(path, contents)
}
