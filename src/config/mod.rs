//! Build configuration loaded from `shipstamp.toml`.
//!
//! The configuration is read once at program entry and passed by reference into
//! every component. Required keys are `project_name` and `share_path`; everything
//! else has a default.
//!
//! ```toml
//! project_name = "acme"
//! share_path = '\\fileserver\releases\acme'
//! extra_share_paths = ['\\backup\releases\acme', "/mnt/releases/acme"]
//! keep_releases = 2
//!
//! [packager]
//! native = ["pyinstaller", "--clean", "--distpath", "{{staging_dir}}", "{{project}}.spec"]
//!
//! [[stage.dirs]]
//! source = "browser"
//! native_only = true
//!
//! [launchers]
//! template = "launcher.bat.hbs"
//!
//! [[launchers.scripts]]
//! file_name = "start.bat"
//! args = "--headless"
//! ```

mod layout;

pub use layout::ProjectLayout;

use crate::error::{ConfigError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the project root
pub const CONFIG_FILE_NAME: &str = "shipstamp.toml";

/// Environment variable overriding `share_path`
pub const SHARE_PATH_ENV: &str = "SHIPSTAMP_SHARE_PATH";

/// Top-level build configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    /// Project name, used as the artifact name prefix
    pub project_name: String,

    /// Primary destination share
    pub share_path: PathBuf,

    /// Fallback destinations, probed in order after `share_path`
    #[serde(default)]
    pub extra_share_paths: Vec<PathBuf>,

    /// Destination for beta builds (default: `~/Windows`)
    #[serde(default)]
    pub beta_dir: Option<PathBuf>,

    /// Number of local releases kept by the retention sweep
    #[serde(default = "default_keep_releases")]
    pub keep_releases: usize,

    /// Release directory, relative to the project root
    #[serde(default = "default_release_dir")]
    pub release_dir: PathBuf,

    /// File name the packager gives a native build (default: `{project}.exe` / `{project}`)
    #[serde(default)]
    pub native_artifact: Option<String>,

    /// File name the packager gives a portable build
    #[serde(default = "default_portable_artifact")]
    pub portable_artifact: String,

    /// External packager commands
    #[serde(default)]
    pub packager: PackagerConfig,

    /// Staging rules
    #[serde(default)]
    pub stage: StageConfig,

    /// Launcher script generation
    #[serde(default)]
    pub launchers: LauncherConfig,

    /// Directory the configuration belongs to; set by [`BuildConfig::load`]
    #[serde(skip)]
    pub project_root: PathBuf,
}

/// Commands run for each build kind. The first element is the program.
///
/// Arguments are handlebars templates with `project`, `staging_dir`,
/// `work_dir` and `project_root` available.
#[derive(Debug, Clone, Deserialize)]
pub struct PackagerConfig {
    /// Command for native executable builds
    #[serde(default = "default_native_command")]
    pub native: Vec<String>,

    /// Command for portable archive builds
    #[serde(default)]
    pub portable: Vec<String>,
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self {
            native: default_native_command(),
            portable: Vec::new(),
        }
    }
}

/// Rules for assembling the staging area
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StageConfig {
    /// Auxiliary directories merged into the staging area
    #[serde(default)]
    pub dirs: Vec<StageDir>,

    /// Renames applied inside the staging area after copying
    #[serde(default)]
    pub renames: Vec<StageRename>,

    /// Files moved into place, or created with default content
    #[serde(default)]
    pub seed_files: Vec<SeedFile>,
}

/// Auxiliary source directory
#[derive(Debug, Clone, Deserialize)]
pub struct StageDir {
    /// Source directory, relative to the project root
    pub source: PathBuf,

    /// Skip this directory for portable builds
    #[serde(default)]
    pub native_only: bool,
}

/// Rename inside the staging area
#[derive(Debug, Clone, Deserialize)]
pub struct StageRename {
    /// Existing path, relative to the staging area
    pub from: PathBuf,
    /// New path, relative to the staging area
    pub to: PathBuf,
}

/// File that must exist in the staging area
#[derive(Debug, Clone, Deserialize)]
pub struct SeedFile {
    /// Staged file moved to `to` when present
    #[serde(default)]
    pub from: Option<PathBuf>,
    /// Target path, relative to the staging area
    pub to: PathBuf,
    /// Content written when `from` is absent
    #[serde(default)]
    pub default_content: String,
}

/// Launcher script generation settings
#[derive(Debug, Clone, Deserialize)]
pub struct LauncherConfig {
    /// Template path, relative to the project root
    #[serde(default = "default_launcher_template")]
    pub template: PathBuf,

    /// Launchers rendered from the template
    #[serde(default)]
    pub scripts: Vec<LauncherScript>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            template: default_launcher_template(),
            scripts: Vec::new(),
        }
    }
}

/// One launcher file
#[derive(Debug, Clone, Deserialize)]
pub struct LauncherScript {
    /// Output file name inside the release directory
    pub file_name: String,
    /// Value substituted for `{{args}}`
    #[serde(default)]
    pub args: String,
}

fn default_keep_releases() -> usize {
    2
}

fn default_release_dir() -> PathBuf {
    PathBuf::from("releases")
}

fn default_portable_artifact() -> String {
    "app.pyz".to_string()
}

fn default_launcher_template() -> PathBuf {
    PathBuf::from("launcher.template")
}

fn default_native_command() -> Vec<String> {
    [
        "pyinstaller",
        "--clean",
        "--distpath",
        "{{staging_dir}}",
        "--workpath",
        "{{work_dir}}",
        "{{project_root}}/{{project}}.spec",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl BuildConfig {
    /// Load configuration for a project.
    ///
    /// Reads `config_path` when given, otherwise `shipstamp.toml` in `project_root`.
    /// A missing file or a missing required key is a fatal error. The stored
    /// project root is canonicalized.
    pub fn load(project_root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(path) => path.to_path_buf(),
            None => project_root.join(CONFIG_FILE_NAME),
        };

        if !path.is_file() {
            return Err(ConfigError::NotFound { path }.into());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadFailed {
            path: path.clone(),
            source,
        })?;

        let mut config = Self::from_toml(&content).map_err(|source| ConfigError::Invalid {
            path: path.clone(),
            source,
        })?;
        // Derived paths are handed to the packager, which runs inside the root
        config.project_root = project_root.canonicalize().map_err(|source| ConfigError::ProjectRoot {
            path: project_root.to_path_buf(),
            source,
        })?;

        if let Ok(share) = std::env::var(SHARE_PATH_ENV)
            && !share.trim().is_empty()
        {
            log::info!("Using {} override: {}", SHARE_PATH_ENV, share);
            config.share_path = PathBuf::from(share);
        }

        config.validate()?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration text without touching the filesystem
    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Validate values that deserialization cannot check
    pub fn validate(&self) -> Result<()> {
        if self.project_name.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                key: "project_name".to_string(),
            }
            .into());
        }
        if self.share_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyValue {
                key: "share_path".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Derived paths for this project
    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout::new(&self.project_root, &self.release_dir)
    }

    /// Ordered destination candidates: `share_path` first, then `extra_share_paths`
    pub fn share_candidates(&self) -> Vec<PathBuf> {
        std::iter::once(self.share_path.clone())
            .chain(self.extra_share_paths.iter().cloned())
            .collect()
    }

    /// File name of the packager's native output
    pub fn native_artifact_name(&self) -> String {
        match &self.native_artifact {
            Some(name) => name.clone(),
            None if cfg!(windows) => format!("{}.exe", self.project_name),
            None => self.project_name.clone(),
        }
    }

    /// Destination for beta builds
    pub fn beta_destination(&self) -> Option<PathBuf> {
        self.beta_dir
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join("Windows")))
    }
}
