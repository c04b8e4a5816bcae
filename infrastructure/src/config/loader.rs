//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "agent-fusion";
const PROJECT_FILES: [&str; 2] = ["agent-fusion.toml", ".agent-fusion.toml"];
const ENV_PREFIX: &str = "AGENT_FUSION_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `AGENT_FUSION_*` environment variables
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./agent-fusion.toml` or `./.agent-fusion.toml`
    /// 4. XDG config: `$XDG_CONFIG_HOME/agent-fusion/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let global = Self::global_config_path().filter(|p| p.exists());
        let project = Self::project_config_path();
        Self::load_layers(
            global.as_deref(),
            project.as_deref(),
            config_path.map(PathBuf::as_path),
        )
    }

    /// Merge the given files over the defaults, then the environment.
    ///
    /// An explicit path must exist; the other layers are skipped when `None`.
    pub fn load_layers(
        global: Option<&Path>,
        project: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(path) = global {
            debug!("Merging global config: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = project {
            debug!("Merging project config: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Box::new(figment::Error::from(format!(
                    "config file not found: {}",
                    path.display()
                ))));
            }
            debug!("Merging explicit config: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract().map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/agent-fusion/config.toml if set,
    /// otherwise the platform config dir.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        Self::find_project_config(Path::new("."))
    }

    fn find_project_config(dir: &Path) -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(explicit: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");
        println!("  [ENV  ] {}* variables (`__` separates sections)", ENV_PREFIX);

        if let Some(path) = explicit {
            let mark = if path.exists() { "FOUND" } else { "MISS " };
            println!("  [{}] Explicit: {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./agent-fusion.toml or ./.agent-fusion.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}
