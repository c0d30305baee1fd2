use crate::error::{AppError, Result};
use crate::ignore_source::IgnoreSettings;
use crate::rules::{Rule, RuleKind};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILENAME: &str = ".gpt-copy.toml";
pub const GLOBAL_CONFIG_DIR: &str = "gpt-copy";
pub const GLOBAL_CONFIG_FILENAME: &str = "config.toml";
pub const ROOT_ENV_VAR: &str = "GPT_COPY_ROOT";

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub tokens: TokensConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    #[serde(default = "default_true")]
    pub use_git: bool,
    #[serde(default = "default_true")]
    pub use_gitignore: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct FiltersConfig {
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub exclude_dir: Vec<String>,
    #[serde(default)]
    pub include: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_true")]
    pub line_numbers: bool,
    #[serde(default)]
    pub tree_only: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct TokensConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub top_n: Option<usize>,
}

fn default_true() -> bool {
    true
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            use_git: default_true(),
            use_gitignore: default_true(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            line_numbers: default_true(),
            tree_only: false,
        }
    }
}

impl Config {
    /// Scan root from the CLI argument, then `GPT_COPY_ROOT`, then the
    /// current directory; tilde-expanded and canonicalized.
    pub fn determine_scan_root(cli_root: Option<&PathBuf>) -> Result<PathBuf> {
        let path_str_opt = cli_root
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var(ROOT_ENV_VAR).ok().filter(|s| !s.is_empty()));

        let path_to_resolve = match path_str_opt {
            Some(p_str) => PathBuf::from(shellexpand::tilde(&p_str).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        let resolved = path_to_resolve.canonicalize().map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to canonicalize scan root '{}': {}",
                    path_to_resolve.display(),
                    e
                ),
            ))
        })?;
        if !resolved.is_dir() {
            return Err(AppError::InvalidArgument(format!(
                "Scan root '{}' is not a directory",
                resolved.display()
            )));
        }
        Ok(resolved)
    }

    /// Config file to load, if any: the explicit path, the file in the scan
    /// root, or the per-user file.
    pub fn resolve_config_path(
        scan_root: &Path,
        cli_config_file: Option<&PathBuf>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        if let Some(explicit) = cli_config_file {
            let path = PathBuf::from(shellexpand::tilde(&explicit.to_string_lossy()).as_ref());
            if !path.is_file() {
                return Err(AppError::Config(format!(
                    "Specified config file not found at path: {}",
                    path.display()
                )));
            }
            log::debug!("Using specified config file path: {}", path.display());
            return Ok(Some(path));
        }

        let project_path = scan_root.join(DEFAULT_CONFIG_FILENAME);
        if project_path.is_file() {
            log::debug!("Using project config file: {}", project_path.display());
            return Ok(Some(project_path));
        }

        let global_path = dirs::config_dir()
            .map(|dir| dir.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILENAME))
            .filter(|path| path.is_file());
        match &global_path {
            Some(path) => log::debug!("Using user config file: {}", path.display()),
            None => log::debug!("No config file found; using defaults"),
        }
        Ok(global_path)
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&toml_content).map_err(|e| match e {
            AppError::TomlParse(msg) => AppError::TomlParse(format!(
                "Error parsing config file '{}': {}. Check TOML syntax and structure.",
                config_path.display(),
                msg
            )),
            other => other,
        })
    }

    pub fn from_toml_str(toml_content: &str) -> Result<Self> {
        toml::from_str::<Config>(toml_content).map_err(|e| AppError::TomlParse(e.to_string()))
    }

    /// Configured rules: excludes, then directory excludes, then includes.
    pub fn rules(&self) -> Vec<Rule> {
        let filters = &self.filters;
        filters
            .exclude
            .iter()
            .map(|p| Rule::new(RuleKind::Exclude, p))
            .chain(filters.exclude_dir.iter().map(|p| Rule::new(RuleKind::ExcludeDir, p)))
            .chain(filters.include.iter().map(|p| Rule::new(RuleKind::Include, p)))
            .collect()
    }

    pub fn ignore_settings(&self) -> IgnoreSettings {
        IgnoreSettings {
            use_git: self.general.use_git,
            use_gitignore: self.general.use_gitignore,
        }
    }
}
