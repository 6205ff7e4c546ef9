//! Project configuration management for `bladerunner.toml`.
//!
//! # Sections
//!
//! | Section         | Purpose                                        |
//! |-----------------|------------------------------------------------|
//! | `[build]`       | Source/output paths, escaping, output buffer   |
//! | `[build.dirs]`  | Convention directory names                     |
//! | `[directives]`  | Text-substitution directives                   |
//!
//! # Example
//!
//! ```toml
//! [build]
//! source = "source"
//! output = "public"
//! safe_output = true
//!
//! [build.dirs]
//! includes = "_includes"
//!
//! [directives]
//! datetime = "<?php echo date({args}); ?>"
//! ```
//!
//! A missing config file is not an error: every field has a default.

mod build;
pub mod defaults;
mod error;

pub use build::BuildConfig;
pub use error::ConfigError;

use crate::cli::{Cli, Commands};
use crate::compiler::{CompileOptions, Compiler, rules::BUILTIN_ORDER};
use educe::Educe;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

/// PHP function name, optionally namespaced.
static FUNCTION_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\\?[A-Za-z_][A-Za-z0-9_]*(\\[A-Za-z_][A-Za-z0-9_]*)*$").unwrap());

/// Directive name usable after `@`.
static DIRECTIVE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Directive words that are not rules of their own but still taken.
const RESERVED_DIRECTIVES: &[&str] = &["slot", "endslot"];

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing bladerunner.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Log compile stages per template (CLI only)
    #[serde(skip)]
    pub verbose: bool,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Text-substitution directives: name → PHP template with `{args}`
    #[serde(default)]
    pub directives: BTreeMap<String, String>,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load `root/config_name`, falling back to defaults when it does not
    /// exist. Paths are normalized against `root`.
    pub fn load(root: &Path, config_name: &Path) -> Result<Self, ConfigError> {
        let config_path = root.join(config_name);
        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.config_path = Self::normalize_path(&config_path);
        config.update_path_with_root(root);
        Ok(config)
    }

    /// Load, apply CLI overrides and validate.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.update_with_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Apply CLI path and flag overrides, then normalize paths.
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli.root.clone().unwrap_or_else(|| self.get_root().to_owned());

        Self::update_option(&mut self.build.source, cli.source.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());
        self.update_path_with_root(&root);
        self.config_path = Self::normalize_path(&self.get_root().join(&cli.config));

        if let Some(args) = cli.build_args() {
            self.build.clean |= args.clean;
            self.build.safe_output &= !args.unsafe_output;
            self.verbose = args.verbose;
        }
        if let Commands::Compile { unsafe_output: true, .. } = cli.command {
            self.build.safe_output = false;
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Update all paths relative to root directory and normalize to absolute paths
    fn update_path_with_root(&mut self, root: &Path) {
        let root = Self::normalize_path(root);
        self.set_root(&root);

        self.build.source = Self::normalize_path(&root.join(&self.build.source));
        self.build.output = Self::normalize_path(&root.join(&self.build.output));
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dirs = &self.build.dirs;
        for (field, name) in ["includes", "layouts", "plugins", "data"].iter().zip(dirs.names()) {
            let plain = !name.is_empty()
                && name != "."
                && name != ".."
                && !name.contains(['/', '\\']);
            if !plain {
                return Err(ConfigError::Validation(format!(
                    "[build.dirs.{field}] must be a single directory name, got `{name}`"
                )));
            }
        }

        if let Some(buffer) = &self.build.buffer
            && !FUNCTION_NAME.is_match(buffer)
        {
            return Err(ConfigError::Validation(format!(
                "[build.buffer] must be a PHP function name, got `{buffer}`"
            )));
        }

        for name in self.directives.keys() {
            if !DIRECTIVE_NAME.is_match(name) {
                return Err(ConfigError::Validation(format!(
                    "[directives.{name}] is not a valid directive name"
                )));
            }
            if BUILTIN_ORDER.contains(&name.as_str()) || RESERVED_DIRECTIVES.contains(&name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "[directives.{name}] shadows a built-in directive"
                )));
            }
        }

        if self.build.source == self.build.output {
            return Err(ConfigError::Validation(
                "[build.source] and [build.output] must differ".into(),
            ));
        }

        Ok(())
    }

    /// Compile options derived from `[build]` and `[directives]`.
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            safe_output: self.build.safe_output,
            buffer: self.build.buffer.clone(),
            dirs: self.build.dirs.clone(),
            directives: self.directives.clone(),
        }
    }

    pub fn compiler(&self) -> Compiler {
        Compiler::new(self.compile_options())
    }
}

// ============================================================================
// Tests
// ============================================================================
