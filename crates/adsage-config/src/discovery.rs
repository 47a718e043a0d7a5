use std::path::{Path, PathBuf};

use super::{CliArgs, Config, ConfigError, ProviderKind};

/// Candidate config locations, checked in order at each directory level.
const CONFIG_CANDIDATES: [&[&str]; 2] = [&[".adsage", "config.toml"], &["config", "config.yaml"]];

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults
    ///
    /// Uses the current working directory for config file discovery when no
    /// explicit path is provided in `cli_args`.
    pub fn discover(cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let start_dir = std::env::current_dir().map_err(|e| ConfigError::DiscoveryFailed {
            reason: format!("cannot read current directory: {e}"),
        })?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory
    ///
    /// This is the path-driven variant used by tests to avoid process-global state.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let config_path = match &cli_args.config_path {
            Some(explicit) => {
                if !explicit.exists() {
                    return Err(ConfigError::NotFound {
                        path: explicit.display().to_string(),
                    });
                }
                Some(explicit.clone())
            }
            None => Self::discover_config_file_from(start_dir),
        };

        let mut config = match &config_path {
            Some(path) => {
                let mut loaded = Self::load_config_file(path)?;
                loaded.source = Some(path.clone());
                loaded
            }
            None => Self::default(),
        };

        config.apply_cli(cli_args)?;
        config.validate()?;

        Ok(config)
    }

    /// Walk up from `start_dir` looking for a config file, stopping at the
    /// repository root (.git, .hg, .svn) or the filesystem root.
    #[must_use]
    pub fn discover_config_file_from(start_dir: &Path) -> Option<PathBuf> {
        let mut current_dir = start_dir.to_path_buf();

        loop {
            for candidate in CONFIG_CANDIDATES {
                let path = candidate
                    .iter()
                    .fold(current_dir.clone(), |path, part| path.join(part));
                if path.is_file() {
                    return Some(path);
                }
            }

            if current_dir.join(".git").exists()
                || current_dir.join(".hg").exists()
                || current_dir.join(".svn").exists()
            {
                return None;
            }

            match current_dir.parent() {
                Some(parent) => current_dir = parent.to_path_buf(),
                None => return None,
            }
        }
    }

    /// Load a configuration file, choosing the parser by extension.
    pub fn load_config_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.display().to_string(),
                }
            } else {
                ConfigError::InvalidFile(format!("{}: {e}", path.display()))
            }
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match extension.as_str() {
            "toml" => toml::from_str(&content)
                .map_err(|e| ConfigError::InvalidFile(format!("{}: {e}", path.display()))),
            "yaml" | "yml" => {
                if content.trim().is_empty() {
                    return Ok(Self::default());
                }
                serde_yaml::from_str(&content)
                    .map_err(|e| ConfigError::InvalidFile(format!("{}: {e}", path.display())))
            }
            _ => Err(ConfigError::UnsupportedFormat { extension }),
        }
    }

    fn apply_cli(&mut self, cli_args: &CliArgs) -> Result<(), ConfigError> {
        if let Some(provider) = &cli_args.provider {
            self.llm.provider =
                provider
                    .parse::<ProviderKind>()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: "provider".to_string(),
                        value: provider.clone(),
                    })?;
        }
        if let Some(model) = &cli_args.model {
            self.model.name = model.clone();
        }
        if let Some(min_confidence) = cli_args.min_confidence {
            self.agents.min_confidence = min_confidence;
        }
        if cli_args.no_reflection {
            self.agents.reflection_enabled = false;
        }
        if let Some(timeout) = cli_args.timeout_secs {
            self.llm.timeout_secs = timeout;
        }
        if let Some(dir) = &cli_args.output_dir {
            self.output.dir = dir.clone();
        }
        Ok(())
    }
}
