use crate::{ConfigError, LogLevel, SwishConfig};
use regex::Regex;
use std::path::PathBuf;

pub struct ConfigLoader {
    explicit_file: Option<PathBuf>,
    search_paths: Vec<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        let mut search_paths = Vec::new();

        if let Some(home) = dirs::home_dir() {
            search_paths.push(home.join(".config/swish/swish.yaml"));
        }
        search_paths.push(PathBuf::from("./swish.yaml"));

        #[cfg(unix)]
        search_paths.insert(0, PathBuf::from("/etc/swish/swish.yaml"));

        Self {
            explicit_file: None,
            search_paths,
        }
    }

    pub fn with_file(mut self, path: &str) -> Self {
        self.explicit_file = Some(PathBuf::from(path));
        self
    }

    pub fn load(&self) -> Result<SwishConfig, ConfigError> {
        let mut config = SwishConfig::default();

        if let Some(ref explicit) = self.explicit_file {
            config = self.read_file(explicit)?;
        } else if let Ok(env_path) = std::env::var("SWISH_CONFIG") {
            config = self.read_file(&PathBuf::from(env_path))?;
        } else {
            for path in &self.search_paths {
                if path.exists() {
                    if let Ok(content) = std::fs::read_to_string(path) {
                        config = self.merge_yaml(&config, &content)?;
                    }
                }
            }
        }

        self.apply_env_overrides(&mut config);
        Self::validate(&config)?;
        Ok(config)
    }

    fn read_file(&self, path: &PathBuf) -> Result<SwishConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.clone(),
            source: e,
        })?;
        self.parse_yaml(&content)
    }

    fn parse_yaml(&self, content: &str) -> Result<SwishConfig, ConfigError> {
        let expanded = self.expand_env_vars(content);
        Ok(serde_yaml::from_str(&expanded)?)
    }

    fn merge_yaml(&self, base: &SwishConfig, content: &str) -> Result<SwishConfig, ConfigError> {
        let overlay = self.parse_yaml(content)?;
        Ok(Self::merge_configs(base, &overlay))
    }

    fn merge_configs(base: &SwishConfig, overlay: &SwishConfig) -> SwishConfig {
        let defaults = SwishConfig::default();
        let mut result = base.clone();

        if overlay.shell.prompt != defaults.shell.prompt {
            result.shell.prompt = overlay.shell.prompt.clone();
        }
        if overlay.shell.history != defaults.shell.history {
            result.shell.history = overlay.shell.history.clone();
        }
        if overlay.logging != defaults.logging {
            result.logging = overlay.logging.clone();
        }

        result
    }

    fn expand_env_vars(&self, content: &str) -> String {
        let re = Regex::new(r"\$\{([^}]+)\}").expect("static pattern");
        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_default()
        })
        .to_string()
    }

    fn apply_env_overrides(&self, config: &mut SwishConfig) {
        Self::apply_overrides(config, |name| std::env::var(name).ok());
    }

    fn apply_overrides(config: &mut SwishConfig, var: impl Fn(&str) -> Option<String>) {
        if let Some(prompt) = var("SWISH_PROMPT") {
            config.shell.prompt = prompt;
        }
        if let Some(file) = var("SWISH_HISTORY_FILE") {
            if file.is_empty() {
                config.shell.history.enabled = false;
            } else {
                config.shell.history.file = file;
            }
        }
        if let Some(level) = var("SWISH_LOG_LEVEL") {
            if let Ok(l) = serde_yaml::from_str::<LogLevel>(&level) {
                config.logging.level = l;
            }
        }
    }

    fn validate(config: &SwishConfig) -> Result<(), ConfigError> {
        if config.shell.history.enabled && config.shell.history.max_entries == 0 {
            return Err(ConfigError::Invalid {
                key: "shell.history.max_entries",
                reason: "must be positive when history is enabled".to_string(),
            });
        }
        Ok(())
    }
}
