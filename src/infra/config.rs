use crate::domain::Settings;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_FILE_NAME: &str = "petbox.toml";

/// System-wide override files, lowest precedence first.
pub const SYSTEM_CONFIG_PATHS: &[&str] = &["/usr/share/petbox/petbox.toml", "/etc/petbox/petbox.toml"];

pub fn default_config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join("petbox");
    }

    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/root"))
        .join(".config/petbox")
}

/// One override file. Every key is optional; absent keys leave the lower
/// layers untouched.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub registry: Option<String>,
    pub image: Option<String>,
    pub image_uri: Option<String>,
    pub name: Option<String>,
    pub shell: Option<String>,
}

impl FileConfig {
    /// Merges another FileConfig into self.
    /// Values from `other` overwrite values in `self` if present.
    pub fn merge(&mut self, other: FileConfig) {
        if let Some(registry) = other.registry {
            self.registry = Some(registry);
        }
        if let Some(image) = other.image {
            self.image = Some(image);
        }
        if let Some(uri) = other.image_uri {
            self.image_uri = Some(uri);
        }
        if let Some(name) = other.name {
            self.name = Some(name);
        }
        if let Some(shell) = other.shell {
            self.shell = Some(shell);
        }
    }

    /// Expands `~` and `$VAR` in every value, the way the old rc files did
    /// when they were sourced by a shell.
    fn expand(self) -> Result<Self> {
        Ok(Self {
            registry: expand_value(self.registry)?,
            image: expand_value(self.image)?,
            image_uri: expand_value(self.image_uri)?,
            name: expand_value(self.name)?,
            shell: expand_value(self.shell)?,
        })
    }

    /// Lays the file values over `settings`.
    pub fn apply(self, settings: &mut Settings) {
        if let Some(registry) = self.registry {
            settings.registry = registry;
        }
        if let Some(image) = self.image {
            settings.image = image;
        }
        if let Some(uri) = self.image_uri {
            settings.image_uri = Some(uri);
        }
        if let Some(name) = self.name {
            settings.name = name;
        }
        if let Some(shell) = self.shell {
            settings.shell = shell;
        }
    }
}

fn expand_value(value: Option<String>) -> Result<Option<String>> {
    value
        .map(|v| {
            shellexpand::full(&v)
                .map(|expanded| expanded.into_owned())
                .with_context(|| format!("expandindo {v:?}"))
        })
        .transpose()
}

/// Override files consulted for `config_dir`, lowest precedence first.
pub fn config_paths(config_dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = SYSTEM_CONFIG_PATHS.iter().map(PathBuf::from).collect();
    paths.push(config_dir.join(CONFIG_FILE_NAME));
    paths
}

pub fn read_config_file(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path).with_context(|| format!("lendo config em {:?}", path))?;
    toml::from_str(&content).with_context(|| format!("parse de config em {:?}", path))
}

/// Builds the settings from the defaults and whichever of `paths` exist.
pub fn load_settings_from(paths: &[PathBuf], host_user: &str) -> Result<Settings> {
    let mut merged = FileConfig::default();

    for path in paths {
        if !path.exists() {
            debug!("config ausente em {:?}", path);
            continue;
        }

        info!("Arquivo {:?} detectado, sobrescrevendo padrões...", path);
        merged.merge(read_config_file(path)?);
    }

    let mut settings = Settings::defaults(host_user);
    merged.expand()?.apply(&mut settings);
    Ok(settings)
}

pub fn load_settings(config_dir: &Path, host_user: &str) -> Result<Settings> {
    load_settings_from(&config_paths(config_dir), host_user)
}
