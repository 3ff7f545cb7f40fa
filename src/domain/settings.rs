use anyhow::Result;
use std::fmt;

pub const DEFAULT_REGISTRY: &str = "registry.fedoraproject.org";
pub const DEFAULT_IMAGE: &str = "fedora:latest";
pub const DEFAULT_SHELL: &str = "/bin/bash";

/// Which identity the engine and the session run as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegeMode {
    /// Rootless engine, session impersonates the host user.
    User,
    /// Engine through `sudo`, session runs as the container's root.
    System,
}

/// Bad flags or values; reported with a pointer to `--help` and exit 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError(pub String);

impl UsageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for UsageError {}

/// Defaults merged with the override files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub registry: String,
    pub image: String,
    pub image_uri: Option<String>,
    /// Container name before the mode and tag suffixes.
    pub name: String,
    pub shell: String,
}

impl Settings {
    pub fn defaults(host_user: &str) -> Self {
        Self {
            registry: DEFAULT_REGISTRY.to_string(),
            image: DEFAULT_IMAGE.to_string(),
            image_uri: None,
            name: format!("petbox-{host_user}"),
            shell: DEFAULT_SHELL.to_string(),
        }
    }

    /// Applies the command-line layer and computes the container to manage.
    pub fn resolve(&self, flags: &FlagOverrides, default_mode: PrivilegeMode) -> Result<Target> {
        if flags.name.is_some() && flags.tag.is_some() {
            return Err(UsageError::new("--name e --tag não podem ser usados juntos").into());
        }

        let mode = flags.mode.unwrap_or(default_mode);
        let registry = flags.registry.as_deref().unwrap_or(&self.registry);
        let image = flags.image.as_deref().unwrap_or(&self.image);

        let image_uri = match flags.image_uri.as_ref().or(self.image_uri.as_ref()) {
            Some(uri) => uri.clone(),
            None => {
                require("registry", registry)?;
                require("image", image)?;
                format!("{registry}/{image}")
            }
        };

        let family = flags.name.clone().unwrap_or_else(|| self.name.clone());
        let name = match &flags.name {
            Some(name) => name.clone(),
            None => {
                let mut name = self.name.clone();
                if mode == PrivilegeMode::User {
                    name.push_str("-user");
                }
                if let Some(tag) = &flags.tag {
                    require("tag", tag)?;
                    name.push('-');
                    name.push_str(tag);
                }
                name
            }
        };

        require("name", &name)?;
        require("image_uri", &image_uri)?;
        require("shell", &self.shell)?;

        Ok(Target {
            name,
            family,
            image: image_uri,
            mode,
            shell: self.shell.clone(),
        })
    }
}

fn require(key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(UsageError::new(format!("'{key}' não pode ser vazio")).into());
    }
    Ok(())
}

/// Values given on the command line; `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagOverrides {
    pub registry: Option<String>,
    pub image: Option<String>,
    pub image_uri: Option<String>,
    pub name: Option<String>,
    pub tag: Option<String>,
    pub mode: Option<PrivilegeMode>,
}

/// The container a session manages, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    /// Name shared by the system, user and tagged variants; what `list` filters on.
    pub family: String,
    pub image: String,
    pub mode: PrivilegeMode,
    pub shell: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::defaults("ana")
    }

    fn is_usage_error(err: &anyhow::Error) -> bool {
        err.downcast_ref::<UsageError>().is_some()
    }

    #[test]
    fn system_mode_uses_base_name() {
        let target = settings()
            .resolve(&FlagOverrides::default(), PrivilegeMode::System)
            .unwrap();

        assert_eq!(target.name, "petbox-ana");
        assert_eq!(target.image, "registry.fedoraproject.org/fedora:latest");
        assert_eq!(target.shell, "/bin/bash");
    }

    #[test]
    fn user_mode_appends_suffix() {
        let target = settings()
            .resolve(&FlagOverrides::default(), PrivilegeMode::User)
            .unwrap();
        assert_eq!(target.name, "petbox-ana-user");
    }

    #[test]
    fn tag_is_appended_in_both_modes() {
        let flags = FlagOverrides {
            tag: Some("rust".into()),
            ..Default::default()
        };

        let user = settings().resolve(&flags, PrivilegeMode::User).unwrap();
        let system = settings().resolve(&flags, PrivilegeMode::System).unwrap();

        assert_eq!(user.name, "petbox-ana-user-rust");
        assert_eq!(system.name, "petbox-ana-rust");
        assert_eq!(user.family, "petbox-ana");
        assert_eq!(system.family, "petbox-ana");
    }

    #[test]
    fn explicit_name_skips_suffixes() {
        let flags = FlagOverrides {
            name: Some("scratch".into()),
            ..Default::default()
        };
        let target = settings().resolve(&flags, PrivilegeMode::User).unwrap();
        assert_eq!(target.name, "scratch");
        assert_eq!(target.family, "scratch");
    }

    #[test]
    fn name_and_tag_conflict() {
        let flags = FlagOverrides {
            name: Some("scratch".into()),
            tag: Some("rust".into()),
            ..Default::default()
        };

        for mode in [PrivilegeMode::User, PrivilegeMode::System] {
            let err = settings().resolve(&flags, mode).unwrap_err();
            assert!(is_usage_error(&err));
        }
    }

    #[test]
    fn explicit_mode_wins_over_default() {
        let flags = FlagOverrides {
            mode: Some(PrivilegeMode::System),
            ..Default::default()
        };
        let target = settings().resolve(&flags, PrivilegeMode::User).unwrap();

        assert_eq!(target.mode, PrivilegeMode::System);
        assert_eq!(target.name, "petbox-ana");
    }

    #[test]
    fn image_uri_flag_beats_registry_and_image() {
        let mut base = settings();
        base.image_uri = Some("quay.io/from/file".into());

        let flags = FlagOverrides {
            registry: Some("ignored.example".into()),
            image_uri: Some("quay.io/from/flag:1".into()),
            ..Default::default()
        };
        let target = base.resolve(&flags, PrivilegeMode::System).unwrap();
        assert_eq!(target.image, "quay.io/from/flag:1");

        let target = base
            .resolve(&FlagOverrides::default(), PrivilegeMode::System)
            .unwrap();
        assert_eq!(target.image, "quay.io/from/file");
    }

    #[test]
    fn registry_and_image_flags_compose_uri() {
        let flags = FlagOverrides {
            registry: Some("quay.io".into()),
            image: Some("toolbx/ubuntu:24.04".into()),
            ..Default::default()
        };
        let target = settings().resolve(&flags, PrivilegeMode::System).unwrap();
        assert_eq!(target.image, "quay.io/toolbx/ubuntu:24.04");
    }

    #[test]
    fn empty_values_are_usage_errors() {
        let flags = FlagOverrides {
            image: Some("  ".into()),
            ..Default::default()
        };
        let err = settings().resolve(&flags, PrivilegeMode::System).unwrap_err();
        assert!(is_usage_error(&err));

        let mut base = settings();
        base.shell = String::new();
        let err = base
            .resolve(&FlagOverrides::default(), PrivilegeMode::System)
            .unwrap_err();
        assert!(is_usage_error(&err));
    }
}
