use std::env;

use viewcycle_core::error::{CoreError, Domain, ErrorKind, Result};
use viewcycle_core::lifecycle::HostCapabilities;

pub const DEFAULT_HOST_NAME: &str = "viewcycle";

/// Host identity plus the capabilities the delegates should assume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub name: String,
    pub capabilities: HostCapabilities,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_HOST_NAME.to_string(),
            capabilities: HostCapabilities::default(),
        }
    }
}

impl HostConfig {
    /// Explicit constructor; rejects an empty name.
    pub fn from_parts(name: impl Into<String>, capabilities: HostCapabilities) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::warn(Domain::Config, ErrorKind::InvalidArgument)
                .msg("host name must not be empty")
                .build());
        }

        Ok(Self { name, capabilities })
    }

    /// Environment only.
    pub fn from_env() -> Self {
        Self::from_args_iter(std::iter::empty::<String>())
    }

    /// Environment, then process arguments.
    pub fn from_args() -> Self {
        Self::from_args_iter(env::args())
    }

    /// Environment, then `iter` (first item is the program name and is skipped).
    pub fn from_args_iter<I, S>(iter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_sources(iter, |key| env::var(key).ok())
    }

    pub(crate) fn from_sources<I, S, F>(iter: I, lookup: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let defaults = HostCapabilities::default();

        let mut name = lookup("VIEWCYCLE_HOST_NAME")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST_NAME.to_string());
        let mut window_focus_for_sub_containers = lookup("VIEWCYCLE_SUBCONTAINER_FOCUS")
            .and_then(parse_bool)
            .unwrap_or(defaults.window_focus_for_sub_containers);
        let mut emulate_content_ready = lookup("VIEWCYCLE_EMULATE_CONTENT_READY")
            .and_then(parse_bool)
            .unwrap_or(defaults.emulate_content_ready);

        let mut args = iter.into_iter();
        let _ = args.next();
        while let Some(arg) = args.next() {
            let arg = arg.as_ref();
            match arg {
                "--legacy-focus" => {
                    window_focus_for_sub_containers = false;
                }
                "--emulate-content-ready" => {
                    emulate_content_ready = true;
                }
                "--name" => {
                    if let Some(value) = args.next() {
                        name = value.as_ref().to_string();
                    }
                }
                _ if arg.starts_with("--name=") => {
                    name = arg["--name=".len()..].to_string();
                }
                _ => {
                    tracing::debug!(arg, "ignoring unknown host argument");
                }
            }
        }

        if name.trim().is_empty() {
            name = DEFAULT_HOST_NAME.to_string();
        }

        Self {
            name,
            capabilities: HostCapabilities {
                window_focus_for_sub_containers,
                emulate_content_ready,
            },
        }
    }
}

fn parse_bool(value: String) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_match_modern_hosts() {
        let config = HostConfig::from_sources(["host"], no_env);

        assert_eq!(config, HostConfig::default());
        assert_eq!(config.capabilities, HostCapabilities::MODERN);
    }

    #[test]
    fn environment_is_parsed_leniently() {
        let config = HostConfig::from_sources(["host"], |key| match key {
            "VIEWCYCLE_HOST_NAME" => Some("launcher".to_string()),
            "VIEWCYCLE_SUBCONTAINER_FOCUS" => Some(" Off ".to_string()),
            "VIEWCYCLE_EMULATE_CONTENT_READY" => Some("YES".to_string()),
            _ => None,
        });

        assert_eq!(config.name, "launcher");
        assert_eq!(config.capabilities, HostCapabilities::LEGACY);
    }

    #[test]
    fn unparseable_booleans_keep_defaults() {
        let config = HostConfig::from_sources(["host"], |key| {
            (key != "VIEWCYCLE_HOST_NAME").then(|| "maybe".to_string())
        });

        assert_eq!(config.capabilities, HostCapabilities::MODERN);
    }

    #[test]
    fn arguments_override_environment() {
        let config = HostConfig::from_sources(
            ["host", "--legacy-focus", "--name", "settings", "--emulate-content-ready", "--bogus"],
            |key| (key == "VIEWCYCLE_HOST_NAME").then(|| "launcher".to_string()),
        );

        assert_eq!(config.name, "settings");
        assert!(!config.capabilities.window_focus_for_sub_containers);
        assert!(config.capabilities.emulate_content_ready);

        let config = HostConfig::from_sources(["host", "--name=inline"], no_env);
        assert_eq!(config.name, "inline");
    }

    #[test]
    fn empty_names_fall_back_or_are_rejected() {
        let config = HostConfig::from_sources(["host", "--name="], no_env);
        assert_eq!(config.name, DEFAULT_HOST_NAME);

        let err = HostConfig::from_parts(" ", HostCapabilities::MODERN).unwrap_err();
        assert_eq!(err.domain, Domain::Config);
        assert_eq!(err.kind, ErrorKind::InvalidArgument);

        let config = HostConfig::from_parts("main", HostCapabilities::LEGACY).unwrap();
        assert_eq!(config.capabilities, HostCapabilities::LEGACY);
    }
}
