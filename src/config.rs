use crate::cli::CliArgs;
use crate::model::{NamespaceScope, Section};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_TAIL_LINES: u32 = 100;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ConfigFile {
    pub api_url: Option<String>,
    pub namespace: Option<String>,
    pub section: Option<String>,
    pub tail_lines: Option<u32>,
}

/// Effective settings after merging CLI flags over the config file over the
/// built-in defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: Url,
    pub scope: NamespaceScope,
    pub section: Section,
    pub tail_lines: u32,
}

impl Settings {
    pub fn resolve(args: &CliArgs, file: ConfigFile) -> Result<Self> {
        let raw_url = args
            .api_url
            .clone()
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(&raw_url)
            .with_context(|| format!("invalid API base URL: {raw_url}"))?;

        let namespace = args
            .namespace
            .clone()
            .or(file.namespace)
            .filter(|name| !name.is_empty());
        let scope = match namespace {
            Some(name) => NamespaceScope::Named(name),
            None => NamespaceScope::All,
        };

        let section = match args
            .section
            .clone()
            .or(file.section)
            .filter(|token| !token.is_empty())
        {
            Some(token) => match Section::from_token(&token) {
                Some(section) => section,
                None => bail!("unrecognized section: {token}"),
            },
            None => Section::Nodes,
        };

        let tail_lines = args
            .tail_lines
            .or(file.tail_lines)
            .unwrap_or(DEFAULT_TAIL_LINES);

        Ok(Self {
            api_url,
            scope,
            section,
            tail_lines,
        })
    }
}

/// Loads the config file. An explicit path must exist; a discovered path is
/// optional and a missing file yields the defaults.
pub fn load(explicit: Option<&Path>) -> Result<ConfigFile> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config_path(),
    };
    let Some(path) = path else {
        return Ok(ConfigFile::default());
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_yaml::from_str(&raw).with_context(|| format!("failed to parse config {}", path.display()))
}

fn discover_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("SPYGLASS_CONFIG")
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }

    let cwd_candidates = [PathBuf::from("spyglass.yaml"), PathBuf::from("spyglass.yml")];
    for candidate in cwd_candidates {
        if candidate.exists() {
            return Some(candidate);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let candidate = PathBuf::from(&home).join(".config/spyglass/config.yaml");
        if candidate.exists() {
            return Some(candidate);
        }
    }

    None
}
