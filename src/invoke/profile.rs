//! Shared AWS configuration files.
//!
//! # Responsibilities
//! - Locate `~/.aws/credentials` and `~/.aws/config` (or their env overrides)
//! - Pick the active profile from `AWS_PROFILE`
//! - Extract static credentials and the default region for that profile
//!
//! # Design Decisions
//! - Missing files are not errors; an unreadable file is skipped with a warning
//! - The credentials file wins over keys placed in the config file
//! - Only static keys are supported; no SSO, assume-role or process providers

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::invoke::sigv4::Credentials;

const DEFAULT_PROFILE: &str = "default";

/// Section name → key → value.
pub type IniSections = IndexMap<String, IndexMap<String, String>>;

/// What the shared files say about one profile.
#[derive(Debug, Clone, Default)]
pub struct SharedProfile {
    pub credentials: Option<Credentials>,
    pub region: Option<String>,
}

impl SharedProfile {
    /// Load the active profile from the standard file locations.
    pub fn from_env() -> Self {
        let name = profile_name();
        let profile = Self::load(
            &name,
            credentials_path().as_deref(),
            config_path().as_deref(),
        );
        tracing::debug!(
            profile = %name,
            credentials = profile.credentials.is_some(),
            region = ?profile.region,
            "Shared AWS profile resolved"
        );
        profile
    }

    /// Load profile `name` from explicit file paths.
    pub fn load(name: &str, credentials_file: Option<&Path>, config_file: Option<&Path>) -> Self {
        let credentials_sections = credentials_file.map(read_sections).unwrap_or_default();
        let config_sections = config_file.map(read_sections).unwrap_or_default();

        let from_credentials = credentials_sections.get(name);
        let from_config = config_section(&config_sections, name);

        let credentials = from_credentials
            .and_then(static_credentials)
            .or_else(|| from_config.and_then(static_credentials));
        let region = from_config
            .and_then(|section| section.get("region"))
            .filter(|r| !r.is_empty())
            .cloned();

        Self { credentials, region }
    }
}

/// `AWS_PROFILE`, then `AWS_DEFAULT_PROFILE`, then `default`.
pub fn profile_name() -> String {
    ["AWS_PROFILE", "AWS_DEFAULT_PROFILE"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
}

pub fn credentials_path() -> Option<PathBuf> {
    file_path("AWS_SHARED_CREDENTIALS_FILE", "credentials")
}

pub fn config_path() -> Option<PathBuf> {
    file_path("AWS_CONFIG_FILE", "config")
}

fn file_path(override_var: &str, file_name: &str) -> Option<PathBuf> {
    match std::env::var(override_var) {
        Ok(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => dirs::home_dir().map(|home| home.join(".aws").join(file_name)),
    }
}

fn read_sections(path: &Path) -> IniSections {
    match fs::read_to_string(path) {
        Ok(content) => parse_ini(&content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => IniSections::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read AWS shared file");
            IniSections::new()
        }
    }
}

// The config file names non-default profiles `[profile NAME]`.
fn config_section<'a>(sections: &'a IniSections, name: &str) -> Option<&'a IndexMap<String, String>> {
    sections
        .get(&format!("profile {}", name))
        .or_else(|| sections.get(name))
}

fn static_credentials(section: &IndexMap<String, String>) -> Option<Credentials> {
    let key = |name: &str| section.get(name).filter(|v| !v.is_empty()).cloned();

    let credentials = Credentials::new(key("aws_access_key_id")?, key("aws_secret_access_key")?);
    Some(match key("aws_session_token") {
        Some(token) => credentials.with_session_token(token),
        None => credentials,
    })
}

/// Parse the INI dialect used by the AWS shared files.
///
/// Keys are lowercased; `#` and `;` start comment lines; lines outside any
/// section and lines without `=` are ignored.
pub fn parse_ini(content: &str) -> IniSections {
    let mut sections = IniSections::new();
    let mut current: Option<String> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = header.split_whitespace().collect::<Vec<_>>().join(" ");
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }

        let (Some(section), Some((key, value))) = (&current, line.split_once('=')) else {
            continue;
        };
        if let Some(entries) = sections.get_mut(section) {
            entries.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    sections
}
