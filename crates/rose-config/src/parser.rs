//! `rose-app.conf` parser.
//!
//! Format summary:
//! - `[section]` starts a section; options before the first header belong to
//!   the root section `""`.
//! - `key=value` defines an option. Everything after the first `=` is the value.
//! - A line whose first non-blank character is `=` continues the previous value.
//! - A `!` or `!!` prefix on a section name or key marks it ignored.
//! - Lines starting with `#` are comments.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use datasz_common::{DataszError, DataszResult};
use tracing::debug;

use crate::ConfigFacts;

/// A single option as written in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigOption {
    pub value: String,
    pub ignored: bool,
}

/// A section and its options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSection {
    pub ignored: bool,
    pub options: BTreeMap<String, ConfigOption>,
}

/// A parsed run configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoseConfig {
    sections: BTreeMap<String, ConfigSection>,
}

impl RoseConfig {
    pub fn parse(text: &str) -> DataszResult<Self> {
        let mut sections: BTreeMap<String, ConfigSection> = BTreeMap::new();
        sections.insert(String::new(), ConfigSection::default());

        let mut current = String::new();
        let mut last_key: Option<String> = None;

        for (index, raw_line) in text.lines().enumerate() {
            let line_number = index + 1;
            let line = raw_line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let name = header.strip_suffix(']').ok_or_else(|| DataszError::ConfigSyntax {
                    line: line_number,
                    message: format!("unterminated section header '{}'", line),
                })?;
                let (ignored, name) = strip_ignore_marker(name.trim());
                let section = sections.entry(name.to_string()).or_default();
                section.ignored = ignored;
                current = name.to_string();
                last_key = None;
                continue;
            }

            if let Some(continuation) = line.strip_prefix('=') {
                let key = last_key.as_ref().ok_or_else(|| DataszError::ConfigSyntax {
                    line: line_number,
                    message: "continuation line without a preceding option".to_string(),
                })?;
                if let Some(option) = sections
                    .get_mut(&current)
                    .and_then(|section| section.options.get_mut(key))
                {
                    option.value.push('\n');
                    option.value.push_str(continuation.trim());
                }
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| DataszError::ConfigSyntax {
                line: line_number,
                message: format!("expected key=value, found '{}'", line),
            })?;
            let (ignored, key) = strip_ignore_marker(key.trim());
            if key.is_empty() {
                return Err(DataszError::ConfigSyntax {
                    line: line_number,
                    message: "option with an empty name".to_string(),
                });
            }

            sections.entry(current.clone()).or_default().options.insert(
                key.to_string(),
                ConfigOption {
                    value: value.trim().to_string(),
                    ignored,
                },
            );
            last_key = Some(key.to_string());
        }

        debug!(sections = sections.len(), "Parsed run configuration");
        Ok(Self { sections })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> DataszResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| DataszError::Io(format!("{}: {}", path.display(), e)))?;
        Self::parse(&text)
    }

    pub fn section(&self, name: &str) -> Option<&ConfigSection> {
        self.sections.get(name)
    }

    /// All section names, including ignored ones.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

impl ConfigFacts for RoseConfig {
    fn value(&self, section: &str, option: &str) -> Option<&str> {
        let section = self.sections.get(section)?;
        if section.ignored {
            return None;
        }
        section
            .options
            .get(option)
            .filter(|opt| !opt.ignored)
            .map(|opt| opt.value.as_str())
    }

    fn sections_with_prefix(&self, prefix: &str) -> Vec<&str> {
        self.sections
            .iter()
            .filter(|(name, section)| !section.ignored && name.starts_with(prefix))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

fn strip_ignore_marker(name: &str) -> (bool, &str) {
    if let Some(rest) = name.strip_prefix("!!") {
        (true, rest.trim())
    } else if let Some(rest) = name.strip_prefix('!') {
        (true, rest.trim())
    } else {
        (false, name)
    }
}
