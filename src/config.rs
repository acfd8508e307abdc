//! YAML profiles.
//!
//! A profile bundles the line pattern, filters and rewrite rules for one
//! kind of log. Profiles may build on another one with `from:`; the base is
//! loaded first, then this file's lists and maps are appended and its
//! scalar settings win.

use crate::error::ConfigError;
use crate::pipeline::config::LogType;
use crate::pipeline::processor::LogProcessor;
use crate::transform::{Matcher, TransformRules};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ProfileFile {
    from: Option<String>,
    log_line_regex: Option<String>,
    log_type: Option<LogType>,
    hide_same_tags: Option<bool>,
    #[serde(default)]
    separator_regex_list: Vec<String>,
    #[serde(default)]
    trans_msg_map: IndexMap<String, String>,
    #[serde(default)]
    trans_tag_map: IndexMap<String, String>,
    #[serde(default)]
    hide_msg_list: Vec<String>,
    #[serde(default)]
    tag_keywords: Vec<String>,
    #[serde(default)]
    line_keywords: Vec<String>,
    #[serde(default)]
    highlight_list: Vec<String>,
}

/// Resolved profile, includes already merged
#[derive(Debug, Default, Clone)]
pub struct Profile {
    pub log_line_regex: Option<String>,
    pub log_type: Option<LogType>,
    pub hide_same_tags: Option<bool>,
    pub separator_regex_list: Vec<String>,
    pub trans_msg_map: IndexMap<String, String>,
    pub trans_tag_map: IndexMap<String, String>,
    pub hide_msg_list: Vec<String>,
    pub tag_keywords: Vec<String>,
    pub line_keywords: Vec<String>,
    pub highlight_list: Vec<String>,
}

impl Profile {
    pub fn load(path: &Path) -> Result<Profile, ConfigError> {
        let mut visiting = Vec::new();
        Self::load_chain(path, &mut visiting)
    }

    /// Parse a single profile document. `from:` is not followed.
    pub fn from_yaml_str(yaml: &str) -> Result<Profile, ConfigError> {
        let file: ProfileFile = serde_yaml::from_str(yaml).map_err(|source| ConfigError::Yaml {
            path: PathBuf::from("<string>"),
            source,
        })?;
        if let Some(from) = &file.from {
            log::warn!("ignoring 'from: {}' in inline profile", from);
        }
        let mut profile = Profile::default();
        profile.merge(file);
        Ok(profile)
    }

    fn load_chain(path: &Path, visiting: &mut Vec<PathBuf>) -> Result<Profile, ConfigError> {
        let canonical = path.canonicalize().map_err(|source| ConfigError::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        if visiting.contains(&canonical) {
            return Err(ConfigError::IncludeCycle(canonical));
        }

        let text = std::fs::read_to_string(&canonical).map_err(|source| {
            ConfigError::FileNotFound {
                path: canonical.clone(),
                source,
            }
        })?;
        let file: ProfileFile =
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
                path: canonical.clone(),
                source,
            })?;
        log::debug!("loaded profile {}", canonical.display());

        visiting.push(canonical.clone());
        let mut profile = match &file.from {
            Some(from) => {
                let dir = canonical.parent().unwrap_or_else(|| Path::new("."));
                Self::load_chain(&resolve_include(dir, from), visiting)?
            }
            None => Profile::default(),
        };
        visiting.pop();

        profile.merge(file);
        Ok(profile)
    }

    fn merge(&mut self, file: ProfileFile) {
        if file.log_line_regex.is_some() {
            self.log_line_regex = file.log_line_regex;
        }
        if file.log_type.is_some() {
            self.log_type = file.log_type;
        }
        if file.hide_same_tags.is_some() {
            self.hide_same_tags = file.hide_same_tags;
        }
        if !file.separator_regex_list.is_empty() {
            self.separator_regex_list = file.separator_regex_list;
        }
        self.trans_msg_map.extend(file.trans_msg_map);
        self.trans_tag_map.extend(file.trans_tag_map);
        self.hide_msg_list.extend(file.hide_msg_list);
        self.tag_keywords.extend(file.tag_keywords);
        self.line_keywords.extend(file.line_keywords);
        self.highlight_list.extend(file.highlight_list);
    }

    /// Message rewrites, tag rewrites and hide rules of this profile
    pub fn transform_rules(&self) -> Result<TransformRules, ConfigError> {
        let mut rules = TransformRules::new();
        for (pattern, replacement) in &self.trans_msg_map {
            rules.add_substitution(Matcher::parse(pattern)?, replacement);
        }
        for (tag, label) in &self.trans_tag_map {
            rules.add_tag_rewrite(tag, label);
        }
        for hidden in &self.hide_msg_list {
            rules.add_hide(Matcher::parse(hidden)?);
        }
        Ok(rules)
    }

    /// Install this profile's pattern, filters and rules on a processor
    pub fn apply(&self, processor: &mut LogProcessor) -> Result<(), ConfigError> {
        if let Some(regex) = &self.log_line_regex {
            processor.setup_regex_parser(regex)?;
        }
        if !self.separator_regex_list.is_empty() {
            processor.setup_separator(&self.separator_regex_list)?;
        }
        processor.setup_condition(&self.tag_keywords, &self.line_keywords)?;
        processor.setup_highlight(&self.highlight_list);
        processor.setup_trans(self.transform_rules()?);
        Ok(())
    }
}

/// `from: base` refers to `base.yml` next to the including file
fn resolve_include(dir: &Path, from: &str) -> PathBuf {
    let path = dir.join(from);
    if path.extension().is_none() {
        path.with_extension("yml")
    } else {
        path
    }
}
