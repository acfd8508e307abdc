use crate::error::ConfigError;
use regex::Regex;

/// Ordered set of partial-match patterns.
///
/// A keyword matches when it is found anywhere in the text. Keywords are
/// regular expressions, so plain words work as substrings and `Act.*Manager`
/// works as a pattern. The set only ever grows.
#[derive(Debug, Clone, Default)]
pub struct KeywordSet {
    keywords: Vec<Keyword>,
}

#[derive(Debug, Clone)]
struct Keyword {
    text: String,
    regex: Regex,
}

impl KeywordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_keywords<I, S>(keywords: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = KeywordSet::new();
        set.extend(keywords)?;
        Ok(set)
    }

    /// Append keywords after trimming surrounding whitespace
    pub fn extend<I, S>(&mut self, keywords: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for keyword in keywords {
            let text = keyword.as_ref().trim();
            if text.is_empty() {
                log::warn!("ignoring empty keyword");
                continue;
            }
            let regex = Regex::new(text).map_err(|e| ConfigError::invalid_pattern(text, e))?;
            log::debug!("added keyword '{}'", text);
            self.keywords.push(Keyword {
                text: text.to_string(),
                regex,
            });
        }
        Ok(())
    }

    /// An empty set means "no constraint": callers skip it rather than
    /// treating it as never matching
    pub fn is_configured(&self) -> bool {
        !self.keywords.is_empty()
    }

    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| k.regex.is_match(text))
    }

    /// The trimmed keyword strings, in the order they were added
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(|k| k.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}
