use crate::colors::{Color, ColorTable, Painter};
use crate::error::ConfigError;
use crate::keywords::KeywordSet;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

static ANSI_SGR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());

/// Prefix that marks a rule key as a regular expression instead of a literal
pub const REGEX_PREFIX: &str = "re:";

/// Literal or regex text matcher used by the rewrite rules
#[derive(Debug, Clone)]
pub enum Matcher {
    Literal(String),
    Pattern(Regex),
}

impl Matcher {
    pub fn literal(text: &str) -> Self {
        Matcher::Literal(text.to_string())
    }

    pub fn pattern(pattern: &str) -> Result<Self, ConfigError> {
        Regex::new(pattern)
            .map(Matcher::Pattern)
            .map_err(|e| ConfigError::invalid_pattern(pattern, e))
    }

    /// `re:<regex>` becomes a pattern, anything else a literal
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        match spec.strip_prefix(REGEX_PREFIX) {
            Some(pattern) => Self::pattern(pattern),
            None => Ok(Self::literal(spec)),
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::Literal(lit) => !lit.is_empty() && text.contains(lit.as_str()),
            Matcher::Pattern(re) => re.is_match(text),
        }
    }

    /// Replace every occurrence. Pattern replacements may refer to groups
    /// with `$1` / `${name}`.
    pub fn replace_all<'a>(&self, text: &'a str, replacement: &str) -> Cow<'a, str> {
        match self {
            Matcher::Literal(lit) if lit.is_empty() || !text.contains(lit.as_str()) => {
                Cow::Borrowed(text)
            }
            Matcher::Literal(lit) => Cow::Owned(text.replace(lit.as_str(), replacement)),
            Matcher::Pattern(re) => re.replace_all(text, replacement),
        }
    }
}

/// Message rewrite, tag rewrite and hide rules, appended to during setup
#[derive(Debug, Clone, Default)]
pub struct TransformRules {
    substitutions: Vec<(Matcher, String)>,
    tag_rewrites: Vec<(String, String)>,
    hide: Vec<Matcher>,
}

impl TransformRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_substitution(&mut self, matcher: Matcher, replacement: &str) {
        self.substitutions.push((matcher, replacement.to_string()));
    }

    /// Messages of tags containing `tag` get `label` put in front of them
    pub fn add_tag_rewrite(&mut self, tag: &str, label: &str) {
        self.tag_rewrites.push((tag.to_string(), label.to_string()));
    }

    pub fn add_hide(&mut self, matcher: Matcher) {
        self.hide.push(matcher);
    }

    pub fn extend(&mut self, other: TransformRules) {
        self.substitutions.extend(other.substitutions);
        self.tag_rewrites.extend(other.tag_rewrites);
        self.hide.extend(other.hide);
    }

    pub fn is_empty(&self) -> bool {
        self.substitutions.is_empty() && self.tag_rewrites.is_empty() && self.hide.is_empty()
    }

    pub fn substitute(&self, message: &str) -> String {
        let mut message = message.to_string();
        for (matcher, replacement) in &self.substitutions {
            if matcher.is_match(&message) {
                message = matcher.replace_all(&message, replacement).into_owned();
            }
        }
        message
    }

    pub fn should_hide(&self, message: &str) -> bool {
        self.hide.iter().any(|m| m.is_match(message))
    }

    pub fn tag_label(&self, tag: &str) -> Option<&str> {
        self.tag_rewrites
            .iter()
            .find(|(key, _)| !key.is_empty() && tag.contains(key.as_str()))
            .map(|(_, label)| label.as_str())
    }
}

/// Applies rewrite rules and highlight spans to a message body.
///
/// Order is fixed: substitutions, hide, tag rewrite, line-keyword
/// highlights, then generic highlights. A hidden message stays empty for
/// the remaining steps.
#[derive(Debug, Clone)]
pub struct ContentTransformer {
    rules: TransformRules,
    highlights: Vec<String>,
    painter: Painter,
    colors: ColorTable,
}

impl ContentTransformer {
    pub fn new(painter: Painter, colors: ColorTable) -> Self {
        ContentTransformer {
            rules: TransformRules::new(),
            highlights: Vec::new(),
            painter,
            colors,
        }
    }

    pub fn add_rules(&mut self, rules: TransformRules) {
        self.rules.extend(rules);
    }

    pub fn add_highlights<I, S>(&mut self, terms: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.highlights.extend(
            terms
                .into_iter()
                .map(|t| t.as_ref().to_string())
                .filter(|t| !t.is_empty()),
        );
    }

    pub fn highlights(&self) -> &[String] {
        &self.highlights
    }

    pub fn transform(&self, tag: Option<&str>, message: &str, line_keywords: &KeywordSet) -> String {
        let mut message = self.rules.substitute(message);

        if self.rules.should_hide(&message) {
            message.clear();
        } else if let Some(tag) = tag {
            if let Some(label) = self.rules.tag_label(tag) {
                let bg = self.colors.color_for(tag);
                message = format!(
                    "{} {}",
                    self.painter.render(label, Some(Color::Black), Some(bg)),
                    message
                );
            }
        }

        for keyword in line_keywords.iter() {
            message = self.highlight(&message, keyword);
        }
        for term in &self.highlights {
            message = self.highlight(&message, term);
        }

        message
    }

    fn highlight(&self, message: &str, term: &str) -> String {
        if !self.painter.is_enabled() || term.is_empty() || !message.contains(term) {
            return message.to_string();
        }
        let open = self
            .painter
            .open(Some(Color::Black), Some(self.colors.color_for(term)));
        wrap_occurrences(message, term, &open, self.painter.reset())
    }
}

/// Wrap each occurrence of `term` in `open`..`close`, leaving escape
/// sequences already present in `text` untouched
fn wrap_occurrences(text: &str, term: &str, open: &str, close: &str) -> String {
    let wrapped = format!("{}{}{}", open, term, close);
    let mut out = String::with_capacity(text.len() + wrapped.len());
    let mut last = 0;

    for sgr in ANSI_SGR.find_iter(text) {
        out.push_str(&text[last..sgr.start()].replace(term, &wrapped));
        out.push_str(sgr.as_str());
        last = sgr.end();
    }
    out.push_str(&text[last..].replace(term, &wrapped));
    out
}
