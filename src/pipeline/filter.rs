use crate::keywords::KeywordSet;
use crate::pipeline::context::FilterState;

/// The parts of a decoded line the filter looks at
#[derive(Debug, Clone, Copy)]
pub struct FilterInput<'a> {
    pub tag: Option<&'a str>,
    pub message: Option<&'a str>,
    pub line: &'a str,
}

/// Keyword gate deciding whether a line is shown.
///
/// Lines without a tag are continuations of the previous line and inherit
/// its verdict through `FilterState::previous_line_matched`.
#[derive(Debug, Clone, Default)]
pub struct KeywordFilter {
    tag_keywords: KeywordSet,
    line_keywords: KeywordSet,
    no_time_mode: bool,
}

impl KeywordFilter {
    pub fn new(no_time_mode: bool) -> Self {
        KeywordFilter {
            no_time_mode,
            ..Default::default()
        }
    }

    pub fn tag_keywords_mut(&mut self) -> &mut KeywordSet {
        &mut self.tag_keywords
    }

    pub fn line_keywords_mut(&mut self) -> &mut KeywordSet {
        &mut self.line_keywords
    }

    pub fn tag_keywords(&self) -> &KeywordSet {
        &self.tag_keywords
    }

    pub fn line_keywords(&self) -> &KeywordSet {
        &self.line_keywords
    }

    pub fn decide(&self, state: &mut FilterState, input: &FilterInput<'_>) -> bool {
        let tk = &self.tag_keywords;
        let lk = &self.line_keywords;
        let mut matched = true;

        if tk.is_configured() {
            if let Some(tag) = input.tag {
                matched = tk.matches(tag);
                state.previous_line_matched = matched;
            }
        }

        if self.no_time_mode && tk.is_configured() {
            if let Some(message) = input.message {
                matched = tk.matches(message);
                state.previous_line_matched = matched;
            }
        }

        if lk.is_configured() {
            if lk.matches(input.line) {
                matched = true;
                state.previous_line_matched = true;
            } else if !tk.is_configured() {
                matched = false;
            }
        }

        if matched && input.tag.is_none() && !state.previous_line_matched {
            matched = false;
        }

        matched
    }
}
