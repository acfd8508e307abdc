use crate::colors::{ColorTable, Painter};
use crate::error::ConfigError;
use crate::formatters::columns::ColumnFormatter;
use crate::formatters::{MessageWrapper, PassthroughWrapper};
use crate::pattern_extraction::{ExtractionPattern, LogFields};
use crate::pipeline::config::ProcessorConfig;
use crate::pipeline::context::{FilterState, ProcessedLine};
use crate::pipeline::filter::{FilterInput, KeywordFilter};
use crate::pipeline::stream::LineProcessor;
use crate::separator::{GroupKey, GroupKeyTable, SeparatorTracker};
use crate::transform::{ContentTransformer, TransformRules};
use std::sync::Arc;

/// Extraction pattern together with the column layout it implies
#[derive(Debug, Clone)]
struct Layout {
    pattern: ExtractionPattern,
    columns: ColumnFormatter,
}

/// Formats one log stream line by line.
///
/// Setup calls for keywords, highlights and rewrite rules accumulate;
/// the extraction pattern and separator patterns are replaced. Without an
/// extraction pattern every line yields nothing.
pub struct LogProcessor {
    name: String,
    config: ProcessorConfig,
    painter: Painter,
    colors: ColorTable,
    layout: Option<Layout>,
    filter: KeywordFilter,
    separator: SeparatorTracker,
    transformer: ContentTransformer,
    wrapper: Arc<dyn MessageWrapper>,
    state: FilterState,
}

impl LogProcessor {
    pub fn new(config: ProcessorConfig, colors: ColorTable, group_keys: GroupKeyTable) -> Self {
        let painter = Painter::new(config.use_colors);
        LogProcessor {
            name: "log".to_string(),
            filter: KeywordFilter::new(config.no_time_mode()),
            separator: SeparatorTracker::new(group_keys),
            transformer: ContentTransformer::new(painter, colors.clone()),
            wrapper: Arc::new(PassthroughWrapper),
            state: FilterState::default(),
            layout: None,
            painter,
            colors,
            config,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn setup_regex_parser(&mut self, spec: &str) -> Result<(), ConfigError> {
        let pattern = ExtractionPattern::new(spec)?;
        self.set_pattern(pattern);
        Ok(())
    }

    pub fn set_pattern(&mut self, pattern: ExtractionPattern) {
        let columns = ColumnFormatter::new(
            self.painter,
            self.colors.clone(),
            pattern.capabilities(),
            self.config.hide_same_tags,
        );
        self.layout = Some(Layout { pattern, columns });
    }

    pub fn pattern(&self) -> Option<&ExtractionPattern> {
        self.layout.as_ref().map(|l| &l.pattern)
    }

    /// Append tag keywords and line keywords
    pub fn setup_condition<T, L>(&mut self, tag_keywords: T, line_keywords: L) -> Result<(), ConfigError>
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        L: IntoIterator,
        L::Item: AsRef<str>,
    {
        self.filter.tag_keywords_mut().extend(tag_keywords)?;
        self.filter.line_keywords_mut().extend(line_keywords)?;
        Ok(())
    }

    pub fn setup_highlight<I, S>(&mut self, terms: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.transformer.add_highlights(terms);
    }

    pub fn setup_trans(&mut self, rules: TransformRules) {
        self.transformer.add_rules(rules);
    }

    pub fn setup_separator<I, S>(&mut self, patterns: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.separator.set_patterns(patterns)
    }

    pub fn set_wrapper(&mut self, wrapper: Arc<dyn MessageWrapper>) {
        self.wrapper = wrapper;
    }

    pub fn filter(&self) -> &KeywordFilter {
        &self.filter
    }

    pub fn highlights(&self) -> &[String] {
        self.transformer.highlights()
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// A processor with the same setup and shared tables but fresh filter
    /// state, for formatting another stream alongside this one
    pub fn fork(&self) -> LogProcessor {
        LogProcessor {
            name: self.name.clone(),
            config: self.config.clone(),
            painter: self.painter,
            colors: self.colors.clone(),
            layout: self.layout.clone(),
            filter: self.filter.clone(),
            separator: self.separator.clone(),
            transformer: self.transformer.clone(),
            wrapper: Arc::clone(&self.wrapper),
            state: FilterState::default(),
        }
    }

    /// Process one raw line; invalid UTF-8 is replaced, never rejected
    pub fn process(&mut self, raw: &[u8]) -> ProcessedLine {
        let decoded = String::from_utf8_lossy(raw);
        self.process_line(&decoded)
    }

    pub fn process_line(&mut self, line: &str) -> ProcessedLine {
        let line = line.trim_end();
        if line.trim().is_empty() {
            return ProcessedLine::none();
        }

        let fields = match &self.layout {
            Some(layout) => layout.pattern.extract(line).into_fields(line),
            None => return ProcessedLine::none(),
        };

        self.process_decoded(line, fields)
    }

    fn process_decoded(&mut self, line: &str, fields: LogFields) -> ProcessedLine {
        let input = FilterInput {
            tag: fields.tag.as_deref(),
            message: fields.message.as_deref(),
            line,
        };
        if !self.filter.decide(&mut self.state, &input) {
            return ProcessedLine::none();
        }

        let layout = match &self.layout {
            Some(layout) => layout,
            None => return ProcessedLine::none(),
        };

        let mut buf = layout.columns.format(&fields, &mut self.state);

        let message = fields.message.as_deref().unwrap_or(line);
        let group_key = self.separator.group_key(message);
        let message = self.transformer.transform(
            fields.tag.as_deref(),
            message,
            self.filter.line_keywords(),
        );

        buf.push_str(&self.wrapper.wrap(
            &message,
            layout.columns.header_width(),
            self.config.width,
        ));

        ProcessedLine::emitted(group_key, buf)
    }

    /// Banner announcing a new message group, painted in the group's color
    pub fn separator_banner(&self, key: GroupKey, width: usize) -> Option<String> {
        let label = self.separator.table().label(key)?;
        let banner = format!("{:=^width$}", format!(" {} ", label), width = width);
        let color = self.colors.color_for(&label);
        Some(self.painter.render(&banner, Some(color), None))
    }
}

impl LineProcessor for LogProcessor {
    fn process(&mut self, raw: &[u8]) -> ProcessedLine {
        LogProcessor::process(self, raw)
    }

    fn separator_line(&self, key: GroupKey, width: usize) -> Option<String> {
        self.separator_banner(key, width)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self) {
        self.state = FilterState::default();
    }
}
