use crate::error::ConfigError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;

// `date,time,level = "regex"` : field names bound to positional groups
static DESCRIPTOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*([A-Za-z_]\w*(?:\s*,\s*[A-Za-z_]\w*)*)\s*=\s*"(.*)"\s*$"#).unwrap()
});

/// Fields a log line can be decoded into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldName {
    Date,
    Time,
    Process,
    Thread,
    Level,
    Tag,
    Message,
}

impl FromStr for FieldName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "date" => Ok(FieldName::Date),
            "time" => Ok(FieldName::Time),
            "process" => Ok(FieldName::Process),
            "thread" => Ok(FieldName::Thread),
            "level" => Ok(FieldName::Level),
            "tag" => Ok(FieldName::Tag),
            "message" => Ok(FieldName::Message),
            other => Err(ConfigError::InvalidDescriptor(format!(
                "unknown field '{}' (expected date, time, process, thread, level, tag or message)",
                other
            ))),
        }
    }
}

/// A decoded log line. `None` means the pattern did not produce the field,
/// `Some("")` means it matched but captured nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFields {
    pub date: Option<String>,
    pub time: Option<String>,
    pub process: Option<String>,
    pub thread: Option<String>,
    pub level: Option<String>,
    pub tag: Option<String>,
    pub message: Option<String>,
}

impl LogFields {
    pub fn get(&self, name: FieldName) -> Option<&str> {
        match name {
            FieldName::Date => self.date.as_deref(),
            FieldName::Time => self.time.as_deref(),
            FieldName::Process => self.process.as_deref(),
            FieldName::Thread => self.thread.as_deref(),
            FieldName::Level => self.level.as_deref(),
            FieldName::Tag => self.tag.as_deref(),
            FieldName::Message => self.message.as_deref(),
        }
    }

    fn slot_mut(&mut self, name: FieldName) -> &mut Option<String> {
        match name {
            FieldName::Date => &mut self.date,
            FieldName::Time => &mut self.time,
            FieldName::Process => &mut self.process,
            FieldName::Thread => &mut self.thread,
            FieldName::Level => &mut self.level,
            FieldName::Tag => &mut self.tag,
            FieldName::Message => &mut self.message,
        }
    }
}

/// Outcome of running the pattern over one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Fields(LogFields),
    Failed,
}

impl Extraction {
    /// Resolve to fields, using the whole line as message when the pattern
    /// failed or left the message unset.
    pub fn into_fields(self, line: &str) -> LogFields {
        let mut fields = match self {
            Extraction::Fields(fields) => fields,
            Extraction::Failed => LogFields::default(),
        };
        if fields.message.is_none() {
            fields.message = Some(line.to_string());
        }
        fields
    }
}

/// Which fields a pattern is able to produce, whether or not a given line
/// actually populated them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub date: bool,
    pub time: bool,
    pub process: bool,
    pub thread: bool,
    pub level: bool,
    pub tag: bool,
    pub message: bool,
}

impl Capabilities {
    fn set(&mut self, name: FieldName) {
        match name {
            FieldName::Date => self.date = true,
            FieldName::Time => self.time = true,
            FieldName::Process => self.process = true,
            FieldName::Thread => self.thread = true,
            FieldName::Level => self.level = true,
            FieldName::Tag => self.tag = true,
            FieldName::Message => self.message = true,
        }
    }
}

/// Compiled line pattern.
///
/// Accepts either a regex with named groups (`(?P<tag>...)`) or a descriptor
/// such as `level,tag,message = "([A-Z])/([^:]*): (.*)"` whose names are
/// bound to the positional groups in order. The regex is anchored at the
/// start of the line.
#[derive(Debug, Clone)]
pub struct ExtractionPattern {
    regex: Regex,
    slots: Vec<(FieldName, usize)>,
    capabilities: Capabilities,
}

impl ExtractionPattern {
    pub fn new(spec: &str) -> Result<Self, ConfigError> {
        match Self::parse_descriptor(spec)? {
            Some((names, regex_src)) => Self::from_descriptor(&names, &regex_src),
            None => Self::from_named_groups(spec),
        }
    }

    /// Split a descriptor into its field names and regex source
    fn parse_descriptor(spec: &str) -> Result<Option<(Vec<FieldName>, String)>, ConfigError> {
        if spec.contains("(?P<") || spec.contains("(?<") {
            return Ok(None);
        }
        let captures = match DESCRIPTOR_RE.captures(spec) {
            Some(captures) => captures,
            None => return Ok(None),
        };

        let names = captures[1]
            .split(',')
            .map(FieldName::from_str)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some((names, captures[2].to_string())))
    }

    fn from_descriptor(names: &[FieldName], regex_src: &str) -> Result<Self, ConfigError> {
        let regex = Self::compile(regex_src)?;

        let groups = regex.captures_len() - 1;
        if names.len() > groups {
            return Err(ConfigError::InvalidDescriptor(format!(
                "{} field names but the pattern only has {} groups",
                names.len(),
                groups
            )));
        }

        let slots: Vec<(FieldName, usize)> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (*name, i + 1))
            .collect();

        Ok(Self::with_slots(regex, slots))
    }

    fn from_named_groups(regex_src: &str) -> Result<Self, ConfigError> {
        let regex = Self::compile(regex_src)?;

        // Groups with other names are allowed and ignored
        let slots: Vec<(FieldName, usize)> = regex
            .capture_names()
            .enumerate()
            .filter_map(|(index, name)| {
                let name = FieldName::from_str(name?).ok()?;
                Some((name, index))
            })
            .collect();

        Ok(Self::with_slots(regex, slots))
    }

    fn compile(regex_src: &str) -> Result<Regex, ConfigError> {
        Regex::new(&format!("^(?:{})", regex_src))
            .map_err(|e| ConfigError::invalid_pattern(regex_src, e))
    }

    fn with_slots(regex: Regex, slots: Vec<(FieldName, usize)>) -> Self {
        let mut capabilities = Capabilities::default();
        for (name, _) in &slots {
            capabilities.set(*name);
        }
        log::debug!("compiled line pattern {} ({:?})", regex.as_str(), capabilities);

        ExtractionPattern {
            regex,
            slots,
            capabilities,
        }
    }

    pub fn extract(&self, line: &str) -> Extraction {
        let captures = match self.regex.captures(line) {
            Some(captures) => captures,
            None => return Extraction::Failed,
        };

        let mut fields = LogFields::default();
        for (name, index) in &self.slots {
            // A group that did not take part in the match stays absent
            if let Some(m) = captures.get(*index) {
                *fields.slot_mut(*name) = Some(m.as_str().to_string());
            }
        }
        Extraction::Fields(fields)
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn has_date(&self) -> bool {
        self.capabilities.date
    }

    pub fn has_time(&self) -> bool {
        self.capabilities.time
    }

    pub fn has_process(&self) -> bool {
        self.capabilities.process
    }

    pub fn has_thread(&self) -> bool {
        self.capabilities.thread
    }

    pub fn has_level(&self) -> bool {
        self.capabilities.level
    }

    pub fn has_tag(&self) -> bool {
        self.capabilities.tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGCAT: &str = r#"date,time,process,thread,level,tag,message = "(.\S*) *(.\S*) *(\d*) *(\d*) *([A-Z]) *([^:]*): (.*?)$""#;

    #[test]
    fn test_named_groups() {
        let pattern =
            ExtractionPattern::new(r"(?P<level>[A-Z])/(?P<tag>[^:]*): (?P<message>.*)").unwrap();

        assert!(pattern.has_level());
        assert!(pattern.has_tag());
        assert!(!pattern.has_date());
        assert!(!pattern.has_time());
        assert!(!pattern.has_process());
        assert!(!pattern.has_thread());

        let fields = pattern.extract("D/MyTag: hello world").into_fields("D/MyTag: hello world");
        assert_eq!(fields.level.as_deref(), Some("D"));
        assert_eq!(fields.tag.as_deref(), Some("MyTag"));
        assert_eq!(fields.message.as_deref(), Some("hello world"));
        assert_eq!(fields.date, None);
    }

    #[test]
    fn test_descriptor_form() {
        let pattern = ExtractionPattern::new(LOGCAT).unwrap();
        let caps = pattern.capabilities();
        assert!(caps.date && caps.time && caps.process && caps.thread);
        assert!(caps.level && caps.tag && caps.message);

        let line = "12-28 19:01:14.073  1724  1936 I ActivityManager: Start proc";
        let fields = pattern.extract(line).into_fields(line);
        assert_eq!(fields.date.as_deref(), Some("12-28"));
        assert_eq!(fields.time.as_deref(), Some("19:01:14.073"));
        assert_eq!(fields.process.as_deref(), Some("1724"));
        assert_eq!(fields.thread.as_deref(), Some("1936"));
        assert_eq!(fields.level.as_deref(), Some("I"));
        assert_eq!(fields.tag.as_deref(), Some("ActivityManager"));
        assert_eq!(fields.message.as_deref(), Some("Start proc"));
    }

    #[test]
    fn test_descriptor_subset_of_fields() {
        let pattern = ExtractionPattern::new(r#"level, message = "([A-Z]) (.*)""#).unwrap();
        assert!(pattern.has_level());
        assert!(!pattern.has_tag());

        let fields = pattern.extract("W careful").into_fields("W careful");
        assert_eq!(fields.level.as_deref(), Some("W"));
        assert_eq!(fields.message.as_deref(), Some("careful"));
    }

    #[test]
    fn test_failed_match_falls_back_to_whole_line() {
        let pattern = ExtractionPattern::new(r"(?P<level>[A-Z])/(?P<tag>[^:]*): (?P<message>.*)").unwrap();
        let line = "--------- beginning of main";

        let extraction = pattern.extract(line);
        assert_eq!(extraction, Extraction::Failed);

        let fields = extraction.into_fields(line);
        assert_eq!(fields.message.as_deref(), Some(line));
        assert_eq!(fields.tag, None);
        assert_eq!(fields.level, None);
    }

    #[test]
    fn test_pattern_is_anchored() {
        let pattern = ExtractionPattern::new(r"(?P<tag>\w+): (?P<message>.*)").unwrap();
        // would match from offset 2 if unanchored
        assert_eq!(pattern.extract("!! Tag: text"), Extraction::Failed);
    }

    #[test]
    fn test_empty_capture_is_present() {
        let pattern = ExtractionPattern::new(r"(?P<date>\d*) (?P<message>.*)").unwrap();
        let fields = pattern.extract(" text").into_fields(" text");
        assert_eq!(fields.date.as_deref(), Some(""));
    }

    #[test]
    fn test_non_participating_group_is_absent() {
        let pattern = ExtractionPattern::new(r"(?:(?P<tag>\w+): )?(?P<message>.*)").unwrap();
        let fields = pattern.extract("no tag here").into_fields("no tag here");
        assert_eq!(fields.tag, None);
        assert_eq!(fields.message.as_deref(), Some("no tag here"));
        assert!(pattern.has_tag());
    }

    #[test]
    fn test_missing_message_group_uses_line() {
        let pattern = ExtractionPattern::new(r"(?P<level>[A-Z]) ").unwrap();
        let fields = pattern.extract("E boom").into_fields("E boom");
        assert_eq!(fields.level.as_deref(), Some("E"));
        assert_eq!(fields.message.as_deref(), Some("E boom"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(
            ExtractionPattern::new(r"(?P<tag>[unclosed"),
            Err(ConfigError::InvalidPattern { .. })
        ));
        assert!(matches!(
            ExtractionPattern::new(r#"level,severity = "(\w) (\w)""#),
            Err(ConfigError::InvalidDescriptor(_))
        ));
        assert!(matches!(
            ExtractionPattern::new(r#"level,tag,message = "(\w) (.*)""#),
            Err(ConfigError::InvalidDescriptor(_))
        ));
    }
}
