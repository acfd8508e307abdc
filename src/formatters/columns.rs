use crate::colors::{Color, ColorTable, Painter};
use crate::pattern_extraction::{Capabilities, LogFields};
use crate::pipeline::context::FilterState;

pub const DATE_WIDTH: usize = 5;
pub const TIME_WIDTH: usize = 16;
pub const PROCESS_WIDTH: usize = 5;
pub const THREAD_WIDTH: usize = 5;
pub const LEVEL_WIDTH: usize = 3;
pub const TAG_WIDTH: usize = 23;

/// Keep the last `width` characters of `value`, right-justified
pub fn fit(value: &str, width: usize) -> String {
    let count = value.chars().count();
    let tail: String = value.chars().skip(count.saturating_sub(width)).collect();
    format!("{:>width$}", tail, width = width)
}

/// Foreground and background of the 3-wide level block
fn level_style(level: &str) -> Option<(char, Color, Color)> {
    match level.to_ascii_uppercase().as_str() {
        "V" | "VERBOSE" => Some(('V', Color::White, Color::Black)),
        "D" | "DEBUG" => Some(('D', Color::Black, Color::Blue)),
        "I" | "INFO" => Some(('I', Color::Black, Color::Green)),
        "W" | "WARN" | "WARNING" => Some(('W', Color::Black, Color::Yellow)),
        "E" | "ERROR" => Some(('E', Color::Black, Color::Red)),
        "F" | "FATAL" => Some(('F', Color::Black, Color::Red)),
        "A" | "ASSERT" => Some(('A', Color::Black, Color::Red)),
        _ => None,
    }
}

/// Builds the fixed-width column header in front of the message
#[derive(Debug, Clone)]
pub struct ColumnFormatter {
    painter: Painter,
    colors: ColorTable,
    capabilities: Capabilities,
    hide_same_tags: bool,
}

impl ColumnFormatter {
    pub fn new(
        painter: Painter,
        colors: ColorTable,
        capabilities: Capabilities,
        hide_same_tags: bool,
    ) -> Self {
        ColumnFormatter {
            painter,
            colors,
            capabilities,
            hide_same_tags,
        }
    }

    /// Printable width of the header for this pattern, ignoring overlong
    /// unknown levels
    pub fn header_width(&self) -> usize {
        let caps = &self.capabilities;
        [
            (caps.date, DATE_WIDTH),
            (caps.time, TIME_WIDTH),
            (caps.process, PROCESS_WIDTH),
            (caps.thread, THREAD_WIDTH),
            (caps.level, LEVEL_WIDTH),
            (caps.tag, TAG_WIDTH),
        ]
        .iter()
        .filter(|(capable, _)| *capable)
        .map(|(_, width)| width + 1)
        .sum()
    }

    pub fn format(&self, fields: &LogFields, state: &mut FilterState) -> String {
        let caps = &self.capabilities;
        let mut buf = String::new();

        push_column(&mut buf, fields.date.as_deref(), DATE_WIDTH, caps.date);
        push_column(&mut buf, fields.time.as_deref(), TIME_WIDTH, caps.time);
        push_column(
            &mut buf,
            fields.process.as_deref().map(str::trim),
            PROCESS_WIDTH,
            caps.process,
        );
        push_column(
            &mut buf,
            fields.thread.as_deref().map(str::trim),
            THREAD_WIDTH,
            caps.thread,
        );

        match fields.level.as_deref() {
            Some(level) if !level.is_empty() => {
                buf.push_str(&self.render_level(level));
                buf.push(' ');
            }
            Some(_) => push_blank(&mut buf, LEVEL_WIDTH),
            None if caps.level => push_blank(&mut buf, LEVEL_WIDTH),
            None => {}
        }

        match fields.tag.as_deref() {
            Some(tag) if !(self.hide_same_tags && state.last_tag.as_deref() == Some(tag)) => {
                state.last_tag = Some(tag.to_string());
                buf.push_str(&self.render_tag(tag));
                buf.push(' ');
            }
            _ if caps.tag => push_blank(&mut buf, TAG_WIDTH),
            _ => {}
        }

        buf
    }

    pub fn render_level(&self, level: &str) -> String {
        match level_style(level) {
            Some((letter, fg, bg)) => {
                self.painter
                    .render(&format!(" {} ", letter), Some(fg), Some(bg))
            }
            None => format!(" {} ", level),
        }
    }

    fn render_tag(&self, tag: &str) -> String {
        let fitted = fit(tag, TAG_WIDTH);
        let text = fitted.trim_start_matches(' ');
        let padding = &fitted[..fitted.len() - text.len()];
        let color = self.colors.color_for(tag);
        format!("{}{}", padding, self.painter.render(text, Some(color), None))
    }
}

fn push_column(buf: &mut String, value: Option<&str>, width: usize, capable: bool) {
    match value {
        Some(value) => {
            buf.push_str(&fit(value, width));
            buf.push(' ');
        }
        None if capable => push_blank(buf, width),
        None => {}
    }
}

fn push_blank(buf: &mut String, width: usize) {
    buf.extend(std::iter::repeat(' ').take(width + 1));
}
