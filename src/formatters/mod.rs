/// Hook for laying out the message part of a formatted line.
///
/// `header_width` is the printable width of the columns in front of the
/// message and `width` the terminal width, if known.
pub trait MessageWrapper: Send + Sync {
    fn wrap(&self, message: &str, header_width: usize, width: Option<usize>) -> String;
}

/// Leaves messages as they are
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughWrapper;

impl MessageWrapper for PassthroughWrapper {
    fn wrap(&self, message: &str, _header_width: usize, _width: Option<usize>) -> String {
        message.to_string()
    }
}

pub mod columns;
