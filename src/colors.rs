use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

pub const RESET: &str = "\x1b[0m";

/// The eight basic ANSI terminal colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Black => 0,
            Color::Red => 1,
            Color::Green => 2,
            Color::Yellow => 3,
            Color::Blue => 4,
            Color::Magenta => 5,
            Color::Cyan => 6,
            Color::White => 7,
        }
    }
}

/// Colors handed out to tags and keywords, in initial allocation order
pub const PALETTE: [Color; 6] = [
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
];

/// Renders text with ANSI styling, or leaves it untouched when colors are off
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    pub fn new(use_colors: bool) -> Self {
        Self {
            enabled: use_colors,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Opening escape sequence for the given colors (empty when disabled)
    pub fn open(&self, fg: Option<Color>, bg: Option<Color>) -> String {
        if !self.enabled {
            return String::new();
        }

        let mut codes = Vec::with_capacity(2);
        if let Some(fg) = fg {
            codes.push(format!("3{}", fg.code()));
        }
        if let Some(bg) = bg {
            codes.push(format!("4{}", bg.code()));
        }

        if codes.is_empty() {
            String::new()
        } else {
            format!("\x1b[{}m", codes.join(";"))
        }
    }

    pub fn reset(&self) -> &'static str {
        if self.enabled {
            RESET
        } else {
            ""
        }
    }

    /// Wrap `text` in the given colors followed by a reset code
    pub fn render(&self, text: &str, fg: Option<Color>, bg: Option<Color>) -> String {
        let open = self.open(fg, bg);
        if open.is_empty() {
            return text.to_string();
        }
        format!("{}{}{}", open, text, RESET)
    }
}

#[derive(Debug)]
struct Allocation {
    known: HashMap<String, Color>,
    // least recently used first
    recency: Vec<Color>,
}

impl Default for Allocation {
    fn default() -> Self {
        Allocation {
            known: HashMap::new(),
            recency: PALETTE.to_vec(),
        }
    }
}

/// Label to color assignments shared by every stream of a run.
///
/// A label keeps the color it was first given for the lifetime of the table.
/// New labels receive the palette color that was used least recently, so
/// neighbouring tags in a busy log tend to get distinct colors. Cloning the
/// table shares the same assignments.
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    inner: Arc<Mutex<Allocation>>,
}

impl ColorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color_for(&self, label: &str) -> Color {
        let mut alloc = self.inner.lock();

        let color = match alloc.known.get(label) {
            Some(color) => *color,
            None => {
                let color = alloc.recency[0];
                alloc.known.insert(label.to_string(), color);
                color
            }
        };

        if let Some(pos) = alloc.recency.iter().position(|c| *c == color) {
            alloc.recency.remove(pos);
            alloc.recency.push(color);
        }

        color
    }

    /// Number of labels that have been assigned a color
    pub fn len(&self) -> usize {
        self.inner.lock().known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
