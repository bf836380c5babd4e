//! Keyboard shortcuts

/// Global shortcuts active on the form page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Ctrl/Cmd+S
    Save,
    /// Ctrl/Cmd+P - generate the printable document
    Print,
    /// Ctrl/Cmd+E
    Export,
}

impl Shortcut {
    /// Decode a keydown. `ctrl` or `meta` (Cmd on macOS) must be held.
    pub fn from_key(key: &str, ctrl: bool, meta: bool) -> Option<Self> {
        if !(ctrl || meta) {
            return None;
        }
        match key.to_lowercase().as_str() {
            "s" => Some(Shortcut::Save),
            "p" => Some(Shortcut::Print),
            "e" => Some(Shortcut::Export),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Shortcut::Save => "save",
            Shortcut::Print => "print",
            Shortcut::Export => "export",
        }
    }
}
