//! Inline text formatting and text modes

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Formatting bitmask carried by every text node.
    ///
    /// The bit values are part of the persisted JSON form and must not change.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TextFormat: u32 {
        const BOLD = 1;
        const ITALIC = 1 << 1;
        const STRIKETHROUGH = 1 << 2;
        const UNDERLINE = 1 << 3;
        const CODE = 1 << 4;
        const SUBSCRIPT = 1 << 5;
        const SUPERSCRIPT = 1 << 6;
    }
}

impl TextFormat {
    /// Look up a single format flag by its command name
    pub fn from_command_name(name: &str) -> Option<Self> {
        match name {
            "bold" => Some(Self::BOLD),
            "italic" => Some(Self::ITALIC),
            "strikethrough" => Some(Self::STRIKETHROUGH),
            "underline" => Some(Self::UNDERLINE),
            "code" => Some(Self::CODE),
            "subscript" => Some(Self::SUBSCRIPT),
            "superscript" => Some(Self::SUPERSCRIPT),
            _ => None,
        }
    }

    /// Toggle `flag`, keeping subscript and superscript mutually exclusive
    pub fn toggled(self, flag: TextFormat) -> Self {
        let mut next = self ^ flag;
        if flag == Self::SUBSCRIPT && next.contains(Self::SUBSCRIPT) {
            next.remove(Self::SUPERSCRIPT);
        } else if flag == Self::SUPERSCRIPT && next.contains(Self::SUPERSCRIPT) {
            next.remove(Self::SUBSCRIPT);
        }
        next
    }
}

/// Editing mode of a text node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextMode {
    /// Ordinary character-by-character editable text
    #[default]
    Normal,
    /// Indivisible text: removed as a whole, never split or partially edited
    Atomic,
}

impl TextMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TextMode::Normal => "normal",
            TextMode::Atomic => "atomic",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(TextMode::Normal),
            "atomic" => Some(TextMode::Atomic),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_are_stable() {
        assert_eq!(TextFormat::BOLD.bits(), 1);
        assert_eq!(TextFormat::UNDERLINE.bits(), 8);
        assert_eq!((TextFormat::BOLD | TextFormat::ITALIC).bits(), 3);
    }

    #[test]
    fn test_script_toggle_is_exclusive() {
        let f = TextFormat::SUBSCRIPT.toggled(TextFormat::SUPERSCRIPT);
        assert!(f.contains(TextFormat::SUPERSCRIPT));
        assert!(!f.contains(TextFormat::SUBSCRIPT));
    }

    #[test]
    fn test_from_command_name() {
        assert_eq!(TextFormat::from_command_name("italic"), Some(TextFormat::ITALIC));
        assert_eq!(TextFormat::from_command_name("blink"), None);
        assert_eq!(TextMode::parse("atomic"), Some(TextMode::Atomic));
    }
}
