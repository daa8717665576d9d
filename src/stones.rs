//! The five gemstone kinds on display
//!
//! Labels match the classifier's class names (the exhibit's model was trained
//! with Dutch labels), so `from_label` doubles as the recognition mapping.

use serde::{Deserialize, Serialize};

/// Gemstone kinds featured in the exhibit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoneKind {
    RoseQuartz,
    Citrine,
    Aventurine,
    Obsidian,
    Amethyst,
}

/// All kinds, in catalog order (spawn sampling indexes into this)
pub const ALL_STONES: [StoneKind; 5] = [
    StoneKind::RoseQuartz,
    StoneKind::Citrine,
    StoneKind::Aventurine,
    StoneKind::Obsidian,
    StoneKind::Amethyst,
];

impl StoneKind {
    /// Classifier class label for this kind
    pub fn label(&self) -> &'static str {
        match self {
            StoneKind::RoseQuartz => "rozenkwarts",
            StoneKind::Citrine => "citrien",
            StoneKind::Aventurine => "aventurijn",
            StoneKind::Obsidian => "obsidiaan",
            StoneKind::Amethyst => "amethist",
        }
    }

    /// Name shown on the fact screen and in logs
    pub fn display_name(&self) -> &'static str {
        match self {
            StoneKind::RoseQuartz => "Rozenkwarts",
            StoneKind::Citrine => "Citrien",
            StoneKind::Aventurine => "Aventurijn",
            StoneKind::Obsidian => "Obsidiaan",
            StoneKind::Amethyst => "Amethist",
        }
    }

    /// Map a classifier label back to a kind. Unknown labels (including the
    /// model's `noStone` class) return `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "rozenkwarts" => Some(StoneKind::RoseQuartz),
            "citrien" => Some(StoneKind::Citrine),
            "aventurijn" => Some(StoneKind::Aventurine),
            "obsidiaan" => Some(StoneKind::Obsidian),
            "amethist" => Some(StoneKind::Amethyst),
            _ => None,
        }
    }
}
