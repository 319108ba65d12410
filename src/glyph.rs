//! SMuFL glyph identifiers for the notation symbols the score view uses.
//!
//! Opaque to the rest of the core: clefs and key signatures carry a
//! [`Glyph`] through to the renderer, which resolves it against a SMuFL
//! font (Leland, Bravura, ...). Only the subset of glyphs the score bar
//! actually draws is listed here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A SMuFL glyph, identified by its canonical name and codepoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Glyph {
    GClef,
    FClef,
    AccidentalFlat,
    AccidentalNatural,
    AccidentalSharp,
    NoteheadDoubleWhole,
    NoteheadWhole,
    NoteheadHalf,
    NoteheadBlack,
    RestWhole,
    RestHalf,
    RestQuarter,
    Rest8th,
    Rest16th,
    Rest32nd,
    Rest64th,
    Rest128th,
    Flag8thUp,
    Flag8thDown,
}

impl Glyph {
    /// SMuFL codepoint in the Basic Multilingual Plane private use area.
    pub const fn codepoint(self) -> u32 {
        match self {
            Glyph::GClef => 0xE050,
            Glyph::FClef => 0xE062,
            Glyph::AccidentalFlat => 0xE260,
            Glyph::AccidentalNatural => 0xE261,
            Glyph::AccidentalSharp => 0xE262,
            Glyph::NoteheadDoubleWhole => 0xE0A0,
            Glyph::NoteheadWhole => 0xE0A2,
            Glyph::NoteheadHalf => 0xE0A3,
            Glyph::NoteheadBlack => 0xE0A4,
            Glyph::RestWhole => 0xE4E3,
            Glyph::RestHalf => 0xE4E4,
            Glyph::RestQuarter => 0xE4E5,
            Glyph::Rest8th => 0xE4E6,
            Glyph::Rest16th => 0xE4E7,
            Glyph::Rest32nd => 0xE4E8,
            Glyph::Rest64th => 0xE4E9,
            Glyph::Rest128th => 0xE4EA,
            Glyph::Flag8thUp => 0xE240,
            Glyph::Flag8thDown => 0xE241,
        }
    }

    /// Canonical SMuFL glyph name, as used in font metadata.
    pub const fn name(self) -> &'static str {
        match self {
            Glyph::GClef => "gClef",
            Glyph::FClef => "fClef",
            Glyph::AccidentalFlat => "accidentalFlat",
            Glyph::AccidentalNatural => "accidentalNatural",
            Glyph::AccidentalSharp => "accidentalSharp",
            Glyph::NoteheadDoubleWhole => "noteheadDoubleWhole",
            Glyph::NoteheadWhole => "noteheadWhole",
            Glyph::NoteheadHalf => "noteheadHalf",
            Glyph::NoteheadBlack => "noteheadBlack",
            Glyph::RestWhole => "restWhole",
            Glyph::RestHalf => "restHalf",
            Glyph::RestQuarter => "restQuarter",
            Glyph::Rest8th => "rest8th",
            Glyph::Rest16th => "rest16th",
            Glyph::Rest32nd => "rest32nd",
            Glyph::Rest64th => "rest64th",
            Glyph::Rest128th => "rest128th",
            Glyph::Flag8thUp => "flag8thUp",
            Glyph::Flag8thDown => "flag8thDown",
        }
    }

    /// Look up a glyph by its canonical SMuFL name.
    pub fn from_name(name: &str) -> Option<Glyph> {
        ALL_GLYPHS.iter().copied().find(|g| g.name() == name)
    }

    /// The glyph's character, for drawing with a SMuFL text font.
    pub fn as_char(self) -> char {
        // All listed codepoints are valid BMP scalar values.
        char::from_u32(self.codepoint()).unwrap()
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const ALL_GLYPHS: [Glyph; 19] = [
    Glyph::GClef,
    Glyph::FClef,
    Glyph::AccidentalFlat,
    Glyph::AccidentalNatural,
    Glyph::AccidentalSharp,
    Glyph::NoteheadDoubleWhole,
    Glyph::NoteheadWhole,
    Glyph::NoteheadHalf,
    Glyph::NoteheadBlack,
    Glyph::RestWhole,
    Glyph::RestHalf,
    Glyph::RestQuarter,
    Glyph::Rest8th,
    Glyph::Rest16th,
    Glyph::Rest32nd,
    Glyph::Rest64th,
    Glyph::Rest128th,
    Glyph::Flag8thUp,
    Glyph::Flag8thDown,
];
