//! Core pitch vocabulary: letter steps, accidentals, scales, and fully
//! spelled pitches.
//!
//! A [`Pitch`] is a spelled note (octave, letter, alteration), distinct
//! from a raw MIDI note number: MIDI 61 may be spelled C♯4 or D♭4
//! depending on key. Octave 4 starts at middle C (MIDI 60).

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the seven letter names of the diatonic scale, ordinal 0–6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    C = 0,
    D = 1,
    E = 2,
    F = 3,
    G = 4,
    A = 5,
    B = 6,
}

impl Step {
    /// All steps in letter order, C..B.
    pub const ALL: [Step; 7] = [
        Step::C,
        Step::D,
        Step::E,
        Step::F,
        Step::G,
        Step::A,
        Step::B,
    ];

    /// Ordinal index 0–6 (C = 0).
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Step for an ordinal index 0–6.
    ///
    /// Indices outside 0–6 are a caller bug and panic.
    pub const fn from_index(index: usize) -> Step {
        Self::ALL[index]
    }

    /// Semitone offset of the natural note within its octave:
    /// C=0, D=2, E=4, F=5, G=7, A=9, B=11.
    pub const fn natural_semitone(self) -> u8 {
        [0, 2, 4, 5, 7, 9, 11][self as usize]
    }

    /// Letter name as a string ("C".."B").
    pub const fn letter(self) -> &'static str {
        ["C", "D", "E", "F", "G", "A", "B"][self as usize]
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

/// Accidental glyph decision for a rendered note.
///
/// `None` means no glyph is drawn (the key signature or a previous
/// accidental already implies the pitch); the other three call for an
/// explicit sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accidental {
    None,
    Natural,
    Sharp,
    Flat,
}

impl Accidental {
    /// Chromatic alteration this accidental stands for.
    pub const fn alter(self) -> i32 {
        match self {
            Accidental::None | Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        }
    }

    /// Accidental for a chromatic alteration in {-1, 0, 1}.
    ///
    /// Zero maps to `treat_zero_as` (an explicit natural or no glyph,
    /// depending on context). Other values are a caller bug and panic.
    pub fn from_alter(alter: i32, treat_zero_as: Accidental) -> Accidental {
        match alter {
            -1 => Accidental::Flat,
            0 => treat_zero_as,
            1 => Accidental::Sharp,
            _ => panic!("alteration {alter} out of range"),
        }
    }
}

/// Major or minor mode of a key signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scale {
    Major,
    Minor,
}

/// A fully spelled note: octave, letter step, and alteration in {-1, 0, 1}.
///
/// Octave 4 starts at middle C, so MIDI 60 is `Pitch::new(4, Step::C, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pitch {
    octave: i32,
    step: Step,
    alter: i32,
}

impl Pitch {
    pub const fn new(octave: i32, step: Step, alter: i32) -> Pitch {
        Pitch {
            octave,
            step,
            alter,
        }
    }

    pub const fn octave(&self) -> i32 {
        self.octave
    }

    pub const fn step(&self) -> Step {
        self.step
    }

    pub const fn alter(&self) -> i32 {
        self.alter
    }

    /// MIDI note number of this pitch. Middle C (C4) = 60.
    ///
    /// Pitches outside the MIDI range are a caller bug.
    pub fn midi_note(&self) -> u8 {
        let note = 60 + (self.octave - 4) * 12 + self.step.natural_semitone() as i32 + self.alter;
        debug_assert!((0..=127).contains(&note), "pitch {self} outside MIDI range");
        note as u8
    }

    /// Same spelling shifted by whole octaves.
    pub const fn add_octaves(&self, octave_delta: i32) -> Pitch {
        Pitch::new(self.octave + octave_delta, self.step, self.alter)
    }

    /// Signed number of diatonic steps from `other` to this pitch,
    /// ignoring alterations (C4 → E4 is 2, B3 → C4 is 1).
    pub fn diatonic_steps_from(&self, other: &Pitch) -> i32 {
        (self.step.index() as i32 + self.octave * 7)
            - (other.step.index() as i32 + other.octave * 7)
    }
}

impl Default for Pitch {
    fn default() -> Self {
        Pitch::new(4, Step::C, 0)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alter = match self.alter {
            -1 => "b",
            1 => "#",
            _ => "",
        };
        write!(f, "{}{}{}", self.step, alter, self.octave)
    }
}
