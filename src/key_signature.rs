//! Key signatures: canonical pitch spelling and accidental decisions.
//!
//! A [`KeySignature`] is built from a count of sharps or flats (the
//! MusicXML "fifths" value, -7..=7) and a major/minor mode. At
//! construction it precomputes the spelling of every pitch class in
//! that key — which letter a raw MIDI note renders as, and whether the
//! notehead needs an explicit sharp, flat, or natural glyph next to it.
//! Everything after construction is a pure lookup; instances are
//! immutable and freely shareable across threads.
//!
//! Supports simple major and minor scales with at most 7 sharps or
//! flats; a minor key shares the spelling table of its relative major.

use serde::{Deserialize, Serialize};

use crate::clef::Clef;
use crate::glyph::Glyph;
use crate::pitch::{Accidental, Pitch, Scale, Step};

/// Semitones between adjacent entries of the circle of fifths.
const SHARP_OFFSET: i32 = 7;

/// Semitone offsets of the major scale degrees above the tonic.
const MAJOR_SCALE: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Letters that gain sharps, in the order they appear in a signature.
const ORDERED_SHARPS: [Step; 7] = [
    Step::F,
    Step::C,
    Step::G,
    Step::D,
    Step::A,
    Step::E,
    Step::B,
];

/// Letters that gain flats, in the order they appear in a signature.
const ORDERED_FLATS: [Step; 7] = [
    Step::B,
    Step::E,
    Step::A,
    Step::D,
    Step::G,
    Step::C,
    Step::F,
];

/// Rendering decision for one MIDI note: the natural (unaltered) note
/// whose staff line the notehead occupies, and the accidental glyph to
/// draw, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteAndAccidentals {
    pub note: u8,
    pub accidental: Accidental,
}

/// An immutable key signature with precomputed per-pitch-class
/// spellings.
#[derive(Debug, Clone, PartialEq)]
pub struct KeySignature {
    fifths: i32,
    scale: Scale,
    sharps: Vec<Step>,
    flats: Vec<Step>,
    /// Canonical spelling per pitch class, in the octave starting at
    /// MIDI 60 (so wrapped spellings like B♯ land in octave 3 and C♭
    /// in octave 5).
    pitches: [Pitch; 12],
}

impl KeySignature {
    /// Build a key signature for `fifths` sharps (positive) or flats
    /// (negative) in -7..=7.
    ///
    /// # Panics
    ///
    /// Panics when `fifths` is outside -7..=7; an out-of-range count
    /// has no musical meaning and clamping it would silently render
    /// the wrong key. Use [`try_new`](Self::try_new) for counts from
    /// untrusted session data.
    pub fn new(fifths: i32, scale: Scale) -> KeySignature {
        assert!(
            (-7..=7).contains(&fifths),
            "key signature fifths {fifths} outside -7..=7"
        );

        let mut pitches = [Pitch::default(); 12];
        for (i, &semitone) in MAJOR_SCALE.iter().enumerate() {
            pitches[semitone as usize] = Pitch::new(4, Step::from_index(i), 0);
        }

        let sharps = ORDERED_SHARPS[..fifths.max(0) as usize].to_vec();
        let flats = ORDERED_FLATS[..(-fifths).max(0) as usize].to_vec();

        // Overlay the chromatic spellings biased to the key's
        // direction: at least five circle-of-fifths entries so every
        // non-diatonic pitch class has a spelling even in small keys.
        let src = if fifths < 0 {
            &ORDERED_FLATS
        } else {
            &ORDERED_SHARPS
        };
        let alter = if fifths < 0 { -1 } else { 1 };
        for &step in &src[..fifths.abs().max(5) as usize] {
            let mut octave = 4;
            let mut n = MAJOR_SCALE[step.index()] as i32 + alter;
            if n < 0 {
                n += 12;
                octave += 1;
            }
            if n > 11 {
                n -= 12;
                octave -= 1;
            }
            pitches[n as usize] = Pitch::new(octave, step, alter);
        }

        KeySignature {
            fifths,
            scale,
            sharps,
            flats,
            pitches,
        }
    }

    /// Checked constructor for counts that come from session data.
    pub fn try_new(fifths: i32, scale: Scale) -> Result<KeySignature, String> {
        if !(-7..=7).contains(&fifths) {
            return Err(format!("key signature fifths {fifths} outside -7..=7"));
        }
        Ok(KeySignature::new(fifths, scale))
    }

    /// Number of sharps (positive) or flats (negative), as passed in.
    pub fn fifths(&self) -> i32 {
        self.fifths
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Base-octave MIDI note (pitch class) of the key's tonic.
    pub fn base_note(&self) -> u8 {
        let minor_offset = if self.scale == Scale::Minor { 9 } else { 0 };
        ((12 * 7 + minor_offset + self.fifths * SHARP_OFFSET) % 12) as u8
    }

    /// Letters carrying a sharp in this key, in signature order
    /// (F, C, G, D, A, E, B). Empty for flat keys and C major.
    pub fn sharps(&self) -> &[Step] {
        &self.sharps
    }

    /// Letters carrying a flat in this key, in signature order
    /// (B, E, A, D, G, C, F). Empty for sharp keys and C major.
    pub fn flats(&self) -> &[Step] {
        &self.flats
    }

    /// The key's implicit alteration for a letter: 1 if it carries a
    /// sharp, -1 a flat, 0 otherwise.
    pub fn alter_for_step(&self, step: Step) -> i32 {
        if self.sharps.contains(&step) {
            return 1;
        }
        if self.flats.contains(&step) {
            return -1;
        }
        0
    }

    /// The natural note to place on the staff and the accidental glyph
    /// to draw for a raw MIDI note, under this key signature alone
    /// (no within-bar accidental memory; see `bar::layout_bar` for
    /// that).
    ///
    /// The returned note never differs from the input by more than one
    /// semitone: one lower when the accidental is `Sharp`, one higher
    /// when `Flat`, equal when `Natural`.
    pub fn note_and_accidentals_to_render(&self, note: u8) -> NoteAndAccidentals {
        let spelled = self.pitches[(note % 12) as usize];
        let mut accidental = self.accidental_from_pitch(&spelled);
        // Rebuild the full-octave note for the spelled letter.
        let mut n = spelled.step().natural_semitone() as i32 + (note as i32 / 12) * 12;
        // Wrapped spellings (B# / Cb) land an octave off; correct that.
        if n > note as i32 + 1 {
            if n > 12 {
                n -= 12;
            } else {
                // Note 0 spelled as B# would need note -1. Render as a
                // C with an explicit natural instead.
                // TODO: maybe not use unsigned 8-bit ints for notes
                n = 0;
                accidental = Accidental::Natural;
            }
        }
        if n < note as i32 - 1 {
            n += 12;
        }
        NoteAndAccidentals {
            note: n as u8,
            accidental,
        }
    }

    /// Full spelled pitch (with octave) for a raw MIDI note in this
    /// key. Round-trips exactly: `pitch_from_midi_note(n).midi_note()`
    /// is `n`, with B♯ spelled in the octave below and C♭ in the
    /// octave above.
    pub fn pitch_from_midi_note(&self, note: u8) -> Pitch {
        let octave = (note / 12) as i32 - 5;
        self.pitches[(note % 12) as usize].add_octaves(octave)
    }

    /// Accidental glyph needed for a spelled pitch: none when its
    /// alteration matches the key's implicit alteration for that
    /// letter, otherwise the explicit sign (a natural when the pitch
    /// is unaltered but the key says otherwise).
    pub fn accidental_from_pitch(&self, pitch: &Pitch) -> Accidental {
        if self.alter_for_step(pitch.step()) == pitch.alter() {
            return Accidental::None;
        }
        Accidental::from_alter(pitch.alter(), Accidental::Natural)
    }

    /// Ordered (staff position, glyph) pairs for drawing this
    /// signature's accidentals after a clef.
    pub fn layout(&self, clef: &Clef) -> Vec<(i32, Glyph)> {
        let mut glyphs = Vec::with_capacity(self.fifths.unsigned_abs() as usize);
        for &step in &self.sharps {
            glyphs.push((clef.position_for_step(step, true), Glyph::AccidentalSharp));
        }
        for &step in &self.flats {
            glyphs.push((clef.position_for_step(step, false), Glyph::AccidentalFlat));
        }
        glyphs
    }
}

impl Default for KeySignature {
    /// C major.
    fn default() -> Self {
        KeySignature::new(0, Scale::Major)
    }
}
