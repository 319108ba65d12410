//! Clefs: bidirectional mapping between MIDI note numbers and staff
//! positions.
//!
//! Staff positions are half-line-space units on a five-line staff:
//! 0 is the bottom line, 8 the top line; values outside 0..=8 need
//! leger lines. Each clef anchors one staff position to one MIDI note
//! (treble: G4 on position 2; bass: F3 on position 6) and everything
//! else is derived diatonically from that reference point.
//!
//! All inputs are expected to be valid MIDI notes (0–127) and staff
//! positions reachable from them; out-of-range values are caller bugs,
//! not runtime errors.

use serde::Serialize;

use crate::glyph::Glyph;
use crate::pitch::{Pitch, Step};

/// Semitone distance from a natural base note to the natural note
/// `n` diatonic steps above it. Rows are indexed by the base pitch
/// class; only natural pitch classes have entries.
const NOTE_DIFFERENCES: [[u8; 7]; 12] = [
    /* C */ [0, 2, 4, 5, 7, 9, 11],
    [0; 7],
    /* D */ [0, 2, 3, 5, 7, 9, 10],
    [0; 7],
    /* E */ [0, 1, 3, 5, 7, 8, 10],
    /* F */ [0, 2, 4, 6, 7, 9, 11],
    [0; 7],
    /* G */ [0, 2, 4, 5, 7, 9, 10],
    [0; 7],
    /* A */ [0, 2, 3, 5, 7, 8, 10],
    [0; 7],
    /* B */ [0, 1, 3, 5, 6, 8, 10],
];

/// Diatonic step count from a natural base note to the note `n`
/// semitones above it. Chromatic notes land on their nearest diatonic
/// neighbor, so rows are non-decreasing with several repeated values.
const POSITION_DIFFERENCES: [[u8; 12]; 12] = [
    /* C */ [0, 0, 1, 1, 2, 3, 3, 4, 4, 5, 5, 6],
    [0; 12],
    /* D */ [0, 0, 1, 2, 2, 3, 3, 4, 4, 5, 6, 6],
    [0; 12],
    /* E */ [0, 1, 1, 2, 2, 3, 3, 4, 5, 5, 6, 6],
    /* F */ [0, 0, 1, 1, 2, 2, 3, 4, 4, 5, 5, 6],
    [0; 12],
    /* G */ [0, 0, 1, 1, 2, 3, 3, 4, 4, 5, 6, 6],
    [0; 12],
    /* A */ [0, 0, 1, 2, 2, 3, 3, 4, 5, 5, 6, 6],
    [0; 12],
    /* B */ [0, 1, 1, 2, 2, 3, 4, 4, 5, 5, 6, 6],
];

/// An immutable clef: a named reference point anchoring a staff
/// position to a MIDI note, plus layout offsets for key signature
/// accidentals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Clef {
    pub name: &'static str,
    pub glyph: Glyph,
    /// Staff position of the reference note: 0 = bottom line, 8 = top line.
    pub clef_position: i32,
    /// MIDI note number at `clef_position`.
    pub clef_note: u8,
    /// Spelled reference pitch (same note as `clef_note`).
    pub clef_pitch: Pitch,
    /// Lowest staff position a key signature sharp may occupy.
    pub key_signature_sharp_offset: i32,
    /// Lowest staff position a key signature flat may occupy.
    pub key_signature_flat_offset: i32,
}

impl Clef {
    pub const TREBLE: Clef = Clef {
        name: "Treble",
        glyph: Glyph::GClef,
        clef_position: 2,
        clef_note: 67,
        clef_pitch: Pitch::new(4, Step::G, 0),
        key_signature_sharp_offset: 3,
        key_signature_flat_offset: 1,
    };

    pub const BASS: Clef = Clef {
        name: "Bass",
        glyph: Glyph::FClef,
        clef_position: 6,
        clef_note: 53,
        clef_pitch: Pitch::new(3, Step::F, 0),
        key_signature_sharp_offset: 1,
        key_signature_flat_offset: 0,
    };

    /// All clefs the score view can choose between.
    pub const ALL: [&'static Clef; 2] = [&Clef::TREBLE, &Clef::BASS];

    /// Staff position of a MIDI note under this clef. May be negative
    /// or greater than 8 for notes off the staff.
    ///
    /// Chromatic notes map to the same position as their nearest
    /// diatonic neighbor; the accidental decision is the key
    /// signature's job, not the clef's.
    pub fn position_for_note(&self, note: u8) -> i32 {
        let mut base_note = (note % 12) as i32;
        let base_octave = (note / 12) as i32;
        let clef_base_note = (self.clef_note % 12) as i32;
        let mut clef_octave = (self.clef_note / 12) as i32;
        // Shift into the octave above the reference so the table can be
        // indexed with a non-negative offset.
        if base_note < clef_base_note {
            base_note += 12;
            clef_octave += 1;
        }
        let base_position =
            POSITION_DIFFERENCES[clef_base_note as usize][(base_note - clef_base_note) as usize];
        self.clef_position + base_position as i32 + 7 * (base_octave - clef_octave)
    }

    /// Natural (unaltered) MIDI note on a staff position under this
    /// clef. Inverse of [`position_for_note`](Self::position_for_note)
    /// for notes on the diatonic scale of the clef's reference.
    pub fn note_for_position(&self, position: i32) -> u8 {
        let mut note_pos = position;
        let mut octaves = 0;
        while note_pos < self.clef_position {
            note_pos += 7;
            octaves += 1;
        }
        while note_pos - self.clef_position >= 7 {
            note_pos -= 7;
            octaves -= 1;
        }
        let difference = NOTE_DIFFERENCES[(self.clef_note % 12) as usize]
            [(note_pos - self.clef_position) as usize];
        (self.clef_note as i32 + difference as i32 - octaves * 12) as u8
    }

    /// Note on the bottom staff line.
    pub fn lowest_note_on_bar(&self) -> u8 {
        self.note_for_position(0)
    }

    /// Note on the top staff line.
    pub fn highest_note_on_bar(&self) -> u8 {
        self.note_for_position(8)
    }

    /// How many staff positions within the five lines are covered by
    /// the note range `note_min..=note_max`; 0 when the whole range
    /// lies above or below the staff. Used to pick the clef that fits
    /// a part's range best.
    pub fn notes_on_bar(&self, note_min: u8, note_max: u8) -> i32 {
        let pos_min = self.position_for_note(note_min);
        let pos_max = self.position_for_note(note_max);
        if pos_min > 8 {
            return 0;
        }
        if pos_max < 0 {
            return 0;
        }
        pos_max.min(8) - pos_min.max(0) + 1
    }

    /// Staff position for a key signature accidental on `step`.
    ///
    /// The raw letter position is pushed up by whole octaves until it
    /// reaches the clef's sharp or flat band, so signature accidentals
    /// sit in the conventional spots within or just above the staff.
    pub fn position_for_step(&self, step: Step, for_sharp: bool) -> i32 {
        let line_offset = step.index() as i32 - self.clef_pitch.step().index() as i32;
        let mut position = self.clef_position + line_offset - 7;
        let min_pos = if for_sharp {
            self.key_signature_sharp_offset
        } else {
            self.key_signature_flat_offset
        };
        while position < min_pos {
            position += 7;
        }
        position
    }

    /// Staff position of a spelled pitch. Alterations do not move the
    /// position; C♯4 and C4 share a line.
    pub fn position_for_pitch(&self, pitch: &Pitch) -> i32 {
        pitch.diatonic_steps_from(&self.clef_pitch) + self.clef_position
    }
}

/// Pick the clef whose staff covers more of the pitch range
/// `note_min..=note_max`. Treble wins ties.
pub fn choose_clef(note_min: u8, note_max: u8) -> &'static Clef {
    let bass_note_range = Clef::BASS.notes_on_bar(note_min, note_max);
    let treble_note_range = Clef::TREBLE.notes_on_bar(note_min, note_max);
    if bass_note_range > treble_note_range {
        &Clef::BASS
    } else {
        &Clef::TREBLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_points() {
        assert_eq!(Clef::TREBLE.position_for_note(67), 2);
        assert_eq!(Clef::BASS.position_for_note(53), 6);
        // Middle C: one leger line below the treble staff, one above bass
        assert_eq!(Clef::TREBLE.position_for_note(60), -2);
        assert_eq!(Clef::BASS.position_for_note(60), 10);
    }

    #[test]
    fn chromatic_neighbors_share_positions() {
        // F#4 and F4 sit on the same treble position; G4 is one higher
        assert_eq!(
            Clef::TREBLE.position_for_note(66),
            Clef::TREBLE.position_for_note(65)
        );
        assert_eq!(
            Clef::TREBLE.position_for_note(67),
            Clef::TREBLE.position_for_note(66) + 1
        );
    }

    #[test]
    fn table_rows_non_decreasing() {
        for natural in [0usize, 2, 4, 5, 7, 9, 11] {
            let row = POSITION_DIFFERENCES[natural];
            for w in row.windows(2) {
                assert!(w[1] >= w[0], "row {natural} decreases: {row:?}");
            }
            assert_eq!(row[0], 0);
            assert_eq!(row[11], 6);
        }
    }

    #[test]
    fn tables_are_inverse_on_diatonic_notes() {
        for natural in [0usize, 2, 4, 5, 7, 9, 11] {
            for step in 0..7 {
                let semis = NOTE_DIFFERENCES[natural][step] as usize;
                assert_eq!(
                    POSITION_DIFFERENCES[natural][semis] as usize,
                    step,
                    "base {natural}, step {step}"
                );
            }
        }
    }

    #[test]
    fn treble_key_signature_positions() {
        let sharps: Vec<i32> = [Step::F, Step::C, Step::G, Step::D, Step::A, Step::E, Step::B]
            .iter()
            .map(|&s| Clef::TREBLE.position_for_step(s, true))
            .collect();
        assert_eq!(sharps, vec![8, 5, 9, 6, 3, 7, 4]);

        let flats: Vec<i32> = [Step::B, Step::E, Step::A, Step::D, Step::G, Step::C, Step::F]
            .iter()
            .map(|&s| Clef::TREBLE.position_for_step(s, false))
            .collect();
        assert_eq!(flats, vec![4, 7, 3, 6, 2, 5, 1]);
    }

    #[test]
    fn bass_key_signature_positions() {
        let sharps: Vec<i32> = [Step::F, Step::C, Step::G, Step::D, Step::A, Step::E, Step::B]
            .iter()
            .map(|&s| Clef::BASS.position_for_step(s, true))
            .collect();
        assert_eq!(sharps, vec![6, 3, 7, 4, 1, 5, 2]);

        let flats: Vec<i32> = [Step::B, Step::E, Step::A, Step::D, Step::G, Step::C, Step::F]
            .iter()
            .map(|&s| Clef::BASS.position_for_step(s, false))
            .collect();
        assert_eq!(flats, vec![2, 5, 1, 4, 0, 3, 6]);
    }

    #[test]
    fn position_for_pitch_matches_position_for_note() {
        let g4 = Pitch::new(4, Step::G, 0);
        assert_eq!(Clef::TREBLE.position_for_pitch(&g4), 2);
        let c4 = Pitch::new(4, Step::C, 0);
        assert_eq!(Clef::TREBLE.position_for_pitch(&c4), -2);
        assert_eq!(Clef::BASS.position_for_pitch(&c4), 10);
        // spelling decides the line: C#4 stays on C's line, Db4 on D's
        assert_eq!(Clef::TREBLE.position_for_pitch(&Pitch::new(4, Step::C, 1)), -2);
        assert_eq!(Clef::TREBLE.position_for_pitch(&Pitch::new(4, Step::D, -1)), -1);
    }

    #[test]
    fn choose_clef_by_range() {
        // Low range: bass covers it, treble does not
        assert_eq!(choose_clef(40, 55).name, "Bass");
        // High range: treble
        assert_eq!(choose_clef(64, 77).name, "Treble");
        // Range off both staves entirely: treble wins the tie
        assert_eq!(choose_clef(100, 120).name, "Treble");
    }
}
