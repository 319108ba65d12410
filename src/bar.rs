//! Pure layout decisions for one bar of notes: grouping simultaneous
//! notes into chords, tracking accidentals across the bar, and filling
//! gaps with rests.
//!
//! Nothing here measures or draws; the output is staff positions,
//! glyph identifiers, and tick spans for the renderer to place. Time
//! is in ticks with [`TICKS_PER_BEAT`] per quarter-note beat, starts
//! relative to the bar.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::clef::Clef;
use crate::glyph::Glyph;
use crate::key_signature::KeySignature;
use crate::pitch::Accidental;

/// Ticks per quarter-note beat.
pub const TICKS_PER_BEAT: u32 = 480;

/// Onsets and durations are rounded to this grid (a 32nd note).
const GRID: u32 = TICKS_PER_BEAT / 8;

/// Shortest duration a note renders as (a 16th note).
const MIN_DURATION: u32 = TICKS_PER_BEAT / 4;

/// One input note, bar-relative, as it comes out of the MIDI model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarNote {
    pub start: u32,
    pub duration: u32,
    pub note: u8,
    pub tie_from_prev: bool,
    pub tie_to_next: bool,
}

impl BarNote {
    pub fn new(start: u32, duration: u32, note: u8) -> BarNote {
        BarNote {
            start,
            duration,
            note,
            tie_from_prev: false,
            tie_to_next: false,
        }
    }
}

/// A note placed on the staff: its position and the accidental glyph
/// actually drawn after within-bar suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedNote {
    pub position: i32,
    pub accidental: Accidental,
    pub tie_from_prev: bool,
    pub tie_to_next: bool,
}

/// Notes sharing an onset and duration, sorted by ascending staff
/// position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chord {
    pub start: u32,
    pub duration: u32,
    pub notes: Vec<PlacedNote>,
}

/// A rest filling a gap between chords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rest {
    pub glyph: Glyph,
    pub start: u32,
    pub duration: u32,
    /// Staff line the rest glyph hangs from.
    pub line: i32,
}

/// One element of a laid-out bar, in onset order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarEvent {
    Chord(Chord),
    Rest(Rest),
}

/// Notehead shape for a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteShape {
    pub notehead: Glyph,
    pub duration: u32,
    pub uses_stem: bool,
    pub flag_count: u8,
}

static NOTE_SHAPES: [NoteShape; 9] = [
    NoteShape {
        notehead: Glyph::NoteheadDoubleWhole,
        duration: 8 * TICKS_PER_BEAT,
        uses_stem: false,
        flag_count: 0,
    },
    NoteShape {
        notehead: Glyph::NoteheadWhole,
        duration: 4 * TICKS_PER_BEAT,
        uses_stem: false,
        flag_count: 0,
    },
    NoteShape {
        notehead: Glyph::NoteheadHalf,
        duration: 2 * TICKS_PER_BEAT,
        uses_stem: true,
        flag_count: 0,
    },
    NoteShape {
        notehead: Glyph::NoteheadBlack,
        duration: TICKS_PER_BEAT,
        uses_stem: true,
        flag_count: 0,
    },
    NoteShape {
        notehead: Glyph::NoteheadBlack,
        duration: TICKS_PER_BEAT / 2,
        uses_stem: true,
        flag_count: 1,
    },
    NoteShape {
        notehead: Glyph::NoteheadBlack,
        duration: TICKS_PER_BEAT / 4,
        uses_stem: true,
        flag_count: 2,
    },
    NoteShape {
        notehead: Glyph::NoteheadBlack,
        duration: TICKS_PER_BEAT / 8,
        uses_stem: true,
        flag_count: 3,
    },
    NoteShape {
        notehead: Glyph::NoteheadBlack,
        duration: TICKS_PER_BEAT / 16,
        uses_stem: true,
        flag_count: 4,
    },
    NoteShape {
        notehead: Glyph::NoteheadBlack,
        duration: TICKS_PER_BEAT / 32,
        uses_stem: true,
        flag_count: 5,
    },
];

/// Rest glyphs in descending duration, with the staff line each hangs
/// from (the whole rest hangs from the fourth line, the rest sit on
/// the middle one).
static REST_SHAPES: [(Glyph, u32, i32); 8] = [
    (Glyph::RestWhole, 4 * TICKS_PER_BEAT, 3),
    (Glyph::RestHalf, 2 * TICKS_PER_BEAT, 2),
    (Glyph::RestQuarter, TICKS_PER_BEAT, 2),
    (Glyph::Rest8th, TICKS_PER_BEAT / 2, 2),
    (Glyph::Rest16th, TICKS_PER_BEAT / 4, 2),
    (Glyph::Rest32nd, TICKS_PER_BEAT / 8, 2),
    (Glyph::Rest64th, TICKS_PER_BEAT / 16, 2),
    (Glyph::Rest128th, TICKS_PER_BEAT / 32, 2),
];

/// The largest shape not longer than `duration` (the 128th shape for
/// anything shorter).
pub fn shape_for_duration(duration: u32) -> &'static NoteShape {
    NOTE_SHAPES
        .iter()
        .find(|s| s.duration <= duration)
        .unwrap_or(&NOTE_SHAPES[NOTE_SHAPES.len() - 1])
}

fn round_to_grid(ticks: u32) -> u32 {
    (ticks + GRID / 2) / GRID * GRID
}

/// Lay out one bar: place every note on the staff, group simultaneous
/// notes into chords, and fill the gaps (and the tail up to `bar_len`)
/// with rests. An empty bar yields a single whole rest.
///
/// `notes` must be sorted by `start`. Onsets and durations are rounded
/// to a 32nd-note grid, with a 16th-note minimum duration.
pub fn layout_bar(
    notes: &[BarNote],
    clef: &Clef,
    key_signature: &KeySignature,
    bar_len: u32,
) -> Vec<BarEvent> {
    if notes.is_empty() {
        return vec![BarEvent::Rest(Rest {
            glyph: Glyph::RestWhole,
            start: 0,
            duration: bar_len,
            line: 3,
        })];
    }

    // Accidental memory per staff position; the bar starts with none
    // drawn, i.e. the key signature alone in effect.
    let mut accidentals: HashMap<i32, Accidental> = HashMap::new();
    let mut chords: Vec<Chord> = Vec::new();

    for bar_note in notes {
        let to_render = key_signature.note_and_accidentals_to_render(bar_note.note);
        let position = clef.position_for_note(to_render.note);

        let last_drawn = accidentals.entry(position).or_insert(Accidental::None);
        let mut drawn = Accidental::None;
        if *last_drawn != to_render.accidental {
            *last_drawn = to_render.accidental;
            if to_render.accidental == Accidental::None {
                // Back to the key signature's default after an
                // explicit accidental: restate the key's own sign for
                // this letter, or a natural when the key leaves it
                // unaltered.
                let step = key_signature.pitch_from_midi_note(bar_note.note).step();
                drawn = Accidental::from_alter(
                    key_signature.alter_for_step(step),
                    Accidental::Natural,
                );
            } else {
                drawn = to_render.accidental;
            }
        }

        let placed = PlacedNote {
            position,
            accidental: drawn,
            tie_from_prev: bar_note.tie_from_prev,
            tie_to_next: bar_note.tie_to_next,
        };

        let start = round_to_grid(bar_note.start);
        let duration = round_to_grid(bar_note.duration).max(MIN_DURATION);
        match chords.last_mut() {
            Some(last) if last.start == start && last.duration == duration => {
                last.notes.push(placed);
            }
            _ => chords.push(Chord {
                start,
                duration,
                notes: vec![placed],
            }),
        }
    }

    for chord in &mut chords {
        chord.notes.sort_by_key(|n| n.position);
    }

    let mut events = Vec::new();
    let mut last_end = 0;
    for chord in chords {
        if chord.start > last_end {
            push_rests(&mut events, last_end, chord.start - last_end);
        }
        last_end = chord.start + chord.duration;
        events.push(BarEvent::Chord(chord));
    }
    if bar_len > last_end {
        push_rests(&mut events, last_end, bar_len - last_end);
    }
    events
}

/// Greedily cover a gap with rests, longest shapes first.
fn push_rests(events: &mut Vec<BarEvent>, start: u32, length: u32) {
    let mut start = start;
    let mut remaining = length;
    for &(glyph, ticks, line) in &REST_SHAPES {
        while remaining >= ticks {
            events.push(BarEvent::Rest(Rest {
                glyph,
                start,
                duration: ticks,
                line,
            }));
            start += ticks;
            remaining -= ticks;
        }
    }
}

/// Serialize a laid-out bar to JSON, for handing across the FFI
/// boundary.
pub fn bar_layout_to_json(events: &[BarEvent]) -> Result<String, String> {
    serde_json::to_string(events).map_err(|e| format!("JSON serialization error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::Scale;

    fn quarter(start_beats: u32, note: u8) -> BarNote {
        BarNote::new(start_beats * TICKS_PER_BEAT, TICKS_PER_BEAT, note)
    }

    #[test]
    fn shape_selection() {
        assert_eq!(
            shape_for_duration(4 * TICKS_PER_BEAT).notehead,
            Glyph::NoteheadWhole
        );
        let half = shape_for_duration(3 * TICKS_PER_BEAT);
        assert_eq!(half.notehead, Glyph::NoteheadHalf);
        assert!(half.uses_stem);
        let eighth = shape_for_duration(TICKS_PER_BEAT / 2);
        assert_eq!(eighth.notehead, Glyph::NoteheadBlack);
        assert_eq!(eighth.flag_count, 1);
        // shorter than any shape: falls back to the 128th
        assert_eq!(shape_for_duration(1).flag_count, 5);
    }

    #[test]
    fn empty_bar_is_a_whole_rest() {
        let key = KeySignature::default();
        let events = layout_bar(&[], &Clef::TREBLE, &key, 4 * TICKS_PER_BEAT);
        assert_eq!(events.len(), 1);
        match &events[0] {
            BarEvent::Rest(r) => {
                assert_eq!(r.glyph, Glyph::RestWhole);
                assert_eq!(r.line, 3);
                assert_eq!(r.duration, 4 * TICKS_PER_BEAT);
            }
            other => panic!("expected rest, got {other:?}"),
        }
    }

    #[test]
    fn simultaneous_notes_merge_into_a_chord() {
        let key = KeySignature::default();
        let notes = [quarter(0, 60), quarter(0, 64), quarter(0, 67)];
        let events = layout_bar(&notes, &Clef::TREBLE, &key, 4 * TICKS_PER_BEAT);

        let chord = match &events[0] {
            BarEvent::Chord(c) => c,
            other => panic!("expected chord, got {other:?}"),
        };
        assert_eq!(chord.notes.len(), 3);
        // sorted by ascending staff position: C4, E4, G4
        assert_eq!(
            chord.notes.iter().map(|n| n.position).collect::<Vec<_>>(),
            vec![-2, 0, 2]
        );
    }

    #[test]
    fn offset_notes_stay_separate() {
        let key = KeySignature::default();
        let notes = [quarter(0, 60), quarter(1, 64)];
        let events = layout_bar(&notes, &Clef::TREBLE, &key, 2 * TICKS_PER_BEAT);
        let chords = events
            .iter()
            .filter(|e| matches!(e, BarEvent::Chord(_)))
            .count();
        assert_eq!(chords, 2);
    }

    #[test]
    fn gaps_fill_with_rests_longest_first() {
        let key = KeySignature::default();
        // one quarter note on beat 3 of a 4/4 bar
        let notes = [quarter(3, 60)];
        let events = layout_bar(&notes, &Clef::TREBLE, &key, 4 * TICKS_PER_BEAT);

        // 3 beats of leading gap: half rest then quarter rest
        let rests: Vec<&Rest> = events
            .iter()
            .filter_map(|e| match e {
                BarEvent::Rest(r) => Some(r),
                _ => None,
            })
            .collect();
        assert_eq!(rests.len(), 2);
        assert_eq!(rests[0].glyph, Glyph::RestHalf);
        assert_eq!(rests[0].start, 0);
        assert_eq!(rests[1].glyph, Glyph::RestQuarter);
        assert_eq!(rests[1].start, 2 * TICKS_PER_BEAT);
    }

    #[test]
    fn rounding_and_minimum_duration() {
        let key = KeySignature::default();
        // slightly loose playing: 7 ticks late, 30 ticks short
        let notes = [BarNote::new(7, TICKS_PER_BEAT - 30, 60)];
        let events = layout_bar(&notes, &Clef::TREBLE, &key, TICKS_PER_BEAT);
        match &events[0] {
            BarEvent::Chord(c) => {
                assert_eq!(c.start, 0);
                assert_eq!(c.duration, round_to_grid(TICKS_PER_BEAT - 30));
            }
            other => panic!("expected chord, got {other:?}"),
        }

        // a 3-tick blip still renders, stretched to a 16th
        let notes = [BarNote::new(0, 3, 60)];
        let events = layout_bar(&notes, &Clef::TREBLE, &key, TICKS_PER_BEAT);
        match &events[0] {
            BarEvent::Chord(c) => assert_eq!(c.duration, MIN_DURATION),
            other => panic!("expected chord, got {other:?}"),
        }
    }

    #[test]
    fn accidental_suppression_within_a_bar() {
        // G major; treble. F#5 is in the key, F natural contradicts it.
        let key = KeySignature::new(1, Scale::Major);
        let notes = [
            quarter(0, 78), // F#5: key covers it, no glyph
            quarter(1, 78), // F#5 again: still nothing
            quarter(2, 77), // F5: explicit natural
            quarter(3, 78), // F#5: back to the key, restate the sharp
        ];
        let events = layout_bar(&notes, &Clef::TREBLE, &key, 4 * TICKS_PER_BEAT);
        let drawn: Vec<Accidental> = events
            .iter()
            .filter_map(|e| match e {
                BarEvent::Chord(c) => Some(c.notes[0].accidental),
                _ => None,
            })
            .collect();
        assert_eq!(
            drawn,
            vec![
                Accidental::None,
                Accidental::None,
                Accidental::Natural,
                Accidental::Sharp,
            ]
        );
    }

    #[test]
    fn chromatic_note_restates_as_natural_in_c_major() {
        let key = KeySignature::default();
        let notes = [
            quarter(0, 61), // C#4: explicit sharp
            quarter(1, 61), // C#4 again: suppressed
            quarter(2, 60), // C4: the key has no sharp on C, so a natural
        ];
        let events = layout_bar(&notes, &Clef::TREBLE, &key, 4 * TICKS_PER_BEAT);
        let drawn: Vec<Accidental> = events
            .iter()
            .filter_map(|e| match e {
                BarEvent::Chord(c) => Some(c.notes[0].accidental),
                _ => None,
            })
            .collect();
        assert_eq!(
            drawn,
            vec![Accidental::Sharp, Accidental::None, Accidental::Natural]
        );
    }

    #[test]
    fn accidental_memory_is_per_position() {
        // C#4 then C#5: different staff positions, both need the sharp
        let key = KeySignature::default();
        let notes = [quarter(0, 61), quarter(1, 73)];
        let events = layout_bar(&notes, &Clef::TREBLE, &key, 2 * TICKS_PER_BEAT);
        let drawn: Vec<Accidental> = events
            .iter()
            .filter_map(|e| match e {
                BarEvent::Chord(c) => Some(c.notes[0].accidental),
                _ => None,
            })
            .collect();
        assert_eq!(drawn, vec![Accidental::Sharp, Accidental::Sharp]);
    }

    #[test]
    fn layout_serializes_to_json() {
        let key = KeySignature::default();
        let events = layout_bar(&[quarter(0, 60)], &Clef::TREBLE, &key, TICKS_PER_BEAT);
        let json = bar_layout_to_json(&events).unwrap();
        let parsed: Vec<BarEvent> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, events);
    }
}
