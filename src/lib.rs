//! engravelib — music-notation core for the score view.
//!
//! Maps raw MIDI note data onto traditional staff notation: vertical
//! staff positions under a clef, canonical pitch spellings and
//! accidental decisions under a key signature, and the bar-level
//! layout decisions (chords, rests, accidental suppression) built on
//! top of those. Pure computation throughout — drawing, fonts, and
//! event handling stay in the host's rendering layer.
//!
//! # Example
//! ```
//! use engravelib::{Accidental, Clef, KeySignature, Scale};
//!
//! let key = KeySignature::new(2, Scale::Major); // D major
//! let (position, spelling) = engravelib::note_on_staff(&Clef::TREBLE, &key, 61);
//! assert_eq!(position, -2); // C#4 shares middle C's leger line
//! assert_eq!(spelling.accidental, Accidental::None); // the key covers C#
//! ```

pub mod bar;
pub mod clef;
pub mod glyph;
pub mod key_signature;
pub mod pitch;

pub use bar::{layout_bar, BarEvent, BarNote, Chord, PlacedNote, Rest, TICKS_PER_BEAT};
pub use clef::{choose_clef, Clef};
pub use glyph::Glyph;
pub use key_signature::{KeySignature, NoteAndAccidentals};
pub use pitch::{Accidental, Pitch, Scale, Step};

/// Where a MIDI note goes on the staff and how it is spelled: the
/// staff position of its notehead under `clef` plus the rendering
/// decision from `key_signature`. One call per note is the intended
/// usage; the position is computed from the *rendered* natural note,
/// not the raw input, so sharps and flats land on the right line.
pub fn note_on_staff(
    clef: &Clef,
    key_signature: &KeySignature,
    note: u8,
) -> (i32, NoteAndAccidentals) {
    let to_render = key_signature.note_and_accidentals_to_render(note);
    (clef.position_for_note(to_render.note), to_render)
}

// ═══════════════════════════════════════════════════════════════════════
// C FFI — for the host DAW's rendering layer
// ═══════════════════════════════════════════════════════════════════════

use std::ffi::CString;
use std::os::raw::c_char;

fn clef_for_id(clef: u32) -> &'static Clef {
    match clef {
        1 => &Clef::BASS,
        _ => &Clef::TREBLE,
    }
}

/// Staff position of `note` under a clef (0 = treble, 1 = bass;
/// unknown ids fall back to treble).
#[no_mangle]
pub extern "C" fn engravelib_position_for_note(clef: u32, note: u8) -> i32 {
    clef_for_id(clef).position_for_note(note)
}

/// Rendering decision for `note` in a key, as a JSON string
/// `{"note":..,"accidental":".."}`. Returns null when `fifths` is
/// outside -7..=7. The caller must free the returned string with
/// `engravelib_free_string`.
#[no_mangle]
pub extern "C" fn engravelib_note_spelling(fifths: i32, minor: i32, note: u8) -> *mut c_char {
    let scale = if minor != 0 { Scale::Minor } else { Scale::Major };
    let key_signature = match KeySignature::try_new(fifths, scale) {
        Ok(ks) => ks,
        Err(_) => return std::ptr::null_mut(),
    };
    let to_render = key_signature.note_and_accidentals_to_render(note);
    match serde_json::to_string(&to_render) {
        Ok(json) => CString::new(json).unwrap_or_default().into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// A key signature's header data for a clef, as a JSON string: tonic
/// pitch class, sharp/flat letters, and the (staff position, glyph)
/// pairs to draw. Returns null when `fifths` is outside -7..=7. The
/// caller must free the returned string with `engravelib_free_string`.
#[no_mangle]
pub extern "C" fn engravelib_key_signature_json(
    fifths: i32,
    minor: i32,
    clef: u32,
) -> *mut c_char {
    #[derive(serde::Serialize)]
    struct KeySignatureInfo {
        base_note: u8,
        sharps: Vec<Step>,
        flats: Vec<Step>,
        layout: Vec<(i32, Glyph)>,
    }

    let scale = if minor != 0 { Scale::Minor } else { Scale::Major };
    let key_signature = match KeySignature::try_new(fifths, scale) {
        Ok(ks) => ks,
        Err(_) => return std::ptr::null_mut(),
    };
    let info = KeySignatureInfo {
        base_note: key_signature.base_note(),
        sharps: key_signature.sharps().to_vec(),
        flats: key_signature.flats().to_vec(),
        layout: key_signature.layout(clef_for_id(clef)),
    };
    match serde_json::to_string(&info) {
        Ok(json) => CString::new(json).unwrap_or_default().into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Free a string previously returned by engravelib functions.
///
/// # Safety
/// `ptr` must be a string previously returned by an engravelib
/// function, or null.
#[no_mangle]
pub unsafe extern "C" fn engravelib_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}
