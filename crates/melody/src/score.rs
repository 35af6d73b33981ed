//! Score data: notes and note lengths.
//!
//! A score is a plain `&[Note]`, usually a `static` table:
//!
//! ```
//! use melody::{duration, pitch, Note};
//!
//! static FANFARE: [Note; 3] = [
//!     Note::new(pitch::C5, duration::EIGHTH),
//!     Note::rest(duration::SIXTEENTH),
//!     Note::new(pitch::G5, duration::DOTTED_QUARTER),
//! ];
//! # let _ = &FANFARE;
//! ```

/// One entry of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Note {
    /// Half-period in profile counts (see [`crate::pitch`]); 0 is a rest.
    pub pitch: u16,
    /// Length in sixteenth notes (see [`duration`]).
    pub duration: u16,
}

impl Note {
    /// A sounding note.
    pub const fn new(pitch: u16, duration: u16) -> Self {
        Self { pitch, duration }
    }

    /// A rest of `duration` sixteenths.
    pub const fn rest(duration: u16) -> Self {
        Self::new(0, duration)
    }

    /// `true` for a rest.
    pub const fn is_rest(self) -> bool {
        self.pitch == 0
    }
}

/// Note lengths in sixteenth-note units.
pub mod duration {
    /// Sixteenth note.
    pub const SIXTEENTH: u16 = 1;
    /// Eighth note.
    pub const EIGHTH: u16 = 2;
    /// Dotted eighth note.
    pub const DOTTED_EIGHTH: u16 = 3;
    /// Quarter note (one beat).
    pub const QUARTER: u16 = 4;
    /// Dotted quarter note.
    pub const DOTTED_QUARTER: u16 = 6;
    /// Half note.
    pub const HALF: u16 = 8;
    /// Dotted half note.
    pub const DOTTED_HALF: u16 = 12;
    /// Whole note.
    pub const WHOLE: u16 = 16;
}
