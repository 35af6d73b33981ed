//! Feedback tunes.

use melody::{duration, pitch, Note};

/// Tempo of [`STARTUP`].
pub const STARTUP_TEMPO: u16 = 155;

/// Tempo of the switch feedback tunes.
pub const CLICK_TEMPO: u16 = 180;

/// Played once the clocks are up.
pub static STARTUP: [Note; 2] = [
    Note::new(pitch::F6, duration::SIXTEENTH),
    Note::new(pitch::F5, duration::SIXTEENTH),
];

/// Short click acknowledged.
pub static ACK: [Note; 1] = [Note::new(pitch::C6, duration::SIXTEENTH)];

/// Click-and-hold acknowledged.
pub static HOLD: [Note; 2] = [
    Note::new(pitch::C6, duration::SIXTEENTH),
    Note::new(pitch::C5, duration::SIXTEENTH),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jingles_have_no_rests() {
        for note in STARTUP.iter().chain(&ACK).chain(&HOLD) {
            assert!(!note.is_rest());
        }
    }

    #[test]
    fn startup_falls_an_octave() {
        let [high, low] = STARTUP;
        assert!(low.pitch > high.pitch, "lower note has the longer half period");
    }
}
