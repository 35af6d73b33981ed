//! Equal-tempered pitch table, C2 to C7.
//!
//! Values are half periods in counts of the build's active timing profile
//! ([`crate::ACTIVE_PROFILE`]), rounded to the nearest count. Sharps carry
//! an `S` suffix on the letter (`CS4`), flats a `B` (`DB4`, an alias of
//! `CS4`).

use crate::ACTIVE_PROFILE;

/// Rest.
pub const REST: u16 = 0;

macro_rules! pitches {
    ($($name:ident = $millihertz:literal, $hz:literal;)*) => {
        $(
            #[doc = concat!("`", stringify!($name), "`, ", $hz, " Hz")]
            pub const $name: u16 = ACTIVE_PROFILE.pitch_for_millihertz($millihertz);
        )*

        /// Every tabulated pitch, lowest first.
        pub const ALL: &[u16] = &[$($name),*];
    };
}

macro_rules! flats {
    ($($flat:ident = $sharp:ident;)*) => {
        $(
            #[doc = concat!("`", stringify!($flat), "`, same key as [`", stringify!($sharp), "`]")]
            pub const $flat: u16 = $sharp;
        )*
    };
}

pitches! {
    C2 = 65_406, "65.406";
    CS2 = 69_296, "69.296";
    D2 = 73_416, "73.416";
    DS2 = 77_782, "77.782";
    E2 = 82_407, "82.407";
    F2 = 87_307, "87.307";
    FS2 = 92_499, "92.499";
    G2 = 97_999, "97.999";
    GS2 = 103_826, "103.826";
    A2 = 110_000, "110.000";
    AS2 = 116_541, "116.541";
    B2 = 123_471, "123.471";
    C3 = 130_813, "130.813";
    CS3 = 138_591, "138.591";
    D3 = 146_832, "146.832";
    DS3 = 155_563, "155.563";
    E3 = 164_814, "164.814";
    F3 = 174_614, "174.614";
    FS3 = 184_997, "184.997";
    G3 = 195_998, "195.998";
    GS3 = 207_652, "207.652";
    A3 = 220_000, "220.000";
    AS3 = 233_082, "233.082";
    B3 = 246_942, "246.942";
    C4 = 261_626, "261.626";
    CS4 = 277_183, "277.183";
    D4 = 293_665, "293.665";
    DS4 = 311_127, "311.127";
    E4 = 329_628, "329.628";
    F4 = 349_228, "349.228";
    FS4 = 369_994, "369.994";
    G4 = 391_995, "391.995";
    GS4 = 415_305, "415.305";
    A4 = 440_000, "440.000";
    AS4 = 466_164, "466.164";
    B4 = 493_883, "493.883";
    C5 = 523_251, "523.251";
    CS5 = 554_365, "554.365";
    D5 = 587_330, "587.330";
    DS5 = 622_254, "622.254";
    E5 = 659_255, "659.255";
    F5 = 698_456, "698.456";
    FS5 = 739_989, "739.989";
    G5 = 783_991, "783.991";
    GS5 = 830_609, "830.609";
    A5 = 880_000, "880.000";
    AS5 = 932_328, "932.328";
    B5 = 987_767, "987.767";
    C6 = 1_046_502, "1046.502";
    CS6 = 1_108_731, "1108.731";
    D6 = 1_174_659, "1174.659";
    DS6 = 1_244_508, "1244.508";
    E6 = 1_318_510, "1318.510";
    F6 = 1_396_913, "1396.913";
    FS6 = 1_479_978, "1479.978";
    G6 = 1_567_982, "1567.982";
    GS6 = 1_661_219, "1661.219";
    A6 = 1_760_000, "1760.000";
    AS6 = 1_864_655, "1864.655";
    B6 = 1_975_533, "1975.533";
    C7 = 2_093_005, "2093.005";
}

flats! {
    DB2 = CS2;
    EB2 = DS2;
    GB2 = FS2;
    AB2 = GS2;
    BB2 = AS2;
    DB3 = CS3;
    EB3 = DS3;
    GB3 = FS3;
    AB3 = GS3;
    BB3 = AS3;
    DB4 = CS4;
    EB4 = DS4;
    GB4 = FS4;
    AB4 = GS4;
    BB4 = AS4;
    DB5 = CS5;
    EB5 = DS5;
    GB5 = FS5;
    AB5 = GS5;
    BB5 = AS5;
    DB6 = CS6;
    EB6 = DS6;
    GB6 = FS6;
    AB6 = GS6;
    BB6 = AS6;
}

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)] // windows(2) yields pairs
mod tests {
    use super::*;

    #[test]
    fn table_descends_in_half_period() {
        assert_eq!(ALL.len(), 61);
        for pair in ALL.windows(2) {
            assert!(pair[0] > pair[1], "{} should be longer than {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn octaves_halve_the_half_period() {
        for (low, high) in [(C3, C4), (A3, A4), (C5, C6), (C6, C7)] {
            let doubled = u32::from(high) * 2;
            assert!(
                u32::from(low).abs_diff(doubled) <= 2,
                "{low} is not an octave below {high}"
            );
        }
    }

    #[test]
    fn flats_alias_sharps() {
        assert_eq!(DB4, CS4);
        assert_eq!(BB5, AS5);
        assert_ne!(REST, C7);
    }
}
