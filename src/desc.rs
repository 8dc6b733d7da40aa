//! Puzzle descriptor codec.
//!
//! A descriptor is a row-major walk of the board with one character per black
//! cell and run-length-encoded white cells: `'0'..'4'` is a numbered black
//! cell, `'B'` a plain black cell, and `'a'..'z'` a run of 1 to 26 white
//! cells. There are no delimiters.

use crate::grid::{CellFlags, GameState};
use crate::params::GameParams;

fn run_letter(run: usize) -> char {
    debug_assert!((1..=26).contains(&run));
    (b'a' - 1 + run as u8) as char
}

/// Encodes the black squares and clues of a board as a descriptor string.
/// Lights and marks are not part of the encoding.
pub fn encode_description(state: &GameState) -> String {
    let mut out = String::new();
    let mut run = 0;
    for y in 0..state.height() {
        for x in 0..state.width() {
            let f = state.flags(x, y);
            if f.contains(CellFlags::BLACK) {
                if run > 0 {
                    out.push(run_letter(run));
                    run = 0;
                }
                if f.contains(CellFlags::NUMBERED) {
                    out.push((b'0' + state.clue(x, y) as u8) as char);
                } else {
                    out.push('B');
                }
            } else {
                if run == 26 {
                    out.push(run_letter(run));
                    run = 0;
                }
                run += 1;
            }
        }
    }
    if run > 0 {
        out.push(run_letter(run));
    }
    out
}

/// Checks that a descriptor addresses exactly `w * h` cells using only the
/// characters of the grammar.
pub fn validate_description(params: &GameParams, desc: &str) -> Result<(), String> {
    let area = params.w * params.h;
    let mut chars = desc.chars();
    let mut i = 0;
    while i < area {
        match chars.next() {
            Some('0'..='4') | Some('B') => {}
            Some(c @ 'a'..='z') => i += c as usize - 'a' as usize,
            None => return Err("Game description shorter than expected".to_string()),
            Some(_) => {
                return Err("Game description contained unexpected character".to_string())
            }
        }
        i += 1;
    }
    if chars.next().is_some() || i > area {
        return Err("Game description longer than expected".to_string());
    }
    Ok(())
}

/// Builds a fresh state from a descriptor: black cells and clues set, no
/// lights, no marks. The descriptor is validated first.
pub fn new_state(params: &GameParams, desc: &str) -> Result<GameState, String> {
    validate_description(params, desc)?;

    let mut state = GameState::new(params);
    let mut chars = desc.chars();
    let mut run = 0;
    for i in 0..params.w * params.h {
        let x = i % params.w;
        let y = i / params.w;

        if run > 0 {
            run -= 1;
            continue;
        }
        let c = chars.next().expect("descriptor length already validated");
        match c {
            '0'..='4' => {
                state.add_flags(x, y, CellFlags::BLACK | CellFlags::NUMBERED);
                state.set_clue(x, y, c as i32 - '0' as i32);
            }
            'B' => state.add_flags(x, y, CellFlags::BLACK),
            'a'..='z' => run = c as usize - 'a' as usize,
            _ => unreachable!("descriptor already validated"),
        }
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::GameParams;

    fn params(w: usize, h: usize) -> GameParams {
        GameParams {
            w,
            h,
            ..GameParams::default()
        }
    }

    #[test]
    fn decode_sets_blacks_and_clues_only() {
        let state = new_state(&params(3, 3), "a1aBaBc").unwrap();

        assert!(state.flags(1, 0).contains(CellFlags::BLACK | CellFlags::NUMBERED));
        assert_eq!(state.clue(1, 0), 1);
        assert!(state.flags(0, 1).contains(CellFlags::BLACK));
        assert!(!state.flags(0, 1).contains(CellFlags::NUMBERED));
        assert!(state.flags(2, 1).contains(CellFlags::BLACK));

        for &(x, y) in &[(0, 0), (2, 0), (1, 1), (0, 2), (1, 2), (2, 2)] {
            assert_eq!(state.flags(x, y), CellFlags::empty(), "cell ({x},{y})");
            assert_eq!(state.lit_count(x, y), 0);
        }
        assert_eq!(state.light_count(), 0);
        assert!(!state.completed());
    }

    #[test]
    fn encode_round_trips() {
        for desc in ["a1aBaBc", "aBaBaBaBa", "d4d", "i", "B0Ba2d"] {
            let state = new_state(&params(3, 3), desc).unwrap();
            assert_eq!(encode_description(&state), desc);
        }
    }

    #[test]
    fn long_white_runs_split_at_twenty_six() {
        let p = params(6, 6);
        let state = new_state(&p, "zj").unwrap();
        assert_eq!(state.light_count(), 0);
        assert_eq!(encode_description(&state), "zj");
    }

    #[test]
    fn validate_rejects_short_descriptors() {
        let err = validate_description(&params(3, 3), "aB").unwrap_err();
        assert_eq!(err, "Game description shorter than expected");
    }

    #[test]
    fn validate_rejects_long_descriptors() {
        let err = validate_description(&params(3, 3), "iB").unwrap_err();
        assert_eq!(err, "Game description longer than expected");

        // A white run that overshoots the board also counts as too long.
        let err = validate_description(&params(2, 1), "c").unwrap_err();
        assert_eq!(err, "Game description longer than expected");
    }

    #[test]
    fn validate_rejects_unexpected_characters() {
        let err = validate_description(&params(3, 3), "aB5aBaB").unwrap_err();
        assert_eq!(err, "Game description contained unexpected character");

        let err = validate_description(&params(3, 3), "aB aBaB").unwrap_err();
        assert_eq!(err, "Game description contained unexpected character");
    }
}
