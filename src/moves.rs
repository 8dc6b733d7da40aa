//! Move strings and their application to game states.
//!
//! A move is a `;`-separated sequence of commands: `S` stamps the state as
//! solver-assisted, `Lx,y` toggles a light and `Ix,y` toggles an impossible
//! mark. Moves are applied to a copy of the state; a malformed or illegal
//! move is rejected wholesale and the input state is left untouched.

use crate::grid::{CellFlags, GameState};
use crate::solver;

/// Overall state of play, as reported to frontends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Solved,
    Unsolvable,
}

impl GameStatus {
    /// The conventional numeric encoding: 0 in progress, +1 solved, -1
    /// unsolvable.
    pub fn code(self) -> i8 {
        match self {
            GameStatus::InProgress => 0,
            GameStatus::Solved => 1,
            GameStatus::Unsolvable => -1,
        }
    }
}

/// Applies a move string to a state, producing the successor state, or `None`
/// if any command is malformed, addresses a cell outside the grid or a black
/// cell, toggles a light on a cell marked impossible, or marks a cell that
/// holds a light.
pub fn execute_move(state: &GameState, move_str: &str) -> Option<GameState> {
    if move_str.is_empty() {
        return None;
    }

    let mut ret = state.clone();
    for cmd in move_str.split(';') {
        let mut chars = cmd.chars();
        match chars.next() {
            Some('S') => {
                if chars.next().is_some() {
                    return None;
                }
                ret.latch_used_solve();
            }
            Some(c @ ('L' | 'I')) => {
                let (xs, ys) = chars.as_str().split_once(',')?;
                let x: usize = xs.parse().ok()?;
                let y: usize = ys.parse().ok()?;
                if x >= ret.width() || y >= ret.height() {
                    return None;
                }
                let flags = ret.flags(x, y);
                if flags.contains(CellFlags::BLACK) {
                    return None;
                }
                if c == 'L' {
                    if flags.contains(CellFlags::IMPOSSIBLE) {
                        return None;
                    }
                    ret.set_light(x, y, !flags.contains(CellFlags::LIGHT));
                } else {
                    if flags.contains(CellFlags::LIGHT) {
                        return None;
                    }
                    if flags.contains(CellFlags::IMPOSSIBLE) {
                        ret.remove_flags(x, y, CellFlags::IMPOSSIBLE);
                    } else {
                        ret.add_flags(x, y, CellFlags::IMPOSSIBLE);
                    }
                }
            }
            _ => return None,
        }
    }

    if ret.is_correct() {
        ret.latch_completed();
    }
    Some(ret)
}

/// Produces the move string that takes `current` to a solved position: an `S`
/// stamp followed by one `L` or `I` command per differing cell.
///
/// Solving is attempted from the player's current position first, since for a
/// non-unique puzzle that may give a different (nearer) answer; if the
/// current position is inconsistent the original puzzle is solved instead.
pub fn solve_game(original: &GameState, current: &GameState) -> Result<String, String> {
    let mut depth = 0;

    let mut solved = current.clone();
    if solver::solve(&mut solved, true, false, &mut depth) <= 0 {
        solved = original.clone();
        if solver::solve(&mut solved, true, false, &mut depth) <= 0 {
            return Err("Puzzle is not self-consistent.".to_string());
        }
    }

    let mut move_str = String::from("S");
    for x in 0..current.width() {
        for y in 0..current.height() {
            let old = current.flags(x, y);
            let new = solved.flags(x, y);
            if (old & CellFlags::LIGHT) != (new & CellFlags::LIGHT) {
                move_str.push_str(&format!(";L{x},{y}"));
            } else if (old & CellFlags::IMPOSSIBLE) != (new & CellFlags::IMPOSSIBLE) {
                move_str.push_str(&format!(";I{x},{y}"));
            }
        }
    }
    Ok(move_str)
}

/// Reports whether the game is still open, solved, or in a position the
/// player will have to back out of: overlapping lights, or a clue with more
/// neighbouring lights than its number.
pub fn status(state: &GameState) -> GameStatus {
    if state.completed() || state.is_correct() {
        return GameStatus::Solved;
    }
    if state.overlap() {
        return GameStatus::Unsolvable;
    }
    for x in 0..state.width() {
        for y in 0..state.height() {
            if !state.flags(x, y).contains(CellFlags::NUMBERED) {
                continue;
            }
            let placed = state
                .surrounds(x, y)
                .iter()
                .filter(|&(sx, sy)| state.flags(sx, sy).contains(CellFlags::LIGHT))
                .count() as i32;
            if placed > state.clue(x, y) {
                return GameStatus::Unsolvable;
            }
        }
    }
    GameStatus::InProgress
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desc::new_state;
    use crate::params::GameParams;
    use crate::solver::try_solve_number;

    fn params(w: usize, h: usize) -> GameParams {
        GameParams {
            w,
            h,
            ..GameParams::default()
        }
    }

    fn state(w: usize, h: usize, desc: &str) -> GameState {
        new_state(&params(w, h), desc).expect("valid descriptor")
    }

    #[test]
    fn light_commands_toggle() {
        let s = state(3, 3, "i");

        let s = execute_move(&s, "L1,1").unwrap();
        assert!(s.flags(1, 1).contains(CellFlags::LIGHT));
        assert_eq!(s.lit_count(0, 1), 1);

        let s = execute_move(&s, "L1,1").unwrap();
        assert!(!s.flags(1, 1).contains(CellFlags::LIGHT));
        assert_eq!(s.lit_count(0, 1), 0);
        assert_eq!(s.light_count(), 0);
    }

    #[test]
    fn impossible_commands_toggle() {
        let s = state(3, 3, "i");

        let s = execute_move(&s, "I0,0").unwrap();
        assert!(s.flags(0, 0).contains(CellFlags::IMPOSSIBLE));
        let s = execute_move(&s, "I0,0").unwrap();
        assert!(!s.flags(0, 0).contains(CellFlags::IMPOSSIBLE));
    }

    #[test]
    fn moves_on_black_cells_are_rejected() {
        let s = state(3, 3, "d4d");
        assert!(execute_move(&s, "L1,1").is_none());
        assert!(execute_move(&s, "I1,1").is_none());
    }

    #[test]
    fn malformed_moves_are_rejected() {
        let s = state(3, 3, "i");
        for mv in [
            "", "X", "L", "L1", "L1,", "L,1", "Lx,y", "L1,1;", ";L1,1", "L1,1 ", "S1", "L3,0",
            "L0,3", "L-1,0",
        ] {
            assert!(execute_move(&s, mv).is_none(), "move {mv:?}");
        }
    }

    #[test]
    fn rejected_moves_leave_the_state_untouched() {
        let s = state(3, 3, "i");
        let before = s.clone();
        assert!(execute_move(&s, "L1,1;L9,9").is_none());
        assert_eq!(s, before);
    }

    #[test]
    fn lights_are_refused_on_impossible_cells() {
        // A 0 clue makes its neighbours impossible; lighting one then fails.
        let mut s = state(3, 3, "a0af");
        let flags = s.flags(1, 0);
        let clue = s.clue(1, 0);
        assert!(try_solve_number(&mut s, 1, 0, flags, clue));
        assert!(s.flags(0, 0).contains(CellFlags::IMPOSSIBLE));

        assert!(execute_move(&s, "L0,0").is_none());
        assert!(execute_move(&s, "L0,1").is_some());
    }

    #[test]
    fn marks_are_refused_on_lights_but_not_on_lit_cells() {
        let s = state(3, 3, "i");
        let s = execute_move(&s, "L1,1").unwrap();
        assert!(execute_move(&s, "I1,1").is_none());
        // (1, 0) is lit from (1, 1) but holds no light.
        assert!(execute_move(&s, "I1,0").is_some());
    }

    #[test]
    fn solver_stamp_latches() {
        let s = state(3, 3, "i");
        assert!(!s.used_solve());
        let s = execute_move(&s, "S").unwrap();
        assert!(s.used_solve());
        let s = execute_move(&s, "L0,0").unwrap();
        assert!(s.used_solve());
    }

    #[test]
    fn completion_latches_and_survives_later_moves() {
        let s = state(3, 3, "d4d");
        let s = execute_move(&s, "L1,0;L0,1;L2,1;L1,2").unwrap();
        assert!(s.completed());
        assert_eq!(status(&s), GameStatus::Solved);

        // Spoil the position; the latch stays set.
        let s = execute_move(&s, "L0,0").unwrap();
        assert!(!s.is_correct());
        assert!(s.completed());
    }

    #[test]
    fn status_reflects_the_position() {
        let s = state(3, 3, "d4d");
        assert_eq!(status(&s), GameStatus::InProgress);
        assert_eq!(status(&s).code(), 0);

        // Two lights in one row see each other.
        let open = state(3, 3, "i");
        let overlapping = execute_move(&open, "L0,0;L2,0").unwrap();
        assert_eq!(status(&overlapping), GameStatus::Unsolvable);
        assert_eq!(status(&overlapping).code(), -1);

        // A light next to a 0 clue cannot be right.
        let zero = state(3, 3, "a0af");
        let oversatisfied = execute_move(&zero, "L0,0").unwrap();
        assert_eq!(status(&oversatisfied), GameStatus::Unsolvable);
    }

    #[test]
    fn solve_move_completes_a_fresh_puzzle() {
        let s = state(3, 3, "d4d");
        let mv = solve_game(&s, &s).unwrap();
        assert!(mv.starts_with('S'));

        let solved = execute_move(&s, &mv).unwrap();
        assert!(solved.completed());
        assert!(solved.used_solve());
    }

    #[test]
    fn solve_move_repairs_a_spoiled_position() {
        let fresh = state(3, 3, "d4d");
        // An overlapping pair the solver cannot continue from.
        let current = execute_move(&fresh, "L0,0;L2,0").unwrap();

        let mv = solve_game(&fresh, &current).unwrap();
        let solved = execute_move(&current, &mv).unwrap();
        assert!(solved.completed());
    }

    #[test]
    fn solve_move_matches_a_direct_solve_of_a_generated_puzzle() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut rng = StdRng::seed_from_u64(0x5EED);
        let (_, preset) = crate::params::fetch_preset(0).unwrap();
        let (desc, used_params) = crate::generate::new_description(&preset, &mut rng);

        let fresh = new_state(&used_params, &desc).unwrap();
        let mv = solve_game(&fresh, &fresh).unwrap();
        let via_move = execute_move(&fresh, &mv).unwrap();
        assert!(via_move.completed());

        let mut direct = fresh.clone();
        let mut depth = 0;
        assert!(crate::solver::solve(&mut direct, true, false, &mut depth) > 0);
        for x in 0..fresh.width() {
            for y in 0..fresh.height() {
                let wanted = direct.flags(x, y) & (CellFlags::LIGHT | CellFlags::IMPOSSIBLE);
                let got = via_move.flags(x, y) & (CellFlags::LIGHT | CellFlags::IMPOSSIBLE);
                assert_eq!(got, wanted, "cell ({x},{y})");
            }
        }
    }

    #[test]
    fn solve_move_fails_on_contradictory_puzzles() {
        // A 4 clue on a 2x2 board is unsatisfiable.
        let s = state(2, 2, "04b");
        let err = solve_game(&s, &s).unwrap_err();
        assert_eq!(err, "Puzzle is not self-consistent.");
    }
}
