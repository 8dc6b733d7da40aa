//! Deductive solver.
//!
//! The solver fills in a (possibly partially placed) board as far as it can
//! and reports how many completions exist. Two propagation rules run to a
//! fixed point; when neither fires the solver picks a branching cell and
//! explores both alternatives on a duplicated state, bounded by a recursion
//! budget.

use crate::grid::{CellFlags, GameState};

/// Maximum branching depth when guessing is allowed.
pub const MAX_RECURSE: usize = 5;

/// Fills in the board as far as it can, returning the number of completions
/// found: `0` for none, a positive count when at least one exists (the state
/// is then left in a solved configuration), or `-1` when the recursion budget
/// ran out before the question could be settled.
///
/// With `require_unique` set the solver explores both branches at every guess
/// so the returned count distinguishes one solution from several; otherwise
/// it returns as soon as any solution is found. `max_depth` is reset and then
/// records the deepest branching level actually reached.
pub fn solve(
    state: &mut GameState,
    allow_guessing: bool,
    require_unique: bool,
    max_depth: &mut usize,
) -> i32 {
    *max_depth = 0;
    for x in 0..state.width() {
        for y in 0..state.height() {
            state.remove_flags(x, y, CellFlags::NUMBER_USED);
        }
    }
    let max_recurse = if allow_guessing { MAX_RECURSE } else { 0 };
    solve_sub(state, require_unique, max_recurse, 0, max_depth)
}

/// True if a light could legally be placed on the cell right now: white, not
/// marked impossible, and not already lit (a light on a lit cell would always
/// overlap with whatever lights it).
fn could_place_light(flags: CellFlags, lit: i32) -> bool {
    if flags.intersects(CellFlags::BLACK | CellFlags::IMPOSSIBLE) {
        return false;
    }
    lit == 0
}

/// The unlit-cell rule: if exactly one position could still place a light
/// that illuminates `(ox, oy)`, the light must go there.
pub(crate) fn try_solve_light(
    state: &mut GameState,
    ox: usize,
    oy: usize,
    flags: CellFlags,
    lit: i32,
) -> bool {
    if lit > 0 || flags.contains(CellFlags::BLACK) {
        return false;
    }

    // The squares that could light us are the same squares we would light.
    let mut candidate = None;
    let mut n = 0;
    for (lx, ly) in state.light_line(ox, oy, true).cells() {
        if state.flags(lx, ly).contains(CellFlags::IMPOSSIBLE) {
            continue;
        }
        if state.lit_count(lx, ly) > 0 {
            continue;
        }
        candidate = Some((lx, ly));
        n += 1;
    }
    if n == 1 {
        let (sx, sy) = candidate.expect("a single candidate was counted");
        log::trace!("({ox},{oy}) can only be lit from ({sx},{sy}); placing a light");
        state.set_light(sx, sy, true);
        return true;
    }
    false
}

/// The number rule: when a clue's remaining neighbours are exactly pinned
/// down, either forbid them all (clue already satisfied) or fill them all
/// (every remaining candidate is needed).
pub(crate) fn try_solve_number(
    state: &mut GameState,
    nx: usize,
    ny: usize,
    nflags: CellFlags,
    clue: i32,
) -> bool {
    if !nflags.contains(CellFlags::NUMBERED) {
        return false;
    }

    let s = state.surrounds(nx, ny);
    let mut settled = [false; 4];
    let mut lights_left = clue;
    let mut spaces_left = s.len() as i32;

    for (i, (x, y)) in s.iter().enumerate() {
        let flags = state.flags(x, y);
        if flags.contains(CellFlags::LIGHT) {
            // A light here already: one less light for one less place.
            lights_left -= 1;
            spaces_left -= 1;
            settled[i] = true;
        } else if !could_place_light(flags, state.lit_count(x, y)) {
            spaces_left -= 1;
            settled[i] = true;
        }
    }
    if spaces_left == 0 {
        return false;
    }

    let mut did_something = false;
    if lights_left == 0 {
        // All lights placed; the remaining neighbours are impossible.
        state.add_flags(nx, ny, CellFlags::NUMBER_USED);
        for (i, (x, y)) in s.iter().enumerate() {
            if !settled[i] {
                state.add_flags(x, y, CellFlags::IMPOSSIBLE);
                did_something = true;
            }
        }
    } else if lights_left == spaces_left {
        // As many lights to place as spaces; fill them all.
        state.add_flags(nx, ny, CellFlags::NUMBER_USED);
        for (i, (x, y)) in s.iter().enumerate() {
            if !settled[i] {
                state.set_light(x, y, true);
                did_something = true;
            }
        }
    }
    did_something
}

fn solve_sub(
    state: &mut GameState,
    require_unique: bool,
    max_recurse: usize,
    depth: usize,
    max_depth: &mut usize,
) -> i32 {
    if *max_depth < depth {
        *max_depth = depth;
    }

    loop {
        if state.overlap() {
            // A solve from scratch never trips this, but solving on from a
            // half-completed incorrect position can.
            return 0;
        }
        if state.is_correct() {
            return 1;
        }

        let mut can_place = 0;
        let mut did_something = false;
        // The critical loop for solver timing.
        for x in 0..state.width() {
            for y in 0..state.height() {
                let flags = state.flags(x, y);
                let lit = state.lit_count(x, y);
                if could_place_light(flags, lit) {
                    can_place += 1;
                }
                if try_solve_light(state, x, y, flags, lit) {
                    did_something = true;
                }
                if try_solve_number(state, x, y, flags, lit) {
                    did_something = true;
                }
            }
        }
        if did_something {
            continue;
        }
        if can_place == 0 {
            return 0;
        }
        if depth >= max_recurse {
            return -1;
        }

        // We have to guess. Of all the squares a light could go on, pick the
        // one that would light the most currently unlit squares.
        let mut best = None;
        let mut best_n = 0;
        for x in 0..state.width() {
            for y in 0..state.height() {
                if !could_place_light(state.flags(x, y), state.lit_count(x, y)) {
                    continue;
                }
                let n = state
                    .light_line(x, y, true)
                    .cells()
                    .filter(|&(lx, ly)| state.lit_count(lx, ly) == 0)
                    .count();
                if n > best_n {
                    best_n = n;
                    best = Some((x, y));
                }
            }
        }
        let (bx, by) = best.expect("some cell can still take a light");

        // Try (bx, by) once as impossible and once as lit; the lit branch
        // runs on a copy.
        let mut copy = state.clone();
        state.add_flags(bx, by, CellFlags::IMPOSSIBLE);
        let self_soluble = solve_sub(state, require_unique, max_recurse, depth + 1, max_depth);

        if !require_unique && self_soluble > 0 {
            return self_soluble;
        }

        copy.set_light(bx, by, true);
        let copy_soluble = solve_sub(&mut copy, require_unique, max_recurse, depth + 1, max_depth);

        // Hitting the recursion limit on either branch means possible extra
        // solutions went unseen, so a uniqueness request cannot be answered.
        return if require_unique && (copy_soluble < 0 || self_soluble < 0) {
            -1
        } else if copy_soluble <= 0 {
            self_soluble
        } else if self_soluble <= 0 {
            // Only the copy solved; surface its solution in our state.
            state.copy_planes_from(&copy);
            copy_soluble
        } else {
            copy_soluble + self_soluble
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desc::new_state;
    use crate::params::GameParams;

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
    fn unlit_cell_rule_places_a_forced_light() {
        // Checkerboard: (0, 0) can only be lit by itself.
        let mut s = state(3, 3, "aBaBaBaBa");
        let flags = s.flags(0, 0);
        let lit = s.lit_count(0, 0);
        assert!(try_solve_light(&mut s, 0, 0, flags, lit));
        assert!(s.flags(0, 0).contains(CellFlags::LIGHT));
    }

    #[test]
    fn unlit_cell_rule_leaves_open_cells_alone() {
        let mut s = state(3, 3, "i");
        let flags = s.flags(0, 0);
        let lit = s.lit_count(0, 0);
        assert!(!try_solve_light(&mut s, 0, 0, flags, lit));
        assert_eq!(s.light_count(), 0);
    }

    #[test]
    fn number_rule_fills_a_saturated_clue() {
        let mut s = state(3, 3, "d4d");
        let flags = s.flags(1, 1);
        let clue = s.clue(1, 1);
        assert!(try_solve_number(&mut s, 1, 1, flags, clue));

        for &(x, y) in &[(1, 0), (0, 1), (2, 1), (1, 2)] {
            assert!(s.flags(x, y).contains(CellFlags::LIGHT), "cell ({x},{y})");
        }
        assert!(s.flags(1, 1).contains(CellFlags::NUMBER_USED));
        assert!(s.is_correct());
    }

    #[test]
    fn number_rule_forbids_neighbours_of_a_zero_clue() {
        let mut s = state(3, 3, "a0af");
        let flags = s.flags(1, 0);
        let clue = s.clue(1, 0);
        assert!(try_solve_number(&mut s, 1, 0, flags, clue));

        for &(x, y) in &[(0, 0), (2, 0), (1, 1)] {
            assert!(
                s.flags(x, y).contains(CellFlags::IMPOSSIBLE),
                "cell ({x},{y})"
            );
        }
        assert!(s.flags(1, 0).contains(CellFlags::NUMBER_USED));
    }

    #[test]
    fn solves_a_rules_only_puzzle_without_branching() {
        let mut s = state(3, 3, "aBaBaBaBa");
        let mut depth = 0;
        assert_eq!(solve(&mut s, false, true, &mut depth), 1);
        assert_eq!(depth, 0);
        assert!(s.is_correct());
        assert_eq!(s.light_count(), 5);
    }

    #[test]
    fn solves_the_centre_four_clue() {
        let mut s = state(3, 3, "d4d");
        let mut depth = 0;
        assert_eq!(solve(&mut s, false, true, &mut depth), 1);
        assert_eq!(depth, 0);
        assert!(s.is_correct());
    }

    #[test]
    fn counts_both_solutions_of_the_open_two_by_two() {
        // Lights on either diagonal solve the clueless 2x2.
        let mut s = state(2, 2, "d");
        let mut depth = 0;
        let n = solve(&mut s, true, true, &mut depth);
        assert!(n >= 2, "expected at least two solutions, got {n}");
        assert!(depth >= 1);
    }

    #[test]
    fn refuses_to_guess_without_a_budget() {
        let mut s = state(2, 2, "d");
        let mut depth = 0;
        assert_eq!(solve(&mut s, false, true, &mut depth), -1);
    }

    #[test]
    fn reports_zero_solutions_from_an_overlapping_position() {
        let mut s = state(3, 3, "i");
        s.set_light(0, 0, true);
        s.set_light(2, 0, true);
        let mut depth = 0;
        assert_eq!(solve(&mut s, true, true, &mut depth), 0);
    }

    #[test]
    fn reports_zero_solutions_for_contradictory_clues() {
        // A 4 clue on a 2x2 board has a single white neighbour.
        let mut s = state(2, 2, "04b");
        let mut depth = 0;
        assert_eq!(solve(&mut s, true, true, &mut depth), 0);
    }

    #[test]
    fn solving_on_continues_from_user_progress() {
        let mut s = state(3, 3, "d4d");
        s.set_light(1, 0, true);
        let mut depth = 0;
        assert_eq!(solve(&mut s, false, false, &mut depth), 1);
        assert!(s.is_correct());
    }
}
