//! Puzzle generator.
//!
//! The generator builds the most complex grid it can while guaranteeing a
//! unique solution and the requested difficulty: a symmetric black layout is
//! seeded with a valid solution, every black cell is numbered, and clues are
//! then stripped as long as the puzzle stays uniquely solvable. Easy puzzles
//! must additionally solve without any guessing; hard puzzles must need at
//! least one guess. When a black layout refuses to yield a good puzzle after
//! enough attempts, the black percentage is inflated and the whole process
//! starts over.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::desc::encode_description;
use crate::grid::{CellFlags, GameState};
use crate::params::{GameParams, Symmetry};
use crate::solver;

/// Attempts per black-percentage level before the percentage is inflated.
pub const MAX_GRIDGEN_TRIES: usize = 20;

/// Generates a puzzle for the given parameters, returning its descriptor
/// together with the parameters actually used (the black percentage may have
/// been inflated along the way).
///
/// The returned puzzle always has exactly one solution.
pub fn new_description<R: Rng>(params: &GameParams, rng: &mut R) -> (String, GameParams) {
    let mut params = *params;
    let mut state = GameState::new(&params);
    let wh = params.w * params.h;

    // Shuffled list of grid positions for the clue-removal pass. Shuffled
    // once up front so every attempt under a fixed seed removes clues in the
    // same order.
    let mut removal_order: Vec<usize> = (0..wh).collect();
    removal_order.shuffle(rng);

    loop {
        for _ in 0..MAX_GRIDGEN_TRIES {
            set_blacks(&mut state, &params, rng);
            place_lights(&mut state, rng);
            log::debug!("Generating initial grid.");
            place_numbers(&mut state);

            let mut mdepth = 0;
            if !puzzle_is_good(&mut state, &params, &mut mdepth) {
                continue;
            }

            // Remove the numbers the solver never needed, and keep the
            // stripped copy if it is still good.
            let mut stripped = state.clone();
            let n = strip_unused_nums(&mut stripped);
            log::debug!("Stripped {n} unused numbers.");
            if puzzle_is_good(&mut stripped, &params, &mut mdepth) {
                state = stripped;
            } else {
                log::debug!("Stripped grid is not good, reverting.");
            }

            // Remove the remaining numbers one at a time, putting each back
            // if the puzzle stops being good without it.
            for &index in &removal_order {
                let x = index % params.w;
                let y = index / params.w;
                if !state.flags(x, y).contains(CellFlags::NUMBERED) {
                    continue;
                }
                let num = state.clue(x, y);
                state.set_clue(x, y, 0);
                state.remove_flags(x, y, CellFlags::NUMBERED);
                if !puzzle_is_good(&mut state, &params, &mut mdepth) {
                    state.set_clue(x, y, num);
                    state.add_flags(x, y, CellFlags::NUMBERED);
                } else {
                    log::debug!("Removed ({x},{y}) still soluble.");
                }
            }

            // Re-validate once more to get an accurate recursion depth for
            // the difficulty test.
            let good = puzzle_is_good(&mut state, &params, &mut mdepth);
            assert!(good, "a fully pruned puzzle must still be good");
            if params.hard && mdepth == 0 {
                log::debug!("Maximum-difficulty puzzle still not recursive, skipping.");
                continue;
            }

            return (encode_description(&state), params);
        }

        // Couldn't generate a good puzzle in however many goes; ramp up the
        // percentage of black squares and try again.
        if params.black_pc < 90 {
            params.black_pc += 5;
        }
        log::debug!("New black layout {}%.", params.black_pc);
    }
}

/// Convenience wrapper over [`new_description`] drawing from the thread RNG.
pub fn generate_puzzle(params: &GameParams) -> (String, GameParams) {
    let mut rng = rand::rng();
    new_description(params, &mut rng)
}

/// Randomises the black cells of a cleaned board: fill a fundamental region
/// uniformly, then replicate it across the grid per the symmetry.
fn set_blacks<R: Rng>(state: &mut GameState, params: &GameParams, rng: &mut R) {
    let (degree, rotate) = match params.symm {
        Symmetry::None => (1, false),
        Symmetry::Mirror2 => (2, false),
        Symmetry::Rot2 => (2, true),
        Symmetry::Mirror4 => (4, false),
        Symmetry::Rot4 => (4, true),
    };
    let w = state.width();
    let h = state.height();
    let wodd = w % 2;
    let hodd = h % 2;
    assert!(
        params.symm != Symmetry::Rot4 || w == h,
        "4-fold symmetry unavailable without square grid"
    );

    let (rw, rh) = match degree {
        4 => {
            let mut rw = w / 2;
            if !rotate {
                // The mirrored fill covers the centre column; the rotated
                // fill leaves the centre square for a separate draw below.
                rw += wodd;
            }
            (rw, h / 2 + hodd)
        }
        2 => (w, h / 2 + hodd),
        _ => (w, h),
    };

    state.clear_board();
    let nblack = rw * rh * params.black_pc / 100;
    for _ in 0..nblack {
        loop {
            let x = rng.random_range(0..rw);
            let y = rng.random_range(0..rh);
            if !state.flags(x, y).contains(CellFlags::BLACK) {
                state.add_flags(x, y, CellFlags::BLACK);
                break;
            }
        }
    }

    if params.symm == Symmetry::None {
        return;
    }

    for x in 0..rw {
        for y in 0..rh {
            let f = state.flags(x, y);
            let mut orbit = [(0, 0); 4];
            let orbit_len = if degree == 4 {
                orbit[1] = (w - 1 - if rotate { y } else { x }, if rotate { x } else { y });
                orbit[2] = (if rotate { w - 1 - x } else { x }, h - 1 - y);
                orbit[3] = (
                    if rotate { y } else { w - 1 - x },
                    h - 1 - if rotate { x } else { y },
                );
                4
            } else {
                orbit[1] = (if rotate { w - 1 - x } else { x }, h - 1 - y);
                2
            };
            for &(tx, ty) in &orbit[1..orbit_len] {
                state.set_flags(tx, ty, f);
            }
        }
    }

    // The rotated 4-way fill misses the middle square of odd-sized grids;
    // give it its own draw at the same black probability.
    if degree == 4 && rotate && wodd == 1 && rng.random_range(0..100) <= params.black_pc {
        state.add_flags(w / 2, h / 2, CellFlags::BLACK);
    }
}

/// True if removing a light at `(x, y)` would leave some cell dark.
fn removal_darkens(state: &GameState, x: usize, y: usize) -> bool {
    state
        .light_line(x, y, true)
        .cells()
        .any(|(lx, ly)| state.lit_count(lx, ly) == 1)
}

/// Sets up a random correct position (every space lit, no light lit by
/// another) by filling the whole grid with lights and then removing groups
/// of lights that are safe to take out together.
fn place_lights<R: Rng>(state: &mut GameState, rng: &mut R) {
    let w = state.width();
    let h = state.height();
    let mut order: Vec<usize> = (0..w * h).collect();
    order.shuffle(rng);

    for x in 0..w {
        for y in 0..h {
            state.remove_flags(x, y, CellFlags::MARK);
            if state.flags(x, y).contains(CellFlags::BLACK) {
                continue;
            }
            state.set_light(x, y, true);
        }
    }
    if !state.overlap() {
        // Every white cell is isolated (or there are none); the saturated
        // grid is already a solution.
        return;
    }

    for &index in &order {
        let x = index % w;
        let y = index / w;
        if !state.flags(x, y).contains(CellFlags::LIGHT) {
            continue;
        }
        if state.flags(x, y).contains(CellFlags::MARK) {
            continue;
        }
        let line = state.light_line(x, y, false);

        // The lights this one illuminates, other than itself.
        let seen: Vec<(usize, usize)> = line
            .cells()
            .filter(|&(lx, ly)| state.flags(lx, ly).contains(CellFlags::LIGHT))
            .collect();
        if seen.is_empty() {
            continue;
        }

        // Remove them all, but only if no cell would go dark.
        if seen.iter().all(|&(lx, ly)| !removal_darkens(state, lx, ly)) {
            for (lx, ly) in line.cells() {
                state.set_light(lx, ly, false);
            }
            state.add_flags(x, y, CellFlags::MARK);
        }

        if !state.overlap() {
            return;
        }
        assert!(state.all_lit());
    }

    unreachable!("removing light groups always reaches an overlap-free position");
}

/// Fills every black square with the count of its neighbouring lights.
fn place_numbers(state: &mut GameState) {
    for x in 0..state.width() {
        for y in 0..state.height() {
            if !state.flags(x, y).contains(CellFlags::BLACK) {
                continue;
            }
            let n = state
                .surrounds(x, y)
                .iter()
                .filter(|&(sx, sy)| state.flags(sx, sy).contains(CellFlags::LIGHT))
                .count();
            state.add_flags(x, y, CellFlags::NUMBERED);
            state.set_clue(x, y, n as i32);
        }
    }
}

/// Removes every clue whose `NUMBER_USED` flag is clear, returning how many
/// were removed.
fn strip_unused_nums(state: &mut GameState) -> usize {
    let mut n = 0;
    for x in 0..state.width() {
        for y in 0..state.height() {
            let f = state.flags(x, y);
            if f.contains(CellFlags::NUMBERED) && !f.contains(CellFlags::NUMBER_USED) {
                state.remove_flags(x, y, CellFlags::NUMBERED);
                state.set_clue(x, y, 0);
                n += 1;
            }
        }
    }
    n
}

/// Takes the board back to an unsolved position: no lights, no impossible
/// marks, no solver scratch flags.
fn unplace_lights(state: &mut GameState) {
    for x in 0..state.width() {
        for y in 0..state.height() {
            if state.flags(x, y).contains(CellFlags::LIGHT) {
                state.set_light(x, y, false);
            }
            state.remove_flags(x, y, CellFlags::IMPOSSIBLE | CellFlags::NUMBER_USED);
        }
    }
}

/// True if the puzzle on the board (ignoring any placed lights) has exactly
/// one solution of the requested difficulty. Leaves the board solved when it
/// returns true.
fn puzzle_is_good(state: &mut GameState, params: &GameParams, mdepth: &mut usize) -> bool {
    unplace_lights(state);
    let nsol = solver::solve(state, params.hard, true, mdepth);
    if !params.hard && *mdepth > 0 {
        log::debug!("Ignoring recursive puzzle.");
        return false;
    }
    nsol == 1
}
