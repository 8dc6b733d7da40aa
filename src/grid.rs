//! Grid state for Light Up puzzles.
//!
//! This module provides the [`GameState`] struct which holds the puzzle board:
//! a plane of per-cell flags and a plane of derived illumination counts. The
//! counts are maintained incrementally; every light placement or removal goes
//! through [`GameState::set_light`], which adjusts the count of every cell the
//! light can see. Nothing else is allowed to touch the `LIGHT` flag.

use std::fmt;

use crate::params::GameParams;

bitflags::bitflags! {
    /// Per-cell flag word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CellFlags: u8 {
        /// The cell is a wall.
        const BLACK = 1 << 0;
        /// This black cell carries a clue number.
        const NUMBERED = 1 << 1;
        /// The clue contributed to a deduction. Solver scratch only.
        const NUMBER_USED = 1 << 2;
        /// A light may not be placed here (player or solver mark).
        const IMPOSSIBLE = 1 << 3;
        /// A light is placed here. Only `set_light` may flip this bit.
        const LIGHT = 1 << 4;
        /// Generator scratch bit.
        const MARK = 1 << 5;
    }
}

/// The horizontal and vertical runs of cells visible from an origin: the cells
/// a light placed at the origin would illuminate, which are the same cells a
/// light would have to occupy in order to illuminate the origin.
///
/// Extents stop just short of the first black cell (or the boundary) in each
/// of the four directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightLine {
    ox: usize,
    oy: usize,
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
    include_origin: bool,
}

impl LightLine {
    /// Iterates over every cell on the line exactly once: the row segment
    /// (origin excluded), then the column segment (origin included only when
    /// the line was built with `include_origin`).
    pub fn cells(self) -> impl Iterator<Item = (usize, usize)> {
        let LightLine {
            ox,
            oy,
            min_x,
            max_x,
            min_y,
            max_y,
            include_origin,
        } = self;
        let row = (min_x..=max_x)
            .filter(move |&x| x != ox)
            .map(move |x| (x, oy));
        let col = (min_y..=max_y)
            .filter(move |&y| include_origin || y != oy)
            .map(move |y| (ox, y));
        row.chain(col)
    }
}

/// The orthogonal neighbours of a cell, clipped to the grid edge.
#[derive(Clone, Copy, Debug)]
pub struct Surrounds {
    points: [(usize, usize); 4],
    len: usize,
}

impl Surrounds {
    /// Number of neighbours (2 in a corner, 3 on an edge, 4 in the interior).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.points[..self.len].iter().copied()
    }
}

/// A Light Up board.
///
/// Stores the flags plane and the lights plane. For white cells the lights
/// plane holds the number of placed lights that currently illuminate the cell
/// (a light illuminates itself); for numbered black cells it holds the clue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    w: usize,
    h: usize,
    nlights: usize,
    lights: Vec<i32>,
    flags: Vec<CellFlags>,
    completed: bool,
    used_solve: bool,
}

impl GameState {
    /// Creates an empty all-white board of the parameters' dimensions.
    pub fn new(params: &GameParams) -> GameState {
        GameState {
            w: params.w,
            h: params.h,
            nlights: 0,
            lights: vec![0; params.w * params.h],
            flags: vec![CellFlags::empty(); params.w * params.h],
            completed: false,
            used_solve: false,
        }
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    /// Number of lights currently on the board.
    pub fn light_count(&self) -> usize {
        self.nlights
    }

    /// True once the board has been fully correct at the end of a move.
    /// Latches on; later moves never clear it.
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// True once a solver stamp (`S` command) has been applied.
    pub fn used_solve(&self) -> bool {
        self.used_solve
    }

    pub(crate) fn latch_completed(&mut self) {
        self.completed = true;
    }

    pub(crate) fn latch_used_solve(&mut self) {
        self.used_solve = true;
    }

    fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.w && y < self.h);
        y * self.w + x
    }

    // ===== Reading cells =====

    pub fn flags(&self, x: usize, y: usize) -> CellFlags {
        self.flags[self.idx(x, y)]
    }

    /// Number of placed lights illuminating this white cell.
    pub fn lit_count(&self, x: usize, y: usize) -> i32 {
        self.lights[self.idx(x, y)]
    }

    /// The clue on a numbered black cell. Shares storage with `lit_count`.
    pub fn clue(&self, x: usize, y: usize) -> i32 {
        self.lights[self.idx(x, y)]
    }

    // ===== Writing cells =====
    //
    // The raw flag writers refuse `LIGHT`; only `set_light` keeps the lights
    // plane in step with the flags plane.

    pub(crate) fn add_flags(&mut self, x: usize, y: usize, f: CellFlags) {
        assert!(!f.contains(CellFlags::LIGHT));
        let i = self.idx(x, y);
        self.flags[i].insert(f);
    }

    pub(crate) fn remove_flags(&mut self, x: usize, y: usize, f: CellFlags) {
        assert!(!f.contains(CellFlags::LIGHT));
        let i = self.idx(x, y);
        self.flags[i].remove(f);
    }

    /// Overwrites the whole flag word of a cell. Used by the generator when
    /// replicating the fundamental region across the symmetry orbit.
    pub(crate) fn set_flags(&mut self, x: usize, y: usize, f: CellFlags) {
        assert!(!f.contains(CellFlags::LIGHT));
        let i = self.idx(x, y);
        self.flags[i] = f;
    }

    /// Writes a clue number into a black cell's storage slot.
    pub(crate) fn set_clue(&mut self, x: usize, y: usize, n: i32) {
        let i = self.idx(x, y);
        self.lights[i] = n;
    }

    /// Resets every cell to empty white.
    pub(crate) fn clear_board(&mut self) {
        self.flags.fill(CellFlags::empty());
        self.lights.fill(0);
        self.nlights = 0;
    }

    /// Adopts another state's planes wholesale. Used by the solver to surface
    /// a solution found on a branch copy.
    pub(crate) fn copy_planes_from(&mut self, other: &GameState) {
        assert!(self.w == other.w && self.h == other.h);
        self.lights.clone_from(&other.lights);
        self.flags.clone_from(&other.flags);
        self.nlights = other.nlights;
    }

    // ===== Visibility =====

    /// Computes the run of cells visible from `(ox, oy)`: walk left, right, up
    /// and down until a black cell or the boundary stops the ray.
    pub fn light_line(&self, ox: usize, oy: usize, include_origin: bool) -> LightLine {
        let mut line = LightLine {
            ox,
            oy,
            min_x: ox,
            max_x: ox,
            min_y: oy,
            max_y: oy,
            include_origin,
        };

        while line.min_x > 0 && !self.flags(line.min_x - 1, oy).contains(CellFlags::BLACK) {
            line.min_x -= 1;
        }
        while line.max_x + 1 < self.w && !self.flags(line.max_x + 1, oy).contains(CellFlags::BLACK)
        {
            line.max_x += 1;
        }
        while line.min_y > 0 && !self.flags(ox, line.min_y - 1).contains(CellFlags::BLACK) {
            line.min_y -= 1;
        }
        while line.max_y + 1 < self.h && !self.flags(ox, line.max_y + 1).contains(CellFlags::BLACK)
        {
            line.max_y += 1;
        }

        line
    }

    /// The up-to-four orthogonal neighbours of `(ox, oy)`.
    pub fn surrounds(&self, ox: usize, oy: usize) -> Surrounds {
        assert!(ox < self.w && oy < self.h);
        let mut points = [(0, 0); 4];
        let mut len = 0;
        if ox > 0 {
            points[len] = (ox - 1, oy);
            len += 1;
        }
        if ox + 1 < self.w {
            points[len] = (ox + 1, oy);
            len += 1;
        }
        if oy > 0 {
            points[len] = (ox, oy - 1);
            len += 1;
        }
        if oy + 1 < self.h {
            points[len] = (ox, oy + 1);
            len += 1;
        }
        Surrounds { points, len }
    }

    // ===== Mutation =====

    /// Makes sure the light at `(ox, oy)` is in the requested state, updating
    /// the illumination count of every visible cell to suit. This is the only
    /// place the `LIGHT` flag changes.
    ///
    /// # Panics
    ///
    /// Panics if the cell is black.
    pub fn set_light(&mut self, ox: usize, oy: usize, on: bool) {
        assert!(!self.flags(ox, oy).contains(CellFlags::BLACK));

        let i = self.idx(ox, oy);
        let has = self.flags[i].contains(CellFlags::LIGHT);
        let diff: i32 = if !on && has {
            self.flags[i].remove(CellFlags::LIGHT);
            self.nlights -= 1;
            -1
        } else if on && !has {
            self.flags[i].insert(CellFlags::LIGHT);
            self.nlights += 1;
            1
        } else {
            0
        };

        if diff != 0 {
            for (lx, ly) in self.light_line(ox, oy, true).cells() {
                let i = self.idx(lx, ly);
                self.lights[i] += diff;
            }
        }
    }

    // ===== Completion tests =====

    /// True if every white cell is illuminated.
    pub fn all_lit(&self) -> bool {
        for x in 0..self.w {
            for y in 0..self.h {
                if self.flags(x, y).contains(CellFlags::BLACK) {
                    continue;
                }
                if self.lit_count(x, y) == 0 {
                    return false;
                }
            }
        }
        true
    }

    /// True if any light is illuminated by another light.
    pub fn overlap(&self) -> bool {
        for x in 0..self.w {
            for y in 0..self.h {
                if !self.flags(x, y).contains(CellFlags::LIGHT) {
                    continue;
                }
                if self.lit_count(x, y) > 1 {
                    return true;
                }
            }
        }
        false
    }

    /// True if the clue at `(x, y)` is matched exactly by its neighbouring
    /// lights.
    ///
    /// # Panics
    ///
    /// Panics if the cell is not numbered.
    pub fn number_correct(&self, x: usize, y: usize) -> bool {
        assert!(self.flags(x, y).contains(CellFlags::NUMBERED));
        let placed = self
            .surrounds(x, y)
            .iter()
            .filter(|&(sx, sy)| self.flags(sx, sy).contains(CellFlags::LIGHT))
            .count() as i32;
        placed == self.clue(x, y)
    }

    /// True if every clue on the board is matched exactly.
    pub fn numbers_ok(&self) -> bool {
        for x in 0..self.w {
            for y in 0..self.h {
                if !self.flags(x, y).contains(CellFlags::NUMBERED) {
                    continue;
                }
                if !self.number_correct(x, y) {
                    return false;
                }
            }
        }
        true
    }

    /// True if the board is a solution: everything lit, no overlapping
    /// lights, every clue matched.
    pub fn is_correct(&self) -> bool {
        self.all_lit() && !self.overlap() && self.numbers_ok()
    }

    /// Display hint: true if the clue at `(x, y)` is definitely wrong. Either
    /// it already has too many neighbouring lights, or it would have too few
    /// even if every plausible neighbour (not black, not lit, not marked
    /// impossible) were filled with lights.
    ///
    /// # Panics
    ///
    /// Panics if the cell is not numbered.
    pub fn number_wrong(&self, x: usize, y: usize) -> bool {
        assert!(self.flags(x, y).contains(CellFlags::NUMBERED));
        let clue = self.clue(x, y);
        let mut placed = 0;
        let mut empty = 0;
        for (sx, sy) in self.surrounds(x, y).iter() {
            let f = self.flags(sx, sy);
            if f.contains(CellFlags::LIGHT) {
                placed += 1;
                continue;
            }
            if f.contains(CellFlags::BLACK) || f.contains(CellFlags::IMPOSSIBLE) {
                continue;
            }
            if self.lit_count(sx, sy) > 0 {
                continue;
            }
            empty += 1;
        }
        placed > clue || placed + empty < clue
    }

    // ===== Text output =====

    /// Renders the board as a bordered character grid. Interior cells show
    /// `#` for plain black, the digit for a clue, `L` for a light, `x` for an
    /// impossible mark, `.` for a cell lit from elsewhere and a space for an
    /// unknown cell.
    pub fn text_format(&self) -> String {
        let mut out = String::with_capacity((2 * self.h + 1) * (2 * self.w + 2));
        for y in 0..=self.h {
            for _ in 0..self.w {
                out.push('+');
                out.push('-');
            }
            out.push('+');
            out.push('\n');
            if y < self.h {
                for x in 0..self.w {
                    out.push('|');
                    let f = self.flags(x, y);
                    let c = if f.contains(CellFlags::BLACK) {
                        if f.contains(CellFlags::NUMBERED) {
                            (b'0' + self.clue(x, y) as u8) as char
                        } else {
                            '#'
                        }
                    } else if f.contains(CellFlags::LIGHT) {
                        'L'
                    } else if f.contains(CellFlags::IMPOSSIBLE) {
                        'x'
                    } else if self.lit_count(x, y) > 0 {
                        '.'
                    } else {
                        ' '
                    };
                    out.push(c);
                }
                out.push('|');
                out.push('\n');
            }
        }
        out
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text_format())
    }
}
