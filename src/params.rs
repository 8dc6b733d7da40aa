//! Puzzle parameters, presets and the parameter string codec.

/// Symmetry applied to the generated black-cell layout.
///
/// The discriminants double as the wire indices used in parameter strings
/// (`s2` selects 2-way rotational symmetry, and so on).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symmetry {
    None,
    Mirror2,
    Rot2,
    Mirror4,
    Rot4,
}

impl Symmetry {
    pub fn from_index(index: usize) -> Option<Symmetry> {
        match index {
            0 => Some(Symmetry::None),
            1 => Some(Symmetry::Mirror2),
            2 => Some(Symmetry::Rot2),
            3 => Some(Symmetry::Mirror4),
            4 => Some(Symmetry::Rot4),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Symmetry::None => 0,
            Symmetry::Mirror2 => 1,
            Symmetry::Rot2 => 2,
            Symmetry::Mirror4 => 3,
            Symmetry::Rot4 => 4,
        }
    }
}

/// Immutable configuration of a puzzle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameParams {
    pub w: usize,
    pub h: usize,
    /// Target percentage of black squares. The generator inflates this when
    /// it repeatedly fails to produce a good puzzle.
    pub black_pc: usize,
    pub symm: Symmetry,
    /// When set, the generated puzzle requires at least one backtracking
    /// guess; when clear, it is solvable by the propagation rules alone.
    pub hard: bool,
}

/// The preset menu: 7x7, 10x10 and 14x14, each in an easy and a hard variant.
pub const PRESETS: [GameParams; 6] = [
    GameParams {
        w: 7,
        h: 7,
        black_pc: 20,
        symm: Symmetry::Rot4,
        hard: false,
    },
    GameParams {
        w: 7,
        h: 7,
        black_pc: 20,
        symm: Symmetry::Rot4,
        hard: true,
    },
    GameParams {
        w: 10,
        h: 10,
        black_pc: 20,
        symm: Symmetry::Rot2,
        hard: false,
    },
    GameParams {
        w: 10,
        h: 10,
        black_pc: 20,
        symm: Symmetry::Rot2,
        hard: true,
    },
    GameParams {
        w: 14,
        h: 14,
        black_pc: 20,
        symm: Symmetry::Rot2,
        hard: false,
    },
    GameParams {
        w: 14,
        h: 14,
        black_pc: 20,
        symm: Symmetry::Rot2,
        hard: true,
    },
];

impl Default for GameParams {
    fn default() -> Self {
        PRESETS[0]
    }
}

/// Returns the label and parameters of preset `i`, or `None` past the end of
/// the menu.
pub fn fetch_preset(i: usize) -> Option<(String, GameParams)> {
    let params = *PRESETS.get(i)?;
    let label = format!(
        "{}x{} {}",
        params.w,
        params.h,
        if params.hard { "hard" } else { "easy" }
    );
    Some((label, params))
}

/// Consumes a leading run of decimal digits, `atoi`-style: an empty run
/// parses as 0.
fn eat_num(s: &mut &str) -> usize {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (digits, rest) = s.split_at(end);
    *s = rest;
    digits.parse().unwrap_or(0)
}

impl GameParams {
    /// Encodes the parameters as `WxHbBLACKsSYMM[r]`, or just `WxH` when
    /// `full` is false (the short form leaks no generation hints).
    pub fn encode(&self, full: bool) -> String {
        if full {
            format!(
                "{}x{}b{}s{}{}",
                self.w,
                self.h,
                self.black_pc,
                self.symm.index(),
                if self.hard { "r" } else { "" }
            )
        } else {
            format!("{}x{}", self.w, self.h)
        }
    }

    /// Decodes a parameter string. Pieces may be omitted from the tail; any
    /// omitted piece keeps its default value, except `hard`, which is false
    /// unless the `r` flag is present.
    pub fn decode(string: &str) -> Result<GameParams, String> {
        let mut params = GameParams::default();
        let mut rest = string;

        params.w = eat_num(&mut rest);
        if let Some(r) = rest.strip_prefix('x') {
            rest = r;
            params.h = eat_num(&mut rest);
        }
        if let Some(r) = rest.strip_prefix('b') {
            rest = r;
            params.black_pc = eat_num(&mut rest);
        }
        if let Some(r) = rest.strip_prefix('s') {
            rest = r;
            let index = eat_num(&mut rest);
            params.symm =
                Symmetry::from_index(index).ok_or_else(|| "Unknown symmetry type".to_string())?;
        }
        params.hard = rest.starts_with('r');

        Ok(params)
    }

    /// Checks the parameters, returning a human-readable message on failure.
    /// Generation-only constraints (black percentage, symmetry shape) are
    /// only checked when `full` is set.
    pub fn validate(&self, full: bool) -> Result<(), String> {
        if self.w < 2 || self.h < 2 {
            return Err("Width and height must be at least 2".to_string());
        }
        if full {
            if self.black_pc < 5 || self.black_pc > 100 {
                return Err(
                    "Percentage of black squares must be between 5% and 100%".to_string(),
                );
            }
            if self.w != self.h && self.symm == Symmetry::Rot4 {
                return Err("4-fold symmetry is only available with square grids".to_string());
            }
        }
        Ok(())
    }
}

/// One entry in the configuration dialog schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigItem {
    String {
        name: &'static str,
        value: String,
    },
    Choices {
        name: &'static str,
        choices: &'static [&'static str],
        selected: usize,
    },
    Boolean {
        name: &'static str,
        value: bool,
    },
}

pub const SYMMETRY_CHOICES: [&str; 5] = [
    "None",
    "2-way mirror",
    "2-way rotational",
    "4-way mirror",
    "4-way rotational",
];

pub const DIFFICULTY_CHOICES: [&str; 2] = ["Easy", "Hard"];

impl GameParams {
    /// Describes the parameters as configuration dialog items.
    pub fn to_config(&self) -> Vec<ConfigItem> {
        vec![
            ConfigItem::String {
                name: "Width",
                value: self.w.to_string(),
            },
            ConfigItem::String {
                name: "Height",
                value: self.h.to_string(),
            },
            ConfigItem::String {
                name: "%age of black squares",
                value: self.black_pc.to_string(),
            },
            ConfigItem::Choices {
                name: "Symmetry",
                choices: &SYMMETRY_CHOICES,
                selected: self.symm.index(),
            },
            ConfigItem::Choices {
                name: "Difficulty",
                choices: &DIFFICULTY_CHOICES,
                selected: self.hard as usize,
            },
        ]
    }

    /// Reads parameters back out of configuration dialog items.
    pub fn from_config(items: &[ConfigItem]) -> Result<GameParams, String> {
        let [ConfigItem::String { value: w, .. }, ConfigItem::String { value: h, .. }, ConfigItem::String { value: black, .. }, ConfigItem::Choices { selected: symm, .. }, ConfigItem::Choices { selected: hard, .. }] =
            items
        else {
            return Err("Unexpected configuration layout".to_string());
        };

        Ok(GameParams {
            w: w.trim().parse().unwrap_or(0),
            h: h.trim().parse().unwrap_or(0),
            black_pc: black.trim().parse().unwrap_or(0),
            symm: Symmetry::from_index(*symm).ok_or_else(|| "Unknown symmetry type".to_string())?,
            hard: *hard != 0,
        })
    }
}
