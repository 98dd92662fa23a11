//! Level configuration and validation.

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Layout, LayoutError, SpecialKind, TileColor};

/// Smallest palette a level may use.
pub const MIN_COLORS: u8 = 3;

/// Largest palette a level may use.
pub const MAX_COLORS: u8 = 10;

/// Largest row or column count a level may use.
pub const MAX_DIMENSION: u32 = 32;

/// Thing a collection target counts.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum TargetKey {
    /// Normal tiles of a palette color destroyed.
    Color(TileColor),
    /// Ice layers cracked.
    Ice,
    /// Locks removed.
    Lock,
    /// Wood obstacles broken.
    Wood,
    /// Jelly coatings stripped.
    Jelly,
    /// Special tiles of the given kind consumed.
    Special(SpecialKind),
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Color(color) => write!(f, "color:{color}"),
            Self::Ice => write!(f, "ice"),
            Self::Lock => write!(f, "lock"),
            Self::Wood => write!(f, "wood"),
            Self::Jelly => write!(f, "jelly"),
            Self::Special(SpecialKind::Rocket) => write!(f, "rocket"),
            Self::Special(SpecialKind::Bomb) => write!(f, "bomb"),
            Self::Special(SpecialKind::Magic) => write!(f, "magic"),
        }
    }
}

impl FromStr for TargetKey {
    type Err = TargetKeyError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let normalized = text.trim().to_ascii_lowercase();
        if let Some(index) = normalized.strip_prefix("color:") {
            let index: u8 = index
                .trim()
                .parse()
                .map_err(|_| TargetKeyError::InvalidColor(text.to_owned()))?;
            return Ok(Self::Color(TileColor::new(index)));
        }
        match normalized.as_str() {
            "ice" => Ok(Self::Ice),
            "lock" => Ok(Self::Lock),
            "wood" => Ok(Self::Wood),
            "jelly" => Ok(Self::Jelly),
            "rocket" => Ok(Self::Special(SpecialKind::Rocket)),
            "bomb" => Ok(Self::Special(SpecialKind::Bomb)),
            "magic" => Ok(Self::Special(SpecialKind::Magic)),
            _ => Err(TargetKeyError::Unknown(text.to_owned())),
        }
    }
}

impl TryFrom<String> for TargetKey {
    type Error = TargetKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TargetKey> for String {
    fn from(key: TargetKey) -> Self {
        key.to_string()
    }
}

/// Errors produced while parsing a target key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetKeyError {
    /// The key is not one of the known target names.
    #[error("unknown target key `{0}`")]
    Unknown(String),
    /// The color index after `color:` is not a number.
    #[error("invalid color in target key `{0}`")]
    InvalidColor(String),
}

/// Single collection target of a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetSpec {
    /// What the target counts.
    pub key: TargetKey,
    /// How many must be collected.
    pub count: u32,
}

impl TargetSpec {
    /// Creates a new target specification.
    #[must_use]
    pub const fn new(key: TargetKey, count: u32) -> Self {
        Self { key, count }
    }
}

/// Raw, unvalidated level description as read from configuration files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LevelConfig {
    /// Number of board rows.
    pub rows: u32,
    /// Number of board columns.
    pub columns: u32,
    /// Size of the color palette.
    pub colors: u8,
    /// Move budget.
    pub moves: u32,
    /// Score needed to win when no targets are configured.
    pub score_threshold: u64,
    /// Collection targets.
    pub targets: Vec<TargetSpec>,
    /// Optional initial layout in layout notation.
    pub layout: Option<String>,
    /// Seed for every random decision of the level.
    pub seed: u64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            rows: 9,
            columns: 9,
            colors: 5,
            moves: 20,
            score_threshold: 5_000,
            targets: Vec::new(),
            layout: None,
            seed: 0x5EED_0F_6E35,
        }
    }
}

/// Validated level ready to be loaded into a world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    config: LevelConfig,
    layout: Option<Layout>,
}

impl Level {
    /// Validates a configuration and parses its layout.
    pub fn new(config: LevelConfig) -> Result<Self, LevelConfigError> {
        for (axis, value) in [("rows", config.rows), ("columns", config.columns)] {
            if value == 0 || value > MAX_DIMENSION {
                return Err(LevelConfigError::Dimension { axis, value });
            }
        }
        if !(MIN_COLORS..=MAX_COLORS).contains(&config.colors) {
            return Err(LevelConfigError::Palette(config.colors));
        }
        if config.moves == 0 {
            return Err(LevelConfigError::NoMoves);
        }
        if config.targets.is_empty() && config.score_threshold == 0 {
            return Err(LevelConfigError::NoGoal);
        }

        let mut seen = BTreeSet::new();
        for target in &config.targets {
            if target.count == 0 {
                return Err(LevelConfigError::EmptyTarget(target.key));
            }
            if let TargetKey::Color(color) = target.key {
                if color.index() >= config.colors {
                    return Err(LevelConfigError::ColorOutOfPalette {
                        color,
                        colors: config.colors,
                    });
                }
            }
            if !seen.insert(target.key) {
                return Err(LevelConfigError::DuplicateTarget(target.key));
            }
        }

        let layout = match config.layout.as_deref() {
            Some(text) => {
                let layout = Layout::parse(text)?;
                if layout.rows() != config.rows || layout.columns() != config.columns {
                    return Err(LevelConfigError::LayoutDimensions {
                        rows: layout.rows(),
                        columns: layout.columns(),
                        expected_rows: config.rows,
                        expected_columns: config.columns,
                    });
                }
                if let Some(color) = layout.max_color() {
                    if color.index() >= config.colors {
                        return Err(LevelConfigError::ColorOutOfPalette {
                            color,
                            colors: config.colors,
                        });
                    }
                }
                Some(layout)
            }
            None => None,
        };

        Ok(Self { config, layout })
    }

    /// Returns a copy of the level that uses a different seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Number of board rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.config.rows
    }

    /// Number of board columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.config.columns
    }

    /// Size of the color palette.
    #[must_use]
    pub const fn colors(&self) -> u8 {
        self.config.colors
    }

    /// Move budget.
    #[must_use]
    pub const fn moves(&self) -> u32 {
        self.config.moves
    }

    /// Score needed to win when no targets are configured.
    #[must_use]
    pub const fn score_threshold(&self) -> u64 {
        self.config.score_threshold
    }

    /// Collection targets.
    #[must_use]
    pub fn targets(&self) -> &[TargetSpec] {
        &self.config.targets
    }

    /// Parsed initial layout, if any.
    #[must_use]
    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    /// Seed for the level's random stream.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.config.seed
    }

    /// The configuration the level was validated from.
    #[must_use]
    pub const fn config(&self) -> &LevelConfig {
        &self.config
    }
}

impl Default for Level {
    fn default() -> Self {
        Self {
            config: LevelConfig::default(),
            layout: None,
        }
    }
}

/// Reasons a level configuration is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelConfigError {
    /// Row or column count outside `1..=MAX_DIMENSION`.
    #[error("{axis} must be between 1 and {max}, got {value}", max = MAX_DIMENSION)]
    Dimension {
        /// Which dimension was rejected.
        axis: &'static str,
        /// Rejected value.
        value: u32,
    },
    /// Palette size outside `MIN_COLORS..=MAX_COLORS`.
    #[error(
        "palette must hold between {min} and {max} colors, got {0}",
        min = MIN_COLORS,
        max = MAX_COLORS
    )]
    Palette(u8),
    /// The move budget is zero.
    #[error("move budget must be positive")]
    NoMoves,
    /// Neither targets nor a positive score threshold were configured.
    #[error("level needs collection targets or a positive score threshold")]
    NoGoal,
    /// A target asks for zero items.
    #[error("target `{0}` must have a positive count")]
    EmptyTarget(TargetKey),
    /// The same target key appears twice.
    #[error("target `{0}` is configured more than once")]
    DuplicateTarget(TargetKey),
    /// A color is outside the configured palette.
    #[error("color {color} is outside the palette of {colors} colors")]
    ColorOutOfPalette {
        /// Offending color.
        color: TileColor,
        /// Configured palette size.
        colors: u8,
    },
    /// The layout grid does not match the configured dimensions.
    #[error(
        "layout is {rows}x{columns} but the level is {expected_rows}x{expected_columns}"
    )]
    LayoutDimensions {
        /// Rows found in the layout.
        rows: u32,
        /// Columns found in the layout.
        columns: u32,
        /// Configured rows.
        expected_rows: u32,
        /// Configured columns.
        expected_columns: u32,
    },
    /// The layout text could not be parsed.
    #[error("invalid layout: {0}")]
    Layout(#[from] LayoutError),
}
