//! Text notation for initial board layouts.
//!
//! A layout is a row-major grid of whitespace-separated tokens. The first
//! character of a token selects the base of the cell:
//!
//! | Char | Base |
//! |------|------|
//! | `0`-`9` | Normal tile of that palette index |
//! | `?` or `.` | Normal tile of a random color |
//! | `_` | No tile; gravity fills the cell during setup |
//! | `H` / `V` | Horizontal / vertical rocket |
//! | `B` | Bomb |
//! | `M` | Magic |
//! | `W` | Wood |
//! | `S` | Stone |
//!
//! Any further characters are suffixes: a digit colors a rocket or bomb,
//! `l` locks the tile, `a` adds plain jelly, `b` adds infectious jelly and
//! `i` puts ice under the cell. `3l` is a locked color-3 tile, `B1i` a color-1
//! bomb on ice.

use std::fmt;

use thiserror::Error;

use crate::{Board, CellCoord, Jelly, TileColor, TileKind};

/// Base of a single layout cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellBase {
    /// Normal tile with a random palette color.
    Random,
    /// Normal tile with an explicit color.
    Normal(TileColor),
    /// Rocket, bomb or magic tile.
    Special {
        /// Special kind.
        kind: TileKind,
        /// Explicit color; rockets and bombs without one receive a random color.
        color: Option<TileColor>,
    },
    /// Wood obstacle.
    Wood,
    /// Stone obstacle.
    Stone,
    /// Cell left without a tile.
    Empty,
}

/// Fully decoded layout token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellSpec {
    /// What occupies the cell.
    pub base: CellBase,
    /// Whether the tile carries a lock.
    pub locked: bool,
    /// Jelly coating applied to the tile.
    pub jelly: Option<Jelly>,
    /// Whether the cell has an ice layer.
    pub ice: bool,
}

impl CellSpec {
    fn parse(token: &str) -> Result<Self, LayoutError> {
        let mut chars = token.chars();
        let Some(first) = chars.next() else {
            return Err(LayoutError::UnknownBase {
                token: token.to_owned(),
            });
        };

        let mut suffix_color = None;
        let mut locked = false;
        let mut jelly = None;
        let mut ice = false;
        for modifier in chars {
            match modifier {
                'l' => locked = true,
                'a' => jelly = Some(Jelly::Plain),
                'b' => jelly = Some(Jelly::Infectious),
                'i' => ice = true,
                digit if digit.is_ascii_digit() && suffix_color.is_none() => {
                    suffix_color = digit_color(digit);
                }
                other => {
                    return Err(LayoutError::UnknownModifier {
                        token: token.to_owned(),
                        modifier: other,
                    })
                }
            }
        }

        let base = match first {
            digit if digit.is_ascii_digit() => match digit_color(digit) {
                Some(color) => CellBase::Normal(color),
                None => CellBase::Random,
            },
            '?' | '.' => CellBase::Random,
            '_' => CellBase::Empty,
            'H' => special(TileKind::ROCKET_H, suffix_color),
            'V' => special(TileKind::ROCKET_V, suffix_color),
            'B' => special(TileKind::Bomb, suffix_color),
            'M' => special(TileKind::Magic, None),
            'W' => CellBase::Wood,
            'S' => CellBase::Stone,
            _ => {
                return Err(LayoutError::UnknownBase {
                    token: token.to_owned(),
                })
            }
        };

        let accepts_color = matches!(first, 'H' | 'V' | 'B');
        if suffix_color.is_some() && !accepts_color {
            return Err(LayoutError::UnexpectedColor {
                token: token.to_owned(),
            });
        }

        let bare_base = matches!(base, CellBase::Wood | CellBase::Stone | CellBase::Empty);
        if bare_base && (locked || jelly.is_some()) {
            return Err(LayoutError::ObstacleModifier {
                token: token.to_owned(),
            });
        }

        Ok(Self {
            base,
            locked,
            jelly,
            ice,
        })
    }

    fn color(&self) -> Option<TileColor> {
        match self.base {
            CellBase::Normal(color) => Some(color),
            CellBase::Special { color, .. } => color,
            CellBase::Random | CellBase::Wood | CellBase::Stone | CellBase::Empty => None,
        }
    }
}

impl fmt::Display for CellSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.base {
            CellBase::Random => write!(f, "?")?,
            CellBase::Normal(color) => write!(f, "{color}")?,
            CellBase::Special { kind, color } => {
                let symbol = match kind {
                    TileKind::Rocket(crate::Axis::Horizontal) => 'H',
                    TileKind::Rocket(crate::Axis::Vertical) => 'V',
                    TileKind::Bomb => 'B',
                    TileKind::Magic => 'M',
                    TileKind::Normal => '?',
                    TileKind::Wood => 'W',
                    TileKind::Stone => 'S',
                };
                write!(f, "{symbol}")?;
                if let Some(color) = color {
                    write!(f, "{color}")?;
                }
            }
            CellBase::Wood => write!(f, "W")?,
            CellBase::Stone => write!(f, "S")?,
            CellBase::Empty => write!(f, "_")?,
        }
        if self.locked {
            write!(f, "l")?;
        }
        match self.jelly {
            Some(Jelly::Plain) => write!(f, "a")?,
            Some(Jelly::Infectious) => write!(f, "b")?,
            None => {}
        }
        if self.ice {
            write!(f, "i")?;
        }
        Ok(())
    }
}

/// Row-major grid of decoded layout tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    rows: u32,
    columns: u32,
    cells: Vec<CellSpec>,
}

impl Layout {
    /// Parses the layout notation described in the module documentation.
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        let mut cells = Vec::new();
        let mut columns = None;
        let mut rows = 0_usize;

        for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
            let mut width = 0_usize;
            for token in line.split_whitespace() {
                cells.push(CellSpec::parse(token)?);
                width += 1;
            }
            match columns {
                None => columns = Some(width),
                Some(expected) if expected != width => {
                    return Err(LayoutError::RaggedRow {
                        row: rows,
                        expected,
                        found: width,
                    })
                }
                Some(_) => {}
            }
            rows += 1;
        }

        let columns = columns.ok_or(LayoutError::Empty)?;
        Ok(Self {
            rows: u32::try_from(rows).map_err(|_| LayoutError::Oversized)?,
            columns: u32::try_from(columns).map_err(|_| LayoutError::Oversized)?,
            cells,
        })
    }

    /// Captures the current contents of a board in layout notation.
    #[must_use]
    pub fn capture(board: &Board) -> Self {
        let cells = board
            .coords()
            .map(|cell| {
                let ice = board.has_ice(cell);
                let Some(tile) = board.tile(cell) else {
                    return CellSpec {
                        base: CellBase::Empty,
                        locked: false,
                        jelly: None,
                        ice,
                    };
                };
                let base = match tile.kind() {
                    TileKind::Normal => match tile.color() {
                        Some(color) => CellBase::Normal(color),
                        None => CellBase::Random,
                    },
                    TileKind::Wood => CellBase::Wood,
                    TileKind::Stone => CellBase::Stone,
                    kind => CellBase::Special {
                        kind,
                        color: tile.color(),
                    },
                };
                CellSpec {
                    base,
                    locked: tile.is_locked(),
                    jelly: tile.jelly(),
                    ice,
                }
            })
            .collect();

        Self {
            rows: board.rows(),
            columns: board.columns(),
            cells,
        }
    }

    /// Number of rows described by the layout.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns described by the layout.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Decoded token for the cell, if inside the layout.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<&CellSpec> {
        if cell.row() >= self.rows || cell.column() >= self.columns {
            return None;
        }
        let index = usize::try_from(cell.row() * self.columns + cell.column()).ok()?;
        self.cells.get(index)
    }

    /// Highest explicit palette index mentioned by the layout.
    #[must_use]
    pub fn max_color(&self) -> Option<TileColor> {
        self.cells.iter().filter_map(CellSpec::color).max()
    }

    /// Builds a board from the layout.
    ///
    /// Explicit tiles are placed first; `fill` then chooses the color of every
    /// random cell and of every rocket or bomb written without a color, seeing
    /// the board as it has been filled so far.
    pub fn build<F>(&self, mut fill: F) -> Board
    where
        F: FnMut(&Board, CellCoord) -> TileColor,
    {
        let mut board = Board::new(self.rows, self.columns);
        let cells: Vec<(CellCoord, CellSpec)> =
            board.coords().zip(self.cells.iter().copied()).collect();

        for (cell, spec) in &cells {
            let placed = match spec.base {
                CellBase::Normal(color) => Some((TileKind::Normal, Some(color))),
                CellBase::Special {
                    kind: TileKind::Magic,
                    ..
                } => Some((TileKind::Magic, None)),
                CellBase::Special {
                    kind,
                    color: Some(color),
                } => Some((kind, Some(color))),
                CellBase::Wood => Some((TileKind::Wood, None)),
                CellBase::Stone => Some((TileKind::Stone, None)),
                CellBase::Random | CellBase::Special { color: None, .. } | CellBase::Empty => None,
            };
            if let Some((kind, color)) = placed {
                let _ = board.spawn(*cell, kind, color);
            }
        }

        for (cell, spec) in &cells {
            let kind = match spec.base {
                CellBase::Random => TileKind::Normal,
                CellBase::Special { kind, color: None } if kind != TileKind::Magic => kind,
                _ => continue,
            };
            let color = fill(&board, *cell);
            let _ = board.spawn(*cell, kind, Some(color));
        }

        for (cell, spec) in &cells {
            board.set_locked(*cell, spec.locked);
            board.set_jelly(*cell, spec.jelly);
            board.set_ice(*cell, spec.ice);
        }

        board
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<String> = self.cells.iter().map(ToString::to_string).collect();
        let width = tokens.iter().map(String::len).max().unwrap_or(1);
        let columns = usize::try_from(self.columns).unwrap_or(0).max(1);
        for (row, chunk) in tokens.chunks(columns).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            let line: Vec<String> = chunk
                .iter()
                .map(|token| format!("{token:<width$}"))
                .collect();
            write!(f, "{}", line.join(" ").trim_end())?;
        }
        Ok(())
    }
}

/// Reasons a layout string can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The layout did not contain any tokens.
    #[error("layout contains no rows")]
    Empty,
    /// The layout is larger than the coordinate space.
    #[error("layout dimensions overflow the coordinate space")]
    Oversized,
    /// A row has a different number of tokens than the first row.
    #[error("layout row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Token count of the first row.
        expected: usize,
        /// Token count of the offending row.
        found: usize,
    },
    /// The first character of a token is not a known base.
    #[error("unknown cell base in token `{token}`")]
    UnknownBase {
        /// Offending token.
        token: String,
    },
    /// A suffix character is not a known modifier.
    #[error("unknown modifier `{modifier}` in token `{token}`")]
    UnknownModifier {
        /// Offending token.
        token: String,
        /// Unrecognised suffix character.
        modifier: char,
    },
    /// A color suffix was attached to a base that cannot carry one.
    #[error("token `{token}` cannot carry a color suffix")]
    UnexpectedColor {
        /// Offending token.
        token: String,
    },
    /// A lock or jelly suffix was attached to an obstacle or empty cell.
    #[error("token `{token}` cannot carry a lock or jelly")]
    ObstacleModifier {
        /// Offending token.
        token: String,
    },
}

fn digit_color(digit: char) -> Option<TileColor> {
    digit
        .to_digit(10)
        .and_then(|value| u8::try_from(value).ok())
        .map(TileColor::new)
}

fn special(kind: TileKind, color: Option<TileColor>) -> CellBase {
    CellBase::Special { kind, color }
}
