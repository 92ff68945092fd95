//! Parser for the plain-text stage format.
//!
//! A stage file holds 13 rows of 13 whitespace-separated block tokens. Blank
//! lines and lines starting with `#` are ignored.
//!
//! | token | block |
//! |---|---|
//! | `X` | empty |
//! | `B` or `B<hex>` | bricks, optionally limited to a quarter mask |
//! | `T<hex>` | steel quarters |
//! | `G` or `G<hex>` | glass, optionally limited to a quarter mask |
//! | `M` | mountain |
//! | `R` | river |
//! | `F` | forest |
//! | `E` | eagle |
//!
//! Quarter masks use bit 0 for top-left, bit 1 for top-right, bit 2 for
//! bottom-left and bit 3 for bottom-right.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tank_arena_core::{
    Eagle, Rect, StageError, StageMap, TerrainLayer, BLOCK_SIZE, FIELD_BLOCKS,
};
use thiserror::Error;

/// Stage used when no stage file is supplied.
pub(crate) const DEFAULT_STAGE: &str = "\
# columns: 0 1 2 3 4 5 6 7 8 9 10 11 12
X X X X X X X X X X X X X
X B X B X B X B X B X B X
X B X B X B X B X B X B X
X B X B X B T B X B X B X
X B X B X X X X X B X B X
X X X X X B X B X X X X X
T X B B X X X X X B B X T
X X X X F B X B F X X X X
X B X B F B B B F B X B X
X B X B X B X B X B X B X
X B X B R X X X R B X B X
X X X X X B8 BC B4 X X X X
X X X X X BA E B5 X X X X
";

const FULL_MASK: u8 = 0b1111;
const QUARTER: f32 = BLOCK_SIZE / 2.0;

/// Failure to read or parse a stage file.
#[derive(Debug, Error)]
pub(crate) enum StageFileError {
    /// The file could not be read.
    #[error("could not read stage file {}", path.display())]
    Read {
        /// Location of the file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The stage does not have exactly 13 rows.
    #[error("expected 13 rows, found {found}")]
    RowCount {
        /// Number of rows present.
        found: usize,
    },
    /// A row does not have exactly 13 tokens.
    #[error("row {row}: expected 13 blocks, found {found}")]
    ColumnCount {
        /// Zero-based row index.
        row: usize,
        /// Number of tokens present.
        found: usize,
    },
    /// A token is not part of the format.
    #[error("row {row}, column {column}: unknown block '{token}'")]
    UnknownToken {
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
        /// Offending token.
        token: String,
    },
    /// A quarter mask is not a hexadecimal digit.
    #[error("row {row}, column {column}: invalid quarter mask in '{token}'")]
    InvalidMask {
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
        /// Offending token.
        token: String,
    },
    /// More than one eagle was placed.
    #[error("row {row}, column {column}: the stage already has an eagle")]
    DuplicateEagle {
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
    },
    /// The resulting terrain failed validation.
    #[error(transparent)]
    Invalid(#[from] StageError),
}

/// Reads and parses the stage file at `path`.
pub(crate) fn load(path: &Path) -> Result<StageMap, StageFileError> {
    let text = fs::read_to_string(path).map_err(|source| StageFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text)
}

/// Parses a stage description.
pub(crate) fn parse(text: &str) -> Result<StageMap, StageFileError> {
    let rows: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();
    let expected = FIELD_BLOCKS as usize;
    if rows.len() != expected {
        return Err(StageFileError::RowCount { found: rows.len() });
    }

    let mut stage = StageMap::empty();
    for (row, line) in rows.into_iter().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != expected {
            return Err(StageFileError::ColumnCount {
                row,
                found: tokens.len(),
            });
        }
        for (column, token) in tokens.into_iter().enumerate() {
            place(&mut stage, row, column, token)?;
        }
    }

    stage.validate()?;
    Ok(stage)
}

fn place(
    stage: &mut StageMap,
    row: usize,
    column: usize,
    token: &str,
) -> Result<(), StageFileError> {
    let x = column as f32 * BLOCK_SIZE;
    let y = row as f32 * BLOCK_SIZE;
    let block = Rect::new(x, y, BLOCK_SIZE, BLOCK_SIZE);
    let mut chars = token.chars();
    let kind = chars.next();
    let mask = chars.as_str();

    match kind {
        Some('X') if mask.is_empty() => {}
        Some('R') if mask.is_empty() => stage.fill(TerrainLayer::River, block),
        Some('F') if mask.is_empty() => stage.fill(TerrainLayer::Forest, block),
        Some('M') if mask.is_empty() => stage.fill(TerrainLayer::Mountain, block),
        Some('E') if mask.is_empty() => {
            if stage.eagle.is_some() {
                return Err(StageFileError::DuplicateEagle { row, column });
            }
            stage.eagle = Some(Eagle::at(x, y));
        }
        Some(kind @ ('B' | 'T' | 'G')) => {
            let mask = if mask.is_empty() {
                FULL_MASK
            } else {
                u8::from_str_radix(mask, 16)
                    .ok()
                    .filter(|bits| *bits <= FULL_MASK)
                    .ok_or_else(|| StageFileError::InvalidMask {
                        row,
                        column,
                        token: token.to_owned(),
                    })?
            };
            let layer = match kind {
                'B' => TerrainLayer::Brick,
                'G' => TerrainLayer::Glass,
                _ => TerrainLayer::Steel,
            };
            fill_quarters(stage, layer, x, y, mask);
        }
        _ => {
            return Err(StageFileError::UnknownToken {
                row,
                column,
                token: token.to_owned(),
            })
        }
    }
    Ok(())
}

fn fill_quarters(stage: &mut StageMap, layer: TerrainLayer, x: f32, y: f32, mask: u8) {
    for bit in 0..4u8 {
        if mask & (1 << bit) == 0 {
            continue;
        }
        let dx = f32::from(bit % 2) * QUARTER;
        let dy = f32::from(bit / 2) * QUARTER;
        stage.fill(layer, Rect::new(x + dx, y + dy, QUARTER, QUARTER));
    }
}
