//! Tile sets: the built-in shapes and the plain-text definition format
//!
//! A tile file holds one shape per block of four lines. Each line has four
//! cells written as `0` (empty) or `1` (block); whitespace inside a line is
//! ignored. Blocks are separated by one or more blank lines.

use crate::shape::{Shape, ShapeError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TileSetError {
    #[error("failed to read tile file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: expected '0' or '1', found {found:?}")]
    InvalidCell { line: usize, found: char },
    #[error("shape {index} (ending at line {line}) is malformed")]
    Shape {
        index: usize,
        line: usize,
        #[source]
        source: ShapeError,
    },
    #[error("tile set defines no shapes")]
    Empty,
}

const O: bool = false;
const X: bool = true;

/// The eight shapes the game ships with
pub fn default_tile_set() -> Vec<Shape> {
    vec![
        Shape::new([[O, X, X, O], [O, O, X, O], [O, O, X, O], [O, O, O, O]]),
        Shape::new([[O, X, O, O], [O, X, X, O], [O, O, X, O], [O, O, O, O]]),
        Shape::new([[O, O, X, O], [O, X, X, O], [O, X, O, O], [O, O, O, O]]),
        Shape::new([[O, O, O, O], [X, X, X, X], [O, O, O, O], [O, O, O, O]]),
        Shape::new([[O, X, O, O], [O, X, O, O], [O, X, O, O], [O, X, O, O]]),
        Shape::new([[O, O, O, O], [O, X, X, O], [O, X, X, O], [O, O, O, O]]),
        Shape::new([[O, O, O, O], [X, X, X, O], [O, X, O, O], [O, O, O, O]]),
        Shape::new([[O, X, O, O], [O, X, X, O], [O, X, O, O], [O, O, O, O]]),
    ]
}

/// Parse a tile set from text
pub fn parse_tile_set(text: &str) -> Result<Vec<Shape>, TileSetError> {
    let mut shapes = Vec::new();
    let mut block: Vec<Vec<bool>> = Vec::new();

    // Trailing empty line flushes the final block
    for (index, line) in text.lines().chain(std::iter::once("")).enumerate() {
        let line_number = index + 1;
        let cells: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();

        if cells.is_empty() {
            if !block.is_empty() {
                let shape = Shape::from_rows(&block).map_err(|source| TileSetError::Shape {
                    index: shapes.len(),
                    line: index,
                    source,
                })?;
                shapes.push(shape);
                block.clear();
            }
            continue;
        }

        let row = cells
            .into_iter()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                found => Err(TileSetError::InvalidCell {
                    line: line_number,
                    found,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        block.push(row);
    }

    if shapes.is_empty() {
        return Err(TileSetError::Empty);
    }
    Ok(shapes)
}

/// Read and parse a tile file
pub fn load_tile_set(path: &Path) -> Result<Vec<Shape>, TileSetError> {
    let text = fs::read_to_string(path).map_err(|source| TileSetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let shapes = parse_tile_set(&text)?;
    debug!(path = %path.display(), count = shapes.len(), "loaded tile set");
    Ok(shapes)
}
