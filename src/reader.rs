//! Reading grid documents.
//!
//! [`parse_grid`] reads a generated grid back strictly. [`parse_flag_document`]
//! reads any numeric grid for neighbour counting: positive numbers are flags,
//! everything else is empty, and an optional `distanceThreshold` is kept.
//! Both accept any JSON layout, not only the one `output` produces.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::compress;
use crate::error::GridError;
use crate::grid::{Grid, GridCoordinate};
use crate::neighbors::FlagGrid;

#[derive(Deserialize)]
struct Document {
    data: Vec<Vec<serde_json::Number>>,
}

/// Parse a `{"data": [[...], ...]}` document.
pub fn parse_grid(bytes: &[u8]) -> Result<Grid, GridError> {
    let doc: Document =
        serde_json::from_slice(bytes).map_err(|e| GridError::Malformed(e.to_string()))?;
    let rows = doc
        .data
        .into_iter()
        .enumerate()
        .map(|(r, row)| {
            row.into_iter()
                .enumerate()
                .map(|(c, n)| to_cell(r, c, &n))
                .collect::<Result<Vec<i32>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;
    Grid::from_rows(rows)
}

fn to_cell(row: usize, col: usize, n: &serde_json::Number) -> Result<i32, GridError> {
    n.as_i64()
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| GridError::InvalidCell {
            row,
            col,
            value: n.to_string(),
        })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NeighborDocument {
    data: Vec<Vec<f64>>,
    distance_threshold: Option<i64>,
}

/// Flags plus the threshold stored alongside them, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagDocument {
    pub flags: FlagGrid,
    pub threshold: Option<u32>,
}

/// Parse `{"data": [[...]], "distanceThreshold": d}`; the threshold is
/// optional.
pub fn parse_flag_document(bytes: &[u8]) -> Result<FlagDocument, GridError> {
    let doc: NeighborDocument =
        serde_json::from_slice(bytes).map_err(|e| GridError::Malformed(e.to_string()))?;
    let threshold = doc.distance_threshold.map(to_threshold).transpose()?;

    let Some(first) = doc.data.first() else {
        return Err(GridError::Malformed("empty data array".to_string()));
    };
    let cols = first.len();
    if cols == 0 {
        return Err(GridError::Malformed("empty row".to_string()));
    }
    let mut flags = Vec::new();
    for (r, row) in doc.data.iter().enumerate() {
        if row.len() != cols {
            return Err(GridError::NotRectangular {
                row: r,
                expected: cols,
                found: row.len(),
            });
        }
        flags.extend(
            row.iter()
                .enumerate()
                .filter(|(_, v)| **v > 0.0)
                .map(|(c, _)| GridCoordinate { row: r, col: c }),
        );
    }
    Ok(FlagDocument {
        flags: FlagGrid::new(doc.data.len(), cols, flags),
        threshold,
    })
}

/// Validate a threshold from a document or the command line.
pub fn to_threshold(value: i64) -> Result<u32, GridError> {
    u32::try_from(value).map_err(|_| GridError::InvalidThreshold(value))
}

/// Read, decompress if needed, and parse a file for neighbour counting.
pub fn read_flag_document(path: &Path) -> Result<FlagDocument> {
    let bytes = compress::read_file(path)?;
    let doc = parse_flag_document(&bytes)
        .with_context(|| format!("invalid grid file: {}", path.display()))?;
    log::info!(
        "parsed {}x{} grid with {} flags from {}",
        doc.flags.rows(),
        doc.flags.cols(),
        doc.flags.flag_count(),
        path.display()
    );
    Ok(doc)
}

/// Read, decompress if needed, and parse a grid file.
pub fn read_grid(path: &Path) -> Result<Grid> {
    let bytes = compress::read_file(path)?;
    let grid = parse_grid(&bytes).with_context(|| format!("invalid grid file: {}", path.display()))?;
    log::debug!(
        "read {}x{} grid with {} positive cells from {}",
        grid.rows(),
        grid.cols(),
        grid.positive_count(),
        path.display()
    );
    Ok(grid)
}
