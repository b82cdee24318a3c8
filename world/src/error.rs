//! Errors raised while building terrain from map definitions.

use thiserror::Error;

/// Reasons a map definition or tile map cannot be constructed.
#[derive(Debug, Error)]
pub enum MapError {
    /// The TOML document could not be parsed.
    #[error("could not parse map definition: {0}")]
    Parse(#[from] toml::de::Error),
    /// The document declares a format version this crate does not understand.
    #[error("map version {found} is not supported; expected {expected}")]
    UnsupportedVersion {
        /// Version found in the document.
        found: u32,
        /// Version this crate reads.
        expected: u32,
    },
    /// Width, height or tile size is zero.
    #[error("map dimensions and tile size must be non-zero")]
    EmptyDimensions,
    /// No layer carries the ground layer name.
    #[error("map has no layer named `{0}`")]
    MissingGroundLayer(String),
    /// A layer does not hold exactly one tile slot per cell.
    #[error("layer `{layer}` holds {found} tiles but the map has {expected} cells")]
    LayerSize {
        /// Name of the offending layer.
        layer: String,
        /// Number of cells in the map.
        expected: usize,
        /// Number of tile slots in the layer.
        found: usize,
    },
    /// A layer lists a different number of rows than the map height.
    #[error("layer `{layer}` has {found} rows; expected {expected}")]
    RowCount {
        /// Name of the offending layer.
        layer: String,
        /// Map height.
        expected: usize,
        /// Rows listed in the layer.
        found: usize,
    },
    /// A layer row is wider or narrower than the map.
    #[error("row {row} of layer `{layer}` has {found} columns; expected {expected}")]
    RowWidth {
        /// Name of the offending layer.
        layer: String,
        /// Zero-based row index.
        row: usize,
        /// Map width.
        expected: usize,
        /// Characters in the row.
        found: usize,
    },
    /// A legend key is not exactly one character long.
    #[error("legend key `{key}` of layer `{layer}` must be a single character")]
    InvalidLegendKey {
        /// Name of the offending layer.
        layer: String,
        /// Offending key.
        key: String,
    },
    /// A row uses a character the layer legend does not define.
    #[error("layer `{layer}` uses character `{character}` missing from its legend")]
    UnknownLegendCharacter {
        /// Name of the offending layer.
        layer: String,
        /// Undefined character.
        character: char,
    },
    /// A layer references a tile index absent from the tileset.
    #[error("layer `{layer}` references unknown tile index {index}")]
    UnknownTile {
        /// Name of the offending layer.
        layer: String,
        /// Unknown tile index.
        index: u32,
    },
    /// The tileset declares the same index twice.
    #[error("tile index {0} is declared more than once")]
    DuplicateTile(u32),
    /// Tile index zero is reserved for "no tile".
    #[error("tile index 0 is reserved for empty cells")]
    ReservedTileIndex,
    /// A tile template carries a cost outside the permitted range.
    #[error("tile index {index} has cost {cost} outside 1..=20")]
    CostOutOfRange {
        /// Tile index of the template.
        index: u32,
        /// Offending cost.
        cost: i32,
    },
    /// A ground layer tile has no cost annotation.
    #[error("ground tile {index} at ({x},{y}) has no cost")]
    MissingGroundCost {
        /// Tile index placed on the ground layer.
        index: u32,
        /// Column of the cell.
        x: i32,
        /// Row of the cell.
        y: i32,
    },
    /// The spawn cell lies outside the map.
    #[error("spawn ({x},{y}) lies outside the map")]
    SpawnOutOfBounds {
        /// Column of the spawn cell.
        x: i32,
        /// Row of the spawn cell.
        y: i32,
    },
}
