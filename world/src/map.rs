//! TOML map definitions supplied by the map-loading collaborator.
//!
//! A definition describes the tileset, the layers (as rows of legend
//! characters) and the agent spawn cell. Building a definition validates it
//! and yields a [`TileMap`] ready to back a [`crate::World`].
//!
//! ```toml
//! version = 1
//! tile_size = 48
//! width = 4
//! height = 2
//! spawn = [0, 0]
//!
//! [tileset]
//! cost_ramp = { first_index = 1, max_cost = 20 }
//! tiles = [{ index = 30, collides = true }]
//!
//! [[layers]]
//! name = "Ground"
//! rows = ["gggg", "gggg"]
//! legend = { g = 1 }
//!
//! [[layers]]
//! name = "Border"
//! rows = ["..#.", "...."]
//! legend = { "#" = 30 }
//! ```

use std::collections::BTreeMap;

use gridwalk_core::{GridCoord, DEFAULT_TILE_SIZE};
use serde::Deserialize;

use crate::{
    error::MapError,
    tilemap::{Layer, TileId, TileMap, Tileset},
};

/// Map format version understood by this crate.
pub const SUPPORTED_MAP_VERSION: u32 = 1;

/// Legend characters that always denote an empty slot.
const EMPTY_CHARACTERS: [char; 2] = ['.', ' '];

/// Parsed but not yet validated map document.
#[derive(Clone, Debug, Deserialize)]
pub struct MapDefinition {
    version: u32,
    #[serde(default = "default_tile_size")]
    tile_size: u32,
    width: u32,
    height: u32,
    spawn: [i32; 2],
    #[serde(default)]
    tileset: TilesetDefinition,
    layers: Vec<LayerDefinition>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct TilesetDefinition {
    #[serde(default)]
    cost_ramp: Option<CostRamp>,
    #[serde(default)]
    tiles: Vec<TileDefinition>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
struct CostRamp {
    first_index: u32,
    max_cost: i32,
}

#[derive(Clone, Copy, Debug, Deserialize)]
struct TileDefinition {
    index: u32,
    #[serde(default)]
    cost: Option<i32>,
    #[serde(default)]
    collides: bool,
}

#[derive(Clone, Debug, Deserialize)]
struct LayerDefinition {
    name: String,
    #[serde(default = "default_visible")]
    visible: bool,
    rows: Vec<String>,
    #[serde(default)]
    legend: BTreeMap<String, u32>,
}

fn default_tile_size() -> u32 {
    DEFAULT_TILE_SIZE
}

fn default_visible() -> bool {
    true
}

/// Validated terrain together with the agent's starting cell.
#[derive(Clone, Debug)]
pub struct LoadedMap {
    /// Terrain described by the definition.
    pub tile_map: TileMap,
    /// Cell the agent spawns in.
    pub spawn: GridCoord,
}

impl MapDefinition {
    /// Parses a TOML document without validating its contents.
    pub fn parse(contents: &str) -> Result<Self, MapError> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the definition and assembles the terrain it describes.
    pub fn build(self) -> Result<LoadedMap, MapError> {
        if self.version != SUPPORTED_MAP_VERSION {
            return Err(MapError::UnsupportedVersion {
                found: self.version,
                expected: SUPPORTED_MAP_VERSION,
            });
        }

        let mut tileset = Tileset::new();
        if let Some(ramp) = self.tileset.cost_ramp {
            tileset.extend_cost_ramp(ramp.first_index, ramp.max_cost)?;
        }
        for tile in &self.tileset.tiles {
            let _ = tileset.insert(tile.index, tile.cost, tile.collides)?;
        }

        let mut layers = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            layers.push(layer.decode(self.width, self.height)?);
        }

        let tile_map = TileMap::new(self.width, self.height, self.tile_size, tileset, layers)?;
        let spawn = GridCoord::new(self.spawn[0], self.spawn[1]);
        if !tile_map.contains(spawn) {
            return Err(MapError::SpawnOutOfBounds {
                x: spawn.x(),
                y: spawn.y(),
            });
        }

        Ok(LoadedMap { tile_map, spawn })
    }
}

impl LayerDefinition {
    fn decode(&self, width: u32, height: u32) -> Result<Layer, MapError> {
        let expected_rows = usize::try_from(height).unwrap_or(usize::MAX);
        let expected_columns = usize::try_from(width).unwrap_or(usize::MAX);
        if self.rows.len() != expected_rows {
            return Err(MapError::RowCount {
                layer: self.name.clone(),
                expected: expected_rows,
                found: self.rows.len(),
            });
        }

        let legend = self.legend()?;
        let mut tiles = Vec::with_capacity(expected_rows.saturating_mul(expected_columns));
        for (row_index, row) in self.rows.iter().enumerate() {
            let found = row.chars().count();
            if found != expected_columns {
                return Err(MapError::RowWidth {
                    layer: self.name.clone(),
                    row: row_index,
                    expected: expected_columns,
                    found,
                });
            }

            for character in row.chars() {
                if EMPTY_CHARACTERS.contains(&character) {
                    tiles.push(None);
                    continue;
                }
                let Some(index) = legend.get(&character) else {
                    return Err(MapError::UnknownLegendCharacter {
                        layer: self.name.clone(),
                        character,
                    });
                };
                tiles.push(TileId::new(*index));
            }
        }

        Ok(Layer::new(self.name.clone(), self.visible, tiles))
    }

    fn legend(&self) -> Result<BTreeMap<char, u32>, MapError> {
        let mut legend = BTreeMap::new();
        for (key, index) in &self.legend {
            let mut characters = key.chars();
            let (Some(character), None) = (characters.next(), characters.next()) else {
                return Err(MapError::InvalidLegendKey {
                    layer: self.name.clone(),
                    key: key.clone(),
                });
            };
            let _ = legend.insert(character, *index);
        }
        Ok(legend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridwalk_core::TerrainGrid;

    const SMALL_MAP: &str = r##"
        version = 1
        width = 4
        height = 2
        spawn = [0, 1]

        [tileset]
        cost_ramp = { first_index = 1, max_cost = 20 }
        tiles = [{ index = 30, collides = true }]

        [[layers]]
        name = "Ground"
        rows = ["gggh", "gggg"]
        legend = { g = 1, h = 5 }

        [[layers]]
        name = "Border"
        rows = ["..#.", "...."]
        legend = { "#" = 30 }
    "##;

    #[test]
    fn builds_layers_from_legend_rows() {
        let loaded = MapDefinition::parse(SMALL_MAP)
            .and_then(MapDefinition::build)
            .expect("map should load");
        let map = &loaded.tile_map;

        assert_eq!(loaded.spawn, GridCoord::new(0, 1));
        assert_eq!(map.tile_size(), 48);
        assert_eq!(map.cost_at(GridCoord::new(3, 0)), Some(5));
        assert!(map.is_blocking(GridCoord::new(2, 0)));
        assert!(!map.is_blocking(GridCoord::new(1, 0)));
    }

    #[test]
    fn rejects_rows_of_the_wrong_width() {
        let contents = SMALL_MAP.replace("\"gggg\"", "\"ggg\"");
        let result = MapDefinition::parse(&contents).and_then(MapDefinition::build);
        assert!(matches!(result, Err(MapError::RowWidth { row: 1, .. })));
    }

    #[test]
    fn rejects_unknown_legend_characters() {
        let contents = SMALL_MAP.replace("\"gggh\"", "\"gggz\"");
        let result = MapDefinition::parse(&contents).and_then(MapDefinition::build);
        assert!(matches!(
            result,
            Err(MapError::UnknownLegendCharacter { character: 'z', .. })
        ));
    }

    #[test]
    fn rejects_spawn_outside_the_map() {
        let contents = SMALL_MAP.replace("spawn = [0, 1]", "spawn = [4, 1]");
        let result = MapDefinition::parse(&contents).and_then(MapDefinition::build);
        assert!(matches!(
            result,
            Err(MapError::SpawnOutOfBounds { x: 4, y: 1 })
        ));
    }

    #[test]
    fn rejects_unsupported_versions() {
        let contents = SMALL_MAP.replace("version = 1", "version = 2");
        let result = MapDefinition::parse(&contents).and_then(MapDefinition::build);
        assert!(matches!(
            result,
            Err(MapError::UnsupportedVersion { found: 2, .. })
        ));
    }

    #[test]
    fn reports_missing_ground_layer() {
        let contents = SMALL_MAP.replace("name = \"Ground\"", "name = \"Floor\"");
        let result = MapDefinition::parse(&contents).and_then(MapDefinition::build);
        assert!(matches!(result, Err(MapError::MissingGroundLayer(_))));
    }

    #[test]
    fn reports_malformed_toml() {
        assert!(matches!(
            MapDefinition::parse("version = "),
            Err(MapError::Parse(_))
        ));
    }
}
