//! Layered tile map and the typed adapter that exposes it as terrain.

use std::collections::BTreeMap;

use gridwalk_core::{GridCoord, TerrainGrid, MAX_COST, MIN_COST};

use crate::error::MapError;

/// Name of the layer whose tiles carry cost annotations.
pub const GROUND_LAYER: &str = "Ground";

/// Index of a tile template within the tileset. Zero is reserved for "no tile".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(u32);

impl TileId {
    /// Creates a tile identifier, returning `None` for the reserved index zero.
    #[must_use]
    pub const fn new(index: u32) -> Option<Self> {
        if index == 0 {
            None
        } else {
            Some(Self(index))
        }
    }

    /// Numeric tile index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Properties attached to a tile template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileTemplate {
    /// Identifier of the template.
    pub id: TileId,
    /// Traversal cost annotation, if the tile carries one.
    pub cost: Option<i32>,
    /// Whether the tile prevents the agent from entering its cell.
    pub collides: bool,
}

/// Catalogue of tile templates keyed by index.
#[derive(Clone, Debug, Default)]
pub struct Tileset {
    templates: BTreeMap<TileId, TileTemplate>,
}

impl Tileset {
    /// Creates an empty tileset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tileset holding one passable template for every cost in `1..=max_cost`.
    ///
    /// The template for cost `c` receives index `first_index + c - 1`.
    pub fn with_cost_ramp(first_index: u32, max_cost: i32) -> Result<Self, MapError> {
        let mut tileset = Self::new();
        tileset.extend_cost_ramp(first_index, max_cost)?;
        Ok(tileset)
    }

    /// Adds one passable template for every cost in `1..=max_cost`.
    pub fn extend_cost_ramp(&mut self, first_index: u32, max_cost: i32) -> Result<(), MapError> {
        for cost in MIN_COST..=max_cost {
            let offset = u32::try_from(cost - MIN_COST).unwrap_or(0);
            let index = first_index.saturating_add(offset);
            let _ = self.insert(index, Some(cost), false)?;
        }
        Ok(())
    }

    /// Registers a template, rejecting reserved or duplicate indices and invalid costs.
    pub fn insert(
        &mut self,
        index: u32,
        cost: Option<i32>,
        collides: bool,
    ) -> Result<TileId, MapError> {
        let id = TileId::new(index).ok_or(MapError::ReservedTileIndex)?;
        if let Some(cost) = cost {
            if !(MIN_COST..=MAX_COST).contains(&cost) {
                return Err(MapError::CostOutOfRange { index, cost });
            }
        }
        if self.templates.contains_key(&id) {
            return Err(MapError::DuplicateTile(index));
        }
        let _ = self.templates.insert(id, TileTemplate { id, cost, collides });
        Ok(id)
    }

    /// Looks up a template by identifier.
    #[must_use]
    pub fn get(&self, id: TileId) -> Option<&TileTemplate> {
        self.templates.get(&id)
    }

    /// Lowest-indexed passable template whose cost annotation equals `cost`.
    #[must_use]
    pub fn template_with_cost(&self, cost: i32) -> Option<TileId> {
        self.templates
            .values()
            .find(|template| !template.collides && template.cost == Some(cost))
            .map(|template| template.id)
    }

    /// Number of templates in the tileset.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Reports whether the tileset holds no templates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Named grid of optional tiles with a visibility flag.
#[derive(Clone, Debug)]
pub struct Layer {
    name: String,
    visible: bool,
    tiles: Vec<Option<TileId>>,
}

impl Layer {
    /// Creates a layer from row-major tile slots.
    #[must_use]
    pub fn new(name: impl Into<String>, visible: bool, tiles: Vec<Option<TileId>>) -> Self {
        Self {
            name: name.into(),
            visible,
            tiles,
        }
    }

    /// Creates a visible layer with every slot holding the same tile.
    #[must_use]
    pub fn filled(name: impl Into<String>, width: u32, height: u32, tile: Option<TileId>) -> Self {
        let cells = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        Self::new(name, true, vec![tile; cells])
    }
}

/// Authoritative layered tile map.
#[derive(Clone, Debug)]
pub struct TileMap {
    width: u32,
    height: u32,
    tile_size: u32,
    tileset: Tileset,
    layers: Vec<Layer>,
    ground: usize,
}

impl TileMap {
    /// Assembles a tile map, validating layer sizes and ground costs.
    pub fn new(
        width: u32,
        height: u32,
        tile_size: u32,
        tileset: Tileset,
        layers: Vec<Layer>,
    ) -> Result<Self, MapError> {
        if width == 0 || height == 0 || tile_size == 0 {
            return Err(MapError::EmptyDimensions);
        }

        let expected = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        for layer in &layers {
            if layer.tiles.len() != expected {
                return Err(MapError::LayerSize {
                    layer: layer.name.clone(),
                    expected,
                    found: layer.tiles.len(),
                });
            }
            if let Some(unknown) = layer
                .tiles
                .iter()
                .flatten()
                .find(|id| tileset.get(**id).is_none())
            {
                return Err(MapError::UnknownTile {
                    layer: layer.name.clone(),
                    index: unknown.get(),
                });
            }
        }

        let ground = layers
            .iter()
            .position(|layer| layer.name == GROUND_LAYER)
            .ok_or_else(|| MapError::MissingGroundLayer(GROUND_LAYER.to_owned()))?;

        let map = Self {
            width,
            height,
            tile_size,
            tileset,
            layers,
            ground,
        };
        map.validate_ground_costs()?;
        Ok(map)
    }

    fn validate_ground_costs(&self) -> Result<(), MapError> {
        for cell in self.cells() {
            if let Some(template) = self.tile_at(self.ground, cell) {
                if template.cost.is_none() {
                    return Err(MapError::MissingGroundCost {
                        index: template.id.get(),
                        x: cell.x(),
                        y: cell.y(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Side length of a tile in pixels.
    #[must_use]
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Tileset backing the map.
    #[must_use]
    pub fn tileset(&self) -> &Tileset {
        &self.tileset
    }

    /// Reports whether the coordinate lies inside the map.
    #[must_use]
    pub fn contains(&self, cell: GridCoord) -> bool {
        self.index(cell).is_some()
    }

    /// Iterates every in-bounds coordinate in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = GridCoord> {
        let width = i32::try_from(self.width).unwrap_or(i32::MAX);
        let height = i32::try_from(self.height).unwrap_or(i32::MAX);
        (0..height).flat_map(move |y| (0..width).map(move |x| GridCoord::new(x, y)))
    }

    /// Template placed on the ground layer at the coordinate.
    #[must_use]
    pub fn ground_tile(&self, cell: GridCoord) -> Option<&TileTemplate> {
        self.tile_at(self.ground, cell)
    }

    /// Writes a tile onto the ground layer. Returns `false` when the cell is out of bounds.
    pub fn place_ground_tile(&mut self, cell: GridCoord, tile: TileId) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };
        match self
            .layers
            .get_mut(self.ground)
            .and_then(|layer| layer.tiles.get_mut(index))
        {
            Some(slot) => {
                *slot = Some(tile);
                true
            }
            None => false,
        }
    }

    fn tile_at(&self, layer: usize, cell: GridCoord) -> Option<&TileTemplate> {
        let index = self.index(cell)?;
        let id = self.layers.get(layer)?.tiles.get(index).copied().flatten()?;
        self.tileset.get(id)
    }

    fn index(&self, cell: GridCoord) -> Option<usize> {
        let column = u32::try_from(cell.x()).ok()?;
        let row = u32::try_from(cell.y()).ok()?;
        if column >= self.width || row >= self.height {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let row = usize::try_from(row).ok()?;
        let column = usize::try_from(column).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

impl TerrainGrid for TileMap {
    fn has_tile(&self, cell: GridCoord) -> bool {
        (0..self.layers.len()).any(|layer| self.tile_at(layer, cell).is_some())
    }

    fn is_blocking(&self, cell: GridCoord) -> bool {
        if !self.has_tile(cell) {
            return true;
        }
        self.layers
            .iter()
            .enumerate()
            .filter(|(_, layer)| layer.visible)
            .any(|(index, _)| {
                self.tile_at(index, cell)
                    .is_some_and(|template| template.collides)
            })
    }

    fn cost_at(&self, cell: GridCoord) -> Option<i32> {
        self.ground_tile(cell).and_then(|template| template.cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> TileMap {
        let mut tileset = Tileset::with_cost_ramp(1, 20).expect("ramp");
        let wall = tileset.insert(30, None, true).expect("wall");
        let ghost = tileset.insert(31, None, true).expect("ghost");
        let ground = Layer::filled(GROUND_LAYER, 3, 2, TileId::new(1));
        let mut walls = vec![None; 6];
        walls[1] = Some(wall);
        let mut hidden = vec![None; 6];
        hidden[2] = Some(ghost);
        TileMap::new(
            3,
            2,
            48,
            tileset,
            vec![
                ground,
                Layer::new("Border", true, walls),
                Layer::new("Secrets", false, hidden),
            ],
        )
        .expect("valid map")
    }

    #[test]
    fn cells_outside_the_map_are_blocking() {
        let map = sample_map();
        assert!(map.is_blocking(GridCoord::new(-1, 0)));
        assert!(map.is_blocking(GridCoord::new(3, 0)));
        assert!(!map.has_tile(GridCoord::new(0, 2)));
    }

    #[test]
    fn colliding_tile_on_visible_layer_blocks() {
        let map = sample_map();
        assert!(map.is_blocking(GridCoord::new(1, 0)));
        assert!(!map.is_blocking(GridCoord::new(0, 0)));
    }

    #[test]
    fn hidden_layers_do_not_collide() {
        let map = sample_map();
        assert!(!map.is_blocking(GridCoord::new(2, 0)));
    }

    #[test]
    fn cost_reads_the_ground_layer() {
        let mut map = sample_map();
        assert_eq!(map.cost_at(GridCoord::new(0, 1)), Some(1));
        let expensive = map.tileset().template_with_cost(7).expect("cost 7 template");
        assert!(map.place_ground_tile(GridCoord::new(0, 1), expensive));
        assert_eq!(map.cost_at(GridCoord::new(0, 1)), Some(7));
        assert_eq!(map.cost_at(GridCoord::new(9, 9)), None);
    }

    #[test]
    fn ground_tiles_must_carry_a_cost() {
        let mut tileset = Tileset::new();
        let bare = tileset.insert(5, None, false).expect("bare");
        let result = TileMap::new(
            1,
            1,
            48,
            tileset,
            vec![Layer::filled(GROUND_LAYER, 1, 1, Some(bare))],
        );
        assert!(matches!(result, Err(MapError::MissingGroundCost { .. })));
    }

    #[test]
    fn tileset_rejects_duplicates_and_bad_costs() {
        let mut tileset = Tileset::new();
        assert!(tileset.insert(1, Some(1), false).is_ok());
        assert!(matches!(
            tileset.insert(1, Some(2), false),
            Err(MapError::DuplicateTile(1))
        ));
        assert!(matches!(
            tileset.insert(2, Some(21), false),
            Err(MapError::CostOutOfRange { .. })
        ));
        assert!(matches!(
            tileset.insert(0, Some(1), false),
            Err(MapError::ReservedTileIndex)
        ));
    }
}
