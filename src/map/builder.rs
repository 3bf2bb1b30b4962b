//! Map construction and tile queries.

use crate::constants::{house, MapTile};
use crate::map::parser::MapTileParser;
use bevy_ecs::resource::Resource;
use bitflags::bitflags;
use glam::IVec2;
use tracing::debug;

use crate::error::{GameResult, MapError};

/// Traversal class of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Passable,
    Gate,
}

bitflags! {
    /// Who is asking to move through a tile.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TraversalFlags: u8 {
        const PLAYER = 1 << 0;
        const GHOST = 1 << 1;
    }
}

/// The static maze: tile classification, spawn marker, and the initial item layout.
#[derive(Resource, Debug, Clone)]
pub struct Map {
    width: i32,
    height: i32,
    /// Row-major board content.
    tiles: Vec<MapTile>,
    /// Where the player starts each round.
    pub player_start: IVec2,
}

impl Map {
    /// Creates a new `Map` instance from a raw board layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout fails to parse or has no player start marker.
    pub fn new(raw_board: &[&str]) -> GameResult<Map> {
        let parsed_map = MapTileParser::parse_board(raw_board)?;

        let player_start = parsed_map
            .player_start
            .ok_or_else(|| MapError::InvalidConfig("Player starting position not found".to_string()))?;

        let map = Map {
            width: parsed_map.width as i32,
            height: parsed_map.height as i32,
            tiles: parsed_map.tiles,
            player_start,
        };

        debug!(
            width = map.width,
            height = map.height,
            pellets = map.item_tiles(MapTile::Pellet).count(),
            power_pellets = map.item_tiles(MapTile::PowerPellet).count(),
            "Map built"
        );

        Ok(map)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Board content at a cell. The column wraps around the board; rows outside it are walls.
    pub fn map_tile(&self, cell: IVec2) -> MapTile {
        if cell.y < 0 || cell.y >= self.height {
            return MapTile::Wall;
        }
        let x = cell.x.rem_euclid(self.width);
        self.tiles[(cell.y * self.width + x) as usize]
    }

    /// Traversal class of the tile containing the continuous point `(x, y)`.
    pub fn tile_at(&self, x: f32, y: f32) -> Tile {
        self.tile(IVec2::new(x.floor() as i32, y.floor() as i32))
    }

    /// Traversal class of a cell.
    pub fn tile(&self, cell: IVec2) -> Tile {
        match self.map_tile(cell) {
            MapTile::Wall => Tile::Wall,
            MapTile::Gate => Tile::Gate,
            MapTile::Empty | MapTile::Pellet | MapTile::PowerPellet => Tile::Passable,
        }
    }

    /// Whether a mover may not enter `cell`.
    ///
    /// Gates only open to ghosts that are currently inside the house.
    pub fn is_blocked(&self, cell: IVec2, traversal: TraversalFlags, in_house: bool) -> bool {
        match self.tile(cell) {
            Tile::Wall => true,
            Tile::Gate => !(traversal.contains(TraversalFlags::GHOST) && in_house),
            Tile::Passable => false,
        }
    }

    /// Whether a cell lies within the ghost house region.
    pub fn in_house(cell: IVec2) -> bool {
        cell.cmpge(house::MIN).all() && cell.cmple(house::MAX).all()
    }

    /// Iterates the cells holding the given kind of item, row by row.
    pub fn item_tiles(&self, kind: MapTile) -> impl Iterator<Item = IVec2> + '_ {
        let width = self.width;
        self.tiles
            .iter()
            .enumerate()
            .filter(move |(_, tile)| **tile == kind)
            .map(move |(index, _)| IVec2::new(index as i32 % width, index as i32 / width))
    }
}
