//! Map parsing functionality for converting raw board layouts into structured data.

use crate::constants::MapTile;
use crate::error::ParseError;
use glam::IVec2;

/// Structured representation of a parsed board layout.
///
/// Tiles are stored row-major. Spawn markers are converted to `Empty` tiles while
/// their positions are tracked separately.
#[derive(Debug)]
pub struct ParsedMap {
    pub width: usize,
    pub height: usize,
    /// Row-major tile data, `width * height` long.
    pub tiles: Vec<MapTile>,
    /// Starting position for the player (marked by `P` in the layout).
    pub player_start: Option<IVec2>,
}

/// Parser for converting raw board layouts into structured map data.
pub struct MapTileParser;

impl MapTileParser {
    /// Converts a single layout character into its tile.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::UnknownCharacter` for any character outside the layout vocabulary.
    pub fn parse_character(c: char) -> Result<MapTile, ParseError> {
        match c {
            '1' => Ok(MapTile::Wall),
            '0' => Ok(MapTile::Pellet),
            '2' => Ok(MapTile::PowerPellet),
            '3' => Ok(MapTile::Empty),
            '4' => Ok(MapTile::Gate),
            // Spawn markers are walkable
            'G' | 'P' => Ok(MapTile::Empty),
            _ => Err(ParseError::UnknownCharacter(c)),
        }
    }

    /// Parses a raw board layout into structured map data.
    ///
    /// # Errors
    ///
    /// Returns an error if the board is empty, if rows differ in width, if it
    /// contains unknown characters, or if it marks more than one player start.
    pub fn parse_board(raw_board: &[&str]) -> Result<ParsedMap, ParseError> {
        let width = raw_board
            .first()
            .map(|row| row.chars().count())
            .ok_or_else(|| ParseError::ParseFailed("Board has no rows".to_string()))?;
        if width == 0 {
            return Err(ParseError::ParseFailed("Board has zero width".to_string()));
        }

        let mut tiles = Vec::with_capacity(width * raw_board.len());
        let mut player_start: Option<IVec2> = None;

        for (y, line) in raw_board.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(ParseError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }

            for (x, character) in line.chars().enumerate() {
                tiles.push(Self::parse_character(character)?);
                if character == 'P' {
                    if let Some(first) = player_start {
                        return Err(ParseError::DuplicatePlayerStart {
                            first: (first.x as usize, first.y as usize),
                            second: (x, y),
                        });
                    }
                    player_start = Some(IVec2::new(x as i32, y as i32));
                }
            }
        }

        Ok(ParsedMap {
            width,
            height: raw_board.len(),
            tiles,
            player_start,
        })
    }
}
