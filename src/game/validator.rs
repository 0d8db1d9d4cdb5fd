use std::collections::HashMap;
use std::ops::Range;

use super::board::{Board, Coord, CENTER};
use super::errors::GameError;
use super::letters::{fold_letter, is_alphabet_letter, Tile};

/// A tile as submitted by the client, before legality checks.
#[derive(Debug, Clone, PartialEq)]
pub struct TileDrop {
    pub coord: Coord,
    pub tile: Tile,
    /// Only meaningful for jokers.
    pub assigned: Option<String>,
}

/// A tile that passed the legality checks, with the letter it spells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedTile {
    pub coord: Coord,
    pub tile: Tile,
    pub letter: char,
}

/// Turns the raw request arrays into tile drops. Joker assignments are
/// keyed `"row,col"`.
pub fn parse_placement(
    positions: &[[i64; 2]],
    letters: &[String],
    joker_assignments: &HashMap<String, String>,
) -> Result<Vec<TileDrop>, GameError> {
    if positions.is_empty() || positions.len() != letters.len() {
        return Err(GameError::MismatchedPlacement);
    }

    positions
        .iter()
        .zip(letters)
        .map(|(&[row, col], raw)| {
            let coord = Coord::checked(row, col).ok_or(GameError::OutOfBounds(row, col))?;
            let tile = Tile::from_string(raw).map_err(|_| GameError::UnknownTile(raw.clone()))?;
            let assigned = if tile.is_joker() {
                joker_assignments.get(&format!("{},{}", row, col)).cloned()
            } else {
                None
            };
            Ok(TileDrop {
                coord,
                tile,
                assigned,
            })
        })
        .collect()
}

/// Every dropped tile must come out of the hand (as a multiset) and none
/// may be frozen.
pub fn check_hand(hand: &[Tile], frozen: &[Tile], drops: &[TileDrop]) -> Result<(), GameError> {
    let mut remaining = hand.to_vec();
    for drop in drops {
        let position = remaining
            .iter()
            .position(|t| *t == drop.tile)
            .ok_or(GameError::TileNotInHand(drop.tile))?;
        remaining.swap_remove(position);
    }

    if let Some(drop) = drops.iter().find(|d| frozen.contains(&d.tile)) {
        return Err(GameError::FrozenTile(drop.tile));
    }
    Ok(())
}

/// Positional legality, checked in order with the first failure winning:
/// free cells, region block, joker letters, straight line with no empty
/// cell between the new tiles, then the center/adjacency rule.
pub fn validate_placement(
    board: &Board,
    drops: &[TileDrop],
    blocked_columns: Option<Range<usize>>,
) -> Result<Vec<PlacedTile>, GameError> {
    let mut claimed: Vec<Coord> = Vec::with_capacity(drops.len());
    for drop in drops {
        if board.is_occupied(drop.coord) || claimed.contains(&drop.coord) {
            return Err(GameError::Occupied(drop.coord));
        }
        claimed.push(drop.coord);
    }

    if let Some(blocked) = &blocked_columns {
        if let Some(drop) = drops.iter().find(|d| blocked.contains(&d.coord.col)) {
            return Err(GameError::RegionBlocked(drop.coord));
        }
    }

    let placed = drops
        .iter()
        .map(|drop| {
            let letter = match drop.tile {
                Tile::Letter(c) => c,
                Tile::Joker => joker_letter(drop)?,
            };
            Ok(PlacedTile {
                coord: drop.coord,
                tile: drop.tile,
                letter,
            })
        })
        .collect::<Result<Vec<_>, GameError>>()?;

    if placed.len() > 1 {
        let first = placed[0].coord;
        let same_row = placed.iter().all(|p| p.coord.row == first.row);
        let same_col = placed.iter().all(|p| p.coord.col == first.col);
        if !same_row && !same_col {
            return Err(GameError::NotInLine);
        }
        if let Some(gap) = first_gap(board, &placed, same_row) {
            return Err(GameError::GapInPlacement(gap));
        }
    }

    if board.is_empty() {
        if !placed.iter().any(|p| p.coord == CENTER) {
            return Err(GameError::CenterNotCovered);
        }
    } else {
        let touches = placed
            .iter()
            .flat_map(|p| p.coord.orthogonal_neighbours())
            .any(|n| board.is_occupied(n));
        if !touches {
            return Err(GameError::NotConnected);
        }
    }

    Ok(placed)
}

/// First empty cell between the outermost new tiles of a line, if any.
fn first_gap(board: &Board, placed: &[PlacedTile], across: bool) -> Option<Coord> {
    let along = |c: Coord| if across { c.col } else { c.row };
    let start = placed.iter().map(|p| along(p.coord)).min()?;
    let end = placed.iter().map(|p| along(p.coord)).max()?;
    let fixed = placed[0].coord;

    (start..=end)
        .map(|i| {
            if across {
                Coord::new(fixed.row, i)
            } else {
                Coord::new(i, fixed.col)
            }
        })
        .find(|&c| !board.is_occupied(c) && !placed.iter().any(|p| p.coord == c))
}

fn joker_letter(drop: &TileDrop) -> Result<char, GameError> {
    let assigned = drop
        .assigned
        .as_deref()
        .ok_or(GameError::JokerUnassigned(drop.coord))?;

    let mut chars = assigned.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if is_alphabet_letter(fold_letter(c)) => Ok(fold_letter(c)),
        _ => Err(GameError::JokerUnassigned(drop.coord)),
    }
}
