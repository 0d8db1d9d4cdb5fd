use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use super::board::{Board, Coord, BOARD_SIZE};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MineKind {
    ScoreSplit,
    ScoreTransfer,
    LetterLoss,
    MultiplierBlock,
    WordCancel,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RewardKind {
    RegionBan,
    LetterBan,
    ExtraMove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", content = "kind", rename_all = "snake_case")]
pub enum Hazard {
    Mine(MineKind),
    Reward(RewardKind),
}

/// How many instances of each hazard kind a new board receives.
#[derive(Debug, Clone, PartialEq)]
pub struct HazardConfig {
    pub mines: Vec<(MineKind, usize)>,
    pub rewards: Vec<(RewardKind, usize)>,
}

impl HazardConfig {
    fn mine_pool(&self) -> Vec<MineKind> {
        self.mines
            .iter()
            .flat_map(|(kind, count)| std::iter::repeat(*kind).take(*count))
            .collect()
    }

    fn reward_pool(&self) -> Vec<RewardKind> {
        self.rewards
            .iter()
            .flat_map(|(kind, count)| std::iter::repeat(*kind).take(*count))
            .collect()
    }
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            mines: vec![
                (MineKind::ScoreSplit, 5),
                (MineKind::ScoreTransfer, 4),
                (MineKind::LetterLoss, 3),
                (MineKind::MultiplierBlock, 2),
                (MineKind::WordCancel, 2),
            ],
            rewards: vec![
                (RewardKind::RegionBan, 2),
                (RewardKind::LetterBan, 3),
                (RewardKind::ExtraMove, 2),
            ],
        }
    }
}

/// Hidden hazards, one optional slot per board cell. Never sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HazardGrid {
    cells: Vec<Option<Hazard>>,
}

impl HazardGrid {
    pub fn empty() -> Self {
        Self {
            cells: vec![None; BOARD_SIZE * BOARD_SIZE],
        }
    }

    pub fn get(&self, coord: Coord) -> Option<Hazard> {
        self.cells[coord.index()]
    }

    pub fn set(&mut self, coord: Coord, hazard: Hazard) {
        self.cells[coord.index()] = Some(hazard);
    }

    /// Removes and returns the hazard under `coord`; a hazard fires once.
    pub fn take(&mut self, coord: Coord) -> Option<Hazard> {
        self.cells[coord.index()].take()
    }

    pub fn count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

impl Default for HazardGrid {
    fn default() -> Self {
        Self::empty()
    }
}

/// Seeds hazards on free cells (no letter, no bonus). Mines are dealt
/// first, rewards take whatever sampled cells remain.
pub fn assign_hazards<R: Rng + ?Sized>(board: &Board, config: &HazardConfig, rng: &mut R) -> HazardGrid {
    let mut mines = config.mine_pool();
    let mut rewards = config.reward_pool();
    mines.shuffle(rng);
    rewards.shuffle(rng);

    let mut free: Vec<Coord> = Board::coords()
        .filter(|c| {
            let cell = board.cell(*c);
            cell.is_empty() && cell.bonus.is_none()
        })
        .collect();
    free.shuffle(rng);
    free.truncate(mines.len() + rewards.len());

    let mine_slots = mines.len().min(free.len());
    let (mine_cells, reward_cells) = free.split_at(mine_slots);

    let mut grid = HazardGrid::empty();
    for (coord, kind) in mine_cells.iter().zip(mines) {
        grid.set(*coord, Hazard::Mine(kind));
    }
    for (coord, kind) in reward_cells.iter().zip(rewards) {
        grid.set(*coord, Hazard::Reward(kind));
    }
    grid
}
