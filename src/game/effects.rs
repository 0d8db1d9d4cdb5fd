use serde::{Deserialize, Serialize};

use super::board::Coord;
use super::hazards::{Hazard, HazardGrid, MineKind, RewardKind};

/// Order in which mine effects are folded into the move score. Later
/// entries see the score left by earlier ones.
const MINE_PRECEDENCE: [MineKind; 5] = [
    MineKind::MultiplierBlock,
    MineKind::ScoreSplit,
    MineKind::ScoreTransfer,
    MineKind::WordCancel,
    MineKind::LetterLoss,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggeredHazard {
    pub coord: Coord,
    pub hazard: Hazard,
    pub description: String,
}

/// Score-side state a mine handler may rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct ScoreState {
    score: u32,
    transferred: u32,
    lose_hand: bool,
}

impl MineKind {
    fn apply(&self, state: &mut ScoreState) -> String {
        match self {
            MineKind::MultiplierBlock => "Multiplier block triggered".to_string(),
            MineKind::ScoreSplit => {
                let before = state.score;
                // ceil(30%)
                state.score = (before * 3).div_ceil(10);
                format!("Score cut to 30% ({} -> {})", before, state.score)
            }
            MineKind::ScoreTransfer => {
                state.transferred += state.score;
                let moved = state.score;
                state.score = 0;
                format!("{} points go to the opponent", moved)
            }
            MineKind::WordCancel => {
                state.score = 0;
                "Move scores no points".to_string()
            }
            MineKind::LetterLoss => {
                state.lose_hand = true;
                "Whole hand is discarded at the end of the turn".to_string()
            }
        }
    }
}

impl RewardKind {
    fn description(&self) -> &'static str {
        match self {
            RewardKind::RegionBan => "Region ban added to inventory",
            RewardKind::LetterBan => "Letter ban added to inventory",
            RewardKind::ExtraMove => "Extra move granted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EffectOutcome {
    pub base_score: u32,
    /// Points the mover keeps.
    pub final_score: u32,
    /// Points credited to the opponent.
    pub transferred: u32,
    pub lose_hand: bool,
    pub extra_move: bool,
    /// Rewards that go to the mover's inventory.
    pub rewards: Vec<RewardKind>,
    pub triggered: Vec<TriggeredHazard>,
}

/// Consumes the hazards under `placed` and folds them into `score`.
/// Each mine kind applies once per move even if several of its cells fire.
pub fn resolve_effects(hazards: &mut HazardGrid, placed: &[Coord], score: u32) -> EffectOutcome {
    let hits: Vec<(Coord, Hazard)> = placed
        .iter()
        .filter_map(|coord| hazards.take(*coord).map(|hazard| (*coord, hazard)))
        .collect();

    let mut state = ScoreState {
        score,
        ..ScoreState::default()
    };
    let mut outcome = EffectOutcome {
        base_score: score,
        ..EffectOutcome::default()
    };

    for kind in MINE_PRECEDENCE {
        let cells: Vec<Coord> = hits
            .iter()
            .filter(|(_, hazard)| *hazard == Hazard::Mine(kind))
            .map(|(coord, _)| *coord)
            .collect();
        if cells.is_empty() {
            continue;
        }

        let description = kind.apply(&mut state);
        outcome.triggered.extend(cells.into_iter().map(|coord| TriggeredHazard {
            coord,
            hazard: Hazard::Mine(kind),
            description: description.clone(),
        }));
    }

    for (coord, hazard) in &hits {
        let Hazard::Reward(kind) = hazard else { continue };
        match kind {
            RewardKind::ExtraMove => outcome.extra_move = true,
            other => outcome.rewards.push(*other),
        }
        outcome.triggered.push(TriggeredHazard {
            coord: *coord,
            hazard: *hazard,
            description: kind.description().to_string(),
        });
    }

    outcome.final_score = state.score;
    outcome.transferred = state.transferred;
    outcome.lose_hand = state.lose_hand;
    outcome
}
