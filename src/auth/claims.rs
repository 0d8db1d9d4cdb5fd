use serde::{Deserialize, Serialize};

/// JWT claims. `sub` is the player identity used throughout the game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}
