//! Pathfinding goals and the per-tick [`Directive`].
//!
//! Goals describe *where* the external pathfinder should take the player;
//! the directive is the single instruction the farming core emits each tick.

use serde::{Deserialize, Serialize};

use crate::enums::PathingMode;
use crate::structs::Position;

/// A travel target for the external pathfinder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Goal {
    /// Get close enough to break the block at this position.
    Break(Position),
    /// Stand with the player's feet in exactly this position.
    StandOn(Position),
    /// Reach any one of the contained goals.
    Composite(Vec<Goal>),
}

impl Goal {
    /// Whether a player whose feet are at `feet` satisfies this goal.
    ///
    /// A break goal accepts any position adjacent to the block, inside it,
    /// or below it, but never directly on top of it.
    pub fn is_in_goal(&self, feet: Position) -> bool {
        match self {
            Self::Break(target) => {
                if feet.y > target.y {
                    return false;
                }
                let dx = i64::from(feet.x).saturating_sub(i64::from(target.x));
                let mut dy = i64::from(feet.y).saturating_sub(i64::from(target.y));
                let dz = i64::from(feet.z).saturating_sub(i64::from(target.z));
                if dy < 0 {
                    dy = dy.saturating_add(1);
                }
                dx.abs().saturating_add(dy.abs()).saturating_add(dz.abs()) <= 1
            }
            Self::StandOn(target) => feet == *target,
            Self::Composite(goals) => goals.iter().any(|g| g.is_in_goal(feet)),
        }
    }

    /// Number of non-composite goals contained in this goal.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Break(_) | Self::StandOn(_) => 1,
            Self::Composite(goals) => goals.iter().map(Self::leaf_count).sum(),
        }
    }

    /// All non-composite goals in depth-first order.
    pub fn leaves(&self) -> Vec<&Self> {
        match self {
            Self::Break(_) | Self::StandOn(_) => vec![self],
            Self::Composite(goals) => goals.iter().flat_map(Self::leaves).collect(),
        }
    }
}

/// The single instruction emitted by the farming core each tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Directive {
    /// Hold still; any in-place interaction is driven through inputs.
    Pause,
    /// Replace the pathfinder's goal and path towards it.
    SetGoalAndPath(Goal),
}

impl Directive {
    /// The pathing mode this directive maps to.
    pub const fn mode(&self) -> PathingMode {
        match self {
            Self::Pause => PathingMode::RequestPause,
            Self::SetGoalAndPath(_) => PathingMode::SetGoalAndPath,
        }
    }

    /// The goal carried by this directive, if any.
    pub const fn goal(&self) -> Option<&Goal> {
        match self {
            Self::Pause => None,
            Self::SetGoalAndPath(goal) => Some(goal),
        }
    }

    /// Whether this directive is [`Directive::Pause`].
    pub const fn is_pause(&self) -> bool {
        matches!(self, Self::Pause)
    }
}
