use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// What a player can see of a board: opened numbers, flags and optionally the total mine count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub geometry: Geometry,
    pub mine_count: Option<CellCount>,
    pub revealed: Array2<Option<u8>>,
    pub flags: Array2<bool>,
}

impl Observation {
    pub fn new(
        geometry: Geometry,
        mine_count: Option<CellCount>,
        revealed: Array2<Option<u8>>,
        flags: Array2<bool>,
    ) -> Result<Self> {
        let obs = Self {
            geometry,
            mine_count,
            revealed,
            flags,
        };
        obs.validate()?;
        Ok(obs)
    }

    pub fn from_board(board: &BoardState) -> Self {
        Self::from_board_with_mine_count(board, Some(board.config().mine_count))
    }

    pub fn from_board_with_mine_count(board: &BoardState, mine_count: Option<CellCount>) -> Self {
        let geometry = board.geometry();
        let mut revealed = Array2::from_elem(geometry.nd_shape(), None);
        let mut flags = Array2::from_elem(geometry.nd_shape(), false);

        for area in board.areas() {
            let nd_index = geometry.nd_index(area.index);
            match area.cover {
                CoverState::Covered | CoverState::Questioned => {}
                CoverState::Open => revealed[nd_index] = area.clue(),
                CoverState::Flagged => flags[nd_index] = true,
            }
        }

        Self {
            geometry,
            mine_count,
            revealed,
            flags,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let expected = self.geometry.nd_shape();
        let expected = (expected[0], expected[1]);
        if self.revealed.dim() != expected || self.flags.dim() != expected {
            return Err(ConfigurationError::ShapeMismatch.into());
        }

        if let Some(mine_count) = self.mine_count {
            let total = self.geometry.total_cells();
            if mine_count > total {
                return Err(ConfigurationError::TooManyMines {
                    requested: mine_count,
                    fits: total,
                }
                .into());
            }
        }

        Ok(())
    }

    pub fn clue(&self, index: AreaIndex) -> Option<u8> {
        self.revealed[self.geometry.nd_index(index)]
    }

    pub fn is_revealed(&self, index: AreaIndex) -> bool {
        self.clue(index).is_some()
    }

    pub fn is_flagged(&self, index: AreaIndex) -> bool {
        self.flags[self.geometry.nd_index(index)]
    }

    /// Every area that is not revealed, flagged or not.
    pub fn covered(&self) -> impl Iterator<Item = AreaIndex> {
        (0..self.geometry.total_cells() as usize).filter(|&index| !self.is_revealed(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_board_maps_open_and_flagged_areas() {
        let config = MinefieldConfig::new(2, 2, 1).unwrap().with_seed(0);
        let mut board = BoardState::new(config);
        let layout = MineLayout::from_mine_indices(board.geometry(), &[0], 3).unwrap();
        board.arm(&layout);
        open_area(&mut board, 3);
        board.set_cover(0, CoverState::Flagged);
        board.set_cover(1, CoverState::Questioned);

        let obs = Observation::from_board(&board);

        assert_eq!(obs.mine_count, Some(1));
        assert_eq!(obs.clue(3), Some(1));
        assert!(obs.is_flagged(0));
        assert!(!obs.is_flagged(1));
        assert_eq!(obs.covered().count(), 3);
    }

    #[test]
    fn validate_rejects_shape_mismatch() {
        let obs = Observation {
            geometry: Geometry::new((2, 2), Topology::Square),
            mine_count: Some(1),
            revealed: Array2::from_elem([2, 2], None),
            flags: Array2::from_elem([1, 2], false),
        };

        assert_eq!(
            obs.validate(),
            Err(GameError::Configuration(ConfigurationError::ShapeMismatch))
        );
    }
}
