use serde::{Deserialize, Serialize};

use crate::*;

/// Player-facing cover of an area.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoverState {
    #[default]
    Covered,
    Flagged,
    Questioned,
    Open,
}

impl CoverState {
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged)
    }

    pub const fn is_unrevealed(self) -> bool {
        !self.is_open()
    }

    /// Covered and not protected by a flag, so a cascade or a chord may open it.
    pub const fn is_openable(self) -> bool {
        matches!(self, Self::Covered | Self::Questioned)
    }
}

/// One cell of the board.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub index: AreaIndex,
    pub is_mine: bool,
    /// Only meaningful once mines are placed.
    pub neighbor_mine_count: u8,
    pub cover: CoverState,
    /// Sequence number assigned when the area was opened.
    pub opened_order: Option<u32>,
}

impl Area {
    pub const fn new(index: AreaIndex) -> Self {
        Self {
            index,
            is_mine: false,
            neighbor_mine_count: 0,
            cover: CoverState::Covered,
            opened_order: None,
        }
    }

    pub const fn is_open(&self) -> bool {
        self.cover.is_open()
    }

    pub const fn is_flagged(&self) -> bool {
        self.cover.is_flagged()
    }

    /// Number shown to the player, `None` while the area is not open.
    pub const fn clue(&self) -> Option<u8> {
        if self.cover.is_open() && !self.is_mine {
            Some(self.neighbor_mine_count)
        } else {
            None
        }
    }
}
