use core::time::Duration;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - Pending -> Running, when mines are placed on the first open
/// - Pending -> Victory, when the first open clears the board
/// - Running -> Victory
/// - Running -> Defeat
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Mines are not placed yet
    #[default]
    Pending,
    Running,
    Victory,
    Defeat,
}

impl GameStatus {
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Victory | Self::Defeat)
    }
}

/// Summary of a finished (or ongoing) game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Flags placed on true mines.
    pub right_mines: CellCount,
    pub total_mines: CellCount,
    pub total_area: CellCount,
    pub time: Duration,
}

/// The grid and session metadata, the single mutable source of truth of a game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardState {
    config: MinefieldConfig,
    areas: Array2<Area>,
    status: GameStatus,
    elapsed_time: Duration,
    flag_count: CellCount,
    open_count: CellCount,
    triggered_mine: Option<AreaIndex>,
    may_require_guess: bool,
}

impl BoardState {
    /// Creates a pending board, `config` is expected to be validated.
    ///
    /// A missing seed is drawn here, so the board always records the seed its mines come from.
    pub fn new(config: MinefieldConfig) -> Self {
        let config = config.resolved();
        let geometry = config.geometry();
        let width = usize::from(config.width);
        let areas = Array2::from_shape_fn(geometry.nd_shape(), |(y, x)| Area::new(y * width + x));
        Self {
            config,
            areas,
            status: GameStatus::Pending,
            elapsed_time: Duration::ZERO,
            flag_count: 0,
            open_count: 0,
            triggered_mine: None,
            may_require_guess: false,
        }
    }

    pub(crate) fn from_parts(
        config: MinefieldConfig,
        areas: Array2<Area>,
        status: GameStatus,
        elapsed_time: Duration,
        triggered_mine: Option<AreaIndex>,
        may_require_guess: bool,
    ) -> Self {
        let flag_count = areas.iter().filter(|area| area.is_flagged()).count() as CellCount;
        let open_count = areas
            .iter()
            .filter(|area| area.is_open() && !area.is_mine)
            .count() as CellCount;
        Self {
            config,
            areas,
            status,
            elapsed_time,
            flag_count,
            open_count,
            triggered_mine,
            may_require_guess,
        }
    }

    pub fn config(&self) -> &MinefieldConfig {
        &self.config
    }

    pub fn geometry(&self) -> Geometry {
        self.config.geometry()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    pub fn elapsed_time(&self) -> Duration {
        self.elapsed_time
    }

    pub fn flag_count(&self) -> CellCount {
        self.flag_count
    }

    /// Safe areas opened so far.
    pub fn open_count(&self) -> CellCount {
        self.open_count
    }

    /// How many mines have not been flagged yet, negative when over-flagged.
    pub fn mines_left(&self) -> i64 {
        i64::from(self.config.mine_count) - i64::from(self.flag_count)
    }

    pub fn triggered_mine(&self) -> Option<AreaIndex> {
        self.triggered_mine
    }

    /// Set when generation gave up on the no-guess guarantee.
    pub fn may_require_guess(&self) -> bool {
        self.may_require_guess
    }

    pub fn area(&self, index: AreaIndex) -> Option<&Area> {
        if self.geometry().contains(index) {
            Some(&self.areas[self.geometry().nd_index(index)])
        } else {
            None
        }
    }

    pub fn area_at(&self, coords: Coord2) -> Option<&Area> {
        self.geometry()
            .index_of(coords)
            .map(|index| &self.areas[self.geometry().nd_index(index)])
    }

    pub fn areas(&self) -> impl Iterator<Item = &Area> {
        self.areas.iter()
    }

    pub fn iter_neighbors(&self, index: AreaIndex) -> NeighborIter {
        self.geometry().iter_neighbors(index)
    }

    /// Every non-mine area is open.
    pub fn is_cleared(&self) -> bool {
        !self.status.is_pending() && self.open_count == self.config.safe_cell_count()
    }

    pub fn score(&self) -> Score {
        let right_mines = self
            .areas
            .iter()
            .filter(|area| area.is_mine && area.is_flagged())
            .count() as CellCount;
        Score {
            right_mines,
            total_mines: self.config.mine_count,
            total_area: self.config.total_cells(),
            time: self.elapsed_time,
        }
    }

    pub fn validate_index(&self, index: AreaIndex) -> Result<AreaIndex> {
        if self.geometry().contains(index) {
            Ok(index)
        } else {
            Err(InvalidAction::OutOfRange {
                index,
                total: self.config.total_cells(),
            }
            .into())
        }
    }

    pub(crate) fn check_not_finished(&self) -> Result<()> {
        if self.status.is_finished() {
            Err(GameError::SessionFinished)
        } else {
            Ok(())
        }
    }

    pub(crate) fn cover_at(&self, index: AreaIndex) -> CoverState {
        self.areas[self.geometry().nd_index(index)].cover
    }

    pub(crate) fn area_mut(&mut self, index: AreaIndex) -> &mut Area {
        let nd_index = self.geometry().nd_index(index);
        &mut self.areas[nd_index]
    }

    pub(crate) fn count_flagged_neighbors(&self, index: AreaIndex) -> u8 {
        self.iter_neighbors(index)
            .filter(|&pos| self.cover_at(pos).is_flagged())
            .count() as u8
    }

    pub(crate) fn count_unrevealed_neighbors(&self, index: AreaIndex) -> u8 {
        self.iter_neighbors(index)
            .filter(|&pos| self.cover_at(pos).is_unrevealed())
            .count() as u8
    }

    /// Changes the cover of an unrevealed area, keeping `flag_count` in sync.
    pub(crate) fn set_cover(&mut self, index: AreaIndex, cover: CoverState) {
        let previous = self.cover_at(index);
        debug_assert!(!previous.is_open() && !cover.is_open());
        match (previous.is_flagged(), cover.is_flagged()) {
            (false, true) => self.flag_count += 1,
            (true, false) => self.flag_count -= 1,
            _ => {}
        }
        self.area_mut(index).cover = cover;
    }

    /// Places the mines of `layout` and computes every neighbor count.
    pub(crate) fn arm(&mut self, layout: &MineLayout) {
        debug_assert!(self.status.is_pending());
        let geometry = self.geometry();
        for index in 0..geometry.total_cells() as usize {
            let is_mine = layout.contains_mine(index);
            let count = layout.adjacent_mine_count(index);
            let area = self.area_mut(index);
            area.is_mine = is_mine;
            area.neighbor_mine_count = count;
        }
        self.may_require_guess = layout.may_require_guess();
        self.status = GameStatus::Running;
        log::debug!(
            "armed {}x{} board with {} mines, seed {:#018x}",
            geometry.width(),
            geometry.height(),
            layout.mine_count(),
            layout.seed()
        );
    }

    /// Marks an area open and assigns its opened order, returning the area after the change.
    pub(crate) fn mark_open(&mut self, index: AreaIndex) -> Area {
        let order = self.open_count + u32::from(self.triggered_mine.is_some());
        let area = self.area_mut(index);
        debug_assert!(!area.is_open());
        area.cover = CoverState::Open;
        area.opened_order = Some(order);
        let area = *area;
        if !area.is_mine {
            self.open_count += 1;
        }
        area
    }

    pub(crate) fn trigger_mine(&mut self, index: AreaIndex) {
        self.mark_open(index);
        self.triggered_mine = Some(index);
        self.end_game(false);
    }

    pub(crate) fn end_game(&mut self, won: bool) {
        if self.status.is_finished() {
            return;
        }

        self.status = if won {
            GameStatus::Victory
        } else {
            GameStatus::Defeat
        };

        if won {
            // every remaining mine is known at this point
            for index in 0..self.geometry().total_cells() as usize {
                let area = self.areas[self.geometry().nd_index(index)];
                if area.is_mine && !area.is_flagged() {
                    self.set_cover(index, CoverState::Flagged);
                }
            }
        }

        log::debug!(
            "game ended ({:?}) after {:?}, {} of {} safe areas open",
            self.status,
            self.elapsed_time,
            self.open_count,
            self.config.safe_cell_count()
        );
    }

    pub(crate) fn advance_time(&mut self, delta: Duration) {
        if matches!(self.status, GameStatus::Running) {
            self.elapsed_time = self.elapsed_time.saturating_add(delta);
        }
    }
}
