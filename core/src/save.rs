use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::time::Duration;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Bumped whenever [`SaveRecord`] changes shape.
pub const SAVE_FORMAT_VERSION: u32 = 1;

/// Stored form of one area.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaRecord {
    pub index: AreaIndex,
    pub cover: CoverState,
    pub is_mine: bool,
    pub neighbor_mine_count: u8,
    pub opened_order: Option<u32>,
}

impl From<&Area> for AreaRecord {
    fn from(area: &Area) -> Self {
        Self {
            index: area.index,
            cover: area.cover,
            is_mine: area.is_mine,
            neighbor_mine_count: area.neighbor_mine_count,
            opened_order: area.opened_order,
        }
    }
}

/// Complete, self-describing snapshot of a game, areas in row-major order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub version: u32,
    pub config: MinefieldConfig,
    pub areas: Vec<AreaRecord>,
    pub status: GameStatus,
    pub elapsed_time: Duration,
    pub flag_count: CellCount,
    pub may_require_guess: bool,
    pub triggered_mine: Option<AreaIndex>,
}

impl SaveRecord {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("save record should encode as json")
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|err| {
            log::warn!("failed to decode save record: {err}");
            SaveCorruption::Malformed.into()
        })
    }
}

pub fn serialize(board: &BoardState) -> SaveRecord {
    SaveRecord {
        version: SAVE_FORMAT_VERSION,
        config: *board.config(),
        areas: board.areas().map(AreaRecord::from).collect(),
        status: board.status(),
        elapsed_time: board.elapsed_time(),
        flag_count: board.flag_count(),
        may_require_guess: board.may_require_guess(),
        triggered_mine: board.triggered_mine(),
    }
}

/// Rebuilds a board from `record`, checking it is a state the game could have reached.
///
/// Either the whole board is restored or nothing is.
pub fn restore(record: &SaveRecord) -> Result<BoardState> {
    if record.version != SAVE_FORMAT_VERSION {
        return Err(SaveCorruption::UnsupportedVersion(record.version).into());
    }
    let config = record.config;
    if config.validate().is_err() {
        return Err(SaveCorruption::InvalidConfig.into());
    }
    if config.seed.is_none() {
        return Err(SaveCorruption::MissingSeed.into());
    }

    let geometry = config.geometry();
    let total = geometry.total_cells();
    if record.areas.len() != total as usize {
        return Err(SaveCorruption::DimensionMismatch {
            expected: total,
            found: record.areas.len(),
        }
        .into());
    }
    if let Some((position, area)) = record
        .areas
        .iter()
        .enumerate()
        .find(|(position, area)| area.index != *position)
    {
        return Err(SaveCorruption::MisplacedArea {
            position,
            index: area.index,
        }
        .into());
    }

    check_mines(record, geometry)?;
    check_flags(record)?;
    check_opened_order(record)?;
    check_status(record)?;

    let width = usize::from(config.width);
    let areas = Array2::from_shape_fn(geometry.nd_shape(), |(y, x)| {
        let stored = &record.areas[y * width + x];
        Area {
            index: stored.index,
            is_mine: stored.is_mine,
            neighbor_mine_count: stored.neighbor_mine_count,
            cover: stored.cover,
            opened_order: stored.opened_order,
        }
    });

    let board = BoardState::from_parts(
        config,
        areas,
        record.status,
        record.elapsed_time,
        record.triggered_mine,
        record.may_require_guess,
    );
    log::debug!(
        "restored {:?} board with {} open areas",
        board.status(),
        board.open_count()
    );
    Ok(board)
}

fn check_mines(record: &SaveRecord, geometry: Geometry) -> Result<()> {
    let found = record.areas.iter().filter(|area| area.is_mine).count() as CellCount;
    let expected = if record.status.is_pending() {
        0
    } else {
        record.config.mine_count
    };
    if found != expected {
        return Err(SaveCorruption::MineCountMismatch { expected, found }.into());
    }

    for area in &record.areas {
        let count = geometry
            .iter_neighbors(area.index)
            .filter(|&neighbor| record.areas[neighbor].is_mine)
            .count();
        if usize::from(area.neighbor_mine_count) != count {
            return Err(SaveCorruption::NeighborCountMismatch(area.index).into());
        }
    }
    Ok(())
}

fn check_flags(record: &SaveRecord) -> Result<()> {
    let found = record
        .areas
        .iter()
        .filter(|area| area.cover.is_flagged())
        .count() as CellCount;
    if found != record.flag_count {
        return Err(SaveCorruption::FlagCountMismatch {
            expected: record.flag_count,
            found,
        }
        .into());
    }
    Ok(())
}

/// Open areas carry the orders `0..open` exactly once, covered areas carry none.
fn check_opened_order(record: &SaveRecord) -> Result<()> {
    let opened = record
        .areas
        .iter()
        .filter(|area| area.cover.is_open())
        .count();
    let mut seen = vec![false; opened];

    for area in &record.areas {
        match (area.cover.is_open(), area.opened_order) {
            (true, Some(order)) => {
                let slot = seen
                    .get_mut(order as usize)
                    .ok_or(SaveCorruption::InvalidOpenedOrder(area.index))?;
                if *slot {
                    return Err(SaveCorruption::InvalidOpenedOrder(area.index).into());
                }
                *slot = true;
            }
            (false, None) => {}
            _ => return Err(SaveCorruption::InvalidOpenedOrder(area.index).into()),
        }
    }
    Ok(())
}

fn check_status(record: &SaveRecord) -> Result<()> {
    let open_mines: Vec<AreaIndex> = record
        .areas
        .iter()
        .filter(|area| area.is_mine && area.cover.is_open())
        .map(|area| area.index)
        .collect();
    let open_safe = record
        .areas
        .iter()
        .filter(|area| !area.is_mine && area.cover.is_open())
        .count() as CellCount;
    let cleared = open_safe == record.config.safe_cell_count();

    let consistent = match record.status {
        GameStatus::Pending => open_safe == 0 && record.triggered_mine.is_none(),
        GameStatus::Running => {
            open_mines.is_empty() && record.triggered_mine.is_none() && !cleared
        }
        GameStatus::Victory => open_mines.is_empty() && record.triggered_mine.is_none() && cleared,
        GameStatus::Defeat => {
            open_mines.len() == 1 && record.triggered_mine == open_mines.first().copied()
        }
    };
    if !consistent || (record.status.is_pending() && record.elapsed_time != Duration::ZERO) {
        return Err(SaveCorruption::StatusMismatch.into());
    }
    Ok(())
}
