use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::ops::BitOr;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }
}

/// Used to merge outcomes when opening several areas at once.
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            (Won, _) => Won,
            (_, Won) => Won,
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// Summary of the layout placed by the first open.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub seed: u64,
    pub attempts: u32,
    pub may_require_guess: bool,
}

impl From<&MineLayout> for GenerationSummary {
    fn from(layout: &MineLayout) -> Self {
        Self {
            seed: layout.seed(),
            attempts: layout.attempts(),
            may_require_guess: layout.may_require_guess(),
        }
    }
}

/// Result of opening one area.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenResult {
    pub outcome: RevealOutcome,
    /// The requested area first, then every area the cascade opened, in opening order.
    pub opened: Vec<AreaIndex>,
    pub generated: Option<GenerationSummary>,
}

impl OpenResult {
    fn unchanged() -> Self {
        Self {
            outcome: RevealOutcome::NoChange,
            opened: Vec::new(),
            generated: None,
        }
    }

    /// Areas opened by the cascade, excluding the requested one.
    pub fn cascaded(&self) -> &[AreaIndex] {
        self.opened.get(1..).unwrap_or_default()
    }
}

/// Opens `index`, placing the mines first if the board is still pending.
pub fn open(board: &mut BoardState, index: AreaIndex) -> Result<OpenResult> {
    let index = check_openable(board, index)?;

    let generated = if board.status().is_pending() {
        // generation is pure, the board is untouched until the layout is accepted
        let layout = generator::generate(board.config(), index)?;
        board.arm(&layout);
        Some(GenerationSummary::from(&layout))
    } else {
        None
    };

    let mut result = open_area(board, index);
    result.generated = generated;
    Ok(result)
}

/// Opens the first area of a pending board with a layout generated ahead of time.
pub fn open_with_layout(board: &mut BoardState, layout: &MineLayout) -> Result<OpenResult> {
    if !board.status().is_pending() {
        board.check_not_finished()?;
        return Err(InvalidAction::AlreadyGenerated.into());
    }
    if !layout.matches(board.config()) || layout.contains_mine(layout.first_open()) {
        return Err(InvalidAction::LayoutMismatch.into());
    }
    let index = check_openable(board, layout.first_open())?;

    board.arm(layout);
    let mut result = open_area(board, index);
    result.generated = Some(GenerationSummary::from(layout));
    Ok(result)
}

fn check_openable(board: &BoardState, index: AreaIndex) -> Result<AreaIndex> {
    board.check_not_finished()?;
    let index = board.validate_index(index)?;

    match board.cover_at(index) {
        CoverState::Open => Err(InvalidAction::AlreadyOpen(index).into()),
        CoverState::Flagged => Err(InvalidAction::Flagged(index).into()),
        CoverState::Covered | CoverState::Questioned => Ok(index),
    }
}

/// Opens a single armed area and cascades through zero-count areas with an explicit worklist.
///
/// Flagged, open and finished boards are left untouched.
pub(crate) fn open_area(board: &mut BoardState, index: AreaIndex) -> OpenResult {
    if board.is_finished() || !board.cover_at(index).is_openable() {
        return OpenResult::unchanged();
    }
    debug_assert!(!board.status().is_pending());

    if board.area(index).is_some_and(|area| area.is_mine) {
        board.trigger_mine(index);
        log::debug!("Opened mine at {index}");
        return OpenResult {
            outcome: RevealOutcome::HitMine,
            opened: alloc::vec![index],
            generated: None,
        };
    }

    let count = board.mark_open(index).neighbor_mine_count;
    let mut opened = alloc::vec![index];
    log::debug!("Open area at {index}, mine count: {count}");

    if count == 0 {
        let mut visited: HashSet<_> = HashSet::from([index]);
        let mut to_visit: VecDeque<_> = board
            .iter_neighbors(index)
            .filter(|&pos| board.cover_at(pos).is_openable())
            .collect();
        log::trace!("Starting flood-fill from {index}, initial neighbors: {to_visit:?}");

        while let Some(visit) = to_visit.pop_front() {
            if !visited.insert(visit) {
                continue;
            }

            // flags stay closed, a zero never borders a mine
            if !board.cover_at(visit).is_openable() {
                continue;
            }

            let visit_count = board.mark_open(visit).neighbor_mine_count;
            opened.push(visit);
            log::trace!("Flood opened area at {visit}, mine count: {visit_count}");

            if visit_count == 0 {
                to_visit.extend(
                    board
                        .iter_neighbors(visit)
                        .filter(|&pos| board.cover_at(pos).is_openable())
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }
    }

    let outcome = if board.is_cleared() {
        board.end_game(true);
        RevealOutcome::Won
    } else {
        RevealOutcome::Revealed
    };

    OpenResult {
        outcome,
        opened,
        generated: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armed(width: Coord, height: Coord, mines: &[AreaIndex]) -> BoardState {
        let config = MinefieldConfig::new(width, height, mines.len() as CellCount)
            .unwrap()
            .with_seed(0);
        let mut board = BoardState::new(config);
        let layout = MineLayout::from_mine_indices(board.geometry(), mines, 0).unwrap();
        board.arm(&layout);
        board
    }

    #[test]
    fn open_hits_mine_and_records_trigger() {
        let mut board = armed(2, 2, &[0]);

        let result = open(&mut board, 0).unwrap();

        assert_eq!(result.outcome, RevealOutcome::HitMine);
        assert_eq!(board.status(), GameStatus::Defeat);
        assert_eq!(board.triggered_mine(), Some(0));
        assert!(board.area(0).unwrap().is_open());
        assert_eq!(board.area(3).unwrap().cover, CoverState::Covered);
    }

    #[test]
    fn flood_fill_opens_zero_region_and_border() {
        let mut board = armed(3, 3, &[8]);

        let result = open(&mut board, 0).unwrap();

        assert_eq!(result.outcome, RevealOutcome::Won);
        assert_eq!(result.opened.len(), 8);
        assert_eq!(result.cascaded().len(), 7);
        assert_eq!(board.area(4).unwrap().clue(), Some(1));
        assert!(!board.area(8).unwrap().is_open());
        // won boards get their mines flagged
        assert!(board.area(8).unwrap().is_flagged());
    }

    #[test]
    fn cascade_skips_flags() {
        let mut board = armed(5, 1, &[4]);
        board.set_cover(2, CoverState::Flagged);

        let result = open(&mut board, 0).unwrap();

        assert_eq!(result.opened, [0, 1]);
        assert_eq!(board.area(2).unwrap().cover, CoverState::Flagged);
        assert_eq!(board.status(), GameStatus::Running);
    }

    #[test]
    fn cascade_opens_question_marks() {
        let mut board = armed(4, 1, &[3]);
        board.set_cover(1, CoverState::Questioned);

        let result = open(&mut board, 0).unwrap();

        assert_eq!(result.opened, [0, 1, 2]);
        assert_eq!(result.outcome, RevealOutcome::Won);
    }

    #[test]
    fn rejects_flagged_open_and_out_of_range() {
        let mut board = armed(4, 1, &[3]);
        board.set_cover(1, CoverState::Flagged);

        assert_eq!(
            open(&mut board, 1),
            Err(GameError::InvalidAction(InvalidAction::Flagged(1)))
        );
        assert!(matches!(
            open(&mut board, 9),
            Err(GameError::InvalidAction(InvalidAction::OutOfRange { .. }))
        ));

        open(&mut board, 2).unwrap();
        assert_eq!(
            open(&mut board, 2),
            Err(GameError::InvalidAction(InvalidAction::AlreadyOpen(2)))
        );
    }

    #[test]
    fn finished_board_rejects_any_open() {
        let mut board = armed(2, 1, &[0]);
        open(&mut board, 1).unwrap();

        assert_eq!(open(&mut board, 0), Err(GameError::SessionFinished));
        assert_eq!(open(&mut board, 99), Err(GameError::SessionFinished));
    }

    #[test]
    fn opened_order_follows_cascade() {
        let mut board = armed(4, 1, &[3]);

        open(&mut board, 0).unwrap();

        let orders: Vec<_> = board.areas().map(|area| area.opened_order).collect();
        assert_eq!(orders, [Some(0), Some(1), Some(2), None]);
    }

    #[test]
    fn pending_board_generates_on_first_open() {
        let config = MinefieldConfig::new(9, 9, 9).unwrap().with_seed(42);
        let mut board = BoardState::new(config);

        let result = open(&mut board, 40).unwrap();

        assert!(result.generated.is_some());
        assert_ne!(result.outcome, RevealOutcome::HitMine);
        assert_eq!(board.area(40).unwrap().clue(), Some(0));
        assert_eq!(board.areas().filter(|area| area.is_mine).count(), 9);
    }

    #[test]
    fn prepared_layout_must_match() {
        let config = MinefieldConfig::new(9, 9, 9).unwrap().with_seed(42);
        let mut board = BoardState::new(config);
        let other = MinefieldConfig::new(9, 9, 10).unwrap().with_seed(42);
        let wrong = generator::generate(&other, 40).unwrap();

        assert_eq!(
            open_with_layout(&mut board, &wrong),
            Err(GameError::InvalidAction(InvalidAction::LayoutMismatch))
        );
        assert!(board.status().is_pending());

        let reseeded = generator::generate(&config.with_seed(999), 40).unwrap();
        assert_eq!(
            open_with_layout(&mut board, &reseeded),
            Err(GameError::InvalidAction(InvalidAction::LayoutMismatch))
        );
        let no_guess = generator::generate(&config.with_no_guess(true), 40).unwrap();
        assert_eq!(
            open_with_layout(&mut board, &no_guess),
            Err(GameError::InvalidAction(InvalidAction::LayoutMismatch))
        );
        assert!(board.status().is_pending());

        let layout = generator::generate(&config, 40).unwrap();
        let result = open_with_layout(&mut board, &layout).unwrap();
        assert_eq!(result.opened[0], 40);
        assert!(!board.status().is_pending());
    }
}
