use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkChange {
    Flagged,
    Unflagged,
    Questioned,
    Unquestioned,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChordResult {
    /// The neighbors that were opened, one result per directly opened area.
    Opened(Vec<OpenResult>),
    /// The number could only be satisfied by mines, so its covered neighbors were flagged.
    Flagged(Vec<AreaIndex>),
}

impl ChordResult {
    pub fn outcome(&self) -> RevealOutcome {
        match self {
            Self::Opened(results) => results
                .iter()
                .map(|result| result.outcome)
                .fold(RevealOutcome::NoChange, core::ops::BitOr::bitor),
            Self::Flagged(_) => RevealOutcome::NoChange,
        }
    }
}

/// Changes applied by one auto-assist pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistResult {
    pub flagged: Vec<AreaIndex>,
    pub opened: Vec<OpenResult>,
}

impl AssistResult {
    pub fn is_empty(&self) -> bool {
        self.flagged.is_empty() && self.opened.is_empty()
    }
}

/// Marks, chords, and oracle-driven auto-flag/auto-open.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagAssistant {
    options: AssistOptions,
    oracle: SolverOracle,
}

impl FlagAssistant {
    pub fn new(options: AssistOptions) -> Self {
        Self {
            options,
            oracle: SolverOracle::default(),
        }
    }

    pub fn with_oracle(self, oracle: SolverOracle) -> Self {
        Self { oracle, ..self }
    }

    pub fn options(&self) -> AssistOptions {
        self.options
    }

    pub fn oracle(&self) -> &SolverOracle {
        &self.oracle
    }

    /// Toggles a flag, a question mark is replaced by the flag.
    pub fn flag(&self, board: &mut BoardState, index: AreaIndex) -> Result<MarkChange> {
        board.check_not_finished()?;
        let index = board.validate_index(index)?;

        match board.cover_at(index) {
            CoverState::Open => Err(InvalidAction::AlreadyOpen(index).into()),
            CoverState::Flagged => {
                board.set_cover(index, CoverState::Covered);
                Ok(MarkChange::Unflagged)
            }
            CoverState::Covered | CoverState::Questioned => {
                board.set_cover(index, CoverState::Flagged);
                Ok(MarkChange::Flagged)
            }
        }
    }

    /// Toggles a question mark, a flag is replaced by the question mark.
    pub fn toggle_question(&self, board: &mut BoardState, index: AreaIndex) -> Result<MarkChange> {
        board.check_not_finished()?;
        let index = board.validate_index(index)?;
        if !self.options.question_marks {
            return Err(InvalidAction::QuestionMarksDisabled.into());
        }

        match board.cover_at(index) {
            CoverState::Open => Err(InvalidAction::AlreadyOpen(index).into()),
            CoverState::Questioned => {
                board.set_cover(index, CoverState::Covered);
                Ok(MarkChange::Unquestioned)
            }
            CoverState::Covered | CoverState::Flagged => {
                board.set_cover(index, CoverState::Questioned);
                Ok(MarkChange::Questioned)
            }
        }
    }

    /// Opens the remaining neighbors of a satisfied number.
    pub fn chord(&self, board: &mut BoardState, index: AreaIndex) -> Result<ChordResult> {
        board.check_not_finished()?;
        let index = board.validate_index(index)?;

        let Some(count) = board
            .area(index)
            .and_then(Area::clue)
            .filter(|&count| count > 0)
        else {
            return Err(InvalidAction::NotANumber(index).into());
        };

        let flagged = board.count_flagged_neighbors(index);
        if flagged == count {
            return Ok(ChordResult::Opened(self.open_neighbors(board, index)));
        }

        if self.options.numbers_auto_flag && board.count_unrevealed_neighbors(index) == count {
            let to_flag: Vec<_> = board
                .iter_neighbors(index)
                .filter(|&pos| board.cover_at(pos).is_openable())
                .collect();
            for &pos in &to_flag {
                board.set_cover(pos, CoverState::Flagged);
            }
            return Ok(ChordResult::Flagged(to_flag));
        }

        if self.options.risky_chord {
            log::debug!("Risky chord at {index}: {flagged} flags around a {count}");
            return Ok(ChordResult::Opened(self.open_neighbors(board, index)));
        }

        Err(InvalidAction::ChordUnsatisfied {
            index,
            flagged,
            expected: count,
        }
        .into())
    }

    fn open_neighbors(&self, board: &mut BoardState, index: AreaIndex) -> Vec<OpenResult> {
        let neighbors: Vec<_> = board.iter_neighbors(index).collect();
        let mut results = Vec::new();
        for pos in neighbors {
            if board.is_finished() {
                break;
            }
            let result = open_area(board, pos);
            if result.outcome.has_update() {
                results.push(result);
            }
        }
        results
    }

    /// Applies oracle deductions until none are left, according to the auto-flag/auto-open options.
    pub fn assist(&self, board: &mut BoardState) -> AssistResult {
        let mut result = AssistResult::default();
        if !self.options.auto_flag && !self.options.auto_open {
            return result;
        }

        // every round shrinks the set of covered, unflagged areas
        while !board.is_finished() && !board.status().is_pending() {
            let deduction = self.oracle.deduce(board);
            let mut progressed = false;

            if self.options.auto_flag {
                for &index in &deduction.known_mines {
                    if board.cover_at(index).is_openable() {
                        board.set_cover(index, CoverState::Flagged);
                        result.flagged.push(index);
                        progressed = true;
                    }
                }
            }

            if self.options.auto_open {
                for &index in &deduction.safe_to_open {
                    if board.is_finished() {
                        break;
                    }
                    let opened = open_area(board, index);
                    if opened.outcome.has_update() {
                        result.opened.push(opened);
                        progressed = true;
                    }
                }
            }

            if !progressed {
                break;
            }
        }

        if !result.is_empty() {
            log::debug!(
                "Assist flagged {} and opened {} areas",
                result.flagged.len(),
                result.opened.len()
            );
        }
        result
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

    fn with_options(options: AssistOptions) -> FlagAssistant {
        FlagAssistant::new(options)
    }

    #[test]
    fn flag_toggles_and_counts() {
        let mut board = armed(3, 3, &[0]);
        let assistant = FlagAssistant::default();

        assert_eq!(assistant.flag(&mut board, 0), Ok(MarkChange::Flagged));
        assert_eq!(board.flag_count(), 1);
        assert_eq!(assistant.flag(&mut board, 0), Ok(MarkChange::Unflagged));
        assert_eq!(board.flag_count(), 0);
    }

    #[test]
    fn flag_is_blocked_on_open_areas() {
        let mut board = armed(3, 3, &[0]);
        open_area(&mut board, 4);

        assert_eq!(
            FlagAssistant::default().flag(&mut board, 4),
            Err(GameError::InvalidAction(InvalidAction::AlreadyOpen(4)))
        );
    }

    #[test]
    fn flags_are_allowed_before_the_first_open() {
        let config = MinefieldConfig::new(3, 3, 1).unwrap().with_seed(0);
        let mut board = BoardState::new(config);

        assert_eq!(FlagAssistant::default().flag(&mut board, 4), Ok(MarkChange::Flagged));
        assert!(board.status().is_pending());
    }

    #[test]
    fn question_marks_cycle_and_replace_flags() {
        let mut board = armed(3, 3, &[0]);
        let assistant = FlagAssistant::default();

        assistant.flag(&mut board, 1).unwrap();
        assert_eq!(assistant.toggle_question(&mut board, 1), Ok(MarkChange::Questioned));
        assert_eq!(board.flag_count(), 0);
        assert_eq!(assistant.toggle_question(&mut board, 1), Ok(MarkChange::Unquestioned));
        assert_eq!(board.area(1).unwrap().cover, CoverState::Covered);

        let disabled = with_options(AssistOptions {
            question_marks: false,
            ..AssistOptions::default()
        });
        assert_eq!(
            disabled.toggle_question(&mut board, 1),
            Err(GameError::InvalidAction(InvalidAction::QuestionMarksDisabled))
        );
    }

    #[test]
    fn chord_opens_neighbors_of_satisfied_number() {
        let mut board = armed(3, 3, &[3, 5]);
        let assistant = FlagAssistant::default();
        open_area(&mut board, 4);
        assistant.flag(&mut board, 3).unwrap();
        assistant.flag(&mut board, 5).unwrap();

        let result = assistant.chord(&mut board, 4).unwrap();

        let ChordResult::Opened(results) = &result else {
            panic!("expected opened neighbors, got {result:?}");
        };
        assert_eq!(results.len(), 6);
        assert_eq!(result.outcome(), RevealOutcome::Won);
        assert_eq!(board.area(1).unwrap().clue(), Some(2));
        assert_eq!(board.status(), GameStatus::Victory);
    }

    #[test]
    fn chord_with_wrong_flags_is_rejected() {
        let mut board = armed(3, 3, &[3, 5]);
        let assistant = FlagAssistant::default();
        open_area(&mut board, 4);
        assistant.flag(&mut board, 3).unwrap();
        let before = board.clone();

        assert_eq!(
            assistant.chord(&mut board, 4),
            Err(GameError::InvalidAction(InvalidAction::ChordUnsatisfied {
                index: 4,
                flagged: 1,
                expected: 2
            }))
        );
        assert_eq!(board, before);
    }

    #[test]
    fn risky_chord_can_lose() {
        let mut board = armed(3, 3, &[3, 5]);
        let assistant = with_options(AssistOptions {
            risky_chord: true,
            ..AssistOptions::default()
        });
        open_area(&mut board, 4);
        assistant.flag(&mut board, 3).unwrap();

        let result = assistant.chord(&mut board, 4).unwrap();

        assert_eq!(result.outcome(), RevealOutcome::HitMine);
        assert_eq!(board.status(), GameStatus::Defeat);
        assert_eq!(board.triggered_mine(), Some(5));
    }

    #[test]
    fn chord_on_covered_or_zero_is_not_a_number() {
        let mut board = armed(5, 1, &[2]);
        open_area(&mut board, 0);
        let assistant = FlagAssistant::default();

        assert_eq!(
            assistant.chord(&mut board, 0),
            Err(GameError::InvalidAction(InvalidAction::NotANumber(0)))
        );
        assert_eq!(
            assistant.chord(&mut board, 4),
            Err(GameError::InvalidAction(InvalidAction::NotANumber(4)))
        );
    }

    #[test]
    fn numbers_auto_flag_marks_forced_mines() {
        let mut board = armed(6, 1, &[2]);
        let assistant = with_options(AssistOptions {
            numbers_auto_flag: true,
            ..AssistOptions::default()
        });
        open_area(&mut board, 0);

        let result = assistant.chord(&mut board, 1).unwrap();

        assert_eq!(result, ChordResult::Flagged(alloc::vec![2]));
        assert!(board.area(2).unwrap().is_flagged());
        assert_eq!(board.status(), GameStatus::Running);
    }

    #[test]
    fn auto_assist_flags_and_opens_to_fixpoint() {
        // opening 0 cascades into 1, which pins the mine at 2 but says nothing past it
        let mut board = armed(6, 1, &[2]);
        let assistant = with_options(AssistOptions {
            auto_flag: true,
            auto_open: true,
            ..AssistOptions::default()
        });
        open_area(&mut board, 0);

        let result = assistant.assist(&mut board);

        assert_eq!(result.flagged, [2]);
        assert!(result.opened.is_empty());
        assert_eq!(board.status(), GameStatus::Running);
    }

    #[test]
    fn auto_open_clears_deducible_board() {
        // [1] [M] [1] [ ]: the left number pins the mine, the right one then frees area 3
        let mut board = armed(4, 1, &[1]);
        let assistant = with_options(AssistOptions {
            auto_flag: true,
            auto_open: true,
            ..AssistOptions::default()
        });
        open_area(&mut board, 0);
        open_area(&mut board, 2);

        let result = assistant.assist(&mut board);

        assert_eq!(result.flagged, [1]);
        assert_eq!(result.opened.len(), 1);
        assert_eq!(result.opened[0].opened, [3]);
        assert_eq!(board.status(), GameStatus::Victory);
        assert_eq!(board.score().right_mines, 1);
    }

    #[test]
    fn assist_is_inert_when_disabled() {
        let mut board = armed(6, 1, &[2]);
        open_area(&mut board, 0);

        assert!(FlagAssistant::default().assist(&mut board).is_empty());
        assert_eq!(board.flag_count(), 0);
    }
}
