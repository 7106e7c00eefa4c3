use alloc::collections::BTreeSet;
use alloc::vec;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::*;
use crate::*;

/// Areas proven safe or mined from what is visible on a board.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionResult {
    /// Provably safe covered areas. With soft flag semantics this can include flagged areas.
    pub safe_to_open: BTreeSet<AreaIndex>,
    pub known_mines: BTreeSet<AreaIndex>,
    /// Every covered area is accounted for as a mine.
    pub fully_resolved: bool,
    pub contradictions: Vec<Contradiction>,
}

impl DeductionResult {
    pub fn is_empty(&self) -> bool {
        self.safe_to_open.is_empty() && self.known_mines.is_empty()
    }
}

/// Constraint propagation over the numbers around open areas.
///
/// Two rules are applied until neither yields anything new:
/// - a number whose known mines already match it makes every other covered neighbor safe,
/// - a number with exactly as many undecided neighbors as missing mines makes them all mines.
///
/// No subset or probability reasoning is attempted.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverOracle {
    config: AnalysisConfig,
}

impl SolverOracle {
    pub const fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> AnalysisConfig {
        self.config
    }

    pub fn deduce(&self, board: &BoardState) -> DeductionResult {
        self.deduce_observation(&Observation::from_board(board))
    }

    pub fn deduce_observation(&self, obs: &Observation) -> DeductionResult {
        let ConstraintBuildOutput {
            problem,
            mut contradictions,
        } = build_constraints(obs, self.config);

        let mut known_mines = BTreeSet::new();
        if matches!(self.config.flag_semantics, FlagSemantics::Strict) {
            known_mines.extend(
                problem
                    .variables
                    .iter()
                    .filter(|var| var.flagged)
                    .map(|var| var.index),
            );
        }
        let mut safe_to_open = BTreeSet::new();
        let mut contradicted = vec![false; problem.equations.len()];

        let mut rounds = 0usize;
        loop {
            rounds += 1;
            let mut changed = false;

            for (id, equation) in problem.equations.iter().enumerate() {
                if contradicted[id] {
                    continue;
                }

                let mut mines = 0usize;
                let mut undecided: SmallVec<[AreaIndex; 8]> = SmallVec::new();
                for &area in &equation.areas {
                    if known_mines.contains(&area) {
                        mines += 1;
                    } else if !safe_to_open.contains(&area) {
                        undecided.push(area);
                    }
                }

                let target = equation.target_mines as usize;
                if mines > target || mines + undecided.len() < target {
                    contradicted[id] = true;
                    contradictions.push(
                        equation.contradiction(target as i64 - mines as i64, undecided.len()),
                    );
                    continue;
                }

                if undecided.is_empty() {
                    continue;
                }

                if mines == target {
                    safe_to_open.extend(undecided);
                    changed = true;
                } else if mines + undecided.len() == target {
                    known_mines.extend(undecided);
                    changed = true;
                }
            }

            if !changed {
                break;
            }
        }

        let covered_count = problem.variables.len();
        let fully_resolved = contradictions.is_empty()
            && (problem
                .variables
                .iter()
                .all(|var| known_mines.contains(&var.index))
                || obs.mine_count == Some(covered_count as CellCount));

        log::trace!(
            "deduced {} safe and {} mines in {} rounds, resolved: {}",
            safe_to_open.len(),
            known_mines.len(),
            rounds,
            fully_resolved
        );

        DeductionResult {
            safe_to_open,
            known_mines,
            fully_resolved,
            contradictions,
        }
    }
}
