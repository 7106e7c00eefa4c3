use alloc::vec::Vec;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::Observation;
use crate::*;

/// How player flags are treated while deducing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagSemantics {
    /// Flags are ignored, a flagged area is just covered. Deductions stay sound with wrong flags.
    #[default]
    Soft,
    /// Flags are trusted as known mines.
    Strict,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MineCountUsage {
    /// Adds the total mine count as one more equation over every covered area.
    UseIfKnown,
    /// Only the numbers around open areas are used.
    #[default]
    Ignore,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AnalysisConfig {
    pub flag_semantics: FlagSemantics,
    pub mine_count_usage: MineCountUsage,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintVariable {
    pub index: AreaIndex,
    pub flagged: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquationKind {
    LocalClue { clue: AreaIndex },
    GlobalMineCount,
}

/// Exactly `target_mines` of `areas` are mines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintEquation {
    pub kind: EquationKind,
    pub areas: SmallVec<[AreaIndex; 8]>,
    pub target_mines: CellCount,
}

impl ConstraintEquation {
    pub(crate) fn contradiction(&self, target_mines: i64, available_variables: usize) -> Contradiction {
        match self.kind {
            EquationKind::LocalClue { clue } => Contradiction::LocalClueImpossible {
                clue,
                target_mines,
                available_variables,
            },
            EquationKind::GlobalMineCount => Contradiction::GlobalMineCountImpossible {
                target_mines,
                available_variables,
            },
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintProblem {
    pub variables: Vec<ConstraintVariable>,
    pub equations: Vec<ConstraintEquation>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contradiction {
    InvalidObservationShape,
    InvalidMineCount {
        mine_count: CellCount,
        max_cells: CellCount,
    },
    LocalClueImpossible {
        clue: AreaIndex,
        target_mines: i64,
        available_variables: usize,
    },
    GlobalMineCountImpossible {
        target_mines: i64,
        available_variables: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintBuildOutput {
    pub problem: ConstraintProblem,
    pub contradictions: Vec<Contradiction>,
}

pub fn build_constraints(obs: &Observation, cfg: AnalysisConfig) -> ConstraintBuildOutput {
    let mut contradictions = Vec::new();

    match obs.validate() {
        Ok(()) => {}
        Err(GameError::Configuration(ConfigurationError::TooManyMines { requested, fits })) => {
            contradictions.push(Contradiction::InvalidMineCount {
                mine_count: requested,
                max_cells: fits,
            });
            return empty_output(contradictions);
        }
        Err(_) => {
            contradictions.push(Contradiction::InvalidObservationShape);
            return empty_output(contradictions);
        }
    }

    let strict = matches!(cfg.flag_semantics, FlagSemantics::Strict);
    let variables: Vec<ConstraintVariable> = obs
        .covered()
        .map(|index| ConstraintVariable {
            index,
            flagged: obs.is_flagged(index),
        })
        .collect();

    let mut equations = Vec::new();

    for clue in 0..obs.geometry.total_cells() as usize {
        let Some(clue_mines) = obs.clue(clue) else {
            continue;
        };

        let mut target_mines = i64::from(clue_mines);
        let mut areas = SmallVec::new();

        for neighbor in obs.geometry.iter_neighbors(clue) {
            if obs.is_revealed(neighbor) {
                continue;
            }

            if strict && obs.is_flagged(neighbor) {
                target_mines -= 1;
            } else {
                areas.push(neighbor);
            }
        }

        if target_mines < 0 || (target_mines as usize) > areas.len() {
            contradictions.push(Contradiction::LocalClueImpossible {
                clue,
                target_mines,
                available_variables: areas.len(),
            });
            continue;
        }

        equations.push(ConstraintEquation {
            kind: EquationKind::LocalClue { clue },
            areas,
            target_mines: target_mines as CellCount,
        });
    }

    if matches!(cfg.mine_count_usage, MineCountUsage::UseIfKnown) {
        if let Some(total_mines) = obs.mine_count {
            let mut target_mines = i64::from(total_mines);
            let mut areas = SmallVec::new();

            for var in &variables {
                if strict && var.flagged {
                    target_mines -= 1;
                } else {
                    areas.push(var.index);
                }
            }

            if target_mines < 0 || (target_mines as usize) > areas.len() {
                contradictions.push(Contradiction::GlobalMineCountImpossible {
                    target_mines,
                    available_variables: areas.len(),
                });
            } else {
                equations.push(ConstraintEquation {
                    kind: EquationKind::GlobalMineCount,
                    areas,
                    target_mines: target_mines as CellCount,
                });
            }
        }
    }

    ConstraintBuildOutput {
        problem: ConstraintProblem {
            variables,
            equations,
        },
        contradictions,
    }
}

fn empty_output(contradictions: Vec<Contradiction>) -> ConstraintBuildOutput {
    ConstraintBuildOutput {
        problem: ConstraintProblem::default(),
        contradictions,
    }
}
