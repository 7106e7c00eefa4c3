use core::sync::atomic::AtomicBool;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;
pub use no_guess::*;
pub use random::*;
pub use seed::*;

mod no_guess;
mod random;
mod seed;

pub trait MinefieldGenerator {
    fn generate(&self, config: &MinefieldConfig, first_open: AreaIndex) -> Result<MineLayout>;
}

/// Areas kept free of mines around the first click.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafeZone {
    /// Only the first opened area.
    FirstOpen,
    /// The first opened area and all of its neighbors, so it opens as a zero.
    Neighborhood,
}

impl SafeZone {
    /// Picks the largest zone the mine count allows.
    pub fn resolve(config: &MinefieldConfig, first_open: AreaIndex) -> Result<Self> {
        let geometry = config.geometry();
        let total = geometry.total_cells();
        if !geometry.contains(first_open) {
            return Err(ConfigurationError::FirstOpenOutOfRange {
                index: first_open,
                total,
            }
            .into());
        }

        let zone_size = 1 + geometry.iter_neighbors(first_open).count() as CellCount;
        if config.mine_count + zone_size <= total {
            Ok(Self::Neighborhood)
        } else if config.mine_count < total {
            log::warn!("Cannot make start area zero, fallback to simple safe");
            Ok(Self::FirstOpen)
        } else {
            Err(ConfigurationError::TooManyMines {
                requested: config.mine_count,
                fits: total - 1,
            }
            .into())
        }
    }

    pub fn contains(self, geometry: &Geometry, first_open: AreaIndex, index: AreaIndex) -> bool {
        match self {
            Self::FirstOpen => index == first_open,
            Self::Neighborhood => {
                index == first_open || geometry.iter_neighbors(first_open).any(|pos| pos == index)
            }
        }
    }
}

/// Accepted mine placement for a board, plus how it was obtained.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    geometry: Geometry,
    mine_mask: Array2<bool>,
    mine_count: CellCount,
    seed: u64,
    /// Configured seed the candidates were derived from.
    base_seed: u64,
    require_no_guess: bool,
    first_open: AreaIndex,
    attempts: u32,
    may_require_guess: bool,
}

impl MineLayout {
    pub fn from_mine_mask(
        geometry: Geometry,
        mine_mask: Array2<bool>,
        seed: u64,
        first_open: AreaIndex,
    ) -> Result<Self> {
        if mine_mask.dim() != (usize::from(geometry.height()), usize::from(geometry.width())) {
            return Err(InvalidAction::LayoutMismatch.into());
        }
        if !geometry.contains(first_open) {
            return Err(ConfigurationError::FirstOpenOutOfRange {
                index: first_open,
                total: geometry.total_cells(),
            }
            .into());
        }

        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count() as CellCount;
        Ok(Self {
            geometry,
            mine_mask,
            mine_count,
            seed,
            base_seed: seed,
            require_no_guess: false,
            first_open,
            attempts: 1,
            may_require_guess: false,
        })
    }

    /// Builds a layout from explicit mine positions, mostly useful for fixed puzzles and tests.
    pub fn from_mine_indices(
        geometry: Geometry,
        mines: &[AreaIndex],
        first_open: AreaIndex,
    ) -> Result<Self> {
        let mut mine_mask = Array2::default(geometry.nd_shape());
        for &index in mines {
            if !geometry.contains(index) {
                return Err(InvalidAction::OutOfRange {
                    index,
                    total: geometry.total_cells(),
                }
                .into());
            }
            mine_mask[geometry.nd_index(index)] = true;
        }
        Self::from_mine_mask(geometry, mine_mask, 0, first_open)
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    /// Seed of the accepted candidate, derived from the configured seed on retries.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn first_open(&self) -> AreaIndex {
        self.first_open
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn may_require_guess(&self) -> bool {
        self.may_require_guess
    }

    pub fn contains_mine(&self, index: AreaIndex) -> bool {
        self.mine_mask[self.geometry.nd_index(index)]
    }

    pub fn mine_indices(&self) -> impl Iterator<Item = AreaIndex> {
        (0..self.geometry.total_cells() as usize).filter(|&index| self.contains_mine(index))
    }

    pub fn adjacent_mine_count(&self, index: AreaIndex) -> u8 {
        self.geometry
            .iter_neighbors(index)
            .filter(|&pos| self.contains_mine(pos))
            .count() as u8
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Whether this layout was generated for `config`, so its seed replays the same mines.
    pub fn matches(&self, config: &MinefieldConfig) -> bool {
        self.geometry == config.geometry()
            && self.mine_count == config.mine_count
            && config.seed == Some(self.base_seed)
            && self.require_no_guess == config.require_no_guess
    }

    pub(crate) fn with_origin(self, base_seed: u64, require_no_guess: bool) -> Self {
        Self {
            base_seed,
            require_no_guess,
            ..self
        }
    }

    pub(crate) fn with_attempts(self, attempts: u32, may_require_guess: bool) -> Self {
        Self {
            attempts,
            may_require_guess,
            ..self
        }
    }
}

/// Generates the layout for `config` using its resolved seed, honoring `require_no_guess`.
pub fn generate(config: &MinefieldConfig, first_open: AreaIndex) -> Result<MineLayout> {
    generate_cancellable(config, first_open, &AtomicBool::new(false))
}

/// Same as [`generate`], but gives up with [`GameError::GenerationCancelled`] once `cancel` is set.
///
/// Nothing is mutated here, so abandoning a generation never leaves a half-armed board behind.
pub fn generate_cancellable(
    config: &MinefieldConfig,
    first_open: AreaIndex,
    cancel: &AtomicBool,
) -> Result<MineLayout> {
    config.validate()?;
    let seed = config.seed.unwrap_or_else(fresh_seed);

    let layout = if config.require_no_guess {
        NoGuessGenerator::new(seed)
            .with_cancel_flag(cancel)
            .generate(config, first_open)?
    } else {
        RandomMinefieldGenerator::new(seed).generate(config, first_open)?
    };
    Ok(layout.with_origin(seed, config.require_no_guess))
}
