use serde::{Deserialize, Serialize};

use crate::*;

/// Describes the board to generate. Immutable once a session starts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinefieldConfig {
    pub width: Coord,
    pub height: Coord,
    pub mine_count: CellCount,
    /// Resolved to a concrete value when a session is created.
    pub seed: Option<u64>,
    pub require_no_guess: bool,
    #[serde(default)]
    pub topology: Topology,
}

impl MinefieldConfig {
    pub fn new(width: Coord, height: Coord, mine_count: CellCount) -> Result<Self> {
        let config = Self {
            width,
            height,
            mine_count,
            seed: None,
            require_no_guess: false,
            topology: Topology::Square,
        };
        config.validate()?;
        Ok(config)
    }

    pub const fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    pub const fn with_no_guess(self, require_no_guess: bool) -> Self {
        Self {
            require_no_guess,
            ..self
        }
    }

    pub const fn with_topology(self, topology: Topology) -> Self {
        Self { topology, ..self }
    }

    pub const fn geometry(&self) -> Geometry {
        Geometry::new((self.width, self.height), self.topology)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.width, self.height)
    }

    pub const fn safe_cell_count(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mine_count)
    }

    /// Checks `1 <= mine_count < width * height`, the first click must always be able to be safe.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigurationError::EmptyBoard {
                width: self.width,
                height: self.height,
            }
            .into());
        }

        if self.mine_count == 0 {
            return Err(ConfigurationError::NoMines.into());
        }

        let fits = self.total_cells() - 1;
        if self.mine_count > fits {
            return Err(ConfigurationError::TooManyMines {
                requested: self.mine_count,
                fits,
            }
            .into());
        }

        Ok(())
    }

    /// Returns a copy whose seed is guaranteed to be set, drawing a fresh one if needed.
    pub fn resolved(self) -> Self {
        match self.seed {
            Some(_) => self,
            None => {
                let seed = fresh_seed();
                log::debug!("no seed configured, drew {seed:#018x}");
                self.with_seed(seed)
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Expert,
    Custom {
        width: Coord,
        height: Coord,
        mines: CellCount,
    },
}

impl Difficulty {
    pub const fn dimensions(self) -> (Coord, Coord, CellCount) {
        match self {
            Self::Beginner => (9, 9, 10),
            Self::Intermediate => (16, 16, 40),
            Self::Expert => (30, 16, 99),
            Self::Custom {
                width,
                height,
                mines,
            } => (width, height, mines),
        }
    }

    pub fn config(self) -> Result<MinefieldConfig> {
        let (width, height, mines) = self.dimensions();
        MinefieldConfig::new(width, height, mines)
    }
}

/// Play assistance switches, owned by the caller's settings and read by the session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistOptions {
    /// Flag every area the oracle proves to be a mine after each open.
    pub auto_flag: bool,
    /// Open every area the oracle proves to be safe after each open.
    pub auto_open: bool,
    /// Let a chord proceed even when the flag count does not match the number.
    pub risky_chord: bool,
    /// A chord on a number whose covered neighbors must all be mines flags them.
    pub numbers_auto_flag: bool,
    pub question_marks: bool,
}

impl Default for AssistOptions {
    fn default() -> Self {
        Self {
            auto_flag: false,
            auto_open: false,
            risky_chord: false,
            numbers_auto_flag: false,
            question_marks: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_impossible_mine_counts() {
        assert_eq!(
            MinefieldConfig::new(3, 3, 9),
            Err(GameError::Configuration(ConfigurationError::TooManyMines {
                requested: 9,
                fits: 8
            }))
        );
        assert_eq!(
            MinefieldConfig::new(3, 3, 0),
            Err(GameError::Configuration(ConfigurationError::NoMines))
        );
        assert!(matches!(
            MinefieldConfig::new(0, 3, 1),
            Err(GameError::Configuration(ConfigurationError::EmptyBoard { .. }))
        ));
    }

    #[test]
    fn smallest_board_is_accepted() {
        let config = MinefieldConfig::new(2, 1, 1).unwrap();

        assert_eq!(config.total_cells(), 2);
        assert_eq!(config.safe_cell_count(), 1);
    }

    #[test]
    fn resolved_keeps_explicit_seed() {
        let config = MinefieldConfig::new(9, 9, 10).unwrap().with_seed(42);

        assert_eq!(config.resolved().seed, Some(42));
        assert!(MinefieldConfig::new(9, 9, 10).unwrap().resolved().seed.is_some());
    }

    #[test]
    fn presets_match_classic_sizes() {
        let expert = Difficulty::Expert.config().unwrap();

        assert_eq!((expert.width, expert.height, expert.mine_count), (30, 16, 99));
        assert!(Difficulty::Custom {
            width: 2,
            height: 2,
            mines: 4
        }
        .config()
        .is_err());
    }
}
