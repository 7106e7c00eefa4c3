use core::sync::atomic::{AtomicBool, Ordering};

use super::*;

/// Upper bound of candidates tried before accepting a board that may need a guess.
pub const MAX_GENERATION_ATTEMPTS: u32 = 200;

/// Retries random candidates until one can be cleared from the first open by deduction alone.
///
/// Candidate `n` is drawn from `derive_seed(seed, n)`, so the accepted layout only depends on the
/// configuration, the seed and the first opened area.
#[derive(Clone, Debug)]
pub struct NoGuessGenerator<'a> {
    seed: u64,
    max_attempts: u32,
    cancel: Option<&'a AtomicBool>,
}

impl NoGuessGenerator<'static> {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_attempts: MAX_GENERATION_ATTEMPTS,
            cancel: None,
        }
    }
}

impl<'a> NoGuessGenerator<'a> {
    pub fn with_max_attempts(self, max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..self
        }
    }

    pub fn with_cancel_flag<'b>(self, cancel: &'b AtomicBool) -> NoGuessGenerator<'b> {
        NoGuessGenerator {
            seed: self.seed,
            max_attempts: self.max_attempts,
            cancel: Some(cancel),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .is_some_and(|cancel| cancel.load(Ordering::Relaxed))
    }
}

impl MinefieldGenerator for NoGuessGenerator<'_> {
    fn generate(&self, config: &MinefieldConfig, first_open: AreaIndex) -> Result<MineLayout> {
        let mut attempt = 0;
        loop {
            if self.is_cancelled() {
                log::debug!("generation cancelled after {attempt} attempts");
                return Err(GameError::GenerationCancelled);
            }

            let candidate = RandomMinefieldGenerator::new(derive_seed(self.seed, attempt))
                .generate(config, first_open)?;
            attempt += 1;

            if is_solvable(config, &candidate) {
                log::debug!("found a no-guess board after {attempt} attempts");
                return Ok(candidate.with_attempts(attempt, false));
            }

            if attempt >= self.max_attempts {
                log::warn!(
                    "no no-guess board within {attempt} attempts, accepting one that may need a guess"
                );
                return Ok(candidate.with_attempts(attempt, true));
            }
        }
    }
}

/// Plays `layout` forward from its first open, opening every area the oracle proves safe, and
/// reports whether that clears the board.
pub fn is_solvable(config: &MinefieldConfig, layout: &MineLayout) -> bool {
    let mut board = BoardState::new(config.with_seed(layout.base_seed()));
    board.arm(layout);
    open_area(&mut board, layout.first_open());

    let oracle = SolverOracle::default();
    while !board.is_finished() {
        let deduction = oracle.deduce(&board);
        if deduction.fully_resolved {
            return true;
        }

        let mut progressed = false;
        for &index in &deduction.safe_to_open {
            if board.cover_at(index).is_openable() {
                let result = open_area(&mut board, index);
                debug_assert_ne!(result.outcome, RevealOutcome::HitMine);
                progressed = true;
            }
        }

        if !progressed {
            return false;
        }
    }

    matches!(board.status(), GameStatus::Victory)
}
