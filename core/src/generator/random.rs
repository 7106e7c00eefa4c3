use alloc::vec::Vec;

use super::*;

/// Purely random placement that keeps the first opened area (and its neighbors when they fit)
/// free of mines.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(&self, config: &MinefieldConfig, first_open: AreaIndex) -> Result<MineLayout> {
        let geometry = config.geometry();
        let safe_zone = SafeZone::resolve(config, first_open)?;

        let mut candidates: Vec<AreaIndex> = (0..geometry.total_cells() as usize)
            .filter(|&index| !safe_zone.contains(&geometry, first_open, index))
            .collect();
        let mines = config.mine_count as usize;
        debug_assert!(mines <= candidates.len());

        // partial Fisher-Yates, the first `mines` entries end up as a uniform sample
        let mut source = RandomSource::new(self.seed);
        for i in 0..mines {
            let pick = source.index_in(i..candidates.len());
            candidates.swap(i, pick);
        }

        let mut mine_mask: Array2<bool> = Array2::default(geometry.nd_shape());
        for &index in &candidates[..mines] {
            mine_mask[geometry.nd_index(index)] = true;
        }

        let layout = MineLayout::from_mine_mask(geometry, mine_mask, self.seed, first_open)?;
        if layout.mine_count() != config.mine_count {
            log::warn!(
                "Generated minefield count mismatch, actual: {}, requested: {}",
                layout.mine_count(),
                config.mine_count
            );
        }
        log::trace!(
            "candidate from seed {:#018x} with {:?} safe zone",
            self.seed,
            safe_zone
        );
        Ok(layout)
    }
}
