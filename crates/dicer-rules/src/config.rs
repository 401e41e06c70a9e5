//! Configuration for the command engine.

use dicer_expr::{DiceEvaluator, RandRoller};

/// Tunables shared by every ruleset.
#[derive(Debug, Clone)]
pub struct RulesConfig {
    /// Faces of a bare `d` in dice expressions.
    pub default_faces: u32,
    /// Most dice a single `AdB` may roll.
    pub max_dice: u32,
    /// Total dice across all rounds up to which a CofD pool lists every face.
    pub cofd_trace_limit: usize,
    /// Largest CofD dice pool accepted.
    pub cofd_max_pool: u32,
    /// Hard stop on CofD re-roll rounds.
    pub cofd_max_rounds: u32,
    /// RNG seed for reproducible rolls; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            default_faces: 100,
            max_dice: 10_000,
            cofd_trace_limit: 25,
            cofd_max_pool: 1000,
            cofd_max_rounds: 100,
            seed: None,
        }
    }
}

impl RulesConfig {
    /// Set the default face count (at least 1).
    pub fn with_default_faces(mut self, faces: u32) -> Self {
        self.default_faces = faces.max(1);
        self
    }

    /// Set the per-operator dice cap (at least 1).
    pub fn with_max_dice(mut self, max_dice: u32) -> Self {
        self.max_dice = max_dice.max(1);
        self
    }

    /// Set the CofD full-trace limit.
    pub fn with_cofd_trace_limit(mut self, limit: usize) -> Self {
        self.cofd_trace_limit = limit;
        self
    }

    /// Set the largest CofD pool (at least 1).
    pub fn with_cofd_max_pool(mut self, pool: u32) -> Self {
        self.cofd_max_pool = pool.max(1);
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the expression evaluator these settings describe.
    pub fn evaluator(&self) -> DiceEvaluator {
        DiceEvaluator::new(self.default_faces).with_max_dice(self.max_dice)
    }

    /// Build a roller honoring the configured seed.
    pub fn roller(&self) -> RandRoller {
        RandRoller::from_seed_option(self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = RulesConfig::default();
        assert_eq!(cfg.default_faces, 100);
        assert_eq!(cfg.cofd_trace_limit, 25);
        assert_eq!(cfg.cofd_max_pool, 1000);
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn builder_methods() {
        let cfg = RulesConfig::default()
            .with_default_faces(20)
            .with_seed(7)
            .with_cofd_trace_limit(10);
        assert_eq!(cfg.default_faces, 20);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.cofd_trace_limit, 10);
        assert_eq!(cfg.evaluator().default_faces(), 20);
    }

    #[test]
    fn zero_values_clamped() {
        let cfg = RulesConfig::default()
            .with_default_faces(0)
            .with_max_dice(0)
            .with_cofd_max_pool(0);
        assert_eq!(cfg.default_faces, 1);
        assert_eq!(cfg.max_dice, 1);
        assert_eq!(cfg.cofd_max_pool, 1);
    }
}
