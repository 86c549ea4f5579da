use super::stat::Modifier;

/// Depletable pool that gates activity production.
///
/// `recovering` flips on only when `current` hits zero and flips off only when
/// `current` is back at `max`.
#[derive(Debug, Clone, PartialEq)]
pub struct Energy {
    current: f64,
    max: f64,
    base_recovery_rate: f64,
    recovery_rate: f64,
    recovering: bool,
}

impl Energy {
    /// A full pool.
    pub fn new(max: f64, base_recovery_rate: f64) -> Self {
        let max = max.max(0.0);
        let base_recovery_rate = base_recovery_rate.max(0.0);
        Self {
            current: max,
            max,
            base_recovery_rate,
            recovery_rate: base_recovery_rate,
            recovering: false,
        }
    }

    /// Restores a pool from persisted state. `current` is clamped into `[0, max]`.
    pub fn restored(max: f64, base_recovery_rate: f64, current: f64, recovering: bool) -> Self {
        let mut energy = Self::new(max, base_recovery_rate);
        energy.current = current.clamp(0.0, energy.max);
        energy.recovering = recovering && energy.current < energy.max;
        energy
    }

    /// Replacement instance for a new ceiling, carrying the current amount and phase.
    pub fn with_max(&self, max: f64) -> Self {
        let mut energy = Self::restored(max, self.base_recovery_rate, self.current, self.recovering);
        energy.recovery_rate = self.recovery_rate;
        energy
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn base_recovery_rate(&self) -> f64 {
        self.base_recovery_rate
    }

    pub fn recovery_rate(&self) -> f64 {
        self.recovery_rate
    }

    pub fn is_recovering(&self) -> bool {
        self.recovering
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    pub fn apply_recovery_modifier(&mut self, modifier: Modifier) {
        self.recovery_rate = modifier.apply(self.base_recovery_rate).max(0.0);
    }

    /// Recovers for up to `seconds` and returns how many of them were needed
    /// before the pool hit its ceiling.
    pub fn recover(&mut self, seconds: f64) -> f64 {
        if seconds <= 0.0 || self.recovery_rate <= 0.0 {
            return 0.0;
        }

        let start = self.current;
        self.current = (self.current + seconds * self.recovery_rate).min(self.max);
        if self.current >= self.max {
            self.recovering = false;
        }

        (self.current - start) / self.recovery_rate
    }

    /// Removes up to `amount` and returns what was actually removed.
    pub fn deplete(&mut self, amount: f64) -> f64 {
        let amount = amount.max(0.0);
        let start = self.current;
        self.current = (self.current - amount).max(0.0);
        if self.current <= 0.0 {
            self.recovering = true;
        }

        start - self.current
    }
}
