//! Skill resource pools
//!
//! Two shapes of pool gate the three skills. Brake and magnetize share the
//! continuous shape: charge drains a fixed amount per simulated frame while
//! the skill is held, and only starts refilling once the skill has been
//! released and a delay countdown has run out. Gravity bombs use discrete
//! slots: a slot must be completely full to spend, and a spent slot refills
//! linearly with no delay.

use serde::{Deserialize, Serialize};

use crate::consts::CHARGE_MAX;

/// Continuous charge pool for a held skill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargePool {
    charge: f64,
    /// Frames left before recharging may begin
    delay: u32,
    drain_per_frame: f64,
    delay_reset_frames: u32,
    recharge_per_second: f64,
}

impl ChargePool {
    /// A full pool with the given drain/delay/recharge tuning
    pub fn full(drain_per_frame: f64, delay_reset_frames: u32, recharge_per_second: f64) -> Self {
        Self {
            charge: CHARGE_MAX,
            delay: 0,
            drain_per_frame,
            delay_reset_frames,
            recharge_per_second,
        }
    }

    #[inline]
    pub fn charge(&self) -> f64 {
        self.charge
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.charge <= 0.0
    }

    /// Whether an activation request should be honored right now
    #[inline]
    pub fn can_activate(&self) -> bool {
        self.charge > 0.0
    }

    /// Refill to max and clear the delay (arena reset)
    pub fn refill(&mut self) {
        self.charge = CHARGE_MAX;
        self.delay = 0;
    }

    /// Advance one simulated frame. `held` is whether the skill signal was
    /// asserted this frame; `dt` is the physics step in seconds.
    ///
    /// The delay countdown ticks every frame no matter what, but every held
    /// frame rearms it first, so recharging begins `delay_reset_frames`
    /// after the last held frame.
    pub fn tick(&mut self, held: bool, dt: f64) {
        if held && self.charge > 0.0 {
            self.charge = (self.charge - self.drain_per_frame).max(0.0);
            self.delay = self.delay_reset_frames;
        }
        if self.delay > 0 {
            self.delay -= 1;
        } else if !held && self.charge < CHARGE_MAX {
            self.charge = (self.charge + self.recharge_per_second * dt).min(CHARGE_MAX);
        }
    }
}

/// Discrete gravity-bomb charge slots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BombSlots {
    slots: Vec<f64>,
    recharge_per_second: f64,
}

impl BombSlots {
    /// All slots full; each spent slot takes `recharge_seconds` to refill
    pub fn new(count: usize, recharge_seconds: f64) -> Self {
        Self {
            slots: vec![CHARGE_MAX; count],
            recharge_per_second: CHARGE_MAX / recharge_seconds,
        }
    }

    /// Spend the first fully charged slot. Returns false (and changes
    /// nothing) when no slot qualifies.
    pub fn try_spend(&mut self) -> bool {
        match self.slots.iter_mut().find(|s| **s >= CHARGE_MAX) {
            Some(slot) => {
                *slot = 0.0;
                true
            }
            None => false,
        }
    }

    /// Linear recharge on every spent slot, no delay
    pub fn tick(&mut self, dt: f64) {
        for slot in &mut self.slots {
            if *slot < CHARGE_MAX {
                *slot = (*slot + self.recharge_per_second * dt).min(CHARGE_MAX);
            }
        }
    }

    pub fn refill(&mut self) {
        self.slots.fill(CHARGE_MAX);
    }

    pub fn any_full(&self) -> bool {
        self.slots.iter().any(|s| *s >= CHARGE_MAX)
    }

    /// Per-slot charge levels, for HUD display
    pub fn charges(&self) -> &[f64] {
        &self.slots
    }
}
