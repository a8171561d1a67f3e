use endless_assault_core::{CombatTuning, WeaponKind};

/// Kill streaks that earn an on-screen announcement.
const STREAKS: [(u32, &str, f32); 5] = [
    (5, "KILLING SPREE!", 1.5),
    (10, "RAMPAGE!", 1.5),
    (20, "UNSTOPPABLE!", 2.0),
    (30, "GODLIKE!", 2.0),
    (50, "LEGENDARY!", 2.5),
];

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ScoreState {
    pub(crate) score: u64,
    pub(crate) kills: u32,
    pub(crate) combo: u32,
    pub(crate) combo_timer: f32,
    pub(crate) best_combo: u32,
    /// Weapons `0..unlocked_weapons` in catalog order are available.
    pub(crate) unlocked_weapons: usize,
    /// Weapon awarded by the boss currently alive, if any.
    pub(crate) boss_target: Option<WeaponKind>,
}

impl ScoreState {
    pub(crate) fn new() -> Self {
        Self {
            score: 0,
            kills: 0,
            combo: 0,
            combo_timer: 0.0,
            best_combo: 0,
            unlocked_weapons: 1,
            boss_target: None,
        }
    }

    /// Awards a kill at the current combo multiplier and extends the combo.
    /// Returns the points granted.
    pub(crate) fn register_kill(&mut self, base: u32, boss: bool, tuning: &CombatTuning) -> u32 {
        let base = if boss {
            base.saturating_mul(tuning.boss_score_multiplier)
        } else {
            base
        };
        let multiplier = 1.0 + self.combo as f32 * tuning.combo_step;
        let points = (base as f32 * multiplier).round() as u32;

        self.score = self.score.saturating_add(u64::from(points));
        self.kills = self.kills.saturating_add(1);
        self.combo = self.combo.saturating_add(1);
        self.combo_timer = tuning.combo_timeout;
        self.best_combo = self.best_combo.max(self.combo);
        points
    }

    pub(crate) fn add_bonus(&mut self, points: u32) {
        self.score = self.score.saturating_add(u64::from(points));
    }

    /// Counts the combo window down; returns the combo that just lapsed.
    pub(crate) fn tick_combo(&mut self, dt: f32) -> Option<u32> {
        if self.combo_timer <= 0.0 {
            return None;
        }
        self.combo_timer -= dt;
        if self.combo_timer > 0.0 {
            return None;
        }
        self.combo_timer = 0.0;
        let lapsed = std::mem::take(&mut self.combo);
        Some(lapsed)
    }

    pub(crate) fn is_unlocked(&self, weapon: WeaponKind) -> bool {
        weapon.index() < self.unlocked_weapons
    }

    /// Next locked weapon whose score threshold has been reached, unless a
    /// boss fight is already under way.
    pub(crate) fn next_unlock(&self) -> Option<WeaponKind> {
        if self.boss_target.is_some() {
            return None;
        }
        WeaponKind::ALL
            .into_iter()
            .skip(self.unlocked_weapons)
            .find(|weapon| self.score >= u64::from(weapon.spec().unlock_score))
    }

    /// Grants the pending boss reward.
    pub(crate) fn complete_unlock(&mut self) -> Option<WeaponKind> {
        let weapon = self.boss_target.take()?;
        self.unlocked_weapons = weapon.index() + 1;
        Some(weapon)
    }
}

pub(crate) fn streak_announcement(combo: u32) -> Option<(&'static str, f32)> {
    STREAKS
        .iter()
        .find(|(streak, _, _)| *streak == combo)
        .map(|(_, text, duration)| (*text, *duration))
}
