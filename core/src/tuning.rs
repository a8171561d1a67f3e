//! Tunable simulation constants.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Complete set of tunable simulation constants.
///
/// Every section falls back to its defaults when omitted, so configuration
/// files only need to name the values they override.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Player movement, survivability and abilities.
    pub player: PlayerTuning,
    /// Bullets, explosions, scoring and drops.
    pub combat: CombatTuning,
    /// Enemy AI and scaling.
    pub enemies: EnemyTuning,
    /// Wave pacing and boss scaling.
    pub waves: WaveTuning,
    /// Hard caps of bounded stores.
    pub capacity: CapacityTuning,
    /// Frame stepping and world geometry.
    pub frame: FrameTuning,
}

impl Tuning {
    /// Checks that the tuning can drive a simulation without degenerate math.
    pub fn validate(&self) -> Result<(), TuningError> {
        positive("frame.max_dt", self.frame.max_dt)?;
        positive("frame.iso_scale", self.frame.iso_scale)?;
        positive("frame.tile_size", self.frame.tile_size)?;
        positive("player.max_hp", self.player.max_hp)?;
        positive("player.special_radius", self.player.special_radius)?;
        positive("combat.combo_timeout", self.combat.combo_timeout)?;
        positive(
            "combat.barrel_explosion_radius",
            self.combat.barrel_explosion_radius,
        )?;
        non_negative("player.max_shield", self.player.max_shield)?;

        if self.combat.drain_rounds == 0 {
            return Err(TuningError::ZeroDrainRounds);
        }
        if self.player.special_charge_cap == 0 {
            return Err(TuningError::ZeroCapacity {
                field: "player.special_charge_cap",
            });
        }

        let capacities = [
            ("capacity.max_bullets", self.capacity.max_bullets),
            ("capacity.max_enemies", self.capacity.max_enemies),
            ("capacity.max_bodies", self.capacity.max_bodies),
            ("capacity.max_pickups", self.capacity.max_pickups),
            ("capacity.max_floating_texts", self.capacity.max_floating_texts),
            ("capacity.max_damage_numbers", self.capacity.max_damage_numbers),
        ];
        for (field, value) in capacities {
            if value == 0 {
                return Err(TuningError::ZeroCapacity { field });
            }
        }

        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TuningError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TuningError::Negative { field, value })
    }
}

/// Reasons a tuning fails validation.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum TuningError {
    /// A value that divides or scales simulation math is zero, negative or not finite.
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Rejected value.
        value: f32,
    },
    /// A value that must not be negative is negative or not finite.
    #[error("{field} must be a non-negative finite number, got {value}")]
    Negative {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Rejected value.
        value: f32,
    },
    /// A bounded store was configured without room for a single entry.
    #[error("{field} must allow at least one entry")]
    ZeroCapacity {
        /// Dotted path of the offending field.
        field: &'static str,
    },
    /// The deferred damage queue would never be drained.
    #[error("combat.drain_rounds must be at least 1")]
    ZeroDrainRounds,
}

/// Player movement, survivability and ability constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Walking speed in world units per second.
    pub speed: f32,
    /// Multiplier applied while sprinting.
    pub sprint_multiplier: f32,
    /// Maximum hit points.
    pub max_hp: f32,
    /// Hit points regenerated per second.
    pub hp_regen: f32,
    /// Maximum shield.
    pub max_shield: f32,
    /// Shield regenerated per second once the grace delay elapsed.
    pub shield_regen: f32,
    /// Seconds without damage before the shield regenerates.
    pub shield_regen_delay: f32,
    /// Radius used against static obstacles.
    pub collision_radius: f32,
    /// Radius within which enemy bullets strike.
    pub hit_radius: f32,
    /// Distance of the muzzle from the player centre.
    pub muzzle_offset: f32,
    /// Fraction of weapon kickback applied as positional recoil.
    pub recoil_factor: f32,
    /// Fraction of weapon kickback applied as screen shake.
    pub shake_factor: f32,
    /// Speed multiplier while standing in water.
    pub water_speed_factor: f32,
    /// Chance per tick of a splash while walking through water.
    pub water_splash_chance: f32,
    /// Dodge roll speed.
    pub dodge_speed: f32,
    /// Dodge roll duration in seconds.
    pub dodge_duration: f32,
    /// Seconds between dodge rolls.
    pub dodge_cooldown: f32,
    /// Invincibility granted when a dodge roll completes.
    pub dodge_invincibility: f32,
    /// Hit flash duration after taking damage.
    pub hit_flash: f32,
    /// Screen shake applied when hit.
    pub hit_shake: f32,
    /// Hit point fraction restored by the second wind.
    pub second_wind_hp: f32,
    /// Shield fraction restored by the second wind.
    pub second_wind_shield: f32,
    /// Invincibility granted by the second wind.
    pub second_wind_invincibility: f32,
    /// Lifetime of floating damage numbers.
    pub damage_number_lifetime: f32,
    /// Kills needed to charge the shockwave.
    pub special_charge_cap: u32,
    /// Shockwave radius.
    pub special_radius: f32,
    /// Shockwave damage at the centre, falling off to zero at the radius.
    pub special_damage: f32,
    /// Seconds after a shockwave before another may be released.
    pub special_cooldown: f32,
    /// Stun inflicted by the shockwave.
    pub special_stun: f32,
    /// Knockback impulse of the shockwave before size scaling.
    pub special_knockback: f32,
    /// Screen shake of the shockwave.
    pub special_shake: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            speed: 200.0,
            sprint_multiplier: 1.6,
            max_hp: 800.0,
            hp_regen: 5.0,
            max_shield: 300.0,
            shield_regen: 40.0,
            shield_regen_delay: 3.0,
            collision_radius: 10.0,
            hit_radius: 16.0,
            muzzle_offset: 20.0,
            recoil_factor: 0.3,
            shake_factor: 0.5,
            water_speed_factor: 0.55,
            water_splash_chance: 0.4,
            dodge_speed: 500.0,
            dodge_duration: 0.25,
            dodge_cooldown: 0.8,
            dodge_invincibility: 0.15,
            hit_flash: 0.15,
            hit_shake: 3.0,
            second_wind_hp: 0.3,
            second_wind_shield: 0.2,
            second_wind_invincibility: 2.0,
            damage_number_lifetime: 0.8,
            special_charge_cap: 15,
            special_radius: 220.0,
            special_damage: 150.0,
            special_cooldown: 0.5,
            special_stun: 0.4,
            special_knockback: 400.0,
            special_shake: 20.0,
        }
    }
}

/// Bullet, explosion, scoring and drop constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Seconds a bullet lives.
    pub bullet_lifetime: f32,
    /// Bullets farther than this from the player are destroyed.
    pub bullet_despawn_distance: f32,
    /// Radius of an enemy hit box before size scaling.
    pub enemy_hit_radius: f32,
    /// Stun inflicted by a regular hit.
    pub hit_stun: f32,
    /// Knockback impulse of a regular hit before size scaling.
    pub hit_knockback: f32,
    /// Hit flash after an unshielded hit.
    pub hit_flash: f32,
    /// Hit flash after a shielded hit.
    pub shield_hit_flash: f32,
    /// Fraction of bullet damage dealt by explosive splash.
    pub splash_factor: f32,
    /// Fraction of bullet damage dealt by each chain hop.
    pub chain_factor: f32,
    /// Radius within which a bullet hits a barrel.
    pub barrel_hit_radius: f32,
    /// Barrel hit points.
    pub barrel_hp: f32,
    /// Barrel explosion radius.
    pub barrel_explosion_radius: f32,
    /// Barrel damage to enemies at the centre.
    pub barrel_enemy_damage: f32,
    /// Barrel damage to the player at the centre.
    pub barrel_player_damage: f32,
    /// Score awarded for a barrel.
    pub barrel_score: u32,
    /// Bomber death damage to enemies at the centre.
    pub death_blast_enemy_damage: f32,
    /// Bomber death damage to the player at the centre.
    pub death_blast_player_damage: f32,
    /// Blood pools left by a regular death.
    pub blood_pools_per_death: u32,
    /// Rounds the deferred damage queue is drained per drain phase.
    pub drain_rounds: u32,
    /// Score multiplier of bosses.
    pub boss_score_multiplier: u32,
    /// Combo multiplier gained per chained kill.
    pub combo_step: f32,
    /// Seconds without a kill before the combo resets.
    pub combo_timeout: f32,
    /// Radius of the celebratory explosion when a boss dies.
    pub boss_death_explosion_radius: f32,
    /// Chance a regular enemy drops health.
    pub health_drop_chance: f32,
    /// Chance a boss drops health.
    pub boss_health_drop_chance: f32,
    /// Chance any enemy drops shield.
    pub shield_drop_chance: f32,
    /// Base health restored by a health pickup.
    pub health_pickup_base: f32,
    /// Extra health restored per wave.
    pub health_pickup_per_wave: f32,
    /// Base shield restored by a shield pickup.
    pub shield_pickup_base: f32,
    /// Extra shield restored per wave.
    pub shield_pickup_per_wave: f32,
    /// Seconds a pickup stays on the ground.
    pub pickup_lifetime: f32,
    /// Radius within which the player collects a pickup.
    pub pickup_radius: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            bullet_lifetime: 2.0,
            bullet_despawn_distance: 2000.0,
            enemy_hit_radius: 15.0,
            hit_stun: 0.05,
            hit_knockback: 150.0,
            hit_flash: 0.1,
            shield_hit_flash: 0.08,
            splash_factor: 0.7,
            chain_factor: 0.5,
            barrel_hit_radius: 14.0,
            barrel_hp: 30.0,
            barrel_explosion_radius: 220.0,
            barrel_enemy_damage: 200.0,
            barrel_player_damage: 80.0,
            barrel_score: 50,
            death_blast_enemy_damage: 80.0,
            death_blast_player_damage: 50.0,
            blood_pools_per_death: 5,
            drain_rounds: 3,
            boss_score_multiplier: 10,
            combo_step: 0.1,
            combo_timeout: 2.0,
            boss_death_explosion_radius: 180.0,
            health_drop_chance: 0.12,
            boss_health_drop_chance: 0.8,
            shield_drop_chance: 0.06,
            health_pickup_base: 50.0,
            health_pickup_per_wave: 2.0,
            shield_pickup_base: 40.0,
            shield_pickup_per_wave: 1.0,
            pickup_lifetime: 15.0,
            pickup_radius: 25.0,
        }
    }
}

/// Enemy AI and scaling constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    /// Distance below which enemies repel each other, before size scaling.
    pub separation_radius: f32,
    /// Repulsion speed added per neighbor.
    pub separation_force: f32,
    /// Fraction of knockback kept per stunned tick.
    pub knockback_friction: f32,
    /// Speed multiplier while standing in water.
    pub water_speed_factor: f32,
    /// Chance per tick of a splash while walking through water.
    pub water_splash_chance: f32,
    /// Radius used against static obstacles, before size scaling.
    pub collision_radius: f32,
    /// Seconds between melee strikes.
    pub melee_interval: f32,
    /// Radius within which healers find wounded allies.
    pub heal_radius: f32,
    /// Hit points restored by one heal.
    pub heal_amount: f32,
    /// Distance healers try to keep from the player.
    pub healer_standoff: f32,
    /// Speed fraction used by retreating healers.
    pub healer_retreat_factor: f32,
    /// Range fraction beyond which ranged enemies advance.
    pub ranged_advance_band: f32,
    /// Range fraction below which ranged enemies retreat.
    pub ranged_retreat_band: f32,
    /// Speed fraction used by retreating ranged enemies.
    pub ranged_retreat_factor: f32,
    /// Random aim error of enemy shots, in radians.
    pub aim_jitter: f32,
    /// Explosion radius of explosive enemy shots.
    pub shot_explosion_radius: f32,
    /// Distance of the enemy muzzle from its centre.
    pub muzzle_offset: f32,
    /// Hit point growth per wave.
    pub hp_growth_per_wave: f32,
    /// Bullet damage growth per wave.
    pub damage_growth_per_wave: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            separation_radius: 25.0,
            separation_force: 80.0,
            knockback_friction: 0.9,
            water_speed_factor: 0.75,
            water_splash_chance: 0.2,
            collision_radius: 8.0,
            melee_interval: 0.8,
            heal_radius: 150.0,
            heal_amount: 25.0,
            healer_standoff: 200.0,
            healer_retreat_factor: 0.7,
            ranged_advance_band: 0.6,
            ranged_retreat_band: 0.4,
            ranged_retreat_factor: 0.5,
            aim_jitter: 0.15,
            shot_explosion_radius: 60.0,
            muzzle_offset: 10.0,
            hp_growth_per_wave: 0.04,
            damage_growth_per_wave: 0.02,
        }
    }
}

/// Wave pacing and boss scaling constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    /// Countdown before the first wave.
    pub first_wave_delay: f32,
    /// Countdown between waves.
    pub cooldown: f32,
    /// Quota of wave zero.
    pub base_quota: u32,
    /// Base spawn rate.
    pub spawn_rate_base: f32,
    /// Spawn rate gained per wave.
    pub spawn_rate_per_wave: f32,
    /// Radius around the player beyond which enemies are off screen.
    pub view_range: f32,
    /// Extra distance beyond the view range for wave spawns.
    pub spawn_margin: f32,
    /// Extra distance beyond the view range for boss spawns.
    pub boss_margin: f32,
    /// Waves during which a freshly introduced kind stays favored.
    pub recency_window: u32,
    /// Selection weight of freshly introduced kinds.
    pub recency_weight: u32,
    /// Every n-th wave is announced as a massive assault.
    pub emphasis_every: u32,
    /// Boss hit points before per-tier growth.
    pub boss_base_hp: f32,
    /// Boss hit points gained per weapon tier.
    pub boss_hp_per_tier: f32,
    /// Boss size multiplier.
    pub boss_size_multiplier: f32,
    /// Boss speed multiplier.
    pub boss_speed_multiplier: f32,
    /// Minimum boss speed.
    pub boss_min_speed: f32,
    /// Boss damage multiplier.
    pub boss_damage_multiplier: f32,
    /// Fraction of boss hit points granted as shield for shielded kinds.
    pub boss_shield_fraction: f32,
    /// Weapon tier multiplier used to pick the boss base kind.
    pub boss_kind_step: f32,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            first_wave_delay: 1.0,
            cooldown: 3.0,
            base_quota: 5,
            spawn_rate_base: 0.3,
            spawn_rate_per_wave: 0.05,
            view_range: 900.0,
            spawn_margin: 100.0,
            boss_margin: 80.0,
            recency_window: 3,
            recency_weight: 3,
            emphasis_every: 5,
            boss_base_hp: 300.0,
            boss_hp_per_tier: 250.0,
            boss_size_multiplier: 2.5,
            boss_speed_multiplier: 0.6,
            boss_min_speed: 25.0,
            boss_damage_multiplier: 1.5,
            boss_shield_fraction: 0.3,
            boss_kind_step: 1.2,
        }
    }
}

/// Hard caps of bounded stores.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityTuning {
    /// Live bullets; new bullets are rejected at capacity.
    pub max_bullets: usize,
    /// Live regular enemies; new spawns are rejected at capacity.
    pub max_enemies: usize,
    /// Body decals; the oldest is evicted at capacity.
    pub max_bodies: usize,
    /// Blood pool decals; new pools are rejected at capacity.
    pub max_blood_pools: usize,
    /// Pickups on the ground; new drops are rejected at capacity.
    pub max_pickups: usize,
    /// Floating score texts; the oldest is evicted at capacity.
    pub max_floating_texts: usize,
    /// Floating player damage numbers; the oldest is evicted at capacity.
    pub max_damage_numbers: usize,
}

impl Default for CapacityTuning {
    fn default() -> Self {
        Self {
            max_bullets: 400,
            max_enemies: 80,
            max_bodies: 200,
            max_blood_pools: 800,
            max_pickups: 128,
            max_floating_texts: 64,
            max_damage_numbers: 16,
        }
    }
}

/// Frame stepping and world geometry constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameTuning {
    /// Upper bound of a single simulation step in seconds.
    pub max_dt: f32,
    /// Vertical squash of the isometric projection.
    pub iso_scale: f32,
    /// Terrain tile edge length; positions snap to it before terrain lookups.
    pub tile_size: f32,
    /// Seconds after which body decals disappear.
    pub body_fade_end: f32,
    /// Lifetime of floating score texts.
    pub floating_text_lifetime: f32,
    /// Rise speed of floating score texts.
    pub floating_text_rise: f32,
}

impl Default for FrameTuning {
    fn default() -> Self {
        Self {
            max_dt: 0.05,
            iso_scale: 0.55,
            tile_size: 80.0,
            body_fade_end: 25.0,
            floating_text_lifetime: 1.2,
            floating_text_rise: 40.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(Tuning::default().validate(), Ok(()));
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let tuning: Tuning = toml::from_str(
            r#"
            [player]
            max_hp = 1000.0

            [capacity]
            max_enemies = 12
            "#,
        )
        .expect("valid toml");

        assert_eq!(tuning.player.max_hp, 1000.0);
        assert_eq!(tuning.player.speed, PlayerTuning::default().speed);
        assert_eq!(tuning.capacity.max_enemies, 12);
        assert_eq!(tuning.capacity.max_bullets, 400);
        assert_eq!(tuning.waves, WaveTuning::default());
    }

    #[test]
    fn zero_drain_rounds_are_rejected() {
        let mut tuning = Tuning::default();
        tuning.combat.drain_rounds = 0;
        assert_eq!(tuning.validate(), Err(TuningError::ZeroDrainRounds));
    }

    #[test]
    fn non_positive_frame_clamp_is_rejected() {
        let mut tuning = Tuning::default();
        tuning.frame.max_dt = 0.0;
        assert_eq!(
            tuning.validate(),
            Err(TuningError::NotPositive {
                field: "frame.max_dt",
                value: 0.0,
            })
        );
    }

    #[test]
    fn zero_capacity_names_the_field() {
        let mut tuning = Tuning::default();
        tuning.capacity.max_bullets = 0;
        let error = tuning.validate().expect_err("zero bullets");
        assert_eq!(
            error.to_string(),
            "capacity.max_bullets must allow at least one entry"
        );
    }
}
