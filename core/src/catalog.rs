//! Static weapon, enemy and boss tables.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::SoundCue;

/// Weapons the player can wield, ordered by unlock threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Semi-automatic sidearm available from the start.
    Pistol,
    /// Fast automatic submachine gun.
    Uzi,
    /// Multi-pellet fan.
    Shotgun,
    /// Automatic assault rifle.
    M16,
    /// Wind-up rotary gun.
    Minigun,
    /// Rocket launcher.
    Rpg,
    /// Piercing plasma rifle.
    Plasma,
    /// Chain lightning gun.
    Tesla,
    /// Piercing beam rifle.
    Railgun,
    /// Huge explosive orb.
    Bfg,
    /// Piercing stream that dissolves what it kills.
    Disintegrator,
}

impl WeaponKind {
    /// Number of weapons in the catalog.
    pub const COUNT: usize = 11;

    /// Every weapon in unlock order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Pistol,
        Self::Uzi,
        Self::Shotgun,
        Self::M16,
        Self::Minigun,
        Self::Rpg,
        Self::Plasma,
        Self::Tesla,
        Self::Railgun,
        Self::Bfg,
        Self::Disintegrator,
    ];

    /// Position of the weapon in unlock order.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Looks up the weapon at the provided unlock position.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Static specification of the weapon.
    #[must_use]
    pub fn spec(self) -> &'static WeaponSpec {
        &WEAPONS[self as usize]
    }
}

/// How a weapon responds to the trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Fires continuously while the trigger is held.
    Automatic,
    /// Fires once per trigger press.
    SemiAutomatic,
}

bitflags! {
    /// Behavioral and visual traits carried by every bullet a weapon fires.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct BulletTraits: u8 {
        /// Leaves a particle trail.
        const TRAIL = 1 << 0;
        /// Survives hitting a target.
        const PIERCE = 1 << 1;
        /// Detonates on impact.
        const EXPLOSIVE = 1 << 2;
        /// Rendered as a beam with a dense trail.
        const BEAM = 1 << 3;
        /// Dissolves targets it kills.
        const DISINTEGRATE = 1 << 4;
        /// Rendered with a glow.
        const GLOW = 1 << 5;
    }
}

/// Chain lightning parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChainSpec {
    /// Maximum number of additional targets after the first hit.
    pub links: u32,
    /// Maximum distance of each hop.
    pub range: f32,
}

/// Static weapon parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeaponSpec {
    /// Display name.
    pub name: &'static str,
    /// Seconds between shots.
    pub fire_interval: f32,
    /// Damage of each bullet.
    pub damage: f32,
    /// Angular spread in radians.
    pub spread: f32,
    /// Bullets fired per shot.
    pub pellets: u32,
    /// Bullet speed in world units per second.
    pub bullet_speed: f32,
    /// Trigger mode.
    pub trigger: Trigger,
    /// Magazine capacity.
    pub magazine: u32,
    /// Seconds needed to reload.
    pub reload_time: f32,
    /// Score at which the weapon's boss is summoned.
    pub unlock_score: u32,
    /// Recoil strength, also drives screen shake.
    pub kickback: f32,
    /// Size of ejected casings; zero ejects none.
    pub shell_size: f32,
    /// Whether the weapon needs to wind up before firing.
    pub spin_up: bool,
    /// Traits copied onto each bullet.
    pub traits: BulletTraits,
    /// Explosion radius of explosive bullets.
    pub explosion_radius: f32,
    /// Chain lightning parameters, if any.
    pub chain: Option<ChainSpec>,
    /// Sound played on each shot.
    pub sound: SoundCue,
}

static WEAPONS: [WeaponSpec; WeaponKind::COUNT] = [
    WeaponSpec {
        name: "Pistol",
        fire_interval: 0.28,
        damage: 30.0,
        spread: 0.04,
        pellets: 1,
        bullet_speed: 900.0,
        trigger: Trigger::SemiAutomatic,
        magazine: 15,
        reload_time: 1.0,
        unlock_score: 0,
        kickback: 3.0,
        shell_size: 0.5,
        spin_up: false,
        traits: BulletTraits::empty(),
        explosion_radius: 0.0,
        chain: None,
        sound: SoundCue::Pistol,
    },
    WeaponSpec {
        name: "Uzi",
        fire_interval: 0.07,
        damage: 14.0,
        spread: 0.13,
        pellets: 1,
        bullet_speed: 800.0,
        trigger: Trigger::Automatic,
        magazine: 32,
        reload_time: 1.2,
        unlock_score: 400,
        kickback: 2.0,
        shell_size: 0.4,
        spin_up: false,
        traits: BulletTraits::empty(),
        explosion_radius: 0.0,
        chain: None,
        sound: SoundCue::Smg,
    },
    WeaponSpec {
        name: "Shotgun",
        fire_interval: 0.55,
        damage: 18.0,
        spread: 0.25,
        pellets: 7,
        bullet_speed: 650.0,
        trigger: Trigger::SemiAutomatic,
        magazine: 6,
        reload_time: 1.8,
        unlock_score: 1200,
        kickback: 8.0,
        shell_size: 0.8,
        spin_up: false,
        traits: BulletTraits::empty(),
        explosion_radius: 0.0,
        chain: None,
        sound: SoundCue::Shotgun,
    },
    WeaponSpec {
        name: "M16",
        fire_interval: 0.09,
        damage: 22.0,
        spread: 0.06,
        pellets: 1,
        bullet_speed: 1000.0,
        trigger: Trigger::Automatic,
        magazine: 30,
        reload_time: 1.5,
        unlock_score: 2500,
        kickback: 3.0,
        shell_size: 0.5,
        spin_up: false,
        traits: BulletTraits::TRAIL,
        explosion_radius: 0.0,
        chain: None,
        sound: SoundCue::Rifle,
    },
    WeaponSpec {
        name: "Minigun",
        fire_interval: 0.035,
        damage: 11.0,
        spread: 0.18,
        pellets: 1,
        bullet_speed: 900.0,
        trigger: Trigger::Automatic,
        magazine: 200,
        reload_time: 3.0,
        unlock_score: 5000,
        kickback: 1.5,
        shell_size: 0.3,
        spin_up: true,
        traits: BulletTraits::TRAIL,
        explosion_radius: 0.0,
        chain: None,
        sound: SoundCue::Minigun,
    },
    WeaponSpec {
        name: "RPG",
        fire_interval: 0.9,
        damage: 250.0,
        spread: 0.02,
        pellets: 1,
        bullet_speed: 450.0,
        trigger: Trigger::SemiAutomatic,
        magazine: 1,
        reload_time: 2.0,
        unlock_score: 9000,
        kickback: 12.0,
        shell_size: 0.0,
        spin_up: false,
        traits: BulletTraits::TRAIL.union(BulletTraits::EXPLOSIVE),
        explosion_radius: 130.0,
        chain: None,
        sound: SoundCue::Rocket,
    },
    WeaponSpec {
        name: "Plasma",
        fire_interval: 0.12,
        damage: 55.0,
        spread: 0.04,
        pellets: 1,
        bullet_speed: 1100.0,
        trigger: Trigger::Automatic,
        magazine: 40,
        reload_time: 1.8,
        unlock_score: 16000,
        kickback: 4.0,
        shell_size: 0.0,
        spin_up: false,
        traits: BulletTraits::TRAIL
            .union(BulletTraits::PIERCE)
            .union(BulletTraits::GLOW),
        explosion_radius: 0.0,
        chain: None,
        sound: SoundCue::Plasma,
    },
    WeaponSpec {
        name: "Tesla",
        fire_interval: 0.14,
        damage: 45.0,
        spread: 0.08,
        pellets: 1,
        bullet_speed: 1200.0,
        trigger: Trigger::Automatic,
        magazine: 50,
        reload_time: 2.0,
        unlock_score: 25000,
        kickback: 3.0,
        shell_size: 0.0,
        spin_up: false,
        traits: BulletTraits::TRAIL.union(BulletTraits::GLOW),
        explosion_radius: 0.0,
        chain: Some(ChainSpec {
            links: 3,
            range: 150.0,
        }),
        sound: SoundCue::Tesla,
    },
    WeaponSpec {
        name: "Railgun",
        fire_interval: 1.4,
        damage: 600.0,
        spread: 0.0,
        pellets: 1,
        bullet_speed: 4000.0,
        trigger: Trigger::SemiAutomatic,
        magazine: 3,
        reload_time: 2.5,
        unlock_score: 40000,
        kickback: 18.0,
        shell_size: 0.0,
        spin_up: false,
        traits: BulletTraits::TRAIL
            .union(BulletTraits::PIERCE)
            .union(BulletTraits::GLOW)
            .union(BulletTraits::BEAM),
        explosion_radius: 0.0,
        chain: None,
        sound: SoundCue::Railgun,
    },
    WeaponSpec {
        name: "BFG",
        fire_interval: 2.0,
        damage: 800.0,
        spread: 0.02,
        pellets: 1,
        bullet_speed: 350.0,
        trigger: Trigger::SemiAutomatic,
        magazine: 1,
        reload_time: 3.0,
        unlock_score: 60000,
        kickback: 22.0,
        shell_size: 0.0,
        spin_up: false,
        traits: BulletTraits::TRAIL
            .union(BulletTraits::EXPLOSIVE)
            .union(BulletTraits::GLOW),
        explosion_radius: 280.0,
        chain: None,
        sound: SoundCue::Bfg,
    },
    WeaponSpec {
        name: "Disintegrator",
        fire_interval: 0.04,
        damage: 38.0,
        spread: 0.03,
        pellets: 2,
        bullet_speed: 1600.0,
        trigger: Trigger::Automatic,
        magazine: 120,
        reload_time: 2.5,
        unlock_score: 85000,
        kickback: 1.0,
        shell_size: 0.0,
        spin_up: false,
        traits: BulletTraits::TRAIL
            .union(BulletTraits::PIERCE)
            .union(BulletTraits::GLOW)
            .union(BulletTraits::DISINTEGRATE),
        explosion_radius: 0.0,
        chain: None,
        sound: SoundCue::Disintegrator,
    },
];

/// Names of the bosses guarding each weapon after the pistol, in unlock order.
pub const BOSS_NAMES: [&str; WeaponKind::COUNT - 1] = [
    "Warlord",
    "Demolisher",
    "Iron Bear",
    "General Fury",
    "Titan",
    "Overlord",
    "Storm Lord",
    "Shadow King",
    "Annihilator",
    "Omega Prime",
];

/// Name of the boss whose death unlocks the provided weapon.
#[must_use]
pub fn boss_name(reward: WeaponKind) -> &'static str {
    reward
        .index()
        .checked_sub(1)
        .and_then(|slot| BOSS_NAMES.get(slot).copied())
        .unwrap_or("Boss")
}

/// Hostile unit families, ordered by the wave that introduces them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Basic melee infantry.
    Militia,
    /// Fast, fragile melee unit.
    Runner,
    /// Slow, tough melee unit.
    Heavy,
    /// Ranged unit with a sidearm.
    Officer,
    /// Fast, hard-hitting melee unit.
    Berserker,
    /// Explodes when killed.
    Bomber,
    /// Rapid-fire ranged unit.
    Commando,
    /// Heals wounded allies.
    Medic,
    /// Long-range marksman.
    Sniper,
    /// Ranged unit protected by a shield.
    Shielded,
    /// Armored unit firing explosive shells.
    Tank,
    /// Massive armored unit firing explosive shells.
    Juggernaut,
}

impl EnemyKind {
    /// Number of enemy kinds in the catalog.
    pub const COUNT: usize = 12;

    /// Every enemy kind in introduction order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Militia,
        Self::Runner,
        Self::Heavy,
        Self::Officer,
        Self::Berserker,
        Self::Bomber,
        Self::Commando,
        Self::Medic,
        Self::Sniper,
        Self::Shielded,
        Self::Tank,
        Self::Juggernaut,
    ];

    /// Position of the kind in introduction order.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Looks up the kind at the provided position, clamping to the strongest kind.
    #[must_use]
    pub fn from_index_saturating(index: usize) -> Self {
        Self::ALL[index.min(Self::COUNT - 1)]
    }

    /// Static specification of the kind.
    #[must_use]
    pub fn spec(self) -> &'static EnemySpec {
        &ENEMIES[self as usize]
    }
}

/// Behavior family driving an enemy each tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Behavior {
    /// Closes in and strikes in contact range.
    Melee,
    /// Holds a distance band and shoots at the player.
    Ranged {
        /// Seconds between shots before randomization.
        fire_interval: f32,
        /// Bullet speed in world units per second.
        bullet_speed: f32,
    },
    /// Stays behind the front line and heals wounded allies.
    Healer {
        /// Seconds between heals.
        heal_interval: f32,
    },
}

bitflags! {
    /// Capabilities orthogonal to the behavior family.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Carries a shield that absorbs damage before hit points.
        const HAS_SHIELD = 1 << 0;
        /// Detonates on death.
        const EXPLODES_ON_DEATH = 1 << 1;
        /// Fires explosive bullets.
        const EXPLOSIVE_SHOTS = 1 << 2;
    }
}

/// Static enemy parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySpec {
    /// Display name.
    pub name: &'static str,
    /// Base hit points before wave scaling.
    pub hp: f32,
    /// Base movement speed.
    pub speed: f32,
    /// Contact or bullet damage.
    pub damage: f32,
    /// Attack range.
    pub range: f32,
    /// Size multiplier for hit radius and collision.
    pub size: f32,
    /// Base score awarded on kill.
    pub score: u32,
    /// First wave the kind may spawn in.
    pub min_wave: u32,
    /// Behavior family.
    pub behavior: Behavior,
    /// Orthogonal capabilities.
    pub capabilities: Capabilities,
    /// Base shield before wave scaling.
    pub shield_hp: f32,
    /// Radius of the death explosion.
    pub explosion_radius: f32,
}

const fn melee(
    name: &'static str,
    hp: f32,
    speed: f32,
    damage: f32,
    range: f32,
    size: f32,
    score: u32,
    min_wave: u32,
) -> EnemySpec {
    EnemySpec {
        name,
        hp,
        speed,
        damage,
        range,
        size,
        score,
        min_wave,
        behavior: Behavior::Melee,
        capabilities: Capabilities::empty(),
        shield_hp: 0.0,
        explosion_radius: 0.0,
    }
}

static ENEMIES: [EnemySpec; EnemyKind::COUNT] = [
    melee("Militia", 45.0, 55.0, 6.0, 28.0, 1.0, 10, 1),
    melee("Runner", 25.0, 130.0, 4.0, 22.0, 0.85, 15, 3),
    melee("Heavy", 180.0, 30.0, 14.0, 32.0, 1.35, 30, 5),
    EnemySpec {
        behavior: Behavior::Ranged {
            fire_interval: 1.4,
            bullet_speed: 400.0,
        },
        ..melee("Officer", 65.0, 45.0, 10.0, 280.0, 1.0, 25, 7)
    },
    melee("Berserker", 130.0, 115.0, 16.0, 30.0, 1.15, 45, 8),
    EnemySpec {
        capabilities: Capabilities::EXPLODES_ON_DEATH,
        explosion_radius: 100.0,
        ..melee("Bomber", 40.0, 90.0, 60.0, 28.0, 0.9, 35, 9)
    },
    EnemySpec {
        behavior: Behavior::Ranged {
            fire_interval: 0.8,
            bullet_speed: 500.0,
        },
        ..melee("Commando", 90.0, 80.0, 8.0, 200.0, 1.05, 35, 10)
    },
    EnemySpec {
        behavior: Behavior::Healer { heal_interval: 2.0 },
        ..melee("Medic", 55.0, 42.0, 5.0, 180.0, 0.95, 50, 11)
    },
    EnemySpec {
        behavior: Behavior::Ranged {
            fire_interval: 2.8,
            bullet_speed: 800.0,
        },
        ..melee("Sniper", 35.0, 20.0, 35.0, 550.0, 0.9, 40, 13)
    },
    EnemySpec {
        behavior: Behavior::Ranged {
            fire_interval: 1.2,
            bullet_speed: 450.0,
        },
        capabilities: Capabilities::HAS_SHIELD,
        shield_hp: 80.0,
        ..melee("Shielded", 100.0, 38.0, 12.0, 250.0, 1.2, 55, 14)
    },
    EnemySpec {
        behavior: Behavior::Ranged {
            fire_interval: 3.0,
            bullet_speed: 350.0,
        },
        capabilities: Capabilities::EXPLOSIVE_SHOTS,
        ..melee("Tank", 600.0, 18.0, 45.0, 250.0, 1.8, 100, 16)
    },
    EnemySpec {
        behavior: Behavior::Ranged {
            fire_interval: 2.0,
            bullet_speed: 300.0,
        },
        capabilities: Capabilities::EXPLOSIVE_SHOTS,
        ..melee("Juggernaut", 1200.0, 12.0, 60.0, 280.0, 2.2, 200, 20)
    },
];
