#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns read-only combat views into player input intents.

use endless_assault_core::{EnemyId, InputIntents, Vec2, WeaponKind};

/// Enemy as seen by the autopilot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Threat {
    /// Handle of the enemy.
    pub id: EnemyId,
    /// World position.
    pub position: Vec2,
    /// Reports whether the enemy is a boss.
    pub boss: bool,
}

/// Player state the autopilot reacts to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PilotState {
    /// World position.
    pub position: Vec2,
    /// Equipped weapon.
    pub weapon: WeaponKind,
    /// Rounds left in the magazine.
    pub magazine: u32,
    /// Reports whether a reload is in progress.
    pub reloading: bool,
    /// Reports whether the shockwave is charged and off cooldown.
    pub special_ready: bool,
    /// Strongest weapon currently unlocked.
    pub best_unlocked: WeaponKind,
}

/// Distances that shape how the autopilot fights.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutopilotConfig {
    /// Closer targets make the pilot back away.
    pub retreat_distance: f32,
    /// Farther targets make the pilot close in.
    pub engage_distance: f32,
    /// Closer targets trigger a dodge roll.
    pub dodge_distance: f32,
    /// Radius counted when deciding to release the shockwave.
    pub shockwave_radius: f32,
    /// Enemies inside the shockwave radius needed to release it.
    pub shockwave_crowd: usize,
    /// Bosses closer than this are preferred over nearer regular enemies.
    pub boss_focus_distance: f32,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            retreat_distance: 180.0,
            engage_distance: 450.0,
            dodge_distance: 60.0,
            shockwave_radius: 200.0,
            shockwave_crowd: 3,
            boss_focus_distance: 300.0,
        }
    }
}

/// Autopilot that reuses a scratch buffer between ticks.
#[derive(Debug, Default)]
pub struct Autopilot {
    config: AutopilotConfig,
    candidates: Vec<Candidate>,
}

impl Autopilot {
    /// Creates an autopilot with the default distances.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an autopilot with custom distances.
    #[must_use]
    pub fn with_config(config: AutopilotConfig) -> Self {
        Self {
            config,
            candidates: Vec::new(),
        }
    }

    /// Computes the input for the next tick.
    ///
    /// The output is reset before populating it. `iso_scale` is the vertical
    /// squash of the isometric projection, used to express world directions
    /// as screen-space movement axes.
    pub fn handle(
        &mut self,
        pilot: &PilotState,
        threats: &[Threat],
        iso_scale: f32,
        out: &mut InputIntents,
    ) {
        *out = InputIntents::default();

        if pilot.weapon != pilot.best_unlocked {
            out.select_weapon = Some(pilot.best_unlocked);
        }

        self.prepare_candidates(pilot.position, threats);
        let Some(target) = self.pick_target() else {
            out.aim_target = pilot.position + Vec2::X;
            out.reload_pressed =
                !pilot.reloading && pilot.magazine < pilot.weapon.spec().magazine;
            return;
        };

        out.aim_target = target.position;
        out.fire_held = true;
        out.fire_pressed = true;

        let offset = target.position - pilot.position;
        let distance = target.distance_sq.sqrt();
        let direction = offset / distance;
        let desired = if distance < self.config.retreat_distance {
            out.sprint = true;
            -direction
        } else if distance > self.config.engage_distance {
            direction
        } else {
            direction.perp()
        };
        out.movement = screen_axes(desired, iso_scale);

        let closest = self.candidates.iter().map(|candidate| candidate.distance_sq);
        let closest = closest.fold(f32::INFINITY, f32::min);
        out.dodge_pressed = closest < self.config.dodge_distance * self.config.dodge_distance;

        let radius_sq = self.config.shockwave_radius * self.config.shockwave_radius;
        let crowd = self
            .candidates
            .iter()
            .filter(|candidate| candidate.distance_sq <= radius_sq)
            .count();
        out.alt_fire_pressed = pilot.special_ready && crowd >= self.config.shockwave_crowd;
    }

    fn prepare_candidates(&mut self, origin: Vec2, threats: &[Threat]) {
        self.candidates.clear();
        self.candidates.reserve(threats.len());

        for threat in threats {
            let distance_sq = threat.position.distance_squared(origin);
            // Degenerate geometry: nothing to aim at.
            if distance_sq <= f32::EPSILON {
                continue;
            }
            self.candidates.push(Candidate {
                id: threat.id,
                position: threat.position,
                distance_sq,
                boss: threat.boss,
            });
        }
    }

    fn pick_target(&self) -> Option<Candidate> {
        let focus_sq = self.config.boss_focus_distance * self.config.boss_focus_distance;
        let mut best: Option<Candidate> = None;
        for candidate in &self.candidates {
            match &mut best {
                Some(existing) => {
                    if candidate.precedes(existing, focus_sq) {
                        *existing = *candidate;
                    }
                }
                None => best = Some(*candidate),
            }
        }
        best
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    id: EnemyId,
    position: Vec2,
    distance_sq: f32,
    boss: bool,
}

impl Candidate {
    fn focused(&self, focus_sq: f32) -> bool {
        self.boss && self.distance_sq <= focus_sq
    }

    fn precedes(&self, other: &Self, focus_sq: f32) -> bool {
        let (mine, theirs) = (self.focused(focus_sq), other.focused(focus_sq));
        if mine != theirs {
            return mine;
        }

        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }

        self.id < other.id
    }
}

/// Inverts the isometric movement mapping so a world direction becomes
/// screen axes with the larger component at full deflection.
fn screen_axes(world: Vec2, iso_scale: f32) -> Vec2 {
    let screen = Vec2::new(world.x - world.y, (world.x + world.y) * iso_scale);
    let largest = screen.x.abs().max(screen.y.abs());
    if largest <= f32::EPSILON {
        return Vec2::ZERO;
    }
    screen / largest
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISO: f32 = 0.55;

    fn pilot() -> PilotState {
        PilotState {
            position: Vec2::ZERO,
            weapon: WeaponKind::Pistol,
            magazine: WeaponKind::Pistol.spec().magazine,
            reloading: false,
            special_ready: false,
            best_unlocked: WeaponKind::Pistol,
        }
    }

    fn threat(index: u32, x: f32, y: f32) -> Threat {
        Threat {
            id: EnemyId::new(index, 0),
            position: Vec2::new(x, y),
            boss: false,
        }
    }

    /// Mirrors how the player controller turns screen axes into a world direction.
    fn world_direction(screen: Vec2) -> Vec2 {
        let screen = screen.normalize_or_zero();
        Vec2::new(
            screen.x * 0.5 + screen.y * 0.5 / ISO,
            -screen.x * 0.5 + screen.y * 0.5 / ISO,
        )
        .normalize_or_zero()
    }

    #[test]
    fn aims_at_the_nearest_enemy() {
        let mut system = Autopilot::new();
        let mut out = InputIntents::default();

        system.handle(
            &pilot(),
            &[threat(1, 400.0, 0.0), threat(2, 0.0, -300.0)],
            ISO,
            &mut out,
        );

        assert_eq!(out.aim_target, Vec2::new(0.0, -300.0));
        assert!(out.fire_held);
        assert!(out.fire_pressed);
    }

    #[test]
    fn smaller_id_wins_equidistant_targets() {
        let mut system = Autopilot::new();
        let mut out = InputIntents::default();

        system.handle(
            &pilot(),
            &[threat(9, 300.0, 0.0), threat(4, -300.0, 0.0)],
            ISO,
            &mut out,
        );

        assert_eq!(out.aim_target, Vec2::new(-300.0, 0.0));
    }

    #[test]
    fn nearby_boss_takes_priority() {
        let mut system = Autopilot::new();
        let mut out = InputIntents::default();
        let boss = Threat {
            boss: true,
            ..threat(7, 250.0, 0.0)
        };

        system.handle(&pilot(), &[threat(1, 200.0, 0.0), boss], ISO, &mut out);

        assert_eq!(out.aim_target, boss.position);
    }

    #[test]
    fn backs_away_from_close_enemies() {
        let mut system = Autopilot::new();
        let mut out = InputIntents::default();

        system.handle(&pilot(), &[threat(1, 100.0, 0.0)], ISO, &mut out);

        let direction = world_direction(out.movement);
        assert!((direction - Vec2::NEG_X).length() < 1e-4, "{direction:?}");
        assert!(out.sprint);
        assert!(!out.dodge_pressed);
    }

    #[test]
    fn closes_in_on_distant_enemies() {
        let mut system = Autopilot::new();
        let mut out = InputIntents::default();

        system.handle(&pilot(), &[threat(1, 0.0, 800.0)], ISO, &mut out);

        let direction = world_direction(out.movement);
        assert!((direction - Vec2::Y).length() < 1e-4, "{direction:?}");
        assert!(!out.sprint);
    }

    #[test]
    fn strafes_at_medium_range() {
        let mut system = Autopilot::new();
        let mut out = InputIntents::default();

        system.handle(&pilot(), &[threat(1, 300.0, 0.0)], ISO, &mut out);

        let direction = world_direction(out.movement);
        assert!(direction.dot(Vec2::X).abs() < 1e-4, "{direction:?}");
        assert!(out.movement.x.abs() <= 1.0 && out.movement.y.abs() <= 1.0);
    }

    #[test]
    fn dodges_when_an_enemy_is_on_top_of_the_player() {
        let mut system = Autopilot::new();
        let mut out = InputIntents::default();

        system.handle(&pilot(), &[threat(1, 40.0, 0.0)], ISO, &mut out);

        assert!(out.dodge_pressed);
    }

    #[test]
    fn releases_the_shockwave_into_a_crowd() {
        let mut system = Autopilot::new();
        let mut out = InputIntents::default();
        let crowd = [
            threat(1, 100.0, 0.0),
            threat(2, 0.0, 150.0),
            threat(3, -120.0, 0.0),
        ];

        system.handle(&pilot(), &crowd, ISO, &mut out);
        assert!(!out.alt_fire_pressed);

        let ready = PilotState {
            special_ready: true,
            ..pilot()
        };
        system.handle(&ready, &crowd, ISO, &mut out);
        assert!(out.alt_fire_pressed);

        system.handle(&ready, &crowd[..2], ISO, &mut out);
        assert!(!out.alt_fire_pressed);
    }

    #[test]
    fn reloads_a_partial_magazine_when_idle() {
        let mut system = Autopilot::new();
        let mut out = InputIntents::default();
        let partial = PilotState {
            magazine: 3,
            ..pilot()
        };

        system.handle(&partial, &[], ISO, &mut out);
        assert!(out.reload_pressed);
        assert!(!out.fire_held);
        assert_eq!(out.movement, Vec2::ZERO);

        let busy = PilotState {
            reloading: true,
            ..partial
        };
        system.handle(&busy, &[], ISO, &mut out);
        assert!(!out.reload_pressed);

        system.handle(&partial, &[threat(1, 300.0, 0.0)], ISO, &mut out);
        assert!(!out.reload_pressed);
    }

    #[test]
    fn switches_to_the_best_unlocked_weapon() {
        let mut system = Autopilot::new();
        let mut out = InputIntents::default();
        let upgraded = PilotState {
            best_unlocked: WeaponKind::Shotgun,
            ..pilot()
        };

        system.handle(&upgraded, &[], ISO, &mut out);
        assert_eq!(out.select_weapon, Some(WeaponKind::Shotgun));

        system.handle(&pilot(), &[], ISO, &mut out);
        assert_eq!(out.select_weapon, None);
    }

    #[test]
    fn enemy_on_the_player_is_not_a_target() {
        let mut system = Autopilot::new();
        let mut out = InputIntents::default();

        system.handle(&pilot(), &[threat(1, 0.0, 0.0)], ISO, &mut out);

        assert!(!out.fire_held);
    }

    #[test]
    fn custom_distances_change_the_stance() {
        let mut system = Autopilot::with_config(AutopilotConfig {
            retreat_distance: 50.0,
            engage_distance: 80.0,
            ..AutopilotConfig::default()
        });
        let mut out = InputIntents::default();

        system.handle(&pilot(), &[threat(1, 100.0, 0.0)], ISO, &mut out);

        let direction = world_direction(out.movement);
        assert!((direction - Vec2::X).length() < 1e-4, "{direction:?}");
    }
}
