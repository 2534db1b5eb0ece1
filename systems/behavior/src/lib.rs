#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Agent behaviour system driving hunting, dodging and boss phases.
//!
//! The system observes the world through immutable views and answers each
//! simulated tick with movement, path and ability commands. It never mutates
//! the world directly; rejected commands are simply dropped by the world.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use whispers_core::{
    AgentKind, AgentSnapshot, AgentState, AgentView, AttackSnapshot, BossPhase, CellCoord,
    Command, Event, PlayerSnapshot, Vec2,
};
use whispers_world::{find_path, PlayableGrid};

const DODGE_SPEED_FACTOR: f32 = 1.5;
const DODGE_TRIGGER_RADIUS: f32 = 80.0;
const VAMPIRE_TELEPORT_MIN: f32 = 100.0;
const VAMPIRE_TELEPORT_MAX: f32 = 200.0;
const VAMPIRE_TELEPORT_OFFSET: f32 = 30.0;
const BOSS_RETREAT_RADIUS: f32 = 200.0;
const BOSS_MAX_MINIONS: usize = 3;
const BOSS_WAYPOINT_CHANCE: f64 = 0.02;
const BOSS_WAYPOINT_RADIUS: f32 = 200.0;
const BOSS_TELEPORT_RADIUS: f32 = 100.0;

/// Configuration parameters required to construct the behaviour system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided random seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Read-only state the behaviour system consults each tick.
#[derive(Clone, Copy, Debug)]
pub struct Surroundings<'a> {
    /// Every living agent.
    pub agents: &'a AgentView,
    /// The player the agents chase.
    pub player: &'a PlayerSnapshot,
    /// Player projectiles in flight.
    pub attacks: &'a [AttackSnapshot],
    /// Walkability grid used for paths and step validation.
    pub grid: &'a PlayableGrid,
}

/// Pure system that turns agent snapshots into behaviour commands.
#[derive(Debug)]
pub struct Behavior {
    rng_seed: u64,
    rng: ChaCha8Rng,
}

impl Behavior {
    /// Creates a new behaviour system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng_seed: config.rng_seed,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes world events and immutable views to emit agent commands.
    ///
    /// A session reset rewinds the random stream to its seed.
    pub fn handle(&mut self, events: &[Event], view: Surroundings<'_>, out: &mut Vec<Command>) {
        if events.contains(&Event::SessionReset) {
            self.rng = ChaCha8Rng::seed_from_u64(self.rng_seed);
        }

        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        for agent in view.agents.iter().filter(|agent| agent.is_spawned()) {
            match agent.kind {
                AgentKind::VampireLord => self.drive_boss(agent, &view, out),
                AgentKind::Vampire => {
                    if try_vampire_teleport(agent, view.player, view.grid, out) {
                        continue;
                    }
                    if agent.state == AgentState::Hunt && is_threatened(agent, view.attacks) {
                        out.push(Command::ChangeAgentState {
                            agent: agent.id,
                            state: AgentState::Dodge,
                        });
                        continue;
                    }
                    drive_regular(agent, view.player, view.grid, out);
                }
                AgentKind::Ghoul | AgentKind::Werewolf => {
                    drive_regular(agent, view.player, view.grid, out);
                }
            }
        }
    }

    fn drive_boss(
        &mut self,
        boss: &AgentSnapshot,
        view: &Surroundings<'_>,
        out: &mut Vec<Command>,
    ) {
        let player = view.player.position;
        match boss.phase.unwrap_or(BossPhase::One) {
            BossPhase::One => {
                if boss.position.distance(player) < BOSS_RETREAT_RADIUS {
                    if let Some(away) = (boss.position - player).try_normalize() {
                        out.push(Command::MoveAgent {
                            agent: boss.id,
                            to: boss.position + away * boss.speed,
                        });
                    }
                }

                if boss.cooldowns.summon == 0
                    && view.agents.count_kind(AgentKind::Ghoul) < BOSS_MAX_MINIONS
                {
                    out.push(Command::SummonMinion { summoner: boss.id });
                }
            }
            BossPhase::Two => {
                let mut path = None;
                if self.rng.gen_bool(BOSS_WAYPOINT_CHANCE) {
                    let waypoint = player + self.random_direction() * BOSS_WAYPOINT_RADIUS;
                    if view.grid.is_position_walkable(waypoint) {
                        let route = plan_route(boss.position, waypoint, view.grid);
                        tracing::debug!("boss {:?} rerouting via {}", boss.id, waypoint);
                        out.push(Command::SetAgentPath {
                            agent: boss.id,
                            path: route.clone(),
                        });
                        path = Some(route);
                    }
                }

                let path = path.as_deref().unwrap_or(boss.path.as_slice());
                if let Some(to) = step_along(boss.position, boss.speed, path, view.grid) {
                    out.push(Command::MoveAgent { agent: boss.id, to });
                }

                if boss.cooldowns.charge == 0 {
                    if let Some(toward) = (player - boss.position).try_normalize() {
                        out.push(Command::ChargeAgent {
                            agent: boss.id,
                            to: boss.position + toward * boss.speed * 2.0,
                        });
                    }
                }
            }
            BossPhase::Three => {
                if boss.cooldowns.teleport == 0 {
                    out.push(Command::TeleportAgent {
                        agent: boss.id,
                        to: player + self.random_direction() * BOSS_TELEPORT_RADIUS,
                    });
                }
            }
        }
    }

    fn random_direction(&mut self) -> Vec2 {
        let degrees: u32 = self.rng.gen_range(0..=360);
        Vec2::from_angle((degrees as f32).to_radians())
    }
}

fn drive_regular(
    agent: &AgentSnapshot,
    player: &PlayerSnapshot,
    grid: &PlayableGrid,
    out: &mut Vec<Command>,
) {
    match agent.state {
        AgentState::Hunt => {
            let mut fresh = None;
            if agent.path_countdown == 0 {
                let route = plan_route(agent.position, player.position, grid);
                out.push(Command::SetAgentPath {
                    agent: agent.id,
                    path: route.clone(),
                });
                fresh = Some(route);
            }

            let path = fresh.as_deref().unwrap_or(agent.path.as_slice());
            if let Some(to) = step_along(agent.position, agent.speed, path, grid) {
                out.push(Command::MoveAgent { agent: agent.id, to });
            }
        }
        AgentState::Dodge => {
            if let Some(away) = (agent.position - player.position).try_normalize() {
                out.push(Command::MoveAgent {
                    agent: agent.id,
                    to: agent.position + away * agent.speed * DODGE_SPEED_FACTOR,
                });
            }
        }
        AgentState::Recover => {}
    }
}

fn try_vampire_teleport(
    agent: &AgentSnapshot,
    player: &PlayerSnapshot,
    grid: &PlayableGrid,
    out: &mut Vec<Command>,
) -> bool {
    if agent.cooldowns.teleport > 0 {
        return false;
    }

    let distance = agent.position.distance(player.position);
    if distance <= VAMPIRE_TELEPORT_MIN || distance >= VAMPIRE_TELEPORT_MAX {
        return false;
    }

    let behind = player.position - player.facing * VAMPIRE_TELEPORT_OFFSET;
    if !grid.is_position_walkable(behind) {
        return false;
    }

    out.push(Command::TeleportAgent {
        agent: agent.id,
        to: behind,
    });
    true
}

/// Reports whether a projectile is inside the dodge radius and closing in.
fn is_threatened(agent: &AgentSnapshot, attacks: &[AttackSnapshot]) -> bool {
    attacks.iter().any(|attack| {
        let offset = agent.position - attack.position;
        offset.length() < DODGE_TRIGGER_RADIUS && offset.dot(attack.direction) > 0.0
    })
}

fn plan_route(from: Vec2, to: Vec2, grid: &PlayableGrid) -> Vec<CellCoord> {
    match (grid.cell_of(from), grid.cell_of(to)) {
        (Some(start), Some(goal)) => find_path(start, goal, grid),
        _ => Vec::new(),
    }
}

/// Picks the furthest path cell whose one-step approach stays walkable.
fn step_along(
    position: Vec2,
    speed: f32,
    path: &[CellCoord],
    grid: &PlayableGrid,
) -> Option<Vec2> {
    path.iter().rev().find_map(|cell| {
        let direction = (grid.cell_center(*cell) - position).try_normalize()?;
        let candidate = position + direction * speed;
        grid.is_position_walkable(candidate).then_some(candidate)
    })
}
