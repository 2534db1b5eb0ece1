#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Whispers.
//!
//! The world owns the playable-area grid, the player, every agent, projectile
//! and resource drop. It is mutated exclusively through [`apply`] and exposes
//! read-only state through the [`query`] module.

mod agents;
mod combat;
mod grid;
mod navigation;
mod player;

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use whispers_core::{
    Ability, AgentId, AgentKind, AgentState, CellCoord, Command, Event, NarrativeCue, Placement,
    PlayMode, RoomLayout, SessionOutcome, SpawnOrder, Upgrade, Vec2, Wave, ARENA_HEIGHT,
    ARENA_WIDTH, CELL_SIZE, TITLE,
};

use crate::{
    agents::{AgentRegistry, CHARGE_COOLDOWN, PATH_RECOMPUTE_INTERVAL, SUMMON_COOLDOWN},
    combat::{Attack, ResourceDrop, STATE_COUNTDOWN},
};

pub use grid::PlayableGrid;
pub use navigation::find_path;
pub use player::{EssencePool, Player, PLAYER_START};

/// Represents the authoritative Whispers world state.
#[derive(Debug)]
pub struct World {
    title: &'static str,
    layout: RoomLayout,
    grid: PlayableGrid,
    player: Player,
    agents: AgentRegistry,
    attacks: Vec<Attack>,
    drops: Vec<ResourceDrop>,
    next_drop: u32,
    mode: PlayMode,
    wave: Option<Wave>,
    offer: Vec<Upgrade>,
    tick_index: u64,
    seed: u64,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a world laid out as the castle, seeded for deterministic replays.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let layout = RoomLayout::castle();
        Self {
            title: TITLE,
            grid: build_grid(&layout),
            player: Player::new(&layout),
            layout,
            agents: AgentRegistry::default(),
            attacks: Vec::new(),
            drops: Vec::new(),
            next_drop: 0,
            mode: PlayMode::Active,
            wave: None,
            offer: Vec::new(),
            tick_index: 0,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn is_active(&self) -> bool {
        self.mode == PlayMode::Active
    }

    fn reset(&mut self, out_events: &mut Vec<Event>) {
        self.agents.clear();
        self.attacks.clear();
        self.drops.clear();
        self.next_drop = 0;
        self.player = Player::new(&self.layout);
        self.mode = PlayMode::Active;
        self.wave = None;
        self.offer.clear();
        self.tick_index = 0;
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        out_events.push(Event::SessionReset);
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) {
        if !self.is_active() {
            return;
        }

        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            tick: self.tick_index,
        });

        self.player.advance_timers();
        for agent in self.agents.iter_mut().filter(|agent| agent.is_spawned()) {
            if agent.advance_timers() {
                out_events.push(Event::AgentStateChanged {
                    agent: agent.id,
                    state: AgentState::Hunt,
                });
            }
        }

        self.place_pending_agents(out_events);
        self.resolve_attacks(out_events);
        self.collect_drops(out_events);
        self.resolve_contacts(out_events);
        self.agents.sweep();

        if self.player.health() == 0 {
            self.conclude(SessionOutcome::Defeat, out_events);
        }
    }

    /// Draws one placement attempt for every agent still waiting to spawn.
    fn place_pending_agents(&mut self, out_events: &mut Vec<Event>) {
        let player = self.player.position();
        let mut candidates: Option<Vec<CellCoord>> = None;

        for agent in self.agents.iter_mut().filter(|agent| !agent.is_spawned()) {
            let min_distance = match agent.placement {
                Placement::At(position) if self.grid.is_position_walkable(position) => {
                    agent.place(position);
                    tracing::debug!("agent {:?} ({:?}) placed at {}", agent.id, agent.kind, position);
                    out_events.push(Event::AgentSpawned {
                        agent: agent.id,
                        kind: agent.kind,
                        position,
                    });
                    continue;
                }
                Placement::At(_) => 0.0,
                Placement::Random { min_distance } => min_distance,
            };

            let cells = candidates.get_or_insert_with(|| self.grid.walkable_cells().collect());
            let Some(position) = cells
                .choose(&mut self.rng)
                .map(|cell| self.grid.cell_center(*cell))
            else {
                continue;
            };

            if position.distance(player) < min_distance {
                continue;
            }

            agent.place(position);
            tracing::debug!("agent {:?} ({:?}) spawned at {}", agent.id, agent.kind, position);
            out_events.push(Event::AgentSpawned {
                agent: agent.id,
                kind: agent.kind,
                position,
            });
        }
    }

    fn move_player(&mut self, direction: Vec2, out_events: &mut Vec<Event>) {
        let Some(direction) = direction.try_normalize() else {
            return;
        };

        self.player.face(direction);
        let from = self.player.position();
        let to = from + direction * self.player.speed();
        if !self.grid.is_position_walkable(to) {
            return;
        }

        let discovered = self.player.relocate(to, &self.layout);
        out_events.push(Event::PlayerMoved { from, to });
        if let Some(room) = discovered {
            out_events.push(Event::NarrativeTriggered {
                cue: NarrativeCue::AreaDiscovered(room),
            });
        }
    }

    fn spawned_agent_mut(&mut self, id: AgentId) -> Option<&mut agents::Agent> {
        self.agents.get_mut(id).filter(|agent| agent.is_spawned())
    }

    fn relocate_agent(&mut self, id: AgentId, to: Vec2, out_events: &mut Vec<Event>) {
        if !self.grid.is_position_walkable(to) {
            return;
        }

        if let Some(agent) = self.spawned_agent_mut(id) {
            let from = agent.position;
            agent.position = to;
            out_events.push(Event::AgentMoved {
                agent: id,
                from,
                to,
            });
        }
    }

    fn summon_minion(&mut self, summoner: AgentId, out_events: &mut Vec<Event>) {
        let Some(agent) = self.spawned_agent_mut(summoner) else {
            return;
        };
        agent.cooldowns.summon = SUMMON_COOLDOWN;
        let position = agent.position;

        if !self.grid.is_position_walkable(position) {
            return;
        }

        let id = self
            .agents
            .queue(&SpawnOrder::new(AgentKind::Ghoul, Placement::At(position)));
        if let Some(minion) = self.agents.get_mut(id) {
            minion.place(position);
        }
        tracing::debug!("agent {:?} summoned minion {:?}", summoner, id);
        out_events.push(Event::AgentQueued {
            agent: id,
            kind: AgentKind::Ghoul,
        });
        out_events.push(Event::AgentSpawned {
            agent: id,
            kind: AgentKind::Ghoul,
            position,
        });
    }

    fn start_wave(&mut self, wave: Wave, out_events: &mut Vec<Event>) {
        tracing::info!("starting {:?}", wave);
        self.wave = Some(wave);
        out_events.push(Event::WaveStarted { wave });

        let cue = match wave {
            Wave::Regular(number) => NarrativeCue::WaveStart(number),
            Wave::Boss => NarrativeCue::BossIntro,
        };
        if cue.text().is_some() {
            out_events.push(Event::NarrativeTriggered { cue });
        }
    }

    fn choose_upgrade(&mut self, upgrade: Upgrade, out_events: &mut Vec<Event>) {
        if self.mode != PlayMode::AwaitingUpgrade || !self.offer.contains(&upgrade) {
            return;
        }

        self.player.apply_upgrade(upgrade);
        self.offer.clear();
        self.mode = PlayMode::Active;
        tracing::info!("upgrade applied: {}", upgrade.name());
        out_events.push(Event::UpgradeApplied { upgrade });
        out_events.push(Event::NarrativeTriggered {
            cue: NarrativeCue::AbilityGained(upgrade),
        });
    }

    fn conclude(&mut self, outcome: SessionOutcome, out_events: &mut Vec<Event>) {
        if self.mode == PlayMode::Concluded {
            return;
        }

        tracing::info!("session concluded: {:?}", outcome);
        self.mode = PlayMode::Concluded;
        self.offer.clear();
        out_events.push(Event::SessionConcluded { outcome });
    }
}

fn build_grid(layout: &RoomLayout) -> PlayableGrid {
    PlayableGrid::build(layout, CELL_SIZE, Vec2::new(ARENA_WIDTH, ARENA_HEIGHT))
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureLayout { layout } => {
            world.grid = build_grid(&layout);
            world.layout = layout;
            out_events.push(Event::LayoutConfigured {
                columns: world.grid.columns(),
                rows: world.grid.rows(),
            });
        }
        Command::ResetSession => world.reset(out_events),
        Command::Tick => world.tick(out_events),
        Command::MovePlayer { direction } => {
            if world.is_active() {
                world.move_player(direction, out_events);
            }
        }
        Command::PlayerAttack { direction } => {
            if world.is_active() {
                world.launch_attack(direction, out_events);
            }
        }
        Command::ActivateAbility { ability } => {
            if !world.is_active() {
                return;
            }

            if world.player.activate(ability) {
                out_events.push(Event::AbilityActivated { ability });
                if ability == Ability::Heal {
                    out_events.push(Event::PlayerHealed {
                        health: world.player.health(),
                    });
                }
            } else {
                out_events.push(Event::AbilityRejected { ability });
            }
        }
        Command::StartWave { wave } => world.start_wave(wave, out_events),
        Command::SpawnAgent { order } => {
            let agent = world.agents.queue(&order);
            out_events.push(Event::AgentQueued {
                agent,
                kind: order.kind,
            });
        }
        Command::SetAgentPath { agent, path } => {
            let valid = path.iter().all(|cell| world.grid.is_walkable(*cell));
            if let Some(record) = world.spawned_agent_mut(agent) {
                record.path = if valid { path } else { Vec::new() };
                record.path_countdown = PATH_RECOMPUTE_INTERVAL;
                out_events.push(Event::AgentPathAssigned {
                    agent,
                    length: record.path.len(),
                });
            }
        }
        Command::MoveAgent { agent, to } => {
            if world.is_active() {
                world.relocate_agent(agent, to, out_events);
            }
        }
        Command::ChangeAgentState { agent, state } => {
            let countdown = world.rng.gen_range(STATE_COUNTDOWN);
            if let Some(record) = world.spawned_agent_mut(agent) {
                if record.kind.is_boss() {
                    return;
                }
                record.enter_state(state, countdown);
                out_events.push(Event::AgentStateChanged { agent, state });
            }
        }
        Command::SummonMinion { summoner } => {
            if world.is_active() {
                world.summon_minion(summoner, out_events);
            }
        }
        Command::ChargeAgent { agent, to } => {
            if !world.is_active() {
                return;
            }
            if let Some(record) = world.spawned_agent_mut(agent) {
                record.cooldowns.charge = CHARGE_COOLDOWN;
                record.charging = true;
            }
            world.relocate_agent(agent, to, out_events);
        }
        Command::TeleportAgent { agent, to } => {
            if !world.is_active() {
                return;
            }
            if let Some(record) = world.spawned_agent_mut(agent) {
                record.cooldowns.teleport = record.kind.teleport_cooldown_ticks().unwrap_or(0);
            }
            world.relocate_agent(agent, to, out_events);
        }
        Command::DamageAgent { agent, amount } => {
            world.apply_damage(agent, amount, out_events);
            world.agents.sweep();
        }
        Command::HealAgent { agent, amount } => {
            if let Some(record) = world.agents.get_mut(agent) {
                record.health = record.health.saturating_add(amount).min(record.max_health);
                out_events.push(Event::AgentHealed {
                    agent,
                    health: record.health,
                });
            }
        }
        Command::OfferUpgrades { choices } => {
            if !world.is_active() {
                return;
            }
            world.mode = PlayMode::AwaitingUpgrade;
            world.offer = choices.clone();
            out_events.push(Event::UpgradeOffered { choices });
        }
        Command::ChooseUpgrade { upgrade } => world.choose_upgrade(upgrade, out_events),
        Command::ConcludeSession { outcome } => world.conclude(outcome, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use whispers_core::{
        AgentView, AttackSnapshot, DropId, PlayMode, PlayerSnapshot, RoomLayout, Upgrade, Vec2,
        Wave,
    };

    use super::{PlayableGrid, World};

    /// Retrieves the title that adapters may display to players.
    #[must_use]
    pub fn title(world: &World) -> &'static str {
        world.title
    }

    /// Provides read-only access to the room layout.
    #[must_use]
    pub fn layout(world: &World) -> &RoomLayout {
        &world.layout
    }

    /// Provides read-only access to the playable-area grid.
    #[must_use]
    pub fn grid(world: &World) -> &PlayableGrid {
        &world.grid
    }

    /// Captures a read-only view of every living agent.
    #[must_use]
    pub fn agent_view(world: &World) -> AgentView {
        AgentView::from_snapshots(world.agents.iter().map(|agent| agent.snapshot()).collect())
    }

    /// Captures the player's state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player.snapshot()
    }

    /// Captures every in-flight player attack.
    #[must_use]
    pub fn attacks(world: &World) -> Vec<AttackSnapshot> {
        world.attacks.iter().map(|attack| attack.snapshot()).collect()
    }

    /// Captures every resource drop waiting to be collected.
    #[must_use]
    pub fn drops(world: &World) -> Vec<DropSnapshot> {
        world
            .drops
            .iter()
            .map(|drop| DropSnapshot {
                id: drop.id,
                position: drop.position,
                amount: drop.amount,
            })
            .collect()
    }

    /// Reports whether the world currently advances on ticks.
    #[must_use]
    pub fn play_mode(world: &World) -> PlayMode {
        world.mode
    }

    /// Wave most recently started, if any.
    #[must_use]
    pub fn current_wave(world: &World) -> Option<Wave> {
        world.wave
    }

    /// Upgrades currently offered to the player.
    #[must_use]
    pub fn upgrade_offer(world: &World) -> &[Upgrade] {
        &world.offer
    }

    /// Number of ticks simulated since the last reset.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Immutable representation of an uncollected resource drop.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct DropSnapshot {
        /// Identifier of the drop.
        pub id: DropId,
        /// Position of the drop.
        pub position: Vec2,
        /// Essence granted on pickup.
        pub amount: u32,
    }
}

#[cfg(test)]
mod tests {
    use whispers_core::{AgentSnapshot, BossPhase, Room, RoomRect};

    use super::*;

    fn run(world: &mut World, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, command, &mut events);
        events
    }

    fn only_agent(world: &World) -> AgentSnapshot {
        query::agent_view(world)
            .into_vec()
            .into_iter()
            .next()
            .expect("one agent")
    }

    #[test]
    fn configure_layout_rebuilds_the_grid() {
        let mut world = World::new(1);
        let layout = RoomLayout::new(vec![Room::new(
            "crypt",
            RoomRect::new(0.0, 0.0, 150.0, 150.0),
        )]);

        let events = run(&mut world, Command::ConfigureLayout { layout });

        assert_eq!(
            events,
            vec![Event::LayoutConfigured {
                columns: 54,
                rows: 47
            }]
        );
        assert_eq!(query::grid(&world).walkable_cells().count(), 100);
        assert!(!query::grid(&world).is_walkable(CellCoord::new(20, 20)));
    }

    #[test]
    fn random_spawns_keep_their_distance_from_the_player() {
        let mut world = World::new(11);
        let _ = run(
            &mut world,
            Command::SpawnAgent {
                order: SpawnOrder::new(AgentKind::Ghoul, Placement::Random { min_distance: 150.0 }),
            },
        );

        for _ in 0..200 {
            let _ = run(&mut world, Command::Tick);
            if only_agent(&world).is_spawned() {
                break;
            }
        }

        let agent = only_agent(&world);
        assert!(agent.is_spawned());
        assert!(agent.position.distance(PLAYER_START) >= 150.0);
        assert!(query::grid(&world).is_position_walkable(agent.position));
    }

    #[test]
    fn agent_moves_into_blocked_cells_are_rejected() {
        let mut world = World::new(2);
        let _ = run(
            &mut world,
            Command::SpawnAgent {
                order: SpawnOrder::new(AgentKind::Ghoul, Placement::At(Vec2::new(600.0, 300.0))),
            },
        );
        let _ = run(&mut world, Command::Tick);
        let id = only_agent(&world).id;

        let rejected = run(
            &mut world,
            Command::MoveAgent {
                agent: id,
                to: Vec2::new(400.0, 50.0),
            },
        );
        assert!(rejected.is_empty());

        let accepted = run(
            &mut world,
            Command::MoveAgent {
                agent: id,
                to: Vec2::new(602.0, 300.0),
            },
        );
        assert_eq!(accepted.len(), 1);
        assert_eq!(only_agent(&world).position, Vec2::new(602.0, 300.0));
    }

    #[test]
    fn set_path_replaces_the_active_path_and_resets_the_countdown() {
        let mut world = World::new(2);
        let _ = run(
            &mut world,
            Command::SpawnAgent {
                order: SpawnOrder::new(AgentKind::Ghoul, Placement::At(Vec2::new(600.0, 300.0))),
            },
        );
        let _ = run(&mut world, Command::Tick);
        let id = only_agent(&world).id;
        let path = vec![CellCoord::new(40, 20), CellCoord::new(39, 20)];

        let _ = run(
            &mut world,
            Command::SetAgentPath {
                agent: id,
                path: path.clone(),
            },
        );

        let agent = only_agent(&world);
        assert_eq!(agent.path, path);
        assert_eq!(agent.path_countdown, PATH_RECOMPUTE_INTERVAL);
    }

    #[test]
    fn failed_teleport_still_consumes_the_cooldown() {
        let mut world = World::new(2);
        let _ = run(
            &mut world,
            Command::SpawnAgent {
                order: SpawnOrder::new(AgentKind::Vampire, Placement::At(Vec2::new(600.0, 300.0))),
            },
        );
        let _ = run(&mut world, Command::Tick);
        let id = only_agent(&world).id;

        let events = run(
            &mut world,
            Command::TeleportAgent {
                agent: id,
                to: Vec2::new(400.0, 50.0),
            },
        );

        assert!(events.is_empty());
        let agent = only_agent(&world);
        assert_eq!(agent.position, Vec2::new(600.0, 300.0));
        assert_eq!(agent.cooldowns.teleport, 180);
    }

    #[test]
    fn boss_phase_never_regresses_after_healing() {
        let mut world = World::new(4);
        let _ = run(
            &mut world,
            Command::SpawnAgent {
                order: SpawnOrder::new(AgentKind::VampireLord, Placement::At(Vec2::new(610.0, 330.0))),
            },
        );
        let _ = run(&mut world, Command::Tick);
        let id = only_agent(&world).id;

        let mut phases = vec![only_agent(&world).phase];
        for amount in [1, 3, 1] {
            let events = run(&mut world, Command::DamageAgent { agent: id, amount });
            phases.push(only_agent(&world).phase);
            let announced = events
                .iter()
                .filter(|event| matches!(event, Event::BossPhaseChanged { .. }))
                .count();
            assert!(announced <= 1);
        }
        assert_eq!(
            phases,
            vec![
                Some(BossPhase::One),
                Some(BossPhase::Two),
                Some(BossPhase::Three),
                Some(BossPhase::Three),
            ]
        );

        let _ = run(&mut world, Command::HealAgent { agent: id, amount: 5 });
        let boss = only_agent(&world);
        assert_eq!(boss.health, 6);
        assert_eq!(boss.phase, Some(BossPhase::Three));
    }

    #[test]
    fn minions_appear_at_the_summoner() {
        let mut world = World::new(4);
        let boss_position = Vec2::new(610.0, 330.0);
        let _ = run(
            &mut world,
            Command::SpawnAgent {
                order: SpawnOrder::new(AgentKind::VampireLord, Placement::At(boss_position)),
            },
        );
        let _ = run(&mut world, Command::Tick);
        let id = only_agent(&world).id;

        let _ = run(&mut world, Command::SummonMinion { summoner: id });

        let view = query::agent_view(&world);
        assert_eq!(view.count_kind(AgentKind::Ghoul), 1);
        assert!(view
            .iter()
            .filter(|agent| agent.kind == AgentKind::Ghoul)
            .all(|agent| agent.is_spawned() && agent.position == boss_position));
        assert_eq!(
            view.get(id).map(|boss| boss.cooldowns.summon),
            Some(SUMMON_COOLDOWN)
        );
    }

    #[test]
    fn player_moves_are_confined_to_walkable_cells() {
        let mut world = World::new(1);
        for _ in 0..200 {
            let _ = run(&mut world, Command::MovePlayer { direction: Vec2::NEG_X });
        }

        let player = query::player(&world);
        assert!(query::grid(&world).is_position_walkable(player.position));
        assert!(player.position.x < 60.0);
        assert_eq!(player.current_room.as_deref(), Some("entrance"));
    }

    #[test]
    fn entering_a_new_room_triggers_area_narrative_once() {
        let mut world = World::new(1);
        let mut cues = Vec::new();
        for _ in 0..60 {
            let _ = run(&mut world, Command::MovePlayer { direction: Vec2::NEG_Y });
        }
        for _ in 0..80 {
            for event in run(&mut world, Command::MovePlayer { direction: Vec2::X }) {
                if let Event::NarrativeTriggered { cue } = event {
                    cues.push(cue);
                }
            }
        }

        assert_eq!(
            cues,
            vec![
                NarrativeCue::AreaDiscovered("hallway".to_owned()),
                NarrativeCue::AreaDiscovered("grand_hall".to_owned()),
            ]
        );
    }

    #[test]
    fn abilities_spend_essence_or_are_rejected() {
        let mut world = World::new(1);

        let rejected = run(&mut world, Command::ActivateAbility { ability: Ability::MistForm });
        assert_eq!(rejected, vec![Event::AbilityRejected { ability: Ability::MistForm }]);

        world.player.apply_upgrade(Upgrade::MistForm);
        let accepted = run(&mut world, Command::ActivateAbility { ability: Ability::MistForm });
        assert_eq!(accepted, vec![Event::AbilityActivated { ability: Ability::MistForm }]);
        assert_eq!(query::player(&world).essence, 30);
        assert!(query::player(&world).is_invincible());
    }

    #[test]
    fn upgrade_offers_freeze_the_world_until_a_valid_choice() {
        let mut world = World::new(1);
        let _ = run(
            &mut world,
            Command::OfferUpgrades {
                choices: vec![Upgrade::HealthUp, Upgrade::BatTransform],
            },
        );

        assert!(run(&mut world, Command::Tick).is_empty());
        assert!(run(&mut world, Command::ChooseUpgrade { upgrade: Upgrade::MistForm }).is_empty());

        let events = run(&mut world, Command::ChooseUpgrade { upgrade: Upgrade::HealthUp });
        assert_eq!(events[0], Event::UpgradeApplied { upgrade: Upgrade::HealthUp });
        assert_eq!(query::play_mode(&world), PlayMode::Active);
        assert_eq!(query::player(&world).max_health, 4);
    }

    #[test]
    fn sustained_contact_defeats_the_player() {
        let mut world = World::new(9);
        let _ = run(
            &mut world,
            Command::SpawnAgent {
                order: SpawnOrder::new(AgentKind::Werewolf, Placement::At(PLAYER_START)),
            },
        );

        let mut concluded = None;
        for _ in 0..400 {
            for event in run(&mut world, Command::Tick) {
                if let Event::SessionConcluded { outcome } = event {
                    concluded = Some(outcome);
                }
            }
            if concluded.is_some() {
                break;
            }
        }

        assert_eq!(concluded, Some(SessionOutcome::Defeat));
        assert_eq!(query::play_mode(&world), PlayMode::Concluded);
        assert!(run(&mut world, Command::Tick).is_empty());
    }

    #[test]
    fn reset_restores_a_fresh_session() {
        let mut world = World::new(9);
        let _ = run(
            &mut world,
            Command::SpawnAgent {
                order: SpawnOrder::new(AgentKind::Ghoul, Placement::Random { min_distance: 150.0 }),
            },
        );
        let _ = run(&mut world, Command::ConcludeSession { outcome: SessionOutcome::Defeat });

        let events = run(&mut world, Command::ResetSession);

        assert_eq!(events, vec![Event::SessionReset]);
        assert_eq!(query::agent_view(&world).population(), 0);
        assert_eq!(query::play_mode(&world), PlayMode::Active);
        assert_eq!(query::player(&world).position, PLAYER_START);
        assert_eq!(query::tick_index(&world), 0);
    }

    #[test]
    fn wounded_werewolf_enrages_exactly_once() {
        let mut world = World::new(4);
        let _ = run(
            &mut world,
            Command::SpawnAgent {
                order: SpawnOrder::new(AgentKind::Werewolf, Placement::At(Vec2::new(200.0, 440.0))),
            },
        );
        let _ = run(&mut world, Command::Tick);
        let id = only_agent(&world).id;
        assert_eq!(only_agent(&world).speed, 4.0);

        let mut log = Vec::new();
        for _ in 0..100 {
            if only_agent(&world).health == 1 {
                break;
            }
            if query::player(&world).attack_ready {
                log.extend(run(&mut world, Command::PlayerAttack { direction: Vec2::NEG_Y }));
            }
            log.extend(run(&mut world, Command::Tick));
        }

        let werewolf = only_agent(&world);
        assert_eq!(werewolf.health, 1);
        assert!(log.contains(&Event::AgentDamaged { agent: id, health: 2 }));
        let rages = log
            .iter()
            .filter(|event| **event == Event::AgentEnraged { agent: id })
            .count();
        assert_eq!(rages, 1);
        assert_eq!(werewolf.speed, 6.0);
    }

    #[test]
    fn reset_rewinds_the_random_stream() {
        let order = SpawnOrder::new(AgentKind::Ghoul, Placement::Random { min_distance: 150.0 });
        let mut played = World::new(21);
        for _ in 0..3 {
            let _ = run(&mut played, Command::SpawnAgent { order });
            let _ = run(&mut played, Command::Tick);
        }
        let _ = run(&mut played, Command::ResetSession);
        let mut fresh = World::new(21);
        let _ = run(&mut fresh, Command::ResetSession);

        for world in [&mut played, &mut fresh] {
            let _ = run(world, Command::SpawnAgent { order });
            for _ in 0..50 {
                let _ = run(world, Command::Tick);
            }
        }

        assert_eq!(
            query::agent_view(&played).into_vec(),
            query::agent_view(&fresh).into_vec()
        );
    }
}
