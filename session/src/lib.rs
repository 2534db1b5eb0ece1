#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session orchestration wiring the world to the behaviour and director systems.
//!
//! A [`Session`] owns the authoritative world and every system. Each call to
//! [`Session::tick`] advances the simulation by one fixed step and pumps the
//! resulting events through the systems until no further commands are issued.
//! Host-facing outcomes are summarised as [`Effect`]s.

mod config;

use whispers_core::{
    AgentView, Command, Event, NarrativeCue, PlayMode, PlayerSnapshot, SessionOutcome, Upgrade,
    Wave,
};
use whispers_system_behavior::{self as behavior, Behavior, Surroundings};
use whispers_system_director::{self as director, Director};
use whispers_world::{self as world, query, World};

pub use config::{ConfigError, SessionConfig, DEFAULT_SEED};

/// Host-visible consequence of a simulation step.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Story text to present to the player.
    Narrative {
        /// Cue that produced the text.
        cue: NarrativeCue,
        /// Rendered story text.
        text: String,
    },
    /// The host must present these upgrades and submit a choice.
    UpgradeMenu(Vec<Upgrade>),
    /// The boss has fallen.
    Victory,
    /// The player has fallen.
    Defeat,
}

/// Everything that happened during a single tick or host submission.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Every world event in emission order.
    pub events: Vec<Event>,
    /// Host-facing summary of the events.
    pub effects: Vec<Effect>,
}

/// Running play session composed of the world and its systems.
#[derive(Debug)]
pub struct Session {
    world: World,
    behavior: Behavior,
    director: Director,
    opening: TickReport,
}

impl Session {
    /// Builds a session from a validated configuration and starts wave one.
    pub fn new(config: &SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        tracing::info!(
            "starting session with seed {} and {} waves",
            config.seed,
            config.max_waves
        );

        let mut session = Self {
            world: World::new(config.seed),
            behavior: Behavior::new(behavior::Config::new(config.seed.wrapping_add(1))),
            director: Director::new(director::Config::new(
                config.max_waves,
                config.seed.wrapping_add(2),
            )),
            opening: TickReport::default(),
        };
        session.opening = session.pump(vec![
            Command::ConfigureLayout {
                layout: config.layout.clone(),
            },
            Command::ResetSession,
        ]);
        Ok(session)
    }

    /// Advances the simulation by one tick.
    pub fn tick(&mut self) -> TickReport {
        self.pump(vec![Command::Tick])
    }

    /// Applies a host command such as movement, attacks or an upgrade choice.
    pub fn submit(&mut self, command: Command) -> TickReport {
        self.pump(vec![command])
    }

    /// Report produced while configuring the layout and starting wave one.
    #[must_use]
    pub fn opening(&self) -> &TickReport {
        &self.opening
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Current player snapshot.
    #[must_use]
    pub fn player(&self) -> PlayerSnapshot {
        query::player(&self.world)
    }

    /// Snapshot of every living agent.
    #[must_use]
    pub fn agents(&self) -> AgentView {
        query::agent_view(&self.world)
    }

    /// Current play mode.
    #[must_use]
    pub fn play_mode(&self) -> PlayMode {
        query::play_mode(&self.world)
    }

    /// Wave currently in progress, if any.
    #[must_use]
    pub fn current_wave(&self) -> Option<Wave> {
        query::current_wave(&self.world)
    }

    /// Upgrades awaiting a choice.
    #[must_use]
    pub fn upgrade_offer(&self) -> &[Upgrade] {
        query::upgrade_offer(&self.world)
    }

    fn pump(&mut self, commands: Vec<Command>) -> TickReport {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        let mut log = events.clone();

        while !events.is_empty() {
            let mut commands = Vec::new();
            {
                let agents = query::agent_view(&self.world);
                let player = query::player(&self.world);
                let attacks = query::attacks(&self.world);
                self.behavior.handle(
                    &events,
                    Surroundings {
                        agents: &agents,
                        player: &player,
                        attacks: &attacks,
                        grid: query::grid(&self.world),
                    },
                    &mut commands,
                );
                self.director
                    .handle(&events, &agents, player.abilities, &mut commands);
            }

            events.clear();
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
            log.extend(events.iter().cloned());
        }

        let effects = summarise(&log);
        TickReport {
            events: log,
            effects,
        }
    }
}

fn summarise(events: &[Event]) -> Vec<Effect> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::NarrativeTriggered { cue } => cue.text().map(|text| Effect::Narrative {
                cue: cue.clone(),
                text,
            }),
            Event::UpgradeOffered { choices } => Some(Effect::UpgradeMenu(choices.clone())),
            Event::SessionConcluded {
                outcome: SessionOutcome::Victory,
            } => Some(Effect::Victory),
            Event::SessionConcluded {
                outcome: SessionOutcome::Defeat,
            } => Some(Effect::Defeat),
            _ => None,
        })
        .collect()
}
