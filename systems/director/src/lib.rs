#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave director sequencing regular waves, upgrade offers and the boss encounter.
//!
//! The director watches the living population and, once a wave has been
//! cleared, waits out a short transition before either offering upgrades or
//! starting the boss wave. Clearing the boss wave concludes the session with a
//! victory.

use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use whispers_core::{
    AbilitySet, AgentKind, AgentView, Command, Event, Placement, SessionOutcome, SpawnOrder,
    StatOverrides, Upgrade, Vec2, Wave,
};

/// Ticks between a wave being cleared and the next step of the encounter.
pub const TRANSITION_TICKS: u32 = 60;
/// Maximum number of upgrades presented in a single offer.
pub const MAX_UPGRADE_CHOICES: usize = 3;
/// Minimum distance from the player at which regular agents may appear.
pub const SPAWN_MIN_DISTANCE: f32 = 150.0;
/// Arrival point of the boss.
pub const BOSS_SPAWN: Vec2 = Vec2::new(610.0, 330.0);

/// Configuration parameters required to construct the director.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    max_waves: u32,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration with the number of regular waves and seed.
    #[must_use]
    pub const fn new(max_waves: u32, rng_seed: u64) -> Self {
        Self {
            max_waves,
            rng_seed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Engaged(Wave),
    Transitioning { cleared: Wave, remaining: u32 },
    AwaitingUpgrade { next: u32 },
    Concluded,
}

/// Pure system that emits wave, spawn, upgrade and victory commands.
#[derive(Debug)]
pub struct Director {
    max_waves: u32,
    phase: Phase,
    rng_seed: u64,
    rng: ChaCha8Rng,
}

impl Director {
    /// Creates a new director using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            max_waves: config.max_waves.max(1),
            phase: Phase::Idle,
            rng_seed: config.rng_seed,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Wave currently being fought, if any.
    #[must_use]
    pub fn current_wave(&self) -> Option<Wave> {
        match self.phase {
            Phase::Engaged(wave) => Some(wave),
            _ => None,
        }
    }

    /// Reports whether the director is counting down between waves.
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, Phase::Transitioning { .. })
    }

    /// Consumes world events and immutable views to emit encounter commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        agents: &AgentView,
        abilities: AbilitySet,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::SessionReset => {
                    self.rng = ChaCha8Rng::seed_from_u64(self.rng_seed);
                    self.begin(Wave::Regular(1), out);
                }
                Event::SessionConcluded { .. } => self.phase = Phase::Concluded,
                Event::UpgradeApplied { .. } => {
                    if let Phase::AwaitingUpgrade { next } = self.phase {
                        self.begin(Wave::Regular(next), out);
                    }
                }
                Event::TimeAdvanced { .. } => match self.phase {
                    Phase::Engaged(wave) => self.check_cleared(wave, agents, out),
                    Phase::Transitioning { cleared, remaining } => {
                        self.count_down(cleared, remaining, abilities, out);
                    }
                    Phase::Idle | Phase::AwaitingUpgrade { .. } | Phase::Concluded => {}
                },
                Event::AgentDied { .. } => {
                    if let Phase::Engaged(wave) = self.phase {
                        self.check_cleared(wave, agents, out);
                    }
                }
                _ => {}
            }
        }
    }

    fn begin(&mut self, wave: Wave, out: &mut Vec<Command>) {
        tracing::info!("director starting {:?}", wave);
        self.phase = Phase::Engaged(wave);
        out.push(Command::StartWave { wave });
        out.extend(
            wave_composition(wave, self.max_waves)
                .into_iter()
                .map(|order| Command::SpawnAgent { order }),
        );
    }

    fn check_cleared(&mut self, wave: Wave, agents: &AgentView, out: &mut Vec<Command>) {
        if agents.population() > 0 {
            return;
        }

        match wave {
            Wave::Boss => {
                tracing::info!("boss wave cleared");
                self.phase = Phase::Concluded;
                out.push(Command::ConcludeSession {
                    outcome: SessionOutcome::Victory,
                });
            }
            Wave::Regular(number) => {
                tracing::info!("wave {} cleared", number);
                self.phase = Phase::Transitioning {
                    cleared: wave,
                    remaining: TRANSITION_TICKS,
                };
            }
        }
    }

    fn count_down(
        &mut self,
        cleared: Wave,
        remaining: u32,
        abilities: AbilitySet,
        out: &mut Vec<Command>,
    ) {
        let remaining = remaining.saturating_sub(1);
        if remaining > 0 {
            self.phase = Phase::Transitioning { cleared, remaining };
            return;
        }

        let number = match cleared {
            Wave::Regular(number) => number,
            Wave::Boss => {
                self.phase = Phase::Concluded;
                return;
            }
        };

        if number >= self.max_waves {
            self.begin(Wave::Boss, out);
            return;
        }

        let choices = offer_upgrades(abilities, &mut self.rng);
        if choices.is_empty() {
            self.begin(Wave::Regular(number + 1), out);
            return;
        }

        tracing::debug!("offering upgrades {:?}", choices);
        self.phase = Phase::AwaitingUpgrade { next: number + 1 };
        out.push(Command::OfferUpgrades { choices });
    }
}

/// Builds the spawn orders making up the given wave.
///
/// Regular waves grow with their number; the final regular wave trades volume
/// for a weakened mixed squad including a werewolf.
#[must_use]
pub fn wave_composition(wave: Wave, max_waves: u32) -> Vec<SpawnOrder> {
    let number = match wave {
        Wave::Boss => {
            return vec![SpawnOrder::new(
                AgentKind::VampireLord,
                Placement::At(BOSS_SPAWN),
            )]
        }
        Wave::Regular(number) => number,
    };

    let placement = Placement::Random {
        min_distance: SPAWN_MIN_DISTANCE,
    };
    let mut orders = Vec::new();

    if number >= max_waves {
        let ghoul = SpawnOrder::new(AgentKind::Ghoul, placement).with_overrides(StatOverrides {
            health: Some(1),
            speed: Some(1.5),
            blood_value: Some(15),
            teleport_cooldown: None,
        });
        orders.extend(std::iter::repeat(ghoul).take(3));
        orders.push(
            SpawnOrder::new(AgentKind::Vampire, placement).with_overrides(StatOverrides {
                health: Some(2),
                speed: Some(2.0),
                blood_value: Some(30),
                teleport_cooldown: Some(300),
            }),
        );
        orders.push(
            SpawnOrder::new(AgentKind::Werewolf, placement).with_overrides(StatOverrides {
                health: Some(2),
                speed: Some(3.0),
                blood_value: Some(50),
                teleport_cooldown: None,
            }),
        );
        return orders;
    }

    let ghouls = number.saturating_mul(2) as usize;
    let vampires = number.saturating_sub(1) as usize;
    orders.extend(std::iter::repeat(SpawnOrder::new(AgentKind::Ghoul, placement)).take(ghouls));
    orders.extend(std::iter::repeat(SpawnOrder::new(AgentKind::Vampire, placement)).take(vampires));
    orders
}

/// Draws up to three upgrades the player does not already own.
pub fn offer_upgrades<R: rand::Rng + ?Sized>(abilities: AbilitySet, rng: &mut R) -> Vec<Upgrade> {
    let available: Vec<Upgrade> = Upgrade::ALL
        .into_iter()
        .filter(|upgrade| !abilities.owns(*upgrade))
        .collect();
    available
        .choose_multiple(rng, MAX_UPGRADE_CHOICES)
        .copied()
        .collect()
}
