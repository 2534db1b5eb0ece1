use whispers_core::{AgentKind, Command, Event, PlayMode, SessionOutcome, Upgrade, Wave};
use whispers_system_director::{Config, Director, TRANSITION_TICKS};
use whispers_world::{self as world, query, World};

struct Harness {
    world: World,
    director: Director,
}

impl Harness {
    fn new(max_waves: u32) -> Self {
        let mut harness = Self {
            world: World::new(11),
            director: Director::new(Config::new(max_waves, 11)),
        };
        let _ = harness.submit(Command::ResetSession);
        harness
    }

    fn submit(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        let mut log = events.clone();

        while !events.is_empty() {
            let agents = query::agent_view(&self.world);
            let player = query::player(&self.world);
            let mut commands = Vec::new();
            self.director
                .handle(&events, &agents, player.abilities, &mut commands);

            events.clear();
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
            log.extend(events.iter().cloned());
        }

        log
    }

    fn slay_all(&mut self) -> Vec<Event> {
        let ids: Vec<_> = query::agent_view(&self.world)
            .iter()
            .map(|agent| agent.id)
            .collect();
        let mut log = Vec::new();
        for agent in ids {
            log.extend(self.submit(Command::DamageAgent { agent, amount: 99 }));
        }
        log
    }
}

fn offered(events: &[Event]) -> Option<Vec<Upgrade>> {
    events.iter().find_map(|event| match event {
        Event::UpgradeOffered { choices } => Some(choices.clone()),
        _ => None,
    })
}

#[test]
fn reset_queues_the_first_wave() {
    let harness = Harness::new(3);
    let view = query::agent_view(&harness.world);

    assert_eq!(query::current_wave(&harness.world), Some(Wave::Regular(1)));
    assert_eq!(view.count_kind(AgentKind::Ghoul), 2);
    assert_eq!(view.population(), 2);
}

#[test]
fn clearing_a_wave_offers_upgrades_sixty_ticks_later() {
    let mut harness = Harness::new(3);
    let _ = harness.slay_all();
    assert!(harness.director.is_transitioning());

    for _ in 1..TRANSITION_TICKS {
        let events = harness.submit(Command::Tick);
        assert!(offered(&events).is_none());
    }
    let events = harness.submit(Command::Tick);

    let choices = offered(&events).expect("upgrade menu");
    assert!(!choices.is_empty() && choices.len() <= 3);
    assert_eq!(query::play_mode(&harness.world), PlayMode::AwaitingUpgrade);
}

#[test]
fn owned_abilities_are_never_offered_again() {
    let mut harness = Harness::new(6);

    for wave in 1..=4 {
        let _ = harness.slay_all();
        let mut choices = None;
        for _ in 0..TRANSITION_TICKS {
            choices = choices.or_else(|| offered(&harness.submit(Command::Tick)));
        }
        let choices = choices.expect("upgrade menu");
        let owned = query::player(&harness.world).abilities;
        assert!(
            choices.iter().all(|upgrade| !owned.owns(*upgrade)),
            "wave {wave} offered an owned ability"
        );

        let pick = choices
            .iter()
            .copied()
            .find(|upgrade| upgrade.is_single_acquisition())
            .unwrap_or(choices[0]);
        let events = harness.submit(Command::ChooseUpgrade { upgrade: pick });
        assert!(events.contains(&Event::WaveStarted {
            wave: Wave::Regular(wave + 1)
        }));
    }
}

#[test]
fn final_regular_wave_leads_to_the_boss_and_victory() {
    let mut harness = Harness::new(1);
    let _ = harness.slay_all();

    let mut boss_started = false;
    for _ in 0..TRANSITION_TICKS {
        let events = harness.submit(Command::Tick);
        boss_started |= events.contains(&Event::WaveStarted { wave: Wave::Boss });
    }
    assert!(boss_started);
    assert_eq!(
        query::agent_view(&harness.world).count_kind(AgentKind::VampireLord),
        1
    );

    let events = harness.slay_all();

    assert!(events.contains(&Event::SessionConcluded {
        outcome: SessionOutcome::Victory
    }));
    assert_eq!(query::play_mode(&harness.world), PlayMode::Concluded);
}

#[test]
fn reset_after_conclusion_restarts_from_wave_one() {
    let mut harness = Harness::new(1);
    let _ = harness.submit(Command::ConcludeSession {
        outcome: SessionOutcome::Defeat,
    });

    let events = harness.submit(Command::ResetSession);

    assert!(events.contains(&Event::WaveStarted {
        wave: Wave::Regular(1)
    }));
    assert_eq!(query::play_mode(&harness.world), PlayMode::Active);
}
