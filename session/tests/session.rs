use whispers_core::{AgentKind, Command, Event, NarrativeCue, PlayMode, RoomLayout, Upgrade, Wave};
use whispers_session::{ConfigError, Effect, Session, SessionConfig, TickReport};

fn session(seed: u64) -> Session {
    Session::new(&SessionConfig {
        seed,
        ..SessionConfig::default()
    })
    .expect("default configuration is valid")
}

fn clear_wave(session: &mut Session) {
    let ids: Vec<_> = session.agents().iter().map(|agent| agent.id).collect();
    for agent in ids {
        let _ = session.submit(Command::DamageAgent { agent, amount: 10 });
    }
}

fn menu(report: &TickReport) -> Option<Vec<Upgrade>> {
    report.effects.iter().find_map(|effect| match effect {
        Effect::UpgradeMenu(choices) => Some(choices.clone()),
        _ => None,
    })
}

#[test]
fn sessions_open_on_the_first_wave() {
    let session = session(1);

    assert_eq!(session.current_wave(), Some(Wave::Regular(1)));
    assert_eq!(session.agents().count_kind(AgentKind::Ghoul), 2);
    assert_eq!(session.play_mode(), PlayMode::Active);
    assert_eq!(session.player().health, 3);
    assert!(session.opening().effects.iter().any(|effect| matches!(
        effect,
        Effect::Narrative { cue: NarrativeCue::WaveStart(1), .. }
    )));
}

#[test]
fn cleared_wave_presents_a_menu_after_sixty_ticks() {
    let mut session = session(2);
    clear_wave(&mut session);
    assert_eq!(session.agents().population(), 0);

    for tick in 1..60 {
        assert_eq!(menu(&session.tick()), None, "menu shown early at tick {tick}");
    }
    let report = session.tick();

    let choices = menu(&report).expect("upgrade menu");
    assert!(!choices.is_empty() && choices.len() <= 3);
    assert_eq!(session.upgrade_offer(), choices.as_slice());
    assert_eq!(session.play_mode(), PlayMode::AwaitingUpgrade);

    let frozen = session.tick();
    assert!(frozen.events.is_empty());
}

#[test]
fn choosing_an_upgrade_starts_the_next_wave() {
    let mut session = session(3);
    clear_wave(&mut session);
    let mut choices = None;
    for _ in 0..60 {
        choices = choices.or_else(|| menu(&session.tick()));
    }
    let choice = choices.expect("upgrade menu")[0];

    let report = session.submit(Command::ChooseUpgrade { upgrade: choice });

    assert!(report.events.contains(&Event::WaveStarted {
        wave: Wave::Regular(2)
    }));
    assert!(report.effects.iter().any(|effect| matches!(
        effect,
        Effect::Narrative { cue: NarrativeCue::AbilityGained(upgrade), .. } if *upgrade == choice
    )));
    assert_eq!(session.current_wave(), Some(Wave::Regular(2)));
    assert_eq!(session.agents().population(), 5);
}

#[test]
fn an_idle_player_is_eventually_overrun() {
    let mut session = session(4);

    let defeated = (0..3_000).any(|_| session.tick().effects.contains(&Effect::Defeat));

    assert!(defeated);
    assert_eq!(session.play_mode(), PlayMode::Concluded);
    assert_eq!(session.player().health, 0);
    assert!(session.tick().events.is_empty());
}

#[test]
fn reset_restores_a_fresh_first_wave() {
    let mut session = session(5);
    clear_wave(&mut session);
    for _ in 0..30 {
        let _ = session.tick();
    }

    let report = session.submit(Command::ResetSession);

    assert!(report.events.contains(&Event::SessionReset));
    assert_eq!(session.current_wave(), Some(Wave::Regular(1)));
    assert_eq!(session.agents().population(), 2);
    assert_eq!(session.player().essence, 50);
}

#[test]
fn identical_seeds_replay_identically() {
    let mut first = session(99);
    let mut second = session(99);

    for _ in 0..400 {
        assert_eq!(first.tick(), second.tick());
    }
    assert_eq!(first.player(), second.player());
}

#[test]
fn invalid_configurations_are_refused() {
    let config = SessionConfig {
        layout: RoomLayout::new(Vec::new()),
        ..SessionConfig::default()
    };

    assert!(matches!(Session::new(&config), Err(ConfigError::EmptyLayout)));
}

#[test]
fn bundled_configuration_describes_the_castle() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../whispers.toml");
    let config = SessionConfig::load(&path).expect("bundled configuration loads");

    assert_eq!(config.layout, RoomLayout::castle());
    assert_eq!(config.max_waves, 3);
    assert!(Session::new(&config).is_ok());
}

#[test]
fn reset_replays_like_a_fresh_session() {
    let mut played = session(7);
    for _ in 0..200 {
        let _ = played.tick();
    }
    let _ = played.submit(Command::ResetSession);
    let mut fresh = session(7);

    assert_eq!(played.agents().into_vec(), fresh.agents().into_vec());
    assert_eq!(played.player(), fresh.player());
    for _ in 0..300 {
        assert_eq!(played.tick(), fresh.tick());
    }
}
