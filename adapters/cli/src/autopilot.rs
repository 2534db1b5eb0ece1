//! Scripted player used for headless runs.

use whispers_core::{Ability, AgentView, Command, PlayMode, PlayerSnapshot, Upgrade};

const ENGAGE_RANGE: f32 = 260.0;
const COMFORT_RANGE: f32 = 120.0;
const MIST_TRIGGER_RANGE: f32 = 40.0;

/// Chooses the host commands to submit before the next tick.
pub(crate) fn plan(
    mode: PlayMode,
    player: &PlayerSnapshot,
    agents: &AgentView,
    offer: &[Upgrade],
) -> Vec<Command> {
    match mode {
        PlayMode::Concluded => Vec::new(),
        PlayMode::AwaitingUpgrade => offer
            .first()
            .map(|&upgrade| vec![Command::ChooseUpgrade { upgrade }])
            .unwrap_or_default(),
        PlayMode::Active => engage(player, agents),
    }
}

fn engage(player: &PlayerSnapshot, agents: &AgentView) -> Vec<Command> {
    let mut commands = Vec::new();
    if player.health < player.max_health && player.essence >= Ability::Heal.cost() {
        commands.push(Command::ActivateAbility {
            ability: Ability::Heal,
        });
    }

    let Some(target) = agents
        .iter()
        .filter(|agent| agent.is_spawned())
        .min_by(|a, b| {
            a.position
                .distance(player.position)
                .total_cmp(&b.position.distance(player.position))
        })
    else {
        return commands;
    };

    let offset = target.position - player.position;
    let distance = offset.length();

    if distance < MIST_TRIGGER_RANGE
        && !player.is_invincible()
        && player.abilities.permits(Ability::MistForm)
        && player.essence >= Ability::MistForm.cost()
    {
        commands.push(Command::ActivateAbility {
            ability: Ability::MistForm,
        });
    }

    if player.attack_ready && distance < ENGAGE_RANGE {
        commands.push(Command::PlayerAttack { direction: offset });
    }

    if distance < COMFORT_RANGE {
        commands.push(Command::MovePlayer { direction: -offset });
    } else if distance > ENGAGE_RANGE {
        commands.push(Command::MovePlayer { direction: offset });
    }

    commands
}
