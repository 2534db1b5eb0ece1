//! Damage, projectiles, resource drops and contact resolution.

use std::ops::RangeInclusive;

use rand::Rng;
use whispers_core::{
    AgentId, AgentState, AttackSnapshot, DropId, Event, HitBox, NarrativeCue, Vec2,
};

use crate::World;

const ATTACK_SPEED: f32 = 8.0;
const ATTACK_LIFETIME: u32 = 60;
const ATTACK_REACH: f32 = 40.0;
const ATTACK_HALF_EXTENT: f32 = 16.0;
const DROP_HALF_EXTENT: f32 = 5.0;

/// Duration range of timed behavioural states.
pub(crate) const STATE_COUNTDOWN: RangeInclusive<u32> = 60..=120;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Attack {
    position: Vec2,
    direction: Vec2,
    remaining: u32,
}

impl Attack {
    pub(crate) fn snapshot(&self) -> AttackSnapshot {
        AttackSnapshot {
            position: self.position,
            direction: self.direction,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct ResourceDrop {
    pub(crate) id: DropId,
    pub(crate) position: Vec2,
    pub(crate) amount: u32,
}

impl ResourceDrop {
    fn hit_box(&self) -> HitBox {
        HitBox::square(self.position, DROP_HALF_EXTENT)
    }
}

impl World {
    /// Removes health from an agent, resolving death, phase and rage.
    ///
    /// A lethal hit marks the agent for removal and leaves exactly one drop
    /// worth the agent's essence yield at its position. Agents that never
    /// entered the arena leave nothing behind.
    pub(crate) fn apply_damage(&mut self, id: AgentId, amount: u32, out_events: &mut Vec<Event>) {
        let Some(agent) = self.agents.get_mut(id) else {
            return;
        };

        agent.health = agent.health.saturating_sub(amount);

        if agent.health == 0 {
            let (kind, position, yield_amount) = (agent.kind, agent.position, agent.blood_value);
            let spawned = agent.is_spawned();
            tracing::debug!("agent {:?} ({:?}) died at {}", id, kind, position);
            out_events.push(Event::AgentDied {
                agent: id,
                kind,
                position,
            });
            if spawned {
                self.spawn_drop(position, yield_amount, out_events);
            }
            return;
        }

        out_events.push(Event::AgentDamaged {
            agent: id,
            health: agent.health,
        });

        if agent.state != AgentState::Hunt {
            agent.enter_state(AgentState::Hunt, 0);
            out_events.push(Event::AgentStateChanged {
                agent: id,
                state: AgentState::Hunt,
            });
        }

        if let Some(phase) = agent.advance_phase() {
            tracing::debug!("boss {:?} entered phase {:?}", id, phase);
            out_events.push(Event::BossPhaseChanged { agent: id, phase });
            out_events.push(Event::NarrativeTriggered {
                cue: NarrativeCue::BossPhase(phase),
            });
        }

        if agent.try_enrage() {
            tracing::debug!("werewolf {:?} enraged", id);
            out_events.push(Event::AgentEnraged { agent: id });
        }
    }

    fn spawn_drop(&mut self, position: Vec2, amount: u32, out_events: &mut Vec<Event>) {
        let id = DropId::new(self.next_drop);
        self.next_drop = self.next_drop.wrapping_add(1);
        self.drops.push(ResourceDrop {
            id,
            position,
            amount,
        });
        out_events.push(Event::DropSpawned {
            drop: id,
            position,
            amount,
        });
    }

    pub(crate) fn launch_attack(&mut self, direction: Vec2, out_events: &mut Vec<Event>) {
        if !self.player.attack_ready() {
            return;
        }

        let direction = match direction.try_normalize() {
            Some(direction) => direction,
            None => self.player.facing(),
        };
        self.player.face(direction);
        self.player.start_attack_cooldown();

        let position = self.player.position() + direction * ATTACK_REACH;
        self.attacks.push(Attack {
            position,
            direction,
            remaining: ATTACK_LIFETIME,
        });
        out_events.push(Event::AttackLaunched {
            position,
            direction,
        });
    }

    /// Advances projectiles and resolves their first hit.
    pub(crate) fn resolve_attacks(&mut self, out_events: &mut Vec<Event>) {
        let in_flight = std::mem::take(&mut self.attacks);
        let mut survivors = Vec::with_capacity(in_flight.len());

        for mut attack in in_flight {
            attack.position += attack.direction * ATTACK_SPEED;
            attack.remaining = attack.remaining.saturating_sub(1);

            if attack.remaining == 0 || !self.layout.is_position_playable(attack.position) {
                continue;
            }

            let reach = HitBox::square(attack.position, ATTACK_HALF_EXTENT);
            let target = self
                .agents
                .iter()
                .filter(|agent| agent.is_spawned())
                .find(|agent| agent.hit_box().overlaps(&reach))
                .map(|agent| agent.id);

            match target {
                Some(id) => self.apply_damage(id, 1, out_events),
                None => survivors.push(attack),
            }
        }

        self.attacks = survivors;
    }

    /// Grants essence for every drop the player touches.
    pub(crate) fn collect_drops(&mut self, out_events: &mut Vec<Event>) {
        let player_box = self.player.hit_box();
        let (collected, remaining): (Vec<ResourceDrop>, Vec<ResourceDrop>) = self
            .drops
            .drain(..)
            .partition(|drop| drop.hit_box().overlaps(&player_box));
        self.drops = remaining;

        for drop in collected {
            let essence = self.player.gain_essence(drop.amount);
            out_events.push(Event::EssenceCollected {
                drop: drop.id,
                amount: drop.amount,
                essence,
            });
        }
    }

    /// Applies contact damage from the first spawned agent touching the player.
    pub(crate) fn resolve_contacts(&mut self, out_events: &mut Vec<Event>) {
        let player_box = self.player.hit_box();
        let Some(attacker) = self
            .agents
            .iter()
            .filter(|agent| agent.is_spawned())
            .find(|agent| agent.hit_box().overlaps(&player_box))
            .map(|agent| agent.id)
        else {
            return;
        };

        if !self.player.take_contact_hit() {
            return;
        }

        out_events.push(Event::PlayerDamaged {
            health: self.player.health(),
        });

        let countdown = self.rng.gen_range(STATE_COUNTDOWN);
        if let Some(agent) = self.agents.get_mut(attacker) {
            if !agent.kind.is_boss() {
                agent.enter_state(AgentState::Recover, countdown);
                out_events.push(Event::AgentStateChanged {
                    agent: attacker,
                    state: AgentState::Recover,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use whispers_core::{AgentKind, Placement, SpawnOrder};

    use super::*;
    use crate::{player::PLAYER_START, query};

    fn place(world: &mut World, kind: AgentKind, position: Vec2) -> AgentId {
        let id = world
            .agents
            .queue(&SpawnOrder::new(kind, Placement::At(position)));
        if let Some(agent) = world.agents.get_mut(id) {
            agent.place(position);
        }
        id
    }

    #[test]
    fn non_lethal_damage_reports_remaining_health() {
        let mut world = World::new(7);
        let id = place(&mut world, AgentKind::Vampire, Vec2::new(600.0, 300.0));
        let mut events = Vec::new();

        world.apply_damage(id, 1, &mut events);

        assert_eq!(events, vec![Event::AgentDamaged { agent: id, health: 2 }]);
        assert!(world.drops.is_empty());
    }

    #[test]
    fn lethal_damage_leaves_exactly_one_drop() {
        let mut world = World::new(7);
        let position = Vec2::new(600.0, 300.0);
        let id = place(&mut world, AgentKind::Ghoul, position);
        let mut events = Vec::new();

        world.apply_damage(id, 5, &mut events);
        world.agents.sweep();

        assert_eq!(world.drops.len(), 1);
        assert_eq!(world.drops[0].amount, 10);
        assert_eq!(world.drops[0].position, position);
        assert_eq!(query::agent_view(&world).population(), 0);

        world.apply_damage(id, 5, &mut events);
        assert_eq!(world.drops.len(), 1);
    }

    #[test]
    fn damage_forces_hunt() {
        let mut world = World::new(7);
        let id = place(&mut world, AgentKind::Werewolf, Vec2::new(600.0, 300.0));
        if let Some(agent) = world.agents.get_mut(id) {
            agent.enter_state(AgentState::Dodge, 90);
        }
        let mut events = Vec::new();

        world.apply_damage(id, 1, &mut events);

        assert!(events.contains(&Event::AgentStateChanged {
            agent: id,
            state: AgentState::Hunt,
        }));
    }

    #[test]
    fn attacks_hit_the_first_agent_in_line() {
        let mut world = World::new(7);
        let id = place(&mut world, AgentKind::Ghoul, Vec2::new(200.0, 440.0));
        let mut events = Vec::new();

        world.launch_attack(Vec2::new(0.0, -1.0), &mut events);
        world.resolve_attacks(&mut events);

        assert!(events.contains(&Event::AgentDamaged { agent: id, health: 1 }));
        assert!(world.attacks.is_empty());
    }

    #[test]
    fn attack_cooldown_blocks_rapid_fire() {
        let mut world = World::new(1);
        let mut events = Vec::new();

        world.launch_attack(Vec2::X, &mut events);
        world.launch_attack(Vec2::X, &mut events);

        assert_eq!(world.attacks.len(), 1);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn pickups_grant_clamped_essence() {
        let mut world = World::new(3);
        let mut events = Vec::new();
        world.spawn_drop(PLAYER_START, 80, &mut events);

        world.collect_drops(&mut events);

        assert!(world.drops.is_empty());
        assert!(events.contains(&Event::EssenceCollected {
            drop: DropId::new(0),
            amount: 80,
            essence: 100,
        }));
    }

    #[test]
    fn contact_damage_sends_attacker_into_recovery() {
        let mut world = World::new(5);
        let id = place(&mut world, AgentKind::Ghoul, PLAYER_START);
        let mut events = Vec::new();

        world.resolve_contacts(&mut events);
        world.resolve_contacts(&mut events);

        let hits = events
            .iter()
            .filter(|event| matches!(event, Event::PlayerDamaged { .. }))
            .count();
        assert_eq!(hits, 1);
        let agent = query::agent_view(&world)
            .get(id)
            .cloned()
            .expect("agent alive");
        assert_eq!(agent.state, AgentState::Recover);
        assert!(STATE_COUNTDOWN.contains(&agent.state_countdown));
    }
}
