//! Player avatar, essence pool and upgrade application.

use std::collections::BTreeSet;

use whispers_core::{Ability, AbilitySet, HitBox, PlayerSnapshot, RoomLayout, Upgrade, Vec2};

/// Position the player occupies at the start of every session.
pub const PLAYER_START: Vec2 = Vec2::new(200.0, 500.0);

const PLAYER_HEALTH: u32 = 3;
const PLAYER_SPEED: f32 = 5.0;
const BAT_SPEED: f32 = 10.0;
const PLAYER_HALF_EXTENT: f32 = 15.0;
const INITIAL_ESSENCE: u32 = 50;
const ESSENCE_CAPACITY: u32 = 100;
const ATTACK_COOLDOWN: u32 = 20;
const MIST_FORM_TICKS: u32 = 120;
const BAT_FORM_TICKS: u32 = 180;
const CONTACT_INVINCIBILITY_TICKS: u32 = 60;
const CAPACITY_UPGRADE: u32 = 25;

/// Bounded pool of blood essence spent on abilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EssencePool {
    current: u32,
    maximum: u32,
}

impl EssencePool {
    /// Creates a pool holding `current` essence, clamped to `maximum`.
    #[must_use]
    pub fn new(current: u32, maximum: u32) -> Self {
        Self {
            current: current.min(maximum),
            maximum,
        }
    }

    /// Essence currently held.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Capacity of the pool.
    #[must_use]
    pub const fn maximum(&self) -> u32 {
        self.maximum
    }

    /// Adds essence, clamped to capacity, and returns the new total.
    pub fn gain(&mut self, amount: u32) -> u32 {
        self.current = self.current.saturating_add(amount).min(self.maximum);
        self.current
    }

    /// Removes `amount` if the pool holds at least that much.
    ///
    /// Leaves the pool untouched and returns `false` otherwise.
    #[must_use]
    pub fn spend(&mut self, amount: u32) -> bool {
        if self.current < amount {
            return false;
        }

        self.current -= amount;
        true
    }

    /// Raises both capacity and current essence by `amount`.
    pub fn raise_capacity(&mut self, amount: u32) {
        self.maximum = self.maximum.saturating_add(amount);
        self.current = self.current.saturating_add(amount).min(self.maximum);
    }
}

impl Default for EssencePool {
    fn default() -> Self {
        Self::new(INITIAL_ESSENCE, ESSENCE_CAPACITY)
    }
}

/// Player avatar controlled by the host.
#[derive(Clone, Debug)]
pub struct Player {
    position: Vec2,
    facing: Vec2,
    health: u32,
    max_health: u32,
    invincible_for: u32,
    attack_cooldown: u32,
    bat_form_for: u32,
    essence: EssencePool,
    abilities: AbilitySet,
    current_room: Option<String>,
    discovered: BTreeSet<String>,
}

impl Player {
    /// Creates a fresh player at the start position of `layout`.
    #[must_use]
    pub fn new(layout: &RoomLayout) -> Self {
        let current_room = layout.room_at(PLAYER_START).map(|room| room.name.clone());
        Self {
            position: PLAYER_START,
            facing: Vec2::NEG_Y,
            health: PLAYER_HEALTH,
            max_health: PLAYER_HEALTH,
            invincible_for: 0,
            attack_cooldown: 0,
            bat_form_for: 0,
            essence: EssencePool::default(),
            abilities: AbilitySet::default(),
            discovered: current_room.iter().cloned().collect(),
            current_room,
        }
    }

    /// Current position of the player.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Essence pool of the player.
    #[must_use]
    pub const fn essence(&self) -> &EssencePool {
        &self.essence
    }

    /// Unlocked abilities.
    #[must_use]
    pub const fn abilities(&self) -> AbilitySet {
        self.abilities
    }

    /// Movement per tick, including the bat form boost.
    #[must_use]
    pub fn speed(&self) -> f32 {
        if self.bat_form_for > 0 {
            BAT_SPEED
        } else {
            PLAYER_SPEED
        }
    }

    /// Applies a chosen upgrade.
    pub fn apply_upgrade(&mut self, upgrade: Upgrade) {
        match upgrade {
            Upgrade::MistForm => self.abilities.mist_form = true,
            Upgrade::BatTransform => self.abilities.bat_transform = true,
            Upgrade::BloodCapacity => self.essence.raise_capacity(CAPACITY_UPGRADE),
            Upgrade::HealthUp => {
                self.max_health = self.max_health.saturating_add(1);
                self.health = self.health.saturating_add(1);
            }
        }
    }

    pub(crate) fn hit_box(&self) -> HitBox {
        HitBox::square(self.position, PLAYER_HALF_EXTENT)
    }

    pub(crate) fn facing(&self) -> Vec2 {
        self.facing
    }

    pub(crate) fn face(&mut self, direction: Vec2) {
        self.facing = direction;
    }

    pub(crate) fn is_invincible(&self) -> bool {
        self.invincible_for > 0
    }

    pub(crate) fn attack_ready(&self) -> bool {
        self.attack_cooldown == 0
    }

    pub(crate) fn start_attack_cooldown(&mut self) {
        self.attack_cooldown = ATTACK_COOLDOWN;
    }

    pub(crate) fn relocate(&mut self, position: Vec2, layout: &RoomLayout) -> Option<String> {
        self.position = position;
        let room = layout.room_at(position).map(|room| room.name.clone());
        if room.is_some() {
            self.current_room = room.clone();
        }

        room.filter(|name| self.discovered.insert(name.clone()))
    }

    pub(crate) fn gain_essence(&mut self, amount: u32) -> u32 {
        self.essence.gain(amount)
    }

    /// Removes one heart unless invincible. Returns `true` when hit.
    pub(crate) fn take_contact_hit(&mut self) -> bool {
        if self.is_invincible() || self.health == 0 {
            return false;
        }

        self.health -= 1;
        self.invincible_for = CONTACT_INVINCIBILITY_TICKS;
        true
    }

    pub(crate) fn activate(&mut self, ability: Ability) -> bool {
        if !self.abilities.permits(ability) {
            return false;
        }

        if ability == Ability::Heal && self.health >= self.max_health {
            return false;
        }

        if !self.essence.spend(ability.cost()) {
            return false;
        }

        match ability {
            Ability::MistForm => self.invincible_for = self.invincible_for.max(MIST_FORM_TICKS),
            Ability::BatTransform => self.bat_form_for = BAT_FORM_TICKS,
            Ability::Heal => self.health += 1,
        }
        true
    }

    pub(crate) fn advance_timers(&mut self) {
        self.invincible_for = self.invincible_for.saturating_sub(1);
        self.attack_cooldown = self.attack_cooldown.saturating_sub(1);
        self.bat_form_for = self.bat_form_for.saturating_sub(1);
    }

    pub(crate) fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.position,
            facing: self.facing,
            health: self.health,
            max_health: self.max_health,
            invincible_for: self.invincible_for,
            speed: self.speed(),
            essence: self.essence.current(),
            essence_max: self.essence.maximum(),
            abilities: self.abilities,
            current_room: self.current_room.clone(),
            attack_ready: self.attack_ready(),
        }
    }
}
