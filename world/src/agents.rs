//! Agent records and the timers the world advances on their behalf.

use whispers_core::{
    AbilityCooldowns, AgentId, AgentKind, AgentSnapshot, AgentState, BossPhase, CellCoord,
    HitBox, Placement, SpawnOrder, SpawnStatus, Vec2,
};

/// Ticks before a freshly spawned agent first requests a path.
pub(crate) const INITIAL_PATH_COUNTDOWN: u32 = 100;
/// Ticks between path recomputations once hunting.
pub(crate) const PATH_RECOMPUTE_INTERVAL: u32 = 10;
/// Ticks between boss minion summons.
pub(crate) const SUMMON_COOLDOWN: u32 = 180;
/// Ticks between boss charges.
pub(crate) const CHARGE_COOLDOWN: u32 = 120;
/// Remaining charge cooldown at which the charge burst ends.
const CHARGE_RELEASE: u32 = 60;
/// Movement speed a werewolf adopts once enraged.
pub(crate) const RAGE_SPEED: f32 = 6.0;
/// Health at or below which a werewolf enrages.
pub(crate) const RAGE_THRESHOLD: u32 = 2;

#[derive(Clone, Debug)]
pub(crate) struct Agent {
    pub(crate) id: AgentId,
    pub(crate) kind: AgentKind,
    pub(crate) status: SpawnStatus,
    pub(crate) placement: Placement,
    pub(crate) position: Vec2,
    pub(crate) health: u32,
    pub(crate) max_health: u32,
    pub(crate) speed: f32,
    pub(crate) blood_value: u32,
    pub(crate) state: AgentState,
    pub(crate) state_countdown: u32,
    pub(crate) path: Vec<CellCoord>,
    pub(crate) path_countdown: u32,
    pub(crate) phase: Option<BossPhase>,
    pub(crate) cooldowns: AbilityCooldowns,
    pub(crate) charging: bool,
    pub(crate) enraged: bool,
}

impl Agent {
    fn from_order(id: AgentId, order: &SpawnOrder) -> Self {
        let stats = order.kind.base_stats().with_overrides(&order.overrides);
        Self {
            id,
            kind: order.kind,
            status: SpawnStatus::Unspawned,
            placement: order.placement,
            position: Vec2::ZERO,
            health: stats.health,
            max_health: stats.health,
            speed: stats.speed,
            blood_value: stats.blood_value,
            state: AgentState::Hunt,
            state_countdown: 0,
            path: Vec::new(),
            path_countdown: INITIAL_PATH_COUNTDOWN,
            phase: order
                .kind
                .is_boss()
                .then(|| BossPhase::for_health(stats.health)),
            cooldowns: AbilityCooldowns {
                teleport: order.overrides.teleport_cooldown.unwrap_or(0),
                ..AbilityCooldowns::default()
            },
            charging: false,
            enraged: false,
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub(crate) fn is_spawned(&self) -> bool {
        self.status == SpawnStatus::Spawned
    }

    pub(crate) fn place(&mut self, position: Vec2) {
        self.position = position;
        self.status = SpawnStatus::Spawned;
    }

    pub(crate) fn effective_speed(&self) -> f32 {
        if self.charging {
            self.speed * 2.0
        } else {
            self.speed
        }
    }

    pub(crate) fn hit_box(&self) -> HitBox {
        HitBox::square(self.position, self.kind.hit_half_extent())
    }

    pub(crate) fn enter_state(&mut self, state: AgentState, countdown: u32) {
        self.state = state;
        self.state_countdown = match state {
            AgentState::Hunt => 0,
            AgentState::Dodge | AgentState::Recover => countdown,
        };
    }

    /// Advances every countdown by one tick.
    ///
    /// Returns `true` when a timed state expired and the agent reverted to
    /// hunting.
    pub(crate) fn advance_timers(&mut self) -> bool {
        self.path_countdown = self.path_countdown.saturating_sub(1);
        self.cooldowns.summon = self.cooldowns.summon.saturating_sub(1);
        self.cooldowns.teleport = self.cooldowns.teleport.saturating_sub(1);
        self.cooldowns.charge = self.cooldowns.charge.saturating_sub(1);
        if self.charging && self.cooldowns.charge <= CHARGE_RELEASE {
            self.charging = false;
        }

        if self.state == AgentState::Hunt {
            return false;
        }

        self.state_countdown = self.state_countdown.saturating_sub(1);
        if self.state_countdown == 0 {
            self.enter_state(AgentState::Hunt, 0);
            return true;
        }

        false
    }

    /// Re-evaluates the boss phase from current health.
    ///
    /// Returns the new phase when it advanced.
    pub(crate) fn advance_phase(&mut self) -> Option<BossPhase> {
        let current = self.phase?;
        let next = current.advance(self.health);
        if next == current {
            return None;
        }

        self.phase = Some(next);
        self.speed = phase_speed(next, self.speed);
        Some(next)
    }

    /// Applies the werewolf rage when its health crosses the threshold.
    pub(crate) fn try_enrage(&mut self) -> bool {
        if self.kind != AgentKind::Werewolf || self.enraged || self.health > RAGE_THRESHOLD {
            return false;
        }

        self.enraged = true;
        self.speed = RAGE_SPEED;
        true
    }

    pub(crate) fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            kind: self.kind,
            status: self.status,
            position: self.position,
            health: self.health,
            max_health: self.max_health,
            speed: self.effective_speed(),
            state: self.state,
            state_countdown: self.state_countdown,
            path: self.path.clone(),
            path_countdown: self.path_countdown,
            phase: self.phase,
            cooldowns: self.cooldowns,
        }
    }
}

fn phase_speed(phase: BossPhase, current: f32) -> f32 {
    match phase {
        BossPhase::One => current,
        BossPhase::Two => 4.0,
        BossPhase::Three => 5.0,
    }
}

/// Owns every living agent, spawned or queued, in creation order.
#[derive(Debug, Default)]
pub(crate) struct AgentRegistry {
    agents: Vec<Agent>,
    next_id: u32,
}

impl AgentRegistry {
    pub(crate) fn queue(&mut self, order: &SpawnOrder) -> AgentId {
        let id = AgentId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.agents.push(Agent::from_order(id, order));
        id
    }

    pub(crate) fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents
            .iter_mut()
            .find(|agent| agent.id == id && agent.is_alive())
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().filter(|agent| agent.is_alive())
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.agents.iter_mut().filter(|agent| agent.is_alive())
    }

    /// Removes agents whose health reached zero during the current pass.
    pub(crate) fn sweep(&mut self) {
        self.agents.retain(Agent::is_alive);
    }

    pub(crate) fn clear(&mut self) {
        self.agents.clear();
        self.next_id = 0;
    }
}
