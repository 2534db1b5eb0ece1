#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Whispers simulation.
//!
//! This crate defines the message surface that connects the host game loop,
//! the authoritative world, and pure systems. The host and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems and the host to react to deterministically. Systems consume
//! event streams, query immutable snapshots, and respond exclusively with new
//! command batches.

use serde::{Deserialize, Serialize};

pub use glam::Vec2;

/// Title shown by adapters when the experience boots.
pub const TITLE: &str = "Whispers of the Undead";

/// Side length of a square navigation cell measured in world units.
pub const CELL_SIZE: f32 = 15.0;

/// Fixed simulation rate of the host clock.
pub const TICKS_PER_SECOND: u32 = 60;

/// Width of the arena measured in world units.
pub const ARENA_WIDTH: f32 = 800.0;

/// Height of the arena measured in world units.
pub const ARENA_HEIGHT: f32 = 700.0;

/// Number of regular waves fought before the boss encounter.
pub const DEFAULT_MAX_WAVES: u32 = 3;

/// Describes whether the simulation advances when ticked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayMode {
    /// Agents, attacks and timers advance every tick.
    Active,
    /// The host is presenting an upgrade choice; the world is frozen.
    AwaitingUpgrade,
    /// Victory or defeat was reached; the world is frozen until reset.
    Concluded,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the room layout and rebuilds the playable-area grid.
    ConfigureLayout {
        /// Rooms whose union forms the walkable space.
        layout: RoomLayout,
    },
    /// Reinitialises every mutable piece of session state.
    ResetSession,
    /// Advances the simulation by one fixed step.
    Tick,
    /// Moves the player one step in the provided direction.
    MovePlayer {
        /// Desired direction of travel; normalised by the world.
        direction: Vec2,
    },
    /// Launches a player attack in the provided direction.
    PlayerAttack {
        /// Direction the attack travels in; normalised by the world.
        direction: Vec2,
    },
    /// Activates an unlocked player ability, spending essence.
    ActivateAbility {
        /// Ability to activate.
        ability: Ability,
    },
    /// Marks the beginning of a wave.
    StartWave {
        /// Wave being started.
        wave: Wave,
    },
    /// Queues a new agent for spawning.
    SpawnAgent {
        /// Archetype, stat overrides and placement of the agent.
        order: SpawnOrder,
    },
    /// Replaces the active path of an agent.
    SetAgentPath {
        /// Identifier of the agent receiving the path.
        agent: AgentId,
        /// Cells ordered from the agent's cell toward the goal.
        path: Vec<CellCoord>,
    },
    /// Requests that an agent move to a new position.
    MoveAgent {
        /// Identifier of the agent attempting to move.
        agent: AgentId,
        /// Destination position; rejected if its cell is not walkable.
        to: Vec2,
    },
    /// Forces an agent into a behavioural state.
    ChangeAgentState {
        /// Identifier of the agent.
        agent: AgentId,
        /// State the agent should enter.
        state: AgentState,
    },
    /// Requests that a boss summon a minion at its position.
    SummonMinion {
        /// Identifier of the summoning boss.
        summoner: AgentId,
    },
    /// Starts a charge burst toward the provided position.
    ChargeAgent {
        /// Identifier of the charging agent.
        agent: AgentId,
        /// Position reached by the first charge step.
        to: Vec2,
    },
    /// Requests that an agent teleport to a new position.
    TeleportAgent {
        /// Identifier of the teleporting agent.
        agent: AgentId,
        /// Destination position; skipped if not playable.
        to: Vec2,
    },
    /// Deals damage to an agent.
    DamageAgent {
        /// Identifier of the agent receiving damage.
        agent: AgentId,
        /// Amount of health removed.
        amount: u32,
    },
    /// Restores health to an agent, clamped to its maximum.
    HealAgent {
        /// Identifier of the agent being healed.
        agent: AgentId,
        /// Amount of health restored.
        amount: u32,
    },
    /// Freezes the world and presents upgrade choices to the host.
    OfferUpgrades {
        /// Upgrades the player may pick from.
        choices: Vec<Upgrade>,
    },
    /// Applies the upgrade chosen by the player and resumes the world.
    ChooseUpgrade {
        /// Upgrade selected from the current offer.
        upgrade: Upgrade,
    },
    /// Ends the session with the provided outcome.
    ConcludeSession {
        /// Outcome reached by the player.
        outcome: SessionOutcome,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the playable-area grid was rebuilt.
    LayoutConfigured {
        /// Number of grid columns.
        columns: u32,
        /// Number of grid rows.
        rows: u32,
    },
    /// Announces that the session state was reinitialised.
    SessionReset,
    /// Indicates that the simulation advanced by one tick.
    TimeAdvanced {
        /// Index of the tick that just completed.
        tick: u64,
    },
    /// Confirms that the player moved.
    PlayerMoved {
        /// Position before the move.
        from: Vec2,
        /// Position after the move.
        to: Vec2,
    },
    /// Reports that the player lost health.
    PlayerDamaged {
        /// Health remaining after the hit.
        health: u32,
    },
    /// Reports that the player regained health.
    PlayerHealed {
        /// Health after healing.
        health: u32,
    },
    /// Confirms that the player launched an attack.
    AttackLaunched {
        /// Position the attack starts from.
        position: Vec2,
        /// Normalised direction of travel.
        direction: Vec2,
    },
    /// Confirms that a player ability was activated.
    AbilityActivated {
        /// Ability that was activated.
        ability: Ability,
    },
    /// Reports that an ability activation failed.
    AbilityRejected {
        /// Ability whose activation failed.
        ability: Ability,
    },
    /// Announces that a wave began.
    WaveStarted {
        /// Wave that began.
        wave: Wave,
    },
    /// Confirms that an agent was created and awaits placement.
    AgentQueued {
        /// Identifier assigned to the agent.
        agent: AgentId,
        /// Archetype of the agent.
        kind: AgentKind,
    },
    /// Confirms that an agent was placed into the playable area.
    AgentSpawned {
        /// Identifier of the agent.
        agent: AgentId,
        /// Archetype of the agent.
        kind: AgentKind,
        /// Position the agent occupies.
        position: Vec2,
    },
    /// Confirms that an agent received a new path.
    AgentPathAssigned {
        /// Identifier of the agent.
        agent: AgentId,
        /// Number of cells in the new path.
        length: usize,
    },
    /// Confirms that an agent moved.
    AgentMoved {
        /// Identifier of the agent.
        agent: AgentId,
        /// Position before the move.
        from: Vec2,
        /// Position after the move.
        to: Vec2,
    },
    /// Reports that an agent changed behavioural state.
    AgentStateChanged {
        /// Identifier of the agent.
        agent: AgentId,
        /// State the agent entered.
        state: AgentState,
    },
    /// Reports that an agent survived damage.
    AgentDamaged {
        /// Identifier of the agent.
        agent: AgentId,
        /// Health remaining.
        health: u32,
    },
    /// Reports that an agent regained health.
    AgentHealed {
        /// Identifier of the agent.
        agent: AgentId,
        /// Health after healing.
        health: u32,
    },
    /// Reports that an agent died and was removed.
    AgentDied {
        /// Identifier of the agent.
        agent: AgentId,
        /// Archetype of the agent.
        kind: AgentKind,
        /// Position where the agent died.
        position: Vec2,
    },
    /// Reports that a werewolf entered its rage.
    AgentEnraged {
        /// Identifier of the agent.
        agent: AgentId,
    },
    /// Reports that a boss advanced to a new phase.
    BossPhaseChanged {
        /// Identifier of the boss.
        agent: AgentId,
        /// Phase the boss entered.
        phase: BossPhase,
    },
    /// Confirms that a resource drop appeared.
    DropSpawned {
        /// Identifier of the drop.
        drop: DropId,
        /// Position of the drop.
        position: Vec2,
        /// Essence granted on pickup.
        amount: u32,
    },
    /// Confirms that the player picked up a drop.
    EssenceCollected {
        /// Identifier of the collected drop.
        drop: DropId,
        /// Essence granted by the drop.
        amount: u32,
        /// Essence held after pickup.
        essence: u32,
    },
    /// Requests that the host show a piece of story text.
    NarrativeTriggered {
        /// Story beat to present.
        cue: NarrativeCue,
    },
    /// Requests that the host present an upgrade menu.
    UpgradeOffered {
        /// Upgrades the player may pick from.
        choices: Vec<Upgrade>,
    },
    /// Confirms that an upgrade was applied to the player.
    UpgradeApplied {
        /// Upgrade that was applied.
        upgrade: Upgrade,
    },
    /// Announces the end of the session.
    SessionConcluded {
        /// Outcome reached by the player.
        outcome: SessionOutcome,
    },
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Quantises a continuous position into the cell containing it.
    ///
    /// Returns `None` for negative or non-finite coordinates, which lie
    /// outside every grid.
    #[must_use]
    pub fn from_position(position: Vec2, cell_size: f32) -> Option<Self> {
        if !position.is_finite() || position.x < 0.0 || position.y < 0.0 || cell_size <= 0.0 {
            return None;
        }

        let column = (position.x / cell_size).floor();
        let row = (position.y / cell_size).floor();
        if column > u32::MAX as f32 || row > u32::MAX as f32 {
            return None;
        }

        Some(Self::new(column as u32, row as u32))
    }

    /// Centre point of the cell in world units.
    #[must_use]
    pub fn center(self, cell_size: f32) -> Vec2 {
        Vec2::new(
            (self.column as f32 + 0.5) * cell_size,
            (self.row as f32 + 0.5) * cell_size,
        )
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Euclidean distance between two cell coordinates.
    #[must_use]
    pub fn euclidean_distance(self, other: CellCoord) -> f32 {
        let dx = self.column.abs_diff(other.column) as f32;
        let dy = self.row.abs_diff(other.row) as f32;
        dx.hypot(dy)
    }

    /// Reports whether the two cells share an edge.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }
}

/// Axis-aligned rectangle expressed in world units.
///
/// Containment is half-open: the left and top edges are inside, the right
/// and bottom edges are not.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomRect {
    /// Left edge of the rectangle.
    pub left: f32,
    /// Top edge of the rectangle.
    pub top: f32,
    /// Horizontal extent of the rectangle.
    pub width: f32,
    /// Vertical extent of the rectangle.
    pub height: f32,
}

impl RoomRect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Reports whether the rectangle contains the provided point.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left
            && point.x < self.left + self.width
            && point.y >= self.top
            && point.y < self.top + self.height
    }

    /// Reports whether the rectangle encloses no area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Named room contributing walkable space to the layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Identifier used for room tracking and area narration.
    pub name: String,
    /// Bounds of the room.
    pub rect: RoomRect,
}

impl Room {
    /// Creates a named room.
    #[must_use]
    pub fn new(name: impl Into<String>, rect: RoomRect) -> Self {
        Self {
            name: name.into(),
            rect,
        }
    }
}

/// Set of rooms whose union forms the playable area.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomLayout {
    rooms: Vec<Room>,
}

impl RoomLayout {
    /// Creates a layout from the provided rooms.
    #[must_use]
    pub fn new(rooms: Vec<Room>) -> Self {
        Self { rooms }
    }

    /// Castle layout made of an entrance, a hallway and a grand hall.
    #[must_use]
    pub fn castle() -> Self {
        Self::new(vec![
            Room::new("entrance", RoomRect::new(45.0, 110.0, 260.0, 440.0)),
            Room::new("hallway", RoomRect::new(300.0, 200.0, 180.0, 80.0)),
            Room::new("grand_hall", RoomRect::new(480.0, 110.0, 260.0, 440.0)),
        ])
    }

    /// Rooms composing the layout in declaration order.
    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// First room containing the provided position, if any.
    #[must_use]
    pub fn room_at(&self, position: Vec2) -> Option<&Room> {
        self.rooms.iter().find(|room| room.rect.contains(position))
    }

    /// Reports whether any room contains the provided position.
    #[must_use]
    pub fn is_position_playable(&self, position: Vec2) -> bool {
        self.room_at(position).is_some()
    }
}

/// Axis-aligned hit region centred on an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitBox {
    center: Vec2,
    half_extents: Vec2,
}

impl HitBox {
    /// Creates a hit box centred at `center` with the given half extents.
    #[must_use]
    pub const fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Creates a square hit box.
    #[must_use]
    pub fn square(center: Vec2, half_extent: f32) -> Self {
        Self::new(center, Vec2::splat(half_extent))
    }

    /// Reports whether two hit boxes overlap. Touching edges do not count.
    #[must_use]
    pub fn overlaps(&self, other: &HitBox) -> bool {
        let gap = (self.center - other.center).abs();
        let reach = self.half_extents + other.half_extents;
        gap.x < reach.x && gap.y < reach.y
    }
}

/// Unique identifier assigned to an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a resource drop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DropId(u32);

impl DropId {
    /// Creates a new drop identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Archetypes of hostile agents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgentKind {
    /// Small, weak swarmer; also summoned by the boss.
    Ghoul,
    /// Medium agent that teleports behind the player.
    Vampire,
    /// Sturdy agent that enrages when wounded.
    Werewolf,
    /// Multi-phase boss.
    VampireLord,
}

impl AgentKind {
    /// Default statistics for the archetype.
    #[must_use]
    pub const fn base_stats(self) -> AgentStats {
        match self {
            Self::Ghoul => AgentStats::new(2, 2.0, 10),
            Self::Vampire => AgentStats::new(3, 3.0, 20),
            Self::Werewolf => AgentStats::new(4, 4.0, 30),
            Self::VampireLord => AgentStats::new(6, 3.0, 50),
        }
    }

    /// Half side length of the archetype's square hit box.
    #[must_use]
    pub const fn hit_half_extent(self) -> f32 {
        match self {
            Self::Ghoul => 10.0,
            Self::Vampire => 20.0,
            Self::Werewolf => 24.0,
            Self::VampireLord => 60.0,
        }
    }

    /// Cooldown applied after a teleport, for archetypes that teleport.
    #[must_use]
    pub const fn teleport_cooldown_ticks(self) -> Option<u32> {
        match self {
            Self::Vampire => Some(180),
            Self::VampireLord => Some(60),
            Self::Ghoul | Self::Werewolf => None,
        }
    }

    /// Reports whether the archetype follows the boss phase ladder.
    #[must_use]
    pub const fn is_boss(self) -> bool {
        matches!(self, Self::VampireLord)
    }
}

/// Health, speed and essence yield of an agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentStats {
    /// Starting and maximum health.
    pub health: u32,
    /// Movement per tick in world units.
    pub speed: f32,
    /// Essence dropped on death.
    pub blood_value: u32,
}

impl AgentStats {
    /// Creates a statistics bundle.
    #[must_use]
    pub const fn new(health: u32, speed: f32, blood_value: u32) -> Self {
        Self {
            health,
            speed,
            blood_value,
        }
    }

    /// Applies the provided overrides on top of these statistics.
    #[must_use]
    pub fn with_overrides(self, overrides: &StatOverrides) -> Self {
        Self {
            health: overrides.health.unwrap_or(self.health),
            speed: overrides.speed.unwrap_or(self.speed),
            blood_value: overrides.blood_value.unwrap_or(self.blood_value),
        }
    }
}

/// Per-spawn replacements for archetype statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StatOverrides {
    /// Replacement health.
    pub health: Option<u32>,
    /// Replacement speed.
    pub speed: Option<f32>,
    /// Replacement essence yield.
    pub blood_value: Option<u32>,
    /// Initial teleport cooldown.
    pub teleport_cooldown: Option<u32>,
}

/// Where a queued agent enters the playable area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
    /// Random walkable cell at least `min_distance` away from the player.
    Random {
        /// Minimum distance from the player in world units.
        min_distance: f32,
    },
    /// Fixed position.
    At(Vec2),
}

/// Request to create a single agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnOrder {
    /// Archetype to create.
    pub kind: AgentKind,
    /// Stat replacements applied on creation.
    pub overrides: StatOverrides,
    /// Placement policy.
    pub placement: Placement,
}

impl SpawnOrder {
    /// Creates an order with default stats.
    #[must_use]
    pub fn new(kind: AgentKind, placement: Placement) -> Self {
        Self {
            kind,
            overrides: StatOverrides::default(),
            placement,
        }
    }

    /// Replaces the stat overrides of the order.
    #[must_use]
    pub fn with_overrides(mut self, overrides: StatOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

/// Lifecycle status of an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnStatus {
    /// Created but not yet placed.
    Unspawned,
    /// Present in the playable area.
    Spawned,
}

/// Behavioural states of regular agents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgentState {
    /// Path toward the player and advance along the path.
    Hunt,
    /// Flee directly away from the player.
    Dodge,
    /// Stand still.
    Recover,
}

/// Health-banded behaviour tiers of the boss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BossPhase {
    /// Health above 5.
    One,
    /// Health in (2, 5].
    Two,
    /// Health at or below 2.
    Three,
}

impl BossPhase {
    /// Phase matching the provided health band.
    #[must_use]
    pub const fn for_health(health: u32) -> Self {
        if health > 5 {
            Self::One
        } else if health > 2 {
            Self::Two
        } else {
            Self::Three
        }
    }

    /// Phase reached from `self` given the current health; never regresses.
    #[must_use]
    pub fn advance(self, health: u32) -> Self {
        self.max(Self::for_health(health))
    }
}

/// Encounter stages sequenced by the director.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Wave {
    /// Regular wave numbered from 1.
    Regular(u32),
    /// Final boss encounter.
    Boss,
}

/// Upgrades offered between waves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Upgrade {
    /// Unlocks the mist form ability.
    MistForm,
    /// Unlocks the bat transform ability.
    BatTransform,
    /// Raises essence capacity.
    BloodCapacity,
    /// Raises maximum health.
    HealthUp,
}

impl Upgrade {
    /// Every upgrade in presentation order.
    pub const ALL: [Upgrade; 4] = [
        Self::MistForm,
        Self::BatTransform,
        Self::BloodCapacity,
        Self::HealthUp,
    ];

    /// Reports whether the upgrade can only be acquired once.
    #[must_use]
    pub const fn is_single_acquisition(self) -> bool {
        matches!(self, Self::MistForm | Self::BatTransform)
    }

    /// Display name of the upgrade.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MistForm => "Mist Form",
            Self::BatTransform => "Bat Transform",
            Self::BloodCapacity => "Blood Capacity",
            Self::HealthUp => "Health Up",
        }
    }

    /// One-line description of the upgrade.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::MistForm => "Temporary invincibility",
            Self::BatTransform => "Increased speed for a short time",
            Self::BloodCapacity => "Increase max blood essence",
            Self::HealthUp => "Gain an extra heart",
        }
    }
}

/// Player abilities that spend essence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ability {
    /// Temporary invincibility.
    MistForm,
    /// Temporary speed boost.
    BatTransform,
    /// Restores one heart.
    Heal,
}

impl Ability {
    /// Essence spent on activation.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::MistForm => 20,
            Self::BatTransform | Self::Heal => 30,
        }
    }
}

/// Abilities unlocked by the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AbilitySet {
    /// Mist form is unlocked.
    pub mist_form: bool,
    /// Bat transform is unlocked.
    pub bat_transform: bool,
}

impl AbilitySet {
    /// Reports whether the player already owns a single-acquisition upgrade.
    #[must_use]
    pub const fn owns(&self, upgrade: Upgrade) -> bool {
        match upgrade {
            Upgrade::MistForm => self.mist_form,
            Upgrade::BatTransform => self.bat_transform,
            Upgrade::BloodCapacity | Upgrade::HealthUp => false,
        }
    }

    /// Reports whether the ability can be activated at all.
    #[must_use]
    pub const fn permits(&self, ability: Ability) -> bool {
        match ability {
            Ability::MistForm => self.mist_form,
            Ability::BatTransform => self.bat_transform,
            Ability::Heal => true,
        }
    }
}

/// Story beats the host presents as text.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NarrativeCue {
    /// A regular wave began.
    WaveStart(u32),
    /// The boss encounter began.
    BossIntro,
    /// The boss entered a new phase.
    BossPhase(BossPhase),
    /// The player gained an upgrade.
    AbilityGained(Upgrade),
    /// The player entered a room for the first time.
    AreaDiscovered(String),
}

impl NarrativeCue {
    /// Text the host should display for the cue, when it has one.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let text = match self {
            Self::WaveStart(1) => "You awaken from centuries of slumber in this ancient castle. Your beloved partner is missing.".to_owned(),
            Self::WaveStart(2) => "Whispers in the shadows confirm your fears - the castle's master has taken your partner captive.".to_owned(),
            Self::WaveStart(3) => "The master's chamber lies ahead. You can sense your beloved's presence beyond.".to_owned(),
            Self::WaveStart(5) => "Deep within these walls lies the ancient blood relic you seek.".to_owned(),
            Self::WaveStart(7) => "The castle's master approaches. Prepare yourself.".to_owned(),
            Self::WaveStart(_) => return None,
            Self::BossIntro => "The ancient vampire lord stands between you and your partner. End this, once and for all.".to_owned(),
            Self::BossPhase(BossPhase::One) => return None,
            Self::BossPhase(BossPhase::Two) => "The vampire lord transforms into a giant bat!".to_owned(),
            Self::BossPhase(BossPhase::Three) => "The vampire lord enters a blood rage!".to_owned(),
            Self::AbilityGained(upgrade) => format!("New ability gained: {}", upgrade.name()),
            Self::AreaDiscovered(room) => format!("Entering: {}", area_title(room)),
        };
        Some(text)
    }
}

fn area_title(room: &str) -> String {
    match room {
        "entrance" => "Castle Entrance - A foreboding gateway to darkness".to_owned(),
        "hallway" => "Connecting Hallway - Shadows linger in every corner".to_owned(),
        "grand_hall" => "Grand Hall - Once a place of nobility, now corrupted".to_owned(),
        other => other.replace('_', " "),
    }
}

/// Final outcome of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionOutcome {
    /// The boss was defeated.
    Victory,
    /// The player ran out of health.
    Defeat,
}

/// Remaining ticks before an agent's abilities are ready again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AbilityCooldowns {
    /// Ticks until the next minion summon.
    pub summon: u32,
    /// Ticks until the next charge.
    pub charge: u32,
    /// Ticks until the next teleport.
    pub teleport: u32,
}

/// Immutable representation of a single agent's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentSnapshot {
    /// Unique identifier assigned to the agent.
    pub id: AgentId,
    /// Archetype of the agent.
    pub kind: AgentKind,
    /// Lifecycle status.
    pub status: SpawnStatus,
    /// Current position; meaningless while unspawned.
    pub position: Vec2,
    /// Remaining health.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Effective movement per tick, including charge bursts.
    pub speed: f32,
    /// Behavioural state.
    pub state: AgentState,
    /// Ticks before a timed state reverts to hunting.
    pub state_countdown: u32,
    /// Active path ordered from the agent toward its goal.
    pub path: Vec<CellCoord>,
    /// Ticks before the path should be recomputed.
    pub path_countdown: u32,
    /// Boss phase; `None` for regular agents.
    pub phase: Option<BossPhase>,
    /// Ability cooldowns.
    pub cooldowns: AbilityCooldowns,
}

impl AgentSnapshot {
    /// Reports whether the agent is present in the playable area.
    #[must_use]
    pub fn is_spawned(&self) -> bool {
        self.status == SpawnStatus::Spawned
    }
}

/// Read-only snapshot describing every agent in the world.
#[derive(Clone, Debug, Default)]
pub struct AgentView {
    snapshots: Vec<AgentSnapshot>,
}

impl AgentView {
    /// Creates a new agent view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AgentSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured agent snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a single agent.
    #[must_use]
    pub fn get(&self, id: AgentId) -> Option<&AgentSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of living agents, spawned or not.
    #[must_use]
    pub fn population(&self) -> usize {
        self.snapshots.len()
    }

    /// Number of living agents of the provided archetype.
    #[must_use]
    pub fn count_kind(&self, kind: AgentKind) -> usize {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.kind == kind)
            .count()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AgentSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of the player's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Current position.
    pub position: Vec2,
    /// Unit vector the player faces.
    pub facing: Vec2,
    /// Remaining health.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Ticks of invincibility remaining.
    pub invincible_for: u32,
    /// Movement per tick.
    pub speed: f32,
    /// Essence currently held.
    pub essence: u32,
    /// Essence capacity.
    pub essence_max: u32,
    /// Unlocked abilities.
    pub abilities: AbilitySet,
    /// Room the player stands in, if any.
    pub current_room: Option<String>,
    /// Whether the attack cooldown elapsed.
    pub attack_ready: bool,
}

impl PlayerSnapshot {
    /// Reports whether the player currently ignores damage.
    #[must_use]
    pub fn is_invincible(&self) -> bool {
        self.invincible_for > 0
    }
}

/// Immutable representation of an in-flight player attack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackSnapshot {
    /// Current position.
    pub position: Vec2,
    /// Normalised direction of travel.
    pub direction: Vec2,
}
