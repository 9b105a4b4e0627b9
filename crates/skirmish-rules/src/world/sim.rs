//! World simulation: participants, units, buildings, combat and events.
//!
//! Everything here is synchronous and takes `now` explicitly, so the
//! simulation can be stepped deterministically in tests.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Serializer};
use skirmish_protocol::PlayerId;

use super::WorldConfig;
use super::grid::{Grid, Point, Tile};
use super::snapshot::Snapshot;

/// Hit points of a freshly placed base.
pub const BASE_HP: i32 = 100;

/// Highest selectable faction.
pub const MAX_FACTION: u8 = 8;

/// Per-owner stride of unit and building ids: `owner * 100 + seq`.
const ID_STRIDE: u32 = 100;

/// Units one participant may produce in a match. Ids are never reused, so
/// this keeps every unit id inside its owner's stride.
pub const MAX_UNITS: u32 = ID_STRIDE;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a world operation was refused. Nothing is changed on error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    #[error("position ({x}, {y}) is outside the map")]
    OutOfBounds { x: i32, y: i32 },

    #[error("tile ({x}, {y}) is not empty")]
    Occupied { x: i32, y: i32 },

    #[error("base already placed")]
    BaseExists,

    #[error("no base placed")]
    NoBase,

    #[error("unknown unit type {0}")]
    UnknownUnitKind(i64),

    #[error("no free tile next to the base")]
    NoSpace,

    #[error("unit limit of {MAX_UNITS} reached")]
    UnitLimit,

    #[error("unit {0} not found")]
    UnitNotFound(u32),

    #[error("target is not adjacent")]
    NotAdjacent,

    #[error("country already taken or invalid")]
    FactionUnavailable,

    #[error("player {0} is not in this world")]
    UnknownPlayer(PlayerId),
}

// ---------------------------------------------------------------------------
// Units and buildings
// ---------------------------------------------------------------------------

/// Unit types, with their integer wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum UnitKind {
    Worker = 0,
    Soldier = 1,
    Tank = 2,
    Drone = 3,
}

impl UnitKind {
    /// Looks up a wire code.
    pub fn from_code(code: i64) -> Result<Self, SimError> {
        match code {
            0 => Ok(Self::Worker),
            1 => Ok(Self::Soldier),
            2 => Ok(Self::Tank),
            3 => Ok(Self::Drone),
            other => Err(SimError::UnknownUnitKind(other)),
        }
    }

    /// `(hp, attack, defense)` of a newly produced unit.
    pub fn stats(self) -> (i32, i32, i32) {
        match self {
            Self::Worker => (30, 5, 2),
            Self::Soldier => (50, 10, 5),
            Self::Tank => (100, 20, 15),
            Self::Drone => (20, 15, 1),
        }
    }
}

impl Serialize for UnitKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub unit_id: u32,
    pub owner_id: PlayerId,
    pub kind: UnitKind,
    pub at: Point,
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub moving: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Building {
    pub building_id: u32,
    pub owner_id: PlayerId,
    #[serde(rename = "type")]
    pub kind: Tile,
    pub x: i32,
    pub y: i32,
    pub hp: i32,
}

/// One connected participant's holdings.
#[derive(Debug, Clone)]
pub struct Participant {
    pub id: PlayerId,
    /// 0 until chosen.
    pub faction: u8,
    pub base: Option<Point>,
    pub units: Vec<Unit>,
    pub buildings: Vec<Building>,
    next_unit: u32,
    next_building: u32,
}

impl Participant {
    fn new(id: PlayerId) -> Self {
        Self {
            id,
            faction: 0,
            base: None,
            units: Vec::new(),
            buildings: Vec::new(),
            next_unit: 0,
            next_building: 0,
        }
    }

    fn next_unit_id(&mut self) -> u32 {
        let id = u32::from(self.id.0) * ID_STRIDE + self.next_unit;
        self.next_unit += 1;
        id
    }

    fn next_building_id(&mut self) -> u32 {
        let id = u32::from(self.id.0) * ID_STRIDE + self.next_building;
        self.next_building += 1;
        id
    }

    /// Has a placed base that still has hit points.
    pub fn has_live_base(&self) -> bool {
        self.base.is_some()
            && self
                .buildings
                .iter()
                .any(|b| b.kind == Tile::Base && b.hp > 0)
    }
}

// ---------------------------------------------------------------------------
// Incidents
// ---------------------------------------------------------------------------

/// The world-wide event flag.
///
/// `Terminal` marks a decided match: exactly one live base remains after
/// at least two existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Incident {
    None = 0,
    Earthquake = 1,
    Blackout = 2,
    Terminal = 99,
}

impl Incident {
    /// Name used in `event` broadcasts, for the two random events.
    pub fn event_name(self) -> Option<&'static str> {
        match self {
            Self::Earthquake => Some("earthquake"),
            Self::Blackout => Some("blackout"),
            Self::None | Self::Terminal => None,
        }
    }
}

// ---------------------------------------------------------------------------
// WorldState
// ---------------------------------------------------------------------------

/// The whole world: map, participants and event state.
#[derive(Debug)]
pub struct WorldState {
    grid: Grid,
    participants: BTreeMap<PlayerId, Participant>,
    incident: Incident,
    event_interval: Duration,
    last_update: Option<Instant>,
    ever_had_two: bool,
    terminal_at: Option<Instant>,
    rng: StdRng,
}

impl WorldState {
    /// Generates the map. A configured seed makes the map and the event
    /// rolls reproducible.
    pub fn new(config: &WorldConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let grid = Grid::generate(config.width, config.height, config.resource_percent, &mut rng);
        Self {
            grid,
            participants: BTreeMap::new(),
            incident: Incident::None,
            event_interval: config.event_interval,
            last_update: None,
            ever_had_two: false,
            terminal_at: None,
            rng,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn participant(&self, id: PlayerId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    pub fn incident(&self) -> Incident {
        self.incident
    }

    pub fn ever_had_two(&self) -> bool {
        self.ever_had_two
    }

    pub fn is_terminal(&self) -> bool {
        self.incident == Incident::Terminal
    }

    /// When the terminal flag was last raised.
    pub fn terminal_at(&self) -> Option<Instant> {
        self.terminal_at
    }

    fn participant_mut(&mut self, id: PlayerId) -> Result<&mut Participant, SimError> {
        self.participants
            .get_mut(&id)
            .ok_or(SimError::UnknownPlayer(id))
    }

    /// Creates a fresh record for a newly connected participant.
    pub fn add_participant(&mut self, id: PlayerId) {
        self.participants.insert(id, Participant::new(id));
    }

    /// Drops a participant's record and frees its base tile.
    pub fn remove_participant(&mut self, id: PlayerId) -> Option<Participant> {
        let removed = self.participants.remove(&id)?;
        if let Some(base) = removed.base {
            self.grid.set(base, Tile::Empty);
        }
        Some(removed)
    }

    /// Picks a faction in `1..=8` not held by another participant.
    pub fn choose_faction(&mut self, id: PlayerId, faction: i64) -> Result<(), SimError> {
        let faction = u8::try_from(faction)
            .ok()
            .filter(|f| (1..=MAX_FACTION).contains(f))
            .ok_or(SimError::FactionUnavailable)?;
        let taken = self
            .participants
            .values()
            .any(|p| p.id != id && p.faction == faction);
        if taken {
            return Err(SimError::FactionUnavailable);
        }
        self.participant_mut(id)?.faction = faction;
        Ok(())
    }

    /// Places the participant's one base on an empty tile.
    pub fn place_base(&mut self, id: PlayerId, at: Point) -> Result<(), SimError> {
        match self.grid.get(at) {
            None => return Err(SimError::OutOfBounds { x: at.x, y: at.y }),
            Some(Tile::Empty) => {}
            Some(_) => return Err(SimError::Occupied { x: at.x, y: at.y }),
        }
        let participant = self.participant_mut(id)?;
        if participant.base.is_some() {
            return Err(SimError::BaseExists);
        }

        participant.base = Some(at);
        let building_id = participant.next_building_id();
        participant.buildings.push(Building {
            building_id,
            owner_id: id,
            kind: Tile::Base,
            x: at.x,
            y: at.y,
            hp: BASE_HP,
        });
        self.grid.set(at, Tile::Base);
        tracing::debug!(player = %id, x = at.x, y = at.y, "base placed");
        Ok(())
    }

    /// Produces a unit on the first empty tile around the base, scanning
    /// row by row from the top-left neighbour.
    pub fn produce_unit(&mut self, id: PlayerId, kind: UnitKind) -> Result<u32, SimError> {
        let participant = self
            .participants
            .get(&id)
            .ok_or(SimError::UnknownPlayer(id))?;
        let base = participant.base.ok_or(SimError::NoBase)?;
        if participant.next_unit >= MAX_UNITS {
            return Err(SimError::UnitLimit);
        }

        let spot = (-1..=1)
            .flat_map(|dy| (-1..=1).map(move |dx| Point::new(base.x + dx, base.y + dy)))
            .find(|&p| self.grid.get(p) == Some(Tile::Empty))
            .ok_or(SimError::NoSpace)?;

        let participant = self.participant_mut(id)?;
        let unit_id = participant.next_unit_id();
        let (hp, attack, defense) = kind.stats();
        participant.units.push(Unit {
            unit_id,
            owner_id: id,
            kind,
            at: spot,
            hp,
            attack,
            defense,
            moving: false,
        });
        Ok(unit_id)
    }

    /// Moves an owned unit one step onto an empty tile.
    pub fn move_unit(&mut self, id: PlayerId, unit_id: u32, to: Point) -> Result<(), SimError> {
        let target_tile = self
            .grid
            .get(to)
            .ok_or(SimError::OutOfBounds { x: to.x, y: to.y })?;
        let participant = self.participant_mut(id)?;
        let unit = participant
            .units
            .iter_mut()
            .find(|u| u.unit_id == unit_id)
            .ok_or(SimError::UnitNotFound(unit_id))?;
        if unit.at.distance(to) != 1 {
            return Err(SimError::NotAdjacent);
        }
        if target_tile != Tile::Empty {
            return Err(SimError::Occupied { x: to.x, y: to.y });
        }
        unit.at = to;
        unit.moving = true;
        Ok(())
    }

    /// Resolves one attack. The target may belong to anyone, the attacker
    /// only to `id`. Returns `true` if the target was destroyed.
    pub fn attack_unit(&mut self, id: PlayerId, attacker_id: u32, target_id: u32) -> Result<bool, SimError> {
        let (origin, attack) = self
            .participants
            .get(&id)
            .ok_or(SimError::UnknownPlayer(id))?
            .units
            .iter()
            .find(|u| u.unit_id == attacker_id)
            .map(|u| (u.at, u.attack))
            .ok_or(SimError::UnitNotFound(attacker_id))?;

        let (owner, index) = self
            .participants
            .iter()
            .find_map(|(&owner, p)| {
                p.units
                    .iter()
                    .position(|u| u.unit_id == target_id)
                    .map(|i| (owner, i))
            })
            .ok_or(SimError::UnitNotFound(target_id))?;

        let units = &mut self.participant_mut(owner)?.units;
        let target = &mut units[index];
        if origin.distance(target.at) != 1 {
            return Err(SimError::NotAdjacent);
        }
        target.hp -= (attack - target.defense).max(1);
        if target.hp > 0 {
            return Ok(false);
        }
        units.swap_remove(index);
        tracing::debug!(attacker = attacker_id, target = target_id, "unit destroyed");
        Ok(true)
    }

    /// Participants with a placed base that still stands, in id order.
    pub fn live_bases(&self) -> Vec<PlayerId> {
        self.participants
            .values()
            .filter(|p| p.has_live_base())
            .map(|p| p.id)
            .collect()
    }

    /// `true` unless the participant has a Base building with hp left.
    pub fn is_base_destroyed(&self, id: PlayerId) -> bool {
        self.participants
            .get(&id)
            .is_none_or(|p| !p.buildings.iter().any(|b| b.kind == Tile::Base && b.hp > 0))
    }

    /// Advances the world clock.
    ///
    /// Every `event_interval` a new incident is rolled. The live base count
    /// is then re-evaluated, which may raise or clear the terminal flag.
    /// Returns the random event rolled on this call, if any.
    pub fn tick(&mut self, now: Instant) -> Option<Incident> {
        let last = *self.last_update.get_or_insert(now);
        let mut rolled = None;
        if now.saturating_duration_since(last) >= self.event_interval {
            self.incident = match self.rng.random_range(0..100u8) {
                0..20 => Incident::Earthquake,
                20..40 => Incident::Blackout,
                _ => Incident::None,
            };
            self.last_update = Some(now);
            rolled = self.incident.event_name().map(|_| self.incident);
            if let Some(event) = rolled {
                tracing::info!(?event, "world event");
            }
        }

        let alive = self.live_bases().len();
        if alive >= 2 {
            self.ever_had_two = true;
            if self.incident == Incident::Terminal {
                self.incident = Incident::None;
            }
        } else if alive == 1 && self.ever_had_two {
            if self.incident != Incident::Terminal {
                tracing::info!("one base left");
            }
            self.incident = Incident::Terminal;
            self.terminal_at = Some(now);
            self.last_update = Some(now);
        } else {
            self.incident = Incident::None;
        }
        rolled
    }

    /// The `update_state` payload.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::of(self)
    }
}
