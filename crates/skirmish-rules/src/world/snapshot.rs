//! The `update_state` payload.
//!
//! ```text
//! {"player_num":2,"event_flag":0,
//!  "players":[{"player_id":0,"country":3,"base":{"x":1,"y":1},
//!              "units":[{"unit_id":0,"owner_id":0,"type":1,"x":0,"y":0,"hp":50,"moving":0}],
//!              "buildings":[{"building_id":0,"owner_id":0,"type":2,"x":1,"y":1,"hp":100}]}],
//!  "map":[[0,1,...],...]}
//! ```

use serde::Serialize;
use skirmish_protocol::PlayerId;

use super::grid::{Point, Tile};
use super::sim::{Building, Unit, UnitKind, WorldState};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Connected participants.
    pub player_num: usize,
    /// 0 none, 1 earthquake, 2 blackout, 99 decided.
    pub event_flag: u8,
    /// Participants that have placed a base.
    pub players: Vec<PlayerView>,
    /// Tile codes, `map[y][x]`.
    pub map: Vec<Vec<Tile>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub player_id: PlayerId,
    pub country: u8,
    pub base: Point,
    pub units: Vec<UnitView>,
    pub buildings: Vec<Building>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitView {
    pub unit_id: u32,
    pub owner_id: PlayerId,
    #[serde(rename = "type")]
    pub kind: UnitKind,
    pub x: i32,
    pub y: i32,
    pub hp: i32,
    pub moving: u8,
}

impl From<&Unit> for UnitView {
    fn from(unit: &Unit) -> Self {
        Self {
            unit_id: unit.unit_id,
            owner_id: unit.owner_id,
            kind: unit.kind,
            x: unit.at.x,
            y: unit.at.y,
            hp: unit.hp,
            moving: u8::from(unit.moving),
        }
    }
}

impl Snapshot {
    pub(super) fn of(state: &WorldState) -> Self {
        let players = state
            .participants()
            .filter_map(|p| {
                Some(PlayerView {
                    player_id: p.id,
                    country: p.faction,
                    base: p.base?,
                    units: p.units.iter().map(UnitView::from).collect(),
                    buildings: p.buildings.clone(),
                })
            })
            .collect();

        Self {
            player_num: state.participants().count(),
            event_flag: state.incident() as u8,
            players,
            map: state.grid().rows().to_vec(),
        }
    }
}
