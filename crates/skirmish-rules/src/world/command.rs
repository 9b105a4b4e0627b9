//! World requests and the numbered command set.

use serde::Deserialize;

use super::grid::Point;

/// Requests a world client can send.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WorldRequest {
    /// `{"action":"country","country":3}`
    Country { country: i64 },

    /// `{"action":"command","type":2,"payload":{"unit_type":1}}`
    Command {
        #[serde(rename = "type")]
        kind: i64,
        #[serde(default)]
        payload: Option<CommandPayload>,
    },
}

/// Union of every command's arguments. Which fields are required depends
/// on the command type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommandPayload {
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub unit_type: Option<i64>,
    pub unit_id: Option<i64>,
    pub attacker_id: Option<i64>,
    pub target_id: Option<i64>,
}

/// A command whose payload has the fields its type needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldCommand {
    PlaceBase { at: Point },
    ProduceUnit { unit_type: i64 },
    MoveUnit { unit_id: u32, to: Point },
    AttackUnit { attacker_id: u32, target_id: u32 },
    RequestState,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing `{0}` in command payload")]
pub struct MissingField(pub &'static str);

impl WorldCommand {
    /// Interprets a numbered command.
    ///
    /// Unknown types, and types 1-4 sent without a payload, yield
    /// `Ok(None)` and are ignored. A payload lacking a required field is an
    /// error.
    pub fn parse(kind: i64, payload: Option<&CommandPayload>) -> Result<Option<Self>, MissingField> {
        if kind == 5 {
            return Ok(Some(Self::RequestState));
        }
        if !(1..=4).contains(&kind) {
            return Ok(None);
        }
        let Some(p) = payload else {
            return Ok(None);
        };

        let command = match kind {
            1 => Self::PlaceBase {
                at: point(field(p.x, "x")?, field(p.y, "y")?),
            },
            2 => Self::ProduceUnit {
                unit_type: field(p.unit_type, "unit_type")?,
            },
            3 => Self::MoveUnit {
                unit_id: unit_id(field(p.unit_id, "unit_id")?),
                to: point(field(p.x, "x")?, field(p.y, "y")?),
            },
            _ => Self::AttackUnit {
                attacker_id: unit_id(field(p.attacker_id, "attacker_id")?),
                target_id: unit_id(field(p.target_id, "target_id")?),
            },
        };
        Ok(Some(command))
    }
}

fn field(value: Option<i64>, name: &'static str) -> Result<i64, MissingField> {
    value.ok_or(MissingField(name))
}

/// Out-of-range coordinates saturate, which keeps them off the map.
fn point(x: i64, y: i64) -> Point {
    let clamp = |v: i64| i32::try_from(v).unwrap_or(if v < 0 { i32::MIN } else { i32::MAX });
    Point::new(clamp(x), clamp(y))
}

/// Ids that can't exist map to `u32::MAX`, which no unit is ever given.
fn unit_id(v: i64) -> u32 {
    u32::try_from(v).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> WorldRequest {
        serde_json::from_str(json).unwrap()
    }

    fn parse(json: &str) -> Result<Option<WorldCommand>, MissingField> {
        match decode(json) {
            WorldRequest::Command { kind, payload } => WorldCommand::parse(kind, payload.as_ref()),
            other => panic!("not a command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_place_base() {
        let cmd = parse(r#"{"action":"command","type":1,"payload":{"x":3,"y":4}}"#);
        assert_eq!(cmd, Ok(Some(WorldCommand::PlaceBase { at: Point::new(3, 4) })));
    }

    #[test]
    fn test_parse_request_state_without_payload() {
        let cmd = parse(r#"{"action":"command","type":5}"#);
        assert_eq!(cmd, Ok(Some(WorldCommand::RequestState)));
    }

    #[test]
    fn test_parse_missing_payload_ignored() {
        assert_eq!(parse(r#"{"action":"command","type":2}"#), Ok(None));
    }

    #[test]
    fn test_parse_unknown_type_ignored() {
        assert_eq!(parse(r#"{"action":"command","type":0,"payload":{}}"#), Ok(None));
        assert_eq!(parse(r#"{"action":"command","type":42}"#), Ok(None));
    }

    #[test]
    fn test_parse_missing_field_is_error() {
        let cmd = parse(r#"{"action":"command","type":3,"payload":{"unit_id":100,"x":1}}"#);
        assert_eq!(cmd, Err(MissingField("y")));
    }

    #[test]
    fn test_parse_attack() {
        let cmd = parse(r#"{"action":"command","type":4,"payload":{"attacker_id":0,"target_id":101}}"#);
        assert_eq!(
            cmd,
            Ok(Some(WorldCommand::AttackUnit {
                attacker_id: 0,
                target_id: 101
            }))
        );
    }

    #[test]
    fn test_parse_huge_coordinate_saturates() {
        let cmd = parse(r#"{"action":"command","type":1,"payload":{"x":-9999999999,"y":0}}"#);
        assert_eq!(cmd, Ok(Some(WorldCommand::PlaceBase { at: Point::new(i32::MIN, 0) })));
    }

    #[test]
    fn test_decode_country() {
        assert_eq!(decode(r#"{"action":"country","country":2}"#), WorldRequest::Country { country: 2 });
    }
}
