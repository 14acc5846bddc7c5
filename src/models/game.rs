// src/models/game.rs
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::StatusError;
use crate::protocol::DecodeError;

/// Status servers listen on this base plus the game id.
pub const STATUS_PORT_BASE: u16 = 30000;

/// A hosted game, identified the way the hosting service numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GameId(u16);

impl GameId {
    pub const MAX: u16 = u16::MAX - STATUS_PORT_BASE;

    pub fn new(id: u32) -> Result<Self, StatusError> {
        u16::try_from(id)
            .ok()
            .filter(|id| *id <= Self::MAX)
            .map(Self)
            .ok_or_else(|| StatusError::InvalidGameId(id.to_string()))
    }

    /// Recovers the game id from the port its status server listens on.
    pub fn from_status_port(port: u16) -> Result<Self, StatusError> {
        port.checked_sub(STATUS_PORT_BASE)
            .map(Self)
            .ok_or_else(|| StatusError::InvalidGameId(format!("port {}", port)))
    }

    /// Parses like `from_str`, but an address must point at `status_host`.
    pub fn parse_for_host(s: &str, status_host: &str) -> Result<Self, StatusError> {
        if let Some((host, _)) = s.trim().rsplit_once(':') {
            if !host.eq_ignore_ascii_case(status_host) {
                return Err(StatusError::InvalidGameId(format!(
                    "{} is not hosted on {}",
                    s.trim(),
                    status_host
                )));
            }
        }
        s.parse()
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    pub fn status_port(&self) -> u16 {
        STATUS_PORT_BASE + self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Accepts a bare id (`1626`) or a hosted address (`snek.earth:31626`).
///
/// The host part of an address is not checked here; see `GameId::parse_for_host`.
impl FromStr for GameId {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || StatusError::InvalidGameId(s.to_string());

        match s.rsplit_once(':') {
            Some((_, port)) => {
                let port = port.parse::<u16>().map_err(|_| invalid())?;
                Self::from_status_port(port).map_err(|_| invalid())
            }
            None => {
                let id = s.parse::<u32>().map_err(|_| invalid())?;
                Self::new(id)
            }
        }
    }
}

/// Who controls a nation slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NationType {
    Empty,
    Human,
    Bot,
    Independent,
    Closed,
    #[serde(rename = "Defeated_this_turn")]
    DefeatedThisTurn,
    Defeated,
    #[serde(rename = "eliminated_player")]
    EliminatedPlayer,
    #[serde(rename = "Defeated_Duplicate")]
    DefeatedDuplicate,
}

const NATION_TYPE_CODES: [(i64, NationType); 9] = [
    (0, NationType::Empty),
    (1, NationType::Human),
    (2, NationType::Bot),
    (3, NationType::Independent),
    (253, NationType::Closed),
    (254, NationType::DefeatedThisTurn),
    (255, NationType::Defeated),
    (-1, NationType::EliminatedPlayer),
    (-2, NationType::DefeatedDuplicate),
];

impl NationType {
    pub fn from_code(code: i64) -> Result<Self, DecodeError> {
        NATION_TYPE_CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, kind)| *kind)
            .ok_or(DecodeError::UnknownNationType(code))
    }

    pub fn code(&self) -> i64 {
        NATION_TYPE_CODES
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(c, _)| *c)
            .unwrap_or_default()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Empty => "Empty",
            Self::Human => "Human",
            Self::Bot => "Bot",
            Self::Independent => "Independent",
            Self::Closed => "Closed",
            Self::DefeatedThisTurn => "Defeated_this_turn",
            Self::Defeated => "Defeated",
            Self::EliminatedPlayer => "eliminated_player",
            Self::DefeatedDuplicate => "Defeated_Duplicate",
        }
    }

    /// Any of the defeated or eliminated kinds.
    pub fn is_dead(&self) -> bool {
        matches!(
            self,
            Self::DefeatedThisTurn
                | Self::Defeated
                | Self::EliminatedPlayer
                | Self::DefeatedDuplicate
        )
    }
}

impl fmt::Display for NationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How far a nation got with this turn's orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TurnStatus {
    NotSubmitted,
    PartiallySubmitted,
    Submitted,
}

const TURN_STATUS_CODES: [(i64, TurnStatus); 3] = [
    (0, TurnStatus::NotSubmitted),
    (1, TurnStatus::PartiallySubmitted),
    (2, TurnStatus::Submitted),
];

impl TurnStatus {
    pub fn from_code(code: i64) -> Result<Self, DecodeError> {
        TURN_STATUS_CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, status)| *status)
            .ok_or(DecodeError::UnknownTurnStatus(code))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::NotSubmitted => "NotSubmitted",
            Self::PartiallySubmitted => "PartiallySubmitted",
            Self::Submitted => "Submitted",
        }
    }
}

impl fmt::Display for TurnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Turn and timer as reported by the status server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameStatus {
    pub name: String,
    pub turn: u32,
    pub hours_remaining: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NationRecord {
    pub id: u32,
    pub name: String,
    pub epithet: String,
    pub controller: NationType,
    pub turn_status: TurnStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Game {
    pub server_id: GameId,
    pub name: String,
    pub turn: u32,
    pub hours_remaining: f64,
    pub players: Vec<NationRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nation_type_codes() {
        assert_eq!(NationType::from_code(255).unwrap(), NationType::Defeated);
        assert_eq!(NationType::from_code(255).unwrap().name(), "Defeated");
        assert_eq!(NationType::from_code(-1).unwrap().name(), "eliminated_player");
        assert_eq!(NationType::from_code(-2).unwrap(), NationType::DefeatedDuplicate);
        assert_eq!(NationType::from_code(253).unwrap(), NationType::Closed);
        assert_eq!(NationType::from_code(2).unwrap(), NationType::Bot);
        for (code, kind) in NATION_TYPE_CODES {
            assert_eq!(kind.code(), code);
        }
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert!(matches!(
            NationType::from_code(99),
            Err(DecodeError::UnknownNationType(99))
        ));
        assert!(matches!(
            TurnStatus::from_code(99),
            Err(DecodeError::UnknownTurnStatus(99))
        ));
        assert!(TurnStatus::from_code(-1).is_err());
    }

    #[test]
    fn turn_status_codes() {
        assert_eq!(TurnStatus::from_code(0).unwrap(), TurnStatus::NotSubmitted);
        assert_eq!(TurnStatus::from_code(1).unwrap().name(), "PartiallySubmitted");
        assert_eq!(TurnStatus::from_code(2).unwrap(), TurnStatus::Submitted);
    }

    #[test]
    fn dead_kinds() {
        assert!(NationType::Defeated.is_dead());
        assert!(NationType::DefeatedThisTurn.is_dead());
        assert!(NationType::EliminatedPlayer.is_dead());
        assert!(NationType::DefeatedDuplicate.is_dead());
        assert!(!NationType::Bot.is_dead());
        assert!(!NationType::Human.is_dead());
    }

    #[test]
    fn serializes_with_legacy_names() {
        let json = serde_json::to_string(&NationType::DefeatedThisTurn).unwrap();
        assert_eq!(json, "\"Defeated_this_turn\"");
    }

    #[test]
    fn game_id_parsing() {
        assert_eq!("1626".parse::<GameId>().unwrap().value(), 1626);
        assert_eq!("snek.earth:31626".parse::<GameId>().unwrap().value(), 1626);
        assert_eq!(" 42 ".parse::<GameId>().unwrap().status_port(), 30042);
        assert_eq!("35535".parse::<GameId>().unwrap().status_port(), u16::MAX);
        assert!("35536".parse::<GameId>().is_err());
        assert!("snek.earth:2000".parse::<GameId>().is_err());
        assert!("abc".parse::<GameId>().is_err());
        assert!("".parse::<GameId>().is_err());
        assert!(matches!(
            "-5".parse::<GameId>(),
            Err(StatusError::InvalidGameId(_))
        ));
    }

    #[test]
    fn address_must_name_the_status_host() {
        let id = GameId::parse_for_host("snek.earth:31626", "snek.earth").unwrap();
        assert_eq!(id.value(), 1626);
        assert_eq!(GameId::parse_for_host("SNEK.earth:31626", "snek.earth").unwrap(), id);
        assert_eq!(GameId::parse_for_host("1626", "snek.earth").unwrap(), id);
        assert!(matches!(
            GameId::parse_for_host("evil.example:31626", "snek.earth"),
            Err(StatusError::InvalidGameId(_))
        ));
    }
}
