// src/blocks.rs
//! Chat message blocks for a status report.

use serde::Serialize;

use crate::models::game::{Game, NationRecord, NationType, TurnStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    PlainText,
    Mrkdwn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Text {
    #[serde(rename = "type")]
    pub kind: TextKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header { text: Text },
    Divider,
    Section { text: Text },
}

impl Block {
    pub fn header(text: impl Into<String>) -> Self {
        Self::Header {
            text: Text {
                kind: TextKind::PlainText,
                text: text.into(),
            },
        }
    }

    pub fn section(text: impl Into<String>) -> Self {
        Self::Section {
            text: Text {
                kind: TextKind::Mrkdwn,
                text: text.into(),
            },
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Header { text } | Self::Section { text } => Some(&text.text),
            Self::Divider => None,
        }
    }
}

/// Per-nation marker. Death wins over everything, then bots, then turn state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Dead,
    Bot,
    NotSubmitted,
    Partial,
    Complete,
}

impl Marker {
    pub fn for_nation(controller: NationType, turn_status: TurnStatus) -> Self {
        if controller.is_dead() {
            return Self::Dead;
        }
        if controller == NationType::Bot {
            return Self::Bot;
        }
        match turn_status {
            TurnStatus::NotSubmitted => Self::NotSubmitted,
            TurnStatus::PartiallySubmitted => Self::Partial,
            TurnStatus::Submitted => Self::Complete,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Dead => ":skull:",
            Self::Bot => ":robot_face:",
            Self::NotSubmitted => ":x:",
            Self::Partial => ":question:",
            Self::Complete => ":white_check_mark:",
        }
    }
}

pub fn player_block(nation: &NationRecord) -> Block {
    let marker = Marker::for_nation(nation.controller, nation.turn_status);
    Block::section(format!(" {} *{}*", marker.emoji(), nation.name))
}

pub fn player_blocks(players: &[NationRecord]) -> Vec<Block> {
    players.iter().map(player_block).collect()
}

/// Header, turn summary, then one block per nation in API order.
pub fn render(game: &Game) -> Vec<Block> {
    let mut blocks = vec![
        Block::header("Dominions Times"),
        Block::Divider,
        Block::section(" :freak_lord: *Update* :freak_lord:"),
        Block::section(format!("{} Turn: {}", game.name, game.turn)),
        Block::section(format!("Remaining Hours: {:.2}", game.hours_remaining)),
        Block::Divider,
        Block::section("*Player List*"),
    ];
    blocks.extend(player_blocks(&game.players));
    blocks
}
