//! JSON wire format for moves.
//!
//! The move record crosses the persistence/replay boundary in this exact
//! shape; field names are part of the contract. Decoding only validates
//! shape. A decoded move is *replayed* through `Game::make_move`/`submit`,
//! never trusted as state.

use serde::{Deserialize, Serialize};

use crate::engine::moves::{Move, MoveKind};
use crate::engine::types::{EngineError, PieceKind, Promotion, Side};

// ---------------------------------------------------------------------------
// Wire models
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireVec4 {
    pub x: i8,
    pub y: i8,
    pub l: i32,
    pub t: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePiece {
    #[serde(rename = "type")]
    pub kind: String,
    pub side: u8,
    pub x: i8,
    pub y: i8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireBoardRef {
    pub l: i32,
    pub t: i32,
}

/// One serialized move.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMove {
    pub null_move: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<WireVec4>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<WireVec4>,
    /// 1=queen, 2=knight, 3=rook, 4=bishop.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promote: Option<Promotion>,
    pub remote_move: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_piece: Option<WirePiece>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_board: Option<WireBoardRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_board: Option<WireBoardRef>,
    pub is_inter_dimensional_move: bool,
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

impl From<&Move> for WireMove {
    fn from(mv: &Move) -> Self {
        WireMove {
            null_move: mv.kind == MoveKind::Null,
            l: mv.null_timeline,
            from: mv.from.map(|v| WireVec4 {
                x: v.x,
                y: v.y,
                l: v.l,
                t: v.t,
            }),
            to: mv.to.map(|v| WireVec4 {
                x: v.x,
                y: v.y,
                l: v.l,
                t: v.t,
            }),
            promote: mv.promotion,
            remote_move: mv.remote,
            source_piece: mv.piece.as_ref().map(|p| WirePiece {
                kind: p.kind.name().to_string(),
                side: p.side.code(),
                x: p.x,
                y: p.y,
            }),
            source_board: mv.source_board.map(|(l, t)| WireBoardRef { l, t }),
            target_board: mv.target_board.map(|(l, t)| WireBoardRef { l, t }),
            is_inter_dimensional_move: mv.inter_dimensional,
        }
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

impl WireMove {
    /// Encode to a JSON string.
    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string(self).map_err(|e| EngineError::BadWireMove(e.to_string()))
    }

    /// Decode from a JSON string and validate required fields.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let mv: WireMove =
            serde_json::from_str(json).map_err(|e| EngineError::BadWireMove(e.to_string()))?;
        mv.validate()?;
        Ok(mv)
    }

    /// A null move names its timeline; a regular move names its endpoints
    /// and mover.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.null_move {
            if self.l.is_none() {
                return Err(EngineError::BadWireMove("null move without l".into()));
            }
            return Ok(());
        }
        if self.from.is_none() {
            return Err(EngineError::BadWireMove("regular move without from".into()));
        }
        if self.to.is_none() {
            return Err(EngineError::BadWireMove("regular move without to".into()));
        }
        match &self.source_piece {
            None => Err(EngineError::BadWireMove(
                "regular move without sourcePiece".into(),
            )),
            Some(p) => {
                PieceKind::from_name(&p.kind).ok_or_else(|| {
                    EngineError::BadWireMove(format!("unknown piece type '{}'", p.kind))
                })?;
                Side::try_from(p.side).map_err(EngineError::BadWireMove)?;
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
