use crate::session::{SlotId, TileId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PuzzleAction {
    StartDrag { tile: TileId },
    DragEnter { slot: SlotId },
    DragLeave { slot: SlotId },
    Drop { slot: SlotId },
    DragEnd,
    TickGlobal,
    TickPiece,
    ChangeImage { url: String },
}

impl PuzzleAction {
    pub fn label(&self) -> &'static str {
        match self {
            PuzzleAction::StartDrag { .. } => "start_drag",
            PuzzleAction::DragEnter { .. } => "drag_enter",
            PuzzleAction::DragLeave { .. } => "drag_leave",
            PuzzleAction::Drop { .. } => "drop",
            PuzzleAction::DragEnd => "drag_end",
            PuzzleAction::TickGlobal => "tick_global",
            PuzzleAction::TickPiece => "tick_piece",
            PuzzleAction::ChangeImage { .. } => "change_image",
        }
    }
}
