use crate::layout::{CropOffset, TrayPosition};
use crate::outcome::ModalContent;
use crate::session::{Decoration, SlotId, TileId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropPreview {
    Match,
    Mismatch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotHighlight {
    None,
    Target { preview: Option<DropPreview> },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimerDisplay {
    pub global_secs: Option<u32>,
    pub piece_secs: Option<u32>,
}

/// Presentation side of a round. The controller calls these after every state change;
/// implementations only mutate what the player sees.
pub trait BoardSurface {
    fn apply_image(&mut self, url: &str);
    fn place_in_tray(&mut self, tile: TileId, crop: CropOffset, position: TrayPosition);
    fn move_to_slot(&mut self, tile: TileId, slot: SlotId);
    fn decorate_tile(&mut self, tile: TileId, decoration: Decoration);
    fn highlight_slot(&mut self, slot: SlotId, highlight: SlotHighlight);
    fn show_timers(&mut self, timers: TimerDisplay);
    fn show_modal(&mut self, modal: &ModalContent);
}
