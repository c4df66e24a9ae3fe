#![allow(dead_code)]

use puzzledrop_core::layout::{CropOffset, TrayPosition};
use puzzledrop_core::{
    BoardLayout, BoardSurface, Decoration, GameConfig, GridGeometry, ModalContent,
    PuzzleController, SlotHighlight, SlotId, TileId, TimerDisplay,
};

pub const IMAGE_URL: &str = "https://picsum.photos/id/10/1920/1080";

#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceCall {
    Image(String),
    Tray(TileId, CropOffset, TrayPosition),
    Slot(TileId, SlotId),
    Decorate(TileId, Decoration),
    Highlight(SlotId, SlotHighlight),
    Timers(TimerDisplay),
    Modal(ModalContent),
}

#[derive(Default)]
pub struct RecordingSurface {
    pub calls: Vec<SurfaceCall>,
}

impl RecordingSurface {
    pub fn modals(&self) -> Vec<&ModalContent> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SurfaceCall::Modal(modal) => Some(modal),
                _ => None,
            })
            .collect()
    }

    pub fn last_timers(&self) -> Option<TimerDisplay> {
        self.calls.iter().rev().find_map(|call| match call {
            SurfaceCall::Timers(timers) => Some(*timers),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl BoardSurface for RecordingSurface {
    fn apply_image(&mut self, url: &str) {
        self.calls.push(SurfaceCall::Image(url.to_string()));
    }

    fn place_in_tray(&mut self, tile: TileId, crop: CropOffset, position: TrayPosition) {
        self.calls.push(SurfaceCall::Tray(tile, crop, position));
    }

    fn move_to_slot(&mut self, tile: TileId, slot: SlotId) {
        self.calls.push(SurfaceCall::Slot(tile, slot));
    }

    fn decorate_tile(&mut self, tile: TileId, decoration: Decoration) {
        self.calls.push(SurfaceCall::Decorate(tile, decoration));
    }

    fn highlight_slot(&mut self, slot: SlotId, highlight: SlotHighlight) {
        self.calls.push(SurfaceCall::Highlight(slot, highlight));
    }

    fn show_timers(&mut self, timers: TimerDisplay) {
        self.calls.push(SurfaceCall::Timers(timers));
    }

    fn show_modal(&mut self, modal: &ModalContent) {
        self.calls.push(SurfaceCall::Modal(modal.clone()));
    }
}

pub fn controller(config: GameConfig) -> PuzzleController<RecordingSurface> {
    let layout = BoardLayout::generate(config.geometry.clone(), 7);
    PuzzleController::start(config, layout, IMAGE_URL, RecordingSurface::default())
        .expect("controller")
}

pub fn small_config(cols: usize, rows: usize) -> GameConfig {
    let geometry = GridGeometry::new(
        (0..cols).map(|col| col as f32 * 10.0).collect(),
        (0..rows).map(|row| row as f32 * 10.0).collect(),
    )
    .expect("geometry");
    GameConfig {
        geometry,
        ..GameConfig::default()
    }
}

pub fn place(controller: &mut PuzzleController<RecordingSurface>, tile: usize, slot: usize) -> bool {
    assert!(controller.start_drag(TileId(tile)), "drag tile {tile}");
    controller.drag_enter(SlotId(slot));
    controller.drop_on(SlotId(slot))
}
