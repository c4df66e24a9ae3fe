use crate::action::PuzzleAction;
use crate::config::{ConfigError, GameConfig, ImageChangePolicy};
use crate::image::{validate_image_url, ImageError};
use crate::layout::BoardLayout;
use crate::outcome::{ModalContent, Outcome};
use crate::session::{Decoration, LossReason, Phase, Session, SlotId, TileHome, TileId};
use crate::surface::{BoardSurface, DropPreview, SlotHighlight, TimerDisplay};
use crate::timer::TickOutcome;

/// Owns the round: the session, the layout it was dealt from, and the surface it renders to.
///
/// Inputs arrive one at a time as method calls (or [`PuzzleAction`]s through
/// [`PuzzleController::dispatch`]); each returns whether it changed anything.
/// Once the round is over every input is ignored.
pub struct PuzzleController<S: BoardSurface> {
    config: GameConfig,
    layout: BoardLayout,
    session: Session,
    image_url: String,
    surface: S,
}

impl<S: BoardSurface> PuzzleController<S> {
    /// Deals the tiles into the tray and starts the global countdown when timed.
    /// Fails on an invalid config or an unusable image URL.
    pub fn start(
        config: GameConfig,
        layout: BoardLayout,
        image_url: &str,
        surface: S,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let image_url = validate_image_url(image_url)?;
        let session = Session::new(layout.tile_count(), config.timing);
        let mut controller = Self {
            config,
            layout,
            session,
            image_url,
            surface,
        };
        controller.surface.apply_image(&controller.image_url);
        for index in 0..controller.layout.tile_count() {
            controller.return_to_tray(TileId(index));
        }
        controller.refresh_timers();
        Ok(controller)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn outcome(&self) -> Option<Outcome> {
        let phase = self.session.phase();
        if !phase.is_over() {
            return None;
        }
        Some(self.outcome_for(phase))
    }

    pub fn dispatch(&mut self, action: PuzzleAction) -> bool {
        match action {
            PuzzleAction::StartDrag { tile } => self.start_drag(tile),
            PuzzleAction::DragEnter { slot } => self.drag_enter(slot),
            PuzzleAction::DragLeave { slot } => self.drag_leave(slot),
            PuzzleAction::Drop { slot } => self.drop_on(slot),
            PuzzleAction::DragEnd => self.drag_end(),
            PuzzleAction::TickGlobal => self.tick_global(),
            PuzzleAction::TickPiece => self.tick_piece(),
            PuzzleAction::ChangeImage { url } => self.change_image(&url).is_ok(),
        }
    }

    /// Picks up a tile from the tray or from the slot it was dropped in.
    pub fn start_drag(&mut self, tile: TileId) -> bool {
        if self.session.phase().is_over() || self.session.tile(tile).is_none() {
            return false;
        }
        self.session.select(tile);
        self.refresh_timers();
        true
    }

    pub fn drag_enter(&mut self, slot: SlotId) -> bool {
        if self.session.phase().is_over() || !self.session.has_slot(slot) {
            return false;
        }
        let preview = self.session.selected().map(|tile| {
            if tile.belongs_in(slot) {
                DropPreview::Match
            } else {
                DropPreview::Mismatch
            }
        });
        self.surface
            .highlight_slot(slot, SlotHighlight::Target { preview });
        true
    }

    pub fn drag_leave(&mut self, slot: SlotId) -> bool {
        if self.session.phase().is_over() || !self.session.has_slot(slot) {
            return false;
        }
        self.surface.highlight_slot(slot, SlotHighlight::None);
        true
    }

    /// Drops the selected tile into `slot`, freeing the slot it came from if any.
    /// Occupied slots reject the drop and the tile stays selected.
    pub fn drop_on(&mut self, slot: SlotId) -> bool {
        if self.session.phase().is_over() || !self.session.has_slot(slot) {
            return false;
        }
        self.surface.highlight_slot(slot, SlotHighlight::None);
        let Some(tile) = self.session.selected() else {
            return false;
        };
        let Some(placement) = self.session.place(tile, slot) else {
            return false;
        };
        self.session.take_selection();
        self.surface.move_to_slot(placement.tile, placement.slot);
        let decoration = if placement.correct {
            Decoration::Correct
        } else {
            Decoration::Wrong
        };
        self.surface.decorate_tile(placement.tile, decoration);
        self.refresh_timers();
        self.check_game_state();
        true
    }

    /// The drag was released somewhere other than a slot.
    pub fn drag_end(&mut self) -> bool {
        if self.session.phase().is_over() {
            return false;
        }
        if self.session.take_selection().is_none() {
            return false;
        }
        self.refresh_timers();
        true
    }

    pub fn tick_global(&mut self) -> bool {
        if self.session.phase().is_over() {
            return false;
        }
        let Some(timer) = self.session.global_timer_mut() else {
            return false;
        };
        match timer.tick() {
            TickOutcome::Idle => false,
            TickOutcome::Running { .. } => {
                self.refresh_timers();
                true
            }
            TickOutcome::Expired => {
                self.finish(Phase::Lost(LossReason::TimeUp));
                true
            }
        }
    }

    pub fn tick_piece(&mut self) -> bool {
        if self.session.phase().is_over() {
            return false;
        }
        let Some(timer) = self.session.piece_timer_mut() else {
            return false;
        };
        match timer.tick() {
            TickOutcome::Idle => false,
            TickOutcome::Running { .. } => {
                self.refresh_timers();
                true
            }
            TickOutcome::Expired => {
                // A tile lifted from a slot stays in that slot.
                if let Some(tile) = self.session.take_selection() {
                    if self.session.tile(tile).map(|entry| entry.home) == Some(TileHome::Tray) {
                        self.return_to_tray(tile);
                    }
                }
                self.refresh_timers();
                true
            }
        }
    }

    /// Re-skins every tile and the preview. Slot occupancy and timers are left alone;
    /// the score follows [`ImageChangePolicy`].
    pub fn change_image(&mut self, url: &str) -> Result<(), ImageError> {
        let url = validate_image_url(url)?;
        self.surface.apply_image(&url);
        self.image_url = url;
        if self.config.image_change == ImageChangePolicy::ResetScore {
            self.session.reset_score();
        }
        Ok(())
    }

    fn check_game_state(&mut self) {
        if self.session.phase().is_over() {
            return;
        }
        let total = self.session.total();
        if self.session.correct_count() == total {
            self.finish(Phase::Won);
        } else if self.session.all_slots_filled() {
            self.finish(Phase::Lost(LossReason::BoardFilled));
        }
    }

    fn finish(&mut self, phase: Phase) {
        if !self.session.finish(phase) {
            return;
        }
        self.refresh_timers();
        let modal = ModalContent::for_outcome(self.outcome_for(phase));
        self.surface.show_modal(&modal);
    }

    fn outcome_for(&self, phase: Phase) -> Outcome {
        Outcome {
            phase,
            correct: self.session.correct_count(),
            wrong: self.session.wrong_count(),
            total: self.session.total(),
        }
    }

    fn return_to_tray(&mut self, tile: TileId) {
        let (Some(crop), Some(position)) = (
            self.layout.crops.get(tile.0).copied(),
            self.layout.tray.get(tile.0).copied(),
        ) else {
            return;
        };
        self.surface.place_in_tray(tile, crop, position);
        self.surface.decorate_tile(tile, Decoration::None);
    }

    fn refresh_timers(&mut self) {
        if !self.session.is_timed() {
            return;
        }
        let timers = TimerDisplay {
            global_secs: self.session.remaining_global_secs(),
            piece_secs: self.session.remaining_piece_secs(),
        };
        self.surface.show_timers(timers);
    }
}
