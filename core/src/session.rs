use serde::{Deserialize, Serialize};

use crate::config::TimingMode;
use crate::timer::Countdown;

/// A tile's index is both its crop in the source image and its correct slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(pub usize);

impl TileId {
    pub fn source_index(self) -> usize {
        self.0
    }

    pub fn belongs_in(self, slot: SlotId) -> bool {
        self.0 == slot.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileHome {
    Tray,
    Slot(SlotId),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decoration {
    #[default]
    None,
    Correct,
    Wrong,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    pub id: TileId,
    pub home: TileHome,
    pub decoration: Decoration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    BoardFilled,
    TimeUp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Playing,
    Won,
    Lost(LossReason),
}

impl Phase {
    pub fn is_over(self) -> bool {
        !matches!(self, Phase::Playing)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub tile: TileId,
    pub slot: SlotId,
    /// Slot the tile was lifted from, when it was moved rather than dealt from the tray.
    pub from: Option<SlotId>,
    pub correct: bool,
}

/// Mutable state of one round. Only the controller mutates it.
#[derive(Clone, Debug)]
pub struct Session {
    tiles: Vec<Tile>,
    slots: Vec<Option<TileId>>,
    correct_count: usize,
    wrong_count: usize,
    selected: Option<TileId>,
    global_timer: Option<Countdown>,
    piece_timer: Option<Countdown>,
    phase: Phase,
}

impl Session {
    pub fn new(total: usize, timing: TimingMode) -> Self {
        let tiles = (0..total)
            .map(|index| Tile {
                id: TileId(index),
                home: TileHome::Tray,
                decoration: Decoration::None,
            })
            .collect();
        let (global_timer, piece_timer) = match timing {
            TimingMode::Untimed => (None, None),
            TimingMode::Timed {
                piece_secs,
                global_secs,
            } => (
                Some(Countdown::started(global_secs)),
                Some(Countdown::new(piece_secs)),
            ),
        };
        Self {
            tiles,
            slots: vec![None; total],
            correct_count: 0,
            wrong_count: 0,
            selected: None,
            global_timer,
            piece_timer,
            phase: Phase::Playing,
        }
    }

    pub fn total(&self) -> usize {
        self.tiles.len()
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.0)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn slot_occupant(&self, slot: SlotId) -> Option<TileId> {
        self.slots.get(slot.0).copied().flatten()
    }

    pub fn has_slot(&self, slot: SlotId) -> bool {
        slot.0 < self.slots.len()
    }

    pub fn is_slot_empty(&self, slot: SlotId) -> bool {
        matches!(self.slots.get(slot.0), Some(None))
    }

    pub fn empty_slots(&self) -> Vec<SlotId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, occupant)| occupant.is_none())
            .map(|(index, _)| SlotId(index))
            .collect()
    }

    pub fn tray_tiles(&self) -> Vec<TileId> {
        self.tiles
            .iter()
            .filter(|tile| tile.home == TileHome::Tray)
            .map(|tile| tile.id)
            .collect()
    }

    pub fn placed_count(&self) -> usize {
        self.slots.iter().filter(|occupant| occupant.is_some()).count()
    }

    pub fn all_slots_filled(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn wrong_count(&self) -> usize {
        self.wrong_count
    }

    pub fn selected(&self) -> Option<TileId> {
        self.selected
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_timed(&self) -> bool {
        self.global_timer.is_some()
    }

    pub fn remaining_global_secs(&self) -> Option<u32> {
        self.global_timer.as_ref().map(Countdown::remaining)
    }

    /// Only reported while the piece countdown is running.
    pub fn remaining_piece_secs(&self) -> Option<u32> {
        self.piece_timer
            .as_ref()
            .filter(|timer| timer.is_running())
            .map(Countdown::remaining)
    }

    pub fn global_timer_running(&self) -> bool {
        self.global_timer.as_ref().is_some_and(Countdown::is_running)
    }

    pub fn piece_timer_running(&self) -> bool {
        self.piece_timer.as_ref().is_some_and(Countdown::is_running)
    }

    pub(crate) fn global_timer_mut(&mut self) -> Option<&mut Countdown> {
        self.global_timer.as_mut()
    }

    pub(crate) fn piece_timer_mut(&mut self) -> Option<&mut Countdown> {
        self.piece_timer.as_mut()
    }

    pub(crate) fn select(&mut self, tile: TileId) {
        self.selected = Some(tile);
        if let Some(timer) = self.piece_timer.as_mut() {
            timer.start();
        }
    }

    pub(crate) fn take_selection(&mut self) -> Option<TileId> {
        if let Some(timer) = self.piece_timer.as_mut() {
            timer.cancel();
        }
        self.selected.take()
    }

    /// Puts `tile` into the empty `slot`. A tile moved out of another slot frees it
    /// and trades its old result for the new one, so the counts track the board.
    pub(crate) fn place(&mut self, tile: TileId, slot: SlotId) -> Option<Placement> {
        if !self.is_slot_empty(slot) {
            return None;
        }
        let entry = self.tiles.get_mut(tile.0)?;
        let from = match entry.home {
            TileHome::Tray => None,
            TileHome::Slot(previous) => Some(previous),
        };
        let previous_decoration = entry.decoration;
        let correct = tile.belongs_in(slot);
        entry.home = TileHome::Slot(slot);
        entry.decoration = if correct {
            Decoration::Correct
        } else {
            Decoration::Wrong
        };
        if let Some(previous) = from {
            self.slots[previous.0] = None;
            match previous_decoration {
                Decoration::Correct => self.correct_count = self.correct_count.saturating_sub(1),
                Decoration::Wrong => self.wrong_count = self.wrong_count.saturating_sub(1),
                Decoration::None => {}
            }
        }
        self.slots[slot.0] = Some(tile);
        if correct {
            self.correct_count += 1;
        } else {
            self.wrong_count += 1;
        }
        Some(Placement {
            tile,
            slot,
            from,
            correct,
        })
    }

    pub(crate) fn reset_score(&mut self) {
        self.correct_count = 0;
        self.wrong_count = 0;
    }

    pub(crate) fn finish(&mut self, phase: Phase) -> bool {
        if self.phase.is_over() {
            return false;
        }
        self.phase = phase;
        self.take_selection();
        if let Some(timer) = self.global_timer.as_mut() {
            timer.cancel();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_requires_empty_slot() {
        let mut session = Session::new(4, TimingMode::Untimed);
        let first = session.place(TileId(2), SlotId(2)).expect("placed");
        assert!(first.correct);
        assert_eq!(first.from, None);
        assert_eq!(session.place(TileId(1), SlotId(2)), None);
        assert_eq!(session.place(TileId(9), SlotId(0)), None);
        assert_eq!(session.place(TileId(0), SlotId(9)), None);
        assert_eq!(session.correct_count(), 1);
        assert_eq!(session.wrong_count(), 0);
        assert_eq!(session.slot_occupant(SlotId(2)), Some(TileId(2)));
        assert_eq!(session.tray_tiles(), vec![TileId(0), TileId(1), TileId(3)]);
    }

    #[test]
    fn moving_a_placed_tile_swaps_its_result() {
        let mut session = Session::new(4, TimingMode::Untimed);
        session.place(TileId(2), SlotId(2)).expect("placed");
        let moved = session.place(TileId(2), SlotId(3)).expect("moved");
        assert_eq!(moved.from, Some(SlotId(2)));
        assert!(!moved.correct);
        assert_eq!(session.slot_occupant(SlotId(2)), None);
        assert_eq!(session.slot_occupant(SlotId(3)), Some(TileId(2)));
        assert_eq!((session.correct_count(), session.wrong_count()), (0, 1));
        assert_eq!(session.placed_count(), 1);

        session.place(TileId(2), SlotId(2)).expect("moved back");
        assert_eq!((session.correct_count(), session.wrong_count()), (1, 0));
        assert_eq!(
            session.tile(TileId(2)).map(|tile| tile.decoration),
            Some(Decoration::Correct)
        );
    }

    #[test]
    fn timed_session_starts_global_only() {
        let session = Session::new(
            2,
            TimingMode::Timed {
                piece_secs: 5,
                global_secs: 30,
            },
        );
        assert!(session.global_timer_running());
        assert!(!session.piece_timer_running());
        assert_eq!(session.remaining_global_secs(), Some(30));
        assert_eq!(session.remaining_piece_secs(), None);
    }

    #[test]
    fn finish_only_once() {
        let mut session = Session::new(1, TimingMode::timed_default());
        session.select(TileId(0));
        assert!(session.finish(Phase::Lost(LossReason::TimeUp)));
        assert!(!session.finish(Phase::Won));
        assert_eq!(session.phase(), Phase::Lost(LossReason::TimeUp));
        assert_eq!(session.selected(), None);
        assert!(!session.global_timer_running());
        assert!(!session.piece_timer_running());
    }
}
