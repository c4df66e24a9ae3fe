use std::fmt;
use std::time::Duration;

use puzzledrop_core::layout::{CropOffset, TrayPosition};
use puzzledrop_core::{
    BoardSurface, Decoration, DropPreview, ModalContent, Outcome, PuzzleAction, PuzzleController,
    Session, SlotHighlight, SlotId, TileId, TimerDisplay, TimingMode,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

const MAX_BOT_STEPS: u32 = 100_000;
/// Stand-in deadline for waits too long for `Instant` to represent.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

#[derive(Clone, Debug)]
pub(crate) struct BotConfig {
    pub(crate) accuracy: f64,
    pub(crate) dawdle: f64,
    pub(crate) think: Duration,
    pub(crate) tick: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Picked,
    Hovering,
}

#[derive(Clone, Copy, Debug)]
struct Plan {
    tile: TileId,
    slot: SlotId,
    stage: Stage,
    dawdling: bool,
}

pub(crate) struct Bot {
    rng: StdRng,
    accuracy: f64,
    dawdle: f64,
    think: Duration,
    hold: Duration,
    tick: Duration,
    plan: Option<Plan>,
}

impl Bot {
    pub(crate) fn new(config: BotConfig, timing: &TimingMode, seed: u64) -> Self {
        // Long enough for the piece countdown to run out first.
        let hold = match timing {
            TimingMode::Timed { piece_secs, .. } => {
                config.tick.saturating_mul(piece_secs.saturating_add(2))
            }
            TimingMode::Untimed => config.think.saturating_mul(3),
        };
        Self {
            rng: StdRng::seed_from_u64(seed),
            accuracy: config.accuracy.clamp(0.0, 1.0),
            dawdle: config.dawdle.clamp(0.0, 1.0),
            think: config.think,
            hold,
            tick: config.tick,
            plan: None,
        }
    }

    /// Actions for the next step and how long to wait before asking again.
    pub(crate) fn next_actions(&mut self, session: &Session) -> (Vec<PuzzleAction>, Duration) {
        if let Some(plan) = self.plan {
            if session.selected() != Some(plan.tile) {
                self.plan = None;
            }
        }
        let Some(mut plan) = self.plan.take() else {
            let Some((tile, slot)) = choose_move(session, self.accuracy, &mut self.rng) else {
                return (Vec::new(), self.think);
            };
            let dawdling = self.rng.random_bool(self.dawdle);
            self.plan = Some(Plan {
                tile,
                slot,
                stage: Stage::Picked,
                dawdling,
            });
            let wait = if dawdling { self.hold } else { self.think };
            return (vec![PuzzleAction::StartDrag { tile }], wait);
        };
        match plan.stage {
            Stage::Picked if plan.dawdling => (vec![PuzzleAction::DragEnd], self.think),
            Stage::Picked => {
                plan.stage = Stage::Hovering;
                self.plan = Some(plan);
                (vec![PuzzleAction::DragEnter { slot: plan.slot }], self.think)
            }
            Stage::Hovering => (
                vec![PuzzleAction::Drop { slot: plan.slot }, PuzzleAction::DragEnd],
                self.think,
            ),
        }
    }
}

/// Picks a tray tile and an empty slot, aiming for the tile's own slot with `accuracy`.
pub(crate) fn choose_move(
    session: &Session,
    accuracy: f64,
    rng: &mut StdRng,
) -> Option<(TileId, SlotId)> {
    let tray = session.tray_tiles();
    let empty = session.empty_slots();
    if tray.is_empty() || empty.is_empty() {
        return None;
    }
    let tile = tray[rng.random_range(0..tray.len())];
    let own = SlotId(tile.source_index());
    let slot = if session.is_slot_empty(own) && rng.random_bool(accuracy.clamp(0.0, 1.0)) {
        own
    } else {
        empty[rng.random_range(0..empty.len())]
    };
    Some((tile, slot))
}

fn deadline(after: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(after).unwrap_or(now + FAR_FUTURE)
}

/// Runs the round on tokio timers until the controller reports an outcome.
pub(crate) async fn play<S: BoardSurface>(
    controller: &mut PuzzleController<S>,
    bot: &mut Bot,
) -> Result<Outcome, BotError> {
    let tick = bot.tick;
    let mut global = interval_at(deadline(tick), tick);
    global.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut piece = interval_at(deadline(tick), tick);
    piece.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let bot_timer = sleep(bot.think);
    tokio::pin!(bot_timer);
    let mut steps = 0u32;

    loop {
        if let Some(outcome) = controller.outcome() {
            return Ok(outcome);
        }
        let timed = controller.session().is_timed();
        let piece_running = controller.session().piece_timer_running();
        tokio::select! {
            _ = global.tick(), if timed => {
                controller.dispatch(PuzzleAction::TickGlobal);
            }
            _ = piece.tick(), if piece_running => {
                controller.dispatch(PuzzleAction::TickPiece);
            }
            _ = &mut bot_timer => {
                steps += 1;
                if steps > MAX_BOT_STEPS {
                    return Err(BotError::Stalled { steps });
                }
                let (actions, wait) = bot.next_actions(controller.session());
                for action in actions {
                    let starts_drag = matches!(action, PuzzleAction::StartDrag { .. });
                    if controller.dispatch(action) && starts_drag {
                        piece.reset();
                    }
                }
                bot_timer.as_mut().reset(deadline(wait));
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BotError {
    Stalled { steps: u32 },
}

impl fmt::Display for BotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotError::Stalled { steps } => write!(f, "round still running after {steps} bot steps"),
        }
    }
}

impl std::error::Error for BotError {}

/// Prints every surface update as one line.
pub(crate) struct ConsoleSurface {
    quiet: bool,
}

impl ConsoleSurface {
    pub(crate) fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    fn line(&self, text: String) {
        if !self.quiet {
            println!("{text}");
        }
    }
}

impl BoardSurface for ConsoleSurface {
    fn apply_image(&mut self, url: &str) {
        self.line(format!("image: {url}"));
    }

    fn place_in_tray(&mut self, tile: TileId, crop: CropOffset, position: TrayPosition) {
        self.line(format!(
            "tray: tile {} crop=({}, {}) at ({}, {})",
            tile.0, crop.left, crop.top, position.left, position.top
        ));
    }

    fn move_to_slot(&mut self, tile: TileId, slot: SlotId) {
        self.line(format!("slot {}: tile {}", slot.0, tile.0));
    }

    fn decorate_tile(&mut self, tile: TileId, decoration: Decoration) {
        match decoration {
            Decoration::None => {}
            Decoration::Correct => self.line(format!("tile {}: correct", tile.0)),
            Decoration::Wrong => self.line(format!("tile {}: wrong", tile.0)),
        }
    }

    fn highlight_slot(&mut self, slot: SlotId, highlight: SlotHighlight) {
        if let SlotHighlight::Target { preview } = highlight {
            let hint = match preview {
                Some(DropPreview::Match) => "match",
                Some(DropPreview::Mismatch) => "mismatch",
                None => "-",
            };
            self.line(format!("hover slot {} ({hint})", slot.0));
        }
    }

    fn show_timers(&mut self, timers: TimerDisplay) {
        let global = timers
            .global_secs
            .map(|secs| format!("{secs}s"))
            .unwrap_or_else(|| "-".to_string());
        let piece = timers
            .piece_secs
            .map(|secs| format!("{secs}s"))
            .unwrap_or_else(|| "-".to_string());
        self.line(format!("timers: global={global} piece={piece}"));
    }

    fn show_modal(&mut self, modal: &ModalContent) {
        eprintln!("{}: {} [{}]", modal.title, modal.message, modal.button_label);
    }
}
