pub mod action;
pub mod config;
pub mod controller;
pub mod image;
pub mod layout;
pub mod outcome;
pub mod session;
pub mod surface;
pub mod timer;

pub use action::PuzzleAction;
pub use config::{ConfigError, GameConfig, ImageChangePolicy, TimingMode};
pub use controller::PuzzleController;
pub use image::{ImageError, ImageSource};
pub use layout::{
    background_positions, layout_seed, shuffled, tray_positions, BoardLayout, CropOffset,
    GridGeometry, LayoutError, TrayPosition,
};
pub use outcome::{ModalContent, Outcome};
pub use session::{Decoration, LossReason, Phase, Session, SlotId, TileHome, TileId};
pub use surface::{BoardSurface, DropPreview, SlotHighlight, TimerDisplay};
pub use timer::{Countdown, TickOutcome};
