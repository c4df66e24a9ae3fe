use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo::console;
use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::callback::Interval;
use puzzledrop_core::image::validate_image_url;
use puzzledrop_core::{
    layout_seed, BoardLayout, GameConfig, PuzzleAction, PuzzleController, SlotId, TileId,
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{DragEvent, Element, HtmlElement, HtmlInputElement, Node};

use crate::boot::BootFailure;
use crate::dom_surface::DomSurface;
use crate::{app_router, boot, puzzle_image};

const TICK_MS: u32 = 1_000;

thread_local! {
    static SHELL: RefCell<Option<Rc<PuzzleShell>>> = const { RefCell::new(None) };
}

/// Page-lifetime state: the round once an image is known, and the timers driving it.
struct PuzzleShell {
    config: GameConfig,
    pending_surface: RefCell<Option<DomSurface>>,
    controller: RefCell<Option<PuzzleController<DomSurface>>>,
    global_ticker: RefCell<Option<Interval>>,
    piece_ticker: RefCell<Option<Interval>>,
    picked_url: RefCell<Option<String>>,
    listeners: RefCell<Vec<EventListener>>,
}

pub(crate) fn run() {
    if let Err(err) = mount() {
        console::error!("failed to mount puzzle", err);
        boot::fail(BootFailure::Mount);
    }
}

fn mount() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let root: Element = match document.get_element_by_id("app") {
        Some(root) => root,
        None => document
            .body()
            .ok_or_else(|| JsValue::from_str("no body"))?
            .into(),
    };

    let config = app_router::load_game_config();
    console::log!(format!("puzzle config: {:?}", config.timing));
    let surface = DomSurface::build(&document, &root, &config.geometry)?;
    let tiles = surface.tiles().to_vec();
    let slots = surface.slots().to_vec();
    let file_input = surface.file_input().clone();
    let random_button = surface.random_button().clone();
    let modal_button = surface.modal_button().clone();

    let shell = Rc::new(PuzzleShell {
        config,
        pending_surface: RefCell::new(Some(surface)),
        controller: RefCell::new(None),
        global_ticker: RefCell::new(None),
        piece_ticker: RefCell::new(None),
        picked_url: RefCell::new(None),
        listeners: RefCell::new(Vec::new()),
    });
    shell.wire_tiles(&tiles);
    shell.wire_slots(&slots);
    shell.wire_controls(&file_input, &random_button, &modal_button);
    SHELL.with(|slot| *slot.borrow_mut() = Some(shell.clone()));

    boot::set_phase("Loading image", "Fetching a random picture");
    let weak = Rc::downgrade(&shell);
    let source = shell.config.image.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let result = puzzle_image::resolve_puzzle_image_src(&source).await;
        let Some(shell) = weak.upgrade() else {
            return;
        };
        match result {
            Ok(url) => shell.start_round(&url),
            Err(err) => {
                if shell.controller.borrow().is_some() {
                    return;
                }
                console::warn!(format!("image load failed: {err}"));
                boot::fail(BootFailure::Image(&err));
            }
        }
    });
    Ok(())
}

impl PuzzleShell {
    /// First image wins; a file picked while the random image loads starts the round.
    fn start_round(self: &Rc<Self>, image_url: &str) {
        if self.controller.borrow().is_some() {
            return;
        }
        // Checked before the surface moves into the controller so a bad URL keeps it.
        if let Err(err) = validate_image_url(image_url) {
            console::warn!(format!("image rejected: {err}"));
            boot::fail(BootFailure::Image(&err));
            return;
        }
        let Some(surface) = self.pending_surface.borrow_mut().take() else {
            return;
        };
        let seed = layout_seed(time_nonce());
        let layout = BoardLayout::generate(self.config.geometry.clone(), seed);
        match PuzzleController::start(self.config.clone(), layout, image_url, surface) {
            Ok(controller) => {
                console::log!(format!(
                    "round started: {} tiles, seed {seed:#010x}",
                    controller.session().total()
                ));
                *self.controller.borrow_mut() = Some(controller);
                boot::ready();
                self.sync_tickers(false);
            }
            Err(err) => {
                console::warn!(format!("round could not start: {err}"));
                boot::fail(BootFailure::Config(&err));
            }
        }
    }

    fn dispatch(self: &Rc<Self>, action: PuzzleAction) {
        let label = action.label();
        let restarts_piece = matches!(action, PuzzleAction::StartDrag { .. });
        let (changed, outcome) = {
            let mut controller = self.controller.borrow_mut();
            let Some(controller) = controller.as_mut() else {
                return;
            };
            let changed = controller.dispatch(action);
            (changed, controller.outcome())
        };
        if !changed {
            return;
        }
        if let Some(outcome) = outcome {
            console::log!(format!(
                "{label} ended the round: {:?} correct={} wrong={}",
                outcome.phase, outcome.correct, outcome.wrong
            ));
        }
        self.sync_tickers(restarts_piece);
    }

    fn change_image(self: &Rc<Self>, url: String) {
        let result = {
            let mut controller = self.controller.borrow_mut();
            controller
                .as_mut()
                .map(|controller| controller.change_image(&url))
        };
        match result {
            None => self.start_round(&url),
            Some(Ok(())) => {
                console::log!("image changed");
            }
            Some(Err(err)) => {
                console::warn!(format!("image change rejected: {err}"));
                puzzle_image::revoke_object_url(&url);
                return;
            }
        }
        let previous = self.picked_url.borrow_mut().replace(url);
        if let Some(previous) = previous {
            puzzle_image::revoke_object_url(&previous);
        }
    }

    /// Keeps one interval per running countdown. A new drag restarts the piece interval
    /// so its first tick lands a full second later.
    fn sync_tickers(self: &Rc<Self>, restart_piece: bool) {
        let (global_running, piece_running) = match self.controller.borrow().as_ref() {
            Some(controller) => (
                controller.session().global_timer_running(),
                controller.session().piece_timer_running(),
            ),
            None => (false, false),
        };
        if restart_piece {
            self.piece_ticker.borrow_mut().take();
        }
        self.sync_ticker(&self.global_ticker, global_running, PuzzleAction::TickGlobal);
        self.sync_ticker(&self.piece_ticker, piece_running, PuzzleAction::TickPiece);
    }

    fn sync_ticker(
        self: &Rc<Self>,
        ticker: &RefCell<Option<Interval>>,
        running: bool,
        action: PuzzleAction,
    ) {
        let mut ticker = ticker.borrow_mut();
        if !running {
            ticker.take();
            return;
        }
        if ticker.is_some() {
            return;
        }
        let weak = Rc::downgrade(self);
        *ticker = Some(Interval::new(TICK_MS, move || {
            if let Some(shell) = weak.upgrade() {
                shell.dispatch(action.clone());
            }
        }));
    }

    fn wire_tiles(self: &Rc<Self>, tiles: &[HtmlElement]) {
        let mut listeners = self.listeners.borrow_mut();
        for (index, element) in tiles.iter().enumerate() {
            let weak = Rc::downgrade(self);
            listeners.push(EventListener::new(element, "dragstart", move |event| {
                if let Some(event) = event.dyn_ref::<DragEvent>() {
                    if let Some(transfer) = event.data_transfer() {
                        transfer.set_effect_allowed("move");
                        let _ = transfer.set_data("text/plain", &index.to_string());
                    }
                }
                with_shell(&weak, |shell| {
                    shell.dispatch(PuzzleAction::StartDrag {
                        tile: TileId(index),
                    })
                });
            }));
            let weak = Rc::downgrade(self);
            listeners.push(EventListener::new(element, "dragend", move |_| {
                with_shell(&weak, |shell| shell.dispatch(PuzzleAction::DragEnd));
            }));
        }
    }

    fn wire_slots(self: &Rc<Self>, slots: &[HtmlElement]) {
        let mut listeners = self.listeners.borrow_mut();
        for (index, element) in slots.iter().enumerate() {
            let slot = SlotId(index);
            listeners.push(EventListener::new_with_options(
                element,
                "dragover",
                EventListenerOptions::enable_prevent_default(),
                |event| {
                    event.prevent_default();
                    if let Some(transfer) = event
                        .dyn_ref::<DragEvent>()
                        .and_then(|event| event.data_transfer())
                    {
                        transfer.set_drop_effect("move");
                    }
                },
            ));
            let weak = Rc::downgrade(self);
            listeners.push(EventListener::new_with_options(
                element,
                "dragenter",
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    event.prevent_default();
                    with_shell(&weak, |shell| {
                        shell.dispatch(PuzzleAction::DragEnter { slot })
                    });
                },
            ));
            let weak = Rc::downgrade(self);
            let target = element.clone();
            listeners.push(EventListener::new(element, "dragleave", move |event| {
                // Moving onto a child of the slot also fires dragleave.
                let inside = event
                    .dyn_ref::<DragEvent>()
                    .and_then(|event| event.related_target())
                    .and_then(|related| related.dyn_into::<Node>().ok())
                    .is_some_and(|node| target.contains(Some(&node)));
                if inside {
                    return;
                }
                with_shell(&weak, |shell| {
                    shell.dispatch(PuzzleAction::DragLeave { slot })
                });
            }));
            let weak = Rc::downgrade(self);
            listeners.push(EventListener::new_with_options(
                element,
                "drop",
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    event.prevent_default();
                    with_shell(&weak, |shell| shell.dispatch(PuzzleAction::Drop { slot }));
                },
            ));
        }
    }

    fn wire_controls(
        self: &Rc<Self>,
        file_input: &HtmlInputElement,
        random_button: &HtmlElement,
        modal_button: &HtmlElement,
    ) {
        let mut listeners = self.listeners.borrow_mut();
        let weak = Rc::downgrade(self);
        let input = file_input.clone();
        listeners.push(EventListener::new(file_input, "change", move |_| {
            let Some(file) = input.files().and_then(|files| files.get(0)) else {
                return;
            };
            match puzzle_image::create_object_url(&file) {
                Ok(url) => with_shell(&weak, |shell| shell.change_image(url)),
                Err(err) => {
                    console::warn!(format!("could not read {}: {err}", file.name()));
                }
            }
            input.set_value("");
        }));
        listeners.push(EventListener::new(random_button, "click", |_| reload()));
        listeners.push(EventListener::new(modal_button, "click", |_| reload()));
    }
}

fn with_shell<F: FnOnce(&Rc<PuzzleShell>)>(weak: &Weak<PuzzleShell>, action: F) {
    if let Some(shell) = weak.upgrade() {
        action(&shell);
    }
}

/// New round with a new random image.
fn reload() {
    if let Some(window) = web_sys::window() {
        let _ = window.location().reload();
    }
}

fn time_nonce() -> u32 {
    let now = js_sys::Date::now();
    let millis = now as u64;
    (millis as u32) ^ ((millis >> 32) as u32)
}
