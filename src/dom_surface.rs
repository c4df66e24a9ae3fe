use puzzledrop_core::layout::{CropOffset, TrayPosition};
use puzzledrop_core::{
    BoardSurface, Decoration, DropPreview, GridGeometry, ModalContent, SlotHighlight, SlotId,
    TileId, TimerDisplay,
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

pub(crate) const UNIT: &str = "vw";
const FALLBACK_CELL_WIDTH: f32 = 8.0;
const FALLBACK_CELL_HEIGHT: f32 = 6.0;

const PREVIEW_MATCH: &str = "\u{2705}";
const PREVIEW_MISMATCH: &str = "\u{274C}";

/// Sizes derived from the grid offsets, in [`UNIT`]s.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BoardMetrics {
    pub(crate) origin_left: f32,
    pub(crate) origin_top: f32,
    pub(crate) cell_width: f32,
    pub(crate) cell_height: f32,
    pub(crate) board_width: f32,
    pub(crate) board_height: f32,
}

impl BoardMetrics {
    pub(crate) fn from_geometry(geometry: &GridGeometry) -> Self {
        let (origin_left, max_left) = span(&geometry.left_positions);
        let (origin_top, max_top) = span(&geometry.top_positions);
        let cell_width = cell_extent(&geometry.left_positions, FALLBACK_CELL_WIDTH);
        let cell_height = cell_extent(&geometry.top_positions, FALLBACK_CELL_HEIGHT);
        Self {
            origin_left,
            origin_top,
            cell_width,
            cell_height,
            board_width: max_left - origin_left + cell_width,
            board_height: max_top - origin_top + cell_height,
        }
    }

    pub(crate) fn background_position(&self, crop: CropOffset) -> String {
        format!(
            "{} {}",
            negated(crop.left - self.origin_left),
            negated(crop.top - self.origin_top)
        )
    }
}

fn negated(offset: f32) -> String {
    if offset == 0.0 {
        format!("0{UNIT}")
    } else {
        format!("{}{UNIT}", -offset)
    }
}

fn span(values: &[f32]) -> (f32, f32) {
    let min = values.iter().copied().fold(f32::INFINITY, f32::min);
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if min.is_finite() && max.is_finite() {
        (min, max)
    } else {
        (0.0, 0.0)
    }
}

/// Smallest gap between neighbouring offsets; a single offset falls back to `fallback`.
fn cell_extent(values: &[f32], fallback: f32) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .filter(|gap| *gap > 0.0)
        .fold(None, |best: Option<f32>, gap| Some(best.map_or(gap, |b| b.min(gap))))
        .unwrap_or(fallback)
}

pub(crate) fn css_url(url: &str) -> String {
    format!("url(\"{url}\")")
}

pub(crate) fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

pub(crate) struct DomSurface {
    metrics: BoardMetrics,
    preview: HtmlElement,
    tray: HtmlElement,
    slots: Vec<HtmlElement>,
    tiles: Vec<HtmlElement>,
    timers: HtmlElement,
    global_timer: HtmlElement,
    piece_timer: HtmlElement,
    modal: HtmlElement,
    modal_title: HtmlElement,
    modal_text: HtmlElement,
    modal_button: HtmlElement,
    file_input: HtmlInputElement,
    random_button: HtmlElement,
}

impl DomSurface {
    pub(crate) fn build(
        document: &Document,
        root: &Element,
        geometry: &GridGeometry,
    ) -> Result<Self, JsValue> {
        let metrics = BoardMetrics::from_geometry(geometry);
        let board_width = format!("{}{UNIT}", metrics.board_width);
        let board_height = format!("{}{UNIT}", metrics.board_height);
        let cell_width = format!("{}{UNIT}", metrics.cell_width);
        let cell_height = format!("{}{UNIT}", metrics.cell_height);

        let controls = create(document, "div", "controls")?;
        let file_input = document
            .create_element("input")?
            .dyn_into::<HtmlInputElement>()
            .map_err(JsValue::from)?;
        file_input.set_type("file");
        file_input.set_accept("image/*");
        file_input.set_class_name("input-file");
        let random_button = create(document, "button", "random-btn")?;
        random_button.set_text_content(Some("New random image"));
        let timers = create(document, "div", "timers hidden")?;
        let global_timer = create(document, "span", "global-timer")?;
        let piece_timer = create(document, "span", "piece-timer hidden")?;
        timers.append_child(&global_timer)?;
        timers.append_child(&piece_timer)?;
        controls.append_child(&file_input)?;
        controls.append_child(&random_button)?;
        controls.append_child(&timers)?;

        let board = create(document, "div", "board")?;
        let preview = create(document, "div", "final-img")?;
        set_style(&preview, "width", &board_width);
        set_style(&preview, "height", &board_height);

        let puzzle = create(document, "div", "puzzle")?;
        set_style(
            &puzzle,
            "grid-template-columns",
            &format!("repeat({}, {cell_width})", geometry.cols()),
        );
        set_style(
            &puzzle,
            "grid-template-rows",
            &format!("repeat({}, {cell_height})", geometry.rows()),
        );
        let total = geometry.tile_count();
        let mut slots = Vec::with_capacity(total);
        for index in 0..total {
            let slot = create(document, "div", "slot")?;
            slot.set_attribute("data-index", &index.to_string())?;
            puzzle.append_child(&slot)?;
            slots.push(slot);
        }

        let tray = create(document, "div", "cells")?;
        set_style(&tray, "width", &board_width);
        set_style(&tray, "height", &board_height);
        let mut tiles = Vec::with_capacity(total);
        for index in 0..total {
            let tile = create(document, "div", "tile")?;
            tile.set_attribute("data-index", &index.to_string())?;
            tile.set_draggable(true);
            set_style(&tile, "width", &cell_width);
            set_style(&tile, "height", &cell_height);
            set_style(&tile, "background-size", &format!("{board_width} {board_height}"));
            tiles.push(tile);
        }
        board.append_child(&preview)?;
        board.append_child(&puzzle)?;
        board.append_child(&tray)?;

        let modal = create(document, "div", "modal")?;
        let card = create(document, "div", "modal-card")?;
        let modal_title = create(document, "h2", "modal-title")?;
        let modal_text = create(document, "p", "modal-text")?;
        let modal_button = create(document, "button", "modal-btn")?;
        card.append_child(&modal_title)?;
        card.append_child(&modal_text)?;
        card.append_child(&modal_button)?;
        modal.append_child(&card)?;

        root.append_child(&controls)?;
        root.append_child(&board)?;
        root.append_child(&modal)?;

        Ok(Self {
            metrics,
            preview,
            tray,
            slots,
            tiles,
            timers,
            global_timer,
            piece_timer,
            modal,
            modal_title,
            modal_text,
            modal_button,
            file_input,
            random_button,
        })
    }

    pub(crate) fn slots(&self) -> &[HtmlElement] {
        &self.slots
    }

    pub(crate) fn tiles(&self) -> &[HtmlElement] {
        &self.tiles
    }

    pub(crate) fn file_input(&self) -> &HtmlInputElement {
        &self.file_input
    }

    pub(crate) fn random_button(&self) -> &HtmlElement {
        &self.random_button
    }

    pub(crate) fn modal_button(&self) -> &HtmlElement {
        &self.modal_button
    }

    fn tile(&self, tile: TileId) -> Option<&HtmlElement> {
        self.tiles.get(tile.0)
    }

    fn slot(&self, slot: SlotId) -> Option<&HtmlElement> {
        self.slots.get(slot.0)
    }
}

impl BoardSurface for DomSurface {
    fn apply_image(&mut self, url: &str) {
        let background = css_url(url);
        set_style(&self.preview, "background-image", &background);
        for tile in &self.tiles {
            set_style(tile, "background-image", &background);
        }
    }

    fn place_in_tray(&mut self, tile: TileId, crop: CropOffset, position: TrayPosition) {
        let Some(element) = self.tile(tile) else {
            return;
        };
        set_style(
            element,
            "background-position",
            &self.metrics.background_position(crop),
        );
        set_style(
            element,
            "left",
            &format!("{}{UNIT}", position.left - self.metrics.origin_left),
        );
        set_style(
            element,
            "top",
            &format!("{}{UNIT}", position.top - self.metrics.origin_top),
        );
        element.set_draggable(true);
        let _ = self.tray.append_child(element);
    }

    fn move_to_slot(&mut self, tile: TileId, slot: SlotId) {
        let (Some(element), Some(target)) = (self.tile(tile), self.slot(slot)) else {
            return;
        };
        set_style(element, "left", "0");
        set_style(element, "top", "0");
        let _ = target.append_child(element);
    }

    fn decorate_tile(&mut self, tile: TileId, decoration: Decoration) {
        let Some(element) = self.tile(tile) else {
            return;
        };
        let classes = element.class_list();
        let _ = classes.remove_3("placed", "correct", "wrong");
        match decoration {
            Decoration::None => {}
            Decoration::Correct => {
                let _ = classes.add_2("placed", "correct");
            }
            Decoration::Wrong => {
                let _ = classes.add_2("placed", "wrong");
            }
        }
    }

    fn highlight_slot(&mut self, slot: SlotId, highlight: SlotHighlight) {
        let Some(element) = self.slot(slot) else {
            return;
        };
        let classes = element.class_list();
        let _ = classes.remove_3("active", "emoji-correct", "emoji-wrong");
        let _ = element.remove_attribute("data-preview");
        let SlotHighlight::Target { preview } = highlight else {
            return;
        };
        let _ = classes.add_1("active");
        let (class, marker) = match preview {
            Some(DropPreview::Match) => ("emoji-correct", PREVIEW_MATCH),
            Some(DropPreview::Mismatch) => ("emoji-wrong", PREVIEW_MISMATCH),
            None => return,
        };
        let _ = classes.add_1(class);
        let _ = element.set_attribute("data-preview", marker);
    }

    fn show_timers(&mut self, timers: TimerDisplay) {
        let _ = self.timers.class_list().remove_1("hidden");
        match timers.global_secs {
            Some(secs) => self
                .global_timer
                .set_text_content(Some(&format!("Round {}", format_clock(secs)))),
            None => self.global_timer.set_text_content(None),
        }
        match timers.piece_secs {
            Some(secs) => {
                self.piece_timer
                    .set_text_content(Some(&format!("Piece {secs}s")));
                let _ = self.piece_timer.class_list().remove_1("hidden");
            }
            None => {
                self.piece_timer.set_text_content(None);
                let _ = self.piece_timer.class_list().add_1("hidden");
            }
        }
    }

    fn show_modal(&mut self, modal: &ModalContent) {
        self.modal_title.set_text_content(Some(&modal.title));
        self.modal_text.set_text_content(Some(&modal.message));
        self.modal_button
            .set_text_content(Some(&modal.button_label));
        let classes = self.modal.class_list();
        let _ = classes.add_1("open");
        let outcome_class = if modal.outcome.won() { "won" } else { "lost" };
        let _ = classes.add_1(outcome_class);
    }
}

fn create(document: &Document, tag: &str, class: &str) -> Result<HtmlElement, JsValue> {
    let element = document.create_element(tag)?;
    element.set_class_name(class);
    element.dyn_into::<HtmlElement>().map_err(JsValue::from)
}

fn set_style(element: &HtmlElement, name: &str, value: &str) {
    let _ = element.style().set_property(name, value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_board_metrics() {
        let metrics = BoardMetrics::from_geometry(&GridGeometry::default());
        assert_eq!(metrics.cell_width, 8.0);
        assert_eq!(metrics.cell_height, 6.0);
        assert_eq!(metrics.board_width, 40.0);
        assert_eq!(metrics.board_height, 24.0);
        assert_eq!(
            metrics.background_position(CropOffset {
                top: 12.0,
                left: 16.0
            }),
            "-16vw -12vw"
        );
    }

    #[test]
    fn single_cell_axis_uses_fallback() {
        let geometry = GridGeometry::new(vec![4.0], vec![10.0, 20.0]).expect("geometry");
        let metrics = BoardMetrics::from_geometry(&geometry);
        assert_eq!(metrics.cell_width, FALLBACK_CELL_WIDTH);
        assert_eq!(metrics.cell_height, 10.0);
        assert_eq!(metrics.board_height, 20.0);
        assert_eq!(
            metrics.background_position(CropOffset {
                top: 20.0,
                left: 4.0
            }),
            "0vw -10vw"
        );
    }

    #[test]
    fn clock_and_url_formatting() {
        assert_eq!(format_clock(300), "5:00");
        assert_eq!(format_clock(59), "0:59");
        assert_eq!(css_url("blob:x"), "url(\"blob:x\")");
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use puzzledrop_core::{Outcome, Phase};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn surface() -> (Element, DomSurface) {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .expect("document");
        let root = document.create_element("div").expect("root");
        document
            .body()
            .expect("body")
            .append_child(&root)
            .expect("attach");
        let surface = DomSurface::build(&document, &root, &GridGeometry::default()).expect("build");
        (root, surface)
    }

    #[wasm_bindgen_test]
    fn builds_one_slot_and_tile_per_cell() {
        let (root, surface) = surface();
        assert_eq!(surface.slots().len(), 20);
        assert_eq!(surface.tiles().len(), 20);
        assert!(root.query_selector(".puzzle").expect("query").is_some());
        root.remove();
    }

    #[wasm_bindgen_test]
    fn tiles_move_between_tray_and_slots() {
        let (root, mut surface) = surface();
        surface.apply_image("https://picsum.photos/id/10/1920/1080");
        surface.place_in_tray(
            TileId(3),
            CropOffset {
                top: 0.0,
                left: 24.0,
            },
            TrayPosition {
                left: 8.0,
                top: 12.0,
            },
        );
        let tile = surface.tiles()[3].clone();
        let style = tile.style();
        assert_eq!(style.get_property_value("left").expect("left"), "8vw");
        assert_eq!(
            style.get_property_value("background-position").expect("bg"),
            "-24vw 0vw"
        );
        assert!(tile.draggable());

        surface.move_to_slot(TileId(3), SlotId(3));
        surface.decorate_tile(TileId(3), Decoration::Correct);
        let parent = tile.parent_element().expect("parent");
        assert_eq!(parent.get_attribute("data-index").as_deref(), Some("3"));
        assert!(tile.class_list().contains("correct"));
        assert!(tile.draggable());

        surface.move_to_slot(TileId(3), SlotId(4));
        let parent = tile.parent_element().expect("parent");
        assert_eq!(parent.get_attribute("data-index").as_deref(), Some("4"));
        assert!(surface.slots()[3].first_element_child().is_none());
        root.remove();
    }

    #[wasm_bindgen_test]
    fn highlight_marks_and_clears_slot() {
        let (root, mut surface) = surface();
        surface.highlight_slot(
            SlotId(0),
            SlotHighlight::Target {
                preview: Some(DropPreview::Mismatch),
            },
        );
        let slot = surface.slots()[0].clone();
        assert!(slot.class_list().contains("emoji-wrong"));
        assert_eq!(slot.get_attribute("data-preview").as_deref(), Some(PREVIEW_MISMATCH));
        surface.highlight_slot(SlotId(0), SlotHighlight::None);
        assert!(!slot.class_list().contains("active"));
        assert!(slot.get_attribute("data-preview").is_none());
        root.remove();
    }

    #[wasm_bindgen_test]
    fn modal_shows_outcome() {
        let (root, mut surface) = surface();
        let modal = ModalContent::for_outcome(Outcome {
            phase: Phase::Won,
            correct: 20,
            wrong: 0,
            total: 20,
        });
        surface.show_modal(&modal);
        let shown = root.query_selector(".modal.open").expect("query");
        assert!(shown.is_some());
        root.remove();
    }
}
