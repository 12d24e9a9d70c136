use pianoroll::config::RollConfig;
use pianoroll::session::Session;
use pianoroll::tab::SymbolMode;
use pianoroll::transport::ManualClock;
use pianoroll::tuning::{find_tuning, KALIMBA};
use pianoroll::viewport::{Margin, Viewport};
use pianoroll::{Note, RollError};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct BindingError {
    message: String,
    line: Option<usize>,
    column: Option<usize>,
}

fn to_binding_error(e: RollError) -> BindingError {
    match e {
        RollError::TabParse {
            line,
            column,
            message,
        } => BindingError {
            message,
            line: Some(line),
            column: Some(column),
        },
        other => BindingError {
            message: other.to_string(),
            line: None,
            column: None,
        },
    }
}

fn to_js(e: RollError) -> JsValue {
    let error = to_binding_error(e);
    match serde_json::to_string(&error) {
        Ok(json) => JsValue::from_str(&json),
        Err(_) => JsValue::from_str(&error.message),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parse_notes(json: &str) -> Result<Vec<Note>, JsValue> {
    serde_json::from_str(json).map_err(|e| to_js(RollError::InvalidArgument(e.to_string())))
}

/// Parse tab text into a JSON array of notes
#[wasm_bindgen]
pub fn text_to_notes(text: &str, tuning: &str, tempo: f64) -> Result<String, JsValue> {
    let tuning = find_tuning(KALIMBA, tuning).map_err(to_js)?;
    let notes = pianoroll::tab::text_to_notes(text, &tuning, tempo).map_err(to_js)?;
    to_json(&notes)
}

/// Rewrite scale degrees 1-7 as letters, leaving everything else alone
#[wasm_bindgen]
pub fn convert_numbers_to_letters(text: &str) -> String {
    pianoroll::tab::convert_numbers_to_letters(text)
}

/// Write a JSON array of notes as tab text, or markup when `html` is set
#[wasm_bindgen]
pub fn notes_to_tab(
    notes_json: &str,
    tuning: &str,
    symbol_mode: &str,
    spacing: f64,
    html: bool,
) -> Result<String, JsValue> {
    let tuning = find_tuning(KALIMBA, tuning).map_err(to_js)?;
    let mode: SymbolMode = symbol_mode.parse().map_err(to_js)?;
    let notes = parse_notes(notes_json)?;
    Ok(if html {
        pianoroll::tab::notes_to_html_tab(&notes, &tuning, mode, spacing)
    } else {
        pianoroll::tab::notes_to_tab(&notes, &tuning, mode, spacing)
    })
}

/// Share link for a JSON array of notes, based on the page location
#[wasm_bindgen]
pub fn share_link(location: &str, notes_json: &str) -> Result<String, JsValue> {
    let notes = parse_notes(notes_json)?;
    pianoroll::share::share_link(location, &notes).map_err(to_js)
}

/// Notes of a share link as a JSON array; `[]` when the link carries none
#[wasm_bindgen]
pub fn notes_from_link(url: &str) -> String {
    serde_json::to_string(&pianoroll::share::notes_from_link(url)).unwrap_or_else(|_| "[]".to_string())
}

/// One roll on a page: a session driven by the host's frame timestamps
#[wasm_bindgen]
pub struct RollCanvas {
    clock: ManualClock,
    session: Session<ManualClock>,
}

#[wasm_bindgen]
impl RollCanvas {
    /// `config_yaml` may be empty for the defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config_yaml: &str) -> Result<RollCanvas, JsValue> {
        let config = RollConfig::from_yaml_str(config_yaml).map_err(to_js)?;
        let clock = ManualClock::new();
        let session = Session::with_clock(config, clock.clone()).map_err(to_js)?;
        Ok(RollCanvas { clock, session })
    }

    pub fn set_tab_text(&mut self, text: &str) -> Result<(), JsValue> {
        self.session.set_tab_text(text).map_err(to_js)
    }

    pub fn load_midi(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.session.load_midi(bytes).map_err(to_js)
    }

    pub fn select_part(&mut self, part: usize) -> Result<(), JsValue> {
        self.session.select_part(part).map_err(to_js)
    }

    pub fn load_link(&mut self, url: &str) -> Result<(), JsValue> {
        self.session.load_link(url).map_err(to_js)
    }

    pub fn set_transpose(&mut self, semitones: i8) -> Result<(), JsValue> {
        self.session.set_transpose(semitones).map_err(to_js)
    }

    pub fn set_tuning(&mut self, name: &str) -> Result<(), JsValue> {
        self.session.set_tuning(name).map_err(to_js)
    }

    /// Message for the user after a failed import, if any
    pub fn take_notice(&mut self) -> Option<String> {
        self.session.take_notice()
    }

    /// Start from 0 at `timestamp_ms`, in the same time base as [`RollCanvas::frame`]
    pub fn play(&mut self, timestamp_ms: f64) -> Result<(), JsValue> {
        self.clock.set(timestamp_ms / 1000.0);
        self.session.play().map_err(to_js)
    }

    pub fn pause_or_resume(&mut self, timestamp_ms: f64) {
        self.clock.set(timestamp_ms / 1000.0);
        self.session.pause_or_resume();
    }

    pub fn stop(&mut self) {
        self.session.stop();
    }

    pub fn set_speed(&mut self, speed: f64, timestamp_ms: f64) -> Result<(), JsValue> {
        self.clock.set(timestamp_ms / 1000.0);
        self.session.set_speed(speed).map_err(to_js)
    }

    /// Advance to a `requestAnimationFrame` timestamp in milliseconds.
    ///
    /// Returns the playback time, or `undefined` when not playing.
    pub fn frame(&mut self, timestamp_ms: f64) -> Option<f64> {
        self.clock.set(timestamp_ms / 1000.0);
        self.session.frame()
    }

    pub fn resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64) -> Result<(), JsValue> {
        let margin: Margin = self.session.config().margin;
        let viewport = Viewport::from_outer(width, height, margin, device_pixel_ratio).map_err(to_js)?;
        self.session.resize(viewport).map_err(to_js)
    }

    /// `{ status, currentTime, speed }`
    pub fn state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.session.transport_state()).map_err(JsValue::from)
    }

    pub fn tab_text(&self) -> String {
        self.session.tab_text()
    }

    pub fn tab_html(&self) -> String {
        self.session.tab_html()
    }

    pub fn share_link(&self, location: &str) -> Result<String, JsValue> {
        self.session.share_link(location).map_err(to_js)
    }

    /// Backing-store width in device pixels
    pub fn pixel_width(&self) -> u32 {
        self.session.view().renderer().background().width()
    }

    pub fn pixel_height(&self) -> u32 {
        self.session.view().renderer().background().height()
    }

    /// Background layer, RGBA8
    pub fn background_pixels(&self) -> Vec<u8> {
        self.session.view().renderer().background().pixels().to_vec()
    }

    /// Foreground layer, RGBA8
    pub fn foreground_pixels(&self) -> Vec<u8> {
        self.session.view().renderer().foreground().pixels().to_vec()
    }

    /// Lane labels as JSON `[{ x, y, text }]` in CSS pixels, for the host to draw
    pub fn labels(&self) -> Result<String, JsValue> {
        #[derive(Serialize)]
        struct Label<'a> {
            x: f64,
            y: f64,
            text: &'a str,
        }
        let labels: Vec<Label<'_>> = self
            .session
            .view()
            .renderer()
            .background()
            .commands()
            .iter()
            .filter_map(|c| match c {
                pianoroll::render::DrawCommand::Text { x, y, text, .. } => Some(Label {
                    x: *x,
                    y: *y,
                    text,
                }),
                _ => None,
            })
            .collect();
        to_json(&labels)
    }
}
