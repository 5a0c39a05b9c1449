use console_error_panic_hook::set_once;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use runtime::{ControlEvent, SyncEngine, ViewerConfig, bootstrap};
use tracing::{Level, error, warn};
use wasm_bindgen::prelude::*;

mod dom;
mod leaflet;
mod logging;

pub use dom::DomControls;
pub use leaflet::LeafletSurface;

// Guard against a second init (hot reload, double script include).
static INITIALIZED: AtomicBool = AtomicBool::new(false);

struct App {
    engine: SyncEngine,
    controls: DomControls,
    surface: LeafletSurface,
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn dispatch(event: ControlEvent) {
    APP.with(|app| {
        let mut app = app.borrow_mut();
        let Some(App {
            engine,
            controls,
            surface,
        }) = app.as_mut()
        else {
            return;
        };
        if let Err(err) = engine.handle(event, &*controls, surface) {
            error!(?event, "sync failed: {err}");
        }
    });
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Sets the console log level (`error`..`trace`). Only the first call before
/// `init_viewer` takes effect.
#[wasm_bindgen]
pub fn init_logging(level: &str) {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    logging::init(level);
}

/// Starts the viewer with the built-in configuration.
#[wasm_bindgen]
pub fn init_viewer() -> Result<(), JsValue> {
    init_with(ViewerConfig::default())
}

/// Starts the viewer with a JSON override of the configuration.
#[wasm_bindgen]
pub fn init_viewer_with_config(config_json: &str) -> Result<(), JsValue> {
    let config = ViewerConfig::from_json(config_json).map_err(js_err)?;
    init_with(config)
}

fn init_with(config: ViewerConfig) -> Result<(), JsValue> {
    logging::init(Level::INFO);
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        warn!("viewer already initialized");
        return Ok(());
    }

    let result = init_inner(&config);
    if result.is_err() {
        INITIALIZED.store(false, Ordering::SeqCst);
    }
    result
}

fn init_inner(config: &ViewerConfig) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let mut controls = DomControls::from_document(&document).map_err(js_err)?;
    let mut surface = LeafletSurface::new(config).map_err(js_err)?;
    let engine = bootstrap(config, &mut controls, &mut surface, Rc::new(dispatch)).map_err(js_err)?;

    APP.with(|app| {
        *app.borrow_mut() = Some(App {
            engine,
            controls,
            surface,
        });
    });
    Ok(())
}

/// Re-reads every control and rebuilds both layers.
#[wasm_bindgen]
pub fn refresh() -> Result<(), JsValue> {
    APP.with(|app| {
        let mut app = app.borrow_mut();
        let App {
            engine,
            controls,
            surface,
        } = app
            .as_mut()
            .ok_or_else(|| JsValue::from_str("viewer not initialized"))?;
        engine.refresh(&*controls, surface).map_err(js_err)
    })
}

/// Recent sync steps as a JSON array, oldest first.
#[wasm_bindgen]
pub fn sync_trace() -> Result<String, JsValue> {
    APP.with(|app| {
        let app = app.borrow();
        let Some(app) = app.as_ref() else {
            return Ok("[]".to_string());
        };
        let events: Vec<_> = app.engine.trace().events().collect();
        serde_json::to_string(&events).map_err(js_err)
    })
}
