//! GridWave for the browser
//!
//! Exposes the grid orchestrator to JavaScript as a `GridWave` class driving
//! a real DOM container through `web-sys`.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use gridwave_core::{GridConfig, GridError};
use gridwave_render::RenderError;
use gridwave_runtime::{Filter, GridWave, SortOrder};
use js_sys::{Array, Function, Object, Reflect};
use tracing::{error, warn};
use tracing_subscriber::prelude::*;
use tracing_web::MakeWebConsoleWriter;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

mod host;

#[cfg(test)]
mod tests;

pub use host::{SharedGrid, WebHost};

/// Install panic reporting and route `tracing` output to the browser console.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(MakeWebConsoleWriter::new());
    // A second module instance on the page keeps the first subscriber.
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

/// JavaScript facade over one grid container.
#[wasm_bindgen(js_name = GridWave)]
#[derive(Default)]
pub struct GridWaveHandle {
    grid: Option<Rc<SharedGrid>>,
    /// Set once `init` has run, whether or not a container was found.
    initialized: bool,
    /// Every `registerRenderer` call, replayed into each grid `init` creates.
    renderers: Vec<(String, Function)>,
}

#[wasm_bindgen(js_class = GridWave)]
impl GridWaveHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> GridWaveHandle {
        GridWaveHandle::default()
    }

    /// Bind to `container` (an element or a selector) and lay it out.
    ///
    /// A container that resolves to nothing is reported on the console and
    /// leaves the instance inert.
    pub fn init(&mut self, container: JsValue, config: JsValue) {
        if let Some(grid) = &self.grid {
            // An active grid treats this as an update; a rejected first
            // config leaves it uninitialized and this is a fresh init.
            apply_config(grid, &config, ConfigCall::Init);
            return;
        }
        if self.initialized {
            return;
        }
        self.initialized = true;

        let grid = match resolve_container(&container).and_then(create_grid) {
            Ok(grid) => grid,
            Err(e) => {
                error!("GridWave: {}", e);
                return;
            }
        };
        with_borrow(&grid, |grid| {
            for (name, renderer) in &self.renderers {
                grid.register_renderer(name.clone(), js_renderer(renderer.clone()));
            }
        });
        apply_config(&grid, &config, ConfigCall::Init);
        self.grid = Some(grid);
    }

    #[wasm_bindgen(js_name = updateConfig)]
    pub fn update_config(&self, config: JsValue) {
        if let Some(grid) = self.grid_or_warn("updateConfig") {
            apply_config(grid, &config, ConfigCall::Update);
        }
    }

    /// Accepts a selector string, a predicate `(element) => boolean`, or a
    /// nullish, empty or boolean value to show every item.
    pub fn filter(&self, filter: JsValue) {
        let Some(grid) = self.grid_or_warn("filter") else {
            return;
        };
        let filter = filter_from_js(filter);
        with_borrow(grid, |grid| {
            let _ = grid.filter(filter);
        });
    }

    /// Accepts a comparator `(a, b) => number`, or a nullish value for
    /// document order.
    pub fn sort(&self, comparator: JsValue) {
        let Some(grid) = self.grid_or_warn("sort") else {
            return;
        };
        let order = sort_from_js(comparator);
        with_borrow(grid, |grid| {
            let _ = grid.sort(order);
        });
    }

    pub fn rerender(&self) {
        if let Some(grid) = self.grid_or_warn("rerender") {
            with_borrow(grid, |grid| {
                let _ = grid.rerender();
            });
        }
    }

    pub fn destroy(&mut self) {
        if let Some(grid) = self.grid.take() {
            with_borrow(&grid, |grid| {
                let _ = grid.destroy();
            });
        }
        self.initialized = false;
    }

    /// Register `renderer(items)` under `name` for configurations whose
    /// `renderer` field names it. May be called before `init`.
    #[wasm_bindgen(js_name = registerRenderer)]
    pub fn register_renderer(&mut self, name: &str, renderer: Function) {
        if let Some(grid) = &self.grid {
            with_borrow(grid, |grid| grid.register_renderer(name, js_renderer(renderer.clone())));
        }
        self.renderers.retain(|(registered, _)| registered != name);
        self.renderers.push((name.to_string(), renderer));
    }

    #[wasm_bindgen(getter, js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.grid
            .as_ref()
            .and_then(|grid| grid.try_borrow().ok().map(|grid| grid.is_active()))
            .unwrap_or(false)
    }
}

impl GridWaveHandle {
    fn grid_or_warn(&self, operation: &str) -> Option<&Rc<SharedGrid>> {
        if self.grid.is_none() {
            warn!("GridWave: {} ignored, grid has no container", operation);
        }
        self.grid.as_ref()
    }

    pub fn grid(&self) -> Option<&Rc<SharedGrid>> {
        self.grid.as_ref()
    }
}

fn with_borrow(grid: &SharedGrid, f: impl FnOnce(&mut GridWave<WebHost>)) {
    match grid.try_borrow_mut() {
        Ok(mut grid) => f(&mut grid),
        Err(_) => error!("GridWave: re-entrant call from inside a render pass ignored"),
    }
}

fn resolve_container(container: &JsValue) -> Result<HtmlElement, RenderError> {
    if let Some(element) = container.dyn_ref::<HtmlElement>() {
        return Ok(element.clone());
    }

    let selector = container
        .as_string()
        .ok_or_else(|| RenderError::ContainerNotFound(format!("{:?}", container)))?;
    web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.query_selector(&selector).ok().flatten())
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
        .ok_or_else(|| RenderError::ContainerNotFound(selector.clone()))
}

fn create_grid(container: HtmlElement) -> Result<Rc<SharedGrid>, RenderError> {
    let document = container
        .owner_document()
        .ok_or_else(|| RenderError::ContainerNotFound("container has no document".to_string()))?;
    let window = document
        .default_view()
        .ok_or_else(|| RenderError::ContainerNotFound("container document has no window".to_string()))?;

    Ok(Rc::new_cyclic(|owner| {
        RefCell::new(GridWave::new(WebHost::new(window, document, container, owner.clone())))
    }))
}

#[derive(Clone, Copy)]
enum ConfigCall {
    Init,
    Update,
}

fn apply_config(grid: &SharedGrid, config: &JsValue, call: ConfigCall) {
    let parsed = parse_config(config);
    with_borrow(grid, |grid| {
        let config = match parsed {
            Ok((config, inline)) => {
                for (name, renderer) in inline {
                    grid.register_renderer(name, js_renderer(renderer));
                }
                config
            }
            Err(e) => {
                error!("GridWave: invalid configuration: {}", e);
                return;
            }
        };

        let _ = match call {
            ConfigCall::Init => grid.init(config),
            ConfigCall::Update => grid.update_config(config),
        };
    });
}

/// Convert a JS config object. Function-valued `renderer` fields cannot go
/// through JSON, so they are lifted out and named after their scope.
fn parse_config(config: &JsValue) -> Result<(GridConfig, Vec<(String, Function)>), String> {
    let json = js_sys::JSON::stringify(config)
        .map_err(|e| format!("{:?}", e))?
        .as_string()
        .ok_or("configuration is not serializable")?;
    // Validated below, once inline renderers are known.
    let mut parsed: GridConfig = serde_json::from_str(&json).map_err(|e| GridError::from(e).to_string())?;
    let mut inline = Vec::new();

    if let Some(renderer) = renderer_function(config) {
        let name = "inline:base".to_string();
        parsed.settings.renderer = Some(name.clone());
        inline.push((name, renderer));
    }

    let breakpoints = Reflect::get(config, &JsValue::from_str("breakpoints")).unwrap_or(JsValue::UNDEFINED);
    if breakpoints.is_object() {
        let breakpoints: &Object = breakpoints.unchecked_ref();
        for key in Object::keys(breakpoints).iter() {
            let Some(max_width) = key.as_string().and_then(|key| key.parse::<u32>().ok()) else {
                continue;
            };
            let entry = Reflect::get(breakpoints, &key).unwrap_or(JsValue::UNDEFINED);
            let (Some(renderer), Some(settings)) =
                (renderer_function(&entry), parsed.breakpoints.get_mut(&max_width))
            else {
                continue;
            };
            let name = format!("inline:{}", max_width);
            settings.renderer = Some(name.clone());
            inline.push((name, renderer));
        }
    }

    // Re-check now that inline renderers count as a render method.
    parsed.validate().map_err(|e| e.to_string())?;
    Ok((parsed, inline))
}

fn renderer_function(settings: &JsValue) -> Option<Function> {
    if !settings.is_object() {
        return None;
    }
    Reflect::get(settings, &JsValue::from_str("renderer"))
        .ok()
        .and_then(|renderer| renderer.dyn_into::<Function>().ok())
}

fn js_renderer(renderer: Function) -> impl FnMut(&mut WebHost, &[HtmlElement]) + 'static {
    move |_host, items| {
        let array: Array = items.iter().collect();
        if let Err(e) = renderer.call1(&JsValue::NULL, &array) {
            error!("GridWave: custom renderer threw: {:?}", e);
        }
    }
}

fn filter_from_js(filter: JsValue) -> Filter<HtmlElement> {
    if let Some(selector) = filter.as_string() {
        return Filter::selector(selector);
    }
    match filter.dyn_into::<Function>() {
        Ok(predicate) => Filter::predicate(move |item: &HtmlElement| {
            predicate
                .call1(&JsValue::NULL, item)
                .map(|result| result.is_truthy())
                .unwrap_or(false)
        }),
        Err(other) => {
            if !other.is_null_or_undefined() && other.as_bool().is_none() {
                warn!("GridWave: unsupported filter {:?}, showing all items", other);
            }
            Filter::All
        }
    }
}

fn sort_from_js(comparator: JsValue) -> SortOrder<HtmlElement> {
    match comparator.dyn_into::<Function>() {
        Ok(comparator) => SortOrder::by(move |a: &HtmlElement, b: &HtmlElement| {
            let result = comparator
                .call2(&JsValue::NULL, a, b)
                .ok()
                .and_then(|result| result.as_f64())
                .unwrap_or(0.0);
            result.partial_cmp(&0.0).unwrap_or(Ordering::Equal)
        }),
        Err(other) => {
            if !other.is_null_or_undefined() && other.as_bool() != Some(false) {
                warn!("GridWave: unsupported comparator {:?}, using document order", other);
            }
            SortOrder::Document
        }
    }
}
