// crates/gridwave-web/src/host.rs
//! `GridHost` over the browser DOM.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Weak;
use std::time::Duration;

use gridwave_render::{GridHost, RenderError, RenderResult, TimerHost, TimerToken};
use gridwave_runtime::GridWave;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, Window};

pub type SharedGrid = RefCell<GridWave<WebHost>>;

pub struct WebHost {
    window: Window,
    document: Document,
    container: HtmlElement,
    owner: Weak<SharedGrid>,
    resize_listener: Option<Closure<dyn FnMut()>>,
    timers: HashMap<TimerToken, (i32, Closure<dyn FnMut()>)>,
}

impl WebHost {
    pub fn new(window: Window, document: Document, container: HtmlElement, owner: Weak<SharedGrid>) -> Self {
        Self {
            window,
            document,
            container,
            owner,
            resize_listener: None,
            timers: HashMap::new(),
        }
    }

    fn dom_error(target: &str, error: JsValue) -> RenderError {
        RenderError::DomWrite {
            target: target.to_string(),
            reason: format!("{:?}", error),
        }
    }

    fn write_style(element: &HtmlElement, property: &str, value: Option<&str>) -> RenderResult<()> {
        let style = element.style();
        match value {
            Some(value) => style
                .set_property(property, value)
                .map_err(|e| Self::dom_error(property, e)),
            None => style
                .remove_property(property)
                .map(|_| ())
                .map_err(|e| Self::dom_error(property, e)),
        }
    }

    fn write_attribute(element: &HtmlElement, name: &str, value: Option<&str>) -> RenderResult<()> {
        match value {
            Some(value) => element
                .set_attribute(name, value)
                .map_err(|e| Self::dom_error(name, e)),
            None => element
                .remove_attribute(name)
                .map_err(|e| Self::dom_error(name, e)),
        }
    }
}

/// Run `f` on the grid unless it is gone or already mid-pass.
fn with_grid(owner: &Weak<SharedGrid>, f: impl FnOnce(&mut GridWave<WebHost>)) {
    let Some(grid) = owner.upgrade() else {
        return;
    };
    match grid.try_borrow_mut() {
        Ok(mut grid) => f(&mut grid),
        Err(_) => warn!("GridWave: event arrived during a render pass, skipping"),
    };
}

impl GridHost for WebHost {
    type Item = HtmlElement;

    fn viewport_width(&self) -> f32 {
        self.window
            .inner_width()
            .ok()
            .and_then(|width| width.as_f64())
            .unwrap_or(0.0) as f32
    }

    fn container_width(&self) -> f32 {
        self.container.offset_width() as f32
    }

    fn container_is_positioned(&self) -> bool {
        match self.window.get_computed_style(&self.container) {
            Ok(Some(style)) => style
                .get_property_value("position")
                .map(|position| position != "static")
                .unwrap_or(false),
            _ => false,
        }
    }

    fn query_items(&self, selector: Option<&str>) -> Vec<HtmlElement> {
        let Some(selector) = selector else {
            let children = self.container.children();
            return (0..children.length())
                .filter_map(|i| children.item(i))
                .filter_map(|element| element.dyn_into::<HtmlElement>().ok())
                .collect();
        };

        match self.container.query_selector_all(selector) {
            Ok(nodes) => (0..nodes.length())
                .filter_map(|i| nodes.item(i))
                .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
                .collect(),
            Err(e) => {
                warn!(selector, "GridWave: invalid item selector: {:?}", e);
                Vec::new()
            }
        }
    }

    fn matches_selector(&self, item: &HtmlElement, selector: &str) -> bool {
        item.matches(selector).unwrap_or_else(|e| {
            warn!(selector, "GridWave: invalid filter selector: {:?}", e);
            false
        })
    }

    fn measure_height(&self, item: &HtmlElement) -> Option<f32> {
        item.is_connected().then(|| item.offset_height() as f32)
    }

    fn set_item_style(&mut self, item: &HtmlElement, property: &str, value: Option<&str>) -> RenderResult<()> {
        Self::write_style(item, property, value)
    }

    fn set_item_attribute(&mut self, item: &HtmlElement, name: &str, value: Option<&str>) -> RenderResult<()> {
        Self::write_attribute(item, name, value)
    }

    fn set_container_style(&mut self, property: &str, value: Option<&str>) -> RenderResult<()> {
        Self::write_style(&self.container, property, value)
    }

    fn set_container_attribute(&mut self, name: &str, value: Option<&str>) -> RenderResult<()> {
        Self::write_attribute(&self.container, name, value)
    }

    fn install_stylesheet(&mut self, id: &str, css: &str) -> RenderResult<bool> {
        if self.document.get_element_by_id(id).is_some() {
            return Ok(false);
        }

        let head = self
            .document
            .head()
            .ok_or_else(|| Self::dom_error("document head", JsValue::from_str("missing")))?;
        let style = self
            .document
            .create_element("style")
            .map_err(|e| Self::dom_error("style element", e))?;
        style.set_id(id);
        style.set_text_content(Some(css));
        head.append_child(&style)
            .map_err(|e| Self::dom_error("document head", e))?;
        Ok(true)
    }

    fn listen_resize(&mut self) -> RenderResult<()> {
        if self.resize_listener.is_some() {
            return Ok(());
        }

        let owner = self.owner.clone();
        let listener = Closure::wrap(Box::new(move || {
            with_grid(&owner, |grid| {
                let _ = grid.on_viewport_resize();
            });
        }) as Box<dyn FnMut()>);

        self.window
            .add_event_listener_with_callback("resize", listener.as_ref().unchecked_ref())
            .map_err(|e| Self::dom_error("resize listener", e))?;
        self.resize_listener = Some(listener);
        Ok(())
    }

    fn unlisten_resize(&mut self) {
        if let Some(listener) = self.resize_listener.take() {
            if let Err(e) = self
                .window
                .remove_event_listener_with_callback("resize", listener.as_ref().unchecked_ref())
            {
                warn!("GridWave: failed to remove resize listener: {:?}", e);
            }
        }
    }
}

impl TimerHost for WebHost {
    fn set_timeout(&mut self, token: TimerToken, delay: Duration) -> RenderResult<()> {
        // Anything still tracked has either fired or been superseded.
        for (_, (handle, _)) in self.timers.drain() {
            self.window.clear_timeout_with_handle(handle);
        }

        let owner = self.owner.clone();
        let callback = Closure::wrap(Box::new(move || {
            with_grid(&owner, |grid| {
                let _ = grid.on_resize_timer(token);
            });
        }) as Box<dyn FnMut()>);

        let handle = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                delay.as_millis() as i32,
            )
            .map_err(|e| RenderError::Timer(format!("{:?}", e)))?;
        self.timers.insert(token, (handle, callback));
        Ok(())
    }

    fn clear_timeout(&mut self, token: TimerToken) {
        if let Some((handle, _)) = self.timers.remove(&token) {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}
