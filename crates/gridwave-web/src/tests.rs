//! Browser tests for the JavaScript facade

use super::*;
use gridwave_render::{ANIMATIONS_ATTRIBUTE, STATUS_ATTRIBUTE, STYLESHEET_ID};
use wasm_bindgen_test::*;
use web_sys::Document;

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

/// A 620px container with one child per entry of `heights`.
fn container(id: &str, heights: &[u32]) -> HtmlElement {
    let document = document();
    let container: HtmlElement = document.create_element("div").unwrap().dyn_into().unwrap();
    container.set_id(id);
    container.style().set_property("width", "620px").unwrap();

    for (i, height) in heights.iter().enumerate() {
        let item = document.create_element("div").unwrap();
        item.set_class_name(if i % 2 == 0 { "item even" } else { "item odd" });
        item.set_attribute("style", &format!("min-height: {}px", height))
            .unwrap();
        container.append_child(&item).unwrap();
    }

    document.body().unwrap().append_child(&container).unwrap();
    container
}

fn config(json: &str) -> JsValue {
    js_sys::JSON::parse(json).unwrap()
}

fn child(container: &HtmlElement, index: u32) -> HtmlElement {
    container.children().item(index).unwrap().dyn_into().unwrap()
}

fn style(element: &HtmlElement, property: &str) -> String {
    element.style().get_property_value(property).unwrap()
}

#[wasm_bindgen_test]
fn test_init_lays_out_children() {
    let container = container("grid-layout", &[100, 150, 120, 80]);
    let mut grid = GridWaveHandle::new();
    grid.init(JsValue::from_str("#grid-layout"), config(r#"{ "columns": 3, "gap": 10 }"#));

    assert!(grid.is_active());
    assert_eq!(style(&container, "position"), "relative");
    assert_eq!(style(&container, "height"), "240px");
    assert_eq!(container.get_attribute(ANIMATIONS_ATTRIBUTE).as_deref(), Some("true"));
    assert!(document().get_element_by_id(STYLESHEET_ID).is_some());

    let second = child(&container, 1);
    assert_eq!(style(&second, "left"), "210px");
    assert_eq!(style(&second, "width"), "200px");
    assert_eq!(style(&child(&container, 3), "top"), "160px");

    grid.destroy();
    container.remove();
}

#[wasm_bindgen_test]
fn test_missing_container_is_inert() {
    let mut grid = GridWaveHandle::new();
    grid.init(JsValue::from_str("#does-not-exist"), config(r#"{ "columns": 2 }"#));

    assert!(!grid.is_active());
    assert!(grid.grid().is_none());
    // later calls are ignored
    grid.filter(JsValue::from_str(".item"));
    grid.rerender();
    grid.destroy();
}

#[wasm_bindgen_test]
fn test_filter_and_sort_from_js() {
    let container = container("grid-filter", &[100, 100, 100, 100]);
    let mut grid = GridWaveHandle::new();
    grid.init(container.clone().into(), config(r#"{ "columns": 2 }"#));

    grid.filter(JsValue::from_str(".odd"));
    assert_eq!(child(&container, 0).get_attribute(STATUS_ATTRIBUTE).as_deref(), Some("hidden"));
    assert_eq!(child(&container, 0).get_attribute("aria-hidden").as_deref(), Some("true"));
    assert_eq!(style(&child(&container, 3), "left"), "310px");

    let reverse = js_sys::Function::new_with_args(
        "a, b",
        "return Array.prototype.indexOf.call(a.parentNode.children, b) \
               - Array.prototype.indexOf.call(a.parentNode.children, a);",
    );
    grid.sort(reverse.into());
    assert_eq!(style(&child(&container, 3), "left"), "0px");

    grid.filter(JsValue::NULL);
    grid.sort(JsValue::NULL);
    assert_eq!(child(&container, 0).get_attribute(STATUS_ATTRIBUTE).as_deref(), Some("visible"));
    assert_eq!(style(&child(&container, 0), "left"), "0px");

    grid.destroy();
    container.remove();
}

#[wasm_bindgen_test]
fn test_inline_renderer_receives_items() {
    let container = container("grid-custom", &[50, 50, 50]);
    let config = config(r#"{ "columns": 2 }"#);
    let renderer = js_sys::Function::new_with_args("items", "window.__gridwaveRendered = items.length;");
    Reflect::set(&config, &JsValue::from_str("renderer"), &renderer).unwrap();

    let mut grid = GridWaveHandle::new();
    grid.init(container.clone().into(), config);

    let window = web_sys::window().unwrap();
    let rendered = Reflect::get(&window, &JsValue::from_str("__gridwaveRendered")).unwrap();
    assert_eq!(rendered.as_f64(), Some(3.0));
    assert_eq!(style(&child(&container, 1), "left"), "");

    grid.destroy();
    container.remove();
}

#[wasm_bindgen_test]
fn test_init_after_rejected_config() {
    let container = container("grid-retry", &[100, 100, 100]);
    let mut grid = GridWaveHandle::new();
    grid.init(container.clone().into(), config(r#"{ "columns": 0 }"#));
    assert!(!grid.is_active());
    assert_eq!(style(&container, "height"), "");

    grid.init(container.clone().into(), config(r#"{ "columns": 2 }"#));
    assert!(grid.is_active());
    assert_eq!(style(&child(&container, 1), "left"), "310px");
    assert_eq!(style(&child(&container, 2), "top"), "100px");

    grid.destroy();
    container.remove();
}

#[wasm_bindgen_test]
fn test_renderer_registered_before_init() {
    let container = container("grid-named", &[50, 50, 50, 50]);
    let renderer = js_sys::Function::new_with_args("items", "window.__gridwaveNamed = items.length;");

    let mut grid = GridWaveHandle::new();
    grid.register_renderer("list", renderer);
    grid.init(container.clone().into(), config(r#"{ "renderer": "list" }"#));

    assert!(grid.is_active());
    let window = web_sys::window().unwrap();
    let rendered = Reflect::get(&window, &JsValue::from_str("__gridwaveNamed")).unwrap();
    assert_eq!(rendered.as_f64(), Some(4.0));
    assert_eq!(style(&child(&container, 0), "left"), "");

    grid.destroy();
    container.remove();
}

#[wasm_bindgen_test]
fn test_destroy_removes_inline_state() {
    let container = container("grid-destroy", &[100, 80]);
    let mut grid = GridWaveHandle::new();
    grid.init(
        container.clone().into(),
        config(r#"{ "columns": 2, "sameHeight": true, "transition": 300 }"#),
    );
    grid.destroy();

    assert!(!grid.is_active());
    assert_eq!(style(&container, "height"), "");
    assert_eq!(style(&container, "--gridwave-transition-duration"), "");
    assert_eq!(container.get_attribute(ANIMATIONS_ATTRIBUTE), None);
    let first = child(&container, 0);
    assert_eq!(first.get_attribute(STATUS_ATTRIBUTE), None);
    assert_eq!(style(&first, "height"), "");
    assert_eq!(style(&first, "position"), "");

    container.remove();
}
