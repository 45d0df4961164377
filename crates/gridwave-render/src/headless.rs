// crates/gridwave-render/src/headless.rs
//! In-memory document used for previews and tests.
//!
//! Items are direct children of the container. An item's rendered height is
//! its inline `height` when one is set, otherwise `width / aspectRatio` when
//! it has an aspect ratio and a width, otherwise its intrinsic `height`.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::selector::{SelectorList, SelectorTarget};
use crate::{GridHost, RenderResult, TimerHost, TimerToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeadlessNode {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub height: f32,
    pub aspect_ratio: Option<f32>,
    pub detached: bool,
    #[serde(skip)]
    style: BTreeMap<String, String>,
}

impl Default for HeadlessNode {
    fn default() -> Self {
        Self::new("div")
    }
}

impl HeadlessNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            height: 0.0,
            aspect_ratio: None,
            detached: false,
            style: BTreeMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    /// Height follows the imposed width: `height = width / ratio`.
    pub fn with_aspect_ratio(mut self, ratio: f32) -> Self {
        self.aspect_ratio = Some(ratio);
        self
    }

    pub fn detached(mut self) -> Self {
        self.detached = true;
        self
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }

    pub fn inline_style_is_empty(&self) -> bool {
        self.style.is_empty()
    }

    fn style_px(&self, property: &str) -> Option<f32> {
        self.style(property)?.strip_suffix("px")?.parse().ok()
    }

    fn rendered_height(&self) -> Option<f32> {
        if self.detached {
            return None;
        }
        if let Some(height) = self.style_px("height") {
            return Some(height);
        }
        match (self.aspect_ratio, self.style_px("width")) {
            (Some(ratio), Some(width)) if ratio > 0.0 => Some(width / ratio),
            _ => Some(self.height),
        }
    }
}

impl SelectorTarget for HeadlessNode {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        match name {
            "id" => self.id.as_deref(),
            _ => self.attributes.get(name).map(String::as_str),
        }
    }
}

/// Serialized page used by the CLI.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub viewport_width: f32,
    /// Defaults to the viewport width.
    #[serde(default)]
    pub container_width: Option<f32>,
    /// Computed `position` of the container before the grid touches it.
    #[serde(default)]
    pub container_position: Option<String>,
    #[serde(default)]
    pub items: Vec<HeadlessNode>,
}

impl From<Scene> for HeadlessDocument {
    fn from(scene: Scene) -> Self {
        let mut document = HeadlessDocument::new(
            scene.viewport_width,
            scene.container_width.unwrap_or(scene.viewport_width),
        );
        if let Some(position) = scene.container_position {
            document = document.with_container_position(position);
        }
        for node in scene.items {
            document.push_node(node);
        }
        document
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessDocument {
    viewport_width: f32,
    container_width: f32,
    container_position: String,
    container_style: BTreeMap<String, String>,
    container_attributes: BTreeMap<String, String>,
    nodes: Vec<HeadlessNode>,
    stylesheets: BTreeMap<String, String>,
    resize_listening: bool,
    timers: BTreeMap<TimerToken, Duration>,
}

impl HeadlessDocument {
    pub fn new(viewport_width: f32, container_width: f32) -> Self {
        Self {
            viewport_width,
            container_width,
            container_position: "static".to_string(),
            container_style: BTreeMap::new(),
            container_attributes: BTreeMap::new(),
            nodes: Vec::new(),
            stylesheets: BTreeMap::new(),
            resize_listening: false,
            timers: BTreeMap::new(),
        }
    }

    pub fn with_node(mut self, node: HeadlessNode) -> Self {
        self.push_node(node);
        self
    }

    pub fn with_container_position(mut self, position: impl Into<String>) -> Self {
        self.container_position = position.into();
        self
    }

    pub fn push_node(&mut self, node: HeadlessNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Panics if `id` did not come from this document.
    pub fn node(&self, id: NodeId) -> &HeadlessNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut HeadlessNode {
        &mut self.nodes[id.0]
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Simulate a window resize. The container follows the viewport.
    pub fn resize(&mut self, viewport_width: f32, container_width: f32) {
        self.viewport_width = viewport_width;
        self.container_width = container_width;
    }

    pub fn container_style(&self, property: &str) -> Option<&str> {
        self.container_style.get(property).map(String::as_str)
    }

    pub fn container_attribute(&self, name: &str) -> Option<&str> {
        self.container_attributes.get(name).map(String::as_str)
    }

    pub fn has_stylesheet(&self, id: &str) -> bool {
        self.stylesheets.contains_key(id)
    }

    pub fn stylesheet_count(&self) -> usize {
        self.stylesheets.len()
    }

    pub fn is_listening_resize(&self) -> bool {
        self.resize_listening
    }

    pub fn pending_timers(&self) -> Vec<(TimerToken, Duration)> {
        self.timers.iter().map(|(token, delay)| (*token, *delay)).collect()
    }

    /// Let every pending timer elapse, returning their tokens in order.
    pub fn elapse_timers(&mut self) -> Vec<TimerToken> {
        std::mem::take(&mut self.timers).into_keys().collect()
    }
}

fn write(map: &mut BTreeMap<String, String>, key: &str, value: Option<&str>) {
    match value {
        Some(value) => {
            map.insert(key.to_string(), value.to_string());
        }
        None => {
            map.remove(key);
        }
    }
}

impl GridHost for HeadlessDocument {
    type Item = NodeId;

    fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    fn container_width(&self) -> f32 {
        self.container_width
    }

    fn container_is_positioned(&self) -> bool {
        let position = self
            .container_style("position")
            .unwrap_or(&self.container_position);
        position != "static"
    }

    fn query_items(&self, selector: Option<&str>) -> Vec<NodeId> {
        let Some(selector) = selector else {
            return self.node_ids().collect();
        };

        match SelectorList::parse(selector) {
            Ok(selector) => self
                .node_ids()
                .filter(|id| selector.matches(self.node(*id)))
                .collect(),
            Err(e) => {
                warn!("{}", e);
                Vec::new()
            }
        }
    }

    fn matches_selector(&self, item: &NodeId, selector: &str) -> bool {
        match SelectorList::parse(selector) {
            Ok(selector) => selector.matches(self.node(*item)),
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }

    fn measure_height(&self, item: &NodeId) -> Option<f32> {
        self.nodes.get(item.0)?.rendered_height()
    }

    fn set_item_style(&mut self, item: &NodeId, property: &str, value: Option<&str>) -> RenderResult<()> {
        write(&mut self.node_mut(*item).style, property, value);
        Ok(())
    }

    fn set_item_attribute(&mut self, item: &NodeId, name: &str, value: Option<&str>) -> RenderResult<()> {
        write(&mut self.node_mut(*item).attributes, name, value);
        Ok(())
    }

    fn set_container_style(&mut self, property: &str, value: Option<&str>) -> RenderResult<()> {
        write(&mut self.container_style, property, value);
        Ok(())
    }

    fn set_container_attribute(&mut self, name: &str, value: Option<&str>) -> RenderResult<()> {
        write(&mut self.container_attributes, name, value);
        Ok(())
    }

    fn install_stylesheet(&mut self, id: &str, css: &str) -> RenderResult<bool> {
        if self.stylesheets.contains_key(id) {
            return Ok(false);
        }
        self.stylesheets.insert(id.to_string(), css.to_string());
        Ok(true)
    }

    fn listen_resize(&mut self) -> RenderResult<()> {
        self.resize_listening = true;
        Ok(())
    }

    fn unlisten_resize(&mut self) {
        self.resize_listening = false;
    }
}

impl TimerHost for HeadlessDocument {
    fn set_timeout(&mut self, token: TimerToken, delay: Duration) -> RenderResult<()> {
        self.timers.insert(token, delay);
        Ok(())
    }

    fn clear_timeout(&mut self, token: TimerToken) {
        self.timers.remove(&token);
    }
}
