// src/report.rs
//! Headless preview of a grid configuration against a scene file.

use std::cmp::Ordering;
use std::fmt;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use gridwave_core::GridConfig;
use gridwave_layout::GridLayout;
use gridwave_render::selector::SelectorTarget;
use gridwave_render::{GridHost, HeadlessDocument, HeadlessNode, NodeId, Scene, STATUS_ATTRIBUTE};
use gridwave_runtime::{GridWave, SortOrder};

#[derive(Debug, Clone, Default)]
pub struct PreviewOptions {
    /// Overrides the scene's viewport width. The container follows unless the
    /// scene pins its width.
    pub viewport: Option<f32>,
    pub filter: Option<String>,
    /// Sort visible items by this attribute, numerically when both values
    /// parse as numbers. Items without it go last.
    pub sort_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemReport {
    pub index: usize,
    pub label: String,
    pub status: String,
    pub left: Option<String>,
    pub top: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub viewport_width: f32,
    pub container_width: f32,
    pub scope: String,
    pub columns: Option<usize>,
    pub container_height: Option<String>,
    pub items: Vec<ItemReport>,
}

/// Lay out `scene` with `config` in one pass and describe every item.
pub fn run_preview(config: GridConfig, mut scene: Scene, options: &PreviewOptions) -> Result<Report> {
    if let Some(viewport) = options.viewport {
        scene.viewport_width = viewport;
    }
    let document = HeadlessDocument::from(scene);
    let viewport_width = document.viewport_width();
    let container_width = document.container_width();

    let sort = options
        .sort_by
        .as_deref()
        .map(|attribute| attribute_order(&document, attribute));

    let mut grid = GridWave::new(document);
    if let Some(filter) = options.filter.as_deref() {
        grid.filter(filter)?;
    }
    if let Some(sort) = sort {
        grid.sort(sort)?;
    }
    grid.init(config).context("Failed to lay out scene")?;

    let scope = grid
        .resolved()
        .map(|resolved| resolved.scope.to_string())
        .unwrap_or_default();
    let columns = grid.layout().map(|layout: &GridLayout| layout.columns);
    info!(%scope, ?columns, "Preview complete");

    let document = grid.host();
    let items = document
        .node_ids()
        .map(|id| describe(id, document.node(id)))
        .collect();

    Ok(Report {
        viewport_width,
        container_width,
        scope,
        columns,
        container_height: document.container_style("height").map(str::to_string),
        items,
    })
}

fn attribute_order(document: &HeadlessDocument, attribute: &str) -> SortOrder<NodeId> {
    let keys: Vec<Option<String>> = document
        .node_ids()
        .map(|id| document.node(id).attribute(attribute).map(str::to_string))
        .collect();

    SortOrder::by(move |a: &NodeId, b: &NodeId| {
        match (&keys[a.0], &keys[b.0]) {
            (Some(a), Some(b)) => match (a.parse::<f64>(), b.parse::<f64>()) {
                (Ok(a), Ok(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => a.cmp(b),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    })
}

fn label(node: &HeadlessNode) -> String {
    let mut label = node.tag.clone();
    if let Some(id) = &node.id {
        label.push('#');
        label.push_str(id);
    }
    for class in &node.classes {
        label.push('.');
        label.push_str(class);
    }
    label
}

fn describe(id: NodeId, node: &HeadlessNode) -> ItemReport {
    let style = |property: &str| node.style(property).map(str::to_string);
    ItemReport {
        index: id.0,
        label: label(node),
        status: node
            .attribute(STATUS_ATTRIBUTE)
            .unwrap_or("untracked")
            .to_string(),
        left: style("left"),
        top: style("top"),
        width: style("width"),
        height: style("height"),
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "viewport {}px, container {}px, {} configuration",
            self.viewport_width, self.container_width, self.scope
        )?;
        match self.columns {
            Some(columns) => writeln!(f, ", {} columns", columns)?,
            None => writeln!(f, ", custom renderer")?,
        }

        let width = self.items.iter().map(|item| item.label.len()).max().unwrap_or(0);
        for item in &self.items {
            let mut line = format!("{:>3} {:<width$} {:<8}", item.index, item.label, item.status, width = width);
            if item.status == "visible" {
                let geometry = [
                    ("left", &item.left),
                    ("top", &item.top),
                    ("width", &item.width),
                    ("height", &item.height),
                ];
                for (name, value) in geometry {
                    if let Some(value) = value {
                        line.push_str(&format!(" {}={}", name, value));
                    }
                }
            }
            writeln!(f, "{}", line.trim_end())?;
        }

        match &self.container_height {
            Some(height) => write!(f, "container height {}", height),
            None => write!(f, "container height unset"),
        }
    }
}
