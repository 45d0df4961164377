// crates/gridwave-core/src/config.rs
//! Grid configuration as accepted from callers.
//!
//! The JSON shape mirrors the public wire format: camelCase field names,
//! `columns` as a positive integer or `"dynamic"`, `gap` as a number or an
//! `[x, y]` pair, `transition` as milliseconds or `false`, and a
//! `breakpoints` object keyed by max-width thresholds in pixels.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::{GridError, Result};

/// Where a set of [`LayoutSettings`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigScope {
    Base,
    /// Breakpoint entry keyed by its max-width threshold in pixels.
    Breakpoint(u32),
}

impl fmt::Display for ConfigScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigScope::Base => write!(f, "base"),
            ConfigScope::Breakpoint(max_width) => write!(f, "breakpoint {}px", max_width),
        }
    }
}

/// Column strategy of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawColumns")]
pub enum Columns {
    /// A fixed amount of columns.
    Fixed(u32),
    /// Column count derived from the container width and `columnMinWidth`.
    Dynamic,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawColumns {
    Count(i64),
    Keyword(String),
}

impl TryFrom<RawColumns> for Columns {
    type Error = String;

    fn try_from(raw: RawColumns) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawColumns::Count(count) if count >= 1 => u32::try_from(count)
                .map(Columns::Fixed)
                .map_err(|_| format!("column count {} is too large", count)),
            RawColumns::Count(count) => {
                Err(format!("column count must be at least 1, got {}", count))
            }
            RawColumns::Keyword(keyword) if keyword == "dynamic" => Ok(Columns::Dynamic),
            RawColumns::Keyword(keyword) => Err(format!(
                "unknown column mode {:?}, expected a positive integer or \"dynamic\"",
                keyword
            )),
        }
    }
}

/// Horizontal and vertical spacing between cells, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(from = "RawGap")]
pub struct Gap {
    pub x: f32,
    pub y: f32,
}

impl Gap {
    pub fn uniform(gap: f32) -> Self {
        Self { x: gap, y: gap }
    }

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawGap {
    Uniform(f32),
    Axes([f32; 2]),
}

impl From<RawGap> for Gap {
    fn from(raw: RawGap) -> Self {
        match raw {
            RawGap::Uniform(gap) => Gap::uniform(gap),
            RawGap::Axes([x, y]) => Gap::new(x, y),
        }
    }
}

/// Transition behaviour published to the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "RawTransition")]
pub enum Transition {
    /// Animated with the stylesheet's default duration.
    #[default]
    Default,
    /// `transition: false`, no animation at all.
    Disabled,
    /// Animated over the given amount of milliseconds.
    Millis(u32),
}

impl Transition {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Transition::Disabled)
    }

    /// CSS duration value, if the configuration overrides the default.
    pub fn css_duration(&self) -> Option<String> {
        match self {
            Transition::Millis(ms) => Some(format!("{}ms", ms)),
            Transition::Default | Transition::Disabled => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTransition {
    Flag(bool),
    Millis(f64),
}

impl TryFrom<RawTransition> for Transition {
    type Error = String;

    fn try_from(raw: RawTransition) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawTransition::Flag(false) => Ok(Transition::Disabled),
            RawTransition::Flag(true) => Ok(Transition::Default),
            RawTransition::Millis(ms) if !ms.is_finite() || ms < 0.0 => {
                Err(format!("transition duration must be a non-negative number, got {}", ms))
            }
            RawTransition::Millis(ms) if ms == 0.0 => Ok(Transition::Default),
            RawTransition::Millis(ms) => Ok(Transition::Millis(ms.round() as u32)),
        }
    }
}

/// How masonry items are distributed over columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MasonryPacking {
    /// Each item goes to the column with the smallest accumulated height.
    #[default]
    Balanced,
    /// Item `i` goes to column `i mod columns`.
    RoundRobin,
}

/// Settings that a breakpoint can override. A breakpoint replaces the whole
/// set; fields it omits take their defaults, not the base config's values.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutSettings {
    pub columns: Option<Columns>,
    pub column_min_width: Option<f32>,
    pub gap: Gap,
    pub same_height: bool,
    pub masonry: bool,
    pub masonry_packing: MasonryPacking,
    /// Name of a renderer registered with the orchestrator.
    pub renderer: Option<String>,
    pub transition: Transition,
    pub transition_method: Option<String>,
}

impl LayoutSettings {
    pub fn fixed(columns: u32) -> Self {
        Self {
            columns: Some(Columns::Fixed(columns)),
            ..Default::default()
        }
    }

    pub fn dynamic(column_min_width: f32) -> Self {
        Self {
            columns: Some(Columns::Dynamic),
            column_min_width: Some(column_min_width),
            ..Default::default()
        }
    }

    pub fn custom(renderer: impl Into<String>) -> Self {
        Self {
            renderer: Some(renderer.into()),
            ..Default::default()
        }
    }

    pub fn with_gap(mut self, gap: Gap) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_same_height(mut self, same_height: bool) -> Self {
        self.same_height = same_height;
        self
    }

    pub fn with_masonry(mut self, packing: MasonryPacking) -> Self {
        self.masonry = true;
        self.masonry_packing = packing;
        self
    }

    pub fn with_transition(mut self, transition: Transition, method: Option<&str>) -> Self {
        self.transition = transition;
        self.transition_method = method.map(str::to_string);
        self
    }

    pub fn validate(&self, scope: ConfigScope) -> Result<()> {
        if self.columns.is_none() && self.renderer.is_none() {
            return Err(GridError::NoColumnStrategy { scope });
        }

        if let Some(Columns::Fixed(0)) = self.columns {
            return Err(GridError::InvalidColumnCount { scope, count: 0 });
        }

        if self.columns == Some(Columns::Dynamic) {
            match self.column_min_width {
                Some(width) if width.is_finite() && width > 0.0 => {}
                _ => return Err(GridError::MissingColumnMinWidth { scope }),
            }
        }

        let Gap { x, y } = self.gap;
        if !(x >= 0.0 && y >= 0.0 && x.is_finite() && y.is_finite()) {
            return Err(GridError::InvalidGap { scope, x, y });
        }

        Ok(())
    }
}

/// The configuration object handed to `init`/`updateConfig`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "RawGridConfig")]
pub struct GridConfig {
    /// Selector for tracked items; `None` tracks the container's children.
    pub item_selector: Option<String>,
    pub settings: LayoutSettings,
    /// Overrides keyed by max-width threshold, ascending.
    pub breakpoints: BTreeMap<u32, LayoutSettings>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGridConfig {
    #[serde(default)]
    item_selector: Option<String>,
    #[serde(default)]
    breakpoints: BTreeMap<String, LayoutSettings>,
    #[serde(flatten)]
    settings: LayoutSettings,
}

impl TryFrom<RawGridConfig> for GridConfig {
    type Error = String;

    fn try_from(raw: RawGridConfig) -> std::result::Result<Self, Self::Error> {
        let mut breakpoints = BTreeMap::new();
        for (key, settings) in raw.breakpoints {
            let max_width = key
                .trim()
                .parse::<u32>()
                .map_err(|_| format!("breakpoint key {:?} is not a pixel width", key))?;
            breakpoints.insert(max_width, settings);
        }

        Ok(Self {
            item_selector: raw.item_selector.filter(|selector| !selector.is_empty()),
            settings: raw.settings,
            breakpoints,
        })
    }
}

impl GridConfig {
    pub fn new(settings: LayoutSettings) -> Self {
        Self {
            item_selector: None,
            settings,
            breakpoints: BTreeMap::new(),
        }
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: GridConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_item_selector(mut self, selector: impl Into<String>) -> Self {
        self.item_selector = Some(selector.into());
        self
    }

    pub fn with_breakpoint(mut self, max_width: u32, settings: LayoutSettings) -> Self {
        self.breakpoints.insert(max_width, settings);
        self
    }

    /// Base settings followed by every breakpoint in ascending order.
    pub fn scopes(&self) -> impl Iterator<Item = (ConfigScope, &LayoutSettings)> + '_ {
        std::iter::once((ConfigScope::Base, &self.settings)).chain(
            self.breakpoints
                .iter()
                .map(|(max_width, settings)| (ConfigScope::Breakpoint(*max_width), settings)),
        )
    }

    pub fn validate(&self) -> Result<()> {
        self.scopes()
            .try_for_each(|(scope, settings)| settings.validate(scope))
    }
}
