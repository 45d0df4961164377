// crates/gridwave-runtime/src/resolver.rs
//! Breakpoint resolution.

use std::collections::BTreeMap;

use gridwave_core::{ConfigScope, Generation, GenerationCounter, GridConfig, LayoutSettings};

/// The configuration currently assigned through `init`/`updateConfig`, with a
/// fresh generation for the base settings and for every breakpoint entry.
#[derive(Debug, Clone)]
pub struct ActiveConfig {
    config: GridConfig,
    base: Generation,
    breakpoints: BTreeMap<u32, Generation>,
}

impl ActiveConfig {
    pub fn new(config: GridConfig, generations: &mut GenerationCounter) -> Self {
        let base = generations.next();
        let breakpoints = config
            .breakpoints
            .keys()
            .map(|max_width| (*max_width, generations.next()))
            .collect();

        Self {
            config,
            base,
            breakpoints,
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn item_selector(&self) -> Option<&str> {
        self.config.item_selector.as_deref()
    }
}

/// Settings in effect for the current viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub generation: Generation,
    pub scope: ConfigScope,
    pub settings: LayoutSettings,
}

/// Pick the breakpoint with the smallest max-width threshold that is still
/// `>= viewport_width`, or the base settings when no threshold qualifies.
pub fn resolve(active: &ActiveConfig, viewport_width: f32) -> ResolvedConfig {
    let breakpoint = active
        .config
        .breakpoints
        .iter()
        .find(|(max_width, _)| **max_width as f32 >= viewport_width);

    match breakpoint {
        Some((max_width, settings)) => ResolvedConfig {
            generation: active.breakpoints[max_width],
            scope: ConfigScope::Breakpoint(*max_width),
            settings: settings.clone(),
        },
        None => ResolvedConfig {
            generation: active.base,
            scope: ConfigScope::Base,
            settings: active.config.settings.clone(),
        },
    }
}
