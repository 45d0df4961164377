// crates/gridwave-runtime/src/lib.rs

use std::collections::HashMap;

use gridwave_core::{GenerationCounter, GridConfig, GridError};
use gridwave_layout::{GridLayout, LayoutStrategy};
use gridwave_render::{
    apply_layout, clear_geometry, AnimationStateController, DomMeasure, GeometryProps, GridHost,
    RenderError, TimerHost, TimerToken, Visibility,
};
use tracing::{debug, error, warn};

pub mod pipeline;
pub mod resolver;
pub mod scheduler;

pub use pipeline::*;
pub use resolver::*;
pub use scheduler::*;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] GridError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("GridWave is not initialized, call init() first")]
    NotInitialized,
}

pub type RuntimeResult<T> = std::result::Result<T, RuntimeError>;

enum Lifecycle {
    Uninitialized,
    Active(ActiveConfig),
}

/// A responsive grid bound to one container.
///
/// Every public operation runs a complete pass synchronously: resolve the
/// breakpoint (config and resize paths only), filter and sort the live
/// items, lay them out, and write geometry and visibility state back to the
/// host. Failures are logged and returned; a failed pass leaves the
/// container in its last good state and the grid stays usable.
pub struct GridWave<H: GridHost + TimerHost> {
    host: H,
    lifecycle: Lifecycle,
    pipeline: FilterSortPipeline<H::Item>,
    generations: GenerationCounter,
    resolved: Option<ResolvedConfig>,
    renderers: HashMap<String, Box<dyn FnMut(&mut H, &[H::Item])>>,
    animation: AnimationStateController,
    scheduler: ResizeScheduler,
    layout: Option<GridLayout>,
}

impl<H: GridHost + TimerHost> GridWave<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            lifecycle: Lifecycle::Uninitialized,
            pipeline: FilterSortPipeline::new(),
            generations: GenerationCounter::new(),
            resolved: None,
            renderers: HashMap::new(),
            animation: AnimationStateController::new(),
            scheduler: ResizeScheduler::default(),
            layout: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn is_active(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Active(_))
    }

    /// Settings in effect for the current viewport.
    pub fn resolved(&self) -> Option<&ResolvedConfig> {
        self.resolved.as_ref()
    }

    /// Layout written by the last successful grid or masonry pass.
    pub fn layout(&self) -> Option<&GridLayout> {
        self.layout.as_ref()
    }

    pub fn pipeline(&self) -> &FilterSortPipeline<H::Item> {
        &self.pipeline
    }

    /// Make `renderer` available to configurations that name it.
    pub fn register_renderer(
        &mut self,
        name: impl Into<String>,
        renderer: impl FnMut(&mut H, &[H::Item]) + 'static,
    ) {
        self.renderers.insert(name.into(), Box::new(renderer));
    }

    pub fn init(&mut self, config: GridConfig) -> RuntimeResult<()> {
        if self.is_active() {
            warn!("GridWave: init called on an active grid, replacing its configuration");
            return self.update_config(config);
        }

        self.try_init(config)
            .inspect_err(|e| error!("GridWave: init failed: {}", e))
    }

    fn try_init(&mut self, config: GridConfig) -> RuntimeResult<()> {
        config.validate()?;
        debug!(?config, "GridWave initialized");

        self.animation.install_styles(&mut self.host)?;
        if !self.host.container_is_positioned() {
            self.host.set_container_style("position", Some("relative"))?;
        }
        self.host.listen_resize()?;

        self.assign(config)
    }

    /// Replace the whole configuration. Base and breakpoint settings get new
    /// generations even when their contents are unchanged.
    pub fn update_config(&mut self, config: GridConfig) -> RuntimeResult<()> {
        self.try_update_config(config)
            .inspect_err(|e| error!("GridWave: updateConfig failed: {}", e))
    }

    fn try_update_config(&mut self, config: GridConfig) -> RuntimeResult<()> {
        if !self.is_active() {
            return Err(RuntimeError::NotInitialized);
        }
        config.validate()?;
        self.assign(config)
    }

    fn assign(&mut self, config: GridConfig) -> RuntimeResult<()> {
        self.lifecycle = Lifecycle::Active(ActiveConfig::new(config, &mut self.generations));
        self.refresh_resolved()?;
        self.render()
    }

    /// Set the visibility filter. Selectors, predicates, or anything that
    /// clears the filter (`None`, `""`, `true`) are accepted.
    pub fn filter(&mut self, filter: impl Into<Filter<H::Item>>) -> RuntimeResult<()> {
        self.pipeline.set_filter(filter.into());
        self.rerender_if_active()
    }

    /// Set the sort order; [`SortOrder::Document`] restores document order.
    pub fn sort(&mut self, order: SortOrder<H::Item>) -> RuntimeResult<()> {
        self.pipeline.set_sort(order);
        self.rerender_if_active()
    }

    pub fn sort_by(
        &mut self,
        comparator: impl Fn(&H::Item, &H::Item) -> std::cmp::Ordering + 'static,
    ) -> RuntimeResult<()> {
        self.sort(SortOrder::by(comparator))
    }

    fn rerender_if_active(&mut self) -> RuntimeResult<()> {
        if self.is_active() {
            self.rerender()
        } else {
            Ok(())
        }
    }

    /// Replay pipeline, layout and visibility state with the current
    /// configuration, filter and sort order.
    pub fn rerender(&mut self) -> RuntimeResult<()> {
        self.render()
            .inspect_err(|e| error!("GridWave: render failed: {}", e))
    }

    /// Strip every inline style and attribute the grid wrote and stop
    /// listening for resizes. The grid can be initialized again afterwards.
    pub fn destroy(&mut self) -> RuntimeResult<()> {
        let Lifecycle::Active(active) = std::mem::replace(&mut self.lifecycle, Lifecycle::Uninitialized)
        else {
            return Ok(());
        };

        self.scheduler.cancel(&mut self.host);
        self.host.unlisten_resize();
        self.resolved = None;
        self.layout = None;
        self.pipeline = FilterSortPipeline::new();

        let items = self.host.query_items(active.item_selector());
        debug!(items = items.len(), "GridWave destroyed");
        self.strip(&items)
            .inspect_err(|e| error!("GridWave: destroy failed: {}", e))
    }

    fn strip(&mut self, items: &[H::Item]) -> RuntimeResult<()> {
        clear_geometry(&mut self.host, items, GeometryProps::all())?;
        self.animation.clear(&mut self.host, items)?;
        self.host.set_container_style("height", None)?;
        self.host.set_container_style("position", None)?;
        Ok(())
    }

    /// The viewport was resized. Re-layout happens once the resize settles.
    pub fn on_viewport_resize(&mut self) -> RuntimeResult<()> {
        if !self.is_active() {
            return Ok(());
        }
        self.scheduler
            .notify(&mut self.host)
            .map(|_| ())
            .map_err(RuntimeError::from)
            .inspect_err(|e| error!("GridWave: failed to schedule resize: {}", e))
    }

    /// A timer set by the resize scheduler elapsed.
    pub fn on_resize_timer(&mut self, token: TimerToken) -> RuntimeResult<()> {
        if !self.scheduler.fire(token) || !self.is_active() {
            return Ok(());
        }

        self.refresh_resolved()
            .and_then(|_| self.render())
            .inspect_err(|e| error!("GridWave: resize failed: {}", e))
    }

    fn refresh_resolved(&mut self) -> RuntimeResult<()> {
        let Lifecycle::Active(active) = &self.lifecycle else {
            return Err(RuntimeError::NotInitialized);
        };

        let resolved = resolve(active, self.host.viewport_width());
        let previous = self.resolved.as_ref().map(|resolved| resolved.generation);
        if previous != Some(resolved.generation) {
            debug!(
                scope = %resolved.scope,
                generation = %resolved.generation,
                "GridWave: switched resolved configuration"
            );
            self.animation.publish(&mut self.host, &resolved.settings)?;
        }

        self.resolved = Some(resolved);
        Ok(())
    }

    fn render(&mut self) -> RuntimeResult<()> {
        let (Lifecycle::Active(active), Some(resolved)) = (&self.lifecycle, &self.resolved) else {
            return Err(RuntimeError::NotInitialized);
        };

        // Configuration problems abort before anything is written.
        let strategy = LayoutStrategy::from_settings(&resolved.settings, resolved.scope)?;
        if let LayoutStrategy::Custom { renderer } = &strategy {
            if !self.renderers.contains_key(renderer) {
                return Err(GridError::UnknownRenderer(renderer.clone()).into());
            }
        }
        let gap = resolved.settings.gap;

        let items = self.host.query_items(active.item_selector());
        let output = self.pipeline.run(&self.host, items);

        for item in &output.hidden {
            self.animation.mark(&mut self.host, item, Visibility::Hidden)?;
        }
        for item in &output.visible {
            self.animation.mark(&mut self.host, item, Visibility::Visible)?;
        }

        if let LayoutStrategy::Custom { renderer } = &strategy {
            if let Some(custom) = self.renderers.get_mut(renderer) {
                custom(&mut self.host, &output.visible);
            }
            self.layout = None;
            return Ok(());
        }

        let container_width = self.host.container_width();
        let layout = {
            let mut measure = DomMeasure::new(&mut self.host, &output.visible);
            strategy.compute(container_width, gap, output.visible.len(), &mut measure)?
        };

        if let Some(layout) = layout {
            apply_layout(&mut self.host, &output.visible, &layout)?;
            debug!(
                visible = output.visible.len(),
                hidden = output.hidden.len(),
                height = layout.container_height,
                "GridWave: render pass complete"
            );
            self.layout = Some(layout);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridwave_core::{ConfigScope, Gap, LayoutSettings, MasonryPacking, Transition};
    use gridwave_render::{
        HeadlessDocument, HeadlessNode, NodeId, ANIMATIONS_ATTRIBUTE, ARIA_HIDDEN_ATTRIBUTE,
        DURATION_PROPERTY, STATUS_ATTRIBUTE, STYLESHEET_ID,
    };
    use gridwave_render::selector::SelectorTarget;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn document(viewport: f32) -> HeadlessDocument {
        let mut doc = HeadlessDocument::new(viewport, viewport);
        for (i, height) in [100.0, 150.0, 120.0, 80.0, 60.0, 90.0].into_iter().enumerate() {
            let color = if i % 2 == 0 { "red" } else { "blue" };
            doc.push_node(
                HeadlessNode::new("div")
                    .with_class("item")
                    .with_class(color)
                    .with_height(height),
            );
        }
        doc
    }

    fn grid(viewport: f32, config: GridConfig) -> GridWave<HeadlessDocument> {
        let mut grid = GridWave::new(document(viewport));
        grid.init(config).unwrap();
        grid
    }

    fn tops(grid: &GridWave<HeadlessDocument>) -> Vec<Option<String>> {
        grid.host()
            .node_ids()
            .map(|id| grid.host().node(id).style("top").map(str::to_string))
            .collect()
    }

    #[test]
    fn test_init_positions_container_and_lays_out() {
        let grid = grid(
            632.0,
            GridConfig::new(LayoutSettings::fixed(3).with_gap(Gap::uniform(16.0))),
        );
        let doc = grid.host();

        assert!(grid.is_active());
        assert!(doc.is_listening_resize());
        assert!(doc.has_stylesheet(STYLESHEET_ID));
        assert_eq!(doc.container_style("position"), Some("relative"));
        assert_eq!(doc.container_style("height"), Some("256px"));
        assert_eq!(doc.container_attribute(ANIMATIONS_ATTRIBUTE), Some("true"));

        let fifth = doc.node(NodeId(4));
        assert_eq!(fifth.style("left"), Some("216px"));
        assert_eq!(fifth.style("top"), Some("166px"));
        assert_eq!(fifth.style("width"), Some("200px"));
        assert_eq!(fifth.attribute(STATUS_ATTRIBUTE), Some("visible"));
    }

    #[test]
    fn test_positioned_container_is_left_alone() {
        let mut grid = GridWave::new(document(600.0).with_container_position("absolute"));
        grid.init(GridConfig::new(LayoutSettings::fixed(2))).unwrap();
        assert_eq!(grid.host().container_style("position"), None);
    }

    #[test]
    fn test_filter_hides_and_excludes_items() {
        let mut grid = grid(
            632.0,
            GridConfig::new(LayoutSettings::fixed(3).with_gap(Gap::uniform(16.0))),
        );
        let before = tops(&grid);

        grid.filter(".red").unwrap();
        let doc = grid.host();

        let hidden = doc.node(NodeId(1));
        assert_eq!(hidden.attribute(STATUS_ATTRIBUTE), Some("hidden"));
        assert_eq!(hidden.attribute(ARIA_HIDDEN_ATTRIBUTE), Some("true"));
        // hidden items keep their previous geometry untouched
        assert_eq!(hidden.style("top").map(str::to_string), before[1]);

        // visible red items: 0, 2, 4 fill one row
        assert_eq!(doc.node(NodeId(4)).style("left"), Some("432px"));
        assert_eq!(doc.node(NodeId(4)).style("top"), Some("0px"));
        assert_eq!(doc.container_style("height"), Some("120px"));
        assert_eq!(grid.layout().unwrap().placements.len(), 3);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let config = GridConfig::new(LayoutSettings::fixed(2).with_gap(Gap::uniform(8.0)));
        let mut once = grid(500.0, config.clone());
        let mut twice = grid(500.0, config);

        once.filter(".blue").unwrap();
        twice.filter(".blue").unwrap();
        twice.filter(".blue").unwrap();

        assert_eq!(once.layout(), twice.layout());
        assert_eq!(tops(&once), tops(&twice));
    }

    #[test]
    fn test_clearing_filter_restores_all_items() {
        let mut grid = grid(600.0, GridConfig::new(LayoutSettings::fixed(2)));
        grid.filter(".red").unwrap();
        grid.filter("").unwrap();

        let doc = grid.host();
        assert!(doc
            .node_ids()
            .all(|id| doc.node(id).attribute(STATUS_ATTRIBUTE) == Some("visible")));
        assert_eq!(grid.layout().unwrap().placements.len(), 6);
    }

    #[test]
    fn test_sort_reorders_visible_items() {
        let mut grid = grid(400.0, GridConfig::new(LayoutSettings::fixed(2)));
        // reverse document order
        grid.sort_by(|a: &NodeId, b: &NodeId| b.cmp(a)).unwrap();

        let doc = grid.host();
        assert_eq!(doc.node(NodeId(5)).style("left"), Some("0px"));
        assert_eq!(doc.node(NodeId(5)).style("top"), Some("0px"));
        assert_eq!(doc.node(NodeId(4)).style("left"), Some("200px"));

        grid.sort(SortOrder::Document).unwrap();
        assert_eq!(grid.host().node(NodeId(0)).style("top"), Some("0px"));
        assert_eq!(grid.host().node(NodeId(0)).style("left"), Some("0px"));
    }

    #[test]
    fn test_rerender_is_stable_without_sort() {
        let mut grid = grid(700.0, GridConfig::new(LayoutSettings::fixed(3)));
        let first = grid.layout().cloned();
        grid.rerender().unwrap();
        grid.rerender().unwrap();
        assert_eq!(grid.layout().cloned(), first);
    }

    #[test]
    fn test_breakpoints_switch_on_debounced_resize() {
        let config = GridConfig::new(
            LayoutSettings::fixed(3).with_transition(Transition::Millis(400), Some("ease-out")),
        )
        .with_breakpoint(480, LayoutSettings::fixed(1).with_transition(Transition::Disabled, None));
        let mut grid = grid(1000.0, config);

        assert_eq!(grid.resolved().unwrap().scope, ConfigScope::Base);
        assert_eq!(grid.host().container_style(DURATION_PROPERTY), Some("400ms"));

        grid.host_mut().resize(400.0, 400.0);
        grid.on_viewport_resize().unwrap();
        grid.on_viewport_resize().unwrap();
        // nothing happens until the timer elapses
        assert_eq!(grid.resolved().unwrap().scope, ConfigScope::Base);

        let tokens = grid.host_mut().elapse_timers();
        assert_eq!(tokens.len(), 1);
        grid.on_resize_timer(tokens[0]).unwrap();

        assert_eq!(grid.resolved().unwrap().scope, ConfigScope::Breakpoint(480));
        assert_eq!(grid.layout().unwrap().columns, 1);
        assert_eq!(grid.host().container_attribute(ANIMATIONS_ATTRIBUTE), Some("false"));
        assert_eq!(grid.host().container_style(DURATION_PROPERTY), None);
    }

    #[test]
    fn test_same_configuration_is_not_republished() {
        let config = GridConfig::new(
            LayoutSettings::fixed(3).with_transition(Transition::Millis(400), Some("ease-out")),
        )
        .with_breakpoint(480, LayoutSettings::fixed(1).with_transition(Transition::Millis(200), None));
        let mut grid = grid(1000.0, config);
        grid.host_mut()
            .set_container_style(DURATION_PROPERTY, Some("1234ms"))
            .unwrap();

        // still the base configuration
        grid.host_mut().resize(900.0, 900.0);
        grid.on_viewport_resize().unwrap();
        let tokens = grid.host_mut().elapse_timers();
        grid.on_resize_timer(tokens[0]).unwrap();
        grid.rerender().unwrap();
        assert_eq!(grid.resolved().unwrap().scope, ConfigScope::Base);
        assert_eq!(grid.host().container_style(DURATION_PROPERTY), Some("1234ms"));

        grid.host_mut().resize(400.0, 400.0);
        grid.on_viewport_resize().unwrap();
        let tokens = grid.host_mut().elapse_timers();
        grid.on_resize_timer(tokens[0]).unwrap();
        assert_eq!(grid.resolved().unwrap().scope, ConfigScope::Breakpoint(480));
        assert_eq!(grid.host().container_style(DURATION_PROPERTY), Some("200ms"));
    }

    #[test]
    fn test_update_config_assigns_new_generation() {
        let config = GridConfig::new(LayoutSettings::fixed(2));
        let mut grid = grid(800.0, config.clone());
        let first = grid.resolved().unwrap().generation;

        grid.update_config(config).unwrap();
        assert_ne!(grid.resolved().unwrap().generation, first);
    }

    #[test]
    fn test_update_config_before_init_fails() {
        let mut grid = GridWave::new(document(800.0));
        let result = grid.update_config(GridConfig::new(LayoutSettings::fixed(2)));
        assert!(matches!(result, Err(RuntimeError::NotInitialized)));
        assert!(matches!(grid.rerender(), Err(RuntimeError::NotInitialized)));
        // filter and sort are remembered but render nothing
        grid.filter(".red").unwrap();
        assert!(grid.host().node(NodeId(0)).inline_style_is_empty());
    }

    #[test]
    fn test_missing_columns_aborts_without_writes() {
        let mut grid = GridWave::new(document(800.0));
        let result = grid.init(GridConfig::new(LayoutSettings::default()));
        assert!(matches!(
            result,
            Err(RuntimeError::Config(GridError::NoColumnStrategy { .. }))
        ));

        let doc = grid.host();
        assert!(doc.node_ids().all(|id| doc.node(id).inline_style_is_empty()));
        assert!(doc.node_ids().all(|id| doc.node(id).attribute(STATUS_ATTRIBUTE).is_none()));
        assert_eq!(doc.container_style("height"), None);
        assert_eq!(doc.container_style("position"), None);
        assert!(!doc.has_stylesheet(STYLESHEET_ID));
        assert!(!grid.is_active());
    }

    #[test]
    fn test_masonry_pass() {
        let config = GridConfig::new(
            LayoutSettings::fixed(2)
                .with_gap(Gap::uniform(10.0))
                .with_masonry(MasonryPacking::Balanced),
        );
        let grid = grid(410.0, config);
        let layout = grid.layout().unwrap();

        let columns: Vec<usize> = layout.placements.iter().map(|p| p.column).collect();
        // heights 100,150,120,80,60,90
        assert_eq!(columns, vec![0, 1, 0, 1, 0, 1]);
        assert_eq!(grid.host().node(NodeId(2)).style("top"), Some("110px"));
        // the tallest column total includes its trailing gap
        assert_eq!(layout.container_height, 350.0);
    }

    #[test]
    fn test_custom_renderer_receives_visible_items() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut grid = GridWave::new(document(800.0));
        let sink = Rc::clone(&seen);
        grid.register_renderer("list", move |_, items: &[NodeId]| {
            *sink.borrow_mut() = items.to_vec();
        });

        grid.filter(".blue").unwrap();
        grid.init(GridConfig::new(LayoutSettings::custom("list"))).unwrap();

        assert_eq!(*seen.borrow(), vec![NodeId(1), NodeId(3), NodeId(5)]);
        assert!(grid.layout().is_none());
        assert_eq!(grid.host().node(NodeId(1)).style("left"), None);
    }

    #[test]
    fn test_unknown_renderer_is_reported() {
        let mut grid = GridWave::new(document(800.0));
        let result = grid.init(GridConfig::new(LayoutSettings::custom("missing")));
        assert!(matches!(
            result,
            Err(RuntimeError::Config(GridError::UnknownRenderer(name))) if name == "missing"
        ));
    }

    #[test]
    fn test_destroy_cleans_up() {
        let mut grid = grid(
            600.0,
            GridConfig::new(LayoutSettings::fixed(2).with_same_height(true))
                .with_item_selector(".item"),
        );
        grid.filter(".red").unwrap();
        grid.on_viewport_resize().unwrap();
        grid.destroy().unwrap();

        let doc = grid.host();
        assert!(!grid.is_active());
        assert!(!doc.is_listening_resize());
        assert!(doc.pending_timers().is_empty());
        assert_eq!(doc.container_style("height"), None);
        assert_eq!(doc.container_style("position"), None);
        assert_eq!(doc.container_attribute(ANIMATIONS_ATTRIBUTE), None);
        for id in doc.node_ids() {
            let node = doc.node(id);
            assert!(node.inline_style_is_empty());
            assert_eq!(node.attribute(STATUS_ATTRIBUTE), None);
            assert_eq!(node.attribute(ARIA_HIDDEN_ATTRIBUTE), None);
        }

        // a destroyed grid can be initialized again
        grid.init(GridConfig::new(LayoutSettings::fixed(3))).unwrap();
        assert!(grid.is_active());
    }
}
