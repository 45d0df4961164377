// crates/gridwave-runtime/src/pipeline.rs
//! Filter and sort stages applied to the live item list on every pass.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use gridwave_render::GridHost;

pub type Predicate<I> = Rc<dyn Fn(&I) -> bool>;
pub type Comparator<I> = Rc<dyn Fn(&I, &I) -> Ordering>;

/// Which items stay visible.
pub enum Filter<I> {
    /// Every item matches.
    All,
    /// Items matching a CSS selector.
    Selector(String),
    Predicate(Predicate<I>),
}

impl<I> Filter<I> {
    /// Selector filter; an empty selector clears the filter.
    pub fn selector(selector: impl Into<String>) -> Self {
        let selector = selector.into();
        if selector.trim().is_empty() {
            Filter::All
        } else {
            Filter::Selector(selector)
        }
    }

    pub fn predicate(predicate: impl Fn(&I) -> bool + 'static) -> Self {
        Filter::Predicate(Rc::new(predicate))
    }

    fn accepts<H: GridHost<Item = I>>(&self, host: &H, item: &I) -> bool {
        match self {
            Filter::All => true,
            Filter::Selector(selector) => host.matches_selector(item, selector),
            Filter::Predicate(predicate) => predicate(item),
        }
    }
}

impl<I> Default for Filter<I> {
    fn default() -> Self {
        Filter::All
    }
}

impl<I> Clone for Filter<I> {
    fn clone(&self) -> Self {
        match self {
            Filter::All => Filter::All,
            Filter::Selector(selector) => Filter::Selector(selector.clone()),
            Filter::Predicate(predicate) => Filter::Predicate(Rc::clone(predicate)),
        }
    }
}

impl<I> fmt::Debug for Filter<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => write!(f, "All"),
            Filter::Selector(selector) => f.debug_tuple("Selector").field(selector).finish(),
            Filter::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}

impl<I> From<&str> for Filter<I> {
    fn from(selector: &str) -> Self {
        Filter::selector(selector)
    }
}

impl<I> From<String> for Filter<I> {
    fn from(selector: String) -> Self {
        Filter::selector(selector)
    }
}

impl<I> From<Option<&str>> for Filter<I> {
    fn from(selector: Option<&str>) -> Self {
        selector.map(Filter::selector).unwrap_or_default()
    }
}

/// Both `true` and `false` clear the filter.
impl<I> From<bool> for Filter<I> {
    fn from(_: bool) -> Self {
        Filter::All
    }
}

/// Order of the visible items.
pub enum SortOrder<I> {
    /// Document order.
    Document,
    Comparator(Comparator<I>),
}

impl<I> SortOrder<I> {
    pub fn by(comparator: impl Fn(&I, &I) -> Ordering + 'static) -> Self {
        SortOrder::Comparator(Rc::new(comparator))
    }
}

impl<I> Default for SortOrder<I> {
    fn default() -> Self {
        SortOrder::Document
    }
}

impl<I> Clone for SortOrder<I> {
    fn clone(&self) -> Self {
        match self {
            SortOrder::Document => SortOrder::Document,
            SortOrder::Comparator(comparator) => SortOrder::Comparator(Rc::clone(comparator)),
        }
    }
}

impl<I> fmt::Debug for SortOrder<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Document => write!(f, "Document"),
            SortOrder::Comparator(_) => write!(f, "Comparator(..)"),
        }
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput<I> {
    /// Items that passed the filter, in pipeline order.
    pub visible: Vec<I>,
    /// Items that failed the filter, in document order.
    pub hidden: Vec<I>,
}

#[derive(Debug, Clone)]
pub struct FilterSortPipeline<I> {
    filter: Filter<I>,
    sort: SortOrder<I>,
}

impl<I> Default for FilterSortPipeline<I> {
    fn default() -> Self {
        Self {
            filter: Filter::All,
            sort: SortOrder::Document,
        }
    }
}

impl<I> FilterSortPipeline<I> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&self) -> &Filter<I> {
        &self.filter
    }

    pub fn sort(&self) -> &SortOrder<I> {
        &self.sort
    }

    pub fn set_filter(&mut self, filter: Filter<I>) {
        self.filter = filter;
    }

    pub fn set_sort(&mut self, sort: SortOrder<I>) {
        self.sort = sort;
    }

    /// Split `items` into visible and hidden, then sort the visible ones.
    /// Hidden items keep document order and never reach the comparator.
    pub fn run<H: GridHost<Item = I>>(&self, host: &H, items: Vec<I>) -> PipelineOutput<I> {
        let (mut visible, hidden): (Vec<I>, Vec<I>) = items
            .into_iter()
            .partition(|item| self.filter.accepts(host, item));

        if let SortOrder::Comparator(comparator) = &self.sort {
            visible = merge_sort(visible, comparator.as_ref());
        }

        PipelineOutput { visible, hidden }
    }
}

/// Stable top-down merge sort. The comparator need not be a total order; the
/// result is always a permutation of `items`.
fn merge_sort<I>(mut items: Vec<I>, compare: &dyn Fn(&I, &I) -> Ordering) -> Vec<I> {
    if items.len() < 2 {
        return items;
    }
    let right = items.split_off(items.len() / 2);
    let mut left = merge_sort(items, compare).into_iter().peekable();
    let mut right = merge_sort(right, compare).into_iter().peekable();

    let mut merged = Vec::with_capacity(left.len() + right.len());
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(a), Some(b)) => compare(a, b) == Ordering::Greater,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        merged.extend(if take_right { right.next() } else { left.next() });
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridwave_render::{HeadlessDocument, HeadlessNode, NodeId};

    fn document() -> HeadlessDocument {
        HeadlessDocument::new(800.0, 800.0)
            .with_node(HeadlessNode::new("div").with_class("red").with_attribute("data-rank", "3"))
            .with_node(HeadlessNode::new("div").with_class("blue").with_attribute("data-rank", "1"))
            .with_node(HeadlessNode::new("div").with_class("red").with_attribute("data-rank", "2"))
            .with_node(HeadlessNode::new("div").with_class("green").with_attribute("data-rank", "1"))
    }

    #[test]
    fn test_default_pipeline_keeps_everything_in_order() {
        let doc = document();
        let pipeline = FilterSortPipeline::new();
        let output = pipeline.run(&doc, doc.query_items(None));
        assert_eq!(output.visible, vec![NodeId(0), NodeId(1), NodeId(2), NodeId(3)]);
        assert!(output.hidden.is_empty());
    }

    #[test]
    fn test_selector_filter() {
        let doc = document();
        let mut pipeline = FilterSortPipeline::new();
        pipeline.set_filter(".red".into());
        let output = pipeline.run(&doc, doc.query_items(None));
        assert_eq!(output.visible, vec![NodeId(0), NodeId(2)]);
        assert_eq!(output.hidden, vec![NodeId(1), NodeId(3)]);
    }

    #[test]
    fn test_clearing_forms() {
        let doc = document();
        let mut pipeline = FilterSortPipeline::new();
        for filter in [Filter::from(""), Filter::from(None), Filter::from(true), Filter::from("  ")] {
            pipeline.set_filter(filter);
            assert!(matches!(pipeline.filter(), Filter::All));
            assert_eq!(pipeline.run(&doc, doc.query_items(None)).visible.len(), 4);
        }
    }

    #[test]
    fn test_predicate_and_stable_sort() {
        let doc = document();
        let ranks: Vec<u32> = doc
            .node_ids()
            .map(|id| doc.node(id).attributes["data-rank"].parse().unwrap())
            .collect();

        let mut pipeline = FilterSortPipeline::new();
        pipeline.set_filter(Filter::predicate(|id: &NodeId| id.0 != 0));
        pipeline.set_sort(SortOrder::by(move |a: &NodeId, b: &NodeId| ranks[a.0].cmp(&ranks[b.0])));

        let output = pipeline.run(&doc, doc.query_items(None));
        // items 1 and 3 share rank 1 and keep document order
        assert_eq!(output.visible, vec![NodeId(1), NodeId(3), NodeId(2)]);
        assert_eq!(output.hidden, vec![NodeId(0)]);

        pipeline.set_sort(SortOrder::Document);
        let output = pipeline.run(&doc, doc.query_items(None));
        assert_eq!(output.visible, vec![NodeId(1), NodeId(2), NodeId(3)]);
    }

    #[test]
    fn test_inconsistent_comparator_still_permutes() {
        let mut doc = HeadlessDocument::new(800.0, 800.0);
        for _ in 0..200 {
            doc.push_node(HeadlessNode::new("div"));
        }

        let flip = Rc::new(std::cell::Cell::new(false));
        let state = Rc::clone(&flip);
        let mut pipeline = FilterSortPipeline::new();
        pipeline.set_sort(SortOrder::by(move |_: &NodeId, _: &NodeId| {
            state.set(!state.get());
            if state.get() {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }));

        let mut visible = pipeline.run(&doc, doc.query_items(None)).visible;
        assert_eq!(visible.len(), 200);
        visible.sort();
        assert_eq!(visible, doc.node_ids().collect::<Vec<_>>());
    }
}
