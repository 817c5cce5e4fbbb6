//! Height probes for the card organizer's content.
//!
//! A card is a vertical flex box: title, then one row per attribute, then a
//! chart area for stock cards. A category panel is a header above its cards,
//! which flow top to bottom through as many columns as fit, the way
//! multi-column text does: each column holds a contiguous run of cards and the
//! runs are split so the tallest column is as short as possible. Text is
//! wrapped with a fixed advance per character. The boxes are laid out with
//! taffy at the width the grid assigned, and the root height is reported.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use taffy::geometry::Rect;
use taffy::{AvailableSpace, Dimension, Display, FlexDirection, LengthPercentage, NodeId, Size, Style, TaffyTree};
use waterfall_layout::fit_columns;

use crate::item::{GridItem, ItemId};
use crate::probe::ItemProbe;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CardKind {
    Custom,
    Stock { code: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardContent {
    pub title: String,
    pub kind: CardKind,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl CardContent {
    pub fn custom(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: CardKind::Custom,
            attributes: Vec::new(),
        }
    }

    pub fn stock(title: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: CardKind::Stock { code: code.into() },
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute {
            key: key.into(),
            value: value.into(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelContent {
    pub name: String,
    #[serde(default)]
    pub cards: Vec<CardContent>,
}

impl PanelContent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cards: Vec::new(),
        }
    }

    pub fn with_card(mut self, card: CardContent) -> Self {
        self.cards.push(card);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Content {
    Card(CardContent),
    Panel(PanelContent),
}

/// Typography and spacing used when measuring content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardMetrics {
    pub char_width: f32,
    pub line_height: f32,
    pub title_line_height: f32,
    pub padding: f32,
    pub row_gap: f32,
    pub chart_height: f32,
    pub panel_header_height: f32,
    pub card_gap: f32,
    pub min_column_width: f32,
    pub max_columns: usize,
}

impl Default for CardMetrics {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            line_height: 20.0,
            title_line_height: 24.0,
            padding: 12.0,
            row_gap: 6.0,
            chart_height: 160.0,
            panel_header_height: 40.0,
            card_gap: 10.0,
            min_column_width: 90.0,
            max_columns: 3,
        }
    }
}

/// Lays content out with taffy to find its height at a given width.
#[derive(Debug, Clone, Default)]
pub struct CardMeasurer {
    metrics: CardMetrics,
}

impl CardMeasurer {
    pub fn new(metrics: CardMetrics) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &CardMetrics {
        &self.metrics
    }

    pub fn measure(&self, content: &Content, width: f32) -> Result<f32, taffy::TaffyError> {
        match content {
            Content::Card(card) => self.measure_card(card, width),
            Content::Panel(panel) => self.measure_panel(panel, width),
        }
    }

    pub fn measure_card(&self, card: &CardContent, width: f32) -> Result<f32, taffy::TaffyError> {
        let mut taffy: TaffyTree = TaffyTree::new();
        let inner = (width - 2.0 * self.metrics.padding).max(1.0);

        let mut children = Vec::with_capacity(card.attributes.len() + 2);
        children.push(self.text_leaf(&mut taffy, &card.title, inner, self.metrics.title_line_height)?);
        for attribute in &card.attributes {
            let row = format!("{}: {}", attribute.key, attribute.value);
            children.push(self.text_leaf(&mut taffy, &row, inner, self.metrics.line_height)?);
        }
        if let CardKind::Stock { code } = &card.kind {
            children.push(self.text_leaf(&mut taffy, code, inner, self.metrics.line_height)?);
            children.push(fixed_leaf(&mut taffy, self.metrics.chart_height)?);
        }

        self.layout_stack(&mut taffy, &children, width)
    }

    pub fn measure_panel(&self, panel: &PanelContent, width: f32) -> Result<f32, taffy::TaffyError> {
        let inner = (width - 2.0 * self.metrics.padding).max(1.0);
        let body = self.card_grid_height(&panel.cards, inner)?;

        let mut taffy: TaffyTree = TaffyTree::new();
        let mut children = vec![fixed_leaf(&mut taffy, self.metrics.panel_header_height)?];
        if body > 0.0 {
            children.push(fixed_leaf(&mut taffy, body)?);
        }
        self.layout_stack(&mut taffy, &children, width)
    }

    fn card_grid_height(&self, cards: &[CardContent], width: f32) -> Result<f32, taffy::TaffyError> {
        if cards.is_empty() {
            return Ok(0.0);
        }

        let columns = fit_columns(width, self.metrics.min_column_width, self.metrics.max_columns);
        let gap = self.metrics.card_gap;
        let column_width = ((width - gap * (columns - 1) as f32) / columns as f32).floor().max(1.0);

        let mut heights = Vec::with_capacity(cards.len());
        for card in cards {
            heights.push(self.measure_card(card, column_width)?);
        }
        Ok(balanced_flow_height(&heights, columns, gap))
    }

    fn text_leaf(
        &self,
        taffy: &mut TaffyTree,
        text: &str,
        width: f32,
        line_height: f32,
    ) -> Result<NodeId, taffy::TaffyError> {
        let lines = wrapped_lines(text, width, self.metrics.char_width);
        fixed_leaf(taffy, lines as f32 * line_height)
    }

    fn layout_stack(&self, taffy: &mut TaffyTree, children: &[NodeId], width: f32) -> Result<f32, taffy::TaffyError> {
        let padding = LengthPercentage::Length(self.metrics.padding);
        let root = taffy.new_with_children(
            Style {
                display: Display::Flex,
                flex_direction: FlexDirection::Column,
                size: Size {
                    width: Dimension::Length(width),
                    height: Dimension::Auto,
                },
                padding: Rect {
                    left: padding,
                    right: padding,
                    top: padding,
                    bottom: padding,
                },
                gap: Size {
                    width: LengthPercentage::Length(0.0),
                    height: LengthPercentage::Length(self.metrics.row_gap),
                },
                ..Default::default()
            },
            children,
        )?;

        taffy.compute_layout(
            root,
            Size {
                width: AvailableSpace::Definite(width),
                height: AvailableSpace::MaxContent,
            },
        )?;
        Ok(taffy.layout(root)?.size.height)
    }
}

fn fixed_leaf(taffy: &mut TaffyTree, height: f32) -> Result<NodeId, taffy::TaffyError> {
    taffy.new_leaf(Style {
        size: Size {
            width: Dimension::Auto,
            height: Dimension::Length(height),
        },
        flex_shrink: 0.0,
        ..Default::default()
    })
}

/// Lines needed for `text` at `width` with a fixed character advance. Empty
/// text still takes one line.
pub fn wrapped_lines(text: &str, width: f32, char_width: f32) -> usize {
    let chars = text.chars().count();
    if chars == 0 || !(width > 0.0) || !(char_width > 0.0) {
        return 1;
    }
    let per_line = ((width / char_width).floor() as usize).max(1);
    chars.div_ceil(per_line)
}

/// Height of the tallest column when `heights` flow in order through at most
/// `columns` columns, `gap` apart vertically, split to keep that column as
/// short as possible.
pub fn balanced_flow_height(heights: &[f32], columns: usize, gap: f32) -> f32 {
    let n = heights.len();
    if n == 0 {
        return 0.0;
    }
    let columns = columns.clamp(1, n);

    let mut prefix = vec![0.0_f32; n + 1];
    for (i, height) in heights.iter().enumerate() {
        prefix[i + 1] = prefix[i] + height.max(0.0);
    }
    let run = |start: usize, end: usize| prefix[end] - prefix[start] + gap * (end - start - 1) as f32;

    // best[j]: tallest column when the first j cards fill the columns used so far
    let mut best: Vec<f32> = (0..=n).map(|j| if j == 0 { 0.0 } else { run(0, j) }).collect();
    for _ in 1..columns {
        let mut next = best.clone();
        for end in 1..=n {
            for start in 1..end {
                let candidate = best[start].max(run(start, end));
                if candidate < next[end] {
                    next[end] = candidate;
                }
            }
        }
        best = next;
    }
    best[n]
}

/// Item probe backed by [`CardMeasurer`]. Items without registered content
/// measure as 0.
#[derive(Debug, Clone, Default)]
pub struct ContentProbe {
    measurer: CardMeasurer,
    contents: HashMap<ItemId, Content>,
}

impl ContentProbe {
    pub fn new(measurer: CardMeasurer) -> Self {
        Self {
            measurer,
            contents: HashMap::new(),
        }
    }

    pub fn insert(&mut self, id: ItemId, content: Content) {
        self.contents.insert(id, content);
    }

    pub fn remove(&mut self, id: ItemId) -> Option<Content> {
        self.contents.remove(&id)
    }

    pub fn get(&self, id: ItemId) -> Option<&Content> {
        self.contents.get(&id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Content> {
        self.contents.get_mut(&id)
    }
}

impl ItemProbe for ContentProbe {
    fn measure_height(&mut self, item: &GridItem, width: f32) -> f32 {
        let Some(content) = self.contents.get(&item.id) else {
            tracing::debug!(id = item.id, "no content registered for item");
            return 0.0;
        };
        match self.measurer.measure(content, width) {
            Ok(height) => height,
            Err(e) => {
                tracing::warn!(id = item.id, "failed to measure item: {}", e);
                0.0
            }
        }
    }
}
