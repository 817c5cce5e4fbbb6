use std::time::Duration;

use tracing_subscriber::EnvFilter;
use waterfall_core::{
    CardContent, CardMeasurer, Content, ContentProbe, GridItem, ItemId, PanelContent, ReflowDriver, TokioClock,
    Waterfall, WaterfallConfig, WaterfallEvent,
};

/// A small category board: panels of cards next to loose cards.
fn board() -> (Vec<GridItem>, ContentProbe) {
    let mut probe = ContentProbe::new(CardMeasurer::default());
    let contents: Vec<(ItemId, Content)> = vec![
        (
            1,
            Content::Panel(
                PanelContent::new("Markets")
                    .with_card(CardContent::stock("ACME Corp", "sh600000"))
                    .with_card(CardContent::stock("Globex", "sz000001"))
                    .with_card(CardContent::custom("Watchlist").with_attribute("alert", "below 40")),
            ),
        ),
        (2, Content::Card(CardContent::custom("Groceries").with_attribute("eggs", "12"))),
        (
            3,
            Content::Panel(
                PanelContent::new("Travel")
                    .with_card(CardContent::custom("Oslo").with_attribute("flight", "AF1274"))
                    .with_card(CardContent::custom("Hotel").with_attribute("nights", "3")),
            ),
        ),
        (4, Content::Card(CardContent::custom("A note long enough to wrap over a few lines"))),
        (5, Content::Panel(PanelContent::new("Inbox"))),
        (6, Content::Card(CardContent::stock("Initech", "sh601988"))),
    ];

    let ids = contents.iter().map(|(id, _)| *id).collect::<Vec<_>>();
    for (id, content) in contents {
        probe.insert(id, content);
    }
    (GridItem::sequence(ids), probe)
}

/// Widths seen while dragging from `from` down to `to`, both included.
fn drag_widths(from: u32, to: u32, step: usize) -> Vec<f32> {
    let mut widths: Vec<f32> = (to..=from).rev().step_by(step).map(|width| width as f32).collect();
    if widths.last() != Some(&(to as f32)) {
        widths.push(to as f32);
    }
    widths
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting waterfall demo");

    let (items, probe) = board();
    let waterfall = Waterfall::new(WaterfallConfig::default(), probe)
        .with_clock(TokioClock)
        .on_layout(|height, placements| {
            tracing::info!(container_height = height, items = placements.len(), "layout");
            for placement in placements {
                tracing::info!(
                    id = placement.id,
                    column = placement.column(),
                    x = placement.x(),
                    y = placement.y(),
                    height = placement.placement.height,
                    "  placed"
                );
            }
        })
        .on_reveal(|id, animation| tracing::info!(id, effect = %animation.effect, "reveal"));

    let driver = ReflowDriver::spawn(waterfall);
    driver.send(WaterfallEvent::Resized(1400.0))?;
    driver.send(WaterfallEvent::SetItems(items.clone()))?;
    tokio::time::sleep(Duration::from_millis(150)).await;

    // Dragging the window narrower collapses into one pass at the final width.
    tracing::info!("dragging to 700px");
    for width in drag_widths(1400, 700, 25) {
        driver.send(WaterfallEvent::Resized(width))?;
        tokio::time::sleep(Duration::from_millis(8)).await;
    }
    tokio::time::sleep(Duration::from_millis(150)).await;

    tracing::info!("reordering");
    let mut reordered = items;
    reordered.reverse();
    driver.send(WaterfallEvent::SetItems(reordered))?;
    driver.send(WaterfallEvent::Refresh)?;
    driver.send(WaterfallEvent::Refresh)?;
    tokio::time::sleep(Duration::from_millis(400)).await;

    let waterfall = driver.shutdown().await?;
    tracing::info!(
        passes = waterfall.stats().passes,
        superseded = waterfall.stats().superseded,
        throttled = waterfall.stats().throttled_refreshes,
        "demo finished"
    );
    Ok(())
}
