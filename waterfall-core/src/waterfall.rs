use std::sync::Arc;
use std::time::Instant;

use waterfall_layout::{BreakpointResolver, BreakpointTable, ColumnGeometry, PlacementEngine, RevealGate};
use waterfall_reactive::{
    Clock, RefreshDecision, ReflowScheduler, ReflowState, ReflowTarget, ReflowTrigger, SchedulerStats, SystemClock,
};

use crate::config::{AnimationPolicy, WaterfallConfig};
use crate::item::{GridItem, ItemId, ItemPlacement};
use crate::probe::{ContainerProbe, ItemProbe};

pub type LayoutCallback = Box<dyn FnMut(f32, &[ItemPlacement]) + Send>;
pub type RevealCallback = Box<dyn FnMut(ItemId, &AnimationPolicy) + Send>;

/// Result of the last completed pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPass {
    pub container_height: f32,
    pub geometry: ColumnGeometry,
    /// Same order as the item list the pass ran over.
    pub placements: Vec<ItemPlacement>,
    pub triggers: Vec<ReflowTrigger>,
    pub unmeasured: usize,
}

impl LayoutPass {
    pub fn placement(&self, id: ItemId) -> Option<&ItemPlacement> {
        self.placements.iter().find(|placement| placement.id == id)
    }
}

/// Events accepted when a [`Waterfall`] runs under a
/// [`ReflowDriver`](waterfall_reactive::ReflowDriver).
#[derive(Debug, Clone)]
pub enum WaterfallEvent {
    SetItems(Vec<GridItem>),
    Resized(f32),
    Refresh,
    Configure(WaterfallConfig),
}

/// A masonry grid: owns the column state, the reveal record and the reflow
/// scheduler for one container.
///
/// The host reports geometry changes through [`notify_container_resized`],
/// [`set_items`] and [`request_refresh`], and calls [`poll`] whenever the
/// deadline from [`next_deadline`] passes. Completed passes are reported to
/// the `on_layout` callback, followed by one `on_reveal` call for every item
/// placed for the first time.
///
/// [`notify_container_resized`]: Waterfall::notify_container_resized
/// [`set_items`]: Waterfall::set_items
/// [`request_refresh`]: Waterfall::request_refresh
/// [`poll`]: Waterfall::poll
/// [`next_deadline`]: Waterfall::next_deadline
pub struct Waterfall {
    config: WaterfallConfig,
    resolver: BreakpointResolver,
    engine: PlacementEngine,
    reveals: RevealGate<ItemId>,
    scheduler: ReflowScheduler,
    clock: Arc<dyn Clock>,
    items: Vec<GridItem>,
    container_width: Option<f32>,
    container_probe: Option<Box<dyn ContainerProbe>>,
    item_probe: Box<dyn ItemProbe>,
    on_layout: Option<LayoutCallback>,
    on_reveal: Option<RevealCallback>,
    last_layout: Option<LayoutPass>,
    destroyed: bool,
}

impl Waterfall {
    pub fn new(config: WaterfallConfig, item_probe: impl ItemProbe + 'static) -> Self {
        let config = config.normalized();
        Self {
            resolver: resolver_for(&config),
            scheduler: ReflowScheduler::new(config.resize_debounce(), config.refresh_throttle()),
            engine: PlacementEngine::new(),
            reveals: RevealGate::new(),
            clock: Arc::new(SystemClock),
            items: Vec::new(),
            container_width: None,
            container_probe: None,
            item_probe: Box::new(item_probe),
            on_layout: None,
            on_reveal: None,
            last_layout: None,
            destroyed: false,
            config,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Query `probe` for the container width at the start of every pass
    /// instead of using the last width passed to
    /// [`notify_container_resized`](Self::notify_container_resized).
    pub fn with_container_probe(mut self, probe: impl ContainerProbe + 'static) -> Self {
        self.container_probe = Some(Box::new(probe));
        self
    }

    pub fn on_layout<F>(mut self, callback: F) -> Self
    where
        F: FnMut(f32, &[ItemPlacement]) + Send + 'static,
    {
        self.on_layout = Some(Box::new(callback));
        self
    }

    pub fn on_reveal<F>(mut self, callback: F) -> Self
    where
        F: FnMut(ItemId, &AnimationPolicy) + Send + 'static,
    {
        self.on_reveal = Some(Box::new(callback));
        self
    }

    pub fn configure(
        &mut self,
        gutter: f32,
        default_width: f32,
        breakpoints: BreakpointTable,
        animation: AnimationPolicy,
    ) {
        let config = self
            .config
            .clone()
            .with_gutter(gutter)
            .with_default_width(default_width)
            .with_breakpoints(breakpoints)
            .with_animation(animation);
        self.set_config(config);
    }

    /// Replace the whole configuration. Layout changes take effect on the
    /// next pass, new timing windows on the next armed timer.
    pub fn set_config(&mut self, config: WaterfallConfig) {
        if self.destroyed {
            tracing::debug!("configure on destroyed waterfall ignored");
            return;
        }
        let config = config.normalized();
        self.resolver = resolver_for(&config);
        self.scheduler
            .set_windows(config.resize_debounce(), config.refresh_throttle());
        self.config = config;
        self.scheduler.notify(ReflowTrigger::Configured, self.clock.now());
    }

    /// Replace the item list. Placements of the next pass follow this order.
    pub fn set_items(&mut self, items: Vec<GridItem>) {
        if self.destroyed {
            tracing::debug!("set_items on destroyed waterfall ignored");
            return;
        }
        tracing::debug!(count = items.len(), "items replaced");
        self.items = items;
        self.scheduler.notify(ReflowTrigger::ItemsChanged, self.clock.now());
    }

    pub fn notify_container_resized(&mut self, width: f32) {
        if self.destroyed {
            return;
        }
        self.container_width = Some(width);
        self.scheduler.notify(ReflowTrigger::Resize, self.clock.now());
    }

    /// Recompute now unless a refresh already ran within the throttle window.
    pub fn request_refresh(&mut self) -> RefreshDecision {
        if self.destroyed {
            return RefreshDecision::Destroyed;
        }
        let decision = self.scheduler.request_refresh(self.clock.now());
        if decision == RefreshDecision::RunNow {
            self.run_pass();
        }
        decision
    }

    /// Run the debounced pass if its timer has fired. Returns whether a pass ran.
    pub fn poll(&mut self) -> bool {
        if self.destroyed || !self.scheduler.is_due(self.clock.now()) {
            return false;
        }
        self.run_pass();
        true
    }

    /// Run a pass immediately, absorbing any pending debounced one.
    pub fn reflow_now(&mut self) {
        if !self.destroyed {
            self.run_pass();
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    pub fn last_layout(&self) -> Option<&LayoutPass> {
        self.last_layout.as_ref()
    }

    pub fn items(&self) -> &[GridItem] {
        &self.items
    }

    pub fn config(&self) -> &WaterfallConfig {
        &self.config
    }

    pub fn state(&self) -> ReflowState {
        self.scheduler.state()
    }

    pub fn stats(&self) -> &SchedulerStats {
        self.scheduler.stats()
    }

    pub fn is_revealed(&self, id: ItemId) -> bool {
        self.reveals.is_revealed(&id)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Release timers, probes, callbacks and the reveal record. Every later
    /// call is a no-op.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.scheduler.cancel();
        self.reveals = RevealGate::new();
        self.container_probe = None;
        self.on_layout = None;
        self.on_reveal = None;
        self.destroyed = true;
        tracing::debug!("waterfall destroyed");
    }

    fn current_width(&self) -> Option<f32> {
        match &self.container_probe {
            Some(probe) => probe.container_width(),
            None => self.container_width,
        }
    }

    fn run_pass(&mut self) {
        let triggers = self.scheduler.begin_pass();
        let width = self.current_width();
        let geometry = self.resolver.resolve(width);

        let item_probe = &mut self.item_probe;
        let pass = self
            .engine
            .place(&geometry, &self.items, |item, item_width| item_probe.measure_height(item, item_width));

        if let Some(pass) = pass {
            let placements: Vec<ItemPlacement> = self
                .items
                .iter()
                .zip(pass.placements)
                .map(|(item, placement)| ItemPlacement {
                    id: item.id,
                    order: item.order,
                    placement,
                })
                .collect();

            tracing::debug!(
                ?triggers,
                width = geometry.container_width,
                columns = geometry.column_count,
                item_width = geometry.item_width,
                container_height = pass.container_height,
                "layout pass"
            );

            if let Some(on_layout) = self.on_layout.as_mut() {
                on_layout(pass.container_height, &placements);
            }
            for placement in &placements {
                if self.reveals.should_reveal(&placement.id) {
                    if let Some(on_reveal) = self.on_reveal.as_mut() {
                        on_reveal(placement.id, &self.config.animation);
                    }
                }
            }

            self.last_layout = Some(LayoutPass {
                container_height: pass.container_height,
                geometry: pass.geometry,
                placements,
                triggers,
                unmeasured: pass.unmeasured,
            });
        } else {
            tracing::debug!(?width, "container not measured, pass skipped");
        }

        self.scheduler.finish_pass(self.clock.now());
    }
}

impl Drop for Waterfall {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl ReflowTarget for Waterfall {
    type Event = WaterfallEvent;

    fn handle_event(&mut self, event: WaterfallEvent) {
        match event {
            WaterfallEvent::SetItems(items) => self.set_items(items),
            WaterfallEvent::Resized(width) => self.notify_container_resized(width),
            WaterfallEvent::Refresh => {
                self.request_refresh();
            }
            WaterfallEvent::Configure(config) => self.set_config(config),
        }
    }

    fn poll_reflow(&mut self) {
        self.poll();
    }

    fn next_deadline(&self) -> Option<Instant> {
        Waterfall::next_deadline(self)
    }

    fn teardown(&mut self) {
        self.destroy();
    }
}

fn resolver_for(config: &WaterfallConfig) -> BreakpointResolver {
    BreakpointResolver::new(
        config.breakpoints.clone(),
        config.breakpoint_match,
        config.default_width,
        config.gutter,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::FixedHeights;
    use std::sync::Mutex;
    use waterfall_reactive::ManualClock;

    type Layouts = Arc<Mutex<Vec<(f32, Vec<ItemPlacement>)>>>;

    fn recording(config: WaterfallConfig, heights: FixedHeights) -> (Waterfall, ManualClock, Layouts, Arc<Mutex<Vec<ItemId>>>) {
        let clock = ManualClock::new();
        let layouts: Layouts = Arc::new(Mutex::new(Vec::new()));
        let reveals = Arc::new(Mutex::new(Vec::new()));
        let layout_sink = layouts.clone();
        let reveal_sink = reveals.clone();
        let waterfall = Waterfall::new(config, heights)
            .with_clock(clock.clone())
            .on_layout(move |height, placements| layout_sink.lock().unwrap().push((height, placements.to_vec())))
            .on_reveal(move |id, _| reveal_sink.lock().unwrap().push(id));
        (waterfall, clock, layouts, reveals)
    }

    #[test]
    fn test_nothing_runs_before_debounce() {
        let (mut waterfall, clock, layouts, _) = recording(WaterfallConfig::default(), FixedHeights::new());
        waterfall.notify_container_resized(900.0);
        assert_eq!(waterfall.state(), ReflowState::PendingMeasure);

        clock.advance_ms(99);
        assert!(!waterfall.poll());
        clock.advance_ms(1);
        assert!(waterfall.poll());
        assert_eq!(waterfall.state(), ReflowState::Idle);
        assert_eq!(layouts.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_layout_precedes_reveals() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let layout_order = order.clone();
        let reveal_order = order.clone();
        let mut waterfall = Waterfall::new(WaterfallConfig::default(), FixedHeights::new().with(1, 50.0).with(2, 60.0))
            .on_layout(move |_, _| layout_order.lock().unwrap().push("layout".to_string()))
            .on_reveal(move |id, animation| reveal_order.lock().unwrap().push(format!("{}:{}", id, animation.effect)));

        waterfall.notify_container_resized(700.0);
        waterfall.set_items(GridItem::sequence([1, 2]));
        waterfall.reflow_now();

        assert_eq!(*order.lock().unwrap(), vec!["layout", "1:fadeIn", "2:fadeIn"]);
    }

    #[test]
    fn test_probe_width_wins() {
        let (waterfall, clock, layouts, _) = recording(WaterfallConfig::default(), FixedHeights::new().with(1, 10.0));
        let mut waterfall = waterfall.with_container_probe(|| Some(1100.0_f32));
        waterfall.notify_container_resized(300.0);
        waterfall.set_items(GridItem::sequence([1]));
        clock.advance_ms(100);
        waterfall.poll();

        let pass = waterfall.last_layout().unwrap();
        assert_eq!(pass.geometry.container_width, 1100.0);
        assert_eq!(pass.geometry.column_count, 3);
        assert_eq!(layouts.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_configure_rearms() {
        let (mut waterfall, clock, _, _) = recording(WaterfallConfig::default(), FixedHeights::new());
        waterfall.notify_container_resized(900.0);
        clock.advance_ms(100);
        waterfall.poll();

        waterfall.configure(10.0, 200.0, BreakpointTable::new(), AnimationPolicy::new("zoomIn"));
        assert_eq!(waterfall.state(), ReflowState::PendingMeasure);
        clock.advance_ms(100);
        assert!(waterfall.poll());

        let pass = waterfall.last_layout().unwrap();
        assert_eq!(pass.triggers, vec![ReflowTrigger::Configured]);
        assert_eq!(pass.geometry.item_width, 200.0);
        // floor((900 - 10) / 210)
        assert_eq!(pass.geometry.column_count, 4);
        assert_eq!(waterfall.config().animation.effect, "zoomIn");
    }

    #[test]
    fn test_destroy_releases_everything() {
        let (mut waterfall, clock, layouts, reveals) =
            recording(WaterfallConfig::default(), FixedHeights::new().with(1, 10.0));
        waterfall.set_items(GridItem::sequence([1]));
        waterfall.notify_container_resized(900.0);
        waterfall.destroy();

        assert_eq!(waterfall.next_deadline(), None);
        clock.advance_ms(1_000);
        assert!(!waterfall.poll());
        assert_eq!(waterfall.request_refresh(), RefreshDecision::Destroyed);
        waterfall.notify_container_resized(1000.0);
        waterfall.reflow_now();

        assert!(waterfall.is_destroyed());
        assert!(layouts.lock().unwrap().is_empty());
        assert!(reveals.lock().unwrap().is_empty());
        assert_eq!(waterfall.stats().throttled_refreshes, 0);
    }

    #[test]
    fn test_destroy_forgets_revealed_items() {
        let (mut waterfall, _, _, reveals) = recording(WaterfallConfig::default(), FixedHeights::new().with(1, 10.0));
        waterfall.notify_container_resized(900.0);
        waterfall.set_items(GridItem::sequence([1]));
        waterfall.reflow_now();
        assert!(waterfall.is_revealed(1));
        assert_eq!(*reveals.lock().unwrap(), vec![1]);

        waterfall.destroy();
        assert!(!waterfall.is_revealed(1));
    }
}
