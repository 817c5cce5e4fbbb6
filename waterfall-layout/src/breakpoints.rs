use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BreakpointError {
    #[error("breakpoint table is empty")]
    Empty,
    #[error("duplicate breakpoint threshold: {0}")]
    DuplicateThreshold(u32),
    #[error("breakpoint {0} has zero columns")]
    ZeroColumns(u32),
}

/// A single responsive step: at `threshold` pixels of container width the grid
/// uses `columns` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Breakpoint {
    pub threshold: u32,
    pub columns: u32,
}

impl Breakpoint {
    pub fn new(threshold: u32, columns: u32) -> Self {
        Self { threshold, columns }
    }
}

/// How a container width is matched against the breakpoint thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakpointMatch {
    /// First threshold greater than or equal to the width (thresholds are upper bounds).
    #[default]
    UpTo,
    /// Largest threshold less than or equal to the width (thresholds are minimum widths).
    AtLeast,
}

impl BreakpointMatch {
    fn matches(&self, breakpoint: &Breakpoint, width: f32) -> bool {
        match self {
            BreakpointMatch::UpTo => width <= breakpoint.threshold as f32,
            BreakpointMatch::AtLeast => width >= breakpoint.threshold as f32,
        }
    }
}

/// Column count for one threshold, as written in a config file. Accepts either
/// a bare number or the `{ "rowPerView": n }` object form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnsSpec {
    Count(u32),
    RowPerView {
        #[serde(rename = "rowPerView")]
        row_per_view: u32,
    },
}

impl ColumnsSpec {
    pub fn columns(&self) -> u32 {
        match self {
            ColumnsSpec::Count(columns) => *columns,
            ColumnsSpec::RowPerView { row_per_view } => *row_per_view,
        }
    }
}

/// Breakpoints sorted ascending by threshold, thresholds distinct.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<u32, ColumnsSpec>", into = "BTreeMap<u32, ColumnsSpec>")]
pub struct BreakpointTable {
    entries: Vec<Breakpoint>,
}

impl BreakpointTable {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// `{1200: 3, 800: 2, 500: 1}`
    pub fn standard() -> Self {
        Self {
            entries: vec![
                Breakpoint::new(500, 1),
                Breakpoint::new(800, 2),
                Breakpoint::new(1200, 3),
            ],
        }
    }

    /// Build a table, rejecting anything malformed.
    pub fn try_from_pairs<I>(pairs: I) -> Result<Self, BreakpointError>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut entries: Vec<Breakpoint> = Vec::new();
        for (threshold, columns) in pairs {
            if columns == 0 {
                return Err(BreakpointError::ZeroColumns(threshold));
            }
            if entries.iter().any(|bp| bp.threshold == threshold) {
                return Err(BreakpointError::DuplicateThreshold(threshold));
            }
            entries.push(Breakpoint::new(threshold, columns));
        }

        if entries.is_empty() {
            return Err(BreakpointError::Empty);
        }

        entries.sort_by_key(|bp| bp.threshold);
        Ok(Self { entries })
    }

    /// Build a table, dropping invalid entries instead of failing. Zero-column
    /// entries are skipped and for duplicate thresholds the last one wins.
    pub fn from_pairs_lossy<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut by_threshold = BTreeMap::new();
        for (threshold, columns) in pairs {
            if columns == 0 {
                tracing::warn!(threshold, "ignoring breakpoint with zero columns");
                continue;
            }
            if by_threshold.insert(threshold, columns).is_some() {
                tracing::warn!(threshold, "duplicate breakpoint threshold, keeping the last entry");
            }
        }

        let entries = by_threshold
            .into_iter()
            .map(|(threshold, columns)| Breakpoint::new(threshold, columns))
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[Breakpoint] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, width: f32, mode: BreakpointMatch) -> Option<Breakpoint> {
        match mode {
            BreakpointMatch::UpTo => self.entries.iter().find(|bp| mode.matches(bp, width)).copied(),
            BreakpointMatch::AtLeast => self
                .entries
                .iter()
                .rev()
                .find(|bp| mode.matches(bp, width))
                .copied(),
        }
    }
}

impl From<BTreeMap<u32, ColumnsSpec>> for BreakpointTable {
    fn from(map: BTreeMap<u32, ColumnsSpec>) -> Self {
        Self::from_pairs_lossy(map.into_iter().map(|(threshold, spec)| (threshold, spec.columns())))
    }
}

impl From<BreakpointTable> for BTreeMap<u32, ColumnsSpec> {
    fn from(table: BreakpointTable) -> Self {
        table
            .entries
            .into_iter()
            .map(|bp| (bp.threshold, ColumnsSpec::Count(bp.columns)))
            .collect()
    }
}

/// Resolved column geometry for one container width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnGeometry {
    pub container_width: f32,
    pub item_width: f32,
    pub column_count: usize,
    pub gutter: f32,
    /// The breakpoint that produced this geometry, `None` for the default width.
    pub breakpoint: Option<Breakpoint>,
}

impl ColumnGeometry {
    /// Geometry for a container that cannot hold any column.
    pub fn empty(container_width: f32, gutter: f32) -> Self {
        Self {
            container_width,
            item_width: 0.0,
            column_count: 0,
            gutter,
            breakpoint: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.column_count == 0
    }

    pub fn content_width(&self) -> f32 {
        self.column_count as f32 * (self.item_width + self.gutter) + self.gutter
    }

    /// Offset that centers the grid inside the container.
    pub fn shift_x(&self) -> f32 {
        (self.container_width - self.content_width()) / 2.0
    }

    pub fn column_x(&self, column: usize) -> f32 {
        self.shift_x() + self.gutter * (column + 1) as f32 + self.item_width * column as f32
    }
}

/// Upper bound on resolved columns, whatever the container width.
pub const MAX_COLUMNS: usize = u16::MAX as usize;

/// Map a container width to item width and column count.
///
/// `None`, zero, negative, infinite or NaN widths mean the container has not
/// been measured and produce an empty geometry. Otherwise at least one column is
/// returned. Inside a breakpoint the item width is
/// `floor((width - gutter) / columns - gutter)`; outside every breakpoint the
/// configured default width is used. The column count is always
/// `floor((width - gutter) / (item_width + gutter))`, capped at the
/// breakpoint's column count.
pub fn resolve_columns(
    container_width: Option<f32>,
    table: &BreakpointTable,
    mode: BreakpointMatch,
    default_width: f32,
    gutter: f32,
) -> ColumnGeometry {
    let gutter = gutter.max(0.0);
    let width = match container_width {
        Some(width) if width > 0.0 && width.is_finite() => width,
        Some(width) if width.is_finite() => return ColumnGeometry::empty(width.max(0.0), gutter),
        _ => return ColumnGeometry::empty(0.0, gutter),
    };

    let breakpoint = table.lookup(width, mode);
    let raw_item_width = match breakpoint {
        Some(bp) => ((width - gutter) / bp.columns as f32 - gutter).floor(),
        None => default_width,
    };
    let item_width = if raw_item_width.is_finite() { raw_item_width.max(1.0) } else { 1.0 };

    let fitted = ((width - gutter) / (item_width + gutter)).floor();
    let mut column_count = if fitted.is_finite() && fitted > 0.0 {
        (fitted as usize).min(MAX_COLUMNS)
    } else {
        0
    };
    if let Some(bp) = breakpoint {
        column_count = column_count.min(bp.columns as usize);
    }

    ColumnGeometry {
        container_width: width,
        item_width,
        column_count: column_count.max(1),
        gutter,
        breakpoint,
    }
}

/// Number of fixed-minimum-width columns that fit in a panel, between 1 and `max_columns`.
pub fn fit_columns(width: f32, min_column_width: f32, max_columns: usize) -> usize {
    if !(width > 0.0) || !(min_column_width > 0.0) {
        return 1;
    }
    let fitted = (width / min_column_width).floor() as usize;
    fitted.min(max_columns).max(1)
}

/// Caches the geometry of the last resolved width until the width or the
/// table changes.
pub struct BreakpointResolver {
    table: BreakpointTable,
    mode: BreakpointMatch,
    default_width: f32,
    gutter: f32,
    cache: Option<(Option<f32>, ColumnGeometry)>,
}

impl BreakpointResolver {
    pub fn new(table: BreakpointTable, mode: BreakpointMatch, default_width: f32, gutter: f32) -> Self {
        if table.is_empty() {
            tracing::warn!(default_width, "empty breakpoint table, every width uses the default item width");
        }
        Self {
            table,
            mode,
            default_width,
            gutter,
            cache: None,
        }
    }

    pub fn resolve(&mut self, container_width: Option<f32>) -> ColumnGeometry {
        if let Some((cached_width, geometry)) = &self.cache {
            if *cached_width == container_width {
                return *geometry;
            }
        }

        let geometry = resolve_columns(
            container_width,
            &self.table,
            self.mode,
            self.default_width,
            self.gutter,
        );
        self.cache = Some((container_width, geometry));
        geometry
    }

    pub fn set_table(&mut self, table: BreakpointTable) {
        if self.table != table {
            self.table = table;
            self.cache = None;
        }
    }

    pub fn table(&self) -> &BreakpointTable {
        &self.table
    }

    pub fn mode(&self) -> BreakpointMatch {
        self.mode
    }

    pub fn gutter(&self) -> f32 {
        self.gutter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(width: f32, mode: BreakpointMatch) -> ColumnGeometry {
        resolve_columns(Some(width), &BreakpointTable::standard(), mode, 250.0, 20.0)
    }

    #[test]
    fn test_up_to_picks_first_threshold_at_or_above_width() {
        let geometry = resolve(900.0, BreakpointMatch::UpTo);
        assert_eq!(geometry.breakpoint, Some(Breakpoint::new(1200, 3)));
        assert_eq!(geometry.item_width, 273.0);
        assert_eq!(geometry.column_count, 3);
    }

    #[test]
    fn test_at_least_picks_largest_threshold_at_or_below_width() {
        let geometry = resolve(900.0, BreakpointMatch::AtLeast);
        assert_eq!(geometry.breakpoint, Some(Breakpoint::new(800, 2)));
        assert_eq!(geometry.item_width, 420.0);
        assert_eq!(geometry.column_count, 2);
        assert_eq!(geometry.shift_x(), 0.0);
        assert_eq!(geometry.column_x(0), 20.0);
        assert_eq!(geometry.column_x(1), 460.0);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let geometry = resolve(800.0, BreakpointMatch::UpTo);
        assert_eq!(geometry.breakpoint, Some(Breakpoint::new(800, 2)));
        assert_eq!(geometry.column_count, 2);
        assert_eq!(geometry.item_width, 370.0);
    }

    #[test]
    fn test_wider_than_every_threshold_uses_default_width() {
        let geometry = resolve(1400.0, BreakpointMatch::UpTo);
        assert_eq!(geometry.breakpoint, None);
        assert_eq!(geometry.item_width, 250.0);
        // floor(1380 / 270)
        assert_eq!(geometry.column_count, 5);
        assert_eq!(geometry.content_width(), 5.0 * 270.0 + 20.0);
        assert_eq!(geometry.shift_x(), (1400.0 - 1370.0) / 2.0);
    }

    #[test]
    fn test_unmeasured_container_has_no_columns() {
        let table = BreakpointTable::standard();
        let unknown = resolve_columns(None, &table, BreakpointMatch::UpTo, 250.0, 20.0);
        assert!(unknown.is_empty());

        let zero = resolve_columns(Some(0.0), &table, BreakpointMatch::UpTo, 250.0, 20.0);
        assert!(zero.is_empty());
        assert_eq!(zero.item_width, 0.0);

        let sentinel = resolve_columns(Some(-1.0), &table, BreakpointMatch::UpTo, 250.0, 20.0);
        assert!(sentinel.is_empty());

        let nan = resolve_columns(Some(f32::NAN), &table, BreakpointMatch::UpTo, 250.0, 20.0);
        assert!(nan.is_empty());

        let infinite = resolve_columns(Some(f32::INFINITY), &table, BreakpointMatch::UpTo, 250.0, 20.0);
        assert!(infinite.is_empty());
        assert_eq!(infinite.container_width, 0.0);
    }

    #[test]
    fn test_huge_width_is_capped() {
        let table = BreakpointTable::standard();
        let geometry = resolve_columns(Some(f32::MAX), &table, BreakpointMatch::UpTo, 250.0, 20.0);
        assert_eq!(geometry.column_count, MAX_COLUMNS);

        let wide = resolve_columns(Some(1.0e12), &table, BreakpointMatch::UpTo, 250.0, 20.0);
        assert_eq!(wide.item_width, 250.0);
        assert_eq!(wide.column_count, MAX_COLUMNS);

        let at_least = resolve_columns(Some(1.0e12), &table, BreakpointMatch::AtLeast, 250.0, 20.0);
        assert_eq!(at_least.column_count, 3);
    }

    #[test]
    fn test_narrow_container_keeps_one_column() {
        let geometry = resolve(30.0, BreakpointMatch::UpTo);
        assert_eq!(geometry.column_count, 1);
        assert!(geometry.item_width >= 1.0);

        let table = BreakpointTable::new();
        let geometry = resolve_columns(Some(100.0), &table, BreakpointMatch::UpTo, 250.0, 20.0);
        assert_eq!(geometry.column_count, 1);
        assert_eq!(geometry.item_width, 250.0);
    }

    #[test]
    fn test_column_count_never_exceeds_breakpoint() {
        let table = BreakpointTable::try_from_pairs([(100, 4)]).unwrap();
        for width in 1..=100 {
            let geometry = resolve_columns(Some(width as f32), &table, BreakpointMatch::UpTo, 250.0, 2.0);
            assert!(geometry.column_count <= 4, "width {} gave {:?}", width, geometry);
            assert!(geometry.column_count >= 1);
        }
    }

    #[test]
    fn test_try_from_pairs_rejects_malformed_tables() {
        assert_eq!(
            BreakpointTable::try_from_pairs(Vec::<(u32, u32)>::new()),
            Err(BreakpointError::Empty)
        );
        assert_eq!(
            BreakpointTable::try_from_pairs([(800, 2), (800, 3)]),
            Err(BreakpointError::DuplicateThreshold(800))
        );
        assert_eq!(
            BreakpointTable::try_from_pairs([(800, 0)]),
            Err(BreakpointError::ZeroColumns(800))
        );

        let table = BreakpointTable::try_from_pairs([(1200, 3), (500, 1), (800, 2)]).unwrap();
        assert_eq!(table, BreakpointTable::standard());
    }

    #[test]
    fn test_lossy_table_drops_bad_entries() {
        let table = BreakpointTable::from_pairs_lossy([(800, 0), (500, 1), (500, 2)]);
        assert_eq!(table.entries(), &[Breakpoint::new(500, 2)]);
    }

    #[test]
    fn test_fit_columns() {
        assert_eq!(fit_columns(300.0, 90.0, 3), 3);
        assert_eq!(fit_columns(200.0, 90.0, 3), 2);
        assert_eq!(fit_columns(50.0, 90.0, 3), 1);
        assert_eq!(fit_columns(0.0, 90.0, 3), 1);
    }

    #[test]
    fn test_resolver_recomputes_on_width_change() {
        let mut resolver = BreakpointResolver::new(
            BreakpointTable::standard(),
            BreakpointMatch::UpTo,
            250.0,
            20.0,
        );
        assert_eq!(resolver.resolve(Some(900.0)).column_count, 3);
        assert_eq!(resolver.resolve(Some(900.0)).column_count, 3);
        assert_eq!(resolver.resolve(Some(700.0)).column_count, 2);
        assert!(resolver.resolve(None).is_empty());

        resolver.set_table(BreakpointTable::new());
        assert_eq!(resolver.resolve(Some(700.0)).item_width, 250.0);
    }
}
