#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tumor–immune simulation.
//!
//! This crate defines the message surface that connects the engine, the
//! authoritative world, pure systems and adapters. The engine submits
//! [`Command`] values to the world, the world executes them through its
//! `apply` entry point and broadcasts [`Event`] values describing what
//! happened during the step. Systems consume those events together with
//! read-only views ([`CellView`], [`ImmuneView`], [`MaterialFieldView`]) and
//! publish [`MetricEvent`] values to an external [`MetricsSink`].

mod config;

pub use config::{
    CellConfig, ConfigError, GeneConfig, GridConfig, ImmuneConfig, MaterialConfig, RunConfig,
    SenescenceDeath, SimulationConfig,
};

use serde::{Deserialize, Serialize};

/// Index of a discrete simulation step. The first simulated step is `1`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct StepIndex(u64);

impl StepIndex {
    /// Creates a new step index with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the step.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Returns the step that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Reports whether the step falls on the provided interval.
    ///
    /// An interval of zero never matches so callers can use it to disable
    /// periodic work.
    #[must_use]
    pub const fn is_interval(&self, interval: u64) -> bool {
        interval != 0 && self.0 % interval == 0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    column: u32,
    row: u32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column (x) index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row (y) index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two grid coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: GridCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// Width and height of the tissue grid shared by every positioned agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridBounds {
    width: u32,
    height: u32,
}

impl GridBounds {
    /// Creates bounds describing a `width` by `height` grid.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the signed candidate position lies inside the grid.
    #[must_use]
    pub fn in_bounds(&self, column: i64, row: i64) -> bool {
        column >= 0 && row >= 0 && column < i64::from(self.width) && row < i64::from(self.height)
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub fn contains(&self, coord: GridCoord) -> bool {
        coord.column() < self.width && coord.row() < self.height
    }

    /// Returns the coordinate displaced by `(delta_column, delta_row)` when it stays in bounds.
    #[must_use]
    pub fn offset(&self, coord: GridCoord, delta_column: i32, delta_row: i32) -> Option<GridCoord> {
        let column = i64::from(coord.column()) + i64::from(delta_column);
        let row = i64::from(coord.row()) + i64::from(delta_row);
        if !self.in_bounds(column, row) {
            return None;
        }
        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        Some(GridCoord::new(column, row))
    }

    /// Total number of cells contained in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.width) * u64::from(self.height);
        usize::try_from(count).unwrap_or(0)
    }

    /// Dense row-major index of the coordinate, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, coord: GridCoord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        let row = usize::try_from(coord.row()).ok()?;
        let column = usize::try_from(coord.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + column)
    }

    /// Iterator over every coordinate in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = GridCoord> {
        let width = self.width;
        (0..self.height)
            .flat_map(move |row| (0..width).map(move |column| GridCoord::new(column, row)))
    }
}

/// Phenotype of a tissue cell, always derived from its gene and never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phenotype {
    /// Gene value of zero; oxidative metabolism and replicative senescence.
    Normal,
    /// Non-zero gene value; glycolytic metabolism and unbounded division.
    Cancer,
}

impl Phenotype {
    /// Derives the phenotype from a gene value (number of mutated positions).
    #[must_use]
    pub const fn from_gene_value(value: usize) -> Self {
        if value == 0 {
            Self::Normal
        } else {
            Self::Cancer
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Seeds the initial cell and immune populations at random positions.
    Populate,
    /// Advances the world through one full step of the phase order.
    Step {
        /// Index of the step being simulated, owned by the engine.
        step: StepIndex,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that initial populations were placed on the grid.
    PopulationSeeded {
        /// Number of tissue cells created.
        cells: usize,
        /// Number of immune agents created.
        immune_agents: usize,
    },
    /// Indicates that the world began simulating a step.
    StepStarted {
        /// Index of the step.
        step: StepIndex,
    },
    /// Reports the divisions performed during the division phase.
    CellsDivided {
        /// Divisions whose parent had the normal phenotype.
        normal: usize,
        /// Divisions whose parent had the cancer phenotype.
        cancer: usize,
    },
    /// Reports gene mutations that flipped a position.
    CellsMutated {
        /// Number of genes that changed.
        count: usize,
    },
    /// Reports cells removed by the death predicate.
    CellsDied {
        /// Number of cells removed.
        count: usize,
    },
    /// Reports cancer cells eliminated by immune recognition.
    CancerCellsCleared {
        /// Number of cancer cells removed.
        count: usize,
    },
    /// Reports immune agents removed after reaching their lifespan.
    ImmuneAgentsExpired {
        /// Number of immune agents removed.
        count: usize,
    },
    /// Reports immune agents cloned after a successful recognition.
    ImmuneAgentsCloned {
        /// Number of clones merged into the population.
        count: usize,
    },
    /// Reports fresh immune agents created to restore the target population.
    ImmuneAgentsReplenished {
        /// Number of agents created.
        count: usize,
    },
    /// Indicates that every phase of the step completed.
    StepCompleted {
        /// Index of the step.
        step: StepIndex,
    },
}

/// Immutable representation of a single tissue cell used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellSnapshot {
    /// Grid cell occupied by the cell.
    pub cell: GridCoord,
    /// Current energy, which may be transiently negative.
    pub energy: f64,
    /// Number of divisions the cell performed.
    pub division_count: u32,
    /// Phenotype derived from the gene.
    pub phenotype: Phenotype,
    /// Whether the first gene position is mutated.
    pub mutant: bool,
}

/// Read-only snapshot describing the tissue cell population in iteration order.
#[derive(Clone, Debug, Default)]
pub struct CellView {
    snapshots: Vec<CellSnapshot>,
}

impl CellView {
    /// Creates a new cell view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<CellSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured cell snapshots in population order.
    pub fn iter(&self) -> impl Iterator<Item = &CellSnapshot> {
        self.snapshots.iter()
    }

    /// Number of cells captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CellSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single immune agent used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImmuneAgentSnapshot {
    /// Grid cell occupied by the agent.
    pub cell: GridCoord,
    /// Steps the agent has been alive.
    pub age: u32,
}

/// Read-only snapshot describing the immune population in iteration order.
#[derive(Clone, Debug, Default)]
pub struct ImmuneView {
    snapshots: Vec<ImmuneAgentSnapshot>,
}

impl ImmuneView {
    /// Creates a new immune view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<ImmuneAgentSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured agent snapshots in population order.
    pub fn iter(&self) -> impl Iterator<Item = &ImmuneAgentSnapshot> {
        self.snapshots.iter()
    }

    /// Number of agents captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no agents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Read-only view into a dense material quantity grid.
#[derive(Clone, Copy, Debug)]
pub struct MaterialFieldView<'a> {
    values: &'a [f64],
    bounds: GridBounds,
}

impl<'a> MaterialFieldView<'a> {
    /// Captures a new view backed by row-major `values`.
    #[must_use]
    pub fn new(values: &'a [f64], bounds: GridBounds) -> Self {
        Self { values, bounds }
    }

    /// Quantity stored at the coordinate, if it lies inside the grid.
    #[must_use]
    pub fn quantity(&self, cell: GridCoord) -> Option<f64> {
        self.bounds
            .index(cell)
            .and_then(|index| self.values.get(index).copied())
    }

    /// Row-major slice of every stored quantity.
    #[must_use]
    pub fn values(&self) -> &'a [f64] {
        self.values
    }

    /// Dimensions of the underlying grid.
    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        self.bounds
    }
}

/// Names of the scalar series published once per step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarMetric {
    /// Number of normal cells.
    NormalCells,
    /// Number of cancer cells.
    CancerCells,
    /// Cancer cells whose first gene position is mutated.
    MutantCancerCells,
    /// Cancer cells whose first gene position is intact.
    StandardCancerCells,
    /// Mean energy across every cell.
    AverageEnergy,
    /// Mean energy across normal cells.
    AverageNormalEnergy,
    /// Mean energy across cancer cells.
    AverageCancerEnergy,
    /// Divisions performed by normal parents.
    NormalDivisions,
    /// Divisions performed by cancer parents.
    CancerDivisions,
    /// Gene mutations that changed a position.
    Mutations,
    /// Cells removed by the death predicate.
    DeadCells,
    /// Cancer cells eliminated by immune recognition.
    ImmuneClearedCells,
    /// Size of the immune population after replenishment.
    ImmunePopulation,
    /// Immune agents created by replenishment.
    ImmuneReplenished,
    /// Immune agents removed at lifespan expiry.
    ImmuneExpired,
}

impl ScalarMetric {
    /// Every scalar series in publication order.
    pub const ALL: [ScalarMetric; 15] = [
        Self::NormalCells,
        Self::CancerCells,
        Self::MutantCancerCells,
        Self::StandardCancerCells,
        Self::AverageEnergy,
        Self::AverageNormalEnergy,
        Self::AverageCancerEnergy,
        Self::NormalDivisions,
        Self::CancerDivisions,
        Self::Mutations,
        Self::DeadCells,
        Self::ImmuneClearedCells,
        Self::ImmunePopulation,
        Self::ImmuneReplenished,
        Self::ImmuneExpired,
    ];

    /// Stable series name suitable for file names and labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NormalCells => "normalcell-size",
            Self::CancerCells => "cancercell-size",
            Self::MutantCancerCells => "mutant-cancercell-size",
            Self::StandardCancerCells => "standard-cancercell-size",
            Self::AverageEnergy => "cell-energy-average",
            Self::AverageNormalEnergy => "normalcell-energy-average",
            Self::AverageCancerEnergy => "cancercell-energy-average",
            Self::NormalDivisions => "normalcell-division",
            Self::CancerDivisions => "cancercell-division",
            Self::Mutations => "mutation-count",
            Self::DeadCells => "dead-cell-count",
            Self::ImmuneClearedCells => "immune-cleared-count",
            Self::ImmunePopulation => "tcell-size",
            Self::ImmuneReplenished => "tcell-replenished",
            Self::ImmuneExpired => "tcell-expired",
        }
    }
}

/// Names of the grid snapshots published at the configured interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapshotMetric {
    /// Occupancy counts of every cell.
    Cells,
    /// Occupancy counts of normal cells.
    NormalCells,
    /// Occupancy counts of cancer cells.
    CancerCells,
    /// Occupancy counts of immune agents.
    ImmuneAgents,
    /// Raw glucose quantities.
    Glucose,
    /// Raw oxygen quantities.
    Oxygen,
}

impl SnapshotMetric {
    /// Stable snapshot name suitable for file names and labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cells => "cell",
            Self::NormalCells => "normalcell",
            Self::CancerCells => "cancercell",
            Self::ImmuneAgents => "tcell",
            Self::Glucose => "glucose",
            Self::Oxygen => "oxygen",
        }
    }
}

/// Dense row-major grid of values captured for a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotGrid<T> {
    bounds: GridBounds,
    cells: Vec<T>,
}

impl<T: Clone> SnapshotGrid<T> {
    /// Creates a grid covering `bounds` with every cell set to `value`.
    #[must_use]
    pub fn filled(bounds: GridBounds, value: T) -> Self {
        Self {
            bounds,
            cells: vec![value; bounds.cell_count()],
        }
    }

    /// Creates a grid from row-major values, truncating or padding with `fill` to fit `bounds`.
    #[must_use]
    pub fn from_values(bounds: GridBounds, values: &[T], fill: T) -> Self {
        let mut cells: Vec<T> = values.iter().take(bounds.cell_count()).cloned().collect();
        cells.resize(bounds.cell_count(), fill);
        Self { bounds, cells }
    }
}

impl<T> SnapshotGrid<T> {
    /// Dimensions of the grid.
    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Value stored at the coordinate, if it lies inside the grid.
    #[must_use]
    pub fn get(&self, cell: GridCoord) -> Option<&T> {
        self.bounds.index(cell).and_then(|index| self.cells.get(index))
    }

    /// Mutable access to the value stored at the coordinate.
    pub fn get_mut(&mut self, cell: GridCoord) -> Option<&mut T> {
        let index = self.bounds.index(cell)?;
        self.cells.get_mut(index)
    }

    /// Iterator over `(coordinate, value)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, &T)> {
        self.bounds.iter().zip(self.cells.iter())
    }
}

impl SnapshotGrid<u32> {
    /// Sum of every occupancy count in the grid.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.cells.iter().map(|count| u64::from(*count)).sum()
    }
}

/// Structured metric published by the simulation once per step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MetricEvent {
    /// Single scalar value of a named series.
    Scalar {
        /// Series the value belongs to.
        metric: ScalarMetric,
        /// Step the value describes.
        step: StepIndex,
        /// Observed value.
        value: f64,
    },
    /// Integer occupancy counts for agent positions.
    Occupancy {
        /// Snapshot the grid belongs to.
        metric: SnapshotMetric,
        /// Step the grid describes.
        step: StepIndex,
        /// Number of agents per grid cell.
        grid: SnapshotGrid<u32>,
    },
    /// Raw material quantities.
    Material {
        /// Snapshot the grid belongs to.
        metric: SnapshotMetric,
        /// Step the grid describes.
        step: StepIndex,
        /// Quantity per grid cell.
        grid: SnapshotGrid<f64>,
    },
}

impl MetricEvent {
    /// Step the metric describes.
    #[must_use]
    pub const fn step(&self) -> StepIndex {
        match self {
            Self::Scalar { step, .. }
            | Self::Occupancy { step, .. }
            | Self::Material { step, .. } => *step,
        }
    }
}

/// Consumer of metric events; responsible for any persistence or display.
pub trait MetricsSink {
    /// Receives a single metric event.
    fn record(&mut self, event: &MetricEvent);
}

impl MetricsSink for Vec<MetricEvent> {
    fn record(&mut self, event: &MetricEvent) {
        self.push(event.clone());
    }
}
