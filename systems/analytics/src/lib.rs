#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic analytics system that turns world events into metric events.

mod snapshots;

use tumor_immune_core::{
    CellView, Event, ImmuneView, MaterialFieldView, MetricEvent, Phenotype, ScalarMetric,
    StepIndex,
};

/// Read-only state captured after a step finished.
#[derive(Clone, Copy, Debug)]
pub struct StepViews<'a> {
    /// Tissue cells in population order.
    pub cells: &'a CellView,
    /// Immune agents in population order.
    pub immune: &'a ImmuneView,
    /// Glucose quantities.
    pub glucose: MaterialFieldView<'a>,
    /// Oxygen quantities.
    pub oxygen: MaterialFieldView<'a>,
}

/// Pure analytics system publishing per-step scalars and periodic grid snapshots.
#[derive(Debug, Default)]
pub struct Analytics {
    snapshot_interval: u64,
    tally: StepTally,
}

impl Analytics {
    /// Creates an analytics system emitting snapshots every `snapshot_interval` steps.
    ///
    /// An interval of zero disables snapshots.
    #[must_use]
    pub fn new(snapshot_interval: u64) -> Self {
        Self {
            snapshot_interval,
            tally: StepTally::default(),
        }
    }

    /// Interval between grid snapshots.
    #[must_use]
    pub const fn snapshot_interval(&self) -> u64 {
        self.snapshot_interval
    }

    /// Consumes world events and publishes metrics for every completed step.
    ///
    /// Events of a step accumulate until `Event::StepCompleted` arrives; the
    /// views must describe the world as it stands after that step.
    pub fn handle(&mut self, events: &[Event], views: StepViews<'_>, out: &mut Vec<MetricEvent>) {
        for event in events {
            match *event {
                Event::StepStarted { .. } => self.tally = StepTally::default(),
                Event::CellsDivided { normal, cancer } => {
                    self.tally.normal_divisions += normal;
                    self.tally.cancer_divisions += cancer;
                }
                Event::CellsMutated { count } => self.tally.mutations += count,
                Event::CellsDied { count } => self.tally.dead += count,
                Event::CancerCellsCleared { count } => self.tally.cleared += count,
                Event::ImmuneAgentsExpired { count } => self.tally.expired += count,
                Event::ImmuneAgentsReplenished { count } => self.tally.replenished += count,
                Event::StepCompleted { step } => self.publish(step, views, out),
                Event::PopulationSeeded { .. } | Event::ImmuneAgentsCloned { .. } => {}
            }
        }
    }

    fn publish(&mut self, step: StepIndex, views: StepViews<'_>, out: &mut Vec<MetricEvent>) {
        let census = Census::gather(views.cells);
        let tally = std::mem::take(&mut self.tally);

        for metric in ScalarMetric::ALL {
            let value = match metric {
                ScalarMetric::NormalCells => census.normal as f64,
                ScalarMetric::CancerCells => census.cancer as f64,
                ScalarMetric::MutantCancerCells => census.mutant_cancer as f64,
                ScalarMetric::StandardCancerCells => (census.cancer - census.mutant_cancer) as f64,
                ScalarMetric::AverageEnergy => average(
                    census.normal_energy + census.cancer_energy,
                    census.normal + census.cancer,
                ),
                ScalarMetric::AverageNormalEnergy => average(census.normal_energy, census.normal),
                ScalarMetric::AverageCancerEnergy => average(census.cancer_energy, census.cancer),
                ScalarMetric::NormalDivisions => tally.normal_divisions as f64,
                ScalarMetric::CancerDivisions => tally.cancer_divisions as f64,
                ScalarMetric::Mutations => tally.mutations as f64,
                ScalarMetric::DeadCells => tally.dead as f64,
                ScalarMetric::ImmuneClearedCells => tally.cleared as f64,
                ScalarMetric::ImmunePopulation => views.immune.len() as f64,
                ScalarMetric::ImmuneReplenished => tally.replenished as f64,
                ScalarMetric::ImmuneExpired => tally.expired as f64,
            };
            out.push(MetricEvent::Scalar {
                metric,
                step,
                value,
            });
        }

        if step.is_interval(self.snapshot_interval) {
            snapshots::publish(step, views, out);
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct StepTally {
    normal_divisions: usize,
    cancer_divisions: usize,
    mutations: usize,
    dead: usize,
    cleared: usize,
    expired: usize,
    replenished: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Census {
    normal: usize,
    cancer: usize,
    mutant_cancer: usize,
    normal_energy: f64,
    cancer_energy: f64,
}

impl Census {
    fn gather(cells: &CellView) -> Self {
        let mut census = Self::default();
        for cell in cells.iter() {
            match cell.phenotype {
                Phenotype::Normal => {
                    census.normal += 1;
                    census.normal_energy += cell.energy;
                }
                Phenotype::Cancer => {
                    census.cancer += 1;
                    census.cancer_energy += cell.energy;
                    if cell.mutant {
                        census.mutant_cancer += 1;
                    }
                }
            }
        }
        census
    }
}

fn average(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::{average, Census};
    use tumor_immune_core::{CellSnapshot, CellView, GridCoord, Phenotype};

    fn snapshot(energy: f64, phenotype: Phenotype, mutant: bool) -> CellSnapshot {
        CellSnapshot {
            cell: GridCoord::new(0, 0),
            energy,
            division_count: 0,
            phenotype,
            mutant,
        }
    }

    #[test]
    fn average_of_nothing_is_zero() {
        assert_eq!(average(0.0, 0), 0.0);
        assert_eq!(average(9.0, 3), 3.0);
    }

    #[test]
    fn census_splits_by_phenotype() {
        let view = CellView::from_snapshots(vec![
            snapshot(10.0, Phenotype::Normal, false),
            snapshot(4.0, Phenotype::Cancer, true),
            snapshot(2.0, Phenotype::Cancer, false),
        ]);
        let census = Census::gather(&view);
        assert_eq!(census.normal, 1);
        assert_eq!(census.cancer, 2);
        assert_eq!(census.mutant_cancer, 1);
        assert_eq!(census.cancer_energy, 6.0);
    }
}
