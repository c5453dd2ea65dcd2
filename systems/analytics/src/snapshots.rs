use tumor_immune_core::{
    GridCoord, MaterialFieldView, MetricEvent, Phenotype, SnapshotGrid, SnapshotMetric, StepIndex,
};

use crate::StepViews;

/// Appends occupancy and material grids describing the world after `step`.
pub(crate) fn publish(step: StepIndex, views: StepViews<'_>, out: &mut Vec<MetricEvent>) {
    let bounds = views.glucose.bounds();
    let mut cells = SnapshotGrid::filled(bounds, 0_u32);
    let mut normal = SnapshotGrid::filled(bounds, 0_u32);
    let mut cancer = SnapshotGrid::filled(bounds, 0_u32);
    let mut immune = SnapshotGrid::filled(bounds, 0_u32);

    for cell in views.cells.iter() {
        increment(&mut cells, cell.cell);
        match cell.phenotype {
            Phenotype::Normal => increment(&mut normal, cell.cell),
            Phenotype::Cancer => increment(&mut cancer, cell.cell),
        }
    }
    for agent in views.immune.iter() {
        increment(&mut immune, agent.cell);
    }

    for (metric, grid) in [
        (SnapshotMetric::Cells, cells),
        (SnapshotMetric::NormalCells, normal),
        (SnapshotMetric::CancerCells, cancer),
        (SnapshotMetric::ImmuneAgents, immune),
    ] {
        out.push(MetricEvent::Occupancy { metric, step, grid });
    }

    for (metric, view) in [
        (SnapshotMetric::Glucose, views.glucose),
        (SnapshotMetric::Oxygen, views.oxygen),
    ] {
        out.push(MetricEvent::Material {
            metric,
            step,
            grid: material_grid(view),
        });
    }
}

fn increment(grid: &mut SnapshotGrid<u32>, cell: GridCoord) {
    if let Some(count) = grid.get_mut(cell) {
        *count += 1;
    }
}

fn material_grid(view: MaterialFieldView<'_>) -> SnapshotGrid<f64> {
    SnapshotGrid::from_values(view.bounds(), view.values(), 0.0)
}
