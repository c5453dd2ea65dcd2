use tumor_immune_core::{
    CellSnapshot, CellView, Command, Event, GridBounds, GridCoord, ImmuneAgentSnapshot,
    ImmuneView, MaterialFieldView, MetricEvent, Phenotype, ScalarMetric, SimulationConfig,
    SnapshotMetric, StepIndex,
};
use tumor_immune_system_analytics::{Analytics, StepViews};
use tumor_immune_world::{self as world, query, Cell, GeneticCode, ImmuneAgent, RandomSource, World};

fn cell(column: u32, row: u32, energy: f64, phenotype: Phenotype, mutant: bool) -> CellSnapshot {
    CellSnapshot {
        cell: GridCoord::new(column, row),
        energy,
        division_count: 0,
        phenotype,
        mutant,
    }
}

fn scalar(events: &[MetricEvent], wanted: ScalarMetric) -> f64 {
    events
        .iter()
        .find_map(|event| match event {
            MetricEvent::Scalar { metric, value, .. } if *metric == wanted => Some(*value),
            _ => None,
        })
        .unwrap_or_else(|| panic!("missing scalar {}", wanted.as_str()))
}

fn step_events(step: StepIndex) -> Vec<Event> {
    vec![
        Event::StepStarted { step },
        Event::CellsDivided {
            normal: 2,
            cancer: 1,
        },
        Event::CellsDied { count: 4 },
        Event::CellsMutated { count: 1 },
        Event::CancerCellsCleared { count: 1 },
        Event::ImmuneAgentsExpired { count: 3 },
        Event::ImmuneAgentsCloned { count: 1 },
        Event::ImmuneAgentsReplenished { count: 2 },
        Event::StepCompleted { step },
    ]
}

#[test]
fn scalars_follow_events_and_views() {
    let bounds = GridBounds::new(3, 2);
    let quantities = vec![1.0; bounds.cell_count()];
    let cells = CellView::from_snapshots(vec![
        cell(0, 0, 10.0, Phenotype::Normal, false),
        cell(1, 0, 20.0, Phenotype::Normal, false),
        cell(2, 1, 3.0, Phenotype::Cancer, true),
        cell(2, 1, 5.0, Phenotype::Cancer, false),
    ]);
    let immune = ImmuneView::from_snapshots(vec![ImmuneAgentSnapshot {
        cell: GridCoord::new(1, 1),
        age: 0,
    }]);
    let views = StepViews {
        cells: &cells,
        immune: &immune,
        glucose: MaterialFieldView::new(&quantities, bounds),
        oxygen: MaterialFieldView::new(&quantities, bounds),
    };

    let mut analytics = Analytics::new(0);
    let mut out = Vec::new();
    analytics.handle(&step_events(StepIndex::new(1)), views, &mut out);

    assert_eq!(out.len(), ScalarMetric::ALL.len(), "snapshots are disabled");
    assert_eq!(scalar(&out, ScalarMetric::NormalCells), 2.0);
    assert_eq!(scalar(&out, ScalarMetric::CancerCells), 2.0);
    assert_eq!(scalar(&out, ScalarMetric::MutantCancerCells), 1.0);
    assert_eq!(scalar(&out, ScalarMetric::StandardCancerCells), 1.0);
    assert_eq!(scalar(&out, ScalarMetric::AverageEnergy), 9.5);
    assert_eq!(scalar(&out, ScalarMetric::AverageNormalEnergy), 15.0);
    assert_eq!(scalar(&out, ScalarMetric::AverageCancerEnergy), 4.0);
    assert_eq!(scalar(&out, ScalarMetric::NormalDivisions), 2.0);
    assert_eq!(scalar(&out, ScalarMetric::CancerDivisions), 1.0);
    assert_eq!(scalar(&out, ScalarMetric::Mutations), 1.0);
    assert_eq!(scalar(&out, ScalarMetric::DeadCells), 4.0);
    assert_eq!(scalar(&out, ScalarMetric::ImmuneClearedCells), 1.0);
    assert_eq!(scalar(&out, ScalarMetric::ImmunePopulation), 1.0);
    assert_eq!(scalar(&out, ScalarMetric::ImmuneReplenished), 2.0);
    assert_eq!(scalar(&out, ScalarMetric::ImmuneExpired), 3.0);
    assert!(out.iter().all(|event| event.step() == StepIndex::new(1)));
}

#[test]
fn averages_are_zero_for_empty_populations() {
    let bounds = GridBounds::new(2, 2);
    let quantities = vec![0.0; bounds.cell_count()];
    let cells = CellView::default();
    let immune = ImmuneView::default();
    let views = StepViews {
        cells: &cells,
        immune: &immune,
        glucose: MaterialFieldView::new(&quantities, bounds),
        oxygen: MaterialFieldView::new(&quantities, bounds),
    };

    let mut analytics = Analytics::new(0);
    let mut out = Vec::new();
    let step = StepIndex::new(4);
    analytics.handle(
        &[Event::StepStarted { step }, Event::StepCompleted { step }],
        views,
        &mut out,
    );

    for metric in [
        ScalarMetric::AverageEnergy,
        ScalarMetric::AverageNormalEnergy,
        ScalarMetric::AverageCancerEnergy,
        ScalarMetric::Mutations,
    ] {
        assert_eq!(scalar(&out, metric), 0.0, "{} should be zero", metric.as_str());
    }
}

#[test]
fn tallies_reset_between_steps() {
    let bounds = GridBounds::new(1, 1);
    let quantities = vec![0.0];
    let cells = CellView::default();
    let immune = ImmuneView::default();
    let views = StepViews {
        cells: &cells,
        immune: &immune,
        glucose: MaterialFieldView::new(&quantities, bounds),
        oxygen: MaterialFieldView::new(&quantities, bounds),
    };

    let mut analytics = Analytics::new(0);
    let mut out = Vec::new();
    analytics.handle(&step_events(StepIndex::new(1)), views, &mut out);
    out.clear();

    let step = StepIndex::new(2);
    analytics.handle(
        &[Event::StepStarted { step }, Event::StepCompleted { step }],
        views,
        &mut out,
    );
    assert_eq!(scalar(&out, ScalarMetric::DeadCells), 0.0);
    assert_eq!(scalar(&out, ScalarMetric::NormalDivisions), 0.0);
}

#[test]
fn snapshots_follow_the_interval() {
    let mut config = SimulationConfig::default();
    config.grid.width = 5;
    config.grid.height = 4;
    config.cells.initial_count = 10;
    config.cells.initial_cancer_count = 2;
    config.immune.initial_count = 3;
    config.immune.target_count = 3;
    let mut world = World::new(&config, RandomSource::seeded(3));
    let mut events = Vec::new();
    world::apply(&mut world, &config, Command::Populate, &mut events);

    let mut analytics = Analytics::new(2);
    let mut snapshot_steps = Vec::new();
    for index in 1..=4 {
        events.clear();
        let step = StepIndex::new(index);
        world::apply(&mut world, &config, Command::Step { step }, &mut events);

        let cells = query::cell_view(&world);
        let immune = query::immune_view(&world);
        let views = StepViews {
            cells: &cells,
            immune: &immune,
            glucose: query::glucose_view(&world),
            oxygen: query::oxygen_view(&world),
        };
        let mut out = Vec::new();
        analytics.handle(&events, views, &mut out);

        for event in &out {
            match event {
                MetricEvent::Occupancy { metric, grid, .. } => {
                    snapshot_steps.push(index);
                    let expected = match metric {
                        SnapshotMetric::Cells => cells.len(),
                        SnapshotMetric::NormalCells => {
                            cells.iter().filter(|c| c.phenotype == Phenotype::Normal).count()
                        }
                        SnapshotMetric::CancerCells => {
                            cells.iter().filter(|c| c.phenotype == Phenotype::Cancer).count()
                        }
                        SnapshotMetric::ImmuneAgents => immune.len(),
                        other => panic!("unexpected occupancy snapshot {other:?}"),
                    };
                    assert_eq!(grid.total(), expected as u64);
                }
                MetricEvent::Material { metric, grid, .. } => {
                    let view = match metric {
                        SnapshotMetric::Glucose => query::glucose_view(&world),
                        SnapshotMetric::Oxygen => query::oxygen_view(&world),
                        other => panic!("unexpected material snapshot {other:?}"),
                    };
                    for (coord, value) in grid.iter() {
                        assert_eq!(Some(*value), view.quantity(coord));
                    }
                }
                MetricEvent::Scalar { .. } => {}
            }
        }
    }

    snapshot_steps.dedup();
    assert_eq!(snapshot_steps, vec![2, 4]);
}

#[test]
fn recognized_cancer_cell_is_reported_as_cleared() {
    let mut config = SimulationConfig::default();
    config.grid.width = 1;
    config.grid.height = 1;
    config.cells.initial_count = 0;
    config.immune.initial_count = 0;
    config.immune.target_count = 1;
    let mut world = World::new(&config, RandomSource::seeded(8));
    let spot = GridCoord::new(0, 0);
    world.insert_cell(Cell::new(spot, 20.0, GeneticCode::saturated(config.genes.length)));
    world.insert_immune_agent(ImmuneAgent::new(
        spot,
        0,
        GeneticCode::saturated(config.genes.length),
    ));

    let step = StepIndex::new(1);
    let mut events = Vec::new();
    world::apply(&mut world, &config, Command::Step { step }, &mut events);
    assert!(events.contains(&Event::CancerCellsCleared { count: 1 }));

    let cells = query::cell_view(&world);
    let immune = query::immune_view(&world);
    let views = StepViews {
        cells: &cells,
        immune: &immune,
        glucose: query::glucose_view(&world),
        oxygen: query::oxygen_view(&world),
    };
    let mut analytics = Analytics::new(0);
    assert_eq!(analytics.snapshot_interval(), 0);
    let mut out = Vec::new();
    analytics.handle(&events, views, &mut out);

    assert_eq!(scalar(&out, ScalarMetric::ImmuneClearedCells), 1.0);
    assert_eq!(scalar(&out, ScalarMetric::CancerCells), 0.0);
    assert_eq!(scalar(&out, ScalarMetric::ImmunePopulation), 2.0);
    assert_eq!(scalar(&out, ScalarMetric::ImmuneReplenished), 0.0);
}
