#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation driver that owns the world, the step counter and analytics.

use tracing::{debug, info};
use tumor_immune_core::{Command, Event, MetricEvent, MetricsSink, SimulationConfig, StepIndex};
use tumor_immune_system_analytics::{Analytics, StepViews};
use tumor_immune_world::{self as world, RandomSource, DEFAULT_SEED};

pub use tumor_immune_world::{query, World};

/// Runs the tumor–immune simulation one step at a time.
///
/// The configuration is borrowed for the lifetime of the engine and is
/// expected to have passed [`SimulationConfig::validate`].
#[derive(Debug)]
pub struct SimulationEngine<'a> {
    config: &'a SimulationConfig,
    world: World,
    analytics: Analytics,
    step: StepIndex,
    events: Vec<Event>,
    metrics: Vec<MetricEvent>,
}

impl<'a> SimulationEngine<'a> {
    /// Creates an engine seeded from the configuration, or the default seed when it names none.
    #[must_use]
    pub fn new(config: &'a SimulationConfig) -> Self {
        Self::with_seed(config, config.run.rng_seed.unwrap_or(DEFAULT_SEED))
    }

    /// Creates an engine with an explicit seed and populates the world.
    #[must_use]
    pub fn with_seed(config: &'a SimulationConfig, seed: u64) -> Self {
        let mut world = World::new(config, RandomSource::seeded(seed));
        let mut events = Vec::new();
        world::apply(&mut world, config, Command::Populate, &mut events);

        for event in &events {
            if let Event::PopulationSeeded {
                cells,
                immune_agents,
            } = event
            {
                info!(
                    seed,
                    cells = *cells,
                    immune_agents = *immune_agents,
                    width = config.grid.width,
                    height = config.grid.height,
                    "population seeded"
                );
            }
        }
        events.clear();

        Self {
            config,
            world,
            analytics: Analytics::new(config.run.snapshot_interval),
            step: StepIndex::default(),
            events,
            metrics: Vec::new(),
        }
    }

    /// Current world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Number of steps completed so far.
    #[must_use]
    pub const fn current_step(&self) -> StepIndex {
        self.step
    }

    /// Reports whether the configured number of steps has been simulated.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.step.get() >= self.config.run.max_steps
    }

    /// Simulates one step and records its metrics into `sink`.
    ///
    /// Returns `false` without touching the world once the run is finished.
    pub fn step(&mut self, sink: &mut dyn MetricsSink) -> bool {
        if self.is_finished() {
            return false;
        }

        let step = self.step.next();
        self.events.clear();
        world::apply(
            &mut self.world,
            self.config,
            Command::Step { step },
            &mut self.events,
        );

        let cells = query::cell_view(&self.world);
        let immune = query::immune_view(&self.world);
        let views = StepViews {
            cells: &cells,
            immune: &immune,
            glucose: query::glucose_view(&self.world),
            oxygen: query::oxygen_view(&self.world),
        };
        self.metrics.clear();
        self.analytics.handle(&self.events, views, &mut self.metrics);
        for metric in &self.metrics {
            sink.record(metric);
        }

        debug!(
            step = step.get(),
            cells = cells.len(),
            immune_agents = immune.len(),
            "step completed"
        );
        self.step = step;
        true
    }

    /// Simulates every remaining step; returns the last completed step.
    pub fn run(&mut self, sink: &mut dyn MetricsSink) -> StepIndex {
        info!(
            max_steps = self.config.run.max_steps,
            snapshot_interval = self.analytics.snapshot_interval(),
            "simulation started"
        );
        while self.step(sink) {}
        info!(
            steps = self.step.get(),
            cells = query::cells(&self.world).len(),
            immune_agents = query::immune_agents(&self.world).len(),
            "simulation finished"
        );
        self.step
    }
}
