#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the tumor–immune simulation.
//!
//! The world owns both material fields, both populations and the random
//! source. Every mutation flows through [`apply`], which runs the phases of a
//! step in their fixed order and reports what happened as
//! [`tumor_immune_core::Event`] values. The phase methods are public so that
//! individual phases can be exercised in isolation.

mod cell;
mod field;
mod gene;
mod immune;
mod random;

pub use cell::Cell;
pub use field::MaterialField;
pub use gene::GeneticCode;
pub use immune::{ImmuneAgent, ImmuneIndex};
pub use random::{RandomSource, DEFAULT_SEED};

use tracing::trace;
use tumor_immune_core::{
    CellConfig, Command, Event, GridBounds, GridCoord, ImmuneConfig, Phenotype, SimulationConfig,
};

/// Divisions performed during one division phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DivisionTally {
    /// Divisions whose parent had the normal phenotype.
    pub normal: usize,
    /// Divisions whose parent had the cancer phenotype.
    pub cancer: usize,
    /// Newborns whose copied gene mutated.
    pub mutations: usize,
}

impl DivisionTally {
    /// Total number of newborn cells.
    #[must_use]
    pub const fn births(&self) -> usize {
        self.normal + self.cancer
    }
}

/// Immune agents merged into the population at the end of a step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImmuneRenewal {
    /// Clones produced by successful recognitions.
    pub cloned: usize,
    /// Fresh random agents created to reach the target population.
    pub replenished: usize,
}

/// Represents the authoritative simulation state.
#[derive(Debug)]
pub struct World {
    bounds: GridBounds,
    glucose: MaterialField,
    oxygen: MaterialField,
    gene_length: usize,
    cells: Vec<Cell>,
    immune_agents: Vec<ImmuneAgent>,
    immune_index: ImmuneIndex,
    pending_clones: Vec<ImmuneAgent>,
    random: RandomSource,
}

impl World {
    /// Creates a world with seeded material fields and empty populations.
    #[must_use]
    pub fn new(config: &SimulationConfig, random: RandomSource) -> Self {
        let bounds = config.grid.bounds();
        Self {
            bounds,
            glucose: MaterialField::from_config(bounds, &config.glucose),
            oxygen: MaterialField::from_config(bounds, &config.oxygen),
            gene_length: config.genes.length,
            cells: Vec::new(),
            immune_agents: Vec::new(),
            immune_index: ImmuneIndex::new(),
            pending_clones: Vec::new(),
            random,
        }
    }

    /// Appends a cell to the population.
    pub fn insert_cell(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    /// Appends an immune agent to the population.
    pub fn insert_immune_agent(&mut self, agent: ImmuneAgent) {
        self.immune_agents.push(agent);
    }

    /// Mutable access to the glucose field.
    pub fn glucose_mut(&mut self) -> &mut MaterialField {
        &mut self.glucose
    }

    /// Mutable access to the oxygen field.
    pub fn oxygen_mut(&mut self) -> &mut MaterialField {
        &mut self.oxygen
    }

    /// Moves every cell, then every immune agent.
    pub fn move_agents(&mut self, config: &CellConfig) {
        for cell in &mut self.cells {
            let _ = cell.move_within(self.bounds, &mut self.random, config.motility_weight);
        }
        for agent in &mut self.immune_agents {
            let _ = agent.move_within(self.bounds, &mut self.random);
        }
    }

    /// Records the current immune agent positions for this step's clearance.
    pub fn rebuild_immune_index(&mut self) {
        self.immune_index.rebuild(self.bounds, &self.immune_agents);
    }

    /// Divides every eligible cell and appends the newborns after the existing population.
    ///
    /// Newborns are collected separately and merged once every existing cell
    /// was visited, so no newborn divides in the step it was born.
    pub fn divide_cells(&mut self, config: &CellConfig) -> DivisionTally {
        let mut tally = DivisionTally::default();
        let mut births = Vec::new();

        for cell in &mut self.cells {
            if !cell.will_divide(&mut self.random, config) || !cell.can_afford_division(config) {
                continue;
            }
            match cell.phenotype() {
                Phenotype::Normal => tally.normal += 1,
                Phenotype::Cancer => tally.cancer += 1,
            }
            let (child, mutated) = cell.divide(&mut self.random, config.mutation_rate);
            if mutated {
                tally.mutations += 1;
            }
            births.push(child);
        }

        self.cells.append(&mut births);
        tally
    }

    /// Lets every cell attempt one metabolic reaction; returns how many gained energy.
    pub fn metabolize_cells(&mut self, config: &CellConfig) -> usize {
        let mut fed = 0;
        for cell in &mut self.cells {
            if cell.metabolize(&mut self.glucose, &mut self.oxygen, &mut self.random, config) {
                fed += 1;
            }
        }
        fed
    }

    /// Removes dead cells, preserving the order of survivors; returns how many died.
    pub fn remove_dead_cells(&mut self, config: &CellConfig) -> usize {
        let before = self.cells.len();
        self.cells.retain(|cell| !cell.will_die(config));
        before - self.cells.len()
    }

    /// Rolls a somatic mutation for every cell; returns how many genes changed.
    pub fn mutate_cells(&mut self, config: &CellConfig) -> usize {
        if config.somatic_mutation_rate <= 0.0 {
            return 0;
        }
        let mut mutated = 0;
        for cell in &mut self.cells {
            if cell.mutate(config.somatic_mutation_rate, &mut self.random) {
                mutated += 1;
            }
        }
        mutated
    }

    /// Lets co-located immune agents eliminate recognized cancer cells.
    ///
    /// For each cancer cell the agents recorded at its position are tried in
    /// order; the first one that both wins the immunogenicity roll and carries
    /// an identical gene removes the cell and queues a clone of itself. Returns
    /// the number of cells removed.
    pub fn clear_recognized_cancer(&mut self) -> usize {
        let random = &mut self.random;
        let index = &self.immune_index;
        let agents = &self.immune_agents;
        let clones = &mut self.pending_clones;
        let before = self.cells.len();

        self.cells.retain(|cell| {
            if !cell.is_cancer() {
                return true;
            }
            for &agent_index in index.agents_at(cell.position()) {
                let Some(agent) = agents.get(agent_index) else {
                    continue;
                };
                if random.probability(cell.immunogenicity()) && cell.gene().matches(agent.gene()) {
                    clones.push(agent.clone_lineage());
                    return false;
                }
            }
            true
        });

        before - self.cells.len()
    }

    /// Regenerates both material fields.
    pub fn regenerate_fields(&mut self) {
        self.glucose.regenerate();
        self.oxygen.regenerate();
    }

    /// Ages every immune agent and removes the expired ones; returns how many expired.
    pub fn age_immune_agents(&mut self, lifespan: u32) -> usize {
        for agent in &mut self.immune_agents {
            agent.tick();
        }
        let before = self.immune_agents.len();
        self.immune_agents.retain(|agent| !agent.expired(lifespan));
        before - self.immune_agents.len()
    }

    /// Merges pending clones, then tops the population up to the target with fresh agents.
    pub fn replenish_immune_agents(&mut self, config: &ImmuneConfig) -> ImmuneRenewal {
        let cloned = self.pending_clones.len();
        self.immune_agents.append(&mut self.pending_clones);

        let replenished = config.target_count.saturating_sub(self.immune_agents.len());
        for _ in 0..replenished {
            let agent = self.fresh_immune_agent(0);
            self.immune_agents.push(agent);
        }

        ImmuneRenewal {
            cloned,
            replenished,
        }
    }

    fn populate(&mut self, config: &SimulationConfig) -> (usize, usize) {
        let cells = &config.cells;
        for _ in 0..cells.initial_count {
            let position = self.random_position();
            self.cells.push(Cell::new(
                position,
                cells.initial_energy,
                GeneticCode::zeroed(self.gene_length),
            ));
        }
        for _ in 0..cells.initial_cancer_count {
            let position = self.random_position();
            let mut gene = GeneticCode::zeroed(self.gene_length);
            let _ = gene.mutate(100.0, &mut self.random);
            self.cells.push(Cell::new(position, cells.initial_energy, gene));
        }

        let immune = &config.immune;
        for _ in 0..immune.initial_count {
            let age = if immune.randomize_initial_age {
                let oldest = i64::from(immune.lifespan.saturating_sub(1));
                u32::try_from(self.random.uniform_int(0, oldest)).unwrap_or(0)
            } else {
                0
            };
            let agent = self.fresh_immune_agent(age);
            self.immune_agents.push(agent);
        }

        (
            cells.initial_count + cells.initial_cancer_count,
            immune.initial_count,
        )
    }

    fn fresh_immune_agent(&mut self, age: u32) -> ImmuneAgent {
        let position = self.random_position();
        let gene = GeneticCode::random(self.gene_length, &mut self.random);
        ImmuneAgent::new(position, age, gene)
    }

    fn random_position(&mut self) -> GridCoord {
        let column = self
            .random
            .uniform_int(0, i64::from(self.bounds.width()) - 1);
        let row = self
            .random
            .uniform_int(0, i64::from(self.bounds.height()) - 1);
        GridCoord::new(
            u32::try_from(column).unwrap_or(0),
            u32::try_from(row).unwrap_or(0),
        )
    }

    fn step(&mut self, config: &SimulationConfig, out_events: &mut Vec<Event>) {
        self.move_agents(&config.cells);
        self.rebuild_immune_index();

        let divisions = self.divide_cells(&config.cells);
        out_events.push(Event::CellsDivided {
            normal: divisions.normal,
            cancer: divisions.cancer,
        });

        let fed = self.metabolize_cells(&config.cells);
        let died = self.remove_dead_cells(&config.cells);
        out_events.push(Event::CellsDied { count: died });

        let somatic = self.mutate_cells(&config.cells);
        out_events.push(Event::CellsMutated {
            count: divisions.mutations + somatic,
        });

        let cleared = self.clear_recognized_cancer();
        out_events.push(Event::CancerCellsCleared { count: cleared });

        self.regenerate_fields();

        let expired = self.age_immune_agents(config.immune.lifespan);
        out_events.push(Event::ImmuneAgentsExpired { count: expired });

        let renewal = self.replenish_immune_agents(&config.immune);
        out_events.push(Event::ImmuneAgentsCloned {
            count: renewal.cloned,
        });
        out_events.push(Event::ImmuneAgentsReplenished {
            count: renewal.replenished,
        });

        trace!(
            births = divisions.births(),
            fed,
            died,
            cleared,
            expired,
            cells = self.cells.len(),
            immune_agents = self.immune_agents.len(),
            "step phases completed"
        );
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(
    world: &mut World,
    config: &SimulationConfig,
    command: Command,
    out_events: &mut Vec<Event>,
) {
    match command {
        Command::Populate => {
            let (cells, immune_agents) = world.populate(config);
            out_events.push(Event::PopulationSeeded {
                cells,
                immune_agents,
            });
        }
        Command::Step { step } => {
            out_events.push(Event::StepStarted { step });
            world.step(config, out_events);
            out_events.push(Event::StepCompleted { step });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tumor_immune_core::{CellView, GridBounds, ImmuneView, MaterialFieldView};

    use super::{Cell, ImmuneAgent, ImmuneIndex, MaterialField, World};

    /// Dimensions of the tissue grid.
    #[must_use]
    pub fn bounds(world: &World) -> GridBounds {
        world.bounds
    }

    /// Tissue cells in population order.
    #[must_use]
    pub fn cells(world: &World) -> &[Cell] {
        &world.cells
    }

    /// Immune agents in population order.
    #[must_use]
    pub fn immune_agents(world: &World) -> &[ImmuneAgent] {
        &world.immune_agents
    }

    /// Spatial index built during the most recent step.
    #[must_use]
    pub fn immune_index(world: &World) -> &ImmuneIndex {
        &world.immune_index
    }

    /// Glucose field.
    #[must_use]
    pub fn glucose(world: &World) -> &MaterialField {
        &world.glucose
    }

    /// Oxygen field.
    #[must_use]
    pub fn oxygen(world: &World) -> &MaterialField {
        &world.oxygen
    }

    /// Captures a read-only view of the tissue cells.
    #[must_use]
    pub fn cell_view(world: &World) -> CellView {
        CellView::from_snapshots(world.cells.iter().map(Cell::snapshot).collect())
    }

    /// Captures a read-only view of the immune agents.
    #[must_use]
    pub fn immune_view(world: &World) -> ImmuneView {
        ImmuneView::from_snapshots(
            world
                .immune_agents
                .iter()
                .map(ImmuneAgent::snapshot)
                .collect(),
        )
    }

    /// Exposes a read-only view of the glucose quantities.
    #[must_use]
    pub fn glucose_view(world: &World) -> MaterialFieldView<'_> {
        world.glucose.view()
    }

    /// Exposes a read-only view of the oxygen quantities.
    #[must_use]
    pub fn oxygen_view(world: &World) -> MaterialFieldView<'_> {
        world.oxygen.view()
    }
}
