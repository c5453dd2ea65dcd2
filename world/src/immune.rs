//! Immune agents and the per-step spatial index used to find them.

use tumor_immune_core::{GridBounds, GridCoord, ImmuneAgentSnapshot};

use crate::{cell::wander, GeneticCode, RandomSource};

/// T-cell patrolling the grid with a receptor gene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImmuneAgent {
    position: GridCoord,
    age: u32,
    gene: GeneticCode,
}

impl ImmuneAgent {
    /// Creates an agent of the given age.
    #[must_use]
    pub fn new(position: GridCoord, age: u32, gene: GeneticCode) -> Self {
        Self {
            position,
            age,
            gene,
        }
    }

    /// Grid cell currently occupied.
    #[must_use]
    pub const fn position(&self) -> GridCoord {
        self.position
    }

    /// Steps survived so far.
    #[must_use]
    pub const fn age(&self) -> u32 {
        self.age
    }

    /// Receptor gene compared against cancer cell genes.
    #[must_use]
    pub const fn gene(&self) -> &GeneticCode {
        &self.gene
    }

    /// Takes a random step of at most one unit per axis; movement is free.
    pub fn move_within(&mut self, bounds: GridBounds, random: &mut RandomSource) -> u32 {
        let (destination, distance) = wander(self.position, bounds, random);
        self.position = destination;
        distance
    }

    /// Ages the agent by one step.
    pub fn tick(&mut self) {
        self.age = self.age.saturating_add(1);
    }

    /// Reports whether the agent reached `lifespan`.
    #[must_use]
    pub const fn expired(&self, lifespan: u32) -> bool {
        self.age >= lifespan
    }

    /// Newborn copy of this receptor lineage at the same position.
    #[must_use]
    pub fn clone_lineage(&self) -> Self {
        Self::new(self.position, 0, self.gene.clone())
    }

    /// Immutable snapshot for read-only views.
    #[must_use]
    pub fn snapshot(&self) -> ImmuneAgentSnapshot {
        ImmuneAgentSnapshot {
            cell: self.position,
            age: self.age,
        }
    }
}

/// Lookup from grid cell to the immune agents standing on it.
///
/// Entries are indices into the immune population at the time of the last
/// [`ImmuneIndex::rebuild`], so the index is only valid until that population
/// is next modified.
#[derive(Clone, Debug, Default)]
pub struct ImmuneIndex {
    bounds: Option<GridBounds>,
    buckets: Vec<Vec<usize>>,
}

impl ImmuneIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards every entry and records the current position of each agent.
    pub fn rebuild(&mut self, bounds: GridBounds, agents: &[ImmuneAgent]) {
        if self.bounds != Some(bounds) {
            self.bounds = Some(bounds);
            self.buckets = vec![Vec::new(); bounds.cell_count()];
        } else {
            for bucket in &mut self.buckets {
                bucket.clear();
            }
        }

        for (index, agent) in agents.iter().enumerate() {
            if let Some(slot) = bounds.index(agent.position()) {
                if let Some(bucket) = self.buckets.get_mut(slot) {
                    bucket.push(index);
                }
            }
        }
    }

    /// Indices of the agents recorded at the coordinate, in population order.
    #[must_use]
    pub fn agents_at(&self, cell: GridCoord) -> &[usize] {
        let bucket = self
            .bounds
            .and_then(|bounds| bounds.index(cell))
            .and_then(|slot| self.buckets.get(slot));
        match bucket {
            Some(bucket) => bucket.as_slice(),
            None => &[],
        }
    }

    /// Number of agents recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// Reports whether no agent is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }
}
