//! Tissue cells: positioned, energy-bearing agents whose phenotype follows their gene.

use tumor_immune_core::{CellConfig, CellSnapshot, GridBounds, GridCoord, Phenotype};

use crate::{GeneticCode, MaterialField, RandomSource};

/// Tissue cell competing for glucose and oxygen.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    position: GridCoord,
    energy: f64,
    division_count: u32,
    gene: GeneticCode,
}

impl Cell {
    /// Creates a cell that has never divided.
    #[must_use]
    pub fn new(position: GridCoord, energy: f64, gene: GeneticCode) -> Self {
        Self {
            position,
            energy,
            division_count: 0,
            gene,
        }
    }

    /// Grid cell currently occupied.
    #[must_use]
    pub const fn position(&self) -> GridCoord {
        self.position
    }

    /// Current energy; negative values are valid until the death check.
    #[must_use]
    pub const fn energy(&self) -> f64 {
        self.energy
    }

    /// Number of divisions performed.
    #[must_use]
    pub const fn division_count(&self) -> u32 {
        self.division_count
    }

    /// Genetic code carried by the cell.
    #[must_use]
    pub const fn gene(&self) -> &GeneticCode {
        &self.gene
    }

    /// Phenotype derived from the gene value.
    #[must_use]
    pub fn phenotype(&self) -> Phenotype {
        Phenotype::from_gene_value(self.gene.value())
    }

    /// Reports whether the gene carries no mutation.
    #[must_use]
    pub fn is_normal(&self) -> bool {
        self.phenotype() == Phenotype::Normal
    }

    /// Reports whether the gene carries at least one mutation.
    #[must_use]
    pub fn is_cancer(&self) -> bool {
        self.phenotype() == Phenotype::Cancer
    }

    /// Elimination probability used during immune recognition.
    #[must_use]
    pub fn immunogenicity(&self) -> f64 {
        self.gene.immunogenicity()
    }

    /// Takes a random step of at most one unit per axis and pays for the distance moved.
    ///
    /// Returns the Manhattan distance travelled; a step leaving the grid is
    /// rejected and costs nothing.
    pub fn move_within(
        &mut self,
        bounds: GridBounds,
        random: &mut RandomSource,
        motility_weight: f64,
    ) -> u32 {
        let (destination, distance) = wander(self.position, bounds, random);
        self.position = destination;
        self.energy -= f64::from(distance) * motility_weight;
        distance
    }

    /// Attempts one metabolic reaction at the current position.
    ///
    /// Normal cells burn glucose with oxygen; cancer cells burn a fixed amount
    /// of glucose alone for a smaller reward. Returns whether energy was gained.
    pub fn metabolize(
        &mut self,
        glucose: &mut MaterialField,
        oxygen: &mut MaterialField,
        random: &mut RandomSource,
        config: &CellConfig,
    ) -> bool {
        let gained = match self.phenotype() {
            Phenotype::Normal => {
                random.probability(config.normal_metabolize_probability)
                    && MaterialField::consume_jointly(
                        glucose,
                        config.normal_glucose_use,
                        oxygen,
                        config.normal_oxygen_use,
                        self.position,
                    )
            }
            Phenotype::Cancer => {
                random.probability(config.cancer_metabolize_probability)
                    && glucose.consume(self.position, config.cancer_glucose_use)
            }
        };
        if gained {
            self.energy += match self.phenotype() {
                Phenotype::Normal => config.normal_energy_gain,
                Phenotype::Cancer => config.cancer_energy_gain,
            };
        }
        gained
    }

    /// Rolls the division probability of the phenotype.
    ///
    /// Normal cells are additionally barred once they reach the senescence
    /// cap; cancer cells are not. The energy threshold is checked by the caller.
    pub fn will_divide(&self, random: &mut RandomSource, config: &CellConfig) -> bool {
        match self.phenotype() {
            Phenotype::Cancer => random.probability(config.cancer_division_probability),
            Phenotype::Normal => {
                random.probability(config.normal_division_probability)
                    && self.division_count < config.max_division_count
            }
        }
    }

    /// Reports whether the cell holds enough energy to divide.
    #[must_use]
    pub fn can_afford_division(&self, config: &CellConfig) -> bool {
        self.energy > config.division_threshold_energy
    }

    /// Splits the cell in two at the same position.
    ///
    /// The child receives a copy of the gene mutated at `mutation_rate` and
    /// half of the energy; the parent keeps the other half and counts the
    /// division. Returns the child and whether its gene changed.
    pub fn divide(&mut self, random: &mut RandomSource, mutation_rate: f64) -> (Cell, bool) {
        let mut gene = self.gene.clone();
        let mutated = gene.mutate(mutation_rate, random);
        let half = self.energy / 2.0;
        self.energy = half;
        self.division_count = self.division_count.saturating_add(1);
        (Cell::new(self.position, half, gene), mutated)
    }

    /// Mutates the cell's own gene; returns whether a position flipped.
    pub fn mutate(&mut self, percent: f64, random: &mut RandomSource) -> bool {
        self.gene.mutate(percent, random)
    }

    /// Death predicate: energy exhausted, or senescence cap reached where it applies.
    #[must_use]
    pub fn will_die(&self, config: &CellConfig) -> bool {
        if self.energy <= config.death_threshold_energy {
            return true;
        }
        config.senescence_death.applies_to(self.phenotype())
            && self.division_count >= config.max_division_count
    }

    /// Immutable snapshot for read-only views.
    #[must_use]
    pub fn snapshot(&self) -> CellSnapshot {
        CellSnapshot {
            cell: self.position,
            energy: self.energy,
            division_count: self.division_count,
            phenotype: self.phenotype(),
            mutant: self.gene.is_mutant(),
        }
    }
}

/// Proposes a random step of at most one unit per axis and resolves it against the bounds.
pub(crate) fn wander(
    from: GridCoord,
    bounds: GridBounds,
    random: &mut RandomSource,
) -> (GridCoord, u32) {
    let delta_column = if random.coin_flip() { random.sign() } else { 0 };
    let delta_row = if random.coin_flip() { random.sign() } else { 0 };
    match bounds.offset(from, delta_column, delta_row) {
        Some(destination) => (destination, from.manhattan_distance(destination)),
        None => (from, 0),
    }
}
