//! Immutable configuration consumed by the engine and every phase.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{GridBounds, Phenotype};

/// Complete parameter set for a simulation run.
///
/// Every section implements [`Default`] and is deserialized with
/// `#[serde(default)]`, so partial configuration files only need to name the
/// values they change.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Tissue grid dimensions.
    pub grid: GridConfig,
    /// Glucose field seeding and regeneration.
    pub glucose: MaterialConfig,
    /// Oxygen field seeding and regeneration.
    pub oxygen: MaterialConfig,
    /// Genetic code parameters shared by cells and immune agents.
    pub genes: GeneConfig,
    /// Tissue cell rates and thresholds.
    pub cells: CellConfig,
    /// Immune population parameters.
    pub immune: ImmuneConfig,
    /// Run length, snapshot cadence and seeding.
    pub run: RunConfig,
}

impl SimulationConfig {
    /// Checks every value the engine relies on, reporting the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;
        self.glucose.validate(&GLUCOSE_FIELDS)?;
        self.oxygen.validate(&OXYGEN_FIELDS)?;
        self.genes.validate()?;
        self.cells.validate()?;
        self.immune.validate()
    }
}

/// Tissue grid dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
}

impl GridConfig {
    /// Bounds checker for the configured grid.
    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        GridBounds::new(self.width, self.height)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 30,
            height: 30,
        }
    }
}

/// Seeding and regeneration of one material field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    /// Quantity placed in every grid cell at startup.
    pub initial: f64,
    /// Upper bound of the quantity held by a grid cell.
    pub capacity: f64,
    /// Quantity added per step to every grid cell with room for it.
    pub regeneration: f64,
}

/// Qualified names of the values in one material section.
struct MaterialFieldNames {
    initial: &'static str,
    capacity: &'static str,
    regeneration: &'static str,
}

const GLUCOSE_FIELDS: MaterialFieldNames = MaterialFieldNames {
    initial: "glucose.initial",
    capacity: "glucose.capacity",
    regeneration: "glucose.regeneration",
};

const OXYGEN_FIELDS: MaterialFieldNames = MaterialFieldNames {
    initial: "oxygen.initial",
    capacity: "oxygen.capacity",
    regeneration: "oxygen.regeneration",
};

impl MaterialConfig {
    fn validate(&self, names: &MaterialFieldNames) -> Result<(), ConfigError> {
        if !self.capacity.is_finite() || self.capacity <= 0.0 {
            return Err(ConfigError::NonPositiveCapacity {
                field: names.capacity,
                value: self.capacity,
            });
        }
        check_non_negative(names.initial, self.initial)?;
        check_non_negative(names.regeneration, self.regeneration)
    }
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            initial: 5.0,
            capacity: 100.0,
            regeneration: 0.1,
        }
    }
}

/// Genetic code parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneConfig {
    /// Number of positions in every genetic code.
    pub length: usize,
}

impl GeneConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.length == 0 {
            return Err(ConfigError::EmptyGene);
        }
        Ok(())
    }
}

impl Default for GeneConfig {
    fn default() -> Self {
        Self { length: 8 }
    }
}

/// Which phenotypes die once their division count reaches the senescence cap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SenescenceDeath {
    /// Both phenotypes die at the cap.
    #[default]
    AllPhenotypes,
    /// Only normal cells die at the cap; cancer cells divide indefinitely.
    NormalOnly,
    /// The division count never causes death.
    Disabled,
}

impl SenescenceDeath {
    /// Reports whether the cap-based death condition applies to `phenotype`.
    #[must_use]
    pub const fn applies_to(&self, phenotype: Phenotype) -> bool {
        match self {
            Self::AllPhenotypes => true,
            Self::NormalOnly => matches!(phenotype, Phenotype::Normal),
            Self::Disabled => false,
        }
    }
}

/// Tissue cell rates and thresholds. Probabilities are percentages in `[0, 100]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellConfig {
    /// Normal cells placed at startup.
    pub initial_count: usize,
    /// Cancer cells placed at startup, each carrying a single mutated position.
    pub initial_cancer_count: usize,
    /// Energy assigned to cells placed at startup.
    pub initial_energy: f64,
    /// Energy debited per unit of Manhattan distance moved.
    pub motility_weight: f64,
    /// Chance that a normal cell attempts to metabolize in a step.
    pub normal_metabolize_probability: f64,
    /// Chance that a cancer cell attempts to metabolize in a step.
    pub cancer_metabolize_probability: f64,
    /// Glucose consumed by a normal cell's metabolism.
    pub normal_glucose_use: f64,
    /// Oxygen consumed by a normal cell's metabolism.
    pub normal_oxygen_use: f64,
    /// Glucose consumed by a cancer cell's glycolysis.
    pub cancer_glucose_use: f64,
    /// Energy gained by successful normal metabolism.
    pub normal_energy_gain: f64,
    /// Energy gained by successful cancer glycolysis.
    pub cancer_energy_gain: f64,
    /// Chance that an eligible normal cell divides in a step.
    pub normal_division_probability: f64,
    /// Chance that a cancer cell divides in a step.
    pub cancer_division_probability: f64,
    /// Energy a cell must exceed before it may divide.
    pub division_threshold_energy: f64,
    /// Cells at or below this energy die.
    pub death_threshold_energy: f64,
    /// Replicative senescence cap on the division count.
    pub max_division_count: u32,
    /// Chance that a newborn's copied gene mutates.
    pub mutation_rate: f64,
    /// Chance that every surviving cell's gene mutates once per step.
    pub somatic_mutation_rate: f64,
    /// Phenotypes subject to death at the senescence cap.
    pub senescence_death: SenescenceDeath,
}

impl CellConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_probability(
            "cells.normal_metabolize_probability",
            self.normal_metabolize_probability,
        )?;
        check_probability(
            "cells.cancer_metabolize_probability",
            self.cancer_metabolize_probability,
        )?;
        check_probability("cells.normal_division_probability", self.normal_division_probability)?;
        check_probability("cells.cancer_division_probability", self.cancer_division_probability)?;
        check_probability("cells.mutation_rate", self.mutation_rate)?;
        check_probability("cells.somatic_mutation_rate", self.somatic_mutation_rate)?;
        check_non_negative("cells.motility_weight", self.motility_weight)?;
        check_non_negative("cells.normal_glucose_use", self.normal_glucose_use)?;
        check_non_negative("cells.normal_oxygen_use", self.normal_oxygen_use)?;
        check_non_negative("cells.cancer_glucose_use", self.cancer_glucose_use)?;
        check_non_negative("cells.normal_energy_gain", self.normal_energy_gain)?;
        check_non_negative("cells.cancer_energy_gain", self.cancer_energy_gain)?;
        check_finite("cells.initial_energy", self.initial_energy)?;
        check_finite("cells.division_threshold_energy", self.division_threshold_energy)?;
        check_finite("cells.death_threshold_energy", self.death_threshold_energy)
    }
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            initial_count: 100,
            initial_cancer_count: 0,
            initial_energy: 20.0,
            motility_weight: 1.0,
            normal_metabolize_probability: 100.0,
            cancer_metabolize_probability: 100.0,
            normal_glucose_use: 1.0,
            normal_oxygen_use: 1.0,
            cancer_glucose_use: 2.0,
            normal_energy_gain: 10.0,
            cancer_energy_gain: 1.0,
            normal_division_probability: 100.0,
            cancer_division_probability: 100.0,
            division_threshold_energy: 30.0,
            death_threshold_energy: 0.0,
            max_division_count: 30,
            mutation_rate: 15.4,
            somatic_mutation_rate: 0.0,
            senescence_death: SenescenceDeath::AllPhenotypes,
        }
    }
}

/// Immune population parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImmuneConfig {
    /// Agents placed at startup.
    pub initial_count: usize,
    /// Population floor restored by replenishment every step.
    pub target_count: usize,
    /// Age at which an agent is removed.
    pub lifespan: u32,
    /// Whether startup agents receive a random age below the lifespan instead of zero.
    pub randomize_initial_age: bool,
}

impl ImmuneConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.lifespan == 0 {
            return Err(ConfigError::ZeroLifespan);
        }
        Ok(())
    }
}

impl Default for ImmuneConfig {
    fn default() -> Self {
        Self {
            initial_count: 20,
            target_count: 20,
            lifespan: 50,
            randomize_initial_age: true,
        }
    }
}

/// Run length, snapshot cadence and seeding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of steps simulated before the engine stops.
    pub max_steps: u64,
    /// Grid snapshots are published on steps divisible by this value; zero disables them.
    pub snapshot_interval: u64,
    /// Seed for the random source; a fixed default applies when absent.
    pub rng_seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_steps: 5_000,
            snapshot_interval: 100,
            rng_seed: None,
        }
    }
}

/// Reasons a configuration is rejected by [`SimulationConfig::validate`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The grid has no cells.
    #[error("grid dimensions must be positive, got {width}x{height}")]
    EmptyGrid {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },
    /// Genetic codes would have no positions.
    #[error("gene length must be non-zero")]
    EmptyGene,
    /// Immune agents would expire on creation.
    #[error("immune lifespan must be non-zero")]
    ZeroLifespan,
    /// A material capacity is zero, negative or not finite.
    #[error("{field} capacity must be positive, got {value}")]
    NonPositiveCapacity {
        /// Offending field.
        field: &'static str,
        /// Configured value.
        value: f64,
    },
    /// A percentage lies outside `[0, 100]`.
    #[error("{field} must be a percentage in [0, 100], got {value}")]
    InvalidProbability {
        /// Offending field.
        field: &'static str,
        /// Configured value.
        value: f64,
    },
    /// An amount, rate or weight is negative or not finite.
    #[error("{field} must be a non-negative number, got {value}")]
    NegativeValue {
        /// Offending field.
        field: &'static str,
        /// Configured value.
        value: f64,
    },
    /// A threshold or energy is not finite.
    #[error("{field} must be finite, got {value}")]
    NonFiniteValue {
        /// Offending field.
        field: &'static str,
        /// Configured value.
        value: f64,
    },
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { field, value })
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeValue { field, value })
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFiniteValue { field, value })
    }
}
