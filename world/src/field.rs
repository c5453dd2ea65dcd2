//! Bounded material quantity grids with local regeneration.

use tumor_immune_core::{GridBounds, GridCoord, MaterialConfig, MaterialFieldView};

/// Dense grid of a single diffusible resource such as glucose or oxygen.
///
/// Every stored quantity stays within `[0, capacity]`. Resources never move
/// between neighbouring cells; each cell regenerates on its own.
#[derive(Clone, Debug)]
pub struct MaterialField {
    bounds: GridBounds,
    capacity: f64,
    increment: f64,
    quantities: Vec<f64>,
}

impl MaterialField {
    /// Creates a field with every cell holding `initial`, clamped into `[0, capacity]`.
    #[must_use]
    pub fn new(bounds: GridBounds, initial: f64, capacity: f64, increment: f64) -> Self {
        let seed = initial.clamp(0.0, capacity.max(0.0));
        Self {
            bounds,
            capacity,
            increment,
            quantities: vec![seed; bounds.cell_count()],
        }
    }

    /// Creates a field from a configuration section.
    #[must_use]
    pub fn from_config(bounds: GridBounds, config: &MaterialConfig) -> Self {
        Self::new(bounds, config.initial, config.capacity, config.regeneration)
    }

    /// Dimensions of the field.
    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Upper bound on any stored quantity.
    #[must_use]
    pub const fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Quantity stored at the coordinate, or zero outside the grid.
    #[must_use]
    pub fn get(&self, cell: GridCoord) -> f64 {
        self.bounds
            .index(cell)
            .and_then(|index| self.quantities.get(index).copied())
            .unwrap_or(0.0)
    }

    /// Overwrites the quantity at the coordinate, clamped into `[0, capacity]`.
    pub fn set(&mut self, cell: GridCoord, value: f64) {
        let clamped = value.clamp(0.0, self.capacity.max(0.0));
        if let Some(slot) = self.slot_mut(cell) {
            *slot = clamped;
        }
    }

    /// Removes `amount` when at least that much is present.
    ///
    /// Returns `false` and leaves the field untouched when the cell holds less
    /// than `amount` or lies outside the grid.
    pub fn consume(&mut self, cell: GridCoord, amount: f64) -> bool {
        let Some(slot) = self.slot_mut(cell) else {
            return false;
        };
        if *slot < amount {
            return false;
        }
        *slot -= amount;
        true
    }

    /// Consumes from two fields at once, succeeding only when both hold enough.
    pub fn consume_jointly(
        first: &mut MaterialField,
        first_amount: f64,
        second: &mut MaterialField,
        second_amount: f64,
        cell: GridCoord,
    ) -> bool {
        if first.get(cell) < first_amount || second.get(cell) < second_amount {
            return false;
        }
        first.consume(cell, first_amount) && second.consume(cell, second_amount)
    }

    /// Adds one increment to every cell that can absorb it without exceeding capacity.
    ///
    /// Cells whose gap to capacity is smaller than the increment stay where
    /// they are, so an increment that does not divide the gap evenly leaves
    /// the cell just below capacity. The sum itself is compared against the
    /// capacity so rounding never lifts a quantity above it.
    pub fn regenerate(&mut self) {
        for quantity in &mut self.quantities {
            let next = *quantity + self.increment;
            if next <= self.capacity {
                *quantity = next;
            }
        }
    }

    /// Read-only view of the raw quantities.
    #[must_use]
    pub fn view(&self) -> MaterialFieldView<'_> {
        MaterialFieldView::new(&self.quantities, self.bounds)
    }

    fn slot_mut(&mut self, cell: GridCoord) -> Option<&mut f64> {
        let index = self.bounds.index(cell)?;
        self.quantities.get_mut(index)
    }
}
