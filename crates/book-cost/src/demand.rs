use crate::types::*;
use std::collections::BTreeMap;

/// Press sheets needed for an order
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetDemand {
    pub policy: ProductionPolicy,
    pub pages_per_sheet: u32,
    /// Sheets per block (batch) or per copy (continuous), by paper class
    pub sheets_by_class: BTreeMap<String, u64>,
    /// Imposition blocks run; always 0 under the continuous policy
    pub blocks: u64,
    /// Copies actually produced and charged for
    pub units_produced: u64,
}

impl SheetDemand {
    /// Convert page counts into sheet counts under `policy`.
    ///
    /// `pages_per_sheet` must be at least 1; [`crate::impose_format`] never
    /// returns less.
    pub fn calculate(
        pages_by_class: &BTreeMap<String, u32>,
        pages_per_sheet: u32,
        quantity: u32,
        policy: ProductionPolicy,
    ) -> Self {
        let per_sheet = u64::from(pages_per_sheet.max(1));

        let sheets_by_class = pages_by_class
            .iter()
            .map(|(class, &pages)| (class.clone(), u64::from(pages).div_ceil(per_sheet)))
            .collect();

        let quantity = u64::from(quantity);
        let (blocks, units_produced) = match policy {
            ProductionPolicy::Batch => {
                let blocks = quantity.div_ceil(per_sheet);
                (blocks, blocks * per_sheet)
            }
            ProductionPolicy::Continuous => (0, quantity),
        };

        let demand = Self {
            policy,
            pages_per_sheet,
            sheets_by_class,
            blocks,
            units_produced,
        };
        log::debug!("Sheet demand: {:?}", demand);
        demand
    }

    /// Sheets of one class per block (batch) or per copy (continuous)
    pub fn sheets_per_run(&self, class: &str) -> u64 {
        self.sheets_by_class.get(class).copied().unwrap_or(0)
    }

    /// Sheets of one class over the whole order
    pub fn total_sheets(&self, class: &str) -> u64 {
        let multiplier = match self.policy {
            ProductionPolicy::Batch => self.blocks,
            ProductionPolicy::Continuous => self.units_produced,
        };
        self.sheets_per_run(class) * multiplier
    }

    /// Copies produced beyond the requested quantity
    pub fn overproduction(&self, requested: u32) -> u64 {
        self.units_produced.saturating_sub(u64::from(requested))
    }
}
