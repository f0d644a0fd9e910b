use crate::curve::{PriceCurve, progress};
use crate::demand::SheetDemand;
use crate::imposition::{ImpositionFit, impose_format};
use crate::process::ProductionProcess;
use crate::types::*;
use std::collections::BTreeMap;

/// Every intermediate value of one cost calculation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostBreakdown {
    pub imposition: ImpositionFit,
    pub demand: SheetDemand,
    /// Position on the price curve, in `[0, 1]`
    pub progress: f64,
    /// Interpolated sheet price by paper class
    pub sheet_prices: BTreeMap<String, f64>,
    /// Interpolated fixed per-copy price (continuous only)
    pub fixed_price: f64,
    /// Interpolated markup percentage (continuous only)
    pub markup_percent: f64,
    /// Paper cost of one block (batch) or one copy (continuous), before markup
    pub base_cost: f64,
    /// Whether the price floor raised the unit price
    pub floor_applied: bool,
    pub result: CostResult,
}

/// Compute the cost of a print job under the process's policy.
///
/// The only failure is [`CostError::InvalidFormat`].
pub fn compute_cost(request: &PrintJobRequest, process: &ProductionProcess) -> Result<CostResult> {
    compute_breakdown(request, process).map(|breakdown| breakdown.result)
}

/// Like [`compute_cost`], keeping every intermediate value
pub fn compute_breakdown(
    request: &PrintJobRequest,
    process: &ProductionProcess,
) -> Result<CostBreakdown> {
    let format: PageFormat = request.format.parse()?;
    let imposition = impose_format(format, &process.sheet)?;

    let inverted = request.inverted_ranges();
    if !inverted.is_empty() {
        log::warn!(
            "Inverted price range (min > max) for {}: price will rise with quantity",
            inverted.join(", ")
        );
    }

    let demand = SheetDemand::calculate(
        &request.pages_by_class(),
        imposition.pages_per_sheet,
        request.quantity,
        process.policy,
    );

    let curve = PriceCurve::from_process(process);
    // Batch pricing follows the produced quantity, not the requested one
    let curve_progress = progress(demand.units_produced, curve.saturation);
    let sheet_prices: BTreeMap<String, f64> = request
        .paper
        .iter()
        .map(|(class, stock)| {
            (class.clone(), curve.price_at(stock.price, demand.units_produced))
        })
        .collect();

    let paper_cost: f64 = sheet_prices
        .iter()
        .map(|(class, price)| demand.sheets_per_run(class) as f64 * price)
        .sum();

    let breakdown = match process.policy {
        ProductionPolicy::Batch => {
            let total = paper_cost * demand.blocks as f64;
            let per_unit = paper_cost / f64::from(imposition.pages_per_sheet);

            CostBreakdown {
                imposition,
                demand,
                progress: curve_progress,
                sheet_prices,
                fixed_price: 0.0,
                markup_percent: 0.0,
                base_cost: paper_cost,
                floor_applied: false,
                result: CostResult {
                    per_unit_cost: to_cents(per_unit),
                    total_cost: to_cents(total),
                },
            }
        }
        ProductionPolicy::Continuous => {
            let quantity = demand.units_produced;
            let fixed_price = request
                .fixed_price
                .map(|range| curve.price_at(range, quantity))
                .unwrap_or(0.0);
            let markup_percent = request
                .markup
                .map(|markup| curve.markup_at(markup, quantity))
                .unwrap_or(0.0);

            let base_cost = paper_cost + fixed_price;
            let marked_up = base_cost * (1.0 + markup_percent / 100.0);
            let floor_applied = marked_up < process.price_floor;
            let single = marked_up.max(process.price_floor);

            CostBreakdown {
                imposition,
                demand,
                progress: curve_progress,
                sheet_prices,
                fixed_price,
                markup_percent,
                base_cost,
                floor_applied,
                result: CostResult {
                    per_unit_cost: to_cents(single),
                    total_cost: to_cents(single * quantity as f64),
                },
            }
        }
    };

    log::debug!(
        "{} x{} ({:?}): progress={:.4} base={:.2} -> {:?}",
        format,
        request.quantity,
        process.policy,
        breakdown.progress,
        breakdown.base_cost,
        breakdown.result
    );

    Ok(breakdown)
}

/// Cost of the same request at several quantities
pub fn quote_table(
    request: &PrintJobRequest,
    process: &ProductionProcess,
    quantities: &[u32],
) -> Result<Vec<(u32, CostResult)>> {
    quantities
        .iter()
        .map(|&quantity| {
            compute_cost(&request.at_quantity(quantity), process).map(|cost| (quantity, cost))
        })
        .collect()
}

/// Floor to whole minor currency units
fn to_cents(value: f64) -> i64 {
    value.floor() as i64
}
