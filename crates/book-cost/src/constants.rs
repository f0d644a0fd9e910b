//! Production-process constants
//!
//! This module centralizes the physical and commercial parameters of the
//! print process. They are the defaults for [`crate::ProductionProcess`],
//! which is what the calculations actually read.

// =============================================================================
// Substrate Sheet
// =============================================================================

/// Press sheet width in millimeters (SRA3 class)
pub const SHEET_WIDTH_MM: f64 = 320.0;

/// Press sheet height in millimeters (SRA3 class)
pub const SHEET_HEIGHT_MM: f64 = 450.0;

/// Bleed added to both width and height of a finished page before fitting
pub const BLEED_MM: f64 = 6.0;

// =============================================================================
// Trim Sizes
// =============================================================================

/// DIN A4 trim size (width, height) in millimeters
pub const A4_TRIM_MM: (f64, f64) = (210.0, 297.0);

/// DIN A5 trim size (width, height) in millimeters
pub const A5_TRIM_MM: (f64, f64) = (148.0, 210.0);

// =============================================================================
// Price Curve
// =============================================================================

/// Exponent of the gamma-exponential discount curve.
/// Values below 1 front-load the discount: prices fall fastest at low volume.
pub const CURVE_GAMMA: f64 = 0.675;

/// Quantity at which the batch (offset) price curve reaches its minimum
pub const BATCH_SATURATION_QUANTITY: u32 = 1000;

/// Quantity at which the continuous (digital) price curve reaches its minimum
pub const CONTINUOUS_SATURATION_QUANTITY: u32 = 3000;

// =============================================================================
// Pricing Policy
// =============================================================================

/// Minimum unit price in minor currency units (cents) for per-copy costing
pub const PRICE_FLOOR_CENTS: f64 = 200.0;
