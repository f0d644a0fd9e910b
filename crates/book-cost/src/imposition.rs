//! Imposition on the press sheet
//!
//! Pages are laid out as a regular grid, either upright or rotated by 90°,
//! and the orientation that packs more copies wins. Only these two
//! placements are considered: a guillotine-cut grid has no other
//! meaningful arrangement.

use crate::process::SubstrateSheet;
use crate::types::*;

/// How a page format fits on a press sheet
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImpositionFit {
    pub format: PageFormat,
    /// Trim width plus bleed
    pub width_with_bleed_mm: f64,
    /// Trim height plus bleed
    pub height_with_bleed_mm: f64,
    /// Copies per sheet with the page upright
    pub normal: u32,
    /// Copies per sheet with the page rotated
    pub rotated: u32,
    /// The better of the two, always >= 1
    pub pages_per_sheet: u32,
    /// Orientation that produced `pages_per_sheet`
    pub orientation: Orientation,
}

/// Compute both candidate placements and pick the better one.
///
/// Ties go to [`Orientation::Portrait`]. Fails with
/// [`CostError::InvalidFormat`] if the page does not fit at all, and with
/// [`CostError::Config`] if the sheet holds more pages than a `u32` counts.
pub fn impose_format(format: PageFormat, sheet: &SubstrateSheet) -> Result<ImpositionFit> {
    let (trim_w, trim_h) = format.trim_mm();
    let w = trim_w + sheet.bleed_mm;
    let h = trim_h + sheet.bleed_mm;

    let normal = grid_count(format, Orientation::Portrait, sheet)?;
    let rotated = grid_count(format, Orientation::Landscape, sheet)?;

    let (pages_per_sheet, orientation) = if rotated > normal {
        (rotated, Orientation::Landscape)
    } else {
        (normal, Orientation::Portrait)
    };

    if pages_per_sheet == 0 {
        return Err(CostError::InvalidFormat(format!(
            "{} ({}x{}mm with bleed) does not fit on a {}x{}mm sheet",
            format, w, h, sheet.width_mm, sheet.height_mm
        )));
    }

    log::debug!(
        "{} on {}x{}mm: normal={} rotated={} -> {} ({:?})",
        format,
        sheet.width_mm,
        sheet.height_mm,
        normal,
        rotated,
        pages_per_sheet,
        orientation
    );

    Ok(ImpositionFit {
        format,
        width_with_bleed_mm: w,
        height_with_bleed_mm: h,
        normal,
        rotated,
        pages_per_sheet,
        orientation,
    })
}

/// Number of finished pages that fit on one sheet
pub fn pages_per_sheet(format: PageFormat, sheet: &SubstrateSheet) -> Result<u32> {
    impose_format(format, sheet).map(|fit| fit.pages_per_sheet)
}

/// Pages in the regular grid for one orientation
fn grid_count(format: PageFormat, orientation: Orientation, sheet: &SubstrateSheet) -> Result<u32> {
    let (w, h) = format.trim_with_orientation(orientation);
    let across = fit_count(sheet.width_mm, w + sheet.bleed_mm);
    let down = fit_count(sheet.height_mm, h + sheet.bleed_mm);

    across.checked_mul(down).ok_or_else(|| {
        CostError::Config(format!(
            "{}x{}mm sheet holds too many {} pages to count",
            sheet.width_mm, sheet.height_mm, format
        ))
    })
}

/// Whole copies of `item` along `span`
fn fit_count(span: f64, item: f64) -> u32 {
    if item <= 0.0 {
        return 0;
    }
    (span / item).floor() as u32
}
