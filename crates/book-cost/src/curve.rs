//! Volume-discount price curves
//!
//! A price range runs from `max` at quantity 1 down to `min` at the
//! saturation quantity. The position between the two is the *progress*,
//! a value in `[0, 1]` fed through the curve shape.

use crate::process::ProductionProcess;
use crate::types::*;

/// Normalized position of `quantity` between 1 and `saturation`.
///
/// Quantities below 1 count as 1 and quantities beyond saturation as
/// saturation. A saturation of 1 or less is reached immediately.
pub fn progress(quantity: u64, saturation: u32) -> f64 {
    if saturation <= 1 {
        return 1.0;
    }
    let saturation = u64::from(saturation);
    let clamped = quantity.clamp(1, saturation);
    (clamped - 1) as f64 / (saturation - 1) as f64
}

/// Interpolation parameters for one production process
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceCurve {
    pub shape: CurveShape,
    pub gamma: f64,
    pub saturation: u32,
}

impl PriceCurve {
    pub fn new(shape: CurveShape, gamma: f64, saturation: u32) -> Self {
        Self {
            shape,
            gamma,
            saturation,
        }
    }

    pub fn from_process(process: &ProductionProcess) -> Self {
        Self::new(process.curve, process.gamma, process.saturation_quantity)
    }

    /// Price for a given progress in `[0, 1]`
    pub fn interpolate(&self, range: PriceRange, progress: f64) -> f64 {
        let PriceRange { min, max } = range;
        match self.shape {
            CurveShape::Linear => max * (1.0 - progress) + min * progress,
            CurveShape::GammaExponential => max - (max - min) * progress.powf(self.gamma),
        }
    }

    /// Effective price when `quantity` copies are charged
    pub fn price_at(&self, range: PriceRange, quantity: u64) -> f64 {
        self.interpolate(range, progress(quantity, self.saturation))
    }

    /// Effective markup percentage; a flat markup is returned unchanged
    pub fn markup_at(&self, markup: Markup, quantity: u64) -> f64 {
        match markup {
            Markup::Flat(percent) => percent,
            Markup::Range(range) => self.price_at(range, quantity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CURVE_GAMMA;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_progress_bounds() {
        assert_eq!(progress(0, 3000), 0.0);
        assert_eq!(progress(1, 3000), 0.0);
        assert_eq!(progress(3000, 3000), 1.0);
        assert_eq!(progress(10_000, 3000), 1.0);
        assert!((progress(1500, 3000) - 1499.0 / 2999.0).abs() < EPS);
    }

    #[test]
    fn test_progress_degenerate_saturation() {
        assert_eq!(progress(1, 1), 1.0);
        assert_eq!(progress(5, 0), 1.0);
    }

    #[test]
    fn test_linear_midpoint() {
        let curve = PriceCurve::new(CurveShape::Linear, CURVE_GAMMA, 1000);
        let range = PriceRange::new(2.0, 10.0);

        assert_eq!(curve.interpolate(range, 0.0), 10.0);
        assert_eq!(curve.interpolate(range, 1.0), 2.0);
        assert!((curve.interpolate(range, 0.5) - 6.0).abs() < EPS);
    }

    #[test]
    fn test_gamma_front_loads_discount() {
        let linear = PriceCurve::new(CurveShape::Linear, CURVE_GAMMA, 3000);
        let gamma = PriceCurve::new(CurveShape::GammaExponential, CURVE_GAMMA, 3000);
        let range = PriceRange::new(2.0, 10.0);

        assert_eq!(gamma.interpolate(range, 0.0), 10.0);
        assert!((gamma.interpolate(range, 1.0) - 2.0).abs() < EPS);
        // Below the line everywhere inside (0, 1)
        for p in [0.1, 0.25, 0.5, 0.75, 0.9] {
            assert!(gamma.interpolate(range, p) < linear.interpolate(range, p));
        }
        let expected = 10.0 - 8.0 * 0.5f64.powf(CURVE_GAMMA);
        assert!((gamma.interpolate(range, 0.5) - expected).abs() < EPS);
    }

    #[test]
    fn test_flat_range_is_constant() {
        let curve = PriceCurve::new(CurveShape::GammaExponential, CURVE_GAMMA, 3000);
        for q in [1, 10, 2999, 5000] {
            assert_eq!(curve.price_at(PriceRange::flat(50.0), q), 50.0);
        }
    }

    #[test]
    fn test_inverted_range_rises() {
        let curve = PriceCurve::new(CurveShape::Linear, CURVE_GAMMA, 1000);
        let range = PriceRange::new(10.0, 2.0);
        assert!(curve.price_at(range, 1000) > curve.price_at(range, 1));
    }

    #[test]
    fn test_markup() {
        let curve = PriceCurve::new(CurveShape::Linear, CURVE_GAMMA, 1000);
        assert_eq!(curve.markup_at(Markup::Flat(15.0), 1), 15.0);
        assert_eq!(curve.markup_at(Markup::Flat(15.0), 1000), 15.0);

        let ranged = Markup::Range(PriceRange::new(10.0, 30.0));
        assert_eq!(curve.markup_at(ranged, 1), 30.0);
        assert_eq!(curve.markup_at(ranged, 1000), 10.0);
    }
}
