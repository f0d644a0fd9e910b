use crate::constants::{A4_TRIM_MM, A5_TRIM_MM};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CostError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CostError>;

/// Finished page formats the press can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageFormat {
    A4,
    A5,
}

impl PageFormat {
    pub const ALL: [PageFormat; 2] = [PageFormat::A4, PageFormat::A5];

    /// Trim dimensions (width, height) in millimeters, portrait
    pub fn trim_mm(self) -> (f64, f64) {
        match self {
            PageFormat::A4 => A4_TRIM_MM,
            PageFormat::A5 => A5_TRIM_MM,
        }
    }

    /// Trim dimensions with orientation applied
    pub fn trim_with_orientation(self, orientation: Orientation) -> (f64, f64) {
        let (w, h) = self.trim_mm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PageFormat::A4 => "A4",
            PageFormat::A5 => "A5",
        }
    }
}

impl fmt::Display for PageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts "A4", "a5", "DIN A4", "din-a5", "DIN_A5".
impl FromStr for PageFormat {
    type Err = CostError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .flat_map(char::to_uppercase)
            .collect();
        let code = normalized.strip_prefix("DIN").unwrap_or(normalized.as_str());

        match code {
            "A4" => Ok(PageFormat::A4),
            "A5" => Ok(PageFormat::A5),
            _ => Err(CostError::InvalidFormat(s.to_string())),
        }
    }
}

/// Placement of the page grid on the press sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Page width runs along the sheet width
    #[default]
    Portrait,
    /// Page rotated 90°: page height runs along the sheet width
    Landscape,
}

/// How the press turns a quantity into production runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProductionPolicy {
    /// Offset-style: only whole imposition blocks are produced and charged
    Batch,
    /// Digital: each copy is produced and charged individually
    Continuous,
}

/// Shape of the volume-discount curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CurveShape {
    /// Straight line from `max` at quantity 1 to `min` at saturation
    Linear,
    /// `max - (max - min) * progress^gamma`
    GammaExponential,
}

/// Price span in minor currency units: `max` at quantity 1, `min` at saturation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A range that does not vary with quantity
    pub fn flat(price: f64) -> Self {
        Self {
            min: price,
            max: price,
        }
    }

    /// True when the curve would rise with quantity
    pub fn is_inverted(&self) -> bool {
        self.min > self.max
    }
}

/// Percentage added on top of the per-copy cost
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Markup {
    /// Fixed percentage, independent of quantity
    Flat(f64),
    /// Percentage interpolated along the price curve
    Range(PriceRange),
}

impl Default for Markup {
    fn default() -> Self {
        Markup::Flat(0.0)
    }
}

/// One paper class of a book: its page count and sheet price
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaperStock {
    pub pages: u32,
    pub price: PriceRange,
}

impl PaperStock {
    pub fn new(pages: u32, price: PriceRange) -> Self {
        Self { pages, price }
    }
}

/// A costing request as supplied by the order flow
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrintJobRequest {
    /// Format label, e.g. "DIN A5"
    pub format: String,
    /// Copies ordered
    pub quantity: u32,
    /// Paper classes keyed by name ("B", "C", ...)
    pub paper: BTreeMap<String, PaperStock>,
    /// Fixed per-copy cost (binding, cover)
    #[cfg_attr(feature = "serde", serde(default))]
    pub fixed_price: Option<PriceRange>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub markup: Option<Markup>,
}

impl PrintJobRequest {
    pub fn new(format: impl Into<String>, quantity: u32) -> Self {
        Self {
            format: format.into(),
            quantity,
            paper: BTreeMap::new(),
            fixed_price: None,
            markup: None,
        }
    }

    /// Add or replace a paper class
    pub fn with_paper(mut self, class: impl Into<String>, pages: u32, price: PriceRange) -> Self {
        self.paper.insert(class.into(), PaperStock::new(pages, price));
        self
    }

    pub fn with_fixed_price(mut self, price: PriceRange) -> Self {
        self.fixed_price = Some(price);
        self
    }

    pub fn with_markup(mut self, markup: Markup) -> Self {
        self.markup = Some(markup);
        self
    }

    /// Same request at a different quantity
    pub fn at_quantity(&self, quantity: u32) -> Self {
        Self {
            quantity,
            ..self.clone()
        }
    }

    /// Page counts by paper class
    pub fn pages_by_class(&self) -> BTreeMap<String, u32> {
        self.paper
            .iter()
            .map(|(class, stock)| (class.clone(), stock.pages))
            .collect()
    }

    /// Names of the price ranges with `min > max`, which rise with quantity
    pub fn inverted_ranges(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .paper
            .iter()
            .filter(|(_, stock)| stock.price.is_inverted())
            .map(|(class, _)| format!("paper {}", class))
            .collect();
        if self.fixed_price.is_some_and(|range| range.is_inverted()) {
            names.push("fixed price".to_string());
        }
        if matches!(self.markup, Some(Markup::Range(range)) if range.is_inverted()) {
            names.push("markup".to_string());
        }
        names
    }
}

/// Final cost in floored minor currency units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostResult {
    pub per_unit_cost: i64,
    pub total_cost: i64,
}
