use crate::constants::*;
use crate::imposition::impose_format;
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Physical press sheet and the bleed added to every finished page
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SubstrateSheet {
    pub width_mm: f64,
    pub height_mm: f64,
    pub bleed_mm: f64,
}

impl Default for SubstrateSheet {
    fn default() -> Self {
        Self {
            width_mm: SHEET_WIDTH_MM,
            height_mm: SHEET_HEIGHT_MM,
            bleed_mm: BLEED_MM,
        }
    }
}

/// Production-process parameters injected into every cost calculation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProductionProcess {
    pub policy: ProductionPolicy,
    pub curve: CurveShape,
    pub sheet: SubstrateSheet,

    // Price curve
    pub gamma: f64,
    pub saturation_quantity: u32,

    /// Minimum unit price, continuous policy only
    pub price_floor: f64,
}

impl Default for ProductionProcess {
    fn default() -> Self {
        Self::digital()
    }
}

impl ProductionProcess {
    /// Offset printing on SRA3: whole blocks only, linear discount to 1000 copies
    pub fn batch_offset() -> Self {
        Self {
            policy: ProductionPolicy::Batch,
            curve: CurveShape::Linear,
            sheet: SubstrateSheet::default(),
            gamma: CURVE_GAMMA,
            saturation_quantity: BATCH_SATURATION_QUANTITY,
            price_floor: PRICE_FLOOR_CENTS,
        }
    }

    /// Digital printing: per-copy costing, gamma discount to 3000 copies
    pub fn digital() -> Self {
        Self {
            policy: ProductionPolicy::Continuous,
            curve: CurveShape::GammaExponential,
            sheet: SubstrateSheet::default(),
            gamma: CURVE_GAMMA,
            saturation_quantity: CONTINUOUS_SATURATION_QUANTITY,
            price_floor: PRICE_FLOOR_CENTS,
        }
    }

    /// Load a process from a JSON file and validate it
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let process: Self = serde_json::from_slice(&bytes)
            .map_err(|e| CostError::Config(format!("Failed to parse process: {}", e)))?;
        process.validate()?;
        Ok(process)
    }

    /// Save the process to a JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| CostError::Config(format!("Failed to serialize process: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the process parameters
    pub fn validate(&self) -> Result<()> {
        let sheet = &self.sheet;
        let positive = |v: f64| v > 0.0;

        if !positive(sheet.width_mm) || !positive(sheet.height_mm) {
            return Err(CostError::Config(
                "Sheet dimensions must be positive".to_string(),
            ));
        }

        if sheet.bleed_mm.is_nan() || sheet.bleed_mm < 0.0 {
            return Err(CostError::Config("Bleed must not be negative".to_string()));
        }

        if !positive(self.gamma) {
            return Err(CostError::Config("Curve gamma must be positive".to_string()));
        }

        if self.saturation_quantity == 0 {
            return Err(CostError::Config(
                "Saturation quantity must be at least 1".to_string(),
            ));
        }

        // Every supported format has to fit at least once
        for format in PageFormat::ALL {
            impose_format(format, sheet).map_err(|e| match e {
                CostError::InvalidFormat(_) => CostError::Config(format!(
                    "{} does not fit on a {}x{}mm sheet with {}mm bleed",
                    format, sheet.width_mm, sheet.height_mm, sheet.bleed_mm
                )),
                other => other,
            })?;
        }

        Ok(())
    }
}

impl PrintJobRequest {
    /// Load a request from a JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let request = serde_json::from_slice(&bytes)
            .map_err(|e| CostError::Config(format!("Failed to parse request: {}", e)))?;
        Ok(request)
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;
    use serde::{Deserialize, Serialize};

    // Page formats travel as their labels, "DIN A5" included
    impl Serialize for PageFormat {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            serializer.serialize_str(self.label())
        }
    }

    impl<'de> Deserialize<'de> for PageFormat {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        }
    }

    // Markup is either a bare percentage or a {min, max} range
    impl Serialize for Markup {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            match self {
                Markup::Flat(percent) => serializer.serialize_f64(*percent),
                Markup::Range(range) => range.serialize(serializer),
            }
        }
    }

    impl<'de> Deserialize<'de> for Markup {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            use serde::de::{self, MapAccess, Visitor};
            use std::fmt;

            struct MarkupVisitor;

            impl<'de> Visitor<'de> for MarkupVisitor {
                type Value = Markup;

                fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                    formatter.write_str("a markup percentage or a {min, max} range")
                }

                fn visit_f64<E>(self, value: f64) -> std::result::Result<Markup, E>
                where
                    E: de::Error,
                {
                    Ok(Markup::Flat(value))
                }

                fn visit_i64<E>(self, value: i64) -> std::result::Result<Markup, E>
                where
                    E: de::Error,
                {
                    Ok(Markup::Flat(value as f64))
                }

                fn visit_u64<E>(self, value: u64) -> std::result::Result<Markup, E>
                where
                    E: de::Error,
                {
                    Ok(Markup::Flat(value as f64))
                }

                fn visit_map<M>(self, mut map: M) -> std::result::Result<Markup, M::Error>
                where
                    M: MapAccess<'de>,
                {
                    let mut min = None;
                    let mut max = None;

                    while let Some(key) = map.next_key::<String>()? {
                        match key.as_str() {
                            "min" => min = Some(map.next_value()?),
                            "max" => max = Some(map.next_value()?),
                            _ => {
                                let _: serde::de::IgnoredAny = map.next_value()?;
                            }
                        }
                    }

                    match (min, max) {
                        (Some(min), Some(max)) => Ok(Markup::Range(PriceRange { min, max })),
                        _ => Err(de::Error::missing_field("min or max")),
                    }
                }
            }

            deserializer.deserialize_any(MarkupVisitor)
        }
    }
} // end of serde_impls module
