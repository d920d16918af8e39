use pulse_core::StockCategory;
use serde::{Deserialize, Serialize};

/// Market caps below this are treated as small caps
const SMALL_CAP_CUTOFF: f64 = 2_000_000_000.0;

/// Component weights for the overall score. Always sum to 1.0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeightProfile {
    pub technical: f64,
    pub fundamental: f64,
    pub sentiment: f64,
}

impl WeightProfile {
    /// Base profile per category. Value and dividend names lean on
    /// fundamentals, growth names on momentum and narrative, ETFs have no
    /// fundamental leg at all.
    pub fn for_category(category: StockCategory) -> Self {
        match category {
            StockCategory::Core => Self {
                technical: 0.40,
                fundamental: 0.35,
                sentiment: 0.25,
            },
            StockCategory::Growth => Self {
                technical: 0.45,
                fundamental: 0.25,
                sentiment: 0.30,
            },
            StockCategory::Value => Self {
                technical: 0.30,
                fundamental: 0.50,
                sentiment: 0.20,
            },
            StockCategory::Dividend => Self {
                technical: 0.25,
                fundamental: 0.55,
                sentiment: 0.20,
            },
            StockCategory::Etf => Self {
                technical: 0.60,
                fundamental: 0.0,
                sentiment: 0.40,
            },
        }
    }

    /// Category profile adjusted for market cap: small caps trade more on
    /// momentum and news than on filings, so 0.10 of fundamental weight
    /// moves to the other two legs.
    pub fn for_stock(category: StockCategory, market_cap: Option<f64>) -> Self {
        let base = Self::for_category(category);

        match market_cap {
            Some(cap) if cap > 0.0 && cap < SMALL_CAP_CUTOFF && base.fundamental >= 0.10 => Self {
                technical: base.technical + 0.05,
                fundamental: base.fundamental - 0.10,
                sentiment: base.sentiment + 0.05,
            },
            _ => base,
        }
    }

    pub fn sum(&self) -> f64 {
        self.technical + self.fundamental + self.sentiment
    }
}
