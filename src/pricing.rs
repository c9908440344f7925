//! Static model pricing and cost estimation.
//!
//! Prices are per million tokens, USD, frozen at crate release time.
//! [`estimate`] is an estimate, not a measurement: the input side comes
//! from a real tokenize call, but the output side assumes the request's
//! configured `max_tokens` will be fully consumed.

/// Per-million-token prices for one model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    /// USD per million input tokens.
    pub input_per_million: f64,
    /// USD per million output tokens.
    pub output_per_million: f64,
}

/// Fallback pricing applied to models missing from the table.
pub const DEFAULT_PRICING: ModelPricing = ModelPricing {
    input_per_million: 1.00,
    output_per_million: 4.00,
};

/// Known model prices. Kept sorted by model name.
const PRICING_TABLE: &[(&str, ModelPricing)] = &[
    (
        "claude-haiku-3-5",
        ModelPricing {
            input_per_million: 0.80,
            output_per_million: 4.00,
        },
    ),
    (
        "claude-sonnet-4-5",
        ModelPricing {
            input_per_million: 3.00,
            output_per_million: 15.00,
        },
    ),
    (
        "gpt-4o",
        ModelPricing {
            input_per_million: 2.50,
            output_per_million: 10.00,
        },
    ),
    (
        "gpt-4o-mini",
        ModelPricing {
            input_per_million: 0.15,
            output_per_million: 0.60,
        },
    ),
    (
        "omni-large",
        ModelPricing {
            input_per_million: 2.00,
            output_per_million: 8.00,
        },
    ),
    (
        "omni-small",
        ModelPricing {
            input_per_million: 0.20,
            output_per_million: 0.80,
        },
    ),
];

/// Look up pricing for a model, falling back to [`DEFAULT_PRICING`].
pub fn pricing_for(model: &str) -> ModelPricing {
    PRICING_TABLE
        .iter()
        .find(|(name, _)| *name == model)
        .map(|(_, p)| *p)
        .unwrap_or(DEFAULT_PRICING)
}

/// An estimated cost breakdown for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct CostEstimate {
    /// The model the estimate was computed for.
    pub model: String,
    /// Measured input token count (from a tokenize call).
    pub input_tokens: u32,
    /// Assumed output token count (the request's `max_tokens`).
    pub output_tokens: u32,
    /// Estimated input cost, USD.
    pub input_cost: f64,
    /// Estimated output cost, USD.
    pub output_cost: f64,
    /// Estimated total, USD.
    pub total_cost: f64,
}

/// Compute a cost estimate from token counts and the static table.
pub fn estimate(model: &str, input_tokens: u32, output_tokens: u32) -> CostEstimate {
    let pricing = pricing_for(model);
    let input_cost = f64::from(input_tokens) * pricing.input_per_million / 1_000_000.0;
    let output_cost = f64::from(output_tokens) * pricing.output_per_million / 1_000_000.0;
    CostEstimate {
        model: model.to_string(),
        input_tokens,
        output_tokens,
        input_cost,
        output_cost,
        total_cost: input_cost + output_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_model_lookup() {
        let p = pricing_for("gpt-4o");
        assert_eq!(p.input_per_million, 2.50);
        assert_eq!(p.output_per_million, 10.00);
    }

    #[test]
    fn unknown_model_falls_back_to_default() {
        assert_eq!(pricing_for("some-new-model"), DEFAULT_PRICING);
    }

    #[test]
    fn estimate_arithmetic() {
        // 1M input + 1M output tokens of omni-large = $2 + $8.
        let est = estimate("omni-large", 1_000_000, 1_000_000);
        assert!((est.input_cost - 2.00).abs() < 1e-9);
        assert!((est.output_cost - 8.00).abs() < 1e-9);
        assert!((est.total_cost - 10.00).abs() < 1e-9);
    }

    #[test]
    fn estimate_small_counts() {
        let est = estimate("gpt-4o-mini", 1000, 500);
        assert!((est.input_cost - 0.00015).abs() < 1e-12);
        assert!((est.output_cost - 0.0003).abs() < 1e-12);
    }

    #[test]
    fn estimate_zero_tokens() {
        let est = estimate("omni-small", 0, 0);
        assert_eq!(est.total_cost, 0.0);
    }

    #[test]
    fn table_is_sorted_by_model_name() {
        let names: Vec<&str> = PRICING_TABLE.iter().map(|(n, _)| *n).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
