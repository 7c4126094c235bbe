// Input and output schema of the pricing optimizer

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One candidate price together with the fraction of the market expected to convert at it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub price: f64,
    pub conversion_rate: f64,
}

impl Prediction {
    pub fn new(price: f64, conversion_rate: f64) -> Self {
        Self {
            price,
            conversion_rate,
        }
    }

    /// Units sold at this price, capped by both inventory and demand
    pub fn effective_sales(&self, inventory: u64, market_size: u64) -> u64 {
        let demand = self.conversion_rate * market_size as f64;
        let sales = (inventory as f64).min(demand).floor();
        if sales > 0.0 {
            sales as u64
        } else {
            0
        }
    }
}

/// The discrete menu of prices the optimizer may choose from for one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRateCurve {
    pub product_id: String,
    pub curve: Vec<Prediction>,
}

impl ConversionRateCurve {
    pub fn new(product_id: impl Into<String>, curve: Vec<Prediction>) -> Self {
        Self {
            product_id: product_id.into(),
            curve,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub product_id: String,
    pub inventory: u64,
}

impl Inventory {
    pub fn new(product_id: impl Into<String>, inventory: u64) -> Self {
        Self {
            product_id: product_id.into(),
            inventory,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSize {
    pub product_id: String,
    pub market_size: u64,
}

impl MarketSize {
    pub fn new(product_id: impl Into<String>, market_size: u64) -> Self {
        Self {
            product_id: product_id.into(),
            market_size,
        }
    }
}

/// Everything the optimizer needs for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingOptimizerInput {
    pub product_ids: Vec<String>,
    pub conversion_rate_curves: Vec<ConversionRateCurve>,
    pub inventories: Vec<Inventory>,
    pub market_sizes: Vec<MarketSize>,
    /// Extra relational expressions added to the model, e.g.
    /// `product_price['A'] <= product_price['B']`
    #[serde(default)]
    pub adhoc_constraints: Vec<String>,
}

impl PricingOptimizerInput {
    pub fn new(
        product_ids: Vec<String>,
        conversion_rate_curves: Vec<ConversionRateCurve>,
        inventories: Vec<Inventory>,
        market_sizes: Vec<MarketSize>,
    ) -> Self {
        Self {
            product_ids,
            conversion_rate_curves,
            inventories,
            market_sizes,
            adhoc_constraints: Vec::new(),
        }
    }

    pub fn with_constraints<I, S>(mut self, constraints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.adhoc_constraints = constraints.into_iter().map(Into::into).collect();
        self
    }

    /// Lookup maps keyed by product id. Later entries win on duplicate ids.
    pub fn lookup(&self) -> InputLookup<'_> {
        InputLookup {
            curves: self
                .conversion_rate_curves
                .iter()
                .map(|c| (c.product_id.as_str(), c.curve.as_slice()))
                .collect(),
            inventories: self
                .inventories
                .iter()
                .map(|i| (i.product_id.as_str(), i.inventory))
                .collect(),
            market_sizes: self
                .market_sizes
                .iter()
                .map(|m| (m.product_id.as_str(), m.market_size))
                .collect(),
        }
    }
}

/// O(1) access to the per-product tables of a [`PricingOptimizerInput`]
#[derive(Debug)]
pub struct InputLookup<'a> {
    pub curves: HashMap<&'a str, &'a [Prediction]>,
    pub inventories: HashMap<&'a str, u64>,
    pub market_sizes: HashMap<&'a str, u64>,
}

impl<'a> InputLookup<'a> {
    pub fn curve(&self, product_id: &str) -> Option<&'a [Prediction]> {
        self.curves.get(product_id).copied()
    }

    pub fn inventory(&self, product_id: &str) -> Option<u64> {
        self.inventories.get(product_id).copied()
    }

    pub fn market_size(&self, product_id: &str) -> Option<u64> {
        self.market_sizes.get(product_id).copied()
    }
}

/// What an orchestration layer sends: conversion curves always come from the defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingRequest {
    pub product_ids: Vec<String>,
    #[serde(default)]
    pub inventories: Vec<Inventory>,
    #[serde(default)]
    pub market_sizes: Vec<MarketSize>,
    #[serde(default)]
    pub adhoc_constraints: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductResult {
    pub product_id: String,
    pub price: f64,
    pub revenue: f64,
    pub sales: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingOptimizerOutput {
    pub product_results: Vec<ProductResult>,
}

impl PricingOptimizerOutput {
    pub fn total_revenue(&self) -> f64 {
        self.product_results.iter().map(|r| r.revenue).sum()
    }

    pub fn result_for(&self, product_id: &str) -> Option<&ProductResult> {
        self.product_results
            .iter()
            .find(|r| r.product_id == product_id)
    }
}
