// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Material rate table and the points formula.

use crate::ledger::LedgerError;
use crate::models::MaterialRate;

/// Default rates in points per kilogram.
const DEFAULT_RATES: [(&str, &str, f64); 5] = [
    ("plastic", "Plástico", 50.0),
    ("paper", "Papel", 30.0),
    ("glass", "Vidro", 40.0),
    ("metal", "Metal", 70.0),
    ("electronics", "Eletrônicos", 100.0),
];

/// Products are snapped to this many decimal places before rounding, so
/// binary noise such as `50.49999999999999` rounds like `50.5`.
const SNAP_SCALE: f64 = 1e6;

/// Static, read-only mapping from material category to rate.
#[derive(Debug, Clone)]
pub struct MaterialRateTable {
    rates: Vec<MaterialRate>,
}

impl Default for MaterialRateTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_RATES
                .iter()
                .map(|(id, name, rate)| MaterialRate {
                    category_id: id.to_string(),
                    display_name: name.to_string(),
                    points_per_kg: *rate,
                })
                .collect(),
        )
    }
}

impl MaterialRateTable {
    pub fn new(rates: Vec<MaterialRate>) -> Self {
        Self { rates }
    }

    /// All rates in display order.
    pub fn all(&self) -> &[MaterialRate] {
        &self.rates
    }

    /// Look up the rate for a category.
    pub fn rate_for(&self, category: &str) -> Result<&MaterialRate, LedgerError> {
        self.rates
            .iter()
            .find(|rate| rate.category_id == category)
            .ok_or_else(|| LedgerError::InvalidMaterial(category.to_string()))
    }

    /// Display name for a category, falling back to the key itself.
    pub fn display_name<'a>(&'a self, category: &'a str) -> &'a str {
        self.rate_for(category)
            .map(|rate| rate.display_name.as_str())
            .unwrap_or(category)
    }

    /// Points earned for `weight_kg` of `category`.
    pub fn points_for(&self, category: &str, weight_kg: f64) -> Result<u64, LedgerError> {
        let rate = self.rate_for(category)?;
        award_points(rate.points_per_kg, weight_kg)
    }
}

/// `round_half_up(points_per_kg * weight_kg)`.
///
/// Pure and deterministic. Rejects non-positive, non-finite and overflowing
/// weights with `InvalidWeight`.
pub fn award_points(points_per_kg: f64, weight_kg: f64) -> Result<u64, LedgerError> {
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(LedgerError::InvalidWeight(format!(
            "weight must be a positive number of kilograms, got {weight_kg}"
        )));
    }

    let product = points_per_kg * weight_kg;
    if !product.is_finite() || product >= u64::MAX as f64 {
        return Err(LedgerError::InvalidWeight(format!(
            "weight {weight_kg} kg is too large"
        )));
    }

    let snapped = (product * SNAP_SCALE).round() / SNAP_SCALE;
    Ok((snapped + 0.5).floor() as u64)
}
