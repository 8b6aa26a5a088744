// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Recycling statistics for a drop-off point.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::catalog::MaterialRateTable;
use crate::models::RecycleEvent;

/// Weight recycled of one material and its share of the total.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct MaterialShare {
    pub category_id: String,
    pub display_name: String,
    pub weight_kg: f64,
    /// Percentage of the total weight, one decimal place.
    pub share_percent: f64,
}

/// Aggregate of the recycling received at one eco point.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct EcoPointStats {
    pub eco_point_id: String,
    /// Only events at or after this instant were counted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<DateTime<Utc>>,
    pub total_weight_kg: f64,
    pub points_distributed: u64,
    /// Distinct accounts that recycled here.
    pub accounts_served: usize,
    pub deliveries: usize,
    /// Material with the largest weight, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_material: Option<String>,
    /// Heaviest first.
    pub materials: Vec<MaterialShare>,
}

impl EcoPointStats {
    /// Aggregate the events that originated at `eco_point_id`.
    pub fn collect<'a>(
        eco_point_id: &str,
        since: Option<DateTime<Utc>>,
        events: impl IntoIterator<Item = &'a RecycleEvent>,
        rates: &MaterialRateTable,
    ) -> Self {
        let mut total_weight_kg = 0.0;
        let mut points_distributed = 0u64;
        let mut deliveries = 0usize;
        let mut accounts = HashSet::new();
        let mut by_material: BTreeMap<&str, f64> = BTreeMap::new();

        for event in events {
            if event.origin_eco_point_id != eco_point_id {
                continue;
            }
            if since.is_some_and(|since| event.timestamp < since) {
                continue;
            }
            deliveries += 1;
            total_weight_kg += event.weight_kg;
            points_distributed = points_distributed.saturating_add(event.points_awarded);
            accounts.insert(&event.account_id);
            *by_material.entry(event.material_category.as_str()).or_default() += event.weight_kg;
        }

        let mut materials: Vec<MaterialShare> = by_material
            .into_iter()
            .map(|(category, weight_kg)| MaterialShare {
                category_id: category.to_string(),
                display_name: rates.display_name(category).to_string(),
                weight_kg,
                share_percent: round_one_decimal(weight_kg / total_weight_kg * 100.0),
            })
            .collect();
        // BTreeMap order breaks ties alphabetically.
        materials.sort_by(|a, b| b.weight_kg.total_cmp(&a.weight_kg));

        Self {
            eco_point_id: eco_point_id.to_string(),
            since,
            total_weight_kg,
            points_distributed,
            accounts_served: accounts.len(),
            deliveries,
            top_material: materials.first().map(|m| m.category_id.clone()),
            materials,
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
