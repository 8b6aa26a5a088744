// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Directory of drop-off points.

use crate::models::EcoPoint;

/// Eco point used when an operator has no affiliation.
pub const DEFAULT_ECO_POINT_ID: &str = "1";

/// Static list of eco points.
#[derive(Debug, Clone)]
pub struct EcoPointDirectory {
    points: Vec<EcoPoint>,
}

impl Default for EcoPointDirectory {
    fn default() -> Self {
        let all = ["plastic", "paper", "glass", "metal", "electronics"];
        Self::new(vec![
            EcoPoint {
                id: "1".to_string(),
                name: "Eco Ponto Boa Viagem".to_string(),
                address: "Av. Conselheiro Aguiar, 1200 - Boa Viagem, Recife - PE".to_string(),
                opening_hours: "Seg-Sáb, 8h às 17h".to_string(),
                materials: all.iter().map(|m| m.to_string()).collect(),
            },
            EcoPoint {
                id: "2".to_string(),
                name: "Eco Ponto Casa Amarela".to_string(),
                address: "Estrada do Arraial, 3100 - Casa Amarela, Recife - PE".to_string(),
                opening_hours: "Seg-Sex, 8h às 16h".to_string(),
                materials: ["plastic", "paper", "glass", "metal"]
                    .iter()
                    .map(|m| m.to_string())
                    .collect(),
            },
            EcoPoint {
                id: "3".to_string(),
                name: "Eco Ponto Graças".to_string(),
                address: "Rua das Graças, 450 - Graças, Recife - PE".to_string(),
                opening_hours: "Ter-Dom, 9h às 18h".to_string(),
                materials: ["plastic", "paper", "electronics"]
                    .iter()
                    .map(|m| m.to_string())
                    .collect(),
            },
        ])
    }
}

impl EcoPointDirectory {
    pub fn new(points: Vec<EcoPoint>) -> Self {
        Self { points }
    }

    pub fn all(&self) -> &[EcoPoint] {
        &self.points
    }

    pub fn get(&self, id: &str) -> Option<&EcoPoint> {
        self.points.iter().find(|p| p.id == id)
    }
}
