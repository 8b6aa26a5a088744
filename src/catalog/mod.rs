// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Reference data: material rates, partner offers and eco points.

pub mod eco_points;
pub mod offers;
pub mod rates;

pub use eco_points::{EcoPointDirectory, DEFAULT_ECO_POINT_ID};
pub use offers::{OfferCatalog, OfferDraft};
pub use rates::{award_points, MaterialRateTable};
