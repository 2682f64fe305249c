// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod error;
mod flat;

pub use error::{SearchError, DEFAULT_STEP_LIMIT};
pub use flat::{find_route, find_route_scaled, heuristic_scale};
