//! Deterministic verification harnesses that drive the KPI regression
//! tests independently of a full `Simulation` run (§4.9).

pub mod ad_booster;
pub mod upgrade;
