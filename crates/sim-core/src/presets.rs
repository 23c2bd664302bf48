//! The closed set of period presets the control surface accepts.

/// One entry in the period preset table.
#[derive(Clone, Copy, Debug)]
pub struct PeriodPreset {
    pub name: &'static str,
    pub days: u32,
    pub description: &'static str,
}

/// All 17 presets, `1_month` through `50_years`, with their day counts.
pub const PERIOD_PRESETS: &[PeriodPreset] = &[
    PeriodPreset { name: "1_month", days: 30, description: "One month snapshot of near-term activity" },
    PeriodPreset { name: "3_months", days: 90, description: "One quarter of growth and churn" },
    PeriodPreset { name: "6_months", days: 180, description: "Half-year trend validation" },
    PeriodPreset { name: "1_year", days: 365, description: "Full annual cycle including seasonality" },
    PeriodPreset { name: "3_years", days: 1095, description: "Medium-term trajectory to the year-3 target" },
    PeriodPreset { name: "6_years", days: 2190, description: "Post-target-market saturation onset" },
    PeriodPreset { name: "10_years", days: 3650, description: "Decade-scale platform maturity" },
    PeriodPreset { name: "14_years", days: 5110, description: "Extended maturity horizon" },
    PeriodPreset { name: "18_years", days: 6570, description: "Extended maturity horizon" },
    PeriodPreset { name: "22_years", days: 8030, description: "Extended maturity horizon" },
    PeriodPreset { name: "26_years", days: 9490, description: "Extended maturity horizon" },
    PeriodPreset { name: "30_years", days: 10950, description: "Extended maturity horizon" },
    PeriodPreset { name: "34_years", days: 12410, description: "Extended maturity horizon" },
    PeriodPreset { name: "38_years", days: 13870, description: "Extended maturity horizon" },
    PeriodPreset { name: "42_years", days: 15330, description: "Extended maturity horizon" },
    PeriodPreset { name: "46_years", days: 16790, description: "Extended maturity horizon" },
    PeriodPreset { name: "50_years", days: 18250, description: "Total addressable market saturation horizon" },
];

/// Look up the day count for a preset name.
pub fn period_days(name: &str) -> Option<u32> {
    PERIOD_PRESETS
        .iter()
        .find(|p| p.name == name)
        .map(|p| p.days)
}

/// Estimated real wall-clock time to run a preset at the fixed
/// acceleration (`REAL_MS_PER_SIMULATED_DAY`).
pub fn estimated_real_time(days: u32) -> std::time::Duration {
    std::time::Duration::from_millis(days as u64 * crate::clock::REAL_MS_PER_SIMULATED_DAY)
}

/// Fixed acceleration metadata surfaced by the `/periods` control-surface
/// endpoint equivalent.
pub const ACCELERATION_PERCENT: f64 = 98.0;
pub const REAL_SECONDS_PER_DAY: f64 = 0.48;
