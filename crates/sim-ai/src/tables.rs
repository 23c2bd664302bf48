//! Calendar and per-platform/per-genre probability modifiers baked in from
//! a YAML asset, mirroring how the workspace ships its other default
//! configuration tables.

use serde::Deserialize;
use sim_core::Platform;
use std::collections::HashMap;

/// Per-genre multipliers applied to streams, social reach, and viral odds.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct GenreMultiplier {
    pub streams: f64,
    pub social: f64,
    pub viral: f64,
}

/// Per-platform engagement shape: relative stream volume, chance of a
/// playlist placement, and listener save rate.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct PlatformEngagement {
    pub stream_multiplier: f64,
    pub playlist_chance: f64,
    pub save_rate: f64,
}

#[derive(Deserialize)]
struct RawTables {
    seasonal_user_growth: [f64; 12],
    seasonal_streaming: [f64; 12],
    seasonal_releases: [f64; 12],
    seasonal_social_activity: [f64; 12],
    day_of_week_streaming: [f64; 7],
    day_of_week_social_activity: [f64; 7],
    day_of_week_user_signups: [f64; 7],
    hour_of_day_streaming: [f64; 24],
    hour_of_day_social_activity: [f64; 24],
    genre_multipliers: HashMap<String, GenreMultiplier>,
    platform_engagement: HashMap<String, PlatformEngagement>,
}

/// Calendar-indexed lookup tables and per-genre/per-platform multipliers
/// consumed by the event generator (§4.4). Constructed once at startup
/// from the baked-in YAML asset and then shared read-only.
#[derive(Clone, Debug)]
pub struct ProbabilityTables {
    pub seasonal_user_growth: [f64; 12],
    pub seasonal_streaming: [f64; 12],
    pub seasonal_releases: [f64; 12],
    pub seasonal_social_activity: [f64; 12],
    pub day_of_week_streaming: [f64; 7],
    pub day_of_week_social_activity: [f64; 7],
    pub day_of_week_user_signups: [f64; 7],
    pub hour_of_day_streaming: [f64; 24],
    pub hour_of_day_social_activity: [f64; 24],
    pub genre_multipliers: HashMap<String, GenreMultiplier>,
    pub platform_engagement: HashMap<Platform, PlatformEngagement>,
}

/// Default YAML baked in from the workspace's `assets/data` directory.
pub const PROBABILITY_TABLES_YAML: &str =
    include_str!("../../../assets/data/probability_tables.yaml");

impl ProbabilityTables {
    pub fn from_default_yaml() -> Result<ProbabilityTables, serde_yaml::Error> {
        let raw: RawTables = serde_yaml::from_str(PROBABILITY_TABLES_YAML)?;
        let platform_engagement = Platform::ALL
            .iter()
            .filter_map(|p| raw.platform_engagement.get(p.as_str()).map(|e| (*p, *e)))
            .collect();
        Ok(ProbabilityTables {
            seasonal_user_growth: raw.seasonal_user_growth,
            seasonal_streaming: raw.seasonal_streaming,
            seasonal_releases: raw.seasonal_releases,
            seasonal_social_activity: raw.seasonal_social_activity,
            day_of_week_streaming: raw.day_of_week_streaming,
            day_of_week_social_activity: raw.day_of_week_social_activity,
            day_of_week_user_signups: raw.day_of_week_user_signups,
            hour_of_day_streaming: raw.hour_of_day_streaming,
            hour_of_day_social_activity: raw.hour_of_day_social_activity,
            genre_multipliers: raw.genre_multipliers,
            platform_engagement,
        })
    }

    pub fn genre(&self, genre: &str) -> GenreMultiplier {
        self.genre_multipliers
            .get(genre)
            .copied()
            .unwrap_or(GenreMultiplier {
                streams: 1.0,
                social: 1.0,
                viral: 1.0,
            })
    }

    pub fn platform(&self, platform: Platform) -> PlatformEngagement {
        self.platform_engagement
            .get(&platform)
            .copied()
            .unwrap_or(PlatformEngagement {
                stream_multiplier: 1.0,
                playlist_chance: 0.1,
                save_rate: 0.1,
            })
    }

    /// month is 0-indexed (0 = January).
    pub fn streaming_modifier(&self, month: usize, weekday: usize, hour: usize) -> f64 {
        self.seasonal_streaming[month % 12]
            * self.day_of_week_streaming[weekday % 7]
            * self.hour_of_day_streaming[hour % 24]
    }

    pub fn social_activity_modifier(&self, month: usize, weekday: usize, hour: usize) -> f64 {
        self.seasonal_social_activity[month % 12]
            * self.day_of_week_social_activity[weekday % 7]
            * self.hour_of_day_social_activity[hour % 24]
    }

    pub fn signup_modifier(&self, month: usize, weekday: usize) -> f64 {
        self.seasonal_user_growth[month % 12] * self.day_of_week_user_signups[weekday % 7]
    }

    pub fn release_modifier(&self, month: usize) -> f64 {
        self.seasonal_releases[month % 12]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_from_baked_in_yaml() {
        let tables = ProbabilityTables::from_default_yaml().unwrap();
        assert_eq!(tables.platform_engagement.len(), Platform::ALL.len());
        assert!(tables.genre_multipliers.contains_key("pop"));
    }

    #[test]
    fn unknown_genre_falls_back_to_neutral() {
        let tables = ProbabilityTables::from_default_yaml().unwrap();
        let g = tables.genre("nonexistent_genre");
        assert_eq!(g.streams, 1.0);
        assert_eq!(g.social, 1.0);
        assert_eq!(g.viral, 1.0);
    }

    #[test]
    fn modifiers_are_positive_for_every_calendar_slot() {
        let tables = ProbabilityTables::from_default_yaml().unwrap();
        for month in 0..12 {
            for weekday in 0..7 {
                for hour in 0..24 {
                    assert!(tables.streaming_modifier(month, weekday, hour) > 0.0);
                    assert!(tables.social_activity_modifier(month, weekday, hour) > 0.0);
                }
            }
        }
    }
}
