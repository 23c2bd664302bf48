//! Core domain entities for the Real-Life Simulation Engine.
//!
//! These are plain serializable value types; mutation and invariant
//! enforcement live in the owning components (`sim-runtime`'s engine and
//! storage, this crate's `aggregate` module) rather than on these structs
//! directly, mirroring the validation-as-free-functions style used
//! elsewhere in this workspace.

use crate::ids::{ReleaseId, TransactionId, UserId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Behavioral archetype of a simulated user, driving signup distribution,
/// revenue attribution, and AI-policy weighting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UserArchetype {
    Hobbyist,
    EmergingArtist,
    EstablishedArtist,
    Label,
    Enterprise,
}

impl UserArchetype {
    pub const ALL: [UserArchetype; 5] = [
        UserArchetype::Hobbyist,
        UserArchetype::EmergingArtist,
        UserArchetype::EstablishedArtist,
        UserArchetype::Label,
        UserArchetype::Enterprise,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UserArchetype::Hobbyist => "hobbyist",
            UserArchetype::EmergingArtist => "emerging_artist",
            UserArchetype::EstablishedArtist => "established_artist",
            UserArchetype::Label => "label",
            UserArchetype::Enterprise => "enterprise",
        }
    }
}

/// Subscription tier. There is intentionally no `Free` variant: the
/// no-free-tier invariant (I3) is enforced by the type system rather than
/// by a runtime check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SubscriptionTier {
    Monthly,
    Yearly,
    Lifetime,
}

impl SubscriptionTier {
    pub const ALL: [SubscriptionTier; 3] = [
        SubscriptionTier::Monthly,
        SubscriptionTier::Yearly,
        SubscriptionTier::Lifetime,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionTier::Monthly => "monthly",
            SubscriptionTier::Yearly => "yearly",
            SubscriptionTier::Lifetime => "lifetime",
        }
    }

    /// Next tier in the monthly -> yearly -> lifetime upgrade path, or
    /// `None` if already at the top.
    pub fn upgraded(self) -> Option<SubscriptionTier> {
        match self {
            SubscriptionTier::Monthly => Some(SubscriptionTier::Yearly),
            SubscriptionTier::Yearly => Some(SubscriptionTier::Lifetime),
            SubscriptionTier::Lifetime => None,
        }
    }
}

/// Streaming/social distribution platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    Spotify,
    AppleMusic,
    YoutubeMusic,
    Tidal,
    Deezer,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Spotify,
        Platform::AppleMusic,
        Platform::YoutubeMusic,
        Platform::Tidal,
        Platform::Deezer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Spotify => "spotify",
            Platform::AppleMusic => "apple_music",
            Platform::YoutubeMusic => "youtube_music",
            Platform::Tidal => "tidal",
            Platform::Deezer => "deezer",
        }
    }
}

/// Kind of music release.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseKind {
    Single,
    Ep,
    Album,
}

/// Genre labels the event generator's multiplier table is keyed on.
pub const GENRES: &[&str] = &[
    "pop",
    "hip_hop",
    "electronic",
    "rock",
    "indie",
    "classical",
    "jazz",
    "country",
];

/// Kind of financial transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Subscription,
    Purchase,
    Payout,
    Refund,
}

/// Financial transaction lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

/// A fully materialized sample-pool user. At most `MAX_SAMPLE_SIZE` of
/// these exist at once (I4/I8); the remainder of the population lives
/// only as `AggregateUsers` cohort counters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulatedUser {
    pub id: UserId,
    pub archetype: UserArchetype,
    pub tier: SubscriptionTier,
    pub monthly_revenue: Decimal,
    pub total_streams: u64,
    pub total_releases: u32,
    pub total_followers: u64,
    pub engagement_rate: f32,
    pub viral_potential: f32,
    pub churn_risk: f32,
    pub last_active_at: NaiveDate,
    pub lifetime_value: Decimal,
    pub created_at: NaiveDate,
}

/// A music release owned by a sample-pool user.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulatedRelease {
    pub id: ReleaseId,
    pub owner_id: UserId,
    pub kind: ReleaseKind,
    pub genre: String,
    pub released_at: NaiveDate,
    pub total_streams: u64,
    pub daily_streams: u64,
    pub peak_streams: u64,
    pub total_revenue: Decimal,
    pub platforms: BTreeSet<Platform>,
    pub is_viral: bool,
    pub viral_date: Option<NaiveDate>,
}

impl SimulatedRelease {
    pub fn days_since_release(&self, today: NaiveDate) -> i64 {
        (today - self.released_at).num_days().max(0)
    }
}

/// A financial transaction (subscription, purchase, payout, or refund).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulatedTransaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub currency: String,
    pub status: TransactionStatus,
    pub created_at: NaiveDate,
    pub processed_at: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_upgrade_path_terminates_at_lifetime() {
        assert_eq!(
            SubscriptionTier::Monthly.upgraded(),
            Some(SubscriptionTier::Yearly)
        );
        assert_eq!(
            SubscriptionTier::Yearly.upgraded(),
            Some(SubscriptionTier::Lifetime)
        );
        assert_eq!(SubscriptionTier::Lifetime.upgraded(), None);
    }

    #[test]
    fn no_tier_variant_named_free() {
        for t in SubscriptionTier::ALL {
            assert_ne!(t.as_str(), "free");
        }
    }

    #[test]
    fn days_since_release_never_negative() {
        let release = SimulatedRelease {
            id: ReleaseId(1),
            owner_id: UserId(1),
            kind: ReleaseKind::Single,
            genre: "pop".to_string(),
            released_at: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            total_streams: 0,
            daily_streams: 0,
            peak_streams: 0,
            total_revenue: Decimal::ZERO,
            platforms: BTreeSet::new(),
            is_viral: false,
            viral_date: None,
        };
        let earlier = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(release.days_since_release(earlier), 0);
    }
}
