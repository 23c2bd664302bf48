//! Weighted distribution tables used to allocate new users across tiers
//! and archetypes.

use crate::error::{DomainError, DomainResult};
use crate::types::{SubscriptionTier, UserArchetype};
use serde::{Deserialize, Serialize};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Weight per archetype; used both for the fixed signup distribution
/// (hobbyist 50, emerging 25, established 15, label 7, enterprise 3) and
/// for scaling per-archetype cohort growth.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ArchetypeDistribution {
    pub hobbyist: f64,
    pub emerging_artist: f64,
    pub established_artist: f64,
    pub label: f64,
    pub enterprise: f64,
}

impl Default for ArchetypeDistribution {
    fn default() -> Self {
        Self {
            hobbyist: 0.50,
            emerging_artist: 0.25,
            established_artist: 0.15,
            label: 0.07,
            enterprise: 0.03,
        }
    }
}

impl ArchetypeDistribution {
    pub fn weight(&self, archetype: UserArchetype) -> f64 {
        match archetype {
            UserArchetype::Hobbyist => self.hobbyist,
            UserArchetype::EmergingArtist => self.emerging_artist,
            UserArchetype::EstablishedArtist => self.established_artist,
            UserArchetype::Label => self.label,
            UserArchetype::Enterprise => self.enterprise,
        }
    }

    pub fn weights_in_order(&self) -> [f64; 5] {
        [
            self.hobbyist,
            self.emerging_artist,
            self.established_artist,
            self.label,
            self.enterprise,
        ]
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate_weights(&self.weights_in_order())
            .map_err(|sum| DomainError::InvalidArchetypeDistribution(sum))
    }
}

/// Weight per subscription tier, conditioned on the archetype that is
/// signing up (e.g. enterprises skew lifetime, hobbyists skew monthly).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TierDistribution {
    pub monthly: f64,
    pub yearly: f64,
    pub lifetime: f64,
}

impl Default for TierDistribution {
    fn default() -> Self {
        Self {
            monthly: 0.70,
            yearly: 0.25,
            lifetime: 0.05,
        }
    }
}

impl TierDistribution {
    pub fn for_archetype(archetype: UserArchetype) -> TierDistribution {
        match archetype {
            UserArchetype::Hobbyist => TierDistribution {
                monthly: 0.85,
                yearly: 0.14,
                lifetime: 0.01,
            },
            UserArchetype::EmergingArtist => TierDistribution {
                monthly: 0.70,
                yearly: 0.27,
                lifetime: 0.03,
            },
            UserArchetype::EstablishedArtist => TierDistribution {
                monthly: 0.45,
                yearly: 0.40,
                lifetime: 0.15,
            },
            UserArchetype::Label => TierDistribution {
                monthly: 0.25,
                yearly: 0.45,
                lifetime: 0.30,
            },
            UserArchetype::Enterprise => TierDistribution {
                monthly: 0.10,
                yearly: 0.35,
                lifetime: 0.55,
            },
        }
    }

    pub fn weight(&self, tier: SubscriptionTier) -> f64 {
        match tier {
            SubscriptionTier::Monthly => self.monthly,
            SubscriptionTier::Yearly => self.yearly,
            SubscriptionTier::Lifetime => self.lifetime,
        }
    }

    pub fn weights_in_order(&self) -> [f64; 3] {
        [self.monthly, self.yearly, self.lifetime]
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate_weights(&self.weights_in_order())
            .map_err(DomainError::InvalidTierDistribution)
    }
}

fn validate_weights(weights: &[f64]) -> Result<(), f64> {
    let sum: f64 = weights.iter().sum();
    if weights.iter().any(|w| *w < 0.0 || !w.is_finite()) || (sum - 1.0).abs() > 1e-3 {
        return Err(sum);
    }
    let _ = WEIGHT_SUM_TOLERANCE;
    Ok(())
}

/// Monthly subscription price points used to credit revenue for newly
/// allocated users (see growth controller §4.6): monthly $49, yearly $39
/// (amortized monthly), lifetime $58.25 amortized.
pub struct TierPricing;

impl TierPricing {
    pub const MONTHLY_USD: f64 = 49.0;
    pub const YEARLY_USD: f64 = 39.0;
    pub const LIFETIME_AMORTIZED_USD: f64 = 58.25;

    pub fn monthly_price(tier: SubscriptionTier) -> f64 {
        match tier {
            SubscriptionTier::Monthly => Self::MONTHLY_USD,
            SubscriptionTier::Yearly => Self::YEARLY_USD,
            SubscriptionTier::Lifetime => Self::LIFETIME_AMORTIZED_USD,
        }
    }

    /// Weighted average monthly revenue per new user given a tier mix.
    pub fn weighted_avg_revenue(dist: &TierDistribution) -> f64 {
        dist.monthly * Self::MONTHLY_USD
            + dist.yearly * Self::YEARLY_USD
            + dist.lifetime * Self::LIFETIME_AMORTIZED_USD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_archetype_distribution_sums_to_one() {
        ArchetypeDistribution::default().validate().unwrap();
    }

    #[test]
    fn default_tier_distribution_sums_to_one() {
        TierDistribution::default().validate().unwrap();
        for a in UserArchetype::ALL {
            TierDistribution::for_archetype(a).validate().unwrap();
        }
    }

    #[test]
    fn rejects_distribution_not_summing_to_one() {
        let bad = TierDistribution {
            monthly: 0.5,
            yearly: 0.1,
            lifetime: 0.1,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn weighted_avg_revenue_is_between_extremes() {
        let dist = TierDistribution::default();
        let avg = TierPricing::weighted_avg_revenue(&dist);
        assert!(avg > TierPricing::YEARLY_USD);
        assert!(avg < TierPricing::MONTHLY_USD);
    }
}
