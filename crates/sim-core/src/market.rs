//! Macro-economic and viral-dynamics state consumed by the event
//! generator and growth controller (§4.5).

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MacroEconomics {
    pub interest_rate: f64,
    pub inflation_rate: f64,
    pub consumer_confidence: f64,
    pub recession_risk: f64,
    pub music_industry_growth: f64,
    pub creator_economy_multiplier: f64,
}

impl Default for MacroEconomics {
    fn default() -> Self {
        Self {
            interest_rate: 0.05,
            inflation_rate: 0.03,
            consumer_confidence: 0.70,
            recession_risk: 0.15,
            music_industry_growth: 0.08,
            creator_economy_multiplier: 1.5,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ViralDynamics {
    pub viral_coefficient: f64,
    pub referral_conversion_rate: f64,
    pub network_effect_multiplier: f64,
}

impl Default for ViralDynamics {
    fn default() -> Self {
        Self {
            viral_coefficient: 0.3,
            referral_conversion_rate: 0.1,
            network_effect_multiplier: 1.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarketConditions {
    pub growth_multiplier: f64,
    pub competition_level: f64,
    pub economic_health: f64,
    pub streaming_market_growth: f64,
    pub trends: Vec<String>,
    pub dominant_platforms: Vec<String>,
    pub regulatory_pressure: f64,
    pub ai_adoption_rate: f64,
    pub macro_econ: MacroEconomics,
    pub viral: ViralDynamics,
}

impl Default for MarketConditions {
    fn default() -> Self {
        Self {
            growth_multiplier: 1.0,
            competition_level: 0.5,
            economic_health: 0.65,
            streaming_market_growth: 0.06,
            trends: vec!["short_form_video".to_string(), "lo_fi".to_string()],
            dominant_platforms: vec!["spotify".to_string(), "youtube_music".to_string()],
            regulatory_pressure: 0.2,
            ai_adoption_rate: 0.3,
            macro_econ: MacroEconomics::default(),
            viral: ViralDynamics::default(),
        }
    }
}

impl MarketConditions {
    /// `economic_health = 0.4 * confidence + 0.3 * (1 - recession_risk) +
    /// 0.3 * (1 - inflation / 0.15)`.
    pub fn recompute_economic_health(&mut self) {
        let m = &self.macro_econ;
        self.economic_health = 0.4 * m.consumer_confidence
            + 0.3 * (1.0 - m.recession_risk)
            + 0.3 * (1.0 - (m.inflation_rate / 0.15)).max(0.0);
    }

    /// Scaling factor applied to trajectory/event growth terms.
    pub fn economic_multiplier(&self) -> f64 {
        (0.5 + self.economic_health).clamp(0.3, 1.5)
    }

    /// `viral_coefficient * referral_conversion + network boost from
    /// log10(population) * network_effect_multiplier + word-of-mouth from
    /// active ratio + social-proof saturation term, clamped >= 1.0`.
    pub fn viral_growth_multiplier(&self, population: u64, active_ratio: f64) -> f64 {
        let v = &self.viral;
        let base = v.viral_coefficient * v.referral_conversion_rate;
        let network_boost = (population.max(1) as f64).log10() * v.network_effect_multiplier * 0.01;
        let word_of_mouth = active_ratio.clamp(0.0, 1.0) * 0.05;
        let social_proof = (1.0 - (-((population.max(1) as f64) / 1_000_000.0)).exp()) * 0.1;
        (1.0 + base + network_boost + word_of_mouth + social_proof).max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn economic_health_in_reasonable_band() {
        let mut m = MarketConditions::default();
        m.recompute_economic_health();
        assert!(m.economic_health > 0.0 && m.economic_health < 1.0);
    }

    #[test]
    fn viral_growth_multiplier_is_at_least_one() {
        let m = MarketConditions::default();
        assert!(m.viral_growth_multiplier(0, 0.0) >= 1.0);
        assert!(m.viral_growth_multiplier(50_000_000, 0.8) >= 1.0);
    }

    #[test]
    fn viral_growth_multiplier_increases_with_population() {
        let m = MarketConditions::default();
        let small = m.viral_growth_multiplier(1_000, 0.5);
        let large = m.viral_growth_multiplier(10_000_000, 0.5);
        assert!(large >= small);
    }
}
