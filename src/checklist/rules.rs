use std::fmt::Display;

use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

pub const MAX_RISK_PCT: f64 = 2.;

#[derive(Debug, Error, PartialEq)]
pub enum ChecklistError {
    #[error("Risk must be between 0% and 2%, got {0}%")]
    RiskOutOfRange(f64),
    #[error("Reward ratio must be a non-negative number, got {0}")]
    InvalidRewardRatio(f64),
}

/// Answer to "is the higher timeframe trend aligned?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
pub enum TrendAlignment {
    Yes,
    No,
    Ranging,
}

impl Display for TrendAlignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendAlignment::Yes => write!(f, "yes"),
            TrendAlignment::No => write!(f, "no"),
            TrendAlignment::Ranging => write!(f, "ranging"),
        }
    }
}

/// How much of the account is put at risk and what reward is targeted for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskPlan {
    risk_pct: f64,
    reward_ratio: f64,
}

impl RiskPlan {
    pub fn new(risk_pct: f64, reward_ratio: f64) -> Result<Self, ChecklistError> {
        if !(0. ..=MAX_RISK_PCT).contains(&risk_pct) {
            return Err(ChecklistError::RiskOutOfRange(risk_pct));
        }
        if !reward_ratio.is_finite() || reward_ratio < 0. {
            return Err(ChecklistError::InvalidRewardRatio(reward_ratio));
        }
        Ok(Self {
            risk_pct,
            reward_ratio,
        })
    }

    pub fn risk_pct(&self) -> f64 {
        self.risk_pct
    }

    pub fn reward_ratio(&self) -> f64 {
        self.reward_ratio
    }

    pub fn reward_pct(&self) -> f64 {
        self.risk_pct * self.reward_ratio
    }
}

/// A single condition that has to hold before a trade is taken. Declared in the order the
/// checklist is walked through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Requirement {
    TrendAligned,
    NewsChecked,
    PointOfInterest,
    ChangeOfCharacter,
    Imbalance,
    Divergence,
}

impl Requirement {
    pub fn advice(&self) -> &'static str {
        match self {
            Requirement::TrendAligned => "Higher timeframe trend is not in your favor.",
            Requirement::NewsChecked => "Check the economic calendar for red folder news.",
            Requirement::PointOfInterest => "Wait for price to hit your POI.",
            Requirement::ChangeOfCharacter => "Wait for market structure shift (ChoCh).",
            Requirement::Imbalance => "Wait for a Fair Value Gap or Order Block.",
            Requirement::Divergence => "Wait for RSI/indicator divergence.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Verdict {
    Permitted { risk_pct: f64, reward_pct: f64 },
    Denied { missing: Vec<Requirement> },
}

impl Verdict {
    pub fn is_permitted(&self) -> bool {
        matches!(self, Verdict::Permitted { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeChecklist {
    pub trend: TrendAlignment,
    pub news_checked: bool,
    pub poi_reached: bool,
    pub choch_confirmed: bool,
    pub imbalance_present: bool,
    pub divergence_confirmed: bool,
    pub risk: RiskPlan,
}

impl TradeChecklist {
    /// Every unmet requirement, in checklist order.
    pub fn missing(&self) -> Vec<Requirement> {
        [
            (Requirement::TrendAligned, self.trend == TrendAlignment::Yes),
            (Requirement::NewsChecked, self.news_checked),
            (Requirement::PointOfInterest, self.poi_reached),
            (Requirement::ChangeOfCharacter, self.choch_confirmed),
            (Requirement::Imbalance, self.imbalance_present),
            (Requirement::Divergence, self.divergence_confirmed),
        ]
        .into_iter()
        .filter(|(_, met)| !met)
        .map(|(requirement, _)| requirement)
        .collect()
    }

    /// Trading is permitted only when every requirement holds.
    pub fn evaluate(&self) -> Verdict {
        let missing = self.missing();
        if missing.is_empty() {
            Verdict::Permitted {
                risk_pct: self.risk.risk_pct(),
                reward_pct: self.risk.reward_pct(),
            }
        } else {
            Verdict::Denied { missing }
        }
    }
}
