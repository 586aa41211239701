//! A single financial projection and its field-resolution rules

use serde::{Deserialize, Serialize};

/// Share of EBITDA used as a free-cash-flow proxy when net income is unusable
pub const EBITDA_FCF_RATIO: f64 = 0.7;

/// Growth rate assumed when a projection carries none
pub const DEFAULT_GROWTH_RATE: f64 = 0.03;

/// Terminal multiple assumed when a projection carries none
pub const DEFAULT_TERMINAL_MULTIPLE: f64 = 8.0;

/// Which input produced the free-cash-flow proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FcfSource {
    /// Net income was finite and positive
    NetIncome,
    /// Net income unusable; 70% of EBITDA
    Ebitda,
    /// Neither figure usable; proxy is zero
    Unavailable,
}

/// Financial projection assumptions for one scenario
///
/// Every field is optional: absence means "no information", not zero.
/// The `resolved_*` accessors apply the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ebitda: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_income: Option<f64>,

    /// Signed cash at t=0: negative is an outlay, positive is proceeds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_investment: Option<f64>,

    /// Per-year compounding growth of the cash-flow proxy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth_rate: Option<f64>,

    /// Multiple of final-year cash flow taken as terminal value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal_multiple: Option<f64>,
}

impl Projection {
    /// Projection driven by net income
    pub fn from_net_income(net_income: f64) -> Self {
        Self {
            net_income: Some(net_income),
            ..Self::default()
        }
    }

    /// Projection driven by EBITDA
    pub fn from_ebitda(ebitda: f64) -> Self {
        Self {
            ebitda: Some(ebitda),
            ..Self::default()
        }
    }

    pub fn with_initial_investment(mut self, amount: f64) -> Self {
        self.initial_investment = Some(amount);
        self
    }

    pub fn with_growth_rate(mut self, rate: f64) -> Self {
        self.growth_rate = Some(rate);
        self
    }

    pub fn with_terminal_multiple(mut self, multiple: f64) -> Self {
        self.terminal_multiple = Some(multiple);
        self
    }

    /// Free-cash-flow proxy and where it came from
    ///
    /// Priority: positive finite net income, then `ebitda * 0.7` for any
    /// finite EBITDA, then zero.
    pub fn free_cash_flow_source(&self) -> (f64, FcfSource) {
        if let Some(ni) = finite(self.net_income) {
            if ni > 0.0 {
                return (ni, FcfSource::NetIncome);
            }
        }
        if let Some(ebitda) = finite(self.ebitda) {
            return (ebitda * EBITDA_FCF_RATIO, FcfSource::Ebitda);
        }
        (0.0, FcfSource::Unavailable)
    }

    pub fn free_cash_flow_proxy(&self) -> f64 {
        self.free_cash_flow_source().0
    }

    pub fn resolved_initial_investment(&self) -> f64 {
        finite(self.initial_investment).unwrap_or(0.0)
    }

    pub fn resolved_growth_rate(&self) -> f64 {
        finite(self.growth_rate).unwrap_or(DEFAULT_GROWTH_RATE)
    }

    pub fn resolved_terminal_multiple(&self) -> f64 {
        finite(self.terminal_multiple).unwrap_or(DEFAULT_TERMINAL_MULTIPLE)
    }

    /// True when no financial figure is present and positive
    ///
    /// Hosts use this to decide whether to ask an estimation source for a
    /// replacement before running a comparison.
    pub fn is_degenerate(&self) -> bool {
        [self.ebitda, self.net_income, self.initial_investment]
            .into_iter()
            .filter_map(finite)
            .all(|v| v <= 0.0)
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
