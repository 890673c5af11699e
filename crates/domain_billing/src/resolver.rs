//! Effective-State Resolver
//!
//! Works out the status, rate, and weekly frequency in force for one facility
//! in one month. Each precedence layer is a plain function that inspects the
//! facility and answers with a [`LayerOutcome`]:
//!
//! - `Commit` ends resolution immediately with a complete state
//! - `Partial` sets some fields; fields already set by a higher layer are kept
//! - `NoOpinion` leaves everything to lower layers
//!
//! Whatever is still unset after the last layer comes from the facility's
//! base contract.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::BillingPeriod;

use crate::error::BillingError;
use crate::facility::{EffectiveStatus, FacilityProfile};
use crate::overrides::{MonthlyOverride, SeasonalRule};

/// The layer that decided a resolved status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionLayer {
    ClosedGuard,
    GoLiveGuard,
    MonthlyOverride,
    SeasonalRule,
    PauseWindow,
    Base,
}

/// Status, rate, and frequency in force for a facility in one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedState {
    pub status: EffectiveStatus,
    pub rate: Decimal,
    pub frequency_per_week: u32,
    pub status_source: ResolutionLayer,
    /// Notes from a monthly override, when one applied
    pub notes: Option<String>,
}

impl ResolvedState {
    fn terminal(status: EffectiveStatus, source: ResolutionLayer) -> Self {
        Self {
            status,
            rate: Decimal::ZERO,
            frequency_per_week: 0,
            status_source: source,
            notes: None,
        }
    }

    /// Only active facilities contribute to invoice totals
    pub fn included_in_total(&self) -> bool {
        self.status.is_billable()
    }
}

/// Fields set so far by the layers already evaluated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialState {
    pub status: Option<(EffectiveStatus, ResolutionLayer)>,
    pub rate: Option<Decimal>,
    pub frequency_per_week: Option<u32>,
    pub notes: Option<String>,
}

impl PartialState {
    /// Fills fields that are still unset from a lower-precedence layer
    fn merge(&mut self, lower: PartialState) {
        if self.status.is_none() {
            self.status = lower.status;
        }
        if self.rate.is_none() {
            self.rate = lower.rate;
        }
        if self.frequency_per_week.is_none() {
            self.frequency_per_week = lower.frequency_per_week;
        }
        if self.notes.is_none() {
            self.notes = lower.notes;
        }
    }

    fn finish(self, facility: &FacilityProfile) -> ResolvedState {
        let (status, status_source) = self
            .status
            .unwrap_or((facility.status.into(), ResolutionLayer::Base));
        ResolvedState {
            status,
            rate: self.rate.unwrap_or(facility.default_monthly_rate),
            frequency_per_week: self
                .frequency_per_week
                .unwrap_or(facility.normal_frequency_per_week),
            status_source,
            notes: self.notes,
        }
    }
}

/// Answer of one precedence layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerOutcome {
    Commit(ResolvedState),
    Partial(PartialState),
    NoOpinion,
}

/// Everything a layer may look at
#[derive(Debug, Clone, Copy)]
pub struct ResolutionContext<'a> {
    pub facility: &'a FacilityProfile,
    pub seasonal_rules: &'a [SeasonalRule],
    pub monthly_overrides: &'a [MonthlyOverride],
    pub period: BillingPeriod,
}

type Layer = fn(&ResolutionContext<'_>) -> Result<LayerOutcome, BillingError>;

/// Highest precedence first; the base contract is applied after the last one
const LAYERS: [Layer; 5] = [
    closed_guard,
    go_live_guard,
    monthly_override_layer,
    seasonal_rule_layer,
    pause_window_layer,
];

/// Resolves the effective state of `facility` for `period`
///
/// Rules and overrides belonging to other facilities are ignored, so callers
/// may pass a client-wide slice.
///
/// # Errors
///
/// `DataIntegrity` when the facility's stored pause window ends before it
/// starts.
pub fn resolve(
    facility: &FacilityProfile,
    seasonal_rules: &[SeasonalRule],
    monthly_overrides: &[MonthlyOverride],
    period: BillingPeriod,
) -> Result<ResolvedState, BillingError> {
    let ctx = ResolutionContext {
        facility,
        seasonal_rules,
        monthly_overrides,
        period,
    };

    let mut state = PartialState::default();
    for layer in LAYERS {
        match layer(&ctx)? {
            LayerOutcome::Commit(resolved) => return Ok(resolved),
            LayerOutcome::Partial(partial) => state.merge(partial),
            LayerOutcome::NoOpinion => {}
        }
    }
    Ok(state.finish(facility))
}

/// Closed facilities never bill again
pub fn closed_guard(ctx: &ResolutionContext<'_>) -> Result<LayerOutcome, BillingError> {
    if ctx.facility.is_closed() {
        return Ok(LayerOutcome::Commit(ResolvedState::terminal(
            EffectiveStatus::Closed,
            ResolutionLayer::ClosedGuard,
        )));
    }
    Ok(LayerOutcome::NoOpinion)
}

/// Months strictly before the go-live month are pending; the go-live month bills
pub fn go_live_guard(ctx: &ResolutionContext<'_>) -> Result<LayerOutcome, BillingError> {
    match ctx.facility.go_live_date {
        Some(date) if ctx.period < BillingPeriod::containing(date) => Ok(LayerOutcome::Commit(
            ResolvedState::terminal(EffectiveStatus::Pending, ResolutionLayer::GoLiveGuard),
        )),
        _ => Ok(LayerOutcome::NoOpinion),
    }
}

pub fn monthly_override_layer(ctx: &ResolutionContext<'_>) -> Result<LayerOutcome, BillingError> {
    // Storage keeps one override per facility and month; if that ever breaks,
    // the most recently updated one wins.
    let found = ctx
        .monthly_overrides
        .iter()
        .filter(|o| o.applies_to(ctx.facility.id, ctx.period))
        .max_by_key(|o| (o.updated_at, o.id));

    Ok(match found {
        Some(o) => LayerOutcome::Partial(PartialState {
            status: Some((o.override_status.into(), ResolutionLayer::MonthlyOverride)),
            rate: o.override_rate,
            frequency_per_week: o.override_frequency,
            notes: o.override_notes.clone(),
        }),
        None => LayerOutcome::NoOpinion,
    })
}

/// Newest active rule covering the month, when seasonal rules are enabled
pub fn seasonal_rule_layer(ctx: &ResolutionContext<'_>) -> Result<LayerOutcome, BillingError> {
    if !ctx.facility.seasonal_rules_enabled {
        return Ok(LayerOutcome::NoOpinion);
    }

    let found = ctx
        .seasonal_rules
        .iter()
        .filter(|r| r.facility_profile_id == ctx.facility.id && r.applies_to(ctx.period))
        .max_by_key(|r| (r.created_at, r.id));

    Ok(match found {
        Some(rule) => LayerOutcome::Partial(PartialState {
            status: rule
                .status
                .map(|s| (s.into(), ResolutionLayer::SeasonalRule)),
            rate: rule.rate,
            frequency_per_week: rule.frequency_per_week,
            notes: None,
        }),
        None => LayerOutcome::NoOpinion,
    })
}

pub fn pause_window_layer(ctx: &ResolutionContext<'_>) -> Result<LayerOutcome, BillingError> {
    let window = ctx.facility.pause_window().map_err(|e| {
        BillingError::data_integrity(format!(
            "Facility {} has an invalid pause window: {}",
            ctx.facility.id, e
        ))
    })?;

    Ok(match window {
        Some(w) if w.contains(ctx.period) => LayerOutcome::Partial(PartialState {
            status: Some((EffectiveStatus::Paused, ResolutionLayer::PauseWindow)),
            ..PartialState::default()
        }),
        _ => LayerOutcome::NoOpinion,
    })
}
