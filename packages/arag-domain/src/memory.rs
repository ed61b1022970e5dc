use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{outcome::Outcome, record::Method};

pub const DEFAULT_SCORE_HINT: f32 = 0.35;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// One episodic (short-term) memory entry. Append-only; `event_id` is the
/// identity used by the feedback-replay ledger.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EpisodicEvent {
	pub event_id: Uuid,
	#[serde(with = "crate::time_serde")]
	pub ts: OffsetDateTime,
	pub app_id: Option<String>,
	pub event_type: String,
	pub outcome: Option<Outcome>,
	pub category: Option<String>,
	pub method: Option<Method>,
	pub score_hint: f32,
	pub text: String,
}
impl EpisodicEvent {
	pub fn new(
		ts: OffsetDateTime,
		app_id: Option<String>,
		event_type: &str,
		outcome: Option<Outcome>,
		text: String,
	) -> Self {
		Self {
			event_id: Uuid::new_v4(),
			ts,
			app_id,
			event_type: event_type.to_string(),
			outcome,
			category: None,
			method: None,
			score_hint: outcome.map(Outcome::score_hint).unwrap_or(DEFAULT_SCORE_HINT),
			text,
		}
	}

	pub fn with_arm(mut self, category: &str, method: Method) -> Self {
		self.category = Some(category.to_string());
		self.method = Some(method);

		self
	}
}

/// One semantic (long-term) entry: the outcome rate of a (category, method)
/// arm distilled from the episodic stream. The whole view is recomputed and
/// replaced; it is never appended to.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TargetingSummary {
	pub category: String,
	pub method: Method,
	pub events: u64,
	pub successes: u64,
	pub failures: u64,
	pub success_rate: f64,
	#[serde(with = "crate::time_serde")]
	pub updated_at: OffsetDateTime,
}

/// Recency-weighted episodic boost per application: exponential half-life
/// decay over event age, scaled by the event's outcome weight. Multiple
/// events keep the strongest signal, not the sum.
pub fn recency_scores(
	events: &[EpisodicEvent],
	now: OffsetDateTime,
	half_life_days: f32,
) -> HashMap<String, f32> {
	let half_life = f64::from(half_life_days.max(0.1));
	let mut by_app: HashMap<String, f32> = HashMap::new();

	for event in events {
		let Some(app_id) = event.app_id.as_deref() else {
			continue;
		};

		if app_id.is_empty() {
			continue;
		}

		let age_days = ((now - event.ts).as_seconds_f64() / SECONDS_PER_DAY).max(0.0);
		let decay = (-std::f64::consts::LN_2 * age_days / half_life).exp();
		let score = (decay * f64::from(event.score_hint)).clamp(0.0, 1.0) as f32;
		let entry = by_app.entry(app_id.to_string()).or_insert(0.0);

		*entry = entry.max(score);
	}

	by_app
}

/// Distill the episodic stream into the long-term targeting view. Only
/// outcome-bearing events with a known arm contribute. Safe on an empty
/// stream: produces an empty view.
pub fn summarize_targeting(events: &[EpisodicEvent], now: OffsetDateTime) -> Vec<TargetingSummary> {
	let mut by_arm: HashMap<(String, Method), (u64, u64)> = HashMap::new();

	for event in events {
		let Some(outcome) = event.outcome else {
			continue;
		};
		let (Some(category), Some(method)) = (event.category.as_deref(), event.method) else {
			continue;
		};
		let (successes, failures) = by_arm.entry((category.to_string(), method)).or_insert((0, 0));

		if outcome.is_success() {
			*successes += 1;
		} else {
			*failures += 1;
		}
	}

	let mut summaries: Vec<TargetingSummary> = by_arm
		.into_iter()
		.map(|((category, method), (successes, failures))| {
			let events = successes + failures;

			TargetingSummary {
				category,
				method,
				events,
				successes,
				failures,
				success_rate: successes as f64 / events.max(1) as f64,
				updated_at: now,
			}
		})
		.collect();

	summaries.sort_by(|a, b| {
		b.success_rate
			.total_cmp(&a.success_rate)
			.then_with(|| a.category.cmp(&b.category))
			.then_with(|| a.method.as_str().cmp(b.method.as_str()))
	});

	summaries
}
