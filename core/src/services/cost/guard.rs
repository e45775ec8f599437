//! Cost guard: duplicate-send suppression, daily send cap, monthly budget

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use lc_shared::phone::{mask_phone_number, normalize_phone_number};
use lc_shared::CostConfig;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::domain::entities::{days_in_month, DailyStats, MonthlyAggregate};
use crate::repositories::StatsSink;

use super::traits::{AlertKind, AlertSink};
use super::types::{CostDecision, CostDenyReason, CostPrediction, CostReservation};

struct CostState {
    /// Last accepted send per normalized phone
    recent_sends: HashMap<String, DateTime<Utc>>,
    /// Counters for the current calendar day
    today: DailyStats,
    /// Persisted snapshots for the current month, `None` while unknown
    month: Option<MonthlyAggregate>,
    /// Alerts already emitted for the current day or month
    alerts_sent: HashSet<AlertKind>,
}

/// Process-wide guard on SMS spend
///
/// Counters live in memory and are authoritative for the process lifetime.
/// Completed days are snapshotted through a [`StatsSink`] on a best-effort
/// basis; sink I/O always happens after the state lock is released.
///
/// Sends that passed [`reserve`](Self::reserve) but are not yet settled count
/// against the daily limit and, at the highest provider unit cost, against the
/// monthly budget.
pub struct CostGuard {
    config: CostConfig,
    timezone: FixedOffset,
    clock: Arc<dyn Clock>,
    stats_sink: Arc<dyn StatsSink>,
    alert_sink: Arc<dyn AlertSink>,
    state: Mutex<CostState>,
    in_flight: Arc<AtomicU64>,
}

impl CostGuard {
    /// Create a guard with empty counters for the current local day
    ///
    /// Call [`load_history`](Self::load_history) afterwards to pick up
    /// persisted spend for the month.
    pub fn new(
        config: CostConfig,
        clock: Arc<dyn Clock>,
        stats_sink: Arc<dyn StatsSink>,
        alert_sink: Arc<dyn AlertSink>,
    ) -> Self {
        let timezone = FixedOffset::east_opt(config.utc_offset_minutes * 60).unwrap_or_else(|| {
            tracing::warn!(
                offset_minutes = config.utc_offset_minutes,
                "Invalid UTC offset for cost accounting, falling back to UTC"
            );
            Utc.fix()
        });
        let today = clock.now().with_timezone(&timezone).date_naive();

        Self {
            config,
            timezone,
            clock,
            stats_sink,
            alert_sink,
            state: Mutex::new(CostState {
                recent_sends: HashMap::new(),
                today: DailyStats::new(today),
                month: None,
                alerts_sent: HashSet::new(),
            }),
            in_flight: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Decide whether one more SMS may be sent to `phone`
    ///
    /// Checks, in order: duplicate window for this phone, global daily count,
    /// month-to-date spend. Denials carry the number of seconds until they lift.
    pub async fn can_send(&self, phone: &str) -> CostDecision {
        self.decide(phone, false).await.0
    }

    /// Check like [`can_send`](Self::can_send) and, when allowed, hold a send
    /// slot in the same critical section
    ///
    /// # Returns
    /// * `Ok(CostReservation)` - Pass it to [`settle`](Self::settle) after dispatch
    /// * `Err(CostDecision)` - The denial, with its reason and wait time
    pub async fn reserve(&self, phone: &str) -> Result<CostReservation, CostDecision> {
        match self.decide(phone, true).await {
            (_, Some(reservation)) => Ok(reservation),
            (decision, None) => Err(decision),
        }
    }

    async fn decide(&self, phone: &str, reserve: bool) -> (CostDecision, Option<CostReservation>) {
        let key = normalize_phone_number(phone);
        let now = self.clock.now();

        let (decision, reservation, rolled) = {
            let mut state = self.state.lock().await;
            let rolled = self.roll_locked(&mut state, now);
            let decision = self.evaluate(&state, &key, now);
            let reservation = (reserve && decision.allowed)
                .then(|| CostReservation::hold(key.clone(), self.in_flight.clone()));
            (decision, reservation, rolled)
        };

        if let Some(snapshot) = rolled {
            self.persist_snapshot(&snapshot).await;
        }

        if let Some(reason) = decision.reason {
            tracing::info!(
                phone = %mask_phone_number(&key),
                reason = ?reason,
                wait_seconds = decision.wait_time_seconds,
                event = "cost_guard_denied",
                "Send refused by cost guard"
            );
        }

        (decision, reservation)
    }

    fn evaluate(&self, state: &CostState, phone: &str, now: DateTime<Utc>) -> CostDecision {
        let window = Duration::seconds(self.config.duplicate_window_seconds as i64);
        if let Some(last) = state.recent_sends.get(phone) {
            let elapsed = now - *last;
            if elapsed < window {
                return CostDecision::deny(CostDenyReason::DuplicateSend, ceil_seconds(window - elapsed));
            }
        }

        let in_flight = self.in_flight.load(Ordering::SeqCst);
        if state.today.count + in_flight >= self.config.daily_limit {
            return CostDecision::deny(
                CostDenyReason::DailyLimitReached,
                self.seconds_until_next_day(now),
            );
        }

        let (spent, _) = self.month_to_date(state, self.local_date(now));
        let reserved = in_flight as f64 * self.config.max_unit_cost();
        if spent + reserved >= self.config.monthly_budget {
            return CostDecision::deny(
                CostDenyReason::MonthlyBudgetExceeded,
                self.seconds_until_next_month(now),
            );
        }

        CostDecision::allow()
    }

    /// Account for one completed dispatch
    ///
    /// # Arguments
    /// * `phone` - Recipient
    /// * `success` - Whether the provider accepted the message
    /// * `provider` - Provider name used for the unit cost lookup
    pub async fn record_send(&self, phone: &str, success: bool, provider: &str) {
        self.record(phone, success, provider, None).await;
    }

    /// Account for a dispatch made under `reservation`, freeing its slot
    pub async fn settle(&self, reservation: CostReservation, success: bool, provider: &str) {
        let phone = reservation.phone().to_string();
        self.record(&phone, success, provider, Some(reservation)).await;
    }

    async fn record(
        &self,
        phone: &str,
        success: bool,
        provider: &str,
        reservation: Option<CostReservation>,
    ) {
        let key = normalize_phone_number(phone);
        let now = self.clock.now();
        let unit_cost = self.config.unit_cost(provider);

        let (alerts, rolled) = {
            let mut state = self.state.lock().await;
            // Slot and count change under one lock so checks never miss the send
            drop(reservation);
            if success {
                state.recent_sends.insert(key.clone(), now);
            }
            let rolled = self.roll_locked(&mut state, now);

            state.today.count += 1;
            if !success {
                state.today.failures += 1;
            }
            state.today.cost += unit_cost;

            (self.collect_alerts(&mut state, now), rolled)
        };

        if let Some(snapshot) = rolled {
            self.persist_snapshot(&snapshot).await;
        }

        for (kind, message) in alerts {
            tracing::warn!(alert = %kind, event = "cost_alert", "{}", message);
            self.alert_sink.notify(kind, &message).await;
        }
    }

    fn collect_alerts(&self, state: &mut CostState, now: DateTime<Utc>) -> Vec<(AlertKind, String)> {
        let mut alerts = Vec::new();
        let limit = self.config.daily_limit;
        let count = state.today.count;

        if limit > 0 {
            let warn_at = ((limit as f64) * self.config.daily_warning_ratio).ceil() as u64;
            if count >= warn_at && state.alerts_sent.insert(AlertKind::DailyWarning) {
                alerts.push((
                    AlertKind::DailyWarning,
                    format!("Daily SMS count at {} of {} | 일일 발송량 {}/{}건", count, limit, count, limit),
                ));
            }
            if count >= limit && state.alerts_sent.insert(AlertKind::DailyLimitReached) {
                alerts.push((
                    AlertKind::DailyLimitReached,
                    format!("Daily SMS limit of {} reached, sends paused until midnight | 일일 발송 한도 {}건 도달", limit, limit),
                ));
            }
        }

        let budget = self.config.monthly_budget;
        let (spent, approximate) = self.month_to_date(state, self.local_date(now));
        if budget > 0.0
            && spent >= budget * self.config.monthly_warning_ratio
            && state.alerts_sent.insert(AlertKind::MonthlyBudgetWarning)
        {
            alerts.push((
                AlertKind::MonthlyBudgetWarning,
                format!(
                    "Monthly SMS spend {:.0} of budget {:.0}{} | 월 발송 비용 {:.0}/{:.0}원",
                    spent,
                    budget,
                    if approximate { " (estimated)" } else { "" },
                    spent,
                    budget
                ),
            ));
        }

        alerts
    }

    /// Project month-end spend from the month-to-date figure
    pub async fn predict_monthly_cost(&self) -> CostPrediction {
        let date = self.local_date(self.clock.now());
        let (current, approximate, today_cost) = {
            let state = self.state.lock().await;
            let (current, approximate) = self.month_to_date(&state, date);
            (current, approximate, Self::today_cost(&state, date))
        };

        let days_elapsed = date.day();
        let days_total = days_in_month(date);
        // An estimated month-to-date is already today's rate extrapolated
        let projected = if approximate {
            today_cost * days_total as f64
        } else {
            current / days_elapsed as f64 * days_total as f64
        };
        let budget = self.config.monthly_budget;

        let recommendation = if projected > budget {
            Some(format!(
                "Projected spend {:.0} exceeds the monthly budget {:.0}. Lower the daily limit or tighten rate limits | 예상 비용이 월 예산을 초과합니다. 일일 한도를 낮추세요",
                projected, budget
            ))
        } else if projected > budget * self.config.monthly_warning_ratio {
            Some(format!(
                "Projected spend {:.0} is above {:.0}% of the monthly budget | 예상 비용이 월 예산의 {:.0}%를 넘습니다",
                projected,
                self.config.monthly_warning_ratio * 100.0,
                self.config.monthly_warning_ratio * 100.0
            ))
        } else {
            None
        };

        CostPrediction {
            current_cost: current,
            projected_cost: projected,
            monthly_budget: budget,
            days_elapsed,
            days_in_month: days_total,
            approximate,
            recommendation,
        }
    }

    /// Counters for the current local day
    pub async fn daily_stats(&self) -> DailyStats {
        let date = self.local_date(self.clock.now());
        let state = self.state.lock().await;
        if state.today.date == date {
            state.today.clone()
        } else {
            DailyStats::new(date)
        }
    }

    pub fn config(&self) -> &CostConfig {
        &self.config
    }

    /// Roll the current day if the local date changed
    ///
    /// Also retries loading the month's history if it is still unknown.
    ///
    /// # Returns
    /// `true` if a rollover happened
    pub async fn check_rollover(&self) -> bool {
        let now = self.clock.now();
        let (rolled, history_missing) = {
            let mut state = self.state.lock().await;
            let rolled = self.roll_locked(&mut state, now);
            (rolled, state.month.is_none())
        };

        let did_roll = rolled.is_some();
        if let Some(snapshot) = rolled {
            self.persist_snapshot(&snapshot).await;
        }
        if history_missing {
            self.load_history().await;
        }
        did_roll
    }

    /// Drop duplicate-window entries that can no longer deny anything
    ///
    /// # Returns
    /// Number of entries removed
    pub async fn purge_recent_sends(&self) -> usize {
        let now = self.clock.now();
        let window = Duration::seconds(self.config.duplicate_window_seconds as i64);
        let mut state = self.state.lock().await;
        let before = state.recent_sends.len();
        state.recent_sends.retain(|_, last| now - *last < window);
        before - state.recent_sends.len()
    }

    /// Load persisted snapshots for the current month
    ///
    /// A snapshot for today (left by an earlier process) seeds today's counters
    /// when it is ahead of them. On failure the month stays unknown and spend is
    /// extrapolated from today.
    pub async fn load_history(&self) {
        let date = self.local_date(self.clock.now());

        let aggregate = match self.stats_sink.load_monthly(date.year(), date.month()).await {
            Ok(aggregate) => aggregate,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    year = date.year(),
                    month = date.month(),
                    event = "stats_load_failed",
                    "Monthly send history unavailable, spend will be estimated"
                );
                return;
            }
        };

        let mut state = self.state.lock().await;
        if !aggregate.covers(state.today.date) {
            return;
        }
        if let Some(persisted) = aggregate.day(state.today.date) {
            if persisted.count > state.today.count {
                state.today = persisted.clone();
            }
        }

        tracing::info!(
            year = aggregate.year,
            month = aggregate.month,
            days = aggregate.days.len(),
            cost = aggregate.total_cost(),
            event = "stats_history_loaded",
            "Loaded monthly send history"
        );
        state.month = Some(aggregate);
    }

    /// Persist the current day's counters
    pub async fn flush(&self) {
        let today = self.state.lock().await.today.clone();
        if !today.is_empty() {
            self.persist_snapshot(&today).await;
        }
    }

    fn roll_locked(&self, state: &mut CostState, now: DateTime<Utc>) -> Option<DailyStats> {
        let date = self.local_date(now);
        if date <= state.today.date {
            return None;
        }

        let finished = std::mem::replace(&mut state.today, DailyStats::new(date));
        let same_month =
            finished.date.year() == date.year() && finished.date.month() == date.month();

        if same_month {
            state.alerts_sent.retain(|kind| kind.is_monthly());
            if let Some(month) = state.month.as_mut() {
                month.upsert(finished.clone());
            }
        } else {
            state.alerts_sent.clear();
            state.month = Some(MonthlyAggregate::empty(date.year(), date.month()));
        }

        tracing::info!(
            date = %finished.date,
            count = finished.count,
            cost = finished.cost,
            failures = finished.failures,
            event = "cost_day_rollover",
            "Daily send counters rolled over"
        );

        if finished.is_empty() {
            None
        } else {
            Some(finished)
        }
    }

    /// Month-to-date spend and whether it is an estimate
    fn month_to_date(&self, state: &CostState, date: NaiveDate) -> (f64, bool) {
        let today_cost = Self::today_cost(state, date);

        match &state.month {
            Some(month) if month.covers(date) => {
                (month.cost_excluding(state.today.date) + today_cost, false)
            }
            _ => (today_cost * 30.0 / date.day() as f64, true),
        }
    }

    fn today_cost(state: &CostState, date: NaiveDate) -> f64 {
        let same_month =
            state.today.date.year() == date.year() && state.today.date.month() == date.month();
        if same_month {
            state.today.cost
        } else {
            0.0
        }
    }

    async fn persist_snapshot(&self, snapshot: &DailyStats) {
        if let Err(e) = self.stats_sink.persist_daily(snapshot).await {
            tracing::warn!(
                error = %e,
                date = %snapshot.date,
                event = "stats_persist_failed",
                "Failed to persist daily send stats, keeping in-memory counters"
            );
        }
    }

    fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.timezone).date_naive()
    }

    fn seconds_until_next_day(&self, now: DateTime<Utc>) -> u64 {
        self.local_date(now)
            .succ_opt()
            .map(|next| self.seconds_until(now, next))
            .unwrap_or(86_400)
    }

    fn seconds_until_next_month(&self, now: DateTime<Utc>) -> u64 {
        let date = self.local_date(now);
        let (year, month) = if date.month() == 12 {
            (date.year() + 1, 1)
        } else {
            (date.year(), date.month() + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|next| self.seconds_until(now, next))
            .unwrap_or(86_400)
    }

    fn seconds_until(&self, now: DateTime<Utc>, date: NaiveDate) -> u64 {
        date.and_hms_opt(0, 0, 0)
            .and_then(|midnight| self.timezone.from_local_datetime(&midnight).single())
            .map(|at| ceil_seconds(at.with_timezone(&Utc) - now))
            .unwrap_or(0)
    }
}

fn ceil_seconds(duration: Duration) -> u64 {
    let millis = duration.num_milliseconds().max(0) as u64;
    (millis + 999) / 1000
}
