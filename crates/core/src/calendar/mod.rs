//! NYSE trading calendar.
//!
//! Answers "is the market open for new entries right now" for the position
//! monitor's cadence and for order placement. Pure queries over immutable
//! rules; safe to share across tasks.

mod holidays;

pub use holidays::{easter_sunday, is_early_close, is_holiday, nyse_holidays};

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BLOCK_FIRST_MINUTES, EXCHANGE_TIMEZONE};

/// How far `next_open` searches before giving up.
const NEXT_OPEN_SEARCH_DAYS: u64 = 14;

/// Configurable sub-window rules applied on top of the exchange session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarRules {
    /// Minutes after the open during which new entries are blocked (0 = none)
    pub block_first_minutes: u32,
    /// Treat the market as always open for new trades (testing)
    pub skip_schedule_check: bool,
}

impl Default for CalendarRules {
    fn default() -> Self {
        Self {
            block_first_minutes: DEFAULT_BLOCK_FIRST_MINUTES,
            skip_schedule_check: false,
        }
    }
}

/// One regular trading session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub open: DateTime<Utc>,
    pub close: DateTime<Utc>,
    pub early_close: bool,
}

impl Session {
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.open <= now && now <= self.close
    }
}

/// Snapshot of the calendar at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStatus {
    pub now: DateTime<Utc>,
    pub is_trading_day: bool,
    pub is_market_open: bool,
    pub is_open_for_new_trades: bool,
    pub session: Option<Session>,
    pub next_open: DateTime<Utc>,
}

/// NYSE calendar: weekday sessions 09:30-16:00 ET minus holidays, with
/// 13:00 early closes.
#[derive(Debug, Clone)]
pub struct MarketCalendar {
    rules: CalendarRules,
    tz: Tz,
}

impl Default for MarketCalendar {
    fn default() -> Self {
        Self::new(CalendarRules::default())
    }
}

impl MarketCalendar {
    pub fn new(rules: CalendarRules) -> Self {
        Self {
            rules,
            tz: EXCHANGE_TIMEZONE,
        }
    }

    pub fn rules(&self) -> &CalendarRules {
        &self.rules
    }

    fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.tz).date_naive()
    }

    fn at_local(&self, date: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
        let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
        self.tz
            .from_local_datetime(&date.and_time(time))
            .earliest()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Weekday that is not an exchange holiday.
    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !is_holiday(date)
    }

    /// Regular session for `date` (exchange-local), if it is a trading day.
    pub fn session(&self, date: NaiveDate) -> Option<Session> {
        if !self.is_trading_day(date) {
            return None;
        }
        let early_close = is_early_close(date);
        let close_hour = if early_close { 13 } else { 16 };

        Some(Session {
            open: self.at_local(date, 9, 30)?,
            close: self.at_local(date, close_hour, 0)?,
            early_close,
        })
    }

    /// Inside today's regular session (bounds inclusive).
    pub fn is_market_open(&self, now: DateTime<Utc>) -> bool {
        self.session(self.local_date(now))
            .is_some_and(|session| session.contains(now))
    }

    /// Inside the session and past the blocked opening window. Always true
    /// when the schedule check is skipped.
    pub fn is_open_for_new_trades(&self, now: DateTime<Utc>) -> bool {
        if self.rules.skip_schedule_check {
            return true;
        }

        let Some(session) = self.session(self.local_date(now)) else {
            return false;
        };
        if !session.contains(now) {
            return false;
        }

        let unblocked_at = session.open + Duration::minutes(i64::from(self.rules.block_first_minutes));
        now >= unblocked_at
    }

    /// Earliest session open strictly after `now`.
    pub fn next_open(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = self.local_date(now);

        (0..=NEXT_OPEN_SEARCH_DAYS)
            .filter_map(|offset| today.checked_add_days(Days::new(offset)))
            .filter_map(|date| self.session(date))
            .map(|session| session.open)
            .find(|open| *open > now)
            .unwrap_or_else(|| now + Duration::days(1))
    }

    /// Zero while the market is open, otherwise the wait until the next open.
    pub fn time_until_open(&self, now: DateTime<Utc>) -> Duration {
        if self.is_market_open(now) {
            return Duration::zero();
        }
        self.next_open(now) - now
    }

    pub fn status(&self, now: DateTime<Utc>) -> MarketStatus {
        let today = self.local_date(now);
        MarketStatus {
            now,
            is_trading_day: self.is_trading_day(today),
            is_market_open: self.is_market_open(now),
            is_open_for_new_trades: self.is_open_for_new_trades(now),
            session: self.session(today),
            next_open: self.next_open(now),
        }
    }
}
