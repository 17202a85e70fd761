use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, TimeZone, Utc, Weekday};
use serde::Serialize;

pub const DAYS_PER_WEEK: u64 = 7;

/// A Saturday-to-Friday reporting week in a fixed-offset timezone.
///
/// `start` and `end` are inclusive calendar days. Commits are selected with
/// `[start 00:00, end + 1 day 00:00)` in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(skip)]
    pub offset: FixedOffset,
}

impl WeekWindow {
    /// The most recently completed Saturday-to-Friday week as of `now`.
    ///
    /// On a Saturday the week that ended the day before is returned, never
    /// the one that is just starting.
    pub fn containing<Tz: TimeZone>(now: &DateTime<Tz>, offset: FixedOffset) -> Self {
        let local_date = now.with_timezone(&offset).date_naive();
        let since_saturday = days_since(local_date.weekday(), Weekday::Sat);
        let back = if since_saturday == 0 {
            DAYS_PER_WEEK
        } else {
            since_saturday
        };
        let start = local_date - Days::new(back);
        Self::starting_at(start, offset)
    }

    pub fn starting_at(start: NaiveDate, offset: FixedOffset) -> Self {
        Self {
            start,
            end: start + Days::new(DAYS_PER_WEEK - 1),
            offset,
        }
    }

    pub fn previous(&self) -> Self {
        Self {
            start: self.start - Days::new(DAYS_PER_WEEK),
            end: self.end - Days::new(DAYS_PER_WEEK),
            offset: self.offset,
        }
    }

    /// Inclusive lower bound as an instant.
    pub fn since(&self) -> DateTime<Utc> {
        self.local_midnight(self.start)
    }

    /// Exclusive upper bound: local midnight after `end`.
    pub fn until(&self) -> DateTime<Utc> {
        self.local_midnight(self.end + Days::new(1))
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.since() && *instant < self.until()
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(DAYS_PER_WEEK as usize)
    }

    fn local_midnight(&self, date: NaiveDate) -> DateTime<Utc> {
        let naive = date.and_time(chrono::NaiveTime::MIN);
        // Fixed offsets have no gaps or folds, so the mapping is unique.
        self.offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
    }
}

fn days_since(today: Weekday, anchor: Weekday) -> u64 {
    let diff = today.num_days_from_sunday() + 7 - anchor.num_days_from_sunday();
    u64::from(diff % 7)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        jst().with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn saturday_aligned_windows() {
        let cases = [
            (at(2026, 2, 7, 10), date(2026, 1, 31), date(2026, 2, 6)),
            (at(2026, 2, 8, 10), date(2026, 2, 7), date(2026, 2, 13)),
            (at(2026, 2, 14, 10), date(2026, 2, 7), date(2026, 2, 13)),
            (at(2026, 2, 15, 10), date(2026, 2, 14), date(2026, 2, 20)),
            (at(2026, 2, 20, 10), date(2026, 2, 14), date(2026, 2, 20)),
            (at(2026, 2, 21, 10), date(2026, 2, 14), date(2026, 2, 20)),
            (at(2026, 2, 22, 10), date(2026, 2, 21), date(2026, 2, 27)),
        ];

        for (now, start, end) in cases {
            let window = WeekWindow::containing(&now, jst());
            assert_eq!(window.start, start, "start for {now}");
            assert_eq!(window.end, end, "end for {now}");
            assert_eq!(window.start.weekday(), Weekday::Sat);
            assert_eq!(window.end.weekday(), Weekday::Fri);
            assert_eq!((window.end - window.start).num_days() + 1, 7);
        }
    }

    #[test]
    fn local_date_decides_not_utc_date() {
        // Friday 2026-02-20 20:00 UTC is already Saturday 05:00 in JST.
        let now = Utc.with_ymd_and_hms(2026, 2, 20, 20, 0, 0).unwrap();
        let window = WeekWindow::containing(&now, jst());
        assert_eq!(window.start, date(2026, 2, 14));
        assert_eq!(window.end, date(2026, 2, 20));
    }

    #[test]
    fn previous_is_one_week_earlier() {
        let window = WeekWindow::containing(&at(2026, 2, 8, 10), jst());
        let prev = window.previous();
        assert_eq!(prev.start, date(2026, 1, 31));
        assert_eq!(prev.end, date(2026, 2, 6));
        assert_eq!(prev.until(), window.since());
    }

    #[test]
    fn bounds_are_local_midnight() {
        let window = WeekWindow::starting_at(date(2026, 2, 7), jst());
        assert_eq!(
            window.since(),
            Utc.with_ymd_and_hms(2026, 2, 6, 15, 0, 0).unwrap()
        );
        assert_eq!(
            window.until(),
            Utc.with_ymd_and_hms(2026, 2, 13, 15, 0, 0).unwrap()
        );
        assert!(window.contains(&window.since()));
        assert!(!window.contains(&window.until()));
        let last_second_of_friday = at(2026, 2, 13, 23).with_timezone(&Utc);
        assert!(window.contains(&last_second_of_friday));
    }

    #[test]
    fn days_cover_the_week_in_order() {
        let window = WeekWindow::starting_at(date(2026, 2, 7), jst());
        let days: Vec<_> = window.days().collect();
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], window.start);
        assert_eq!(days[6], window.end);
    }
}
