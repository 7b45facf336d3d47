//! Recurrence rules and their expansion into occurrences
//!
//! A rule is a set of weekdays plus either an occurrence count or an
//! inclusive end date-time. Expansion walks forward one calendar day at a
//! time from the first occurrence's date and emits one occurrence for every
//! day whose weekday is in the set.
//!
//! Weekday letters: `M` Monday, `T` Tuesday, `W` Wednesday, `R` Thursday,
//! `F` Friday, `S` Saturday, `U` Sunday.

use chrono::{Datelike, Days, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::datetime::format_date_time;
use crate::error::{CalendarError, CalendarResult};
use crate::models::{Event, EventDraft};
use crate::types::SeriesId;

/// Days scanned before a rule is declared unsatisfiable (about ten years)
pub const DEFAULT_HORIZON_DAYS: u32 = 3660;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Letter used for a weekday in rule strings
pub fn weekday_letter(day: Weekday) -> char {
    match day {
        Weekday::Mon => 'M',
        Weekday::Tue => 'T',
        Weekday::Wed => 'W',
        Weekday::Thu => 'R',
        Weekday::Fri => 'F',
        Weekday::Sat => 'S',
        Weekday::Sun => 'U',
    }
}

fn weekday_from_letter(letter: char) -> Option<Weekday> {
    WEEK.into_iter()
        .find(|day| weekday_letter(*day) == letter.to_ascii_uppercase())
}

/// A set of weekdays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// Parse weekday letters such as `"MWF"`
    ///
    /// Letters are case-insensitive and may repeat. An unknown letter or an
    /// empty string fails with [`CalendarError::InvalidRecurrenceRule`].
    pub fn parse(letters: &str) -> CalendarResult<Self> {
        let mut set = Self::default();
        for letter in letters.trim().chars() {
            let day = weekday_from_letter(letter).ok_or_else(|| {
                CalendarError::InvalidRecurrenceRule(format!("unknown weekday letter '{letter}'"))
            })?;
            set.insert(day);
        }

        if set.is_empty() {
            return Err(CalendarError::InvalidRecurrenceRule(
                "weekday set must not be empty".to_string(),
            ));
        }

        Ok(set)
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        WEEK.into_iter().filter(move |day| self.contains(*day))
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = Self::default();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl FromStr for WeekdaySet {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for day in self.iter() {
            write!(f, "{}", weekday_letter(day))?;
        }
        Ok(())
    }
}

/// When a series stops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Exactly this many occurrences
    Count(u32),
    /// Occurrences starting at or before this wall-clock time
    Until(NaiveDateTime),
}

impl Termination {
    /// Build from the two optional caller inputs; exactly one must be set
    pub fn from_parts(count: Option<u32>, until: Option<NaiveDateTime>) -> CalendarResult<Self> {
        match (count, until) {
            (Some(0), None) => Err(CalendarError::InvalidRecurrenceRule(
                "occurrence count must be positive".to_string(),
            )),
            (Some(n), None) => Ok(Self::Count(n)),
            (None, Some(until)) => Ok(Self::Until(until)),
            (Some(_), Some(_)) => Err(CalendarError::InvalidRecurrenceRule(
                "occurrence count and until date are mutually exclusive".to_string(),
            )),
            (None, None) => Err(CalendarError::InvalidRecurrenceRule(
                "either an occurrence count or an until date is required".to_string(),
            )),
        }
    }
}

/// A validated recurrence rule. Consumed once by [`expand`], never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub weekdays: WeekdaySet,
    pub first_start: NaiveDateTime,
    pub first_end: NaiveDateTime,
    pub termination: Termination,
}

impl RecurrenceRule {
    pub fn new(
        weekdays: WeekdaySet,
        first_start: NaiveDateTime,
        first_end: NaiveDateTime,
        termination: Termination,
    ) -> CalendarResult<Self> {
        if weekdays.is_empty() {
            return Err(CalendarError::InvalidRecurrenceRule(
                "weekday set must not be empty".to_string(),
            ));
        }
        if first_end < first_start {
            return Err(CalendarError::InvalidEvent(format!(
                "end {} is before start {}",
                format_date_time(first_end),
                format_date_time(first_start)
            )));
        }
        if let Termination::Count(0) = termination {
            return Err(CalendarError::InvalidRecurrenceRule(
                "occurrence count must be positive".to_string(),
            ));
        }
        if let Termination::Until(until) = termination
            && until < first_start
        {
            return Err(CalendarError::InvalidRecurrenceRule(format!(
                "until {} is before the first start {}",
                format_date_time(until),
                format_date_time(first_start)
            )));
        }

        Ok(Self {
            weekdays,
            first_start,
            first_end,
            termination,
        })
    }
}

/// Expand a rule into its occurrences, in chronological order.
///
/// Name, description, location, visibility and the all-day flag come from
/// `template`; its start and end are ignored in favour of the rule's. Every
/// occurrence keeps the first occurrence's time of day and wall-clock
/// length, and carries `series_id`.
///
/// At most `horizon_days` days are scanned. A count that is not reached, an
/// until date beyond the horizon, or a rule with no occurrence at all fails
/// with [`CalendarError::UnsatisfiableRecurrence`].
pub fn expand(
    rule: &RecurrenceRule,
    template: &EventDraft,
    series_id: SeriesId,
    horizon_days: u32,
) -> CalendarResult<Vec<Event>> {
    let length = rule.first_end - rule.first_start;
    let time_of_day = rule.first_start.time();
    let first_day = rule.first_start.date();

    let mut occurrences = Vec::new();
    let mut passed_until = false;

    for offset in 0..u64::from(horizon_days) {
        let Some(date) = first_day.checked_add_days(Days::new(offset)) else {
            break;
        };
        if !rule.weekdays.contains(date.weekday()) {
            continue;
        }

        let start = date.and_time(time_of_day);
        let mut draft = template.clone();
        draft.start = start;
        draft.end = start + length;
        let occurrence = Event::in_series(draft, series_id)?;

        if let Termination::Until(until) = rule.termination
            && occurrence.start > until
        {
            passed_until = true;
            break;
        }

        occurrences.push(occurrence);

        if let Termination::Count(count) = rule.termination
            && occurrences.len() == count as usize
        {
            return Ok(occurrences);
        }
    }

    match rule.termination {
        Termination::Count(count) => Err(CalendarError::UnsatisfiableRecurrence(format!(
            "only {} of {count} occurrences fit within {horizon_days} days",
            occurrences.len()
        ))),
        Termination::Until(until) if !passed_until => {
            Err(CalendarError::UnsatisfiableRecurrence(format!(
                "until {} lies beyond the {horizon_days}-day scan horizon",
                format_date_time(until)
            )))
        }
        Termination::Until(until) if occurrences.is_empty() => {
            Err(CalendarError::UnsatisfiableRecurrence(format!(
                "no {} day falls before {}",
                rule.weekdays,
                format_date_time(until)
            )))
        }
        Termination::Until(_) => Ok(occurrences),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn template(name: &str) -> EventDraft {
        EventDraft::new(name, at(2000, 1, 1, 0, 0), at(2000, 1, 1, 0, 0))
    }

    fn rule(days: &str, start: NaiveDateTime, end: NaiveDateTime, termination: Termination) -> RecurrenceRule {
        RecurrenceRule::new(WeekdaySet::parse(days).unwrap(), start, end, termination).unwrap()
    }

    #[test]
    fn test_weekday_set_parse() {
        let set = WeekdaySet::parse("mwF").unwrap();
        assert!(set.contains(Weekday::Mon));
        assert!(set.contains(Weekday::Wed));
        assert!(set.contains(Weekday::Fri));
        assert!(!set.contains(Weekday::Thu));
        assert_eq!(set.len(), 3);
        assert_eq!(set.to_string(), "MWF");
    }

    #[test]
    fn test_weekday_set_thursday_and_sunday_letters() {
        let set = WeekdaySet::parse("RU").unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Weekday::Thu, Weekday::Sun]);
    }

    #[test]
    fn test_weekday_set_invalid() {
        assert!(matches!(
            WeekdaySet::parse(""),
            Err(CalendarError::InvalidRecurrenceRule(_))
        ));
        assert!(matches!(
            WeekdaySet::parse("MX"),
            Err(CalendarError::InvalidRecurrenceRule(_))
        ));
    }

    #[test]
    fn test_termination_requires_exactly_one() {
        let until = at(2024, 2, 1, 0, 0);
        assert_eq!(Termination::from_parts(Some(3), None), Ok(Termination::Count(3)));
        assert_eq!(
            Termination::from_parts(None, Some(until)),
            Ok(Termination::Until(until))
        );
        assert!(Termination::from_parts(Some(3), Some(until)).is_err());
        assert!(Termination::from_parts(None, None).is_err());
        assert!(Termination::from_parts(Some(0), None).is_err());
    }

    #[test]
    fn test_monday_wednesday_three_occurrences() {
        let rule = rule(
            "MW",
            at(2024, 1, 1, 10, 0),
            at(2024, 1, 1, 11, 0),
            Termination::Count(3),
        );
        let series = SeriesId::new();
        let events = expand(&rule, &template("Class"), series, DEFAULT_HORIZON_DAYS).unwrap();

        let starts: Vec<_> = events.iter().map(|e| e.start).collect();
        assert_eq!(
            starts,
            vec![
                at(2024, 1, 1, 10, 0),
                at(2024, 1, 3, 10, 0),
                at(2024, 1, 8, 10, 0)
            ]
        );
        for event in &events {
            assert_eq!(event.end - event.start, chrono::Duration::hours(1));
            assert_eq!(event.series_id, Some(series));
            assert_eq!(event.name, "Class");
        }
    }

    #[test]
    fn test_count_rule_properties() {
        for (days, count) in [("M", 1), ("TR", 7), ("MTWRFSU", 20), ("SU", 11)] {
            let rule = rule(
                days,
                at(2024, 2, 27, 8, 15),
                at(2024, 2, 27, 9, 0),
                Termination::Count(count),
            );
            let events = expand(&rule, &template("x"), SeriesId::new(), DEFAULT_HORIZON_DAYS).unwrap();

            assert_eq!(events.len(), count as usize);
            assert!(events.windows(2).all(|w| w[0].start < w[1].start));
            assert!(events.iter().all(|e| rule.weekdays.contains(e.start.weekday())));
        }
    }

    #[test]
    fn test_first_day_not_matching_is_skipped() {
        // 2024-01-02 is a Tuesday
        let rule = rule(
            "M",
            at(2024, 1, 2, 9, 0),
            at(2024, 1, 2, 9, 30),
            Termination::Count(1),
        );
        let events = expand(&rule, &template("Review"), SeriesId::new(), DEFAULT_HORIZON_DAYS).unwrap();
        assert_eq!(events[0].start, at(2024, 1, 8, 9, 0));
    }

    #[test]
    fn test_until_is_inclusive_and_skips_nothing() {
        let until = at(2024, 1, 31, 10, 0);
        let rule = rule(
            "TF",
            at(2024, 1, 1, 10, 0),
            at(2024, 1, 1, 11, 0),
            Termination::Until(until),
        );
        let events = expand(&rule, &template("Gym"), SeriesId::new(), DEFAULT_HORIZON_DAYS).unwrap();

        assert!(events.iter().all(|e| e.start <= until));
        // 2024-01-31 is a Wednesday, so the last match is Friday 2024-01-26
        let expected: Vec<_> = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .iter_days()
            .take_while(|d| *d <= until.date())
            .filter(|d| matches!(d.weekday(), Weekday::Tue | Weekday::Fri))
            .map(|d| d.and_time(NaiveTime::from_hms_opt(10, 0, 0).unwrap()))
            .collect();
        let starts: Vec<_> = events.iter().map(|e| e.start).collect();
        assert_eq!(starts, expected);
        assert_eq!(starts.len(), 9);
    }

    #[test]
    fn test_until_boundary_occurrence_included() {
        let rule = rule(
            "W",
            at(2024, 1, 3, 10, 0),
            at(2024, 1, 3, 11, 0),
            Termination::Until(at(2024, 1, 17, 10, 0)),
        );
        let events = expand(&rule, &template("Sync"), SeriesId::new(), DEFAULT_HORIZON_DAYS).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[2].start, at(2024, 1, 17, 10, 0));

        let tighter = RecurrenceRule {
            termination: Termination::Until(at(2024, 1, 17, 9, 59)),
            ..rule
        };
        let events = expand(&tighter, &template("Sync"), SeriesId::new(), DEFAULT_HORIZON_DAYS).unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_overnight_occurrences_keep_length() {
        let rule = rule(
            "F",
            at(2024, 1, 5, 22, 0),
            at(2024, 1, 6, 2, 0),
            Termination::Count(2),
        );
        let events = expand(&rule, &template("Night shift"), SeriesId::new(), DEFAULT_HORIZON_DAYS).unwrap();
        assert_eq!(events[1].start, at(2024, 1, 12, 22, 0));
        assert_eq!(events[1].end, at(2024, 1, 13, 2, 0));
    }

    #[test]
    fn test_all_day_series() {
        let rule = rule(
            "S",
            at(2024, 1, 6, 9, 0),
            at(2024, 1, 6, 10, 0),
            Termination::Count(2),
        );
        let events = expand(
            &rule,
            &template("Market").all_day(),
            SeriesId::new(),
            DEFAULT_HORIZON_DAYS,
        )
        .unwrap();
        assert_eq!(events[0].start, at(2024, 1, 6, 0, 0));
        assert_eq!(events[0].end, at(2024, 1, 6, 23, 59));
        assert_eq!(events[1].start, at(2024, 1, 13, 0, 0));
        assert!(events.iter().all(|e| e.is_all_day));
    }

    #[test]
    fn test_count_beyond_horizon_is_unsatisfiable() {
        let rule = rule(
            "M",
            at(2024, 1, 1, 10, 0),
            at(2024, 1, 1, 11, 0),
            Termination::Count(10),
        );
        let result = expand(&rule, &template("x"), SeriesId::new(), 30);
        assert!(matches!(result, Err(CalendarError::UnsatisfiableRecurrence(_))));
    }

    #[test]
    fn test_until_beyond_horizon_is_unsatisfiable() {
        let rule = rule(
            "M",
            at(2024, 1, 1, 10, 0),
            at(2024, 1, 1, 11, 0),
            Termination::Until(at(2030, 1, 1, 0, 0)),
        );
        let result = expand(&rule, &template("x"), SeriesId::new(), 365);
        assert!(matches!(result, Err(CalendarError::UnsatisfiableRecurrence(_))));
    }

    #[test]
    fn test_until_without_matching_day_is_unsatisfiable() {
        // Tuesday through Thursday contains no Saturday
        let rule = rule(
            "S",
            at(2024, 1, 2, 10, 0),
            at(2024, 1, 2, 11, 0),
            Termination::Until(at(2024, 1, 4, 23, 0)),
        );
        let result = expand(&rule, &template("x"), SeriesId::new(), DEFAULT_HORIZON_DAYS);
        assert!(matches!(result, Err(CalendarError::UnsatisfiableRecurrence(_))));
    }

    #[test]
    fn test_rule_validation() {
        let weekdays = WeekdaySet::parse("M").unwrap();
        assert!(matches!(
            RecurrenceRule::new(
                WeekdaySet::default(),
                at(2024, 1, 1, 10, 0),
                at(2024, 1, 1, 11, 0),
                Termination::Count(1)
            ),
            Err(CalendarError::InvalidRecurrenceRule(_))
        ));
        assert!(matches!(
            RecurrenceRule::new(
                weekdays,
                at(2024, 1, 1, 10, 0),
                at(2024, 1, 1, 9, 0),
                Termination::Count(1)
            ),
            Err(CalendarError::InvalidEvent(_))
        ));
        assert!(matches!(
            RecurrenceRule::new(
                weekdays,
                at(2024, 1, 10, 10, 0),
                at(2024, 1, 10, 11, 0),
                Termination::Until(at(2024, 1, 1, 0, 0))
            ),
            Err(CalendarError::InvalidRecurrenceRule(_))
        ));
    }
}
