//! Single-slot calendar grid for one scheduling year.

use chrono::{Datelike, NaiveDate};

use crate::models::ScheduledMassId;

#[derive(Debug, Clone, Copy, Default)]
struct DaySlot {
    blocked: bool,
    mass: Option<ScheduledMassId>,
}

/// One slot per day of the scheduling year.
///
/// The grid is the in-memory working state of a rebuild: passes consult it
/// before writing to the store and claim days as they place masses. A day
/// holds at most one mass, and a blocked day holds none.
#[derive(Debug, Clone)]
pub struct CalendarGrid {
    year: i32,
    start: NaiveDate,
    end: NaiveDate,
    days: Vec<DaySlot>,
}

impl CalendarGrid {
    /// Build an empty grid covering Jan 1 to Dec 31 of `year`.
    ///
    /// Returns `None` for years the calendar cannot represent.
    pub fn new(year: i32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)?;
        Some(Self {
            year,
            start,
            end,
            days: vec![DaySlot::default(); end.ordinal() as usize],
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Jan 1 of the grid's year.
    pub fn first_day(&self) -> NaiveDate {
        self.start
    }

    /// Dec 31 of the grid's year.
    pub fn last_day(&self) -> NaiveDate {
        self.end
    }

    fn index(&self, date: NaiveDate) -> Option<usize> {
        if date.year() == self.year {
            Some(date.ordinal0() as usize)
        } else {
            None
        }
    }

    fn date_at(&self, index: usize) -> Option<NaiveDate> {
        NaiveDate::from_yo_opt(self.year, index as u32 + 1)
    }

    /// Whether `date` falls inside the grid's year.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.index(date).is_some()
    }

    pub fn is_blocked(&self, date: NaiveDate) -> bool {
        match self.index(date) {
            Some(i) => self.days[i].blocked,
            None => false,
        }
    }

    pub fn is_occupied(&self, date: NaiveDate) -> bool {
        match self.index(date) {
            Some(i) => self.days[i].mass.is_some(),
            None => false,
        }
    }

    /// A day is free when it lies inside the year, is not blocked and
    /// carries no mass. Dates outside the year are never free.
    pub fn is_free(&self, date: NaiveDate) -> bool {
        match self.index(date) {
            Some(i) => !self.days[i].blocked && self.days[i].mass.is_none(),
            None => false,
        }
    }

    /// Mark a day blocked. Returns `false` for dates outside the year.
    pub fn block(&mut self, date: NaiveDate) -> bool {
        match self.index(date) {
            Some(i) => {
                self.days[i].blocked = true;
                true
            }
            None => false,
        }
    }

    /// Claim a free day for a stored mass. Returns `false` when the day is
    /// blocked, already taken or outside the year.
    pub fn occupy(&mut self, date: NaiveDate, mass: ScheduledMassId) -> bool {
        match self.index(date) {
            Some(i) if !self.days[i].blocked && self.days[i].mass.is_none() => {
                self.days[i].mass = Some(mass);
                true
            }
            _ => false,
        }
    }

    /// Number of days currently carrying a mass.
    pub fn scheduled_count(&self) -> u32 {
        self.days.iter().filter(|d| d.mass.is_some()).count() as u32
    }

    /// First free day on or after `date`, staying within the year.
    pub fn first_free_on_or_after(&self, date: NaiveDate) -> Option<NaiveDate> {
        let from = self.index(date)?;
        for i in from..self.days.len() {
            if !self.days[i].blocked && self.days[i].mass.is_none() {
                return self.date_at(i);
            }
        }
        None
    }

    /// All free days of `month`, ascending.
    pub fn free_days_in_month(&self, month: u32) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut current = NaiveDate::from_ymd_opt(self.year, month, 1);
        while let Some(date) = current {
            if date.month() != month || date.year() != self.year {
                break;
            }
            if self.is_free(date) {
                days.push(date);
            }
            current = date.succ_opt();
        }
        days
    }
}
