//! Calendar granularities used by the estimator.
//!
//! All arithmetic assumes a 360-day calendar of twelve 30-day months.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Reporting granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Month,
    Quarter,
    Year,
}

impl Period {
    /// Reporting order: shortest period first.
    pub const ALL: [Period; 4] = [Period::Day, Period::Month, Period::Quarter, Period::Year];

    /// How many of this period fit in one 360-day year.
    pub fn per_year(self) -> u32 {
        match self {
            Period::Day => 360,
            Period::Month => 12,
            Period::Quarter => 4,
            Period::Year => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Month => "month",
            Period::Quarter => "quarter",
            Period::Year => "year",
        }
    }
}

/// One value per reporting period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodValues<T = f64> {
    pub day: T,
    pub month: T,
    pub quarter: T,
    pub year: T,
}

impl<T: Copy> PeriodValues<T> {
    pub fn new(day: T, month: T, quarter: T, year: T) -> Self {
        Self {
            day,
            month,
            quarter,
            year,
        }
    }

    pub fn splat(value: T) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn get(&self, period: Period) -> T {
        match period {
            Period::Day => self.day,
            Period::Month => self.month,
            Period::Quarter => self.quarter,
            Period::Year => self.year,
        }
    }

    /// Build a vector by evaluating `f` for every period.
    pub fn from_fn(mut f: impl FnMut(Period) -> T) -> Self {
        Self::new(
            f(Period::Day),
            f(Period::Month),
            f(Period::Quarter),
            f(Period::Year),
        )
    }

    pub fn map<U: Copy>(&self, mut f: impl FnMut(Period, T) -> U) -> PeriodValues<U> {
        PeriodValues::from_fn(|p| f(p, self.get(p)))
    }
}

impl PeriodValues<f64> {
    pub fn zero() -> Self {
        Self::splat(0.0)
    }

    pub fn is_zero(&self) -> bool {
        Period::ALL.iter().all(|p| self.get(*p) == 0.0)
    }
}

impl<T: Copy + Add<Output = T>> Add for PeriodValues<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.day + rhs.day,
            self.month + rhs.month,
            self.quarter + rhs.quarter,
            self.year + rhs.year,
        )
    }
}

impl<T: Copy + Add<Output = T>> AddAssign for PeriodValues<T> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
