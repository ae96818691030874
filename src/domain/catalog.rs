use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Day-of-week as stored in catalog documents (`"Mon"`, `"Tue"`, ...).
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Mon,
            chrono::Weekday::Tue => Weekday::Tue,
            chrono::Weekday::Wed => Weekday::Wed,
            chrono::Weekday::Thu => Weekday::Thu,
            chrono::Weekday::Fri => Weekday::Fri,
            chrono::Weekday::Sat => Weekday::Sat,
            chrono::Weekday::Sun => Weekday::Sun,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Station {
    pub id: String,
    pub name: String,
}

/// A scheduled train as the catalog describes it. Immutable from the core's
/// perspective; the catalog owns it.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Train {
    pub id: String,
    pub source: String,
    pub destination: String,
    pub departure: chrono::NaiveTime,
    pub arrival: chrono::NaiveTime,
    pub running_days: BTreeSet<Weekday>,
    /// Ordered class name -> fare per passenger.
    pub fares: BTreeMap<String, Decimal>,
}

impl Train {
    /// Current fare for a class, if the train carries that class at all.
    pub fn fare_for(&self, class: &str) -> Option<Decimal> {
        self.fares.get(class).copied()
    }

    pub fn runs_on(&self, day: Weekday) -> bool {
        self.running_days.contains(&day)
    }
}
