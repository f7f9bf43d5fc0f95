//! Expiry date entry and classification
//!
//! Expiry is typed as compact `MM/YY` keystrokes. The raw text is kept for
//! display while a normalized date (last day of the month) is only updated
//! once the pattern is complete and valid.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Accepted range of expiry years
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpiryYearRange {
    pub min: i32,
    pub max: i32,
}

impl ExpiryYearRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.min && year <= self.max
    }
}

impl Default for ExpiryYearRange {
    fn default() -> Self {
        Self {
            min: 2023,
            max: 2050,
        }
    }
}

/// Filter raw expiry keystrokes into `MM/YY` shape
///
/// Keeps digits and the first `/`. A leading month pair outside 01-12 is cut
/// back to its first digit, and `/` is inserted after a valid month.
pub fn sanitize_expiry_input(raw: &str) -> String {
    let mut month_digits = String::new();
    let mut year_digits = String::new();
    let mut seen_slash = false;

    for c in raw.chars() {
        if c.is_ascii_digit() {
            if seen_slash {
                year_digits.push(c);
            } else {
                month_digits.push(c);
            }
        } else if c == '/' && !seen_slash {
            seen_slash = true;
        }
    }

    if month_digits.len() < 2 {
        // Nothing to validate yet
        let mut out = month_digits;
        if seen_slash {
            out.push('/');
            out.push_str(&year_digits);
        }
        out.truncate(5);
        return out;
    }

    let month: u32 = month_digits[..2].parse().unwrap_or(0);
    if !(1..=12).contains(&month) {
        return month_digits[..1].to_string();
    }

    // Digits typed past the month belong to the year
    let mut year: String = month_digits[2..].to_string();
    year.push_str(&year_digits);
    year.truncate(2);

    format!("{}/{}", &month_digits[..2], year)
}

/// Parse a complete `MM/YY` string into the last day of that month
pub fn parse_expiry(text: &str, years: ExpiryYearRange) -> Option<NaiveDate> {
    let (month, year) = text.split_once('/')?;
    if month.len() != 2 || year.len() != 2 {
        return None;
    }
    if !month.chars().chain(year.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }

    let month: u32 = month.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    let year = 2000 + year.parse::<i32>().ok()?;
    if !years.contains(year) {
        return None;
    }

    last_day_of_month(year, month)
}

/// Last calendar day of a month
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// Render a stored date back into `MM/YY`
pub fn format_expiry(date: NaiveDate) -> String {
    format!("{:02}/{:02}", date.month(), date.year().rem_euclid(100))
}

/// Expiry input state: raw keystrokes plus the last valid normalized date
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpiryField {
    raw: String,
    date: Option<NaiveDate>,
}

impl ExpiryField {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            raw: format_expiry(date),
            date: Some(date),
        }
    }

    /// Apply the current contents of the input box
    pub fn input(&mut self, keystrokes: &str, years: ExpiryYearRange) {
        self.raw = sanitize_expiry_input(keystrokes);
        if let Some(date) = parse_expiry(&self.raw, years) {
            self.date = Some(date);
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

/// Expiry state used for display styling
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    Expired,
    NearExpiry,
    Good,
}

impl std::fmt::Display for ExpiryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpiryStatus::Expired => write!(f, "Expired"),
            ExpiryStatus::NearExpiry => write!(f, "Near Expiry"),
            ExpiryStatus::Good => write!(f, "Good"),
        }
    }
}

/// How far ahead an expiry counts as "near"
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NearExpiryWindow {
    pub months: u32,
}

impl NearExpiryWindow {
    /// Window used while entering a purchase
    pub const PURCHASE_ENTRY: Self = Self { months: 6 };
    /// Window used when browsing inventory
    pub const INVENTORY: Self = Self { months: 3 };

    pub fn new(months: u32) -> Self {
        Self { months }
    }

    pub fn classify(&self, expiry: NaiveDate, today: NaiveDate) -> ExpiryStatus {
        if expiry < today {
            return ExpiryStatus::Expired;
        }
        let horizon = today
            .checked_add_months(Months::new(self.months))
            .unwrap_or(NaiveDate::MAX);
        if expiry <= horizon {
            ExpiryStatus::NearExpiry
        } else {
            ExpiryStatus::Good
        }
    }
}
