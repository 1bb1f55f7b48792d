//! Legal-age check for the storefront age gate.

use chrono::{Datelike, NaiveDate};

/// Minimum age for adult-use purchases.
pub const LEGAL_AGE: u32 = 21;

/// Whole years between `birth_date` and `today`.
///
/// A February 29 birthday counts from March 1 in non-leap years. Returns 0
/// when `today` is before `birth_date`.
#[must_use]
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> u32 {
    if today < birth_date {
        return 0;
    }
    let years = today.year() - birth_date.year();
    // Comparing (month, day) puts Feb 29 between Feb 28 and Mar 1.
    let had_birthday = (today.month(), today.day()) >= (birth_date.month(), birth_date.day());
    let years = if had_birthday { years } else { years - 1 };
    u32::try_from(years).unwrap_or(0)
}

/// Whether someone born on `birth_date` is at least [`LEGAL_AGE`] on `today`.
#[must_use]
pub fn is_of_legal_age(birth_date: NaiveDate, today: NaiveDate) -> bool {
    age_on(birth_date, today) >= LEGAL_AGE
}
