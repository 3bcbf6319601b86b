use chrono::{Datelike, NaiveDate};

pub fn month_key(date: NaiveDate) -> String {
    format!("{}-{:02}", date.year(), date.month())
}

/// Every month touched by `[start, end]`, as `YYYY-MM` keys.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> Vec<String> {
    let mut months = Vec::new();
    let (mut year, mut month) = (start.year(), start.month());
    while (year, month) <= (end.year(), end.month()) {
        months.push(format!("{year}-{month:02}"));
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    months
}

pub fn short_hash(hash: &str) -> String {
    hash.chars().take(8).collect()
}

/// Date stamp used in report file names.
pub fn file_stamp(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}
