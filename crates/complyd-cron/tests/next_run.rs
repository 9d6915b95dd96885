// Pins the forward-scan semantics: strictly-after tie-break, second
// truncation, the day-field conjunction, and the bounded-scan `None` case.

use chrono::{DateTime, Utc};
use complyd_cron::CronExpression;

fn at(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

#[test]
fn every_minute_fires_one_minute_later() {
    let expr = CronExpression::parse("* * * * *").unwrap();
    let next = expr.next_after(at("2025-06-03T10:30:00Z")).unwrap();
    assert_eq!(next, at("2025-06-03T10:31:00Z"));
}

#[test]
fn seconds_are_truncated_before_the_scan() {
    let expr = CronExpression::parse("* * * * *").unwrap();
    // 10:30:45 truncates to 10:30, so the next candidate is 10:31 — not 10:31:45.
    let next = expr.next_after(at("2025-06-03T10:30:45Z")).unwrap();
    assert_eq!(next, at("2025-06-03T10:31:00Z"));
}

#[test]
fn weekday_schedule_from_tuesday_lands_on_next_monday() {
    let expr = CronExpression::parse("0 9 * * 1").unwrap();
    // 2025-06-03 is a Tuesday; the following Monday is 2025-06-09.
    let next = expr.next_after(at("2025-06-03T08:00:00Z")).unwrap();
    assert_eq!(next, at("2025-06-09T09:00:00Z"));
}

#[test]
fn matching_minute_is_never_returned_for_its_own_from() {
    let expr = CronExpression::parse("0 9 * * *").unwrap();
    // `from` sits exactly on a match; the scan starts strictly after it.
    let next = expr.next_after(at("2025-06-03T09:00:00Z")).unwrap();
    assert_eq!(next, at("2025-06-04T09:00:00Z"));
}

#[test]
fn recomputing_from_just_before_a_run_is_stable() {
    let expr = CronExpression::parse("30 14 * * *").unwrap();
    let first = expr.next_after(at("2025-06-03T00:00:00Z")).unwrap();
    let again = expr
        .next_after(first - chrono::Duration::minutes(1))
        .unwrap();
    assert_eq!(again, first);
}

#[test]
fn day_fields_are_and_conjoined() {
    // Day-of-month 13 AND Friday: only Friday the 13th matches.
    let expr = CronExpression::parse("0 9 13 * 5").unwrap();
    let next = expr.next_after(at("2026-01-01T00:00:00Z")).unwrap();
    // 2026-01-13 is a Tuesday and is skipped; the first Friday the 13th
    // after the reference is 2026-02-13.
    assert_eq!(next, at("2026-02-13T09:00:00Z"));
}

#[test]
fn sunday_as_seven_behaves_like_zero() {
    let expr = CronExpression::parse("0 9 * * 7").unwrap();
    // 2025-06-02 is a Monday; the next Sunday is 2025-06-08.
    let next = expr.next_after(at("2025-06-02T12:00:00Z")).unwrap();
    assert_eq!(next, at("2025-06-08T09:00:00Z"));
}

#[test]
fn year_boundary_is_crossed() {
    let expr = CronExpression::parse("0 0 1 1 *").unwrap();
    let next = expr.next_after(at("2025-06-03T00:00:00Z")).unwrap();
    assert_eq!(next, at("2026-01-01T00:00:00Z"));
}

#[test]
fn impossible_combination_exhausts_the_bound() {
    // February has no 31st; the scan must give up, not spin forever.
    let expr = CronExpression::parse("0 0 31 2 *").unwrap();
    assert_eq!(expr.next_after(at("2025-06-03T00:00:00Z")), None);
}

#[test]
fn step_and_range_fields_combine() {
    let expr = CronExpression::parse("*/20 9-10 * * *").unwrap();
    let next = expr.next_after(at("2025-06-03T09:41:00Z")).unwrap();
    assert_eq!(next, at("2025-06-03T10:00:00Z"));
}
