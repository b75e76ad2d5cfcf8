use super::*;
use chrono::{NaiveDate, Timelike};

fn vevent(lines: &[&str]) -> String {
    let body: String = lines.iter().map(|l| format!("{l}\r\n")).collect();
    format!("BEGIN:VEVENT\r\n{body}END:VEVENT\r\n")
}

#[test]
fn compact_datetime_with_time() {
    let dt = parse_ics_datetime("20240415T090000").unwrap();
    assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 4, 15).unwrap());
    assert_eq!((dt.hour(), dt.minute(), dt.second()), (9, 0, 0));
}

#[test]
fn compact_date_without_time_is_midnight() {
    let dt = parse_ics_datetime("20240415").unwrap();
    assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 4, 15).unwrap());
    assert_eq!((dt.hour(), dt.minute(), dt.second()), (0, 0, 0));
}

#[test]
fn datetime_parameter_prefix_is_stripped() {
    let dt = parse_ics_datetime("TZID=Asia/Tokyo:20240415T133000").unwrap();
    assert_eq!((dt.hour(), dt.minute()), (13, 30));
}

#[test]
fn non_compact_datetime_falls_back_to_generic_parsing() {
    let dt = parse_ics_datetime("2024-04-15").unwrap();
    assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 4, 15).unwrap());
    assert!(parse_ics_datetime("not a date").is_none());
}

#[test]
fn full_event_block() {
    let ics = vevent(&[
        "UID:class-101@portal",
        "SUMMARY:Algorithms and Data Structures",
        "DTSTART;TZID=Asia/Tokyo:20240415T090000",
        "DTEND;TZID=Asia/Tokyo:20240415T103000",
        "LOCATION:Room M8",
        "DESCRIPTION:Lecture 1\\nBring laptop\\, charged",
        "RRULE:FREQ=WEEKLY;COUNT=14",
    ]);
    let events = parse_ics(&ics);
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.uid, "class-101@portal");
    assert_eq!(event.summary, "Algorithms and Data Structures");
    assert_eq!(event.location.as_deref(), Some("Room M8"));
    assert_eq!(
        event.description.as_deref(),
        Some("Lecture 1\nBring laptop, charged")
    );
    assert_eq!(event.rrule.as_deref(), Some("FREQ=WEEKLY;COUNT=14"));
    assert_eq!(event.dtend.hour(), 10);
}

#[test]
fn dtend_defaults_to_dtstart() {
    let ics = vevent(&["SUMMARY:Deadline", "DTSTART:20240501T235900"]);
    let events = parse_ics(&ics);
    assert_eq!(events[0].dtend, events[0].dtstart);
}

#[test]
fn missing_uid_gets_positional_fallback() {
    let ics = format!(
        "{}{}",
        vevent(&["SUMMARY:First", "DTSTART:20240401"]),
        vevent(&["SUMMARY:Second", "DTSTART:20240402"]),
    );
    let events = parse_ics(&ics);
    assert_eq!(events[0].uid, "event-0");
    assert_eq!(events[1].uid, "event-1");
}

#[test]
fn malformed_blocks_are_skipped_not_fatal() {
    // Interleave two good blocks with blocks missing SUMMARY, missing
    // DTSTART, and carrying an unparseable DTSTART.
    let ics = format!(
        "BEGIN:VCALENDAR\r\n{}{}{}{}{}END:VCALENDAR\r\n",
        vevent(&["SUMMARY:Good one", "DTSTART:20240415T090000"]),
        vevent(&["DTSTART:20240416T090000"]),
        vevent(&["SUMMARY:No start"]),
        vevent(&["SUMMARY:Bad start", "DTSTART:garbage"]),
        vevent(&["SUMMARY:Good two", "DTSTART:20240417"]),
    );
    let events = parse_ics(&ics);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].summary, "Good one");
    assert_eq!(events[1].summary, "Good two");
    // Positions follow emitted events, not source blocks.
    assert_eq!(events[1].uid, "event-1");
    for event in &events {
        assert!(event.dtend >= event.dtstart);
    }
}

#[test]
fn empty_feed_yields_no_events() {
    assert!(parse_ics("BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n").is_empty());
}

#[test]
fn field_names_match_case_insensitively() {
    let ics = vevent(&["summary:Lowercase feed", "dtstart:20240415"]);
    let events = parse_ics(&ics);
    assert_eq!(events[0].summary, "Lowercase feed");
}
