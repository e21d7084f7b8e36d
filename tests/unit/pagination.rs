//! Page scanning against the trailing window

use crate::support::comment;
use chrono::{Duration, Utc};
use studio_activity::fetcher::pagination::{is_outside_window, scan_page, PageCursor};

#[test]
fn test_empty_page_scan() {
    let scan = scan_page(&[], Utc::now(), Duration::hours(24));
    assert!(scan.accepted.is_empty());
    assert!(scan.reply_targets.is_empty());
    assert!(!scan.reached_boundary);
}

#[test]
fn test_boundary_on_first_comment() {
    let now = Utc::now();
    let page = vec![
        comment(1, "old", now - Duration::days(3), 5),
        comment(2, "older", now - Duration::days(4), 5),
    ];

    let scan = scan_page(&page, now, Duration::hours(24));
    assert!(scan.accepted.is_empty());
    assert!(scan.reply_targets.is_empty());
    assert!(scan.reached_boundary);
}

#[test]
fn test_custom_window_length() {
    let now = Utc::now();
    let window = Duration::hours(1);
    assert!(!is_outside_window(now - Duration::minutes(59), now, window));
    assert!(!is_outside_window(now - window, now, window));
    assert!(is_outside_window(now - Duration::minutes(61), now, window));
    // Timestamps ahead of the local clock are inside the window
    assert!(!is_outside_window(now + Duration::minutes(5), now, window));
}

#[test]
fn test_only_commented_threads_are_targets() {
    let now = Utc::now();
    let page = vec![
        comment(7, "a", now, 0),
        comment(8, "b", now, 1),
        comment(9, "c", now, 12),
    ];

    let scan = scan_page(&page, now, Duration::hours(24));
    assert_eq!(scan.reply_targets, vec![8, 9]);
}

#[test]
fn test_cursor_with_zero_page_size_still_advances() {
    let mut cursor = PageCursor::new(0, 10);
    cursor.advance();
    assert_eq!(cursor.page_size(), 1);
    assert_eq!(cursor.offset(), 1);
}
