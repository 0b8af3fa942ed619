//! Replays a segment sequence and asserts every Hours-of-Service cap.

use hos_planner::{DutyKind, DutySegment, HosRules};

/// Panics with a description of the first violation found.
pub fn assert_compliant(
    segments: &[DutySegment],
    rules: &HosRules,
    total_drive_minutes: u32,
    starting_cycle_minutes: u32,
) {
    let mut expected_start = 0;
    let mut window_start = 0;
    let mut drive_in_window = 0;
    let mut since_break = 0;
    let mut cycle = starting_cycle_minutes;
    let mut driven = 0;

    for (index, segment) in segments.iter().enumerate() {
        assert_eq!(segment.start, expected_start, "segment {index} is not contiguous");
        assert!(segment.end > segment.start, "segment {index} is empty");
        expected_start = segment.end;
        let minutes = segment.duration();

        match segment.kind {
            DutyKind::Driving => {
                assert!(minutes <= rules.max_driving_per_window, "segment {index} drives too long");
                since_break += minutes;
                drive_in_window += minutes;
                cycle += minutes;
                driven += minutes;
                if let Some(limit) = rules.break_after_driving {
                    assert!(since_break <= limit, "segment {index} drives {since_break} without a break");
                }
                assert!(
                    drive_in_window <= rules.max_driving_per_window,
                    "segment {index} exceeds the window's driving limit"
                );
            }
            DutyKind::OnDutyNotDriving => {
                cycle += minutes;
                assert!(segment.location_hint.is_some(), "stop segment {index} has no location hint");
            }
            DutyKind::Break => {
                assert!(minutes >= rules.break_minutes, "segment {index} is a short break");
                since_break = 0;
            }
            DutyKind::SleeperBerth => {
                assert!(minutes >= rules.min_off_duty_reset, "segment {index} is a short reset");
                since_break = 0;
                drive_in_window = 0;
                window_start = segment.end;
            }
            DutyKind::OffDuty => {
                if rules.cycle_restart.is_some_and(|restart| minutes >= restart) {
                    cycle = 0;
                    since_break = 0;
                    drive_in_window = 0;
                    window_start = segment.end;
                }
            }
        }

        if segment.kind.is_on_duty() {
            assert!(
                segment.end - window_start <= rules.max_on_duty_window,
                "segment {index} ends {} minutes into the on-duty window",
                segment.end - window_start
            );
            assert!(cycle <= rules.max_cycle_on_duty, "segment {index} overruns the cycle");
        }
    }

    assert_eq!(driven, total_drive_minutes, "drive time lost or duplicated");
    if let Some(last) = segments.last() {
        assert!(last.kind.is_on_duty(), "trip ends with trailing rest {:?}", last.kind);
    }
}

/// `(kind, start, end)` triples for literal assertions.
pub fn timeline(segments: &[DutySegment]) -> Vec<(DutyKind, u32, u32)> {
    segments.iter().map(|s| (s.kind, s.start, s.end)).collect()
}

/// Labels of the stop segments, in order.
pub fn stop_labels(segments: &[DutySegment]) -> Vec<String> {
    segments
        .iter()
        .filter_map(|s| s.location_hint.as_ref().map(|hint| hint.label.clone()))
        .collect()
}
