use crate::model::*;

// ── Timeline Algorithm ────────────────────────────────────────────

/// Every interval occupied by a class or a reservation, sorted by start
/// (ties by end) and coalesced into maximal runs.
pub fn busy_spans(classes: &[ClassBlock], reservations: &[ReservationBlock]) -> Vec<Span> {
    let mut spans: Vec<Span> = classes
        .iter()
        .map(|c| c.span)
        .chain(reservations.iter().map(|r| r.span))
        .collect();
    spans.sort();
    merge_overlapping(&spans)
}

/// Merge sorted overlapping/adjacent intervals into disjoint intervals.
pub fn merge_overlapping(sorted: &[Span]) -> Vec<Span> {
    let mut merged: Vec<Span> = Vec::new();
    for &span in sorted {
        if let Some(last) = merged.last_mut() {
            if span.start <= last.end {
                last.end = last.end.max(span.end);
                continue;
            }
        }
        merged.push(span);
    }
    merged
}

/// Partition `window` into alternating free/occupied blocks.
///
/// `busy` must be sorted and disjoint (see [`merge_overlapping`]); parts
/// outside the window are clipped away.
pub fn build_timeline(window: &Span, busy: &[Span]) -> Vec<TimelineBlock> {
    let mut blocks = Vec::with_capacity(busy.len() * 2 + 1);
    let mut cursor = window.start;

    for occupied in busy.iter().filter_map(|s| s.clip(window)) {
        if cursor < occupied.start {
            blocks.push(TimelineBlock::free(Span::new(cursor, occupied.start)));
        }
        blocks.push(TimelineBlock::occupied(occupied));
        cursor = occupied.end;
    }

    if cursor < window.end {
        blocks.push(TimelineBlock::free(Span::new(cursor, window.end)));
    }

    blocks
}

/// Status of the room at instant `t`.
pub fn status_at(busy: &[Span], t: Minute) -> BlockStatus {
    if busy.iter().any(|s| s.contains_instant(t)) {
        BlockStatus::Occupied
    } else {
        BlockStatus::Free
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use ulid::Ulid;

    const H: Minute = 60;

    fn class(start: Minute, end: Minute, label: &str) -> ClassBlock {
        ClassBlock {
            span: Span::new(start, end),
            label: label.into(),
        }
    }

    fn reservation(start: Minute, end: Minute) -> ReservationBlock {
        ReservationBlock {
            id: Ulid::new(),
            room_id: 5,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            span: Span::new(start, end),
            user: "lee".into(),
        }
    }

    fn timeline(classes: &[ClassBlock], reservations: &[ReservationBlock]) -> Vec<TimelineBlock> {
        build_timeline(&OPERATING_WINDOW, &busy_spans(classes, reservations))
    }

    // ── merge_overlapping ────────────────────────────────

    #[test]
    fn merge_overlapping_basic() {
        let spans = vec![Span::new(100, 300), Span::new(200, 400), Span::new(500, 600)];
        let merged = merge_overlapping(&spans);
        assert_eq!(merged, vec![Span::new(100, 400), Span::new(500, 600)]);
    }

    #[test]
    fn merge_overlapping_adjacent() {
        let spans = vec![Span::new(100, 200), Span::new(200, 300)];
        assert_eq!(merge_overlapping(&spans), vec![Span::new(100, 300)]);
    }

    #[test]
    fn merge_overlapping_contained() {
        let spans = vec![Span::new(100, 500), Span::new(200, 300)];
        assert_eq!(merge_overlapping(&spans), vec![Span::new(100, 500)]);
    }

    // ── build_timeline ───────────────────────────────────

    #[test]
    fn empty_day_is_one_free_block() {
        assert_eq!(timeline(&[], &[]), vec![TimelineBlock::free(OPERATING_WINDOW)]);
    }

    #[test]
    fn single_class_splits_the_day() {
        let blocks = timeline(&[class(10 * H, 11 * H + 30, "CS101")], &[]);
        assert_eq!(
            blocks,
            vec![
                TimelineBlock::free(Span::new(9 * H, 10 * H)),
                TimelineBlock::occupied(Span::new(10 * H, 11 * H + 30)),
                TimelineBlock::free(Span::new(11 * H + 30, 18 * H)),
            ]
        );
    }

    #[test]
    fn class_and_reservation() {
        let blocks = timeline(
            &[class(10 * H, 11 * H + 30, "CS101")],
            &[reservation(13 * H, 14 * H)],
        );
        assert_eq!(
            blocks,
            vec![
                TimelineBlock::free(Span::new(9 * H, 10 * H)),
                TimelineBlock::occupied(Span::new(10 * H, 11 * H + 30)),
                TimelineBlock::free(Span::new(11 * H + 30, 13 * H)),
                TimelineBlock::occupied(Span::new(13 * H, 14 * H)),
                TimelineBlock::free(Span::new(14 * H, 18 * H)),
            ]
        );
    }

    #[test]
    fn touching_class_and_reservation_coalesce() {
        let blocks = timeline(
            &[class(10 * H, 11 * H, "MATH")],
            &[reservation(11 * H, 12 * H)],
        );
        assert_eq!(
            blocks,
            vec![
                TimelineBlock::free(Span::new(9 * H, 10 * H)),
                TimelineBlock::occupied(Span::new(10 * H, 12 * H)),
                TimelineBlock::free(Span::new(12 * H, 18 * H)),
            ]
        );
    }

    #[test]
    fn busy_at_window_edges_has_no_empty_free_blocks() {
        let blocks = timeline(
            &[class(9 * H, 10 * H, "AM"), class(17 * H, 18 * H, "PM")],
            &[],
        );
        assert_eq!(
            blocks,
            vec![
                TimelineBlock::occupied(Span::new(9 * H, 10 * H)),
                TimelineBlock::free(Span::new(10 * H, 17 * H)),
                TimelineBlock::occupied(Span::new(17 * H, 18 * H)),
            ]
        );
    }

    #[test]
    fn busy_outside_window_is_clipped() {
        let blocks = timeline(&[class(8 * H, 9 * H + 30, "EARLY")], &[reservation(17 * H, 20 * H)]);
        assert_eq!(
            blocks,
            vec![
                TimelineBlock::occupied(Span::new(9 * H, 9 * H + 30)),
                TimelineBlock::free(Span::new(9 * H + 30, 17 * H)),
                TimelineBlock::occupied(Span::new(17 * H, 18 * H)),
            ]
        );

        let late_only = timeline(&[], &[reservation(19 * H, 20 * H)]);
        assert_eq!(late_only, vec![TimelineBlock::free(OPERATING_WINDOW)]);
    }

    #[test]
    fn whole_day_occupied() {
        let blocks = timeline(&[class(8 * H, 19 * H, "EXAM")], &[]);
        assert_eq!(blocks, vec![TimelineBlock::occupied(OPERATING_WINDOW)]);
    }

    #[test]
    fn status_at_instant() {
        let busy = vec![Span::new(10 * H, 11 * H)];
        assert_eq!(status_at(&busy, 10 * H), BlockStatus::Occupied);
        assert_eq!(status_at(&busy, 11 * H), BlockStatus::Free);
        assert_eq!(status_at(&busy, 9 * H), BlockStatus::Free);
    }

    // ── partition properties ─────────────────────────────

    fn arb_span() -> impl Strategy<Value = Span> {
        (0..MINUTES_PER_DAY - 1)
            .prop_flat_map(|start| (Just(start), start + 1..=MINUTES_PER_DAY - 1))
            .prop_map(|(start, end)| Span::new(start, end))
    }

    proptest! {
        #[test]
        fn timeline_partitions_window(
            class_spans in prop::collection::vec(arb_span(), 0..8),
            reservation_spans in prop::collection::vec(arb_span(), 0..8),
        ) {
            let classes: Vec<ClassBlock> = class_spans.iter().map(|s| ClassBlock { span: *s, label: "X".into() }).collect();
            let reservations: Vec<ReservationBlock> = reservation_spans.iter().map(|s| reservation(s.start, s.end)).collect();
            let blocks = timeline(&classes, &reservations);

            prop_assert!(!blocks.is_empty());
            prop_assert_eq!(blocks.first().unwrap().span.start, OPERATING_WINDOW.start);
            prop_assert_eq!(blocks.last().unwrap().span.end, OPERATING_WINDOW.end);
            for pair in blocks.windows(2) {
                prop_assert_eq!(pair[0].span.end, pair[1].span.start);
                prop_assert_ne!(pair[0].status, pair[1].status);
            }
            for block in &blocks {
                prop_assert!(block.span.start < block.span.end);
                let hits = class_spans.iter().chain(reservation_spans.iter()).any(|s| s.overlaps(&block.span));
                prop_assert_eq!(hits, block.status == BlockStatus::Occupied);
            }
        }

        #[test]
        fn timeline_is_deterministic(spans in prop::collection::vec(arb_span(), 0..8)) {
            let reservations: Vec<ReservationBlock> = spans.iter().map(|s| reservation(s.start, s.end)).collect();
            prop_assert_eq!(timeline(&[], &reservations), timeline(&[], &reservations));
        }
    }
}
