use trackbar_core::{
    thumb_hit_test, Axis, PagingDirection, Point, Rect, ScrollDirection, TrackGeometry, TrackHit,
    ViewportMetrics,
};

const WIDTHS: [f32; 3] = [0.0, 10.0, 17.0];
const DIRECTIONS: [ScrollDirection; 3] = [
    ScrollDirection::Vertical,
    ScrollDirection::Horizontal,
    ScrollDirection::Both,
];

fn layouts() -> impl Iterator<Item = (f32, f32)> {
    [
        (100.0, 100.0),
        (100.0, 101.0),
        (100.0, 500.0),
        (240.0, 10_000.0),
        (333.0, 1234.0),
        (17.0, 20.0),
    ]
    .into_iter()
}

#[test]
fn thumb_fits_in_track_for_every_scroll_position() {
    for width in WIDTHS {
        let geometry = TrackGeometry::new(width);
        for direction in DIRECTIONS {
            for (visible, total) in layouts() {
                let track = geometry.track_size(visible, direction);
                let metrics = ViewportMetrics::new(visible, total);
                let mut scroll = 0.0;
                while scroll <= metrics.max_scroll() {
                    let thumb = geometry.thumb(metrics, scroll, direction).unwrap();
                    assert!(thumb.size >= 0.0 && thumb.size <= track);
                    assert!(thumb.offset >= 0.0);
                    assert!(
                        thumb.offset + thumb.size <= track,
                        "{direction:?} w={width} {visible}/{total} @ {scroll}: {thumb:?} in {track}"
                    );
                    scroll += 7.0;
                }
            }
        }
    }
}

#[test]
fn thumb_offset_is_monotonic_in_scroll() {
    let geometry = TrackGeometry::new(15.0);
    for direction in DIRECTIONS {
        for (visible, total) in layouts() {
            let max = ViewportMetrics::new(visible, total).max_scroll();
            let mut previous = 0.0;
            let mut scroll = 0.0;
            while scroll <= max {
                let offset = geometry
                    .thumb_offset(visible, total, scroll, direction)
                    .unwrap();
                assert!(offset >= previous, "{visible}/{total}: {offset} < {previous}");
                previous = offset;
                scroll += 3.0;
            }
        }
    }
}

#[test]
fn content_that_fits_fills_the_track() {
    for width in WIDTHS {
        let geometry = TrackGeometry::new(width);
        for direction in DIRECTIONS {
            let thumb = geometry
                .thumb(ViewportMetrics::new(250.0, 250.0), 0.0, direction)
                .unwrap();
            assert_eq!(thumb.size, geometry.track_size(250.0, direction));
            assert_eq!(thumb.offset, 0.0);
        }
    }
}

#[test]
fn both_directions_reserve_the_corner() {
    for width in [1.0, 10.0, 17.0] {
        let geometry = TrackGeometry::new(width);
        for visible in [50.0, 100.0, 640.0] {
            assert_eq!(
                geometry.track_size(visible, ScrollDirection::Both),
                geometry.track_size(visible, ScrollDirection::Vertical) - width
            );
        }
    }
}

#[test]
fn empty_content_is_an_error_not_a_division() {
    let geometry = TrackGeometry::new(0.0);
    for total in [0.0, -1.0, f32::NAN] {
        assert!(geometry
            .thumb(ViewportMetrics::new(100.0, total), 0.0, ScrollDirection::Vertical)
            .is_err());
    }
}

#[test]
fn hit_test_agrees_with_geometry() {
    let geometry = TrackGeometry::new(0.0);
    let track = Rect::new(20.0, 190.0, 10.0, 100.0);
    let thumb = geometry
        .thumb(ViewportMetrics::new(100.0, 500.0), 200.0, ScrollDirection::Vertical)
        .unwrap();

    let on_thumb = Point::new(195.0, 20.0 + thumb.offset + thumb.size / 2.0);
    assert!(thumb_hit_test(on_thumb, track, thumb.offset, thumb.size, Axis::Vertical));
    assert_eq!(
        TrackHit::classify(on_thumb, track, thumb.offset, thumb.size, Axis::Vertical),
        TrackHit::Thumb
    );

    let above = Point::new(195.0, 25.0);
    assert_eq!(
        TrackHit::classify(above, track, thumb.offset, thumb.size, Axis::Vertical),
        TrackHit::Track
    );
    assert_eq!(
        PagingDirection::for_click(above, track, thumb.offset, Axis::Vertical),
        PagingDirection::Backward
    );

    let below = Point::new(195.0, 110.0);
    assert_eq!(
        PagingDirection::for_click(below, track, thumb.offset, Axis::Vertical),
        PagingDirection::Forward
    );
}
