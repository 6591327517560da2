use maputil::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Marker moves driven end to end against virtual time
#[cfg(test)]
mod marker_animation_tests {
    use super::*;

    /// Marker double that records every write the animator makes
    struct RecordingMarker {
        id: MarkerId,
        position: Mutex<LatLng>,
        positions: Mutex<Vec<(Duration, LatLng)>>,
        visibility: Mutex<Vec<bool>>,
        attached: AtomicBool,
        clock: ManualClock,
    }

    impl RecordingMarker {
        fn new(id: MarkerId, position: LatLng, clock: &ManualClock) -> Arc<Self> {
            Arc::new(Self {
                id,
                position: Mutex::new(position),
                positions: Mutex::new(Vec::new()),
                visibility: Mutex::new(Vec::new()),
                attached: AtomicBool::new(true),
                clock: clock.clone(),
            })
        }

        fn positions(&self) -> Vec<(Duration, LatLng)> {
            self.positions.lock().unwrap().clone()
        }

        fn visibility_writes(&self) -> Vec<bool> {
            self.visibility.lock().unwrap().clone()
        }

        fn position_at(&self, at: Duration) -> Option<LatLng> {
            self.positions()
                .into_iter()
                .find(|(time, _)| *time == at)
                .map(|(_, position)| position)
        }
    }

    impl MarkerHandle for RecordingMarker {
        fn id(&self) -> MarkerId {
            self.id
        }

        fn position(&self) -> LatLng {
            *self.position.lock().unwrap()
        }

        fn set_position(&self, position: LatLng) {
            *self.position.lock().unwrap() = position;
            self.positions
                .lock()
                .unwrap()
                .push((self.clock.now(), position));
        }

        fn is_visible(&self) -> bool {
            self.visibility.lock().unwrap().last().copied().unwrap_or(true)
        }

        fn set_visible(&self, visible: bool) {
            self.visibility.lock().unwrap().push(visible);
        }

        fn is_attached(&self) -> bool {
            self.attached.load(Ordering::SeqCst)
        }

        fn remove(&self) {
            self.attached.store(false, Ordering::SeqCst);
        }
    }

    /// Degrees map straight onto pixels, so projecting the start is exact
    struct IdentityProjection;

    impl Projection for IdentityProjection {
        fn to_screen_location(&self, lat_lng: &LatLng) -> Point {
            Point::new(lat_lng.lng, lat_lng.lat)
        }

        fn from_screen_location(&self, point: &Point) -> LatLng {
            LatLng::new(point.y, point.x)
        }
    }

    #[derive(Default)]
    struct IdentityMap {
        camera: Mutex<Vec<CameraUpdate>>,
    }

    impl HostMap for IdentityMap {
        fn projection(&self) -> Box<dyn Projection + '_> {
            Box::new(IdentityProjection)
        }

        fn animate_camera(&self, update: CameraUpdate) {
            self.camera.lock().unwrap().push(update);
        }
    }

    struct Harness {
        clock: ManualClock,
        scheduler: Arc<ManualScheduler>,
        animator: MarkerAnimator,
        map: IdentityMap,
    }

    fn harness(frame_interval_ms: u64) -> Harness {
        let _ = env_logger::builder().is_test(true).try_init();
        let clock = ManualClock::new();
        let scheduler = Arc::new(ManualScheduler::new(clock.clone()));
        let config = MarkerAnimationConfig {
            frame_interval_ms,
            ..MarkerAnimationConfig::default()
        };
        let animator = MarkerAnimator::new(Arc::new(clock.clone()), scheduler.clone(), config);
        Harness {
            clock,
            scheduler,
            animator,
            map: IdentityMap::default(),
        }
    }

    #[test]
    fn test_quarter_way_and_exact_arrival() {
        let h = harness(50);
        let marker = RecordingMarker::new(1, LatLng::new(0.0, 0.0), &h.clock);

        let handle = h
            .animator
            .animate_marker_to(&h.map, &marker, LatLng::new(10.0, 20.0))
            .unwrap();
        h.scheduler.advance(Duration::from_millis(2000));

        assert_eq!(
            marker.position_at(Duration::ZERO),
            Some(LatLng::new(0.0, 0.0))
        );
        assert_eq!(
            marker.position_at(Duration::from_millis(250)),
            Some(LatLng::new(2.5, 5.0))
        );
        assert_eq!(
            marker.position_at(Duration::from_millis(1000)),
            Some(LatLng::new(10.0, 20.0))
        );
        assert_eq!(marker.position(), LatLng::new(10.0, 20.0));
        assert_eq!(marker.visibility_writes(), vec![true]);
        assert!(handle.is_finished());
        assert_eq!(h.animator.active_count(), 0);
    }

    #[test]
    fn test_no_writes_after_completion() {
        let h = harness(16);
        let marker = RecordingMarker::new(1, LatLng::new(5.0, 5.0), &h.clock);

        h.animator
            .animate_marker_to(&h.map, &marker, LatLng::new(6.0, 4.0))
            .unwrap();
        h.scheduler.run_until_idle(1000);

        let positions = marker.positions();
        let (last_time, last) = *positions.last().unwrap();
        assert!(last_time >= Duration::from_millis(1000));
        assert_eq!(last, LatLng::new(6.0, 4.0));
        // 63 intervals of 16 ms reach 1008 ms, plus the first tick at 0
        assert_eq!(
            positions.len() as u64,
            MarkerAnimationConfig::default().expected_ticks()
        );

        h.scheduler.advance(Duration::from_millis(500));
        assert_eq!(marker.positions().len(), positions.len());
        assert_eq!(marker.visibility_writes().len(), 1);
        assert_eq!(h.scheduler.pending(), 0);
    }

    #[test]
    fn test_linear_progress_is_monotone() {
        let h = harness(16);
        let start = LatLng::new(-3.0, 40.0);
        let target = LatLng::new(7.5, 12.0);
        let marker = RecordingMarker::new(1, start, &h.clock);

        h.animator
            .animate_marker_to(&h.map, &marker, target)
            .unwrap();
        h.scheduler.run_until_idle(1000);

        let distances: Vec<f64> = marker
            .positions()
            .iter()
            .map(|(_, p)| ((p.lat - start.lat).powi(2) + (p.lng - start.lng).powi(2)).sqrt())
            .collect();
        assert!(distances.windows(2).all(|w| w[1] >= w[0]));

        // Every sample lies on the segment between start and target
        for (_, p) in marker.positions() {
            let t = (p.lat - start.lat) / (target.lat - start.lat);
            let expected_lng = start.lng + t * (target.lng - start.lng);
            assert!((p.lng - expected_lng).abs() < 1e-9);
            assert!((0.0..=1.0).contains(&t));
        }
    }

    #[test]
    fn test_second_move_supersedes_first() {
        let h = harness(16);
        let marker = RecordingMarker::new(1, LatLng::new(0.0, 0.0), &h.clock);

        let first = h
            .animator
            .animate_marker_to(&h.map, &marker, LatLng::new(10.0, 10.0))
            .unwrap();
        h.scheduler.advance(Duration::from_millis(300));

        let second = h
            .animator
            .animate_marker_to(&h.map, &marker, LatLng::new(-10.0, -10.0))
            .unwrap();
        assert!(first.is_cancelled());
        assert!(second.is_running());
        assert_eq!(h.animator.active_count(), 1);

        h.scheduler.run_until_idle(1000);
        assert_eq!(marker.position(), LatLng::new(-10.0, -10.0));
        assert!(second.is_finished());
        assert!(first.is_cancelled());
        // Only the second move completed, so only it wrote visibility
        assert_eq!(marker.visibility_writes(), vec![true]);

        // After the takeover the marker only heads towards the second target
        let after: Vec<LatLng> = marker
            .positions()
            .into_iter()
            .filter(|(time, _)| *time >= Duration::from_millis(300))
            .map(|(_, p)| p)
            .collect();
        assert!(after.windows(2).all(|w| w[1].lat <= w[0].lat));
    }

    #[test]
    fn test_detached_marker_rejected_without_writes() {
        let h = harness(16);
        let marker = RecordingMarker::new(3, LatLng::new(1.0, 1.0), &h.clock);
        marker.remove();

        let err = h
            .animator
            .animate_marker_to(&h.map, &marker, LatLng::new(2.0, 2.0))
            .unwrap_err();
        assert!(matches!(err, MapError::MarkerDetached(3)));

        h.scheduler.run_until_idle(100);
        assert!(marker.positions().is_empty());
        assert!(marker.visibility_writes().is_empty());
    }

    #[test]
    fn test_invalid_target_rejected_without_writes() {
        let h = harness(16);
        let marker = RecordingMarker::new(3, LatLng::new(1.0, 1.0), &h.clock);

        for target in [
            LatLng::new(91.0, 0.0),
            LatLng::new(0.0, -181.0),
            LatLng::new(f64::NAN, 0.0),
        ] {
            let err = h
                .animator
                .animate_marker_to(&h.map, &marker, target)
                .unwrap_err();
            assert!(matches!(err, MapError::InvalidCoordinates(_)));
        }

        assert_eq!(h.scheduler.pending(), 0);
        assert!(marker.positions().is_empty());
    }

    #[test]
    fn test_marker_detached_mid_flight_stops_quietly() {
        let h = harness(16);
        let marker = RecordingMarker::new(4, LatLng::new(0.0, 0.0), &h.clock);

        let handle = h
            .animator
            .animate_marker_to(&h.map, &marker, LatLng::new(1.0, 1.0))
            .unwrap();
        h.scheduler.advance(Duration::from_millis(200));
        let writes = marker.positions().len();
        marker.remove();

        h.scheduler.run_until_idle(1000);
        assert_eq!(marker.positions().len(), writes);
        assert!(marker.visibility_writes().is_empty());
        assert!(handle.is_cancelled());
        assert!(!h.animator.is_animating(4));
    }

    #[test]
    fn test_hide_on_completion() {
        let h = harness(100);
        let mut config = h.animator.config().clone();
        config.on_complete = CompletionVisibility::Hide;
        let mut animator = h.animator;
        animator.set_config(config).unwrap();

        let marker = RecordingMarker::new(1, LatLng::new(0.0, 0.0), &h.clock);
        animator
            .animate_marker_to(&h.map, &marker, LatLng::new(1.0, 1.0))
            .unwrap();
        h.scheduler.run_until_idle(100);

        assert_eq!(marker.visibility_writes(), vec![false]);
        assert!(!marker.is_visible());
    }

    #[test]
    fn test_zero_duration_lands_on_first_tick() {
        let h = harness(16);
        let mut animator = h.animator;
        animator.set_config(AnimationProfile::Instant.resolve().animation).unwrap();

        let marker = RecordingMarker::new(1, LatLng::new(0.0, 0.0), &h.clock);
        let handle = animator
            .animate_marker_to(&h.map, &marker, LatLng::new(3.0, 4.0))
            .unwrap();
        assert_eq!(h.scheduler.run_due(), 1);

        assert_eq!(marker.positions(), vec![(Duration::ZERO, LatLng::new(3.0, 4.0))]);
        assert_eq!(marker.visibility_writes(), vec![true]);
        assert!(handle.is_finished());
        assert_eq!(h.scheduler.pending(), 0);
    }

    #[test]
    fn test_late_ticks_still_land_on_target() {
        let h = harness(16);
        let marker = RecordingMarker::new(1, LatLng::new(0.0, 0.0), &h.clock);
        h.animator
            .animate_marker_to(&h.map, &marker, LatLng::new(8.0, 8.0))
            .unwrap();

        // The host only pumps its loop every 400 ms
        h.scheduler.run_due();
        for _ in 0..3 {
            h.clock.advance(Duration::from_millis(400));
            h.scheduler.run_due();
        }

        let positions = marker.positions();
        assert_eq!(positions.len(), 4);
        assert_eq!(positions[1].1, LatLng::new(3.2, 3.2));
        assert_eq!(positions[3].1, LatLng::new(8.0, 8.0));
        assert_eq!(marker.visibility_writes(), vec![true]);
    }

    #[test]
    fn test_cancel_all_and_independent_markers() {
        let h = harness(16);
        let a = RecordingMarker::new(1, LatLng::new(0.0, 0.0), &h.clock);
        let b = RecordingMarker::new(2, LatLng::new(0.0, 0.0), &h.clock);

        h.animator
            .animate_marker_to(&h.map, &a, LatLng::new(1.0, 1.0))
            .unwrap();
        h.animator
            .animate_marker_to(&h.map, &b, LatLng::new(2.0, 2.0))
            .unwrap();
        assert_eq!(h.animator.active_count(), 2);

        h.scheduler.advance(Duration::from_millis(100));
        assert!(h.animator.cancel(1));
        assert!(!h.animator.cancel(1));
        assert!(h.animator.is_animating(2));

        assert_eq!(h.animator.cancel_all(), 1);
        assert_eq!(h.animator.active_count(), 0);
        assert_eq!(h.animator.cancel_all(), 0);

        let (a_writes, b_writes) = (a.positions().len(), b.positions().len());
        h.scheduler.run_until_idle(1000);
        assert_eq!(a.positions().len(), a_writes);
        assert_eq!(b.positions().len(), b_writes);
        assert!(a.visibility_writes().is_empty());
        assert!(b.visibility_writes().is_empty());
    }

    #[test]
    fn test_zero_frame_interval_config_rejected() {
        let h = harness(16);
        let mut animator = h.animator;
        let options =
            MapUtilOptions::from_json_str(r#"{ "animation": { "frame_interval_ms": 0 } }"#).unwrap();

        let err = animator.set_config(options.animation).unwrap_err();
        assert!(matches!(err, MapError::InvalidInput(_)));
        assert_eq!(animator.config().frame_interval_ms, 16);
    }

    #[test]
    fn test_zero_frame_interval_still_advances_time() {
        // Built directly, skipping validation: ticks fall back to 1 ms apart
        let h = harness(0);
        let marker = RecordingMarker::new(1, LatLng::new(0.0, 0.0), &h.clock);

        let handle = h
            .animator
            .animate_marker_to(&h.map, &marker, LatLng::new(2.0, 2.0))
            .unwrap();
        assert_eq!(h.scheduler.run_due(), 1);
        assert_eq!(h.scheduler.pending(), 1);

        assert_eq!(h.scheduler.run_until_idle(5000), 1000);
        assert!(handle.is_finished());
        assert_eq!(marker.position(), LatLng::new(2.0, 2.0));
        assert_eq!(marker.visibility_writes(), vec![true]);
    }

    #[cfg(feature = "tokio-runtime")]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_supersede_on_tokio_scheduler() {
        let _ = env_logger::builder().is_test(true).try_init();
        let config = MarkerAnimationConfig {
            duration_ms: 1000,
            frame_interval_ms: 5,
            ..MarkerAnimationConfig::default()
        };
        let animator = MarkerAnimator::new(
            Arc::new(SystemClock::new()),
            Arc::new(TokioScheduler::current().unwrap()),
            config,
        );
        let map = IdentityMap::default();
        let marker = RecordingMarker::new(3, LatLng::new(0.0, 0.0), &ManualClock::new());

        let first = animator
            .animate_marker_to(&map, &marker, LatLng::new(10.0, 10.0))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        let second = animator
            .animate_marker_to(&map, &marker, LatLng::new(-5.0, -5.0))
            .unwrap();
        assert!(first.is_cancelled());

        tokio::time::timeout(Duration::from_secs(5), async {
            while second.is_running() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        // Let any stale tick of the first move run out
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(second.is_finished());
        assert!(first.is_cancelled());
        assert_eq!(marker.position(), LatLng::new(-5.0, -5.0));
        assert_eq!(
            marker.positions().last().map(|(_, position)| *position),
            Some(LatLng::new(-5.0, -5.0))
        );
        assert_eq!(marker.visibility_writes(), vec![true]);
        assert!(!animator.is_animating(3));
    }

    #[test]
    fn test_dyn_marker_handles() {
        let h = harness(250);
        let marker: Arc<dyn MarkerHandle> =
            RecordingMarker::new(9, LatLng::new(0.0, 0.0), &h.clock);

        h.animator
            .animate_marker_to(&h.map, &marker, LatLng::new(4.0, 4.0))
            .unwrap();
        h.scheduler.run_until_idle(100);
        assert_eq!(marker.position(), LatLng::new(4.0, 4.0));
    }
}
