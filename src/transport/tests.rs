#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::core::PlayerConfig;
    use crate::engine::{EngineNotification, FrameUpdate, MediaEngine, ProducerInfo, VideoSize};
    use crate::transport::{drain_events, TransportController, TransportEvent};
    use crate::view::TabMode;

    #[derive(Debug, Clone, PartialEq)]
    enum Recorded {
        Play(f64),
        Pause,
        Stop,
        Seek(i32),
        SetVolume(f64),
    }

    struct RecordingEngine {
        commands: Mutex<Vec<Recorded>>,
        volume: Mutex<f64>,
    }

    impl RecordingEngine {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                commands: Mutex::new(Vec::new()),
                volume: Mutex::new(0.8),
            })
        }

        fn take(&self) -> Vec<Recorded> {
            std::mem::take(&mut *self.commands.lock().unwrap())
        }

        fn record(&self, command: Recorded) {
            self.commands.lock().unwrap().push(command);
        }
    }

    impl MediaEngine for RecordingEngine {
        fn play(&self, speed: f64) {
            self.record(Recorded::Play(speed));
        }

        fn pause(&self) {
            self.record(Recorded::Pause);
        }

        fn stop(&self) {
            self.record(Recorded::Stop);
        }

        fn seek(&self, position: i32) {
            self.record(Recorded::Seek(position));
        }

        fn set_volume(&self, volume: f64) {
            *self.volume.lock().unwrap() = volume;
            self.record(Recorded::SetVolume(volume));
        }

        fn current_volume(&self) -> f64 {
            *self.volume.lock().unwrap()
        }
    }

    /// Controller with a paused 100 frame source loaded.
    fn create_test_controller() -> (TransportController, Arc<RecordingEngine>) {
        let mut controller = TransportController::new(Arc::new(PlayerConfig::default()));
        let engine = RecordingEngine::new();
        controller.connect_transport(&engine);
        controller.on_producer_opened(ProducerInfo::new(100, 25.0), false);
        engine.take();
        (controller, engine)
    }

    fn frame(position: i32, is_playing: bool) -> FrameUpdate {
        FrameUpdate {
            position,
            fps: 25.0,
            in_point: 0,
            out_point: 99,
            length: 100,
            is_playing,
        }
    }

    #[test]
    fn test_seek_clamps_to_in_out_range() {
        let (mut controller, engine) = create_test_controller();
        controller.set_in(10);
        controller.set_out(90);

        controller.seek(200);
        assert_eq!(controller.position(), 90);
        controller.seek(-5);
        assert_eq!(controller.position(), 10);
        assert_eq!(engine.take(), vec![Recorded::Seek(90), Recorded::Seek(10)]);
    }

    #[test]
    fn test_seek_stores_clamped_position_for_many_inputs() {
        let (mut controller, _engine) = create_test_controller();
        controller.set_in(20);
        controller.set_out(60);

        for requested in [-1000, -1, 0, 19, 20, 35, 60, 61, 99, 100, 5000] {
            controller.seek(requested);
            assert_eq!(controller.position(), requested.clamp(20, 60), "seek({})", requested);
        }
    }

    #[test]
    fn test_seek_without_range_uses_whole_source() {
        let (mut controller, _engine) = create_test_controller();
        controller.seek(1000);
        assert_eq!(controller.position(), 99);
        controller.seek(-1);
        assert_eq!(controller.position(), 0);
    }

    #[test]
    fn test_repeated_seek_is_suppressed() {
        let (mut controller, engine) = create_test_controller();
        let mut rx = controller.subscribe();

        controller.seek(40);
        controller.seek(40);
        assert_eq!(engine.take(), vec![Recorded::Seek(40)]);
        assert_eq!(drain_events(&mut rx), vec![TransportEvent::Seeked { position: 40 }]);
        assert_eq!(controller.state().pending_seek(), Some(40));
    }

    #[test]
    fn test_newer_seek_supersedes_pending_one() {
        let (mut controller, engine) = create_test_controller();
        controller.seek(40);
        controller.seek(70);
        assert_eq!(controller.state().pending_seek(), Some(70));

        // The engine still shows the first seek's frame
        controller.on_frame(frame(40, false));
        assert_eq!(controller.position(), 70);

        controller.on_frame(frame(70, false));
        assert_eq!(controller.state().pending_seek(), None);
        assert_eq!(engine.take(), vec![Recorded::Seek(40), Recorded::Seek(70)]);
    }

    #[test]
    fn test_seek_confirmation_emits_completed() {
        let (mut controller, _engine) = create_test_controller();
        let mut rx = controller.subscribe();

        controller.seek(30);
        controller.on_show_frame(30, 25.0, 0, 99, 100, false);

        let events = drain_events(&mut rx);
        assert!(events.contains(&TransportEvent::SeekCompleted));
        assert!(events.contains(&TransportEvent::FrameShown { position: 30, fraction: 0.3 }));
    }

    #[test]
    fn test_seek_back_to_shown_frame_completes() {
        let (mut controller, _engine) = create_test_controller();
        let mut rx = controller.subscribe();
        controller.on_frame(frame(30, false));

        controller.seek(50);
        controller.seek(30);
        drain_events(&mut rx);

        // The engine coalesces both seeks and shows frame 30 again
        controller.on_frame(frame(30, false));
        assert_eq!(controller.state().pending_seek(), None);
        assert!(drain_events(&mut rx).contains(&TransportEvent::SeekCompleted));

        controller.on_frame(frame(35, false));
        assert_eq!(controller.position(), 35);
    }

    #[test]
    fn test_in_flight_frame_does_not_undo_backward_seek() {
        let (mut controller, engine) = create_test_controller();
        let mut rx = controller.subscribe();
        controller.play(1.0);
        controller.on_frame(frame(80, true));

        controller.seek(20);
        // Rendered before the engine handled the seek
        controller.on_frame(frame(81, true));
        assert_eq!(controller.position(), 20);
        assert_eq!(controller.state().pending_seek(), Some(20));
        assert_eq!(engine.take(), vec![Recorded::Play(1.0), Recorded::Seek(20)]);
        drain_events(&mut rx);

        controller.seek(20);
        assert!(engine.take().is_empty());
        assert!(drain_events(&mut rx).is_empty());

        controller.on_frame(frame(20, true));
        assert_eq!(controller.state().pending_seek(), None);
    }

    #[test]
    fn test_selection_follows_in_and_out() {
        let (mut controller, _engine) = create_test_controller();
        let mut rx = controller.subscribe();
        controller.set_in(10);
        controller.set_out(19);
        assert_eq!(controller.state().selection_duration(), 10);
        assert_eq!(
            drain_events(&mut rx).last(),
            Some(&TransportEvent::SelectionChanged { in_point: 10, duration: 10 })
        );

        let mut moved = frame(12, false);
        moved.in_point = 5;
        controller.on_frame(moved);
        let selection = TransportEvent::SelectionChanged { in_point: 5, duration: 15 };
        assert!(drain_events(&mut rx).contains(&selection));

        controller.set_out(19);
        assert!(drain_events(&mut rx).is_empty());
    }

    #[test]
    fn test_transport_labels_reported() {
        let (mut controller, _engine) = create_test_controller();
        let mut rx = controller.subscribe();
        let status = |events: Vec<TransportEvent>| -> Vec<String> {
            events
                .into_iter()
                .filter_map(|e| match e {
                    TransportEvent::StatusMessage(message) => Some(message),
                    _ => None,
                })
                .collect()
        };

        controller.play(1.0);
        controller.pause();
        controller.stop();
        assert_eq!(status(drain_events(&mut rx)), vec!["Play", "Pause", "Stop"]);

        controller.rewind();
        assert_eq!(status(drain_events(&mut rx)), vec!["Play quickly backwards"]);
    }

    #[test]
    fn test_set_out_below_in_is_bounded() {
        let (mut controller, _engine) = create_test_controller();
        controller.set_in(50);
        controller.set_out(20);
        assert_eq!(controller.state().in_point(), 50);
        assert_eq!(controller.state().out_point(), 50);
    }

    #[test]
    fn test_set_in_pushes_out_point() {
        let (mut controller, _engine) = create_test_controller();
        let mut rx = controller.subscribe();
        controller.set_out(30);
        controller.set_in(60);

        assert_eq!(controller.state().in_point(), 60);
        assert_eq!(controller.state().out_point(), 60);
        assert_eq!(
            drain_events(&mut rx),
            vec![
                TransportEvent::OutChanged(30),
                TransportEvent::SelectionChanged { in_point: 0, duration: 31 },
                TransportEvent::InChanged(60),
                TransportEvent::OutChanged(60),
                TransportEvent::SelectionChanged { in_point: 60, duration: 1 },
            ]
        );
    }

    #[test]
    fn test_set_in_clamps_to_source() {
        let (mut controller, _engine) = create_test_controller();
        controller.set_in(-10);
        assert_eq!(controller.state().in_point(), 0);
        controller.set_in(500);
        assert_eq!(controller.state().in_point(), 99);
    }

    #[test]
    fn test_toggle_play_paused_pair_returns_to_paused() {
        let (mut controller, engine) = create_test_controller();
        assert!(controller.state().is_paused());

        controller.toggle_play_paused();
        assert!(controller.state().is_playing());
        controller.toggle_play_paused();
        assert!(controller.state().is_paused());
        assert_eq!(engine.take(), vec![Recorded::Play(1.0), Recorded::Pause]);
    }

    #[test]
    fn test_play_at_same_speed_is_noop() {
        let (mut controller, engine) = create_test_controller();
        let mut rx = controller.subscribe();

        controller.play(1.0);
        controller.play(1.0);
        assert_eq!(engine.take(), vec![Recorded::Play(1.0)]);
        assert_eq!(
            drain_events(&mut rx),
            vec![
                TransportEvent::Played { speed: 1.0 },
                TransportEvent::ShowPlaying,
                TransportEvent::StatusMessage("Play".to_string()),
            ]
        );

        controller.play(2.0);
        assert_eq!(engine.take(), vec![Recorded::Play(2.0)]);
    }

    #[test]
    fn test_stop_returns_to_in_point() {
        let (mut controller, engine) = create_test_controller();
        controller.set_in(15);
        controller.seek(50);
        controller.play(1.0);
        engine.take();

        controller.stop();
        assert_eq!(controller.position(), 15);
        assert!(controller.state().is_paused());
        assert_eq!(controller.state().pending_seek(), None);
        assert_eq!(engine.take(), vec![Recorded::Stop]);
    }

    #[test]
    fn test_rewind_and_fast_forward_speed_steps() {
        let (mut controller, engine) = create_test_controller();
        let mut rx = controller.subscribe();

        controller.rewind();
        assert_eq!(controller.state().speed(), -1.0);
        controller.rewind();
        assert_eq!(controller.state().speed(), -2.0);
        controller.fast_forward();
        assert_eq!(controller.state().speed(), 1.0);
        controller.fast_forward();
        assert_eq!(controller.state().speed(), 2.0);

        assert_eq!(
            engine.take(),
            vec![
                Recorded::Play(-1.0),
                Recorded::Play(-2.0),
                Recorded::Play(1.0),
                Recorded::Play(2.0),
            ]
        );
        let events = drain_events(&mut rx);
        assert_eq!(events.iter().filter(|e| **e == TransportEvent::Rewound).count(), 2);
        assert_eq!(events.iter().filter(|e| **e == TransportEvent::FastForwarded).count(), 2);
    }

    #[test]
    fn test_fast_forward_caps_at_max_speed() {
        let (mut controller, _engine) = create_test_controller();
        for _ in 0..20 {
            controller.fast_forward();
        }
        assert_eq!(controller.state().speed(), 32.0);
    }

    #[test]
    fn test_skip_next_to_marker_then_out_point() {
        let (mut controller, _engine) = create_test_controller();
        let mut rx = controller.subscribe();
        controller.set_markers(&[10, 20, 30]);
        controller.seek(12);
        drain_events(&mut rx);

        controller.skip_next();
        assert_eq!(controller.position(), 20);
        let events = drain_events(&mut rx);
        assert!(events.contains(&TransportEvent::NextSoughtFrom { position: 12 }));

        controller.seek(30);
        controller.skip_next();
        assert_eq!(controller.position(), 99);
        assert!(drain_events(&mut rx).contains(&TransportEvent::NextSought));
    }

    #[test]
    fn test_skip_previous_to_marker_then_in_point() {
        let (mut controller, _engine) = create_test_controller();
        let mut rx = controller.subscribe();
        controller.set_in(5);
        controller.set_markers(&[10, 20, 30]);
        controller.seek(25);
        drain_events(&mut rx);

        controller.skip_previous();
        assert_eq!(controller.position(), 20);
        assert!(drain_events(&mut rx).contains(&TransportEvent::PreviousSoughtFrom { position: 25 }));

        controller.seek(10);
        controller.skip_previous();
        assert_eq!(controller.position(), 5);
        assert!(drain_events(&mut rx).contains(&TransportEvent::PreviousSought));
    }

    #[test]
    fn test_skip_without_markers_clamps_to_range() {
        let (mut controller, _engine) = create_test_controller();
        controller.set_in(10);
        controller.set_out(80);
        controller.seek(40);

        controller.skip_next();
        assert_eq!(controller.position(), 80);
        controller.skip_next();
        assert_eq!(controller.position(), 80);
        controller.skip_previous();
        assert_eq!(controller.position(), 10);
    }

    #[test]
    fn test_skip_in_place_emits_nothing() {
        let (mut controller, engine) = create_test_controller();
        let mut rx = controller.subscribe();
        controller.seek(99);
        drain_events(&mut rx);
        engine.take();

        controller.skip_next();
        assert!(drain_events(&mut rx).is_empty());
        assert!(engine.take().is_empty());

        controller.seek(0);
        drain_events(&mut rx);
        controller.skip_previous();
        assert!(drain_events(&mut rx).is_empty());
    }

    #[test]
    fn test_invalid_markers_ignored() {
        let (mut controller, _engine) = create_test_controller();
        controller.set_markers(&[-4, 50, 500, 20]);
        assert_eq!(controller.state().markers(), &[20, 50]);
    }

    #[test]
    fn test_unseekable_source_disables_seek_and_skip() {
        let (mut controller, engine) = create_test_controller();
        controller.set_markers(&[10, 20]);
        controller.set_seekable(false);

        controller.seek(50);
        controller.skip_next();
        controller.skip_previous();
        controller.rewind();
        controller.fast_forward();

        assert_eq!(controller.position(), 0);
        assert!(engine.take().is_empty());

        controller.set_seekable(true);
        controller.seek(50);
        assert_eq!(controller.position(), 50);
    }

    #[test]
    fn test_capture_disables_transport_except_stop() {
        let (mut controller, engine) = create_test_controller();
        controller.play(1.0);
        engine.take();

        controller.handle_notification(EngineNotification::CaptureStateChanged(true));
        assert!(controller.state().is_capturing());
        assert!(controller.state().is_paused());

        controller.play(1.0);
        controller.pause();
        controller.seek(40);
        controller.skip_next();
        assert!(engine.take().is_empty());

        controller.stop();
        assert_eq!(engine.take(), vec![Recorded::Stop]);

        controller.on_capture_state_changed(false);
        controller.play(1.0);
        assert_eq!(engine.take(), vec![Recorded::Play(1.0)]);
    }

    #[test]
    fn test_repeated_identical_frames_change_nothing() {
        let (mut controller, _engine) = create_test_controller();
        let mut rx = controller.subscribe();

        controller.on_show_frame(42, 25.0, 0, 99, 100, true);
        let after_first = controller.state().clone();
        drain_events(&mut rx);

        for _ in 0..10 {
            controller.on_show_frame(42, 25.0, 0, 99, 100, true);
        }
        assert_eq!(controller.state(), &after_first);
        assert!(drain_events(&mut rx).is_empty());
    }

    #[test]
    fn test_end_of_stream_pauses_and_notifies() {
        let (mut controller, _engine) = create_test_controller();
        let mut rx = controller.subscribe();
        controller.play(1.0);

        controller.pump(vec![
            EngineNotification::Frame(frame(99, false)),
            EngineNotification::EndOfStream,
        ]);

        assert!(controller.state().is_paused());
        let events = drain_events(&mut rx);
        assert_eq!(events.last(), Some(&TransportEvent::EndOfStream));
        assert!(events.contains(&TransportEvent::ShowPaused));
    }

    #[test]
    fn test_audio_levels_forwarded() {
        let (mut controller, _engine) = create_test_controller();
        let mut rx = controller.subscribe();
        controller.handle_notification(EngineNotification::AudioLevels(vec![0.5, 0.25]));
        assert_eq!(drain_events(&mut rx), vec![TransportEvent::AudioLevels(vec![0.5, 0.25])]);
    }

    #[test]
    fn test_mute_saves_and_restores_volume() {
        let (mut controller, engine) = create_test_controller();

        controller.on_mute_toggled(true);
        assert_eq!(controller.state().saved_volume(), 0.8);
        assert_eq!(engine.current_volume(), 0.0);

        // Slider moves while muted are held back until unmute
        controller.on_volume_changed(40);
        assert_eq!(engine.current_volume(), 0.0);

        controller.on_mute_toggled(false);
        assert_eq!(engine.current_volume(), 0.4);
        assert!(!controller.state().is_muted());
    }

    #[test]
    fn test_volume_clamped() {
        let (mut controller, engine) = create_test_controller();
        controller.on_volume_changed(150);
        assert_eq!(controller.state().volume(), 1.0);
        controller.on_volume_changed(-3);
        assert_eq!(controller.state().volume(), 0.0);
        assert_eq!(engine.take(), vec![Recorded::SetVolume(1.0), Recorded::SetVolume(0.0)]);
    }

    #[test]
    fn test_producer_opened_resets_transport() {
        let (mut controller, engine) = create_test_controller();
        let mut rx = controller.subscribe();
        controller.seek(70);
        controller.set_markers(&[10]);

        let mut info = ProducerInfo::new(500, 30.0);
        info.in_point = Some(100);
        info.video_size = VideoSize::new(1280, 720);
        controller.on_producer_opened(info, true);

        assert_eq!(controller.state().duration(), 500);
        assert_eq!(controller.position(), 100);
        assert!(controller.state().markers().is_empty());
        assert!(controller.state().is_playing());
        assert_eq!(controller.video_size(), VideoSize::new(1280, 720));
        assert!(drain_events(&mut rx).contains(&TransportEvent::ProfileChanged));
        assert_eq!(engine.take(), vec![Recorded::Seek(70), Recorded::Play(1.0)]);
    }

    #[test]
    fn test_preview_on_open_pauses_after_first_frame() {
        let config = PlayerConfig {
            preview_on_open: true,
            ..PlayerConfig::default()
        };
        let mut controller = TransportController::new(Arc::new(config));
        let engine = RecordingEngine::new();
        controller.connect_transport(&engine);

        controller.on_producer_opened(ProducerInfo::new(100, 25.0), false);
        assert!(controller.state().is_playing());
        assert!(controller.state().is_pausing_after_play());
        assert_eq!(engine.take(), vec![Recorded::Play(1.0)]);

        controller.on_frame(frame(0, true));
        assert!(controller.state().is_paused());
        assert!(!controller.state().is_pausing_after_play());
        assert_eq!(engine.take(), vec![Recorded::Pause]);
    }

    #[test]
    fn test_post_producer_opened_shows_current_frame() {
        let (mut controller, engine) = create_test_controller();
        controller.post_producer_opened();
        assert_eq!(engine.take(), vec![Recorded::Seek(0)]);
        assert_eq!(controller.state().pending_seek(), Some(0));

        controller.on_frame(frame(0, false));
        assert_eq!(controller.state().pending_seek(), None);
    }

    #[test]
    fn test_reset_profile_refits_and_notifies() {
        let (mut controller, _engine) = create_test_controller();
        let mut rx = controller.subscribe();
        controller.resize(960, 540);
        assert_eq!(controller.zoom().factor(), 0.5);

        controller.reset_profile(VideoSize::new(1920, 1080));
        assert!(drain_events(&mut rx).contains(&TransportEvent::ProfileChanged));

        controller.reset_profile(VideoSize::new(1280, 720));
        assert_eq!(controller.video_size(), VideoSize::new(1280, 720));
        assert_eq!(controller.zoom().factor(), 0.75);
    }

    #[test]
    fn test_producer_modified_clamps_range() {
        let (mut controller, _engine) = create_test_controller();
        controller.set_in(20);
        controller.set_out(90);
        controller.seek(80);

        controller.on_producer_modified(50);
        assert_eq!(controller.state().out_point(), 49);
        assert_eq!(controller.position(), 49);
    }

    #[test]
    fn test_toggle_zoom_round_trip() {
        let (mut controller, _engine) = create_test_controller();
        controller.resize(960, 540);
        let original = controller.zoom().factor();

        controller.toggle_zoom(true);
        assert_ne!(controller.zoom().factor(), original);
        controller.toggle_zoom(false);
        assert_eq!(controller.zoom().factor(), original);
    }

    #[test]
    fn test_tab_gate_through_controller() {
        let (mut controller, _engine) = create_test_controller();
        controller.enable_tab(TabMode::Program, false);
        assert!(!controller.on_tab_bar_clicked(1));
        assert_eq!(controller.tabs().active(), TabMode::Source);
        controller.enable_tab(TabMode::Program, true);
        assert!(controller.switch_to_tab(TabMode::Program));
    }

    #[test]
    fn test_move_video_to_screen_emits_request() {
        let (mut controller, _engine) = create_test_controller();
        let mut rx = controller.subscribe();
        controller.move_video_to_screen(Some(1));
        assert_eq!(controller.monitor_screen(), Some(1));
        assert_eq!(drain_events(&mut rx), vec![TransportEvent::MoveToScreenRequested(Some(1))]);
    }

    #[test]
    fn test_dropped_engine_is_tolerated() {
        let mut controller = TransportController::new(Arc::new(PlayerConfig::default()));
        {
            let engine = RecordingEngine::new();
            controller.connect_transport(&engine);
        }
        controller.on_producer_opened(ProducerInfo::new(100, 25.0), false);
        controller.seek(40);
        controller.play(1.0);
        assert_eq!(controller.position(), 40);
        assert!(controller.state().is_playing());
    }
}
