use scrollfx_core::{
    AnimationKind, AnimationOptions, AnimationPhase, Config, ElementInit, Engine, Finish, FxError,
    FxEvent, HostEvent, Inputs, RenderOp, SplitMix64, TargetId, TriggerState, Viewport,
};

fn scroll(scroll_y: f64, height: f64) -> Inputs {
    Inputs::event(HostEvent::Scroll {
        viewport: Viewport::new(scroll_y, 1280.0, height),
    })
}

fn element(top: f64, height: f64, text: &str) -> ElementInit {
    ElementInit {
        top,
        height,
        text: text.to_string(),
    }
}

/// Collected outputs across several updates.
#[derive(Default)]
struct Log {
    ops: Vec<RenderOp>,
    events: Vec<FxEvent>,
}

impl Log {
    fn record(&mut self, engine: &mut Engine, now: f64, inputs: Inputs) {
        let out = engine.update(now, inputs);
        self.ops.extend(out.ops.iter().cloned());
        self.events.extend(out.events.iter().cloned());
    }

    /// Follow the engine's deadlines until no timer is left.
    fn drain(&mut self, engine: &mut Engine, mut now: f64) -> f64 {
        for _ in 0..10_000 {
            let Some(deadline) = engine.next_deadline() else {
                return now;
            };
            now = deadline.max(now);
            self.record(engine, now, Inputs::default());
        }
        panic!("engine never went idle");
    }

    fn texts(&self, target: TargetId) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                RenderOp::SetText { target: t, text } if *t == target => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn count_events(&self, pred: impl Fn(&FxEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

#[test]
fn count_renders_monotonic_values_and_ends_exactly() {
    let mut eng = Engine::new(Config::default());
    let mut log = Log::default();
    let id = eng
        .bind_animation(AnimationOptions::default(), &element(100.0, 100.0, "1250"), 0.0)
        .unwrap();

    log.record(&mut eng, 0.0, scroll(0.0, 800.0));
    assert_eq!(
        eng.animation_status(id).map(|s| s.trigger),
        Some(TriggerState::Fired)
    );
    log.drain(&mut eng, 0.0);

    let values: Vec<i64> = log
        .texts(id)
        .iter()
        .map(|t| t.parse().unwrap())
        .collect();
    assert!(values.len() > 3, "too few frames: {values:?}");
    assert_eq!(values[0], 0);
    assert!(values.windows(2).all(|w| w[0] <= w[1]), "{values:?}");
    assert_eq!(*values.last().unwrap(), 1250);
    assert_eq!(
        log.count_events(|e| matches!(e, FxEvent::AnimationCompleted { .. })),
        1
    );
    assert_eq!(eng.animation_status(id).unwrap().phase, AnimationPhase::Complete);
    assert_eq!(eng.next_deadline(), None);
}

#[test]
fn count_down_with_grouping() {
    let mut eng = Engine::new(Config::default());
    let mut log = Log::default();
    let opts = AnimationOptions {
        start: 20_000,
        no_comma: false,
        easing: scrollfx_core::Easing::Linear,
        ..Default::default()
    };
    let id = eng
        .bind_animation(opts, &element(100.0, 100.0, "12,500 users"), 0.0)
        .unwrap();
    log.record(&mut eng, 0.0, scroll(0.0, 800.0));
    log.drain(&mut eng, 0.0);

    let texts = log.texts(id);
    assert_eq!(texts.first().map(String::as_str), Some("20,000"));
    assert_eq!(texts.last().map(String::as_str), Some("12,500"));
    let values: Vec<i64> = texts.iter().map(|t| t.replace(',', "").parse().unwrap()).collect();
    assert!(values.windows(2).all(|w| w[0] >= w[1]), "{values:?}");
}

#[test]
fn unparsable_count_finish_is_rejected_at_bind() {
    let mut eng = Engine::new(Config::default());
    let err = eng
        .bind_animation(AnimationOptions::default(), &element(0.0, 10.0, "n/a"), 0.0)
        .unwrap_err();
    assert!(matches!(err, FxError::InvalidFinish { .. }));
    assert!(eng.dispatcher().is_empty());
}

#[test]
fn scramble_reveals_prefix_and_removes_overlay_once() {
    let mut eng = Engine::new(Config::default()).with_random(SplitMix64::new(42));
    let mut log = Log::default();
    let opts = AnimationOptions {
        animation: AnimationKind::Scramble,
        duration: 150.0,
        steps_per_glyph: 3,
        code_glyphs: "#$%".into(),
        ..Default::default()
    };
    let id = eng
        .bind_animation(opts, &element(100.0, 100.0, "HELLO"), 0.0)
        .unwrap();
    log.record(&mut eng, 0.0, scroll(0.0, 800.0));
    log.drain(&mut eng, 0.0);

    let mut revealed = 0usize;
    let mut overlay_removed = 0;
    let mut created = 0;
    for op in &log.ops {
        match op {
            RenderOp::SetText { target, text } if *target == id => {
                let len = text.chars().count();
                assert!(len >= revealed, "reveal went backwards");
                assert!("HELLO".starts_with(text.as_str()));
                revealed = len;
            }
            RenderOp::CreateOverlay { .. } => created += 1,
            RenderOp::SetOverlayText { text, .. } => {
                assert_eq!(overlay_removed, 0, "overlay updated after removal");
                assert_eq!(text.chars().count(), 5 - revealed);
                assert!(text.chars().all(|c| "#$%".contains(c)));
            }
            RenderOp::RemoveOverlay { .. } => {
                assert_eq!(revealed, 5);
                overlay_removed += 1;
            }
            _ => {}
        }
    }
    assert_eq!(created, 1);
    assert_eq!(overlay_removed, 1);
    assert_eq!(log.texts(id).last().map(String::as_str), Some("HELLO"));
    assert_eq!(
        log.count_events(|e| matches!(e, FxEvent::AnimationCompleted { .. })),
        1
    );
}

#[test]
fn scramble_with_literal_finish() {
    let mut eng = Engine::new(Config::default());
    let mut log = Log::default();
    let opts = AnimationOptions {
        animation: AnimationKind::Scramble,
        finish: Finish::Text("42 ms".into()),
        duration: 40.0,
        steps_per_glyph: 1,
        ..Default::default()
    };
    let id = eng
        .bind_animation(opts, &element(100.0, 100.0, "ignored"), 0.0)
        .unwrap();
    log.record(&mut eng, 0.0, scroll(0.0, 800.0));
    log.drain(&mut eng, 0.0);
    assert_eq!(log.texts(id).last().map(String::as_str), Some("42 ms"));
}

#[test]
fn fired_trigger_is_not_restarted_by_later_scrolls() {
    let mut eng = Engine::new(Config::default());
    let mut log = Log::default();
    let id = eng
        .bind_animation(AnimationOptions::default(), &element(100.0, 100.0, "10"), 0.0)
        .unwrap();
    log.record(&mut eng, 0.0, scroll(0.0, 800.0));
    let now = log.drain(&mut eng, 0.0);
    assert!(eng.dispatcher().is_empty());

    let mut later = Log::default();
    later.record(&mut eng, now + 10.0, scroll(2000.0, 800.0));
    later.record(&mut eng, now + 20.0, scroll(0.0, 800.0));
    later.record(&mut eng, now + 30.0, scroll(50.0, 800.0));
    assert!(later.ops.is_empty());
    assert!(later.events.is_empty());
    assert_eq!(eng.animation_status(id).unwrap().phase, AnimationPhase::Complete);
}

#[test]
fn element_scrolled_past_does_not_fire() {
    let mut eng = Engine::new(Config::default());
    let mut log = Log::default();
    let id = eng
        .bind_animation(AnimationOptions::default(), &element(500.0, 200.0, "10"), 0.0)
        .unwrap();
    log.record(&mut eng, 0.0, scroll(800.0, 400.0));
    assert_eq!(
        eng.animation_status(id).unwrap().trigger,
        TriggerState::Pending
    );
    // Scrolling back up until the center crosses the line fires it.
    log.record(&mut eng, 10.0, scroll(400.0, 400.0));
    assert_eq!(eng.animation_status(id).unwrap().trigger, TriggerState::Fired);
}

#[test]
fn delay_keeps_one_pending_deadline_and_fires_once() {
    let mut eng = Engine::new(Config::default());
    let mut log = Log::default();
    let opts = AnimationOptions {
        delay: 300.0,
        ..Default::default()
    };
    let id = eng
        .bind_animation(opts, &element(100.0, 100.0, "10"), 0.0)
        .unwrap();

    log.record(&mut eng, 0.0, scroll(0.0, 800.0));
    assert_eq!(eng.next_deadline(), Some(300.0));
    log.record(&mut eng, 100.0, scroll(10.0, 800.0));
    log.record(&mut eng, 200.0, scroll(20.0, 800.0));
    assert_eq!(eng.next_deadline(), Some(300.0));
    assert_eq!(
        log.count_events(|e| matches!(e, FxEvent::TriggerScheduled { .. })),
        1
    );

    log.record(&mut eng, 299.0, Inputs::default());
    assert_eq!(eng.animation_status(id).unwrap().trigger, TriggerState::Pending);
    log.record(&mut eng, 300.0, Inputs::default());
    log.drain(&mut eng, 300.0);
    assert_eq!(
        log.count_events(|e| matches!(e, FxEvent::AnimationStarted { .. })),
        1
    );
}

#[test]
fn cancel_stops_scramble_at_tick_boundary() {
    let mut eng = Engine::new(Config::default());
    let mut log = Log::default();
    let opts = AnimationOptions {
        animation: AnimationKind::Scramble,
        duration: 1000.0,
        ..Default::default()
    };
    let id = eng
        .bind_animation(opts, &element(100.0, 100.0, "scrollfx"), 0.0)
        .unwrap();
    log.record(&mut eng, 0.0, scroll(0.0, 800.0));
    log.record(&mut eng, 50.0, Inputs::default());

    log.record(
        &mut eng,
        60.0,
        Inputs::event(HostEvent::Cancel { target: id }),
    );
    assert!(log
        .ops
        .contains(&RenderOp::RemoveOverlay { target: id }));
    assert_eq!(
        log.count_events(|e| matches!(e, FxEvent::AnimationCancelled { .. })),
        1
    );
    assert_eq!(eng.animation_status(id).unwrap().phase, AnimationPhase::Cancelled);
    assert_eq!(eng.next_deadline(), None);

    let out = eng.update(2000.0, Inputs::default());
    assert!(out.is_empty());
    assert_eq!(eng.cancel(id, 2001.0), Ok(false));
}

#[test]
fn cancel_before_fire_prevents_start() {
    let mut eng = Engine::new(Config::default());
    let id = eng
        .bind_animation(AnimationOptions::default(), &element(100.0, 100.0, "10"), 0.0)
        .unwrap();
    assert_eq!(eng.cancel(id, 0.0), Ok(true));
    let out = eng.update(10.0, scroll(0.0, 800.0));
    assert!(!out
        .events
        .iter()
        .any(|e| matches!(e, FxEvent::AnimationStarted { .. })));
    assert_eq!(eng.animation_status(id).unwrap().phase, AnimationPhase::Cancelled);
}

#[test]
fn retrigger_rearms_after_leaving_viewport() {
    let mut eng = Engine::new(Config::default());
    let mut log = Log::default();
    let opts = AnimationOptions {
        retrigger: true,
        ..Default::default()
    };
    let id = eng
        .bind_animation(opts, &element(100.0, 100.0, "10"), 0.0)
        .unwrap();
    log.record(&mut eng, 0.0, scroll(0.0, 800.0));
    let now = log.drain(&mut eng, 0.0);

    // Still complete while visible.
    log.record(&mut eng, now + 1.0, scroll(50.0, 800.0));
    assert_eq!(
        log.count_events(|e| matches!(e, FxEvent::TriggerRearmed { .. })),
        0
    );

    log.record(&mut eng, now + 2.0, scroll(3000.0, 800.0));
    assert_eq!(
        log.count_events(|e| matches!(e, FxEvent::TriggerRearmed { .. })),
        1
    );
    assert_eq!(log.texts(id).last().map(String::as_str), Some("0"));

    log.record(&mut eng, now + 3.0, scroll(0.0, 800.0));
    log.drain(&mut eng, now + 3.0);
    assert_eq!(
        log.count_events(|e| matches!(e, FxEvent::AnimationStarted { .. })),
        2
    );
    assert_eq!(log.texts(id).last().map(String::as_str), Some("10"));
}

#[test]
fn cancelled_retrigger_target_releases_its_listener() {
    let mut eng = Engine::new(Config::default());
    let opts = AnimationOptions {
        retrigger: true,
        duration: 1000.0,
        ..Default::default()
    };
    let id = eng
        .bind_animation(opts, &element(100.0, 100.0, "500"), 0.0)
        .unwrap();
    eng.update(0.0, scroll(0.0, 800.0));
    assert_eq!(eng.dispatcher().len(), 1);

    assert_eq!(eng.cancel(id, 10.0), Ok(true));
    assert!(eng.dispatcher().is_empty());
    for (i, y) in [3000.0, 0.0, 50.0].into_iter().enumerate() {
        let out = eng.update(20.0 + i as f64, scroll(y, 800.0));
        assert!(!out
            .events
            .iter()
            .any(|e| matches!(e, FxEvent::TriggerRearmed { .. } | FxEvent::AnimationStarted { .. })));
    }
    let status = eng.animation_status(id).unwrap();
    assert_eq!(status.trigger, TriggerState::Fired);
    assert_eq!(status.phase, AnimationPhase::Cancelled);
}

#[test]
fn unbind_removes_listener_and_overlay() {
    let mut eng = Engine::new(Config::default());
    let opts = AnimationOptions {
        animation: AnimationKind::Scramble,
        duration: 1000.0,
        ..Default::default()
    };
    let running = eng
        .bind_animation(opts, &element(100.0, 100.0, "abc"), 0.0)
        .unwrap();
    let idle = eng
        .bind_animation(AnimationOptions::default(), &element(5000.0, 10.0, "1"), 0.0)
        .unwrap();
    eng.update(0.0, scroll(0.0, 800.0));
    assert_eq!(eng.dispatcher().len(), 1);

    eng.unbind_animation(running).unwrap();
    eng.unbind_animation(idle).unwrap();
    assert!(eng.dispatcher().is_empty());
    let out = eng.update(1.0, Inputs::default());
    assert_eq!(out.ops, vec![RenderOp::RemoveOverlay { target: running }]);
    assert_eq!(eng.animation_status(running), None);
    assert_eq!(
        eng.unbind_animation(running),
        Err(FxError::TargetNotFound(running))
    );
}

#[test]
fn bind_from_dataset_attributes() {
    let mut eng = Engine::new(Config::default());
    let dataset = [
        ("animate", r#"{"animation":"count"}"#),
        ("animateDuration", "200"),
        ("animateStart", "5"),
    ];
    let id = eng
        .bind_animation_from_attributes(dataset, None, &element(100.0, 100.0, "9"), 0.0)
        .unwrap();
    let out = eng.update(0.0, Inputs::default());
    assert_eq!(
        out.ops,
        vec![RenderOp::SetText {
            target: id,
            text: "5".into()
        }]
    );
}
