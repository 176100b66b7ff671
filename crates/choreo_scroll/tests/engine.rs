//! End-to-end engine tests over the deterministic harness host.
//!
//! Element fixtures use a 800px viewport unless stated otherwise; an
//! element at document top 2000 with height 100 therefore activates in the
//! scroll interval [1200, 2100).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use choreo_core::Offset;
use choreo_harness::HarnessHost;
use choreo_scroll::{
    global_scroller, Anchor, ObserveOptions, Scroller, Smoothing, TriggerSpec,
};

fn fixture() -> (Arc<HarnessHost>, Scroller) {
    let host = HarnessHost::new(800.0);
    let scroller = Scroller::new(host.clone());
    (host, scroller)
}

fn counter() -> (Arc<AtomicUsize>, impl Fn() -> usize) {
    let count = Arc::new(AtomicUsize::new(0));
    let read = {
        let count = count.clone();
        move || count.load(Ordering::SeqCst)
    };
    (count, read)
}

#[test]
fn test_first_viewport_element_fires_at_position_zero() {
    let (host, scroller) = fixture();
    host.insert_block(".hero", 500.0, 100.0);

    let (enters, entered) = counter();
    let enters_in = enters.clone();
    scroller
        .observe(".hero")
        .unwrap()
        .add(TriggerSpec::new().on_enter(move |_, pos, _| {
            assert_eq!(pos, 0.0);
            enters_in.fetch_add(1, Ordering::SeqCst);
        }));

    // Attaching the trigger restarts the chain; the element's window is
    // [0, 600) so the very first tick at position 0 enters.
    assert_eq!(host.pending_frames(), 1);
    host.pump();
    assert_eq!(entered(), 1);
}

#[test]
fn test_deep_element_waits_for_scroll() {
    let (host, scroller) = fixture();
    host.insert_block(".late", 2000.0, 100.0);

    let (enters, entered) = counter();
    let enters_in = enters.clone();
    scroller
        .observe(".late")
        .unwrap()
        .add(TriggerSpec::new().on_enter(move |_, pos, _| {
            assert_eq!(pos, 1500.0);
            enters_in.fetch_add(1, Ordering::SeqCst);
        }));

    host.pump();
    assert_eq!(entered(), 0);

    host.scroll_to(1500.0);
    host.pump();
    assert_eq!(entered(), 1);
}

#[test]
fn test_fire_once_never_fires_again() {
    let (host, scroller) = fixture();
    host.insert_block(".once", 2000.0, 100.0);

    let (enters, entered) = counter();
    let enters_in = enters.clone();
    let watcher = scroller.observe(".once").unwrap();
    watcher.add(TriggerSpec::new().on_enter(move |_, _, _| {
        enters_in.fetch_add(1, Ordering::SeqCst);
    }));

    host.scroll_to(1500.0);
    host.pump();
    assert_eq!(entered(), 1);

    // Leave and re-enter the window; the trigger retired itself
    host.scroll_to(0.0);
    host.pump();
    host.scroll_to(1500.0);
    host.pump();
    assert_eq!(entered(), 1);

    // The element and its now-empty group were pruned the same frame
    assert!(!watcher.is_alive());
    assert_eq!(scroller.group_count(), 0);
}

#[test]
fn test_enter_exit_sequence_repeats_per_pass() {
    let (host, scroller) = fixture();
    host.insert_block(".panel", 2000.0, 100.0);

    let log = Arc::new(Mutex::new(Vec::new()));
    let enter_log = log.clone();
    let exit_log = log.clone();
    scroller.observe(".panel").unwrap().add(
        TriggerSpec::new()
            .on_enter(move |_, _, _| enter_log.lock().unwrap().push("enter"))
            .on_exit(move |_, _, _| exit_log.lock().unwrap().push("exit")),
    );

    for _ in 0..2 {
        host.scroll_to(1500.0);
        host.pump();
        host.scroll_to(0.0);
        host.pump();
    }

    assert_eq!(*log.lock().unwrap(), vec!["enter", "exit", "enter", "exit"]);
}

#[test]
fn test_exit_state_resets_without_exit_callback() {
    let (host, scroller) = fixture();
    host.insert_block(".panel", 2000.0, 100.0);

    let (enters, entered) = counter();
    let enters_in = enters.clone();
    scroller.observe(".panel").unwrap().add(
        TriggerSpec::new()
            .on_enter(move |_, _, _| {
                enters_in.fetch_add(1, Ordering::SeqCst);
            })
            // A continuous callback keeps the trigger from retiring
            .on_frame(|_, _, _| {}),
    );

    host.scroll_to(1500.0);
    host.pump();
    host.scroll_to(0.0);
    host.pump();
    host.scroll_to(1500.0);
    host.pump();

    assert_eq!(entered(), 2);
}

#[test]
fn test_continuous_callback_keeps_chain_alive() {
    let (host, scroller) = fixture();
    host.insert_block(".tall", 0.0, 10000.0);

    let positions = Arc::new(Mutex::new(Vec::new()));
    let positions_in = positions.clone();
    scroller
        .observe(".tall")
        .unwrap()
        .add(TriggerSpec::new().on_frame(move |_, pos, _| {
            positions_in.lock().unwrap().push(pos);
        }));

    // In-window: every pump fires the continuous callback and re-arms
    host.pump();
    host.pump();
    host.pump();
    assert_eq!(positions.lock().unwrap().len(), 3);
    assert_eq!(host.pending_frames(), 1);

    // Leaving the window lets the chain terminate
    host.scroll_to(20000.0);
    host.pump();
    assert_eq!(host.pending_frames(), 0);
}

#[test]
fn test_callbacks_receive_position_and_delta() {
    let (host, scroller) = fixture();
    host.insert_block(".tall", 0.0, 10000.0);

    let samples = Arc::new(Mutex::new(Vec::new()));
    let samples_in = samples.clone();
    scroller
        .observe(".tall")
        .unwrap()
        .add(TriggerSpec::new().on_frame(move |_, pos, delta| {
            samples_in.lock().unwrap().push((pos, delta));
        }));

    host.scroll_to(100.0);
    host.pump();
    host.scroll_to(250.0);
    host.pump();

    let samples = samples.lock().unwrap();
    assert_eq!(samples[0], (100.0, 100.0));
    assert_eq!(samples[1], (250.0, 150.0));
}

#[test]
fn test_recalculate_preserves_entered_state() {
    let (host, scroller) = fixture();
    host.insert_block(".panel", 2000.0, 100.0);

    let (enters, entered) = counter();
    let (exits, exited) = counter();
    let enters_in = enters.clone();
    let exits_in = exits.clone();
    scroller.observe(".panel").unwrap().add(
        TriggerSpec::new()
            .on_enter(move |_, _, _| {
                enters_in.fetch_add(1, Ordering::SeqCst);
            })
            .on_exit(move |_, _, _| {
                exits_in.fetch_add(1, Ordering::SeqCst);
            }),
    );

    host.scroll_to(1500.0);
    host.pump();
    assert_eq!(entered(), 1);

    // No layout change: windows refresh, entered state must survive
    scroller.recalculate();
    host.scroll_to(1501.0);
    host.pump();
    assert_eq!(entered(), 1, "recalculate must not re-arm the enter");

    host.scroll_to(0.0);
    host.pump();
    assert_eq!(exited(), 1, "preserved entered state still exits");
}

#[test]
fn test_resize_refreshes_windows() {
    let (host, scroller) = fixture();
    host.insert_block(".late", 2000.0, 100.0);

    let (enters, entered) = counter();
    let enters_in = enters.clone();
    scroller
        .observe(".late")
        .unwrap()
        .add(TriggerSpec::new().on_enter(move |_, _, _| {
            enters_in.fetch_add(1, Ordering::SeqCst);
        }));

    // With a 800px viewport the window starts at 1200, so 1100 is idle
    host.scroll_to(1100.0);
    host.pump();
    assert_eq!(entered(), 0);

    // A taller viewport moves the threshold to 2000 - 1000 = 1000
    host.resize_viewport(1000.0);
    host.scroll_to(1100.0);
    host.pump();
    assert_eq!(entered(), 1);
}

#[test]
fn test_both_fire_once_triggers_prune_element_same_frame() {
    let (host, scroller) = fixture();
    host.insert_block(".once", 2000.0, 100.0);

    let (enters, entered) = counter();
    let a = enters.clone();
    let b = enters.clone();
    let watcher = scroller.observe(".once").unwrap();
    watcher
        .add(TriggerSpec::new().on_enter(move |_, _, _| {
            a.fetch_add(1, Ordering::SeqCst);
        }))
        .add(TriggerSpec::new().on_enter(move |_, _, _| {
            b.fetch_add(1, Ordering::SeqCst);
        }));

    host.scroll_to(1500.0);
    host.pump();

    assert_eq!(entered(), 2);
    assert_eq!(scroller.group_count(), 0);
    assert!(!watcher.is_alive());
}

#[test]
fn test_triggers_fire_in_attachment_order() {
    let (host, scroller) = fixture();
    host.insert_block(".panel", 2000.0, 100.0);

    let log = Arc::new(Mutex::new(Vec::new()));
    let first = log.clone();
    let second = log.clone();
    scroller
        .observe(".panel")
        .unwrap()
        .add(TriggerSpec::new().on_enter(move |_, _, _| first.lock().unwrap().push("first")))
        .add(TriggerSpec::new().on_enter(move |_, _, _| second.lock().unwrap().push("second")));

    host.scroll_to(1500.0);
    host.pump();

    assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
}

#[test]
fn test_groups_and_elements_evaluate_in_registration_order() {
    let (host, scroller) = fixture();
    let early = host.insert_block(".cards", 2000.0, 100.0);
    let late = host.insert_block(".cards", 2050.0, 100.0);
    host.insert_block(".aside", 2000.0, 100.0);

    let log = Arc::new(Mutex::new(Vec::new()));

    let cards_log = log.clone();
    scroller
        .observe(".cards")
        .unwrap()
        .add(TriggerSpec::new().on_enter(move |el, _, _| {
            cards_log.lock().unwrap().push(("cards", el.handle));
        }));

    let aside_log = log.clone();
    let aside = scroller
        .observe(".aside")
        .unwrap();
    aside.add(TriggerSpec::new().on_enter(move |el, _, _| {
        aside_log.lock().unwrap().push(("aside", el.handle));
    }));

    host.scroll_to(1700.0);
    host.pump();

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 3);
    assert_eq!(log[0], ("cards", early));
    assert_eq!(log[1], ("cards", late));
    assert_eq!(log[2].0, "aside");
}

#[test]
fn test_anchor_middle_shifts_activation() {
    let (host, scroller) = fixture();
    host.insert_block(".panel", 2000.0, 100.0);

    let (enters, entered) = counter();
    let enters_in = enters.clone();
    scroller.observe(".panel").unwrap().add(
        TriggerSpec::new()
            .anchor(Anchor::Middle)
            .on_enter(move |_, _, _| {
                enters_in.fetch_add(1, Ordering::SeqCst);
            }),
    );

    // Top anchor would activate at 1200; middle waits for 1250
    host.scroll_to(1225.0);
    host.pump();
    assert_eq!(entered(), 0);

    host.scroll_to(1250.0);
    host.pump();
    assert_eq!(entered(), 1);
}

#[test]
fn test_scroll_events_restart_single_chain() {
    let (host, scroller) = fixture();
    host.insert_block(".panel", 2000.0, 100.0);
    scroller
        .observe(".panel")
        .unwrap()
        .add(TriggerSpec::new().on_enter(|_, _, _| {}));

    // Burst of scroll events: the chain restarts instead of stacking
    host.scroll_to(100.0);
    host.scroll_to(200.0);
    host.scroll_to(300.0);
    assert_eq!(host.pending_frames(), 1);

    scroller.stop();
    assert_eq!(host.pending_frames(), 0);
    // stop is idempotent
    scroller.stop();
    assert_eq!(host.pending_frames(), 0);
}

#[test]
fn test_reset_clears_registry() {
    let (host, scroller) = fixture();
    host.insert_block(".panel", 2000.0, 100.0);

    let (enters, entered) = counter();
    let enters_in = enters.clone();
    scroller
        .observe(".panel")
        .unwrap()
        .add(TriggerSpec::new().on_enter(move |_, _, _| {
            enters_in.fetch_add(1, Ordering::SeqCst);
        }));

    scroller.reset();
    assert_eq!(scroller.group_count(), 0);

    // The pending frame runs down over an empty registry
    host.scroll_to(1500.0);
    host.pump();
    assert_eq!(entered(), 0);
    assert_eq!(host.pending_frames(), 0);
}

#[test]
fn test_unresolvable_target_is_a_hard_error() {
    let (_host, scroller) = fixture();
    assert!(scroller.observe(".ghost").is_err());
    assert_eq!(scroller.group_count(), 0);
}

#[test]
fn test_on_init_runs_before_first_geometry_pass() {
    let (host, scroller) = fixture();
    host.insert_block(".panel", 2000.0, 100.0);

    let log = Arc::new(Mutex::new(Vec::new()));
    let init_log = log.clone();
    let geometry_log = log.clone();
    let watcher = scroller
        .observe_with(
            ".panel",
            ObserveOptions::new()
                .on_init(move |el| {
                    // Boxes are not computed yet at init time
                    assert_eq!(el.top, 0.0);
                    init_log.lock().unwrap().push("init");
                })
                .on_geometry(move |el| {
                    assert_eq!(el.top, 2000.0);
                    geometry_log.lock().unwrap().push("geometry");
                }),
        )
        .unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["init", "geometry"]);

    // Attaching a trigger and recalculating re-run geometry, not init
    watcher.add(TriggerSpec::new().on_enter(|_, _, _| {}));
    scroller.recalculate();
    assert_eq!(
        *log.lock().unwrap(),
        vec!["init", "geometry", "geometry", "geometry"]
    );
}

#[test]
fn test_detached_element_never_fires_and_is_kept() {
    let (host, scroller) = fixture();
    let el = host.insert_block(".panel", 2000.0, 100.0);
    host.detach(el);

    let (enters, entered) = counter();
    let enters_in = enters.clone();
    scroller
        .observe(".panel")
        .unwrap()
        .add(TriggerSpec::new().on_enter(move |_, _, _| {
            enters_in.fetch_add(1, Ordering::SeqCst);
        }));

    host.scroll_to(1500.0);
    host.pump();

    // Suppressed, not an error; the trigger stays armed
    assert_eq!(entered(), 0);
    assert_eq!(scroller.group_count(), 1);

    // Once the host reports geometry again, a recalculation revives it
    host.place(el, Offset::new(2000.0, 0.0));
    scroller.recalculate();
    host.scroll_to(1501.0);
    host.pump();
    assert_eq!(entered(), 1);
}

#[test]
fn test_smoothing_converges_and_chain_terminates() {
    let host = HarnessHost::new(800.0);
    let scroller = Scroller::with_smoothing(host.clone(), Smoothing::new(0.2));
    host.insert_block(".late", 2000.0, 100.0);

    let (enters, entered) = counter();
    let enters_in = enters.clone();
    scroller
        .observe(".late")
        .unwrap()
        .add(TriggerSpec::new().on_enter(move |_, _, _| {
            enters_in.fetch_add(1, Ordering::SeqCst);
        }));

    host.scroll_to(2000.0);
    let ran = host.run_frames(200);

    // The displayed position crosses the window during the glide and the
    // chain stops once the position snaps onto the target
    assert_eq!(entered(), 1);
    assert!(ran > 5, "smoothing should take several frames, ran {ran}");
    assert!(ran < 200, "smoothing must converge, ran {ran}");
    assert_eq!(host.pending_frames(), 0);
}

#[test]
fn test_registration_from_inside_callback_is_safe() {
    let (host, scroller) = fixture();
    host.insert_block(".first", 2000.0, 100.0);
    host.insert_block(".second", 2000.0, 100.0);

    let (enters, entered) = counter();
    let enters_in = enters.clone();
    let handle = scroller.handle();
    scroller
        .observe(".first")
        .unwrap()
        .add(TriggerSpec::new().on_enter(move |_, _, _| {
            let scroller = handle.upgrade().expect("engine alive");
            let inner = enters_in.clone();
            scroller
                .observe(".second")
                .unwrap()
                .add(TriggerSpec::new().on_enter(move |_, _, _| {
                    inner.fetch_add(1, Ordering::SeqCst);
                }));
        }));

    host.scroll_to(1500.0);
    // First frame runs the outer enter, which registers the second watcher
    host.pump();
    assert_eq!(entered(), 0);
    // The registration armed a fresh frame; the second watcher enters now
    host.pump();
    assert_eq!(entered(), 1);
}

#[test]
fn test_multi_selector_target_concatenates_in_order() {
    let (host, scroller) = fixture();
    let a = host.insert_block(".a", 2000.0, 100.0);
    let b = host.insert_block(".b", 2000.0, 100.0);

    let log = Arc::new(Mutex::new(Vec::new()));
    let log_in = log.clone();
    scroller
        .observe(vec![".a".to_owned(), ".b".to_owned()])
        .unwrap()
        .add(TriggerSpec::new().on_enter(move |el, _, _| {
            log_in.lock().unwrap().push(el.handle);
        }));

    host.scroll_to(1500.0);
    host.pump();

    assert_eq!(*log.lock().unwrap(), vec![a, b]);
}

#[test]
fn test_global_factory_returns_one_instance() {
    let host = HarnessHost::new(800.0);
    host.insert_block(".panel", 2000.0, 100.0);

    let first = global_scroller(host.clone());
    let other_host = HarnessHost::new(600.0);
    let second = global_scroller(other_host);

    // The second call ignores its host; both handles hit the same registry
    first.observe(".panel").unwrap().add(TriggerSpec::new().on_enter(|_, _, _| {}));
    assert_eq!(second.group_count(), 1);
    second.reset();
    assert_eq!(first.group_count(), 0);
}
