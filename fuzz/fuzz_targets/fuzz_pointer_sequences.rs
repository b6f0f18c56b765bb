#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mojo_core::element::ElementId;
use mojo_core::geometry::{Point, Rect, Velocity};
use mojo_core::input::PointerEvent;
use mojo_gesture::{
    DragOptions, DropClient, GestureEvent, GestureKind, GestureRecognizer, Stage, WindowId,
};
use web_time::{Duration, Instant};

#[derive(Debug, Arbitrary)]
enum Input {
    Down { x: i16, y: i16 },
    Move { x: i16, y: i16, dt: u8 },
    Up { x: i16, y: i16 },
    Flick { vx: i16, vy: i16 },
    Tick { dt: u16 },
    Cancel,
}

#[derive(Debug, Arbitrary)]
struct Script {
    autoscroll: bool,
    allow_exit: bool,
    start_on_hold: bool,
    inputs: Vec<Input>,
}

struct Quiet;
impl DropClient for Quiet {}

fuzz_target!(|script: Script| {
    let mut stage = Stage::new(WindowId(0));
    let doc = stage.tree().root();
    let mut rows: Vec<ElementId> = Vec::new();
    for i in 0..3 {
        let Ok(list) = stage
            .tree_mut()
            .create_child(doc, "ul", Rect::new(i * 120, 0, 120, 480))
        else {
            return;
        };
        let _ = stage.tree_mut().set_attribute(list, "x-mojo-scroller", "true");
        let _ = stage.tree_mut().set_scroll_extent(list, Point::new(0, 2000));
        let _ = stage.setup_drop_container(list, Quiet);
        if let Ok(row) = stage
            .tree_mut()
            .create_child(list, "li", Rect::new(i * 120, 0, 120, 40))
        {
            rows.push(row);
        }
    }

    let options = DragOptions {
        autoscroll: script.autoscroll,
        allow_exit: script.allow_exit,
        ..DragOptions::new()
    };
    let trigger = if script.start_on_hold {
        GestureKind::Hold
    } else {
        GestureKind::DragStart
    };
    let mut handler = |stage: &mut Stage, ev: &mut GestureEvent| {
        if ev.kind == trigger && rows.contains(&ev.target) && !stage.is_dragging() {
            let _ = stage.start_dragging(doc, ev.target, ev, options.clone());
        }
    };

    let mut recognizer = GestureRecognizer::default();
    let t0 = Instant::now();
    let mut t = 0u64;
    for input in script.inputs.iter().take(256) {
        let now = t0 + Duration::from_millis(t);
        match *input {
            Input::Down { x, y } => {
                let ev = PointerEvent::down(i32::from(x), i32::from(y), now);
                recognizer.handle_pointer(&mut stage, &ev, &mut handler);
            }
            Input::Move { x, y, dt } => {
                t += u64::from(dt);
                let ev = PointerEvent::moved(i32::from(x), i32::from(y), t0 + Duration::from_millis(t));
                recognizer.handle_pointer(&mut stage, &ev, &mut handler);
            }
            Input::Up { x, y } => {
                let ev = PointerEvent::up(i32::from(x), i32::from(y), now);
                recognizer.handle_pointer(&mut stage, &ev, &mut handler);
            }
            Input::Flick { vx, vy } => {
                let v = Velocity::new(f64::from(vx), f64::from(vy));
                let ev = PointerEvent::flick(v, Point::ZERO, now);
                recognizer.handle_pointer(&mut stage, &ev, &mut handler);
            }
            Input::Tick { dt } => {
                t += u64::from(dt);
                recognizer.tick(&mut stage, t0 + Duration::from_millis(t), &mut handler);
            }
            Input::Cancel => {
                recognizer.cancel(&mut stage);
            }
        }

        // A drag session never outlives its gesture.
        if !recognizer.is_active(WindowId(0)) {
            assert!(!stage.is_dragging(), "drag session leaked past gesture end");
        }
        assert!(recognizer.active_count() <= 1);
        if let Some(session) = stage.drag_session() {
            let current = session.current_container();
            assert!(current.is_none_or(|c| session.containers().iter().any(|i| i.element == c)));
        }
    }

    recognizer.cancel(&mut stage);
    assert!(!stage.is_dragging());
    for row in &rows {
        assert!(!stage.tree().has_class(*row, "palm-dragging"));
    }
});
