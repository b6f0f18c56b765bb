#![forbid(unsafe_code)]

//! Facade-level flow: listeners, hold-to-drag and configuration errors.

use std::cell::RefCell;
use std::rc::Rc;

use mojo::prelude::*;
use mojo::{Duration, GestureConfig};

#[derive(Default)]
struct Inbox {
    drops: Rc<RefCell<Vec<(ElementId, bool)>>>,
}

impl DropClient for Inbox {
    fn drag_drop(&mut self, element: ElementId, is_new_item: bool) -> DropResult {
        self.drops.borrow_mut().push((element, is_new_item));
        Ok(())
    }
}

#[test]
fn hold_listener_starts_drag_into_second_list() {
    let mut window = Window::new(WindowId(0));
    let root = window.stage().tree().root();
    let (left, right, row) = {
        let tree = window.stage_mut().tree_mut();
        let left = tree.create_child(root, "ul", Rect::new(0, 0, 100, 300)).unwrap();
        let right = tree.create_child(root, "ul", Rect::new(100, 0, 100, 300)).unwrap();
        let row = tree.create_child(left, "li", Rect::new(0, 0, 100, 30)).unwrap();
        (left, right, row)
    };
    let inbox = Inbox::default();
    let drops = Rc::clone(&inbox.drops);
    window.stage_mut().setup_drop_container(left, Inbox::default()).unwrap();
    window.stage_mut().setup_drop_container(right, inbox).unwrap();

    // Listening on the list catches holds on its rows by bubbling.
    window.on(left, GestureKind::Hold, move |stage, cx| {
        let event = cx.event().clone();
        stage
            .start_dragging(root, event.target, &event, DragOptions::new())
            .unwrap();
        cx.prevent_default();
    });
    let taps = Rc::new(RefCell::new(0));
    let tap_count = Rc::clone(&taps);
    window.on(row, GestureKind::Tap, move |_, _| *tap_count.borrow_mut() += 1);

    let t0 = Instant::now();
    window.pointer(&PointerEvent::down(50, 15, t0));
    assert_eq!(window.next_deadline(), Some(t0 + Duration::from_millis(500)));
    assert_eq!(window.tick(t0 + Duration::from_millis(500)), 1);
    assert!(window.stage().is_dragging());

    window.pointer(&PointerEvent::moved(150, 15, t0 + Duration::from_millis(600)));
    window.pointer(&PointerEvent::up(150, 15, t0 + Duration::from_millis(700)));

    assert_eq!(*drops.borrow(), vec![(row, true)]);
    assert_eq!(*taps.borrow(), 0);
    assert!(!window.stage().is_dragging());
    assert!(!window.recognizer().is_active(WindowId(0)));
}

#[test]
fn invalid_config_is_rejected() {
    let config = GestureConfig {
        hold_timeout_ms: 0,
        ..GestureConfig::default()
    };
    let err = Window::try_with_config(WindowId(1), config).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("hold_timeout_ms"));
}

#[test]
fn drag_error_converts() {
    let mut window = Window::new(WindowId(2));
    let root = window.stage().tree().root();
    let t0 = Instant::now();
    let mut captured = None;
    let mut handler = |_: &mut Stage, ev: &mut GestureEvent| captured = Some(ev.clone());
    let mut recognizer = mojo::GestureRecognizer::default();
    recognizer.handle_pointer(window.stage_mut(), &PointerEvent::down(1, 1, t0), &mut handler);
    recognizer.handle_pointer(
        window.stage_mut(),
        &PointerEvent::up(1, 1, t0 + Duration::from_millis(20)),
        &mut handler,
    );
    let tap = captured.unwrap();

    let missing = ElementId::from_raw(404);
    let result: Result<()> = window
        .stage_mut()
        .start_dragging(root, missing, &tap, DragOptions::new())
        .map_err(Error::from);
    assert!(matches!(result, Err(Error::Drag(_))));
}
