//! Property-based invariant tests for the reel command cycle.
//!
//! Random interleavings of commands, drags, resizes and clock ticks must
//! preserve:
//!
//! 1. The canonical index stays within `[0, length]`.
//! 2. After settling, every `run.before` has exactly one `run.after`.
//! 3. After settling, the reel accepts commands again.
//! 4. After `destroy`, nothing is published.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use proptest::prelude::*;
use reel_core::settings::{FocusAt, ReelType, Settings};
use reel_runtime::{Event, EventKind, Reel};

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Go(&'static str),
    Drag(i32),
    Resize(u32),
    Tick(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop::sample::select(vec![">", "<", ">>", "<<", "|>", "|<", ">2", "<3", "=1", "=9"])
            .prop_map(Op::Go),
        (-300i32..300).prop_map(Op::Drag),
        (100u32..1500).prop_map(Op::Resize),
        (0u64..1000).prop_map(Op::Tick),
    ]
}

fn settings_strategy() -> impl Strategy<Value = Settings> {
    (
        prop_oneof![Just(ReelType::Slider), Just(ReelType::Carousel)],
        1usize..5,
        prop_oneof![Just(FocusAt::Center), (0usize..3).prop_map(FocusAt::Index)],
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(kind, per_view, focus, bound, rewind, wait)| {
            Settings::new()
                .kind(kind)
                .per_view(per_view)
                .focus_at(focus)
                .bound(bound)
                .rewind(rewind)
                .wait_for_transition(wait)
        })
}

fn apply(reel: &mut Reel, op: &Op) {
    match op {
        Op::Go(p) => {
            reel.go(p).expect("well-formed pattern");
        }
        Op::Drag(px) => reel.apply_move(f64::from(*px)),
        Op::Resize(w) => reel.resize(f64::from(*w)),
        Op::Tick(ms) => {
            reel.tick(Duration::from_millis(*ms));
        }
    }
}

fn count(log: &Rc<RefCell<Vec<EventKind>>>, kind: EventKind) -> usize {
    log.borrow().iter().filter(|k| **k == kind).count()
}

// ═════════════════════════════════════════════════════════════════════════
// 1-3. Index range, run pairing, re-enable
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn command_cycle_invariants(
        settings in settings_strategy(),
        items in 1usize..10,
        ops in proptest::collection::vec(op_strategy(), 1..40),
    ) {
        let mut reel = Reel::new(settings, items, 600.0).expect("valid settings");
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        reel.subscribe_all(move |e: &Event| sink.borrow_mut().push(e.kind()));
        reel.mount();

        for op in &ops {
            apply(&mut reel, op);
            prop_assert!(
                reel.index() <= reel.length(),
                "index {} > length {} after {:?}",
                reel.index(), reel.length(), op
            );
        }

        reel.settle();
        prop_assert_eq!(count(&log, EventKind::RunBefore), count(&log, EventKind::RunAfter));
        prop_assert_eq!(reel.pending_tasks(), 0);
        prop_assert!(!reel.is_disabled());
        prop_assert!(!reel.is_offset(None));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Destroy is final
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn nothing_after_destroy(
        settings in settings_strategy(),
        before in proptest::collection::vec(op_strategy(), 0..10),
        after in proptest::collection::vec(op_strategy(), 1..20),
    ) {
        let mut reel = Reel::new(settings, 5, 600.0).expect("valid settings");
        reel.mount();
        for op in &before {
            apply(&mut reel, op);
        }
        reel.destroy();

        let log = Rc::new(RefCell::new(0usize));
        let sink = Rc::clone(&log);
        reel.subscribe_all(move |_| *sink.borrow_mut() += 1);
        for op in &after {
            apply(&mut reel, op);
        }
        reel.settle();
        prop_assert_eq!(*log.borrow(), 0);
        prop_assert_eq!(reel.pending_tasks(), 0);
    }
}
