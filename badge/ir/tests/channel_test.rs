//! Broadcast arbitration and receive dispatch

use std::cell::RefCell;
use std::rc::Rc;

use badge_core::{Message, PacketSink};
use badge_ir::{
    show_frame, test_frame, BroadcastOutcome, IrChannel, IrConfig, IrInbox, IrSelfTest,
    IrTransport, PacketType, SELF_TEST_PATTERN,
};

/// Loopback transport that records every frame it accepts
#[derive(Clone, Default)]
struct Collector {
    sent: Rc<RefCell<Vec<Vec<u8>>>>,
    busy: Rc<RefCell<bool>>,
}

impl Collector {
    fn set_busy(&self, busy: bool) {
        *self.busy.borrow_mut() = busy;
    }

    fn take(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut *self.sent.borrow_mut())
    }
}

impl IrTransport for Collector {
    type Error = ();

    fn try_send(&mut self, frame: &[u8]) -> nb::Result<(), ()> {
        if *self.busy.borrow() {
            return Err(nb::Error::WouldBlock);
        }
        self.sent.borrow_mut().push(frame.to_vec());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Versus,
    Show,
    SelfTest,
}

fn channel(config: IrConfig) -> (IrChannel<Collector, Route>, Collector) {
    let wire = Collector::default();
    (IrChannel::new(wire.clone(), config), wire)
}

#[test]
fn later_priority_message_replaces_unsent_one() {
    let (mut ir, wire) = channel(IrConfig::default());
    wire.set_busy(true);

    let a = show_frame(0, &Message::new("A"));
    let b = show_frame(0, &Message::new("B"));
    assert!(!ir.send_priority(&a));
    assert!(!ir.send_priority(&b));
    assert_eq!(ir.broadcast(), BroadcastOutcome::Busy);

    wire.set_busy(false);
    assert_eq!(ir.broadcast(), BroadcastOutcome::Priority);
    assert_eq!(ir.broadcast(), BroadcastOutcome::Idle);
    assert_eq!(wire.take(), [b.to_vec()]);
}

#[test]
fn suppression_stops_only_the_default_broadcast() {
    let beacon = test_frame(0, &Message::new(SELF_TEST_PATTERN));
    let (mut ir, wire) = channel(IrConfig::builder().beacon(beacon.clone()).build());

    assert_eq!(ir.broadcast(), BroadcastOutcome::Beacon);
    ir.set_broadcast_suppressed(true);
    assert_eq!(ir.broadcast(), BroadcastOutcome::Idle);

    let announcement = show_frame(0, &Message::new("You got pwned!"));
    assert!(ir.send_show(&Message::new("You got pwned!")));
    assert!(ir.send(&[1]));

    ir.set_broadcast_suppressed(false);
    assert_eq!(ir.broadcast(), BroadcastOutcome::Beacon);

    assert_eq!(
        wire.take(),
        [
            beacon.to_vec(),
            announcement.to_vec(),
            vec![0, PacketType::Game.tag(), 1],
            beacon.to_vec()
        ]
    );
}

#[test]
fn priority_goes_before_game_frames_before_beacon() {
    let beacon = test_frame(0, &Message::new("beacon"));
    let (mut ir, wire) = channel(IrConfig::builder().ttl(2).beacon(beacon.clone()).build());
    wire.set_busy(true);

    assert!(ir.queue_game(&[3, 1]));
    assert!(ir.queue_game(&[2]));
    assert!(!ir.send_show(&Message::new("hi")));
    wire.set_busy(false);

    let outcomes: Vec<_> = (0..4).map(|_| ir.broadcast()).collect();
    assert_eq!(
        outcomes,
        [
            BroadcastOutcome::Priority,
            BroadcastOutcome::Game,
            BroadcastOutcome::Game,
            BroadcastOutcome::Beacon
        ]
    );

    let sent = wire.take();
    assert_eq!(sent[0], show_frame(2, &Message::new("hi")).to_vec());
    assert_eq!(sent[1], [2, 1, 3, 1]);
    assert_eq!(sent[2], [2, 1, 2]);
    assert_eq!(ir.stats().sent, 4);
}

#[test]
fn game_packet_waits_behind_pending_priority() {
    let (mut ir, wire) = channel(IrConfig::default());
    wire.set_busy(true);
    assert!(!ir.send_show(&Message::new("x")));
    wire.set_busy(false);

    // the priority message is still pending, so the game frame queues
    assert!(ir.queue_game(&[5]));
    assert_eq!(ir.queued_game_frames(), 1);
    assert!(wire.take().is_empty());
}

#[test]
fn received_frames_go_to_their_subscriber() {
    let (mut ir, _wire) = channel(IrConfig::default());
    ir.subscribe(PacketType::Game, Route::Versus);
    ir.subscribe(PacketType::Show, Route::Show);

    let game = [0, 1, 3, 1];
    let delivery = ir.on_packet_received(&game).unwrap();
    assert_eq!(delivery.subscriber, Route::Versus);
    assert_eq!(delivery.frame.payload, &[3, 1]);

    let show = show_frame(0, &Message::new("hello"));
    let delivery = ir.on_packet_received(&show).unwrap();
    assert_eq!(delivery.subscriber, Route::Show);
    assert_eq!(delivery.frame.message(), Some(Message::new("hello")));

    // no subscriber for test frames yet
    let test = test_frame(0, &Message::new(SELF_TEST_PATTERN));
    assert!(ir.on_packet_received(&test).is_none());
    // unknown tag and short show frame
    assert!(ir.on_packet_received(&[0, 7, 1]).is_none());
    assert!(ir.on_packet_received(&[0, 2, b'h']).is_none());

    assert_eq!(ir.stats().received, 5);
    assert_eq!(ir.stats().rejected, 2);

    assert_eq!(ir.subscribe(PacketType::Test, Route::SelfTest), None);
    assert_eq!(
        ir.on_packet_received(&test).map(|d| d.subscriber),
        Some(Route::SelfTest)
    );
}

#[test]
fn self_test_counts_matching_pattern() {
    let mut check = IrSelfTest::default();
    assert!(!check.passed());
    assert!(check.check(&Message::new(SELF_TEST_PATTERN)));
    assert!(!check.check(&Message::new("noise")));
    assert_eq!((check.matched(), check.mismatched()), (1, 1));
    assert!(check.passed());
}

static INBOX: IrInbox = IrInbox::new();

#[test]
fn inbox_hands_frames_to_the_tick() {
    let (mut ir, _wire) = channel(IrConfig::default());
    ir.subscribe(PacketType::Game, Route::Versus);

    assert!(INBOX.push(&[0, 1, 3, 4]));
    let frame = INBOX.pop().unwrap();
    let delivery = ir.on_packet_received(&frame).unwrap();
    assert_eq!(delivery.frame.payload, &[3, 4]);
    assert!(INBOX.is_empty());
}
