//! Two-badge protocol driven through the application controller

use std::cell::RefCell;
use std::rc::Rc;

use badge_app::{register_app, AppController, AppId, Environment, Handoff, MenuApp, PlayerCount, ScoreApp};
use badge_core::{
    ActivityKind, Button, Display, FrameBuffer, Instant, NvMirror, PacketSink, RandomSource,
    Scoring, Services, SingleActivity, Storage, TwoPartyActivity, Username,
};
use badge_sched::{Scheduler, TaskControl};
use badge_versus::{
    GameEngine, GameState, Move, Report, VersusApp, VersusConfig, VersusPacket,
};

const VERSUS: AppId = AppId(3);

#[derive(Debug, Default)]
struct Sim {
    state: Option<GameState>,
    score: u16,
    attacks_taken: Vec<u8>,
    moves: Vec<Move>,
    outgoing_attack: Option<u8>,
    resets: u32,
}

/// Engine whose state the test drives directly
struct Scripted(Rc<RefCell<Sim>>);

impl GameEngine for Scripted {
    fn reset(&mut self, _seed: u32) {
        let mut sim = self.0.borrow_mut();
        sim.state = Some(GameState::Waiting);
        sim.resets += 1;
    }
    fn state(&self) -> GameState {
        self.0.borrow().state.unwrap_or(GameState::Waiting)
    }
    fn start_playing(&mut self) {
        self.0.borrow_mut().state = Some(GameState::Playing);
    }
    fn apply_move(&mut self, mv: Move) {
        self.0.borrow_mut().moves.push(mv);
    }
    fn fall_if_due(&mut self, _now: Instant, _last_fall: Instant) -> bool {
        false
    }
    fn enemy_attack(&mut self, lines: u8) {
        self.0.borrow_mut().attacks_taken.push(lines);
    }
    fn force_over(&mut self) {
        self.0.borrow_mut().state = Some(GameState::GameOver);
    }
    fn score(&self) -> u16 {
        self.0.borrow().score
    }
    fn take_attack(&mut self) -> Option<u8> {
        self.0.borrow_mut().outgoing_attack.take()
    }
    fn draw(&self, frame: &mut FrameBuffer) {
        frame[0] = 1;
    }
}

#[derive(Default)]
struct Screen;

impl Display for Screen {
    fn show_frame(&mut self, _frame: &FrameBuffer) {}
    fn scroll_text(&mut self, _text: &str) {}
    fn scroll_completed(&self) -> bool {
        false
    }
}

#[derive(Default)]
struct Nv {
    mirror: NvMirror,
    dirty: u32,
}

impl Storage for Nv {
    fn mirror(&self) -> &NvMirror {
        &self.mirror
    }
    fn mirror_mut(&mut self) -> &mut NvMirror {
        &mut self.mirror
    }
    fn mark_dirty(&mut self) {
        self.dirty += 1;
    }
}

#[derive(Default)]
struct Scores {
    single: Vec<SingleActivity>,
    two: Vec<TwoPartyActivity>,
}

impl Scoring for Scores {
    fn report_single(&mut self, activity: SingleActivity) -> bool {
        self.single.push(activity);
        true
    }
    fn report_two_party(&mut self, activity: TwoPartyActivity) -> bool {
        self.two.push(activity);
        true
    }
}

/// Always rolls the same value, so nonces are predictable
struct Dice(u32);

impl RandomSource for Dice {
    fn next_u32(&mut self) -> u32 {
        self.0
    }
}

#[derive(Default)]
struct Wire(Vec<Vec<u8>>);

impl PacketSink for Wire {
    fn send(&mut self, packet: &[u8]) -> bool {
        self.0.push(packet.to_vec());
        true
    }
}

struct Badge {
    sched: Scheduler<AppId, 8>,
    controller: AppController,
    sim: Rc<RefCell<Sim>>,
    screen: Screen,
    nv: Nv,
    scores: Scores,
    dice: Dice,
    wire: Wire,
}

impl Badge {
    fn new(players: PlayerCount) -> Self {
        let sim = Rc::new(RefCell::new(Sim::default()));
        let mut sched = Scheduler::default();
        let mut controller = AppController::new(AppId::MENU);

        let mut menu: MenuApp = MenuApp::new();
        menu.add("versus", VERSUS, Some(Handoff::Players(players))).unwrap();
        register_app(&mut sched, &mut controller, AppId::MENU, Box::new(menu)).unwrap();
        register_app(&mut sched, &mut controller, AppId::SCORE, Box::new(ScoreApp::new())).unwrap();
        let versus = VersusApp::new(Scripted(sim.clone()), VersusConfig::default());
        register_app(&mut sched, &mut controller, VERSUS, Box::new(versus)).unwrap();
        sched.start();

        let mut nv = Nv::default();
        nv.mirror.username = Username::new("bob");

        let mut badge = Self {
            sched,
            controller,
            sim,
            screen: Screen,
            nv,
            scores: Scores::default(),
            dice: Dice(0x1234),
            wire: Wire::default(),
        };
        badge.with_env(|controller, env| controller.start(env, AppId::MENU).unwrap());
        // menu OK enters the game with the chosen player count
        badge.press(Button::Ok);
        assert_eq!(badge.current(), Some(VERSUS));
        badge
    }

    fn with_env<R>(&mut self, f: impl FnOnce(&mut AppController, &mut Environment<'_>) -> R) -> R {
        let services = Services::new(&mut self.screen, &mut self.nv, &mut self.scores, &mut self.dice);
        let mut env = Environment::new(Instant::ZERO, &mut self.sched, services, &mut self.wire);
        f(&mut self.controller, &mut env)
    }

    fn press(&mut self, button: Button) {
        self.with_env(|controller, env| controller.on_button(env, button).unwrap());
    }

    fn routine(&mut self) {
        self.with_env(|controller, env| controller.run_routine(env, VERSUS).unwrap());
    }

    fn receive(&mut self, packet: VersusPacket) {
        self.receive_raw(&packet.encode());
    }

    fn receive_raw(&mut self, bytes: &[u8]) {
        self.with_env(|controller, env| controller.deliver_packet(env, VERSUS, bytes).unwrap());
    }

    fn current(&self) -> Option<AppId> {
        self.controller.current_app()
    }

    fn sent(&mut self) -> Vec<VersusPacket> {
        std::mem::take(&mut self.wire.0)
            .iter()
            .map(|bytes| VersusPacket::decode(bytes).unwrap())
            .collect()
    }

    fn set_state(&self, state: GameState) {
        self.sim.borrow_mut().state = Some(state);
    }
}

fn peer(score: u16, nonce: u16) -> Report {
    Report {
        score,
        username: Username::new("alice"),
        nonce,
    }
}

#[test]
fn ack_accepted_only_for_the_generated_nonce() {
    let mut badge = Badge::new(PlayerCount::Multi);
    badge.press(Button::Ok);
    assert_eq!(badge.sent(), [VersusPacket::Start]);

    badge.sim.borrow_mut().score = 40;
    badge.set_state(GameState::GameOver);
    badge.routine();

    let sent = badge.sent();
    assert_eq!(
        sent,
        [VersusPacket::GameOver(Report {
            score: 40,
            username: Username::new("bob"),
            nonce: 0x1234
        })]
    );
    assert_eq!(badge.current(), Some(AppId::SCORE));

    badge.receive(VersusPacket::GameOverAck(peer(25, 0x5678)));
    assert!(badge.scores.two.is_empty());

    badge.receive(VersusPacket::GameOverAck(peer(25, 0x1234)));
    badge.receive(VersusPacket::GameOverAck(peer(25, 0x1234)));
    assert_eq!(
        badge.scores.two,
        [TwoPartyActivity {
            kind: ActivityKind::STACKER,
            my_score: 40,
            other_score: 25,
            other_user: Username::new("alice"),
            nonce: 0x1234,
        }]
    );
    assert!(badge.scores.single.is_empty());
}

#[test]
fn peer_game_over_is_acknowledged_and_reported_once() {
    let mut badge = Badge::new(PlayerCount::Multi);
    badge.press(Button::Ok);
    badge.sent();
    badge.sim.borrow_mut().score = 12;

    badge.receive(VersusPacket::GameOver(peer(30, 0x9999)));
    assert_eq!(badge.sim.borrow().state, Some(GameState::GameOver));
    assert_eq!(
        badge.sent(),
        [VersusPacket::GameOverAck(Report {
            score: 12,
            username: Username::new("bob"),
            nonce: 0x9999
        })]
    );
    assert_eq!(badge.scores.two.len(), 1);
    assert_eq!(badge.scores.two[0].other_score, 30);
    assert_eq!(badge.current(), Some(AppId::SCORE));
    assert_eq!(badge.nv.mirror.best_score(ActivityKind::STACKER), Some(12));
    assert_eq!(badge.nv.dirty, 1);

    // a repeated game over is answered again but not reported again
    badge.receive(VersusPacket::GameOver(peer(30, 0x9999)));
    assert_eq!(badge.sent().len(), 1);
    assert_eq!(badge.scores.two.len(), 1);
    assert_eq!(badge.current(), Some(AppId::SCORE));
}

#[test]
fn abort_wins_over_game_over_in_the_same_tick() {
    let mut badge = Badge::new(PlayerCount::Multi);
    badge.press(Button::Ok);
    badge.sent();

    badge.receive(VersusPacket::Abort);
    badge.receive(VersusPacket::GameOver(peer(30, 0x4242)));

    assert_eq!(badge.current(), Some(AppId::MENU));
    assert!(badge.sent().is_empty());
    assert!(badge.scores.two.is_empty());
    assert_eq!(badge.sim.borrow().state, Some(GameState::Playing));
}

#[test]
fn malformed_attack_changes_nothing() {
    let mut badge = Badge::new(PlayerCount::Multi);

    badge.receive_raw(&[1, 2, 0]);
    badge.receive_raw(&[1]);
    assert!(badge.sim.borrow().attacks_taken.is_empty());

    // applied even before the game started
    badge.receive(VersusPacket::Attack { count: 2 });
    assert_eq!(badge.sim.borrow().attacks_taken, [2]);
}

#[test]
fn attacks_go_out_only_while_playing() {
    let mut badge = Badge::new(PlayerCount::Multi);
    badge.sim.borrow_mut().outgoing_attack = Some(3);
    badge.routine();
    assert!(badge.sent().is_empty());

    badge.receive(VersusPacket::Start);
    assert_eq!(badge.sim.borrow().state, Some(GameState::Playing));
    badge.routine();
    assert_eq!(badge.sent(), [VersusPacket::Attack { count: 3 }]);
}

#[test]
fn buttons_are_rotated_and_back_aborts() {
    let mut badge = Badge::new(PlayerCount::Multi);
    badge.press(Button::Ok);
    badge.sent();

    for button in [Button::Left, Button::Right, Button::Down, Button::Up, Button::Ok] {
        badge.press(button);
    }
    assert_eq!(
        badge.sim.borrow().moves,
        [Move::Up, Move::Down, Move::Left, Move::Right, Move::Drop]
    );

    badge.press(Button::LongBack);
    assert_eq!(badge.sent(), [VersusPacket::Abort]);
    assert_eq!(badge.current(), Some(AppId::MENU));
    assert!(!badge.sched.is_enabled(badge.controller.task_of(VERSUS).unwrap()));
}

#[test]
fn single_player_takes_attacks_but_never_transmits() {
    let mut badge = Badge::new(PlayerCount::Single);
    badge.press(Button::Ok);
    badge.receive(VersusPacket::Attack { count: 3 });
    assert_eq!(badge.sim.borrow().attacks_taken, [3]);
    assert_eq!(badge.current(), Some(VERSUS));

    badge.sim.borrow_mut().score = 9;
    badge.set_state(GameState::GameOver);
    badge.routine();
    badge.routine();

    assert!(badge.sent().is_empty());
    assert_eq!(badge.scores.single.len(), 1);
    assert_eq!(badge.scores.single[0].data[..2], [9, 0]);
    assert!(badge.scores.two.is_empty());
    assert_eq!(badge.current(), Some(AppId::SCORE));

    // nothing to acknowledge or reconcile
    badge.receive(VersusPacket::GameOverAck(peer(5, 0x1234)));
    assert!(badge.scores.two.is_empty());
}

#[test]
fn single_player_honors_peer_abort() {
    let mut badge = Badge::new(PlayerCount::Single);
    badge.press(Button::Ok);
    assert_eq!(badge.sim.borrow().state, Some(GameState::Playing));

    badge.receive(VersusPacket::Abort);
    assert_eq!(badge.current(), Some(AppId::MENU));
    assert!(badge.sent().is_empty());
}

#[test]
fn single_player_peer_game_over_ends_without_reply() {
    let mut badge = Badge::new(PlayerCount::Single);
    badge.press(Button::Ok);
    badge.sim.borrow_mut().score = 4;

    badge.receive(VersusPacket::GameOver(peer(30, 0x7777)));
    assert_eq!(badge.sim.borrow().state, Some(GameState::GameOver));
    assert_eq!(badge.current(), Some(AppId::SCORE));
    assert!(badge.sent().is_empty());
    assert!(badge.scores.two.is_empty());
}

#[test]
fn ack_dropped_unless_game_is_over() {
    let mut badge = Badge::new(PlayerCount::Multi);
    badge.press(Button::Ok);
    badge.sim.borrow_mut().score = 40;
    badge.set_state(GameState::GameOver);
    badge.routine();
    assert_eq!(badge.sent().len(), 2);

    // right nonce, wrong state
    badge.set_state(GameState::Playing);
    badge.receive(VersusPacket::GameOverAck(peer(25, 0x1234)));
    assert!(badge.scores.two.is_empty());

    // the nonce was not used up by the dropped ack
    badge.set_state(GameState::GameOver);
    badge.receive(VersusPacket::GameOverAck(peer(25, 0x1234)));
    assert_eq!(badge.scores.two.len(), 1);
    assert_eq!(badge.scores.two[0].nonce, 0x1234);
}

#[test]
fn reentry_starts_a_fresh_round() {
    let mut badge = Badge::new(PlayerCount::Multi);
    badge.press(Button::Ok);
    badge.set_state(GameState::GameOver);
    badge.routine();
    badge.sent();

    // score screen -> menu -> game again
    badge.press(Button::Ok);
    assert_eq!(badge.current(), Some(AppId::MENU));
    badge.press(Button::Ok);
    assert_eq!(badge.current(), Some(VERSUS));
    assert_eq!(badge.sim.borrow().resets, 2);

    // the previous round's nonce is no longer accepted
    badge.set_state(GameState::GameOver);
    badge.receive(VersusPacket::GameOverAck(peer(1, 0x1234)));
    assert!(badge.scores.two.is_empty());
}
