//! The versus application

use log::{debug, info};

use badge_app::{App, AppContext, AppTask, Handoff, PlayerCount};
use badge_core::{Button, FrameBuffer, Instant, SingleActivity, TwoPartyActivity, Username, DISPLAY_WIDTH};

use crate::config::VersusConfig;
use crate::engine::{GameEngine, GameState, Move};
use crate::packet::{Report, VersusPacket};
use crate::session::Session;

/// Drives a [`GameEngine`] and keeps a peer badge in sync with it.
pub struct VersusApp<G> {
    config: VersusConfig,
    engine: G,
    session: Session,
    last_fall: Instant,
}

impl<G: GameEngine> VersusApp<G> {
    pub fn new(engine: G, config: VersusConfig) -> Self {
        Self {
            config,
            engine,
            session: Session::closed(PlayerCount::Single),
            last_fall: Instant::ZERO,
        }
    }

    pub fn engine(&self) -> &G {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut G {
        &mut self.engine
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn send(ctx: &mut AppContext<'_>, packet: VersusPacket) {
        if !ctx.send_packet(&packet.encode()) {
            debug!("versus: {} not queued", packet.kind());
        }
    }

    fn username(&self, ctx: &AppContext<'_>) -> Username {
        self.config
            .username
            .unwrap_or_else(|| ctx.services.storage.mirror().username)
    }

    fn own_report(&self, ctx: &AppContext<'_>, nonce: u16) -> Report {
        Report {
            score: self.engine.score(),
            username: self.username(ctx),
            nonce,
        }
    }

    /// Leave for the menu, telling the peer first
    fn abort(&mut self, ctx: &mut AppContext<'_>) {
        if self.session.is_multi() {
            Self::send(ctx, VersusPacket::Abort);
        }
        self.session.close();
        ctx.back_to_menu();
    }

    fn report_two_party(&mut self, ctx: &mut AppContext<'_>, peer: &Report) {
        if !self.session.claim_report(peer.nonce) {
            debug!("versus: nonce {:#06x} already reported", peer.nonce);
            return;
        }
        let activity = TwoPartyActivity {
            kind: self.config.kind,
            my_score: self.engine.score(),
            other_score: peer.score,
            other_user: peer.username,
            nonce: peer.nonce,
        };
        info!(
            "versus: {} vs {} ({}), nonce {:#06x}",
            activity.my_score, activity.other_score, activity.other_user, activity.nonce
        );
        if !ctx.services.scoring.report_two_party(activity) {
            debug!("versus: two-party report dropped");
        }
    }

    /// Record the best score and hand the final score to the score screen
    fn finish(&mut self, ctx: &mut AppContext<'_>) {
        let score = self.engine.score();
        let storage = &mut *ctx.services.storage;
        if storage.mirror_mut().record_score(self.config.kind, score) {
            storage.mark_dirty();
        }
        info!("versus: game over, score {}", score);
        ctx.change_app(self.config.score_app, Some(Handoff::Score(score)));
    }

    fn on_local_game_over(&mut self, ctx: &mut AppContext<'_>) {
        if !self.session.begin_game_over() {
            return;
        }
        if self.session.is_multi() {
            let nonce = ctx.services.random.next_u16();
            self.session.remember_nonce(nonce);
            let report = self.own_report(ctx, nonce);
            Self::send(ctx, VersusPacket::GameOver(report));
        } else {
            let activity = SingleActivity::score(self.config.kind, self.engine.score());
            if !ctx.services.scoring.report_single(activity) {
                debug!("versus: single report dropped");
            }
        }
        self.finish(ctx);
    }

    fn on_peer_game_over(&mut self, ctx: &mut AppContext<'_>, peer: Report) {
        if !self.session.is_open() {
            debug!("versus: game over outside a session ignored");
            return;
        }
        self.engine.force_over();

        if self.session.is_multi() {
            let ack = self.own_report(ctx, peer.nonce);
            Self::send(ctx, VersusPacket::GameOverAck(ack));
            self.session.remember_nonce(peer.nonce);
            self.report_two_party(ctx, &peer);
        }

        if self.session.begin_game_over() {
            self.finish(ctx);
        }
    }

    fn on_peer_ack(&mut self, ctx: &mut AppContext<'_>, peer: Report) {
        if self.engine.state() != GameState::GameOver {
            debug!("versus: ack while not over dropped");
            return;
        }
        if !self.session.accept_ack(peer.nonce) {
            debug!("versus: stale ack nonce {:#06x} dropped", peer.nonce);
            return;
        }
        self.report_two_party(ctx, &peer);
    }
}

impl<G: GameEngine> App for VersusApp<G> {
    fn name(&self) -> &'static str {
        self.config.name
    }

    fn task(&self) -> Option<AppTask> {
        Some(AppTask::new(self.config.priority, self.config.interval))
    }

    fn accept(&mut self, handoff: Handoff) {
        if let Handoff::Players(players) = handoff {
            self.session = Session::closed(players);
        }
    }

    fn on_entry(&mut self, ctx: &mut AppContext<'_>) {
        self.engine.reset(ctx.services.random.next_u32());
        self.session = Session::open(self.session.players());
        self.last_fall = ctx.now;
        ctx.services.display.scroll_text("Ready?");
        ctx.enable_routine();
        info!("versus: entered, {:?}", self.session.players());
    }

    fn on_exit(&mut self, ctx: &mut AppContext<'_>) {
        ctx.disable_routine();
    }

    fn on_button(&mut self, ctx: &mut AppContext<'_>, button: Button) {
        match self.engine.state() {
            GameState::Waiting => match button {
                Button::Ok => {
                    if self.session.is_multi() {
                        Self::send(ctx, VersusPacket::Start);
                    }
                    self.engine.start_playing();
                    self.last_fall = ctx.now;
                }
                Button::Back | Button::LongBack => self.abort(ctx),
                _ => {}
            },
            GameState::Playing => match button {
                Button::Back | Button::LongBack => self.abort(ctx),
                other => {
                    if let Some(mv) = Move::from_rotated(other) {
                        self.engine.apply_move(mv);
                    }
                }
            },
            GameState::GameOver => {}
        }
    }

    fn routine(&mut self, ctx: &mut AppContext<'_>) {
        if !ctx.is_active() {
            return;
        }
        match self.engine.state() {
            GameState::Waiting => {}
            GameState::Playing => {
                if self.engine.fall_if_due(ctx.now, self.last_fall) {
                    self.last_fall = ctx.now;
                }
                while let Some(count) = self.engine.take_attack() {
                    if self.session.is_multi() {
                        Self::send(ctx, VersusPacket::Attack { count });
                    }
                }
                let mut frame: FrameBuffer = [0; DISPLAY_WIDTH];
                self.engine.draw(&mut frame);
                ctx.services.display.show_frame(&frame);
            }
            GameState::GameOver => self.on_local_game_over(ctx),
        }
    }

    fn on_packet(&mut self, ctx: &mut AppContext<'_>, packet: &[u8]) {
        let packet = match VersusPacket::decode(packet) {
            Ok(packet) => packet,
            Err(err) => {
                debug!("versus: dropped: {}", err);
                return;
            }
        };

        match packet {
            VersusPacket::Attack { count } => self.engine.enemy_attack(count),
            VersusPacket::Start => {
                if self.session.is_open() && self.engine.state() == GameState::Waiting {
                    self.engine.start_playing();
                    self.last_fall = ctx.now;
                }
            }
            VersusPacket::GameOver(peer) => self.on_peer_game_over(ctx, peer),
            VersusPacket::GameOverAck(peer) => {
                if self.session.is_multi() {
                    self.on_peer_ack(ctx, peer);
                } else {
                    debug!("versus: ack in single-player ignored");
                }
            }
            VersusPacket::Abort => {
                if self.session.is_open() {
                    info!("versus: peer aborted");
                    self.session.close();
                    ctx.back_to_menu();
                } else {
                    debug!("versus: abort outside a session ignored");
                }
            }
        }
    }
}
