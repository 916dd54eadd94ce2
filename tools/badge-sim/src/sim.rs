//! Two badges in lock step over a lossy link.

use std::cell::RefCell;
use std::rc::Rc;

use badge_core::{
    ActivityKind, BadgeError, Button, Display, Duration, FrameBuffer, Instant, NvMirror,
    RandomSource, Scoring, SingleActivity, Storage, TwoPartyActivity, Username,
};
use badge_ir::{IrStats, IrTransport};
use badge_runtime::{Badge, BadgeConfig, ServiceSet};
use log::{debug, info, trace};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::config::{ConfigError, SimConfig};
use crate::toy::ToyEngine;

/// Routine polls a scroll needs before it counts as shown once
const SCROLL_POLLS: u32 = 12;

/// Time left for acks to cross after both badges reach the score screen
const SETTLE_GRACE_MS: u64 = 1_000;

const TOY_FALL_MS: u32 = 300;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("badge setup failed: {0}")]
    Badge(#[from] BadgeError),
}

#[derive(Default)]
struct ConsoleLog {
    scrolled: Vec<String>,
    polls: u32,
}

/// Display that logs instead of lighting LEDs
#[derive(Clone)]
struct Console {
    name: Rc<str>,
    log: Rc<RefCell<ConsoleLog>>,
}

impl Display for Console {
    fn show_frame(&mut self, frame: &FrameBuffer) {
        trace!("[{}] frame {:02x?}", self.name, frame);
    }

    fn scroll_text(&mut self, text: &str) {
        info!("[{}] scroll \"{}\"", self.name, text);
        let mut log = self.log.borrow_mut();
        log.scrolled.push(text.to_string());
        log.polls = 0;
    }

    fn scroll_completed(&self) -> bool {
        let mut log = self.log.borrow_mut();
        log.polls += 1;
        log.polls >= SCROLL_POLLS
    }
}

struct Memory(NvMirror);

impl Storage for Memory {
    fn mirror(&self) -> &NvMirror {
        &self.0
    }

    fn mirror_mut(&mut self) -> &mut NvMirror {
        &mut self.0
    }

    fn mark_dirty(&mut self) {
        debug!("best scores now {:?}", self.0.best_scores);
    }
}

#[derive(Clone)]
struct Ledger {
    name: Rc<str>,
    reports: Rc<RefCell<Vec<TwoPartyActivity>>>,
}

impl Scoring for Ledger {
    fn report_single(&mut self, activity: SingleActivity) -> bool {
        info!("[{}] single report {:?}", self.name, activity);
        true
    }

    fn report_two_party(&mut self, activity: TwoPartyActivity) -> bool {
        info!(
            "[{}] two-party report: {} vs {} ({}) nonce {:#06x}",
            self.name, activity.my_score, activity.other_score, activity.other_user, activity.nonce
        );
        self.reports.borrow_mut().push(activity);
        true
    }
}

struct Dice(SmallRng);

impl RandomSource for Dice {
    fn next_u32(&mut self) -> u32 {
        self.0.gen()
    }
}

/// Transmitter that parks frames until the link carries them
#[derive(Clone, Default)]
struct Radio(Rc<RefCell<Vec<Vec<u8>>>>);

impl Radio {
    fn drain(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

impl IrTransport for Radio {
    type Error = core::convert::Infallible;

    fn try_send(&mut self, frame: &[u8]) -> nb::Result<(), Self::Error> {
        self.0.borrow_mut().push(frame.to_vec());
        Ok(())
    }
}

/// The shared medium between the badges
struct Air {
    rng: SmallRng,
    drop_rate: f64,
    carried: u64,
    lost: u64,
}

impl Air {
    fn survives(&mut self) -> bool {
        if self.drop_rate > 0.0 && self.rng.gen_bool(self.drop_rate) {
            self.lost += 1;
            false
        } else {
            self.carried += 1;
            true
        }
    }
}

struct Node {
    name: Rc<str>,
    badge: Badge<Radio>,
    radio: Radio,
    console: Rc<RefCell<ConsoleLog>>,
    reports: Rc<RefCell<Vec<TwoPartyActivity>>>,
}

impl Node {
    fn new(name: &str, seed: u64) -> Result<Self, SimError> {
        let name: Rc<str> = Rc::from(name);
        let radio = Radio::default();
        let console = Rc::new(RefCell::new(ConsoleLog::default()));
        let reports = Rc::new(RefCell::new(Vec::new()));

        let mut mirror = NvMirror::default();
        mirror.username = Username::new(&name);
        let services = ServiceSet::new(
            Box::new(Console {
                name: name.clone(),
                log: console.clone(),
            }),
            Box::new(Memory(mirror)),
            Box::new(Ledger {
                name: name.clone(),
                reports: reports.clone(),
            }),
            Box::new(Dice(SmallRng::seed_from_u64(seed))),
        );

        let engine = ToyEngine::new(Duration::from_millis(TOY_FALL_MS));
        let mut badge = Badge::builder(BadgeConfig::default(), radio.clone(), services)
            .versus(engine)
            .build()?;
        badge.start(Instant::ZERO)?;

        Ok(Self {
            name,
            badge,
            radio,
            console,
            reports,
        })
    }

    fn summary(&self) -> BadgeSummary {
        let storage = self.badge.services().storage();
        BadgeSummary {
            name: self.name.to_string(),
            best_score: storage.mirror().best_score(ActivityKind::STACKER),
            final_app: self
                .badge
                .current_app()
                .and_then(|id| self.badge.controller().app_name(id)),
            scrolled: self.console.borrow().scrolled.clone(),
            reports: self.reports.borrow().clone(),
            stats: self.badge.ir().stats(),
        }
    }
}

/// What one badge saw during a run
#[derive(Debug, Clone)]
pub struct BadgeSummary {
    pub name: String,
    pub best_score: Option<u16>,
    pub final_app: Option<&'static str>,
    pub scrolled: Vec<String>,
    pub reports: Vec<TwoPartyActivity>,
    pub stats: IrStats,
}

/// Outcome of a run
#[derive(Debug, Clone)]
pub struct Summary {
    pub elapsed_ms: u64,
    /// Both badges reached the score screen
    pub settled: bool,
    pub carried: u64,
    pub lost: u64,
    pub badges: Vec<BadgeSummary>,
}

impl Summary {
    /// True when each badge reported the other's score and name.
    ///
    /// Nonces may differ: when both top out in the same step each side
    /// reports under the nonce the peer generated.
    pub fn agreed(&self) -> bool {
        match self.badges.as_slice() {
            [a, b] => a.reports.iter().any(|ra| {
                b.reports.iter().any(|rb| {
                    ra.my_score == rb.other_score
                        && rb.my_score == ra.other_score
                        && ra.other_user.as_str() == b.name
                        && rb.other_user.as_str() == a.name
                })
            }),
            _ => false,
        }
    }
}

pub struct Simulation {
    nodes: Vec<Node>,
    air: Air,
    script: Vec<(u64, usize, Button)>,
    tick_ms: u64,
    duration_ms: u64,
}

impl Simulation {
    pub fn new(config: &SimConfig) -> Result<Self, SimError> {
        config.validate()?;

        let mut nodes = Vec::with_capacity(config.players.len());
        let mut script = Vec::new();
        for (index, player) in config.players.iter().enumerate() {
            let seed = config.seed.wrapping_add(index as u64 + 1);
            nodes.push(Node::new(&player.name, seed)?);
            // menu: Solo, Versus
            script.push((0, index, Button::Down));
            script.push((0, index, Button::Ok));
            script.push((player.start_at_ms, index, Button::Ok));
        }
        if let Some(at) = config.surprise_at_ms {
            script.push((at, 0, Button::LongMode));
        }
        script.sort_by_key(|&(at, _, _)| at);

        Ok(Self {
            nodes,
            air: Air {
                rng: SmallRng::seed_from_u64(config.seed),
                drop_rate: config.drop_rate,
                carried: 0,
                lost: 0,
            },
            script,
            tick_ms: config.tick_ms,
            duration_ms: config.duration_ms,
        })
    }

    pub fn run(mut self) -> Summary {
        let mut script = std::mem::take(&mut self.script).into_iter().peekable();
        let mut settled_at = None;
        let mut now_ms = 0;

        while now_ms <= self.duration_ms {
            let now = Instant::from_millis(now_ms);

            while let Some(&(_, index, button)) = script.peek().filter(|&&(at, _, _)| at <= now_ms) {
                debug!("[{}] press {}", self.nodes[index].name, button);
                self.nodes[index].badge.press(now, button);
                script.next();
            }

            for node in &mut self.nodes {
                node.badge.tick(now);
            }
            self.exchange(now);

            if settled_at.is_none() && self.at_score_screen() {
                info!("both badges on the score screen at {} ms", now_ms);
                settled_at = Some(now_ms);
            }
            if settled_at.is_some_and(|at| now_ms >= at + SETTLE_GRACE_MS) {
                break;
            }
            now_ms += self.tick_ms;
        }

        Summary {
            elapsed_ms: now_ms.min(self.duration_ms),
            settled: settled_at.is_some(),
            carried: self.air.carried,
            lost: self.air.lost,
            badges: self.nodes.iter().map(Node::summary).collect(),
        }
    }

    /// Move every parked frame to every other badge, or lose it
    fn exchange(&mut self, now: Instant) {
        for from in 0..self.nodes.len() {
            for frame in self.nodes[from].radio.drain() {
                for to in (0..self.nodes.len()).filter(|&to| to != from) {
                    if self.air.survives() {
                        self.nodes[to].badge.on_frame_received(now, &frame);
                    } else {
                        debug!("{} -> {}: frame lost", self.nodes[from].name, self.nodes[to].name);
                    }
                }
            }
        }
    }

    fn at_score_screen(&self) -> bool {
        self.nodes
            .iter()
            .all(|node| node.badge.current_app() == Some(badge_app::AppId::SCORE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_link_settles_and_agrees() {
        let summary = Simulation::new(&SimConfig::default()).unwrap().run();
        assert!(summary.settled);
        assert_eq!(summary.lost, 0);
        assert!(summary.agreed());
        for badge in &summary.badges {
            assert_eq!(badge.reports.len(), 1);
            assert_eq!(badge.final_app, Some("score"));
        }
        assert_eq!(summary.badges[0].reports[0].other_user.as_str(), "bob");
        assert_eq!(summary.badges[1].reports[0].other_user.as_str(), "alice");
    }

    #[test]
    fn test_same_seed_same_run() {
        let config = SimConfig {
            drop_rate: 0.2,
            ..SimConfig::default()
        };
        let first = Simulation::new(&config).unwrap().run();
        let second = Simulation::new(&config).unwrap().run();
        assert_eq!(first.elapsed_ms, second.elapsed_ms);
        assert_eq!(first.lost, second.lost);
        assert_eq!(first.badges[0].reports, second.badges[0].reports);
    }

    #[test]
    fn test_reports_at_most_once_on_lossy_link() {
        let config = SimConfig {
            drop_rate: 0.4,
            seed: 99,
            ..SimConfig::default()
        };
        let summary = Simulation::new(&config).unwrap().run();
        for badge in &summary.badges {
            assert!(badge.reports.len() <= 1);
        }
    }

    #[test]
    fn test_surprise_reaches_peer() {
        let config = SimConfig {
            surprise_at_ms: Some(20),
            duration_ms: 500,
            ..SimConfig::default()
        };
        let summary = Simulation::new(&config).unwrap().run();
        assert!(summary.badges[1]
            .scrolled
            .iter()
            .any(|text| text == badge_runtime::SURPRISE_TEXT));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SimConfig {
            tick_ms: 0,
            ..SimConfig::default()
        };
        assert!(matches!(Simulation::new(&config), Err(SimError::Config(_))));
    }
}
