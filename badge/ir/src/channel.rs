//! Broadcast/priority channel

use heapless::Deque;
use log::{debug, trace, warn};

use badge_core::{Message, PacketSink};

use crate::config::{IrConfig, GAME_QUEUE_LEN};
use crate::dispatch::IrDispatch;
use crate::frame::{show_frame, FrameBuf, IrFrame, PacketType};
use crate::transport::IrTransport;

/// What one broadcast attempt did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastOutcome {
    /// The pending priority message went out
    Priority,
    /// A queued game frame went out
    Game,
    /// The default broadcast went out
    Beacon,
    /// Something was waiting but the link refused it
    Busy,
    /// Nothing to send
    Idle,
}

/// Link counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IrStats {
    pub received: u32,
    pub rejected: u32,
    pub sent: u32,
    pub dropped: u32,
}

/// A received frame together with the subscriber that handles its type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery<'a, S> {
    pub subscriber: S,
    pub frame: IrFrame<'a>,
}

/// The shared IR link.
///
/// Outgoing traffic is arbitrated on every [`broadcast`](Self::broadcast):
/// the single priority slot first, then queued game frames, then the
/// default broadcast unless it is suppressed.
pub struct IrChannel<T, S> {
    transport: T,
    config: IrConfig,
    priority: Option<FrameBuf>,
    game: Deque<FrameBuf, GAME_QUEUE_LEN>,
    suppressed: bool,
    dispatch: IrDispatch<S>,
    stats: IrStats,
}

impl<T: IrTransport, S: Copy> IrChannel<T, S> {
    pub fn new(transport: T, config: IrConfig) -> Self {
        Self {
            transport,
            config,
            priority: None,
            game: Deque::new(),
            suppressed: false,
            dispatch: IrDispatch::new(),
            stats: IrStats::default(),
        }
    }

    pub fn config(&self) -> &IrConfig {
        &self.config
    }

    pub fn stats(&self) -> IrStats {
        self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Route received frames of `kind` to `subscriber`
    pub fn subscribe(&mut self, kind: PacketType, subscriber: S) -> Option<S> {
        self.dispatch.subscribe(kind, subscriber)
    }

    pub fn dispatch(&self) -> &IrDispatch<S> {
        &self.dispatch
    }

    /// Store `frame` in the priority slot, replacing any message not yet
    /// sent, and try to send it right away.
    ///
    /// Returns `true` only if the frame went out during this call.
    pub fn send_priority(&mut self, frame: &[u8]) -> bool {
        let stored = match FrameBuf::from_slice(frame) {
            Ok(stored) => stored,
            Err(()) => {
                warn!("priority frame of {} bytes too long", frame.len());
                return false;
            }
        };
        if self.priority.replace(stored).is_some() {
            debug!("unsent priority frame overwritten");
        }
        self.try_send_priority()
    }

    /// Announce `message` to nearby badges as a priority message
    pub fn send_show(&mut self, message: &Message) -> bool {
        let frame = show_frame(self.config.ttl, message);
        self.send_priority(&frame)
    }

    pub fn has_priority_pending(&self) -> bool {
        self.priority.is_some()
    }

    /// Queue one point-to-point packet. Sent immediately when nothing is
    /// ahead of it, otherwise by later broadcasts in FIFO order.
    ///
    /// Returns `false` if the packet was dropped.
    pub fn queue_game(&mut self, packet: &[u8]) -> bool {
        let frame = match IrFrame::new(self.config.ttl, PacketType::Game, packet).encode() {
            Ok(frame) => frame,
            Err(err) => {
                warn!("game packet of {} bytes dropped: {}", packet.len(), err);
                self.stats.dropped = self.stats.dropped.wrapping_add(1);
                return false;
            }
        };

        if self.priority.is_none() && self.game.is_empty() && self.transmit(&frame) {
            return true;
        }
        match self.game.push_back(frame) {
            Ok(()) => true,
            Err(_) => {
                warn!("game queue full, packet dropped");
                self.stats.dropped = self.stats.dropped.wrapping_add(1);
                false
            }
        }
    }

    pub fn queued_game_frames(&self) -> usize {
        self.game.len()
    }

    /// Turn the default broadcast off or back on. Priority messages and
    /// game frames are not affected.
    pub fn set_broadcast_suppressed(&mut self, suppressed: bool) {
        if self.suppressed != suppressed {
            debug!("broadcast suppressed: {}", suppressed);
        }
        self.suppressed = suppressed;
    }

    pub fn is_broadcast_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Body of the periodic broadcast task: send at most one frame.
    pub fn broadcast(&mut self) -> BroadcastOutcome {
        if self.priority.is_some() {
            return if self.try_send_priority() {
                BroadcastOutcome::Priority
            } else {
                BroadcastOutcome::Busy
            };
        }

        if let Some(frame) = self.game.front().cloned() {
            return if self.transmit(&frame) {
                self.game.pop_front();
                BroadcastOutcome::Game
            } else {
                BroadcastOutcome::Busy
            };
        }

        if self.suppressed {
            return BroadcastOutcome::Idle;
        }
        match self.config.beacon.clone() {
            Some(beacon) if self.transmit(&beacon) => BroadcastOutcome::Beacon,
            Some(_) => BroadcastOutcome::Busy,
            None => BroadcastOutcome::Idle,
        }
    }

    /// Decode a received frame and find its subscriber.
    ///
    /// Every call is counted. Malformed frames and frames of a type nobody
    /// subscribed to are dropped and yield `None`.
    pub fn on_packet_received<'a>(&mut self, bytes: &'a [u8]) -> Option<Delivery<'a, S>> {
        self.stats.received = self.stats.received.wrapping_add(1);

        let frame = match IrFrame::decode(bytes) {
            Ok(frame) => frame,
            Err(err) => {
                debug!("rx dropped: {}", err);
                self.stats.rejected = self.stats.rejected.wrapping_add(1);
                return None;
            }
        };
        match self.dispatch.route(frame.kind) {
            Some(subscriber) => Some(Delivery { subscriber, frame }),
            None => {
                debug!("rx {} frame has no subscriber", frame.kind);
                None
            }
        }
    }

    fn try_send_priority(&mut self) -> bool {
        let sent = match &self.priority {
            Some(frame) => {
                let frame = frame.clone();
                self.transmit(&frame)
            }
            None => false,
        };
        if sent {
            self.priority = None;
        }
        sent
    }

    fn transmit(&mut self, frame: &[u8]) -> bool {
        match self.transport.try_send(frame) {
            Ok(()) => {
                trace!("tx {} bytes", frame.len());
                self.stats.sent = self.stats.sent.wrapping_add(1);
                true
            }
            Err(nb::Error::WouldBlock) => false,
            Err(nb::Error::Other(err)) => {
                debug!("tx failed: {:?}", err);
                false
            }
        }
    }
}

impl<T: IrTransport, S: Copy> PacketSink for IrChannel<T, S> {
    fn send(&mut self, packet: &[u8]) -> bool {
        self.queue_game(packet)
    }
}
