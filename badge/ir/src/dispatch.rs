//! Type-tag dispatch of received frames

use log::debug;

use crate::frame::PacketType;

/// One subscriber per packet type.
///
/// The subscriber is a plain token chosen by the owner of the channel,
/// typically an enum naming the component that handles the type. The table
/// only answers "who handles this type"; the owner routes the frame.
#[derive(Debug, Clone)]
pub struct IrDispatch<S> {
    routes: [Option<S>; PacketType::ALL.len()],
}

impl<S: Copy> IrDispatch<S> {
    pub const fn new() -> Self {
        Self {
            routes: [None; PacketType::ALL.len()],
        }
    }

    /// Route `kind` to `subscriber`, returning the one it replaces
    pub fn subscribe(&mut self, kind: PacketType, subscriber: S) -> Option<S> {
        self.routes[Self::slot(kind)].replace(subscriber)
    }

    pub fn unsubscribe(&mut self, kind: PacketType) -> Option<S> {
        debug!("unsubscribe {}", kind);
        self.routes[Self::slot(kind)].take()
    }

    pub fn route(&self, kind: PacketType) -> Option<S> {
        self.routes[Self::slot(kind)]
    }

    const fn slot(kind: PacketType) -> usize {
        kind.tag() as usize - 1
    }
}

impl<S: Copy> Default for IrDispatch<S> {
    fn default() -> Self {
        Self::new()
    }
}
