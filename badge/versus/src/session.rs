//! Per-game protocol state

use badge_app::PlayerCount;

/// Protocol bookkeeping for one game, separate from the game itself.
///
/// A session opens when the versus application is entered and closes on
/// abort. It stays open after a game over so that an acknowledgment
/// arriving while the score is on screen is still reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    players: PlayerCount,
    open: bool,
    over_handled: bool,
    saved_nonce: Option<u16>,
    reported: Option<u16>,
}

impl Session {
    pub const fn closed(players: PlayerCount) -> Self {
        Self {
            players,
            open: false,
            over_handled: false,
            saved_nonce: None,
            reported: None,
        }
    }

    /// Fresh session; any nonce from an earlier game is forgotten
    pub const fn open(players: PlayerCount) -> Self {
        Self {
            open: true,
            ..Self::closed(players)
        }
    }

    pub fn players(&self) -> PlayerCount {
        self.players
    }

    pub fn is_multi(&self) -> bool {
        self.players == PlayerCount::Multi
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Marks game-over handling as done. Returns `true` the first time.
    pub fn begin_game_over(&mut self) -> bool {
        !core::mem::replace(&mut self.over_handled, true)
    }

    pub fn saved_nonce(&self) -> Option<u16> {
        self.saved_nonce
    }

    pub fn remember_nonce(&mut self, nonce: u16) {
        self.saved_nonce = Some(nonce);
    }

    /// Consume the saved nonce if `nonce` matches it
    pub fn accept_ack(&mut self, nonce: u16) -> bool {
        if self.saved_nonce == Some(nonce) {
            self.saved_nonce = None;
            true
        } else {
            false
        }
    }

    /// Whether a two-party report for `nonce` is still due. Returns `true`
    /// once per nonce.
    pub fn claim_report(&mut self, nonce: u16) -> bool {
        if self.reported == Some(nonce) {
            return false;
        }
        self.reported = Some(nonce);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_nonce_consumed() {
        let mut session = Session::open(PlayerCount::Multi);
        session.remember_nonce(0x1234);
        assert!(!session.accept_ack(0x5678));
        assert!(session.accept_ack(0x1234));
        assert!(!session.accept_ack(0x1234));
    }

    #[test]
    fn test_game_over_once() {
        let mut session = Session::open(PlayerCount::Single);
        assert!(session.begin_game_over());
        assert!(!session.begin_game_over());
        assert!(!session.is_multi());
    }

    #[test]
    fn test_report_claimed_once() {
        let mut session = Session::open(PlayerCount::Multi);
        assert!(session.claim_report(7));
        assert!(!session.claim_report(7));
        assert!(session.claim_report(8));
    }

    #[test]
    fn test_reopen_forgets_nonce() {
        let mut session = Session::open(PlayerCount::Multi);
        session.remember_nonce(1);
        session.close();
        assert!(!session.is_open());
        let session = Session::open(session.players());
        assert_eq!(session.saved_nonce(), None);
        assert!(session.is_open());
    }
}
