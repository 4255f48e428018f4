use copas_core::model::node::NodeId;
use copas_proto::Message;
use tracing::{debug, error};

/// Tracks the locally inferred token bearer. The token is the sole
/// authorization to originate PASS_CARDS or PLAY_CARD; it moves in a
/// TOKEN_PASS unicast whose payload names the new bearer.
#[derive(Debug)]
pub struct TokenArbiter {
    me: NodeId,
    bearer: Option<NodeId>,
}

impl TokenArbiter {
    pub fn new(me: NodeId) -> Self {
        Self { me, bearer: None }
    }

    pub fn holds(&self) -> bool {
        self.bearer == Some(self.me)
    }

    pub fn bearer(&self) -> Option<NodeId> {
        self.bearer
    }

    /// A TOKEN_PASS frame addressed here was processed.
    pub fn observe_grant(&mut self, bearer: NodeId) {
        debug!(me = %self.me, %bearer, "token observed");
        self.bearer = Some(bearer);
    }

    /// Hand the token to `next`, producing the TOKEN_PASS to emit. Refuses
    /// (returning `None`) when this node does not bear the token; that is
    /// a programming error, not a protocol error.
    pub fn release_to(&mut self, next: NodeId) -> Option<Message> {
        if !self.holds() {
            error!(me = %self.me, %next, "refusing token release without the token");
            return None;
        }
        debug!(me = %self.me, %next, "token released");
        self.bearer = Some(next);
        Some(Message::TokenPass { bearer: next })
    }

    /// Coordinator-only self-assignment, used where the sweep has stopped:
    /// at the start of the pass phase ("M0 passes the token to M0") and at
    /// barrier/trick boundaries before the coordinator re-seeds the ring.
    pub fn seize(&mut self) {
        debug_assert!(self.me.is_coordinator());
        debug!(me = %self.me, "token seized");
        self.bearer = Some(self.me);
    }

    /// Forget the inferred bearer, at hand boundaries and after a trick
    /// closes (the fourth player's claim is stale once the coordinator
    /// re-seeds the token).
    pub fn clear(&mut self) {
        self.bearer = None;
    }
}
