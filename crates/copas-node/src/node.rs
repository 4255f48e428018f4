use crate::coordinator::Coordinator;
use crate::token::TokenArbiter;
use copas_bot::{PassView, PlayView, Strategy};
use copas_core::model::card::Card;
use copas_core::model::direction::PassDirection;
use copas_core::model::hand::Hand;
use copas_core::model::node::NodeId;
use copas_core::model::score::ScoreBoard;
use copas_core::model::trick::Trick;
use copas_core::rules::{fallback_card, legal_plays};
use copas_proto::{Dest, Frame, Header, Message, MsgKind, StartPhase};
use std::collections::VecDeque;
use tracing::{debug, error, info, trace, warn};

const TRICKS_PER_HAND: u8 = 13;

/// Where a peer stands in the hand lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Dealing,
    Passing,
    PassingBarrier,
    Playing,
    HandSummary,
    GameOver,
}

#[derive(Debug, Clone, Copy)]
pub struct NodeSettings {
    pub score_limit: u16,
    pub seed: Option<u64>,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            score_limit: 100,
            seed: None,
        }
    }
}

/// One peer's protocol engine. The engine is I/O-free: the runtime feeds it
/// delivered frames and lap-complete signals, and it answers with the
/// frames to originate. All state mutation happens on those two entry
/// points, which is what keeps the peer single-threaded by construction.
pub struct Node {
    id: NodeId,
    phase: Phase,
    hand: Hand,
    direction: PassDirection,
    hearts_broken: bool,
    trick: Trick,
    tricks_completed: u8,
    scores: ScoreBoard,
    token: TokenArbiter,
    seq: u8,
    strategy: Box<dyn Strategy>,
    incoming_pass: Option<[Card; 3]>,
    pass_sent: bool,
    pass_lap_seen: bool,
    merged: bool,
    score_limit: u16,
    coordinator: Option<Coordinator>,
    inflight_phase: VecDeque<StartPhase>,
    finished: bool,
}

impl Node {
    pub fn new(id: NodeId, strategy: Box<dyn Strategy>, settings: NodeSettings) -> Self {
        let coordinator = id
            .is_coordinator()
            .then(|| Coordinator::new(settings.seed));
        Self {
            id,
            phase: Phase::Idle,
            hand: Hand::new(),
            direction: PassDirection::Hold,
            hearts_broken: false,
            trick: Trick::new(),
            tricks_completed: 0,
            scores: ScoreBoard::new(),
            token: TokenArbiter::new(id),
            seq: 0,
            strategy,
            incoming_pass: None,
            pass_sent: false,
            pass_lap_seen: false,
            merged: false,
            score_limit: settings.score_limit,
            coordinator,
            inflight_phase: VecDeque::new(),
            finished: false,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn hearts_broken(&self) -> bool {
        self.hearts_broken
    }

    pub fn tricks_completed(&self) -> u8 {
        self.tricks_completed
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn coordinator_mut(&mut self) -> Option<&mut Coordinator> {
        self.coordinator.as_mut()
    }

    /// Coordinator kick-off: broadcast GAME_START for the first hand.
    pub fn start(&mut self) -> Vec<Frame> {
        let mut out = Vec::new();
        if !self.id.is_coordinator() {
            warn!(id = %self.id, "only the coordinator starts the game");
            return out;
        }
        info!(id = %self.id, "starting game");
        out.push(self.frame(Dest::Broadcast, Message::GameStart));
        self.begin_hand();
        out
    }

    /// A frame addressed to this node (or tapped by the coordinator).
    pub fn handle(&mut self, header: Header, message: Message) -> Vec<Frame> {
        let mut out = Vec::new();
        trace!(id = %self.id, kind = %header.kind, origin = %header.origin, "processing");
        match message {
            Message::GameStart => self.on_game_start(),
            Message::TokenPass { bearer } => self.on_token(bearer, &mut out),
            Message::DealHand { cards } => self.on_deal(cards),
            Message::StartPhase(StartPhase::Passing(direction)) => {
                self.on_start_pass_phase(direction)
            }
            Message::StartPhase(StartPhase::Playing) => self.on_start_play_phase(),
            Message::PassCards { cards } => self.on_pass_cards(header, cards, &mut out),
            Message::PlayCard { card } => self.on_play_card(header.origin, card, &mut out),
            Message::TrickSummary {
                winner,
                plays,
                points,
            } => self.on_trick_summary(winner, &plays, points),
            Message::HandSummary {
                hand_scores,
                totals,
                shooter,
            } => self.on_hand_summary(hand_scores, totals, shooter),
            Message::GameOver { winner, totals } => self.on_game_over(winner, totals),
        }
        out
    }

    /// One of this node's own frames finished its lap around the ring.
    pub fn handle_lap(&mut self, header: Header) -> Vec<Frame> {
        let mut out = Vec::new();
        trace!(id = %self.id, kind = %header.kind, seq = header.seq, "lap complete");
        match header.kind {
            MsgKind::GameStart => self.on_game_start_lap(&mut out),
            MsgKind::StartPhase => self.on_start_phase_lap(&mut out),
            MsgKind::PassCards => self.on_pass_cards_lap(&mut out),
            MsgKind::HandSummary => self.on_hand_summary_lap(&mut out),
            MsgKind::GameOver => {
                info!(id = %self.id, "game over broadcast completed the ring");
                self.finished = true;
            }
            // Delivery confirmations with no follow-up action.
            MsgKind::TokenPass
            | MsgKind::DealHand
            | MsgKind::PlayCard
            | MsgKind::TrickSummary => {}
        }
        out
    }

    // ---- inbound handlers ----------------------------------------------

    fn on_game_start(&mut self) {
        match self.phase {
            Phase::Idle | Phase::HandSummary => {
                info!(id = %self.id, "hand starting");
                self.begin_hand();
            }
            phase => warn!(id = %self.id, ?phase, "dropping out-of-phase GAME_START"),
        }
    }

    fn on_token(&mut self, bearer: NodeId, out: &mut Vec<Frame>) {
        if bearer != self.id {
            warn!(id = %self.id, %bearer, "TOKEN_PASS delivered here but names another bearer");
            self.token.observe_grant(bearer);
            return;
        }
        self.token.observe_grant(bearer);
        self.act_on_token(out);
    }

    fn on_deal(&mut self, cards: Vec<Card>) {
        if self.phase != Phase::Dealing {
            warn!(id = %self.id, phase = ?self.phase, "dropping out-of-phase DEAL_HAND");
            return;
        }
        self.hand = Hand::with_cards(cards);
        info!(id = %self.id, cards = self.hand.len(), "hand received");
    }

    fn on_start_pass_phase(&mut self, direction: PassDirection) {
        if self.phase != Phase::Dealing {
            warn!(id = %self.id, phase = ?self.phase, "dropping out-of-phase START_PHASE");
            return;
        }
        self.direction = direction;
        if direction.requires_pass() {
            info!(id = %self.id, %direction, "pass phase started");
            self.phase = Phase::Passing;
        } else {
            // Hold hand: nothing to exchange, wait for the tricks phase.
            info!(id = %self.id, "hold hand, no pass");
            self.phase = Phase::PassingBarrier;
        }
    }

    fn on_start_play_phase(&mut self) {
        match self.phase {
            Phase::Passing | Phase::PassingBarrier => {}
            phase => {
                warn!(id = %self.id, ?phase, "dropping out-of-phase START_PHASE");
                return;
            }
        }
        if self.direction.requires_pass() && !self.merged {
            warn!(id = %self.id, "tricks phase started before the pass barrier completed");
            if let Some(cards) = self.incoming_pass.take() {
                for card in cards {
                    self.hand.add(card);
                }
                self.merged = true;
            }
        }
        info!(id = %self.id, "tricks phase started");
        self.phase = Phase::Playing;
        self.trick.clear();
        self.tricks_completed = 0;
    }

    fn on_pass_cards(&mut self, header: Header, cards: [Card; 3], out: &mut Vec<Frame>) {
        // Coordinator tap: track the cards and the barrier regardless of
        // the destination.
        let mut barrier_complete = false;
        if let Some(coordinator) = self.coordinator.as_mut() {
            if let Dest::Node(dest) = header.dest {
                coordinator.note_pass(header.origin, dest, &cards);
            }
            barrier_complete = coordinator.mark_pass_seen(header.origin);
            debug!(id = %self.id, origin = %header.origin, "pass observed by coordinator");
        }

        if header.dest.is_for(self.id) {
            self.receive_pass(header.origin, cards);
        }

        if barrier_complete {
            self.start_playing(out);
        }
    }

    fn receive_pass(&mut self, origin: NodeId, cards: [Card; 3]) {
        match self.phase {
            Phase::Passing | Phase::PassingBarrier => {}
            phase => {
                warn!(id = %self.id, ?phase, "dropping out-of-phase PASS_CARDS");
                return;
            }
        }
        if self.incoming_pass.is_some() {
            warn!(id = %self.id, %origin, "dropping second incoming pass");
            return;
        }
        info!(id = %self.id, %origin, "received 3 passed cards");
        self.incoming_pass = Some(cards);
        if self.phase == Phase::Passing {
            self.phase = Phase::PassingBarrier;
        }
        self.maybe_merge();
    }

    fn on_play_card(&mut self, origin: NodeId, card: Card, out: &mut Vec<Frame>) {
        if self.phase != Phase::Playing {
            warn!(id = %self.id, phase = ?self.phase, "dropping out-of-phase PLAY_CARD");
            return;
        }
        info!(id = %self.id, %origin, %card, "play observed");
        self.apply_play(origin, card);
        if self.trick.is_complete() && self.coordinator.is_some() {
            self.resolve_trick(out);
        }
    }

    fn on_trick_summary(&mut self, winner: NodeId, plays: &[(NodeId, Card); 4], points: u8) {
        if self.phase != Phase::Playing {
            warn!(id = %self.id, phase = ?self.phase, "dropping out-of-phase TRICK_SUMMARY");
            return;
        }

        // The local view should agree with the coordinator; divergence is
        // logged and the summary wins.
        let local: Vec<(NodeId, Card)> = self
            .trick
            .plays()
            .iter()
            .map(|play| (play.node, play.card))
            .collect();
        if local.as_slice() != plays.as_slice() {
            warn!(id = %self.id, ?local, ?plays, "trick summary diverges from local trick");
        } else {
            if self.trick.winner() != Some(winner) {
                warn!(id = %self.id, %winner, "trick summary winner diverges");
            }
            if self.trick.points() != points {
                warn!(id = %self.id, points, "trick summary points diverge");
            }
        }

        info!(id = %self.id, %winner, points, "trick resolved");
        self.scores.add_trick(winner, points);
        self.trick.clear();
        self.tricks_completed += 1;
        // The fourth player still believes it bears the token; the
        // coordinator owns it from here.
        self.token.clear();
    }

    fn on_hand_summary(&mut self, hand_scores: [u8; 4], totals: [u8; 4], shooter: Option<NodeId>) {
        if self.phase != Phase::Playing {
            warn!(id = %self.id, phase = ?self.phase, "dropping out-of-phase HAND_SUMMARY");
            return;
        }

        let local = {
            let mut copy = self.scores;
            copy.finish_hand()
        };
        if local.hand_scores != hand_scores {
            warn!(
                id = %self.id,
                local = ?local.hand_scores,
                summary = ?hand_scores,
                "hand summary diverges from local scores"
            );
        }

        match shooter {
            Some(shooter) => info!(id = %self.id, %shooter, "shot the moon"),
            None => debug!(id = %self.id, "no shooter"),
        }
        info!(id = %self.id, ?hand_scores, ?totals, "hand complete");
        self.scores.adopt_summary(totals);
        self.phase = Phase::HandSummary;
    }

    fn on_game_over(&mut self, winner: NodeId, totals: [u8; 4]) {
        if self.phase != Phase::HandSummary {
            warn!(id = %self.id, phase = ?self.phase, "dropping out-of-phase GAME_OVER");
            return;
        }
        info!(id = %self.id, %winner, ?totals, "game over");
        self.phase = Phase::GameOver;
        self.finished = true;
    }

    // ---- lap handlers (own frames back from the ring) ------------------

    fn on_game_start_lap(&mut self, out: &mut Vec<Frame>) {
        let Some(coordinator) = self.coordinator.as_mut() else {
            return;
        };
        let hands = coordinator.deal();
        let direction = coordinator.direction();
        info!(id = %self.id, %direction, "dealing");

        for node in NodeId::RING {
            let cards = hands[node.index()].clone();
            if node == self.id {
                self.hand = Hand::with_cards(cards.clone());
            }
            out.push(self.frame(Dest::Node(node), Message::DealHand { cards }));
        }

        out.push(self.frame(
            Dest::Broadcast,
            Message::StartPhase(StartPhase::Passing(direction)),
        ));
        self.inflight_phase
            .push_back(StartPhase::Passing(direction));
        self.on_start_pass_phase(direction);

        if direction.requires_pass() {
            // "M0 passes the token to M0": the pass-phase token starts here
            // by self-assignment, no TOKEN_PASS on the wire.
            self.token.seize();
            self.pass_action(out);
        }
    }

    fn on_start_phase_lap(&mut self, out: &mut Vec<Frame>) {
        match self.inflight_phase.pop_front() {
            Some(StartPhase::Passing(direction)) if !direction.requires_pass() => {
                // Hold hand: the deal is confirmed around the ring, go
                // straight to tricks.
                self.start_playing(out);
            }
            Some(_) => {}
            None => warn!(id = %self.id, "START_PHASE lap without a pending phase"),
        }
    }

    fn on_pass_cards_lap(&mut self, out: &mut Vec<Frame>) {
        self.pass_lap_seen = true;
        self.maybe_merge();
        let barrier_complete = self
            .coordinator
            .as_mut()
            .is_some_and(|coordinator| coordinator.mark_pass_seen(self.id));
        if barrier_complete {
            self.start_playing(out);
        }
    }

    fn on_hand_summary_lap(&mut self, out: &mut Vec<Frame>) {
        if self.coordinator.is_none() {
            return;
        }
        if self.scores.reached(self.score_limit) {
            let winner = self.scores.leader();
            let totals = self.scores.totals().map(clamp_total);
            info!(id = %self.id, %winner, ?totals, "score limit reached");
            out.push(self.frame(Dest::Broadcast, Message::GameOver { winner, totals }));
            self.phase = Phase::GameOver;
        } else {
            if let Some(coordinator) = self.coordinator.as_mut() {
                coordinator.advance_hand();
            }
            out.push(self.frame(Dest::Broadcast, Message::GameStart));
            self.begin_hand();
        }
    }

    // ---- actions --------------------------------------------------------

    fn act_on_token(&mut self, out: &mut Vec<Frame>) {
        match self.phase {
            Phase::Passing | Phase::PassingBarrier
                if self.direction.requires_pass() && !self.pass_sent =>
            {
                self.pass_action(out);
            }
            Phase::Playing => self.play_action(out),
            phase => warn!(id = %self.id, ?phase, "token arrived out of phase"),
        }
    }

    fn pass_action(&mut self, out: &mut Vec<Frame>) {
        if !self.token.holds() {
            error!(id = %self.id, "pass attempted without the token");
            return;
        }

        let picks = self.strategy.choose_pass(&PassView {
            hand: &self.hand,
            direction: self.direction,
        });
        let picks = if valid_pass(&self.hand, &picks) {
            picks
        } else {
            warn!(id = %self.id, ?picks, "strategy returned an invalid pass, substituting");
            let cards = self.hand.cards();
            [cards[0], cards[1], cards[2]]
        };

        for card in picks {
            self.hand.remove(card);
        }
        self.pass_sent = true;

        let target = self.direction.target(self.id);
        info!(id = %self.id, %target, "passing 3 cards");
        if let Some(coordinator) = self.coordinator.as_mut() {
            coordinator.note_pass(self.id, target, &picks);
        }
        out.push(self.frame(Dest::Node(target), Message::PassCards { cards: picks }));

        // The pass-phase token sweeps P0 -> P3 and stops; the barrier takes
        // over from there.
        if self.id != NodeId::P3 {
            let next = self.id.successor();
            if let Some(message) = self.token.release_to(next) {
                out.push(self.frame(Dest::Node(next), message));
            }
        }

        self.phase = Phase::PassingBarrier;
        self.maybe_merge();
    }

    fn play_action(&mut self, out: &mut Vec<Frame>) {
        if !self.token.holds() {
            error!(id = %self.id, "play attempted without the token");
            return;
        }
        if self.trick.contains(self.id) {
            error!(id = %self.id, "play attempted twice in one trick");
            return;
        }

        let legal = legal_plays(
            &self.hand,
            &self.trick,
            self.hearts_broken,
            self.tricks_completed == 0,
        );
        let Some(substitute) = fallback_card(&legal) else {
            error!(id = %self.id, "no legal play available");
            return;
        };

        let pick = self.strategy.choose_play(&PlayView {
            hand: &self.hand,
            legal: &legal,
            trick: &self.trick,
            hearts_broken: self.hearts_broken,
        });
        let card = if legal.contains(&pick) {
            pick
        } else {
            warn!(id = %self.id, %pick, %substitute, "strategy returned an illegal card, substituting");
            substitute
        };

        info!(id = %self.id, %card, "playing");
        self.hand.remove(card);
        self.apply_play(self.id, card);
        out.push(self.frame(Dest::Broadcast, Message::PlayCard { card }));

        if self.trick.len() < 4 {
            let next = self.id.successor();
            if let Some(message) = self.token.release_to(next) {
                out.push(self.frame(Dest::Node(next), message));
            }
        }
        // After the fourth play the token stays put until the coordinator
        // re-seeds it toward the trick winner.

        if self.trick.is_complete() && self.coordinator.is_some() {
            self.resolve_trick(out);
        }
    }

    fn apply_play(&mut self, node: NodeId, card: Card) {
        if let Err(err) = self.trick.push(node, card) {
            warn!(id = %self.id, %node, %card, %err, "rejecting play");
            return;
        }
        if card.suit.is_heart() && !self.hearts_broken {
            info!(id = %self.id, "hearts broken");
            self.hearts_broken = true;
        }
    }

    /// Coordinator only: score the completed trick, broadcast the summary
    /// and route the token to the winner (or close the hand).
    fn resolve_trick(&mut self, out: &mut Vec<Frame>) {
        let Some(winner) = self.trick.winner() else {
            error!(id = %self.id, "resolving an incomplete trick");
            return;
        };
        let points = self.trick.points();
        let plays: [(NodeId, Card); 4] = std::array::from_fn(|i| {
            let play = self.trick.plays()[i];
            (play.node, play.card)
        });

        info!(id = %self.id, %winner, points, trick = self.tricks_completed + 1, "trick complete");
        self.scores.add_trick(winner, points);
        out.push(self.frame(
            Dest::Broadcast,
            Message::TrickSummary {
                winner,
                plays,
                points,
            },
        ));
        self.trick.clear();
        self.tricks_completed += 1;

        if self.tricks_completed == TRICKS_PER_HAND {
            let outcome = self.scores.finish_hand();
            let totals = outcome.totals.map(clamp_total);
            info!(
                id = %self.id,
                hand_scores = ?outcome.hand_scores,
                ?totals,
                shooter = ?outcome.shooter,
                "hand scored"
            );
            out.push(self.frame(
                Dest::Broadcast,
                Message::HandSummary {
                    hand_scores: outcome.hand_scores,
                    totals,
                    shooter: outcome.shooter,
                },
            ));
            self.phase = Phase::HandSummary;
        } else {
            self.token.seize();
            if winner == self.id {
                self.play_action(out);
            } else if let Some(message) = self.token.release_to(winner) {
                out.push(self.frame(Dest::Node(winner), message));
            }
        }
    }

    /// Coordinator only: all four passes observed, open the tricks phase
    /// and hand the token to whoever holds 2C now.
    fn start_playing(&mut self, out: &mut Vec<Frame>) {
        let holder = self
            .coordinator
            .as_ref()
            .map_or(NodeId::COORDINATOR, Coordinator::two_clubs_holder);

        out.push(self.frame(Dest::Broadcast, Message::StartPhase(StartPhase::Playing)));
        self.inflight_phase.push_back(StartPhase::Playing);
        self.on_start_play_phase();

        info!(id = %self.id, %holder, "first trick goes to the 2C holder");
        self.token.seize();
        if holder == self.id {
            self.play_action(out);
        } else if let Some(message) = self.token.release_to(holder) {
            out.push(self.frame(Dest::Node(holder), message));
        }
    }

    // ---- plumbing -------------------------------------------------------

    fn begin_hand(&mut self) {
        self.phase = Phase::Dealing;
        self.hand = Hand::new();
        self.hearts_broken = false;
        self.trick.clear();
        self.tricks_completed = 0;
        self.scores.reset_hand();
        self.incoming_pass = None;
        self.pass_sent = false;
        self.pass_lap_seen = false;
        self.merged = false;
        self.token.clear();
    }

    fn maybe_merge(&mut self) {
        if self.merged || !self.direction.requires_pass() {
            return;
        }
        // Barrier: own pass confirmed around the ring and the incoming
        // three cards are here.
        if self.pass_sent && self.pass_lap_seen {
            if let Some(cards) = self.incoming_pass.take() {
                for card in cards {
                    self.hand.add(card);
                }
                self.merged = true;
                info!(id = %self.id, cards = self.hand.len(), "pass barrier complete");
            }
        }
    }

    fn frame(&mut self, dest: Dest, message: Message) -> Frame {
        let header = Header {
            kind: message.kind(),
            origin: self.id,
            dest,
            seq: self.seq,
        };
        self.seq = self.seq.wrapping_add(1);
        Frame::new(header, message.encode_payload())
    }
}

fn valid_pass(hand: &Hand, picks: &[Card; 3]) -> bool {
    picks.iter().all(|card| hand.contains(*card))
        && picks[0] != picks[1]
        && picks[0] != picks[2]
        && picks[1] != picks[2]
}

fn clamp_total(total: u16) -> u8 {
    total.min(u16::from(u8::MAX)) as u8
}

#[cfg(test)]
mod tests {
    use super::{Node, NodeSettings, Phase};
    use copas_bot::AutoStrategy;
    use copas_core::model::card::Card;
    use copas_core::model::node::NodeId;
    use copas_core::model::rank::Rank;
    use copas_core::model::suit::Suit;
    use copas_proto::{Dest, Header, Message, MsgKind};

    fn node(id: NodeId) -> Node {
        Node::new(id, Box::new(AutoStrategy::new()), NodeSettings::default())
    }

    fn header(kind: MsgKind, origin: NodeId, dest: Dest) -> Header {
        Header {
            kind,
            origin,
            dest,
            seq: 0,
        }
    }

    #[test]
    fn only_the_coordinator_starts() {
        let mut p1 = node(NodeId::P1);
        assert!(p1.start().is_empty());

        let mut p0 = node(NodeId::P0);
        let frames = p0.start();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].header.kind, MsgKind::GameStart);
        assert_eq!(p0.phase(), Phase::Dealing);
    }

    #[test]
    fn game_start_resets_into_dealing() {
        let mut p2 = node(NodeId::P2);
        assert_eq!(p2.phase(), Phase::Idle);
        let out = p2.handle(
            header(MsgKind::GameStart, NodeId::P0, Dest::Broadcast),
            Message::GameStart,
        );
        assert!(out.is_empty());
        assert_eq!(p2.phase(), Phase::Dealing);
    }

    #[test]
    fn deal_hand_is_rejected_outside_dealing() {
        let mut p2 = node(NodeId::P2);
        let cards: Vec<Card> = Rank::ALL.iter().map(|&r| Card::new(r, Suit::Clubs)).collect();
        p2.handle(
            header(MsgKind::DealHand, NodeId::P0, Dest::Node(NodeId::P2)),
            Message::DealHand { cards },
        );
        assert!(p2.hand().is_empty(), "idle node must ignore DEAL_HAND");
    }

    #[test]
    fn coordinator_deal_emits_four_unicasts_and_a_phase() {
        let mut p0 = node(NodeId::P0);
        p0.start();
        let out = p0.handle_lap(header(MsgKind::GameStart, NodeId::P0, Dest::Broadcast));
        let kinds: Vec<MsgKind> = out.iter().map(|f| f.header.kind).collect();
        assert_eq!(&kinds[0..4], &[MsgKind::DealHand; 4]);
        assert_eq!(kinds[4], MsgKind::StartPhase);
        // First hand passes left, so P0 passes and releases the token.
        assert!(kinds.contains(&MsgKind::PassCards));
        assert!(kinds.contains(&MsgKind::TokenPass));
        assert_eq!(p0.hand().len(), 10, "own 13 minus the 3 passed");
        assert_eq!(p0.phase(), Phase::PassingBarrier);
    }

    #[test]
    fn token_without_a_role_is_logged_not_actioned() {
        let mut p2 = node(NodeId::P2);
        let out = p2.handle(
            header(MsgKind::TokenPass, NodeId::P1, Dest::Node(NodeId::P2)),
            Message::TokenPass { bearer: NodeId::P2 },
        );
        // Idle phase: the token arrives out of phase and produces nothing.
        assert!(out.is_empty());
    }

    #[test]
    fn out_of_phase_play_card_is_dropped() {
        let mut p1 = node(NodeId::P1);
        p1.handle(
            header(MsgKind::GameStart, NodeId::P0, Dest::Broadcast),
            Message::GameStart,
        );
        let out = p1.handle(
            header(MsgKind::PlayCard, NodeId::P2, Dest::Broadcast),
            Message::PlayCard {
                card: Card::TWO_OF_CLUBS,
            },
        );
        assert!(out.is_empty());
        assert_eq!(p1.tricks_completed(), 0);
    }
}
