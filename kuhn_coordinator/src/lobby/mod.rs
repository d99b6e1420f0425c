//! Per-match lobby: participants, hands, and the message plumbing between
//! them and the coordinator loop.
//!
//! ## Architecture
//!
//! Each lobby admits exactly two participants and runs its coordinator loop
//! in a dedicated Tokio task. Participants only ever enqueue onto the shared
//! inbound queue and read their own outbound channel; the coordinator task is
//! the sole writer of hand and game-tree state. Registration bookkeeping
//! (participant map, opponent map, closed flag, hand history) lives under a
//! single mutex that is never extended over game state.

pub mod config;
pub mod coordinator;
pub mod errors;
pub mod messages;

pub use config::LobbyConfig;
pub use errors::LobbyError;
pub use messages::{Notification, ParseMessageError, PlayerMessage, Submission};

use crate::game::{GameState, Seat};
use crate::session::store::MatchStore;
use coordinator::Coordinator;
use log::{debug, error, info, warn};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Barrier, Notify, mpsc};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use uuid::Uuid;

pub type PlayerId = Uuid;
pub type MatchId = Uuid;

/// Number of seats in a lobby. The coordinator protocol is strictly
/// two-party.
pub const LOBBY_CAPACITY: usize = 2;

/// One connected player bound to a match.
#[derive(Debug)]
pub struct Participant {
    pub id: PlayerId,
    pub bank: i64,
    outbound: mpsc::UnboundedSender<Notification>,
}

impl Participant {
    fn new(id: PlayerId, bank: i64) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        (Self { id, bank, outbound }, rx)
    }

    /// Fire-and-forget delivery; never blocks the coordinator on the
    /// recipient reading.
    fn send(&self, notification: Notification) {
        if self.outbound.send(notification).is_err() {
            debug!("participant {} dropped their outbound channel", self.id);
        }
    }

    fn send_stage(&self, prompt: impl Into<String>, legal_actions: Vec<String>) {
        self.send(Notification::stage(prompt, legal_actions));
    }

    fn send_error(&self, reason: impl Into<String>) {
        self.send(Notification::error(reason));
    }
}

/// One playthrough of the game tree inside a match.
#[derive(Clone, Debug)]
pub struct Hand {
    pub index: usize,
    pub state: GameState,
    pub first_mover: PlayerId,
    /// Participant currently entitled to act.
    pub turn: PlayerId,
    /// Participants whose "hand started" message has gone out already.
    started: HashSet<PlayerId>,
}

impl Hand {
    pub(crate) fn new(index: usize, state: GameState, first_mover: PlayerId) -> Self {
        Self {
            index,
            state,
            first_mover,
            turn: first_mover,
            started: HashSet::new(),
        }
    }

    /// Seat the given participant occupies in this hand.
    pub fn seat_of(&self, player: PlayerId) -> Seat {
        if player == self.first_mover {
            Seat::First
        } else {
            Seat::Second
        }
    }

    /// Records the "hand started" delivery. Returns false if it had already
    /// gone out to this participant.
    pub(crate) fn mark_started(&mut self, player: PlayerId) -> bool {
        self.started.insert(player)
    }
}

/// Bookkeeping guarded by the lobby's single mutex domain.
#[derive(Default)]
struct LobbyInner {
    participants: HashMap<PlayerId, Participant>,
    opponents: HashMap<PlayerId, PlayerId>,
    /// Completed hands, immutable once pushed.
    hands: Vec<Hand>,
    closed: bool,
    coordinator: Option<JoinHandle<()>>,
}

/// The per-match aggregate described in the module docs.
pub struct Lobby {
    id: MatchId,
    config: LobbyConfig,
    inner: Mutex<LobbyInner>,
    outbound: Mutex<HashMap<PlayerId, Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Notification>>>>>,
    inbound_tx: mpsc::UnboundedSender<Submission>,
    inbound_rx: Mutex<Option<mpsc::UnboundedReceiver<Submission>>>,
    /// Rendezvous gate releasing once both participants have arrived.
    rendezvous: Barrier,
    closed_notify: Notify,
    store: Arc<dyn MatchStore>,
}

impl Lobby {
    pub fn new(id: MatchId, config: LobbyConfig, store: Arc<dyn MatchStore>) -> Arc<Self> {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            id,
            config,
            inner: Mutex::new(LobbyInner::default()),
            outbound: Mutex::new(HashMap::new()),
            inbound_tx,
            inbound_rx: Mutex::new(Some(inbound_rx)),
            rendezvous: Barrier::new(LOBBY_CAPACITY),
            closed_notify: Notify::new(),
            store,
        })
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    pub fn config(&self) -> &LobbyConfig {
        &self.config
    }

    fn inner(&self) -> MutexGuard<'_, LobbyInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a participant with the configured starting bank. The whole
    /// check-then-add runs under the lobby mutex, so concurrent callers
    /// cannot both take the last seat. On the second registration the
    /// symmetric opponent mapping is recorded and persistence is told the
    /// match has started.
    pub fn register(&self, player: PlayerId) -> Result<(), LobbyError> {
        let mut inner = self.inner();
        if inner.closed {
            return Err(LobbyError::Closed);
        }
        if inner.participants.contains_key(&player) {
            warn!("lobby {}: player {player} registered twice", self.id);
            return Ok(());
        }
        if inner.participants.len() >= LOBBY_CAPACITY {
            return Err(LobbyError::LobbyFull);
        }

        let (participant, rx) = Participant::new(player, self.config.starting_bank);
        inner.participants.insert(player, participant);
        self.outbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(player, Arc::new(tokio::sync::Mutex::new(rx)));
        info!("lobby {}: player {player} registered", self.id);

        if inner.participants.len() == LOBBY_CAPACITY {
            let ids: Vec<PlayerId> = inner.participants.keys().copied().collect();
            inner.opponents.insert(ids[0], ids[1]);
            inner.opponents.insert(ids[1], ids[0]);

            // Persistence runs off the registration path; failures are
            // logged, not surfaced to the joiner.
            let store = Arc::clone(&self.store);
            let id = self.id;
            tokio::spawn(async move {
                if let Err(e) = store.record_match_started(id, &ids).await {
                    error!("lobby {id}: failed to record match start: {e:#}");
                }
            });
        }
        Ok(())
    }

    /// Blocks the registering caller until the two-party rendezvous
    /// completes or the configured rendezvous window elapses. The first
    /// caller to observe the completed rendezvous starts the coordinator
    /// loop; a timeout is fatal to the whole match.
    pub async fn await_both_connected(self: &Arc<Self>) -> Result<(), LobbyError> {
        let window = self.config.rendezvous_timeout;
        {
            let inner = self.inner();
            if inner.closed {
                return Err(LobbyError::Closed);
            }
            // Late or duplicate callers after a completed rendezvous must
            // not re-arm the barrier.
            if inner.coordinator.is_some() {
                return Ok(());
            }
        }
        match timeout(window, self.rendezvous.wait()).await {
            Ok(result) => {
                if result.is_leader() {
                    self.start();
                }
                Ok(())
            }
            Err(_) => {
                warn!("lobby {}: rendezvous timed out after {window:?}", self.id);
                self.fail(&LobbyError::RendezvousTimeout).await;
                Err(LobbyError::RendezvousTimeout)
            }
        }
    }

    /// Starts the coordinator loop. Safe to call more than once; only the
    /// first call spawns the task.
    pub fn start(self: &Arc<Self>) {
        let mut inner = self.inner();
        if inner.closed || inner.coordinator.is_some() {
            return;
        }
        let Some(inbound) = self
            .inbound_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            return;
        };
        let ids: Vec<PlayerId> = inner.participants.keys().copied().collect();
        let [a, b] = ids.as_slice() else {
            warn!(
                "lobby {}: refusing to start with {} participant(s)",
                self.id,
                ids.len()
            );
            return;
        };
        info!("lobby {}: starting coordinator loop", self.id);
        let loop_task = Coordinator::new(Arc::clone(self), [*a, *b]).run(inbound);
        inner.coordinator = Some(tokio::spawn(loop_task));
    }

    /// Enqueues a player-originated message. Turn-order validation is the
    /// coordinator loop's exclusive job; this only checks membership.
    pub fn submit(&self, player: PlayerId, message: PlayerMessage) -> Result<(), LobbyError> {
        {
            let inner = self.inner();
            if inner.closed {
                return Err(LobbyError::Closed);
            }
            if !inner.participants.contains_key(&player) {
                return Err(LobbyError::UnknownPlayer(player));
            }
        }
        self.inbound_tx
            .send(Submission { player, message })
            .map_err(|_| LobbyError::Closed)
    }

    /// Blocking read of the caller's own outbound channel.
    pub async fn poll_outbound(&self, player: PlayerId) -> Result<Notification, LobbyError> {
        let rx = self
            .outbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&player)
            .cloned()
            .ok_or(LobbyError::UnknownPlayer(player))?;
        let mut rx = rx.lock().await;
        rx.recv().await.ok_or(LobbyError::Closed)
    }

    /// Idempotently sets the closed flag.
    pub fn close(&self) {
        let mut inner = self.inner();
        if !inner.closed {
            inner.closed = true;
            drop(inner);
            info!("lobby {} closed", self.id);
            self.closed_notify.notify_waiters();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner().closed
    }

    /// Resolves once the lobby has closed.
    pub async fn wait_closed(&self) {
        loop {
            let notified = self.closed_notify.notified();
            if self.is_closed() {
                return;
            }
            notified.await;
        }
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.inner().participants.keys().copied().collect()
    }

    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        self.inner().opponents.get(&player).copied()
    }

    pub fn bank(&self, player: PlayerId) -> Option<i64> {
        self.inner().participants.get(&player).map(|p| p.bank)
    }

    /// Completed hands, oldest first.
    pub fn hand_history(&self) -> Vec<Hand> {
        self.inner().hands.clone()
    }

    pub fn hands_completed(&self) -> usize {
        self.inner().hands.len()
    }

    pub(crate) fn send_stage_to(&self, player: PlayerId, prompt: &str, legal_actions: Vec<String>) {
        if let Some(participant) = self.inner().participants.get(&player) {
            participant.send_stage(prompt, legal_actions);
        }
    }

    pub(crate) fn broadcast_stage(&self, prompt: &str, legal_actions: Vec<String>) {
        for participant in self.inner().participants.values() {
            participant.send_stage(prompt, legal_actions.clone());
        }
    }

    /// Applies a terminal payoff, stated from the first mover's perspective,
    /// to both banks.
    pub(crate) fn settle(&self, first_mover: PlayerId, payoff: i64) {
        let mut inner = self.inner();
        let Some(opponent) = inner.opponents.get(&first_mover).copied() else {
            return;
        };
        if let Some(participant) = inner.participants.get_mut(&first_mover) {
            participant.bank += payoff;
        }
        if let Some(participant) = inner.participants.get_mut(&opponent) {
            participant.bank -= payoff;
        }
    }

    pub(crate) fn push_hand(&self, hand: Hand) {
        self.inner().hands.push(hand);
    }

    /// Current (id, bank) pairs.
    pub(crate) fn standings(&self) -> Vec<(PlayerId, i64)> {
        self.inner()
            .participants
            .values()
            .map(|p| (p.id, p.bank))
            .collect()
    }

    /// Successful-completion teardown: persistence first, then close.
    pub(crate) async fn finish(&self) {
        if let Err(e) = self.store.record_match_finished(self.id, false, None).await {
            error!("lobby {}: failed to record match finish: {e:#}", self.id);
        }
        self.close();
    }

    /// Fatal-path teardown: best-effort error delivery to every registered
    /// participant, then persistence, then close. One unreachable
    /// participant cannot keep the other from the termination notice.
    pub(crate) async fn fail(&self, reason: &LobbyError) {
        {
            let mut inner = self.inner();
            if inner.closed {
                return;
            }
            inner.closed = true;
            for participant in inner.participants.values() {
                participant.send_error(reason.to_string());
            }
        }
        warn!("lobby {} failed: {reason}", self.id);
        self.closed_notify.notify_waiters();
        if let Err(e) = self
            .store
            .record_match_finished(self.id, true, Some(reason.to_string()))
            .await
        {
            error!("lobby {}: failed to record match failure: {e:#}", self.id);
        }
    }
}
