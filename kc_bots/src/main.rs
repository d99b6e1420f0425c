//! Local Kuhn poker duel between two random agents.
//!
//! Spins up one in-process match session, seats two headless clients that
//! pick uniformly among the offered actions, and prints the outcome.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Error;
use kuhn_coordinator::{
    Action, Lobby, LobbyConfig, LocalRoom, MatchKind, MatchSession, MemoryMatchStore, Notification,
    PlayerId, PlayerMessage,
};
use log::{info, warn};
use pico_args::Arguments;
use rand::seq::IndexedRandom;

const HELP: &str = "\
Run a local Kuhn poker duel between two random agents

USAGE:
  kc_bots [OPTIONS]

OPTIONS:
  --hands      N           Hands to play before the match ends  [default: 5]
  --bank       N           Starting bank per player             [default: 5]
  --timeout    SECONDS     Per-message liveness timeout         [default: 5]

FLAGS:
  -h, --help               Print help information
";

struct Args {
    hands: usize,
    bank: i64,
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        hands: pargs.value_from_str("--hands").unwrap_or(5),
        bank: pargs.value_from_str("--bank").unwrap_or(5),
        timeout: pargs.value_from_str("--timeout").unwrap_or(5),
    };

    env_logger::builder().format_target(false).init();

    let config = LobbyConfig {
        starting_bank: args.bank,
        hand_limit: args.hands,
        message_timeout: Duration::from_secs(args.timeout),
        ..LobbyConfig::default()
    };
    let room = Arc::new(LocalRoom::new(2));
    let store = Arc::new(MemoryMatchStore::new());
    let session = MatchSession::new(
        MatchKind::Duel,
        2,
        Duration::from_secs(30),
        config,
        room.clone(),
        store.clone(),
    )?;

    info!(
        "Starting duel {} over {} hand(s), bank {}",
        session.id(),
        args.hands,
        args.bank
    );

    let agents = [
        tokio::spawn(run_agent(session.lobby(), room.clone(), "alice")),
        tokio::spawn(run_agent(session.lobby(), room.clone(), "bob")),
    ];
    session.run().await?;
    for agent in agents {
        agent.await??;
    }

    let lobby = session.lobby();
    for player in lobby.player_ids() {
        if let Some(bank) = lobby.bank(player) {
            info!("Player {player} finished with bank {bank}");
        }
    }
    if let Some(record) = store.get(session.id()) {
        info!(
            "Match {} recorded: {} hand(s), failed={}",
            session.id(),
            lobby.hands_completed(),
            record.is_failed
        );
    }

    Ok(())
}

/// One headless client. Registers, rendezvouses, then answers every prompt
/// with a uniformly random legal action until the match ends.
async fn run_agent(lobby: Arc<Lobby>, room: Arc<LocalRoom>, name: &'static str) -> Result<(), Error> {
    let player = PlayerId::new_v4();
    lobby.register(player)?;
    room.register()?;
    lobby.await_both_connected().await?;
    info!("{name} joined as {player}");

    loop {
        let notification = match lobby.poll_outbound(player).await {
            Ok(notification) => notification,
            Err(_) => return Ok(()),
        };
        match notification {
            Notification::Error { reason } => {
                warn!("{name}: match ended with error: {reason}");
                return Ok(());
            }
            Notification::Stage {
                prompt,
                legal_actions,
            } => {
                if legal_actions.is_empty() {
                    info!("{name}: final standing: {prompt}");
                    return Ok(());
                }
                if legal_actions.iter().any(|action| action == "WAIT") {
                    continue;
                }
                if legal_actions.iter().any(|action| action == "START") {
                    info!("{name}: hand over ({prompt}), requesting the next one");
                    let _ = lobby.submit(player, PlayerMessage::StartHand);
                    continue;
                }

                let choice = {
                    let mut rng = rand::rng();
                    legal_actions
                        .choose(&mut rng)
                        .cloned()
                        .unwrap_or_else(|| legal_actions[0].clone())
                };
                let action = Action::from_str(&choice)?;
                info!("{name}: {prompt} -> {action}");
                lobby.submit(player, PlayerMessage::Move(action))?;
            }
        }
    }
}
