//! Terminal demo of the session monitor.
//!
//! Runs one signed-in session over in-memory storage. Every stdin line is
//! an activity event (`click`, `keydown`, ...; an empty line is a click),
//! `logout` signs out, `quit` stops without signing out. Each state the
//! monitor publishes is printed as one JSON line.
//!
//! ```text
//! session-console [policy.json]
//! ```
//!
//! The optional policy file uses millisecond fields, e.g.
//! `{"inactivity_timeout_ms": 20000, "countdown_threshold_ms": 10000}`.

use rubikview::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Activity(ActivityKind),
    Logout,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, ProtocolError> {
    match line.trim() {
        "" => Ok(Command::Activity(ActivityKind::Click)),
        "logout" => Ok(Command::Logout),
        "quit" | "exit" => Ok(Command::Quit),
        other => other.parse().map(Command::Activity),
    }
}

async fn load_policy(path: Option<String>) -> Result<TimeoutPolicy, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let json = tokio::fs::read_to_string(&path).await?;
            info!(%path, "loaded timeout policy");
            Ok(TimeoutPolicy::from_json(&json)?)
        }
        None => Ok(TimeoutPolicy::default()),
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    rubikview::init_logging();

    let policy = load_policy(std::env::args().nth(1)).await?;
    eprintln!(
        "session-console: timeout {:?}, countdown {:?}, cap {:?}",
        policy.inactivity_timeout, policy.countdown_threshold, policy.max_session_duration
    );

    let storage = MemoryStore::new();
    let cookies = MemoryStore::with_entries([("sessionid", "demo")]);
    record_login(&storage, "demo-token", &Role::Admin, SystemClock.now())
        .map_err(RubikViewError::from)?;

    let mut monitor = MonitorBuilder::new().policy(policy).start_dashboard(
        storage,
        cookies,
        |path: &str| eprintln!("redirect -> {path}"),
    );

    let codec = JsonCodec;
    let mut updates = monitor.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            let state = *updates.borrow_and_update();
            match codec.encode(&state) {
                Ok(bytes) => println!("{}", String::from_utf8_lossy(&bytes)),
                Err(e) => eprintln!("cannot encode state: {e}"),
            }
            if updates.changed().await.is_err() {
                break;
            }
        }
    });

    let sink = monitor.activity_sink();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(Command::Activity(kind)) => {
                        if !sink.record(kind) {
                            break;
                        }
                    }
                    Ok(Command::Logout) => {
                        monitor.logout().map_err(RubikViewError::from)?;
                        break;
                    }
                    Ok(Command::Quit) => break,
                    Err(e) => eprintln!("{e}"),
                }
            }
            result = monitor.join() => {
                result.map_err(RubikViewError::from)?;
                break;
            }
        }
    }

    monitor.stop().await.map_err(RubikViewError::from)?;
    printer.await?;
    Ok(())
}
