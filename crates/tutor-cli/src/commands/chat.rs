//! `tutor chat` — converse with the tutor.
//!
//! With `-m` each message is answered in order and the command exits.
//! Otherwise lines are read from stdin until EOF, `quit` or `exit`.
//! All turns share one session, so practice questions never repeat until a
//! topic's pool is used up.

use std::io::{BufRead, IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use tracing::debug;
use tutor_core::session::{SessionState, SessionStore};
use tutor_core::tutor::Tutor;

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Run a chat session.
pub fn run(
    tutor: &mut Tutor,
    messages: &[String],
    subject: Option<&str>,
    topic: Option<&str>,
) -> Result<()> {
    let mut store = SessionStore::new();
    let mut state = SessionState::new();
    if let Some(topic) = topic {
        println!("{}", state.start_topic(subject, topic));
    }
    let session_id = store.create(state, now());

    if !messages.is_empty() {
        for message in messages {
            let text = turn(tutor, &mut store, &session_id, message)?;
            println!("{text}\n");
        }
        return Ok(());
    }

    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal();
    if interactive {
        println!("{}", tutor_core::tutor::HELP_TEXT);
        println!("Type `quit` to leave.\n");
    }

    let mut stdout = std::io::stdout();
    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            print!("> ");
            stdout.flush().context("failed to flush stdout")?;
        }
        let Some(line) = lines.next() else { break };
        let line = line.context("failed to read from stdin")?;
        let message = line.trim();
        if message.is_empty() {
            if interactive {
                println!("Please type a message.");
            }
            continue;
        }
        if matches!(message, "quit" | "exit") {
            break;
        }
        let text = turn(tutor, &mut store, &session_id, message)?;
        println!("{text}\n");
    }

    tutor.forget(&session_id);
    if let Some(record) = store.get(&session_id) {
        debug!(
            turns = record.entries().len(),
            remembered = record.state.given_problems.total(),
            "chat finished"
        );
    }
    Ok(())
}

/// Answer one message and record it against the session.
fn turn(tutor: &mut Tutor, store: &mut SessionStore, session_id: &str, message: &str) -> Result<String> {
    let record = store
        .get_mut(session_id)
        .context("chat session disappeared")?;
    let reply = record.ask(tutor, message, now());
    debug!(intent = ?reply.intent, id = %reply.id, "tutor replied");
    Ok(reply.text)
}
