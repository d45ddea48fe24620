//! # Scenario 1: Two Students, One Tutor
//!
//! **Actors**: Two students sharing a single tutor process
//! **Goal**: Each student works through a topic without ever seeing the same
//! practice question twice until the pool runs out
//!
//! Demonstrates:
//! - Setting a topic with `Start topic: Subject|Topic`
//! - Non-repeating practice per session, then a soft reset on exhaustion
//! - One tutor serving both students while memory and topic stay per session
//! - Explanations and canned direct answers
//! - Session memory persisted as JSON and restored later

use tutor_core::session::{SessionState, SessionStore};
use tutor_core::tutor::Tutor;

fn sep(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("  {title}");
    println!("{}\n", "=".repeat(60));
}

fn say(store: &mut SessionStore, tutor: &mut Tutor, id: &str, who: &str, message: &str) {
    let Some(record) = store.get_mut(id) else {
        println!("  (session {id} missing)");
        return;
    };
    let reply = record.ask(tutor, message, 0);
    println!("  {who}> {message}");
    for line in reply.text.lines() {
        println!("  tutor: {line}");
    }
    println!("  [intent: {:?}]\n", reply.intent);
}

fn main() {
    println!("==========================================================");
    println!("  SCENARIO 1: Two Students, One Tutor");
    println!("==========================================================\n");

    let mut tutor = Tutor::seeded(2024);
    let mut store = SessionStore::new();
    let asha = store.create(SessionState::new(), 0);
    let ben = store.create(SessionState::new(), 0);

    // ── Asha: algebra ────────────────────────────────────────────
    sep("Asha works through algebra");
    say(&mut store, &mut tutor, &asha, "asha", "Start topic: Mathematics|algebra");
    say(&mut store, &mut tutor, &asha, "asha", "Can you explain this?");
    for _ in 0..4 {
        say(&mut store, &mut tutor, &asha, "asha", "another problem");
    }
    println!("  (the fourth question starts a new round: all three were seen)");

    // ── Ben: mechanics ───────────────────────────────────────────
    sep("Ben works through mechanics");
    say(&mut store, &mut tutor, &ben, "ben", "Start topic: Physics|mechanics");
    say(&mut store, &mut tutor, &ben, "ben", "What is Newton's second law?");
    say(&mut store, &mut tutor, &ben, "ben", "practice problem");
    say(&mut store, &mut tutor, &ben, "ben", "practice problem");
    say(&mut store, &mut tutor, &ben, "ben", "hello?");

    println!(
        "  asha remembers {} question(s), ben remembers {}",
        store.get(&asha).map_or(0, |r| r.state.given_problems.total()),
        store.get(&ben).map_or(0, |r| r.state.given_problems.total()),
    );

    // ── Persist and restore ──────────────────────────────────────
    sep("Persist Ben's memory and resume later");
    let Some(record) = store.get(&ben) else {
        return;
    };
    let saved = match serde_json::to_string_pretty(&record.state) {
        Ok(json) => json,
        Err(e) => {
            println!("  failed to save: {e}");
            return;
        }
    };
    println!("{saved}\n");

    let restored: SessionState = match serde_json::from_str(&saved) {
        Ok(state) => state,
        Err(e) => {
            println!("  failed to restore: {e}");
            return;
        }
    };
    let mut fresh_tutor = Tutor::seeded(7);
    let resumed = store.create(restored, 1);
    say(&mut store, &mut fresh_tutor, &resumed, "ben", "practice problem");
    println!("  (a new round: both mechanics questions were already in Ben's memory)");

    sep("Summary");
    for (name, id) in [("asha", &asha), ("ben", &ben), ("ben (resumed)", &resumed)] {
        if let Some(record) = store.get(id) {
            println!(
                "  {name:<14} turns={:<3} remembered={}",
                record.entries().len(),
                record.state.given_problems.total()
            );
        }
    }
}
