use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::allocator::AllocatorMemory;
use crate::mastery::SkillEstimates;
use crate::ranker::{rank, RankRequest, RecommendationCard};
use crate::tutor::{PracticeGenerator, PracticeRequest, Tutor, TutorContext, TutorReply};

/// Per-student tutoring state: what has been shown, and the current topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub given_problems: AllocatorMemory,
    pub subject: Option<String>,
    pub topic: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a tutor call carrying this session's topic and memory.
    pub fn context(&self) -> TutorContext {
        TutorContext::new()
            .with_topic(self.subject.as_deref(), self.topic.as_deref())
            .with_memory(self.given_problems.clone())
    }

    /// Set the topic from explicit fields. A blank topic is refused.
    pub fn start_topic(&mut self, subject: Option<&str>, topic: &str) -> String {
        let topic = topic.trim();
        if topic.is_empty() {
            return "Please enter a topic first!".to_string();
        }
        self.subject = subject.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        self.topic = Some(topic.to_string());
        format!(
            "Topic set to {topic}. Subject: {}. You can now ask for explanations or practice problems.",
            self.subject.as_deref().unwrap_or("General"),
        )
    }

    /// Send one instruction to `tutor` and keep whatever it changed.
    ///
    /// The call carries no session id, so the tutor caches nothing: this
    /// state is the only record of the exchange.
    pub fn ask(&mut self, tutor: &mut Tutor, instruction: &str) -> TutorReply {
        let reply = tutor.respond(instruction, &self.context());
        self.absorb(&reply);
        reply
    }

    /// Copy memory and any topic change from a reply into this session.
    pub fn absorb(&mut self, reply: &TutorReply) {
        self.given_problems = reply.given_problems.clone();
        if let Some(selection) = &reply.selection {
            self.subject = selection.subject.clone();
            self.topic = selection.topic.clone();
        }
    }

    /// One practice item for `skill`, without repeating earlier ones.
    pub fn practice_skill<G: PracticeGenerator + ?Sized>(
        &mut self,
        generator: &mut G,
        skill: &str,
    ) -> String {
        let request = PracticeRequest {
            prompt: format!("Give practice problem for {skill}"),
            skill: skill.to_string(),
            difficulty: None,
        };
        let memory = std::mem::take(&mut self.given_problems);
        let (text, memory) = generator.generate_practice(&request, memory);
        self.given_problems = memory;
        text
    }

    /// Ranked practice cards; the session keeps the updated memory.
    pub fn recommend<G: PracticeGenerator + ?Sized>(
        &mut self,
        generator: &mut G,
        estimates: &SkillEstimates,
        request: &RankRequest,
    ) -> Vec<RecommendationCard> {
        let memory = std::mem::take(&mut self.given_problems);
        let (cards, memory) = rank(estimates, generator, request, memory);
        self.given_problems = memory;
        cards
    }
}

/// One exchange recorded against a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEntry {
    pub instruction: String,
    pub reply: String,
    pub timestamp: i64,
}

impl SessionEntry {
    pub fn new(instruction: impl Into<String>, reply: impl Into<String>, timestamp: i64) -> Self {
        Self {
            instruction: instruction.into(),
            reply: reply.into(),
            timestamp,
        }
    }
}

/// A stored session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub created_at: i64,
    pub state: SessionState,
    entries: Vec<SessionEntry>,
}

impl SessionRecord {
    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    /// Like [`SessionState::ask`], but the tutor keys its cache by this
    /// record's id. The exchange is appended to the record.
    pub fn ask(&mut self, tutor: &mut Tutor, instruction: &str, now: i64) -> TutorReply {
        let context = self.state.context().with_session(self.id.as_str());
        let reply = tutor.respond(instruction, &context);
        self.state.absorb(&reply);
        self.entries
            .push(SessionEntry::new(instruction, reply.text.clone(), now));
        reply
    }
}

/// In-memory session registry keyed by generated ids.
///
/// No eviction and no persistence. Mutation requires `&mut`, so a session is
/// only ever updated by one caller at a time.
#[derive(Debug, Default)]
pub struct SessionStore {
    records: HashMap<String, SessionRecord>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session and return its id.
    pub fn create(&mut self, state: SessionState, now: i64) -> String {
        let id = crate::new_id();
        self.records.insert(
            id.clone(),
            SessionRecord {
                id: id.clone(),
                created_at: now,
                state,
                entries: Vec::new(),
            },
        );
        debug!(session = %id, "session created");
        id
    }

    /// Append an entry. Returns false for an unknown session.
    pub fn append(&mut self, id: &str, entry: SessionEntry) -> bool {
        match self.records.get_mut(id) {
            Some(record) => {
                record.entries.push(entry);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&SessionRecord> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut SessionRecord> {
        self.records.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every session.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tutor::Intent;

    #[test]
    fn test_store_create_and_get() {
        let mut store = SessionStore::new();
        let id = store.create(SessionState::new(), 1000);
        let record = store.get(&id).unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.created_at, 1000);
        assert!(record.entries().is_empty());
        assert_eq!(record.state, SessionState::default());
    }

    #[test]
    fn test_store_append() {
        let mut store = SessionStore::new();
        let id = store.create(SessionState::new(), 1000);
        assert!(store.append(&id, SessionEntry::new("hi", "hello", 1001)));
        assert_eq!(store.get(&id).unwrap().entries().len(), 1);
        assert!(!store.append("missing", SessionEntry::new("hi", "hello", 1002)));
    }

    #[test]
    fn test_store_get_unknown() {
        let store = SessionStore::new();
        assert!(store.get("nope").is_none());
    }

    #[test]
    fn test_store_clear() {
        let mut store = SessionStore::new();
        store.create(SessionState::new(), 1);
        store.create(SessionState::new(), 2);
        assert_eq!(store.len(), 2);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_start_topic() {
        let mut state = SessionState::new();
        let text = state.start_topic(Some("Physics"), "  Motion ");
        assert!(text.contains("Motion"));
        assert_eq!(state.subject.as_deref(), Some("Physics"));
        assert_eq!(state.topic.as_deref(), Some("Motion"));
    }

    #[test]
    fn test_start_topic_rejects_blank() {
        let mut state = SessionState::new();
        assert_eq!(state.start_topic(Some("Physics"), "   "), "Please enter a topic first!");
        assert!(state.topic.is_none());
        assert!(state.subject.is_none());
    }

    #[test]
    fn test_ask_tracks_topic_and_memory() {
        let mut tutor = Tutor::seeded(1);
        let mut state = SessionState::new();

        let reply = state.ask(&mut tutor, "Start topic: Physics|mechanics");
        assert_eq!(reply.intent, Intent::SetTopic);
        assert_eq!(state.subject.as_deref(), Some("Physics"));
        assert_eq!(state.topic.as_deref(), Some("mechanics"));

        let first = state.ask(&mut tutor, "practice problem");
        let second = state.ask(&mut tutor, "another problem");
        assert_ne!(first.text, second.text);
        assert_eq!(state.given_problems.used("Physics|mechanics").len(), 2);
    }

    #[test]
    fn test_session_topic_is_its_own() {
        let mut tutor = Tutor::seeded(2);
        let mut other = SessionState::new();
        other.ask(&mut tutor, "Start topic: Biology|genetics");

        let mut state = SessionState::new();
        let reply = state.ask(&mut tutor, "practice problem");
        assert!(reply.text.contains("for General (Subject: General)"));

        state.start_topic(Some("Mathematics"), "fractions");
        let reply = state.ask(&mut tutor, "practice problem");
        assert!(reply.text.contains("for fractions (Subject: Mathematics)"));
    }

    #[test]
    fn test_records_on_one_tutor_stay_isolated() {
        let mut tutor = Tutor::seeded(5);
        let mut store = SessionStore::new();
        let asha = store.create(SessionState::new(), 0);
        let ben = store.create(SessionState::new(), 0);

        let record = store.get_mut(&asha).unwrap();
        record.ask(&mut tutor, "Start topic: Mathematics|algebra", 1);
        record.ask(&mut tutor, "practice problem", 2);

        let record = store.get_mut(&ben).unwrap();
        record.ask(&mut tutor, "Start topic: Physics|mechanics", 3);
        assert!(record.state.given_problems.is_empty());
        record.ask(&mut tutor, "practice problem", 4);

        let record = store.get_mut(&asha).unwrap();
        record.state.start_topic(Some("Physics"), "mechanics");
        record.ask(&mut tutor, "practice problem", 5);

        let asha = store.get(&asha).unwrap();
        let ben = store.get(&ben).unwrap();
        assert_eq!(asha.state.given_problems.used("Mathematics|algebra").len(), 1);
        assert_eq!(asha.state.given_problems.used("Physics|mechanics").len(), 1);
        assert_eq!(ben.state.given_problems.keys().collect::<Vec<_>>(), vec!["Physics|mechanics"]);
        assert_eq!(ben.state.given_problems.used("Physics|mechanics").len(), 1);
        assert_eq!(ben.entries().len(), 2);
        assert_eq!(asha.entries()[2].timestamp, 5);
    }

    #[test]
    fn test_record_ask_remembers_topic_through_tutor() {
        let mut tutor = Tutor::seeded(6);
        let mut store = SessionStore::new();
        let id = store.create(SessionState::new(), 0);
        let record = store.get_mut(&id).unwrap();
        record.ask(&mut tutor, "Start topic: Biology|genetics", 1);
        assert_eq!(
            tutor.current(&id).and_then(|c| c.subject.as_deref()),
            Some("Biology")
        );
    }

    #[test]
    fn test_practice_skill_updates_memory() {
        let mut tutor = Tutor::seeded(3);
        let mut state = SessionState::new();
        let text = state.practice_skill(&mut tutor, "algebra");
        assert!(text.starts_with("Practice Question for algebra:"));
        assert_eq!(state.given_problems.used("Mathematics|algebra").len(), 1);
    }

    #[test]
    fn test_recommend_keeps_memory() {
        let mut tutor = Tutor::seeded(4);
        let mut state = SessionState::new();
        let estimates: SkillEstimates = vec![("fractions", 0.2), ("genetics", 0.4)]
            .into_iter()
            .collect();
        let cards = state.recommend(&mut tutor, &estimates, &RankRequest::new(5));
        assert_eq!(cards.len(), 2);
        assert_eq!(state.given_problems.used("Mathematics|fractions").len(), 1);
        assert_eq!(state.given_problems.used("Biology|genetics").len(), 1);
    }

    #[test]
    fn test_session_state_json_roundtrip() {
        let mut state = SessionState::new();
        state.start_topic(None, "algebra");
        let json = serde_json::to_string(&state).unwrap();
        let parsed: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
    }
}
