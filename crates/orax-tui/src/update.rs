//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(state,
//! event)` and executes the returned effects. This is where the
//! dispatcher semantics live: pending questions, placeholder
//! substitution, history prepending, and the chat submit control.

use chrono::Local;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use orax_core::core::events::SessionEvent;
use orax_core::oracle::{CANNOT_UNDERSTAND, OracleKind, PriceQuote, UNKNOWN_ANSWER};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::{AppState, ChatExchange, Panel};

/// Status text while a price refresh is in flight.
pub const STATUS_FETCHING_PRICES: &str = "Fetching latest prices...";
/// Status text after a successful price event.
pub const STATUS_PRICES_UPDATED: &str = "Prices updated.";
/// Working indicator written into the knowledge answer line.
pub const LOOKING_IT_UP: &str = "Looking it up...";

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns
/// effects for the runtime to execute.
pub fn update(state: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            state.spinner_frame = state.spinner_frame.wrapping_add(1);
            vec![]
        }
        UiEvent::Terminal(terminal_event) => handle_terminal_event(state, terminal_event),
        UiEvent::Session(session_event) => {
            handle_session_event(state, &session_event);
            vec![]
        }
    }
}

fn handle_terminal_event(state: &mut AppState, event: Event) -> Vec<UiEffect> {
    let Event::Key(key) = event else {
        return vec![];
    };
    // Ignore key releases (Windows terminals report both edges).
    if key.kind == KeyEventKind::Release {
        return vec![];
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Esc, _) => {
            state.should_quit = true;
            vec![UiEffect::Quit]
        }
        (KeyCode::Tab, _) => {
            state.focus = state.focus.next();
            vec![]
        }
        (KeyCode::Enter, _) => submit_focused(state),
        _ => {
            edit_focused_input(state, &key);
            vec![]
        }
    }
}

/// Submits the focused panel's request, recording the pending question.
fn submit_focused(state: &mut AppState) -> Vec<UiEffect> {
    match state.focus {
        Panel::Price => {
            state.price.refreshing = true;
            state.status = STATUS_FETCHING_PRICES.to_string();
            vec![UiEffect::SubmitPriceUpdate]
        }
        Panel::Knowledge => {
            let question = state.knowledge.input.trim().to_string();
            if question.is_empty() {
                return vec![];
            }
            if let Some(superseded) = state.knowledge.pending.replace(question.clone()) {
                tracing::debug!(%superseded, "knowledge question superseded");
            }
            state.knowledge.input.clear();
            state.knowledge.answer = LOOKING_IT_UP.to_string();
            vec![UiEffect::SubmitKnowledgeQuery { question }]
        }
        Panel::Chat => {
            let question = state.chat.input.trim().to_string();
            // An empty question performs no submission and changes nothing.
            if question.is_empty() || !state.chat.submit_enabled {
                return vec![];
            }
            state.chat.pending = Some(question.clone());
            state.chat.submit_enabled = false;
            state.chat.input.clear();
            vec![UiEffect::SubmitChatAsk { question }]
        }
    }
}

fn edit_focused_input(state: &mut AppState, key: &KeyEvent) {
    let input = match state.focus {
        // The price panel has no text input.
        Panel::Price => return,
        Panel::Knowledge => &mut state.knowledge.input,
        Panel::Chat => &mut state.chat.input,
    };
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => input.push(c),
        KeyCode::Backspace => {
            input.pop();
        }
        _ => {}
    }
}

/// Applies a session event to the panels.
///
/// Answer events always render, matching the original's always-on event
/// watch. Watch errors render the placeholder only when a request is in
/// flight for that oracle; an idle poll hiccup is log-only.
fn handle_session_event(state: &mut AppState, event: &SessionEvent) {
    match event {
        SessionEvent::Submitted { kind, tx_hash } => {
            state.status = format!("Request accepted by the {kind} (tx {})", short_hash(tx_hash));
        }
        SessionEvent::SubmitFailed { kind, .. } => {
            apply_submit_failure(state, *kind);
        }
        SessionEvent::Answer { kind, answer } => {
            apply_answer(state, *kind, answer.as_deref());
        }
        SessionEvent::WatchError { kind, .. } => {
            let in_flight = match kind {
                OracleKind::DieselPrice => state.price.refreshing,
                OracleKind::Knowledge => state.knowledge.pending.is_some(),
                OracleKind::Chat => state.chat.pending.is_some(),
            };
            if in_flight {
                apply_answer(state, *kind, None);
            }
        }
    }
}

/// The failure path for a submission: status text only, no retry. The
/// in-flight marker is cleared so the panel is usable again.
fn apply_submit_failure(state: &mut AppState, kind: OracleKind) {
    state.status = match kind {
        OracleKind::DieselPrice => {
            state.price.refreshing = false;
            "Error updating prices; see log.".to_string()
        }
        OracleKind::Knowledge => {
            state.knowledge.pending = None;
            state.knowledge.answer.clear();
            "Error getting an answer; see log.".to_string()
        }
        OracleKind::Chat => {
            state.chat.pending = None;
            state.chat.submit_enabled = true;
            "Error reaching the chat oracle; see log.".to_string()
        }
    };
}

/// Renders an answer (or, for `None`, the fixed placeholder) into the
/// oracle's panel and releases its pending slot.
fn apply_answer(state: &mut AppState, kind: OracleKind, answer: Option<&str>) {
    match kind {
        OracleKind::DieselPrice => {
            state.price.refreshing = false;
            match answer.map(PriceQuote::parse) {
                Some(Ok(quote)) => {
                    state.price.diesel = quote.diesel;
                    state.price.lpg = quote.lpg;
                    state.status = STATUS_PRICES_UPDATED.to_string();
                }
                Some(Err(error)) => {
                    tracing::warn!(%error, "unusable price payload");
                    state.price.diesel = UNKNOWN_ANSWER.to_string();
                    state.price.lpg = UNKNOWN_ANSWER.to_string();
                }
                None => {
                    state.price.diesel = UNKNOWN_ANSWER.to_string();
                    state.price.lpg = UNKNOWN_ANSWER.to_string();
                }
            }
        }
        OracleKind::Knowledge => {
            state.knowledge.pending = None;
            state.knowledge.answer = match answer {
                Some(text) => text.to_string(),
                None => CANNOT_UNDERSTAND.to_string(),
            };
        }
        OracleKind::Chat => {
            let question = state.chat.pending.take().unwrap_or_default();
            let answer = match answer {
                Some(text) => text.to_string(),
                None => UNKNOWN_ANSWER.to_string(),
            };
            state.chat.history.insert(
                0,
                ChatExchange {
                    question,
                    answer,
                    at: Local::now(),
                },
            );
            state.chat.submit_enabled = true;
        }
    }
}

fn short_hash(hash: &str) -> &str {
    if hash.len() > 10 { &hash[..10] } else { hash }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            update(state, key(KeyCode::Char(c)));
        }
    }

    fn answer(kind: OracleKind, answer: Option<&str>) -> UiEvent {
        UiEvent::Session(SessionEvent::Answer {
            kind,
            answer: answer.map(str::to_string),
        })
    }

    fn state() -> AppState {
        AppState::new("0xa1")
    }

    #[test]
    fn test_tab_cycles_focus() {
        let mut state = state();
        assert_eq!(state.focus, Panel::Chat);
        update(&mut state, key(KeyCode::Tab));
        assert_eq!(state.focus, Panel::Price);
        update(&mut state, key(KeyCode::Tab));
        assert_eq!(state.focus, Panel::Knowledge);
        update(&mut state, key(KeyCode::Tab));
        assert_eq!(state.focus, Panel::Chat);
    }

    #[test]
    fn test_typing_edits_focused_input() {
        let mut state = state();
        type_text(&mut state, "hello");
        update(&mut state, key(KeyCode::Backspace));
        assert_eq!(state.chat.input, "hell");
        assert!(state.knowledge.input.is_empty());
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut state = state();
        let effects = update(
            &mut state,
            UiEvent::Terminal(Event::Key(KeyEvent::new(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL,
            ))),
        );
        assert_eq!(effects, vec![UiEffect::Quit]);
        assert!(state.should_quit);
    }

    #[test]
    fn test_empty_chat_question_is_a_no_op() {
        let mut state = state();
        type_text(&mut state, "   ");
        let before = state.clone();

        let effects = update(&mut state, key(KeyCode::Enter));

        assert!(effects.is_empty());
        // Everything but the typed whitespace is untouched.
        assert_eq!(state.chat.history, before.chat.history);
        assert_eq!(state.chat.pending, None);
        assert!(state.chat.submit_enabled);
        assert_eq!(state.status, before.status);
    }

    #[test]
    fn test_chat_submit_disables_control_until_event() {
        let mut state = state();
        type_text(&mut state, "how are you?");

        let effects = update(&mut state, key(KeyCode::Enter));
        assert_eq!(
            effects,
            vec![UiEffect::SubmitChatAsk {
                question: "how are you?".to_string()
            }]
        );
        assert!(!state.chat.submit_enabled);
        assert_eq!(state.chat.submit_label(), "Waiting for an answer...");
        assert_eq!(state.chat.pending.as_deref(), Some("how are you?"));
        assert!(state.chat.input.is_empty());

        // A second Enter while disabled submits nothing.
        type_text(&mut state, "again?");
        assert!(update(&mut state, key(KeyCode::Enter)).is_empty());

        update(&mut state, answer(OracleKind::Chat, Some("fine, thanks")));
        assert!(state.chat.submit_enabled);
        assert_eq!(state.chat.submit_label(), "Enter to ask");
    }

    #[test]
    fn test_chat_answer_prepends_history() {
        let mut state = state();
        type_text(&mut state, "first");
        update(&mut state, key(KeyCode::Enter));
        update(&mut state, answer(OracleKind::Chat, Some("one")));

        type_text(&mut state, "second");
        update(&mut state, key(KeyCode::Enter));
        update(&mut state, answer(OracleKind::Chat, Some("two")));

        let pairs: Vec<(&str, &str)> = state
            .chat
            .history
            .iter()
            .map(|e| (e.question.as_str(), e.answer.as_str()))
            .collect();
        assert_eq!(pairs, vec![("second", "two"), ("first", "one")]);
    }

    #[test]
    fn test_chat_error_event_pairs_placeholder_with_last_question() {
        let mut state = state();
        type_text(&mut state, "what is love?");
        update(&mut state, key(KeyCode::Enter));

        update(
            &mut state,
            UiEvent::Session(SessionEvent::WatchError {
                kind: OracleKind::Chat,
                message: "filter poll failed".to_string(),
            }),
        );

        assert_eq!(state.chat.history.len(), 1);
        assert_eq!(state.chat.history[0].question, "what is love?");
        assert_eq!(state.chat.history[0].answer, UNKNOWN_ANSWER);
        assert!(state.chat.submit_enabled);
    }

    #[test]
    fn test_idle_watch_error_changes_nothing() {
        let mut state = state();
        let before = state.clone();
        update(
            &mut state,
            UiEvent::Session(SessionEvent::WatchError {
                kind: OracleKind::Chat,
                message: "poll failed".to_string(),
            }),
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_price_event_renders_both_fields_verbatim() {
        let mut state = state();
        state.focus = Panel::Price;
        update(&mut state, key(KeyCode::Enter));
        assert!(state.price.refreshing);
        assert_eq!(state.status, STATUS_FETCHING_PRICES);

        update(
            &mut state,
            answer(
                OracleKind::DieselPrice,
                Some(r#"{"diesel":"6.5","lpg":"4.2"}"#),
            ),
        );

        assert_eq!(state.price.diesel, "6.5");
        assert_eq!(state.price.lpg, "4.2");
        assert_eq!(state.status, STATUS_PRICES_UPDATED);
        assert!(!state.price.refreshing);
    }

    #[test]
    fn test_empty_price_event_renders_placeholder() {
        let mut state = state();
        update(&mut state, answer(OracleKind::DieselPrice, None));
        assert_eq!(state.price.diesel, UNKNOWN_ANSWER);
        assert_eq!(state.price.lpg, UNKNOWN_ANSWER);
    }

    #[test]
    fn test_malformed_price_payload_renders_placeholder() {
        let mut state = state();
        update(&mut state, answer(OracleKind::DieselPrice, Some("6.5")));
        assert_eq!(state.price.diesel, UNKNOWN_ANSWER);
        assert_eq!(state.price.lpg, UNKNOWN_ANSWER);
        assert_ne!(state.status, STATUS_PRICES_UPDATED);
    }

    #[test]
    fn test_knowledge_flow() {
        let mut state = state();
        state.focus = Panel::Knowledge;
        type_text(&mut state, "boiling point of water");

        let effects = update(&mut state, key(KeyCode::Enter));
        assert_eq!(
            effects,
            vec![UiEffect::SubmitKnowledgeQuery {
                question: "boiling point of water".to_string()
            }]
        );
        assert_eq!(state.knowledge.answer, LOOKING_IT_UP);

        update(&mut state, answer(OracleKind::Knowledge, Some("100 C")));
        assert_eq!(state.knowledge.answer, "100 C");
        assert_eq!(state.knowledge.pending, None);
    }

    #[test]
    fn test_empty_knowledge_answer_renders_placeholder() {
        let mut state = state();
        state.focus = Panel::Knowledge;
        type_text(&mut state, "mumble");
        update(&mut state, key(KeyCode::Enter));
        update(&mut state, answer(OracleKind::Knowledge, None));
        assert_eq!(state.knowledge.answer, CANNOT_UNDERSTAND);
    }

    #[test]
    fn test_newer_submission_supersedes_pending() {
        let mut state = state();
        state.focus = Panel::Knowledge;
        type_text(&mut state, "first");
        update(&mut state, key(KeyCode::Enter));
        type_text(&mut state, "second");
        update(&mut state, key(KeyCode::Enter));
        // Last-write-wins: only the newest question is tracked.
        assert_eq!(state.knowledge.pending.as_deref(), Some("second"));
    }

    #[test]
    fn test_submit_failure_resets_chat_control() {
        let mut state = state();
        type_text(&mut state, "hello?");
        update(&mut state, key(KeyCode::Enter));
        update(
            &mut state,
            UiEvent::Session(SessionEvent::SubmitFailed {
                kind: OracleKind::Chat,
                message: "node down".to_string(),
            }),
        );
        assert!(state.chat.submit_enabled);
        assert_eq!(state.chat.pending, None);
        assert!(state.status.contains("chat oracle"));
        assert!(state.chat.history.is_empty());
    }

    #[test]
    fn test_submitted_event_updates_status() {
        let mut state = state();
        update(
            &mut state,
            UiEvent::Session(SessionEvent::Submitted {
                kind: OracleKind::Knowledge,
                tx_hash: "0x0123456789abcdef".to_string(),
            }),
        );
        assert!(state.status.contains("knowledge oracle"));
        assert!(state.status.contains("0x01234567"));
    }
}
