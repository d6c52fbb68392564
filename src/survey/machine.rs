use super::catalog::{Catalog, ChoiceMode, QuestionKind};
use super::session::{Session, Stage, VoiceForward};
use crate::error::SurveyError;

/// What a button tap selects within a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tap {
    Option(usize),
    /// The "Other" button: redirect to free text/voice.
    Custom,
    /// The confirm button on multi-select questions.
    Done,
}

/// An inbound conversation event, already decoded from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// /start — resets the session even mid-survey.
    Start,
    /// /cancel — ends the conversation without a report.
    Cancel,
    /// The welcome-message confirmation button.
    Begin { token: String },
    Tap {
        question: usize,
        tap: Tap,
        /// Unique per physical tap (the callback query id). Two deliveries of
        /// the same tap carry the same token.
        token: String,
        /// The message the tapped keyboard hangs off, for re-rendering.
        message_id: i64,
    },
    Text(String),
    Voice { file_id: String, message_id: i64 },
    /// A message kind we cannot record (sticker, photo, ...).
    Unsupported,
}

/// Side effects requested by a transition. The dispatcher renders and sends
/// them; the machine itself never touches the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SendWelcome,
    AskQuestion(usize),
    RerenderQuestion { question: usize, message_id: i64 },
    PromptCustomAnswer,
    AskForTextOrVoice,
    SendCancelled,
    /// Terminal: run the reporter exactly once.
    Complete,
}

/// Single transition of the conversation state machine:
/// `(session, event) -> (session', effects)`.
///
/// `Err(SurveyError::OrphanedInput)` means a text or voice message arrived
/// with no question in flight; the session is left untouched and the caller
/// instructs the user to restart.
pub fn handle(
    session: &mut Session,
    catalog: &Catalog,
    event: Event,
) -> Result<Vec<Effect>, SurveyError> {
    match event {
        Event::Start => {
            session.reset();
            Ok(vec![Effect::SendWelcome])
        }

        Event::Cancel => {
            session.stage = Stage::Terminated;
            Ok(vec![Effect::SendCancelled])
        }

        Event::Begin { token } => {
            if session.stage != Stage::AwaitingStart {
                tracing::debug!(stage = ?session.stage, "begin tap outside AwaitingStart ignored");
                return Ok(vec![]);
            }
            if is_duplicate(session, &token) {
                return Ok(vec![]);
            }
            session.last_event_token = Some(token);
            session.stage = Stage::Question(0);
            Ok(vec![Effect::AskQuestion(0)])
        }

        Event::Tap {
            question,
            tap,
            token,
            message_id,
        } => {
            if !matches!(session.stage, Stage::Question(_)) {
                tracing::debug!(stage = ?session.stage, question, "tap outside a question ignored");
                return Ok(vec![]);
            }
            if is_duplicate(session, &token) {
                return Ok(vec![]);
            }
            session.last_event_token = Some(token);
            Ok(handle_tap(session, catalog, question, tap, message_id))
        }

        Event::Text(text) => {
            let question = current_question(session)?;
            session.answers.entry(question).or_default().push(text);
            Ok(advance(session, catalog, question))
        }

        Event::Voice {
            file_id,
            message_id,
        } => {
            let question = current_question(session)?;
            session
                .answers
                .entry(question)
                .or_default()
                .push(format!("[voice message] (file_id: {file_id})"));
            session.pending_forwards.push(VoiceForward {
                question_id: question,
                message_id,
            });
            Ok(advance(session, catalog, question))
        }

        Event::Unsupported => {
            if matches!(session.stage, Stage::Question(_)) {
                Ok(vec![Effect::AskForTextOrVoice])
            } else {
                Ok(vec![])
            }
        }
    }
}

/// Duplicate-delivery guard: compares only the immediately previous token, so
/// a token can legitimately reappear after an intervening event.
fn is_duplicate(session: &Session, token: &str) -> bool {
    if session.last_event_token.as_deref() == Some(token) {
        tracing::debug!(token, "duplicate button event ignored");
        true
    } else {
        false
    }
}

fn current_question(session: &Session) -> Result<usize, SurveyError> {
    match session.stage {
        Stage::Question(id) => Ok(id),
        _ => Err(SurveyError::OrphanedInput),
    }
}

fn handle_tap(
    session: &mut Session,
    catalog: &Catalog,
    question: usize,
    tap: Tap,
    message_id: i64,
) -> Vec<Effect> {
    let Some(definition) = catalog.get(question) else {
        tracing::warn!(question, "tap references a question outside the catalog");
        return vec![];
    };
    let QuestionKind::Choice {
        options,
        mode,
        allow_custom,
    } = &definition.kind
    else {
        tracing::debug!(question, "tap on a free-form question ignored");
        return vec![];
    };

    // Trust the tapped keyboard: a stale keyboard from an earlier question
    // moves the in-flight pointer back to that question, as the original
    // callback routing did.
    session.stage = Stage::Question(question);

    match tap {
        Tap::Custom => {
            if *allow_custom {
                vec![Effect::PromptCustomAnswer]
            } else {
                vec![]
            }
        }

        Tap::Option(index) => {
            let Some(label) = options.get(index) else {
                tracing::warn!(question, index, "tap references an unknown option");
                return vec![];
            };
            match mode {
                ChoiceMode::Exclusive => {
                    session.answers.insert(question, vec![label.clone()]);
                    let mut effects = vec![Effect::RerenderQuestion {
                        question,
                        message_id,
                    }];
                    effects.extend(advance(session, catalog, question));
                    effects
                }
                ChoiceMode::Multi => {
                    let entries = session.answers.entry(question).or_default();
                    if let Some(position) = entries.iter().position(|entry| entry == label) {
                        entries.remove(position);
                    } else {
                        entries.push(label.clone());
                    }
                    vec![Effect::RerenderQuestion {
                        question,
                        message_id,
                    }]
                }
            }
        }

        Tap::Done => advance(session, catalog, question),
    }
}

fn advance(session: &mut Session, catalog: &Catalog, question: usize) -> Vec<Effect> {
    let next = question + 1;
    if next < catalog.len() {
        session.stage = Stage::Question(next);
        vec![Effect::AskQuestion(next)]
    } else {
        session.stage = Stage::Terminated;
        vec![Effect::Complete]
    }
}
