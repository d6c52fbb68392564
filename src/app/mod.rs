//! Event-loop glue: decodes inbound transport events into machine events,
//! applies the resulting effects, and owns the session registry lifecycle.

use crate::error::SurveyError;
use crate::survey::render::{self, CallbackAction};
use crate::survey::{machine, reporter, Catalog, Effect, Event, Session, SessionRegistry, Stage};
use crate::transport::{Inbound, MessageBody, Transport, UserMeta};
use std::sync::Arc;
use tokio::sync::mpsc;

pub struct SurveyBot {
    transport: Arc<dyn Transport>,
    catalog: Arc<Catalog>,
    sessions: SessionRegistry,
    admin_chat_id: i64,
}

impl SurveyBot {
    pub fn new(transport: Arc<dyn Transport>, catalog: Catalog, admin_chat_id: i64) -> Arc<Self> {
        Arc::new(Self {
            transport,
            catalog: Arc::new(catalog),
            sessions: SessionRegistry::new(),
            admin_chat_id,
        })
    }

    /// Consume inbound events until the channel closes. Each event runs in
    /// its own task; the per-user session mutex keeps one user's events
    /// strictly sequential while different users proceed in parallel.
    pub async fn run(self: Arc<Self>, mut rx: mpsc::Receiver<Inbound>) {
        while let Some(inbound) = rx.recv().await {
            let bot = Arc::clone(&self);
            tokio::spawn(async move {
                bot.handle_inbound(inbound).await;
            });
        }
        tracing::info!("inbound channel closed, survey bot shutting down");
    }

    /// Process a single inbound event end to end.
    pub async fn handle_inbound(&self, inbound: Inbound) {
        let chat_id = inbound.chat_id();
        let user = inbound.user().clone();

        let event = match inbound {
            Inbound::Command { name, .. } => match name.as_str() {
                "start" => Event::Start,
                "cancel" => Event::Cancel,
                other => {
                    tracing::debug!(command = other, "unknown command ignored");
                    return;
                }
            },

            Inbound::CallbackQuery {
                id,
                data,
                message_id,
                ..
            } => {
                // Ack first so the client drops its loading spinner even if
                // the tap turns out to be stale.
                if let Err(error) = self.transport.answer_callback(&id).await {
                    tracing::warn!(%error, "failed to answer callback query");
                }
                match render::parse_callback(&data) {
                    Some(CallbackAction::Begin) => Event::Begin { token: id },
                    Some(CallbackAction::Tap { question, tap }) => Event::Tap {
                        question,
                        tap,
                        token: id,
                        message_id,
                    },
                    None => {
                        tracing::debug!(data, "unrecognized callback data ignored");
                        return;
                    }
                }
            }

            Inbound::Message {
                message_id, body, ..
            } => match body {
                MessageBody::Text(text) => Event::Text(text),
                MessageBody::Voice { file_id } => Event::Voice {
                    file_id,
                    message_id,
                },
                MessageBody::Unsupported => Event::Unsupported,
            },
        };

        let slot = self.sessions.slot(user.id);
        let mut session = slot.lock().await;

        match machine::handle(&mut session, &self.catalog, event) {
            Ok(effects) => {
                self.apply_effects(chat_id, &user, &session, effects).await;
            }
            Err(SurveyError::OrphanedInput) => {
                tracing::warn!(user_id = user.id, "input with no question in flight");
                self.send_plain(chat_id, render::RESTART_PROMPT).await;
            }
            Err(error) => {
                tracing::warn!(user_id = user.id, %error, "event rejected");
            }
        }

        let terminated = session.stage == Stage::Terminated;
        drop(session);
        if terminated {
            self.sessions.remove(user.id);
        }
    }

    async fn apply_effects(
        &self,
        chat_id: i64,
        user: &UserMeta,
        session: &Session,
        effects: Vec<Effect>,
    ) {
        for effect in effects {
            match effect {
                Effect::SendWelcome => {
                    let keyboard = render::welcome_keyboard();
                    if let Err(error) = self
                        .transport
                        .send_message(chat_id, render::WELCOME_TEXT, Some(&keyboard))
                        .await
                    {
                        tracing::warn!(chat_id, %error, "failed to send welcome");
                    }
                }

                Effect::AskQuestion(question) => {
                    self.ask_question(chat_id, session, question).await;
                }

                Effect::RerenderQuestion {
                    question,
                    message_id,
                } => {
                    self.rerender_question(chat_id, message_id, session, question)
                        .await;
                }

                Effect::PromptCustomAnswer => {
                    self.send_plain(chat_id, render::CUSTOM_ANSWER_PROMPT).await;
                }

                Effect::AskForTextOrVoice => {
                    self.send_plain(chat_id, render::TEXT_OR_VOICE_PROMPT).await;
                }

                Effect::SendCancelled => {
                    self.send_plain(chat_id, render::CANCELLED_TEXT).await;
                }

                Effect::Complete => {
                    tracing::info!(user_id = user.id, "survey completed, reporting");
                    reporter::deliver(
                        self.transport.as_ref(),
                        self.admin_chat_id,
                        chat_id,
                        user,
                        &self.catalog,
                        session,
                    )
                    .await;
                }
            }
        }
    }

    async fn ask_question(&self, chat_id: i64, session: &Session, question: usize) {
        let Some(definition) = self.catalog.get(question) else {
            tracing::warn!(question, "asked to render a question outside the catalog");
            return;
        };
        let selected = session.selected(question);
        let text = render::question_text(definition, selected);
        let keyboard = render::question_keyboard(definition, selected);
        if let Err(error) = self
            .transport
            .send_message(chat_id, &text, keyboard.as_ref())
            .await
        {
            tracing::warn!(chat_id, question, %error, "failed to send question");
        }
    }

    async fn rerender_question(
        &self,
        chat_id: i64,
        message_id: i64,
        session: &Session,
        question: usize,
    ) {
        let Some(definition) = self.catalog.get(question) else {
            return;
        };
        let selected = session.selected(question);
        let text = render::question_text(definition, selected);
        let keyboard = render::question_keyboard(definition, selected);
        if let Err(error) = self
            .transport
            .edit_message(chat_id, message_id, &text, keyboard.as_ref())
            .await
        {
            tracing::warn!(chat_id, question, %error, "failed to re-render question");
        }
    }

    async fn send_plain(&self, chat_id: i64, text: &str) {
        if let Err(error) = self.transport.send_message(chat_id, text, None).await {
            tracing::warn!(chat_id, %error, "failed to send message");
        }
    }

    /// Number of sessions currently held in memory.
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }
}
