//! Pure rendering helpers: user-facing strings, inline keyboards, and the
//! callback-data wire format shared between keyboards and the tap parser.

use crate::survey::catalog::{ChoiceMode, Question, QuestionKind};
use crate::survey::machine::Tap;
use crate::transport::{Button, Keyboard};

pub const WELCOME_TEXT: &str = "🌟 Welcome to the survey! 🌟\n\n\
Some questions allow several answers.\n\n\
If none of the options fit, pick \"Other\" and send a text or voice message.\n\n\
Tap the button below to begin!";

pub const CUSTOM_ANSWER_PROMPT: &str =
    "Please type your own answer, or send it as a voice message.";

pub const TEXT_OR_VOICE_PROMPT: &str = "Please send a text or voice message.";

pub const RESTART_PROMPT: &str = "Something went wrong. Please restart the survey with /start.";

pub const CANCELLED_TEXT: &str = "Survey cancelled.";

pub const THANK_YOU_TEXT: &str = "Thank you for your time! 🚀";

const BEGIN_CALLBACK: &str = "start_poll";
const DONE_SUFFIX: &str = "done";
const CUSTOM_SUFFIX: &str = "other";

/// A decoded callback-data payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Begin,
    Tap { question: usize, tap: Tap },
}

pub fn encode_tap(question: usize, tap: &Tap) -> String {
    match tap {
        Tap::Option(index) => format!("{question}_{index}"),
        Tap::Custom => format!("{question}_{CUSTOM_SUFFIX}"),
        Tap::Done => format!("{question}_{DONE_SUFFIX}"),
    }
}

/// Decodes callback data in the `start_poll` / `{q}_{i}` / `{q}_other` /
/// `{q}_done` format. Unknown payloads yield `None` and are dropped upstream.
pub fn parse_callback(data: &str) -> Option<CallbackAction> {
    if data == BEGIN_CALLBACK {
        return Some(CallbackAction::Begin);
    }
    let (question, suffix) = data.split_once('_')?;
    let question = question.parse::<usize>().ok()?;
    let tap = match suffix {
        DONE_SUFFIX => Tap::Done,
        CUSTOM_SUFFIX => Tap::Custom,
        index => Tap::Option(index.parse::<usize>().ok()?),
    };
    Some(CallbackAction::Tap { question, tap })
}

pub fn welcome_keyboard() -> Keyboard {
    Keyboard {
        rows: vec![vec![Button {
            label: "🚀 Start the survey 🚀".into(),
            data: BEGIN_CALLBACK.into(),
        }]],
    }
}

/// The question prompt, with a running tally of what is already selected.
pub fn question_text(question: &Question, selected: &[String]) -> String {
    if selected.is_empty() {
        question.prompt.clone()
    } else {
        format!("{}\n\nSelected: {}", question.prompt, selected.join(", "))
    }
}

/// Inline keyboard for a choice question, `None` for free-form. Selected
/// options get a checkmark prefix; the Done row is suppressed for
/// exclusive-choice questions, which advance on selection.
pub fn question_keyboard(question: &Question, selected: &[String]) -> Option<Keyboard> {
    let QuestionKind::Choice {
        options,
        mode,
        allow_custom,
    } = &question.kind
    else {
        return None;
    };

    let mut rows: Vec<Vec<Button>> = options
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let marked = if selected.contains(label) {
                format!("✔ {label}")
            } else {
                label.clone()
            };
            vec![Button {
                label: marked,
                data: encode_tap(question.id, &Tap::Option(index)),
            }]
        })
        .collect();

    if *allow_custom {
        rows.push(vec![Button {
            label: "✍ Other".into(),
            data: encode_tap(question.id, &Tap::Custom),
        }]);
    }

    if *mode != ChoiceMode::Exclusive {
        rows.push(vec![Button {
            label: "✅ Done ✅".into(),
            data: encode_tap(question.id, &Tap::Done),
        }]);
    }

    Some(Keyboard { rows })
}
