use crate::config::{QuestionConfig, SurveyConfig};
use crate::error::SurveyError;

/// How selections accumulate for a choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceMode {
    /// Options toggle in and out of the answer set; a Done button confirms.
    Multi,
    /// Only the latest selection is kept; advances as soon as one is tapped.
    Exclusive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    FreeForm,
    Choice {
        options: Vec<String>,
        mode: ChoiceMode,
        /// Renders an extra "Other" button that redirects to free text/voice.
        allow_custom: bool,
    },
}

/// A single survey question. `id` is both identity and traversal position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: usize,
    pub prompt: String,
    pub kind: QuestionKind,
}

impl Question {
    pub fn is_choice(&self) -> bool {
        matches!(self.kind, QuestionKind::Choice { .. })
    }

    pub fn is_exclusive(&self) -> bool {
        matches!(
            self.kind,
            QuestionKind::Choice {
                mode: ChoiceMode::Exclusive,
                ..
            }
        )
    }
}

/// Ordered, immutable question list. Ids are dense and start at 0, so the
/// catalog order is also the traversal order.
#[derive(Debug, Clone)]
pub struct Catalog {
    questions: Vec<Question>,
}

impl Catalog {
    pub fn new(questions: Vec<Question>) -> Result<Self, SurveyError> {
        if questions.is_empty() {
            return Err(SurveyError::Catalog("survey has no questions".into()));
        }
        for (position, question) in questions.iter().enumerate() {
            if question.id != position {
                return Err(SurveyError::Catalog(format!(
                    "question id {} at position {position} breaks the dense ordering",
                    question.id
                )));
            }
            if question.prompt.trim().is_empty() {
                return Err(SurveyError::Catalog(format!(
                    "question {} has an empty prompt",
                    question.id
                )));
            }
            if let QuestionKind::Choice { options, .. } = &question.kind {
                if options.is_empty() {
                    return Err(SurveyError::Catalog(format!(
                        "choice question {} has no options",
                        question.id
                    )));
                }
                for (i, label) in options.iter().enumerate() {
                    if options[..i].contains(label) {
                        return Err(SurveyError::Catalog(format!(
                            "choice question {} repeats option {label:?}",
                            question.id
                        )));
                    }
                }
            }
        }
        Ok(Self { questions })
    }

    /// Builds a catalog from the `[[survey.questions]]` config tables, or the
    /// built-in default survey when the config carries none.
    pub fn from_config(survey: Option<&SurveyConfig>) -> Result<Self, SurveyError> {
        let Some(survey) = survey else {
            return Ok(Self::default_survey());
        };
        let questions = survey
            .questions
            .iter()
            .enumerate()
            .map(|(id, q)| question_from_config(id, q))
            .collect();
        Self::new(questions)
    }

    /// The stock feedback survey shipped with the bot.
    pub fn default_survey() -> Self {
        let questions = vec![
            Question {
                id: 0,
                prompt: "How did you hear about us?".into(),
                kind: QuestionKind::Choice {
                    options: vec![
                        "A friend or colleague".into(),
                        "Social media".into(),
                        "Search engine".into(),
                    ],
                    mode: ChoiceMode::Multi,
                    allow_custom: true,
                },
            },
            Question {
                id: 1,
                prompt: "How satisfied are you overall?".into(),
                kind: QuestionKind::Choice {
                    options: vec![
                        "Very satisfied".into(),
                        "Somewhat satisfied".into(),
                        "Not satisfied".into(),
                    ],
                    mode: ChoiceMode::Exclusive,
                    allow_custom: false,
                },
            },
            Question {
                id: 2,
                prompt: "What could we improve? Feel free to answer with a voice message.".into(),
                kind: QuestionKind::FreeForm,
            },
        ];
        Self { questions }
    }

    pub fn get(&self, id: usize) -> Option<&Question> {
        self.questions.get(id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}

fn question_from_config(id: usize, config: &QuestionConfig) -> Question {
    let kind = if config.options.is_empty() {
        QuestionKind::FreeForm
    } else {
        QuestionKind::Choice {
            options: config.options.clone(),
            mode: if config.exclusive {
                ChoiceMode::Exclusive
            } else {
                ChoiceMode::Multi
            },
            allow_custom: config.allow_custom,
        }
    };
    Question {
        id,
        prompt: config.prompt.clone(),
        kind,
    }
}
