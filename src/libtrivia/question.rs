use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 4;

/// Position of a question inside its [`QuestionBank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuestionId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub prompt: String,
    pub image: PathBuf,
    pub options: Vec<String>,
    pub correct_option: String,
    pub category: String,
}

impl Question {
    pub fn is_correct(&self, option: &str) -> bool {
        self.correct_option == option
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("question file {0:?} not found")]
    NotFound(PathBuf),
    #[error("cannot read question file")]
    Read(#[from] io::Error),
    #[error("malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("question {index}: {source}")]
    Entry {
        index: usize,
        #[source]
        source: EntryError,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("missing `{0}`")]
    MissingField(&'static str),
    #[error("needs at least 2 options, found {0}")]
    TooFewOptions(usize),
    #[error("allows at most 4 options, found {0}")]
    TooManyOptions(usize),
    #[error("option {0:?} is listed twice")]
    DuplicateOption(String),
    #[error("correct answer {0:?} is not one of the options")]
    CorrectNotAnOption(String),
}

#[derive(Serialize, Deserialize, Debug)]
pub struct QuestionFile {
    pub questions: Vec<QuestionJson>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct QuestionJson {
    pub question: Option<String>,
    pub image_path: Option<PathBuf>,
    pub options: Option<Vec<String>>,
    pub correct_answer: Option<String>,
    pub category: Option<String>,
}

macro_rules! require {
    ($field:expr, $name:literal) => {
        match $field {
            Some(value) => value,
            None => return Err(EntryError::MissingField($name)),
        }
    };
}

impl QuestionJson {
    pub fn validate(&self) -> Result<Question, EntryError> {
        let prompt = require!(&self.question, "question");
        let image = require!(&self.image_path, "image_path");
        let options = require!(&self.options, "options");
        let correct_option = require!(&self.correct_answer, "correct_answer");
        let category = require!(&self.category, "category");

        if options.len() < MIN_OPTIONS {
            return Err(EntryError::TooFewOptions(options.len()));
        }
        if options.len() > MAX_OPTIONS {
            return Err(EntryError::TooManyOptions(options.len()));
        }
        let mut seen = HashSet::with_capacity(options.len());
        for option in options {
            if !seen.insert(option.as_str()) {
                return Err(EntryError::DuplicateOption(option.clone()));
            }
        }
        if !seen.contains(correct_option.as_str()) {
            return Err(EntryError::CorrectNotAnOption(correct_option.clone()));
        }

        Ok(Question {
            prompt: prompt.clone(),
            image: image.clone(),
            options: options.clone(),
            correct_option: correct_option.clone(),
            category: category.clone(),
        })
    }
}

impl QuestionFile {
    pub fn read(path: impl AsRef<Path>) -> Result<QuestionFile, LoadError> {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(LoadError::NotFound(path.to_path_buf()))
            }
            Err(err) => return Err(err.into()),
        };
        Self::parse(&json)
    }

    pub fn parse(json: &str) -> Result<QuestionFile, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validates every entry independently, in file order.
    pub fn entries(&self) -> impl Iterator<Item = Result<Question, EntryError>> + '_ {
        self.questions.iter().map(QuestionJson::validate)
    }
}

/// Immutable set of questions for one run of the game.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Loads every question from `path`, rejecting the whole file on the first invalid entry.
    pub fn load(path: impl AsRef<Path>) -> Result<QuestionBank, LoadError> {
        let now = Instant::now();
        let file = QuestionFile::read(path)?;
        let bank = Self::from_file(&file)?;
        debug!(
            "[Bank] Loaded {} questions in {} ms.",
            bank.len(),
            now.elapsed().as_millis()
        );
        Ok(bank)
    }

    pub fn from_json(json: &str) -> Result<QuestionBank, LoadError> {
        Self::from_file(&QuestionFile::parse(json)?)
    }

    fn from_file(file: &QuestionFile) -> Result<QuestionBank, LoadError> {
        let questions = file
            .entries()
            .enumerate()
            .map(|(index, entry)| {
                entry.map_err(|source| {
                    warn!("[Bank] Rejecting question {}: {}", index, source);
                    LoadError::Entry { index, source }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(questions))
    }

    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.questions.get(id.0)
    }

    pub fn ids(&self) -> impl Iterator<Item = QuestionId> {
        (0..self.questions.len()).map(QuestionId)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
