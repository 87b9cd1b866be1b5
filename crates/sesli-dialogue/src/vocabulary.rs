//! Keyword vocabulary for yes/no and next/clear answers.
//!
//! Answers are trimmed and folded with Turkish casing rules, diacritics are
//! stripped on both sides, and a token matches when it occurs anywhere in the
//! answer. Affirmative wins over negative and next wins over clear when an
//! answer contains both.

use sesli_core::config::DialogueConfig;
use sesli_core::text::fold_loose;

/// What an answer means in the phase it was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Affirm,
    Deny,
    Next,
    Clear,
    /// Nothing from the expected vocabulary.
    NotUnderstood,
}

#[derive(Debug, Clone)]
pub struct Vocabulary {
    affirmative: Vec<String>,
    negative: Vec<String>,
    next: Vec<String>,
    clear: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::from_config(&DialogueConfig::default())
    }
}

fn folded(tokens: &[String]) -> Vec<String> {
    tokens
        .iter()
        .map(|t| fold_loose(t.trim()))
        .filter(|t| !t.is_empty())
        .collect()
}

fn any_in(answer: &str, tokens: &[String]) -> bool {
    tokens.iter().any(|t| answer.contains(t.as_str()))
}

impl Vocabulary {
    pub fn from_config(config: &DialogueConfig) -> Self {
        Self {
            affirmative: folded(&config.affirmative),
            negative: folded(&config.negative),
            next: folded(&config.next),
            clear: folded(&config.clear),
        }
    }

    /// Interpret an answer to "do you want more information?".
    pub fn confirmation(&self, answer: &str) -> Reply {
        let answer = fold_loose(answer.trim());
        if any_in(&answer, &self.affirmative) {
            Reply::Affirm
        } else if any_in(&answer, &self.negative) {
            Reply::Deny
        } else {
            Reply::NotUnderstood
        }
    }

    /// Interpret an answer to "next result or clear?".
    pub fn navigation(&self, answer: &str) -> Reply {
        let answer = fold_loose(answer.trim());
        if any_in(&answer, &self.next) {
            Reply::Next
        } else if any_in(&answer, &self.clear) {
            Reply::Clear
        } else {
            Reply::NotUnderstood
        }
    }
}
