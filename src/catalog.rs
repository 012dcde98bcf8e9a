//! Built-in practice phrases.

use std::str::FromStr;

use anyhow::{bail, Error};
use serde::Serialize;

use Category::*;
use Difficulty::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    TongueTwister,
    Conversation,
    Business,
    News,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Phrase {
    pub id: u32,
    pub text: &'static str,
    pub difficulty: Difficulty,
    pub category: Category,
}

const fn phrase(id: u32, text: &'static str, difficulty: Difficulty, category: Category) -> Phrase {
    Phrase {
        id,
        text,
        difficulty,
        category,
    }
}

pub static PHRASES: [Phrase; 10] = [
    phrase(1, "The quick brown fox jumps over the lazy dog", Beginner, TongueTwister),
    phrase(2, "She sells seashells by the seashore", Beginner, TongueTwister),
    phrase(3, "How much wood would a woodchuck chuck", Beginner, TongueTwister),
    phrase(4, "Peter Piper picked a peck of pickled peppers", Intermediate, TongueTwister),
    phrase(5, "I scream, you scream, we all scream for ice cream", Beginner, TongueTwister),
    phrase(6, "The sixth sick sheikh's sixth sheep's sick", Advanced, TongueTwister),
    phrase(7, "Hello, how are you doing today?", Beginner, Conversation),
    phrase(8, "Could you please tell me where the nearest station is?", Intermediate, Conversation),
    phrase(9, "I would like to schedule an appointment for next week", Intermediate, Business),
    phrase(10, "The weather forecast predicts thunderstorms throughout the weekend", Advanced, News),
];

/// Phrases matching every filter that is set.
pub fn phrases(difficulty: Option<Difficulty>, category: Option<Category>) -> Vec<&'static Phrase> {
    PHRASES
        .iter()
        .filter(|p| difficulty.map_or(true, |d| p.difficulty == d))
        .filter(|p| category.map_or(true, |c| p.category == c))
        .collect()
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Beginner),
            "intermediate" => Ok(Intermediate),
            "advanced" => Ok(Advanced),
            other => bail!("unknown difficulty '{other}'"),
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "tongue_twister" => Ok(TongueTwister),
            "conversation" => Ok(Conversation),
            "business" => Ok(Business),
            "news" => Ok(News),
            other => bail!("unknown category '{other}'"),
        }
    }
}
