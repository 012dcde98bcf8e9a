use anyhow::{anyhow, Result};
use serde::Serialize;

pub const DEFAULT_VOICE: &str = "alloy";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Voice {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub static VOICES: [Voice; 6] = [
    Voice {
        id: "alloy",
        name: "Alloy",
        description: "Neutral, balanced voice",
    },
    Voice {
        id: "echo",
        name: "Echo",
        description: "Male, clear voice",
    },
    Voice {
        id: "fable",
        name: "Fable",
        description: "British accent, expressive",
    },
    Voice {
        id: "onyx",
        name: "Onyx",
        description: "Deep, authoritative voice",
    },
    Voice {
        id: "nova",
        name: "Nova",
        description: "Female, warm voice",
    },
    Voice {
        id: "shimmer",
        name: "Shimmer",
        description: "Soft, friendly voice",
    },
];

/// Looks up a voice by id, ignoring case and surrounding whitespace.
pub fn find_voice(id: &str) -> Result<&'static Voice> {
    let wanted = id.trim();
    VOICES
        .iter()
        .find(|voice| voice.id.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| anyhow!("unknown voice \"{wanted}\""))
}
