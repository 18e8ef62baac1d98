//! Fixed registry of Bambara speaker identities.
//!
//! The checkpoint was trained with a closed set of discrete speaker tags, so
//! the registry is process-wide static configuration: built once, never
//! mutated. Name resolution goes through an explicit mapping with defined
//! error behavior on a miss.

use std::fmt;

use crate::error::{Result, TtsError};

/// Speaker identifiers understood by the current checkpoint, in registry
/// order. Version this table together with the model weights.
pub const SPEAKER_IDS: [&str; 5] = [
    "SPEAKER_1",
    "SPEAKER_2",
    "SPEAKER_3",
    "SPEAKER_4",
    "SPEAKER_5",
];

/// Display-name bindings, case-sensitive.
const NAMED_SPEAKERS: [(&str, Speaker); 5] = [
    ("Adame", Speaker::ADAME),
    ("Moussa", Speaker::MOUSSA),
    ("Bourama", Speaker::BOURAMA),
    ("Modibo", Speaker::MODIBO),
    ("Seydou", Speaker::SEYDOU),
];

const SPEAKER_NAMES: [&str; 5] = ["Adame", "Moussa", "Bourama", "Modibo", "Seydou"];

/// A validated speaker identity. Immutable once constructed; the only ways
/// to obtain one are the named constants, [`Speaker::new`] and
/// [`Speaker::by_name`], all of which go through the registry enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Speaker {
    id: &'static str,
}

impl Speaker {
    pub const ADAME: Speaker = Speaker { id: "SPEAKER_1" };
    pub const MOUSSA: Speaker = Speaker { id: "SPEAKER_2" };
    pub const BOURAMA: Speaker = Speaker { id: "SPEAKER_3" };
    pub const MODIBO: Speaker = Speaker { id: "SPEAKER_4" };
    pub const SEYDOU: Speaker = Speaker { id: "SPEAKER_5" };

    /// Validate `id` against the registry enumeration.
    pub fn new(id: &str) -> Result<Self> {
        SPEAKER_IDS
            .iter()
            .find(|&&known| known == id)
            .map(|&known| Speaker { id: known })
            .ok_or_else(|| TtsError::UnsupportedSpeaker {
                id: id.to_string(),
                available: &SPEAKER_IDS,
            })
    }

    /// Case-sensitive exact-match lookup by display name.
    pub fn by_name(name: &str) -> Result<Self> {
        NAMED_SPEAKERS
            .iter()
            .find(|(known, _)| *known == name)
            .map(|&(_, speaker)| speaker)
            .ok_or_else(|| TtsError::UnknownSpeakerName {
                name: name.to_string(),
                available: &SPEAKER_NAMES,
            })
    }

    /// All registered speakers, in registry order.
    pub fn all() -> impl Iterator<Item = Speaker> {
        NAMED_SPEAKERS.iter().map(|&(_, speaker)| speaker)
    }

    /// The raw identifier as it appears in the prompt.
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// The display name bound to this speaker.
    pub fn name(&self) -> &'static str {
        NAMED_SPEAKERS
            .iter()
            .find(|&&(_, speaker)| speaker == *self)
            .map(|&(name, _)| name)
            .unwrap_or(self.id)
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Speaker({})", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ids_round_trip() {
        for id in SPEAKER_IDS {
            let speaker = Speaker::new(id).unwrap();
            assert_eq!(speaker.id(), id);
        }
    }

    #[test]
    fn unknown_id_is_rejected() {
        let err = Speaker::new("SPEAKER_9").unwrap_err();
        assert!(err.is_input_error());
        assert!(err.to_string().contains("SPEAKER_1"));
    }

    #[test]
    fn lookup_by_name_is_case_sensitive() {
        assert_eq!(Speaker::by_name("Moussa").unwrap(), Speaker::MOUSSA);
        let err = Speaker::by_name("moussa").unwrap_err();
        assert!(err.is_input_error());
        // A miss must enumerate the valid names.
        let msg = err.to_string();
        for name in SPEAKER_NAMES {
            assert!(msg.contains(name), "missing {name} in {msg}");
        }
    }

    #[test]
    fn all_speakers_are_listed_in_order() {
        let ids: Vec<&str> = Speaker::all().map(|s| s.id()).collect();
        assert_eq!(ids, SPEAKER_IDS);
    }
}
