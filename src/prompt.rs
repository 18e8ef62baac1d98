//! Prompt construction for the Spark-TTS control-token format.

use crate::protocol::{END_CONTENT, START_CONTENT, START_GLOBAL_TOKEN, TASK_TTS};
use crate::speakers::Speaker;

/// Format `text` (optionally tagged with a speaker) into the structured
/// prompt consumed by the language model.
///
/// The output is deterministic: identical inputs yield byte-identical
/// prompts. User text containing control-marker substrings is passed through
/// unescaped; the checkpoint defines no escaping mechanism, so such text can
/// corrupt the prompt structure. Callers that accept untrusted input should
/// filter it themselves.
pub fn build(text: &str, speaker: Option<&Speaker>) -> String {
    let tagged = match speaker {
        Some(speaker) => format!("{}: {}", speaker.id(), text),
        None => text.to_string(),
    };
    let mut prompt = String::with_capacity(
        TASK_TTS.len()
            + START_CONTENT.len()
            + tagged.len()
            + END_CONTENT.len()
            + START_GLOBAL_TOKEN.len(),
    );
    prompt.push_str(TASK_TTS);
    prompt.push_str(START_CONTENT);
    prompt.push_str(&tagged);
    prompt.push_str(END_CONTENT);
    prompt.push_str(START_GLOBAL_TOKEN);
    prompt
}
