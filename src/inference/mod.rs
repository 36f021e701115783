// ============================================================================
// Inference - prompt assembly and the hosted model call
// ============================================================================

mod client;
mod prompt;

pub use client::{InferenceClient, InferenceError, TogetherClient, TogetherClientConfig};
pub use prompt::build_prompt;

#[cfg(test)]
pub use client::ScriptedCompletionClient;

/// Cap a string for log output, noting how much was cut.
pub(crate) fn truncate_for_log(input: &str, max_chars: usize) -> String {
    let char_count = input.chars().count();
    if char_count <= max_chars {
        return input.to_string();
    }
    let mut preview: String = input.chars().take(max_chars).collect();
    preview.push_str(&format!("... [truncated, total_chars={}]", char_count));
    preview
}
