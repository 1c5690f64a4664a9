//! Cleanup applied to raw model output.

/// Trims surrounding whitespace.
///
/// ```
/// assert_eq!(wayfinder_models::postprocess::clean_text("  Eiffel Tower  "), "Eiffel Tower");
/// ```
#[must_use]
pub fn clean_text(raw: &str) -> String {
    raw.trim().to_string()
}

/// Removes a prompt echoed at the start of generated text, then trims.
///
/// Text that does not start with the prompt is only trimmed.
#[must_use]
pub fn strip_prompt(generated: &str, prompt: &str) -> String {
    generated
        .strip_prefix(prompt)
        .unwrap_or(generated)
        .trim()
        .to_string()
}

/// When to retry a generation that came back too short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Descriptions shorter than this many characters are retried.
    pub min_chars: usize,
    /// Added to the length budget on each retry.
    pub length_step: usize,
    /// No retry is made once the budget reaches this value.
    pub length_cap: usize,
    /// Maximum number of retries.
    pub max_retries: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            min_chars: 50,
            length_step: 50,
            length_cap: 200,
            max_retries: 1,
        }
    }
}

impl RetryPolicy {
    /// Returns the budget for the next attempt, or `None` to accept `text`.
    ///
    /// ```
    /// use wayfinder_models::postprocess::RetryPolicy;
    ///
    /// let policy = RetryPolicy::default();
    /// assert_eq!(policy.next_budget("too short", 150, 0), Some(200));
    /// assert_eq!(policy.next_budget("too short", 200, 0), None);
    /// assert_eq!(policy.next_budget("too short", 150, 1), None);
    /// ```
    #[must_use]
    pub fn next_budget(&self, text: &str, current: usize, retries: usize) -> Option<usize> {
        let short = text.chars().count() < self.min_chars;
        (short && retries < self.max_retries && current < self.length_cap)
            .then(|| current.saturating_add(self.length_step))
    }
}
