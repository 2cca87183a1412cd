//! Classification of user input

use regex::Regex;
use std::sync::LazyLock;

/// Greetings restart the conversation from the top-level menu
static GREETING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(hi|hello|hey|good\s+morning|good\s+afternoon|good\s+evening|greetings)[\s\p{P}]*$",
    )
    .expect("greeting pattern is valid")
});

/// Job numbers look like `JOB-20251204-A5E92`
static JOB_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^job-[a-z0-9-]*$").expect("job number pattern is valid"));

pub fn is_greeting(text: &str) -> bool {
    GREETING.is_match(text.trim())
}

pub fn is_job_number(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && JOB_NUMBER.is_match(trimmed)
}

/// Trim and canonicalize user input before it enters the session
pub fn normalize_input(input: &str) -> String {
    let trimmed = input.trim();
    if is_job_number(trimmed) {
        trimmed.to_uppercase()
    } else {
        trimmed.to_string()
    }
}
