//! Provider-family classification by model name.
//!
//! The matching rules live here and nowhere else; adding a model variant must
//! never require touching encoder or normalizer logic.

/// The backend family a model name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderFamily {
    OpenAi,
    Anthropic,
    Google,
    Unknown,
}

/// Model-name prefixes that select the OpenAI family.
const OPENAI_PREFIXES: &[&str] = &["gpt-", "chatgpt-", "o1", "o3", "o4"];
/// Substrings (any position) per family.
const OPENAI_SUBSTRINGS: &[&str] = &["gpt"];
const ANTHROPIC_SUBSTRINGS: &[&str] = &["claude"];
const GOOGLE_SUBSTRINGS: &[&str] = &["gemini"];

/// Classify a model identifier into its provider family.
///
/// Case-insensitive prefix/substring matching. Unknown or empty names yield
/// [`ProviderFamily::Unknown`]; callers treat that as "no family match" and
/// take the conservative path.
pub fn classify_model(model: &str) -> ProviderFamily {
    let m = model.trim().to_ascii_lowercase();
    if m.is_empty() {
        return ProviderFamily::Unknown;
    }
    if ANTHROPIC_SUBSTRINGS.iter().any(|s| m.contains(s)) {
        return ProviderFamily::Anthropic;
    }
    if GOOGLE_SUBSTRINGS.iter().any(|s| m.contains(s)) {
        return ProviderFamily::Google;
    }
    if OPENAI_PREFIXES.iter().any(|p| m.starts_with(p))
        || OPENAI_SUBSTRINGS.iter().any(|s| m.contains(s))
    {
        return ProviderFamily::OpenAi;
    }
    ProviderFamily::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_openai_models() {
        assert_eq!(classify_model("gpt-4o"), ProviderFamily::OpenAi);
        assert_eq!(classify_model("gpt-4"), ProviderFamily::OpenAi);
        assert_eq!(classify_model("o1-preview"), ProviderFamily::OpenAi);
        assert_eq!(classify_model("o3-mini"), ProviderFamily::OpenAi);
        assert_eq!(classify_model("chatgpt-4o-latest"), ProviderFamily::OpenAi);
    }

    #[test]
    fn classifies_anthropic_models() {
        assert_eq!(classify_model("claude-sonnet-4"), ProviderFamily::Anthropic);
        assert_eq!(
            classify_model("claude-3-5-haiku-20241022"),
            ProviderFamily::Anthropic
        );
    }

    #[test]
    fn classifies_google_models() {
        assert_eq!(classify_model("gemini-2.0-flash"), ProviderFamily::Google);
        assert_eq!(classify_model("gemini-1.5-pro"), ProviderFamily::Google);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify_model("GPT-4o"), ProviderFamily::OpenAi);
        assert_eq!(classify_model("Claude-Sonnet-4"), ProviderFamily::Anthropic);
        assert_eq!(classify_model("GEMINI-2.0-FLASH"), ProviderFamily::Google);
    }

    #[test]
    fn unknown_names_do_not_panic() {
        assert_eq!(classify_model("llama-3.3-70b"), ProviderFamily::Unknown);
        assert_eq!(classify_model(""), ProviderFamily::Unknown);
        assert_eq!(classify_model("   "), ProviderFamily::Unknown);
    }
}
