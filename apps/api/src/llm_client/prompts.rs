// Cross-cutting prompt fragments shared by every generation prompt.
// Category-specific templates live in generation/prompts.rs.

/// Appended to every system prompt so providers return publishable text only.
pub const PLAIN_OUTPUT_INSTRUCTION: &str = "\
    Respond with the finished content only. \
    Do NOT add a preamble, explanations, or notes about what you wrote. \
    Do NOT wrap the content in code fences or quotation marks.";

/// Keeps keyword usage readable.
pub const ORGANIC_KEYWORDS_INSTRUCTION: &str = "\
    Incorporate these keywords naturally and organically. \
    Never stuff keywords or repeat them unnaturally.";
