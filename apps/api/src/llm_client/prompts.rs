// Shared prompt fragments.
// Category-specific templates live next to the studio in studio/prompts.rs.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences around the JSON. \
    Do NOT include explanations or apologies.";

/// Appended to every generation prompt. Keeps copy factual for a real small business.
pub const BRAND_SAFETY_INSTRUCTION: &str = "\
    CRITICAL: Write only claims a small local business can stand behind. \
    Do NOT invent statistics, awards, certifications, reviews, or client names. \
    Do NOT promise guaranteed rankings, revenue, or results. \
    If a detail is not provided, write around it instead of making it up.";

/// Appended to every generation prompt. Pushes the model away from recycled copy.
pub const ORIGINALITY_INSTRUCTION: &str = "\
    CRITICAL: The piece must be original. Do NOT reuse or lightly reword any title \
    listed under TITLES ALREADY USED. Choose a distinct angle, structure, and headline.";
