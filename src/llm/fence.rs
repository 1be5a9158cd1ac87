const FENCE: &str = "```";

/// How a model response was wrapped before parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fence {
    None,
    /// A bare ``` fence.
    Plain,
    /// A fence with a language tag, e.g. ```json.
    Tagged(String),
}

pub fn detect_fence(text: &str) -> Fence {
    let Some(rest) = text.trim().strip_prefix(FENCE) else {
        return Fence::None;
    };

    let tag = language_tag(rest);
    if tag.is_empty() {
        Fence::Plain
    } else {
        Fence::Tagged(tag.to_string())
    }
}

/// Removes a Markdown code fence wrapping `text`, if any, and trims the result.
///
/// Every fence variant is handled the same way, and stripping an already
/// stripped string returns it unchanged.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let opener = match detect_fence(trimmed) {
        Fence::None => return trimmed,
        Fence::Plain => FENCE.len(),
        Fence::Tagged(tag) => FENCE.len() + tag.len(),
    };

    let body = trimmed[opener..].trim_end();
    let body = body.strip_suffix(FENCE).unwrap_or(body);
    body.trim()
}

fn language_tag(after_fence: &str) -> &str {
    let end = after_fence
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '+'))
        .unwrap_or(after_fence.len());
    &after_fence[..end]
}
