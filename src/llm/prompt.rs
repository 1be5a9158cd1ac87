use crate::period::Period;

use super::item::ItemKind;

pub const PROMPT_THEME_LIMIT: usize = 3;

const SAQ_REQUIREMENTS: &str = r#"- Format as a single question that can be answered in 2-3 sentences
- Include 4 multiple choice options that are plausible but only one is clearly correct
- The correct answer should align with College Board APUSH standards
- Make it specific to this period's content"#;

const SAQ_FORMAT: &str = r#"{
    "question": "The question text here",
    "options": ["Option A", "Option B", "Option C", "Option D"],
    "correct": 0,
    "feedback": "Brief explanation of why the correct answer is right"
}"#;

const DBQ_REQUIREMENTS: &str = r#"- The prompt should align with College Board APUSH DBQ format
- Should be evaluative (evaluate the extent to which...)
- Should be appropriate for a 7-document DBQ
- Make it specific and historically accurate"#;

const DBQ_FORMAT: &str = r#"{
    "prompt": "The full DBQ prompt text here",
    "documents": 7,
    "points": 7,
    "themes": ["Theme 1", "Theme 2", "Theme 3"]
}"#;

const LEQ_REQUIREMENTS: &str = r#"- The prompt should align with College Board APUSH LEQ format
- Should be evaluative (evaluate the extent to which...)
- Should be appropriate for a 6-point LEQ
- Make it specific and historically accurate"#;

const LEQ_FORMAT: &str = r#"{
    "prompt": "The full LEQ prompt text here",
    "points": 6,
    "themes": ["Theme 1", "Theme 2"]
}"#;

/// Renders the instruction sent to the model for one item.
pub fn build_prompt(kind: ItemKind, period: &Period, topic: Option<&str>) -> String {
    let (subject, requirements, shape) = match kind {
        ItemKind::ShortAnswer => ("question", SAQ_REQUIREMENTS, SAQ_FORMAT),
        ItemKind::DocumentBased => ("prompt", DBQ_REQUIREMENTS, DBQ_FORMAT),
        ItemKind::LongEssay => ("prompt", LEQ_REQUIREMENTS, LEQ_FORMAT),
    };

    let themes = prompt_themes(period).join(", ");

    let mut prompt = format!(
        "Generate a {title} ({abbreviation}) for AP U.S. History Period {number}: {name} ({dates}).\n\n\
         Requirements:\n\
         - The {subject} should test understanding of key themes: {themes}\n\
         {requirements}\n\n\
         Return ONLY a single JSON object in this exact format, with these exact field names:\n\
         {shape}\n",
        title = kind.title(),
        abbreviation = kind.abbreviation(),
        number = period.number,
        name = period.name,
        dates = period.dates,
    );

    if let Some(topic) = topic.map(str::trim).filter(|topic| !topic.is_empty()) {
        prompt.push_str(&format!("\nFocus the {subject} on: {topic}\n"));
    }

    prompt
}

fn prompt_themes(period: &Period) -> Vec<&str> {
    period
        .themes
        .iter()
        .take(PROMPT_THEME_LIMIT)
        .map(String::as_str)
        .collect()
}
