use anyhow::Result;
use dialoguer::{Password, theme::ColorfulTheme};

use crate::llm::ItemKind;
use crate::palette::Palette;
use crate::period::Period;
use crate::resources::Resource;
use crate::utils::strip_controls_and_escapes;

pub fn prompt_for_api_key() -> Result<String> {
    println!(
        "{} (https://aistudio.google.com/app/apikey) to enable AI practice questions. It's stored locally for future use.",
        Palette::paint(Palette::SUCCESS, "Enter your Gemini API key")
    );
    println!(
        "{}",
        Palette::dim("This feature is optional, leave the field blank to skip.")
    );
    let raw_password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("API Key")
        .allow_empty_password(true)
        .interact()?;

    Ok(strip_controls_and_escapes(&raw_password))
}

pub fn fallback_notice(kind: ItemKind, period: &Period, resources: &[&Resource]) -> String {
    let mut notice = format!(
        "\n{} couldn't generate a {} for Period {}: {}.\n",
        Palette::paint(Palette::INFO, "apush"),
        kind.abbreviation(),
        period.number,
        period.name
    );

    if resources.is_empty() {
        notice.push_str(&format!(
            "{}\n",
            Palette::dim("No pre-written practice matches this period yet.")
        ));
        return notice;
    }

    notice.push_str(&format!(
        "{}\n",
        Palette::dim("Try this pre-written practice instead:")
    ));
    for resource in resources {
        notice.push_str(&format!(
            "  {} {}\n    {}\n",
            Palette::paint(Palette::ACCENT, resource.title),
            Palette::dim(format!("({})", resource.period)),
            resource.description
        ));
    }
    notice
}
