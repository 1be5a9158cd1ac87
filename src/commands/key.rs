use anyhow::{Result, bail};

use crate::llm::Settings;
use crate::llm::prompt_user::prompt_for_api_key;
use crate::llm::settings::{API_KEY_ENV, KeySource};
use crate::palette::Palette;
use crate::store::KeyValueStore;

pub enum KeyAction {
    /// `None` asks for the key interactively.
    Set(Option<String>),
    Clear,
    Status,
}

pub fn run<S: KeyValueStore>(settings: &mut Settings<S>, action: KeyAction) -> Result<()> {
    match action {
        KeyAction::Set(candidate) => {
            let candidate = match candidate {
                Some(key) => key,
                None => prompt_for_api_key()?,
            };
            if !settings.set_key(Some(&candidate))? {
                bail!("No API key provided. Pass --set <KEY> or set {API_KEY_ENV}.");
            }
            println!("Stored Gemini API key in the local settings file.");
            if settings.key_source() == Some(KeySource::Environment) {
                println!(
                    "{} is set and still takes precedence over the stored key.",
                    Palette::paint(Palette::WARNING, API_KEY_ENV)
                );
            }
        }
        KeyAction::Clear => {
            if settings.clear_key()? {
                println!("Removed the stored Gemini API key.");
            } else {
                println!("No Gemini API key found in the settings file.");
            }
        }
        KeyAction::Status => print_status(settings),
    }
    Ok(())
}

pub fn set_fallback<S: KeyValueStore>(settings: &mut Settings<S>, enabled: bool) -> Result<()> {
    settings.set_fallback_enabled(enabled)?;
    if enabled {
        println!("Fallback enabled: failed generations show pre-written practice.");
    } else {
        println!("Fallback disabled: generation errors are reported.");
    }
    Ok(())
}

fn print_status<S: KeyValueStore>(settings: &Settings<S>) {
    match settings.key_source() {
        Some(source) => println!(
            "Gemini API key: {} (from the {})",
            Palette::paint(Palette::SUCCESS, "configured"),
            source.description()
        ),
        None => println!(
            "Gemini API key: {}. Run `apush key --set` or set {}.",
            Palette::paint(Palette::WARNING, "not set"),
            API_KEY_ENV
        ),
    }
    println!(
        "Fallback: {}",
        if settings.fallback_enabled() {
            Palette::paint(Palette::SUCCESS, "on")
        } else {
            Palette::paint(Palette::DANGER, "off")
        }
    );
}
