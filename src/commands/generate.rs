use anyhow::{Context, Result};

use crate::llm::prompt_user::fallback_notice;
use crate::llm::{GeminiClient, GeneratedItem, GenerationRequest, ItemKind, Settings};
use crate::palette::Palette;
use crate::period::Period;
use crate::progress::Progress;
use crate::resources::fallback_resources;
use crate::store::KeyValueStore;
use crate::utils::pluralize;

pub async fn run<S: KeyValueStore, P: KeyValueStore>(
    client: &GeminiClient,
    settings: &Settings<S>,
    progress_store: &mut P,
    request: GenerationRequest<'_>,
) -> Result<Option<GeneratedItem>> {
    let item = client.generate(settings, &request).await.with_context(|| {
        format!(
            "Failed to generate a {} for Period {}",
            request.kind.title(),
            request.period.number
        )
    })?;

    match &item {
        Some(generated) => {
            println!("{}", serde_json::to_string_pretty(generated)?);
            if generated.kind() == ItemKind::ShortAnswer {
                record_practice(progress_store, 1)?;
            }
        }
        None => print_fallback(request.kind, request.period),
    }

    Ok(item)
}

pub async fn run_batch<S: KeyValueStore, P: KeyValueStore>(
    client: &GeminiClient,
    settings: &Settings<S>,
    progress_store: &mut P,
    period: &Period,
    count: usize,
) -> Result<usize> {
    let questions = client.generate_batch(settings, period, count).await;

    if questions.is_empty() {
        print_fallback(ItemKind::ShortAnswer, period);
        return Ok(0);
    }

    println!("{}", serde_json::to_string_pretty(&questions)?);
    eprintln!(
        "Generated {} of {} requested.",
        Palette::paint(Palette::SUCCESS, pluralize("question", questions.len())),
        count
    );
    record_practice(progress_store, questions.len() as u32)?;
    Ok(questions.len())
}

fn print_fallback(kind: ItemKind, period: &Period) {
    let resources = fallback_resources(kind, period.number);
    eprint!("{}", fallback_notice(kind, period, &resources));
}

fn record_practice<P: KeyValueStore>(store: &mut P, questions: u32) -> Result<()> {
    let mut progress = Progress::load(&*store).context("Failed to load study progress")?;
    progress.record_practice(questions);
    progress
        .save(store)
        .context("Failed to save study progress")?;
    Ok(())
}
