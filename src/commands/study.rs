use anyhow::{Context, Result, bail};

use crate::palette::Palette;
use crate::period::Curriculum;
use crate::progress::Progress;
use crate::resources::{CATALOG, DBQ_MAX_SCORE, DbqScore, ResourceFilter};
use crate::store::KeyValueStore;
use crate::utils::pluralize;

pub fn list_periods(curriculum: &Curriculum) {
    for period in curriculum.periods() {
        println!(
            "{} {} {}",
            Palette::paint(Palette::ACCENT, format!("Period {}", period.number)),
            period.name,
            Palette::dim(format!("({})", period.dates))
        );
        if !period.themes.is_empty() {
            println!("    {}", period.themes.join(", "));
        }
    }
}

pub fn list_resources(filter: &ResourceFilter) {
    let resources = filter.apply(CATALOG);
    if resources.is_empty() {
        println!("No resources match your filters.");
        return;
    }

    for resource in resources {
        println!(
            "[{}] {}",
            Palette::paint(Palette::INFO, resource.format.label()),
            resource.title
        );
        println!("    {}", resource.description);
        println!(
            "    {}",
            Palette::dim(format!("{} · {}", resource.period, resource.skill.label()))
        );
    }
}

#[derive(Debug, Default)]
pub struct ProgressUpdate {
    pub complete: Vec<u8>,
    pub mastery: Vec<(u8, u8)>,
    pub minutes: Option<u32>,
}

impl ProgressUpdate {
    fn is_empty(&self) -> bool {
        self.complete.is_empty() && self.mastery.is_empty() && self.minutes.is_none()
    }
}

pub fn progress<S: KeyValueStore>(
    store: &mut S,
    curriculum: &Curriculum,
    update: ProgressUpdate,
) -> Result<Progress> {
    let mut progress = Progress::load(&*store).context("Failed to load study progress")?;

    if !update.is_empty() {
        for &number in update.complete.iter().chain(update.mastery.iter().map(|(n, _)| n)) {
            if curriculum.find(number).is_none() {
                bail!("Unknown period {number}");
            }
        }
        for number in update.complete {
            progress.mark_completed(number);
        }
        for (number, percent) in update.mastery {
            progress.set_mastery(number, percent);
        }
        if let Some(minutes) = update.minutes {
            progress.add_study_minutes(minutes);
        }
        progress
            .save(store)
            .context("Failed to save study progress")?;
    }

    let summary = progress.summary();
    println!(
        "Readiness: {}",
        Palette::paint(Palette::SUCCESS, format!("{}%", summary.overall_mastery))
    );
    println!(
        "Periods completed: {} of {}",
        summary.completed_periods,
        curriculum.len()
    );
    println!(
        "Practice: {}",
        pluralize("question", summary.practice_questions as usize)
    );
    println!("Study time: {}", pluralize("hour", summary.study_hours as usize));
    if let Some(last) = progress.last_studied_at {
        println!(
            "{}",
            Palette::dim(format!("Last studied {}", last.format("%Y-%m-%d %H:%M UTC")))
        );
    }

    Ok(progress)
}

pub fn score_dbq(score: DbqScore) -> u8 {
    let total = score.total();
    println!(
        "DBQ score: {} / {}",
        Palette::paint(Palette::SUCCESS, total),
        DBQ_MAX_SCORE
    );
    total
}

/// Parses `PERIOD=PERCENT`, e.g. `3=80`.
pub fn parse_mastery(raw: &str) -> Result<(u8, u8)> {
    let Some((period, percent)) = raw.split_once('=') else {
        bail!("Expected PERIOD=PERCENT, got `{raw}`");
    };
    let period = period
        .trim()
        .parse()
        .with_context(|| format!("Invalid period in `{raw}`"))?;
    let percent: u8 = percent
        .trim()
        .trim_end_matches('%')
        .parse()
        .with_context(|| format!("Invalid percent in `{raw}`"))?;
    if percent > 100 {
        bail!("Mastery must be between 0 and 100, got {percent}");
    }
    Ok((period, percent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn parses_mastery_pairs() {
        assert_eq!(parse_mastery("3=80").unwrap(), (3, 80));
        assert_eq!(parse_mastery(" 9 = 100% ").unwrap(), (9, 100));
        assert!(parse_mastery("3").is_err());
        assert!(parse_mastery("3=101").is_err());
        assert!(parse_mastery("x=5").is_err());
    }

    #[test]
    fn progress_update_is_persisted() {
        let mut store = MemoryStore::new();
        let update = ProgressUpdate {
            complete: vec![1, 2],
            mastery: vec![(2, 90)],
            minutes: Some(120),
        };
        progress(&mut store, Curriculum::builtin(), update).unwrap();

        let reloaded = Progress::load(&store).unwrap();
        let summary = reloaded.summary();
        assert_eq!(summary.completed_periods, 2);
        assert_eq!(summary.study_hours, 2);
    }

    #[test]
    fn unknown_period_is_rejected() {
        let mut store = MemoryStore::new();
        let update = ProgressUpdate {
            complete: vec![12],
            ..Default::default()
        };
        assert!(progress(&mut store, Curriculum::builtin(), update).is_err());
        assert_eq!(Progress::load(&store).unwrap(), Progress::default());
    }

    #[test]
    fn scores_dbq() {
        let score = DbqScore {
            thesis: true,
            contextualization: false,
            evidence: 2,
            analysis: 1,
        };
        assert_eq!(score_dbq(score), 4);
    }
}
