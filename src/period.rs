use std::collections::HashSet;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A curriculum-defined historical era used to scope generated content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub number: u8,
    pub name: String,
    pub dates: String,
    pub themes: Vec<String>,
}

impl Period {
    pub fn new(number: u8, name: &str, dates: &str, themes: &[&str]) -> Self {
        Self {
            number,
            name: name.to_string(),
            dates: dates.to_string(),
            themes: themes.iter().map(|theme| theme.to_string()).collect(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CurriculumError {
    #[error("failed to read curriculum file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse curriculum: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("curriculum contains no periods")]
    Empty,
    #[error("curriculum lists period {0} more than once")]
    DuplicatePeriod(u8),
}

#[derive(Clone, Debug)]
pub struct Curriculum {
    periods: Vec<Period>,
}

static BUILTIN: Lazy<Curriculum> = Lazy::new(|| Curriculum {
    periods: vec![
        Period::new(
            1,
            "The Americas Before and After Contact",
            "1491-1607",
            &[
                "Native American societies",
                "Columbian Exchange",
                "Spanish colonization",
                "Encomienda system",
            ],
        ),
        Period::new(
            2,
            "Colonial America",
            "1607-1754",
            &[
                "Regional colonial economies",
                "Atlantic slave trade",
                "Relations with Native Americans",
                "Transatlantic print culture",
                "Mercantilism",
            ],
        ),
        Period::new(
            3,
            "Revolution and the New Nation",
            "1754-1800",
            &[
                "French and Indian War",
                "American Revolution",
                "Articles of Confederation",
                "Constitution and Bill of Rights",
                "First party system",
            ],
        ),
        Period::new(
            4,
            "The Early Republic and Market Revolution",
            "1800-1848",
            &[
                "Jeffersonian and Jacksonian democracy",
                "Market Revolution",
                "Second Great Awakening",
                "Reform movements",
                "Indian removal",
            ],
        ),
        Period::new(
            5,
            "Expansion, Civil War, and Reconstruction",
            "1844-1877",
            &[
                "Manifest Destiny",
                "Sectional conflict over slavery",
                "Civil War",
                "Reconstruction amendments",
            ],
        ),
        Period::new(
            6,
            "The Gilded Age",
            "1865-1898",
            &[
                "Industrialization",
                "Immigration and urbanization",
                "Labor movement",
                "Populism",
                "Westward expansion",
            ],
        ),
        Period::new(
            7,
            "Progressivism, Empire, and World War",
            "1890-1945",
            &[
                "Progressive reforms",
                "Imperialism",
                "World War I",
                "Great Depression and New Deal",
                "World War II",
            ],
        ),
        Period::new(
            8,
            "The Cold War and Civil Rights",
            "1945-1980",
            &[
                "Cold War containment",
                "Civil Rights Movement",
                "Great Society",
                "Vietnam War",
                "Counterculture",
            ],
        ),
        Period::new(
            9,
            "Conservatism and Globalization",
            "1980-Present",
            &[
                "Rise of conservatism",
                "End of the Cold War",
                "Globalization",
                "War on terror",
                "Demographic change",
            ],
        ),
    ],
});

impl Curriculum {
    /// The nine College Board APUSH periods.
    pub fn builtin() -> &'static Curriculum {
        &BUILTIN
    }

    pub fn from_json_str(contents: &str) -> Result<Self, CurriculumError> {
        let periods: Vec<Period> = serde_json::from_str(contents)?;
        Self::from_periods(periods)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, CurriculumError> {
        let contents = fs::read_to_string(path).map_err(|source| CurriculumError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    fn from_periods(mut periods: Vec<Period>) -> Result<Self, CurriculumError> {
        if periods.is_empty() {
            return Err(CurriculumError::Empty);
        }

        let mut seen = HashSet::new();
        for period in &periods {
            if !seen.insert(period.number) {
                return Err(CurriculumError::DuplicatePeriod(period.number));
            }
        }

        periods.sort_by_key(|period| period.number);
        Ok(Self { periods })
    }

    pub fn find(&self, number: u8) -> Option<&Period> {
        self.periods.iter().find(|period| period.number == number)
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn builtin_has_nine_ordered_periods() {
        let curriculum = Curriculum::builtin();
        assert_eq!(curriculum.len(), 9);
        let numbers: Vec<u8> = curriculum.periods().iter().map(|p| p.number).collect();
        assert_eq!(numbers, (1..=9).collect::<Vec<u8>>());
    }

    #[test]
    fn find_returns_matching_period() {
        let period = Curriculum::builtin().find(5).expect("period 5 exists");
        assert_eq!(period.dates, "1844-1877");
        assert!(Curriculum::builtin().find(10).is_none());
    }

    #[test]
    fn loads_and_sorts_custom_dataset() {
        let json = r#"[
            {"number": 2, "name": "Two", "dates": "b", "themes": []},
            {"number": 1, "name": "One", "dates": "a", "themes": ["x"]}
        ]"#;
        let curriculum = Curriculum::from_json_str(json).unwrap();
        assert_eq!(curriculum.periods()[0].name, "One");
        assert_eq!(curriculum.periods()[1].name, "Two");
    }

    #[test]
    fn rejects_empty_and_duplicate_datasets() {
        assert!(matches!(
            Curriculum::from_json_str("[]"),
            Err(CurriculumError::Empty)
        ));

        let json = r#"[
            {"number": 3, "name": "A", "dates": "a", "themes": []},
            {"number": 3, "name": "B", "dates": "b", "themes": []}
        ]"#;
        assert!(matches!(
            Curriculum::from_json_str(json),
            Err(CurriculumError::DuplicatePeriod(3))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("periods.json");
        let err = Curriculum::from_json_file(&path).unwrap_err();
        assert!(err.to_string().contains("periods.json"));
    }
}
