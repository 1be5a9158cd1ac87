use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::llm::ItemKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceFormat {
    Tool,
    Practice,
    Guide,
    Timeline,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Saq,
    Dbq,
    Leq,
    Mcq,
    All,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodScope {
    All,
    Period(u8),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {what} `{value}`")]
pub struct ParseLabelError {
    what: &'static str,
    value: String,
}

impl FromStr for ResourceFormat {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tool" => Ok(Self::Tool),
            "practice" => Ok(Self::Practice),
            "guide" => Ok(Self::Guide),
            "timeline" => Ok(Self::Timeline),
            _ => Err(ParseLabelError {
                what: "format",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for Skill {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "saq" => Ok(Self::Saq),
            "dbq" => Ok(Self::Dbq),
            "leq" => Ok(Self::Leq),
            "mcq" => Ok(Self::Mcq),
            "all" => Ok(Self::All),
            _ => Err(ParseLabelError {
                what: "skill",
                value: s.to_string(),
            }),
        }
    }
}

impl From<ItemKind> for Skill {
    fn from(kind: ItemKind) -> Self {
        match kind {
            ItemKind::ShortAnswer => Skill::Saq,
            ItemKind::DocumentBased => Skill::Dbq,
            ItemKind::LongEssay => Skill::Leq,
        }
    }
}

impl ResourceFormat {
    pub fn label(&self) -> &'static str {
        match self {
            ResourceFormat::Tool => "Tool",
            ResourceFormat::Practice => "Practice",
            ResourceFormat::Guide => "Guide",
            ResourceFormat::Timeline => "Timeline",
        }
    }
}

impl Skill {
    pub fn label(&self) -> &'static str {
        match self {
            Skill::Saq => "SAQ",
            Skill::Dbq => "DBQ",
            Skill::Leq => "LEQ",
            Skill::Mcq => "MCQ",
            Skill::All => "All Skills",
        }
    }
}

impl fmt::Display for PeriodScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodScope::All => write!(f, "All Periods"),
            PeriodScope::Period(number) => write!(f, "Period {number}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub id: u32,
    pub title: &'static str,
    pub format: ResourceFormat,
    pub period: PeriodScope,
    pub skill: Skill,
    pub description: &'static str,
}

pub const CATALOG: &[Resource] = &[
    Resource {
        id: 1,
        title: "DBQ Annotation Tool",
        format: ResourceFormat::Tool,
        period: PeriodScope::All,
        skill: Skill::Dbq,
        description: "Interactive tool for annotating and scoring DBQ responses",
    },
    Resource {
        id: 2,
        title: "SAQ Practice Set: Period 3",
        format: ResourceFormat::Practice,
        period: PeriodScope::Period(3),
        skill: Skill::Saq,
        description: "10 Short Answer Questions covering Revolution and Constitution",
    },
    Resource {
        id: 3,
        title: "LEQ Outline Generator",
        format: ResourceFormat::Tool,
        period: PeriodScope::All,
        skill: Skill::Leq,
        description: "Generate structured outlines for Long Essay Questions",
    },
    Resource {
        id: 4,
        title: "Period 5 Timeline: Civil War",
        format: ResourceFormat::Timeline,
        period: PeriodScope::Period(5),
        skill: Skill::All,
        description: "Interactive timeline of key events from 1844-1877",
    },
    Resource {
        id: 5,
        title: "DBQ Practice: Progressive Era",
        format: ResourceFormat::Practice,
        period: PeriodScope::Period(7),
        skill: Skill::Dbq,
        description: "Full DBQ with 7 documents on Progressive reforms",
    },
    Resource {
        id: 6,
        title: "Study Guide: Period 2",
        format: ResourceFormat::Guide,
        period: PeriodScope::Period(2),
        skill: Skill::All,
        description: "Comprehensive study guide covering Colonial America themes",
    },
    Resource {
        id: 7,
        title: "SAQ Drills: All Periods",
        format: ResourceFormat::Practice,
        period: PeriodScope::All,
        skill: Skill::Saq,
        description: "Timed SAQ practice covering every period",
    },
    Resource {
        id: 8,
        title: "LEQ Practice: Period 4",
        format: ResourceFormat::Practice,
        period: PeriodScope::Period(4),
        skill: Skill::Leq,
        description: "Practice LEQ on Market Revolution and its effects",
    },
];

/// Unset fields match everything. Resources tagged for all periods or all
/// skills match any period or skill.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResourceFilter {
    pub period: Option<u8>,
    pub skill: Option<Skill>,
    pub format: Option<ResourceFormat>,
}

impl ResourceFilter {
    pub fn matches(&self, resource: &Resource) -> bool {
        if let Some(period) = self.period
            && resource.period != PeriodScope::Period(period)
            && resource.period != PeriodScope::All
        {
            return false;
        }

        if let Some(skill) = self.skill
            && skill != Skill::All
            && resource.skill != skill
            && resource.skill != Skill::All
        {
            return false;
        }

        if let Some(format) = self.format
            && resource.format != format
        {
            return false;
        }

        true
    }

    pub fn apply<'a>(&self, resources: &'a [Resource]) -> Vec<&'a Resource> {
        resources.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Practice material to show when generation yields nothing.
pub fn fallback_resources(kind: ItemKind, period: u8) -> Vec<&'static Resource> {
    ResourceFilter {
        period: Some(period),
        skill: Some(kind.into()),
        format: None,
    }
    .apply(CATALOG)
    .into_iter()
    .filter(|resource| resource.skill != Skill::All)
    .collect()
}

pub const EVIDENCE_MAX: u8 = 3;
pub const ANALYSIS_MAX: u8 = 2;
pub const DBQ_MAX_SCORE: u8 = 7;

/// College Board DBQ rubric tally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DbqScore {
    pub thesis: bool,
    pub contextualization: bool,
    pub evidence: u8,
    pub analysis: u8,
}

impl DbqScore {
    pub fn total(&self) -> u8 {
        u8::from(self.thesis)
            + u8::from(self.contextualization)
            + self.evidence.min(EVIDENCE_MAX)
            + self.analysis.min(ANALYSIS_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(resources: &[&Resource]) -> Vec<u32> {
        resources.iter().map(|r| r.id).collect()
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert_eq!(ResourceFilter::default().apply(CATALOG).len(), CATALOG.len());
    }

    #[test]
    fn period_filter_keeps_all_period_resources() {
        let filter = ResourceFilter {
            period: Some(3),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(CATALOG)), vec![1, 2, 3, 7]);
    }

    #[test]
    fn skill_filter_keeps_all_skill_resources() {
        let filter = ResourceFilter {
            skill: Some(Skill::Leq),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(CATALOG)), vec![3, 4, 6, 8]);
    }

    #[test]
    fn format_must_match_exactly() {
        let filter = ResourceFilter {
            period: Some(5),
            format: Some(ResourceFormat::Timeline),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(CATALOG)), vec![4]);
    }

    #[test]
    fn fallback_lists_skill_specific_material() {
        assert_eq!(
            ids(&fallback_resources(ItemKind::ShortAnswer, 3)),
            vec![2, 7]
        );
        assert_eq!(
            ids(&fallback_resources(ItemKind::DocumentBased, 7)),
            vec![1, 5]
        );
    }

    #[test]
    fn labels_parse() {
        assert_eq!("DBQ".parse::<Skill>(), Ok(Skill::Dbq));
        assert_eq!(" timeline ".parse::<ResourceFormat>(), Ok(ResourceFormat::Timeline));
        assert!("essay".parse::<Skill>().is_err());
    }

    #[test]
    fn dbq_score_clamps_to_rubric() {
        let score = DbqScore {
            thesis: true,
            contextualization: true,
            evidence: 3,
            analysis: 2,
        };
        assert_eq!(score.total(), DBQ_MAX_SCORE);

        let overflowing = DbqScore {
            thesis: false,
            contextualization: true,
            evidence: 9,
            analysis: 5,
        };
        assert_eq!(overflowing.total(), 6);
        assert_eq!(DbqScore::default().total(), 0);
    }
}
