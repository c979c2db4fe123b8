use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("skill level must be between 1 and 10, got {provided}")]
    InvalidSkillLevel { provided: u8 },
}

//
// ─── ENUMS ─────────────────────────────────────────────────────────────────────
//

/// Self-assessed proficiency at sign-up or calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    #[default]
    Beginner,
    Practitioner,
    Proficient,
    Expert,
}

impl SkillLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SkillLevel::Beginner => "beginner",
            SkillLevel::Practitioner => "practitioner",
            SkillLevel::Proficient => "proficient",
            SkillLevel::Expert => "expert",
        }
    }
}

/// How far the user wants to progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesiredLevel {
    #[default]
    ImproveLittle,
    VeryGood,
    BecomeExcellent,
}

impl DesiredLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DesiredLevel::ImproveLittle => "improve_little",
            DesiredLevel::VeryGood => "very_good",
            DesiredLevel::BecomeExcellent => "become_excellent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profession {
    Manager,
    Engineer,
    Educator,
    Consultant,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "18-30")]
    From18To30,
    #[serde(rename = "31-40")]
    From31To40,
    #[serde(rename = "41-50")]
    From41To50,
    #[serde(rename = "51-60")]
    From51To60,
    #[serde(rename = "61+")]
    Over61,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    ProfessionalGrowth,
    ImprovingSkills,
    LearnNewSkill,
    ChangeCareer,
    TimeManagement,
}

impl Goal {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Goal::ProfessionalGrowth => "professional_growth",
            Goal::ImprovingSkills => "improving_skills",
            Goal::LearnNewSkill => "learn_new_skill",
            Goal::ChangeCareer => "change_career",
            Goal::TimeManagement => "time_management",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthArea {
    BetterExpertise,
    ImprovePersuasion,
    MoreStrategic,
    Reflect,
}

impl GrowthArea {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GrowthArea::BetterExpertise => "better_expertise",
            GrowthArea::ImprovePersuasion => "improve_persuasion",
            GrowthArea::MoreStrategic => "more_strategic",
            GrowthArea::Reflect => "reflect",
        }
    }
}

//
// ─── SKILL TAGS ────────────────────────────────────────────────────────────────
//

/// The fixed skill taxonomy shared by profiles and the knowledge-gap analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillTag {
    StrategicVision,
    UserEngineering,
    Leadership,
    TechnicalMastery,
    Measurement,
    Unknown,
}

impl SkillTag {
    /// Stable wire name for the tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SkillTag::StrategicVision => "strategic_vision",
            SkillTag::UserEngineering => "user_engineering",
            SkillTag::Leadership => "leadership",
            SkillTag::TechnicalMastery => "technical_mastery",
            SkillTag::Measurement => "measurement",
            SkillTag::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SkillTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── SKILL ENTRY ───────────────────────────────────────────────────────────────
//

/// One self-rated skill with current and desired levels (1-10).
///
/// Earlier revisions stored main skills as bare tag strings; this type
/// deserializes both shapes, upgrading legacy entries to the structured form
/// with default levels at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkillEntry {
    pub skill: SkillTag,
    pub current_level: u8,
    pub desired_level: u8,
}

impl SkillEntry {
    pub const DEFAULT_CURRENT_LEVEL: u8 = 1;
    pub const DEFAULT_DESIRED_LEVEL: u8 = 5;

    /// Creates an entry, validating both levels.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::InvalidSkillLevel` if either level is outside 1-10.
    pub fn new(skill: SkillTag, current_level: u8, desired_level: u8) -> Result<Self, ProfileError> {
        for level in [current_level, desired_level] {
            if !(1..=10).contains(&level) {
                return Err(ProfileError::InvalidSkillLevel { provided: level });
            }
        }
        Ok(Self {
            skill,
            current_level,
            desired_level,
        })
    }

    /// Upgrades a legacy bare-tag entry to the structured form.
    #[must_use]
    pub fn from_legacy(skill: SkillTag) -> Self {
        Self {
            skill,
            current_level: Self::DEFAULT_CURRENT_LEVEL,
            desired_level: Self::DEFAULT_DESIRED_LEVEL,
        }
    }
}

impl<'de> Deserialize<'de> for SkillEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Structured {
            skill: SkillTag,
            #[serde(default = "default_current_level")]
            current_level: u8,
            #[serde(default = "default_desired_level")]
            desired_level: u8,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            Legacy(SkillTag),
            Structured(Structured),
        }

        match Shape::deserialize(deserializer)? {
            Shape::Legacy(skill) => Ok(SkillEntry::from_legacy(skill)),
            Shape::Structured(s) => {
                SkillEntry::new(s.skill, s.current_level, s.desired_level)
                    .map_err(serde::de::Error::custom)
            }
        }
    }
}

fn default_current_level() -> u8 {
    SkillEntry::DEFAULT_CURRENT_LEVEL
}

fn default_desired_level() -> u8 {
    SkillEntry::DEFAULT_DESIRED_LEVEL
}

//
// ─── PROFILE ───────────────────────────────────────────────────────────────────
//

/// The user's learning profile, fed verbatim to the plan and lesson generators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub profession: Profession,
    #[serde(default)]
    pub skill_level: SkillLevel,
    #[serde(default)]
    pub desired_level: DesiredLevel,
    #[serde(default)]
    pub age_group: Option<AgeGroup>,
    #[serde(default)]
    pub main_skills: Vec<SkillEntry>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub growth_areas: Vec<GrowthArea>,
}

impl Profile {
    /// A fresh profile with default calibration, as created at registration.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            profession: Profession::default(),
            skill_level: SkillLevel::default(),
            desired_level: DesiredLevel::default(),
            age_group: None,
            main_skills: Vec::new(),
            goals: Vec::new(),
            growth_areas: Vec::new(),
        }
    }
}

//
// ─── PREFERENCES ───────────────────────────────────────────────────────────────
//

/// Lesson delivery language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningPace {
    Relaxed,
    #[default]
    Moderate,
    Intensive,
}

impl LearningPace {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LearningPace::Relaxed => "relaxed",
            LearningPace::Moderate => "moderate",
            LearningPace::Intensive => "intensive",
        }
    }
}

/// User-tunable delivery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub language: Language,
    pub learning_pace: LearningPace,
    pub daily_reminder: bool,
    pub notification_time: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: Language::default(),
            learning_pace: LearningPace::default(),
            daily_reminder: true,
            notification_time: "09:00".to_string(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
