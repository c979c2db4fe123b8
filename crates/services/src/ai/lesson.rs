use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use journey_core::model::{Language, LearningPace, Lesson, Mcq, SkillLevel, SkillTag};

use super::client::GeneratorService;
use crate::error::GenerationError;

const LESSON_SYSTEM_PROMPT_EN: &str = "You are a daily lesson generator for strategic \
foresight training. Create engaging daily lessons that build on previous knowledge. \
Return JSON with: title, content, mcqs (array with question, options, correctAnswer, \
explanation), practicalExercise, and keyTakeaways.";

const LESSON_SYSTEM_PROMPT_FR: &str = "Vous êtes un générateur de leçons quotidiennes \
pour la formation en prospective stratégique. Créez des leçons quotidiennes engageantes \
qui s'appuient sur les connaissances précédentes. Retournez JSON avec: title, content, \
mcqs (tableau avec question, options, correctAnswer, explanation), practicalExercise, \
et keyTakeaways.";

/// Everything the generator needs to tailor one day's lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonRequest {
    pub skill_level: SkillLevel,
    pub learning_pace: LearningPace,
    pub language: Language,
    pub current_day: u32,
    pub total_days: u32,
    pub completed_days: usize,
    /// Recurring weak skills from past incorrect answers; biases the prompt.
    pub knowledge_gaps: Vec<SkillTag>,
}

/// Collaborator that produces one generated lesson per day.
#[async_trait]
pub trait LessonGenerator: Send + Sync {
    /// Generate the lesson for `request.current_day`.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` on failure or timeout; callers substitute
    /// [`fallback_lesson`] so the session workflow never stalls.
    async fn generate_lesson(
        &self,
        request: &LessonRequest,
        now: DateTime<Utc>,
    ) -> Result<Lesson, GenerationError>;
}

#[async_trait]
impl LessonGenerator for GeneratorService {
    async fn generate_lesson(
        &self,
        request: &LessonRequest,
        now: DateTime<Utc>,
    ) -> Result<Lesson, GenerationError> {
        let system = match request.language {
            Language::En => LESSON_SYSTEM_PROMPT_EN,
            Language::Fr => LESSON_SYSTEM_PROMPT_FR,
        };

        let gaps = if request.knowledge_gaps.is_empty() {
            "none".to_string()
        } else {
            request
                .knowledge_gaps
                .iter()
                .map(|g| g.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let user_prompt = format!(
            "Generate day {}/{} lesson for:\n\
             User Level: {}\n\
             Learning Pace: {}\n\
             Previous Days Completed: {}\n\
             Recurring Weak Skills: {gaps}\n\
             Language: {}\n\n\
             Focus on practical, engaging content that builds on previous learning.\n\
             Include 3-5 MCQs with explanations.",
            request.current_day,
            request.total_days,
            request.skill_level.as_str(),
            request.learning_pace.as_str(),
            request.completed_days,
            request.language.code(),
        );

        let raw = self.complete_json(system, &user_prompt).await?;
        let payload: LessonPayload = serde_json::from_str(&raw)
            .map_err(|e| GenerationError::MalformedContent(e.to_string()))?;
        payload.into_lesson(request, now)
    }
}

//
// ─── PAYLOAD ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct McqPayload {
    question: String,
    options: Vec<String>,
    correct_answer: String,
    #[serde(default)]
    explanation: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LessonPayload {
    title: String,
    content: String,
    #[serde(default)]
    image_ref: Option<String>,
    mcqs: Vec<McqPayload>,
    #[serde(default)]
    practical_exercise: String,
    #[serde(default)]
    key_takeaways: Vec<String>,
}

impl LessonPayload {
    /// Attach metadata and validate the MCQs into the domain shape.
    fn into_lesson(
        self,
        request: &LessonRequest,
        now: DateTime<Utc>,
    ) -> Result<Lesson, GenerationError> {
        let mcqs = self
            .mcqs
            .into_iter()
            .map(|m| Mcq::new(m.question, m.options, m.correct_answer, m.explanation))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| GenerationError::MalformedContent(e.to_string()))?;

        if mcqs.is_empty() {
            return Err(GenerationError::MalformedContent(
                "lesson has no MCQs".into(),
            ));
        }

        Ok(Lesson {
            title: self.title,
            content: self.content,
            image_ref: self.image_ref,
            mcqs,
            practical_exercise: self.practical_exercise,
            key_takeaways: self.key_takeaways,
            day: request.current_day,
            total_days: request.total_days,
            duration_minutes: Lesson::DEFAULT_DURATION_MINUTES,
            language: request.language,
            generated_at: now,
        })
    }
}

//
// ─── FALLBACK ──────────────────────────────────────────────────────────────────
//

fn localized(language: Language, en: &str, fr: &str) -> String {
    match language {
        Language::En => en.to_string(),
        Language::Fr => fr.to_string(),
    }
}

/// Deterministic lesson substituted when generation fails or is disabled.
///
/// Localized for the user's language and carrying exactly one MCQ.
///
/// # Panics
///
/// Never panics in practice: the embedded MCQ is statically valid.
#[must_use]
pub fn fallback_lesson(request: &LessonRequest, now: DateTime<Utc>) -> Lesson {
    let language = request.language;
    let mcq = Mcq::new(
        localized(
            language,
            "What is the main goal of strategic foresight?",
            "Quel est l'objectif principal de la prospective stratégique ?",
        ),
        vec![
            localized(
                language,
                "Predict the future accurately",
                "Prédire l'avenir avec précision",
            ),
            localized(
                language,
                "Explore possible futures",
                "Explorer les futurs possibles",
            ),
            localized(language, "Only analyze the past", "Analyser seulement le passé"),
            localized(language, "Create statistics", "Créer des statistiques"),
        ],
        localized(
            language,
            "Explore possible futures",
            "Explorer les futurs possibles",
        ),
        localized(
            language,
            "Foresight explores multiple possible futures rather than trying to predict \
             one single future.",
            "La prospective explore plusieurs futurs possibles plutôt que de tenter de \
             prédire un seul avenir.",
        ),
    )
    .expect("fallback MCQ is statically valid");

    Lesson {
        title: localized(
            language,
            "Introduction to Strategic Foresight",
            "Introduction à la Prospective Stratégique",
        ),
        content: localized(
            language,
            "Strategic foresight is a discipline that aims to explore possible futures \
             to inform present-day actions.",
            "La prospective stratégique est une discipline qui vise à explorer les \
             futurs possibles pour éclairer les actions présentes.",
        ),
        image_ref: None,
        mcqs: vec![mcq],
        practical_exercise: localized(
            language,
            "Identify one emerging trend in your industry and imagine three possible \
             scenarios.",
            "Identifiez une tendance émergente dans votre industrie et imaginez trois \
             scénarios possibles.",
        ),
        key_takeaways: vec![
            localized(
                language,
                "Exploring multiple futures",
                "Exploration de multiples futurs",
            ),
            localized(
                language,
                "Informed decision-making",
                "Prise de décision éclairée",
            ),
        ],
        day: request.current_day,
        total_days: request.total_days,
        duration_minutes: Lesson::DEFAULT_DURATION_MINUTES,
        language,
        generated_at: now,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use journey_core::time::fixed_now;

    fn build_request(language: Language) -> LessonRequest {
        LessonRequest {
            skill_level: SkillLevel::Beginner,
            learning_pace: LearningPace::Moderate,
            language,
            current_day: 3,
            total_days: 90,
            completed_days: 2,
            knowledge_gaps: vec![],
        }
    }

    #[test]
    fn fallback_lesson_is_localized() {
        let en = fallback_lesson(&build_request(Language::En), fixed_now());
        assert_eq!(en.title, "Introduction to Strategic Foresight");
        assert_eq!(en.mcqs.len(), 1);
        assert_eq!(en.day, 3);

        let fr = fallback_lesson(&build_request(Language::Fr), fixed_now());
        assert_eq!(fr.title, "Introduction à la Prospective Stratégique");
        assert_eq!(fr.mcqs[0].correct_answer(), "Explorer les futurs possibles");
    }

    #[test]
    fn payload_converts_into_validated_lesson() {
        let raw = r###"{
            "title": "Scanning the Horizon",
            "content": "## Why scanning matters",
            "mcqs": [{
                "question": "What does horizon scanning detect?",
                "options": ["Weak signals", "Stock prices"],
                "correctAnswer": "Weak signals",
                "explanation": "Scanning looks for early signs of change."
            }],
            "practicalExercise": "List three weak signals.",
            "keyTakeaways": ["Scan broadly"]
        }"###;
        let payload: LessonPayload = serde_json::from_str(raw).unwrap();
        let lesson = payload
            .into_lesson(&build_request(Language::En), fixed_now())
            .unwrap();

        assert_eq!(lesson.title, "Scanning the Horizon");
        assert_eq!(lesson.day, 3);
        assert_eq!(lesson.mcqs[0].correct_answer(), "Weak signals");
    }

    #[test]
    fn payload_with_bad_mcq_is_rejected() {
        let raw = r#"{
            "title": "Broken",
            "content": "",
            "mcqs": [{
                "question": "Q",
                "options": ["A", "B"],
                "correctAnswer": "C"
            }]
        }"#;
        let payload: LessonPayload = serde_json::from_str(raw).unwrap();
        let err = payload
            .into_lesson(&build_request(Language::En), fixed_now())
            .unwrap_err();
        assert!(matches!(err, GenerationError::MalformedContent(_)));
    }

    #[test]
    fn payload_without_mcqs_is_rejected() {
        let raw = r#"{"title": "Empty", "content": "", "mcqs": []}"#;
        let payload: LessonPayload = serde_json::from_str(raw).unwrap();
        let err = payload
            .into_lesson(&build_request(Language::En), fixed_now())
            .unwrap_err();
        assert!(matches!(err, GenerationError::MalformedContent(_)));
    }
}
