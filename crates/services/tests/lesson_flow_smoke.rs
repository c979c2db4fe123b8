use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use journey_core::model::{
    JourneyError, Language, Lesson, Mcq, Profile, User, UserId,
};
use journey_core::time::fixed_now;
use services::ai::{LearningPlan, LessonGenerator, LessonRequest, PlanGenerator};
use services::{
    Clock, DashboardService, GenerationError, LessonLoopService, LessonServiceError, PlanService,
    TodaysLesson,
};
use storage::repository::{InMemoryRepository, LessonArchiveRepository, UserRepository};

//
// ─── FAKES ─────────────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct FakeLessonGenerator {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl LessonGenerator for FakeLessonGenerator {
    async fn generate_lesson(
        &self,
        request: &LessonRequest,
        now: DateTime<Utc>,
    ) -> Result<Lesson, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mcqs = (0..5)
            .map(|i| {
                Mcq::new(
                    format!("Question {i} about strategic thinking?"),
                    vec![format!("Right {i}"), format!("Wrong {i}")],
                    format!("Right {i}"),
                    "Because.",
                )
                .unwrap()
            })
            .collect();
        Ok(Lesson {
            title: format!("Day {} lesson", request.current_day),
            content: "## Generated".into(),
            image_ref: None,
            mcqs,
            practical_exercise: "Practice".into(),
            key_takeaways: vec!["Takeaway".into()],
            day: request.current_day,
            total_days: request.total_days,
            duration_minutes: Lesson::DEFAULT_DURATION_MINUTES,
            language: request.language,
            generated_at: now,
        })
    }
}

struct FailingLessonGenerator;

#[async_trait::async_trait]
impl LessonGenerator for FailingLessonGenerator {
    async fn generate_lesson(
        &self,
        _request: &LessonRequest,
        _now: DateTime<Utc>,
    ) -> Result<Lesson, GenerationError> {
        Err(GenerationError::EmptyResponse)
    }
}

struct FailingPlanGenerator;

#[async_trait::async_trait]
impl PlanGenerator for FailingPlanGenerator {
    async fn generate_plan(
        &self,
        _profile: &Profile,
        _focus_area: Option<&str>,
        _duration_days: Option<u32>,
    ) -> Result<LearningPlan, GenerationError> {
        Err(GenerationError::Disabled)
    }
}

//
// ─── HELPERS ───────────────────────────────────────────────────────────────────
//

fn build_loop(
    repo: &InMemoryRepository,
    clock: Clock,
    generator: Arc<dyn LessonGenerator>,
) -> LessonLoopService {
    LessonLoopService::new(
        clock,
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
        generator,
    )
}

async fn seed_user(repo: &InMemoryRepository) -> UserId {
    let user = User::new(UserId::generate(), "ada@example.com", Profile::new("Ada"));
    repo.upsert_user(&user).await.unwrap();
    user.id
}

async fn run_full_day(service: &LessonLoopService, user_id: UserId, correct: usize) -> u32 {
    let todays = service.todays_lesson(user_id).await.unwrap();
    let TodaysLesson::Ready(view) = todays else {
        panic!("expected a lesson, got course completion");
    };
    assert_eq!(view.lesson.mcqs.len(), 5);

    service.start_lesson(user_id, 4).await.unwrap();
    for i in 0..5 {
        let answer = if i < correct {
            format!("Right {i}")
        } else {
            format!("Wrong {i}")
        };
        service.submit_quiz(user_id, i, &answer).await.unwrap();
    }

    let completion = service.complete_lesson(user_id).await.unwrap();
    completion.summary.percentage
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[tokio::test]
async fn full_day_flow_completes_and_persists() {
    let repo = InMemoryRepository::new();
    let user_id = seed_user(&repo).await;
    let now = fixed_now();
    let generator = Arc::new(FakeLessonGenerator::default());
    let service = build_loop(&repo, Clock::fixed(now), generator.clone());

    let percentage = run_full_day(&service, user_id, 3).await;
    assert_eq!(percentage, 60);

    let progress = service.progress(user_id).await.unwrap();
    assert_eq!(progress.current_day, 2);
    assert_eq!(progress.completed_days, 1);
    assert_eq!(progress.streak, 1);
    assert_eq!(progress.total_score, 60);

    let archived = repo.list_lessons(user_id).await.unwrap();
    assert_eq!(archived.len(), 1);
    assert!(archived[0].completed);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn same_day_fetch_reuses_cached_lesson() {
    let repo = InMemoryRepository::new();
    let user_id = seed_user(&repo).await;
    let generator = Arc::new(FakeLessonGenerator::default());
    let service = build_loop(&repo, Clock::fixed(fixed_now()), generator.clone());

    let first = service.todays_lesson(user_id).await.unwrap();
    let second = service.todays_lesson(user_id).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn generation_failure_serves_fallback_lesson() {
    let repo = InMemoryRepository::new();
    let user_id = seed_user(&repo).await;
    let service = build_loop(&repo, Clock::fixed(fixed_now()), Arc::new(FailingLessonGenerator));

    let todays = service.todays_lesson(user_id).await.unwrap();
    let TodaysLesson::Ready(view) = todays else {
        panic!("fallback should still produce a lesson");
    };

    assert_eq!(view.lesson.title, "Introduction to Strategic Foresight");
    assert_eq!(view.lesson.mcqs.len(), 1);
    assert_eq!(view.lesson.language, Language::En);
}

#[tokio::test]
async fn duplicate_quiz_submission_is_rejected() {
    let repo = InMemoryRepository::new();
    let user_id = seed_user(&repo).await;
    let service = build_loop(
        &repo,
        Clock::fixed(fixed_now()),
        Arc::new(FakeLessonGenerator::default()),
    );

    service.todays_lesson(user_id).await.unwrap();
    service.start_lesson(user_id, 3).await.unwrap();
    service.submit_quiz(user_id, 0, "Right 0").await.unwrap();

    let err = service.submit_quiz(user_id, 0, "Wrong 0").await.unwrap_err();
    assert!(matches!(
        err,
        LessonServiceError::Journey(JourneyError::DuplicateSubmission { quiz_index: 0 })
    ));
}

#[tokio::test]
async fn incomplete_day_cannot_be_completed() {
    let repo = InMemoryRepository::new();
    let user_id = seed_user(&repo).await;
    let service = build_loop(
        &repo,
        Clock::fixed(fixed_now()),
        Arc::new(FakeLessonGenerator::default()),
    );

    service.todays_lesson(user_id).await.unwrap();
    service.start_lesson(user_id, 3).await.unwrap();
    service.submit_quiz(user_id, 0, "Right 0").await.unwrap();

    let err = service.complete_lesson(user_id).await.unwrap_err();
    assert!(matches!(
        err,
        LessonServiceError::Journey(JourneyError::IncompleteQuizzes { submitted: 1, .. })
    ));
}

#[tokio::test]
async fn two_day_run_builds_streak_and_dashboard() {
    let repo = InMemoryRepository::new();
    let user_id = seed_user(&repo).await;
    let generator = Arc::new(FakeLessonGenerator::default());
    let day_one = fixed_now();
    let day_two = day_one + Duration::days(1);

    let service = build_loop(&repo, Clock::fixed(day_one), generator.clone());
    assert_eq!(run_full_day(&service, user_id, 3).await, 60);

    let service = build_loop(&repo, Clock::fixed(day_two), generator.clone());
    assert_eq!(run_full_day(&service, user_id, 4).await, 80);

    let progress = service.progress(user_id).await.unwrap();
    assert_eq!(progress.streak, 2);
    assert_eq!(progress.total_score, 140);

    let dashboard = DashboardService::new(Clock::fixed(day_two), Arc::new(repo.clone()))
        .dashboard(user_id)
        .await
        .unwrap();
    assert_eq!(dashboard.average_score, 70);
    assert_eq!(dashboard.rating, "3.5 / 5");
    assert_eq!(dashboard.trend, "Trending Up");
    assert_eq!(dashboard.lessons_completed, 2);
}

#[tokio::test]
async fn plan_is_created_lazily_with_fallback() {
    let repo = InMemoryRepository::new();
    let user_id = seed_user(&repo).await;
    let plans = PlanService::new(
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
        Arc::new(FailingPlanGenerator),
    );

    let view = plans.learning_plan(user_id).await.unwrap();
    assert_eq!(view.course_title, "Personalized Learning Journey");
    assert_eq!(view.duration, 180);
    assert_eq!(view.modules[0], "1. Master prospective terminology");

    // Second call reuses the stored course instead of regenerating.
    let again = plans.learning_plan(user_id).await.unwrap();
    assert_eq!(again, view);
}

#[tokio::test]
async fn regeneration_resets_progress_and_completion_ends_course() {
    let repo = InMemoryRepository::new();
    let user_id = seed_user(&repo).await;
    let generator = Arc::new(FakeLessonGenerator::default());
    let day_one = fixed_now();

    // Play one full day, then regenerate a one-day course.
    let service = build_loop(&repo, Clock::fixed(day_one), generator.clone());
    run_full_day(&service, user_id, 5).await;

    let plans = PlanService::new(
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
        Arc::new(FailingPlanGenerator),
    );
    plans
        .regenerate_plan(user_id, Some("leadership"), Some(1))
        .await
        .unwrap();

    let progress = service.progress(user_id).await.unwrap();
    assert_eq!(progress.current_day, 1);
    assert_eq!(progress.total_days, 1);
    assert_eq!(progress.completed_days, 0);
    assert_eq!(progress.total_score, 0);

    // Finish the single day; the next day's fetch reports course completion.
    run_full_day(&service, user_id, 5).await;
    let next_day = build_loop(&repo, Clock::fixed(day_one + Duration::days(1)), generator);
    let todays = next_day.todays_lesson(user_id).await.unwrap();
    assert_eq!(todays, TodaysLesson::CourseCompleted);
}
