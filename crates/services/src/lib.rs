#![forbid(unsafe_code)]

pub mod ai;
pub mod error;
pub mod journey;

pub use journey_core::Clock;

pub use error::{
    DashboardServiceError, GenerationError, LessonServiceError, PlanServiceError,
};

pub use ai::{GeneratorConfig, GeneratorService, LessonGenerator, PlanGenerator};

pub use journey::{
    CompletionSummary, DashboardService, DashboardSummary, JourneyProgress, LessonLoopService,
    LessonView, PlanService, PlanView, TodaysLesson,
};
