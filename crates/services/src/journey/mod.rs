mod plan;
mod progress;
mod view;
mod workflow;

// Public API of the journey subsystem.
pub use crate::error::{DashboardServiceError, LessonServiceError, PlanServiceError};
pub use plan::{PlanService, PlanView};
pub use progress::JourneyProgress;
pub use view::{DashboardService, DashboardSummary};
pub use workflow::{CompletionSummary, LessonLoopService, LessonView, TodaysLesson};
