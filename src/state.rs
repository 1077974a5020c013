use crate::config::AppConfig;
use crate::services::ai::LlmProvider;
use crate::services::extractor::PatternSet;
use crate::services::notify::ConfirmationMailer;
use crate::services::provider::SchedulingProvider;
use crate::store::AppointmentStore;

pub struct AppState {
    pub config: AppConfig,
    pub llm: Box<dyn LlmProvider>,
    pub scheduler: Box<dyn SchedulingProvider>,
    pub mailer: Box<dyn ConfirmationMailer>,
    pub store: AppointmentStore,
    pub patterns: PatternSet,
}
