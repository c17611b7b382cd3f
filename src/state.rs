use crate::config::AppConfig;
use crate::directory::ProviderDirectory;
use crate::services::extraction::LlmClient;
use crate::services::temporal::DateTimeParser;
use crate::store::ScheduleStore;

pub struct AppState {
    pub config: AppConfig,
    pub store: ScheduleStore,
    pub directory: ProviderDirectory,
    pub llm: Box<dyn LlmClient>,
    pub parser: Box<dyn DateTimeParser>,
}
