use std::env;

use chrono_tz::Tz;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub brand_name: String,
    pub timezone: Tz,
    pub doctors: Vec<String>,
    pub llm_provider: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub ollama_url: String,
    pub extraction_timeout_secs: u64,
}

const DEFAULT_DOCTORS: &[&str] = &["Dr. Jesan Ahmed", "Dr. Hasan Rahman", "Dr. Gregory House"];

impl AppConfig {
    pub fn from_env() -> Self {
        let timezone = env::var("CLINIC_TZ")
            .ok()
            .and_then(|v| v.parse::<Tz>().ok())
            .unwrap_or(Tz::UTC);

        let doctors: Vec<String> = env::var("CLINIC_DOCTORS")
            .ok()
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .filter(|v: &Vec<String>| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_DOCTORS.iter().map(|s| s.to_string()).collect());

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "clinicdesk.db".to_string()),
            brand_name: env::var("BRAND_NAME").unwrap_or_else(|_| "Demo Dental Clinic".to_string()),
            timezone,
            doctors,
            llm_provider: env::var("LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string()),
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            ollama_url: env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            extraction_timeout_secs: env::var("EXTRACTION_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
        }
    }
}
