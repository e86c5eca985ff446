use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use std::collections::BTreeMap;

use super::state::AppState;

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub supported_languages: BTreeMap<String, String>,
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /languages
/// List the target languages `config` messages may request
pub async fn get_languages(State(state): State<AppState>) -> impl IntoResponse {
    let supported_languages = state
        .stream
        .supported_targets
        .iter()
        .map(|code| (code.clone(), language_name(code).to_string()))
        .collect();

    Json(LanguagesResponse {
        supported_languages,
    })
}

fn language_name(code: &str) -> &'static str {
    match code {
        "en" => "English",
        "ar" => "Arabic",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ru" => "Russian",
        "ja" => "Japanese",
        "ko" => "Korean",
        "zh" => "Chinese",
        "hi" => "Hindi",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_names() {
        assert_eq!(language_name("ar"), "Arabic");
        assert_eq!(language_name("en"), "English");
        assert_eq!(language_name("xx"), "Unknown");
    }
}
