//! Minijinja template rendering for push notification title and body.
//!
//! Templates are arbitrary strings (not pre-registered), so a fresh
//! [`minijinja::Environment`] is created per render call. The context is
//! any `Serialize` value; the server passes the assignment record.

use serde::Serialize;

use crate::traits::NotifyError;

/// Push titles longer than this are cut by most launchers anyway.
const DEFAULT_ELLIPSIS_LEN: usize = 60;

/// Renders notification templates using minijinja.
#[derive(Debug)]
pub struct TemplateRenderer {
    _private: (),
}

impl TemplateRenderer {
    /// Create a new template renderer.
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Build a configured minijinja environment with custom filters.
    fn build_env() -> minijinja::Environment<'static> {
        let mut env = minijinja::Environment::new();
        env.add_filter("ellipsis", ellipsis_filter);
        env
    }

    /// Render a template string with the given context.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Template`] if the template is invalid or
    /// rendering fails.
    pub fn render<S: Serialize>(&self, template_str: &str, ctx: &S) -> Result<String, NotifyError> {
        let env = Self::build_env();
        env.render_str(template_str, ctx)
            .map_err(|e| NotifyError::Template(e.to_string()))
    }

    /// Validate that a template string parses without errors.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Template`] if the template has syntax errors.
    pub fn validate(&self, template_str: &str) -> Result<(), NotifyError> {
        let env = Self::build_env();
        env.template_from_str(template_str)
            .map_err(|e| NotifyError::Template(e.to_string()))?;
        Ok(())
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Title and body templates of the quest notification.
#[derive(Debug, Clone)]
pub struct NotificationTemplates {
    pub title: String,
    pub body: String,
}

impl NotificationTemplates {
    /// Create templates, rejecting syntax errors up front.
    pub fn new(
        renderer: &TemplateRenderer,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let templates = Self {
            title: title.into(),
            body: body.into(),
        };
        renderer
            .validate(&templates.title)
            .map_err(|e| NotifyError::Config(format!("invalid title template: {e}")))?;
        renderer
            .validate(&templates.body)
            .map_err(|e| NotifyError::Config(format!("invalid body template: {e}")))?;
        Ok(templates)
    }

    /// Render `(title, body)` for `ctx`.
    pub fn render<S: Serialize>(
        &self,
        renderer: &TemplateRenderer,
        ctx: &S,
    ) -> Result<(String, String), NotifyError> {
        Ok((renderer.render(&self.title, ctx)?, renderer.render(&self.body, ctx)?))
    }
}

/// Custom filter: shorten to `max` characters, ending in an ellipsis.
fn ellipsis_filter(value: String, max: Option<usize>) -> String {
    let max = max.unwrap_or(DEFAULT_ELLIPSIS_LEN);
    if value.chars().count() <= max {
        return value;
    }
    let kept: String = value.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_context() -> serde_json::Value {
        json!({
            "quest_id": "weekly_karaoke",
            "title": "Bathroom Karaoke",
            "description": "Record a 15-second voice memo of you singing a dramatically emotional song.",
            "type": "audio",
            "frequency": "weekly",
            "expires_in_hours": 168,
        })
    }

    #[test]
    fn render_basic_template() {
        let renderer = TemplateRenderer::new();
        let result = renderer
            .render("New {{ frequency }} quest: {{ title }}", &sample_context())
            .unwrap();
        assert_eq!(result, "New weekly quest: Bathroom Karaoke");
    }

    #[test]
    fn render_ellipsis_filter() {
        let renderer = TemplateRenderer::new();
        let result = renderer
            .render("{{ description | ellipsis(20) }}", &sample_context())
            .unwrap();
        assert_eq!(result, "Record a 15-second…");
        assert!(result.chars().count() <= 20);
    }

    #[test]
    fn ellipsis_keeps_short_strings() {
        assert_eq!(ellipsis_filter("Pet Tax".into(), None), "Pet Tax");
    }

    #[test]
    fn builtin_filters_available() {
        let renderer = TemplateRenderer::new();
        let result = renderer.render("{{ type | upper }}", &sample_context()).unwrap();
        assert_eq!(result, "AUDIO");
    }

    #[test]
    fn invalid_template_produces_error() {
        let renderer = TemplateRenderer::new();
        match renderer.render("{{ unclosed", &sample_context()).unwrap_err() {
            NotifyError::Template(msg) => assert!(!msg.is_empty()),
            other => panic!("Expected Template error, got: {:?}", other),
        }
    }

    #[test]
    fn templates_validated_on_construction() {
        let renderer = TemplateRenderer::new();
        assert!(NotificationTemplates::new(&renderer, "{{ title }}", "{{ description }}").is_ok());

        match NotificationTemplates::new(&renderer, "{{ title", "ok").unwrap_err() {
            NotifyError::Config(msg) => assert!(msg.contains("title template")),
            other => panic!("expected Config error, got: {other:?}"),
        }
        match NotificationTemplates::new(&renderer, "ok", "{% if %}").unwrap_err() {
            NotifyError::Config(msg) => assert!(msg.contains("body template")),
            other => panic!("expected Config error, got: {other:?}"),
        }
    }

    #[test]
    fn templates_render_pair() {
        let renderer = TemplateRenderer::new();
        let templates =
            NotificationTemplates::new(&renderer, "{{ title }}!", "Due in {{ expires_in_hours }}h")
                .unwrap();
        let (title, body) = templates.render(&renderer, &sample_context()).unwrap();
        assert_eq!(title, "Bathroom Karaoke!");
        assert_eq!(body, "Due in 168h");
    }
}
