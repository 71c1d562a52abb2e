use serde_json::{Map, Value};

use super::ConfigError;

pub fn validate_config(config: &Value) -> Result<(), ConfigError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(server) = expect_optional_object(root, "server")? {
        validate_optional_string_field(server, "server.host", "host")?;
        validate_u64_field(server, "server.port", "port", 0, 65_535)?;
        validate_string_array_field(
            server,
            "server.cors_allowed_origins",
            "cors_allowed_origins",
        )?;
        validate_u64_field(
            server,
            "server.max_submission_chars",
            "max_submission_chars",
            1,
            10_000_000,
        )?;
    }

    for section in ["embedding", "completion"] {
        if let Some(endpoint) = expect_optional_object(root, section)? {
            validate_enum_field(endpoint, &format!("{}.flavor", section), "flavor", &["azure", "openai"])?;
            for key in ["endpoint", "api_key", "model", "api_version"] {
                validate_optional_string_field(endpoint, &format!("{}.{}", section, key), key)?;
            }
            validate_u64_field(endpoint, &format!("{}.dimensions", section), "dimensions", 1, 65_536)?;
            validate_f64_field(endpoint, &format!("{}.temperature", section), "temperature", 0.0, 2.0)?;
            validate_u64_field(endpoint, &format!("{}.max_tokens", section), "max_tokens", 1, 1_000_000)?;
        }
    }

    if let Some(retrieval) = expect_optional_object(root, "retrieval")? {
        for key in ["index_host", "api_key", "api_version"] {
            validate_optional_string_field(retrieval, &format!("retrieval.{}", key), key)?;
        }
        for key in ["prior_art_namespace", "patent_law_namespace"] {
            validate_non_empty_string_field(retrieval, &format!("retrieval.{}", key), key)?;
        }
    }

    if let Some(review) = expect_optional_object(root, "review")? {
        validate_u64_field(
            review,
            "review.call_timeout_secs",
            "call_timeout_secs",
            1,
            3_600,
        )?;
        if let Some(answer) = expect_optional_object(review, "answer")? {
            validate_u64_field(answer, "review.answer.prior_art_top_k", "prior_art_top_k", 1, 100)?;
            validate_u64_field(answer, "review.answer.patent_law_top_k", "patent_law_top_k", 1, 100)?;
        }
        if let Some(report) = expect_optional_object(review, "report")? {
            validate_u64_field(report, "review.report.prior_art_top_k", "prior_art_top_k", 1, 100)?;
            validate_u64_field(report, "review.report.grounding_limit", "grounding_limit", 0, 100)?;
            validate_u64_field(report, "review.report.findings_limit", "findings_limit", 0, 100)?;
        }
        if let Some(prompts) = expect_optional_object(review, "prompts")? {
            validate_optional_string_field(prompts, "review.prompts.prior_art", "prior_art")?;
            validate_optional_string_field(prompts, "review.prompts.patent_law", "patent_law")?;
        }
    }

    if let Some(report) = expect_optional_object(root, "report")? {
        validate_optional_string_field(report, "report.title", "title")?;
        validate_non_empty_string_field(report, "report.date_format", "date_format")?;
        validate_optional_string_field(report, "report.template_path", "template_path")?;
    }

    if let Some(render) = expect_optional_object(root, "render")? {
        validate_enum_field(render, "render.backend", "backend", &["native", "remote"])?;
        validate_optional_string_field(render, "render.remote_url", "remote_url")?;
        validate_enum_field(render, "render.paper", "paper", &["A4", "A3", "A5", "Letter", "Legal"])?;
        validate_enum_field(render, "render.orientation", "orientation", &["portrait", "landscape"])?;
        validate_f64_field(render, "render.margin_mm", "margin_mm", 0.0, 50.0)?;

        let remote = render.get("backend").and_then(|v| v.as_str()) == Some("remote");
        let has_url = render
            .get("remote_url")
            .and_then(|v| v.as_str())
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false);
        if remote && !has_url {
            return Err(ConfigError::Invalid(
                "Invalid config at 'render.remote_url': required when render.backend is 'remote'"
                    .to_string(),
            ));
        }
    }

    if let Some(logging) = expect_optional_object(root, "logging")? {
        validate_optional_string_field(logging, "logging.level", "level")?;
        validate_optional_string_field(logging, "logging.directory", "directory")?;
    }

    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, ConfigError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(config_type_error(key, "object")),
    }
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key).filter(|v| !v.is_null()) else {
        return Ok(());
    };
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(range_error(path, min, max));
    }
    Ok(())
}

fn validate_f64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: f64,
    max: f64,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key).filter(|v| !v.is_null()) else {
        return Ok(());
    };
    let Some(number) = value.as_f64() else {
        return Err(config_type_error(path, "number"));
    };
    if number < min || number > max {
        return Err(range_error(path, min, max));
    }
    Ok(())
}

fn validate_optional_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key).filter(|v| !v.is_null()) else {
        return Ok(());
    };
    if value.as_str().is_none() {
        return Err(config_type_error(path, "string"));
    }
    Ok(())
}

fn validate_non_empty_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(text) = value.as_str() else {
        return Err(config_type_error(path, "string"));
    };
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid(format!(
            "Invalid config at '{}': value cannot be empty",
            path
        )));
    }
    Ok(())
}

fn validate_enum_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    allowed: &[&str],
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(text) = value.as_str() else {
        return Err(config_type_error(path, "string"));
    };
    if !allowed.contains(&text) {
        return Err(ConfigError::Invalid(format!(
            "Invalid config at '{}': expected one of {}",
            path,
            allowed.join(", ")
        )));
    }
    Ok(())
}

fn validate_string_array_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(items) = value.as_array() else {
        return Err(config_type_error(path, "array of strings"));
    };
    for (index, item) in items.iter().enumerate() {
        let Some(text) = item.as_str() else {
            return Err(config_type_error(&format!("{}[{}]", path, index), "string"));
        };
        if text.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "Invalid config at '{}[{}]': value cannot be empty",
                path, index
            )));
        }
    }
    Ok(())
}

fn range_error<T: std::fmt::Display>(path: &str, min: T, max: T) -> ConfigError {
    ConfigError::Invalid(format!(
        "Invalid config at '{}': must be between {} and {}",
        path, min, max
    ))
}

fn config_type_error(path: &str, expected: &str) -> ConfigError {
    ConfigError::Invalid(format!(
        "Invalid config at '{}': expected {}",
        path, expected
    ))
}
