//! Cross-origin middleware.
//!
//! The layer built here wraps every route, including the frontend fallback.
//! It only adds headers and answers preflight requests; it never rejects.

use crate::config::{ConfigError, CorsConfig};
use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Builds the CORS layer for `config`.
///
/// A wildcard list combined with `allow_credentials` mirrors the request's
/// origin, method or headers, since `*` is not accepted by browsers for
/// credentialed requests.
///
/// # Errors
/// Returns [`ConfigError::InvalidValue`] for an origin, method or header
/// name that is not valid HTTP.
pub fn cors_layer(config: &CorsConfig) -> Result<CorsLayer, ConfigError> {
    let credentials = config.allow_credentials;

    let origin = if CorsConfig::is_wildcard(&config.allowed_origins) {
        if credentials {
            AllowOrigin::mirror_request()
        } else {
            AllowOrigin::any()
        }
    } else {
        AllowOrigin::list(parse_origins(&config.allowed_origins)?)
    };

    let methods = if CorsConfig::is_wildcard(&config.allowed_methods) {
        if credentials {
            AllowMethods::mirror_request()
        } else {
            AllowMethods::any()
        }
    } else {
        AllowMethods::list(parse_methods(&config.allowed_methods)?)
    };

    let headers = if CorsConfig::is_wildcard(&config.allowed_headers) {
        if credentials {
            AllowHeaders::mirror_request()
        } else {
            AllowHeaders::any()
        }
    } else {
        AllowHeaders::list(parse_headers(&config.allowed_headers)?)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(credentials))
}

fn parse_origins(values: &[String]) -> Result<Vec<HeaderValue>, ConfigError> {
    values
        .iter()
        .map(|v| {
            HeaderValue::from_str(v.trim_end_matches('/'))
                .map_err(|_| ConfigError::InvalidValue(format!("invalid cors origin: {}", v)))
        })
        .collect()
}

fn parse_methods(values: &[String]) -> Result<Vec<Method>, ConfigError> {
    values
        .iter()
        .map(|v| {
            Method::from_bytes(v.to_ascii_uppercase().as_bytes())
                .map_err(|_| ConfigError::InvalidValue(format!("invalid cors method: {}", v)))
        })
        .collect()
}

fn parse_headers(values: &[String]) -> Result<Vec<HeaderName>, ConfigError> {
    values
        .iter()
        .map(|v| {
            HeaderName::from_bytes(v.as_bytes())
                .map_err(|_| ConfigError::InvalidValue(format!("invalid cors header: {}", v)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict() -> CorsConfig {
        CorsConfig {
            allowed_origins: vec!["https://grid.example.com/".to_string()],
            allowed_methods: vec!["get".to_string(), "POST".to_string()],
            allowed_headers: vec!["Authorization".to_string(), "content-type".to_string()],
            allow_credentials: true,
        }
    }

    #[test]
    fn test_default_policy_builds() {
        assert!(cors_layer(&CorsConfig::default()).is_ok());
    }

    #[test]
    fn test_wildcard_without_credentials_builds() {
        let config = CorsConfig {
            allow_credentials: false,
            ..CorsConfig::default()
        };
        assert!(cors_layer(&config).is_ok());
    }

    #[test]
    fn test_explicit_policy_builds() {
        assert!(cors_layer(&strict()).is_ok());
    }

    #[test]
    fn test_parse_origins_strips_trailing_slash() {
        let origins = parse_origins(&strict().allowed_origins).unwrap();
        assert_eq!(origins, vec![HeaderValue::from_static("https://grid.example.com")]);
    }

    #[test]
    fn test_parse_methods_normalizes_case() {
        let methods = parse_methods(&strict().allowed_methods).unwrap();
        assert_eq!(methods, vec![Method::GET, Method::POST]);
    }

    #[test]
    fn test_parse_headers_normalizes_case() {
        let headers = parse_headers(&strict().allowed_headers).unwrap();
        assert_eq!(headers[0], axum::http::header::AUTHORIZATION);
        assert_eq!(headers[1], axum::http::header::CONTENT_TYPE);
    }

    #[test]
    fn test_invalid_origin_rejected() {
        let config = CorsConfig {
            allowed_origins: vec!["https://bad\norigin".to_string()],
            ..strict()
        };
        assert!(matches!(
            cors_layer(&config),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_invalid_header_rejected() {
        let config = CorsConfig {
            allowed_headers: vec!["bad header".to_string()],
            ..strict()
        };
        assert!(matches!(
            cors_layer(&config),
            Err(ConfigError::InvalidValue(_))
        ));
    }
}
