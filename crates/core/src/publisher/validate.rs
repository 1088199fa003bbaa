//! Request validation, executed before any stage with side effects.

use crate::catalog::derive_slug;

use super::types::{PublishError, PublishRequest, UpdateRequest};

pub const TITLE_MIN_CHARS: usize = 5;
pub const TITLE_MAX_CHARS: usize = 50;
pub const DESCRIPTION_MIN_CHARS: usize = 5;
pub const DESCRIPTION_MAX_CHARS: usize = 100;

/// Metadata that passed validation, with the price converted to minor
/// units and the slug derived from the title.
#[derive(Debug, Clone)]
pub struct ValidatedPack {
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub slug: String,
}

/// Validate a full publication request, files included.
pub fn validate_request(request: &PublishRequest) -> Result<ValidatedPack, PublishError> {
    let validated = validate_metadata(
        &request.title,
        request.description.as_deref(),
        request.price,
    )?;

    if request.cover.bytes.is_empty() {
        return Err(PublishError::ValidationFailed(
            "Cover image file is empty".to_string(),
        ));
    }
    if request.archive.bytes.is_empty() {
        return Err(PublishError::ValidationFailed(
            "Archive file is empty".to_string(),
        ));
    }
    for sample in &request.samples {
        if sample.bytes.is_empty() {
            return Err(PublishError::ValidationFailed(format!(
                "Sample file '{}' is empty",
                sample.file_name
            )));
        }
    }

    Ok(validated)
}

/// Validate a metadata-only update request.
pub fn validate_update(request: &UpdateRequest) -> Result<ValidatedPack, PublishError> {
    validate_metadata(
        &request.title,
        request.description.as_deref(),
        request.price,
    )
}

fn validate_metadata(
    title: &str,
    description: Option<&str>,
    price: f64,
) -> Result<ValidatedPack, PublishError> {
    let title_chars = title.chars().count();
    if title_chars < TITLE_MIN_CHARS || title_chars > TITLE_MAX_CHARS {
        return Err(PublishError::ValidationFailed(format!(
            "Title must be between {} and {} characters",
            TITLE_MIN_CHARS, TITLE_MAX_CHARS
        )));
    }

    if let Some(description) = description {
        let description_chars = description.chars().count();
        if description_chars < DESCRIPTION_MIN_CHARS || description_chars > DESCRIPTION_MAX_CHARS {
            return Err(PublishError::ValidationFailed(format!(
                "Description must be between {} and {} characters",
                DESCRIPTION_MIN_CHARS, DESCRIPTION_MAX_CHARS
            )));
        }
    }

    if !price.is_finite() || price < 0.0 {
        return Err(PublishError::ValidationFailed(
            "Price must be a non-negative number".to_string(),
        ));
    }
    let price_cents = (price * 100.0).round() as i64;

    let slug = derive_slug(title);
    if slug.is_empty() {
        return Err(PublishError::ValidationFailed(
            "Title must contain at least one alphanumeric character".to_string(),
        ));
    }

    Ok(ValidatedPack {
        title: title.to_string(),
        description: description.map(String::from),
        price_cents,
        slug,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_valid_request_passes() {
        let request = fixtures::publish_request("Lo-Fi Drums Vol. 1", 9.99, 3);
        let validated = validate_request(&request).unwrap();
        assert_eq!(validated.slug, "lo-fi-drums-vol-1");
        assert_eq!(validated.price_cents, 999);
        assert_eq!(validated.title, "Lo-Fi Drums Vol. 1");
    }

    #[test]
    fn test_title_length_bounds() {
        let short = fixtures::publish_request("Hiss", 5.0, 0);
        assert!(matches!(
            validate_request(&short),
            Err(PublishError::ValidationFailed(_))
        ));

        let long_title = "x".repeat(51);
        let long = fixtures::publish_request(&long_title, 5.0, 0);
        assert!(validate_request(&long).is_err());

        let exactly_five = fixtures::publish_request("Drums", 5.0, 0);
        assert!(validate_request(&exactly_five).is_ok());
    }

    #[test]
    fn test_title_bounds_count_chars_not_bytes() {
        // Five characters, more than five bytes.
        let request = fixtures::publish_request("héllo", 5.0, 0);
        assert!(validate_request(&request).is_ok());
    }

    #[test]
    fn test_description_optional_but_bounded() {
        let mut request = fixtures::publish_request("Night Drums", 5.0, 0);
        request.description = None;
        assert!(validate_request(&request).is_ok());

        request.description = Some("abc".to_string());
        assert!(validate_request(&request).is_err());

        request.description = Some("x".repeat(101));
        assert!(validate_request(&request).is_err());
    }

    #[test]
    fn test_price_bounds() {
        let free = fixtures::publish_request("Night Drums", 0.0, 0);
        assert_eq!(validate_request(&free).unwrap().price_cents, 0);

        let negative = fixtures::publish_request("Night Drums", -1.0, 0);
        assert!(validate_request(&negative).is_err());

        let nan = fixtures::publish_request("Night Drums", f64::NAN, 0);
        assert!(validate_request(&nan).is_err());
    }

    #[test]
    fn test_price_converts_to_minor_units() {
        let request = fixtures::publish_request("Night Drums", 9.99, 0);
        assert_eq!(validate_request(&request).unwrap().price_cents, 999);

        // 19.99 * 100 is 1998.9999... in floating point; rounding must fix it.
        let request = fixtures::publish_request("Night Drums", 19.99, 0);
        assert_eq!(validate_request(&request).unwrap().price_cents, 1999);
    }

    #[test]
    fn test_all_symbol_title_rejected() {
        let request = fixtures::publish_request("!!!???", 5.0, 0);
        assert!(matches!(
            validate_request(&request),
            Err(PublishError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_empty_files_rejected() {
        let mut request = fixtures::publish_request("Night Drums", 5.0, 1);
        request.archive.bytes.clear();
        let error = validate_request(&request).unwrap_err();
        assert!(error.to_string().contains("Archive"));

        let mut request = fixtures::publish_request("Night Drums", 5.0, 1);
        request.samples[0].bytes.clear();
        assert!(validate_request(&request).is_err());
    }

    #[test]
    fn test_zero_samples_allowed() {
        let request = fixtures::publish_request("Night Drums", 5.0, 0);
        assert!(validate_request(&request).is_ok());
    }

    #[test]
    fn test_update_validates_metadata_only() {
        let update = UpdateRequest {
            title: "Night Drums II".to_string(),
            description: None,
            price: 12.5,
        };
        let validated = validate_update(&update).unwrap();
        assert_eq!(validated.slug, "night-drums-ii");
        assert_eq!(validated.price_cents, 1250);
    }
}
