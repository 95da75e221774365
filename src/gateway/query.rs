//! Transform query parsing.
//!
//! Turns the raw query string of `GET /transform` into a source identifier
//! and the transformation options. Parameters are form-urlencoded; the first
//! occurrence of a key wins.

use std::collections::HashMap;
use std::str::FromStr;

use crate::constants::{DEFAULT_QUALITY, DEFAULT_WATERMARK_OPACITY};
use crate::error::GatewayError;
use crate::image_optimizer::{CropStrategy, OutputFormat, OutputLimits};
use crate::origin::SourceIdentifier;
use crate::pipeline::{TransformationOptions, WatermarkOptions};
use crate::watermark::Gravity;

/// A validated transform request
#[derive(Debug, Clone, PartialEq)]
pub struct TransformRequest {
    pub source: SourceIdentifier,
    pub options: TransformationOptions,
}

/// Decoded query parameters, first occurrence of each key kept
#[derive(Debug, Default)]
pub struct QueryParams {
    params: HashMap<String, String>,
}

impl QueryParams {
    pub fn parse(raw_query: &str) -> Self {
        let mut params = HashMap::new();
        for pair in raw_query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            params
                .entry(form_decode(key))
                .or_insert_with(|| form_decode(value));
        }
        Self { params }
    }

    /// Value of a parameter, treating an empty value as absent
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

fn form_decode(input: &str) -> String {
    let spaced = input.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}

/// Parse and validate a transform query string
///
/// Width and height above `limits` are rejected so no request can ask the
/// processor for an arbitrarily large canvas.
pub fn parse_transform_query(
    raw_query: &str,
    limits: &OutputLimits,
) -> Result<TransformRequest, GatewayError> {
    let params = QueryParams::parse(raw_query);

    let source = match (params.get("path"), params.get("url")) {
        (Some(path), _) => SourceIdentifier::parse(path),
        (None, Some(url)) => SourceIdentifier::parse(url),
        (None, None) => {
            return Err(GatewayError::Validation(
                "either path or url is required".to_string(),
            ))
        }
    };

    let width = parse_dimension(params.get("width"));
    let height = parse_dimension(params.get("height"));
    if width == 0 && height == 0 {
        return Err(GatewayError::Validation(
            "width or height must be a positive integer".to_string(),
        ));
    }
    limits.check(width, height)?;

    let quality = match params.get("quality") {
        None => DEFAULT_QUALITY,
        Some(raw) => parse_quality(raw)?,
    };

    let crop = params
        .get("crop")
        .map(CropStrategy::parse)
        .unwrap_or_default();

    let format = match params.get("format") {
        None => OutputFormat::default(),
        Some(raw) => OutputFormat::from_str(raw)?,
    };

    let watermark = params.get("wm").map(|asset| {
        let opacity = params
            .get("wm_opacity")
            .and_then(|v| v.parse::<f32>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(DEFAULT_WATERMARK_OPACITY);
        let gravity = params
            .get("wm_gravity")
            .map(Gravity::parse)
            .unwrap_or_default();
        WatermarkOptions::new(asset, opacity, gravity)
    });

    Ok(TransformRequest {
        source,
        options: TransformationOptions {
            width,
            height,
            quality,
            crop,
            format,
            watermark,
        },
    })
}

/// Unparsable or non-positive values mean "unset" (0)
fn parse_dimension(raw: Option<&str>) -> u32 {
    raw.and_then(|v| v.parse::<i64>().ok())
        .filter(|v| *v > 0)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

fn parse_quality(raw: &str) -> Result<u8, GatewayError> {
    match raw.parse::<u8>() {
        Ok(q) if (1..=100).contains(&q) => Ok(q),
        _ => Err(GatewayError::Validation(format!(
            "quality must be an integer between 1 and 100, got '{}'",
            raw
        ))),
    }
}
