//! Reading field masks from request query strings.

use serde_json::Value;
use tracing::debug;

use crate::error::MaskError;
use crate::mask::mask_json;
use crate::parser::parse_fields;
use crate::types::{MaskContext, MaskParams};

/// Build a [`MaskContext`] from a raw query string (`a=1&fields=title`).
///
/// A leading `?` is ignored and values are form-decoded. When a parameter
/// repeats, its last value wins.
///
/// # Errors
///
/// Returns `MaskError::ConflictingMasks` if both the include and exclude
/// parameters carry a non-empty mask.
pub fn extract_mask(query: &str, params: &MaskParams) -> Result<MaskContext, MaskError> {
    let query = query.strip_prefix('?').unwrap_or(query);
    extract_mask_from_pairs(url::form_urlencoded::parse(query.as_bytes()), params)
}

/// Build a [`MaskContext`] from already-decoded query parameters.
///
/// # Errors
///
/// Returns `MaskError::ConflictingMasks` if both the include and exclude
/// parameters carry a non-empty mask, including when both names point at the
/// same parameter.
pub fn extract_mask_from_pairs<I, K, V>(
    pairs: I,
    params: &MaskParams,
) -> Result<MaskContext, MaskError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut fields: Option<String> = None;
    let mut excludes: Option<String> = None;

    // A parameter configured under both names feeds both masks.
    for (key, value) in pairs {
        let key = key.as_ref();
        if key == params.fields_name {
            fields = Some(value.as_ref().to_string());
        }
        if key == params.excludes_name {
            excludes = Some(value.as_ref().to_string());
        }
    }

    let requested = parse_fields(fields.as_deref());
    let excluded = parse_fields(excludes.as_deref());

    if !requested.is_empty() && !excluded.is_empty() {
        debug!(
            fields = %params.fields_name,
            excludes = %params.excludes_name,
            "rejecting request with both include and exclude masks"
        );
        return Err(MaskError::ConflictingMasks {
            fields_name: params.fields_name.clone(),
            excludes_name: params.excludes_name.clone(),
        });
    }

    if !requested.is_empty() {
        Ok(MaskContext::including(requested))
    } else {
        Ok(MaskContext::excluding(excluded))
    }
}

/// Mask a JSON document with the mask carried by `query`.
///
/// # Errors
///
/// Returns `MaskError::ConflictingMasks` if the query carries both masks.
pub fn mask_json_from_query(
    data: &Value,
    query: &str,
    params: &MaskParams,
) -> Result<Value, MaskError> {
    let ctx = extract_mask(query, params)?;
    Ok(mask_json(data, &ctx))
}
