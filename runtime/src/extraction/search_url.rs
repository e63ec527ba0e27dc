//! Search URL verifier: checks a GitHub issue-search URL's query string.

use crate::config::{SearchConstraints, SearchPageShape};
use percent_encoding::percent_decode_str;
use url::Url;
use webcheck::{
    verify, Check, Constraint, ConstraintSet, ExtractError, ExtractedFields, Extraction,
    FieldValue, VerificationResult,
};

/// The `type` query parameter.
pub const FIELD_TYPE: &str = "type";
/// The decoded, lower-cased token set of the `q` parameter.
pub const FIELD_TOKENS: &str = "tokens";

impl SearchConstraints {
    pub fn constraint_set(&self) -> ConstraintSet {
        ConstraintSet::new()
            .with(Constraint::new(
                "type",
                FIELD_TYPE,
                Check::Equals(FieldValue::Text(self.kind.clone())),
            ))
            .with(Constraint::new(
                "search_tokens",
                FIELD_TOKENS,
                Check::RequiredTokens(self.required_tokens()),
            ))
    }
}

/// Extract the search type and query tokens from a URL.
///
/// Fails with a shape error before looking at the query when the host or
/// path is not the expected search page. A missing parameter becomes an
/// absent field.
pub fn extract_search_fields(url: &str, shape: &SearchPageShape) -> Result<Extraction, ExtractError> {
    let parsed = Url::parse(url).map_err(|e| {
        ExtractError::shape("URL could not be parsed")
            .with_evidence("url", url)
            .with_evidence("error", e.to_string())
    })?;

    let host = parsed.host_str().unwrap_or_default();
    if !host.eq_ignore_ascii_case(&shape.host) || parsed.path() != shape.path {
        return Err(ExtractError::shape("URL is not a GitHub search page")
            .with_evidence("host", host)
            .with_evidence("path", parsed.path()));
    }

    // query_pairs() percent-decodes and maps '+' to a space.
    let param = |name: &str| {
        parsed
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    };
    let kind = param("type");
    // A second pass decodes tokens that were escaped twice (`%253A` -> `:`).
    let query = param("q").map(|q| percent_decode_str(&q).decode_utf8_lossy().into_owned());

    tracing::debug!(?kind, ?query, "search parameters decoded");

    let fields = ExtractedFields::new()
        .with(FIELD_TYPE, kind.map(FieldValue::Text))
        .with(FIELD_TOKENS, query.as_deref().map(FieldValue::tokens_from));

    let mut extraction = Extraction::new(fields);
    if let Some(q) = query {
        extraction = extraction.with_evidence("decodedQuery", q.to_lowercase());
    }
    Ok(extraction)
}

/// Verify a search URL against the constraints.
pub fn verify_search_url(
    url: &str,
    shape: &SearchPageShape,
    constraints: &ConstraintSet,
) -> VerificationResult {
    let result = verify(extract_search_fields(url, shape), constraints);
    tracing::info!(url, outcome = %result.outcome(), "search url verified");
    result
}
