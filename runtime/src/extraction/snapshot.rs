//! Snapshot verifier: reads listing fields from a static HTML document.
//!
//! No network. Fields come from the first element carrying each configured
//! `data-*` attribute; price and bedrooms are coerced to integers.

use super::parse_selector;
use crate::config::{ListingConstraints, ListingSelectors};
use scraper::Html;
use serde_json::json;
use webcheck::{
    verify, Check, Constraint, ConstraintSet, ExtractError, ExtractedFields, Extraction,
    FieldValue, VerificationResult,
};

pub const FIELD_PRICE: &str = "price";
pub const FIELD_CITY: &str = "city";
pub const FIELD_BEDROOMS: &str = "bedrooms";

impl ListingConstraints {
    pub fn constraint_set(&self) -> ConstraintSet {
        ConstraintSet::new()
            .with(Constraint::new(
                "max_price",
                FIELD_PRICE,
                Check::AtMost(self.max_price),
            ))
            .with(Constraint::new(
                "city",
                FIELD_CITY,
                Check::Contains(self.city.clone()),
            ))
            .with(Constraint::new(
                "bedrooms",
                FIELD_BEDROOMS,
                Check::Equals(FieldValue::Int(self.bedrooms)),
            ))
    }
}

/// Value of the first element carrying `attr`, if any.
fn read_attr(document: &Html, attr: &str) -> Result<Option<String>, ExtractError> {
    let selector = parse_selector(&format!("[{attr}]"))?;
    Ok(document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::to_string))
}

fn coerce_int(attr: &str, raw: Option<String>) -> Result<Option<FieldValue>, ExtractError> {
    raw.map(|s| {
        s.trim().parse::<i64>().map(FieldValue::Int).map_err(|e| {
            ExtractError::system(
                "Failed to parse HTML",
                format!("{attr}=\"{s}\" is not an integer: {e}"),
            )
        })
    })
    .transpose()
}

/// Extract price, city, and bedrooms from an HTML snapshot.
pub fn extract_listing_fields(
    html: &str,
    selectors: &ListingSelectors,
) -> Result<Extraction, ExtractError> {
    let document = Html::parse_document(html);

    let price = read_attr(&document, &selectors.price_attr)?;
    let city = read_attr(&document, &selectors.city_attr)?;
    let bedrooms = read_attr(&document, &selectors.bedrooms_attr)?;

    tracing::debug!(?price, ?city, ?bedrooms, "listing attributes read");

    // Presence is judged before coercion: with a field absent, the numeric
    // ones are kept as raw text and the verdict is structural.
    let complete = price.is_some() && city.is_some() && bedrooms.is_some();
    let numeric = |attr: &str, raw: Option<String>| {
        if complete {
            coerce_int(attr, raw)
        } else {
            Ok(raw.map(|s| match s.trim().parse::<i64>() {
                Ok(n) => FieldValue::Int(n),
                Err(_) => FieldValue::Text(s),
            }))
        }
    };

    let fields = ExtractedFields::new()
        .with(FIELD_PRICE, numeric(&selectors.price_attr, price)?)
        .with(FIELD_CITY, city.map(|c| FieldValue::Text(c.trim().to_string())))
        .with(FIELD_BEDROOMS, numeric(&selectors.bedrooms_attr, bedrooms)?);

    Ok(Extraction::new(fields).with_evidence(
        "selectors",
        json!({
            FIELD_PRICE: format!("[{}]", selectors.price_attr),
            FIELD_CITY: format!("[{}]", selectors.city_attr),
            FIELD_BEDROOMS: format!("[{}]", selectors.bedrooms_attr),
        }),
    ))
}

/// Verify an HTML snapshot against the listing constraints.
pub fn verify_snapshot(
    html: &str,
    selectors: &ListingSelectors,
    constraints: &ConstraintSet,
) -> VerificationResult {
    let result = verify(extract_listing_fields(html, selectors), constraints);
    tracing::info!(outcome = %result.outcome(), "snapshot verified");
    result
}
