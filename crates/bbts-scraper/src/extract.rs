//! Search-results markup → [`ListingRecord`]s.
//!
//! Fields are described by a [`FieldRule`] table rather than per-field code:
//! each rule names the output field, where its value lives in a result item,
//! whether the item is unusable without it, and the value substituted when an
//! optional field is absent. [`LISTING_FIELDS`] is the table for the
//! storefront's current layout.

use bbts_core::listing::{
    DEFAULT_COMPANY, DEFAULT_DISCOUNT, DEFAULT_PHOTO, DEFAULT_PRICE, DEFAULT_SALE_INFO,
    DEFAULT_STATUS,
};
use bbts_core::ListingRecord;
use scraper::{ElementRef, Html, Selector};

use crate::error::ExtractError;
use crate::parse_helpers::{format_price, normalize_text};
use crate::selectors;

/// Output column a [`FieldRule`] populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Company,
    Price,
    Status,
    SaleInfo,
    Discount,
    Photo,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Field::Name => "name",
            Field::Company => "company",
            Field::Price => "price",
            Field::Status => "status",
            Field::SaleInfo => "sale_info",
            Field::Discount => "discount",
            Field::Photo => "photo",
        };
        f.write_str(name)
    }
}

/// Where a field's value is read from, relative to one result item.
#[derive(Debug, Clone, Copy)]
pub enum FieldSource {
    /// Whitespace-normalised text of the first match.
    Text(&'static str),
    /// An attribute of the first match, e.g. an image `src`.
    Attr {
        selector: &'static str,
        attr: &'static str,
    },
    /// Dollars and cents in separate elements, falling back to a single
    /// pre-formatted element when the split layout is absent.
    Price {
        whole: &'static str,
        fraction: &'static str,
        formatted: &'static str,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: Field,
    pub source: FieldSource,
    /// An item missing a required field is skipped.
    pub required: bool,
    /// Substituted when an optional field is missing or blank.
    pub default: &'static str,
}

/// Field table for the storefront's search results.
pub const LISTING_FIELDS: &[FieldRule] = &[
    FieldRule {
        field: Field::Name,
        source: FieldSource::Text(selectors::PRODUCT_NAME),
        required: true,
        default: "",
    },
    FieldRule {
        field: Field::Company,
        source: FieldSource::Text(selectors::COMPANIES),
        required: false,
        default: DEFAULT_COMPANY,
    },
    FieldRule {
        field: Field::Price,
        source: FieldSource::Price {
            whole: selectors::PRICE_WHOLE,
            fraction: selectors::PRICE_FRACTION,
            formatted: selectors::PRICE_FORMATTED,
        },
        required: false,
        default: DEFAULT_PRICE,
    },
    FieldRule {
        field: Field::Status,
        source: FieldSource::Text(selectors::STATUS),
        required: false,
        default: DEFAULT_STATUS,
    },
    FieldRule {
        field: Field::SaleInfo,
        source: FieldSource::Text(selectors::SALE_INFO),
        required: false,
        default: DEFAULT_SALE_INFO,
    },
    FieldRule {
        field: Field::Discount,
        source: FieldSource::Text(selectors::DISCOUNT),
        required: false,
        default: DEFAULT_DISCOUNT,
    },
    FieldRule {
        field: Field::Photo,
        source: FieldSource::Attr {
            selector: selectors::THUMBNAIL,
            attr: "src",
        },
        required: false,
        default: DEFAULT_PHOTO,
    },
];

/// Records extracted from one page, in document order.
#[derive(Debug, Default)]
pub struct Extraction {
    pub records: Vec<ListingRecord>,
    /// Result items dropped because a required field was missing.
    pub skipped: usize,
}

enum CompiledSource {
    Text(Selector),
    Attr(Selector, &'static str),
    Price {
        whole: Selector,
        fraction: Selector,
        formatted: Selector,
    },
}

struct CompiledRule {
    field: Field,
    source: CompiledSource,
    required: bool,
    default: &'static str,
}

/// Parses result pages using a compiled [`FieldRule`] table.
///
/// Extraction does no I/O and is deterministic for a given document.
pub struct ListingExtractor {
    item: Selector,
    rules: Vec<CompiledRule>,
}

impl ListingExtractor {
    /// Compiles the storefront's default layout: [`selectors::RESULT_ROW`]
    /// items read with [`LISTING_FIELDS`].
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn standard() -> Result<Self, ExtractError> {
        Self::new(selectors::RESULT_ROW, LISTING_FIELDS)
    }

    /// Compiles an extractor for items matching `item_selector`.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::InvalidSelector`]: any selector fails to parse.
    /// - [`ExtractError::MissingNameRule`]: `rules` has no [`Field::Name`] entry.
    pub fn new(item_selector: &str, rules: &[FieldRule]) -> Result<Self, ExtractError> {
        if !rules.iter().any(|r| r.field == Field::Name) {
            return Err(ExtractError::MissingNameRule);
        }

        let item = compile(item_selector)?;
        let rules = rules
            .iter()
            .map(|rule| {
                let source = match rule.source {
                    FieldSource::Text(sel) => CompiledSource::Text(compile(sel)?),
                    FieldSource::Attr { selector, attr } => {
                        CompiledSource::Attr(compile(selector)?, attr)
                    }
                    FieldSource::Price {
                        whole,
                        fraction,
                        formatted,
                    } => CompiledSource::Price {
                        whole: compile(whole)?,
                        fraction: compile(fraction)?,
                        formatted: compile(formatted)?,
                    },
                };
                Ok(CompiledRule {
                    field: rule.field,
                    source,
                    required: rule.required,
                    default: rule.default,
                })
            })
            .collect::<Result<Vec<_>, ExtractError>>()?;

        Ok(Self { item, rules })
    }

    /// Extracts every result item in `html`.
    ///
    /// A page with no result items yields an empty [`Extraction`]; that is the
    /// end-of-results signal, not an error. Items missing a required field are
    /// logged and counted in [`Extraction::skipped`] without affecting their
    /// siblings.
    #[must_use]
    pub fn extract(&self, html: &str) -> Extraction {
        let document = Html::parse_document(html);
        let mut extraction = Extraction::default();

        for (position, item) in document.select(&self.item).enumerate() {
            match self.extract_item(item) {
                Ok(record) => extraction.records.push(record),
                Err(field) => {
                    tracing::warn!(
                        position,
                        %field,
                        "skipping result item with missing required field"
                    );
                    extraction.skipped += 1;
                }
            }
        }

        extraction
    }

    /// Applies every rule to one item. Returns the first missing required
    /// field on failure.
    fn extract_item(&self, item: ElementRef<'_>) -> Result<ListingRecord, Field> {
        let mut record = ListingRecord::new(String::new());

        for rule in &self.rules {
            let value = match read_source(item, &rule.source) {
                Some(value) => value,
                None if rule.required => return Err(rule.field),
                None => rule.default.to_owned(),
            };
            assign(&mut record, rule.field, value);
        }

        Ok(record)
    }
}

fn compile(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_owned(),
        reason: e.to_string(),
    })
}

/// Reads one field; blank values count as missing.
fn read_source(item: ElementRef<'_>, source: &CompiledSource) -> Option<String> {
    match source {
        CompiledSource::Text(sel) => first_text(item, sel),
        CompiledSource::Attr(sel, attr) => item
            .select(sel)
            .next()
            .and_then(|el| el.value().attr(attr))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned),
        CompiledSource::Price {
            whole,
            fraction,
            formatted,
        } => match first_text(item, whole) {
            Some(whole) => Some(format_price(&whole, first_text(item, fraction).as_deref())),
            None => first_text(item, formatted),
        },
    }
}

fn first_text(item: ElementRef<'_>, selector: &Selector) -> Option<String> {
    item.select(selector)
        .next()
        .map(|el| normalize_text(el.text()))
        .filter(|text| !text.is_empty())
}

fn assign(record: &mut ListingRecord, field: Field, value: String) {
    match field {
        Field::Name => record.name = value,
        Field::Company => record.company = value,
        Field::Price => record.price = value,
        Field::Status => record.status = value,
        Field::SaleInfo => record.sale_info = value,
        Field::Discount => record.discount = value,
        Field::Photo => record.photo = value,
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
