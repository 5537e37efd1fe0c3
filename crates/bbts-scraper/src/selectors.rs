//! CSS selectors for the storefront's search results markup.
//!
//! Update this file when the site changes its layout, and add a fixture
//! to `extract_test.rs` that reproduces the new shape.

/// One result item. The direct-child combinator keeps nested `.row` grids
/// inside an item from being counted as extra results.
pub const RESULT_ROW: &str = ".results-list > .row";

/// What the browser backend waits for before reading the page source: either
/// at least one result row, or the explicit empty-search marker.
pub const READY_SIGNAL: &str = ".results-list .row, .search-no-results";

pub const PRODUCT_NAME: &str = ".product-name";
pub const COMPANIES: &str = ".search-product-companies";
/// Availability badge ("In Stock", "Pre-Order", "Sold Out").
pub const STATUS: &str = ".search-listing-box";

/// Split price layout: dollars and cents in sibling spans.
pub const PRICE_WHOLE: &str = ".search-price .price-whole";
pub const PRICE_FRACTION: &str = ".search-price .price-fraction";
/// Single pre-formatted price string.
pub const PRICE_FORMATTED: &str = ".search-product-price";

pub const SALE_INFO: &str = ".search-sale-info";
pub const DISCOUNT: &str = ".search-discount";

pub const THUMBNAIL: &str = ".search-product-thumbnail";
