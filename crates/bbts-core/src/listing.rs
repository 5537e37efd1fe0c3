/// Placeholder written when a listing has no company/brand element.
pub const DEFAULT_COMPANY: &str = "No company";
/// Placeholder written when neither price layout is present.
pub const DEFAULT_PRICE: &str = "No price";
/// Placeholder written when the availability badge is missing.
pub const DEFAULT_STATUS: &str = "Unavailable";
pub const DEFAULT_SALE_INFO: &str = "No sale";
pub const DEFAULT_DISCOUNT: &str = "No discount";
pub const DEFAULT_PHOTO: &str = "No photo";

/// One product entry scraped from a search results page.
///
/// Only `name` is required at extraction time; every other field carries a
/// sentinel default (see the `DEFAULT_*` constants) so a row is always
/// complete when it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRecord {
    pub name: String,
    pub company: String,
    /// Formatted monetary string, e.g. `"$24.99"`.
    pub price: String,
    /// Availability badge text, e.g. `"In Stock"` or `"Pre-Order"`.
    pub status: String,
    pub sale_info: String,
    /// Discount percentage as rendered by the site, e.g. `"20% Off"`.
    pub discount: String,
    /// Thumbnail URL. Persisted only by [`StoreSchema::WithPhoto`].
    pub photo: String,
}

impl ListingRecord {
    /// Creates a record with every optional field set to its default.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            company: DEFAULT_COMPANY.to_owned(),
            price: DEFAULT_PRICE.to_owned(),
            status: DEFAULT_STATUS.to_owned(),
            sale_info: DEFAULT_SALE_INFO.to_owned(),
            discount: DEFAULT_DISCOUNT.to_owned(),
            photo: DEFAULT_PHOTO.to_owned(),
        }
    }

    /// Builder-style setter for `company`.
    #[must_use]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    /// Returns the `(name, company)` identity used for cross-run dedup.
    #[must_use]
    pub fn key(&self) -> ListingKey {
        ListingKey::new(&self.name, &self.company)
    }

    /// Returns this record's cells in the column order of `schema`.
    #[must_use]
    pub fn to_row(&self, schema: StoreSchema) -> Vec<&str> {
        let mut row = vec![
            self.name.as_str(),
            self.company.as_str(),
            self.price.as_str(),
            self.status.as_str(),
            self.sale_info.as_str(),
            self.discount.as_str(),
        ];
        if schema == StoreSchema::WithPhoto {
            row.push(self.photo.as_str());
        }
        row
    }
}

/// Dedup identity of a listing: two records with the same name and company
/// are the same listing, regardless of price or stock changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingKey {
    pub name: String,
    pub company: String,
}

impl ListingKey {
    #[must_use]
    pub fn new(name: &str, company: &str) -> Self {
        Self {
            name: name.to_owned(),
            company: company.to_owned(),
        }
    }
}

/// Ordered column layout of the persisted store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreSchema {
    /// `Name, Company, Price, Status, Sale Info, Discount`.
    Standard,
    /// [`StoreSchema::Standard`] plus a trailing `Photo` column.
    WithPhoto,
}

const STANDARD_HEADERS: [&str; 6] = [
    "Name",
    "Company",
    "Price",
    "Status",
    "Sale Info",
    "Discount",
];
const PHOTO_HEADERS: [&str; 7] = [
    "Name",
    "Company",
    "Price",
    "Status",
    "Sale Info",
    "Discount",
    "Photo",
];

impl StoreSchema {
    /// Column index of `Name` in every layout.
    pub const NAME_COLUMN: usize = 0;
    /// Column index of `Company` in every layout.
    pub const COMPANY_COLUMN: usize = 1;

    /// Header row written once when the store is created.
    #[must_use]
    pub fn headers(self) -> &'static [&'static str] {
        match self {
            StoreSchema::Standard => &STANDARD_HEADERS,
            StoreSchema::WithPhoto => &PHOTO_HEADERS,
        }
    }
}

impl std::fmt::Display for StoreSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.headers().join(","))
    }
}
