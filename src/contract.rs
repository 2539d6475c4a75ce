//! Books contract - table name, columns, content URIs and MIME types

use crate::uri::ResourceUri;

/// Scheme of every provider URI
pub const SCHEME: &str = "content";

/// Authority that owns the books resources
pub const CONTENT_AUTHORITY: &str = "com.example.android.books";

/// Path segment for the books collection
pub const PATH_BOOKS: &str = "books";

/// Name of the backing table
pub const TABLE_NAME: &str = "books";

pub const ID: &str = "id";
pub const NAME: &str = "name";
pub const AUTHOR: &str = "author";
pub const PRICE: &str = "price";
pub const QUANTITY: &str = "quantity";
pub const SUPPLIER_NAME: &str = "supplier_name";
pub const SUPPLIER_NUMBER: &str = "supplier_number";

/// All columns in table order
pub const ALL_COLUMNS: &[&str] = &[ID, NAME, AUTHOR, PRICE, QUANTITY, SUPPLIER_NAME, SUPPLIER_NUMBER];

/// Base type marking a list of records
pub const CURSOR_DIR_BASE_TYPE: &str = "vnd.android.cursor.dir";

/// Base type marking a single record
pub const CURSOR_ITEM_BASE_TYPE: &str = "vnd.android.cursor.item";

/// MIME type of the collection URI
pub const CONTENT_LIST_TYPE: &str = "vnd.android.cursor.dir/com.example.android.books.books";

/// MIME type of an item URI
pub const CONTENT_ITEM_TYPE: &str = "vnd.android.cursor.item/com.example.android.books.books";

/// Build the MIME type for a resource under `authority`/`path`.
pub fn mime_type(authority: &str, path: &str, single_item: bool) -> String {
    let base = if single_item { CURSOR_ITEM_BASE_TYPE } else { CURSOR_DIR_BASE_TYPE };
    format!("{}/{}.{}", base, authority, path)
}

/// The collection URI, `content://<authority>/books`
pub fn content_uri() -> ResourceUri {
    ResourceUri::new(SCHEME, CONTENT_AUTHORITY, &[PATH_BOOKS])
}

/// The item URI for a single book
pub fn item_uri(id: i64) -> ResourceUri {
    content_uri().with_appended_id(id)
}

pub fn is_known_column(column: &str) -> bool {
    ALL_COLUMNS.contains(&column)
}
