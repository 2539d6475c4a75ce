use tabled::{settings::Style, Table, Tabled};
use crate::values::Book;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Tabled)]
pub struct BookRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Title")]
    pub name: String,
    #[tabled(rename = "Author")]
    pub author: String,
    #[tabled(rename = "Price")]
    pub price: i64,
    #[tabled(rename = "Qty")]
    pub quantity: i64,
    #[tabled(rename = "Supplier")]
    pub supplier: String,
    #[tabled(rename = "Phone")]
    pub supplier_number: String,
}

impl From<&Book> for BookRow {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            name: book.name.clone(),
            author: book.display_author().to_string(),
            price: book.price,
            quantity: book.quantity,
            supplier: book.supplier_name.clone(),
            supplier_number: book.supplier_number.clone().unwrap_or_default(),
        }
    }
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

pub fn books_table(books: &[Book]) -> String {
    if books.is_empty() {
        return String::new();
    }
    let rows: Vec<BookRow> = books.iter().map(BookRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}
