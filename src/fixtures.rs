//! Sample book documents for seeding a collection.

use crate::errors::ShelfError;
use crate::store::BookStore;
use bson::{Document, doc};

struct Book {
    title: &'static str,
    author: &'static str,
    genre: &'static str,
    year: i32,
    price: f64,
    available: bool,
    pages: i32,
}

// No two books share a publishedYear, so sorting by it never ties.
const BOOKS: &[Book] = &[
    Book { title: "The Hobbit", author: "J.R.R. Tolkien", genre: "Fantasy", year: 1937, price: 14.99, available: true, pages: 310 },
    Book { title: "A Game of Thrones", author: "George R.R. Martin", genre: "Fantasy", year: 1996, price: 18.50, available: true, pages: 694 },
    Book { title: "The Name of the Wind", author: "Patrick Rothfuss", genre: "Fantasy", year: 2007, price: 16.00, available: false, pages: 662 },
    Book { title: "1984", author: "George Orwell", genre: "Dystopian", year: 1949, price: 9.99, available: true, pages: 328 },
    Book { title: "Animal Farm", author: "George Orwell", genre: "Satire", year: 1945, price: 7.50, available: false, pages: 112 },
    Book { title: "The Great Gatsby", author: "F. Scott Fitzgerald", genre: "Classic", year: 1925, price: 10.00, available: true, pages: 180 },
    Book { title: "Moby Dick", author: "Herman Melville", genre: "Classic", year: 1851, price: 12.25, available: false, pages: 635 },
    Book { title: "The Road", author: "Cormac McCarthy", genre: "Post-apocalyptic", year: 2006, price: 13.40, available: true, pages: 287 },
    Book { title: "Norwegian Wood", author: "Haruki Murakami", genre: "Literary Fiction", year: 1987, price: 15.20, available: true, pages: 296 },
    Book { title: "Possession", author: "A.S. Byatt", genre: "Literary Fiction", year: 1990, price: 14.00, available: true, pages: 555 },
    Book { title: "Life of Pi", author: "Yann Martel", genre: "Adventure", year: 2001, price: 11.75, available: true, pages: 319 },
    Book { title: "The Martian", author: "Andy Weir", genre: "Science Fiction", year: 2011, price: 12.99, available: false, pages: 369 },
];

/// The fixture, in insertion order.
pub fn sample_books() -> Vec<Document> {
    BOOKS
        .iter()
        .map(|b| {
            doc! {
                "title": b.title,
                "author": b.author,
                "genre": b.genre,
                "publishedYear": b.year,
                "price": b.price,
                "available": b.available,
                "pages": b.pages,
            }
        })
        .collect()
}

/// Insert the fixture into `store`, dropping the collection first when `reset` is set.
/// Returns the number of documents inserted.
pub async fn seed<S: BookStore>(store: &S, reset: bool) -> Result<usize, ShelfError> {
    if reset {
        store.drop_collection().await?;
        log::info!("collection dropped before seeding");
    }
    let n = store.insert_many(&sample_books()).await?;
    log::info!("seeded {n} book(s)");
    Ok(n)
}
