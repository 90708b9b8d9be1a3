//! Both sides of a link stay in step through updates, deletes and rollback.

use kith_tests::prelude::*;
use pretty_assertions::assert_eq;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Author(EntityId);

impl Author {
    const NAME: Prop<Author, String> = Prop::new("name");
    const BOOKS: Link<Author, Book> = Link::new("books");
}

impl EntityKind for Author {
    const TYPE_NAME: &'static str = "Author";
}

impl DomainEntity for Author {
    fn wrap(id: EntityId) -> Self {
        Self(id)
    }

    fn id(&self) -> EntityId {
        self.0
    }

    fn declare(t: &mut kith_model::TypeDeclaration<Self>) {
        t.property(Self::NAME).required().done();
        t.link(Self::BOOKS, Cardinality::ZeroOrMore)
            .opposite(Book::AUTHOR)
            .done();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Book(EntityId);

impl Book {
    const TITLE: Prop<Book, String> = Prop::new("title");
    const AUTHOR: Link<Book, Author> = Link::new("author");
}

impl EntityKind for Book {
    const TYPE_NAME: &'static str = "Book";
}

impl DomainEntity for Book {
    fn wrap(id: EntityId) -> Self {
        Self(id)
    }

    fn id(&self) -> EntityId {
        self.0
    }

    fn declare(t: &mut kith_model::TypeDeclaration<Self>) {
        t.property(Self::TITLE).required().done();
        t.link(Self::AUTHOR, Cardinality::One)
            .opposite(Author::BOOKS)
            .on_target_delete(OnTargetDelete::Cascade)
            .done();
    }
}

/// Shelves just point at books; a deleted book drops off the shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Shelf(EntityId);

impl Shelf {
    const BOOKS: Link<Shelf, Book> = Link::new("books");
}

impl EntityKind for Shelf {
    const TYPE_NAME: &'static str = "Shelf";
}

impl DomainEntity for Shelf {
    fn wrap(id: EntityId) -> Self {
        Self(id)
    }

    fn id(&self) -> EntityId {
        self.0
    }

    fn declare(t: &mut kith_model::TypeDeclaration<Self>) {
        t.link(Self::BOOKS, Cardinality::ZeroOrMore).done();
    }
}

/// A lent book cannot be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Loan(EntityId);

impl Loan {
    const BOOK: Link<Loan, Book> = Link::new("book");
}

impl EntityKind for Loan {
    const TYPE_NAME: &'static str = "Loan";
}

impl DomainEntity for Loan {
    fn wrap(id: EntityId) -> Self {
        Self(id)
    }

    fn id(&self) -> EntityId {
        self.0
    }

    fn declare(t: &mut kith_model::TypeDeclaration<Self>) {
        t.link(Self::BOOK, Cardinality::ZeroOrOne)
            .on_target_delete(OnTargetDelete::Fail)
            .done();
    }
}

fn library() -> Model {
    let mut model = Model::new();
    model
        .register::<Author>()
        .register::<Book>()
        .register::<Shelf>()
        .register::<Loan>();
    model
}

struct Fixture {
    db: Database,
    author: Author,
    books: Vec<Book>,
    shelf: Shelf,
}

/// One author with two books, both on a shelf, committed.
fn fixture() -> Fixture {
    init_tracing();
    let mut db = library().open(StoreConfig::default()).unwrap();
    let (author, books, shelf) = db
        .transactional(|tx| -> TransactionResult<_> {
            let author = Author::create(tx)?;
            Author::NAME.set(tx, author, "Le Guin".to_string())?;
            let shelf = Shelf::create(tx)?;
            let mut books = Vec::new();
            for title in ["Earthsea", "The Dispossessed"] {
                let book = Book::create(tx)?;
                Book::TITLE.set(tx, book, title.to_string())?;
                Book::AUTHOR.set(tx, book, Some(author))?;
                Shelf::BOOKS.add(tx, shelf, book)?;
                books.push(book);
            }
            Ok((author, books, shelf))
        })
        .unwrap();
    Fixture {
        db,
        author,
        books,
        shelf,
    }
}

// ========== TEST: opposite_filled_on_commit ==========
#[test]
fn test_opposite_filled_on_commit() {
    let mut f = fixture();
    let tx = f.db.begin();

    assert_eq!(Author::BOOKS.all(&tx, f.author).unwrap(), f.books);
    assert_eq!(Book::AUTHOR.get(&tx, f.books[1]).unwrap(), Some(f.author));
}

// ========== TEST: cascade_and_clear ==========
#[test]
fn test_cascade_and_clear() {
    // GIVEN an author with two shelved books
    let mut f = fixture();
    let mut tx = f.db.begin();

    // WHEN the author is deleted
    f.author.delete(&mut tx).unwrap();

    // THEN the books cascade and the shelf is emptied
    assert!(!tx.exists(f.author.id()));
    assert!(f.books.iter().all(|b| !tx.exists(b.id())));
    assert!(Shelf::BOOKS.all(&tx, f.shelf).unwrap().is_empty());
    assert!(Book::all(&tx).unwrap().is_empty());
    tx.commit().unwrap();

    assert_eq!(f.db.entity_count(), 1);
}

// ========== TEST: deleting_one_book_updates_author ==========
#[test]
fn test_deleting_one_book_updates_author() {
    let mut f = fixture();
    let mut tx = f.db.begin();

    f.books[0].delete(&mut tx).unwrap();

    assert_eq!(Author::BOOKS.all(&tx, f.author).unwrap(), vec![f.books[1]]);
    assert_eq!(Shelf::BOOKS.all(&tx, f.shelf).unwrap(), vec![f.books[1]]);
    tx.commit().unwrap();
}

// ========== TEST: restricted_delete_changes_nothing ==========
#[test]
fn test_restricted_delete_changes_nothing() {
    // GIVEN one of the books is on loan
    let mut f = fixture();
    let mut tx = f.db.begin();
    let loan = Loan::create(&mut tx).unwrap();
    Loan::BOOK.set(&mut tx, loan, Some(f.books[1])).unwrap();

    // WHEN the author is deleted
    let err = f.author.delete(&mut tx).unwrap_err();

    // THEN the cascade stops and nothing was removed
    assert!(matches!(err, TransactionError::DeleteRestricted { .. }));
    assert!(tx.exists(f.author.id()));
    assert!(f.books.iter().all(|b| tx.exists(b.id())));
    assert_eq!(Author::BOOKS.all(&tx, f.author).unwrap(), f.books);
    assert_eq!(Shelf::BOOKS.all(&tx, f.shelf).unwrap().len(), 2);

    // AND the loan itself is still committable
    tx.commit().unwrap();
    assert_eq!(f.db.entity_count(), 5);
}

// ========== TEST: rollback_restores_both_sides ==========
#[test]
fn test_rollback_restores_both_sides() {
    // GIVEN a deleted book in an open transaction
    let mut f = fixture();
    let mut tx = f.db.begin();
    f.books[0].delete(&mut tx).unwrap();

    // WHEN rolled back
    tx.rollback();

    // THEN the book and both link sides are back, in their old order
    let tx = f.db.begin();
    assert!(tx.exists(f.books[0].id()));
    assert_eq!(Book::AUTHOR.get(&tx, f.books[0]).unwrap(), Some(f.author));
    assert_eq!(Author::BOOKS.all(&tx, f.author).unwrap(), f.books);
    assert!(Shelf::BOOKS.all(&tx, f.shelf).unwrap().contains(&f.books[0]));
}

// ========== TEST: reassigning_author_moves_book ==========
#[test]
fn test_reassigning_author_moves_book() {
    // GIVEN a second author
    let mut f = fixture();
    let mut tx = f.db.begin();
    let other = Author::create(&mut tx).unwrap();
    Author::NAME.set(&mut tx, other, "Butler".to_string()).unwrap();

    // WHEN a book is added to the other author's list
    Author::BOOKS.add(&mut tx, other, f.books[0]).unwrap();

    // THEN the single-valued back link moved with it
    assert_eq!(Book::AUTHOR.get(&tx, f.books[0]).unwrap(), Some(other));
    assert_eq!(Author::BOOKS.all(&tx, f.author).unwrap(), vec![f.books[1]]);
    tx.commit().unwrap();
}

// ========== TEST: orphaned_book_rejected ==========
#[test]
fn test_orphaned_book_rejected() {
    let mut f = fixture();
    let mut tx = f.db.begin();

    Book::AUTHOR.set(&mut tx, f.books[0], None).unwrap();

    let err = tx.commit().unwrap_err();
    let violations = err.violations().unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations.all()[0].constraint, "cardinality");
    assert_eq!(violations.all()[0].property.as_deref(), Some("author"));

    // the rejected commit left the link in place
    let tx = f.db.begin();
    assert_eq!(Book::AUTHOR.get(&tx, f.books[0]).unwrap(), Some(f.author));
}

// ========== TEST: dropped_transaction_rolls_back ==========
#[test]
fn test_dropped_transaction_rolls_back() {
    let mut f = fixture();
    {
        let mut tx = f.db.begin();
        Shelf::BOOKS.clear(&mut tx, f.shelf).unwrap();
    }

    let tx = f.db.begin();
    assert_eq!(Shelf::BOOKS.all(&tx, f.shelf).unwrap().len(), 2);
}

// ========== TEST: wrong_target_type ==========
#[test]
fn test_wrong_target_type() {
    let mut f = fixture();
    let mut tx = f.db.begin();

    let err = tx
        .add_link(f.shelf.id(), "books", f.author.id())
        .unwrap_err();

    assert!(matches!(err, TransactionError::LinkTargetMismatch { .. }));
    assert_eq!(err.to_string(), "Shelf.books targets Book, got Author");
}
