//! Loan lifecycle: lending copies out, taking them back, and reporting on
//! loans still out or past due.

use chrono::{Local, NaiveDate, Utc};
use tracing::{info, warn};

use crate::domain::availability_service::AvailabilityService;
use crate::domain::errors::{LibraryError, Result};
use crate::storage::{DbConnection, LoanRepository};
use shared::{BorrowRequest, Loan};

/// Service for the loan lifecycle
#[derive(Clone)]
pub struct LoanService {
    loan_repository: LoanRepository,
    availability_service: AvailabilityService,
}

impl LoanService {
    /// Create a new LoanService
    pub fn new(db: DbConnection) -> Self {
        let loan_repository = LoanRepository::new(db.clone());
        let availability_service = AvailabilityService::new(db);
        Self {
            loan_repository,
            availability_service,
        }
    }

    /// Lend a copy of a book to a member.
    ///
    /// Fails with `NoCopiesAvailable` when every copy is already out, or
    /// when the book does not exist at all. The due date is taken as given;
    /// a date already past produces a loan that is immediately overdue.
    pub async fn borrow(&self, request: BorrowRequest) -> Result<Loan> {
        info!(
            "Borrowing book {} for member {}, due {}",
            request.book_id, request.member_id, request.due_date
        );

        // The availability check and the insert are separate statements; a
        // competing borrow can slip between them.
        let available = self
            .availability_service
            .available_copies(request.book_id)
            .await?;

        if available <= 0 {
            warn!("No copies of book {} available", request.book_id);
            return Err(LibraryError::NoCopiesAvailable(request.book_id));
        }

        let borrowed_at = Utc::now();
        let id = self
            .loan_repository
            .store_loan(
                request.member_id,
                request.book_id,
                borrowed_at,
                request.due_date,
            )
            .await?;

        let loan = Loan {
            id,
            member_id: request.member_id,
            book_id: request.book_id,
            borrowed_at,
            due_date: request.due_date,
            returned_at: None,
        };

        info!("Created loan {} for book {}", loan.id, loan.book_id);

        Ok(loan)
    }

    /// Mark a loan returned.
    ///
    /// Only an active loan changes; returning one that is already closed,
    /// or that never existed, is a quiet no-op and the first return's
    /// timestamp stands.
    pub async fn return_loan(&self, loan_id: i64) -> Result<()> {
        info!("Returning loan: {}", loan_id);

        let closed = self.loan_repository.close_loan(loan_id, Utc::now()).await?;

        if closed {
            info!("Closed loan: {}", loan_id);
        } else {
            warn!("Loan {} already returned or unknown; nothing to do", loan_id);
        }

        Ok(())
    }

    /// List loans, most recent borrowing first
    pub async fn list_loans(&self, active_only: bool) -> Result<Vec<Loan>> {
        info!("Listing loans (active_only={})", active_only);

        let loans = self.loan_repository.list_loans(active_only).await?;

        info!("Found {} loans", loans.len());

        Ok(loans)
    }

    /// Active loans due strictly before `as_of`, soonest due first.
    /// A loan due exactly on `as_of` is not overdue. `None` means today.
    pub async fn overdue(&self, as_of: Option<NaiveDate>) -> Result<Vec<Loan>> {
        let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
        info!("Listing loans overdue as of {}", as_of);

        let loans = self.loan_repository.list_overdue(as_of).await?;

        info!("Found {} overdue loans", loans.len());

        Ok(loans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::book_service::BookService;
    use crate::domain::member_service::MemberService;
    use shared::{AddBookRequest, AddMemberRequest, Book, Member};

    struct TestFixture {
        loans: LoanService,
        books: BookService,
        members: MemberService,
        availability: AvailabilityService,
    }

    async fn setup_test() -> TestFixture {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        TestFixture {
            loans: LoanService::new(db.clone()),
            books: BookService::new(db.clone()),
            members: MemberService::new(db.clone()),
            availability: AvailabilityService::new(db),
        }
    }

    async fn add_book(fixture: &TestFixture, title: &str, isbn: &str, copies: i64) -> Book {
        fixture
            .books
            .add_book(AddBookRequest {
                title: title.to_string(),
                author: "Author".to_string(),
                isbn: isbn.to_string(),
                total_copies: copies,
            })
            .await
            .expect("Failed to add book")
    }

    async fn add_member(fixture: &TestFixture, name: &str, email: &str) -> Member {
        fixture
            .members
            .add_member(AddMemberRequest {
                name: name.to_string(),
                email: email.to_string(),
                phone: None,
            })
            .await
            .expect("Failed to add member")
    }

    fn due(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[tokio::test]
    async fn test_borrow_reduces_availability() {
        let fixture = setup_test().await;
        let book = add_book(&fixture, "Dune", "isbn-1", 2).await;
        let member = add_member(&fixture, "Ada", "ada@example.com").await;

        let loan = fixture
            .loans
            .borrow(BorrowRequest {
                member_id: member.id,
                book_id: book.id,
                due_date: due(2099, 1, 1),
            })
            .await
            .expect("Failed to borrow");

        assert!(loan.id > 0);
        assert_eq!(loan.member_id, member.id);
        assert_eq!(loan.book_id, book.id);
        assert_eq!(loan.due_date, due(2099, 1, 1));
        assert!(loan.is_active());

        assert_eq!(
            fixture.availability.available_copies(book.id).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_borrow_fails_when_no_copies_left() {
        let fixture = setup_test().await;
        let book = add_book(&fixture, "Dune", "isbn-1", 1).await;
        let ada = add_member(&fixture, "Ada", "ada@example.com").await;
        let grace = add_member(&fixture, "Grace", "grace@example.com").await;

        fixture
            .loans
            .borrow(BorrowRequest {
                member_id: ada.id,
                book_id: book.id,
                due_date: due(2099, 1, 1),
            })
            .await
            .expect("Failed to borrow");

        // The last copy is out
        let err = fixture
            .loans
            .borrow(BorrowRequest {
                member_id: grace.id,
                book_id: book.id,
                due_date: due(2099, 1, 1),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::NoCopiesAvailable(id) if id == book.id));

        // The failed borrow wrote nothing
        let all = fixture.loans.list_loans(false).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_borrow_again_after_return() {
        let fixture = setup_test().await;
        let book = add_book(&fixture, "Dune", "isbn-1", 1).await;
        let member = add_member(&fixture, "Ada", "ada@example.com").await;

        let loan = fixture
            .loans
            .borrow(BorrowRequest {
                member_id: member.id,
                book_id: book.id,
                due_date: due(2099, 1, 1),
            })
            .await
            .expect("Failed to borrow");

        fixture
            .loans
            .return_loan(loan.id)
            .await
            .expect("Failed to return");

        // The copy is back on the shelf, so borrowing works again
        fixture
            .loans
            .borrow(BorrowRequest {
                member_id: member.id,
                book_id: book.id,
                due_date: due(2099, 6, 1),
            })
            .await
            .expect("Failed to borrow after return");
    }

    #[tokio::test]
    async fn test_borrow_unknown_book() {
        let fixture = setup_test().await;
        let member = add_member(&fixture, "Ada", "ada@example.com").await;

        let err = fixture
            .loans
            .borrow(BorrowRequest {
                member_id: member.id,
                book_id: 9999,
                due_date: due(2099, 1, 1),
            })
            .await
            .unwrap_err();

        // An unknown book has zero availability
        assert!(matches!(err, LibraryError::NoCopiesAvailable(9999)));
    }

    #[tokio::test]
    async fn test_borrow_unknown_member() {
        let fixture = setup_test().await;
        let book = add_book(&fixture, "Dune", "isbn-1", 1).await;

        // The foreign key rejects the insert
        let err = fixture
            .loans
            .borrow(BorrowRequest {
                member_id: 9999,
                book_id: book.id,
                due_date: due(2099, 1, 1),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::NotFound(_)));

        // And no loan was recorded
        let all = fixture.loans.list_loans(false).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_return_loan_is_idempotent() {
        let fixture = setup_test().await;
        let book = add_book(&fixture, "Dune", "isbn-1", 1).await;
        let member = add_member(&fixture, "Ada", "ada@example.com").await;

        let loan = fixture
            .loans
            .borrow(BorrowRequest {
                member_id: member.id,
                book_id: book.id,
                due_date: due(2099, 1, 1),
            })
            .await
            .expect("Failed to borrow");

        fixture
            .loans
            .return_loan(loan.id)
            .await
            .expect("Failed to return");
        let first = fixture.loans.list_loans(false).await.unwrap()[0].returned_at;
        assert!(first.is_some());

        // Small delay so an overwrite would produce a different timestamp
        tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;

        // Second return is accepted and changes nothing
        fixture
            .loans
            .return_loan(loan.id)
            .await
            .expect("Second return should succeed");
        let second = fixture.loans.list_loans(false).await.unwrap()[0].returned_at;
        assert_eq!(first, second);

        assert_eq!(
            fixture.availability.available_copies(book.id).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_return_unknown_loan_is_a_noop() {
        let fixture = setup_test().await;

        fixture
            .loans
            .return_loan(9999)
            .await
            .expect("Returning an unknown loan should not fail");
    }

    #[tokio::test]
    async fn test_overdue_detection_and_ordering() {
        let fixture = setup_test().await;
        let member = add_member(&fixture, "Ada", "ada@example.com").await;
        let early = add_book(&fixture, "Early", "isbn-1", 1).await;
        let later = add_book(&fixture, "Later", "isbn-2", 1).await;
        let future = add_book(&fixture, "Future", "isbn-3", 1).await;

        let early_loan = fixture
            .loans
            .borrow(BorrowRequest {
                member_id: member.id,
                book_id: early.id,
                due_date: due(2020, 1, 1),
            })
            .await
            .unwrap();
        fixture
            .loans
            .borrow(BorrowRequest {
                member_id: member.id,
                book_id: later.id,
                due_date: due(2021, 6, 1),
            })
            .await
            .unwrap();
        fixture
            .loans
            .borrow(BorrowRequest {
                member_id: member.id,
                book_id: future.id,
                due_date: due(2099, 1, 1),
            })
            .await
            .unwrap();

        // Soonest-due first, future loan absent
        let overdue = fixture
            .loans
            .overdue(Some(due(2024, 1, 1)))
            .await
            .expect("Failed to list overdue");
        let due_dates: Vec<NaiveDate> = overdue.iter().map(|l| l.due_date).collect();
        assert_eq!(due_dates, vec![due(2020, 1, 1), due(2021, 6, 1)]);

        // A returned loan drops out no matter how late it was
        fixture.loans.return_loan(early_loan.id).await.unwrap();
        let overdue = fixture.loans.overdue(Some(due(2024, 1, 1))).await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].due_date, due(2021, 6, 1));
    }

    #[tokio::test]
    async fn test_loan_due_today_is_not_overdue() {
        let fixture = setup_test().await;
        let book = add_book(&fixture, "Dune", "isbn-1", 1).await;
        let member = add_member(&fixture, "Ada", "ada@example.com").await;

        fixture
            .loans
            .borrow(BorrowRequest {
                member_id: member.id,
                book_id: book.id,
                due_date: due(2024, 1, 1),
            })
            .await
            .unwrap();

        // Due exactly on as_of: not overdue yet
        let overdue = fixture.loans.overdue(Some(due(2024, 1, 1))).await.unwrap();
        assert!(overdue.is_empty());

        // One day later it is
        let overdue = fixture.loans.overdue(Some(due(2024, 1, 2))).await.unwrap();
        assert_eq!(overdue.len(), 1);
    }

    #[tokio::test]
    async fn test_overdue_defaults_to_today() {
        let fixture = setup_test().await;
        let past_book = add_book(&fixture, "Past", "isbn-1", 1).await;
        let future_book = add_book(&fixture, "Future", "isbn-2", 1).await;
        let member = add_member(&fixture, "Ada", "ada@example.com").await;

        let today = Local::now().date_naive();
        fixture
            .loans
            .borrow(BorrowRequest {
                member_id: member.id,
                book_id: past_book.id,
                due_date: today.pred_opt().unwrap(),
            })
            .await
            .unwrap();
        fixture
            .loans
            .borrow(BorrowRequest {
                member_id: member.id,
                book_id: future_book.id,
                due_date: today.succ_opt().unwrap(),
            })
            .await
            .unwrap();

        let overdue = fixture.loans.overdue(None).await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].book_id, past_book.id);
    }

    #[tokio::test]
    async fn test_borrow_with_past_due_date_is_allowed() {
        let fixture = setup_test().await;
        let book = add_book(&fixture, "Dune", "isbn-1", 1).await;
        let member = add_member(&fixture, "Ada", "ada@example.com").await;

        // No validation ties the due date to the borrow time
        let loan = fixture
            .loans
            .borrow(BorrowRequest {
                member_id: member.id,
                book_id: book.id,
                due_date: due(2020, 1, 1),
            })
            .await
            .expect("Past due dates are accepted");

        assert!(loan.is_overdue(due(2024, 1, 1)));
    }

    #[tokio::test]
    async fn test_list_loans_filter_and_order() {
        let fixture = setup_test().await;
        let member = add_member(&fixture, "Ada", "ada@example.com").await;

        let mut loan_ids = Vec::new();
        for isbn in ["isbn-1", "isbn-2", "isbn-3"] {
            let book = add_book(&fixture, isbn, isbn, 1).await;
            let loan = fixture
                .loans
                .borrow(BorrowRequest {
                    member_id: member.id,
                    book_id: book.id,
                    due_date: due(2099, 1, 1),
                })
                .await
                .unwrap();
            loan_ids.push(loan.id);

            // Distinct borrow timestamps for a stable ordering
            tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
        }

        // Most recent borrowing first
        let all = fixture.loans.list_loans(false).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![loan_ids[2], loan_ids[1], loan_ids[0]]);

        // Returning the middle loan removes it from the active view only
        fixture.loans.return_loan(loan_ids[1]).await.unwrap();
        let active = fixture.loans.list_loans(true).await.unwrap();
        let ids: Vec<i64> = active.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![loan_ids[2], loan_ids[0]]);

        let all = fixture.loans.list_loans(false).await.unwrap();
        assert_eq!(all.len(), 3);
    }
}
