pub mod expense;
pub mod user;

// Re-export only the types we actually use
pub use expense::{
    normalize_notes, ExpenseRecord, ExpenseResponse, ExpenseRow, ExpenseStatus,
    ExpenseWithOwnerRow,
};
pub use user::{User, UserRole};
