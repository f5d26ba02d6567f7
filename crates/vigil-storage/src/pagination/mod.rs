pub mod keyset;

pub use keyset::{PaginatedResult, PaginationCursor};
