pub mod pagination;
pub mod response;

pub use pagination::{MAX_PAGE, MAX_PAGE_SIZE, PaginatedResponse, PaginationInfo, PaginationQuery};
pub use response::ApiResponse;
