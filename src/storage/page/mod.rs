pub mod error;
pub mod heap_page;
pub mod layout;

pub use error::PageError;
pub use heap_page::HeapPage;
pub use layout::PageLayout;
