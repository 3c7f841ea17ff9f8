//! Two-level, software-walked page tables (spec §4.3/§4.4).

pub mod builder;
pub mod flush;
pub mod table;
pub mod translator;

pub use builder::build_page_table;
pub use flush::{PageFlush, PageFlushAll};
pub use table::{L1Table, L2Table, PageTableEntry};
pub use translator::{Translated, translate};
