//! Work item model (C2): the abstraction every input — file or line — is
//! reduced to before the scheduler ever sees it.

mod abspath;
mod work_item;

pub use abspath::abspath;
pub use work_item::WorkItem;
