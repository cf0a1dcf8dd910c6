mod bounds;
mod create;
mod delete;
mod get;
mod update;
mod utils;

pub use bounds::cat_get_by_bounding_box;
pub use create::cat_post;
pub use delete::{cat_delete, cat_delete_admin};
pub use get::{cat_get, cat_get_by_user, cat_list_get};
pub use update::{cat_put, cat_put_admin};
