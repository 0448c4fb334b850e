mod store;

pub use store::{strip_json_comments, JsonStore, CONFIG_DIR_NAME};
