//! Storage module for Localhost
//!
//! - `json`: JSON 설정 파일 저장/로드

mod json;

pub use json::{strip_json_comments, JsonStore, CONFIG_DIR_NAME};
