pub mod issue;
pub mod result_item;
