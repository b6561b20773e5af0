pub mod instruction_footer;
pub mod list;
pub mod row_item;

pub use list::SettingsList;
