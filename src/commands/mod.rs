pub mod evaluate;
pub mod fetch_data;
