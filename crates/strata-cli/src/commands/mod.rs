pub mod dedup;
pub mod evaluate;
