pub mod jsonl;
pub mod sqlite;
