pub mod jsonl_store;
