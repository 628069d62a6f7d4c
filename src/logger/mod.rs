//! Optional JSONL activity log for rename runs.

pub mod jsonl;
