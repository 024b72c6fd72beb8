//! タスクモジュール
//!
//! 割り込み外で動く非同期タスクを管理します。

pub mod status;

pub use status::status_task;
