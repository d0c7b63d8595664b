//! # wkplan
//!
//! 週排產命令列工具：命令實作、命令列定義與日誌初始化

pub mod app;
pub mod cli;
pub mod logging;
