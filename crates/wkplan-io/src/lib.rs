//! # wkplan IO
//!
//! 來源資料表讀取與排產方案檔案讀寫

pub mod source;
pub mod writer;

// Re-export 主要類型
pub use source::{
    load_demand, load_products, load_stations, load_times, load_training, normalize_header,
    SourceTables,
};
pub use writer::{list_proposals, proposal_file_name, read_proposal, write_proposal, ProposalRow};
