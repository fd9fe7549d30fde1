pub mod topic;
pub mod word;
