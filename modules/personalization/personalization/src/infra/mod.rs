pub mod notify;
pub mod remote;
pub mod storage;
