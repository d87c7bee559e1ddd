pub mod segmentation;
pub mod storage;
