//! Application services

mod qna_adapter;

pub use qna_adapter::QnaAdapter;
