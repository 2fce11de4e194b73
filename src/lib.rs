// src/lib.rs — Library root for Botify

pub mod backend;
pub mod chat;
pub mod cli;
pub mod infra;
pub mod storage;
