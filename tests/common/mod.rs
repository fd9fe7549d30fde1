#![allow(dead_code)]

pub mod app;
pub mod fixtures;
pub mod http;
pub mod recording;
