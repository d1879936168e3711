// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod delay;
pub mod export;
pub mod game;
pub mod runtime;
pub mod scheduler;
pub mod scores;
pub mod stats;
pub mod storage;
pub mod ui;
pub mod view;
