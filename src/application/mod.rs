// Application layer - Use cases over the host repository
pub mod card_service;
pub mod graph_pipeline;
pub mod history_fetcher;
pub mod host_repository;
pub mod state_watcher;

#[cfg(test)]
pub mod testing;
