// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod hass_repository;
pub mod http_response;
pub mod svg_document;
