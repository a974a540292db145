// Application state for HTTP handlers
use crate::application::card_service::CardService;

#[derive(Clone)]
pub struct AppState {
    pub card_service: CardService,
}
