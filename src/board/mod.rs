// Work-tracking board seam
//
// - Types: lists, cards, attachments and the reserved list roles
// - Trello: the REST-backed `BoardClient`

pub mod trello;
pub mod types;

use async_trait::async_trait;
use std::path::Path;

#[cfg(test)]
use mockall::automock;

pub use trello::TrelloClient;
pub use types::*;

use crate::config::TrelloConfig;
use crate::error::Result;

/// Operations the workflow performs against the board
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BoardClient: Send + Sync {
    /// All open lists on a board, in board order
    async fn get_lists(&self, board_id: &str) -> Result<Vec<BoardList>>;

    /// Up to `limit` cards of a list, in board order
    async fn get_cards(&self, list_id: &str, limit: usize) -> Result<Vec<Card>>;

    /// Attachments of a card
    async fn get_attachments(&self, card_id: &str) -> Result<Vec<Attachment>>;

    /// Fetch the bytes behind an attachment URL
    async fn download_attachment(&self, url: &str) -> Result<Vec<u8>>;

    /// Change the list a card belongs to
    async fn move_card(&self, card_id: &str, list_id: &str) -> Result<()>;

    /// Create a new card in a list
    async fn create_card(&self, list_id: &str, name: &str, desc: &str) -> Result<Card>;

    /// Attach a local file to a card
    async fn upload_attachment(&self, card_id: &str, file_path: &Path) -> Result<Attachment>;
}

/// Factory for creating board clients
pub struct BoardClientFactory;

impl BoardClientFactory {
    /// Create the default board client (Trello REST API)
    pub fn create_client(config: TrelloConfig) -> Result<Box<dyn BoardClient>> {
        Ok(Box::new(TrelloClient::new(config)?))
    }
}
