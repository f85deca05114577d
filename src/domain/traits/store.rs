use crate::application::errors::StorageError;
use crate::domain::entities::BanRecord;

/// BanStore trait - abstraction for ban list persistence
pub trait BanStore: Send + Sync {
    fn load_bans(&self) -> Result<Vec<BanRecord>, StorageError>;
    fn save_ban(&self, record: &BanRecord) -> Result<(), StorageError>;
    fn delete_ban(&self, user: &str) -> Result<bool, StorageError>;
}
