use crate::types::ResourceCatalog;
use std::{path::PathBuf, time::Duration};

pub trait Configuration: Clone + Send + Sync + 'static {
    fn website_title(&self) -> String;
    fn port(&self) -> String;
    /// Directory of the persistent store; `None` keeps bookings in memory only.
    fn storage_path(&self) -> Option<PathBuf>;
    fn catalog(&self) -> ResourceCatalog;
    fn message_timeout(&self) -> Duration;
}
