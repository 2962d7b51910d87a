use crate::{
    configuration::Configuration,
    types::{ResourceCatalog, DEFAULT_EQUIPMENT, DEFAULT_ROOMS},
};
use clap::Parser;
use std::{path::PathBuf, time::Duration};

#[derive(Debug, Clone, Parser)]
#[command(version, about = "Resource booking form for rooms and equipment")]
pub struct ConfigurationHandler {
    /// Port the web interface listens on
    #[arg(long, env = "BOOKING_PORT", default_value = "3000")]
    pub port: String,

    /// Heading shown on the page and in the browser title
    #[arg(
        long,
        env = "BOOKING_TITLE",
        default_value = "GlobalMicro South Africa - Resource Booking"
    )]
    pub title: String,

    /// Directory for persistent bookings. Bookings are kept in memory if omitted.
    #[arg(long, env = "BOOKING_STORAGE_PATH")]
    pub storage_path: Option<PathBuf>,

    /// Bookable room, repeat for several
    #[arg(long = "room", default_values = DEFAULT_ROOMS)]
    pub rooms: Vec<String>,

    /// Bookable equipment item, repeat for several
    #[arg(long = "equipment", default_values = DEFAULT_EQUIPMENT)]
    pub equipment: Vec<String>,

    /// Seconds before the form message disappears
    #[arg(long, env = "BOOKING_MESSAGE_TIMEOUT_SECS", default_value_t = 3)]
    pub message_timeout_secs: u64,
}

impl ConfigurationHandler {
    pub fn parse_arguments() -> Self {
        Self::parse()
    }
}

impl Default for ConfigurationHandler {
    fn default() -> Self {
        let catalog = ResourceCatalog::default();
        Self {
            port: "3000".into(),
            title: "GlobalMicro South Africa - Resource Booking".into(),
            storage_path: None,
            rooms: catalog.rooms,
            equipment: catalog.equipment,
            message_timeout_secs: 3,
        }
    }
}

impl Configuration for ConfigurationHandler {
    fn website_title(&self) -> String {
        self.title.clone()
    }

    fn port(&self) -> String {
        self.port.clone()
    }

    fn storage_path(&self) -> Option<PathBuf> {
        self.storage_path.clone()
    }

    fn catalog(&self) -> ResourceCatalog {
        ResourceCatalog::new(self.rooms.clone(), self.equipment.clone())
    }

    fn message_timeout(&self) -> Duration {
        Duration::from_secs(self.message_timeout_secs)
    }
}
