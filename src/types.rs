use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_ROOMS: [&str; 5] = [
    "Boardroom A",
    "Boardroom B",
    "Meeting Room 1",
    "Meeting Room 2",
    "Training Room",
];

pub const DEFAULT_EQUIPMENT: [&str; 5] = [
    "Projector",
    "Demo Laptop",
    "Test Tablet",
    "Video Camera",
    "Presentation Clicker",
];

/// Creation timestamp in milliseconds, bumped when it would collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(pub u64);

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Room,
    Equipment,
}

impl ResourceType {
    pub const ALL: [ResourceType; 2] = [ResourceType::Room, ResourceType::Equipment];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Room => "room",
            ResourceType::Equipment => "equipment",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResourceType::Room => "Room",
            ResourceType::Equipment => "Equipment",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "room" => Some(ResourceType::Room),
            "equipment" => Some(ResourceType::Equipment),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub staff_name: String,
    pub resource_type: ResourceType,
    pub resource: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

/// A validated submission that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingInput {
    pub staff_name: String,
    pub resource_type: ResourceType,
    pub resource: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl BookingInput {
    pub fn into_booking(self, id: BookingId) -> Booking {
        Booking {
            id,
            staff_name: self.staff_name,
            resource_type: self.resource_type,
            resource: self.resource,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceCatalog {
    pub rooms: Vec<String>,
    pub equipment: Vec<String>,
}

impl ResourceCatalog {
    pub fn new(rooms: Vec<String>, equipment: Vec<String>) -> Self {
        Self { rooms, equipment }
    }

    pub fn resources(&self, resource_type: ResourceType) -> &[String] {
        match resource_type {
            ResourceType::Room => &self.rooms,
            ResourceType::Equipment => &self.equipment,
        }
    }

    pub fn contains(&self, resource_type: ResourceType, resource: &str) -> bool {
        self.resources(resource_type)
            .iter()
            .any(|candidate| candidate == resource)
    }
}

impl Default for ResourceCatalog {
    fn default() -> Self {
        Self {
            rooms: DEFAULT_ROOMS.iter().map(|room| room.to_string()).collect(),
            equipment: DEFAULT_EQUIPMENT.iter().map(|item| item.to_string()).collect(),
        }
    }
}

/// Times are stored as `HH:MM`, seconds are accepted when reading.
pub mod hhmm {
    use chrono::{NaiveTime, Timelike};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    /// Drops seconds and below, the precision bookings are stored with.
    pub fn truncate(time: NaiveTime) -> NaiveTime {
        NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
    }

    pub fn parse(value: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(value, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
            .ok()
            .map(truncate)
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let value = String::deserialize(deserializer)?;
        parse(&value).ok_or_else(|| de::Error::custom(format!("invalid time of day: {value}")))
    }
}
