use crate::{
    backend::BookingBackend,
    booking_repository::BookingRepository,
    configuration::Configuration,
    errors::{BookingError, StorageError, ValidationError},
    types::{hhmm, Booking, BookingId, BookingInput, ResourceCatalog, ResourceType},
    view::{render, DisplayRow, Filter},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use validator::Validate;

const MAX_STAFF_NAME_LENGTH: u64 = 100;

/// Raw form fields as submitted by the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BookingForm {
    #[validate(length(max = MAX_STAFF_NAME_LENGTH))]
    #[serde(default)]
    pub staff_name: String,
    #[serde(default)]
    pub resource_type: String,
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
}

impl BookingForm {
    /// Trims and parses the fields, checking the resource against `catalog`.
    pub fn validate_input(&self, catalog: &ResourceCatalog) -> Result<BookingInput, ValidationError> {
        let form = BookingForm {
            staff_name: self.staff_name.trim().to_string(),
            ..self.clone()
        };
        if form.staff_name.is_empty() {
            return Err(ValidationError::MissingStaffName);
        }
        if form.validate().is_err() {
            return Err(ValidationError::StaffNameTooLong {
                max: MAX_STAFF_NAME_LENGTH,
            });
        }

        let resource_type =
            ResourceType::parse(&form.resource_type).ok_or(ValidationError::MissingResourceType)?;
        if form.resource.is_empty() {
            return Err(ValidationError::MissingResource);
        }
        if !catalog.contains(resource_type, &form.resource) {
            return Err(ValidationError::UnknownResource {
                resource_type,
                resource: form.resource,
            });
        }

        let date = NaiveDate::parse_from_str(&form.date, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(form.date.clone()))?;
        let start_time =
            hhmm::parse(&form.start_time).ok_or(ValidationError::InvalidTime(form.start_time.clone()))?;
        let end_time =
            hhmm::parse(&form.end_time).ok_or(ValidationError::InvalidTime(form.end_time.clone()))?;
        if start_time >= end_time {
            return Err(ValidationError::EndNotAfterStart);
        }

        Ok(BookingInput {
            staff_name: form.staff_name,
            resource_type,
            resource: form.resource,
            date,
            start_time,
            end_time,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormMessage {
    pub text: String,
    pub kind: MessageKind,
}

impl FormMessage {
    pub fn success(text: &str) -> Self {
        Self {
            text: text.into(),
            kind: MessageKind::Success,
        }
    }

    pub fn error(text: String) -> Self {
        Self {
            text,
            kind: MessageKind::Error,
        }
    }

    /// Inline feedback for one submission: green on success, red naming the failure otherwise.
    pub fn for_submission(result: &Result<Booking, BookingError>) -> Self {
        match result {
            Ok(_) => Self::success("Booking created successfully!"),
            Err(err) => Self::error(err.to_string()),
        }
    }

    pub fn color(&self) -> &'static str {
        match self.kind {
            MessageKind::Success => "green",
            MessageKind::Error => "red",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceOption {
    pub name: String,
    pub selected: bool,
}

/// Values shown in the form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub staff_name: String,
    pub resource_type: Option<ResourceType>,
    pub resource: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

impl FormState {
    pub fn reset(today: NaiveDate) -> Self {
        Self {
            staff_name: String::new(),
            resource_type: None,
            resource: String::new(),
            date: today.format("%Y-%m-%d").to_string(),
            start_time: String::new(),
            end_time: String::new(),
        }
    }

    pub fn from_form(form: &BookingForm) -> Self {
        Self {
            staff_name: form.staff_name.clone(),
            resource_type: ResourceType::parse(&form.resource_type),
            resource: form.resource.clone(),
            date: form.date.clone(),
            start_time: form.start_time.clone(),
            end_time: form.end_time.clone(),
        }
    }
}

/// Drives the repository from form submissions and cancel requests.
#[derive(Clone)]
pub struct FormController<T: BookingBackend, C: Configuration> {
    repository: BookingRepository<T>,
    configuration: C,
}

impl<T: BookingBackend, C: Configuration> FormController<T, C> {
    pub fn new(backend: T, configuration: C) -> Self {
        Self {
            repository: BookingRepository::new(backend),
            configuration,
        }
    }

    pub fn configuration(&self) -> &C {
        &self.configuration
    }

    pub fn resource_options(
        &self,
        resource_type: Option<ResourceType>,
        selected: &str,
    ) -> Vec<ResourceOption> {
        let catalog = self.configuration.catalog();
        resource_type
            .map(|resource_type| catalog.resources(resource_type).to_vec())
            .unwrap_or_default()
            .into_iter()
            .map(|name| ResourceOption {
                selected: name == selected,
                name,
            })
            .collect()
    }

    /// Validates and stores a submission. Nothing is kept between submissions besides the bookings.
    pub fn submit(&self, form: &BookingForm) -> Result<Booking, BookingError> {
        let result = form
            .validate_input(&self.configuration.catalog())
            .map_err(BookingError::from)
            .and_then(|input| self.repository.create(input));

        match &result {
            Err(BookingError::Storage(err)) => error!(?err, "Failed to store booking"),
            Err(err) => warn!(%err, "Booking rejected"),
            Ok(_) => {}
        }
        result
    }

    /// Cancels only after explicit confirmation. Returns whether a booking was removed.
    pub fn cancel(&self, id: BookingId, confirmed: bool) -> Result<bool, StorageError> {
        if !confirmed {
            return Ok(false);
        }
        self.repository.cancel(id)
    }

    pub fn booking(&self, id: BookingId) -> Option<Booking> {
        self.repository.get(id)
    }

    pub fn view(&self, filter: Filter, today: NaiveDate) -> Vec<DisplayRow> {
        render(filter, &self.repository.list(), today)
    }
}
