use crate::backend::BookingBackend;
use crate::configuration::Configuration;
use crate::errors::BookingError;
use crate::form_controller::{BookingForm, FormController, FormMessage, FormState, ResourceOption};
use crate::types::{BookingId, ResourceType};
use crate::view::{BookingRow, DisplayRow, Filter};
use crate::AppState;
use askama::Template;
use axum::extract::{Path, Query};
use axum::response::{Html, Redirect, Response};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Form, Json};
use axum::{
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

#[derive(Debug, Clone, Default, Deserialize)]
struct ViewQuery {
    #[serde(default)]
    filter: Filter,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ResourceQuery {
    #[serde(default)]
    resource_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CancelRequest {
    #[serde(default)]
    confirm: bool,
}

struct TypeOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

struct FilterLink {
    value: &'static str,
    label: &'static str,
    active: bool,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    title: String,
    today: String,
    form: FormState,
    resource_types: Vec<TypeOption>,
    options: Vec<ResourceOption>,
    message: Option<FormMessage>,
    message_timeout_ms: u128,
    list_title: &'static str,
    filter_links: Vec<FilterLink>,
    rows: Vec<DisplayRow>,
}

#[derive(Template)]
#[template(path = "resource_options.html")]
struct ResourceOptionsTemplate {
    options: Vec<ResourceOption>,
}

#[derive(Template)]
#[template(path = "confirm_cancel.html")]
struct ConfirmCancelTemplate {
    title: String,
    booking: BookingRow,
}

type HttpError = (StatusCode, String);

pub fn create_app<T: BookingBackend, C: Configuration>(backend: T, configuration: C) -> Router {
    let state = AppState {
        controller: FormController::new(backend, configuration),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let page = Router::new()
        .route("/", get(get_page::<T, C>))
        .route("/resources", get(get_resource_options::<T, C>))
        .route("/bookings", post(submit_booking::<T, C>))
        .route(
            "/bookings/:id/cancel",
            get(get_cancel_confirmation::<T, C>).post(cancel_booking::<T, C>),
        );

    let api = Router::new().route("/api/bookings", get(get_bookings::<T, C>));

    Router::new()
        .merge(page)
        .merge(api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn join_error(err: tokio::task::JoinError) -> HttpError {
    error!(?err, "Storage task failed");
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

fn render_template(template: &impl Template) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        error!(?err, "Failed to render template");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render page: {err}"),
        )
    })
}

fn render_page<T: BookingBackend, C: Configuration>(
    controller: &FormController<T, C>,
    filter: Filter,
    form: FormState,
    message: Option<FormMessage>,
    today: NaiveDate,
) -> Result<Html<String>, HttpError> {
    let resource_types = ResourceType::ALL
        .iter()
        .map(|resource_type| TypeOption {
            value: resource_type.as_str(),
            label: resource_type.label(),
            selected: form.resource_type == Some(*resource_type),
        })
        .collect();
    let filter_links = Filter::ALL
        .iter()
        .map(|link| FilterLink {
            value: link.as_str(),
            label: link.label(),
            active: *link == filter,
        })
        .collect();

    let template = IndexTemplate {
        title: controller.configuration().website_title(),
        today: today.format("%Y-%m-%d").to_string(),
        options: controller.resource_options(form.resource_type, &form.resource),
        form,
        resource_types,
        message,
        message_timeout_ms: controller.configuration().message_timeout().as_millis(),
        list_title: filter.title(),
        filter_links,
        rows: controller.view(filter, today),
    };
    render_template(&template)
}

async fn get_page<T: BookingBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Query(query): Query<ViewQuery>,
) -> Result<Html<String>, HttpError> {
    let today = today();
    render_page(&state.controller, query.filter, FormState::reset(today), None, today)
}

async fn get_resource_options<T: BookingBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Query(query): Query<ResourceQuery>,
) -> Result<Html<String>, HttpError> {
    let resource_type = ResourceType::parse(&query.resource_type);
    let template = ResourceOptionsTemplate {
        options: state.controller.resource_options(resource_type, ""),
    };
    render_template(&template)
}

async fn submit_booking<T: BookingBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Form(form): Form<BookingForm>,
) -> Result<(StatusCode, Html<String>), HttpError> {
    let today = today();
    let controller = state.controller.clone();
    let submitted = form.clone();
    let result = tokio::task::spawn_blocking(move || controller.submit(&submitted))
        .await
        .map_err(join_error)?;
    let message = FormMessage::for_submission(&result);

    let (status, form_state) = match result {
        Ok(_) => (StatusCode::OK, FormState::reset(today)),
        Err(err) => {
            let status = match err {
                BookingError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                BookingError::Conflict { .. } => StatusCode::CONFLICT,
                BookingError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, FormState::from_form(&form))
        }
    };
    let page = render_page(&state.controller, Filter::Today, form_state, Some(message), today)?;
    Ok((status, page))
}

async fn get_cancel_confirmation<T: BookingBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Path(id): Path<BookingId>,
) -> Result<Response, HttpError> {
    let Some(booking) = state.controller.booking(id) else {
        return Ok(Redirect::to("/?filter=today").into_response());
    };
    let template = ConfirmCancelTemplate {
        title: state.controller.configuration().website_title(),
        booking: BookingRow::from(&booking),
    };
    Ok(render_template(&template)?.into_response())
}

async fn cancel_booking<T: BookingBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Path(id): Path<BookingId>,
    Form(request): Form<CancelRequest>,
) -> Result<Redirect, HttpError> {
    let controller = state.controller.clone();
    tokio::task::spawn_blocking(move || controller.cancel(id, request.confirm))
        .await
        .map_err(join_error)?
        .map_err(|err| {
            error!(?err, %id, "Failed to cancel booking");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        })?;
    Ok(Redirect::to("/?filter=today"))
}

async fn get_bookings<T: BookingBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Query(query): Query<ViewQuery>,
) -> impl IntoResponse {
    Json(state.controller.view(query.filter, today()))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::configuration_handler::ConfigurationHandler;
    use crate::testutils::MockBookingBackend;
    use crate::types::{Booking, BookingInput};
    use chrono::{Days, NaiveTime};
    use reqwest::Client;
    use std::sync::atomic::Ordering;
    use tokio::task::JoinHandle;

    async fn init(backend: MockBookingBackend) -> (JoinHandle<()>, String) {
        let app = create_app(backend, ConfigurationHandler::default());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (server, address)
    }

    fn booking(id: u64, staff: &str, date: NaiveDate, start: u32, end: u32) -> Booking {
        BookingInput {
            staff_name: staff.into(),
            resource_type: ResourceType::Room,
            resource: "Boardroom A".into(),
            date,
            start_time: NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end, 0, 0).unwrap(),
        }
        .into_booking(BookingId(id))
    }

    fn form(staff: &str, start: &str, end: &str) -> Vec<(&'static str, String)> {
        vec![
            ("staff_name", staff.to_string()),
            ("resource_type", "room".into()),
            ("resource", "Boardroom A".into()),
            ("date", today().format("%Y-%m-%d").to_string()),
            ("start_time", start.to_string()),
            ("end_time", end.to_string()),
        ]
    }

    #[tokio::test]
    async fn test_get_page() {
        let (server, address) = init(MockBookingBackend::new()).await;

        let response = reqwest::get(format!("{address}/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK.as_u16());
        assert_eq!(
            response
                .headers()
                .get("content-type")
                .unwrap()
                .to_str()
                .unwrap(),
            "text/html; charset=utf-8"
        );

        let html = response.text().await.unwrap();
        assert!(html.contains("id=\"bookingForm\""));
        assert!(html.contains("No bookings found."));
        assert!(html.contains(&format!("min=\"{}\"", today().format("%Y-%m-%d"))));

        server.abort();
    }

    #[test_case::test_case("09:00", "10:00", StatusCode::OK, "Booking created successfully!", 1 ; "accepted")]
    #[test_case::test_case("11:00", "10:00", StatusCode::UNPROCESSABLE_ENTITY, "End time must be after start time.", 0 ; "invalid interval")]
    #[tokio::test]
    async fn test_submit_booking(
        start: &str,
        end: &str,
        status: StatusCode,
        message: &str,
        expected_saves: u64,
    ) {
        let backend = MockBookingBackend::new();
        let (server, address) = init(backend.clone()).await;

        let response = Client::new()
            .post(format!("{address}/bookings"))
            .form(&form("Alice", start, end))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), status.as_u16());
        assert!(response.text().await.unwrap().contains(message));
        assert_eq!(backend.0.calls_to_save.load(Ordering::SeqCst), expected_saves);
        server.abort();
    }

    #[tokio::test]
    async fn test_message_belongs_to_submission_response() {
        let (server, address) = init(MockBookingBackend::new()).await;

        let html = Client::new()
            .post(format!("{address}/bookings"))
            .form(&form("Alice", "09:00", "10:00"))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(html.contains("Booking created successfully!"));
        assert!(html.contains("data-clear-after-ms=\"3000\""));

        let html = reqwest::get(format!("{address}/")).await.unwrap().text().await.unwrap();
        assert!(html.contains("Alice"));
        assert!(!html.contains("Booking created successfully!"));

        server.abort();
    }

    #[tokio::test]
    async fn test_conflicting_submission_keeps_single_record() {
        let backend = MockBookingBackend::with_bookings(vec![booking(1, "Alice", today(), 9, 10)]);
        let (server, address) = init(backend.clone()).await;

        let response = Client::new()
            .post(format!("{address}/bookings"))
            .form(&form("Bob", "09:30", "10:30"))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT.as_u16());
        let html = response.text().await.unwrap();
        assert!(html.contains("already booked for the selected time"));
        assert!(html.contains("value=\"Bob\""));
        assert_eq!(backend.0.bookings.lock().unwrap().len(), 1);
        server.abort();
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported() {
        let backend = MockBookingBackend::new();
        backend.0.success.store(false, Ordering::SeqCst);
        let (server, address) = init(backend).await;

        let response = Client::new()
            .post(format!("{address}/bookings"))
            .form(&form("Alice", "09:00", "10:00"))
            .send()
            .await
            .unwrap();

        assert_eq!(
            response.status(),
            StatusCode::INTERNAL_SERVER_ERROR.as_u16()
        );
        assert!(response.text().await.unwrap().contains("could not be saved"));
        server.abort();
    }

    #[tokio::test]
    async fn test_markup_in_staff_name_is_escaped() {
        let backend = MockBookingBackend::new();
        let (server, address) = init(backend.clone()).await;

        let response = Client::new()
            .post(format!("{address}/bookings"))
            .form(&form("<script>alert(1)</script>", "09:00", "10:00"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK.as_u16());

        let html = reqwest::get(format!("{address}/?filter=today"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(html.contains("&lt;script&gt;alert(1)"));
        assert!(!html.contains("<script>alert(1)"));
        assert_eq!(
            backend.0.bookings.lock().unwrap()[0].staff_name,
            "<script>alert(1)</script>"
        );
        server.abort();
    }

    #[tokio::test]
    async fn test_filters() {
        let today = today();
        let tomorrow = today.checked_add_days(Days::new(1)).unwrap();
        let yesterday = today.checked_sub_days(Days::new(1)).unwrap();
        let backend = MockBookingBackend::with_bookings(vec![
            booking(1, "Tomorrow Tina", tomorrow, 9, 10),
            booking(2, "Late Larry", today, 15, 16),
            booking(3, "Early Erin", today, 8, 9),
            booking(4, "Past Pete", yesterday, 8, 9),
        ]);
        let (server, address) = init(backend).await;

        let html = reqwest::get(format!("{address}/?filter=today"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        let early = html.find("Early Erin").unwrap();
        let late = html.find("Late Larry").unwrap();
        assert!(early < late);
        assert!(!html.contains("Tomorrow Tina"));
        assert!(!html.contains("Past Pete"));

        let html = reqwest::get(format!("{address}/?filter=tomorrow"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(html.contains("Tomorrow Tina"));
        assert!(!html.contains("Early Erin"));

        let rows: serde_json::Value = reqwest::get(format!("{address}/api/bookings?filter=upcoming"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let names: Vec<&str> = rows
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["staff_name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Early Erin", "Late Larry", "Tomorrow Tina"]);
        assert_eq!(rows[0]["kind"], "booking");
        assert_eq!(rows[0]["date"], today.format("%d/%m/%Y").to_string());

        server.abort();
    }

    #[tokio::test]
    async fn test_empty_api_view_has_placeholder() {
        let (server, address) = init(MockBookingBackend::new()).await;

        let rows: serde_json::Value = reqwest::get(format!("{address}/api/bookings"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(
            rows,
            serde_json::json!([{ "kind": "empty", "message": "No bookings found." }])
        );
        server.abort();
    }

    #[test_case::test_case("room", "Boardroom A", "Projector" ; "rooms")]
    #[test_case::test_case("equipment", "Projector", "Boardroom A" ; "equipment")]
    #[tokio::test]
    async fn test_resource_options(resource_type: &str, included: &str, excluded: &str) {
        let (server, address) = init(MockBookingBackend::new()).await;

        let html = reqwest::get(format!("{address}/resources?resource_type={resource_type}"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(html.contains("-- Select Resource --"));
        assert!(html.contains(included));
        assert!(!html.contains(excluded));
        server.abort();
    }

    #[tokio::test]
    async fn test_cancel_requires_confirmation() {
        let backend = MockBookingBackend::with_bookings(vec![booking(42, "Alice", today(), 9, 10)]);
        let (server, address) = init(backend.clone()).await;
        let client = Client::new();

        let html = client
            .get(format!("{address}/bookings/42/cancel"))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(html.contains("Are you sure you want to cancel this booking?"));

        let response = client
            .post(format!("{address}/bookings/42/cancel"))
            .form(&[("confirm", "false")])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK.as_u16());
        assert_eq!(backend.0.bookings.lock().unwrap().len(), 1);

        for _ in 0..2 {
            let response = client
                .post(format!("{address}/bookings/42/cancel"))
                .form(&[("confirm", "true")])
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK.as_u16());
            assert!(backend.0.bookings.lock().unwrap().is_empty());
        }
        assert_eq!(backend.0.calls_to_save.load(Ordering::SeqCst), 1);

        server.abort();
    }

    #[tokio::test]
    async fn test_confirmation_for_unknown_booking_redirects() {
        let (server, address) = init(MockBookingBackend::new()).await;

        let response = reqwest::get(format!("{address}/bookings/7/cancel")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK.as_u16());
        assert!(response.url().as_str().ends_with("/?filter=today"));
        server.abort();
    }
}
