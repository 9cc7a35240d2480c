// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! JSON routes used by the web frontend. They call the same services as the
//! GraphQL schema and render failures as `{"error": message}`.

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::{
    Method, Response, StatusCode,
    body::{Body, Bytes},
    header,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::ServiceError,
    graphql::{Context, parse_id},
    services::{events, forum, registration, tickets},
};

#[derive(Deserialize, Default)]
struct TeamBody {
    #[serde(default)]
    team_id: Option<Uuid>,
}

#[derive(Deserialize)]
struct PurchaseBody {
    #[serde(default)]
    ticket_type: String,
    #[serde(default = "one")]
    quantity: i64,
}

fn one() -> i64 {
    1
}

impl Default for PurchaseBody {
    fn default() -> Self {
        Self {
            ticket_type: String::new(),
            quantity: one(),
        }
    }
}

#[derive(Deserialize)]
struct TransferBody {
    recipient_id: Uuid,
}

#[derive(Deserialize, Default)]
struct ReplyBody {
    #[serde(default)]
    body: String,
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response<String> {
    let body = match serde_json::to_string(value) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!("Failed to serialize response: {e}");
            return error_response(&ServiceError::Internal);
        }
    };
    let mut resp = Response::new(body);
    *resp.status_mut() = status;
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    resp
}

fn error_response(err: &ServiceError) -> Response<String> {
    let mut resp = Response::new(json!({ "error": err.to_string() }).to_string());
    *resp.status_mut() = err.kind().status();
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    resp
}

/// An empty body reads as the type's default.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ServiceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    parse_required_body(body)
}

fn parse_required_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ServiceError> {
    serde_json::from_slice(body)
        .map_err(|e| ServiceError::BadRequest(format!("body JSON tidak valid ({e})")))
}

fn render<T: Serialize>(result: Result<T, ServiceError>) -> Response<String> {
    match result {
        Ok(value) => json_response(StatusCode::OK, &value),
        Err(err) => error_response(&err),
    }
}

async fn register_team(
    ctx: &Context,
    id: &str,
    body: &Bytes,
) -> Result<serde_json::Value, ServiceError> {
    let tournament_id = parse_id(id, "ID turnamen")?;
    let TeamBody { team_id } = parse_body(body)?;
    let outcome = registration::register(ctx.store(), ctx.caller(), tournament_id, team_id).await?;
    Ok(json!({
        "success": true,
        "registration": outcome.registration,
        "participant_count": outcome.participant_count,
        "message": outcome.message,
    }))
}

async fn unregister_team(
    ctx: &Context,
    id: &str,
    body: &Bytes,
) -> Result<serde_json::Value, ServiceError> {
    let tournament_id = parse_id(id, "ID turnamen")?;
    let TeamBody { team_id } = parse_body(body)?;
    let outcome =
        registration::unregister(ctx.store(), ctx.caller(), tournament_id, team_id).await?;
    Ok(json!({ "success": true, "message": outcome.message }))
}

async fn tournament_status(
    ctx: &Context,
    id: &str,
) -> Result<registration::RegistrationStatus, ServiceError> {
    let tournament_id = parse_id(id, "ID turnamen")?;
    Ok(registration::registration_status(ctx.store(), ctx.caller(), tournament_id).await)
}

async fn purchase_tickets(
    ctx: &Context,
    id: &str,
    body: &Bytes,
) -> Result<tickets::PurchaseResult, ServiceError> {
    let event_id = parse_id(id, "ID event")?;
    let PurchaseBody {
        ticket_type,
        quantity,
    } = parse_body(body)?;
    tickets::purchase(ctx.store(), ctx.caller(), event_id, &ticket_type, quantity).await
}

async fn register_for_event(ctx: &Context, id: &str) -> Result<serde_json::Value, ServiceError> {
    let event_id = parse_id(id, "ID event")?;
    let outcome = events::register_for_event(ctx.store(), ctx.caller(), event_id).await?;
    Ok(json!({
        "success": true,
        "registration": outcome.registration,
        "message": outcome.message,
    }))
}

async fn unregister_from_event(
    ctx: &Context,
    id: &str,
) -> Result<serde_json::Value, ServiceError> {
    let event_id = parse_id(id, "ID event")?;
    let message = events::unregister_from_event(ctx.store(), ctx.caller(), event_id).await?;
    Ok(json!({ "success": true, "message": message }))
}

async fn event_status(
    ctx: &Context,
    id: &str,
) -> Result<events::EventRegistrationStatus, ServiceError> {
    let event_id = parse_id(id, "ID event")?;
    Ok(events::event_registration_status(ctx.store(), ctx.caller(), event_id).await)
}

async fn cancel_ticket(ctx: &Context, id: &str) -> Result<serde_json::Value, ServiceError> {
    let ticket_id = parse_id(id, "ID tiket")?;
    let ticket = tickets::cancel_ticket(ctx.store(), ctx.caller(), ticket_id).await?;
    Ok(json!({
        "success": true,
        "ticket": ticket,
        "message": "Tiket berhasil dibatalkan",
    }))
}

async fn transfer_ticket(
    ctx: &Context,
    id: &str,
    body: &Bytes,
) -> Result<serde_json::Value, ServiceError> {
    let ticket_id = parse_id(id, "ID tiket")?;
    let TransferBody { recipient_id } = parse_required_body(body)?;
    let ticket =
        tickets::transfer_ticket(ctx.store(), ctx.caller(), ticket_id, recipient_id).await?;
    Ok(json!({
        "success": true,
        "ticket": ticket,
        "message": "Tiket berhasil ditransfer",
    }))
}

async fn create_reply(
    ctx: &Context,
    id: &str,
    body: &Bytes,
) -> Result<serde_json::Value, ServiceError> {
    let topic_id = parse_id(id, "ID topik")?;
    let ReplyBody { body } = parse_body(body)?;
    let reply = forum::create_reply(ctx.store(), ctx.caller(), topic_id, &body).await?;
    Ok(json!({ "success": true, "reply": reply }))
}

/// Largest request body a route will read.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route<'a> {
    Health,
    TournamentStatus(&'a str),
    RegisterTeam(&'a str),
    UnregisterTeam(&'a str),
    PurchaseTickets(&'a str),
    EventStatus(&'a str),
    RegisterForEvent(&'a str),
    UnregisterFromEvent(&'a str),
    CancelTicket(&'a str),
    TransferTicket(&'a str),
    CreateReply(&'a str),
}

impl<'a> Route<'a> {
    fn resolve(method: &Method, segments: &[&'a str]) -> Option<Self> {
        Some(match (method, segments) {
            (&Method::GET, ["health"]) => Route::Health,

            (&Method::GET, ["tournaments", id, "register", "status"]) => {
                Route::TournamentStatus(*id)
            }
            (&Method::POST, ["tournaments", id, "register"]) => Route::RegisterTeam(*id),
            (&Method::DELETE, ["tournaments", id, "register"]) => Route::UnregisterTeam(*id),

            (&Method::POST, ["events", id, "tickets", "purchase"]) => Route::PurchaseTickets(*id),
            (&Method::GET, ["events", id, "register", "status"]) => Route::EventStatus(*id),
            (&Method::POST, ["events", id, "register"]) => Route::RegisterForEvent(*id),
            (&Method::DELETE, ["events", id, "register"]) => Route::UnregisterFromEvent(*id),

            (&Method::POST, ["tickets", id, "cancel"]) => Route::CancelTicket(*id),
            (&Method::POST, ["tickets", id, "transfer"]) => Route::TransferTicket(*id),

            (&Method::POST, ["forum", "topics", id, "replies"]) => Route::CreateReply(*id),

            _ => return None,
        })
    }

    fn reads_body(&self) -> bool {
        matches!(
            self,
            Route::RegisterTeam(_)
                | Route::UnregisterTeam(_)
                | Route::PurchaseTickets(_)
                | Route::TransferTicket(_)
                | Route::CreateReply(_)
        )
    }
}

/// Collects at most [`MAX_BODY_BYTES`] of `body`.
async fn read_body<B>(body: B) -> Result<Bytes, Response<String>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => Err(json_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            &json!({ "error": "Isi permintaan terlalu besar" }),
        )),
        Err(e) => {
            tracing::warn!("Failed to read request body: {e}");
            Err(error_response(&ServiceError::BadRequest(
                "isi permintaan tidak dapat dibaca".to_string(),
            )))
        }
    }
}

/// Routes a REST request, or returns `None` when no route matches. The body
/// is only read once a route that takes one has matched.
pub async fn dispatch<B>(
    ctx: &Context,
    method: &Method,
    path: &str,
    body: B,
) -> Option<Response<String>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    let route = Route::resolve(method, &segments)?;

    let body = if route.reads_body() {
        match read_body(body).await {
            Ok(bytes) => bytes,
            Err(resp) => return Some(resp),
        }
    } else {
        Bytes::new()
    };

    let resp = match route {
        Route::Health => json_response(StatusCode::OK, &json!({ "status": "ok" })),
        Route::TournamentStatus(id) => render(tournament_status(ctx, id).await),
        Route::RegisterTeam(id) => render(register_team(ctx, id, &body).await),
        Route::UnregisterTeam(id) => render(unregister_team(ctx, id, &body).await),
        Route::PurchaseTickets(id) => render(purchase_tickets(ctx, id, &body).await),
        Route::EventStatus(id) => render(event_status(ctx, id).await),
        Route::RegisterForEvent(id) => render(register_for_event(ctx, id).await),
        Route::UnregisterFromEvent(id) => render(unregister_from_event(ctx, id).await),
        Route::CancelTicket(id) => render(cancel_ticket(ctx, id).await),
        Route::TransferTicket(id) => render(transfer_ticket(ctx, id, &body).await),
        Route::CreateReply(id) => render(create_reply(ctx, id, &body).await),
    };
    Some(resp)
}
