//! JSON request/response surface.
//!
//! Mirrors what an HTTP controller would do with a relocation call: parse
//! the request, run the relocator and turn the outcome into a status code
//! and a JSON body.

use relocator_core::{
    BookingProvider, Moveset, OccupancyStore, RelocationError, Result, UnitAssignmentWriter,
};
use relocator_solver::{RelocationRequest, Relocator};
use relocator_store::apply_moveset;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

/// Status code and JSON body of a relocation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    fn ok(moveset: &Moveset) -> Self {
        Self {
            status: 200,
            body: moveset_body(moveset),
        }
    }

    fn error(err: &RelocationError) -> Self {
        Self {
            status: err.status_code(),
            body: json!({ "error": err.to_string() }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Counts above `u64::MAX` are rendered as strings.
fn count(value: u128) -> Value {
    u64::try_from(value)
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(value.to_string()))
}

fn moveset_body(moveset: &Moveset) -> Value {
    json!({
        "signature": moveset.signature(),
        "description": moveset.describe(),
        "booking_ids": moveset.booking_ids(true),
        "moves": moveset.moves(),
        "iteration": count(moveset.iteration()),
        "combinations": count(moveset.combinations()),
        "solutions": moveset.solutions(),
    })
}

fn relocate<P, S>(provider: &P, store: S, request: RelocationRequest) -> Result<Moveset>
where
    P: BookingProvider + ?Sized,
    S: OccupancyStore,
{
    Relocator::new(provider, store, request)?.find_relocation()
}

fn respond(booking_id: u64, outcome: Result<Moveset>) -> Response {
    match outcome {
        Ok(moveset) => {
            info!(
                event = "relocation_response",
                booking = booking_id,
                status = 200u64,
                signature = %moveset.signature(),
            );
            Response::ok(&moveset)
        }
        Err(err) => {
            warn!(
                event = "relocation_failed",
                booking = booking_id,
                status = u64::from(err.status_code()),
                error = %err,
            );
            Response::error(&err)
        }
    }
}

/// Runs a relocation request and reports the moveset without applying it.
pub fn handle<P, S>(provider: &P, store: S, request: RelocationRequest) -> Response
where
    P: BookingProvider + ?Sized,
    S: OccupancyStore,
{
    let booking_id = request.booking_id;
    respond(booking_id, relocate(provider, store, request))
}

/// Parses a JSON request and runs it through [`handle`].
///
/// A body that does not parse yields a 400 response.
pub fn handle_json<P, S>(provider: &P, store: S, body: &str) -> Response
where
    P: BookingProvider + ?Sized,
    S: OccupancyStore,
{
    match serde_json::from_str::<RelocationRequest>(body) {
        Ok(request) => handle(provider, store, request),
        Err(e) => {
            let err = RelocationError::invalid(format!("malformed request: {e}"));
            respond(0, Err(err))
        }
    }
}

/// Runs a relocation request and writes the accepted moves back.
///
/// The success body gains an `applied` count.
pub fn handle_and_apply<B>(backend: &mut B, request: RelocationRequest) -> Response
where
    B: BookingProvider + OccupancyStore + UnitAssignmentWriter,
{
    let booking_id = request.booking_id;
    let outcome = relocate(&*backend, &*backend, request);
    let applied = match &outcome {
        Ok(moveset) => apply_moveset(backend, moveset).map(Some),
        Err(_) => Ok(None),
    };

    match applied {
        Ok(applied) => {
            let mut response = respond(booking_id, outcome);
            if let (Some(applied), Value::Object(body)) = (applied, &mut response.body) {
                body.insert("applied".to_string(), Value::from(applied));
            }
            response
        }
        Err(err) => respond(booking_id, Err(err)),
    }
}
