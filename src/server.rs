use crate::auth::{AuthError, Identity, TokenVerifier};
use crate::configuration::Configuration;
use crate::connection::receiver::{MessageReceiver, StreamMessageReceiver};
use crate::connection::sender::{MessageSender, SinkMessageSender};
use crate::context::ApplicationContext;
use crate::lifecycle::run_client;
use crate::message::outgoing::error_message::{ErrorMessage, ErrorMessageType};
use crate::relay::Relay;
use crate::store::{MessageKind, MessageStore, StoredMessage};
use axum::Router;
use axum::extract::ws::WebSocket;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use futures_util::future::ready;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::error;
use uuid::Uuid;

pub async fn run_server(application_context: ApplicationContext) -> Result<(), std::io::Error> {
	let address = application_context.configuration.address;
	let router = create_router(application_context);

	axum_server::bind(address).serve(router.into_make_service()).await
}

pub fn create_router(application_context: ApplicationContext) -> Router {
	Router::new()
		.route("/ws", get(websocket))
		.route("/api/messages/{room}", get(recent_messages))
		.route("/api/rooms", get(list_rooms))
		.layer(CorsLayer::permissive())
		.with_state(application_context)
}

/// Browsers can't set headers on websocket requests, so the token is
/// passed as a query parameter instead.
#[derive(Deserialize)]
struct QueryToken {
	token: String,
}

async fn websocket(
	State(token_verifier): State<TokenVerifier>,
	State(relay): State<Arc<Relay>>,
	query_token: Result<Query<QueryToken>, QueryRejection>,
	websocket_upgrade: WebSocketUpgrade,
) -> Result<Response, AuthenticationFailed> {
	let Ok(Query(QueryToken { token })) = query_token else {
		return Err(AuthError::MissingToken.into());
	};
	let identity = token_verifier.verify(&token)?;

	Ok(websocket_upgrade.on_upgrade(move |websocket| handle_websocket(relay, identity, websocket)))
}

async fn handle_websocket(relay: Arc<Relay>, identity: Identity, websocket: WebSocket) {
	let (sink, stream) = websocket.split();
	let message_sender = MessageSender::from(SinkMessageSender::new(sink));
	let stream = stream.filter_map(|result| ready(result.ok()));
	let message_receiver = MessageReceiver::from(StreamMessageReceiver::new(stream, message_sender.clone()));

	run_client(relay, identity, message_sender, message_receiver).await;
}

struct AuthenticationFailed(AuthError);

impl From<AuthError> for AuthenticationFailed {
	fn from(error: AuthError) -> Self {
		Self(error)
	}
}

impl IntoResponse for AuthenticationFailed {
	fn into_response(self) -> Response {
		let error_message = ErrorMessage::builder()
			.error(ErrorMessageType::AuthenticationFailed)
			.message(self.0.to_string())
			.build();
		(StatusCode::UNAUTHORIZED, Json(error_message)).into_response()
	}
}

#[derive(Serialize)]
pub struct MessageResponse {
	pub id: Uuid,
	pub room: String,
	pub sender: String,
	pub body: String,
	pub kind: MessageKind,
	pub time: DateTime<Utc>,
}

impl From<StoredMessage> for MessageResponse {
	fn from(message: StoredMessage) -> Self {
		Self {
			id: message.uuid,
			room: message.room,
			sender: message.sender,
			body: message.body,
			kind: message.kind,
			time: message.created_at,
		}
	}
}

async fn recent_messages(
	State(store): State<Arc<dyn MessageStore>>,
	State(configuration): State<Configuration>,
	Path(room): Path<String>,
) -> Result<Json<Vec<MessageResponse>>, StatusCode> {
	let history = store
		.recent_history(&room, configuration.api_history_limit)
		.await
		.map_err(|store_error| {
			error!("Failed to read history for room '{room}': {store_error}");
			StatusCode::INTERNAL_SERVER_ERROR
		})?;

	Ok(Json(history.into_iter().map(MessageResponse::from).collect()))
}

async fn list_rooms(State(relay): State<Arc<Relay>>) -> Json<Vec<String>> {
	Json(relay.room_names())
}
