use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{get, post, put, web, App, HttpResponse, HttpServer, Responder};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use babbler_core::command::{self, Message, Outbox};
use babbler_core::{config, logger, Babbler, BabblerError};

/// JSON body of the `/v1/message` endpoint: one chat line.
#[derive(Deserialize, Serialize)]
struct ChatLine {
	channel: Option<String>,
	user: String,
	body: String,
}

/// Query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	speaker: Option<String>,
	seed: Option<String> // space separated words, none for a random root
}

#[derive(Deserialize)]
struct MergeQuery {
	into: Option<String>,
	other: Option<String>
}

struct SharedData {
	babbler: Babbler
}

/// Maps engine failures onto HTTP statuses.
fn error_response(e: &BabblerError) -> HttpResponse {
	match e {
		BabblerError::SpeakerNotFound(_) => HttpResponse::NotFound().body(e.to_string()),
		BabblerError::NoUtterances(_) | BabblerError::NeverSaid(_) | BabblerError::MissingArcs(_) | BabblerError::SelfMerge(_) => {
			HttpResponse::UnprocessableEntity().body(e.to_string())
		}
		_ => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

fn flush(shared_data: &mut SharedData) {
	if let Err(e) = shared_data.babbler.flush() {
		warn!(error = %e, "failed to flush babbler store");
	}
}

/// HTTP POST endpoint `/v1/message`
///
/// Feeds one chat line through the command interpreter.
/// Returns the replies (one per line), or `204` if the line was only learned.
#[post("/v1/message")]
async fn post_message(data: web::Data<Mutex<SharedData>>, line: web::Json<ChatLine>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Babbler lock failed"),
	};

	let line = line.into_inner();
	let message = Message {
		channel: line.channel.unwrap_or_default(),
		user: line.user,
		body: line.body,
	};

	let mut outbox = Outbox::default();
	if shared_data.babbler.handle_message(&message, &mut outbox).changed {
		flush(&mut shared_data);
	}

	if outbox.sent.is_empty() {
		return HttpResponse::NoContent().finish();
	}
	let replies: Vec<String> = outbox.sent.into_iter().map(|(_, text)| text).collect();
	HttpResponse::Ok().body(replies.join("\n"))
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates an utterance for `speaker`, continuing `seed` if given.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let speaker = match &query.speaker {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty speaker"),
	};
	let seed: Vec<&str> = query.seed.as_deref().unwrap_or_default().split_whitespace().collect();

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Babbler lock failed"),
	};

	match shared_data.babbler.babble_seed(speaker, seed.as_slice()) {
		Ok(result) => HttpResponse::Ok().body(result),
		Err(e) => error_response(&e),
	}
}

#[put("/v1/merge")]
async fn put_merge(data: web::Data<Mutex<SharedData>>, query: web::Query<MergeQuery>) -> impl Responder {
	let (into, other) = match (&query.into, &query.other) {
		(Some(a), Some(b)) if !a.trim().is_empty() && !b.trim().is_empty() => (a.trim(), b.trim()),
		_ => return HttpResponse::BadRequest().body("Missing 'into' or 'other' speaker"),
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Babbler lock failed"),
	};

	let result = shared_data.babbler.merge(into, other);
	flush(&mut shared_data);
	match result {
		Ok(report) => HttpResponse::Ok().body(format!(
			"Merged {other} into {into}: {} nodes, {} arcs",
			report.nodes, report.arcs
		)),
		Err(e) => error_response(&e),
	}
}

#[get("/v1/speakers")]
async fn get_speakers(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Babbler lock failed"),
	};
	match shared_data.babbler.speakers() {
		Ok(speakers) => HttpResponse::Ok().body(
			speakers.into_iter().map(|s| s.name).collect::<Vec<_>>().join("\n"),
		),
		Err(e) => error_response(&e),
	}
}

#[get("/v1/help")]
async fn get_help() -> impl Responder {
	HttpResponse::Ok().body(command::help())
}

fn io_error(e: BabblerError) -> std::io::Error {
	std::io::Error::other(e)
}

/// Main entry point for the server.
///
/// Loads the configuration (first argument, default `config/default.toml`),
/// opens the configured store, wraps the engine in a `Mutex` and starts an
/// Actix-web HTTP server.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	let config_path = std::env::args().nth(1).unwrap_or_else(|| "config/default.toml".to_owned());
	let config = config::load_or_default(&config_path).map_err(io_error)?;
	logger::init(&config.log_level).map_err(io_error)?;

	let shared_data = SharedData {
		babbler: Babbler::from_config(&config).map_err(io_error)?,
	};
	let shared_babbler = web::Data::new(Mutex::new(shared_data));

	info!(bind = %config.bind, backend = ?config.storage.backend, "babbler server starting");

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_babbler.clone())
			.service(post_message)
			.service(get_generated)
			.service(put_merge)
			.service(get_speakers)
			.service(get_help)
	})
		.bind(config.bind.as_str())?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::http::StatusCode;
	use actix_web::test;
	use babbler_core::store::MemoryStore;

	fn shared() -> web::Data<Mutex<SharedData>> {
		let babbler = Babbler::new(MemoryStore::new()).unwrap();
		web::Data::new(Mutex::new(SharedData { babbler }))
	}

	fn line(user: &str, body: &str) -> ChatLine {
		ChatLine { channel: Some("#general".into()), user: user.into(), body: body.into() }
	}

	#[actix_web::test]
	async fn message_then_generate() {
		let app = test::init_service(
			App::new().app_data(shared()).service(post_message).service(get_generated),
		)
		.await;

		let req = test::TestRequest::post().uri("/v1/message").set_json(line("alice", "hello world")).to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

		let req = test::TestRequest::post().uri("/v1/message").set_json(line("bob", "alice says")).to_request();
		assert_eq!(test::call_and_read_body(&app, req).await, web::Bytes::from_static(b"hello world"));

		let req = test::TestRequest::get().uri("/v1/generate?speaker=alice&seed=hello").to_request();
		assert_eq!(test::call_and_read_body(&app, req).await, web::Bytes::from_static(b"hello world"));
	}

	#[actix_web::test]
	async fn generate_maps_errors_to_statuses() {
		let app = test::init_service(
			App::new().app_data(shared()).service(post_message).service(get_generated),
		)
		.await;

		let req = test::TestRequest::get().uri("/v1/generate?speaker=nobody").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

		let req = test::TestRequest::post().uri("/v1/message").set_json(line("alice", "hi")).to_request();
		test::call_service(&app, req).await;
		let req = test::TestRequest::get().uri("/v1/generate?speaker=alice&seed=bye").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNPROCESSABLE_ENTITY);

		let req = test::TestRequest::get().uri("/v1/generate").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn snapshot_is_written_only_by_learning_lines() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("babbler.bin");
		let babbler = Babbler::new(MemoryStore::open(&path).unwrap()).unwrap();
		let app = test::init_service(
			App::new()
				.app_data(web::Data::new(Mutex::new(SharedData { babbler })))
				.service(post_message),
		)
		.await;

		let req = test::TestRequest::post().uri("/v1/message").set_json(line("alice", "hello world")).to_request();
		test::call_service(&app, req).await;
		assert!(path.is_file());

		std::fs::remove_file(&path).unwrap();
		let req = test::TestRequest::post().uri("/v1/message").set_json(line("bob", "alice says")).to_request();
		assert_eq!(test::call_and_read_body(&app, req).await, web::Bytes::from_static(b"hello world"));
		assert!(!path.exists());

		let req = test::TestRequest::post().uri("/v1/message").set_json(line("bob", "good morning")).to_request();
		test::call_service(&app, req).await;
		assert!(path.is_file());
	}

	#[actix_web::test]
	async fn merge_and_list_speakers() {
		let app = test::init_service(
			App::new()
				.app_data(shared())
				.service(post_message)
				.service(put_merge)
				.service(get_speakers),
		)
		.await;

		for (user, body) in [("alice", "hi"), ("bob", "yo")] {
			let req = test::TestRequest::post().uri("/v1/message").set_json(line(user, body)).to_request();
			test::call_service(&app, req).await;
		}

		let req = test::TestRequest::put().uri("/v1/merge?into=alice&other=bob").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

		let req = test::TestRequest::put().uri("/v1/merge?into=alice&other=alice").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNPROCESSABLE_ENTITY);

		let req = test::TestRequest::get().uri("/v1/speakers").to_request();
		assert_eq!(test::call_and_read_body(&app, req).await, web::Bytes::from_static(b"alice\nbob"));
	}
}
