use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use actix_cors::Cors;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};
use log::{info, warn};
use serde::Deserialize;

use glossa_core::io::{get_filename, list_files, normalize_folder};
use glossa_core::{Concept, Lexicon, LexiconOptions, LanguageModel, ModelError, PartOfSpeech, RngEntropy};

/// Folder holding the `.json` model files.
const DATA_FOLDER: &str = "./data";

/// Model loaded at startup.
const DEFAULT_MODEL: &str = "language_model";

/// Upper bound on `count` for `/v1/generate`.
const MAX_COUNT: usize = 1000;

/// Query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	language: String,
	register: Option<String>,
	count: Option<usize>,
	/// Apply the sound changes of the language to the generated words
	derive: Option<bool>,
}

/// Query parameters for the `/v1/transform` endpoint
#[derive(Deserialize)]
struct TransformParams {
	language: String,
	word: String,
	/// Name of a model concept; overrides `pos` and `class`
	concept: Option<String>,
	pos: Option<String>,
	class: Option<i32>,
}

#[derive(Deserialize)]
struct LexiconParams {
	language: String,
	register: Option<String>,
	nb_try: Option<usize>,
}

#[derive(Deserialize)]
struct ModelQuery {
	name: Option<String>,
}

struct SharedData {
	model: LanguageModel,
	/// Folder that `/v1/models` lists and `/v1/load_model` reads from.
	data_folder: PathBuf,
}

impl TransformParams {
	/// Builds the conditioning concept of the request.
	fn concept(&self, model: &LanguageModel) -> Result<Concept, ModelError> {
		if let Some(name) = &self.concept {
			return model
				.concept(name)
				.cloned()
				.ok_or_else(|| ModelError::UnknownConcept(name.clone()));
		}
		let part_of_speech = match &self.pos {
			Some(pos) => pos.parse()?,
			None => PartOfSpeech::None,
		};
		Ok(Concept::new("query", part_of_speech, self.class.unwrap_or(0)))
	}
}

/// Maps a model error to a response: lookups are 404, bad input 400.
fn error_response(error: &ModelError) -> HttpResponse {
	match error {
		ModelError::UnknownLanguage(_)
		| ModelError::UnknownRegister(_)
		| ModelError::UnknownConcept(_) => HttpResponse::NotFound().body(error.to_string()),
		ModelError::UnknownPartOfSpeech(_) => HttpResponse::BadRequest().body(error.to_string()),
		_ => HttpResponse::InternalServerError().body(error.to_string()),
	}
}

/// Locks the shared model, recovering a poisoned lock.
///
/// Handlers only ever replace the model wholesale, so a panic while the
/// lock is held cannot leave it half-updated.
fn lock_shared(data: &Mutex<SharedData>) -> MutexGuard<'_, SharedData> {
	data.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A model name is a bare file stem: no separators, no parent reference.
fn valid_model_name(name: &str) -> bool {
	!name.contains(['/', '\\']) && !name.contains("..")
}

fn model_path(folder: &Path, name: &str) -> PathBuf {
	folder.join(format!("{}.json", name))
}

/// GET /v1/generate
///
/// Generates `count` words (default 1, at most `MAX_COUNT`) in a register
/// (default "default"), one per line.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let register = query.register.as_deref().unwrap_or("default");
	let count = query.count.unwrap_or(1);
	let derive = query.derive.unwrap_or(false);
	if count > MAX_COUNT {
		return HttpResponse::BadRequest().body(format!("count must be at most {MAX_COUNT}"));
	}

	let shared_data = lock_shared(&data);
	let language = match shared_data.model.language(&query.language) {
		Ok(l) => l,
		Err(e) => return error_response(&e),
	};

	let mut entropy = RngEntropy::new(rand::rng());
	let concept = Concept::default();
	let mut words = Vec::new();
	for _ in 0..count {
		let word = if derive {
			language.derive_word(register, &concept, &mut entropy)
		} else {
			language.generate_word(register, &mut entropy)
		};
		match word {
			Ok(w) => words.push(w),
			Err(e) => return error_response(&e),
		}
	}

	HttpResponse::Ok().body(words.join("\n"))
}

/// GET /v1/transform
///
/// Applies every rule of a language to `word`.
#[get("/v1/transform")]
async fn get_transform(data: web::Data<Mutex<SharedData>>, query: web::Query<TransformParams>) -> impl Responder {
	let shared_data = lock_shared(&data);
	let concept = match query.concept(&shared_data.model) {
		Ok(c) => c,
		Err(e) => return error_response(&e),
	};

	let mut entropy = RngEntropy::new(rand::rng());
	match shared_data.model.apply_rules(&query.language, &concept, &query.word, &mut entropy) {
		Ok(result) => HttpResponse::Ok().body(result),
		Err(e) => error_response(&e),
	}
}

/// GET /v1/lexicon
///
/// One `concept: word` line per concept available in the language.
#[get("/v1/lexicon")]
async fn get_lexicon(data: web::Data<Mutex<SharedData>>, query: web::Query<LexiconParams>) -> impl Responder {
	let mut options = LexiconOptions::default();
	if let Some(register) = &query.register {
		options.default_register = register.clone();
	}
	if let Some(nb_try) = query.nb_try {
		options.nb_try = nb_try;
	}

	let shared_data = lock_shared(&data);
	let language = match shared_data.model.language(&query.language) {
		Ok(l) => l,
		Err(e) => return error_response(&e),
	};

	let mut entropy = RngEntropy::new(rand::rng());
	match Lexicon::build(language, shared_data.model.concepts(), &options, &mut entropy) {
		Ok(lexicon) => HttpResponse::Ok().body(
			lexicon
				.entries()
				.iter()
				.map(|entry| format!("{}: {}", entry.concept, entry.word))
				.collect::<Vec<_>>()
				.join("\n"),
		),
		Err(e) => error_response(&e),
	}
}

#[get("/v1/models")]
async fn get_models(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let folder = lock_shared(&data).data_folder.clone();
	match list_files(folder, "json") {
		Ok(files) => HttpResponse::Ok().body(
			files
				.iter()
				.filter_map(|file| get_filename(file).ok())
				.collect::<Vec<_>>()
				.join("\n"),
		),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list models"),
	}
}

#[get("/v1/languages")]
async fn get_languages(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = lock_shared(&data);
	HttpResponse::Ok().body(shared_data.model.language_names().join("\n"))
}

/// PUT /v1/load_model
///
/// Replaces the loaded model with `<data folder>/<name>.json`.
/// Sticky phonemes are drawn again. Names that would leave the data
/// folder are rejected.
#[put("/v1/load_model")]
async fn put_model(data: web::Data<Mutex<SharedData>>, query: web::Query<ModelQuery>) -> impl Responder {
	let name = match &query.name {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty model name"),
	};
	if !valid_model_name(name) {
		return HttpResponse::BadRequest().body(format!("Invalid model name '{name}'"));
	}

	let path = model_path(&lock_shared(&data).data_folder, name);
	let mut entropy = RngEntropy::new(rand::rng());
	let model = match LanguageModel::from_file(&path, &mut entropy) {
		Ok(m) => m,
		Err(e) => return HttpResponse::InternalServerError().body(format!("Failed to load model: {e}")),
	};

	lock_shared(&data).model = model;

	HttpResponse::Ok().body("Model loaded successfully")
}

fn load_startup_model(path: &Path) -> LanguageModel {
	match LanguageModel::from_file(path, &mut RngEntropy::new(rand::rng())) {
		Ok(model) => model,
		Err(e) => {
			warn!("starting without a model, {} could not be loaded: {}", path.display(), e);
			LanguageModel::default()
		}
	}
}

/// Main entry point for the server.
///
/// Loads `./data/language_model.json` when present, wraps the model in a
/// `Mutex` so `/v1/load_model` can replace it, and serves on
/// 127.0.0.1:5000.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let data_folder = normalize_folder(DATA_FOLDER);
	let shared_data = SharedData {
		model: load_startup_model(&model_path(&data_folder, DEFAULT_MODEL)),
		data_folder,
	};
	let shared_model = web::Data::new(Mutex::new(shared_data));

	info!("listening on 127.0.0.1:5000");
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.service(get_generated)
			.service(get_transform)
			.service(get_lexicon)
			.service(get_models)
			.service(get_languages)
			.service(put_model)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use actix_web::http::StatusCode;
	use actix_web::test;

	use glossa_core::FixedEntropy;

	use super::*;

	const MODEL: &str = r#"{
		"concepts": [{"name": "See", "POS": "Verb", "class": 1}],
		"languages": [{
			"name": "Late",
			"gating": "concept",
			"phonemes": {"P": "p", "H": ["wh"]},
			"phonotactics": {"default": [{"phonemes": "Pa", "weight": 1}]},
			"rules": [{"from": "ha", "to": "tri"}, {"from": "H", "to": "th", "POS": "Verb"}]
		}]
	}"#;

	fn shared_in(data_folder: PathBuf) -> web::Data<Mutex<SharedData>> {
		let model = LanguageModel::from_json_str(MODEL, &mut FixedEntropy(0.0)).unwrap();
		web::Data::new(Mutex::new(SharedData { model, data_folder }))
	}

	fn shared() -> web::Data<Mutex<SharedData>> {
		shared_in(PathBuf::from(DATA_FOLDER))
	}

	fn temp_folder(tag: &str) -> PathBuf {
		let dir = std::env::temp_dir().join(format!("glossa-server-{}-{}", tag, std::process::id()));
		std::fs::create_dir_all(&dir).unwrap();
		dir
	}

	#[actix_web::test]
	async fn transform_applies_the_rules() {
		let app = test::init_service(App::new().app_data(shared()).service(get_transform)).await;

		let req = test::TestRequest::get().uri("/v1/transform?language=Late&word=happy").to_request();
		assert_eq!(test::call_and_read_body(&app, req).await, web::Bytes::from_static(b"trippy"));

		let req = test::TestRequest::get().uri("/v1/transform?language=Late&word=where&concept=See").to_request();
		assert_eq!(test::call_and_read_body(&app, req).await, web::Bytes::from_static(b"there"));

		let req = test::TestRequest::get().uri("/v1/transform?language=Late&word=where&pos=Noun").to_request();
		assert_eq!(test::call_and_read_body(&app, req).await, web::Bytes::from_static(b"where"));
	}

	#[actix_web::test]
	async fn generate_lists_words() {
		let app = test::init_service(App::new().app_data(shared()).service(get_generated)).await;

		let req = test::TestRequest::get().uri("/v1/generate?language=Late&count=3").to_request();
		assert_eq!(test::call_and_read_body(&app, req).await, web::Bytes::from_static(b"pa\npa\npa"));
	}

	#[actix_web::test]
	async fn lookup_errors_map_to_status_codes() {
		let app = test::init_service(
			App::new().app_data(shared()).service(get_generated).service(get_transform),
		)
		.await;

		let req = test::TestRequest::get().uri("/v1/generate?language=Old").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

		let req = test::TestRequest::get().uri("/v1/generate?language=Late&register=names").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

		let req = test::TestRequest::get().uri("/v1/transform?language=Late&word=a&pos=Adverb").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn oversized_count_is_rejected_and_server_keeps_serving() {
		let app = test::init_service(App::new().app_data(shared()).service(get_generated)).await;

		let req = test::TestRequest::get()
			.uri("/v1/generate?language=Late&count=18446744073709551615")
			.to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

		let req = test::TestRequest::get()
			.uri(&format!("/v1/generate?language=Late&count={}", MAX_COUNT + 1))
			.to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

		let req = test::TestRequest::get().uri("/v1/generate?language=Late&count=1").to_request();
		assert_eq!(test::call_and_read_body(&app, req).await, web::Bytes::from_static(b"pa"));
	}

	#[::core::prelude::v1::test]
	fn poisoned_lock_is_recovered() {
		let data = shared();
		let poisoner = data.clone();
		let _ = std::thread::spawn(move || {
			let _guard = poisoner.lock().unwrap();
			panic!("handler failure");
		})
		.join();

		assert!(data.is_poisoned());
		assert_eq!(lock_shared(&data).model.language_names(), vec!["Late".to_owned()]);
	}

	#[actix_web::test]
	async fn lexicon_names_every_concept() {
		let app = test::init_service(App::new().app_data(shared()).service(get_lexicon)).await;

		let req = test::TestRequest::get().uri("/v1/lexicon?language=Late").to_request();
		assert_eq!(test::call_and_read_body(&app, req).await, web::Bytes::from_static(b"See: pa"));

		let req = test::TestRequest::get().uri("/v1/lexicon?language=Old").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
	}

	#[actix_web::test]
	async fn models_lists_the_data_folder() {
		let folder = temp_folder("models");
		std::fs::write(folder.join("late.json"), MODEL).unwrap();
		std::fs::write(folder.join("early.json"), MODEL).unwrap();
		std::fs::write(folder.join("notes.txt"), "").unwrap();
		let app = test::init_service(App::new().app_data(shared_in(folder.clone())).service(get_models)).await;

		let req = test::TestRequest::get().uri("/v1/models").to_request();
		assert_eq!(test::call_and_read_body(&app, req).await, web::Bytes::from_static(b"early\nlate"));
		std::fs::remove_dir_all(&folder).unwrap();
	}

	#[actix_web::test]
	async fn load_model_replaces_the_languages() {
		let folder = temp_folder("load");
		let other = MODEL.replace("\"Late\"", "\"Middle\"");
		std::fs::write(folder.join("middle.json"), other).unwrap();
		std::fs::write(folder.join("broken.json"), "{").unwrap();
		let app = test::init_service(
			App::new()
				.app_data(shared_in(folder.clone()))
				.service(put_model)
				.service(get_languages),
		)
		.await;

		let req = test::TestRequest::put().uri("/v1/load_model?name=missing").to_request();
		let res = test::call_service(&app, req).await;
		assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
		assert!(std::str::from_utf8(&test::read_body(res).await).unwrap().starts_with("Failed to load model"));

		let req = test::TestRequest::put().uri("/v1/load_model?name=broken").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::INTERNAL_SERVER_ERROR);

		let req = test::TestRequest::get().uri("/v1/languages").to_request();
		assert_eq!(test::call_and_read_body(&app, req).await, web::Bytes::from_static(b"Late"));

		let req = test::TestRequest::put().uri("/v1/load_model?name=middle").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

		let req = test::TestRequest::get().uri("/v1/languages").to_request();
		assert_eq!(test::call_and_read_body(&app, req).await, web::Bytes::from_static(b"Middle"));
		std::fs::remove_dir_all(&folder).unwrap();
	}

	#[actix_web::test]
	async fn load_model_rejects_bad_names() {
		let folder = temp_folder("names");
		std::fs::write(folder.join("x.json"), MODEL).unwrap();
		let nested = folder.join("nested");
		std::fs::create_dir_all(&nested).unwrap();
		let app = test::init_service(App::new().app_data(shared_in(nested)).service(put_model)).await;

		for uri in [
			"/v1/load_model",
			"/v1/load_model?name=%20",
			"/v1/load_model?name=../x",
			"/v1/load_model?name=..%2F..%2Fx",
			"/v1/load_model?name=a%5Cb",
		] {
			let req = test::TestRequest::put().uri(uri).to_request();
			assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST, "{uri}");
		}
		std::fs::remove_dir_all(&folder).unwrap();
	}

	#[::core::prelude::v1::test]
	fn model_names_stay_inside_the_folder() {
		assert!(valid_model_name("language_model"));
		assert!(valid_model_name("late-sylvan.v2"));
		assert!(!valid_model_name("../../x"));
		assert!(!valid_model_name("sub/model"));
		assert!(!valid_model_name("sub\\model"));
		assert!(!valid_model_name(".."));
	}
}
