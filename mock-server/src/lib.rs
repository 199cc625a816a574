use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::debug;

const AVATAR_BASE: &str = "https://rickandmortyapi.com/api/character/avatar";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: u32,
    pub name: String,
    pub status: String,
    pub species: String,
    pub image: String,
}

impl Character {
    pub fn new(id: u32, name: &str, status: &str, species: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            status: status.to_string(),
            species: species.to_string(),
            image: format!("{AVATAR_BASE}/{id}.jpeg"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PageInfo {
    pub count: usize,
    pub pages: u32,
    pub next: Option<String>,
    pub prev: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CharacterPage {
    pub info: PageInfo,
    pub results: Vec<Character>,
}

impl CharacterPage {
    pub fn single(results: Vec<Character>) -> Self {
        Self {
            info: PageInfo {
                count: results.len(),
                pages: 1,
                next: None,
                prev: None,
            },
            results,
        }
    }
}

/// What `GET /api/character` answers with.
#[derive(Clone, Debug)]
pub enum Fixture {
    /// A single page holding these characters.
    Characters(Vec<Character>),
    /// A bare status code with a short text body.
    Status(u16),
    /// A 200 with this body sent verbatim as JSON.
    RawBody(String),
}

impl Default for Fixture {
    fn default() -> Self {
        Fixture::Characters(sample_characters())
    }
}

pub fn sample_characters() -> Vec<Character> {
    vec![
        Character::new(1, "Rick Sanchez", "Alive", "Human"),
        Character::new(2, "Morty Smith", "Alive", "Human"),
        Character::new(3, "Summer Smith", "Alive", "Human"),
        Character::new(4, "Beth Smith", "Alive", "Human"),
        Character::new(5, "Jerry Smith", "Alive", "Human"),
        Character::new(8, "Adjudicator Rick", "Dead", "Human"),
        Character::new(6, "Abadango Cluster Princess", "Alive", "Alien"),
        Character::new(7, "Abradolf Lincler", "unknown", "Human"),
    ]
}

pub fn app() -> Router {
    app_with(Fixture::default())
}

pub fn app_with(fixture: Fixture) -> Router {
    Router::new()
        .route("/api/character", get(list_characters))
        .with_state(Arc::new(fixture))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

async fn list_characters(State(fixture): State<Arc<Fixture>>) -> Response {
    debug!(?fixture, "GET /api/character");
    match fixture.as_ref() {
        Fixture::Characters(characters) => Json(CharacterPage::single(characters.clone())).into_response(),
        Fixture::Status(code) => {
            let status = StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, status.canonical_reason().unwrap_or("error")).into_response()
        }
        Fixture::RawBody(body) => {
            ([(header::CONTENT_TYPE, "application/json")], body.clone()).into_response()
        }
    }
}
