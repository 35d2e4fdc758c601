use std::{
	collections::HashMap,
	sync::{Arc, Mutex},
};

use uuid::Uuid;

use newsdesk_config::Config;
use newsdesk_service::{NewsService, SearchSession};

/// Shared handler state. Sessions are stored by id and swapped out whole after each action.
#[derive(Clone)]
pub struct AppState {
	pub service: Arc<NewsService>,
	sessions: Arc<Mutex<HashMap<Uuid, SearchSession>>>,
}
impl AppState {
	pub fn new(config: Config) -> color_eyre::Result<Self> {
		let service = NewsService::new(config)?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: NewsService) -> Self {
		Self { service: Arc::new(service), sessions: Arc::new(Mutex::new(HashMap::new())) }
	}

	pub fn session(&self, id: Uuid) -> Option<SearchSession> {
		self.sessions.lock().unwrap_or_else(|err| err.into_inner()).get(&id).cloned()
	}

	pub fn insert(&self, session: SearchSession) {
		self.sessions.lock().unwrap_or_else(|err| err.into_inner()).insert(session.id, session);
	}

	/// Replaces a live session. Returns `false`, dropping `session`, when it was removed meanwhile.
	pub fn store(&self, session: SearchSession) -> bool {
		let mut sessions = self.sessions.lock().unwrap_or_else(|err| err.into_inner());

		match sessions.get_mut(&session.id) {
			Some(slot) => {
				*slot = session;

				true
			},
			None => false,
		}
	}

	pub fn remove(&self, id: Uuid) -> Option<SearchSession> {
		self.sessions.lock().unwrap_or_else(|err| err.into_inner()).remove(&id)
	}
}
