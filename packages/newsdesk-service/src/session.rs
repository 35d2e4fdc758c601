//! Caller-owned search state.
//!
//! A [`SearchSession`] holds the last fetched result set and the current tag selection. Handlers
//! take a session by value and hand back a new one; nothing is mutated in place, so a new search
//! replaces the records and clears the selection in one step.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use newsdesk_domain::{
	DateRange, Record, TagChip, TagSelection,
	tags::{self, paginate},
};

use crate::{FetchOutcome, NewsService, QueryRequest, Result, query};

#[derive(Debug, Clone, Serialize)]
pub struct SearchSession {
	pub id: Uuid,
	pub index: String,
	pub date_range: DateRange,
	pub request: Option<QueryRequest>,
	pub outcome: FetchOutcome,
	pub selection: TagSelection,
}
impl SearchSession {
	pub fn new(index: impl Into<String>, date_range: DateRange) -> Self {
		Self {
			id: Uuid::new_v4(),
			index: index.into(),
			date_range,
			request: None,
			outcome: FetchOutcome::NoMatches,
			selection: TagSelection::new(),
		}
	}

	/// Replaces the result set and resets the selection.
	pub fn searched(
		self,
		index: String,
		request: Option<QueryRequest>,
		outcome: FetchOutcome,
	) -> Self {
		Self { index, request, outcome, selection: TagSelection::new(), ..self }
	}

	pub fn with_selection(self, selection: TagSelection) -> Self {
		Self { selection, ..self }
	}

	pub fn records(&self) -> &[Record] {
		self.outcome.records()
	}

	pub fn filtered(&self) -> Vec<Record> {
		tags::filter(self.records(), &self.selection)
	}

	/// One page of the filtered records. Facets come from the whole held result set so that
	/// deselecting a value is always possible.
	pub fn view(&self, page: usize, per_page: usize) -> SessionView {
		let filtered = self.filtered();
		let items = paginate(&filtered, page, per_page)
			.iter()
			.map(|record| SessionItem { chips: tags::chips(record), record: record.clone() })
			.collect();

		SessionView {
			session_id: self.id,
			index: self.index.clone(),
			date_range: self.date_range,
			status: status_label(&self.outcome),
			error: self.outcome.error().map(str::to_string),
			total_records: self.records().len(),
			filtered_count: filtered.len(),
			page,
			per_page,
			items,
			facets: tags::facets(self.records()),
			selection: self.selection.clone(),
		}
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionItem {
	#[serde(flatten)]
	pub record: Record,
	pub chips: Vec<TagChip>,
}

/// What a presentation layer renders for a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
	pub session_id: Uuid,
	pub index: String,
	pub date_range: DateRange,
	pub status: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	pub total_records: usize,
	pub filtered_count: usize,
	pub page: usize,
	pub per_page: usize,
	pub items: Vec<SessionItem>,
	pub facets: BTreeMap<String, Vec<String>>,
	pub selection: TagSelection,
}

impl NewsService {
	/// Starts a session on `index` (default index when `None`) with its date bounds resolved.
	pub async fn open_session(&self, index: Option<&str>) -> Result<SearchSession> {
		let index = self.resolve_index(index)?;
		let date_range = self.resolve_date_range(&index).await;

		Ok(SearchSession::new(index, date_range))
	}

	/// Runs `request` and returns the superseding session. Empty requests fall back to the
	/// most recent records. Only invalid requests are errors; fetch failures live in the outcome.
	pub async fn search(
		&self,
		session: SearchSession,
		request: QueryRequest,
	) -> Result<SearchSession> {
		request.validate()?;

		let index = match request.index.as_deref() {
			Some(index) => self.resolve_index(Some(index))?,
			None => session.index.clone(),
		};

		if request.is_empty() {
			let outcome = self.fetch_recent(&index, request.page_size).await;

			return Ok(session.searched(index, Some(request), outcome));
		}

		let document = query::build(&request, &self.cfg.search)?;

		tracing::info!(
			%index,
			semantic = request.semantic().is_some(),
			keyword = request.keyword().is_some(),
			start_date = ?request.start_date,
			end_date = ?request.end_date,
			"Running search."
		);

		let outcome = self.fetch(&index, &document).await;

		Ok(session.searched(index, Some(request), outcome))
	}

	pub async fn recent(&self, session: SearchSession, page_size: Option<u32>) -> SearchSession {
		let index = session.index.clone();
		let outcome = self.fetch_recent(&index, page_size).await;

		session.searched(index, None, outcome)
	}
}

fn status_label(outcome: &FetchOutcome) -> &'static str {
	match outcome {
		FetchOutcome::Matches { .. } => "matches",
		FetchOutcome::NoMatches => "no_matches",
		FetchOutcome::Failed { .. } => "failed",
	}
}
