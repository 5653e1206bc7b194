//! Chat command interpreter.
//!
//! Recognised lines (leading keywords are case-insensitive):
//! - `<name> says [seed words...]`: generate
//! - `initialize babbler for <name>`: create and backfill a speaker
//! - `batch learn for <name> <text...>`: learn every line of `<text>`
//! - `merge babbler <a> and <b>`: merge `<b>` into `<a>`
//!
//! Any other line is learned for the user who sent it.

use tracing::warn;

use crate::engine::Babbler;
use crate::error::BabblerError;

/// An incoming chat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
	pub channel: String,
	pub user: String,
	pub body: String,
}

/// Delivers text back to the chat surface.
pub trait SendReply {
	fn send_reply(&mut self, channel: &str, text: &str);
}

/// Collects replies instead of sending them.
#[derive(Debug, Default, Clone)]
pub struct Outbox {
	/// `(channel, text)` pairs in send order.
	pub sent: Vec<(String, String)>,
}

impl SendReply for Outbox {
	fn send_reply(&mut self, channel: &str, text: &str) {
		self.sent.push((channel.to_owned(), text.to_owned()));
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
	Babble { speaker: String, seed: Vec<String> },
	Initialize { speaker: String },
	BatchLearn { speaker: String, lines: Vec<String> },
	Merge { into: String, other: String },
	Learn { text: String },
}

impl Command {
	/// Classifies a chat line. Never fails: unrecognised lines are `Learn`.
	pub fn parse(body: &str) -> Self {
		let tokens: Vec<&str> = body.split_whitespace().collect();
		let keyword = |i: usize, expected: &str| tokens.get(i).is_some_and(|t| t.eq_ignore_ascii_case(expected));

		if tokens.len() >= 2 && keyword(1, "says") {
			return Command::Babble {
				speaker: tokens[0].to_owned(),
				seed: tokens[2..].iter().map(|t| t.to_string()).collect(),
			};
		}

		if tokens.len() == 4 && keyword(0, "initialize") && keyword(1, "babbler") && keyword(2, "for") {
			return Command::Initialize { speaker: tokens[3].to_owned() };
		}

		if tokens.len() >= 4 && keyword(0, "batch") && keyword(1, "learn") && keyword(2, "for") {
			let lines = skip_tokens(body, 4)
				.lines()
				.map(str::trim)
				.filter(|line| !line.is_empty())
				.map(str::to_owned)
				.collect();
			return Command::BatchLearn { speaker: tokens[3].to_owned(), lines };
		}

		if tokens.len() == 5 && keyword(0, "merge") && keyword(1, "babbler") && keyword(3, "and") {
			return Command::Merge { into: tokens[2].to_owned(), other: tokens[4].to_owned() };
		}

		Command::Learn { text: body.to_owned() }
	}
}

/// Returns what is left of `body` after its first `n` whitespace-separated tokens.
///
/// Line breaks in the remainder are kept.
fn skip_tokens(body: &str, n: usize) -> &str {
	let mut rest = body;
	for _ in 0..n {
		rest = rest.trim_start();
		let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
		rest = &rest[end..];
	}
	rest
}

/// Usage text for the babbler commands.
pub fn help() -> &'static str {
	"initialize babbler for seabass\n\
	 seabass says\n\
	 seabass says <first words...>\n\
	 batch learn for seabass <one quote per line>\n\
	 merge babbler seabass and tuna"
}

/// Turns a generation failure into something to say in chat.
fn apology(speaker: &str, error: &BabblerError) -> String {
	match error {
		BabblerError::SpeakerNotFound(_) => format!("I don't know anyone called {speaker}."),
		BabblerError::NoUtterances(_) => format!("{speaker} hasn't said anything yet."),
		BabblerError::NeverSaid(_) => format!("{speaker} never said that."),
		BabblerError::MissingArcs(_) => format!("{speaker} lost their train of thought."),
		BabblerError::SelfMerge(_) => format!("{speaker} is already {speaker}."),
		_ => format!("sorry, something went wrong with {speaker}."),
	}
}

/// What handling one chat line did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Handled {
	/// A reply was sent.
	pub replied: bool,
	/// The line wrote to the graph, so a buffering store has something to flush.
	pub changed: bool,
}

impl Babbler {
	/// Interprets one chat line and sends any reply through `reply`.
	///
	/// Failures never escape: lookup failures become apologies, learning
	/// failures are logged.
	pub fn handle_message(&mut self, message: &Message, reply: &mut dyn SendReply) -> Handled {
		let (response, changed) = match Command::parse(&message.body) {
			Command::Babble { speaker, seed } => {
				let text = match self.babble_seed(&speaker, seed.as_slice()) {
					Ok(text) => text,
					Err(e) => {
						warn!(speaker = %speaker, error = %e, "babble failed");
						apology(&speaker, &e)
					}
				};
				(Some(text), false)
			}
			Command::Initialize { speaker } => {
				let (text, created) = self.initialize(&speaker);
				(Some(text), created)
			}
			Command::BatchLearn { speaker, lines } => (Some(self.batch_learn(&speaker, &lines)), true),
			Command::Merge { into, other } => {
				let text = match self.merge(&into, &other) {
					Ok(_) => format!("merged {other} into {into}."),
					Err(e) => {
						warn!(into = %into, other = %other, error = %e, "merge failed");
						apology(&other, &e)
					}
				};
				// A failed merge may still have created `into`.
				(Some(text), true)
			}
			Command::Learn { text } => {
				if let Err(e) = self.learn(&message.user, &text) {
					warn!(user = %message.user, error = %e, "failed to learn line");
				}
				(None, true)
			}
		};

		if let Some(text) = &response {
			reply.send_reply(&message.channel, text);
		}
		Handled { replied: response.is_some(), changed }
	}

	/// Returns the reply and whether a speaker was created.
	fn initialize(&mut self, speaker: &str) -> (String, bool) {
		match self.has_speaker(speaker) {
			Ok(true) => (format!("{speaker} babbler already exists."), false),
			Ok(false) => match self.get_or_create_speaker(speaker) {
				Ok(_) => (format!("okay, {speaker} babbler initialized."), true),
				Err(e) => {
					warn!(speaker = %speaker, error = %e, "initialize failed");
					(apology(speaker, &e), true)
				}
			},
			Err(e) => (apology(speaker, &e), false),
		}
	}

	fn batch_learn(&mut self, speaker: &str, lines: &[String]) -> String {
		let mut learned = 0usize;
		for line in lines {
			match self.learn(speaker, line) {
				Ok(()) => learned += 1,
				Err(e) => warn!(speaker = %speaker, error = %e, "batch line failed"),
			}
		}
		format!("learned {learned} of {} lines for {speaker}.", lines.len())
	}
}
