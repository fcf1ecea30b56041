//! Coordinates from dictated speech.
//!
//! The recogniser hands back plain text such as `"50.0653, 19.94544"` or
//! `"minus 12 point 5 west"`. Numbers are read in order and paired into latitude/longitude.

use std::sync::LazyLock;

use log::{error, info};
use regex::Regex;

use crate::error::{Axis, InputError};
use crate::input::parse_degrees;
use crate::types::Coordinate;

/// Recogniser language used when none is configured.
pub const DEFAULT_LANGUAGE: &str = "en-US";

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?|[a-z]+|-").expect("token pattern is valid"));

/// Pull every number out of a transcript, applying spoken signs and decimal points.
pub fn numbers_from_transcript(transcript: &str) -> Vec<String> {
    let lower = transcript.to_lowercase();
    let mut numbers: Vec<String> = Vec::new();
    let mut negate_next = false;
    let mut pending_point = false;
    for m in TOKEN.find_iter(&lower) {
        let tok = m.as_str();
        if tok.as_bytes()[0].is_ascii_digit() {
            let joins = pending_point && numbers.last().map_or(false, |n| !n.contains('.'));
            if joins && !tok.contains('.') {
                if let Some(last) = numbers.last_mut() {
                    last.push('.');
                    last.push_str(tok);
                }
            } else if negate_next {
                numbers.push(format!("-{}", tok));
            } else {
                numbers.push(tok.to_string());
            }
            negate_next = false;
            pending_point = false;
            continue;
        }
        match tok {
            "-" | "minus" | "negative" => negate_next = true,
            "point" | "dot" | "decimal" => pending_point = true,
            "south" | "west" => {
                if let Some(last) = numbers.last_mut() {
                    if last.starts_with('-') {
                        last.remove(0);
                    } else {
                        last.insert(0, '-');
                    }
                }
            }
            _ => (),
        }
    }
    numbers
}

/// Pair the numbers of a transcript into coordinates, range-checking each one. A trailing
/// latitude without its longitude is rejected.
pub fn coordinates_from_transcript(transcript: &str) -> Result<Vec<Coordinate>, InputError> {
    let numbers = numbers_from_transcript(transcript);
    if numbers.len() % 2 == 1 {
        return Err(InputError::InvalidNumber {
            index: numbers.len() / 2,
            axis: Axis::Longitude,
            text: String::new(),
        });
    }
    numbers.chunks(2)
        .enumerate()
        .map(|(i, pair)| {
            Ok(Coordinate {
                latitude: parse_degrees(&pair[0], i, Axis::Latitude)?,
                longitude: parse_degrees(&pair[1], i, Axis::Longitude)?,
            })
        })
        .collect()
}

/// State of one dictation session, fed by the recogniser's callbacks.
#[derive(Debug, Clone)]
pub struct VoiceSession {
    language: String,
    listening: bool,
    transcript: Option<String>,
}

impl Default for VoiceSession {
    fn default() -> Self {
        VoiceSession::new(DEFAULT_LANGUAGE)
    }
}

impl VoiceSession {
    pub fn new(language: &str) -> VoiceSession {
        VoiceSession {
            language: language.to_string(),
            listening: false,
            transcript: None,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Last recognised text.
    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_ref().map(|s| s.as_str())
    }

    pub fn start(&mut self) {
        info!("listening ({})", self.language);
        self.listening = true;
    }

    /// Results callback. Keeps the recogniser's best (first) candidate; an empty result list
    /// leaves the previous transcript.
    pub fn on_results(&mut self, candidates: &[String]) -> Option<&str> {
        self.listening = false;
        if let Some(best) = candidates.first() {
            info!("recognized text: {}", best);
            self.transcript = Some(best.clone());
        }
        self.transcript()
    }

    pub fn on_error(&mut self, message: &str) {
        error!("speech error: {}", message);
        self.listening = false;
    }

    /// Release the recogniser.
    pub fn destroy(&mut self) {
        self.listening = false;
        self.transcript = None;
    }
}
