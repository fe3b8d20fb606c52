//! Boardsub - Trello-driven audio subtitling
//!
//! Watches a Trello board for cards carrying an audio attachment, transcribes
//! and translates the audio with whisper, renders a subtitled video with ffmpeg
//! and hands the results back to the card.

pub mod attachment;
pub mod board;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod media;
pub mod subtitle;
pub mod transcribe;
pub mod workflow;
pub mod workspace;
