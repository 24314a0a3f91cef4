//! Sonar - Byte-to-Tone Data Sonification
//!
//! Sonar maps every byte of a file partition to an audible tone and can
//! recover the bytes again from whatever artifacts survive.
//!
//! # Architecture
//!
//! Encode direction:
//! - partition bytes → [`sequence::ToneSequence`] via [`codec::encode`]
//! - a [`backend::PlaybackBackend`] session renders the audio container and
//!   writes the frequency table, metadata document and analysis report
//!
//! Decode direction:
//! - one of four [`decoders`] turns an artifact into a
//!   [`sequence::RecoveredSequence`]
//! - the [`reconstruct::Reconstructor`] picks artifacts by priority, scores
//!   the result, validates it against the original when available, and
//!   combines partitions into one file

pub mod artifacts;
pub mod backend;
pub mod cli;
pub mod codec;
pub mod config;
pub mod container;
pub mod decoders;
pub mod error;
pub mod inspect;
pub mod partition;
pub mod reconstruct;
pub mod sequence;
pub mod sonify;

pub use error::{Result, SonarError};
