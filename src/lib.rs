// Banca: thesis committee recommendation from researcher profiles
//
// This is the library root. Each module corresponds to one stage of the
// recommendation pipeline, from profile records to a ranked short list.

pub mod committee;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod profile;
pub mod scoring;
pub mod status;
pub mod translate;
