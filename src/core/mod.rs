pub mod analytics;
pub mod assets;
pub mod correlation;
pub mod cot;
pub mod detection;
pub mod events;
pub mod fusion;
pub mod geo;
pub mod sentry;
pub mod threat;
pub mod time;
pub mod track_state;
