pub mod advisor;
pub mod link;
pub mod status;
pub mod webhook;
