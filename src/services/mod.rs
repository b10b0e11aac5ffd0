pub mod maze_repository;
pub mod proximity;
pub mod secure_channel;
pub mod session;
pub mod tracking;
