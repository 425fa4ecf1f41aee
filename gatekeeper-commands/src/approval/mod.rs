pub mod apply;
pub mod approve;
pub mod ban;
pub mod close;
pub mod tickets;
pub mod transcript;
pub mod vc;
