pub mod addrole;
pub mod listroles;
pub mod moderators;
pub mod removerole;
