// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) -> Protected (JWT + user validation)
pub mod protected; // Boards, lists, cards and profile
pub mod public; // Service info, health and token acquisition
