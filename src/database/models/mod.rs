pub mod board;
pub mod card;
pub mod list;
pub mod user;

pub use board::{Board, BoardDetail, BoardPatch};
pub use card::{Card, CardPatch, NewCard};
pub use list::{List, ListPatch, ListWithCards};
pub use user::{PublicUser, User};
