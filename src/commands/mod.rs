pub mod inspect;
pub mod nearest;
pub mod replay;

pub use inspect::handle_inspect;
pub use nearest::handle_nearest;
pub use replay::handle_replay;
