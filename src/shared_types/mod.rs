pub mod channel_state;
pub mod ticket;

pub use channel_state::ChannelState;
pub use ticket::Ticket;
