mod dispatcher;
mod message;

pub use self::dispatcher::{Command, ProductCommandHandler};
pub use self::message::{CommandEnvelope, CommandReply};
