pub mod countdown;
pub mod poller;
pub mod source;
pub mod status;

pub use countdown::{Countdown, TickAction};
pub use poller::{Device, PollOutcome, RawDocuments};
pub use source::DocumentSource;
pub use status::DeviceStatus;
