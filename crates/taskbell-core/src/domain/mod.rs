//! Domain model (IDs, tasks, due timestamps, errors).

pub mod due;
pub mod errors;
pub mod ids;
pub mod task;

pub use self::due::{default_utc_offset, format_local, parse_due};
pub use self::errors::{Collaborator, TaskbellError};
pub use self::ids::{ChannelId, EventId, TaskId};
pub use self::task::{Completion, Task, TaskRef, validate_title};
